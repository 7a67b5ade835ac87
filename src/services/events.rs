//! Scripted operator timeline for the live event feed.
//!
//! Offsets are minutes after the cold front arrives (Feb 14 2021, ~02:00 CT).

use std::time::Duration;

use futures::stream::{self, Stream};

use crate::models::scenario::Scenario;
use crate::models::utility::EventSeverity::{self, Critical, Emergency, Info, Warning};
use crate::models::utility::TimelineEvent;

struct EventSeed {
    id: &'static str,
    offset: u32,
    title: &'static str,
    description: &'static str,
    severity: EventSeverity,
    region: Option<&'static str>,
    affected_nodes: u32,
}

const URI_EVENTS: [EventSeed; 20] = [
    EventSeed { id: "EVT-001", offset: 0, title: "Arctic Cold Front Arrival", description: "Polar vortex-driven cold front crosses Texas panhandle. Temps dropping 30°F in 2 hours.", severity: Warning, region: Some("WTX"), affected_nodes: 6 },
    EventSeed { id: "EVT-002", offset: 30, title: "Wind Turbine Icing — Lubbock", description: "Ice accumulation on turbine blades at Lubbock wind farm. 1,500 MW generation offline.", severity: Critical, region: Some("WTX"), affected_nodes: 3 },
    EventSeed { id: "EVT-003", offset: 90, title: "Heating Demand Surge — Dallas", description: "Electric heating demand spiking 240% above normal as temps hit 8°F.", severity: Warning, region: Some("DAL"), affected_nodes: 10 },
    EventSeed { id: "EVT-004", offset: 150, title: "Gas Pressure Drop — Permian Basin", description: "Natural gas wellhead freeze-offs reducing supply. Gas-fired plants at 60% capacity.", severity: Critical, region: Some("WTX"), affected_nodes: 4 },
    EventSeed { id: "EVT-005", offset: 210, title: "ERCOT Emergency Alert Level 1", description: "Operating reserves below 2,300 MW. Conservation appeal issued to all consumers.", severity: Warning, region: None, affected_nodes: 0 },
    EventSeed { id: "EVT-006", offset: 270, title: "Generation Trip — Comanche Peak", description: "Feedwater pump failure at nuclear unit. 1,200 MW lost unexpectedly.", severity: Emergency, region: Some("DAL"), affected_nodes: 8 },
    EventSeed { id: "EVT-007", offset: 330, title: "Frequency Excursion — 59.4 Hz", description: "Grid frequency dropped to 59.4 Hz. Automatic under-frequency load shedding activated.", severity: Emergency, region: None, affected_nodes: 54 },
    EventSeed { id: "EVT-008", offset: 340, title: "Rolling Blackouts Initiated", description: "ERCOT orders controlled load shed across all regions. 10,500 MW curtailed.", severity: Emergency, region: None, affected_nodes: 20 },
    EventSeed { id: "EVT-009", offset: 420, title: "Houston Substation Overload", description: "Main Houston transmission hub at 98% capacity. Cascading risk imminent.", severity: Critical, region: Some("HOU"), affected_nodes: 12 },
    EventSeed { id: "EVT-010", offset: 480, title: "Water Treatment Plant Offline — Austin", description: "Loss of power to Austin water treatment. Boil water notice issued.", severity: Critical, region: Some("AUS"), affected_nodes: 5 },
    EventSeed { id: "EVT-011", offset: 600, title: "Crew Dispatch — CREW-TX-14", description: "Line repair crew dispatched to Houston transmission corridor.", severity: Info, region: Some("HOU"), affected_nodes: 0 },
    EventSeed { id: "EVT-012", offset: 720, title: "Gas Pipeline Freeze — San Antonio", description: "Major gas pipeline instrument freeze. San Antonio peaker plants forced offline.", severity: Critical, region: Some("SAT"), affected_nodes: 8 },
    EventSeed { id: "EVT-013", offset: 960, title: "Mutual Aid Requested", description: "ERCOT requests mutual aid from SPP and MISO. Limited DC tie capacity available.", severity: Warning, region: None, affected_nodes: 0 },
    EventSeed { id: "EVT-014", offset: 1200, title: "Peak Demand — 69,150 MW", description: "All-time winter peak demand reached. Available generation only 45,000 MW.", severity: Emergency, region: None, affected_nodes: 35 },
    EventSeed { id: "EVT-015", offset: 1440, title: "24-Hour Mark — 4.5M Without Power", description: "Rolling blackouts extended. 4.5 million customers without power across Texas.", severity: Emergency, region: None, affected_nodes: 30 },
    EventSeed { id: "EVT-016", offset: 1800, title: "Temps Begin Rising — Dallas", description: "Temperatures climb above 20°F in Dallas metro. Heating load starting to decrease.", severity: Info, region: Some("DAL"), affected_nodes: 0 },
    EventSeed { id: "EVT-017", offset: 2100, title: "Generation Recovery Begins", description: "Gas supply partially restored. 8,000 MW of generation returning online.", severity: Info, region: None, affected_nodes: 0 },
    EventSeed { id: "EVT-018", offset: 2400, title: "Load Shed Reduction", description: "ERCOT reduces controlled load shed from 10,500 MW to 4,200 MW.", severity: Warning, region: None, affected_nodes: 12 },
    EventSeed { id: "EVT-019", offset: 2700, title: "Crew Repair Complete — Houston Hub", description: "CREW-TX-14 completes emergency repairs on Houston transmission corridor.", severity: Info, region: Some("HOU"), affected_nodes: 0 },
    EventSeed { id: "EVT-020", offset: 2880, title: "Partial Restoration — 48h Mark", description: "Grid frequency stabilized at 60.0 Hz. 2.1 million customers still without power.", severity: Warning, region: None, affected_nodes: 15 },
];

const NORMAL_EVENTS: [EventSeed; 4] = [
    EventSeed { id: "EVT-N01", offset: 0, title: "Scheduled Maintenance — AUS_003", description: "Planned transformer maintenance at Austin substation. Backup path active.", severity: Info, region: Some("AUS"), affected_nodes: 1 },
    EventSeed { id: "EVT-N02", offset: 120, title: "Vegetation Trimming — DAL Corridor", description: "Routine vegetation management along Dallas-Fort Worth transmission line.", severity: Info, region: Some("DAL"), affected_nodes: 0 },
    EventSeed { id: "EVT-N03", offset: 360, title: "Peak Demand Forecast Normal", description: "Afternoon peak expected at 52,000 MW. Sufficient reserves available.", severity: Info, region: None, affected_nodes: 0 },
    EventSeed { id: "EVT-N04", offset: 480, title: "Relay Test Complete — HOU_001", description: "Protective relay testing completed at Houston main substation. All systems nominal.", severity: Info, region: Some("HOU"), affected_nodes: 0 },
];

/// Payload of the final stream message
pub const STREAM_DONE: &str = r#"{"done":true}"#;

fn to_event(seed: &EventSeed) -> TimelineEvent {
    TimelineEvent {
        event_id: seed.id.to_string(),
        timestamp_offset_minutes: seed.offset,
        title: seed.title.to_string(),
        description: seed.description.to_string(),
        severity: seed.severity,
        region: seed.region.map(str::to_string),
        affected_nodes: seed.affected_nodes,
    }
}

pub fn timeline(scenario: Scenario) -> Vec<TimelineEvent> {
    let seeds: &[EventSeed] = if scenario.is_uri() {
        &URI_EVENTS
    } else {
        &NORMAL_EVENTS
    };
    seeds.iter().map(to_event).collect()
}

/// JSON payloads for the live feed: one per event, `interval` apart, then
/// [`STREAM_DONE`].
pub fn timeline_stream(scenario: Scenario, interval: Duration) -> impl Stream<Item = String> {
    let events = timeline(scenario);
    stream::unfold((events.into_iter(), 0usize, false), move |(mut events, sent, done)| async move {
        if done {
            return None;
        }
        if sent > 0 {
            tokio::time::sleep(interval).await;
        }
        match events.next() {
            Some(event) => {
                let payload = serde_json::to_string(&event).unwrap_or_default();
                Some((payload, (events, sent + 1, false)))
            }
            None => Some((STREAM_DONE.to_string(), (events, sent + 1, true))),
        }
    })
}
