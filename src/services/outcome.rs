//! Unmitigated vs mitigated cascade comparison for the command bar.
//!
//! Mitigation cuts every node's demand by 12 %; both runs use the same
//! forecast hour so the difference isolates the demand response.

use std::collections::HashSet;

use tracing::info;

use crate::constants::cascade::MITIGATION_LOAD_FACTOR;
use crate::constants::forecast::DEFAULT_FORECAST_HOUR;
use crate::constants::impact::*;
use crate::models::scenario::Scenario;
use crate::models::simulate::CascadeResult;
use crate::models::utility::{OutcomeComparison, ScenarioOutcome};
use crate::services::cascade::{run_cascade, CascadeParams};
use crate::services::demand::DemandMultipliers;
use crate::services::grid::GridGraph;
use crate::utils::round_to;

/// Peak price kept after mitigation under Uri
const URI_MITIGATED_PRICE_SHARE: f64 = 0.55;

/// Distinct weather zones among the failed nodes.
fn affected_zones(grid: &GridGraph, failed_ids: &[String]) -> usize {
    failed_ids
        .iter()
        .filter_map(|id| grid.node(id))
        .map(|n| n.weather_zone.as_str())
        .collect::<HashSet<_>>()
        .len()
}

fn customers(result: &CascadeResult) -> u64 {
    (result.total_load_shed_mw * CUSTOMERS_PER_MW).max(0.0) as u64
}

/// Ratio of mitigated to unmitigated failures
fn failure_share(with: usize, without: usize) -> f64 {
    with as f64 / without.max(1) as f64
}

fn outcome(grid: &GridGraph, name: &str, result: &CascadeResult, price: f64, duration: f64) -> ScenarioOutcome {
    ScenarioOutcome {
        scenario_name: name.to_string(),
        total_affected_customers: customers(result),
        peak_price_mwh: price,
        blackout_duration_hours: duration,
        regions_affected: affected_zones(grid, &result.failed_node_ids),
        cascade_steps: result.cascade_depth,
        failed_nodes: result.total_failed_nodes,
    }
}

pub fn compare_outcomes(grid: &GridGraph, multipliers: &DemandMultipliers, scenario: Scenario) -> OutcomeComparison {
    let without_label = format!("{}_no_mitigation", scenario);
    let without = run_cascade(
        grid,
        CascadeParams {
            multipliers,
            scenario_label: &without_label,
            forecast_hour: DEFAULT_FORECAST_HOUR,
            zone_temps: None,
        },
    );

    let mitigated: DemandMultipliers = multipliers
        .iter()
        .map(|(id, m)| (id.clone(), m * MITIGATION_LOAD_FACTOR))
        .collect();
    let with_label = format!("{}_with_blackout", scenario);
    let with = run_cascade(
        grid,
        CascadeParams {
            multipliers: &mitigated,
            scenario_label: &with_label,
            forecast_hour: DEFAULT_FORECAST_HOUR,
            zone_temps: None,
        },
    );

    let share = failure_share(with.total_failed_nodes, without.total_failed_nodes);

    let (price_without, price_with) = if scenario.is_uri() {
        (URI_PRICE_CAP, round_to(URI_PRICE_CAP * URI_MITIGATED_PRICE_SHARE, 2))
    } else {
        let failure_ratio = without.total_failed_nodes as f64 / without.total_nodes.max(1) as f64;
        let price = round_to(NORMAL_PRICE * (1.0 + failure_ratio * 50.0), 2);
        (price, round_to(price * share, 2))
    };

    let duration_with = (BASE_OUTAGE_HOURS * share).max(0.0);

    let without_outcome = outcome(grid, "Without Blackout", &without, price_without, BASE_OUTAGE_HOURS);
    let with_outcome = outcome(grid, "With Blackout", &with, price_with, round_to(duration_with, 1));

    let customers_saved = without_outcome
        .total_affected_customers
        .saturating_sub(with_outcome.total_affected_customers);
    let price_reduction_pct = if price_without > 0.0 {
        round_to((1.0 - price_with / price_without) * 100.0, 1)
    } else {
        0.0
    };
    let cascade_reduction_pct = round_to(
        (1.0 - with.cascade_depth as f64 / without.cascade_depth.max(1) as f64) * 100.0,
        1,
    );

    info!(
        "Outcome comparison for {}: {} → {} failed nodes, {} customers saved",
        scenario, without.total_failed_nodes, with.total_failed_nodes, customers_saved
    );

    OutcomeComparison {
        without_blackout: without_outcome,
        with_blackout: with_outcome,
        customers_saved,
        price_reduction_pct,
        cascade_reduction_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grid::GridData;
    use crate::services::grid::test_support::{edge, node};

    /// Hub in Houston feeding three Dallas buses
    fn grid() -> GridGraph {
        GridGraph::from_data(GridData {
            nodes: vec![
                node("HUB", 29.76, -95.37, 100.0, 100.0, 345.0),
                node("D1", 32.78, -96.80, 80.0, 100.0, 138.0),
                node("D2", 32.70, -96.90, 80.0, 100.0, 138.0),
                node("D3", 32.60, -96.70, 10.0, 1000.0, 138.0),
            ],
            edges: vec![edge("HUB", "D1"), edge("HUB", "D2"), edge("HUB", "D3")],
        })
    }

    fn stressed() -> DemandMultipliers {
        ["HUB", "D1", "D2", "D3"]
            .iter()
            .map(|id| (id.to_string(), 1.1))
            .collect()
    }

    #[test]
    fn test_mitigation_prevents_cascade() {
        let cmp = compare_outcomes(&grid(), &stressed(), Scenario::Uri);

        // Hub at 110 MW trips; 77 MW split three ways pushes D1, D2 to ~113.7 MW
        assert_eq!(cmp.without_blackout.failed_nodes, 3);
        assert_eq!(cmp.without_blackout.cascade_steps, 2);
        assert_eq!(cmp.without_blackout.regions_affected, 2);
        assert_eq!(cmp.without_blackout.peak_price_mwh, 9000.0);
        assert_eq!(cmp.without_blackout.blackout_duration_hours, 48.0);

        // 110 * 0.88 = 96.8 stays under the 105 MW trip point
        assert_eq!(cmp.with_blackout.failed_nodes, 0);
        assert_eq!(cmp.with_blackout.total_affected_customers, 0);
        assert_eq!(cmp.with_blackout.peak_price_mwh, 4950.0);
        assert_eq!(cmp.with_blackout.blackout_duration_hours, 0.0);

        assert_eq!(cmp.customers_saved, cmp.without_blackout.total_affected_customers);
        assert_eq!(cmp.price_reduction_pct, 45.0);
        assert_eq!(cmp.cascade_reduction_pct, 100.0);
    }

    #[test]
    fn test_normal_price_scales_with_failures() {
        let cmp = compare_outcomes(&grid(), &stressed(), Scenario::Normal);
        // 3 of 4 nodes failed: 35 * (1 + 0.75 * 50)
        assert_eq!(cmp.without_blackout.peak_price_mwh, 1347.5);
        assert_eq!(cmp.with_blackout.peak_price_mwh, 0.0);
        assert_eq!(cmp.price_reduction_pct, 100.0);
    }

    #[test]
    fn test_calm_grid_has_nothing_to_save() {
        let cmp = compare_outcomes(&grid(), &DemandMultipliers::new(), Scenario::Normal);
        assert_eq!(cmp.without_blackout.failed_nodes, 0);
        assert_eq!(cmp.without_blackout.peak_price_mwh, 35.0);
        assert_eq!(cmp.with_blackout.peak_price_mwh, 0.0);
        assert_eq!(cmp.customers_saved, 0);
        assert_eq!(cmp.cascade_reduction_pct, 100.0);
    }
}
