use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::constants::forecast::{DEFAULT_FORECAST_HOUR, NORMAL_DISPLAY_HOUR};

/// Weather scenario driving demand, prices and scripted narratives.
///
/// Parsing is lenient: `uri` and `uri_2021` select the February 2021 storm,
/// `live` selects current weather, anything else is a normal day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Uri,
    Normal,
    Live,
}

impl Scenario {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "uri" | "uri_2021" => Scenario::Uri,
            "live" => Scenario::Live,
            _ => Scenario::Normal,
        }
    }

    pub fn is_uri(self) -> bool {
        matches!(self, Scenario::Uri)
    }

    /// Scripted counterpart: the storm stays the storm, anything else is a
    /// normal day.
    pub fn scripted(self) -> Self {
        match self {
            Scenario::Uri => Scenario::Uri,
            _ => Scenario::Normal,
        }
    }

    /// Hour shown by the operator views: the storm peak for Uri, midday
    /// otherwise.
    pub fn display_hour(self) -> u32 {
        match self {
            Scenario::Uri => DEFAULT_FORECAST_HOUR,
            _ => NORMAL_DISPLAY_HOUR,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scenario::Uri => "uri",
            Scenario::Normal => "normal",
            Scenario::Live => "live",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Scenario {
    fn from(raw: &str) -> Self {
        Scenario::parse(raw)
    }
}
