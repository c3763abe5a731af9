use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::Duration;

use crate::ValidationError;

/// Supported time bucket sizes for bar requests.
///
/// `H4` has no native upstream bucket; it is served by fetching `H1` bars and
/// aggregating groups of four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Timeframe {
    pub const ALL: [Self; 4] = [Self::M1, Self::H1, Self::H4, Self::D1];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::M1 => "1m",
            Self::H1 => "1h",
            Self::H4 => "4h",
            Self::D1 => "1d",
        }
    }

    /// Upstream record schema that serves this timeframe.
    pub const fn native_schema(self) -> &'static str {
        match self {
            Self::M1 => "ohlcv-1m",
            Self::H1 | Self::H4 => "ohlcv-1h",
            Self::D1 => "ohlcv-1d",
        }
    }

    /// Whether this timeframe is derived by aggregating a finer native one.
    pub const fn is_synthetic(self) -> bool {
        matches!(self, Self::H4)
    }

    /// Number of native bars aggregated into one bar of this timeframe.
    pub const fn native_bars_per_bucket(self) -> usize {
        match self {
            Self::H4 => 4,
            _ => 1,
        }
    }

    /// Duration of one native upstream bucket.
    pub const fn native_step(self) -> Duration {
        match self {
            Self::M1 => Duration::minutes(1),
            Self::H1 | Self::H4 => Duration::hours(1),
            Self::D1 => Duration::days(1),
        }
    }
}

impl Display for Timeframe {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "1m" | "m1" => Ok(Self::M1),
            "1h" | "h1" => Ok(Self::H1),
            "4h" | "h4" => Ok(Self::H4),
            "1d" | "d1" => Ok(Self::D1),
            other => Err(ValidationError::InvalidTimeframe {
                value: other.to_owned(),
            }),
        }
    }
}
