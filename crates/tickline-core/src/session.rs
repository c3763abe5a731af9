//! Trading-session classification by UTC hour of day.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::Time;

use crate::domain::UtcDateTime;

/// Named window of the trading day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingSession {
    Asian,
    London,
    NewYork,
    Unknown,
}

impl TradingSession {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asian => "asian",
            Self::London => "london",
            Self::NewYork => "new_york",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for TradingSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session classification for one timestamp. Purely derived, no lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub session: TradingSession,
    pub session_start: UtcDateTime,
    pub session_end: UtcDateTime,
    pub timestamp: UtcDateTime,
}

/// Classify a timestamp into its trading session.
///
/// Half-open UTC-hour intervals: [0,7) Asian, [7,14) London, [14,22)
/// NewYork. Hours 22 and 23 are Unknown, with both bounds collapsed to the
/// input timestamp itself; downstream consumers depend on that convention.
pub fn classify(timestamp: UtcDateTime) -> SessionInfo {
    let hour = timestamp.into_inner().hour();

    let (session, bounds) = match hour {
        0..=6 => (TradingSession::Asian, Some((0, 7))),
        7..=13 => (TradingSession::London, Some((7, 14))),
        14..=21 => (TradingSession::NewYork, Some((14, 22))),
        _ => (TradingSession::Unknown, None),
    };

    let (session_start, session_end) = match bounds {
        Some((start, end)) => (at_hour(timestamp, start), at_hour(timestamp, end)),
        None => (timestamp, timestamp),
    };

    SessionInfo {
        session,
        session_start,
        session_end,
        timestamp,
    }
}

fn at_hour(timestamp: UtcDateTime, hour: u8) -> UtcDateTime {
    let time = Time::from_hms(hour, 0, 0).expect("session bound hours are valid");
    let inner = timestamp.into_inner().replace_time(time);
    UtcDateTime::from_offset_datetime(inner).expect("replacing the time keeps UTC")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn at(hour: u8) -> UtcDateTime {
        UtcDateTime::from_offset_datetime(datetime!(2021-01-01 00:00:00 UTC).replace_time(
            Time::from_hms(hour, 30, 0).expect("valid"),
        ))
        .expect("utc")
    }

    #[test]
    fn classification_is_total_over_the_day() {
        for hour in 0..24u8 {
            let info = classify(at(hour));
            let expected = match hour {
                0..=6 => TradingSession::Asian,
                7..=13 => TradingSession::London,
                14..=21 => TradingSession::NewYork,
                _ => TradingSession::Unknown,
            };
            assert_eq!(info.session, expected, "hour {hour}");
        }
    }

    #[test]
    fn boundary_hours_open_their_session() {
        assert_eq!(classify(at(0)).session, TradingSession::Asian);
        assert_eq!(classify(at(7)).session, TradingSession::London);
        assert_eq!(classify(at(14)).session, TradingSession::NewYork);
        assert_eq!(classify(at(22)).session, TradingSession::Unknown);
    }

    #[test]
    fn known_sessions_report_bounding_hours() {
        let info = classify(
            UtcDateTime::parse("2021-01-01T15:45:00Z").expect("timestamp"),
        );
        assert_eq!(info.session, TradingSession::NewYork);
        assert_eq!(info.session_start.format_rfc3339(), "2021-01-01T14:00:00Z");
        assert_eq!(info.session_end.format_rfc3339(), "2021-01-01T22:00:00Z");
    }

    #[test]
    fn unknown_session_collapses_bounds_to_input() {
        let ts = UtcDateTime::parse("2021-01-01T22:00:00Z").expect("timestamp");
        let info = classify(ts);
        assert_eq!(info.session, TradingSession::Unknown);
        assert_eq!(info.session_start, ts);
        assert_eq!(info.session_end, ts);
    }
}
