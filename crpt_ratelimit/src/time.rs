use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::error::RateLimitError;

/// Unit of time from which the replenishment window is derived
///
/// The limiter window is always exactly one unit long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Duration of one unit
    #[inline]
    pub const fn as_duration(self) -> Duration {
        match self {
            TimeUnit::Nanoseconds => Duration::from_nanos(1),
            TimeUnit::Microseconds => Duration::from_micros(1),
            TimeUnit::Milliseconds => Duration::from_millis(1),
            TimeUnit::Seconds => Duration::from_secs(1),
            TimeUnit::Minutes => Duration::from_secs(60),
            TimeUnit::Hours => Duration::from_secs(3600),
            TimeUnit::Days => Duration::from_secs(86_400),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "nanoseconds",
            TimeUnit::Microseconds => "microseconds",
            TimeUnit::Milliseconds => "milliseconds",
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = RateLimitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ns" | "nanos" | "nanoseconds" => Ok(TimeUnit::Nanoseconds),
            "us" | "micros" | "microseconds" => Ok(TimeUnit::Microseconds),
            "ms" | "millis" | "milliseconds" => Ok(TimeUnit::Milliseconds),
            "s" | "secs" | "seconds" => Ok(TimeUnit::Seconds),
            "m" | "mins" | "minutes" => Ok(TimeUnit::Minutes),
            "h" | "hours" => Ok(TimeUnit::Hours),
            "d" | "days" => Ok(TimeUnit::Days),
            _ => Err(RateLimitError::InvalidConfig("unknown time unit")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_durations() {
        assert_eq!(TimeUnit::Nanoseconds.as_duration(), Duration::from_nanos(1));
        assert_eq!(TimeUnit::Milliseconds.as_duration(), Duration::from_millis(1));
        assert_eq!(TimeUnit::Seconds.as_duration(), Duration::from_secs(1));
        assert_eq!(TimeUnit::Minutes.as_duration(), Duration::from_secs(60));
        assert_eq!(TimeUnit::Days.as_duration(), Duration::from_secs(24 * 3600));
    }

    #[test]
    fn test_parse() {
        assert_eq!("SECONDS".parse::<TimeUnit>(), Ok(TimeUnit::Seconds));
        assert_eq!(" ms ".parse::<TimeUnit>(), Ok(TimeUnit::Milliseconds));
        assert_eq!("minutes".parse::<TimeUnit>(), Ok(TimeUnit::Minutes));
        assert!(matches!("fortnights".parse::<TimeUnit>(), Err(RateLimitError::InvalidConfig(_))));
    }

    #[test]
    fn test_serde_names() {
        let unit: TimeUnit = serde_json::from_str("\"hours\"").unwrap();
        assert_eq!(unit, TimeUnit::Hours);
        assert_eq!(serde_json::to_string(&TimeUnit::Microseconds).unwrap(), "\"microseconds\"");
        assert_eq!(TimeUnit::Seconds.to_string(), "seconds");
    }
}
