//! Daily rotating cache keys.
//!
//! A key is the calendar date followed by the currency code exactly as the caller sent it, e.g.
//! `2024-05-01USD`. Keys rotate at midnight, which is earlier than the provider publishes new
//! tables (around 16:00 CET), so the first misses of a day may still cache the previous day's rates
//! until the next rotation.

use std::{fmt, str::FromStr};

use chrono::{Local, NaiveDate, Utc};

use crate::error::ConfigError;

const KEY_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn cache_key(date: NaiveDate, currency: &str) -> Vec<u8> {
    let mut key = date.format(KEY_DATE_FORMAT).to_string().into_bytes();
    key.extend_from_slice(currency.as_bytes());
    key
}

/// Source of "today" for cache keys.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock, in either UTC or the host's local time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SystemClock {
    #[default]
    Local,
    Utc,
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        match self {
            Self::Local => Local::now().date_naive(),
            Self::Utc => Utc::now().date_naive(),
        }
    }
}

impl FromStr for SystemClock {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "utc" => Ok(Self::Utc),
            other => Err(ConfigError::Invalid {
                var: "XRATE_CACHE_CLOCK",
                reason: format!("expected 'local' or 'utc', got '{other}'"),
            }),
        }
    }
}

impl fmt::Display for SystemClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Utc => write!(f, "utc"),
        }
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn key_is_date_then_currency() {
        assert_eq!(cache_key(date(2024, 5, 1), "USD"), b"2024-05-01USD".to_vec());
        assert_eq!(cache_key(date(2024, 12, 31), ""), b"2024-12-31".to_vec());
    }

    #[test]
    fn key_is_deterministic() {
        assert_eq!(cache_key(date(2024, 5, 1), "USD"), cache_key(date(2024, 5, 1), "USD"));
    }

    #[test]
    fn key_changes_with_date_and_currency() {
        assert_ne!(cache_key(date(2024, 5, 1), "USD"), cache_key(date(2024, 5, 2), "USD"));
        assert_ne!(cache_key(date(2024, 5, 1), "USD"), cache_key(date(2024, 5, 1), "EUR"));
    }

    #[test]
    fn currency_case_is_not_normalized() {
        assert_ne!(cache_key(date(2024, 5, 1), "usd"), cache_key(date(2024, 5, 1), "USD"));
    }

    #[test]
    fn parses_clock_names() {
        assert_eq!("utc".parse::<SystemClock>().unwrap(), SystemClock::Utc);
        assert_eq!(" Local ".parse::<SystemClock>().unwrap(), SystemClock::Local);
        assert!("gmt".parse::<SystemClock>().is_err());
    }

    #[test]
    fn fixed_clock_reports_its_date() {
        assert_eq!(FixedClock(date(2024, 5, 1)).today(), date(2024, 5, 1));
    }
}
