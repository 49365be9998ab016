use std::{env, time::Duration};

use log::*;
use reqwest::Url;

use crate::{
    cache_key::SystemClock,
    error::ConfigError,
    provider::{DEFAULT_PROVIDER_TIMEOUT, DEFAULT_PROVIDER_URL},
};

const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Clone, Debug)]
pub struct Config {
    /// Address the HTTP listener binds to, e.g. `0.0.0.0:8080`.
    pub bind: String,
    pub database_url: String,
    pub provider_url: Url,
    /// Upper bound on a single provider request, connect to last byte.
    pub provider_timeout: Duration,
    /// Which calendar decides when cache keys roll over.
    pub clock: SystemClock,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind = lookup("XRATE_BIND").unwrap_or_else(|| DEFAULT_BIND.into());
        let database_url = lookup("XRATE_DATABASE_URL")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("XRATE_DATABASE_URL"))?;
        let provider_url =
            lookup("XRATE_PROVIDER_URL").unwrap_or_else(|| DEFAULT_PROVIDER_URL.into());
        let provider_url = Url::parse(&provider_url).map_err(|e| ConfigError::Invalid {
            var: "XRATE_PROVIDER_URL",
            reason: e.to_string(),
        })?;
        let provider_timeout = lookup("XRATE_PROVIDER_TIMEOUT_SECS")
            .and_then(|s| match s.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    warn!(
                        "{s} is not a valid timeout for XRATE_PROVIDER_TIMEOUT_SECS. Using the \
                         default, {}s, instead.",
                        DEFAULT_PROVIDER_TIMEOUT.as_secs()
                    );
                    None
                }
            })
            .unwrap_or(DEFAULT_PROVIDER_TIMEOUT);
        let clock = match lookup("XRATE_CACHE_CLOCK") {
            Some(s) => s.parse::<SystemClock>()?,
            None => SystemClock::default(),
        };
        Ok(Self {
            bind,
            database_url,
            provider_url,
            provider_timeout,
            clock,
        })
    }
}
