//! # Configuration
//!
//! [`OrchestratorConfig`] carries the timing and batching knobs. By default the first poll
//! happens immediately, then every 15 seconds, one order per cycle, no cycle
//! deadline.
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `ORDER_ORCHESTRATOR_POLL_INTERVAL_SECS` | `poll_interval` | `15` |
//! | `ORDER_ORCHESTRATOR_INITIAL_DELAY_SECS` | `initial_delay` | `0` |
//! | `ORDER_ORCHESTRATOR_BATCH_SIZE` | `batch_size` | `1` |
//! | `ORDER_ORCHESTRATOR_CYCLE_TIMEOUT_SECS` | `cycle_timeout` | unset |
//! | `ORDER_ORCHESTRATOR_BUS_BUFFER` | `bus_buffer` | `64` |
//!
//! Durations are whole seconds, at most [`MAX_TIMING_SECS`]. The bus buffer is at most
//! [`MAX_BUS_BUFFER`].

use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;

pub const POLL_INTERVAL_VAR: &str = "ORDER_ORCHESTRATOR_POLL_INTERVAL_SECS";
pub const INITIAL_DELAY_VAR: &str = "ORDER_ORCHESTRATOR_INITIAL_DELAY_SECS";
pub const BATCH_SIZE_VAR: &str = "ORDER_ORCHESTRATOR_BATCH_SIZE";
pub const CYCLE_TIMEOUT_VAR: &str = "ORDER_ORCHESTRATOR_CYCLE_TIMEOUT_SECS";
pub const BUS_BUFFER_VAR: &str = "ORDER_ORCHESTRATOR_BUS_BUFFER";

/// Upper bound for every duration setting (one year).
pub const MAX_TIMING_SECS: u64 = 365 * 24 * 60 * 60;
/// Largest capacity a tokio channel accepts.
pub const MAX_BUS_BUFFER: usize = Semaphore::MAX_PERMITS;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a non-negative integer, got {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },

    #[error("{key} must be at most {max}, got {value}")]
    TooLarge {
        key: &'static str,
        value: u64,
        max: u64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Time between two firings.
    pub poll_interval: Duration,
    /// Time before the first firing.
    pub initial_delay: Duration,
    /// Maximum orders fetched and forwarded per cycle.
    pub batch_size: usize,
    /// Deadline for a whole cycle; `None` means unbounded.
    pub cycle_timeout: Option<Duration>,
    /// Capacity of the in-memory bus channel.
    pub bus_buffer: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(15),
            initial_delay: Duration::ZERO,
            batch_size: 1,
            cycle_timeout: None,
            bus_buffer: 64,
        }
    }
}

impl OrchestratorConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(secs) = parse(&lookup, POLL_INTERVAL_VAR)? {
            let secs = non_zero(POLL_INTERVAL_VAR, secs)?;
            config.poll_interval =
                Duration::from_secs(at_most(POLL_INTERVAL_VAR, secs, MAX_TIMING_SECS)?);
        }
        if let Some(secs) = parse(&lookup, INITIAL_DELAY_VAR)? {
            config.initial_delay =
                Duration::from_secs(at_most(INITIAL_DELAY_VAR, secs, MAX_TIMING_SECS)?);
        }
        if let Some(size) = parse(&lookup, BATCH_SIZE_VAR)? {
            config.batch_size = to_usize(BATCH_SIZE_VAR, non_zero(BATCH_SIZE_VAR, size)?)?;
        }
        if let Some(secs) = parse(&lookup, CYCLE_TIMEOUT_VAR)? {
            let secs = non_zero(CYCLE_TIMEOUT_VAR, secs)?;
            config.cycle_timeout = Some(Duration::from_secs(at_most(
                CYCLE_TIMEOUT_VAR,
                secs,
                MAX_TIMING_SECS,
            )?));
        }
        if let Some(buffer) = parse(&lookup, BUS_BUFFER_VAR)? {
            let buffer = to_usize(BUS_BUFFER_VAR, non_zero(BUS_BUFFER_VAR, buffer)?)?;
            config.bus_buffer = check_bus_buffer(buffer)?;
        }

        Ok(config)
    }
}

fn parse(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<u64>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

fn non_zero(key: &'static str, value: u64) -> Result<u64, ConfigError> {
    if value == 0 {
        Err(ConfigError::Zero { key })
    } else {
        Ok(value)
    }
}

fn at_most(key: &'static str, value: u64, max: u64) -> Result<u64, ConfigError> {
    if value > max {
        Err(ConfigError::TooLarge { key, value, max })
    } else {
        Ok(value)
    }
}

fn to_usize(key: &'static str, value: u64) -> Result<usize, ConfigError> {
    usize::try_from(value).map_err(|_| ConfigError::TooLarge {
        key,
        value,
        max: usize::MAX as u64,
    })
}

/// Rejects a bus buffer the in-memory channel cannot be created with.
pub fn check_bus_buffer(buffer: usize) -> Result<usize, ConfigError> {
    if buffer > MAX_BUS_BUFFER {
        Err(ConfigError::TooLarge {
            key: BUS_BUFFER_VAR,
            value: buffer as u64,
            max: MAX_BUS_BUFFER as u64,
        })
    } else {
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = OrchestratorConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, OrchestratorConfig::default());
        assert_eq!(config.poll_interval, Duration::from_secs(15));
        assert_eq!(config.initial_delay, Duration::ZERO);
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.cycle_timeout, None);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = OrchestratorConfig::from_lookup(lookup_from(&[
            (POLL_INTERVAL_VAR, "5"),
            (INITIAL_DELAY_VAR, "2"),
            (BATCH_SIZE_VAR, " 10 "),
            (CYCLE_TIMEOUT_VAR, "30"),
            (BUS_BUFFER_VAR, "8"),
        ]))
        .unwrap();

        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.initial_delay, Duration::from_secs(2));
        assert_eq!(config.batch_size, 10);
        assert_eq!(config.cycle_timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.bus_buffer, 8);
    }

    #[test]
    fn test_malformed_value_is_rejected() {
        let err = OrchestratorConfig::from_lookup(lookup_from(&[(BATCH_SIZE_VAR, "many")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: BATCH_SIZE_VAR,
                value: "many".to_string()
            }
        );
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let err = OrchestratorConfig::from_lookup(lookup_from(&[(POLL_INTERVAL_VAR, "0")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Zero { key: POLL_INTERVAL_VAR });
    }

    #[test]
    fn test_huge_initial_delay_is_rejected() {
        let err = OrchestratorConfig::from_lookup(lookup_from(&[(
            INITIAL_DELAY_VAR,
            &u64::MAX.to_string(),
        )]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::TooLarge {
                key: INITIAL_DELAY_VAR,
                value: u64::MAX,
                max: MAX_TIMING_SECS
            }
        );
    }

    #[test]
    fn test_huge_poll_interval_and_timeout_are_rejected() {
        let too_long = (MAX_TIMING_SECS + 1).to_string();
        for key in [POLL_INTERVAL_VAR, CYCLE_TIMEOUT_VAR] {
            let err =
                OrchestratorConfig::from_lookup(lookup_from(&[(key, &too_long)])).unwrap_err();
            assert!(matches!(err, ConfigError::TooLarge { key: k, .. } if k == key));
        }
    }

    #[test]
    fn test_longest_accepted_delay_is_one_year() {
        let config = OrchestratorConfig::from_lookup(lookup_from(&[(
            INITIAL_DELAY_VAR,
            &MAX_TIMING_SECS.to_string(),
        )]))
        .unwrap();
        assert_eq!(config.initial_delay, Duration::from_secs(MAX_TIMING_SECS));
    }

    #[test]
    fn test_bus_buffer_above_channel_capacity_is_rejected() {
        let err = OrchestratorConfig::from_lookup(lookup_from(&[(
            BUS_BUFFER_VAR,
            &u64::MAX.to_string(),
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge { key: BUS_BUFFER_VAR, .. }));
        assert!(check_bus_buffer(MAX_BUS_BUFFER).is_ok());
        assert!(check_bus_buffer(MAX_BUS_BUFFER + 1).is_err());
    }

    #[test]
    fn test_zero_initial_delay_is_allowed() {
        let config =
            OrchestratorConfig::from_lookup(lookup_from(&[(INITIAL_DELAY_VAR, "0")])).unwrap();
        assert_eq!(config.initial_delay, Duration::ZERO);
    }
}
