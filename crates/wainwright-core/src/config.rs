//! Tunable simulation constants.
//!
//! Every field has a default matching the original game, so a config file
//! only needs the values it overrides.

use crate::fixed::Seconds;
use serde::{Deserialize, Serialize};

/// How ambiguous trade orders behave.
///
/// Both defaults keep the lenient historical behaviour: SELL pays out for
/// whatever is carried (even nothing), and DROP leaves the cargo slot
/// occupied after unloading a unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeRules {
    /// SELL only succeeds when the cargo is exactly the ordered good.
    pub sell_requires_matching_cargo: bool,
    /// DROP empties the cargo slot after unloading.
    pub drop_clears_cargo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub starting_money: i64,
    /// Pixels per second along a link.
    pub transport_speed: f64,
    /// Seconds a transport waits in a city after arriving.
    pub waiting_time: f64,
    /// Wait before the first departure of a newly bought transport.
    pub initial_wait: f64,
    /// How far link segments are pulled in from the city centres.
    pub link_radius_offset: f64,
    pub jitter_radius_min: f64,
    pub jitter_radius_range: f64,
    pub rng_seed: u64,
    /// Delivered events kept per kind for `World::event_history`. Delivery
    /// itself is unbounded.
    pub event_capacity: usize,
    /// Executed commands kept for inspection. 0 disables history.
    pub command_history: usize,
    pub trade_rules: TradeRules,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            starting_money: 1000,
            transport_speed: 50.0,
            waiting_time: 2.0,
            initial_wait: 0.001,
            link_radius_offset: 40.0,
            jitter_radius_min: 30.0,
            jitter_radius_range: 10.0,
            rng_seed: 0x5EED,
            event_capacity: 1024,
            command_history: 0,
            trade_rules: TradeRules::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must be a non-negative finite number, got {value}")]
    Negative { field: &'static str, value: f64 },
}

/// Movement constants converted to simulation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransportParams {
    pub speed: Seconds,
    pub waiting_time: Seconds,
    pub initial_wait: Seconds,
    pub jitter_radius_min: f64,
    pub jitter_radius_range: f64,
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("transport_speed", self.transport_speed)?;
        positive("initial_wait", self.initial_wait)?;
        non_negative("waiting_time", self.waiting_time)?;
        non_negative("link_radius_offset", self.link_radius_offset)?;
        non_negative("jitter_radius_min", self.jitter_radius_min)?;
        non_negative("jitter_radius_range", self.jitter_radius_range)?;
        Ok(())
    }

    pub fn transport_params(&self) -> TransportParams {
        let to_seconds = |v: f64| Seconds::checked_from_num(v).unwrap_or(Seconds::MAX);
        TransportParams {
            speed: to_seconds(self.transport_speed),
            waiting_time: to_seconds(self.waiting_time),
            initial_wait: to_seconds(self.initial_wait),
            jitter_radius_min: self.jitter_radius_min,
            jitter_radius_range: self.jitter_radius_range,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    // A positive float can still round to zero in Q32.32.
    let representable = Seconds::checked_from_num(value).is_some_and(|v| v > Seconds::ZERO);
    if value.is_finite() && value > 0.0 && representable {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}
