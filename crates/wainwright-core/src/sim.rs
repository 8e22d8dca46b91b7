//! Simulation clock, per-tick reports and the state hash.

use crate::command_queue::Command;
use crate::fixed::{Fixed64, Seconds, Ticks};
use crate::id::{CityId, TransportId};
use crate::transport::TradeRecord;

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimState {
    /// Completed updates.
    pub tick: Ticks,
    /// Simulated seconds since the world was created.
    pub elapsed: Seconds,
    pub paused: bool,
}

impl SimState {
    pub fn new() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Tick report
// ---------------------------------------------------------------------------

/// What one `World::update` call did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// The tick this report describes.
    pub tick: Ticks,
    /// Queued commands that applied cleanly.
    pub commands_applied: usize,
    /// Queued commands that were rejected, with the reason.
    pub command_errors: Vec<(Command, String)>,
    pub departures: Vec<(TransportId, CityId)>,
    pub arrivals: Vec<(TransportId, CityId)>,
    pub trades: Vec<(TransportId, TradeRecord)>,
    pub productions_started: usize,
    pub productions_completed: usize,
    /// Net change to the money pool during this tick.
    pub money_delta: i64,
    /// True if the world was paused and nothing ran.
    pub skipped: bool,
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// FNV-1a (64-bit) over simulation state, for comparing runs. Not
/// cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_i64(&mut self, v: i64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_fixed64(&mut self, v: Fixed64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    /// Positions are hashed by bit pattern.
    pub fn write_f64(&mut self, v: f64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}
