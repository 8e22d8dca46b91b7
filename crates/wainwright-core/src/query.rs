//! Owned snapshots of simulation state for renderers and UI.
//!
//! Nothing here borrows from the world, so snapshots can be kept across
//! ticks and diffed.

use crate::building::BuildingState;
use crate::fixed::{Fixed64, Seconds};
use crate::geometry::Point;
use crate::id::{BuildingTypeId, CityId, CityTypeId, GoodId, LinkId, TransportId};
use crate::inventory::GoodQuantity;
use crate::order::CityAction;

// ---------------------------------------------------------------------------
// City snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CitySnapshot {
    pub id: CityId,
    pub name: String,
    pub city_type: CityTypeId,
    pub position: Point,
    pub inventory: Vec<GoodQuantity>,
    pub buildings: Vec<BuildingSnapshot>,
    pub links: Vec<LinkId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingSnapshot {
    pub building_type: BuildingTypeId,
    pub state: BuildingState,
    /// Fraction of the production cycle done, 0 when idle.
    pub progress: f64,
}

impl BuildingSnapshot {
    pub(crate) fn new(building_type: BuildingTypeId, state: BuildingState, production_time: Seconds) -> Self {
        let progress = match state {
            BuildingState::Idle => 0.0,
            BuildingState::Working { time_remaining } if production_time > Seconds::ZERO => {
                let done = production_time.saturating_sub(time_remaining);
                (done.to_num::<f64>() / production_time.to_num::<f64>()).clamp(0.0, 1.0)
            }
            BuildingState::Working { .. } => 1.0,
        };
        Self {
            building_type,
            state,
            progress,
        }
    }
}

// ---------------------------------------------------------------------------
// Transport snapshot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TransportSnapshot {
    pub id: TransportId,
    pub link: LinkId,
    /// The city waited in, or the one most recently left.
    pub location: CityId,
    /// The city at the other end of the link.
    pub destination: CityId,
    pub waiting: bool,
    /// Link fraction covered, 0 while waiting.
    pub advancement: Fixed64,
    pub cargo: Option<GoodId>,
    pub position: Point,
    pub faces_left: bool,
    pub first_city_actions: Vec<CityAction>,
    pub second_city_actions: Vec<CityAction>,
}
