use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a city in the world.
    pub struct CityId;

    /// Identifies a link (road or sea lane) between two cities.
    pub struct LinkId;

    /// Identifies a transport (wain, boat) bought by the player.
    pub struct TransportId;
}

/// Identifies a good in the registry. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GoodId(pub u32);

/// Identifies a city type (its selling and buying offers) in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CityTypeId(pub u32);

/// Identifies a building type in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildingTypeId(pub u32);

/// Identifies a transport type (caravan, boat) in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransportTypeId(pub u32);
