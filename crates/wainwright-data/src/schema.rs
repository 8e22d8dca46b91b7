//! Serde structs for world files.
//!
//! Everything refers to other entries by name; the loader resolves names
//! into registry and world ids.

use serde::{Deserialize, Serialize};
use wainwright_core::config::SimConfig;

// ===========================================================================
// World file
// ===========================================================================

/// A complete world: catalog, map and (optionally) simulation constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldData {
    #[serde(default)]
    pub config: SimConfig,
    pub goods: Vec<GoodData>,
    pub transport_types: Vec<TransportTypeData>,
    pub city_types: Vec<CityTypeData>,
    #[serde(default)]
    pub building_types: Vec<BuildingTypeData>,
    pub cities: Vec<CityData>,
    #[serde(default)]
    pub links: Vec<LinkData>,
}

// ===========================================================================
// Catalog
// ===========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoodData {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Defaults to the lowercased name.
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportTypeData {
    pub name: String,
    pub sprite: String,
}

/// A price offer, in short tuple form or with named fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OfferData {
    /// `("Fish", 20)`
    Short(String, u32),
    Full { good: String, price: u32 },
}

impl OfferData {
    pub fn good(&self) -> &str {
        match self {
            OfferData::Short(good, _) | OfferData::Full { good, .. } => good,
        }
    }

    pub fn price(&self) -> u32 {
        match *self {
            OfferData::Short(_, price) | OfferData::Full { price, .. } => price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityTypeData {
    pub name: String,
    /// Goods the city sells to transports.
    #[serde(default)]
    pub selling: Vec<OfferData>,
    /// Goods the city buys from transports.
    #[serde(default)]
    pub buying: Vec<OfferData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingTypeData {
    pub name: String,
    pub price: u32,
    #[serde(default)]
    pub ingredients: Vec<String>,
    pub result: String,
    /// Seconds.
    pub production_time: f64,
}

// ===========================================================================
// Map
// ===========================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityData {
    pub name: String,
    pub city_type: String,
    pub x: f64,
    pub y: f64,
    /// Goods in the city's inventory at startup.
    #[serde(default)]
    pub stock: Vec<StockData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockData {
    pub good: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkData {
    pub first: String,
    pub second: String,
    pub transport_type: String,
}
