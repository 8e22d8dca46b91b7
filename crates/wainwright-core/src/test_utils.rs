//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::config::SimConfig;
use crate::fixed::{Seconds, f64_to_fixed64};
use crate::geometry::Point;
use crate::id::*;
use crate::registry::{GoodOffer, Registry, RegistryBuilder};
use crate::world::World;

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn secs(v: f64) -> Seconds {
    f64_to_fixed64(v)
}

// ===========================================================================
// Catalog
// ===========================================================================

/// A small catalog: three goods, two city types trading fish against
/// ingots, one transport type and three buildings.
pub struct TradeRegistry {
    pub registry: Registry,
    pub fish: GoodId,
    pub ingot: GoodId,
    pub wood: GoodId,
    pub caravan: TransportTypeId,
    /// Sells fish for 20, buys ingots for 60.
    pub coastal: CityTypeId,
    /// Sells ingots for 30, buys fish for 40.
    pub mountain: CityTypeId,
    /// Nothing -> fish, 150 money, 4 s.
    pub fishery: BuildingTypeId,
    /// Wood -> ingot, 200 money, 5 s.
    pub smelter: BuildingTypeId,
    /// Nothing -> wood, 100 money, 3 s.
    pub lumber_camp: BuildingTypeId,
}

pub fn trade_registry() -> TradeRegistry {
    let mut b = RegistryBuilder::new();
    let fish = b.register_good("Fish", "Caught along the coast", "fish");
    let ingot = b.register_good("Ingot", "Smelted in the mountains", "ingot");
    let wood = b.register_good("Wood", "Felled in the forest", "wood");
    let caravan = b.register_transport_type("Caravan", "wain");
    let coastal = b.register_city_type(
        "Coastal",
        vec![GoodOffer { good: fish, price: 20 }],
        vec![GoodOffer { good: ingot, price: 60 }],
    );
    let mountain = b.register_city_type(
        "Mountain",
        vec![GoodOffer { good: ingot, price: 30 }],
        vec![GoodOffer { good: fish, price: 40 }],
    );
    let fishery = b.register_building_type("Fishery", 150, vec![], fish, secs(4.0));
    let smelter = b.register_building_type("Smelter", 200, vec![wood], ingot, secs(5.0));
    let lumber_camp = b.register_building_type("Lumber camp", 100, vec![], wood, secs(3.0));

    TradeRegistry {
        registry: b.build().expect("test registry is valid"),
        fish,
        ingot,
        wood,
        caravan,
        coastal,
        mountain,
        fishery,
        smelter,
        lumber_camp,
    }
}

// ===========================================================================
// Worlds
// ===========================================================================

/// Two cities 100 px apart joined by one caravan link.
pub struct TwoCityWorld {
    pub world: World,
    /// "Del'Arrah", coastal, at (0, 0). First endpoint of `link`.
    pub a: CityId,
    /// "Keltos", mountain, at (100, 0). Second endpoint of `link`.
    pub b: CityId,
    pub link: LinkId,
    pub fish: GoodId,
    pub ingot: GoodId,
    pub wood: GoodId,
    pub caravan: TransportTypeId,
    pub coastal: CityTypeId,
    pub mountain: CityTypeId,
    pub fishery: BuildingTypeId,
    pub smelter: BuildingTypeId,
    pub lumber_camp: BuildingTypeId,
}

pub fn two_city_world() -> TwoCityWorld {
    two_city_world_with(SimConfig::default())
}

pub fn two_city_world_with(config: SimConfig) -> TwoCityWorld {
    let r = trade_registry();
    let mut world = World::new(r.registry, config).expect("test config is valid");
    let a = world
        .add_city("Del'Arrah", r.coastal, Point::new(0.0, 0.0))
        .expect("coastal is registered");
    let b = world
        .add_city("Keltos", r.mountain, Point::new(100.0, 0.0))
        .expect("mountain is registered");
    let link = world.add_link(a, b, r.caravan).expect("distinct cities");

    TwoCityWorld {
        world,
        a,
        b,
        link,
        fish: r.fish,
        ingot: r.ingot,
        wood: r.wood,
        caravan: r.caravan,
        coastal: r.coastal,
        mountain: r.mountain,
        fishery: r.fishery,
        smelter: r.smelter,
        lumber_camp: r.lumber_camp,
    }
}

/// Run `world` for `total` seconds in steps of `step`.
pub fn run_for(world: &mut World, total: f64, step: f64) {
    let steps = (total / step).round() as u64;
    let step = secs(step);
    for _ in 0..steps {
        world.update(step);
    }
}
