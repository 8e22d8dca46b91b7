use crate::building::{Building, BuildingOutcome};
use crate::fixed::Seconds;
use crate::geometry::Point;
use crate::id::{BuildingTypeId, CityTypeId, GoodId};
use crate::inventory::Inventory;
use crate::registry::{BuildingTypeDef, CityTypeDef, GoodOffer, Registry};

/// A city: fixed position, trade offers from its type, a stock of goods and
/// the buildings the player bought there.
#[derive(Debug, Clone)]
pub struct City {
    pub name: String,
    pub city_type: CityTypeId,
    pub position: Point,
    pub inventory: Inventory,
    buildings: Vec<Building>,
}

/// A building whose update did something this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildingReport {
    /// Index into [`City::buildings`].
    pub index: usize,
    pub building_type: BuildingTypeId,
    pub outcome: BuildingOutcome,
}

impl City {
    pub fn new(name: impl Into<String>, city_type: CityTypeId, position: Point) -> Self {
        Self {
            name: name.into(),
            city_type,
            position,
            inventory: Inventory::new(),
            buildings: Vec::new(),
        }
    }

    fn type_def<'r>(&self, registry: &'r Registry) -> Option<&'r CityTypeDef> {
        registry.get_city_type(self.city_type)
    }

    /// True iff the city buys `good` from transports.
    pub fn can_buy(&self, registry: &Registry, good: GoodId) -> bool {
        self.buy_offer(registry, good).is_some()
    }

    /// True iff the city sells `good` to transports.
    pub fn can_sell(&self, registry: &Registry, good: GoodId) -> bool {
        self.sell_offer(registry, good).is_some()
    }

    pub fn buy_offer<'r>(&self, registry: &'r Registry, good: GoodId) -> Option<&'r GoodOffer> {
        self.type_def(registry)?.buy_offer(good)
    }

    pub fn sell_offer<'r>(&self, registry: &'r Registry, good: GoodId) -> Option<&'r GoodOffer> {
        self.type_def(registry)?.sell_offer(good)
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    /// Append a new idle building. Returns its index.
    pub fn add_building(&mut self, building_type: BuildingTypeId) -> usize {
        self.buildings.push(Building::new(building_type));
        self.buildings.len() - 1
    }

    /// Building types that may be bought here. Every city offers the full catalog.
    pub fn available_buildings<'r>(
        &self,
        registry: &'r Registry,
    ) -> impl Iterator<Item = (BuildingTypeId, &'r BuildingTypeDef)> {
        registry.building_types()
    }

    /// Advance every building in purchase order against this city's inventory.
    pub fn update(&mut self, registry: &Registry, delta: Seconds) -> Vec<BuildingReport> {
        let mut reports = Vec::new();
        for (index, building) in self.buildings.iter_mut().enumerate() {
            let Some(def) = registry.get_building_type(building.building_type()) else {
                continue;
            };
            let outcome = building.update(def, &mut self.inventory, delta);
            if outcome != BuildingOutcome::Unchanged {
                reports.push(BuildingReport {
                    index,
                    building_type: building.building_type(),
                    outcome,
                });
            }
        }
        reports
    }
}
