use crate::fixed::Seconds;
use crate::id::*;
use std::collections::HashMap;

/// A tradeable good (fish, ingot, wood).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoodDef {
    pub name: String,
    pub description: String,
    /// Key the presentation layer uses to pick an icon.
    pub icon: String,
}

/// A city's fixed-price willingness to buy or sell one good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GoodOffer {
    pub good: GoodId,
    pub price: u32,
}

/// A city type: which goods its cities sell to transports and which they buy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityTypeDef {
    pub name: String,
    /// Goods the city sells to a transport (the transport pays).
    pub selling: Vec<GoodOffer>,
    /// Goods the city buys from a transport (the transport is paid).
    pub buying: Vec<GoodOffer>,
}

impl CityTypeDef {
    /// First buying offer for `good`.
    pub fn buy_offer(&self, good: GoodId) -> Option<&GoodOffer> {
        self.buying.iter().find(|o| o.good == good)
    }

    /// First selling offer for `good`.
    pub fn sell_offer(&self, good: GoodId) -> Option<&GoodOffer> {
        self.selling.iter().find(|o| o.good == good)
    }
}

/// A production building template.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildingTypeDef {
    pub name: String,
    pub price: u32,
    /// One unit of each entry is consumed per production cycle.
    pub ingredients: Vec<GoodId>,
    pub result: GoodId,
    pub production_time: Seconds,
}

/// A transport type. Only changes presentation; every type moves at the same speed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportTypeDef {
    pub name: String,
    pub sprite_key: String,
}

/// Builder for constructing an immutable Registry.
/// Two-phase lifecycle: registration -> finalization.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    goods: Vec<GoodDef>,
    good_name_to_id: HashMap<String, GoodId>,
    city_types: Vec<CityTypeDef>,
    city_type_name_to_id: HashMap<String, CityTypeId>,
    buildings: Vec<BuildingTypeDef>,
    building_name_to_id: HashMap<String, BuildingTypeId>,
    transport_types: Vec<TransportTypeDef>,
    transport_type_name_to_id: HashMap<String, TransportTypeId>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a good. Returns its ID.
    pub fn register_good(&mut self, name: &str, description: &str, icon: &str) -> GoodId {
        let id = GoodId(self.goods.len() as u32);
        self.goods.push(GoodDef {
            name: name.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
        });
        self.good_name_to_id.insert(name.to_string(), id);
        id
    }

    /// Register a transport type. Returns its ID.
    pub fn register_transport_type(&mut self, name: &str, sprite_key: &str) -> TransportTypeId {
        let id = TransportTypeId(self.transport_types.len() as u32);
        self.transport_types.push(TransportTypeDef {
            name: name.to_string(),
            sprite_key: sprite_key.to_string(),
        });
        self.transport_type_name_to_id.insert(name.to_string(), id);
        id
    }

    /// Register a city type with its selling and buying offers. Returns its ID.
    pub fn register_city_type(
        &mut self,
        name: &str,
        selling: Vec<GoodOffer>,
        buying: Vec<GoodOffer>,
    ) -> CityTypeId {
        let id = CityTypeId(self.city_types.len() as u32);
        self.city_types.push(CityTypeDef {
            name: name.to_string(),
            selling,
            buying,
        });
        self.city_type_name_to_id.insert(name.to_string(), id);
        id
    }

    /// Register a building type. Returns its ID.
    pub fn register_building_type(
        &mut self,
        name: &str,
        price: u32,
        ingredients: Vec<GoodId>,
        result: GoodId,
        production_time: Seconds,
    ) -> BuildingTypeId {
        let id = BuildingTypeId(self.buildings.len() as u32);
        self.buildings.push(BuildingTypeDef {
            name: name.to_string(),
            price,
            ingredients,
            result,
            production_time,
        });
        self.building_name_to_id.insert(name.to_string(), id);
        id
    }

    /// Lookup good ID by name.
    pub fn good_id(&self, name: &str) -> Option<GoodId> {
        self.good_name_to_id.get(name).copied()
    }

    /// Finalize and build the immutable registry.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let good_count = self.goods.len();
        let check = |good: GoodId| {
            if good.0 as usize >= good_count {
                Err(RegistryError::InvalidGoodRef(good))
            } else {
                Ok(())
            }
        };

        for city_type in &self.city_types {
            for offer in city_type.selling.iter().chain(city_type.buying.iter()) {
                check(offer.good)?;
            }
        }
        for building in &self.buildings {
            for &good in building.ingredients.iter().chain(std::iter::once(&building.result)) {
                check(good)?;
            }
            if building.production_time < Seconds::ZERO {
                return Err(RegistryError::NegativeProductionTime(building.name.clone()));
            }
        }

        Ok(Registry {
            goods: self.goods,
            good_name_to_id: self.good_name_to_id,
            city_types: self.city_types,
            city_type_name_to_id: self.city_type_name_to_id,
            buildings: self.buildings,
            building_name_to_id: self.building_name_to_id,
            transport_types: self.transport_types,
            transport_type_name_to_id: self.transport_type_name_to_id,
        })
    }
}

/// Immutable catalog of goods, city types, building types and transport
/// types. Frozen after build().
#[derive(Debug)]
pub struct Registry {
    goods: Vec<GoodDef>,
    good_name_to_id: HashMap<String, GoodId>,
    city_types: Vec<CityTypeDef>,
    city_type_name_to_id: HashMap<String, CityTypeId>,
    buildings: Vec<BuildingTypeDef>,
    building_name_to_id: HashMap<String, BuildingTypeId>,
    transport_types: Vec<TransportTypeDef>,
    transport_type_name_to_id: HashMap<String, TransportTypeId>,
}

impl Registry {
    pub fn get_good(&self, id: GoodId) -> Option<&GoodDef> {
        self.goods.get(id.0 as usize)
    }

    pub fn get_city_type(&self, id: CityTypeId) -> Option<&CityTypeDef> {
        self.city_types.get(id.0 as usize)
    }

    pub fn get_building_type(&self, id: BuildingTypeId) -> Option<&BuildingTypeDef> {
        self.buildings.get(id.0 as usize)
    }

    pub fn get_transport_type(&self, id: TransportTypeId) -> Option<&TransportTypeDef> {
        self.transport_types.get(id.0 as usize)
    }

    pub fn good_id(&self, name: &str) -> Option<GoodId> {
        self.good_name_to_id.get(name).copied()
    }

    pub fn city_type_id(&self, name: &str) -> Option<CityTypeId> {
        self.city_type_name_to_id.get(name).copied()
    }

    pub fn building_type_id(&self, name: &str) -> Option<BuildingTypeId> {
        self.building_name_to_id.get(name).copied()
    }

    pub fn transport_type_id(&self, name: &str) -> Option<TransportTypeId> {
        self.transport_type_name_to_id.get(name).copied()
    }

    /// All goods in registration order.
    pub fn goods(&self) -> impl Iterator<Item = (GoodId, &GoodDef)> {
        self.goods
            .iter()
            .enumerate()
            .map(|(i, def)| (GoodId(i as u32), def))
    }

    /// All building types in registration order.
    pub fn building_types(&self) -> impl Iterator<Item = (BuildingTypeId, &BuildingTypeDef)> {
        self.buildings
            .iter()
            .enumerate()
            .map(|(i, def)| (BuildingTypeId(i as u32), def))
    }

    pub fn good_count(&self) -> usize {
        self.goods.len()
    }

    pub fn city_type_count(&self) -> usize {
        self.city_types.len()
    }

    pub fn building_type_count(&self) -> usize {
        self.buildings.len()
    }

    pub fn transport_type_count(&self) -> usize {
        self.transport_types.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid good reference: {0:?}")]
    InvalidGoodRef(GoodId),
    #[error("building type '{0}' has a negative production time")]
    NegativeProductionTime(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64;

    fn setup_builder() -> RegistryBuilder {
        let mut b = RegistryBuilder::new();
        let fish = b.register_good("Fish", "Caught along the coast", "fish");
        let ingot = b.register_good("Ingot", "Smelted in the mountains", "ingot");
        let wood = b.register_good("Wood", "Felled in the forest", "wood");
        b.register_transport_type("Caravan", "wain");
        b.register_city_type(
            "Coastal",
            vec![GoodOffer { good: fish, price: 20 }],
            vec![GoodOffer { good: ingot, price: 60 }],
        );
        b.register_building_type("Smelter", 200, vec![wood], ingot, f64_to_fixed64(5.0));
        b
    }

    #[test]
    fn register_and_build() {
        let reg = setup_builder().build().unwrap();
        assert_eq!(reg.good_count(), 3);
        assert_eq!(reg.city_type_count(), 1);
        assert_eq!(reg.building_type_count(), 1);
        assert_eq!(reg.transport_type_count(), 1);
    }

    #[test]
    fn lookup_by_name() {
        let reg = setup_builder().build().unwrap();
        assert_eq!(reg.good_id("Ingot"), Some(GoodId(1)));
        assert!(reg.good_id("Spice").is_none());
        assert!(reg.city_type_id("Coastal").is_some());
        assert!(reg.building_type_id("Smelter").is_some());
        assert!(reg.transport_type_id("Caravan").is_some());
    }

    #[test]
    fn offers_resolve_first_match() {
        let mut b = RegistryBuilder::new();
        let fish = b.register_good("Fish", "", "fish");
        let ct = b.register_city_type(
            "Twice",
            vec![
                GoodOffer { good: fish, price: 10 },
                GoodOffer { good: fish, price: 99 },
            ],
            vec![],
        );
        let reg = b.build().unwrap();
        let city_type = reg.get_city_type(ct).unwrap();
        assert_eq!(city_type.sell_offer(fish).map(|o| o.price), Some(10));
        assert!(city_type.buy_offer(fish).is_none());
    }

    #[test]
    fn invalid_good_ref_in_offer_fails() {
        let mut b = RegistryBuilder::new();
        b.register_city_type(
            "Broken",
            vec![GoodOffer {
                good: GoodId(999),
                price: 1,
            }],
            vec![],
        );
        match b.build() {
            Err(RegistryError::InvalidGoodRef(id)) => assert_eq!(id, GoodId(999)),
            other => panic!("expected InvalidGoodRef, got: {other:?}"),
        }
    }

    #[test]
    fn invalid_building_result_fails() {
        let mut b = RegistryBuilder::new();
        b.register_building_type("Nowhere", 1, vec![], GoodId(5), f64_to_fixed64(1.0));
        assert!(matches!(b.build(), Err(RegistryError::InvalidGoodRef(_))));
    }

    #[test]
    fn negative_production_time_fails() {
        let mut b = RegistryBuilder::new();
        let wood = b.register_good("Wood", "", "wood");
        b.register_building_type("Backwards", 1, vec![], wood, f64_to_fixed64(-1.0));
        let err = b.build().unwrap_err();
        assert!(format!("{err}").contains("Backwards"), "got: {err}");
    }

    #[test]
    fn iterators_follow_registration_order() {
        let reg = setup_builder().build().unwrap();
        let names: Vec<&str> = reg.goods().map(|(_, g)| g.name.as_str()).collect();
        assert_eq!(names, ["Fish", "Ingot", "Wood"]);
        let (id, def) = reg.building_types().next().unwrap();
        assert_eq!(id, BuildingTypeId(0));
        assert_eq!(def.name, "Smelter");
    }

    #[test]
    fn registry_get_nonexistent_returns_none() {
        let reg = setup_builder().build().unwrap();
        assert!(reg.get_good(GoodId(999)).is_none());
        assert!(reg.get_city_type(CityTypeId(999)).is_none());
        assert!(reg.get_building_type(BuildingTypeId(999)).is_none());
        assert!(reg.get_transport_type(TransportTypeId(999)).is_none());
    }

    #[test]
    fn empty_registry_builds_successfully() {
        let reg = RegistryBuilder::new().build().unwrap();
        assert_eq!(reg.good_count(), 0);
    }
}
