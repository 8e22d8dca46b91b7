//! Production buildings: consume one unit of each ingredient from the
//! owning city's inventory, wait out the production time, then deposit one
//! unit of the result.

use crate::fixed::Seconds;
use crate::id::{BuildingTypeId, GoodId};
use crate::inventory::Inventory;
use crate::registry::BuildingTypeDef;

/// Runtime state of a building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BuildingState {
    #[default]
    Idle,
    Working { time_remaining: Seconds },
}

/// What a single `update` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildingOutcome {
    /// Nothing changed: still working, or idle and missing ingredients.
    Unchanged,
    /// Ingredients were consumed and a production cycle began.
    Started,
    /// The cycle finished and one unit of the result was deposited.
    Completed { good: GoodId },
}

/// A building owned by a city. The city's inventory is passed in on every call.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Building {
    building_type: BuildingTypeId,
    state: BuildingState,
}

impl Building {
    pub fn new(building_type: BuildingTypeId) -> Self {
        Self {
            building_type,
            state: BuildingState::Idle,
        }
    }

    pub fn building_type(&self) -> BuildingTypeId {
        self.building_type
    }

    pub fn state(&self) -> BuildingState {
        self.state
    }

    pub fn is_working(&self) -> bool {
        matches!(self.state, BuildingState::Working { .. })
    }

    /// Remaining production time, or `None` when idle.
    pub fn time_remaining(&self) -> Option<Seconds> {
        match self.state {
            BuildingState::Working { time_remaining } => Some(time_remaining),
            BuildingState::Idle => None,
        }
    }

    /// Start a production cycle if idle and every ingredient is available.
    /// Returns true if a cycle started.
    pub fn try_start(&mut self, def: &BuildingTypeDef, inventory: &mut Inventory) -> bool {
        if self.is_working() {
            return false;
        }

        let required = tally(&def.ingredients);
        if !required.iter().all(|&(good, n)| inventory.has(good, n)) {
            return false;
        }
        for &(good, n) in &required {
            inventory.withdraw(good, n);
        }

        self.state = BuildingState::Working {
            time_remaining: def.production_time,
        };
        true
    }

    /// Advance the building by `delta` seconds.
    pub fn update(
        &mut self,
        def: &BuildingTypeDef,
        inventory: &mut Inventory,
        delta: Seconds,
    ) -> BuildingOutcome {
        match self.state {
            BuildingState::Working { time_remaining } => {
                let time_remaining = time_remaining.saturating_sub(delta);
                if time_remaining < Seconds::ZERO {
                    inventory.deposit(def.result, 1);
                    self.state = BuildingState::Idle;
                    BuildingOutcome::Completed { good: def.result }
                } else {
                    self.state = BuildingState::Working { time_remaining };
                    BuildingOutcome::Unchanged
                }
            }
            BuildingState::Idle => {
                if self.try_start(def, inventory) {
                    BuildingOutcome::Started
                } else {
                    BuildingOutcome::Unchanged
                }
            }
        }
    }
}

/// Count ingredient entries per good so duplicates need one unit each.
fn tally(ingredients: &[GoodId]) -> Vec<(GoodId, u32)> {
    let mut counts: Vec<(GoodId, u32)> = Vec::with_capacity(ingredients.len());
    for &good in ingredients {
        match counts.iter_mut().find(|(g, _)| *g == good) {
            Some((_, n)) => *n += 1,
            None => counts.push((good, 1)),
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64;

    const WOOD: GoodId = GoodId(0);
    const ORE: GoodId = GoodId(1);
    const INGOT: GoodId = GoodId(2);

    fn smelter() -> BuildingTypeDef {
        BuildingTypeDef {
            name: "Smelter".to_string(),
            price: 200,
            ingredients: vec![WOOD, ORE],
            result: INGOT,
            production_time: f64_to_fixed64(3.0),
        }
    }

    fn stocked() -> Inventory {
        let mut inv = Inventory::new();
        inv.deposit(WOOD, 1);
        inv.deposit(ORE, 1);
        inv
    }

    #[test]
    fn try_start_consumes_one_of_each_ingredient() {
        let def = smelter();
        let mut inv = stocked();
        let mut building = Building::new(BuildingTypeId(0));

        assert!(building.try_start(&def, &mut inv));
        assert!(inv.is_empty());
        assert_eq!(building.time_remaining(), Some(f64_to_fixed64(3.0)));
    }

    #[test]
    fn try_start_without_ingredients_stays_idle() {
        let def = smelter();
        let mut inv = Inventory::new();
        inv.deposit(WOOD, 4);
        let mut building = Building::new(BuildingTypeId(0));

        assert!(!building.try_start(&def, &mut inv));
        assert_eq!(building.state(), BuildingState::Idle);
        assert_eq!(inv.quantity(WOOD), 4, "nothing consumed on a failed start");
    }

    #[test]
    fn try_start_while_working_is_a_no_op() {
        let def = smelter();
        let mut inv = stocked();
        inv.deposit(WOOD, 1);
        inv.deposit(ORE, 1);
        let mut building = Building::new(BuildingTypeId(0));

        assert!(building.try_start(&def, &mut inv));
        assert!(!building.try_start(&def, &mut inv));
        assert_eq!(inv.quantity(WOOD), 1);
    }

    #[test]
    fn duplicate_ingredients_need_one_unit_each() {
        let def = BuildingTypeDef {
            ingredients: vec![WOOD, WOOD],
            ..smelter()
        };
        let mut inv = Inventory::new();
        inv.deposit(WOOD, 1);
        let mut building = Building::new(BuildingTypeId(0));
        assert!(!building.try_start(&def, &mut inv));

        inv.deposit(WOOD, 1);
        assert!(building.try_start(&def, &mut inv));
        assert!(inv.is_empty());
    }

    #[test]
    fn completes_after_production_time_elapses() {
        let def = smelter();
        let mut inv = stocked();
        let mut building = Building::new(BuildingTypeId(0));
        assert!(building.try_start(&def, &mut inv));

        let step = f64_to_fixed64(1.0);
        for _ in 0..3 {
            assert_eq!(building.update(&def, &mut inv, step), BuildingOutcome::Unchanged);
            assert_eq!(inv.quantity(INGOT), 0);
        }

        let outcome = building.update(&def, &mut inv, f64_to_fixed64(0.01));
        assert_eq!(outcome, BuildingOutcome::Completed { good: INGOT });
        assert_eq!(inv.quantity(INGOT), 1);
        assert!(!building.is_working());
    }

    #[test]
    fn idle_update_starts_and_completion_does_not_restart() {
        let def = smelter();
        let mut inv = stocked();
        inv.deposit(WOOD, 1);
        inv.deposit(ORE, 1);
        let mut building = Building::new(BuildingTypeId(0));

        assert_eq!(
            building.update(&def, &mut inv, f64_to_fixed64(1.0)),
            BuildingOutcome::Started
        );
        assert_eq!(
            building.update(&def, &mut inv, f64_to_fixed64(10.0)),
            BuildingOutcome::Completed { good: INGOT }
        );
        // Second batch of ingredients is still there until the next update.
        assert_eq!(inv.quantity(WOOD), 1);
        assert_eq!(
            building.update(&def, &mut inv, f64_to_fixed64(0.5)),
            BuildingOutcome::Started
        );
        assert_eq!(inv.quantity(WOOD), 0);
    }

    #[test]
    fn no_ingredients_means_perpetual_production() {
        let def = BuildingTypeDef {
            ingredients: vec![],
            ..smelter()
        };
        let mut inv = Inventory::new();
        let mut building = Building::new(BuildingTypeId(0));
        for _ in 0..4 {
            building.update(&def, &mut inv, f64_to_fixed64(3.5));
        }
        assert_eq!(inv.quantity(INGOT), 2);
    }
}
