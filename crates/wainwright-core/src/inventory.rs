use crate::id::GoodId;
use serde::{Deserialize, Serialize};

/// A quantity of one good held by an inventory. Never zero while stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoodQuantity {
    pub good: GoodId,
    pub quantity: u32,
}

/// A city's stock of goods. A good without an entry has quantity 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    stacks: Vec<GoodQuantity>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    #[error("negative quantity {quantity} for good {good:?}")]
    NegativeQuantity { good: GoodId, quantity: i64 },
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of `good`. Fails without touching the inventory
    /// if `quantity` is negative.
    pub fn add_item(&mut self, good: GoodId, quantity: i64) -> Result<(), InventoryError> {
        let quantity = Self::check(good, quantity)?;
        self.deposit(good, quantity);
        Ok(())
    }

    /// Remove up to `quantity` units of `good`. Absent goods are a no-op.
    /// Fails without touching the inventory if `quantity` is negative.
    pub fn remove_item(&mut self, good: GoodId, quantity: i64) -> Result<(), InventoryError> {
        let quantity = Self::check(good, quantity)?;
        self.withdraw(good, quantity);
        Ok(())
    }

    fn check(good: GoodId, quantity: i64) -> Result<u32, InventoryError> {
        if quantity < 0 {
            return Err(InventoryError::NegativeQuantity { good, quantity });
        }
        Ok(u32::try_from(quantity).unwrap_or(u32::MAX))
    }

    /// Add units of `good`, saturating at `u32::MAX`.
    pub fn deposit(&mut self, good: GoodId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(stack) = self.stacks.iter_mut().find(|s| s.good == good) {
            stack.quantity = stack.quantity.saturating_add(quantity);
        } else {
            self.stacks.push(GoodQuantity { good, quantity });
        }
    }

    /// Remove units of `good`. Returns the amount actually removed.
    pub fn withdraw(&mut self, good: GoodId, quantity: u32) -> u32 {
        let Some(index) = self.stacks.iter().position(|s| s.good == good) else {
            return 0;
        };
        let stack = &mut self.stacks[index];
        let removed = quantity.min(stack.quantity);
        stack.quantity -= removed;
        if stack.quantity == 0 {
            self.stacks.remove(index);
        }
        removed
    }

    /// True iff at least `quantity` units of `good` are held.
    pub fn has(&self, good: GoodId, quantity: u32) -> bool {
        self.quantity(good) >= quantity
    }

    pub fn quantity(&self, good: GoodId) -> u32 {
        self.stacks
            .iter()
            .find(|s| s.good == good)
            .map(|s| s.quantity)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// Total units across all goods.
    pub fn total(&self) -> u64 {
        self.stacks.iter().map(|s| s.quantity as u64).sum()
    }

    /// Held goods in the order they first arrived.
    pub fn iter(&self) -> impl Iterator<Item = &GoodQuantity> {
        self.stacks.iter()
    }
}
