//! Standing trade orders attached to one endpoint of a transport's link.

use crate::id::GoodId;
use serde::{Deserialize, Serialize};

/// What a transport does with a good when it leaves a city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportAction {
    /// Pay the city's selling price and load the good.
    Buy,
    /// Unload the cargo for the city's buying price.
    Sell,
    /// Unload one carried unit into the city's inventory.
    Drop,
    /// Load one unit from the city's inventory.
    Take,
}

impl TransportAction {
    /// Order of execution at a departure. Unloading runs before loading so
    /// a single-slot cargo can be emptied and refilled at the same stop.
    pub const EXECUTION_ORDER: [TransportAction; 4] = [
        TransportAction::Sell,
        TransportAction::Drop,
        TransportAction::Buy,
        TransportAction::Take,
    ];

    /// Order the editor steps through when an order is clicked repeatedly.
    pub const CYCLE: [TransportAction; 4] = [
        TransportAction::Buy,
        TransportAction::Sell,
        TransportAction::Drop,
        TransportAction::Take,
    ];

    /// The next action in [`Self::CYCLE`], or `None` after the last one.
    pub fn next_in_cycle(self) -> Option<TransportAction> {
        let i = Self::CYCLE.iter().position(|&a| a == self)?;
        Self::CYCLE.get(i + 1).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            TransportAction::Buy => "BUY",
            TransportAction::Sell => "SELL",
            TransportAction::Drop => "DROP",
            TransportAction::Take => "TAKE",
        }
    }
}

/// A standing order: apply `action` to `good` at every departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityAction {
    pub good: GoodId,
    pub action: TransportAction,
}

impl CityAction {
    pub fn new(good: GoodId, action: TransportAction) -> Self {
        Self { good, action }
    }
}

/// Which end of a link an order list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    First,
    Second,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_walks_all_actions_then_ends() {
        let mut action = TransportAction::CYCLE[0];
        let mut seen = vec![action];
        while let Some(next) = action.next_in_cycle() {
            seen.push(next);
            action = next;
        }
        assert_eq!(
            seen,
            [
                TransportAction::Buy,
                TransportAction::Sell,
                TransportAction::Drop,
                TransportAction::Take
            ]
        );
    }

    #[test]
    fn execution_order_unloads_first() {
        assert_eq!(TransportAction::EXECUTION_ORDER[0], TransportAction::Sell);
        assert_eq!(TransportAction::EXECUTION_ORDER[1], TransportAction::Drop);
    }

    #[test]
    fn labels() {
        assert_eq!(TransportAction::Take.label(), "TAKE");
    }
}
