//! Player intents queued for the next tick.
//!
//! Hosts push commands whenever input arrives; the world drains the queue
//! at the start of its next update, in submission order, so intents never
//! interleave with a half-finished tick.

use crate::id::{BuildingTypeId, CityId, GoodId, LinkId, TransportId};
use crate::order::{CityAction, Endpoint};

// ---------------------------------------------------------------------------
// Command enum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Buy a transport parked at `city`, which must be an endpoint of `link`.
    BuyTransport { city: CityId, link: LinkId },
    /// Buy a building in `city`.
    BuyBuilding {
        city: CityId,
        building_type: BuildingTypeId,
    },
    /// Append an order.
    PushOrder {
        transport: TransportId,
        endpoint: Endpoint,
        order: CityAction,
    },
    /// Replace the order for `order.good`, or append it.
    SetOrder {
        transport: TransportId,
        endpoint: Endpoint,
        order: CityAction,
    },
    RemoveOrder {
        transport: TransportId,
        endpoint: Endpoint,
        good: GoodId,
    },
    /// Step the order for `good` to the next action in the cycle.
    CycleOrder {
        transport: TransportId,
        endpoint: Endpoint,
        good: GoodId,
    },
}

// ---------------------------------------------------------------------------
// CommandQueue
// ---------------------------------------------------------------------------

/// Pending commands plus an optional bounded history of executed ones.
#[derive(Debug, Default)]
pub struct CommandQueue {
    pending: Vec<Command>,
    /// (tick, command) pairs, oldest first.
    history: Vec<(u64, Command)>,
    /// 0 = no history.
    max_history: usize,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep up to `max_history` executed commands.
    pub fn with_max_history(max_history: usize) -> Self {
        Self {
            max_history,
            ..Self::default()
        }
    }

    pub fn push(&mut self, command: Command) {
        self.pending.push(command);
    }

    pub fn push_batch(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.pending.extend(commands);
    }

    /// Take every pending command in submission order, recording them in
    /// the history under `tick`.
    pub fn drain(&mut self, tick: u64) -> Vec<Command> {
        let commands = std::mem::take(&mut self.pending);

        if self.max_history > 0 {
            self.history
                .extend(commands.iter().cloned().map(|cmd| (tick, cmd)));
            let excess = self.history.len().saturating_sub(self.max_history);
            self.history.drain(..excess);
        }

        commands
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn history(&self) -> &[(u64, Command)] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids() -> (CityId, LinkId) {
        let mut cities = SlotMap::<CityId, ()>::with_key();
        let mut links = SlotMap::<LinkId, ()>::with_key();
        (cities.insert(()), links.insert(()))
    }

    #[test]
    fn drain_returns_commands_in_submission_order() {
        let (city, link) = ids();
        let mut queue = CommandQueue::new();
        queue.push(Command::BuyTransport { city, link });
        queue.push_batch([
            Command::BuyBuilding {
                city,
                building_type: BuildingTypeId(1),
            },
            Command::BuyBuilding {
                city,
                building_type: BuildingTypeId(2),
            },
        ]);
        assert_eq!(queue.pending_count(), 3);

        let drained = queue.drain(0);
        assert!(matches!(drained[0], Command::BuyTransport { .. }));
        assert_eq!(
            drained[2],
            Command::BuyBuilding {
                city,
                building_type: BuildingTypeId(2)
            }
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn no_history_by_default() {
        let (city, link) = ids();
        let mut queue = CommandQueue::new();
        queue.push(Command::BuyTransport { city, link });
        queue.drain(5);
        assert!(queue.history().is_empty());
    }

    #[test]
    fn history_is_bounded() {
        let (city, link) = ids();
        let mut queue = CommandQueue::with_max_history(2);
        for tick in 0..3 {
            queue.push(Command::BuyTransport { city, link });
            queue.drain(tick);
        }
        let ticks: Vec<u64> = queue.history().iter().map(|(t, _)| *t).collect();
        assert_eq!(ticks, [1, 2]);

        queue.clear_history();
        assert!(queue.history().is_empty());
    }
}
