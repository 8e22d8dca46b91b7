//! Wainwright Core -- the simulation engine for a trade-route game.
//!
//! Cities sell and buy goods at fixed prices and run production buildings.
//! Transports (wains, boats) shuttle back and forth on a single link between
//! two cities, executing standing orders each time they leave a city. All
//! trades draw on one shared money pool.
//!
//! # Tick Pipeline
//!
//! Each call to [`world::World::update`] advances the simulation by `delta`
//! seconds:
//!
//! 1. **Commands** -- Apply queued player intents in submission order.
//! 2. **Clock** -- Advance elapsed simulation time.
//! 3. **Transports** -- Wait, depart (executing orders) or travel, in
//!    purchase order.
//! 4. **Cities** -- Buildings consume ingredients and produce goods, in city
//!    creation order.
//! 5. **Events** -- Deliver buffered events to subscribers.
//! 6. **Bookkeeping** -- Increment the tick counter.
//!
//! # Key Types
//!
//! - [`world::World`] -- Owns all entities and runs the pipeline.
//! - [`registry::Registry`] -- Immutable catalog of goods, city types,
//!   building types and transport types (frozen at startup).
//! - [`transport::Transport`] -- Waiting/traveling state machine with
//!   per-endpoint order lists.
//! - [`order::TransportAction`] -- BUY, SELL, DROP and TAKE.
//! - [`fixed::Seconds`] -- Q32.32 fixed-point simulation time.
//! - [`event::EventBus`] -- Ring-buffered events with end-of-tick delivery.
//! - [`command_queue::CommandQueue`] -- Player intents applied between ticks.

pub mod building;
pub mod city;
pub mod command_queue;
pub mod config;
pub mod event;
pub mod fixed;
pub mod geometry;
pub mod id;
pub mod inventory;
pub mod link;
pub mod order;
pub mod query;
pub mod registry;
pub mod rng;
pub mod sim;
pub mod transport;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
