//! Data-driven world seeding: catalog, cities and links read from RON, JSON
//! or TOML files, plus the bundled default world.

pub mod loader;
pub mod schema;

pub use loader::{
    DataLoadError, build_world, default_world, default_world_data, load_config, load_world,
};
