//! Reads world files, resolves names and builds a ready-to-run `World`.
//!
//! The format (RON, JSON or TOML) is picked from the file extension.

use crate::schema::WorldData;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;
use wainwright_core::config::SimConfig;
use wainwright_core::fixed::Seconds;
use wainwright_core::geometry::Point;
use wainwright_core::id::{CityId, GoodId};
use wainwright_core::registry::{GoodOffer, Registry, RegistryBuilder, RegistryError};
use wainwright_core::world::{World, WorldError};

const DEFAULT_WORLD: &str = include_str!("../data/default_world.ron");

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error("unresolved {expected_kind} reference '{name}' in {file}")]
    UnresolvedRef {
        file: PathBuf,
        name: String,
        expected_kind: &'static str,
    },

    #[error("duplicate {kind} name '{name}' in {file}")]
    DuplicateName {
        file: PathBuf,
        kind: &'static str,
        name: String,
    },

    #[error("invalid value in {file}: {detail}")]
    InvalidValue { file: PathBuf, detail: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    World(#[from] WorldError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Deserialize `content` as `format`. `file` only labels errors.
pub fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    file: &Path,
) -> Result<T, DataLoadError> {
    let parse_error = |detail: String| DataLoadError::Parse {
        file: file.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Read a file and deserialize it according to its extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

pub fn load_world_data(path: &Path) -> Result<WorldData, DataLoadError> {
    deserialize_file(path)
}

/// Read a standalone [`SimConfig`]. Missing fields keep their defaults.
pub fn load_config(path: &Path) -> Result<SimConfig, DataLoadError> {
    deserialize_file(path)
}

/// Load a world file and build it with the file's own config.
pub fn load_world(path: &Path) -> Result<World, DataLoadError> {
    let data = load_world_data(path)?;
    let config = data.config.clone();
    build_world(&data, config, path)
}

/// The four-city map the game ships with.
pub fn default_world_data() -> Result<WorldData, DataLoadError> {
    deserialize_str(DEFAULT_WORLD, Format::Ron, Path::new("default_world.ron"))
}

pub fn default_world() -> Result<World, DataLoadError> {
    let data = default_world_data()?;
    let config = data.config.clone();
    build_world(&data, config, Path::new("default_world.ron"))
}

// ===========================================================================
// Name resolution
// ===========================================================================

fn resolve<V: Copy>(
    map: &HashMap<String, V>,
    name: &str,
    file: &Path,
    expected_kind: &'static str,
) -> Result<V, DataLoadError> {
    map.get(name).copied().ok_or_else(|| DataLoadError::UnresolvedRef {
        file: file.to_path_buf(),
        name: name.to_string(),
        expected_kind,
    })
}

/// Insert `name -> value`, failing if the name is taken.
fn insert_unique<V>(
    map: &mut HashMap<String, V>,
    name: &str,
    value: V,
    file: &Path,
    kind: &'static str,
) -> Result<(), DataLoadError> {
    if map.insert(name.to_string(), value).is_some() {
        return Err(DataLoadError::DuplicateName {
            file: file.to_path_buf(),
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

fn production_time(seconds: f64, building: &str, file: &Path) -> Result<Seconds, DataLoadError> {
    Seconds::checked_from_num(seconds)
        .filter(|_| seconds.is_finite() && seconds >= 0.0)
        .ok_or_else(|| DataLoadError::InvalidValue {
            file: file.to_path_buf(),
            detail: format!("building '{building}' has production time {seconds}"),
        })
}

// ===========================================================================
// Building
// ===========================================================================

/// Resolve the catalog sections of `data` into a registry.
pub fn build_registry(data: &WorldData, file: &Path) -> Result<Registry, DataLoadError> {
    let mut b = RegistryBuilder::new();

    let mut goods: HashMap<String, GoodId> = HashMap::new();
    for good in &data.goods {
        let icon = good
            .icon
            .clone()
            .unwrap_or_else(|| good.name.to_lowercase());
        let id = b.register_good(&good.name, &good.description, &icon);
        insert_unique(&mut goods, &good.name, id, file, "good")?;
    }

    let mut transport_types = HashMap::new();
    for tt in &data.transport_types {
        let id = b.register_transport_type(&tt.name, &tt.sprite);
        insert_unique(&mut transport_types, &tt.name, id, file, "transport type")?;
    }

    let mut city_types = HashMap::new();
    for ct in &data.city_types {
        let offers = |list: &[crate::schema::OfferData]| {
            list.iter()
                .map(|o| {
                    Ok(GoodOffer {
                        good: resolve(&goods, o.good(), file, "good")?,
                        price: o.price(),
                    })
                })
                .collect::<Result<Vec<_>, DataLoadError>>()
        };
        let id = b.register_city_type(&ct.name, offers(&ct.selling)?, offers(&ct.buying)?);
        insert_unique(&mut city_types, &ct.name, id, file, "city type")?;
    }

    let mut building_types = HashMap::new();
    for bt in &data.building_types {
        let ingredients = bt
            .ingredients
            .iter()
            .map(|name| resolve(&goods, name, file, "good"))
            .collect::<Result<Vec<_>, _>>()?;
        let result = resolve(&goods, &bt.result, file, "good")?;
        let time = production_time(bt.production_time, &bt.name, file)?;
        let id = b.register_building_type(&bt.name, bt.price, ingredients, result, time);
        insert_unique(&mut building_types, &bt.name, id, file, "building type")?;
    }

    Ok(b.build()?)
}

/// Build a world from `data`, running it with `config` instead of the
/// file's own config section.
pub fn build_world(data: &WorldData, config: SimConfig, file: &Path) -> Result<World, DataLoadError> {
    let registry = build_registry(data, file)?;
    let mut world = World::new(registry, config)?;

    let mut cities: HashMap<String, CityId> = HashMap::new();
    for city in &data.cities {
        let city_type = world
            .registry()
            .city_type_id(&city.city_type)
            .ok_or_else(|| DataLoadError::UnresolvedRef {
                file: file.to_path_buf(),
                name: city.city_type.clone(),
                expected_kind: "city type",
            })?;
        let id = world.add_city(&city.name, city_type, Point::new(city.x, city.y))?;
        insert_unique(&mut cities, &city.name, id, file, "city")?;

        for stock in &city.stock {
            let good = world
                .registry()
                .good_id(&stock.good)
                .ok_or_else(|| DataLoadError::UnresolvedRef {
                    file: file.to_path_buf(),
                    name: stock.good.clone(),
                    expected_kind: "good",
                })?;
            world.add_stock(id, good, i64::from(stock.quantity))?;
        }
    }

    for link in &data.links {
        let first = resolve(&cities, &link.first, file, "city")?;
        let second = resolve(&cities, &link.second, file, "city")?;
        let transport_type = world
            .registry()
            .transport_type_id(&link.transport_type)
            .ok_or_else(|| DataLoadError::UnresolvedRef {
                file: file.to_path_buf(),
                name: link.transport_type.clone(),
                expected_kind: "transport type",
            })?;
        world.add_link(first, second, transport_type)?;
    }

    info!(
        file = %file.display(),
        cities = world.city_count(),
        links = world.link_count(),
        "world loaded"
    );
    Ok(world)
}
