//! Loading worlds from every supported format.

use std::path::{Path, PathBuf};
use wainwright_core::order::{CityAction, TransportAction};
use wainwright_data::loader::{Format, build_world, deserialize_str, load_config, load_world};
use wainwright_data::schema::WorldData;
use wainwright_data::{DataLoadError, default_world, default_world_data};

const TOML_WORLD: &str = r#"
goods = [{ name = "Fish" }, { name = "Ingot" }]
transport_types = [{ name = "Caravan", sprite = "wain" }]

[[city_types]]
name = "Coastal"
selling = [["Fish", 20]]
buying = [{ good = "Ingot", price = 60 }]

[[city_types]]
name = "Mountain"
selling = [["Ingot", 30]]
buying = [["Fish", 40]]

[[cities]]
name = "Harbor"
city_type = "Coastal"
x = 0.0
y = 0.0
stock = [{ good = "Fish", quantity = 3 }]

[[cities]]
name = "Peak"
city_type = "Mountain"
x = 100.0
y = 0.0

[[links]]
first = "Harbor"
second = "Peak"
transport_type = "Caravan"

[config]
starting_money = 250
"#;

const JSON_WORLD: &str = r#"{
    "goods": [{"name": "Fish"}],
    "transport_types": [{"name": "Boat", "sprite": "boat"}],
    "city_types": [{"name": "Coastal", "selling": [["Fish", 20]]}],
    "cities": [
        {"name": "A", "city_type": "Coastal", "x": 0, "y": 0},
        {"name": "B", "city_type": "Coastal", "x": 0, "y": 50}
    ],
    "links": [{"first": "A", "second": "B", "transport_type": "Boat"}]
}"#;

fn parse(content: &str, format: Format) -> WorldData {
    deserialize_str(content, format, Path::new("test")).unwrap()
}

fn build(data: &WorldData) -> Result<wainwright_core::world::World, DataLoadError> {
    build_world(data, data.config.clone(), Path::new("test"))
}

fn temp_file(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("wainwright-{}-{name}", std::process::id()));
    std::fs::write(&path, content).unwrap();
    path
}

// ===========================================================================
// Formats
// ===========================================================================

#[test]
fn toml_world_resolves_names_and_stock() {
    let data = parse(TOML_WORLD, Format::Toml);
    let world = build(&data).unwrap();

    assert_eq!(world.money(), 250);
    let harbor = world.city_by_name("Harbor").unwrap();
    let fish = world.registry().good_id("Fish").unwrap();
    assert_eq!(world.city(harbor).unwrap().inventory.quantity(fish), 3);

    let ingot = world.registry().good_id("Ingot").unwrap();
    let offer = world.city(harbor).unwrap().buy_offer(world.registry(), ingot).unwrap();
    assert_eq!(offer.price, 60);
}

#[test]
fn json_world_with_defaults() {
    let data = parse(JSON_WORLD, Format::Json);
    let world = build(&data).unwrap();
    assert_eq!(world.money(), 1000);
    assert_eq!(world.link_count(), 1);
    let fish = world.registry().good_id("Fish").unwrap();
    assert_eq!(world.registry().get_good(fish).unwrap().icon, "fish");
}

#[test]
fn files_load_by_extension() {
    let path = temp_file("world.json", JSON_WORLD);
    let world = load_world(&path).unwrap();
    assert_eq!(world.city_count(), 2);
    std::fs::remove_file(&path).unwrap();

    let config = temp_file("config.toml", "transport_speed = 100.0\n");
    let loaded = load_config(&config).unwrap();
    assert_eq!(loaded.transport_speed, 100.0);
    assert_eq!(loaded.waiting_time, 2.0);
    std::fs::remove_file(&config).unwrap();
}

#[test]
fn unknown_extension_is_rejected() {
    assert!(matches!(
        load_world(Path::new("world.yaml")),
        Err(DataLoadError::UnsupportedFormat { .. })
    ));
}

#[test]
fn syntax_errors_name_the_file() {
    let err = deserialize_str::<WorldData>("{", Format::Json, Path::new("broken.json")).unwrap_err();
    assert!(err.to_string().starts_with("parse error in broken.json"));
}

// ===========================================================================
// Resolution errors
// ===========================================================================

#[test]
fn unknown_good_in_offer() {
    let mut data = parse(JSON_WORLD, Format::Json);
    data.city_types[0].selling.push(wainwright_data::schema::OfferData::Short("Gold".into(), 5));
    match build(&data) {
        Err(DataLoadError::UnresolvedRef {
            name,
            expected_kind,
            ..
        }) => {
            assert_eq!(name, "Gold");
            assert_eq!(expected_kind, "good");
        }
        other => panic!("expected unresolved good, got {other:?}"),
    }
}

#[test]
fn unknown_city_in_link() {
    let mut data = parse(JSON_WORLD, Format::Json);
    data.links[0].second = "Atlantis".into();
    assert!(matches!(
        build(&data),
        Err(DataLoadError::UnresolvedRef { expected_kind: "city", .. })
    ));
}

#[test]
fn duplicate_city_names() {
    let mut data = parse(JSON_WORLD, Format::Json);
    data.cities[1].name = "A".into();
    assert!(matches!(
        build(&data),
        Err(DataLoadError::DuplicateName { kind: "city", .. })
    ));
}

#[test]
fn cities_sharing_a_position_cannot_be_linked() {
    let mut data = parse(JSON_WORLD, Format::Json);
    data.cities[1].y = 0.0;
    assert!(matches!(build(&data), Err(DataLoadError::World(_))));
}

// ===========================================================================
// Default world
// ===========================================================================

#[test]
fn default_world_round_trips_through_json() {
    let data = default_world_data().unwrap();
    let json = serde_json::to_string(&data).unwrap();
    let again: WorldData = serde_json::from_str(&json).unwrap();
    let world = build(&again).unwrap();
    assert_eq!(world.city_count(), 4);
}

#[test]
fn default_world_trades_fish_from_del_arrah_to_telesee() {
    let mut world = default_world().unwrap();
    let del_arrah = world.city_by_name("Del'Arrah").unwrap();
    let telesee = world.city_by_name("Telesee").unwrap();
    let link = world.neighbours(telesee)[0];
    let fish = world.registry().good_id("Fish").unwrap();

    let t = world.buy_transport(del_arrah, link).unwrap();
    let at_del_arrah = world.endpoint_for(t, del_arrah).unwrap();
    let at_telesee = world.endpoint_for(t, telesee).unwrap();
    world
        .set_order(t, at_del_arrah, CityAction::new(fish, TransportAction::Buy))
        .unwrap();
    world
        .set_order(t, at_telesee, CityAction::new(fish, TransportAction::Sell))
        .unwrap();

    // ~161 px at 50 px/s plus 2 s waits: several round trips in a minute.
    for _ in 0..60 * 16 {
        world.update_secs(1.0 / 16.0);
    }
    assert!(world.money() > 1000, "each round trip nets 30");
}
