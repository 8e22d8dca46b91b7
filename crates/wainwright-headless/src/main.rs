//! Headless runner: loads a world, sets up a trade route on every link,
//! runs it twice and checks both runs end in the same state.
//!
//! ```text
//! wainwright-headless [WORLD] [--seconds N] [--step S] [--config FILE]
//! ```
//!
//! Without `WORLD` the bundled default world is used. `RUST_LOG` controls
//! log output (default `info`).

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tracing::info;
use tracing_subscriber::{EnvFilter, prelude::*};
use wainwright_core::order::{CityAction, TransportAction};
use wainwright_core::world::World;
use wainwright_data::loader::{build_world, load_world_data};
use wainwright_data::{default_world_data, load_config};

struct Args {
    world: Option<PathBuf>,
    config: Option<PathBuf>,
    seconds: f64,
    step: f64,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        world: None,
        config: None,
        seconds: 120.0,
        step: 1.0 / 60.0,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--seconds" => args.seconds = number(&mut it, "--seconds")?,
            "--step" => args.step = number(&mut it, "--step")?,
            "--config" => {
                args.config = Some(it.next().context("--config needs a file")?.into());
            }
            flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
            path => args.world = Some(path.into()),
        }
    }
    if !(args.step > 0.0 && args.step.is_finite()) {
        bail!("--step must be positive");
    }
    Ok(args)
}

fn number(it: &mut impl Iterator<Item = String>, flag: &str) -> Result<f64> {
    let raw = it.next().with_context(|| format!("{flag} needs a value"))?;
    raw.parse().with_context(|| format!("{flag}: '{raw}' is not a number"))
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();
}

// ===========================================================================
// Scenario
// ===========================================================================

fn build(args: &Args) -> Result<World> {
    let (data, label) = match &args.world {
        Some(path) => (
            load_world_data(path).with_context(|| format!("loading {}", path.display()))?,
            path.clone(),
        ),
        None => (default_world_data()?, PathBuf::from("default_world.ron")),
    };
    let config = match &args.config {
        Some(path) => load_config(path).with_context(|| format!("loading {}", path.display()))?,
        None => data.config.clone(),
    };
    Ok(build_world(&data, config, &label)?)
}

/// One transport per link, starting at the link's first city. At each end
/// it sells whatever that city buys and buys whatever the city sells that
/// the other end buys.
fn script_trade_routes(world: &mut World) -> Result<()> {
    let links: Vec<_> = world.links().map(|(id, l)| (id, l.first(), l.second())).collect();

    for (link, first, second) in links {
        let transport = world.buy_transport(first, link)?;
        for (here, there) in [(first, second), (second, first)] {
            let endpoint = world.endpoint_for(transport, here)?;
            for good in world.tradeable_goods(link, here)? {
                let registry = world.registry();
                let (here_city, there_city) = match (world.city(here), world.city(there)) {
                    (Some(h), Some(t)) => (h, t),
                    _ => bail!("link {link:?} refers to a missing city"),
                };
                let action = if here_city.can_buy(registry, good) {
                    TransportAction::Sell
                } else if here_city.can_sell(registry, good) && there_city.can_buy(registry, good) {
                    TransportAction::Buy
                } else {
                    continue;
                };
                world.set_order(transport, endpoint, CityAction::new(good, action))?;
            }
        }
    }
    Ok(())
}

struct RunSummary {
    hash: u64,
    money: i64,
    ticks: u64,
    trades: usize,
    arrivals: usize,
    failed_commands: usize,
}

fn run(args: &Args) -> Result<(World, RunSummary)> {
    let mut world = build(args)?;
    script_trade_routes(&mut world)?;

    let steps = (args.seconds / args.step).round() as u64;
    let (mut trades, mut arrivals, mut failed_commands) = (0, 0, 0);
    for _ in 0..steps {
        let report = world.update_secs(args.step);
        trades += report.trades.len();
        arrivals += report.arrivals.len();
        failed_commands += report.command_errors.len();
    }

    let summary = RunSummary {
        hash: world.state_hash(),
        money: world.money(),
        ticks: world.tick(),
        trades,
        arrivals,
        failed_commands,
    };
    Ok((world, summary))
}

fn print_world(world: &World) {
    let registry = world.registry();
    let good_name = |g| registry.get_good(g).map_or("?", |d| d.name.as_str());

    for (id, city) in world.cities() {
        let stock: Vec<String> = city
            .inventory
            .iter()
            .map(|s| format!("{} x{}", good_name(s.good), s.quantity))
            .collect();
        println!(
            "  [{:>10}] links={}, buildings={}, stock=[{}]",
            city.name,
            world.neighbours(id).len(),
            city.buildings().len(),
            stock.join(", ")
        );
    }
    for snap in world.snapshot_transports() {
        let at = world.city(snap.location).map_or("?", |c| c.name.as_str());
        let to = world.city(snap.destination).map_or("?", |c| c.name.as_str());
        let cargo = snap.cargo.map_or("-", good_name);
        let state = if snap.waiting { "waiting in" } else { "leaving" };
        println!(
            "  transport {state} {at} (towards {to}), cargo={cargo}, pos=({:.0}, {:.0})",
            snap.position.x, snap.position.y
        );
    }
}

fn main() -> Result<()> {
    init_logging();
    let args = parse_args()?;

    let (world, first) = run(&args)?;
    info!(ticks = first.ticks, "first run finished");
    println!(
        "After {:.1} s ({} ticks): money = {}, trades = {}, arrivals = {}, failed commands = {}",
        world.elapsed_secs(),
        first.ticks,
        first.money,
        first.trades,
        first.arrivals,
        first.failed_commands
    );
    print_world(&world);
    println!("  state hash = {:#018x}", first.hash);

    let (_, second) = run(&args)?;
    if first.hash != second.hash {
        bail!(
            "determinism check failed: {:#018x} != {:#018x}",
            first.hash,
            second.hash
        );
    }
    println!("Determinism: PASS (hashes match)");
    Ok(())
}
