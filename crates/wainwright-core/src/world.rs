//! The world: owns every city, link and transport, the shared money pool
//! and the simulation clock, and runs the per-tick pipeline.
//!
//! # Tick Pipeline
//!
//! Each [`World::update`] runs:
//! 1. **Commands** -- apply queued player intents in submission order
//! 2. **Clock** -- advance elapsed time
//! 3. **Transports** -- update every transport in purchase order; departures
//!    execute standing orders
//! 4. **Cities** -- update every city's buildings in creation order
//! 5. **Events** -- deliver buffered events; reactive handlers queue
//!    commands for the next tick
//! 6. **Bookkeeping** -- advance the tick counter
//!
//! A paused world skips the whole pipeline.

use crate::city::City;
use crate::command_queue::{Command, CommandQueue};
use crate::config::{ConfigError, SimConfig, TransportParams};
use crate::event::{Event, EventBus, EventFilter, EventKind, PassiveListener, ReactiveHandler};
use crate::fixed::{self, Seconds, Ticks, fixed64_to_f64};
use crate::geometry::{self, OffsetSegment, Point};
use crate::id::*;
use crate::inventory::InventoryError;
use crate::link::{CityLink, LinkError};
use crate::order::{CityAction, Endpoint, TransportAction};
use crate::query::{BuildingSnapshot, CitySnapshot, TransportSnapshot};
use crate::registry::Registry;
use crate::rng::SimRng;
use crate::sim::{SimState, StateHash, TickReport};
use crate::building::{BuildingOutcome, BuildingState};
use crate::transport::{TradeContext, Transport, TransportState};
use slotmap::{Key, SlotMap};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WorldError {
    #[error("unknown city {0:?}")]
    UnknownCity(CityId),
    #[error("unknown link {0:?}")]
    UnknownLink(LinkId),
    #[error("unknown transport {0:?}")]
    UnknownTransport(TransportId),
    #[error("unknown good {0:?}")]
    UnknownGood(GoodId),
    #[error("unknown city type {0:?}")]
    UnknownCityType(CityTypeId),
    #[error("unknown transport type {0:?}")]
    UnknownTransportType(TransportTypeId),
    #[error("unknown building type {0:?}")]
    UnknownBuildingType(BuildingTypeId),
    #[error("{city} is not an endpoint of the link between {first} and {second}")]
    NotAnEndpoint {
        city: String,
        first: String,
        second: String,
    },
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

pub struct World {
    registry: Registry,
    config: SimConfig,
    params: TransportParams,

    cities: SlotMap<CityId, City>,
    /// Creation order; cities update in this order.
    city_order: Vec<CityId>,
    links: SlotMap<LinkId, CityLink>,
    link_order: Vec<LinkId>,
    transports: SlotMap<TransportId, Transport>,
    /// Purchase order; transports update in this order.
    transport_order: Vec<TransportId>,

    /// Shared by all transports. May go negative.
    money: i64,
    sim_state: SimState,
    rng: SimRng,
    events: EventBus,
    commands: CommandQueue,
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("cities", &self.cities.len())
            .field("links", &self.links.len())
            .field("transports", &self.transports.len())
            .field("money", &self.money)
            .field("sim_state", &self.sim_state)
            .finish_non_exhaustive()
    }
}

impl World {
    /// An empty world: no cities, no links, `config.starting_money` in the pool.
    pub fn new(registry: Registry, config: SimConfig) -> Result<Self, WorldError> {
        config.validate()?;
        Ok(Self {
            params: config.transport_params(),
            money: config.starting_money,
            rng: SimRng::new(config.rng_seed),
            events: EventBus::new(config.event_capacity),
            commands: CommandQueue::with_max_history(config.command_history),
            registry,
            config,
            cities: SlotMap::with_key(),
            city_order: Vec::new(),
            links: SlotMap::with_key(),
            link_order: Vec::new(),
            transports: SlotMap::with_key(),
            transport_order: Vec::new(),
            sim_state: SimState::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Seeding
    // -----------------------------------------------------------------------

    pub fn add_city(
        &mut self,
        name: impl Into<String>,
        city_type: CityTypeId,
        position: Point,
    ) -> Result<CityId, WorldError> {
        if self.registry.get_city_type(city_type).is_none() {
            return Err(WorldError::UnknownCityType(city_type));
        }
        let id = self.cities.insert(City::new(name, city_type, position));
        self.city_order.push(id);
        Ok(id)
    }

    pub fn add_link(
        &mut self,
        first: CityId,
        second: CityId,
        transport_type: TransportTypeId,
    ) -> Result<LinkId, WorldError> {
        if self.registry.get_transport_type(transport_type).is_none() {
            return Err(WorldError::UnknownTransportType(transport_type));
        }
        let first_position = self.city_ref(first)?.position;
        let second_position = self.city_ref(second)?.position;
        let link = CityLink::new(first, first_position, second, second_position, transport_type)?;
        let id = self.links.insert(link);
        self.link_order.push(id);
        Ok(id)
    }

    /// Put `quantity` units of `good` into a city's inventory.
    pub fn add_stock(&mut self, city: CityId, good: GoodId, quantity: i64) -> Result<(), WorldError> {
        self.check_good(good)?;
        self.city_mut_ref(city)?.inventory.add_item(good, quantity)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Purchases
    // -----------------------------------------------------------------------

    /// Buy a transport that starts parked at `city` on `link`. Its first
    /// orders execute almost immediately (after `initial_wait`).
    pub fn buy_transport(&mut self, city: CityId, link: LinkId) -> Result<TransportId, WorldError> {
        let link_ref = self.links.get(link).ok_or(WorldError::UnknownLink(link))?;
        let city_name = &self.city_ref(city)?.name;
        if !link_ref.contains(city) {
            return Err(WorldError::NotAnEndpoint {
                city: city_name.clone(),
                first: self.city_name(link_ref.first()),
                second: self.city_name(link_ref.second()),
            });
        }

        let jitter = geometry::jitter(
            &mut self.rng,
            self.params.jitter_radius_min,
            self.params.jitter_radius_range,
        );
        let id = self
            .transports
            .insert(Transport::new(link, city, self.params.initial_wait, jitter));
        self.transport_order.push(id);

        info!(transport = ?id, city = %self.city_name(city), "transport purchased");
        self.events.emit(Event::TransportPurchased {
            transport: id,
            link,
            city,
            tick: self.sim_state.tick,
        });
        Ok(id)
    }

    /// Buy a building in `city`, charging its price. Returns the building's
    /// index in the city.
    pub fn buy_building(
        &mut self,
        city: CityId,
        building_type: BuildingTypeId,
    ) -> Result<usize, WorldError> {
        let price = self
            .registry
            .get_building_type(building_type)
            .ok_or(WorldError::UnknownBuildingType(building_type))?
            .price;
        let index = self.city_mut_ref(city)?.add_building(building_type);

        let old = self.money;
        self.money = old.saturating_sub(i64::from(price));
        let tick = self.sim_state.tick;

        info!(city = %self.city_name(city), ?building_type, price, "building purchased");
        self.events.emit(Event::BuildingPurchased {
            city,
            building_type,
            index,
            tick,
        });
        self.events.emit(Event::MoneyChanged {
            old,
            new: self.money,
            tick,
        });
        Ok(index)
    }

    // -----------------------------------------------------------------------
    // Orders
    // -----------------------------------------------------------------------

    /// Which end of the transport's link `city` is.
    pub fn endpoint_for(&self, transport: TransportId, city: CityId) -> Result<Endpoint, WorldError> {
        let link = self.transport_link(transport)?;
        link.endpoint_of(city).ok_or_else(|| WorldError::NotAnEndpoint {
            city: self.city_name(city),
            first: self.city_name(link.first()),
            second: self.city_name(link.second()),
        })
    }

    pub fn push_order(
        &mut self,
        transport: TransportId,
        endpoint: Endpoint,
        order: CityAction,
    ) -> Result<(), WorldError> {
        self.check_good(order.good)?;
        self.transport_mut_ref(transport)?.push_order(endpoint, order);
        self.orders_changed(transport, endpoint);
        Ok(())
    }

    pub fn set_order(
        &mut self,
        transport: TransportId,
        endpoint: Endpoint,
        order: CityAction,
    ) -> Result<(), WorldError> {
        self.check_good(order.good)?;
        self.transport_mut_ref(transport)?.set_order(endpoint, order);
        self.orders_changed(transport, endpoint);
        Ok(())
    }

    pub fn remove_order(
        &mut self,
        transport: TransportId,
        endpoint: Endpoint,
        good: GoodId,
    ) -> Result<Option<CityAction>, WorldError> {
        let removed = self.transport_mut_ref(transport)?.remove_order(endpoint, good);
        if removed.is_some() {
            self.orders_changed(transport, endpoint);
        }
        Ok(removed)
    }

    /// Step the order for `good` through BUY, SELL, DROP, TAKE, then none.
    pub fn cycle_order(
        &mut self,
        transport: TransportId,
        endpoint: Endpoint,
        good: GoodId,
    ) -> Result<Option<TransportAction>, WorldError> {
        self.check_good(good)?;
        let action = self.transport_mut_ref(transport)?.cycle_order(endpoint, good);
        self.orders_changed(transport, endpoint);
        Ok(action)
    }

    fn orders_changed(&mut self, transport: TransportId, endpoint: Endpoint) {
        self.events.emit(Event::OrdersChanged {
            transport,
            endpoint,
            tick: self.sim_state.tick,
        });
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Queue a command for the start of the next update.
    pub fn submit(&mut self, command: Command) {
        self.commands.push(command);
    }

    pub fn submit_batch(&mut self, commands: impl IntoIterator<Item = Command>) {
        self.commands.push_batch(commands);
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.pending_count()
    }

    pub fn command_history(&self) -> &[(u64, Command)] {
        self.commands.history()
    }

    fn apply(&mut self, command: &Command) -> Result<(), WorldError> {
        match *command {
            Command::BuyTransport { city, link } => self.buy_transport(city, link).map(drop),
            Command::BuyBuilding {
                city,
                building_type,
            } => self.buy_building(city, building_type).map(drop),
            Command::PushOrder {
                transport,
                endpoint,
                order,
            } => self.push_order(transport, endpoint, order),
            Command::SetOrder {
                transport,
                endpoint,
                order,
            } => self.set_order(transport, endpoint, order),
            Command::RemoveOrder {
                transport,
                endpoint,
                good,
            } => self.remove_order(transport, endpoint, good).map(drop),
            Command::CycleOrder {
                transport,
                endpoint,
                good,
            } => self.cycle_order(transport, endpoint, good).map(drop),
        }
    }

    // -----------------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------------

    /// Advance the world by `delta` seconds of simulation time. A negative
    /// delta counts as zero.
    pub fn update(&mut self, delta: Seconds) -> TickReport {
        let delta = delta.max(Seconds::ZERO);
        let tick = self.sim_state.tick;
        if self.sim_state.paused {
            return TickReport {
                tick,
                skipped: true,
                ..TickReport::default()
            };
        }
        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };
        let money_before = self.money;

        self.phase_commands(tick, &mut report);
        self.sim_state.elapsed = self.sim_state.elapsed.saturating_add(delta);
        self.phase_transports(tick, delta, &mut report);
        self.phase_cities(tick, delta, &mut report);
        self.phase_events();

        self.sim_state.tick += 1;
        report.money_delta = self.money.saturating_sub(money_before);
        report
    }

    /// [`update`](Self::update) with a frame delta in seconds. Negative and
    /// NaN deltas count as zero.
    pub fn update_secs(&mut self, delta: f64) -> TickReport {
        self.update(fixed::seconds(delta))
    }

    fn phase_commands(&mut self, tick: Ticks, report: &mut TickReport) {
        for command in self.commands.drain(tick) {
            match self.apply(&command) {
                Ok(()) => report.commands_applied += 1,
                Err(err) => {
                    warn!(?command, %err, "queued command rejected");
                    report.command_errors.push((command, err.to_string()));
                }
            }
        }
    }

    fn phase_transports(&mut self, tick: Ticks, delta: Seconds, report: &mut TickReport) {
        let mut ctx = TradeContext {
            registry: &self.registry,
            cities: &mut self.cities,
            money: &mut self.money,
            rules: &self.config.trade_rules,
            params: &self.params,
            rng: &mut self.rng,
        };

        for &id in &self.transport_order {
            let Some(transport) = self.transports.get_mut(id) else {
                continue;
            };
            let Some(link) = self.links.get(transport.link()) else {
                continue;
            };
            let money_before = *ctx.money;
            let result = transport.update(link, &mut ctx, delta);

            let mut money = money_before;
            for trade in result.trades {
                self.events.emit(Event::TradeExecuted {
                    transport: id,
                    city: trade.city,
                    good: trade.good,
                    action: trade.action,
                    money_delta: trade.money_delta,
                    tick,
                });
                if trade.money_delta != 0 {
                    let new = money.saturating_add(trade.money_delta);
                    self.events.emit(Event::MoneyChanged {
                        old: money,
                        new,
                        tick,
                    });
                    money = new;
                }
                report.trades.push((id, trade));
            }
            if let Some(city) = result.departed_from {
                debug!(transport = ?id, ?city, "transport departed");
                self.events.emit(Event::TransportDeparted {
                    transport: id,
                    city,
                    tick,
                });
                report.departures.push((id, city));
            }
            if let Some(city) = result.arrived_at {
                debug!(transport = ?id, ?city, "transport arrived");
                self.events.emit(Event::TransportArrived {
                    transport: id,
                    city,
                    tick,
                });
                report.arrivals.push((id, city));
            }
        }
    }

    fn phase_cities(&mut self, tick: Ticks, delta: Seconds, report: &mut TickReport) {
        for &id in &self.city_order {
            let Some(city) = self.cities.get_mut(id) else {
                continue;
            };
            for building in city.update(&self.registry, delta) {
                match building.outcome {
                    BuildingOutcome::Started => {
                        debug!(city = %city.name, index = building.index, "production started");
                        self.events.emit(Event::ProductionStarted {
                            city: id,
                            index: building.index,
                            tick,
                        });
                        report.productions_started += 1;
                    }
                    BuildingOutcome::Completed { good } => {
                        debug!(city = %city.name, index = building.index, ?good, "production completed");
                        self.events.emit(Event::ProductionCompleted {
                            city: id,
                            index: building.index,
                            good,
                            tick,
                        });
                        report.productions_completed += 1;
                    }
                    BuildingOutcome::Unchanged => {}
                }
            }
        }
    }

    fn phase_events(&mut self) {
        self.events.deliver();
        let reactions = self.events.drain_commands();
        self.commands.push_batch(reactions);
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    pub fn pause(&mut self) {
        self.sim_state.paused = true;
    }

    pub fn resume(&mut self) {
        self.sim_state.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.sim_state.paused
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn on_event(&mut self, kind: EventKind, listener: PassiveListener) {
        self.events.on_passive(kind, listener);
    }

    pub fn on_event_filtered(&mut self, kind: EventKind, filter: EventFilter, listener: PassiveListener) {
        self.events.on_passive_filtered(kind, Some(filter), listener);
    }

    /// The handler's commands run at the start of the next update.
    pub fn on_event_reactive(&mut self, kind: EventKind, handler: ReactiveHandler) {
        self.events.on_reactive(kind, handler);
    }

    pub fn suppress_event(&mut self, kind: EventKind) {
        self.events.suppress(kind);
    }

    /// Events delivered at the end of the last update, in emission order.
    pub fn recent_events(&self) -> &[Event] {
        self.events.recent()
    }

    /// The last `event_capacity` delivered events of `kind`, oldest first.
    pub fn event_history(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.events.history(kind)
    }

    /// Delivered events of `kind` that no longer fit in the history.
    pub fn event_history_dropped(&self, kind: EventKind) -> u64 {
        self.events.history_dropped(kind)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn money(&self) -> i64 {
        self.money
    }

    pub fn tick(&self) -> Ticks {
        self.sim_state.tick
    }

    pub fn elapsed(&self) -> Seconds {
        self.sim_state.elapsed
    }

    pub fn sim_state(&self) -> &SimState {
        &self.sim_state
    }

    pub fn city(&self, id: CityId) -> Option<&City> {
        self.cities.get(id)
    }

    pub fn city_mut(&mut self, id: CityId) -> Option<&mut City> {
        self.cities.get_mut(id)
    }

    /// Cities in creation order.
    pub fn cities(&self) -> impl Iterator<Item = (CityId, &City)> {
        self.city_order
            .iter()
            .filter_map(|&id| self.cities.get(id).map(|c| (id, c)))
    }

    pub fn city_by_name(&self, name: &str) -> Option<CityId> {
        self.cities().find(|(_, c)| c.name == name).map(|(id, _)| id)
    }

    pub fn link(&self, id: LinkId) -> Option<&CityLink> {
        self.links.get(id)
    }

    /// Links in creation order.
    pub fn links(&self) -> impl Iterator<Item = (LinkId, &CityLink)> {
        self.link_order
            .iter()
            .filter_map(|&id| self.links.get(id).map(|l| (id, l)))
    }

    pub fn transport(&self, id: TransportId) -> Option<&Transport> {
        self.transports.get(id)
    }

    /// Transports in purchase order.
    pub fn transports(&self) -> impl Iterator<Item = (TransportId, &Transport)> {
        self.transport_order
            .iter()
            .filter_map(|&id| self.transports.get(id).map(|t| (id, t)))
    }

    pub fn city_count(&self) -> usize {
        self.cities.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn transport_count(&self) -> usize {
        self.transports.len()
    }

    /// Links touching `city`, in creation order.
    pub fn neighbours(&self, city: CityId) -> Vec<LinkId> {
        self.links()
            .filter(|(_, link)| link.contains(city))
            .map(|(id, _)| id)
            .collect()
    }

    /// The link drawn between its cities, pulled in at both ends by
    /// `link_radius_offset`.
    pub fn offset_link(&self, link: LinkId) -> Result<OffsetSegment, WorldError> {
        let link = self.links.get(link).ok_or(WorldError::UnknownLink(link))?;
        Ok(OffsetSegment::between(
            self.city_ref(link.first())?.position,
            self.city_ref(link.second())?.position,
            self.config.link_radius_offset,
        ))
    }

    /// Goods worth showing in an order editor for `city` on `link`: what
    /// either endpoint sells or buys, `city`'s own offers first, without
    /// duplicates.
    pub fn tradeable_goods(&self, link: LinkId, city: CityId) -> Result<Vec<GoodId>, WorldError> {
        let link_ref = self.links.get(link).ok_or(WorldError::UnknownLink(link))?;
        let here = self.city_ref(city)?;
        let Some(other) = link_ref.other(city) else {
            return Err(WorldError::NotAnEndpoint {
                city: here.name.clone(),
                first: self.city_name(link_ref.first()),
                second: self.city_name(link_ref.second()),
            });
        };
        let there = self.city_ref(other)?;

        let mut goods = Vec::new();
        for c in [here, there] {
            let Some(def) = self.registry.get_city_type(c.city_type) else {
                continue;
            };
            for offer in def.selling.iter().chain(&def.buying) {
                if !goods.contains(&offer.good) {
                    goods.push(offer.good);
                }
            }
        }
        Ok(goods)
    }

    /// Building types purchasable in `city`.
    pub fn available_buildings(&self, city: CityId) -> Result<Vec<BuildingTypeId>, WorldError> {
        let city = self.city_ref(city)?;
        Ok(city
            .available_buildings(&self.registry)
            .map(|(id, _)| id)
            .collect())
    }

    pub fn transport_coord(&self, transport: TransportId) -> Result<Point, WorldError> {
        let t = self.transport_ref(transport)?;
        let link_id = t.link();
        let link = self.links.get(link_id).ok_or(WorldError::UnknownLink(link_id))?;
        let position = self.city_ref(t.location())?.position;
        Ok(t.coord(link, position, &self.offset_link(link_id)?))
    }

    pub fn transport_faces_left(&self, transport: TransportId) -> Result<bool, WorldError> {
        let t = self.transport_ref(transport)?;
        let link = self.transport_link(transport)?;
        let destination = link.other(t.location()).unwrap_or(t.location());
        Ok(t.faces_left(
            self.city_ref(t.location())?.position,
            self.city_ref(destination)?.position,
        ))
    }

    pub fn snapshot_city(&self, id: CityId) -> Result<CitySnapshot, WorldError> {
        let city = self.city_ref(id)?;
        let buildings = city
            .buildings()
            .iter()
            .map(|b| {
                let production_time = self
                    .registry
                    .get_building_type(b.building_type())
                    .map_or(Seconds::ZERO, |def| def.production_time);
                BuildingSnapshot::new(b.building_type(), b.state(), production_time)
            })
            .collect();
        Ok(CitySnapshot {
            id,
            name: city.name.clone(),
            city_type: city.city_type,
            position: city.position,
            inventory: city.inventory.iter().copied().collect(),
            buildings,
            links: self.neighbours(id),
        })
    }

    pub fn snapshot_transport(&self, id: TransportId) -> Result<TransportSnapshot, WorldError> {
        let t = self.transport_ref(id)?;
        let link = self.transport_link(id)?;
        Ok(TransportSnapshot {
            id,
            link: t.link(),
            location: t.location(),
            destination: link.other(t.location()).unwrap_or(t.location()),
            waiting: t.is_waiting(),
            advancement: t.advancement(),
            cargo: t.cargo(),
            position: self.transport_coord(id)?,
            faces_left: self.transport_faces_left(id)?,
            first_city_actions: t.orders(Endpoint::First).to_vec(),
            second_city_actions: t.orders(Endpoint::Second).to_vec(),
        })
    }

    /// Snapshots of every transport in purchase order.
    pub fn snapshot_transports(&self) -> Vec<TransportSnapshot> {
        self.transport_order
            .iter()
            .filter_map(|&id| self.snapshot_transport(id).ok())
            .collect()
    }

    /// Simulated seconds as a float, for display.
    pub fn elapsed_secs(&self) -> f64 {
        fixed64_to_f64(self.sim_state.elapsed)
    }

    // -----------------------------------------------------------------------
    // State hash
    // -----------------------------------------------------------------------

    /// Hash of everything the simulation evolves: clock, money, RNG, city
    /// stocks and buildings, transport states, cargo and orders.
    pub fn state_hash(&self) -> u64 {
        let mut h = StateHash::new();
        h.write_u64(self.sim_state.tick);
        h.write_fixed64(self.sim_state.elapsed);
        h.write_i64(self.money);
        h.write_u64(self.rng.state());

        for (id, city) in self.cities() {
            h.write_u64(id.data().as_ffi());
            for stack in city.inventory.iter() {
                h.write_u32(stack.good.0);
                h.write_u32(stack.quantity);
            }
            for building in city.buildings() {
                h.write_u32(building.building_type().0);
                match building.state() {
                    BuildingState::Idle => h.write(&[0]),
                    BuildingState::Working { time_remaining } => {
                        h.write(&[1]);
                        h.write_fixed64(time_remaining);
                    }
                }
            }
        }

        for (id, t) in self.transports() {
            h.write_u64(id.data().as_ffi());
            h.write_u64(t.location().data().as_ffi());
            match t.state() {
                TransportState::Waiting { time_remaining } => {
                    h.write(&[0]);
                    h.write_fixed64(time_remaining);
                }
                TransportState::Traveling { advancement } => {
                    h.write(&[1]);
                    h.write_fixed64(advancement);
                }
            }
            h.write_u32(t.cargo().map_or(u32::MAX, |g| g.0));
            for endpoint in [Endpoint::First, Endpoint::Second] {
                for order in t.orders(endpoint) {
                    h.write_u32(order.good.0);
                    h.write(&[order.action as u8]);
                }
            }
        }

        h.finish()
    }

    // -----------------------------------------------------------------------
    // Lookup helpers
    // -----------------------------------------------------------------------

    fn city_ref(&self, id: CityId) -> Result<&City, WorldError> {
        self.cities.get(id).ok_or(WorldError::UnknownCity(id))
    }

    fn city_mut_ref(&mut self, id: CityId) -> Result<&mut City, WorldError> {
        self.cities.get_mut(id).ok_or(WorldError::UnknownCity(id))
    }

    fn city_name(&self, id: CityId) -> String {
        self.cities
            .get(id)
            .map_or_else(|| format!("{id:?}"), |c| c.name.clone())
    }

    fn transport_ref(&self, id: TransportId) -> Result<&Transport, WorldError> {
        self.transports.get(id).ok_or(WorldError::UnknownTransport(id))
    }

    fn transport_mut_ref(&mut self, id: TransportId) -> Result<&mut Transport, WorldError> {
        self.transports.get_mut(id).ok_or(WorldError::UnknownTransport(id))
    }

    fn transport_link(&self, id: TransportId) -> Result<&CityLink, WorldError> {
        let link = self.transport_ref(id)?.link();
        self.links.get(link).ok_or(WorldError::UnknownLink(link))
    }

    fn check_good(&self, good: GoodId) -> Result<(), WorldError> {
        match self.registry.get_good(good) {
            Some(_) => Ok(()),
            None => Err(WorldError::UnknownGood(good)),
        }
    }
}
