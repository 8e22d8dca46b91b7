//! Transports shuttling back and forth on a single link.
//!
//! A transport alternates between two states:
//!
//! - **Waiting** in a city. When the wait runs out (the remaining time drops
//!   strictly below zero) the standing orders for that city execute, then
//!   the transport departs.
//! - **Traveling** along the link. `advancement` grows by
//!   `delta * speed / distance`; once it exceeds 1 the transport arrives at
//!   the other city and waits again.
//!
//! At most one state transition happens per update: any delta left over
//! after a departure or an arrival is discarded.
//!
//! Cargo is a single slot holding at most one unit of one good.

use crate::city::City;
use crate::config::{TradeRules, TransportParams};
use crate::fixed::{Fixed64, Seconds, checked_div_64, fixed64_to_f64};
use crate::geometry::{self, OffsetSegment, Point};
use crate::id::{CityId, GoodId, LinkId};
use crate::link::CityLink;
use crate::order::{CityAction, Endpoint, TransportAction};
use crate::registry::Registry;
use crate::rng::SimRng;
use slotmap::SlotMap;
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TransportState {
    Waiting { time_remaining: Seconds },
    /// `advancement` is the fraction of the link covered, in `[0, 1]`.
    Traveling { advancement: Fixed64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transport {
    link: LinkId,
    /// The city waited in, or the city most recently departed.
    location: CityId,
    state: TransportState,
    cargo: Option<GoodId>,
    first_city_actions: Vec<CityAction>,
    second_city_actions: Vec<CityAction>,
    /// Offset from the city centre while waiting.
    jitter: Point,
}

/// Everything a transport may read or mutate outside itself during an update.
pub(crate) struct TradeContext<'a> {
    pub registry: &'a Registry,
    pub cities: &'a mut SlotMap<CityId, City>,
    pub money: &'a mut i64,
    pub rules: &'a TradeRules,
    pub params: &'a TransportParams,
    pub rng: &'a mut SimRng,
}

/// One order that took effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeRecord {
    pub city: CityId,
    pub good: GoodId,
    pub action: TransportAction,
    /// Signed change to the money pool: negative for BUY, positive for SELL,
    /// zero for TAKE and DROP.
    pub money_delta: i64,
}

/// What a single `update` call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportReport {
    /// Set when the transport left this city (after its orders executed).
    pub departed_from: Option<CityId>,
    /// Set when the transport reached this city.
    pub arrived_at: Option<CityId>,
    pub trades: Vec<TradeRecord>,
}

impl Transport {
    /// A transport parked at `location`, about to run its first orders.
    pub(crate) fn new(link: LinkId, location: CityId, initial_wait: Seconds, jitter: Point) -> Self {
        Self {
            link,
            location,
            state: TransportState::Waiting {
                time_remaining: initial_wait,
            },
            cargo: None,
            first_city_actions: Vec::new(),
            second_city_actions: Vec::new(),
            jitter,
        }
    }

    pub fn link(&self) -> LinkId {
        self.link
    }

    pub fn location(&self) -> CityId {
        self.location
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn cargo(&self) -> Option<GoodId> {
        self.cargo
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self.state, TransportState::Waiting { .. })
    }

    /// Remaining wait, zero while traveling.
    pub fn waiting_time_remaining(&self) -> Seconds {
        match self.state {
            TransportState::Waiting { time_remaining } => time_remaining,
            TransportState::Traveling { .. } => Seconds::ZERO,
        }
    }

    /// Fraction of the link covered, zero while waiting.
    pub fn advancement(&self) -> Fixed64 {
        match self.state {
            TransportState::Traveling { advancement } => advancement,
            TransportState::Waiting { .. } => Fixed64::ZERO,
        }
    }

    pub fn jitter(&self) -> Point {
        self.jitter
    }

    // -----------------------------------------------------------------------
    // Orders
    // -----------------------------------------------------------------------

    pub fn orders(&self, endpoint: Endpoint) -> &[CityAction] {
        match endpoint {
            Endpoint::First => &self.first_city_actions,
            Endpoint::Second => &self.second_city_actions,
        }
    }

    fn orders_mut(&mut self, endpoint: Endpoint) -> &mut Vec<CityAction> {
        match endpoint {
            Endpoint::First => &mut self.first_city_actions,
            Endpoint::Second => &mut self.second_city_actions,
        }
    }

    /// The first order for `good` at `endpoint`.
    pub fn order_for(&self, endpoint: Endpoint, good: GoodId) -> Option<&CityAction> {
        self.orders(endpoint).iter().find(|o| o.good == good)
    }

    /// Append an order, even if one for the same good exists.
    pub fn push_order(&mut self, endpoint: Endpoint, order: CityAction) {
        self.orders_mut(endpoint).push(order);
    }

    /// Replace the action of the first order for `order.good`, or append it.
    pub fn set_order(&mut self, endpoint: Endpoint, order: CityAction) {
        let orders = self.orders_mut(endpoint);
        match orders.iter_mut().find(|o| o.good == order.good) {
            Some(existing) => existing.action = order.action,
            None => orders.push(order),
        }
    }

    /// Remove the first order for `good`. Returns the removed order.
    pub fn remove_order(&mut self, endpoint: Endpoint, good: GoodId) -> Option<CityAction> {
        let orders = self.orders_mut(endpoint);
        let index = orders.iter().position(|o| o.good == good)?;
        Some(orders.remove(index))
    }

    /// Step the order for `good` through BUY, SELL, DROP, TAKE and back to
    /// no order. Returns the resulting action.
    pub fn cycle_order(&mut self, endpoint: Endpoint, good: GoodId) -> Option<TransportAction> {
        let orders = self.orders_mut(endpoint);
        match orders.iter().position(|o| o.good == good) {
            None => {
                let action = TransportAction::CYCLE[0];
                orders.push(CityAction::new(good, action));
                Some(action)
            }
            Some(index) => match orders[index].action.next_in_cycle() {
                Some(next) => {
                    orders[index].action = next;
                    Some(next)
                }
                None => {
                    orders.remove(index);
                    None
                }
            },
        }
    }

    // -----------------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------------

    /// Advance the transport by `delta` seconds along `link`.
    pub(crate) fn update(
        &mut self,
        link: &CityLink,
        ctx: &mut TradeContext<'_>,
        delta: Seconds,
    ) -> TransportReport {
        let mut report = TransportReport::default();

        match self.state {
            TransportState::Waiting { time_remaining } => {
                let time_remaining = time_remaining.saturating_sub(delta);
                if time_remaining < Seconds::ZERO {
                    report.trades = self.execute_orders(link, ctx);
                    report.departed_from = Some(self.location);
                    self.state = TransportState::Traveling {
                        advancement: Fixed64::ZERO,
                    };
                } else {
                    self.state = TransportState::Waiting { time_remaining };
                }
            }
            TransportState::Traveling { advancement } => {
                let step = checked_div_64(
                    delta.saturating_mul(ctx.params.speed),
                    link.travel_distance(),
                )
                .unwrap_or(Fixed64::MAX);
                let advancement = advancement.saturating_add(step);

                if advancement > Fixed64::from_num(1) {
                    if let Some(destination) = link.other(self.location) {
                        self.location = destination;
                    }
                    self.state = TransportState::Waiting {
                        time_remaining: ctx.params.waiting_time,
                    };
                    self.jitter = geometry::jitter(
                        ctx.rng,
                        ctx.params.jitter_radius_min,
                        ctx.params.jitter_radius_range,
                    );
                    report.arrived_at = Some(self.location);
                } else {
                    self.state = TransportState::Traveling { advancement };
                }
            }
        }

        report
    }

    /// Run the orders for the current city: all SELLs, then DROPs, BUYs and
    /// TAKEs, each class in list order. Orders whose precondition fails are
    /// skipped and stay in place for the next visit.
    fn execute_orders(&mut self, link: &CityLink, ctx: &mut TradeContext<'_>) -> Vec<TradeRecord> {
        let Some(endpoint) = link.endpoint_of(self.location) else {
            return Vec::new();
        };
        let orders = self.orders(endpoint).to_vec();
        let mut trades = Vec::new();

        for action in TransportAction::EXECUTION_ORDER {
            for order in orders.iter().filter(|o| o.action == action) {
                match self.execute(order, ctx) {
                    Some(record) => {
                        debug!(
                            city = ?record.city,
                            good = ?record.good,
                            action = record.action.label(),
                            money_delta = record.money_delta,
                            "order executed"
                        );
                        trades.push(record);
                    }
                    None => trace!(
                        city = ?self.location,
                        good = ?order.good,
                        action = order.action.label(),
                        "order skipped"
                    ),
                }
            }
        }

        trades
    }

    fn execute(&mut self, order: &CityAction, ctx: &mut TradeContext<'_>) -> Option<TradeRecord> {
        let city = ctx.cities.get_mut(self.location)?;
        let good = order.good;

        let money_delta = match order.action {
            TransportAction::Buy => {
                let price = city.sell_offer(ctx.registry, good)?.price;
                self.cargo = Some(good);
                -i64::from(price)
            }
            TransportAction::Sell => {
                let price = city.buy_offer(ctx.registry, good)?.price;
                if ctx.rules.sell_requires_matching_cargo && self.cargo != Some(good) {
                    return None;
                }
                self.cargo = None;
                i64::from(price)
            }
            TransportAction::Take => {
                if city.inventory.withdraw(good, 1) == 0 {
                    return None;
                }
                self.cargo = Some(good);
                0
            }
            TransportAction::Drop => {
                if self.cargo != Some(good) {
                    return None;
                }
                city.inventory.deposit(good, 1);
                if ctx.rules.drop_clears_cargo {
                    self.cargo = None;
                }
                0
            }
        };

        *ctx.money = ctx.money.saturating_add(money_delta);
        Some(TradeRecord {
            city: self.location,
            good,
            action: order.action,
            money_delta,
        })
    }

    // -----------------------------------------------------------------------
    // Presentation queries
    // -----------------------------------------------------------------------

    /// World position for rendering. While waiting: the city centre plus the
    /// jitter offset. While traveling: a point on the link's offset segment,
    /// rounded to whole pixels.
    pub fn coord(&self, link: &CityLink, location_position: Point, segment: &OffsetSegment) -> Point {
        match self.state {
            TransportState::Waiting { .. } => location_position.offset(self.jitter),
            TransportState::Traveling { advancement } => {
                let t = fixed64_to_f64(advancement);
                segment.lerp(if link.forward(self.location) { t } else { 1.0 - t })
            }
        }
    }

    /// Whether the sprite should be mirrored: the destination lies to the left.
    pub fn faces_left(&self, location_position: Point, destination_position: Point) -> bool {
        location_position.x > destination_position.x
    }
}
