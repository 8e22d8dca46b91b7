//! Typed events, delivered once per tick, with per-kind history rings.
//!
//! Events are emitted while the world updates transports and cities, then
//! delivered in one batch at the end of the tick, in emission order. The
//! batch is unbounded: every emitted event reaches its subscribers. After
//! delivery each event is also appended to its kind's [`EventBuffer`], a
//! fixed-capacity history that overwrites its oldest entries.
//!
//! # Subscriber Types
//!
//! - **Passive listeners**: read-only, for UI refreshes and logging.
//! - **Reactive handlers**: return [`Command`]s that the world queues for the
//!   next tick.
//!
//! After delivery the batch stays readable through [`EventBus::recent`] until
//! the next delivery, so hosts that poll instead of subscribing can diff
//! against it.
//!
//! # Suppression
//!
//! Event kinds can be suppressed via [`EventBus::suppress`]; suppressed
//! events are never buffered.

use crate::command_queue::Command;
use crate::fixed::Ticks;
use crate::id::*;
use crate::order::{Endpoint, TransportAction};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A simulation event. All events carry the tick at which they occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // -- Purchases --
    TransportPurchased {
        transport: TransportId,
        link: LinkId,
        city: CityId,
        tick: Ticks,
    },
    BuildingPurchased {
        city: CityId,
        building_type: BuildingTypeId,
        index: usize,
        tick: Ticks,
    },

    // -- Transport --
    TransportDeparted {
        transport: TransportId,
        city: CityId,
        tick: Ticks,
    },
    TransportArrived {
        transport: TransportId,
        city: CityId,
        tick: Ticks,
    },
    TradeExecuted {
        transport: TransportId,
        city: CityId,
        good: GoodId,
        action: TransportAction,
        money_delta: i64,
        tick: Ticks,
    },
    OrdersChanged {
        transport: TransportId,
        endpoint: Endpoint,
        tick: Ticks,
    },

    // -- Economy --
    MoneyChanged {
        old: i64,
        new: i64,
        tick: Ticks,
    },

    // -- Production --
    ProductionStarted {
        city: CityId,
        index: usize,
        tick: Ticks,
    },
    ProductionCompleted {
        city: CityId,
        index: usize,
        good: GoodId,
        tick: Ticks,
    },
}

/// Discriminant tag for event types, used for suppression and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TransportPurchased,
    BuildingPurchased,
    TransportDeparted,
    TransportArrived,
    TradeExecuted,
    OrdersChanged,
    MoneyChanged,
    ProductionStarted,
    ProductionCompleted,
}

const EVENT_KIND_COUNT: usize = 9;

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::TransportPurchased { .. } => EventKind::TransportPurchased,
            Event::BuildingPurchased { .. } => EventKind::BuildingPurchased,
            Event::TransportDeparted { .. } => EventKind::TransportDeparted,
            Event::TransportArrived { .. } => EventKind::TransportArrived,
            Event::TradeExecuted { .. } => EventKind::TradeExecuted,
            Event::OrdersChanged { .. } => EventKind::OrdersChanged,
            Event::MoneyChanged { .. } => EventKind::MoneyChanged,
            Event::ProductionStarted { .. } => EventKind::ProductionStarted,
            Event::ProductionCompleted { .. } => EventKind::ProductionCompleted,
        }
    }

    pub fn tick(&self) -> Ticks {
        match *self {
            Event::TransportPurchased { tick, .. }
            | Event::BuildingPurchased { tick, .. }
            | Event::TransportDeparted { tick, .. }
            | Event::TransportArrived { tick, .. }
            | Event::TradeExecuted { tick, .. }
            | Event::OrdersChanged { tick, .. }
            | Event::MoneyChanged { tick, .. }
            | Event::ProductionStarted { tick, .. }
            | Event::ProductionCompleted { tick, .. } => tick,
        }
    }
}

impl EventKind {
    fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// EventBuffer
// ---------------------------------------------------------------------------

/// A fixed-capacity ring buffer. When full, the oldest events are
/// overwritten and counted in [`dropped_count`](Self::dropped_count).
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<Option<Event>>,
    /// Next write position.
    head: usize,
    len: usize,
    /// Total events ever written, including overwritten ones.
    total_written: u64,
    /// Events overwritten before being cleared.
    dropped: u64,
}

impl EventBuffer {
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
            dropped: 0,
        }
    }

    pub fn push(&mut self, event: Event) {
        let capacity = self.capacity();
        if self.len == capacity {
            self.dropped += 1;
        }
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % capacity;
        self.len = (self.len + 1).min(capacity);
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Events overwritten by newer ones since the buffer was created.
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        let capacity = self.capacity();
        let start = if self.len < capacity { 0 } else { self.head };
        (0..self.len).filter_map(move |i| self.events[(start + i) % capacity].as_ref())
    }

    /// Empty the buffer. Cleared events do not count as dropped.
    pub fn clear(&mut self) {
        self.events.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.len = 0;
    }
}

// ---------------------------------------------------------------------------
// Subscribers
// ---------------------------------------------------------------------------

pub type PassiveListener = Box<dyn FnMut(&Event)>;

/// Returns commands to apply at the start of the next tick.
pub type ReactiveHandler = Box<dyn FnMut(&Event) -> Vec<Command>>;

/// Subscribers only see events for which the filter returns true.
pub type EventFilter = Box<dyn Fn(&Event) -> bool>;

enum Subscriber {
    Passive(PassiveListener),
    Reactive(ReactiveHandler),
}

struct SubscriberEntry {
    subscriber: Subscriber,
    filter: Option<EventFilter>,
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

pub struct EventBus {
    /// This tick's events in emission order, awaiting delivery.
    pending: Vec<Event>,
    /// Delivered events per kind. Allocated lazily on first delivery.
    history: [Option<EventBuffer>; EVENT_KIND_COUNT],
    suppressed: [bool; EVENT_KIND_COUNT],
    /// Called in registration order.
    subscribers: [Vec<SubscriberEntry>; EVENT_KIND_COUNT],
    /// Commands from reactive handlers, drained by the world after delivery.
    pending_commands: Vec<Command>,
    /// The last delivered batch, in emission order.
    recent: Vec<Event>,
    history_capacity: usize,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.pending.len())
            .field("history", &self.history)
            .field("suppressed", &self.suppressed)
            .field("pending_commands", &self.pending_commands)
            .field("recent", &self.recent.len())
            .field("history_capacity", &self.history_capacity)
            .finish_non_exhaustive()
    }
}

impl EventBus {
    /// `history_capacity` bounds how many delivered events of each kind are
    /// kept for [`history`](Self::history). It does not limit delivery.
    pub fn new(history_capacity: usize) -> Self {
        Self {
            pending: Vec::new(),
            history: Default::default(),
            suppressed: [false; EVENT_KIND_COUNT],
            subscribers: Default::default(),
            pending_commands: Vec::new(),
            recent: Vec::new(),
            history_capacity,
        }
    }

    /// Stop recording `kind`. Pending and historical events of that kind
    /// are dropped.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
        self.pending.retain(|e| e.kind() != kind);
        self.history[kind.index()] = None;
    }

    pub fn unsuppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = false;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Queue an event for delivery at the end of the tick.
    pub fn emit(&mut self, event: Event) {
        if self.suppressed[event.kind().index()] {
            return;
        }
        self.pending.push(event);
    }

    pub fn on_passive(&mut self, kind: EventKind, listener: PassiveListener) {
        self.on_passive_filtered(kind, None, listener);
    }

    pub fn on_passive_filtered(
        &mut self,
        kind: EventKind,
        filter: Option<EventFilter>,
        listener: PassiveListener,
    ) {
        self.subscribers[kind.index()].push(SubscriberEntry {
            subscriber: Subscriber::Passive(listener),
            filter,
        });
    }

    pub fn on_reactive(&mut self, kind: EventKind, handler: ReactiveHandler) {
        self.subscribers[kind.index()].push(SubscriberEntry {
            subscriber: Subscriber::Reactive(handler),
            filter: None,
        });
    }

    /// Hand every pending event to its subscribers in emission order, then
    /// record it in its kind's history. The delivered batch replaces
    /// [`recent`](Self::recent).
    pub fn deliver(&mut self) {
        let events = std::mem::take(&mut self.pending);

        for event in &events {
            let idx = event.kind().index();
            for entry in &mut self.subscribers[idx] {
                if let Some(filter) = &entry.filter
                    && !filter(event)
                {
                    continue;
                }
                match &mut entry.subscriber {
                    Subscriber::Passive(listener) => listener(event),
                    Subscriber::Reactive(handler) => {
                        self.pending_commands.extend(handler(event));
                    }
                }
            }
            let capacity = self.history_capacity;
            self.history[idx]
                .get_or_insert_with(|| EventBuffer::new(capacity))
                .push(event.clone());
        }

        self.recent = events;
    }

    /// Events delivered at the end of the most recent tick, in the order
    /// they were emitted.
    pub fn recent(&self) -> &[Event] {
        &self.recent
    }

    /// Events of `kind` emitted but not yet delivered.
    pub fn buffered(&self, kind: EventKind) -> usize {
        self.pending.iter().filter(|e| e.kind() == kind).count()
    }

    /// The most recently delivered events of `kind`, oldest first, up to the
    /// history capacity.
    pub fn history(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.history[kind.index()].iter().flat_map(|buffer| buffer.iter())
    }

    /// Delivered events of `kind` that have aged out of the history.
    pub fn history_dropped(&self, kind: EventKind) -> u64 {
        self.history[kind.index()]
            .as_ref()
            .map_or(0, EventBuffer::dropped_count)
    }

    pub fn drain_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.pending_commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn city() -> CityId {
        let mut map = SlotMap::<CityId, ()>::with_key();
        map.insert(())
    }

    fn money(old: i64, new: i64, tick: Ticks) -> Event {
        Event::MoneyChanged { old, new, tick }
    }

    #[test]
    fn ring_buffer_drops_oldest() {
        let mut buffer = EventBuffer::new(2);
        for tick in 0..3 {
            buffer.push(money(0, 1, tick));
        }
        let ticks: Vec<Ticks> = buffer.iter().map(Event::tick).collect();
        assert_eq!(ticks, [1, 2]);
        assert_eq!(buffer.dropped_count(), 1);
        assert_eq!(buffer.total_written(), 3);
    }

    #[test]
    fn cleared_events_are_not_counted_as_dropped() {
        let mut buffer = EventBuffer::new(4);
        for tick in 0..10 {
            buffer.push(money(0, 1, tick));
            buffer.clear();
        }
        assert_eq!(buffer.dropped_count(), 0);
        assert_eq!(buffer.total_written(), 10);
        assert!(buffer.is_empty());
    }

    #[test]
    fn delivery_is_not_limited_by_history_capacity() {
        let mut bus = EventBus::new(2);
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        bus.on_passive(EventKind::MoneyChanged, Box::new(move |_| *sink.borrow_mut() += 1));

        for tick in 0..5 {
            bus.emit(money(0, 1, tick));
        }
        assert_eq!(bus.buffered(EventKind::MoneyChanged), 5);
        bus.deliver();

        assert_eq!(*seen.borrow(), 5);
        assert_eq!(bus.recent().len(), 5);
        let kept: Vec<Ticks> = bus.history(EventKind::MoneyChanged).map(Event::tick).collect();
        assert_eq!(kept, [3, 4]);
        assert_eq!(bus.history_dropped(EventKind::MoneyChanged), 3);
    }

    #[test]
    fn history_under_capacity_drops_nothing() {
        let mut bus = EventBus::new(16);
        for tick in 0..10 {
            bus.emit(money(0, 1, tick));
            bus.deliver();
        }
        assert_eq!(bus.history(EventKind::MoneyChanged).count(), 10);
        assert_eq!(bus.history_dropped(EventKind::MoneyChanged), 0);
        assert_eq!(bus.history_dropped(EventKind::TradeExecuted), 0);
    }

    #[test]
    fn recent_keeps_emission_order_across_kinds() {
        let mut bus = EventBus::new(16);
        let c = city();
        let events = [
            money(0, 1, 0),
            Event::ProductionStarted {
                city: c,
                index: 0,
                tick: 0,
            },
            money(1, 2, 0),
        ];
        for e in events.iter().cloned() {
            bus.emit(e);
        }
        bus.deliver();
        assert_eq!(bus.recent(), events);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let buffer = EventBuffer::new(0);
        assert_eq!(buffer.capacity(), 1);
    }

    #[test]
    fn passive_listeners_see_events_on_delivery() {
        let mut bus = EventBus::new(16);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.on_passive(
            EventKind::MoneyChanged,
            Box::new(move |e| sink.borrow_mut().push(e.clone())),
        );

        bus.emit(money(10, 20, 1));
        assert!(seen.borrow().is_empty(), "nothing until deliver");
        bus.deliver();
        assert_eq!(*seen.borrow(), [money(10, 20, 1)]);
        assert_eq!(bus.buffered(EventKind::MoneyChanged), 0);
    }

    #[test]
    fn filters_skip_unwanted_events() {
        let mut bus = EventBus::new(16);
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        bus.on_passive_filtered(
            EventKind::MoneyChanged,
            Some(Box::new(|e| matches!(e, Event::MoneyChanged { new, .. } if *new < 0))),
            Box::new(move |_| *sink.borrow_mut() += 1),
        );

        bus.emit(money(10, 5, 0));
        bus.emit(money(5, -5, 0));
        bus.deliver();
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn suppressed_kinds_are_not_recorded() {
        let mut bus = EventBus::new(16);
        bus.suppress(EventKind::ProductionStarted);
        bus.emit(Event::ProductionStarted {
            city: city(),
            index: 0,
            tick: 0,
        });
        assert_eq!(bus.buffered(EventKind::ProductionStarted), 0);
        bus.deliver();
        assert!(bus.recent().is_empty());
        assert_eq!(bus.history(EventKind::ProductionStarted).count(), 0);

        bus.unsuppress(EventKind::ProductionStarted);
        assert!(!bus.is_suppressed(EventKind::ProductionStarted));
    }

    #[test]
    fn recent_holds_only_the_last_batch() {
        let mut bus = EventBus::new(16);
        bus.emit(money(0, 1, 0));
        bus.deliver();
        assert_eq!(bus.recent().len(), 1);

        bus.deliver();
        assert!(bus.recent().is_empty());
    }

    #[test]
    fn reactive_handlers_queue_commands() {
        let mut bus = EventBus::new(16);
        let c = city();
        bus.on_reactive(
            EventKind::ProductionCompleted,
            Box::new(|e| match *e {
                Event::ProductionCompleted { city, .. } => vec![Command::BuyBuilding {
                    city,
                    building_type: BuildingTypeId(0),
                }],
                _ => Vec::new(),
            }),
        );

        bus.emit(Event::ProductionCompleted {
            city: c,
            index: 0,
            good: GoodId(0),
            tick: 3,
        });
        bus.deliver();
        assert_eq!(
            bus.drain_commands(),
            [Command::BuyBuilding {
                city: c,
                building_type: BuildingTypeId(0)
            }]
        );
        assert!(bus.drain_commands().is_empty());
    }
}
