//! Event-driven dispatch controller.
//!
//! [`Controller::handle`] consumes one simulator event and returns the
//! commands to send back. Everything runs inside that call on in-memory
//! state; there are no threads, timers or I/O.
//!
//! # Event handling
//!
//! | Event | Action |
//! |-------|--------|
//! | Init | validate, build arenas, optionally spread vehicles |
//! | PassengerCall | register, dispatch, start idle vehicles |
//! | ElevatorStopped | prune, re-plan, dispatch, command next stop and standing vehicles |
//! | ElevatorIdle | dispatch, resume or park |
//! | PassengerBoard | close pickup, follow reassignment, ensure dropoff |
//! | PassengerAlight | close dropoff, retire request |
//! | TickEnd | refresh priorities, escalate stale requests |
//! | ElevatorPassingFloor | opportunistic stop |

use std::collections::BTreeMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::kpi::{ServiceKpi, TripRecord};
use super::world::World;
use crate::config::{ConfigError, DispatchConfig, Strategy};
use crate::dispatching::{Candidate, CostEngine, DispatchContext, Dispatcher, NearestVehicle};
use crate::executor::TaskQueueExecutor;
use crate::models::{Direction, FloorIndex, PassengerId, Tick, VehicleId, VehicleState};
use crate::registry::RequestRegistry;
use crate::scan::ScanTracker;
use crate::selector::{park_target, select_next_floor, Demand};
use crate::validation::{check_direction, validate_call, validate_init, validate_vehicle};

/// Inbound simulator event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Init {
        vehicles: Vec<VehicleState>,
        floor_count: usize,
    },
    PassengerCall {
        passenger: PassengerId,
        origin: FloorIndex,
        destination: FloorIndex,
        direction: Direction,
        tick: Tick,
    },
    ElevatorStopped {
        vehicle: VehicleId,
        floor: FloorIndex,
    },
    ElevatorIdle {
        vehicle: VehicleId,
    },
    PassengerBoard {
        vehicle: VehicleId,
        passenger: PassengerId,
    },
    PassengerAlight {
        vehicle: VehicleId,
        passenger: PassengerId,
        floor: FloorIndex,
    },
    TickStart {
        tick: Tick,
    },
    TickEnd {
        tick: Tick,
    },
    ElevatorApproaching {
        vehicle: VehicleId,
        floor: FloorIndex,
        direction: Direction,
    },
    ElevatorPassingFloor {
        vehicle: VehicleId,
        floor: FloorIndex,
        direction: Direction,
    },
}

/// Outbound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Send `vehicle` to `floor`. `immediate` diverts a vehicle in transit.
    GoToFloor {
        vehicle: VehicleId,
        floor: FloorIndex,
        immediate: bool,
    },
}

/// The dispatch core: registry, plans and scan state behind one event loop.
///
/// # Example
/// ```
/// use u_dispatch::config::DispatchConfig;
/// use u_dispatch::models::{Direction, VehicleState};
/// use u_dispatch::scheduler::{Command, Controller, Event};
///
/// let mut controller = Controller::new(DispatchConfig::default()).unwrap();
/// controller.handle(Event::Init {
///     vehicles: vec![VehicleState::new(0, 0, 8), VehicleState::new(1, 9, 8)],
///     floor_count: 10,
/// });
/// let commands = controller.handle(Event::PassengerCall {
///     passenger: 1,
///     origin: 2,
///     destination: 7,
///     direction: Direction::Up,
///     tick: 0,
/// });
/// assert_eq!(
///     commands,
///     vec![Command::GoToFloor { vehicle: 0, floor: 2, immediate: false }]
/// );
/// ```
#[derive(Debug)]
pub struct Controller {
    config: DispatchConfig,
    dispatcher: Box<dyn Dispatcher>,
    world: World,
    scan: ScanTracker,
    registry: RequestRegistry,
    executor: TaskQueueExecutor,
    trips: BTreeMap<PassengerId, TripRecord>,
    tick: Tick,
}

impl Controller {
    /// Creates a controller. Fails only on invalid configuration.
    pub fn new(config: DispatchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let dispatcher: Box<dyn Dispatcher> = match config.strategy {
            Strategy::Nearest => Box::new(NearestVehicle),
            Strategy::CostBased | Strategy::Reactive => Box::new(CostEngine::from_config(&config)),
        };
        Ok(Self {
            config,
            dispatcher,
            world: World::default(),
            scan: ScanTracker::default(),
            registry: RequestRegistry::new(),
            executor: TaskQueueExecutor::default(),
            trips: BTreeMap::new(),
            tick: 0,
        })
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn registry(&self) -> &RequestRegistry {
        &self.registry
    }

    pub fn executor(&self) -> &TaskQueueExecutor {
        &self.executor
    }

    pub fn scan(&self) -> &ScanTracker {
        &self.scan
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Trip timelines, by passenger id.
    ///
    /// Records are kept until [`Controller::drain_delivered`] or the next
    /// init removes them.
    pub fn trips(&self) -> impl Iterator<Item = &TripRecord> {
        self.trips.values()
    }

    /// Removes and returns the records of delivered trips.
    ///
    /// Long runs call this periodically to hand finished trips to their own
    /// reporting; [`Controller::kpi`] then covers only the trips still held.
    pub fn drain_delivered(&mut self) -> Vec<TripRecord> {
        let delivered: Vec<PassengerId> = self
            .trips
            .values()
            .filter(|t| t.is_delivered())
            .map(|t| t.passenger)
            .collect();
        delivered
            .into_iter()
            .filter_map(|p| self.trips.remove(&p))
            .collect()
    }

    /// Service KPIs over every call seen since init.
    pub fn kpi(&self) -> ServiceKpi {
        let trips: Vec<TripRecord> = self.trips.values().cloned().collect();
        ServiceKpi::calculate(&trips)
    }

    /// Handles one event and returns the resulting commands.
    pub fn handle(&mut self, event: Event) -> Vec<Command> {
        match event {
            Event::Init {
                vehicles,
                floor_count,
            } => self.on_init(vehicles, floor_count),
            Event::PassengerCall {
                passenger,
                origin,
                destination,
                direction,
                tick,
            } => self.on_call(passenger, origin, destination, direction, tick),
            Event::ElevatorStopped { vehicle, floor } => {
                if !self.known_vehicle(vehicle) {
                    return Vec::new();
                }
                self.on_stopped(vehicle, floor)
            }
            Event::ElevatorIdle { vehicle } => {
                if !self.known_vehicle(vehicle) {
                    return Vec::new();
                }
                self.world.idle(vehicle);
                self.seek_work(vehicle)
            }
            Event::PassengerBoard { vehicle, passenger } => {
                if self.known_vehicle(vehicle) {
                    self.on_board(vehicle, passenger);
                }
                Vec::new()
            }
            Event::PassengerAlight {
                vehicle,
                passenger,
                floor,
            } => {
                if self.known_vehicle(vehicle) {
                    self.on_alight(vehicle, passenger, floor);
                }
                Vec::new()
            }
            Event::TickStart { tick } => {
                self.tick = tick;
                Vec::new()
            }
            Event::TickEnd { tick } => self.on_tick_end(tick),
            Event::ElevatorApproaching {
                vehicle,
                floor,
                direction,
            } => {
                debug!("vehicle {vehicle}: approaching {floor} heading {direction}");
                Vec::new()
            }
            Event::ElevatorPassingFloor {
                vehicle,
                floor,
                direction,
            } => {
                if !self.known_vehicle(vehicle) {
                    return Vec::new();
                }
                self.on_passing(vehicle, floor, direction)
            }
        }
    }

    fn known_vehicle(&self, vehicle: VehicleId) -> bool {
        match validate_vehicle(vehicle, self.world.vehicles().len()) {
            Ok(()) => true,
            Err(errors) => {
                for e in errors {
                    warn!("dropping event: {e}");
                }
                false
            }
        }
    }

    fn context(&self) -> DispatchContext {
        DispatchContext::from_config(&self.config, self.tick)
    }

    // ======================== Event handlers ========================

    fn on_init(&mut self, vehicles: Vec<VehicleState>, floor_count: usize) -> Vec<Command> {
        if let Err(errors) = validate_init(&vehicles, floor_count) {
            for e in errors {
                warn!("rejecting init: {e}");
            }
            return Vec::new();
        }

        let n = vehicles.len();
        self.world = World::new(vehicles, floor_count);
        self.scan = ScanTracker::new(n);
        self.executor = TaskQueueExecutor::new(n);
        self.registry = RequestRegistry::new();
        self.trips.clear();
        info!(
            "init: {n} vehicle(s), {floor_count} floor(s), strategy {:?}",
            self.config.strategy
        );

        if !self.config.spread_on_init || n < 2 {
            return Vec::new();
        }
        let top = self.world.top_floor();
        let mut commands = Vec::new();
        for i in 0..n {
            let target = ((i as f64) * f64::from(top) / ((n - 1) as f64)).round() as FloorIndex;
            let at = self.world.vehicle(i).map(|v| v.floor);
            if at != Some(target) {
                commands.push(self.command(i, target, true));
            }
        }
        commands
    }

    fn on_call(
        &mut self,
        passenger: PassengerId,
        origin: FloorIndex,
        destination: FloorIndex,
        direction: Direction,
        tick: Tick,
    ) -> Vec<Command> {
        self.tick = self.tick.max(tick);
        if let Err(errors) = validate_call(origin, destination, self.world.floor_count()) {
            for e in errors {
                warn!("dropping call of passenger {passenger}: {e}");
            }
            return Vec::new();
        }
        if let Some(e) = check_direction(origin, destination, direction) {
            warn!("passenger {passenger}: {e}; using the travelled direction");
        }
        if !self.registry.add_request(passenger, origin, destination, tick) {
            return Vec::new();
        }

        let derived = Direction::between(origin, destination);
        self.world.enqueue(passenger, origin, derived);
        self.trips.insert(passenger, TripRecord::new(passenger, tick));
        debug!("passenger {passenger}: call {origin}->{destination} at tick {tick}");

        if self.config.strategy != Strategy::Reactive {
            self.dispatch_pending();
        }
        self.start_idle()
    }

    fn on_stopped(&mut self, vehicle: VehicleId, floor: FloorIndex) -> Vec<Command> {
        self.world.stopped(vehicle, floor);
        if self.config.strategy == Strategy::Reactive {
            let mut commands: Vec<Command> = self.reactive_command(vehicle).into_iter().collect();
            commands.extend(self.start_idle());
            return commands;
        }

        self.revalidate(vehicle);
        self.dispatch_pending();
        // The stopped vehicle first, then any standing vehicle that just got work.
        let mut commands = self.seek_work(vehicle);
        commands.extend(self.start_idle());
        commands
    }

    fn on_board(&mut self, vehicle: VehicleId, passenger: PassengerId) {
        self.world.board(vehicle, passenger);
        if let Some(trip) = self.trips.get_mut(&passenger) {
            if trip.board_tick.is_none() {
                trip.board_tick = Some(self.tick);
                trip.vehicle = Some(vehicle);
            }
        }

        let Some(request) = self.registry.get(passenger) else {
            warn!("vehicle {vehicle}: boarded unknown passenger {passenger}");
            return;
        };
        let destination = request.destination;
        let previous = request.assigned;
        if previous != Some(vehicle) {
            self.registry.assign(passenger, vehicle, self.tick);
            if let Some(other) = previous {
                self.executor.withdraw(other, passenger);
                info!("passenger {passenger}: boarded vehicle {vehicle} instead of {other}");
            }
        }
        self.executor.on_board(vehicle, passenger, Some(destination));
    }

    fn on_alight(&mut self, vehicle: VehicleId, passenger: PassengerId, floor: FloorIndex) {
        if !self.world.alight(vehicle, passenger) {
            debug!("vehicle {vehicle}: passenger {passenger} was not aboard");
        }
        self.executor.on_alight(vehicle, passenger);
        match self.registry.remove(passenger) {
            Some(r) if r.destination != floor => {
                warn!(
                    "passenger {passenger}: left at floor {floor}, wanted {}",
                    r.destination
                );
            }
            Some(_) => {}
            None => debug!("passenger {passenger}: duplicate alight ignored"),
        }
        if let Some(trip) = self.trips.get_mut(&passenger) {
            if trip.alight_tick.is_none() {
                trip.alight_tick = Some(self.tick);
            }
        }
    }

    fn on_tick_end(&mut self, tick: Tick) -> Vec<Command> {
        self.tick = tick;
        self.registry.update_priorities(tick);
        if self.config.strategy == Strategy::Reactive {
            return Vec::new();
        }

        let threshold = self.config.reallocation_threshold;
        let stale: Vec<(PassengerId, Option<VehicleId>)> = self
            .registry
            .iter()
            .filter(|r| self.world.carrier_of(r.passenger).is_none())
            .filter(|r| match r.assigned {
                None => r.wait_time(tick) > threshold,
                Some(_) => r.assignment_age(tick).is_some_and(|age| age > threshold),
            })
            .map(|r| (r.passenger, r.assigned))
            .collect();
        if stale.is_empty() {
            return Vec::new();
        }

        for &(passenger, assigned) in &stale {
            if let Some(vehicle) = assigned {
                self.registry.unassign(passenger);
                self.executor.withdraw(vehicle, passenger);
            }
        }
        let mut ids: Vec<PassengerId> = stale.iter().map(|&(p, _)| p).collect();
        ids.sort_by_key(|&p| std::cmp::Reverse(self.registry.get(p).map_or(0, |r| r.wait_time(tick))));
        for passenger in ids {
            match self.dispatch_one(passenger) {
                Some(vehicle) => warn!("passenger {passenger}: escalated to vehicle {vehicle}"),
                None => warn!("passenger {passenger}: escalation found no vehicle"),
            }
        }
        self.start_idle()
    }

    fn on_passing(&mut self, vehicle: VehicleId, floor: FloorIndex, direction: Direction) -> Vec<Command> {
        self.world.passing(vehicle, floor);
        if !self.config.opportunistic_stops {
            return Vec::new();
        }
        let Some(v) = self.world.vehicle(vehicle) else {
            return Vec::new();
        };
        if v.target_floor == Some(floor) {
            return Vec::new();
        }

        let dropping = v
            .passengers
            .iter()
            .any(|&p| self.registry.get(p).is_some_and(|r| r.destination == floor));
        let heading = if direction.is_moving() {
            direction
        } else {
            v.travel_direction()
        };
        let picking = !v.is_full()
            && self.world.floor(floor).is_some_and(|f| {
                f.waiting(heading).iter().any(|&p| {
                    self.registry
                        .get(p)
                        .is_some_and(|r| r.assigned.is_none() || r.assigned == Some(vehicle))
                })
            });

        if dropping || picking {
            debug!("vehicle {vehicle}: opportunistic stop at {floor}");
            vec![self.command(vehicle, floor, true)]
        } else {
            Vec::new()
        }
    }

    // ======================== Decisions ========================

    /// Prunes stale stops and re-orders the plan from the current floor.
    /// Deferred passengers go back to the pending pool.
    fn revalidate(&mut self, vehicle: VehicleId) {
        let Some(v) = self.world.vehicle(vehicle) else {
            return;
        };
        self.executor.prune(v, &self.registry);
        let context = self.context();
        let deferred = self
            .executor
            .replan(v, self.scan.direction(vehicle), &context);
        for passenger in deferred {
            if self.registry.get(passenger).and_then(|r| r.assigned) == Some(vehicle) {
                self.registry.unassign(passenger);
                debug!("passenger {passenger}: returned to pending by vehicle {vehicle}");
            }
        }
    }

    /// Runs the dispatcher over every pending request.
    fn dispatch_pending(&mut self) {
        for passenger in self.registry.pending_ids() {
            self.dispatch_one(passenger);
        }
    }

    /// Assigns one request to the cheapest vehicle that can take it.
    fn dispatch_one(&mut self, passenger: PassengerId) -> Option<VehicleId> {
        let request = self.registry.get(passenger)?.clone();
        if request.is_assigned() {
            return request.assigned;
        }
        let context = self.context();

        let ranked = {
            let candidates: Vec<Candidate<'_>> = self
                .world
                .vehicles()
                .iter()
                .filter_map(|v| {
                    let plan = self.executor.plan(v.id)?;
                    Some(Candidate::new(v, plan, self.scan.direction(v.id)))
                })
                .collect();
            self.dispatcher.rank(&request, &candidates, &context)
        };

        for (vehicle, cost) in ranked {
            let Some(v) = self.world.vehicle(vehicle) else {
                continue;
            };
            let scan = self.scan.direction(vehicle);
            if self
                .executor
                .try_insert_request(v, scan, &request, &context)
            {
                self.registry.assign(passenger, vehicle, self.tick);
                info!(
                    "passenger {passenger}: assigned to vehicle {vehicle} via {} (cost {cost:.1})",
                    self.dispatcher.name()
                );
                return Some(vehicle);
            }
        }
        debug!("passenger {passenger}: no vehicle has room");
        None
    }

    /// Commands every standing vehicle that has work.
    fn start_idle(&mut self) -> Vec<Command> {
        let standing: Vec<VehicleId> = self
            .world
            .vehicles()
            .iter()
            .filter(|v| v.is_idle())
            .map(|v| v.id)
            .collect();

        let mut commands = Vec::new();
        for vehicle in standing {
            let command = if self.config.strategy == Strategy::Reactive {
                self.reactive_command(vehicle)
            } else if self.executor.has_work(vehicle) {
                self.plan_command(vehicle)
            } else {
                None
            };
            commands.extend(command);
        }
        commands
    }

    /// Next stop from the plan, or the parking fallback.
    fn seek_work(&mut self, vehicle: VehicleId) -> Vec<Command> {
        if self.config.strategy == Strategy::Reactive {
            return self.reactive_command(vehicle).into_iter().collect();
        }
        if !self.executor.has_work(vehicle) {
            self.dispatch_pending();
        }
        self.plan_command(vehicle)
            .or_else(|| self.park(vehicle))
            .into_iter()
            .collect()
    }

    fn plan_command(&mut self, vehicle: VehicleId) -> Option<Command> {
        let v = self.world.vehicle(vehicle)?;
        let target = self.executor.next_target(v, self.world.top_floor())?;
        Some(self.command(vehicle, target, false))
    }

    fn reactive_command(&mut self, vehicle: VehicleId) -> Option<Command> {
        let v = self.world.vehicle(vehicle)?;
        let destinations: Vec<FloorIndex> = v
            .passengers
            .iter()
            .filter_map(|&p| self.registry.get(p).map(|r| r.destination))
            .collect();
        let mut demand = Demand::new().with_destinations(v.floor, destinations);
        if !v.is_full() {
            demand = demand.with_waiting(self.world.floors());
        }
        let target = select_next_floor(
            v.floor,
            self.scan.direction(vehicle),
            &demand,
            v.is_empty(),
            self.world.top_floor(),
        );
        match target {
            Some(floor) => Some(self.command(vehicle, floor, false)),
            None => self.park(vehicle),
        }
    }

    fn park(&mut self, vehicle: VehicleId) -> Option<Command> {
        let v = self.world.vehicle(vehicle)?;
        let target = park_target(v.floor, self.config.park_floor, self.world.top_floor())?;
        debug!("vehicle {vehicle}: parking towards {target}");
        Some(self.command(vehicle, target, false))
    }

    fn command(&mut self, vehicle: VehicleId, floor: FloorIndex, immediate: bool) -> Command {
        if let Some(from) = self.world.vehicle(vehicle).map(|v| v.floor) {
            self.scan.record_move(vehicle, from, floor);
        }
        self.world.commanded(vehicle, floor, immediate);
        Command::GoToFloor {
            vehicle,
            floor,
            immediate,
        }
    }
}
