//! Tick simulator that drives a [`Controller`] end to end.
//!
//! Cars move one floor per tick. On arrival riders for the floor alight,
//! the controller is told the car stopped, and waiting passengers whose
//! direction matches the commanded departure board, up to capacity.

use std::collections::HashMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::{Command, Controller, Event};
use crate::config::{DispatchConfig, Strategy};
use crate::models::{Direction, FloorIndex, PassengerId, Tick, VehicleId, VehicleState};

#[derive(Debug, Clone, Copy)]
struct Trip {
    passenger: PassengerId,
    origin: FloorIndex,
    destination: FloorIndex,
    tick: Tick,
}

impl Trip {
    fn direction(&self) -> Direction {
        Direction::between(self.origin, self.destination)
    }
}

#[derive(Debug)]
struct Car {
    floor: FloorIndex,
    target: Option<FloorIndex>,
    capacity: usize,
    riders: Vec<(PassengerId, FloorIndex)>,
}

struct Simulation {
    controller: Controller,
    cars: Vec<Car>,
    waiting: Vec<Trip>,
    boarded: HashMap<PassengerId, VehicleId>,
    delivered: usize,
    null_moves: usize,
    tick: Tick,
}

impl Simulation {
    fn new(config: DispatchConfig, cars: &[(FloorIndex, usize)], floor_count: usize) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut sim = Self {
            controller: Controller::new(config).unwrap(),
            cars: cars
                .iter()
                .map(|&(floor, capacity)| Car {
                    floor,
                    target: None,
                    capacity,
                    riders: Vec::new(),
                })
                .collect(),
            waiting: Vec::new(),
            boarded: HashMap::new(),
            delivered: 0,
            null_moves: 0,
            tick: 0,
        };
        let vehicles = cars
            .iter()
            .enumerate()
            .map(|(id, &(floor, capacity))| VehicleState::new(id, floor, capacity))
            .collect();
        let commands = sim.controller.handle(Event::Init {
            vehicles,
            floor_count,
        });
        sim.apply(commands);
        sim
    }

    fn apply(&mut self, commands: Vec<Command>) {
        for Command::GoToFloor { vehicle, floor, .. } in commands {
            let car = &mut self.cars[vehicle];
            let standing = car.target.is_none();
            if standing && floor == car.floor {
                self.null_moves += 1;
                continue;
            }
            car.target = Some(floor);
            if standing {
                let departure = Direction::between(car.floor, floor);
                self.board(vehicle, departure);
            }
        }
    }

    fn board(&mut self, vehicle: VehicleId, departure: Direction) {
        let floor = self.cars[vehicle].floor;
        let mut i = 0;
        while i < self.waiting.len() {
            let car = &self.cars[vehicle];
            if car.riders.len() >= car.capacity {
                break;
            }
            let trip = self.waiting[i];
            if trip.origin != floor || trip.direction() != departure {
                i += 1;
                continue;
            }
            self.waiting.remove(i);
            self.cars[vehicle]
                .riders
                .push((trip.passenger, trip.destination));
            assert!(
                self.boarded.insert(trip.passenger, vehicle).is_none(),
                "passenger {} boarded twice",
                trip.passenger
            );
            let commands = self.controller.handle(Event::PassengerBoard {
                vehicle,
                passenger: trip.passenger,
            });
            assert!(commands.is_empty());
        }
    }

    fn step(&mut self, vehicle: VehicleId) {
        let Some(target) = self.cars[vehicle].target else {
            return;
        };
        let floor = self.cars[vehicle].floor;
        if floor != target {
            let direction = Direction::between(floor, target);
            let next = floor + direction.step();
            self.cars[vehicle].floor = next;
            let event = if next == target {
                Event::ElevatorApproaching {
                    vehicle,
                    floor: next,
                    direction,
                }
            } else {
                Event::ElevatorPassingFloor {
                    vehicle,
                    floor: next,
                    direction,
                }
            };
            let commands = self.controller.handle(event);
            self.apply(commands);
        }
        if self.cars[vehicle].target == Some(self.cars[vehicle].floor) {
            self.arrive(vehicle);
        }
    }

    fn arrive(&mut self, vehicle: VehicleId) {
        let car = &mut self.cars[vehicle];
        let floor = car.floor;
        car.target = None;
        let (off, stay): (Vec<_>, Vec<_>) = car.riders.drain(..).partition(|&(_, d)| d == floor);
        car.riders = stay;
        for (passenger, _) in off {
            self.controller.handle(Event::PassengerAlight {
                vehicle,
                passenger,
                floor,
            });
            self.delivered += 1;
        }

        let commands = self.controller.handle(Event::ElevatorStopped { vehicle, floor });
        self.apply(commands);
        if self.cars[vehicle].target.is_none() {
            let commands = self.controller.handle(Event::ElevatorIdle { vehicle });
            self.apply(commands);
        }
    }

    fn run_tick(&mut self, arrivals: &[Trip]) {
        self.controller.handle(Event::TickStart { tick: self.tick });
        for &trip in arrivals {
            self.waiting.push(trip);
            let commands = self.controller.handle(Event::PassengerCall {
                passenger: trip.passenger,
                origin: trip.origin,
                destination: trip.destination,
                direction: trip.direction(),
                tick: trip.tick,
            });
            self.apply(commands);
        }
        for vehicle in 0..self.cars.len() {
            self.step(vehicle);
        }
        let commands = self.controller.handle(Event::TickEnd { tick: self.tick });
        self.apply(commands);
        self.check();
        self.tick += 1;
    }

    fn check(&self) {
        for (id, car) in self.cars.iter().enumerate() {
            assert!(car.riders.len() <= car.capacity);
            let mirrored = self.controller.world().vehicle(id).map(VehicleState::load);
            assert_eq!(mirrored, Some(car.riders.len()), "vehicle {id} load out of sync");
        }
    }

    /// Runs until every trip is delivered or `max_ticks` pass.
    fn run(&mut self, trips: &[Trip], max_ticks: Tick) {
        let total = trips.len();
        while self.tick < max_ticks {
            let arrivals: Vec<Trip> = trips.iter().copied().filter(|t| t.tick == self.tick).collect();
            self.run_tick(&arrivals);
            let last_call = trips.iter().map(|t| t.tick).max().unwrap_or(0);
            if self.delivered == total && self.tick > last_call {
                break;
            }
        }
    }
}

fn random_trips(seed: u64, count: usize, floor_count: usize, horizon: Tick) -> Vec<Trip> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let top = floor_count as FloorIndex;
    (0..count)
        .map(|i| {
            let origin = rng.random_range(0..top);
            let mut destination = rng.random_range(0..top);
            while destination == origin {
                destination = rng.random_range(0..top);
            }
            Trip {
                passenger: i as PassengerId + 1,
                origin,
                destination,
                tick: rng.random_range(0..horizon),
            }
        })
        .collect()
}

fn assert_all_served(sim: &Simulation, trips: &[Trip]) {
    assert_eq!(sim.delivered, trips.len(), "waiting: {:?}", sim.waiting);
    assert!(sim.waiting.is_empty());
    assert_eq!(sim.boarded.len(), trips.len());
    assert_eq!(sim.null_moves, 0);
    assert!(sim.controller.registry().is_empty());
    let kpi = sim.controller.kpi();
    assert_eq!(kpi.delivered, trips.len());
    assert!((kpi.completion_rate - 1.0).abs() < 1e-10);
}

#[test]
fn test_cost_based_serves_everyone() {
    let trips = random_trips(42, 60, 10, 200);
    let mut sim = Simulation::new(DispatchConfig::default(), &[(0, 8), (9, 8), (4, 8)], 10);
    sim.run(&trips, 5_000);
    assert_all_served(&sim, &trips);
}

#[test]
fn test_nearest_serves_everyone() {
    let trips = random_trips(7, 40, 8, 150);
    let config = DispatchConfig::default().with_strategy(Strategy::Nearest);
    let mut sim = Simulation::new(config, &[(0, 6), (7, 6)], 8);
    sim.run(&trips, 5_000);
    assert_all_served(&sim, &trips);
}

#[test]
fn test_reactive_serves_everyone() {
    let trips = random_trips(3, 40, 8, 150);
    let config = DispatchConfig::default().with_strategy(Strategy::Reactive);
    let mut sim = Simulation::new(config, &[(0, 6), (7, 6)], 8);
    sim.run(&trips, 5_000);
    assert_all_served(&sim, &trips);
}

#[test]
fn test_small_cars_under_rush() {
    // Everyone starts at the lobby within a few ticks; two seats per car.
    let mut rng = SmallRng::seed_from_u64(11);
    let trips: Vec<Trip> = (0..30)
        .map(|i| Trip {
            passenger: i + 1,
            origin: 0,
            destination: rng.random_range(1..10),
            tick: rng.random_range(0..10),
        })
        .collect();
    let mut sim = Simulation::new(DispatchConfig::default(), &[(0, 2), (5, 2)], 10);
    sim.run(&trips, 5_000);
    assert_all_served(&sim, &trips);
}

#[test]
fn test_spread_and_no_opportunistic_stops() {
    let trips = random_trips(99, 30, 12, 120);
    let config = DispatchConfig::default()
        .with_spread_on_init(true)
        .with_opportunistic_stops(false);
    let mut sim = Simulation::new(config, &[(0, 8), (0, 8), (0, 8)], 12);
    assert_eq!(sim.cars[2].target, Some(11));
    sim.run(&trips, 5_000);
    assert_all_served(&sim, &trips);
}
