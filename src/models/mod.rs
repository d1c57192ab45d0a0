//! Dispatching domain models.
//!
//! Provides the core data types shared by the selector, dispatcher,
//! planner and executor.
//!
//! # Domain Mappings
//!
//! | u-dispatch | Elevator bank | Ride pooling |
//! |------------|---------------|--------------|
//! | Vehicle | Car | Shuttle |
//! | Floor | Landing | Stop |
//! | Request | Hall call + destination | Trip request |
//! | Task | Door-open at a landing | Pickup/drop at a stop |
//! | VehiclePlan | Car itinerary | Route |
//!
//! # Identifiers
//! Vehicles are addressed by a dense index (`0..n`) so per-vehicle state can
//! live in plain arenas. Floors are signed so distance arithmetic never
//! underflows; valid floors are `0..floor_count`.

mod direction;
mod plan;
mod request;
mod task;
mod vehicle;

pub use direction::Direction;
pub use plan::VehiclePlan;
pub use request::Request;
pub use task::{Task, TaskKey, TaskKind};
pub use vehicle::{FloorState, VehicleState};

/// Dense vehicle index, stable for the lifetime of a run.
pub type VehicleId = usize;

/// Passenger identifier as issued by the simulator.
pub type PassengerId = u64;

/// Floor index (0 = ground).
pub type FloorIndex = i32;

/// Simulation tick.
pub type Tick = i64;
