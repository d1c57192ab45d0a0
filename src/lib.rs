//! Elevator group dispatching core.
//!
//! Decides where each car of an elevator group goes next. The crate is a
//! pure decision engine: a simulator feeds it events (calls, stops, boarding)
//! and receives `GoToFloor` commands back. Two families of decision logic are
//! provided: a reactive LOOK selector, and a planner that assigns requests by
//! weighted cost and keeps a phase-ordered, capacity-checked stop queue per
//! vehicle.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Direction`, `VehicleState`, `FloorState`,
//!   `Request`, `Task`, `VehiclePlan`
//! - **`config`**: `DispatchConfig`, cost weights, strategy selection
//! - **`scan`**: Per-vehicle sweep direction memory
//! - **`registry`**: Outstanding requests and their assignments
//! - **`selector`**: Stateless LOOK next-floor choice and parking fallback
//! - **`dispatching`**: Cost terms, the weighted `CostEngine`, nearest-car ranking
//! - **`planner`**: Phase ordering, stop merging, capacity enforcement
//! - **`executor`**: Per-vehicle task queues kept in step with events
//! - **`scheduler`**: The event-driven `Controller` and service KPIs
//! - **`validation`**: Input integrity checks for init and calls
//!
//! # References
//!
//! - Barney & Al-Sharif (2015), "Elevator Traffic Handbook"
//! - Denning (1967), "Effects of Scheduling on File Memory Operations"
//! - Cortes, Larrañeta & Onieva (2004), "Genetic algorithm for controllers in
//!   elevator groups: analysis and simulation during lunchpeak traffic"

pub mod config;
pub mod dispatching;
pub mod executor;
pub mod models;
pub mod planner;
pub mod registry;
pub mod scan;
pub mod scheduler;
pub mod selector;
pub mod validation;
