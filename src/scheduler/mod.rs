//! Event-driven group control and service metrics.
//!
//! The [`Controller`] ties the dispatch pieces together: it mirrors the
//! building in a [`World`], keeps the request registry and per-vehicle
//! plans, and answers each simulator [`Event`] with [`Command`]s.
//!
//! # Strategies
//!
//! - **Reactive**: every stopped or idle vehicle picks its next floor with
//!   the LOOK selector; nobody owns a request until they board.
//! - **CostBased**: requests are assigned to the cheapest vehicle whose plan
//!   can absorb them, and vehicles follow their phase-ordered plans.
//! - **Nearest**: as CostBased, ranking vehicles by travel time alone.
//!
//! # KPI
//!
//! `ServiceKpi` summarizes the trip records: wait, transit and system time,
//! and completion rate.
//!
//! # References
//!
//! - Barney & Al-Sharif (2015), "Elevator Traffic Handbook", Ch. 12-13
//! - Strakosch & Caporale (2010), "The Vertical Transportation Handbook"

mod controller;
mod kpi;
mod world;

#[cfg(test)]
mod harness;

pub use controller::{Command, Controller, Event};
pub use kpi::{ServiceKpi, TripRecord};
pub use world::World;
