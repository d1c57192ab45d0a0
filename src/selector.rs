//! Reactive next-floor selection.
//!
//! Stateless LOOK decision for a single vehicle: given where it is, the way
//! it is sweeping and the floors where somebody needs service, pick the next
//! floor to head for. The result is never the current floor.
//!
//! # Algorithm
//!
//! - Empty vehicle: nearest demand of either direction (ties to the lower
//!   floor). Demand at the current floor with the wrong direction is
//!   answered by stepping one floor towards it.
//! - Loaded vehicle sweeping up: nearest up-demand above, else farthest
//!   down-demand above, else farthest down-demand below, else nearest
//!   up-demand below. Sweeping down mirrors this.
//!
//! # Reference
//! Denning (1967), "Effects of Scheduling on File Memory Operations" (SCAN/LOOK)

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::models::{Direction, FloorIndex, FloorState};

/// Floors with pending service, split by the direction it needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Demand {
    pub up: BTreeSet<FloorIndex>,
    pub down: BTreeSet<FloorIndex>,
}

impl Demand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds floors with waiting passengers.
    pub fn with_waiting<'a>(mut self, floors: impl IntoIterator<Item = &'a FloorState>) -> Self {
        for f in floors {
            if f.has_waiting(Direction::Up) {
                self.up.insert(f.floor);
            }
            if f.has_waiting(Direction::Down) {
                self.down.insert(f.floor);
            }
        }
        self
    }

    /// Adds onboard destinations seen from `current`.
    pub fn with_destinations(
        mut self,
        current: FloorIndex,
        destinations: impl IntoIterator<Item = FloorIndex>,
    ) -> Self {
        for d in destinations {
            match Direction::between(current, d) {
                Direction::Up => {
                    self.up.insert(d);
                }
                Direction::Down => {
                    self.down.insert(d);
                }
                Direction::Stopped => {}
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.up.is_empty() && self.down.is_empty()
    }

    fn nearest_excluding(&self, current: FloorIndex, exclude_current: bool) -> Option<FloorIndex> {
        self.up
            .iter()
            .chain(self.down.iter())
            .copied()
            .filter(|&f| !exclude_current || f != current)
            .min_by_key(|&f| ((f - current).abs(), f))
    }
}

/// Picks the next floor for a vehicle, or `None` when nothing needs service.
pub fn select_next_floor(
    current: FloorIndex,
    scan: Direction,
    demand: &Demand,
    is_empty: bool,
    top_floor: FloorIndex,
) -> Option<FloorIndex> {
    if demand.is_empty() {
        return None;
    }

    let target = if is_empty {
        select_empty(current, demand, top_floor)
    } else {
        let swept = match scan {
            Direction::Down => sweep_down(current, demand),
            _ => sweep_up(current, demand),
        };
        swept.or_else(|| nudge(current, demand, top_floor))
    };

    debug_assert!(target != Some(current));
    debug!("select: floor {current} scan {scan} empty={is_empty} -> {target:?}");
    target
}

fn select_empty(current: FloorIndex, demand: &Demand, top_floor: FloorIndex) -> Option<FloorIndex> {
    let nearest = demand.nearest_excluding(current, false)?;
    if nearest != current {
        return Some(nearest);
    }
    nudge(current, demand, top_floor).or_else(|| demand.nearest_excluding(current, true))
}

/// One floor towards demand waiting at the current floor.
fn nudge(current: FloorIndex, demand: &Demand, top_floor: FloorIndex) -> Option<FloorIndex> {
    if demand.down.contains(&current) && current > 0 {
        Some(current - 1)
    } else if demand.up.contains(&current) && current < top_floor {
        Some(current + 1)
    } else {
        None
    }
}

fn sweep_up(current: FloorIndex, demand: &Demand) -> Option<FloorIndex> {
    let above = (current + 1)..;
    demand
        .up
        .range(above.clone())
        .next()
        .or_else(|| demand.down.range(above).next_back())
        .or_else(|| demand.down.range(..current).next())
        .or_else(|| demand.up.range(..current).next_back())
        .copied()
}

fn sweep_down(current: FloorIndex, demand: &Demand) -> Option<FloorIndex> {
    let above = (current + 1)..;
    demand
        .down
        .range(..current)
        .next_back()
        .or_else(|| demand.up.range(..current).next())
        .or_else(|| demand.up.range(above.clone()).next_back())
        .or_else(|| demand.down.range(above).next())
        .copied()
}

/// Parking target for a vehicle without work.
///
/// Heads for `park_floor`; a vehicle already there steps one floor away so
/// the command is never a no-op. A single-floor building has no target.
pub fn park_target(
    current: FloorIndex,
    park_floor: FloorIndex,
    top_floor: FloorIndex,
) -> Option<FloorIndex> {
    if top_floor <= 0 {
        warn!("single-floor building: no parking move possible");
        return None;
    }
    let park = park_floor.clamp(0, top_floor);
    if current != park {
        Some(park)
    } else if park < top_floor {
        Some(park + 1)
    } else {
        Some(park - 1)
    }
}
