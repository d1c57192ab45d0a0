//! Outstanding transport requests.
//!
//! One [`Request`] per passenger from call to alighting. Backed by an
//! ordered map so every iteration is deterministic. Operations on unknown
//! passengers are no-ops.

use std::collections::BTreeMap;

use log::debug;

use crate::models::{FloorIndex, PassengerId, Request, Tick, VehicleId};

/// Registry of requests keyed by passenger id.
#[derive(Debug, Clone, Default)]
pub struct RequestRegistry {
    requests: BTreeMap<PassengerId, Request>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a request.
    ///
    /// Returns `false` for zero-length trips and for passengers already
    /// registered (the existing entry is kept).
    pub fn add_request(
        &mut self,
        passenger: PassengerId,
        origin: FloorIndex,
        destination: FloorIndex,
        tick: Tick,
    ) -> bool {
        if origin == destination {
            debug!("passenger {passenger}: zero-length trip at floor {origin} ignored");
            return false;
        }
        if self.requests.contains_key(&passenger) {
            debug!("passenger {passenger}: already registered");
            return false;
        }
        self.requests
            .insert(passenger, Request::new(passenger, origin, destination, tick));
        true
    }

    /// Unassigned requests, highest priority first, then by passenger id.
    pub fn pending_requests(&self) -> Vec<&Request> {
        let mut pending: Vec<&Request> =
            self.requests.values().filter(|r| !r.is_assigned()).collect();
        pending.sort_by(|a, b| {
            b.priority
                .partial_cmp(&a.priority)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.passenger.cmp(&b.passenger))
        });
        pending
    }

    /// Ids of the pending requests in processing order.
    pub fn pending_ids(&self) -> Vec<PassengerId> {
        self.pending_requests()
            .into_iter()
            .map(|r| r.passenger)
            .collect()
    }

    /// Assigns a request to a vehicle, replacing any previous assignment.
    pub fn assign(&mut self, passenger: PassengerId, vehicle: VehicleId, tick: Tick) -> bool {
        match self.requests.get_mut(&passenger) {
            Some(r) => {
                r.assigned = Some(vehicle);
                r.assigned_tick = Some(tick);
                true
            }
            None => false,
        }
    }

    /// Clears the assignment. Returns the previous vehicle.
    pub fn unassign(&mut self, passenger: PassengerId) -> Option<VehicleId> {
        let r = self.requests.get_mut(&passenger)?;
        r.assigned_tick = None;
        r.assigned.take()
    }

    /// Drops a request.
    pub fn remove(&mut self, passenger: PassengerId) -> Option<Request> {
        self.requests.remove(&passenger)
    }

    /// Sets every priority to the current wait time.
    pub fn update_priorities(&mut self, tick: Tick) {
        for r in self.requests.values_mut() {
            r.priority = r.wait_time(tick) as f64;
        }
    }

    pub fn get(&self, passenger: PassengerId) -> Option<&Request> {
        self.requests.get(&passenger)
    }

    pub fn contains(&self, passenger: PassengerId) -> bool {
        self.requests.contains_key(&passenger)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Requests assigned to `vehicle`, by passenger id.
    pub fn assigned_to(&self, vehicle: VehicleId) -> Vec<&Request> {
        self.requests
            .values()
            .filter(|r| r.assigned == Some(vehicle))
            .collect()
    }

    /// All requests, by passenger id.
    pub fn iter(&self) -> impl Iterator<Item = &Request> {
        self.requests.values()
    }
}
