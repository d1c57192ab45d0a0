//! Input validation for the event feed.
//!
//! Checks the building description at init and every passenger call
//! before it reaches the registry. Detects:
//! - Empty buildings and fleets
//! - Duplicate or non-contiguous vehicle ids
//! - Zero-capacity or overloaded vehicles
//! - Floors outside the building
//! - Zero-length trips and inconsistent call directions
//!
//! All problems are collected; nothing here panics.

use std::collections::HashSet;

use crate::models::{Direction, FloorIndex, VehicleId, VehicleState};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// The building has no floors.
    NoFloors,
    /// The fleet has no vehicles.
    NoVehicles,
    /// Two vehicles share the same id.
    DuplicateId,
    /// Vehicle ids are not exactly `0..n`.
    NonContiguousId,
    /// A vehicle cannot carry anybody.
    ZeroCapacity,
    /// A vehicle starts with more passengers than seats.
    OverCapacity,
    /// A floor lies outside `0..floor_count`.
    FloorOutOfRange,
    /// Origin equals destination.
    ZeroLengthTrip,
    /// The stated direction disagrees with origin and destination.
    DirectionMismatch,
    /// An event names a vehicle that does not exist.
    UnknownVehicle,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

fn floor_in_range(floor: FloorIndex, floor_count: usize) -> bool {
    floor >= 0 && (floor as usize) < floor_count
}

/// Validates the building and fleet sent at init.
///
/// Checks:
/// 1. At least one floor and one vehicle
/// 2. No duplicate vehicle ids, and ids are exactly `0..n`
/// 3. Every vehicle has a seat, and no more passengers than seats
/// 4. Every vehicle starts inside the building
pub fn validate_init(vehicles: &[VehicleState], floor_count: usize) -> ValidationResult {
    let mut errors = Vec::new();

    if floor_count == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoFloors,
            "Building has no floors",
        ));
    }
    if vehicles.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoVehicles,
            "Fleet has no vehicles",
        ));
    }

    let mut ids = HashSet::new();
    for v in vehicles {
        if !ids.insert(v.id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate vehicle ID: {}", v.id),
            ));
        }
        if v.capacity == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::ZeroCapacity,
                format!("Vehicle {} has zero capacity", v.id),
            ));
        } else if v.load() > v.capacity {
            errors.push(ValidationError::new(
                ValidationErrorKind::OverCapacity,
                format!(
                    "Vehicle {} carries {} passengers with {} seats",
                    v.id,
                    v.load(),
                    v.capacity
                ),
            ));
        }
        if floor_count > 0 && !floor_in_range(v.floor, floor_count) {
            errors.push(ValidationError::new(
                ValidationErrorKind::FloorOutOfRange,
                format!("Vehicle {} starts at floor {} of {floor_count}", v.id, v.floor),
            ));
        }
    }

    if ids.len() == vehicles.len() && ids.iter().any(|&id| id >= vehicles.len()) {
        errors.push(ValidationError::new(
            ValidationErrorKind::NonContiguousId,
            format!("Vehicle IDs must be 0..{}", vehicles.len()),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a passenger call.
///
/// Checks both floors lie inside the building and the trip has length.
/// Direction disagreement is reported separately by [`check_direction`].
pub fn validate_call(
    origin: FloorIndex,
    destination: FloorIndex,
    floor_count: usize,
) -> ValidationResult {
    let mut errors = Vec::new();

    for (what, floor) in [("origin", origin), ("destination", destination)] {
        if !floor_in_range(floor, floor_count) {
            errors.push(ValidationError::new(
                ValidationErrorKind::FloorOutOfRange,
                format!("Call {what} {floor} outside 0..{floor_count}"),
            ));
        }
    }
    if origin == destination {
        errors.push(ValidationError::new(
            ValidationErrorKind::ZeroLengthTrip,
            format!("Call from floor {origin} to itself"),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Reports a stated direction that disagrees with origin and destination.
pub fn check_direction(
    origin: FloorIndex,
    destination: FloorIndex,
    stated: Direction,
) -> Option<ValidationError> {
    let derived = Direction::between(origin, destination);
    if stated == derived || !derived.is_moving() {
        return None;
    }
    Some(ValidationError::new(
        ValidationErrorKind::DirectionMismatch,
        format!("Call {origin}->{destination} stated {stated}, travels {derived}"),
    ))
}

/// Validates a vehicle reference against the fleet size.
pub fn validate_vehicle(vehicle: VehicleId, fleet_size: usize) -> ValidationResult {
    if vehicle < fleet_size {
        Ok(())
    } else {
        Err(vec![ValidationError::new(
            ValidationErrorKind::UnknownVehicle,
            format!("Unknown vehicle {vehicle} (fleet of {fleet_size})"),
        )])
    }
}
