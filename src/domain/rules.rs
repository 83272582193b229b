//! Guard rules shared by the application services
//!
//! Every function here is pure: it inspects already-loaded documents and
//! either returns a normalized value or the error the caller should surface.

use validator::ValidateEmail;

use crate::domain::catalog::MuscleGroup;
use crate::domain::client::Client;
use crate::domain::routine::{Routine, SetSpecInput};
use crate::shared::error::{AppError, AppResult};

/// Trimmed, non-blank text
pub fn require_text(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Trim optional text, treating blank as absent
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Lower-cased, trimmed and well-formed email
pub fn normalize_email(email: &str) -> AppResult<String> {
    let email = require_text(email, "email")?.to_lowercase();
    if !email.validate_email() {
        return Err(AppError::Validation(format!("email is malformed: {}", email)));
    }
    Ok(email)
}

/// Drop repeated IDs, keeping the first occurrence
pub fn dedupe_ids(ids: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.trim();
        if !id.is_empty() && !unique.iter().any(|u| u == id) {
            unique.push(id.to_string());
        }
    }
    unique
}

/// Every exercise must be an exact member of the group's exercise set.
/// The error lists all offending IDs.
pub fn ensure_group_members(group: &MuscleGroup, exercise_ids: &[String]) -> AppResult<()> {
    let outsiders: Vec<&str> = exercise_ids
        .iter()
        .filter(|id| !group.contains(id))
        .map(String::as_str)
        .collect();

    if outsiders.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "exercises do not belong to muscle group {}: {}",
            group.name,
            outsiders.join(", ")
        )))
    }
}

pub fn validate_set_spec(spec: &SetSpecInput) -> AppResult<()> {
    if spec.sets == 0 {
        return Err(AppError::Validation("set count must be greater than zero".to_string()));
    }
    if spec.repetitions == 0 {
        return Err(AppError::Validation("repetitions must be greater than zero".to_string()));
    }
    if spec.weight.is_some_and(|w| w < 0.0 || !w.is_finite()) {
        return Err(AppError::Validation("weight cannot be negative".to_string()));
    }
    Ok(())
}

/// A routine needs at least one exercise and one valid set prescription
pub fn validate_routine_contents(exercise_ids: &[String], set_specs: &[SetSpecInput]) -> AppResult<()> {
    if exercise_ids.is_empty() || set_specs.is_empty() {
        return Err(AppError::Validation(
            "a routine needs exercises and set specifications".to_string(),
        ));
    }
    set_specs.iter().try_for_each(validate_set_spec)
}

pub fn ensure_not_assigned(client: &Client, routine_id: &str) -> AppResult<()> {
    if client.has_routine(routine_id) {
        return Err(AppError::Conflict(format!(
            "routine {} is already assigned to client {}",
            routine_id, client.id
        )));
    }
    Ok(())
}

pub fn ensure_assigned(client: &Client, routine_id: &str) -> AppResult<()> {
    if !client.has_routine(routine_id) {
        return Err(AppError::Validation(format!(
            "routine {} is not assigned to client {}",
            routine_id, client.id
        )));
    }
    Ok(())
}

/// Checks for swapping `old` for `new` inside a routine whose group is
/// `group`. `NotFound` when `old` is not in the routine, `Conflict` when
/// `new` already is, `Validation` when `new` is outside the group.
pub fn ensure_replaceable(routine: &Routine, group: &MuscleGroup, old: &str, new: &str) -> AppResult<()> {
    if !routine.contains_exercise(old) {
        return Err(AppError::NotFound(format!(
            "exercise {} is not part of routine {}",
            old, routine.name
        )));
    }
    if routine.contains_exercise(new) {
        return Err(AppError::Conflict(format!(
            "exercise {} is already part of routine {}",
            new, routine.name
        )));
    }
    if !group.contains(new) {
        return Err(AppError::Validation(format!(
            "exercise {} does not belong to muscle group {}",
            new, group.name
        )));
    }
    Ok(())
}
