//! Exercise and muscle group catalog

use std::collections::HashMap;

use tracing::{error, info, warn};

use crate::domain::rules::{dedupe_ids, optional_text, require_text};
use crate::domain::{new_id, Exercise, MuscleGroup};
use crate::infrastructure::adapters::Store;
use crate::shared::error::{AppError, AppResult};

/// Fields of a new exercise
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseDraft {
    pub name: String,
    pub description: String,
    pub execution: String,
    pub muscle_group_id: String,
}

/// Keeps exercises and their owning muscle groups consistent: every
/// exercise is listed in its group's exercise set.
pub struct CatalogService {
    store: Store,
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

impl CatalogService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub async fn create_muscle_group(
        &self,
        name: &str,
        description: Option<&str>,
        exercise_ids: &[String],
    ) -> AppResult<MuscleGroup> {
        let name = require_text(name, "muscle group name")?;

        if self
            .store
            .muscle_groups
            .find_one(|g| same_name(&g.name, &name))
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!("muscle group {} already exists", name)));
        }

        let exercise_ids = dedupe_ids(exercise_ids);
        let mut missing = Vec::new();
        let mut owned = Vec::new();
        for id in &exercise_ids {
            match self.store.exercises.get(id).await? {
                None => missing.push(id.as_str()),
                Some(exercise) => {
                    if self.store.muscle_groups.get(&exercise.muscle_group_id).await?.is_some() {
                        owned.push(exercise.name);
                    }
                }
            }
        }
        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "exercises do not exist: {}",
                missing.join(", ")
            )));
        }
        // An exercise belongs to exactly one group
        if !owned.is_empty() {
            return Err(AppError::Conflict(format!(
                "exercises already belong to another muscle group: {}",
                owned.join(", ")
            )));
        }

        let group = MuscleGroup {
            id: new_id(),
            name,
            description: optional_text(description),
            exercise_ids,
        };
        self.store.muscle_groups.insert(&group).await?;

        // Exercises left without a group are moved into the new one
        for id in &group.exercise_ids {
            self.store
                .exercises
                .update(id, "exercise", |exercise| {
                    exercise.muscle_group_id = group.id.clone();
                    Ok(())
                })
                .await?;
        }

        info!(muscle_group_id = %group.id, name = %group.name, "Muscle group created");
        Ok(group)
    }

    /// Create an exercise and append it to its muscle group. When the group
    /// update fails the exercise is removed again.
    pub async fn create_exercise(&self, draft: ExerciseDraft) -> AppResult<Exercise> {
        let name = require_text(&draft.name, "exercise name")?;

        if self
            .store
            .exercises
            .find_one(|e| same_name(&e.name, &name))
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!("exercise {} already exists", name)));
        }

        self.store
            .muscle_groups
            .require(&draft.muscle_group_id, "muscle group")
            .await?;

        let exercise = Exercise {
            id: new_id(),
            name,
            description: draft.description.trim().to_string(),
            execution: draft.execution.trim().to_string(),
            muscle_group_id: draft.muscle_group_id,
        };
        self.store.exercises.insert(&exercise).await?;

        let linked = self
            .store
            .muscle_groups
            .update(&exercise.muscle_group_id, "muscle group", |group| {
                group.add_exercise(&exercise.id);
                Ok(())
            })
            .await;

        if let Err(e) = linked {
            warn!(
                exercise_id = %exercise.id,
                muscle_group_id = %exercise.muscle_group_id,
                error = %e,
                "Linking exercise to muscle group failed, removing exercise"
            );
            if let Err(cleanup) = self.store.exercises.delete(&exercise.id).await {
                error!(
                    exercise_id = %exercise.id,
                    error = %cleanup,
                    "Compensating delete failed; run reconcileMuscleGroups"
                );
            }
            return Err(e);
        }

        info!(exercise_id = %exercise.id, name = %exercise.name, "Exercise created");
        Ok(exercise)
    }

    pub async fn edit_exercise(
        &self,
        id: &str,
        name: &str,
        description: &str,
        execution: &str,
    ) -> AppResult<Exercise> {
        self.store.exercises.require(id, "exercise").await?;

        let name = require_text(name, "exercise name")?;
        let description = require_text(description, "exercise description")?;
        let execution = require_text(execution, "exercise execution")?;

        if self
            .store
            .exercises
            .find_one(|e| e.id != id && same_name(&e.name, &name))
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!("exercise {} already exists", name)));
        }

        self.store
            .exercises
            .update(id, "exercise", |exercise| {
                exercise.name = name.clone();
                exercise.description = description.clone();
                exercise.execution = execution.clone();
                Ok(())
            })
            .await
    }

    /// Re-add every exercise missing from its group's exercise set and
    /// drop set entries whose exercise is gone or points at another group.
    /// Returns the number of repaired links.
    pub async fn reconcile_memberships(&self) -> AppResult<usize> {
        let mut repaired = 0;
        let exercises = self.store.exercises.list().await?;

        for exercise in &exercises {
            if self.store.muscle_groups.get(&exercise.muscle_group_id).await?.is_none() {
                warn!(
                    exercise_id = %exercise.id,
                    muscle_group_id = %exercise.muscle_group_id,
                    "Exercise references a muscle group that no longer exists"
                );
                continue;
            }

            let (_, changed) = self
                .store
                .muscle_groups
                .modify(&exercise.muscle_group_id, "muscle group", |group| {
                    group.add_exercise(&exercise.id);
                    Ok(())
                })
                .await?;
            if changed {
                repaired += 1;
            }
        }

        let owners: HashMap<&str, &str> = exercises
            .iter()
            .map(|e| (e.id.as_str(), e.muscle_group_id.as_str()))
            .collect();
        for group in self.store.muscle_groups.list().await? {
            let stale = group
                .exercise_ids
                .iter()
                .filter(|id| owners.get(id.as_str()) != Some(&group.id.as_str()))
                .count();
            if stale == 0 {
                continue;
            }

            let (_, changed) = self
                .store
                .muscle_groups
                .modify(&group.id, "muscle group", |g| {
                    let group_id = g.id.clone();
                    g.exercise_ids
                        .retain(|id| owners.get(id.as_str()) == Some(&group_id.as_str()));
                    Ok(())
                })
                .await?;
            if changed {
                warn!(muscle_group_id = %group.id, removed = stale, "Removed foreign exercises from muscle group");
                repaired += stale;
            }
        }

        info!(repaired = repaired, "Muscle group memberships reconciled");
        Ok(repaired)
    }

    pub async fn get_exercise(&self, id: &str) -> AppResult<Exercise> {
        self.store.exercises.require(id, "exercise").await
    }

    /// Exercises in creation order, optionally paginated
    pub async fn list_exercises(&self, limit: Option<usize>, offset: Option<usize>) -> AppResult<Vec<Exercise>> {
        let exercises = self.store.exercises.list().await?;
        Ok(exercises
            .into_iter()
            .skip(offset.unwrap_or(0))
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }

    /// Resolve references, skipping dangling ones
    pub async fn exercises_by_ids(&self, ids: &[String]) -> AppResult<Vec<Exercise>> {
        let mut exercises = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(exercise) = self.store.exercises.get(id).await? {
                exercises.push(exercise);
            }
        }
        Ok(exercises)
    }

    pub async fn get_muscle_group(&self, id: &str) -> AppResult<MuscleGroup> {
        self.store.muscle_groups.require(id, "muscle group").await
    }

    pub async fn list_muscle_groups(&self) -> AppResult<Vec<MuscleGroup>> {
        self.store.muscle_groups.list().await
    }
}
