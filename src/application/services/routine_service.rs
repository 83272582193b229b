//! Routine composition and maintenance

use tracing::info;

use crate::domain::rules::{
    dedupe_ids, ensure_group_members, ensure_replaceable, require_text, validate_routine_contents, validate_set_spec,
};
use crate::domain::{new_id, Routine, RoutineDraft, SetSpecInput};
use crate::infrastructure::adapters::Store;
use crate::shared::error::{AppError, AppResult};

pub struct RoutineService {
    store: Store,
}

/// A draft that passed every check, ready to be written
struct CheckedDraft {
    name: String,
    draft: RoutineDraft,
}

impl RoutineService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Shared create/modify validation. `own_id` is excluded from the name
    /// uniqueness check.
    async fn check_draft(&self, mut draft: RoutineDraft, own_id: Option<&str>) -> AppResult<CheckedDraft> {
        let name = require_text(&draft.name, "routine name")?;

        let taken = self
            .store
            .routines
            .find_one(|r| Some(r.id.as_str()) != own_id && r.name.trim().eq_ignore_ascii_case(&name))
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict(format!("routine {} already exists", name)));
        }

        draft.exercise_ids = dedupe_ids(&draft.exercise_ids);
        validate_routine_contents(&draft.exercise_ids, &draft.set_specs)?;

        let group = self
            .store
            .muscle_groups
            .require(&draft.muscle_group_id, "muscle group")
            .await?;
        ensure_group_members(&group, &draft.exercise_ids)?;

        Ok(CheckedDraft { name, draft })
    }

    pub async fn create_routine(&self, draft: RoutineDraft) -> AppResult<Routine> {
        let CheckedDraft { name, draft } = self.check_draft(draft, None).await?;

        let routine = Routine {
            id: new_id(),
            name,
            level: draft.level,
            muscle_group_id: draft.muscle_group_id,
            exercise_ids: draft.exercise_ids,
            set_specs: draft.set_specs.into_iter().map(SetSpecInput::into_spec).collect(),
        };
        self.store.routines.insert(&routine).await?;

        info!(routine_id = %routine.id, name = %routine.name, level = routine.level.as_str(), "Routine created");
        Ok(routine)
    }

    /// Replace every field of a routine. Set specifications get fresh IDs.
    pub async fn modify_routine(&self, id: &str, draft: RoutineDraft) -> AppResult<Routine> {
        self.store.routines.require(id, "routine").await?;
        let CheckedDraft { name, draft } = self.check_draft(draft, Some(id)).await?;
        let set_specs: Vec<_> = draft.set_specs.into_iter().map(SetSpecInput::into_spec).collect();

        let routine = self
            .store
            .routines
            .update(id, "routine", |routine| {
                routine.name = name.clone();
                routine.level = draft.level;
                routine.muscle_group_id = draft.muscle_group_id.clone();
                routine.exercise_ids = draft.exercise_ids.clone();
                routine.set_specs = set_specs.clone();
                Ok(())
            })
            .await?;

        info!(routine_id = %routine.id, "Routine modified");
        Ok(routine)
    }

    /// Client references to the routine are left in place and skipped on read
    pub async fn delete_routine(&self, id: &str) -> AppResult<()> {
        if !self.store.routines.delete(id).await? {
            return Err(AppError::NotFound(format!("routine {} does not exist", id)));
        }
        info!(routine_id = %id, "Routine deleted");
        Ok(())
    }

    pub async fn replace_exercise(&self, routine_id: &str, old_exercise_id: &str, new_exercise_id: &str) -> AppResult<Routine> {
        let routine = self.store.routines.require(routine_id, "routine").await?;
        if !routine.contains_exercise(old_exercise_id) {
            return Err(AppError::NotFound(format!(
                "exercise {} is not part of routine {}",
                old_exercise_id, routine.name
            )));
        }
        self.store.exercises.require(new_exercise_id, "exercise").await?;
        let group = self
            .store
            .muscle_groups
            .require(&routine.muscle_group_id, "muscle group")
            .await?;

        let routine = self
            .store
            .routines
            .update(routine_id, "routine", |routine| {
                ensure_replaceable(routine, &group, old_exercise_id, new_exercise_id)?;
                routine.replace_exercise(old_exercise_id, new_exercise_id);
                Ok(())
            })
            .await?;

        info!(
            routine_id = %routine_id,
            old_exercise_id = %old_exercise_id,
            new_exercise_id = %new_exercise_id,
            "Exercise replaced in routine"
        );
        Ok(routine)
    }

    pub async fn update_set_spec(&self, routine_id: &str, set_spec_id: &str, values: SetSpecInput) -> AppResult<Routine> {
        validate_set_spec(&values)?;

        self.store
            .routines
            .update(routine_id, "routine", |routine| {
                let name = routine.name.clone();
                let spec = routine.set_spec_mut(set_spec_id).ok_or_else(|| {
                    AppError::NotFound(format!("set specification {} is not part of routine {}", set_spec_id, name))
                })?;
                spec.sets = values.sets;
                spec.repetitions = values.repetitions;
                spec.weight = values.weight;
                spec.rest_seconds = values.rest_seconds;
                Ok(())
            })
            .await
    }

    pub async fn get_routine(&self, id: &str) -> AppResult<Routine> {
        self.store.routines.require(id, "routine").await
    }

    pub async fn list_routines(&self) -> AppResult<Vec<Routine>> {
        self.store.routines.list().await
    }

    /// Routines assigned to a client, skipping deleted ones
    pub async fn routines_for_client(&self, client_id: &str) -> AppResult<Vec<Routine>> {
        let client = self.store.clients.require(client_id, "client").await?;
        let mut routines = Vec::with_capacity(client.routine_ids.len());
        for id in &client.routine_ids {
            if let Some(routine) = self.store.routines.get(id).await? {
                routines.push(routine);
            }
        }
        Ok(routines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::catalog_service::{CatalogService, ExerciseDraft};
    use crate::domain::{MuscleGroup, RoutineLevel};

    struct Fixture {
        routines: RoutineService,
        catalog: CatalogService,
        legs: MuscleGroup,
        squat: String,
        lunge: String,
    }

    fn spec(sets: u32, repetitions: u32) -> SetSpecInput {
        SetSpecInput { sets, repetitions, weight: Some(40.0), rest_seconds: Some(90) }
    }

    async fn fixture() -> Fixture {
        let store = Store::in_memory();
        let catalog = CatalogService::new(store.clone());
        let legs = catalog.create_muscle_group("Legs", None, &[]).await.unwrap();
        let mut ids = Vec::new();
        for name in ["Squat", "Lunge"] {
            let exercise = catalog
                .create_exercise(ExerciseDraft {
                    name: name.to_string(),
                    description: "d".to_string(),
                    execution: "e".to_string(),
                    muscle_group_id: legs.id.clone(),
                })
                .await
                .unwrap();
            ids.push(exercise.id);
        }
        Fixture {
            routines: RoutineService::new(store),
            catalog,
            legs,
            squat: ids[0].clone(),
            lunge: ids[1].clone(),
        }
    }

    fn draft(name: &str, group: &str, exercises: Vec<String>) -> RoutineDraft {
        RoutineDraft {
            name: name.to_string(),
            muscle_group_id: group.to_string(),
            level: RoutineLevel::Level1,
            exercise_ids: exercises,
            set_specs: vec![spec(3, 10)],
        }
    }

    #[tokio::test]
    async fn test_create_routine() {
        let f = fixture().await;
        let routine = f
            .routines
            .create_routine(draft("LegDay", &f.legs.id, vec![f.squat.clone(), f.squat.clone()]))
            .await
            .unwrap();

        assert_eq!(routine.exercise_ids, vec![f.squat.clone()]);
        assert_eq!(routine.set_specs.len(), 1);
        assert_eq!(routine.level, RoutineLevel::Level1);

        assert!(matches!(
            f.routines.create_routine(draft("legday", &f.legs.id, vec![f.squat.clone()])).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_create_routine_rejects_invalid_contents() {
        let f = fixture().await;

        assert!(matches!(
            f.routines.create_routine(draft("A", &f.legs.id, vec![])).await,
            Err(AppError::Validation(_))
        ));

        let mut no_sets = draft("A", &f.legs.id, vec![f.squat.clone()]);
        no_sets.set_specs = vec![spec(0, 10)];
        assert!(matches!(f.routines.create_routine(no_sets).await, Err(AppError::Validation(_))));

        assert!(matches!(
            f.routines.create_routine(draft("A", "missing", vec![f.squat.clone()])).await,
            Err(AppError::NotFound(_))
        ));

        let arms = f.catalog.create_muscle_group("Arms", None, &[]).await.unwrap();
        let err = f
            .routines
            .create_routine(draft("A", &arms.id, vec![f.squat.clone()]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains(&f.squat));
    }

    #[tokio::test]
    async fn test_modify_routine_replaces_fields() {
        let f = fixture().await;
        let routine = f
            .routines
            .create_routine(draft("LegDay", &f.legs.id, vec![f.squat.clone()]))
            .await
            .unwrap();
        let old_spec_id = routine.set_specs[0].id.clone();

        let mut changed = draft("LegDay", &f.legs.id, vec![f.lunge.clone(), f.squat.clone()]);
        changed.level = RoutineLevel::Level3;
        let modified = f.routines.modify_routine(&routine.id, changed).await.unwrap();

        assert_eq!(modified.exercise_ids, vec![f.lunge.clone(), f.squat.clone()]);
        assert_eq!(modified.level, RoutineLevel::Level3);
        assert_ne!(modified.set_specs[0].id, old_spec_id);

        assert!(matches!(
            f.routines.modify_routine("missing", draft("X", &f.legs.id, vec![f.squat.clone()])).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_replace_exercise_preserves_order() {
        let f = fixture().await;
        let routine = f
            .routines
            .create_routine(draft("LegDay", &f.legs.id, vec![f.squat.clone()]))
            .await
            .unwrap();

        let replaced = f.routines.replace_exercise(&routine.id, &f.squat, &f.lunge).await.unwrap();
        assert_eq!(replaced.exercise_ids, vec![f.lunge.clone()]);

        assert!(matches!(
            f.routines.replace_exercise(&routine.id, &f.squat, &f.lunge).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            f.routines.replace_exercise(&routine.id, &f.lunge, "ghost").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            f.routines.replace_exercise(&routine.id, &f.lunge, &f.lunge).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_update_set_spec() {
        let f = fixture().await;
        let routine = f
            .routines
            .create_routine(draft("LegDay", &f.legs.id, vec![f.squat.clone()]))
            .await
            .unwrap();
        let spec_id = routine.set_specs[0].id.clone();

        let updated = f
            .routines
            .update_set_spec(&routine.id, &spec_id, spec(5, 5))
            .await
            .unwrap();
        assert_eq!(updated.set_specs[0].sets, 5);
        assert_eq!(updated.set_specs[0].id, spec_id);

        assert!(matches!(
            f.routines.update_set_spec(&routine.id, "ghost", spec(5, 5)).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            f.routines.update_set_spec(&routine.id, &spec_id, spec(5, 0)).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_routine() {
        let f = fixture().await;
        let routine = f
            .routines
            .create_routine(draft("LegDay", &f.legs.id, vec![f.squat.clone()]))
            .await
            .unwrap();

        f.routines.delete_routine(&routine.id).await.unwrap();
        assert!(matches!(f.routines.delete_routine(&routine.id).await, Err(AppError::NotFound(_))));
        assert!(f.routines.list_routines().await.unwrap().is_empty());
    }
}
