use crate::application::services::ExerciseDraft;
use crate::domain::{RoutineDraft, RoutineLevel, SetSpecInput};
use crate::shared::error::AppError;
use crate::tests::fixtures::TestContext;

fn leg_day(group_id: &str, exercises: Vec<String>) -> RoutineDraft {
    RoutineDraft {
        name: "LegDay".to_string(),
        muscle_group_id: group_id.to_string(),
        level: RoutineLevel::Level1,
        exercise_ids: exercises,
        set_specs: vec![SetSpecInput {
            sets: 4,
            repetitions: 8,
            weight: Some(60.0),
            rest_seconds: Some(120),
        }],
    }
}

#[tokio::test]
async fn test_legs_squat_leg_day() {
    let ctx = TestContext::new();
    let (legs, squat) = ctx.legs_with_squat().await;
    assert_eq!(legs.exercise_ids, vec![squat.clone()]);

    let routine = ctx
        .services
        .routines
        .create_routine(leg_day(&legs.id, vec![squat.clone()]))
        .await
        .unwrap();
    assert_eq!(routine.name, "LegDay");
    assert_eq!(routine.level, RoutineLevel::Level1);
    assert_eq!(routine.exercise_ids, vec![squat]);

    let chest = ctx.services.catalog.create_muscle_group("Chest", None, &[]).await.unwrap();
    let bench = ctx
        .services
        .catalog
        .create_exercise(ExerciseDraft {
            name: "Bench".to_string(),
            description: "Flat bench press".to_string(),
            execution: "Bar to chest".to_string(),
            muscle_group_id: chest.id,
        })
        .await
        .unwrap();

    let mut other = leg_day(&legs.id, vec![bench.id]);
    other.name = "LegDay 2".to_string();
    let err = ctx.services.routines.create_routine(other).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "{:?}", err);
}

#[tokio::test]
async fn test_duplicate_routine_name_conflicts() {
    let ctx = TestContext::new();
    let (legs, squat) = ctx.legs_with_squat().await;

    ctx.services
        .routines
        .create_routine(leg_day(&legs.id, vec![squat.clone()]))
        .await
        .unwrap();
    let mut again = leg_day(&legs.id, vec![squat]);
    again.name = "  legday ".to_string();

    let err = ctx.services.routines.create_routine(again).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_client_routines_follow_assignment() {
    let ctx = TestContext::new();
    let (legs, squat) = ctx.legs_with_squat().await;
    let routine = ctx
        .services
        .routines
        .create_routine(leg_day(&legs.id, vec![squat]))
        .await
        .unwrap();
    let client_id = ctx.register("legs@x.com").await;

    ctx.services.clients.assign_routine(&routine.id, &client_id).await.unwrap();
    let routines = ctx.services.routines.routines_for_client(&client_id).await.unwrap();
    assert_eq!(routines.len(), 1);
    assert_eq!(routines[0].id, routine.id);

    // Deleting the routine leaves a dangling reference that listings skip
    ctx.services.routines.delete_routine(&routine.id).await.unwrap();
    assert!(ctx.services.routines.routines_for_client(&client_id).await.unwrap().is_empty());
}
