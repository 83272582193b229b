use crate::application::ports::AvatarUpload;
use crate::domain::{RoutineDraft, RoutineLevel, SetSpecInput};
use crate::shared::error::AppError;
use crate::tests::fixtures::{new_client, TestContext};

async fn routine_for(ctx: &TestContext) -> String {
    let (legs, squat) = ctx.legs_with_squat().await;
    ctx.services
        .routines
        .create_routine(RoutineDraft {
            name: "LegDay".to_string(),
            muscle_group_id: legs.id,
            level: RoutineLevel::Conditioning,
            exercise_ids: vec![squat],
            set_specs: vec![SetSpecInput {
                sets: 3,
                repetitions: 12,
                weight: None,
                rest_seconds: None,
            }],
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_create_client_once_per_email() {
    let ctx = TestContext::new();

    let id = ctx
        .services
        .clients
        .create_client(new_client("a@x.com", "p"))
        .await
        .unwrap();
    let client = ctx.services.clients.get_client(&id).await.unwrap();
    assert!(!client.confirmed);
    assert_ne!(client.password_hash, "p");
    assert_eq!(ctx.mailer.sent().len(), 1);

    let err = ctx
        .services
        .clients
        .create_client(new_client("A@X.com ", "other"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "{:?}", err);
    assert_eq!(ctx.services.clients.list_clients().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_duplicate_national_id_conflicts() {
    let ctx = TestContext::new();
    let mut first = new_client("one@x.com", "p");
    first.national_id = Some("30111222".to_string());
    ctx.services.clients.create_client(first).await.unwrap();

    let mut second = new_client("two@x.com", "p");
    second.national_id = Some("30111222".to_string());
    let err = ctx.services.clients.create_client(second).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_registration_survives_mail_failure() {
    let ctx = TestContext::new();
    ctx.mailer.set_failing(true);

    let id = ctx.register("offline@x.com").await;

    assert!(ctx.services.clients.get_client(&id).await.is_ok());
    assert!(ctx.mailer.sent().is_empty());
}

#[tokio::test]
async fn test_assignment_rules() {
    let ctx = TestContext::new();
    let routine_id = routine_for(&ctx).await;
    let client_id = ctx.register("gym@x.com").await;

    let err = ctx
        .services
        .clients
        .unassign_routine(&routine_id, &client_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let client = ctx.services.clients.assign_routine(&routine_id, &client_id).await.unwrap();
    assert_eq!(client.routine_ids, vec![routine_id.clone()]);

    let err = ctx
        .services
        .clients
        .assign_routine(&routine_id, &client_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let client = ctx.services.clients.unassign_routine(&routine_id, &client_id).await.unwrap();
    assert!(client.routine_ids.is_empty());

    let err = ctx
        .services
        .clients
        .assign_routine("missing", &client_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_edit_client_and_settings() {
    let ctx = TestContext::new();
    let id = ctx.register("edit@x.com").await;

    let client = ctx
        .services
        .clients
        .edit_client(&id, "Lucía", "Pérez", Some(" 555-0101 "))
        .await
        .unwrap();
    assert_eq!(client.name, "Lucía");
    assert_eq!(client.phone.as_deref(), Some("555-0101"));

    let before = client.settings.clone();
    let settings = ctx
        .services
        .clients
        .update_settings(&id, None, Some("dark"))
        .await
        .unwrap();
    assert_eq!(settings.theme, "dark");
    assert_eq!(settings.language, before.language);

    let err = ctx.services.clients.edit_client(&id, " ", "Pérez", None).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_record_completed_muscle_group_checks_membership() {
    let ctx = TestContext::new();
    let (legs, squat) = ctx.legs_with_squat().await;
    let id = ctx.register("done@x.com").await;

    let record = ctx
        .services
        .clients
        .record_completed_muscle_group(&id, &legs.id, None, &[squat.clone(), squat.clone()])
        .await
        .unwrap();
    assert_eq!(record.exercise_ids, vec![squat]);

    let err = ctx
        .services
        .clients
        .record_completed_muscle_group(&id, &legs.id, None, &["curl".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let client = ctx.services.clients.get_client(&id).await.unwrap();
    assert_eq!(client.completed_muscle_groups.len(), 1);
}

#[tokio::test]
async fn test_social_media_images_accumulate() {
    let ctx = TestContext::new();
    let id = ctx.register("social@x.com").await;

    for url in ["https://img.test/1.jpg", "https://img.test/2.jpg"] {
        ctx.services
            .clients
            .add_social_media_image(&id, url, Some("progress"))
            .await
            .unwrap();
    }

    let client = ctx.services.clients.get_client(&id).await.unwrap();
    assert_eq!(client.social_media.len(), 2);
    assert_eq!(client.social_media[1].url, "https://img.test/2.jpg");
}

#[tokio::test]
async fn test_upload_avatar() {
    let ctx = TestContext::new();
    let id = ctx.register("avatar@x.com").await;

    let path = ctx
        .services
        .clients
        .upload_avatar(
            &id,
            AvatarUpload {
                filename: "me.png".to_string(),
                content_type: Some("image/png".to_string()),
                bytes: vec![0x89, 0x50, 0x4e, 0x47],
            },
        )
        .await
        .unwrap();

    assert!(path.starts_with("/uploads/avatars/"));
    let client = ctx.services.clients.get_client(&id).await.unwrap();
    assert_eq!(client.avatar.as_deref(), Some(path.as_str()));

    let err = ctx
        .services
        .clients
        .upload_avatar(
            &id,
            AvatarUpload {
                filename: "notes.txt".to_string(),
                content_type: Some("text/plain".to_string()),
                bytes: b"hello".to_vec(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}
