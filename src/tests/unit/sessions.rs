use crate::infrastructure::adapters::TokenPurpose;
use crate::shared::error::AppError;
use crate::tests::fixtures::{token_from_last_email, TestContext};

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = TestContext::new();
    ctx.register("a@x.com").await;

    let wrong_password = ctx
        .services
        .sessions
        .authenticate("a@x.com", "not-the-password")
        .await
        .unwrap_err();
    let unknown_email = ctx
        .services
        .sessions
        .authenticate("nobody@x.com", "s3cret-pass")
        .await
        .unwrap_err();

    assert_eq!(wrong_password, unknown_email);
    assert_eq!(wrong_password.code(), "UNAUTHORIZED");
    assert_eq!(wrong_password.public_message(), unknown_email.public_message());
}

#[tokio::test]
async fn test_login_and_verify_session() {
    let ctx = TestContext::new();
    let id = ctx.register("login@x.com").await;

    let login = ctx
        .services
        .sessions
        .authenticate(" LOGIN@x.com ", "s3cret-pass")
        .await
        .unwrap();
    assert_eq!(login.client.id, id);

    let state = ctx.services.sessions.verify_session(Some(&login.token)).await;
    assert!(state.authenticated);
    assert_eq!(state.client.unwrap().id, id);

    assert!(!ctx.services.sessions.verify_session(None).await.authenticated);
    assert!(!ctx.services.sessions.verify_session(Some("garbage")).await.authenticated);
}

#[tokio::test]
async fn test_blank_credentials_are_validation_errors() {
    let ctx = TestContext::new();
    let err = ctx.services.sessions.authenticate("", "x").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_confirm_account_flow() {
    let ctx = TestContext::new();
    let id = ctx.register("confirm@x.com").await;
    let token = token_from_last_email(&ctx.mailer, "confirm@x.com");

    let result = ctx.services.sessions.confirm_account(&token).await.unwrap();
    assert!(result.success);
    assert!(ctx.services.clients.get_client(&id).await.unwrap().confirmed);

    let again = ctx.services.sessions.confirm_account(&token).await.unwrap();
    assert!(!again.success);

    let invalid = ctx.services.sessions.confirm_account("not-a-token").await.unwrap();
    assert!(!invalid.success);
}

#[tokio::test]
async fn test_reset_token_cannot_confirm() {
    let ctx = TestContext::new();
    let id = ctx.register("purpose@x.com").await;
    let reset = ctx.tokens.issue_confirmation(&id, TokenPurpose::PasswordReset).unwrap();

    let result = ctx.services.sessions.confirm_account(&reset).await.unwrap();
    assert!(!result.success);
    assert!(!ctx.services.clients.get_client(&id).await.unwrap().confirmed);
}

#[tokio::test]
async fn test_password_reset_flow() {
    let ctx = TestContext::new();
    let id = ctx.register("reset@x.com").await;
    let confirm = token_from_last_email(&ctx.mailer, "reset@x.com");
    ctx.services.sessions.confirm_account(&confirm).await.unwrap();

    let result = ctx.services.sessions.request_password_reset("reset@x.com").await.unwrap();
    assert!(result.success);
    assert!(!ctx.services.clients.get_client(&id).await.unwrap().confirmed);

    let token = token_from_last_email(&ctx.mailer, "reset@x.com");
    let err = ctx
        .services
        .sessions
        .complete_password_reset(&token, "  ")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let done = ctx
        .services
        .sessions
        .complete_password_reset(&token, "brand-new-pass")
        .await
        .unwrap();
    assert!(done.success);
    assert!(ctx.services.clients.get_client(&id).await.unwrap().confirmed);

    assert!(ctx.services.sessions.authenticate("reset@x.com", "s3cret-pass").await.is_err());
    assert!(ctx.services.sessions.authenticate("reset@x.com", "brand-new-pass").await.is_ok());
}

#[tokio::test]
async fn test_reset_request_keeps_state_when_mail_fails() {
    let ctx = TestContext::new();
    let id = ctx.register("nomail@x.com").await;
    let confirm = token_from_last_email(&ctx.mailer, "nomail@x.com");
    ctx.services.sessions.confirm_account(&confirm).await.unwrap();

    ctx.mailer.set_failing(true);
    let err = ctx
        .services
        .sessions
        .request_password_reset("nomail@x.com")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::ExternalService(_)));
    assert!(ctx.services.clients.get_client(&id).await.unwrap().confirmed);
}

#[tokio::test]
async fn test_reset_request_unknown_email() {
    let ctx = TestContext::new();
    let err = ctx
        .services
        .sessions
        .request_password_reset("ghost@x.com")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_resend_confirmation() {
    let ctx = TestContext::new();
    ctx.register("resend@x.com").await;

    let result = ctx.services.sessions.resend_confirmation("resend@x.com").await.unwrap();
    assert!(result.success);
    assert_eq!(ctx.mailer.sent().len(), 2);

    let token = token_from_last_email(&ctx.mailer, "resend@x.com");
    ctx.services.sessions.confirm_account(&token).await.unwrap();

    let err = ctx
        .services
        .sessions
        .resend_confirmation("resend@x.com")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}
