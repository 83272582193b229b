use crate::domain::{CheckoutItem, CheckoutPayer, NotificationOutcome, PaymentStatus};
use crate::shared::error::AppError;
use crate::tests::fixtures::{approved_payment, TestContext};

fn monthly_fee() -> Vec<CheckoutItem> {
    vec![CheckoutItem {
        title: "Monthly membership".to_string(),
        quantity: 1,
        unit_price: 15000.0,
        currency_id: Some("ARS".to_string()),
        description: None,
    }]
}

#[tokio::test]
async fn test_record_paid_payment_enables_client() {
    let ctx = TestContext::new();
    let client_id = ctx.register("pay@x.com").await;

    let payment = ctx
        .services
        .payments
        .record_payment(&client_id, "cash", None, 12000.0, Some(PaymentStatus::Paid))
        .await
        .unwrap();

    let client = ctx.services.clients.get_client(&client_id).await.unwrap();
    assert_eq!(client.payment_ids, vec![payment.id.clone()]);
    assert_eq!(client.enabled_at, payment.settled_at);

    let listed = ctx.services.payments.payments_for_client(&client_id).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_record_payment_validation() {
    let ctx = TestContext::new();
    let client_id = ctx.register("bad@x.com").await;

    let err = ctx
        .services
        .payments
        .record_payment(&client_id, "cash", None, -1.0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = ctx
        .services
        .payments
        .record_payment("missing", "cash", None, 10.0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_checkout_creates_pending_payment() {
    let ctx = TestContext::new();
    let client_id = ctx.register("checkout@x.com").await;

    let preference = ctx
        .services
        .payments
        .create_checkout(&client_id, monthly_fee(), CheckoutPayer::default())
        .await
        .unwrap();

    let reference = preference["external_reference"].as_str().unwrap().to_string();
    let payment = ctx.services.payments.get_payment(&reference).await.unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.external_reference.as_deref(), Some(reference.as_str()));
    assert_eq!(payment.amount, 15000.0);
    assert_eq!(ctx.gateway.preferences().len(), 1);
}

#[tokio::test]
async fn test_checkout_cancelled_when_gateway_fails() {
    let ctx = TestContext::new();
    let client_id = ctx.register("down@x.com").await;
    ctx.gateway.set_failing(true);

    let err = ctx
        .services
        .payments
        .create_checkout(&client_id, monthly_fee(), CheckoutPayer::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ExternalService(_)));

    let payments = ctx.services.payments.list_payments().await.unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].status, PaymentStatus::Cancelled);
}

#[tokio::test]
async fn test_checkout_rejects_empty_items() {
    let ctx = TestContext::new();
    let client_id = ctx.register("empty@x.com").await;

    let err = ctx
        .services
        .payments
        .create_checkout(&client_id, Vec::new(), CheckoutPayer::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_notification_is_idempotent() {
    let ctx = TestContext::new();
    let client_id = ctx.register("webhook@x.com").await;
    let preference = ctx
        .services
        .payments
        .create_checkout(&client_id, monthly_fee(), CheckoutPayer::default())
        .await
        .unwrap();
    let reference = preference["external_reference"].as_str().unwrap().to_string();
    ctx.gateway.set_payment(approved_payment("9001", &reference, 15000.0));

    let first = ctx.services.payments.process_notification("9001").await.unwrap();
    assert_eq!(
        first,
        NotificationOutcome::Updated {
            payment_id: reference.clone(),
            status: PaymentStatus::Paid,
        }
    );
    let after_first = ctx.services.payments.get_payment(&reference).await.unwrap();
    let enabled_after_first = ctx.services.clients.get_client(&client_id).await.unwrap().enabled_at;

    let second = ctx.services.payments.process_notification("9001").await.unwrap();
    assert_eq!(second, NotificationOutcome::Unchanged { payment_id: reference.clone() });

    let after_second = ctx.services.payments.get_payment(&reference).await.unwrap();
    assert_eq!(after_first, after_second);
    assert_eq!(after_second.gateway_payment_id.as_deref(), Some("9001"));
    assert_eq!(after_second.method, "visa");
    assert_eq!(ctx.services.payments.list_payments().await.unwrap().len(), 1);

    let client = ctx.services.clients.get_client(&client_id).await.unwrap();
    assert!(client.enabled_at.is_some());
    assert_eq!(client.enabled_at, enabled_after_first);
}

#[tokio::test]
async fn test_concurrent_duplicate_notifications_converge() {
    let ctx = TestContext::new();
    let client_id = ctx.register("race@x.com").await;
    let preference = ctx
        .services
        .payments
        .create_checkout(&client_id, monthly_fee(), CheckoutPayer::default())
        .await
        .unwrap();
    let reference = preference["external_reference"].as_str().unwrap().to_string();
    ctx.gateway.set_payment(approved_payment("9100", &reference, 15000.0));

    let payments = ctx.services.payments.clone();
    let (a, b) = tokio::join!(
        payments.process_notification("9100"),
        payments.process_notification("9100")
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let updated = outcomes
        .iter()
        .filter(|o| matches!(o, NotificationOutcome::Updated { .. }))
        .count();
    assert_eq!(updated, 1);
    assert_eq!(ctx.gateway.fetch_count(), 2);
}

#[tokio::test]
async fn test_unmatched_notification() {
    let ctx = TestContext::new();
    ctx.gateway.set_payment(approved_payment("404", "unknown-reference", 10.0));

    let outcome = ctx.services.payments.process_notification("404").await.unwrap();
    assert!(matches!(outcome, NotificationOutcome::Unmatched { .. }));
}
