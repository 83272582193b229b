//! Payment service orchestrating manual records, gateway checkouts and
//! webhook reconciliation

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::application::ports::PaymentGateway;
use crate::domain::payments::checkout_total;
use crate::domain::rules::require_text;
use crate::domain::{
    new_id, CheckoutItem, CheckoutPayer, GatewayPayment, NotificationOutcome, Payment, PaymentStatus,
    PreferenceRequest,
};
use crate::infrastructure::adapters::Store;
use crate::shared::error::{AppError, AppResult};

/// Method recorded on checkout payments until the gateway reports one
const CHECKOUT_METHOD: &str = "mercadopago";

/// Amounts closer than this are considered equal
const AMOUNT_TOLERANCE: f64 = 0.005;

pub struct PaymentsService {
    store: Store,
    gateway: Arc<dyn PaymentGateway>,
    checkout_enabled: bool,
}

impl PaymentsService {
    pub fn new(store: Store, gateway: Arc<dyn PaymentGateway>, checkout_enabled: bool) -> Self {
        Self {
            store,
            gateway,
            checkout_enabled,
        }
    }

    /// Record a payment taken outside the gateway
    pub async fn record_payment(
        &self,
        client_id: &str,
        method: &str,
        date: Option<DateTime<Utc>>,
        amount: f64,
        status: Option<PaymentStatus>,
    ) -> AppResult<Payment> {
        self.store.clients.require(client_id, "client").await?;
        let method = require_text(method, "payment method")?;
        if amount < 0.0 || !amount.is_finite() {
            return Err(AppError::Validation("amount cannot be negative".to_string()));
        }

        let date = date.unwrap_or_else(Utc::now);
        let status = status.unwrap_or(PaymentStatus::Pending);
        let payment = Payment {
            id: new_id(),
            client_id: client_id.to_string(),
            method,
            date,
            amount,
            status,
            external_reference: None,
            gateway_payment_id: None,
            settled_at: (status == PaymentStatus::Paid).then_some(date),
        };
        self.store.payments.insert(&payment).await?;
        self.link_to_client(&payment).await?;

        if payment.status == PaymentStatus::Paid {
            self.enable_client(&payment).await?;
        }

        info!(
            payment_id = %payment.id,
            client_id = %client_id,
            amount = payment.amount,
            status = payment.status.as_str(),
            "Payment recorded"
        );
        Ok(payment)
    }

    /// Create a pending local payment and a gateway checkout preference for
    /// it. Returns the gateway payload.
    pub async fn create_checkout(
        &self,
        client_id: &str,
        items: Vec<CheckoutItem>,
        payer: CheckoutPayer,
    ) -> AppResult<Value> {
        if !self.checkout_enabled {
            return Err(AppError::Validation("online payments are disabled".to_string()));
        }
        if items.is_empty() {
            return Err(AppError::Validation("at least one item is required".to_string()));
        }
        for item in &items {
            require_text(&item.title, "item title")?;
            if item.quantity == 0 {
                return Err(AppError::Validation(format!("item {} has no quantity", item.title)));
            }
            if item.unit_price < 0.0 || !item.unit_price.is_finite() {
                return Err(AppError::Validation(format!("item {} has a negative price", item.title)));
            }
        }
        self.store.clients.require(client_id, "client").await?;

        let id = new_id();
        let payment = Payment {
            id: id.clone(),
            client_id: client_id.to_string(),
            method: CHECKOUT_METHOD.to_string(),
            date: Utc::now(),
            amount: checkout_total(&items),
            status: PaymentStatus::Pending,
            external_reference: Some(id.clone()),
            gateway_payment_id: None,
            settled_at: None,
        };
        self.store.payments.insert(&payment).await?;
        self.link_to_client(&payment).await?;

        let request = PreferenceRequest {
            items,
            payer,
            external_reference: id.clone(),
        };

        match self.gateway.create_preference(&request).await {
            Ok(preference) => {
                info!(payment_id = %id, client_id = %client_id, amount = payment.amount, "Checkout started");
                Ok(preference)
            }
            Err(e) => {
                warn!(payment_id = %id, error = %e, "Checkout preference failed, cancelling payment");
                if let Err(cancel) = self
                    .store
                    .payments
                    .update(&id, "payment", |p| {
                        p.status = PaymentStatus::Cancelled;
                        Ok(())
                    })
                    .await
                {
                    error!(payment_id = %id, error = %cancel, "Could not cancel payment after gateway failure");
                }
                Err(e)
            }
        }
    }

    /// Reconcile a local payment with the gateway's view of it.
    ///
    /// The notification only tells us which payment changed; status, method
    /// and dates always come from the gateway.
    pub async fn process_notification(&self, gateway_payment_id: &str) -> AppResult<NotificationOutcome> {
        let state = self.gateway.fetch_payment(gateway_payment_id).await?;

        let Some(local) = self.correlate(&state).await? else {
            warn!(
                gateway_payment_id = %gateway_payment_id,
                external_reference = ?state.external_reference,
                "Notification does not match any local payment"
            );
            return Ok(NotificationOutcome::Unmatched {
                gateway_payment_id: gateway_payment_id.to_string(),
            });
        };

        if let Some(amount) = state.transaction_amount {
            if (amount - local.amount).abs() > AMOUNT_TOLERANCE {
                warn!(
                    payment_id = %local.id,
                    local_amount = local.amount,
                    gateway_amount = amount,
                    "Gateway amount differs from the recorded amount"
                );
            }
        }

        let (payment, changed) = self
            .store
            .payments
            .modify(&local.id, "payment", |p| {
                p.apply_gateway_state(&state);
                Ok(())
            })
            .await?;

        if payment.status == PaymentStatus::Paid {
            self.enable_client(&payment).await?;
        }

        if changed {
            info!(
                payment_id = %payment.id,
                gateway_payment_id = %gateway_payment_id,
                status = payment.status.as_str(),
                "Payment updated from gateway"
            );
            Ok(NotificationOutcome::Updated {
                payment_id: payment.id,
                status: payment.status,
            })
        } else {
            Ok(NotificationOutcome::Unchanged { payment_id: payment.id })
        }
    }

    /// Find the local payment a gateway payment belongs to, by external
    /// reference first and by a previously stored gateway ID otherwise
    async fn correlate(&self, state: &GatewayPayment) -> AppResult<Option<Payment>> {
        if let Some(reference) = state.external_reference.as_deref() {
            if let Some(payment) = self.store.payments.get(reference).await? {
                return Ok(Some(payment));
            }
            if let Some(payment) = self
                .store
                .payments
                .find_one(|p| p.external_reference.as_deref() == Some(reference))
                .await?
            {
                return Ok(Some(payment));
            }
        }

        self.store
            .payments
            .find_one(|p| p.gateway_payment_id.as_deref() == Some(state.id.as_str()))
            .await
    }

    async fn link_to_client(&self, payment: &Payment) -> AppResult<()> {
        self.store
            .clients
            .update(&payment.client_id, "client", |client| {
                client.link_payment(&payment.id);
                Ok(())
            })
            .await
            .map(|_| ())
    }

    /// Move the client's enablement date forward to the settlement date.
    /// Never moves it backwards, so replays are harmless.
    async fn enable_client(&self, payment: &Payment) -> AppResult<()> {
        let settled = payment.settled_at.unwrap_or(payment.date);
        let result = self
            .store
            .clients
            .modify(&payment.client_id, "client", |client| {
                if client.enabled_at.is_none_or(|current| current < settled) {
                    client.enabled_at = Some(settled);
                }
                Ok(())
            })
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(AppError::NotFound(_)) => {
                warn!(payment_id = %payment.id, client_id = %payment.client_id, "Paid payment belongs to a deleted client");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn list_payments(&self) -> AppResult<Vec<Payment>> {
        self.store.payments.list().await
    }

    pub async fn get_payment(&self, id: &str) -> AppResult<Payment> {
        self.store.payments.require(id, "payment").await
    }

    /// Payments linked to a client, skipping dangling references
    pub async fn payments_for_client(&self, client_id: &str) -> AppResult<Vec<Payment>> {
        let client = self.store.clients.require(client_id, "client").await?;
        let mut payments = Vec::with_capacity(client.payment_ids.len());
        for id in &client.payment_ids {
            if let Some(payment) = self.store.payments.get(id).await? {
                payments.push(payment);
            }
        }
        Ok(payments)
    }
}
