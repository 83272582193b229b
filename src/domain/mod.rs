//! Domain layer - Core business logic and domain models
//!
//! Entities, the persisted-document abstraction and the guard rules that
//! keep the catalog, routines and assignments consistent. Nothing here
//! depends on HTTP, GraphQL or the storage backend.

pub mod catalog;
pub mod client;
pub mod document;
pub mod health;
pub mod payments;
pub mod routine;
pub mod rules;

pub use catalog::{Exercise, MuscleGroup};
pub use client::{Client, ClientSettings, CompletedMuscleGroupRecord, NewClient, SocialMediaImage};
pub use document::{new_id, Document};
pub use health::{HealthResponse, HealthStatus};
pub use payments::{
    is_valid_gateway_payment_id, CheckoutItem, CheckoutPayer, GatewayPayment, NotificationOutcome,
    Payment, PaymentStatus, PreferenceRequest,
};
pub use routine::{Routine, RoutineDraft, RoutineLevel, SetSpec, SetSpecInput};
