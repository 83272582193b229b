//! Client domain models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::document::Document;

/// Image posted to a client's social media gallery
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SocialMediaImage {
    pub id: String,
    pub url: String,
    pub description: Option<String>,
    pub posted_at: DateTime<Utc>,
}

/// A muscle group workout the client finished
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletedMuscleGroupRecord {
    pub id: String,
    pub muscle_group_id: String,
    pub completed_at: DateTime<Utc>,
    pub exercise_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientSettings {
    pub language: String,
    pub theme: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            language: "es".to_string(),
            theme: "dark".to_string(),
        }
    }
}

/// Registration data for a new client
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewClient {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    pub national_id: Option<String>,
    pub age: Option<u32>,
    pub birth_date: Option<NaiveDate>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub phone: Option<String>,
    pub nickname: Option<String>,
}

/// A gym member
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub age: Option<u32>,
    pub birth_date: Option<NaiveDate>,
    /// Unique among clients when present
    pub national_id: Option<String>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    /// Lower-cased, unique among clients
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub nickname: Option<String>,
    #[serde(default)]
    pub social_media: Vec<SocialMediaImage>,
    #[serde(default)]
    pub routine_ids: Vec<String>,
    pub enabled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_ids: Vec<String>,
    #[serde(default)]
    pub completed_muscle_groups: Vec<CompletedMuscleGroupRecord>,
    #[serde(default)]
    pub confirmed: bool,
    pub avatar: Option<String>,
    #[serde(default)]
    pub settings: ClientSettings,
}

impl Client {
    pub fn has_routine(&self, routine_id: &str) -> bool {
        self.routine_ids.iter().any(|id| id == routine_id)
    }

    /// Link a payment, ignoring repeats
    pub fn link_payment(&mut self, payment_id: &str) {
        if !self.payment_ids.iter().any(|id| id == payment_id) {
            self.payment_ids.push(payment_id.to_string());
        }
    }
}

impl Document for Client {
    const COLLECTION: &'static str = "clients";

    fn id(&self) -> &str {
        &self.id
    }
}
