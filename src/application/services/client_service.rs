//! Client registration, profile and routine assignment

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::application::ports::{AvatarStorage, AvatarUpload};
use crate::application::services::notifications::Notifier;
use crate::domain::rules::{
    dedupe_ids, ensure_assigned, ensure_group_members, ensure_not_assigned, normalize_email, optional_text,
    require_text,
};
use crate::domain::{new_id, Client, ClientSettings, CompletedMuscleGroupRecord, NewClient, SocialMediaImage};
use crate::infrastructure::adapters::{PasswordHasher, Store, TokenIssuerAdapter, TokenPurpose};
use crate::shared::error::{AppError, AppResult};

pub struct ClientService {
    store: Store,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<TokenIssuerAdapter>,
    notifier: Arc<Notifier>,
    avatars: Arc<dyn AvatarStorage>,
    max_avatar_size: u64,
}

impl ClientService {
    pub fn new(
        store: Store,
        hasher: Arc<PasswordHasher>,
        tokens: Arc<TokenIssuerAdapter>,
        notifier: Arc<Notifier>,
        avatars: Arc<dyn AvatarStorage>,
        max_avatar_size: u64,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
            notifier,
            avatars,
            max_avatar_size,
        }
    }

    /// Register a client and send the confirmation link. Returns the new ID.
    ///
    /// The record is kept when the email cannot be sent; the client can ask
    /// for a new link later.
    pub async fn create_client(&self, new_client: NewClient) -> AppResult<String> {
        let email = normalize_email(&new_client.email)?;
        if new_client.password.trim().is_empty() {
            return Err(AppError::Validation("password is required".to_string()));
        }
        let name = require_text(&new_client.name, "name")?;
        let surname = require_text(&new_client.surname, "surname")?;
        let national_id = optional_text(new_client.national_id.as_deref());

        let existing = self
            .store
            .clients
            .find_one(|c| {
                c.email == email || (national_id.is_some() && c.national_id == national_id)
            })
            .await?;
        if let Some(existing) = existing {
            let field = if existing.email == email { "email" } else { "national ID" };
            return Err(AppError::Conflict(format!("a client with this {} is already registered", field)));
        }

        let password_hash = self.hasher.clone().hash_blocking(new_client.password).await?;

        let client = Client {
            id: new_id(),
            name,
            surname,
            age: new_client.age,
            birth_date: new_client.birth_date,
            national_id,
            weight: new_client.weight,
            height: new_client.height,
            email,
            password_hash,
            phone: optional_text(new_client.phone.as_deref()),
            nickname: optional_text(new_client.nickname.as_deref()),
            social_media: Vec::new(),
            routine_ids: Vec::new(),
            enabled_at: None,
            payment_ids: Vec::new(),
            completed_muscle_groups: Vec::new(),
            confirmed: false,
            avatar: None,
            settings: ClientSettings::default(),
        };
        self.store.clients.insert(&client).await?;
        info!(client_id = %client.id, "Client registered");

        match self.tokens.issue_confirmation(&client.id, TokenPurpose::Confirmation) {
            Ok(token) => {
                let email = self.notifier.confirmation_email(&client, &token);
                self.notifier.send_best_effort(&email).await;
            }
            Err(e) => warn!(client_id = %client.id, error = %e, "Could not issue confirmation token"),
        }

        Ok(client.id)
    }

    pub async fn edit_client(&self, client_id: &str, name: &str, surname: &str, phone: Option<&str>) -> AppResult<Client> {
        self.store.clients.require(client_id, "client").await?;
        let name = require_text(name, "name")?;
        let surname = require_text(surname, "surname")?;
        let phone = optional_text(phone);

        let client = self
            .store
            .clients
            .update(client_id, "client", |client| {
                client.name = name.clone();
                client.surname = surname.clone();
                client.phone = phone.clone();
                Ok(())
            })
            .await?;

        let email = self.notifier.profile_updated_email(&client);
        self.notifier.send_best_effort(&email).await;
        Ok(client)
    }

    /// Omitted values keep their current setting
    pub async fn update_settings(
        &self,
        client_id: &str,
        language: Option<&str>,
        theme: Option<&str>,
    ) -> AppResult<ClientSettings> {
        let language = language.map(|l| require_text(l, "language")).transpose()?;
        let theme = theme.map(|t| require_text(t, "theme")).transpose()?;

        let client = self
            .store
            .clients
            .update(client_id, "client", |client| {
                if let Some(language) = &language {
                    client.settings.language = language.clone();
                }
                if let Some(theme) = &theme {
                    client.settings.theme = theme.clone();
                }
                Ok(())
            })
            .await?;
        Ok(client.settings)
    }

    /// Store an avatar image and record its public path
    pub async fn upload_avatar(&self, client_id: &str, upload: AvatarUpload) -> AppResult<String> {
        self.store.clients.require(client_id, "client").await?;

        if upload.bytes.is_empty() {
            return Err(AppError::Validation("avatar file is empty".to_string()));
        }
        if upload.bytes.len() as u64 > self.max_avatar_size {
            return Err(AppError::Validation(format!(
                "avatar exceeds the maximum size of {} bytes",
                self.max_avatar_size
            )));
        }
        if let Some(content_type) = &upload.content_type {
            if !content_type.starts_with("image/") {
                return Err(AppError::Validation(format!("avatar must be an image, got {}", content_type)));
            }
        }

        let path = self.avatars.save(client_id, &upload).await?;
        self.store
            .clients
            .update(client_id, "client", |client| {
                client.avatar = Some(path.clone());
                Ok(())
            })
            .await?;

        Ok(path)
    }

    pub async fn assign_routine(&self, routine_id: &str, client_id: &str) -> AppResult<Client> {
        self.store.routines.require(routine_id, "routine").await?;
        self.store.clients.require(client_id, "client").await?;

        let client = self
            .store
            .clients
            .update(client_id, "client", |client| {
                ensure_not_assigned(client, routine_id)?;
                client.routine_ids.push(routine_id.to_string());
                Ok(())
            })
            .await?;

        info!(client_id = %client_id, routine_id = %routine_id, "Routine assigned");
        Ok(client)
    }

    pub async fn unassign_routine(&self, routine_id: &str, client_id: &str) -> AppResult<Client> {
        self.store.routines.require(routine_id, "routine").await?;
        self.store.clients.require(client_id, "client").await?;

        let client = self
            .store
            .clients
            .update(client_id, "client", |client| {
                ensure_assigned(client, routine_id)?;
                client.routine_ids.retain(|id| id != routine_id);
                Ok(())
            })
            .await?;

        info!(client_id = %client_id, routine_id = %routine_id, "Routine unassigned");
        Ok(client)
    }

    pub async fn record_completed_muscle_group(
        &self,
        client_id: &str,
        muscle_group_id: &str,
        completed_at: Option<DateTime<Utc>>,
        exercise_ids: &[String],
    ) -> AppResult<CompletedMuscleGroupRecord> {
        self.store.clients.require(client_id, "client").await?;
        let group = self.store.muscle_groups.require(muscle_group_id, "muscle group").await?;

        let exercise_ids = dedupe_ids(exercise_ids);
        if exercise_ids.is_empty() {
            return Err(AppError::Validation("completed exercises are required".to_string()));
        }
        ensure_group_members(&group, &exercise_ids)?;

        let record = CompletedMuscleGroupRecord {
            id: new_id(),
            muscle_group_id: group.id,
            completed_at: completed_at.unwrap_or_else(Utc::now),
            exercise_ids,
        };

        self.store
            .clients
            .update(client_id, "client", |client| {
                client.completed_muscle_groups.push(record.clone());
                Ok(())
            })
            .await?;

        Ok(record)
    }

    pub async fn add_social_media_image(
        &self,
        client_id: &str,
        url: &str,
        description: Option<&str>,
    ) -> AppResult<SocialMediaImage> {
        self.store.clients.require(client_id, "client").await?;
        let image = SocialMediaImage {
            id: new_id(),
            url: require_text(url, "image url")?,
            description: optional_text(description),
            posted_at: Utc::now(),
        };

        self.store
            .clients
            .update(client_id, "client", |client| {
                client.social_media.push(image.clone());
                Ok(())
            })
            .await?;

        Ok(image)
    }

    pub async fn get_client(&self, id: &str) -> AppResult<Client> {
        self.store.clients.require(id, "client").await
    }

    pub async fn list_clients(&self) -> AppResult<Vec<Client>> {
        self.store.clients.list().await
    }
}
