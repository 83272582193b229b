//! Mutation root

use async_graphql::{Context, Object, Result, Upload, ID};
use chrono::{DateTime, Utc};
use futures::AsyncReadExt;

use crate::application::ports::AvatarUpload;
use crate::application::services::{AppServices, ExerciseDraft};
use crate::infrastructure::http::cookies::SessionCookie;
use crate::shared::error::AppError;
use crate::shared::logging::LoggingUtils;

use super::error::GqlResultExt;
use super::types::{
    id_list, ActionResultObject, AvatarPayload, ClientObject, CompletedMuscleGroupObject, CreateClientInput,
    ExerciseInput, ExerciseObject, LoginPayload, MuscleGroupObject, PaymentObject, RecordPaymentInput,
    RoutineInput, RoutineObject, SetSpecValues, SettingsObject, SocialMediaImageObject,
};
use super::RequestContext;

const SET_COOKIE: &str = "set-cookie";

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_routine(&self, ctx: &Context<'_>, input: RoutineInput) -> Result<RoutineObject> {
        let routine = ctx
            .data::<AppServices>()?
            .routines
            .create_routine(input.into())
            .await
            .gql()?;
        Ok(RoutineObject(routine))
    }

    /// Replace every field of a routine
    async fn modify_routine(&self, ctx: &Context<'_>, id: ID, input: RoutineInput) -> Result<RoutineObject> {
        let routine = ctx
            .data::<AppServices>()?
            .routines
            .modify_routine(&id, input.into())
            .await
            .gql()?;
        Ok(RoutineObject(routine))
    }

    async fn delete_routine(&self, ctx: &Context<'_>, id: ID) -> Result<bool> {
        ctx.data::<AppServices>()?.routines.delete_routine(&id).await.gql()?;
        Ok(true)
    }

    async fn replace_exercise_in_routine(
        &self,
        ctx: &Context<'_>,
        routine_id: ID,
        old_exercise_id: ID,
        new_exercise_id: ID,
    ) -> Result<RoutineObject> {
        let routine = ctx
            .data::<AppServices>()?
            .routines
            .replace_exercise(&routine_id, &old_exercise_id, &new_exercise_id)
            .await
            .gql()?;
        Ok(RoutineObject(routine))
    }

    async fn update_set_spec(
        &self,
        ctx: &Context<'_>,
        routine_id: ID,
        set_spec_id: ID,
        input: SetSpecValues,
    ) -> Result<RoutineObject> {
        let routine = ctx
            .data::<AppServices>()?
            .routines
            .update_set_spec(&routine_id, &set_spec_id, input.into())
            .await
            .gql()?;
        Ok(RoutineObject(routine))
    }

    async fn assign_routine(&self, ctx: &Context<'_>, routine_id: ID, client_id: ID) -> Result<ClientObject> {
        let client = ctx
            .data::<AppServices>()?
            .clients
            .assign_routine(&routine_id, &client_id)
            .await
            .gql()?;
        Ok(ClientObject(client))
    }

    async fn unassign_routine(&self, ctx: &Context<'_>, routine_id: ID, client_id: ID) -> Result<ClientObject> {
        let client = ctx
            .data::<AppServices>()?
            .clients
            .unassign_routine(&routine_id, &client_id)
            .await
            .gql()?;
        Ok(ClientObject(client))
    }

    async fn create_exercise(&self, ctx: &Context<'_>, input: ExerciseInput) -> Result<ExerciseObject> {
        let draft = ExerciseDraft {
            name: input.name,
            description: input.description,
            execution: input.execution,
            muscle_group_id: input.muscle_group_id.to_string(),
        };
        let exercise = ctx.data::<AppServices>()?.catalog.create_exercise(draft).await.gql()?;
        Ok(ExerciseObject(exercise))
    }

    async fn edit_exercise(
        &self,
        ctx: &Context<'_>,
        id: ID,
        name: String,
        description: String,
        execution: String,
    ) -> Result<ExerciseObject> {
        let exercise = ctx
            .data::<AppServices>()?
            .catalog
            .edit_exercise(&id, &name, &description, &execution)
            .await
            .gql()?;
        Ok(ExerciseObject(exercise))
    }

    async fn create_muscle_group(
        &self,
        ctx: &Context<'_>,
        name: String,
        description: Option<String>,
        #[graphql(default)] exercise_ids: Vec<ID>,
    ) -> Result<MuscleGroupObject> {
        let group = ctx
            .data::<AppServices>()?
            .catalog
            .create_muscle_group(&name, description.as_deref(), &id_list(&exercise_ids))
            .await
            .gql()?;
        Ok(MuscleGroupObject(group))
    }

    /// Re-link exercises missing from their muscle group. Returns the
    /// number of repaired links.
    async fn reconcile_muscle_groups(&self, ctx: &Context<'_>) -> Result<usize> {
        ctx.data::<AppServices>()?.catalog.reconcile_memberships().await.gql()
    }

    async fn record_completed_muscle_group(
        &self,
        ctx: &Context<'_>,
        client_id: ID,
        muscle_group_id: ID,
        completed_at: Option<DateTime<Utc>>,
        exercise_ids: Vec<ID>,
    ) -> Result<CompletedMuscleGroupObject> {
        let record = ctx
            .data::<AppServices>()?
            .clients
            .record_completed_muscle_group(&client_id, &muscle_group_id, completed_at, &id_list(&exercise_ids))
            .await
            .gql()?;
        Ok(CompletedMuscleGroupObject(record))
    }

    /// Register a client and email the confirmation link. Returns the new ID.
    async fn create_client(&self, ctx: &Context<'_>, input: CreateClientInput) -> Result<ID> {
        let id = ctx.data::<AppServices>()?.clients.create_client(input.into()).await.gql()?;
        Ok(ID(id))
    }

    async fn edit_client(
        &self,
        ctx: &Context<'_>,
        client_id: ID,
        name: String,
        surname: String,
        phone: Option<String>,
    ) -> Result<ClientObject> {
        let client = ctx
            .data::<AppServices>()?
            .clients
            .edit_client(&client_id, &name, &surname, phone.as_deref())
            .await
            .gql()?;
        Ok(ClientObject(client))
    }

    async fn add_social_media_image(
        &self,
        ctx: &Context<'_>,
        client_id: ID,
        url: String,
        description: Option<String>,
    ) -> Result<SocialMediaImageObject> {
        let image = ctx
            .data::<AppServices>()?
            .clients
            .add_social_media_image(&client_id, &url, description.as_deref())
            .await
            .gql()?;
        Ok(SocialMediaImageObject(image))
    }

    async fn update_settings(
        &self,
        ctx: &Context<'_>,
        client_id: ID,
        language: Option<String>,
        theme: Option<String>,
    ) -> Result<SettingsObject> {
        let settings = ctx
            .data::<AppServices>()?
            .clients
            .update_settings(&client_id, language.as_deref(), theme.as_deref())
            .await
            .gql()?;
        Ok(SettingsObject(settings))
    }

    /// Multipart upload of a client's avatar image
    async fn upload_avatar(&self, ctx: &Context<'_>, client_id: ID, file: Upload) -> Result<AvatarPayload> {
        let services = ctx.data::<AppServices>()?;
        let value = file.value(ctx)?;
        let filename = value.filename.clone();
        let content_type = value.content_type.clone();

        let mut bytes = Vec::new();
        value
            .into_async_read()
            .read_to_end(&mut bytes)
            .await
            .map_err(|e| AppError::Validation(format!("unreadable upload: {}", e)))
            .gql()?;

        let upload = AvatarUpload {
            filename,
            content_type,
            bytes,
        };
        let path = services.clients.upload_avatar(&client_id, upload).await.gql()?;

        Ok(AvatarPayload {
            path,
            client_id: client_id.to_string(),
        })
    }

    async fn confirm_account(&self, ctx: &Context<'_>, token: String) -> Result<ActionResultObject> {
        let result = ctx.data::<AppServices>()?.sessions.confirm_account(&token).await.gql()?;
        Ok(result.into())
    }

    /// Check credentials and set the session cookie
    async fn login(&self, ctx: &Context<'_>, email: String, password: String) -> Result<LoginPayload> {
        let services = ctx.data::<AppServices>()?;
        let cookie = ctx.data::<SessionCookie>()?;

        match services.sessions.authenticate(&email, &password).await {
            Ok(login) => {
                ctx.insert_http_header(SET_COOKIE, cookie.issue(&login.token));
                Ok(LoginPayload {
                    success: true,
                    client: ClientObject(login.client),
                })
            }
            Err(e) => {
                if matches!(e, AppError::Unauthorized(_)) {
                    let client_ip = ctx
                        .data_opt::<RequestContext>()
                        .map(|r| r.client_ip.as_str())
                        .unwrap_or("unknown");
                    LoggingUtils::log_security_event("login_failed", "invalid credentials", client_ip);
                }
                Err(e).gql()
            }
        }
    }

    /// Clear the session cookie
    async fn logout(&self, ctx: &Context<'_>) -> Result<bool> {
        let cookie = ctx.data::<SessionCookie>()?;
        ctx.insert_http_header(SET_COOKIE, cookie.clear());
        Ok(true)
    }

    async fn request_password_reset(&self, ctx: &Context<'_>, email: String) -> Result<ActionResultObject> {
        let result = ctx
            .data::<AppServices>()?
            .sessions
            .request_password_reset(&email)
            .await
            .gql()?;
        Ok(result.into())
    }

    async fn complete_password_reset(
        &self,
        ctx: &Context<'_>,
        token: String,
        password: String,
    ) -> Result<ActionResultObject> {
        let result = ctx
            .data::<AppServices>()?
            .sessions
            .complete_password_reset(&token, &password)
            .await
            .gql()?;
        Ok(result.into())
    }

    /// Send a new confirmation link to an unconfirmed account
    async fn resend_confirmation(&self, ctx: &Context<'_>, email: String) -> Result<ActionResultObject> {
        let result = ctx
            .data::<AppServices>()?
            .sessions
            .resend_confirmation(&email)
            .await
            .gql()?;
        Ok(result.into())
    }

    async fn record_payment(&self, ctx: &Context<'_>, input: RecordPaymentInput) -> Result<PaymentObject> {
        let payment = ctx
            .data::<AppServices>()?
            .payments
            .record_payment(
                &input.client_id,
                &input.method,
                input.date,
                input.amount,
                input.status.map(Into::into),
            )
            .await
            .gql()?;
        Ok(PaymentObject(payment))
    }
}
