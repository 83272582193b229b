//! GraphQL object, input and enum types
//!
//! Output objects wrap the domain entities and resolve references through
//! the services, skipping references whose target no longer exists.

use async_graphql::{ComplexObject, Context, Enum, InputObject, Object, Result, SimpleObject, ID};
use chrono::{DateTime, NaiveDate, Utc};

use crate::application::services::{ActionResult, AppServices};
use crate::domain::{
    Client, ClientSettings, CompletedMuscleGroupRecord, Exercise, MuscleGroup, NewClient, Payment, Routine,
    RoutineDraft, SetSpec, SetSpecInput, SocialMediaImage,
};

use super::error::GqlResultExt;

pub(super) fn id_list(values: &[ID]) -> Vec<String> {
    values.iter().map(|id| id.to_string()).collect()
}

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
#[graphql(name = "RoutineLevel", remote = "crate::domain::RoutineLevel")]
pub enum RoutineLevelGql {
    #[graphql(name = "PUESTA_A_PUNTO")]
    Conditioning,
    #[graphql(name = "NIVEL_1")]
    Level1,
    #[graphql(name = "NIVEL_2")]
    Level2,
    #[graphql(name = "NIVEL_3")]
    Level3,
}

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
#[graphql(name = "PaymentStatus", remote = "crate::domain::PaymentStatus")]
pub enum PaymentStatusGql {
    Pending,
    Paid,
    Overdue,
    Rejected,
    Cancelled,
    Refunded,
}

pub struct ClientObject(pub Client);

#[Object(name = "Client")]
impl ClientObject {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn surname(&self) -> &str {
        &self.0.surname
    }

    async fn age(&self) -> Option<u32> {
        self.0.age
    }

    async fn birth_date(&self) -> Option<NaiveDate> {
        self.0.birth_date
    }

    async fn national_id(&self) -> Option<&str> {
        self.0.national_id.as_deref()
    }

    async fn weight(&self) -> Option<f64> {
        self.0.weight
    }

    async fn height(&self) -> Option<f64> {
        self.0.height
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    async fn phone(&self) -> Option<&str> {
        self.0.phone.as_deref()
    }

    async fn nickname(&self) -> Option<&str> {
        self.0.nickname.as_deref()
    }

    async fn confirmed(&self) -> bool {
        self.0.confirmed
    }

    async fn avatar(&self) -> Option<&str> {
        self.0.avatar.as_deref()
    }

    /// Latest settlement date of a paid membership
    async fn enabled_at(&self) -> Option<DateTime<Utc>> {
        self.0.enabled_at
    }

    async fn settings(&self) -> SettingsObject {
        SettingsObject(self.0.settings.clone())
    }

    async fn social_media(&self) -> Vec<SocialMediaImageObject> {
        self.0.social_media.iter().cloned().map(SocialMediaImageObject).collect()
    }

    async fn completed_muscle_groups(&self) -> Vec<CompletedMuscleGroupObject> {
        self.0
            .completed_muscle_groups
            .iter()
            .cloned()
            .map(CompletedMuscleGroupObject)
            .collect()
    }

    async fn routines(&self, ctx: &Context<'_>) -> Result<Vec<RoutineObject>> {
        let services = ctx.data::<AppServices>()?;
        let routines = services.routines.routines_for_client(&self.0.id).await.gql()?;
        Ok(routines.into_iter().map(RoutineObject).collect())
    }

    async fn payments(&self, ctx: &Context<'_>) -> Result<Vec<PaymentObject>> {
        let services = ctx.data::<AppServices>()?;
        let payments = services.payments.payments_for_client(&self.0.id).await.gql()?;
        Ok(payments.into_iter().map(PaymentObject).collect())
    }
}

pub struct SettingsObject(pub ClientSettings);

#[Object(name = "ClientSettings")]
impl SettingsObject {
    async fn language(&self) -> &str {
        &self.0.language
    }

    async fn theme(&self) -> &str {
        &self.0.theme
    }
}

pub struct SocialMediaImageObject(pub SocialMediaImage);

#[Object(name = "SocialMediaImage")]
impl SocialMediaImageObject {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn url(&self) -> &str {
        &self.0.url
    }

    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    async fn posted_at(&self) -> DateTime<Utc> {
        self.0.posted_at
    }
}

pub struct CompletedMuscleGroupObject(pub CompletedMuscleGroupRecord);

#[Object(name = "CompletedMuscleGroup")]
impl CompletedMuscleGroupObject {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn completed_at(&self) -> DateTime<Utc> {
        self.0.completed_at
    }

    async fn muscle_group(&self, ctx: &Context<'_>) -> Result<Option<MuscleGroupObject>> {
        let services = ctx.data::<AppServices>()?;
        let group = services.store.muscle_groups.get(&self.0.muscle_group_id).await.gql()?;
        Ok(group.map(MuscleGroupObject))
    }

    async fn exercises(&self, ctx: &Context<'_>) -> Result<Vec<ExerciseObject>> {
        let services = ctx.data::<AppServices>()?;
        let exercises = services.catalog.exercises_by_ids(&self.0.exercise_ids).await.gql()?;
        Ok(exercises.into_iter().map(ExerciseObject).collect())
    }
}

pub struct RoutineObject(pub Routine);

#[Object(name = "Routine")]
impl RoutineObject {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn level(&self) -> RoutineLevelGql {
        self.0.level.into()
    }

    async fn muscle_group(&self, ctx: &Context<'_>) -> Result<Option<MuscleGroupObject>> {
        let services = ctx.data::<AppServices>()?;
        let group = services.store.muscle_groups.get(&self.0.muscle_group_id).await.gql()?;
        Ok(group.map(MuscleGroupObject))
    }

    /// Exercises in routine order
    async fn exercises(&self, ctx: &Context<'_>) -> Result<Vec<ExerciseObject>> {
        let services = ctx.data::<AppServices>()?;
        let exercises = services.catalog.exercises_by_ids(&self.0.exercise_ids).await.gql()?;
        Ok(exercises.into_iter().map(ExerciseObject).collect())
    }

    async fn set_specs(&self) -> Vec<SetSpecObject> {
        self.0.set_specs.iter().cloned().map(SetSpecObject).collect()
    }
}

pub struct SetSpecObject(pub SetSpec);

#[Object(name = "SetSpec")]
impl SetSpecObject {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn sets(&self) -> u32 {
        self.0.sets
    }

    async fn repetitions(&self) -> u32 {
        self.0.repetitions
    }

    async fn weight(&self) -> Option<f64> {
        self.0.weight
    }

    async fn rest_seconds(&self) -> Option<u32> {
        self.0.rest_seconds
    }
}

pub struct ExerciseObject(pub Exercise);

#[Object(name = "Exercise")]
impl ExerciseObject {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn description(&self) -> &str {
        &self.0.description
    }

    async fn execution(&self) -> &str {
        &self.0.execution
    }

    async fn muscle_group(&self, ctx: &Context<'_>) -> Result<Option<MuscleGroupObject>> {
        let services = ctx.data::<AppServices>()?;
        let group = services.store.muscle_groups.get(&self.0.muscle_group_id).await.gql()?;
        Ok(group.map(MuscleGroupObject))
    }
}

pub struct MuscleGroupObject(pub MuscleGroup);

#[Object(name = "MuscleGroup")]
impl MuscleGroupObject {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn name(&self) -> &str {
        &self.0.name
    }

    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    async fn exercises(&self, ctx: &Context<'_>) -> Result<Vec<ExerciseObject>> {
        let services = ctx.data::<AppServices>()?;
        let exercises = services.catalog.exercises_by_ids(&self.0.exercise_ids).await.gql()?;
        Ok(exercises.into_iter().map(ExerciseObject).collect())
    }
}

pub struct PaymentObject(pub Payment);

#[Object(name = "Payment")]
impl PaymentObject {
    async fn id(&self) -> ID {
        ID(self.0.id.clone())
    }

    async fn method(&self) -> &str {
        &self.0.method
    }

    async fn date(&self) -> DateTime<Utc> {
        self.0.date
    }

    async fn amount(&self) -> f64 {
        self.0.amount
    }

    async fn status(&self) -> PaymentStatusGql {
        self.0.status.into()
    }

    async fn external_reference(&self) -> Option<&str> {
        self.0.external_reference.as_deref()
    }

    async fn settled_at(&self) -> Option<DateTime<Utc>> {
        self.0.settled_at
    }

    async fn client(&self, ctx: &Context<'_>) -> Result<Option<ClientObject>> {
        let services = ctx.data::<AppServices>()?;
        let client = services.store.clients.get(&self.0.client_id).await.gql()?;
        Ok(client.map(ClientObject))
    }
}

/// Outcome of a token-bound or email-sending operation
#[derive(SimpleObject)]
pub struct ActionResultObject {
    pub success: bool,
    pub message: String,
}

impl From<ActionResult> for ActionResultObject {
    fn from(result: ActionResult) -> Self {
        Self {
            success: result.success,
            message: result.message,
        }
    }
}

#[derive(SimpleObject)]
pub struct SessionPayload {
    pub authenticated: bool,
    pub client: Option<ClientObject>,
}

#[derive(SimpleObject)]
pub struct LoginPayload {
    pub success: bool,
    pub client: ClientObject,
}

#[derive(SimpleObject)]
#[graphql(complex)]
pub struct AvatarPayload {
    pub path: String,
    #[graphql(skip)]
    pub client_id: String,
}

#[ComplexObject]
impl AvatarPayload {
    async fn client(&self, ctx: &Context<'_>) -> Result<Option<ClientObject>> {
        let services = ctx.data::<AppServices>()?;
        let client = services.store.clients.get(&self.client_id).await.gql()?;
        Ok(client.map(ClientObject))
    }
}

#[derive(InputObject)]
pub struct SetSpecValues {
    pub sets: u32,
    pub repetitions: u32,
    pub weight: Option<f64>,
    pub rest_seconds: Option<u32>,
}

impl From<SetSpecValues> for SetSpecInput {
    fn from(values: SetSpecValues) -> Self {
        SetSpecInput {
            sets: values.sets,
            repetitions: values.repetitions,
            weight: values.weight,
            rest_seconds: values.rest_seconds,
        }
    }
}

#[derive(InputObject)]
pub struct RoutineInput {
    pub name: String,
    pub muscle_group_id: ID,
    /// Defaults to `PUESTA_A_PUNTO`
    pub level: Option<RoutineLevelGql>,
    pub exercise_ids: Vec<ID>,
    pub set_specs: Vec<SetSpecValues>,
}

impl From<RoutineInput> for RoutineDraft {
    fn from(input: RoutineInput) -> Self {
        RoutineDraft {
            name: input.name,
            muscle_group_id: input.muscle_group_id.to_string(),
            level: input.level.map(Into::into).unwrap_or_default(),
            exercise_ids: id_list(&input.exercise_ids),
            set_specs: input.set_specs.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(InputObject)]
pub struct ExerciseInput {
    pub name: String,
    pub description: String,
    pub execution: String,
    pub muscle_group_id: ID,
}

#[derive(InputObject)]
pub struct CreateClientInput {
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

impl From<CreateClientInput> for NewClient {
    fn from(input: CreateClientInput) -> Self {
        NewClient {
            name: input.name,
            surname: input.surname,
            email: input.email,
            password: input.password,
            national_id: input.national_id,
            age: input.age,
            birth_date: input.birth_date,
            weight: input.weight,
            height: input.height,
            phone: input.phone,
            nickname: input.nickname,
        }
    }
}

#[derive(InputObject)]
pub struct RecordPaymentInput {
    pub client_id: ID,
    pub method: String,
    /// Defaults to now
    pub date: Option<DateTime<Utc>>,
    pub amount: f64,
    /// Defaults to `PENDING`
    pub status: Option<PaymentStatusGql>,
}
