//! Query root

use async_graphql::{Context, Object, Result, ID};

use crate::application::services::AppServices;

use super::error::GqlResultExt;
use super::types::{ClientObject, ExerciseObject, MuscleGroupObject, PaymentObject, RoutineObject, SessionPayload};
use super::RequestContext;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn clients(&self, ctx: &Context<'_>) -> Result<Vec<ClientObject>> {
        let clients = ctx.data::<AppServices>()?.clients.list_clients().await.gql()?;
        Ok(clients.into_iter().map(ClientObject).collect())
    }

    async fn client(&self, ctx: &Context<'_>, id: ID) -> Result<ClientObject> {
        let client = ctx.data::<AppServices>()?.clients.get_client(&id).await.gql()?;
        Ok(ClientObject(client))
    }

    async fn routines(&self, ctx: &Context<'_>) -> Result<Vec<RoutineObject>> {
        let routines = ctx.data::<AppServices>()?.routines.list_routines().await.gql()?;
        Ok(routines.into_iter().map(RoutineObject).collect())
    }

    async fn routine(&self, ctx: &Context<'_>, id: ID) -> Result<RoutineObject> {
        let routine = ctx.data::<AppServices>()?.routines.get_routine(&id).await.gql()?;
        Ok(RoutineObject(routine))
    }

    /// Routines assigned to a client
    async fn client_routines(&self, ctx: &Context<'_>, client_id: ID) -> Result<Vec<RoutineObject>> {
        let routines = ctx
            .data::<AppServices>()?
            .routines
            .routines_for_client(&client_id)
            .await
            .gql()?;
        Ok(routines.into_iter().map(RoutineObject).collect())
    }

    /// Exercises in creation order
    async fn exercises(
        &self,
        ctx: &Context<'_>,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<ExerciseObject>> {
        let exercises = ctx
            .data::<AppServices>()?
            .catalog
            .list_exercises(limit, offset)
            .await
            .gql()?;
        Ok(exercises.into_iter().map(ExerciseObject).collect())
    }

    async fn all_exercises(&self, ctx: &Context<'_>) -> Result<Vec<ExerciseObject>> {
        let exercises = ctx.data::<AppServices>()?.catalog.list_exercises(None, None).await.gql()?;
        Ok(exercises.into_iter().map(ExerciseObject).collect())
    }

    async fn exercise(&self, ctx: &Context<'_>, id: ID) -> Result<ExerciseObject> {
        let exercise = ctx.data::<AppServices>()?.catalog.get_exercise(&id).await.gql()?;
        Ok(ExerciseObject(exercise))
    }

    async fn muscle_groups(&self, ctx: &Context<'_>) -> Result<Vec<MuscleGroupObject>> {
        let groups = ctx.data::<AppServices>()?.catalog.list_muscle_groups().await.gql()?;
        Ok(groups.into_iter().map(MuscleGroupObject).collect())
    }

    async fn muscle_group(&self, ctx: &Context<'_>, id: ID) -> Result<MuscleGroupObject> {
        let group = ctx.data::<AppServices>()?.catalog.get_muscle_group(&id).await.gql()?;
        Ok(MuscleGroupObject(group))
    }

    /// Client behind the session cookie, if any
    async fn verify_session(&self, ctx: &Context<'_>) -> Result<SessionPayload> {
        let services = ctx.data::<AppServices>()?;
        let token = ctx.data_opt::<RequestContext>().and_then(|r| r.session_token.as_deref());
        let state = services.sessions.verify_session(token).await;

        Ok(SessionPayload {
            authenticated: state.authenticated,
            client: state.client.map(ClientObject),
        })
    }

    async fn payments(&self, ctx: &Context<'_>) -> Result<Vec<PaymentObject>> {
        let payments = ctx.data::<AppServices>()?.payments.list_payments().await.gql()?;
        Ok(payments.into_iter().map(PaymentObject).collect())
    }

    async fn payment(&self, ctx: &Context<'_>, id: ID) -> Result<PaymentObject> {
        let payment = ctx.data::<AppServices>()?.payments.get_payment(&id).await.gql()?;
        Ok(PaymentObject(payment))
    }

    async fn client_payments(&self, ctx: &Context<'_>, client_id: ID) -> Result<Vec<PaymentObject>> {
        let payments = ctx
            .data::<AppServices>()?
            .payments
            .payments_for_client(&client_id)
            .await
            .gql()?;
        Ok(payments.into_iter().map(PaymentObject).collect())
    }
}
