//! GraphQL routes

use warp::Filter;

use crate::config::AppConfig;
use crate::infrastructure::http::handlers::{handle_graphiql, handle_graphql_request, GraphqlState};
use crate::infrastructure::http::utils::with_client_ip;

pub struct GraphqlRoutes;

impl GraphqlRoutes {
    /// `POST /graphql` with a JSON or multipart body
    pub fn create_graphql_route(
        config: AppConfig,
        state: GraphqlState,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        let body_limit = config.server.max_request_size;
        let cookie_name = state.cookie.name();
        warp::path("graphql")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::header::optional::<String>("content-type"))
            .and(warp::cookie::optional(cookie_name))
            .and(warp::body::content_length_limit(body_limit))
            .and(warp::body::bytes())
            .and(with_client_ip(config))
            .and(warp::any().map(move || state.clone()))
            .and_then(handle_graphql_request)
    }

    /// `GET /graphql` serves GraphiQL
    pub fn create_graphiql_route() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        warp::path("graphql")
            .and(warp::path::end())
            .and(warp::get())
            .and_then(handle_graphiql)
    }
}
