//! GraphQL schema
//!
//! Resolvers are thin: each one pulls `AppServices` from the schema data,
//! calls a single service operation and wraps the domain value in an output
//! object. Errors carry `extensions.code` through [`GqlResultExt`].

pub mod error;
pub mod mutation;
pub mod query;
pub mod types;

use async_graphql::{EmptySubscription, Schema};

use crate::application::services::AppServices;
use crate::infrastructure::http::cookies::SessionCookie;

pub use error::GqlResultExt;
pub use mutation::MutationRoot;
pub use query::QueryRoot;

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Deepest selection set the schema accepts
const MAX_QUERY_DEPTH: usize = 12;

/// Per-request data attached before execution
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub client_ip: String,
    /// Raw session token from the cookie header, if any
    pub session_token: Option<String>,
}

pub fn build_schema(services: AppServices, cookie: SessionCookie) -> AppSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(services)
        .data(cookie)
        .limit_depth(MAX_QUERY_DEPTH)
        .finish()
}
