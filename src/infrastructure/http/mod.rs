//! HTTP infrastructure
//!
//! Warp routes and handlers, the GraphQL schema, session cookies and the
//! server that ties them together.

pub mod cookies;
pub mod graphql;
pub mod handlers;
pub mod responses;
pub mod routes;
pub mod server;
pub mod utils;

pub use cookies::SessionCookie;
pub use graphql::{build_schema, AppSchema, RequestContext};
pub use responses::ResponseFormatter;
pub use server::HttpServer;
