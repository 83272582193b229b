//! GraphQL error mapping
//!
//! Every error leaving a resolver carries `extensions.code` so clients can
//! branch on the kind without parsing messages.

use async_graphql::ErrorExtensions;
use tracing::error;

use crate::shared::error::{AppError, AppResult};

impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        if matches!(self, AppError::Config(_) | AppError::Store(_) | AppError::Internal(_)) {
            error!(code = self.code(), error = %self, "Resolver failed");
        }

        let code = self.code();
        async_graphql::Error::new(self.public_message()).extend_with(|_, extensions| extensions.set("code", code))
    }
}

/// Convert service results into GraphQL results
pub trait GqlResultExt<T> {
    fn gql(self) -> async_graphql::Result<T>;
}

impl<T> GqlResultExt<T> for AppResult<T> {
    fn gql(self) -> async_graphql::Result<T> {
        self.map_err(|e| e.extend())
    }
}
