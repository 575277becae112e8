use std::future::Future;

use crate::error::{ApiError, ApiResult};

/// Runs a mutation on its own task so a dropped request cannot cancel it
/// between the local apply and the remote confirmation.
pub async fn run_detached<T, F>(mutation: F) -> ApiResult<T>
where
    F: Future<Output = propdesk_core::Result<T>> + Send + 'static,
    T: Send + 'static,
{
    match tokio::spawn(mutation).await {
        Ok(result) => Ok(result?),
        Err(join_error) => Err(ApiError::Internal(format!(
            "Mutation task failed: {}",
            join_error
        ))),
    }
}
