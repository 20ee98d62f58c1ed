use tracing::debug;
use crate::{errors::AppError, handlers::{persist_mutation, AppState}, types::{Reply, Status}, validator::validate_url};

pub async fn delete_handler(state: &AppState, url: &str) -> Result<Reply, AppError> {
    validate_url(url)?;
    if !state.filter.remove(url) {
        return Err(AppError::NotFound(format!("{} is not blacklisted", url)));
    }
    debug!("DELETE {}", url);
    persist_mutation(state).await?;
    Ok(Reply::new(Status::NoContent))
}
