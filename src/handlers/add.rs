use tracing::debug;
use crate::{errors::AppError, handlers::{persist_mutation, AppState}, types::{Reply, Status}, validator::validate_url};

pub async fn add_handler(state: &AppState, url: &str) -> Result<Reply, AppError> {
    validate_url(url)?;
    let inserted = state.filter.add(url);
    debug!("POST {} (new: {})", url, inserted);
    persist_mutation(state).await?;
    Ok(Reply::new(Status::Created))
}
