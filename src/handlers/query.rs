use tracing::debug;
use crate::{errors::AppError, handlers::AppState, types::{Reply, Status}, validator::validate_url};

pub async fn query_handler(state: &AppState, url: &str) -> Result<Reply, AppError> {
    validate_url(url)?;
    let membership = state.filter.query(url);
    debug!("GET {} -> {}", url, membership);
    Ok(Reply::with_body(Status::Ok, membership.to_string()))
}
