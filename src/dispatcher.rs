use std::time::Instant;
use tracing::{debug, warn};
use crate::{
    errors::AppError,
    handlers::{add::add_handler, delete::delete_handler, query::query_handler, AppState},
    services::metrics,
    types::{Command, Reply, Verb},
};

/// Turns one request line into one reply.
///
/// Parsing and URL validation happen before the filter lock is taken, so a
/// rejected line never touches shared state.
#[derive(Clone)]
pub struct CommandDispatcher {
    state: AppState,
}

impl CommandDispatcher {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn dispatch(&self, line: &str) -> Reply {
        let start = Instant::now();
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                debug!("Rejected line {:?}: {}", line, e);
                let reply = Reply::from(e);
                metrics::record_command("INVALID", reply.status.code(), start);
                return reply;
            }
        };

        let reply = match self.execute(&command).await {
            Ok(reply) => reply,
            Err(e) => {
                match &e {
                    AppError::BadRequest(_) | AppError::InvalidUrl(_) | AppError::NotFound(_) => {
                        debug!("{} {} failed: {}", command.verb.as_str(), command.argument, e)
                    }
                    _ => warn!("{} {} failed: {}", command.verb.as_str(), command.argument, e),
                }
                Reply::from(e)
            }
        };
        metrics::record_command(command.verb.as_str(), reply.status.code(), start);
        reply
    }

    async fn execute(&self, command: &Command) -> Result<Reply, AppError> {
        match command.verb {
            Verb::Post => add_handler(&self.state, &command.argument).await,
            Verb::Get => query_handler(&self.state, &command.argument).await,
            Verb::Delete => delete_handler(&self.state, &command.argument).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support;
    use crate::services::storage::Storage;
    use crate::types::Status;
    use async_trait::async_trait;
    use std::sync::Arc;

    fn dispatcher(bits: usize) -> CommandDispatcher {
        CommandDispatcher::new(test_support::state(bits).0)
    }

    #[tokio::test]
    async fn test_scenarios() {
        let d = dispatcher(8);
        assert_eq!(d.dispatch("POST www.example.com0").await.render(), "201 Created\n");
        assert_eq!(d.dispatch("GET www.example.com0").await.render(), "200 OK\n\ntrue true\n");

        assert_eq!(
            d.dispatch("GET www.unseen.example.com1").await.render(),
            "200 OK\n\nfalse\n"
        );

        assert_eq!(d.dispatch("DELETE www.example.com0").await.render(), "204 No Content\n");
        assert_eq!(d.dispatch("GET www.example.com0").await.body.as_deref(), Some("false"));
        assert_eq!(d.dispatch("DELETE www.never-added.com").await.render(), "404 Not Found\n");
    }

    #[tokio::test]
    async fn test_malformed_lines_leave_filter_alone() {
        let d = dispatcher(8);
        d.dispatch("POST www.valid.com").await;
        let before = d.state().filter.snapshot();
        for line in [
            "42 www.test.com",
            "POST www.test.com extra_arg",
            "POSTwww.test.com",
            "post www.lower.com",
            "POST",
            "POST   ",
            "",
            "POST www.test .com",
            "DELETE not-a-url",
        ] {
            assert_eq!(d.dispatch(line).await.status, Status::BadRequest, "{line:?}");
        }
        assert_eq!(d.state().filter.snapshot(), before);
    }

    struct BrokenDisk;

    #[async_trait]
    impl Storage for BrokenDisk {
        async fn load(&self) -> Result<Option<String>, AppError> {
            Ok(None)
        }

        async fn save(&self, _record: &str) -> Result<(), AppError> {
            Err(AppError::Io(std::io::Error::other("no space left on device")))
        }

        fn describe(&self) -> String {
            "broken".to_string()
        }
    }

    #[tokio::test]
    async fn test_persist_failure_is_best_effort_by_default() {
        let d = CommandDispatcher::new(test_support::state_with(8, Arc::new(BrokenDisk)));
        assert_eq!(d.dispatch("POST www.a.com").await.status, Status::Created);
        assert_eq!(d.dispatch("GET www.a.com").await.body.as_deref(), Some("true true"));
    }

    #[tokio::test]
    async fn test_strict_persistence_reports_500_and_keeps_serving() {
        let mut state = test_support::state_with(8, Arc::new(BrokenDisk));
        let mut settings = (*state.settings).clone();
        settings.storage.strict = true;
        state.settings = Arc::new(settings);
        let d = CommandDispatcher::new(state);

        assert_eq!(
            d.dispatch("POST www.a.com").await.render(),
            "500 Internal Server Error\n"
        );
        // the mutation is not rolled back
        assert_eq!(d.dispatch("GET www.a.com").await.body.as_deref(), Some("true true"));
        assert_eq!(d.dispatch("DELETE www.a.com").await.status, Status::InternalServerError);
        assert_eq!(d.dispatch("GET www.a.com").await.body.as_deref(), Some("false"));
    }
}
