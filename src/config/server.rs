use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub struct ServerConfig {
    #[validate(length(min = 1))]
    pub host: String,
    pub port: u16,
    // None keeps the accept loop unbounded
    #[validate(range(min = 1))]
    pub max_connections: Option<usize>,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5555,
            max_connections: None,
        }
    }
}
