use std::env;

/// Configuration loaded from environment variables
pub struct Config {
    pub db_path: String,
    pub actor_id: String,
    pub rust_log: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// All values have defaults; nothing is required for local use.
    pub fn from_env() -> Self {
        let db_path = env::var("CARBONFLOW_DB_PATH")
            .unwrap_or_else(|_| "data/carbonflow.db".to_string());

        // Recorded as `calculatedBy` on summaries produced by the CLI.
        let actor_id = env::var("CARBONFLOW_ACTOR").unwrap_or_else(|_| "cli".to_string());

        let rust_log = env::var("RUST_LOG").ok();

        Self {
            db_path,
            actor_id,
            rust_log,
        }
    }
}
