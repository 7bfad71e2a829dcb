use std::env;

/// Runtime configuration, read once at startup from the environment
/// (a `.env` file is loaded beforehand via dotenvy in `main`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub kafka_brokers: String,
    pub kafka_group_id: String,
    pub host: String,
    pub port: u16,
    pub report_interval_secs: u64,
}

impl Config {
    /// `DATABASE_URL` is required; everything else has a sensible default.
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string()),
            kafka_brokers: env::var("KAFKA_BROKERS")
                .unwrap_or_else(|_| "localhost:9092".to_string()),
            kafka_group_id: env::var("KAFKA_GROUP_ID")
                .unwrap_or_else(|_| "commerce-service".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            report_interval_secs: env::var("REPORT_INTERVAL_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("REPORT_INTERVAL_SECS must be a valid number"),
        }
    }
}
