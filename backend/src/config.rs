use tracing::warn;

const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:3000";
const DEFAULT_DATABASE_URL: &str = "sqlite:customers.db";
const DEFAULT_SEED_COUNT: u32 = 1000;

/// Runtime configuration read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to
    pub server_address: String,
    /// SQLite connection string
    pub database_url: String,
    /// Number of fake customers created when the table is empty
    pub seed_count: u32,
}

impl AppConfig {
    /// Load configuration from the environment, falling back to defaults.
    /// A `.env` file in the working directory is honoured when present.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        let server_address = std::env::var("SERVER_ADDRESS")
            .unwrap_or_else(|_| DEFAULT_SERVER_ADDRESS.to_string());
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let seed_count = match std::env::var("SEED_COUNT") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Ignoring invalid SEED_COUNT value: {}", raw);
                DEFAULT_SEED_COUNT
            }),
            Err(_) => DEFAULT_SEED_COUNT,
        };

        Self {
            server_address,
            database_url,
            seed_count,
        }
    }
}
