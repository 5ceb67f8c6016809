use chrono::Duration;
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Rocket,
};
use serde::Deserialize;

use crate::model::sqlite::Db;

/// One day, the lifetime of a login token unless configured otherwise.
const DEFAULT_AUTH_TTL: u32 = 24 * 60 * 60;

/// The local file-backed database used when none is configured.
pub const DEFAULT_DB_URI: &str = "sqlite://voting.db";

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Deserialize)]
pub struct Config {
    // non-secrets
    #[serde(default = "default_auth_ttl")]
    auth_ttl: u32,
    // secrets
    jwt_secret: String,
}

fn default_auth_ttl() -> u32 {
    DEFAULT_AUTH_TTL
}

impl Config {
    /// Valid lifetime of login tokens in seconds.
    pub fn auth_ttl(&self) -> Duration {
        Duration::seconds(self.auth_ttl.into())
    }

    /// Secret key used to sign JWTs.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the database fairing and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// Configuration for the database.
#[derive(Deserialize)]
struct DbConfig {
    // secrets
    #[serde(default = "default_db_uri")]
    db_uri: String,
}

fn default_db_uri() -> String {
    DEFAULT_DB_URI.to_string()
}

/// A fairing that loads the database config, connects to the database,
/// ensures the schema exists, and places the [`Db`] pool into managed state.
pub struct DatabaseFairing;

#[rocket::async_trait]
impl Fairing for DatabaseFairing {
    fn info(&self) -> Info {
        Info {
            name: "SQLite",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<DbConfig>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load database config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };
        info!("Loaded database config, connecting...");

        // Construct the pool and ensure the tables exist.
        let db = match Db::connect(&config.db_uri).await {
            Ok(db) => db,
            Err(e) => {
                error!("Failed to connect to database: {e}");
                return Err(rocket);
            }
        };
        info!("...database connection online!");

        // Manage the state.
        rocket = rocket.manage(db);
        Ok(rocket)
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Config {
        pub fn example() -> Self {
            Self {
                auth_ttl: DEFAULT_AUTH_TTL,
                jwt_secret: "an example secret nobody should deploy".to_string(),
            }
        }

        pub fn example_other_secret() -> Self {
            Self {
                auth_ttl: DEFAULT_AUTH_TTL,
                jwt_secret: "a different secret".to_string(),
            }
        }
    }
}
