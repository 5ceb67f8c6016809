#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{figment::Figment, Build, Rocket};

use crate::config::{ConfigFairing, DatabaseFairing};
use crate::logging::LoggerFairing;
use crate::model::sqlite::Db;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

pub use crate::config::Config;

/// Mount point for every route.
pub const API_BASE: &str = "/api";

/// Build the server, connecting to the configured database at ignition.
pub fn build() -> Rocket<Build> {
    with_routes(rocket::build()).attach(DatabaseFairing)
}

/// Build the server over an already-connected database.
pub fn rocket_for_db(figment: Figment, db: Db) -> Rocket<Build> {
    with_routes(rocket::custom(figment)).manage(db)
}

fn with_routes(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .mount(API_BASE, api::routes())
        .register("/", api::catchers())
}

/// Server configuration for tests: the defaults, plus a JWT secret.
#[cfg(test)]
fn test_figment() -> Figment {
    rocket::Config::figment()
        .merge(("jwt_secret", "test secret, do not deploy"))
        .merge(("log_level", "off"))
}
