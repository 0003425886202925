//! Application configuration, read once from the environment at startup.
//!
//! `DATABASE_URL` and `JWT_SECRET` are required; everything else has a
//! default. `SIGNUP_ACCESS_CODE`, when set, gates registration behind a
//! shared invite code.

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database URL (e.g. "sqlite:data/gymlog.db").
    pub database_url: String,
    /// Secret used to sign and verify JWTs.
    pub jwt_secret: String,
    /// Invite code required at registration; None disables the check.
    pub signup_access_code: Option<String>,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            signup_access_code: env::var("SIGNUP_ACCESS_CODE").ok(),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        })
    }
}
