// src/config.rs

use std::env;

use dotenvy::dotenv;

use crate::engine::classroom_code::DEFAULT_MAX_ATTEMPTS;

/// Questions per generated quiz unless `QUIZ_QUESTION_COUNT` overrides it.
pub const DEFAULT_QUIZ_QUESTION_COUNT: usize = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub port: u16,
    /// JSON file replacing the built-in question bank.
    pub question_bank_path: Option<String>,
    pub quiz_question_count: usize,
    pub classroom_code_max_attempts: u32,
}

impl Config {
    /// Reads configuration from the environment (and `.env` if present).
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set".to_string())?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            rust_log,
            port: parse_var("PORT", 3000)?,
            question_bank_path: env::var("QUESTION_BANK_PATH").ok(),
            quiz_question_count: parse_var("QUIZ_QUESTION_COUNT", DEFAULT_QUIZ_QUESTION_COUNT)?,
            classroom_code_max_attempts: parse_var(
                "CLASSROOM_CODE_MAX_ATTEMPTS",
                DEFAULT_MAX_ATTEMPTS,
            )?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| format!("{} has an invalid value: {}", name, raw)),
        Err(_) => Ok(default),
    }
}
