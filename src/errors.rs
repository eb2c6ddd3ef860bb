use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum GatekeeperError {
    #[error("I/O error: {0}")]
    #[diagnostic(code(gatekeeper::io))]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    #[diagnostic(code(gatekeeper::config))]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(gatekeeper::serde))]
    Serde(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    #[diagnostic(code(gatekeeper::db))]
    Db(#[from] sea_orm::DbErr),

    #[error("JOSE error: {0}")]
    #[diagnostic(code(gatekeeper::jose))]
    Jose(String),

    #[error("Password hashing error: {0}")]
    #[diagnostic(code(gatekeeper::password))]
    Password(String),

    #[error("Invalid input: {0}")]
    #[diagnostic(code(gatekeeper::invalid_input))]
    InvalidInput(String),

    #[error("{0}")]
    #[diagnostic(code(gatekeeper::other))]
    Other(String),
}

impl From<josekit::JoseError> for GatekeeperError {
    fn from(value: josekit::JoseError) -> Self {
        GatekeeperError::Jose(value.to_string())
    }
}

impl From<argon2::password_hash::Error> for GatekeeperError {
    fn from(value: argon2::password_hash::Error) -> Self {
        GatekeeperError::Password(value.to_string())
    }
}
