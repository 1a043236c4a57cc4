use std::io;

use portail_core::{ApiError, AuthError, ConfigError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No API base URL configured. Pass --api-url or set PORTAIL_API_URL.")]
    ApiUrlNotConfigured,
    #[error("No session source. Pass --employee-id or --adresse1 with --password.")]
    MissingSessionSource,
}
