use thiserror::Error;

#[derive(Error, Debug)]
pub enum CombatError {
    #[error("Duplicate state: {0}")]
    DuplicateState(String),

    #[error("Duplicate transition: {0} -> {1}")]
    DuplicateTransition(String, String),

    #[error("Unknown state: {0}")]
    UnknownState(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CombatError>;
