use thiserror::Error;

#[derive(Error, Debug)]
pub enum KwaliteeError {
    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("not a directory: {0}")]
    NotADirectory(String),

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("invalid score: {0}")]
    InvalidScore(String),

    #[error("invalid index tree: {0}")]
    InvalidIndex(String),

    #[error("python grammar unavailable: {0}")]
    Parser(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, KwaliteeError>;
