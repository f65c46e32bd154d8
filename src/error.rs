#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown client hint: {0}")]
    UnknownHint(String),
    #[error("client hint {name:?} does not hold a value of type {expected}")]
    HintType { name: String, expected: &'static str },
    #[error("client hint {0:?} is already registered")]
    DuplicateHint(String),
    #[error("fallback {fallback:?} of client hint {name:?} does not survive its own transform")]
    FallbackMismatch { name: String, fallback: String },
    #[error("invalid client hint {name:?}: {reason}")]
    InvalidHint { name: String, reason: String },
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    YAML(#[from] serde_yaml::Error),
    #[error(transparent)]
    Regex(#[from] fancy_regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
