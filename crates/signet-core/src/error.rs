use thiserror::Error;

pub type SignetResult<T> = Result<T, SignetError>;

#[derive(Debug, Error)]
pub enum SignetError {
    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
