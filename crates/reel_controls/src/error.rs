use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControlsError {
    #[error("failed to read controller config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid controller config: {0}")]
    Config(#[from] toml::de::Error),
}
