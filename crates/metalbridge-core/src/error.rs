use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetalBridgeError {
    #[error("Probe command '{0}' has an empty program")]
    EmptyProgram(String),

    #[error("Probe command '{0}' has a zero timeout")]
    ZeroTimeout(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MetalBridgeError>;
