use thiserror::Error;
use uuid::Uuid;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(#[from] ConfigError),
    #[error("Frame Error: {0}")]
    Frame(#[from] FrameError),
    #[error("Alert Error: {0}")]
    Alert(#[from] AlertError),
    #[error("Reminder Error: {0}")]
    Reminder(#[from] ReminderError),
    #[error("Failed to bind to {1}: {0}")]
    Bind(std::io::Error, String),
    #[error("Client Error: {0}")]
    Client(String),
    #[error("Failed to send shutdown to client handle: {0}")]
    ClientShutdown(Uuid),
    #[error("Session Error: {0}")]
    Session(String),
    #[error("Pipeline Error: {0}")]
    Pipeline(String),
    #[error("Server Error: {0}")]
    Server(std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Unsupported time limit of {0} seconds")]
    UnsupportedTimeLimit(u32),
    #[error("Invalid log level '{0}'")]
    InvalidLogLevel(String),
}

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Failed to read frame: {0}")]
    Read(std::io::Error),
    #[error("Invalid frame length, expected {0} bytes but got {1}")]
    InvalidFrameLength(usize, usize),
    #[error("Invalid frame tag: {0}")]
    InvalidFrameTag(u8),
    #[error("Invalid control op: {0}")]
    InvalidControlOp(u8),
    #[error("Unsupported time limit of {0} seconds")]
    UnsupportedTimeLimit(u32),
    #[error("Unsupported language code: {0}")]
    UnsupportedLanguage(u8),
}

#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Failed to reach alert backend: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Alert backend replied with status {0}")]
    Status(u16),
}

#[derive(Error, Debug)]
pub enum ReminderError {
    #[error("Failed to reach language model: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Language model replied with status {0}")]
    Status(u16),
    #[error("Language model reply had no content")]
    EmptyReply,
}
