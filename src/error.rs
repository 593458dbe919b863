//! Error types for Clean Check.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

/// Configuration-related errors. Fatal: the process must not start.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Transport-related errors. Recoverable: the user retries the same step and
/// the session is left untouched.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Failed to resolve file {file_id}: {reason}")]
    FileResolution { file_id: String, reason: String },
}

/// Analysis-gateway errors.
///
/// The orchestrator collapses all three to the same "no result" outcome, but
/// the variants stay distinct for logging.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Request to {provider} failed: {reason}")]
    Http { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Provider {provider} reported an error: {message}")]
    Provider { provider: String, message: String },
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
