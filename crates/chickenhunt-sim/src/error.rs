//! Error types for the scenario replay binary.
//!
//! [`SimError`] is the top-level error type that wraps all possible
//! failure modes while loading and replaying a scenario.

/// Top-level error for the scenario replay binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Game configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: chickenhunt_core::config::ConfigError,
    },

    /// The engine refused to start or a strict step failed.
    #[error("game error: {source}")]
    Game {
        /// The underlying game error.
        #[from]
        source: chickenhunt_core::GameError,
    },

    /// Reading the scenario file failed.
    #[error("failed to read scenario file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The scenario file is not valid YAML.
    #[error("failed to parse scenario YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        #[from]
        source: serde_yml::Error,
    },

    /// An event could not be serialized.
    #[error("failed to serialize event: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// A step names a player the scenario never declared.
    #[error("unknown player name: {name}")]
    UnknownPlayer {
        /// The undeclared name.
        name: String,
    },

    /// The scenario declares the same player twice.
    #[error("duplicate player name: {name}")]
    DuplicatePlayer {
        /// The repeated name.
        name: String,
    },

    /// The command line could not be understood.
    #[error("usage: chickenhunt-sim <scenario.yaml> [config.yaml]")]
    Usage,
}
