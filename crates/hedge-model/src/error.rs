//! Error types of the latency model.

use thiserror::Error;

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown distribution kind `{kind}`")]
    UnknownDistribution { kind: String },

    #[error("distribution `{kind}` requires parameter `{param}`")]
    MissingParameter { kind: &'static str, param: &'static str },

    #[error("distribution `{kind}` has invalid parameter `{param}` = {value}")]
    InvalidParameter {
        kind: &'static str,
        param: &'static str,
        value: f64,
    },

    #[error("quantile probability {p} is outside of [0, 1]")]
    InvalidQuantile { p: f64 },

    #[error("unknown hedging policy `{name}`")]
    UnknownPolicy { name: String },

    #[error("hedging policy `{name}` has invalid parameter `{param}`")]
    InvalidPolicyParam { name: String, param: String },

    #[error("function `{function}` is not described in the functions config")]
    UnknownFunction { function: String },

    #[error("invalid config: {0}")]
    Config(String),

    /// Attaches the offending function name to an error raised while setting it up.
    #[error("function `{function}`: {source}")]
    Function {
        function: String,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    pub fn in_function(self, function: &str) -> Self {
        Error::Function {
            function: function.to_string(),
            source: Box::new(self),
        }
    }
}
