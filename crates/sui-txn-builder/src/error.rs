//! Error types for the transaction builder.
//!
//! [`BuilderError`] covers everything that can go wrong between adding the
//! first command and obtaining signable bytes: codec failures, IR misuse,
//! ledger lookups, simulation, gas selection and plugin protocol faults.

use std::fmt;
use sui_txn_types::{BcsError, ObjectId, SuiAddress};
use thiserror::Error;

/// A specialized Result type for builder operations.
pub type BuilderResult<T> = Result<T, BuilderError>;

/// One object that the ledger could not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupFailure {
    /// The requested object id
    pub object_id: ObjectId,
    /// The ledger's explanation
    pub reason: String,
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.object_id, self.reason)
    }
}

/// The main error type for building and resolving transactions.
#[derive(Error, Debug)]
pub enum BuilderError {
    /// Error raised by the codec while validating, writing or reading bytes
    #[error("BCS error: {0}")]
    Bcs(#[from] BcsError),

    /// An input is still unresolved when bytes were requested
    #[error("Input at index {index} has not been resolved")]
    UnresolvedInput {
        /// Index of the first unresolved input
        index: u16,
    },

    /// An argument or command is malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A full build was requested without a sender
    #[error("Missing transaction sender")]
    MissingSender,

    /// A full build was requested with incomplete gas data
    #[error("Missing gas {field}")]
    MissingGasData {
        /// Which gas field is unset
        field: &'static str,
    },

    /// One or more objects could not be fetched from the ledger
    #[error("Failed to fetch {} object(s): {}", failures.len(), join(failures))]
    LedgerLookup {
        /// Every object that failed, in request order
        failures: Vec<LookupFailure>,
    },

    /// The dry run used for budget estimation did not succeed
    #[error("Dry run failed, could not automatically determine a budget: {error}")]
    SimulationFailed {
        /// The error reported by the simulated effects
        error: String,
    },

    /// The gas owner has no usable coins
    #[error("No valid gas coins found for {owner}")]
    NoGasCoins {
        /// The address whose coins were searched
        owner: SuiAddress,
    },

    /// An intent command had no registered resolver, or survived resolution
    #[error("No resolver registered for intent `{0}`")]
    IntentUnresolved(String),

    /// A plugin did not run its continuation exactly once to completion
    #[error("Plugin `{plugin}` violated the continuation protocol: {message}")]
    ProtocolViolation {
        /// Name of the offending plugin
        plugin: String,
        /// What it did wrong
        message: String,
    },

    /// The caller cancelled the build
    #[error("Transaction build was cancelled")]
    Cancelled,

    /// Transport failure talking to the fullnode
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed JSON in a response or a serialized transaction
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The RPC endpoint answered with a non-success HTTP status
    #[error("API error ({status_code}): {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// The RPC endpoint answered with a JSON-RPC error object
    #[error("RPC error ({code}): {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// JSON-RPC error message
        message: String,
    },

    /// Invalid builder or client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The pipeline left the IR in an impossible state
    #[error("Builder invariant broken: {0}")]
    Internal(String),

    /// Any other error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

fn join(failures: &[LookupFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

const LOG_MESSAGE_LIMIT: usize = 1000;

/// Substrings that suggest a message is carrying a credential.
const CREDENTIAL_MARKERS: [&str; 7] = [
    "authorization",
    "bearer",
    "mnemonic",
    "password",
    "private_key",
    "secret",
    "seed",
];

impl BuilderError {
    /// Creates an invalid-argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates an API error from response details.
    pub fn api(status_code: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status_code,
            message: message.into(),
        }
    }

    /// Creates a protocol-violation error for the named plugin.
    pub fn protocol_violation(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// Returns true for failures that depend on ledger state or transport
    /// and might succeed if the build is attempted again.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::LedgerLookup { .. } | Self::SimulationFailed { .. } | Self::Rpc { .. } => true,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status_code, .. } => {
                matches!(status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            _ => false,
        }
    }

    /// Returns true for failures caused by how the builder or a plugin was
    /// used, which no amount of retrying will fix.
    pub fn is_caller_bug(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedInput { .. } | Self::ProtocolViolation { .. } | Self::Internal(_)
        )
    }

    /// Returns true if the build was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Renders the error as a single log-safe line.
    ///
    /// Messages mentioning credentials are replaced wholesale. Otherwise
    /// whitespace is flattened, other control characters are dropped and the
    /// result is cut to a bounded number of characters.
    ///
    /// ```rust
    /// use sui_txn_builder::BuilderError;
    ///
    /// let err = BuilderError::api(502, "upstream\nreset");
    /// assert_eq!(err.sanitized_message(), "API error (502): upstream reset");
    /// ```
    pub fn sanitized_message(&self) -> String {
        let rendered = self.to_string();
        let lowered = rendered.to_ascii_lowercase();
        if let Some(marker) = CREDENTIAL_MARKERS.iter().find(|m| lowered.contains(**m)) {
            return format!("<{} error redacted: mentions {marker}>", self.kind());
        }

        let mut line = String::with_capacity(rendered.len().min(LOG_MESSAGE_LIMIT));
        let mut kept = 0;
        for c in rendered.chars() {
            let c = match c {
                '\n' | '\r' | '\t' => ' ',
                c if c.is_control() => continue,
                c => c,
            };
            if kept == LOG_MESSAGE_LIMIT {
                let dropped = rendered.chars().count() - kept;
                line.push_str(&format!(" ... ({dropped} more chars)"));
                break;
            }
            line.push(c);
            kept += 1;
        }
        line
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Bcs(_) => "bcs",
            Self::Http(_) | Self::Api { .. } | Self::Rpc { .. } | Self::Url(_) => "transport",
            Self::Json(_) => "json",
            Self::LedgerLookup { .. } | Self::SimulationFailed { .. } | Self::NoGasCoins { .. } => {
                "ledger"
            }
            _ => "builder",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_input_names_its_index() {
        let err = BuilderError::UnresolvedInput { index: 3 };
        assert_eq!(err.to_string(), "Input at index 3 has not been resolved");
    }

    #[test]
    fn lookup_failures_are_listed() {
        let err = BuilderError::LedgerLookup {
            failures: vec![
                LookupFailure {
                    object_id: ObjectId::from_hex("0x1").unwrap(),
                    reason: "notExists".to_string(),
                },
                LookupFailure {
                    object_id: ObjectId::from_hex("0x2").unwrap(),
                    reason: "deleted".to_string(),
                },
            ],
        };
        let message = err.to_string();
        assert!(message.contains("2 object(s)"));
        assert!(message.contains("notExists"));
        assert!(message.contains("deleted"));
    }

    #[test]
    fn ledger_and_transport_failures_are_retryable() {
        assert!(BuilderError::LedgerLookup { failures: vec![] }.is_retryable());
        assert!(BuilderError::SimulationFailed {
            error: "abort".to_string()
        }
        .is_retryable());
        assert!(BuilderError::api(503, "unavailable").is_retryable());
        assert!(BuilderError::api(429, "rate limited").is_retryable());
        assert!(!BuilderError::api(400, "bad request").is_retryable());
        assert!(!BuilderError::UnresolvedInput { index: 0 }.is_retryable());
        assert!(!BuilderError::NoGasCoins {
            owner: SuiAddress::ZERO
        }
        .is_retryable());
    }

    #[test]
    fn misuse_is_flagged_as_caller_bug() {
        assert!(BuilderError::UnresolvedInput { index: 0 }.is_caller_bug());
        assert!(BuilderError::protocol_violation("p", "skipped next").is_caller_bug());
        assert!(BuilderError::Internal("bad state".to_string()).is_caller_bug());
        assert!(!BuilderError::LedgerLookup { failures: vec![] }.is_caller_bug());
        assert!(!BuilderError::Cancelled.is_caller_bug());
    }

    #[test]
    fn codec_errors_convert() {
        let err: BuilderError = BcsError::TrailingBytes(2).into();
        assert!(matches!(err, BuilderError::Bcs(_)));
        assert!(err.to_string().contains("trailing"));
    }

    #[test]
    fn protocol_violation_names_plugin() {
        let err = BuilderError::protocol_violation("timing", "continuation was not awaited");
        assert!(err.to_string().contains("timing"));
        assert!(err.to_string().contains("not awaited"));
    }

    #[test]
    fn log_line_is_bounded() {
        let err = BuilderError::api(500, "x".repeat(2000));
        let line = err.sanitized_message();
        assert!(line.starts_with("API error (500): xxx"));
        assert!(line.ends_with("more chars)"));
        assert!(line.chars().count() < 1100);
    }

    #[test]
    fn log_line_is_flat() {
        let err = BuilderError::api(400, "bad\x00request\x1f\nretry\tlater");
        assert_eq!(err.sanitized_message(), "API error (400): badrequest retry later");
    }

    #[test]
    fn credentials_are_not_logged() {
        let err = BuilderError::Rpc {
            code: -32000,
            message: "Bearer abc123 rejected".to_string(),
        };
        let line = err.sanitized_message();
        assert_eq!(line, "<transport error redacted: mentions bearer>");
        assert!(!line.contains("abc123"));
    }
}
