//! Transport for account GraphQL operations.
//!
//! # Architecture
//!
//! - An [`Operation`] is a `graphql_client` request body built by
//!   [`crate::queries`]; the transport never looks inside it
//! - [`Transport::execute`] resolves to the `data` object of the response,
//!   or to a [`TransportError`] carrying the backend's error list
//! - [`HttpTransport`] is the default implementation over `reqwest`

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;
use thiserror::Error;

/// A GraphQL request descriptor: document, operation name and variables.
pub type Operation = graphql_client::QueryBody<serde_json::Value>;

/// Executes account operations against the commerce backend.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute an operation and return the `data` object of the response.
    ///
    /// # Errors
    ///
    /// Returns the backend's GraphQL errors, or an HTTP/decoding failure.
    async fn execute(&self, operation: &Operation) -> Result<serde_json::Value, TransportError>;
}

/// Errors that can occur when executing an operation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status and no GraphQL errors.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response carried neither data nor errors.
    #[error("No data in response")]
    MissingData,
}

impl TransportError {
    /// The message shown to the user for this failure.
    ///
    /// For a backend error list this is the first error's message; any other
    /// failure uses its display text.
    #[must_use]
    pub fn first_message(&self) -> String {
        match self {
            Self::GraphQL(errors) => errors.first().map_or_else(
                || "(no error details provided)".to_string(),
                |e| e.message.clone(),
            ),
            other => other.to_string(),
        }
    }

    /// Take the first backend error, if this failure carries an error list.
    #[must_use]
    pub fn into_first_graphql_error(self) -> Result<GraphQLError, Self> {
        match self {
            Self::GraphQL(errors) if !errors.is_empty() => {
                Ok(errors.into_iter().next().unwrap_or_default())
            }
            other => Err(other),
        }
    }
}

/// A GraphQL error returned by the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

impl GraphQLError {
    /// An error with only a message.
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

impl From<graphql_client::Error> for GraphQLError {
    fn from(e: graphql_client::Error) -> Self {
        Self {
            message: e.message,
            locations: e.locations.map_or_else(Vec::new, |locs| {
                locs.into_iter()
                    .map(|l| GraphQLErrorLocation {
                        line: i64::from(l.line),
                        column: i64::from(l.column),
                    })
                    .collect()
            }),
            path: e.path.map_or_else(Vec::new, |p| {
                p.into_iter()
                    .map(|fragment| match fragment {
                        graphql_client::PathFragment::Key(s) => serde_json::Value::String(s),
                        graphql_client::PathFragment::Index(i) => {
                            serde_json::Value::Number(i.into())
                        }
                    })
                    .collect()
            }),
        }
    }
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    if errors.is_empty() {
        return "(no error details provided)".to_string();
    }

    errors
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let mut parts = Vec::new();

            if !e.message.is_empty() {
                parts.push(e.message.clone());
            }

            if !e.path.is_empty() {
                let path_str = e
                    .path
                    .iter()
                    .map(|p| match p {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(".");
                parts.push(format!("path: {path_str}"));
            }

            if let Some(loc) = e.locations.first() {
                parts.push(format!("at line {}:{}", loc.line, loc.column));
            }

            if parts.is_empty() {
                format!("[error {}]: (no details)", i + 1)
            } else {
                parts.join(" ")
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn errors(messages: &[&str]) -> TransportError {
        TransportError::GraphQL(
            messages
                .iter()
                .map(|m| GraphQLError::from_message(*m))
                .collect(),
        )
    }

    #[test]
    fn test_first_message_uses_first_error() {
        let err = errors(&["The account sign-in was incorrect", "second"]);
        assert_eq!(err.first_message(), "The account sign-in was incorrect");
    }

    #[test]
    fn test_first_message_for_non_graphql_errors() {
        let err = TransportError::Status {
            status: 502,
            body: "Bad Gateway".to_string(),
        };
        assert_eq!(err.first_message(), "HTTP 502: Bad Gateway");
        assert_eq!(TransportError::MissingData.first_message(), "No data in response");
    }

    #[test]
    fn test_into_first_graphql_error() {
        let first = errors(&["one", "two"]).into_first_graphql_error().unwrap();
        assert_eq!(first.message, "one");

        let err = TransportError::GraphQL(vec![]).into_first_graphql_error();
        assert!(matches!(err, Err(TransportError::GraphQL(ref e)) if e.is_empty()));
    }

    #[test]
    fn test_graphql_error_formatting() {
        let err = errors(&["Field not found", "Invalid ID"]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid ID"
        );
    }

    #[test]
    fn test_graphql_error_path_and_location() {
        let err = TransportError::GraphQL(vec![GraphQLError {
            message: String::new(),
            locations: vec![GraphQLErrorLocation { line: 2, column: 3 }],
            path: vec![
                serde_json::Value::String("customer".to_string()),
                serde_json::Value::Number(0.into()),
            ],
        }]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: path: customer.0 at line 2:3"
        );
    }

    #[test]
    fn test_graphql_error_empty_vec() {
        let err = TransportError::GraphQL(vec![]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: (no error details provided)"
        );
        assert_eq!(err.first_message(), "(no error details provided)");
    }

    #[test]
    fn test_rate_limited_error() {
        let err = TransportError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
