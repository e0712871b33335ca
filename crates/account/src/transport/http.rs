//! GraphQL-over-HTTP transport.
//!
//! Posts the operation as JSON with `reqwest` and decodes the body with
//! `graphql_client::Response`. The customer token, when one is stored, is
//! sent as a bearer token on every request.

use std::sync::Arc;

use async_trait::async_trait;
use graphql_client::Response;
use secrecy::ExposeSecret;
use tracing::instrument;
use url::Url;

use super::{GraphQLError, Operation, Transport, TransportError};
use crate::config::AccountConfig;
use crate::token::TokenStorage;

/// Max characters of a response body kept in logs and errors.
const BODY_PREVIEW_CHARS: usize = 500;

/// Default [`Transport`] posting operations to a GraphQL endpoint.
#[derive(Clone)]
pub struct HttpTransport {
    inner: Arc<HttpTransportInner>,
}

struct HttpTransportInner {
    client: reqwest::Client,
    endpoint: Url,
    store_code: Option<String>,
    tokens: Arc<dyn TokenStorage>,
}

impl HttpTransport {
    /// Create a transport for the configured endpoint.
    #[must_use]
    pub fn new(config: &AccountConfig, tokens: Arc<dyn TokenStorage>) -> Self {
        Self {
            inner: Arc::new(HttpTransportInner {
                client: reqwest::Client::new(),
                endpoint: config.endpoint.clone(),
                store_code: config.store_code.clone(),
                tokens,
            }),
        }
    }

    /// The endpoint requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// Build the POST for `operation`, authorized with the current token.
    fn request(&self, operation: &Operation) -> reqwest::RequestBuilder {
        let mut request = self
            .inner
            .client
            .post(self.inner.endpoint.clone())
            .header("Content-Type", "application/json")
            .json(operation);

        if let Some(token) = self.inner.tokens.get() {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(store_code) = &self.inner.store_code {
            request = request.header("Store", store_code.as_str());
        }

        request
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, operation), fields(operation = %operation.operation_name))]
    async fn execute(&self, operation: &Operation) -> Result<serde_json::Value, TransportError> {
        let response = self.request(operation).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(TransportError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %preview(&response_text),
                "Account API returned non-success status"
            );

            // Some backends report GraphQL errors alongside a 4xx/5xx status
            return Err(match decode_response(&response_text) {
                Err(err @ TransportError::GraphQL(_)) => err,
                _ => TransportError::Status {
                    status: status.as_u16(),
                    body: preview(&response_text),
                },
            });
        }

        decode_response(&response_text)
    }
}

/// Decode a GraphQL response body into its `data` object.
///
/// Errors take precedence over partial data.
fn decode_response(body: &str) -> Result<serde_json::Value, TransportError> {
    let response: Response<serde_json::Value> = match serde_json::from_str(body) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(
                error = %e,
                body = %preview(body),
                "Failed to parse account GraphQL response"
            );
            return Err(TransportError::Parse(e));
        }
    };

    if let Some(errors) = response.errors
        && !errors.is_empty()
    {
        tracing::debug!(errors = ?errors, "GraphQL errors in response");
        return Err(TransportError::GraphQL(
            errors.into_iter().map(GraphQLError::from).collect(),
        ));
    }

    response
        .data
        .filter(|data| !data.is_null())
        .ok_or(TransportError::MissingData)
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use secrecy::SecretString;

    use super::*;
    use crate::config::CacheSettings;
    use crate::queries;
    use crate::token::InMemoryTokenStorage;
    use crate::transport::GraphQLErrorLocation;

    #[test]
    fn test_decode_returns_data() {
        let data = decode_response(r#"{"data":{"customer":{"id":1}}}"#).unwrap();
        assert_eq!(data, json!({ "customer": { "id": 1 } }));
    }

    #[test]
    fn test_decode_errors_win_over_partial_data() {
        let body = r#"{
            "data": { "customer": null },
            "errors": [
                { "message": "The current customer isn't authorized.", "path": ["customer"],
                  "locations": [{ "line": 1, "column": 2 }] },
                { "message": "second" }
            ]
        }"#;

        let err = decode_response(body).unwrap_err();
        let TransportError::GraphQL(errors) = &err else {
            panic!("expected GraphQL errors, got {err:?}");
        };
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].path, vec![json!("customer")]);
        assert_eq!(
            errors[0].locations[0],
            GraphQLErrorLocation { line: 1, column: 2 }
        );
        assert_eq!(err.first_message(), "The current customer isn't authorized.");
    }

    #[test]
    fn test_decode_missing_data() {
        assert!(matches!(
            decode_response(r#"{"data":null}"#),
            Err(TransportError::MissingData)
        ));
        assert!(matches!(
            decode_response(r#"{"errors":[]}"#),
            Err(TransportError::MissingData)
        ));
    }

    #[test]
    fn test_decode_invalid_json() {
        assert!(matches!(
            decode_response("<html>gateway timeout</html>"),
            Err(TransportError::Parse(_))
        ));
    }

    #[test]
    fn test_preview_truncates() {
        let body = "x".repeat(BODY_PREVIEW_CHARS + 20);
        assert_eq!(preview(&body).len(), BODY_PREVIEW_CHARS);
    }

    fn config(store_code: Option<&str>) -> AccountConfig {
        AccountConfig {
            endpoint: Url::parse("https://shop.example.com/graphql").unwrap(),
            store_code: store_code.map(String::from),
            cache: CacheSettings::default(),
            sentry_dsn: None,
        }
    }

    #[test]
    fn test_new_uses_configured_endpoint() {
        let transport = HttpTransport::new(
            &config(Some("default")),
            Arc::new(InMemoryTokenStorage::default()),
        );
        assert_eq!(
            transport.endpoint().as_str(),
            "https://shop.example.com/graphql"
        );
    }

    #[test]
    fn test_request_carries_token_and_store_headers() {
        let tokens = Arc::new(InMemoryTokenStorage::default());
        tokens.set(SecretString::from("tok123"));
        let transport = HttpTransport::new(&config(Some("default")), tokens);

        let request = transport.request(&queries::customer()).build().unwrap();

        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(request.url().as_str(), "https://shop.example.com/graphql");
        let headers = request.headers();
        assert_eq!(headers["authorization"], "Bearer tok123");
        assert_eq!(headers["store"], "default");
        assert_eq!(headers["content-type"], "application/json");

        let body: serde_json::Value =
            serde_json::from_slice(request.body().unwrap().as_bytes().unwrap()).unwrap();
        assert_eq!(body["operationName"], "GetCustomer");
    }

    #[test]
    fn test_request_without_token_or_store_code() {
        let tokens = Arc::new(InMemoryTokenStorage::default());
        let shared: Arc<dyn TokenStorage> = Arc::<InMemoryTokenStorage>::clone(&tokens);
        let transport = HttpTransport::new(&config(None), shared);

        let request = transport.request(&queries::customer()).build().unwrap();
        assert!(request.headers().get("authorization").is_none());
        assert!(request.headers().get("store").is_none());

        // The token is read per request, so a later sign-in is picked up.
        tokens.set(SecretString::from("tok456"));
        let request = transport.request(&queries::customer()).build().unwrap();
        assert_eq!(request.headers()["authorization"], "Bearer tok456");
    }
}
