//! HTTP plumbing shared by every endpoint group

use super::ApiResult;
use crate::auth::SessionStore;
use crate::config::ClientConfig;
use crate::error::{CoreError, Result};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Typed client for the REST backend
///
/// Cheap to clone: the underlying connection pool is shared.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, session: SessionStore) -> Result<Self> {
        let config = config.clone().validated()?;

        let base_url = Url::parse(&config.api_url).map_err(|e| CoreError::InvalidConfig {
            message: format!("invalid API URL '{}': {}", config.api_url, e),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CoreError::InvalidConfig {
                message: format!("API URL '{}' cannot hold a path", config.api_url),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("icpwiz/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CoreError::InvalidConfig {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Base URL plus percent-encoded path segments
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Start a request, attaching the bearer token when logged in
    pub fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let builder = self.http.request(method, self.endpoint(segments));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub fn get(&self, segments: &[&str]) -> RequestBuilder {
        self.request(Method::GET, segments)
    }

    pub fn post(&self, segments: &[&str]) -> RequestBuilder {
        self.request(Method::POST, segments)
    }

    pub fn put(&self, segments: &[&str]) -> RequestBuilder {
        self.request(Method::PUT, segments)
    }

    pub fn delete(&self, segments: &[&str]) -> RequestBuilder {
        self.request(Method::DELETE, segments)
    }

    /// Send and decode a JSON body
    pub async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let (status, body) = match self.execute(request).await {
            Ok(parts) => parts,
            Err(failure) => return failure,
        };

        match decode_body(&body) {
            Ok(data) => ApiResult::ok(data, status),
            Err(e) => {
                warn!(status, error = %e, "Undecodable response body");
                ApiResult::failure(format!("Invalid response: {}", e), Some(status))
            }
        }
    }

    /// Send and ignore the response body
    pub async fn send_empty(&self, request: RequestBuilder) -> ApiResult<()> {
        match self.execute(request).await {
            Ok((status, _)) => ApiResult::ok((), status),
            Err(failure) => failure,
        }
    }

    /// Perform the request; non-2xx and transport failures become envelopes
    async fn execute<T>(
        &self,
        request: RequestBuilder,
    ) -> std::result::Result<(u16, String), ApiResult<T>> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Request failed before a response arrived");
                return Err(ApiResult::failure(format!("Network error: {}", e), None));
            }
        };

        let status = response.status();
        let url = response.url().clone();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Err(ApiResult::failure(
                    format!("Network error: {}", e),
                    Some(status.as_u16()),
                ))
            }
        };

        if !status.is_success() {
            let message = error_message(&body)
                .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
            debug!(url = %url, status = status.as_u16(), %message, "Backend rejected request");
            return Err(ApiResult::failure(message, Some(status.as_u16())));
        }

        debug!(url = %url, status = status.as_u16(), "Backend request succeeded");
        Ok((status.as_u16(), body))
    }
}

/// Accept either the bare payload or `{ "data": payload }`
///
/// An object carrying a `data` key is unwrapped first: most models default
/// every field, so the envelope itself would decode as an empty entity.
fn decode_body<T: DeserializeOwned>(body: &str) -> serde_json::Result<T> {
    let value: Value = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body)?
    };

    if let Some(inner) = value.get("data") {
        if let Ok(data) = serde_json::from_value::<T>(inner.clone()) {
            return Ok(data);
        }
    }
    serde_json::from_value(value)
}

/// `message` or `error` from a JSON error body
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"].iter().find_map(|key| {
        value
            .get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn client(url: &str) -> ApiClient {
        let config = ClientConfig::default().with_api_url(Some(url.to_string()));
        ApiClient::new(&config, SessionStore::new(Arc::new(MemoryStore::new()))).unwrap()
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let api = client("http://localhost:5000/");
        assert_eq!(
            api.endpoint(&["api", "workspaces", "acme", "collaborators", "pat+x@acme.io"])
                .as_str(),
            "http://localhost:5000/api/workspaces/acme/collaborators/pat+x@acme.io"
        );
        assert_eq!(
            api.endpoint(&["api", "workspaces", "a b/c"]).as_str(),
            "http://localhost:5000/api/workspaces/a%20b%2Fc"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = client("https://example.com/icp");
        assert_eq!(
            api.endpoint(&["api", "workspaces"]).as_str(),
            "https://example.com/icp/api/workspaces"
        );
    }

    #[test]
    fn test_decode_bare_and_wrapped() {
        let bare: Vec<u32> = decode_body("[1,2]").unwrap();
        let wrapped: Vec<u32> = decode_body(r#"{"data":[1,2]}"#).unwrap();
        assert_eq!(bare, wrapped);

        decode_body::<()>("").unwrap();
        assert!(decode_body::<Vec<u32>>(r#"{"data":{"x":1}}"#).is_err());
        assert!(decode_body::<Vec<u32>>(r#"{"items":[1]}"#).is_err());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"message":"Invalid token"}"#).as_deref(),
            Some("Invalid token")
        );
        assert_eq!(
            error_message(r#"{"error":"Forbidden"}"#).as_deref(),
            Some("Forbidden")
        );
        assert_eq!(error_message(r#"{"message":"  "}"#), None);
        assert_eq!(
            error_message(r#"{"message":"  ","error":"Forbidden"}"#).as_deref(),
            Some("Forbidden")
        );
        assert_eq!(error_message("<html>502</html>"), None);
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let config = ClientConfig::default().with_api_url(Some("localhost:5000".to_string()));
        let result = ApiClient::new(&config, SessionStore::new(Arc::new(MemoryStore::new())));
        assert!(matches!(result, Err(CoreError::InvalidConfig { .. })));
    }
}
