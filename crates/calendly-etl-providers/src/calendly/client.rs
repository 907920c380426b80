//! Calendly API client.
//!
//! This module provides a thin HTTP client for the Calendly API, handling
//! credential headers, request building, error mapping and pagination.
//! Every request is a single attempt; failures are reported, not retried.

use std::collections::HashSet;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;

use calendly_etl_core::{EtlError, EtlResult};

use crate::secret::{CredentialBundle, CredentialProvider};

use super::config::CalendlyConfig;
use super::types::{CollectionPage, EventType, ResourceEnvelope, ScheduledEvent, User};

/// Calendly API client.
///
/// Credentials are resolved lazily on the first request and reused for every
/// later request made through this client. A client lives for one run.
#[derive(Debug)]
pub struct CalendlyClient {
    http_client: reqwest::Client,
    config: CalendlyConfig,
    credentials: CredentialProvider,
    headers: OnceCell<HeaderMap>,
}

impl CalendlyClient {
    /// Creates a new client. No network or secret access happens here.
    pub fn new(config: CalendlyConfig, credentials: CredentialProvider) -> EtlResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| EtlError::config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            config,
            credentials,
            headers: OnceCell::new(),
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &CalendlyConfig {
        &self.config
    }

    /// Issues `GET <base>/<endpoint>?<query>` and returns the JSON body.
    ///
    /// Query values are URL-encoded.
    ///
    /// # Errors
    ///
    /// - [`EtlError::SecretUnavailable`] if credentials cannot be resolved
    ///   (no request is sent)
    /// - [`EtlError::ApiUnavailable`] on transport failure
    /// - [`EtlError::ApiRequestFailed`] on a non-success status
    /// - [`EtlError::InvalidResponse`] if the body is not JSON
    pub async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> EtlResult<serde_json::Value> {
        let headers = self.auth_headers().await?;
        let url = self.endpoint_url(endpoint)?;

        let mut request = self.http_client.get(url.clone()).headers(headers.clone());
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                EtlError::api_unavailable(url.as_str(), "request timeout")
            } else if e.is_connect() {
                EtlError::api_unavailable(url.as_str(), format!("connection failed: {}", e))
            } else {
                EtlError::api_unavailable(url.as_str(), format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        let final_url = response.url().to_string();
        debug!(endpoint, status = status.as_u16(), "API response");

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<body unavailable: {}>", e));
            return Err(EtlError::api_request_failed(final_url, status.as_u16(), body));
        }

        let body = response.text().await.map_err(|e| {
            EtlError::api_unavailable(final_url.as_str(), format!("failed to read response: {}", e))
        })?;

        serde_json::from_str(&body).map_err(|e| {
            EtlError::invalid_response(final_url, format!("body is not JSON: {}", e))
        })
    }

    /// Returns the authenticated user (`GET users/me`, unwrapped).
    pub async fn get_current_user(&self) -> EtlResult<User> {
        let envelope: ResourceEnvelope<User> = self.get_json("users/me", &[]).await?;
        Ok(envelope.resource)
    }

    /// Returns the URI of the authenticated user's current organization.
    pub async fn get_current_organization(&self) -> EtlResult<String> {
        Ok(self.get_current_user().await?.current_organization)
    }

    /// Returns every event type of `organization`, following pagination.
    pub async fn get_event_types(&self, organization: &str) -> EtlResult<Vec<EventType>> {
        self.get_collection("event_types", &[("organization", organization)])
            .await
    }

    /// Returns every scheduled event of one event type, following pagination.
    pub async fn get_scheduled_events(
        &self,
        event_type: &str,
        organization: &str,
    ) -> EtlResult<Vec<ScheduledEvent>> {
        self.get_collection(
            "scheduled_events",
            &[("event_type", event_type), ("organization", organization)],
        )
        .await
    }

    /// Fetches all pages of a collection endpoint.
    ///
    /// Stops when a page carries no `pagination.next_page_token`. A token
    /// that was already requested is rejected rather than looped on.
    async fn get_collection<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> EtlResult<Vec<T>> {
        let count = self.config.page_size.map(|n| n.to_string());
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens: HashSet<String> = HashSet::new();
        let mut pages = 0usize;

        loop {
            let page: CollectionPage<T> = {
                let mut query = params.to_vec();
                if let Some(ref count) = count {
                    query.push(("count", count.as_str()));
                }
                if let Some(ref token) = page_token {
                    query.push(("page_token", token.as_str()));
                }
                self.get_json(endpoint, &query).await?
            };
            pages += 1;
            items.extend(page.collection);

            let next = page
                .pagination
                .as_ref()
                .and_then(|p| p.next_token())
                .map(String::from);

            let Some(token) = next else { break };
            if !seen_tokens.insert(token.clone()) {
                return Err(EtlError::invalid_response(
                    self.endpoint_url(endpoint)?.as_str(),
                    format!("pagination token `{}` repeated", token),
                ));
            }
            page_token = Some(token);
        }

        debug!(endpoint, pages, items = items.len(), "fetched collection");
        Ok(items)
    }

    /// Issues a GET and deserializes the body into `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> EtlResult<T> {
        let value = self.get(endpoint, query).await?;
        serde_json::from_value(value).map_err(|e| {
            let url = self
                .endpoint_url(endpoint)
                .map(String::from)
                .unwrap_or_else(|_| endpoint.to_string());
            EtlError::invalid_response(url, format!("unexpected payload: {}", e))
        })
    }

    fn endpoint_url(&self, endpoint: &str) -> EtlResult<Url> {
        self.config.base_url.join(endpoint).map_err(|e| {
            EtlError::config(format!("invalid endpoint `{}`: {}", endpoint, e))
        })
    }

    /// Resolves the credential bundle once and caches it as a header map.
    async fn auth_headers(&self) -> EtlResult<&HeaderMap> {
        self.headers
            .get_or_try_init(|| async {
                let bundle = self.credentials.get_credentials().await?;
                to_header_map(self.credentials.secret_name(), &bundle)
            })
            .await
    }
}

/// Converts a credential bundle into request headers marked sensitive.
fn to_header_map(secret_name: &str, bundle: &CredentialBundle) -> EtlResult<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(bundle.len());
    for (name, value) in bundle.iter() {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            EtlError::secret_unavailable(secret_name, format!("`{}` is not a valid header name", name))
        })?;
        let mut header_value = HeaderValue::from_str(value).map_err(|_| {
            EtlError::secret_unavailable(
                secret_name,
                format!("value of header `{}` is not a valid header value", name),
            )
        })?;
        header_value.set_sensitive(true);
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use calendly_etl_core::ErrorCode;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::secret::MemorySecretStore;

    const SECRET: &str = r#"{"Authorization": "Bearer test-token"}"#;

    fn store() -> Arc<MemorySecretStore> {
        Arc::new(MemorySecretStore::new().with_secret("calendly", SECRET))
    }

    fn client_for(base: &str, store: Arc<MemorySecretStore>) -> CalendlyClient {
        let config = CalendlyConfig::new(base).unwrap();
        CalendlyClient::new(config, CredentialProvider::new(store, "calendly")).unwrap()
    }

    #[test]
    fn header_map_marks_values_sensitive() {
        let bundle = CredentialBundle::new([("Authorization", "Bearer x")]);
        let headers = to_header_map("calendly", &bundle).unwrap();
        assert!(headers.get("authorization").unwrap().is_sensitive());
    }

    #[test]
    fn header_map_rejects_invalid_names() {
        let bundle = CredentialBundle::new([("Bad Header", "x")]);
        let err = to_header_map("calendly", &bundle).unwrap_err();
        assert_eq!(err.code(), ErrorCode::SecretUnavailable);
    }

    #[tokio::test]
    async fn get_attaches_credentials_and_parses_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resource": {"ok": true}})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), store());
        let value = client.get("users/me", &[]).await.unwrap();
        assert_eq!(value["resource"]["ok"], json!(true));
    }

    #[tokio::test]
    async fn credentials_are_resolved_once_per_client() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(3)
            .mount(&server)
            .await;

        let store = store();
        let client = client_for(&server.uri(), store.clone());
        for _ in 0..3 {
            client.get("users/me", &[]).await.unwrap();
        }
        assert_eq!(store.lookup_count(), 1);
    }

    #[tokio::test]
    async fn missing_secret_sends_no_request() {
        let server = MockServer::start().await;
        let client = client_for(&server.uri(), Arc::new(MemorySecretStore::new()));

        let err = client.get("users/me", &[]).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::SecretUnavailable);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn non_success_status_maps_to_request_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Permission Denied"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), store());
        let err = client.get("users/me", &[]).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ApiRequestFailed);
        assert_eq!(err.http_status(), Some(403));
        assert!(err.to_string().contains("Permission Denied"));
    }

    #[tokio::test]
    async fn unreadable_error_body_is_described() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            // Promise more bytes than are sent, then hang up.
            let _ = socket
                .write_all(b"HTTP/1.1 502 Bad Gateway\r\ncontent-length: 100\r\n\r\npartial")
                .await;
        });

        let client = client_for(&format!("http://{}", addr), store());
        let err = client.get("users/me", &[]).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ApiRequestFailed);
        assert_eq!(err.http_status(), Some(502));
        assert!(err.to_string().contains("<body unavailable: "));
    }

    #[tokio::test]
    async fn connection_failure_maps_to_unavailable() {
        let client = client_for("http://127.0.0.1:1/", store());
        let err = client.get("users/me", &[]).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ApiUnavailable);
    }

    #[tokio::test]
    async fn non_json_body_maps_to_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), store());
        let err = client.get("users/me", &[]).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidResponse);
    }

    #[tokio::test]
    async fn current_organization_is_unwrapped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resource": {
                    "uri": "https://api.calendly.com/users/U1",
                    "current_organization": "https://api.calendly.com/organizations/O1"
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), store());
        assert_eq!(
            client.get_current_organization().await.unwrap(),
            "https://api.calendly.com/organizations/O1"
        );
    }

    #[tokio::test]
    async fn user_without_organization_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resource": {}})))
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), store());
        let err = client.get_current_user().await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidResponse);
    }

    #[tokio::test]
    async fn query_values_are_url_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/event_types"))
            .and(query_param("organization", "https://api.calendly.com/organizations/O&1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "collection": [{"uri": "https://api.calendly.com/event_types/T1"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), store());
        let types = client
            .get_event_types("https://api.calendly.com/organizations/O&1")
            .await
            .unwrap();
        assert_eq!(types.len(), 1);

        let requests = server.received_requests().await.unwrap();
        let raw_query = requests[0].url.query().unwrap_or_default().to_string();
        assert!(raw_query.contains("O%261"));
    }

    #[tokio::test]
    async fn follows_pagination_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/scheduled_events"))
            .and(query_param_is_missing("page_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "collection": [{"uri": "e1"}, {"uri": "e2"}],
                "pagination": {"count": 2, "next_page_token": "p2"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/scheduled_events"))
            .and(query_param("page_token", "p2"))
            .and(query_param("event_type", "T1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "collection": [{"uri": "e3"}],
                "pagination": {"count": 1, "next_page_token": null}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), store());
        let events = client.get_scheduled_events("T1", "O1").await.unwrap();
        let uris: Vec<_> = events.iter().filter_map(|e| e.uri.as_deref()).collect();
        assert_eq!(uris, vec!["e1", "e2", "e3"]);
    }

    #[tokio::test]
    async fn repeated_pagination_token_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/scheduled_events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "collection": [],
                "pagination": {"next_page_token": "same"}
            })))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), store());
        let err = client.get_scheduled_events("T1", "O1").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidResponse);
        assert!(err.to_string().contains("repeated"));
    }

    #[tokio::test]
    async fn pagination_cycle_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/scheduled_events"))
            .and(query_param_is_missing("page_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "collection": [{"uri": "e1"}],
                "pagination": {"next_page_token": "A"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/scheduled_events"))
            .and(query_param("page_token", "A"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "collection": [{"uri": "e2"}],
                "pagination": {"next_page_token": "B"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/scheduled_events"))
            .and(query_param("page_token", "B"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "collection": [{"uri": "e3"}],
                "pagination": {"next_page_token": "A"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri(), store());
        let err = client.get_scheduled_events("T1", "O1").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidResponse);
        assert!(err.to_string().contains("`A` repeated"));
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn page_size_is_sent_as_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/event_types"))
            .and(query_param("count", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"collection": []})))
            .expect(1)
            .mount(&server)
            .await;

        let config = CalendlyConfig::new(server.uri()).unwrap().with_page_size(50);
        let client =
            CalendlyClient::new(config, CredentialProvider::new(store(), "calendly")).unwrap();
        assert!(client.get_event_types("O1").await.unwrap().is_empty());
    }
}
