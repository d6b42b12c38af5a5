//! Authenticated JSON client for the Web Distribution API.
//!
//! # Design
//! `WdClient` holds the base URL, credentials and a `Transport`, and carries
//! no mutable state between calls. Each call is split the same way: a
//! `build_request` step that produces an `HttpRequest`, the transport
//! round-trip, and `parse_json` which checks the status and decodes the
//! body. Repositories borrow the client and only ever see decoded JSON.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::query::Query;
use crate::repositories::{InventoryRepository, ProductRepository, TransactionRepository};

/// Synchronous client for one Web Distribution instance.
#[derive(Clone)]
pub struct WdClient<T> {
    base_url: String,
    api_token: String,
    user_agent: String,
    transport: T,
}

#[cfg(feature = "ureq")]
impl WdClient<crate::http::UreqTransport> {
    /// Build a client over the bundled blocking transport.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the configuration does not validate.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let transport = crate::http::UreqTransport::new(config.timeout());
        Self::new(config, transport)
    }
}

impl<T: Transport> WdClient<T> {
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the configuration does not validate.
    pub fn new(config: &ClientConfig, transport: T) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            user_agent: config.user_agent.clone(),
            transport,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn products(&self) -> ProductRepository<'_, T> {
        ProductRepository::new(self)
    }

    pub fn inventory(&self) -> InventoryRepository<'_, T> {
        InventoryRepository::new(self)
    }

    pub fn transactions(&self) -> TransactionRepository<'_, T> {
        TransactionRepository::new(self)
    }

    /// `GET {path}` with query options, decoded as JSON.
    pub fn get_json(&self, path: &str, query: &Query) -> Result<Value> {
        let request = self.build_request(HttpMethod::Get, path, query.clone(), None);
        self.send(request)
    }

    /// `PUT {path}` with a JSON body, decoded as JSON.
    pub fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let request = self.build_request(HttpMethod::Put, path, Query::new(), Some(body));
        self.send(request)
    }

    /// `POST {path}` with an optional JSON body. An empty response body
    /// decodes to `Value::Null`.
    pub fn post(&self, path: &str, body: Option<&Value>) -> Result<Value> {
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        let request = self.build_request(HttpMethod::Post, path, Query::new(), body);
        self.send(request)
    }

    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        query: Query,
        body: Option<String>,
    ) -> HttpRequest {
        let mut headers = vec![
            ("accept".to_string(), "application/json".to_string()),
            ("authorization".to_string(), format!("Bearer {}", self.api_token)),
            ("user-agent".to_string(), self.user_agent.clone()),
            ("x-request-id".to_string(), Uuid::new_v4().to_string()),
        ];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            url: format!("{}/{}", self.base_url, path.trim_start_matches('/')),
            query: query.into_pairs(),
            headers,
            body,
        }
    }

    fn send(&self, request: HttpRequest) -> Result<Value> {
        let request_id = request.header("x-request-id").unwrap_or_default().to_string();
        debug!(method = ?request.method, url = %request.url, %request_id, "sending request");
        let response = self.transport.execute(&request)?;
        debug!(status = response.status, %request_id, "received response");
        parse_json(response)
    }
}

impl<T> fmt::Debug for WdClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WdClient")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

/// Check the status and decode the body.
pub fn parse_json(response: HttpResponse) -> Result<Value> {
    if !response.is_success() {
        return Err(ApiError::Http {
            status: response.status,
            body: response.body,
        });
    }
    if response.body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::{client_with, ok, status};

    #[test]
    fn get_json_builds_authenticated_request() {
        let client = client_with(vec![ok(json!([]))]);
        let query = Query::new().with(["company"]).param("page", 1);
        client.get_json("api/item", &query).unwrap();

        let requests = client.transport().requests();
        let req = &requests[0];
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://wd.test/api/item");
        assert_eq!(req.header("authorization"), Some("Bearer test-token"));
        assert_eq!(req.header("accept"), Some("application/json"));
        assert!(req.header("content-type").is_none());
        assert_eq!(req.query, query.into_pairs());
        assert!(req.body.is_none());
    }

    #[test]
    fn every_request_gets_a_fresh_request_id() {
        let client = client_with(vec![ok(json!({})), ok(json!({}))]);
        client.get_json("api/item/1", &Query::new()).unwrap();
        client.get_json("api/item/1", &Query::new()).unwrap();

        let requests = client.transport().requests();
        let first: Uuid = requests[0].header("x-request-id").unwrap().parse().unwrap();
        let second: Uuid = requests[1].header("x-request-id").unwrap().parse().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn put_json_serializes_body() {
        let client = client_with(vec![ok(json!({"id": 3}))]);
        let value = client
            .put_json("/api/style/3", &json!({"name": "Linen"}))
            .unwrap();
        assert_eq!(value["id"], 3);

        let requests = client.transport().requests();
        assert_eq!(requests[0].method, HttpMethod::Put);
        assert_eq!(requests[0].url, "http://wd.test/api/style/3");
        assert_eq!(requests[0].header("content-type"), Some("application/json"));
        let body: Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "Linen"}));
    }

    #[test]
    fn post_without_body_sends_none_and_accepts_empty_reply() {
        let client = client_with(vec![status(204, "")]);
        let value = client.post("api/transaction-item/9/unallocate", None).unwrap();
        assert_eq!(value, Value::Null);
        assert!(client.transport().requests()[0].body.is_none());
    }

    #[test]
    fn non_success_status_is_http_error() {
        let client = client_with(vec![status(422, "{\"message\":\"bad\"}")]);
        let err = client.get_json("api/item", &Query::new()).unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 422, .. }));
    }

    #[test]
    fn invalid_json_is_deserialization_error() {
        let client = client_with(vec![status(200, "not json")]);
        let err = client.get_json("api/item", &Query::new()).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ClientConfig::new("http://wd.test/", "t");
        let client = WdClient::new(&config, crate::testing::ScriptedTransport::default()).unwrap();
        let req = client.build_request(HttpMethod::Get, "/api/item", Query::new(), None);
        assert_eq!(req.url, "http://wd.test/api/item");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = ClientConfig::new("ftp://wd.test", "t");
        let err = WdClient::new(&config, crate::testing::ScriptedTransport::default()).unwrap_err();
        assert!(matches!(err, ApiError::Config(_)));
    }

    #[test]
    fn debug_hides_token() {
        let client = client_with(Vec::new());
        assert!(!format!("{client:?}").contains("test-token"));
    }
}
