//! Stateless HTTP request builder and response parser for the catalog API.
//!
//! # Design
//! `ApiClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The bearer token is an explicit argument to every item `build_*` method;
//! the client never reads session state on its own.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ApiError, Operation};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, AUTHORIZATION, CONTENT_TYPE};
use crate::types::{AccessToken, Credentials, ErrorBody, Item, ItemPayload, RegisteredUser};

const JSON: &str = "application/json";

/// Synchronous, stateless client for the catalog API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_items(&self, token: Option<&str>) -> HttpRequest {
        self.request(HttpMethod::Get, "/items", token, None)
    }

    pub fn build_get_item(&self, id: i64, token: Option<&str>) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/items/{id}"), token, None)
    }

    pub fn build_create_item(
        &self,
        payload: &ItemPayload,
        token: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body = to_json(payload)?;
        Ok(self.request(HttpMethod::Post, "/items", token, Some(body)))
    }

    pub fn build_update_item(
        &self,
        id: i64,
        payload: &ItemPayload,
        token: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body = to_json(payload)?;
        Ok(self.request(HttpMethod::Put, &format!("/items/{id}"), token, Some(body)))
    }

    pub fn build_delete_item(&self, id: i64, token: Option<&str>) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/items/{id}"), token, None)
    }

    pub fn build_register(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        let body = to_json(credentials)?;
        Ok(self.request(HttpMethod::Post, "/register", None, Some(body)))
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        let body = to_json(credentials)?;
        Ok(self.request(HttpMethod::Post, "/login", None, Some(body)))
    }

    pub fn parse_list_items(&self, response: HttpResponse) -> Result<Vec<Item>, ApiError> {
        check_item_status(&response, Operation::ListItems)?;
        from_json(&response.body)
    }

    pub fn parse_get_item(&self, response: HttpResponse) -> Result<Item, ApiError> {
        check_item_status(&response, Operation::GetItem)?;
        from_json(&response.body)
    }

    pub fn parse_create_item(&self, response: HttpResponse) -> Result<Item, ApiError> {
        check_item_status(&response, Operation::CreateItem)?;
        from_json(&response.body)
    }

    pub fn parse_update_item(&self, response: HttpResponse) -> Result<Item, ApiError> {
        check_item_status(&response, Operation::UpdateItem)?;
        from_json(&response.body)
    }

    /// The backend echoes the deleted item; an empty (204) body yields `None`.
    pub fn parse_delete_item(&self, response: HttpResponse) -> Result<Option<Item>, ApiError> {
        check_item_status(&response, Operation::DeleteItem)?;
        if response.body.trim().is_empty() {
            return Ok(None);
        }
        from_json(&response.body).map(Some)
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<RegisteredUser, ApiError> {
        check_auth_status(&response, "Registration failed")?;
        from_json(&response.body)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<AccessToken, ApiError> {
        check_auth_status(&response, "Login failed")?;
        from_json(&response.body)
    }

    fn request(
        &self,
        method: HttpMethod,
        path: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> HttpRequest {
        let mut headers = Vec::new();
        if body.is_some() {
            headers.push((CONTENT_TYPE.to_string(), JSON.to_string()));
        }
        if let Some(token) = token {
            headers.push((AUTHORIZATION.to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers,
            body,
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

fn from_json<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-success status codes of item endpoints to `ApiError`.
fn check_item_status(response: &HttpResponse, operation: Operation) -> Result<(), ApiError> {
    match response.status {
        _ if response.is_success() => Ok(()),
        401 => Err(ApiError::Unauthorized),
        404 => Err(ApiError::NotFound { operation }),
        status => Err(ApiError::OperationFailed { operation, status }),
    }
}

/// Auth endpoints surface the server's `detail` verbatim when it is a string.
fn check_auth_status(response: &HttpResponse, fallback: &str) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = serde_json::from_str::<ErrorBody>(&response.body)
        .ok()
        .and_then(|body| body.detail_message().map(str::to_string))
        .unwrap_or_else(|| fallback.to_string());
    Err(ApiError::ValidationFailed(message))
}
