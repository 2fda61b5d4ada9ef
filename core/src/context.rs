//! Session-aware API calls.
//!
//! # Design
//! `SessionContext` ties an `ApiClient` to an explicit `SessionStore` and
//! `Transport`. Every item call goes through `authorized`, which reads the
//! current token, performs the single round-trip and, on `Unauthorized`,
//! clears the store before handing the error back. Callers only decide where
//! to send the user next.

use tracing::{debug, info, instrument, warn};

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::session::SessionStore;
use crate::transport::Transport;
use crate::types::{Credentials, Item, ItemPayload, RegisteredUser};

pub struct SessionContext<S, T> {
    client: ApiClient,
    store: S,
    transport: T,
}

impl<S: SessionStore, T: Transport> SessionContext<S, T> {
    pub fn new(client: ApiClient, store: S, transport: T) -> Self {
        Self {
            client,
            store,
            transport,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_logged_in(&self) -> bool {
        self.store.get().is_some()
    }

    /// Guard for views that need a session: fails without touching the
    /// network when no token is held.
    pub fn require_session(&self) -> Result<(), ApiError> {
        if self.is_logged_in() {
            Ok(())
        } else {
            debug!("no session token held");
            Err(ApiError::Unauthorized)
        }
    }

    pub fn list_items(&self) -> Result<Vec<Item>, ApiError> {
        self.authorized(
            |client, token| Ok(client.build_list_items(token)),
            |client, response| client.parse_list_items(response),
        )
    }

    pub fn get_item(&self, id: i64) -> Result<Item, ApiError> {
        self.authorized(
            |client, token| Ok(client.build_get_item(id, token)),
            |client, response| client.parse_get_item(response),
        )
    }

    pub fn create_item(&self, payload: &ItemPayload) -> Result<Item, ApiError> {
        payload.validate()?;
        self.authorized(
            |client, token| client.build_create_item(payload, token),
            |client, response| client.parse_create_item(response),
        )
    }

    pub fn update_item(&self, id: i64, payload: &ItemPayload) -> Result<Item, ApiError> {
        payload.validate()?;
        self.authorized(
            |client, token| client.build_update_item(id, payload, token),
            |client, response| client.parse_update_item(response),
        )
    }

    pub fn delete_item(&self, id: i64) -> Result<Option<Item>, ApiError> {
        self.authorized(
            |client, token| Ok(client.build_delete_item(id, token)),
            |client, response| client.parse_delete_item(response),
        )
    }

    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub fn register(&self, credentials: &Credentials) -> Result<RegisteredUser, ApiError> {
        credentials.validate()?;
        let request = self.client.build_register(credentials)?;
        let response = self.send(request)?;
        let user = self.client.parse_register(response)?;
        info!(user_id = user.id, "registered");
        Ok(user)
    }

    /// On success the store holds exactly the issued `access_token`.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        credentials.validate()?;
        let request = self.client.build_login(credentials)?;
        let response = self.send(request)?;
        let token = self.client.parse_login(response)?;
        self.store.set(&token.access_token)?;
        info!("logged in");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.store.clear()?;
        info!("logged out");
        Ok(())
    }

    fn authorized<R>(
        &self,
        build: impl FnOnce(&ApiClient, Option<&str>) -> Result<HttpRequest, ApiError>,
        parse: impl FnOnce(&ApiClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let token = self.store.get();
        let request = build(&self.client, token.as_deref())?;
        let response = self.send(request)?;
        match parse(&self.client, response) {
            Err(ApiError::Unauthorized) => {
                warn!("server rejected the session, clearing stored token");
                if let Err(e) = self.store.clear() {
                    warn!(error = %e, "unable to clear session token");
                }
                Err(ApiError::Unauthorized)
            }
            other => other,
        }
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = request.method.as_str(), path = %request.path, "sending request");
        let response = self.transport.execute(request)?;
        debug!(status = response.status, "received response");
        Ok(response)
    }
}
