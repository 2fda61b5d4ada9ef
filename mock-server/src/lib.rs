use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CreateItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateItem {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserOut {
    pub id: i64,
    pub email: String,
    pub is_active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenOut {
    pub access_token: String,
    pub token_type: String,
}

struct User {
    id: i64,
    password: String,
    is_active: bool,
}

#[derive(Default)]
pub struct Store {
    users: HashMap<String, User>,
    sessions: HashMap<String, String>,
    items: BTreeMap<i64, Item>,
    next_user_id: i64,
    next_item_id: i64,
}

pub type Db = Arc<RwLock<Store>>;

/// Failures rendered as `{"detail": "..."}`, the envelope clients read.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("Item not found")]
    ItemNotFound,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::EmailTaken | AppError::InvalidCredentials => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::ItemNotFound => StatusCode::NOT_FOUND,
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Email of the caller, resolved from `Authorization: Bearer <token>`.
pub struct CurrentUser(pub String);

impl FromRequestParts<Db> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, db: &Db) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| {
                warn!("missing bearer token");
                AppError::Unauthorized
            })?;

        let store = db.read().await;
        store
            .sessions
            .get(token)
            .cloned()
            .map(CurrentUser)
            .ok_or_else(|| {
                warn!("unknown bearer token");
                AppError::Unauthorized
            })
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn register(
    State(db): State<Db>,
    Json(input): Json<Credentials>,
) -> Result<Json<UserOut>, AppError> {
    let mut store = db.write().await;
    if store.users.contains_key(&input.email) {
        return Err(AppError::EmailTaken);
    }
    store.next_user_id += 1;
    let user = User {
        id: store.next_user_id,
        password: input.password,
        is_active: true,
    };
    let out = UserOut {
        id: user.id,
        email: input.email.clone(),
        is_active: user.is_active,
    };
    store.users.insert(input.email, user);
    info!(user_id = out.id, "registered user");
    Ok(Json(out))
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<Credentials>,
) -> Result<Json<TokenOut>, AppError> {
    let mut store = db.write().await;
    let valid = store
        .users
        .get(&input.email)
        .is_some_and(|user| user.password == input.password);
    if !valid {
        return Err(AppError::InvalidCredentials);
    }
    let access_token = Uuid::new_v4().simple().to_string();
    store.sessions.insert(access_token.clone(), input.email);
    info!("issued access token");
    Ok(Json(TokenOut {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

async fn list_items(State(db): State<Db>, _user: CurrentUser) -> Json<Vec<Item>> {
    let store = db.read().await;
    Json(store.items.values().cloned().collect())
}

async fn create_item(
    State(db): State<Db>,
    _user: CurrentUser,
    Json(input): Json<CreateItem>,
) -> (StatusCode, Json<Item>) {
    let mut store = db.write().await;
    store.next_item_id += 1;
    let item = Item {
        id: store.next_item_id,
        name: input.name,
        description: input.description,
        created_at: Utc::now(),
    };
    store.items.insert(item.id, item.clone());
    (StatusCode::CREATED, Json(item))
}

async fn get_item(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Item>, AppError> {
    let store = db.read().await;
    store
        .items
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(AppError::ItemNotFound)
}

async fn update_item(
    State(db): State<Db>,
    _user: CurrentUser,
    Path(id): Path<i64>,
    Json(input): Json<UpdateItem>,
) -> Result<Json<Item>, AppError> {
    let mut store = db.write().await;
    let item = store.items.get_mut(&id).ok_or(AppError::ItemNotFound)?;
    if let Some(name) = input.name {
        item.name = name;
    }
    if let Some(description) = input.description {
        item.description = Some(description);
    }
    Ok(Json(item.clone()))
}

async fn delete_item(
    State(db): State<Db>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<Item>, AppError> {
    let mut store = db.write().await;
    store
        .items
        .remove(&id)
        .map(Json)
        .ok_or(AppError::ItemNotFound)
}
