use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Extension, Path, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::sync::Arc;
use sup_core::{
    validate, CreateMessageRequest, CreateUserRequest, ExpandedMessage, HiddenResponse,
    MessageFilter, UpdateUserRequest, User,
};
use tracing::{debug, info};

use crate::{auth, error::AppError, AppState};

/// 201 con Location verso la nuova risorsa e body `{}`.
fn created(location: String) -> impl IntoResponse {
    (StatusCode::CREATED, [(header::LOCATION, location)], Json(json!({})))
}

fn ok_empty() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({})))
}

/// Handler per GET /health
pub async fn health(Extension(state): Extension<Arc<AppState>>) -> StatusCode {
    match state.store.health().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            debug!("health check failed: {e}");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Handler per GET /users
pub async fn list_users(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.store.list_users().await?))
}

/// Handler per POST /users
pub async fn create_user(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let req: CreateUserRequest = validate(&body)?;

    // la password in chiaro non viene mai salvata
    let hash = auth::hash_password(req.password, state.bcrypt_cost).await?;
    let user = state.store.insert_user(&req.username, &hash).await?;
    info!("created user {} ({})", user.id, user.username);

    Ok(created(format!("/users/{}", user.id)))
}

/// Handler per GET /users/:id
pub async fn get_user(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    let user = state.store.find_user(&id).await?.ok_or(AppError::UserNotFound)?;
    Ok(Json(user))
}

/// Handler per PUT /users/:id
///
/// Update-or-insert: se non esiste un utente con quell'id ne viene creato uno nuovo
/// (senza password, quindi non potrà autenticarsi).
pub async fn update_user(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let req: UpdateUserRequest = validate(&body)?;
    state.store.upsert_user(&id, &req.username).await?;
    Ok(ok_empty())
}

/// Handler per DELETE /users/:id
pub async fn delete_user(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    if !state.store.delete_user(&id).await? {
        return Err(AppError::UserNotFound);
    }
    info!("deleted user {id}");
    Ok(ok_empty())
}

/// Handler per GET /hidden, raggiungibile solo dopo il gate Basic (vedi auth.rs)
pub async fn hidden(Extension(user): Extension<User>) -> Json<HiddenResponse> {
    info!("{} found the hidden treasure", user.username);
    Json(HiddenResponse::default())
}

/// Handler per GET /messages?to=...&from=...
pub async fn list_messages(
    Extension(state): Extension<Arc<AppState>>,
    query: Result<Query<MessageFilter>, QueryRejection>,
) -> Result<Json<Vec<ExpandedMessage>>, AppError> {
    // la rejection di axum risponderebbe in text/plain con il dettaglio di serde
    let Query(filter) = query.map_err(|e| {
        debug!("rejected messages query: {e}");
        AppError::MalformedQuery
    })?;
    Ok(Json(state.store.list_messages(&filter).await?))
}

/// Handler per POST /messages
pub async fn create_message(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let req: CreateMessageRequest = validate(&body)?;

    // i due lookup partono insieme; nessuna garanzia che gli utenti esistano ancora all'insert
    let (from, to) = tokio::try_join!(
        state.store.find_user(&req.from),
        state.store.find_user(&req.to)
    )?;
    if from.is_none() {
        return Err(AppError::IncorrectValue("from"));
    }
    if to.is_none() {
        return Err(AppError::IncorrectValue("to"));
    }

    let message = state.store.insert_message(&req.from, &req.to, &req.text).await?;
    Ok(created(format!("/messages/{}", message.id)))
}

/// Handler per GET /messages/:id
pub async fn get_message(
    Extension(state): Extension<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ExpandedMessage>, AppError> {
    let message = state.store.find_message(&id).await?.ok_or(AppError::MessageNotFound)?;
    Ok(Json(message))
}
