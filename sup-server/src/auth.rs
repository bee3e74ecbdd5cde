//! Verifica delle credenziali e gate HTTP Basic.
//!
//! Nessuna sessione e nessun token: ogni richiesta verso una rotta protetta porta
//! username e password nell'header `Authorization` e viene verificata da capo.

use axum::{
    extract::{Extension, Request},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::Arc;
use sup_core::User;
use tracing::debug;

use crate::{error::AppError, AppState};

const DUMMY_PASSWORD: &str = "sup-dummy-password";

/// Calcola l'hash bcrypt della password con un salt nuovo ad ogni chiamata.
/// Gira sul pool bloccante di tokio: bcrypt è volutamente lento.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

/// `false` anche quando l'hash salvato non è valido.
pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await?;
    Ok(valid.unwrap_or_else(|e| {
        debug!("stored hash rejected by bcrypt: {e}");
        false
    }))
}

/// Cerca l'utente per username e verifica la password.
///
/// Utente inesistente, utente senza hash e password sbagliata producono tutti `None`:
/// il chiamante non può distinguere i casi, nemmeno dai tempi di risposta, perché
/// senza un hash salvato la password viene comunque confrontata con un hash fittizio.
pub async fn verify_credentials(
    state: &AppState,
    username: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    let user = state.store.find_user_by_username(username).await?;
    let stored = user.as_ref().and_then(|u| u.password_hash.clone());
    let Some(hash) = stored else {
        let dummy = state
            .dummy_hash
            .get_or_try_init(|| hash_password(DUMMY_PASSWORD.to_string(), state.bcrypt_cost))
            .await?;
        verify_password(password.to_string(), dummy.clone()).await?;
        return Ok(None);
    };
    if verify_password(password.to_string(), hash).await? {
        Ok(user)
    } else {
        Ok(None)
    }
}

/// Estrae (username, password) da `Authorization: Basic <base64(user:pass)>`.
/// La password è tutto ciò che segue il primo ':'.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Middleware per le rotte protette: 401 prima che l'handler giri se le credenziali
/// mancano o non sono valide, altrimenti inserisce l'utente autenticato tra le extension.
pub async fn require_basic_auth(
    Extension(state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (username, password) = basic_credentials(req.headers()).ok_or(AppError::Unauthorized)?;
    let user = verify_credentials(&state, &username, &password)
        .await?
        .ok_or_else(|| {
            debug!("basic auth failed for {username}");
            AppError::Unauthorized
        })?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
