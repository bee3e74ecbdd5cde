mod common;

use axum::http::{header, Method, StatusCode};
use common::spawn_app;
use serde_json::json;

#[tokio::test]
async fn correct_credentials_reach_hidden_page() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    app.create_user("joe", "password").await;

    let res = app.get_with_basic("/hidden", "joe", "password").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.message(), "You have found the hidden treasure.");
    Ok(())
}

#[tokio::test]
async fn missing_credentials_are_unauthorized() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    app.create_user("joe", "password").await;

    let res = app.get("/hidden").await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.headers.get(header::WWW_AUTHENTICATE).unwrap(),
        r#"Basic realm="Users""#
    );
    Ok(())
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    app.create_user("joe", "password").await;

    let res = app.get_with_basic("/hidden", "joe", "wrong").await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

/*
    Obiettivo test: utente inesistente e password sbagliata producono la stessa risposta
*/
#[tokio::test]
async fn unknown_user_looks_like_wrong_password() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    app.create_user("joe", "password").await;

    let unknown = app.get_with_basic("/hidden", "nobody", "password").await;
    let wrong = app.get_with_basic("/hidden", "joe", "wrong").await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status, wrong.status);
    assert_eq!(unknown.body, wrong.body);
    Ok(())
}

// un utente creato via upsert non ha hash e non può autenticarsi
#[tokio::test]
async fn upserted_user_cannot_authenticate() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    app.send_json(Method::PUT, "/users/ghost-id", json!({"username": "ghost"}))
        .await;

    let res = app.get_with_basic("/hidden", "ghost", "").await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn credentials_are_checked_on_every_request() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    let id = app.create_user("joe", "password").await;

    assert_eq!(app.get_with_basic("/hidden", "joe", "password").await.status, StatusCode::OK);

    app.delete(&format!("/users/{id}")).await;
    let res = app.get_with_basic("/hidden", "joe", "password").await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    Ok(())
}

/*
    Obiettivo test: anche per uno username sconosciuto bcrypt gira (contro l'hash fittizio),
    così i tempi di risposta non rivelano se l'utente esiste
*/
#[tokio::test]
async fn unknown_user_still_runs_bcrypt() -> anyhow::Result<()> {
    let app = spawn_app().await?;
    assert!(app.state.dummy_hash.get().is_none());

    let res = app.get_with_basic("/hidden", "nobody", "password").await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let dummy = app.state.dummy_hash.get().expect("dummy hash computed");
    assert!(dummy.starts_with("$2"), "expected a bcrypt hash, got {dummy}");

    // un utente esistente con password sbagliata non tocca l'hash fittizio
    let other = spawn_app().await?;
    other.create_user("joe", "password").await;
    other.get_with_basic("/hidden", "joe", "wrong").await;
    assert!(other.state.dummy_hash.get().is_none());
    Ok(())
}
