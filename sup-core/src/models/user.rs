use serde::{Deserialize, Serialize};

/// Utente così come è salvato e restituito sul wire.
///
/// `password` contiene l'hash bcrypt, mai la password in chiaro. Un utente creato
/// tramite upsert (PUT su un id inesistente) non ha hash: il campo viene omesso.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    #[serde(rename = "password", default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
}
