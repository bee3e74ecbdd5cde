use serde::{Deserialize, Serialize};

use crate::validation::{Field, Schema};
/*
    http dto for http requests
    i body vengono validati campo per campo (vedi validation.rs) prima di essere
    deserializzati in queste strutture, nell'ordine dichiarato in FIELDS
*/
// Create user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
}

impl Schema for CreateUserRequest {
    const FIELDS: &'static [Field] = &[Field::string("username"), Field::string("password")];
}

// Update user (upsert)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub username: String,
}

impl Schema for UpdateUserRequest {
    const FIELDS: &'static [Field] = &[Field::string("username")];
}

// Create message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub text: String,
    pub to: String,
    pub from: String,
}

impl Schema for CreateMessageRequest {
    const FIELDS: &'static [Field] = &[
        Field::string("text"),
        Field::string("to"),
        Field::string("from"),
    ];
}

// Messages listing, filtri passati come query params (?to=...&from=...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

/// Risposta della rotta protetta /hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenResponse {
    pub message: String,
}

impl Default for HiddenResponse {
    fn default() -> Self {
        Self { message: "You have found the hidden treasure.".to_string() }
    }
}
