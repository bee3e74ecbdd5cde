//! Validazione dei body JSON contro uno schema dichiarato dal tipo di richiesta.
//!
//! Ogni tipo di richiesta elenca i propri campi obbligatori in [`Schema::FIELDS`].
//! I controlli girano nell'ordine dichiarato: per ogni campo prima la presenza,
//! poi il tipo. Il primo controllo che fallisce determina l'unico errore
//! restituito.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// Tipo JSON atteso per un campo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
}

impl FieldKind {
    pub fn matches(self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
        }
    }
}

/// Campo obbligatorio di uno schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl Field {
    pub const fn string(name: &'static str) -> Self {
        Self { name, kind: FieldKind::String }
    }
}

/// Schema di una richiesta: campi obbligatori nell'ordine in cui vanno controllati.
pub trait Schema: DeserializeOwned {
    const FIELDS: &'static [Field];
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("No request body")]
    NoBody,

    #[error("Malformed request body")]
    Malformed,

    #[error("Missing field: {0}")]
    Missing(&'static str),

    #[error("Incorrect field type: {0}")]
    IncorrectType(&'static str),
}

impl ValidationError {
    /// Il campo che ha causato l'errore, se l'errore riguarda un campo.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::Missing(f) | ValidationError::IncorrectType(f) => Some(*f),
            ValidationError::NoBody | ValidationError::Malformed => None,
        }
    }
}

/// Valida un body grezzo e lo converte nel tipo di richiesta `T`.
pub fn validate<T: Schema>(body: &[u8]) -> Result<T, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ValidationError::NoBody);
    }
    let value: Value = serde_json::from_slice(body).map_err(|_| ValidationError::Malformed)?;
    let Value::Object(object) = value else {
        return Err(ValidationError::Malformed);
    };
    check_fields(&object, T::FIELDS)?;
    serde_json::from_value(Value::Object(object)).map_err(|_| ValidationError::Malformed)
}

fn check_fields(object: &Map<String, Value>, fields: &[Field]) -> Result<(), ValidationError> {
    for field in fields {
        match object.get(field.name) {
            None => return Err(ValidationError::Missing(field.name)),
            Some(v) if !field.kind.matches(v) => {
                return Err(ValidationError::IncorrectType(field.name))
            }
            Some(_) => {}
        }
    }
    Ok(())
}
