//! sup-core: tipi condivisi tra client e server (modelli, DTO HTTP, validazione, errori).
//! Niente I/O: solo serde.

pub mod models;
pub mod protocol;
pub mod error;
pub mod utils;
pub mod validation;

// Re-export utili per ridurre i percorsi nel crate server
pub use error::Error;
pub use models::{message::ExpandedMessage, message::Message, user::User};
pub use protocol::http::{
    CreateMessageRequest, CreateUserRequest, HiddenResponse, MessageFilter, UpdateUserRequest,
};
pub use utils::new_id;
pub use validation::{validate, Field, FieldKind, Schema, ValidationError};
