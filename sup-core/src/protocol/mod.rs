pub mod http;

// Re-export comodi
pub use http::{
    CreateMessageRequest, CreateUserRequest, HiddenResponse, MessageFilter, UpdateUserRequest,
};
