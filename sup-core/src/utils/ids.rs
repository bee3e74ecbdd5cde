use uuid::Uuid;

/// Genera un nuovo identificativo di documento (UUIDv4) come stringa.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
