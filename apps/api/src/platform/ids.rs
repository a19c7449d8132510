use uuid::Uuid;

/// Produces opaque unique identifiers for new records.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
