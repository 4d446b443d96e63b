use crate::forms::FormErrors;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// Lookup by a natural key (group slug, username) found nothing.
    #[error("Entity not found: {entity} '{key}'")]
    NotFoundBy { entity: &'static str, key: String },

    /// Field-level form errors, rendered back to the client as-is.
    #[error("Form validation failed: {0}")]
    Form(FormErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl From<FormErrors> for CoreError {
    fn from(errors: FormErrors) -> Self {
        CoreError::Form(errors)
    }
}
