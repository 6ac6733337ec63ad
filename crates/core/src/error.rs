use crate::types::DbId;

/// Domain error taxonomy for the workflow engine.
///
/// Every failed transition maps to exactly one of these variants; the API
/// layer translates them to HTTP statuses and stable error codes. Only
/// [`CoreError::Transient`] is safe for callers to retry.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Forward requested while the document already sits at the last stage.
    #[error("Document {document_id} is at the final stage of its workflow")]
    WorkflowComplete { document_id: DbId },

    /// Reject requested while the document sits at the first stage.
    #[error("Document {document_id} is at the first stage and cannot be sent back")]
    NoPreviousStage { document_id: DbId },

    /// A document cannot be created in a template with no stages.
    #[error("Workflow template {template_id} has no stages")]
    EmptyWorkflow { template_id: DbId },

    /// No active user holds the role required by the target stage.
    /// Raised before any state is mutated.
    #[error("No one currently holds the role '{role}' required by the target stage")]
    NoHolderForRole { role: String },

    #[error("Data integrity violation: {0}")]
    DataIntegrity(String),

    /// The store was unavailable; the request may be retried with backoff.
    #[error("Transient failure: {0}")]
    Transient(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
