//! Transition engine implementation.
//!
//! Every operation runs as a single transaction: read the document and its
//! stage path, check authorization and preconditions, resolve the next
//! destinator, write the new document state under an optimistic version
//! check, append the audit entries, and record the notification. A failed
//! precondition aborts before any write; a lost version race rolls the
//! whole transaction back with a conflict error. The WebSocket push signal
//! is published only after the commit and never affects the outcome.

use std::sync::Arc;

use sqlx::{Postgres, Transaction};
use parapheur_core::error::CoreError;
use parapheur_core::notifications::{NOTIF_DOCUMENT_FORWARDED, NOTIF_DOCUMENT_REJECTED};
use parapheur_core::resolver::HolderResolution;
use parapheur_core::roles::{can_act, RoleName};
use parapheur_core::stage::{StagePath, StageRef};
use parapheur_core::status::{DocumentStatus, TransferStatus};
use parapheur_core::types::DbId;
use parapheur_db::models::document::{Document, TransitionUpdate};
use parapheur_db::models::stage::Stage;
use parapheur_db::models::user::User;
use parapheur_db::repositories::{
    AuditEntryRepo, DocumentRepo, NotificationRepo, RoleRepo, TemplateRepo,
};
use parapheur_db::DbPool;
use parapheur_events::{EventBus, WorkflowEvent};

use crate::middleware::auth::AuthUser;

/// The identity acting on a document, as established by the auth layer.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: DbId,
    pub name: String,
    pub roles: Vec<RoleName>,
}

impl From<AuthUser> for Actor {
    fn from(user: AuthUser) -> Self {
        Actor {
            id: user.user_id,
            name: user.name,
            roles: user.roles,
        }
    }
}

/// Result of a successful forward/reject transition.
#[derive(Debug)]
pub struct TransitionOutcome {
    /// The document in its post-transition state.
    pub document: Document,
    /// The user now expected to act, when the target stage has a resolvable
    /// role holder.
    pub destinator: Option<User>,
}

/// Orchestrates document transitions against the store and the event bus.
#[derive(Clone)]
pub struct WorkflowEngine {
    pool: DbPool,
    event_bus: Arc<EventBus>,
}

impl WorkflowEngine {
    pub fn new(pool: DbPool, event_bus: Arc<EventBus>) -> Self {
        Self { pool, event_bus }
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Create a document at the entry stage of a workflow template.
    ///
    /// The document starts pending/pending. The destinator is pre-resolved
    /// from the first stage's role when a holder exists; creation itself
    /// produces no audit entry and no notification.
    pub async fn create_in_workflow(
        &self,
        template_id: DbId,
        title: &str,
    ) -> Result<Document, CoreError> {
        let mut tx = self.begin().await?;

        TemplateRepo::find_by_id(&mut *tx, template_id)
            .await
            .map_err(store_error)?
            .ok_or(CoreError::NotFound {
                entity: "WorkflowTemplate",
                id: template_id,
            })?;

        let path = self.load_path(&mut tx, template_id).await?;
        let first = path
            .first()
            .ok_or(CoreError::EmptyWorkflow { template_id })?
            .clone();

        // Creation tolerates an unresolvable holder; the document simply has
        // no destinator until the first hand-off.
        let destinator = match self.resolve_destinator(&mut tx, &first).await {
            Ok(dest) => dest,
            Err(CoreError::NoHolderForRole { .. }) => None,
            Err(e) => return Err(e),
        };

        let document = DocumentRepo::create(
            &mut *tx,
            title,
            template_id,
            Some(first.id),
            destinator.as_ref().map(|u| u.name.as_str()),
        )
        .await
        .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;

        tracing::info!(
            document_id = document.id,
            template_id,
            stage = %first.label,
            "Document created in workflow"
        );
        Ok(document)
    }

    /// Move a document forward to the next stage of its template.
    pub async fn forward(
        &self,
        document_id: DbId,
        actor: &Actor,
        comments: &[String],
    ) -> Result<TransitionOutcome, CoreError> {
        let mut tx = self.begin().await?;

        let doc = self.load_document(&mut tx, document_id).await?;
        let path = self.load_path(&mut tx, doc.template_id).await?;
        let current = current_stage(&path, &doc)?.clone();

        self.authorize(&mut tx, actor, &current).await?;

        let next = path
            .next_after(current.sequence_number)
            .ok_or(CoreError::WorkflowComplete { document_id })?
            .clone();

        // Resolve the destinator before any mutation; zero holders aborts.
        let destinator = self.resolve_destinator(&mut tx, &next).await?;

        // A rejected document being forwarded again is back under review.
        let status = match DocumentStatus::parse(&doc.status)? {
            DocumentStatus::Rejected => DocumentStatus::Pending,
            other => other,
        };

        let update = TransitionUpdate {
            current_stage_id: Some(next.id),
            status: status.as_str().to_string(),
            transfer_status: TransferStatus::Sent.as_str().to_string(),
            destinator_name: destinator.as_ref().map(|u| u.name.clone()),
        };

        let updated = self.apply(&mut tx, &doc, &update).await?;
        self.append_comments(&mut tx, &doc, actor, comments).await?;

        if let Some(dest) = &destinator {
            NotificationRepo::create(
                &mut *tx,
                dest.id,
                "Document forwarded",
                &format!("'{}' awaits your action at stage '{}'", doc.title, next.label),
                NOTIF_DOCUMENT_FORWARDED,
            )
            .await
            .map_err(store_error)?;
        }

        tx.commit().await.map_err(store_error)?;

        self.publish(
            NOTIF_DOCUMENT_FORWARDED,
            &updated,
            actor,
            destinator.as_ref(),
            &next,
        );

        tracing::info!(
            document_id,
            actor_id = actor.id,
            stage = %next.label,
            "Document forwarded"
        );
        Ok(TransitionOutcome {
            document: updated,
            destinator,
        })
    }

    /// Reject a document back to the previous stage of its template.
    ///
    /// A rejection without at least one non-empty comment is invalid input:
    /// the audit trail must record why.
    pub async fn reject(
        &self,
        document_id: DbId,
        actor: &Actor,
        comments: &[String],
    ) -> Result<TransitionOutcome, CoreError> {
        if comments.iter().all(|c| c.trim().is_empty()) {
            return Err(CoreError::Validation(
                "A rejection requires at least one comment".into(),
            ));
        }

        let mut tx = self.begin().await?;

        let doc = self.load_document(&mut tx, document_id).await?;
        let path = self.load_path(&mut tx, doc.template_id).await?;
        let current = current_stage(&path, &doc)?.clone();

        self.authorize(&mut tx, actor, &current).await?;

        let previous = path
            .previous_before(current.sequence_number)
            .ok_or(CoreError::NoPreviousStage { document_id })?
            .clone();

        let destinator = self.resolve_destinator(&mut tx, &previous).await?;

        let update = TransitionUpdate {
            current_stage_id: Some(previous.id),
            status: DocumentStatus::Rejected.as_str().to_string(),
            transfer_status: TransferStatus::Sent.as_str().to_string(),
            destinator_name: destinator.as_ref().map(|u| u.name.clone()),
        };

        let updated = self.apply(&mut tx, &doc, &update).await?;
        self.append_comments(&mut tx, &doc, actor, comments).await?;

        if let Some(dest) = &destinator {
            NotificationRepo::create(
                &mut *tx,
                dest.id,
                "Document rejected",
                &format!(
                    "'{}' was rejected and returned to stage '{}'",
                    doc.title, previous.label
                ),
                NOTIF_DOCUMENT_REJECTED,
            )
            .await
            .map_err(store_error)?;
        }

        tx.commit().await.map_err(store_error)?;

        self.publish(
            NOTIF_DOCUMENT_REJECTED,
            &updated,
            actor,
            destinator.as_ref(),
            &previous,
        );

        tracing::info!(
            document_id,
            actor_id = actor.id,
            stage = %previous.label,
            "Document rejected"
        );
        Ok(TransitionOutcome {
            document: updated,
            destinator,
        })
    }

    /// Record that the document was opened.
    ///
    /// When the named destinator opens it, the hand-off delivery state
    /// advances one step (`sent -> received -> viewed`); other authorized
    /// viewers leave the delivery state untouched. Either way the review
    /// status is recomputed via the stage-completion check. Idempotent once
    /// the hand-off is viewed.
    pub async fn view(&self, document_id: DbId, actor: &Actor) -> Result<Document, CoreError> {
        let mut tx = self.begin().await?;

        let doc = self.load_document(&mut tx, document_id).await?;
        let path = self.load_path(&mut tx, doc.template_id).await?;
        let current = current_stage(&path, &doc)?.clone();

        // The named destinator may always open the document; otherwise the
        // regular stage authorization applies.
        let is_destinator = doc.destinator_name.as_deref() == Some(actor.name.as_str());
        if !is_destinator {
            self.authorize(&mut tx, actor, &current).await?;
        }

        // Delivery state records what the destinator has seen; nobody else
        // moves it.
        let next_transfer = if is_destinator {
            let transfer = TransferStatus::parse(&doc.transfer_status)?;
            [TransferStatus::Received, TransferStatus::Viewed]
                .into_iter()
                .find(|t| transfer.can_advance_to(*t))
        } else {
            None
        };

        let status = self.completion_status(&mut tx, &doc).await?;

        let Some(next_transfer) = next_transfer else {
            // Nothing to advance; still surface a recomputed status change.
            if status.as_str() != doc.status {
                let updated = DocumentRepo::advance_transfer(
                    &mut *tx,
                    doc.id,
                    doc.version,
                    &doc.transfer_status,
                    status.as_str(),
                )
                .await
                .map_err(store_error)?
                .ok_or_else(|| conflict(document_id))?;
                tx.commit().await.map_err(store_error)?;
                return Ok(updated);
            }
            return Ok(doc);
        };

        let updated = DocumentRepo::advance_transfer(
            &mut *tx,
            doc.id,
            doc.version,
            next_transfer.as_str(),
            status.as_str(),
        )
        .await
        .map_err(store_error)?
        .ok_or_else(|| conflict(document_id))?;

        tx.commit().await.map_err(store_error)?;

        tracing::debug!(
            document_id,
            actor_id = actor.id,
            transfer_status = next_transfer.as_str(),
            "Document hand-off advanced"
        );
        Ok(updated)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, CoreError> {
        self.pool.begin().await.map_err(store_error)
    }

    async fn load_document(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        document_id: DbId,
    ) -> Result<Document, CoreError> {
        DocumentRepo::find_by_id(&mut **tx, document_id)
            .await
            .map_err(store_error)?
            .ok_or(CoreError::NotFound {
                entity: "Document",
                id: document_id,
            })
    }

    /// Load a template's stages and build the validated stage path.
    async fn load_path(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        template_id: DbId,
    ) -> Result<StagePath, CoreError> {
        let stages = TemplateRepo::stages_for(&mut **tx, template_id)
            .await
            .map_err(store_error)?;
        StagePath::new(stages.iter().map(Stage::to_ref).collect())
    }

    /// Reject the actor unless they hold an elevated role or the role bound
    /// to the stage. Runs before any mutation.
    async fn authorize(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        actor: &Actor,
        stage: &StageRef,
    ) -> Result<(), CoreError> {
        let required = match stage.required_role_id {
            Some(role_id) => {
                let role = RoleRepo::find_by_id(&mut **tx, role_id)
                    .await
                    .map_err(store_error)?
                    .ok_or_else(|| {
                        CoreError::DataIntegrity(format!(
                            "stage {} is bound to missing role {role_id}",
                            stage.id
                        ))
                    })?;
                Some(role.name)
            }
            None => None,
        };

        if !can_act(&actor.roles, required.as_deref()) {
            return Err(CoreError::Forbidden(format!(
                "Acting on stage '{}' requires the role '{}'",
                stage.label,
                required.as_deref().unwrap_or("admin")
            )));
        }
        Ok(())
    }

    /// Resolve who receives the document at the given stage.
    ///
    /// Zero holders is a hard failure; an ambiguous set routes to the first
    /// holder of the repository's id-ordered list. A stage with no bound
    /// role yields no destinator.
    async fn resolve_destinator(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        stage: &StageRef,
    ) -> Result<Option<User>, CoreError> {
        let Some(role_id) = stage.required_role_id else {
            return Ok(None);
        };
        let role = RoleRepo::find_by_id(&mut **tx, role_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| {
                CoreError::DataIntegrity(format!(
                    "stage {} is bound to missing role {role_id}",
                    stage.id
                ))
            })?;

        let holders = RoleRepo::holders_of(&mut **tx, role_id)
            .await
            .map_err(store_error)?;

        match HolderResolution::classify(holders) {
            HolderResolution::NoHolder => Err(CoreError::NoHolderForRole { role: role.name }),
            resolution => {
                if let HolderResolution::Ambiguous(holders) = &resolution {
                    tracing::warn!(
                        role = %role.name,
                        holders = holders.len(),
                        "Multiple holders for stage role, routing to the lowest user id"
                    );
                }
                Ok(resolution.into_primary())
            }
        }
    }

    async fn apply(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        doc: &Document,
        update: &TransitionUpdate,
    ) -> Result<Document, CoreError> {
        DocumentRepo::apply_transition(&mut **tx, doc.id, doc.version, update)
            .await
            .map_err(store_error)?
            .ok_or_else(|| conflict(doc.id))
    }

    async fn append_comments(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        doc: &Document,
        actor: &Actor,
        comments: &[String],
    ) -> Result<(), CoreError> {
        for comment in comments {
            let trimmed = comment.trim();
            if trimmed.is_empty() {
                continue;
            }
            AuditEntryRepo::append(&mut **tx, doc.id, actor.id, trimmed)
                .await
                .map_err(store_error)?;
        }
        Ok(())
    }

    /// The stage-completion check: a document is verified once the current
    /// hand-off carries at least one audit annotation, unless it was
    /// explicitly rejected.
    async fn completion_status(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        doc: &Document,
    ) -> Result<DocumentStatus, CoreError> {
        if DocumentStatus::parse(&doc.status)? == DocumentStatus::Rejected {
            return Ok(DocumentStatus::Rejected);
        }
        let Some(since) = doc.transfer_timestamp else {
            return Ok(DocumentStatus::Pending);
        };
        let annotations = AuditEntryRepo::count_since(&mut **tx, doc.id, since)
            .await
            .map_err(store_error)?;
        if annotations > 0 {
            Ok(DocumentStatus::Verified)
        } else {
            Ok(DocumentStatus::Pending)
        }
    }

    /// Best-effort live-push signal, published after commit.
    fn publish(
        &self,
        event_type: &str,
        document: &Document,
        actor: &Actor,
        destinator: Option<&User>,
        stage: &StageRef,
    ) {
        let mut event = WorkflowEvent::new(event_type, document.id, actor.id).with_payload(
            serde_json::json!({
                "document_id": document.id,
                "title": document.title,
                "stage": stage.label,
                "status": document.status,
            }),
        );
        if let Some(dest) = destinator {
            event = event.with_target(dest.id);
        }
        self.event_bus.publish(event);
    }
}

fn current_stage<'a>(path: &'a StagePath, doc: &Document) -> Result<&'a StageRef, CoreError> {
    let stage_id = doc.current_stage_id.ok_or_else(|| {
        CoreError::DataIntegrity(format!("document {} has no current stage", doc.id))
    })?;
    path.by_id(stage_id).ok_or_else(|| {
        CoreError::DataIntegrity(format!(
            "document {} occupies stage {stage_id} outside its template",
            doc.id
        ))
    })
}

fn conflict(document_id: DbId) -> CoreError {
    CoreError::Conflict(format!(
        "Document {document_id} was modified by a concurrent transition"
    ))
}

/// Map store failures onto the domain taxonomy: connection-level problems
/// are retryable, everything else is internal.
fn store_error(err: sqlx::Error) -> CoreError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            CoreError::Transient(err.to_string())
        }
        other => CoreError::Internal(other.to_string()),
    }
}
