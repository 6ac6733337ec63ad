//! Engine-level integration tests for document transitions.
//!
//! These exercise `WorkflowEngine` directly against a real database so the
//! transactional guarantees (atomicity of document + audit + notification,
//! optimistic version check) are tested for real, not mocked.

use std::sync::Arc;

use assert_matches::assert_matches;
use sqlx::PgPool;

use parapheur_api::engine::{Actor, WorkflowEngine};
use parapheur_core::error::CoreError;
use parapheur_core::notifications::{NOTIF_DOCUMENT_FORWARDED, NOTIF_DOCUMENT_REJECTED};
use parapheur_core::roles::RoleName;
use parapheur_db::models::role::CreateRole;
use parapheur_db::models::stage::{CreateStage, Stage};
use parapheur_db::models::template::CreateTemplate;
use parapheur_db::models::user::User;
use parapheur_db::repositories::{
    AuditEntryRepo, DocumentRepo, NotificationRepo, RoleRepo, StageRepo, TemplateRepo, UserRepo,
};
use parapheur_events::EventBus;

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// A three-stage workflow: Intake -> Review -> Archive, each stage bound to
/// its own role with exactly one holder (alice, bob, carol).
struct Workflow3 {
    template_id: i64,
    intake: Stage,
    review: Stage,
    archive: Stage,
    alice: User,
    bob: User,
    carol: User,
}

fn engine(pool: &PgPool) -> WorkflowEngine {
    WorkflowEngine::new(pool.clone(), Arc::new(EventBus::default()))
}

fn actor_of(user: &User, roles: &[&str]) -> Actor {
    Actor {
        id: user.id,
        name: user.name.clone(),
        roles: roles.iter().map(|r| RoleName::parse(r)).collect(),
    }
}

async fn seed_role(pool: &PgPool, name: &str) -> i64 {
    let role = RoleRepo::create(
        pool,
        &CreateRole {
            name: name.to_string(),
            description: None,
            permissions: None,
        },
    )
    .await
    .expect("role creation should succeed");
    role.id
}

async fn seed_user(pool: &PgPool, name: &str, role_id: i64) -> User {
    let user = UserRepo::create(pool, name, None, "unused-hash")
        .await
        .expect("user creation should succeed");
    UserRepo::assign_role(pool, user.id, role_id)
        .await
        .expect("role assignment should succeed");
    user
}

async fn seed_stage(pool: &PgPool, label: &str, seq: i32, role_id: Option<i64>) -> Stage {
    StageRepo::create(
        pool,
        &CreateStage {
            label: label.to_string(),
            description: None,
            sequence_number: seq,
            required_role_id: role_id,
        },
    )
    .await
    .expect("stage creation should succeed")
}

async fn seed_workflow(pool: &PgPool) -> Workflow3 {
    let intake_role = seed_role(pool, "intake_clerk").await;
    let review_role = seed_role(pool, "reviewer").await;
    let archive_role = seed_role(pool, "archivist").await;

    let alice = seed_user(pool, "alice", intake_role).await;
    let bob = seed_user(pool, "bob", review_role).await;
    let carol = seed_user(pool, "carol", archive_role).await;

    let intake = seed_stage(pool, "Intake", 1, Some(intake_role)).await;
    let review = seed_stage(pool, "Review", 2, Some(review_role)).await;
    let archive = seed_stage(pool, "Archive", 3, Some(archive_role)).await;

    let template = TemplateRepo::create(
        pool,
        &CreateTemplate {
            label: "Invoice approval".to_string(),
            description: None,
        },
    )
    .await
    .expect("template creation should succeed");
    for stage in [&intake, &review, &archive] {
        TemplateRepo::attach_stage(pool, template.id, stage.id)
            .await
            .expect("stage attach should succeed");
    }

    Workflow3 {
        template_id: template.id,
        intake,
        review,
        archive,
        alice,
        bob,
        carol,
    }
}

// ---------------------------------------------------------------------------
// Creation
// ---------------------------------------------------------------------------

/// A new document lands on the entry stage, pending on both axes, with the
/// first stage's holder pre-resolved as destinator.
#[sqlx::test(migrations = "../../db/migrations")]
async fn creation_lands_on_entry_stage(pool: PgPool) {
    let wf = seed_workflow(&pool).await;
    let engine = engine(&pool);

    let doc = engine
        .create_in_workflow(wf.template_id, "Contract 2026-117")
        .await
        .expect("creation should succeed");

    assert_eq!(doc.current_stage_id, Some(wf.intake.id));
    assert_eq!(doc.status, "pending");
    assert_eq!(doc.transfer_status, "pending");
    assert_eq!(doc.destinator_name.as_deref(), Some("alice"));
    assert_eq!(doc.version, 1);

    // Creation itself leaves no trail and no notification.
    let entries = AuditEntryRepo::count_for_document(&pool, doc.id).await.unwrap();
    assert_eq!(entries, 0);
    let inbox = NotificationRepo::list_for_user(&pool, wf.alice.id, false, 50, 0)
        .await
        .unwrap();
    assert!(inbox.is_empty());
}

/// A template with no stages refuses document creation.
#[sqlx::test(migrations = "../../db/migrations")]
async fn creation_in_empty_template_is_refused(pool: PgPool) {
    let template = TemplateRepo::create(
        &pool,
        &CreateTemplate {
            label: "Empty".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();

    let err = engine(&pool)
        .create_in_workflow(template.id, "Orphan")
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::EmptyWorkflow { template_id } if template_id == template.id);
}

/// Creating a document in an unknown template is a not-found error.
#[sqlx::test(migrations = "../../db/migrations")]
async fn creation_in_unknown_template_is_not_found(pool: PgPool) {
    let err = engine(&pool)
        .create_in_workflow(999_999, "Nowhere")
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::NotFound { entity: "WorkflowTemplate", .. });
}

// ---------------------------------------------------------------------------
// Forward / reject end to end
// ---------------------------------------------------------------------------

/// The canonical round trip: alice forwards with an annotation, bob rejects
/// with a reason. The document ends back at the entry stage, rejected,
/// re-addressed to alice, with the full trail and exactly one rejection
/// notification.
#[sqlx::test(migrations = "../../db/migrations")]
async fn forward_then_reject_round_trip(pool: PgPool) {
    let wf = seed_workflow(&pool).await;
    let engine = engine(&pool);
    let alice = actor_of(&wf.alice, &["intake_clerk"]);
    let bob = actor_of(&wf.bob, &["reviewer"]);

    let doc = engine
        .create_in_workflow(wf.template_id, "Contract 2026-117")
        .await
        .unwrap();

    // Alice forwards to Review.
    let outcome = engine
        .forward(doc.id, &alice, &["scanned".to_string()])
        .await
        .expect("forward should succeed");
    assert_eq!(outcome.document.current_stage_id, Some(wf.review.id));
    assert_eq!(outcome.document.status, "pending");
    assert_eq!(outcome.document.transfer_status, "sent");
    assert_eq!(outcome.document.destinator_name.as_deref(), Some("bob"));
    assert!(outcome.document.transfer_timestamp.is_some());
    assert_eq!(outcome.destinator.as_ref().map(|u| u.id), Some(wf.bob.id));

    // Bob rejects back to Intake.
    let outcome = engine
        .reject(doc.id, &bob, &["missing signature".to_string()])
        .await
        .expect("reject should succeed");
    assert_eq!(outcome.document.current_stage_id, Some(wf.intake.id));
    assert_eq!(outcome.document.status, "rejected");
    assert_eq!(outcome.document.transfer_status, "sent");
    assert_eq!(outcome.document.destinator_name.as_deref(), Some("alice"));

    // The trail holds both annotations in chronological order.
    let trail = AuditEntryRepo::list_for_document(&pool, doc.id).await.unwrap();
    assert_eq!(trail.len(), 2);
    assert_eq!(trail[0].content, "scanned");
    assert_eq!(trail[0].author_id, wf.alice.id);
    assert_eq!(trail[1].content, "missing signature");
    assert_eq!(trail[1].author_id, wf.bob.id);

    // Alice got exactly one rejection notification, bob one forward one.
    let alice_inbox = NotificationRepo::list_for_user(&pool, wf.alice.id, false, 50, 0)
        .await
        .unwrap();
    assert_eq!(alice_inbox.len(), 1);
    assert_eq!(alice_inbox[0].notification_type, NOTIF_DOCUMENT_REJECTED);

    let bob_inbox = NotificationRepo::list_for_user(&pool, wf.bob.id, false, 50, 0)
        .await
        .unwrap();
    assert_eq!(bob_inbox.len(), 1);
    assert_eq!(bob_inbox[0].notification_type, NOTIF_DOCUMENT_FORWARDED);
}

/// Forwarding a rejected document puts it back under review.
#[sqlx::test(migrations = "../../db/migrations")]
async fn forwarding_a_rejected_document_resets_its_status(pool: PgPool) {
    let wf = seed_workflow(&pool).await;
    let engine = engine(&pool);
    let alice = actor_of(&wf.alice, &["intake_clerk"]);
    let bob = actor_of(&wf.bob, &["reviewer"]);

    let doc = engine
        .create_in_workflow(wf.template_id, "Bounced once")
        .await
        .unwrap();
    engine.forward(doc.id, &alice, &[]).await.unwrap();
    engine
        .reject(doc.id, &bob, &["wrong amount".to_string()])
        .await
        .unwrap();

    let outcome = engine
        .forward(doc.id, &alice, &["amount corrected".to_string()])
        .await
        .unwrap();
    assert_eq!(outcome.document.status, "pending");
    assert_eq!(outcome.document.current_stage_id, Some(wf.review.id));
}

/// Forward at the final stage is refused and publishes a completion error.
#[sqlx::test(migrations = "../../db/migrations")]
async fn forward_at_final_stage_is_refused(pool: PgPool) {
    let wf = seed_workflow(&pool).await;
    let engine = engine(&pool);
    let alice = actor_of(&wf.alice, &["intake_clerk"]);
    let bob = actor_of(&wf.bob, &["reviewer"]);
    let carol = actor_of(&wf.carol, &["archivist"]);

    let doc = engine
        .create_in_workflow(wf.template_id, "Almost done")
        .await
        .unwrap();
    engine.forward(doc.id, &alice, &[]).await.unwrap();
    engine.forward(doc.id, &bob, &[]).await.unwrap();

    let err = engine.forward(doc.id, &carol, &[]).await.unwrap_err();
    assert_matches!(err, CoreError::WorkflowComplete { document_id } if document_id == doc.id);

    // The document stays untouched at the final stage.
    let current = DocumentRepo::find_by_id(&pool, doc.id).await.unwrap().unwrap();
    assert_eq!(current.current_stage_id, Some(wf.archive.id));
}

/// Reject at the entry stage is refused; there is nowhere to send back to.
#[sqlx::test(migrations = "../../db/migrations")]
async fn reject_at_entry_stage_is_refused(pool: PgPool) {
    let wf = seed_workflow(&pool).await;
    let engine = engine(&pool);
    let alice = actor_of(&wf.alice, &["intake_clerk"]);

    let doc = engine
        .create_in_workflow(wf.template_id, "Fresh arrival")
        .await
        .unwrap();

    let err = engine
        .reject(doc.id, &alice, &["no".to_string()])
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::NoPreviousStage { document_id } if document_id == doc.id);
}

/// A rejection must carry at least one non-empty comment.
#[sqlx::test(migrations = "../../db/migrations")]
async fn reject_without_comment_is_invalid(pool: PgPool) {
    let wf = seed_workflow(&pool).await;
    let engine = engine(&pool);
    let bob = actor_of(&wf.bob, &["reviewer"]);

    let doc = engine
        .create_in_workflow(wf.template_id, "Silent refusal")
        .await
        .unwrap();

    let err = engine.reject(doc.id, &bob, &[]).await.unwrap_err();
    assert_matches!(err, CoreError::Validation(_));

    let err = engine
        .reject(doc.id, &bob, &["   ".to_string()])
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Validation(_));
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

/// Whoever holds neither the stage's role nor an elevated one cannot act.
#[sqlx::test(migrations = "../../db/migrations")]
async fn stage_role_is_enforced(pool: PgPool) {
    let wf = seed_workflow(&pool).await;
    let engine = engine(&pool);

    let bystander_role = seed_role(&pool, "bystander").await;
    let dave = seed_user(&pool, "dave", bystander_role).await;
    let dave = actor_of(&dave, &["bystander"]);

    let doc = engine
        .create_in_workflow(wf.template_id, "Off limits")
        .await
        .unwrap();

    let err = engine.forward(doc.id, &dave, &[]).await.unwrap_err();
    assert_matches!(err, CoreError::Forbidden(_));

    let err = engine
        .reject(doc.id, &dave, &["nope".to_string()])
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Forbidden(_));

    // Dave is not the destinator either, so viewing is equally refused.
    let err = engine.view(doc.id, &dave).await.unwrap_err();
    assert_matches!(err, CoreError::Forbidden(_));

    // Nothing was written.
    let entries = AuditEntryRepo::count_for_document(&pool, doc.id).await.unwrap();
    assert_eq!(entries, 0);
}

/// Elevated roles may act on any stage regardless of its bound role.
#[sqlx::test(migrations = "../../db/migrations")]
async fn elevated_roles_act_on_any_stage(pool: PgPool) {
    let wf = seed_workflow(&pool).await;
    let engine = engine(&pool);

    let admin_role = RoleRepo::find_by_name(&pool, "admin").await.unwrap().unwrap();
    let root = seed_user(&pool, "root", admin_role.id).await;
    let root = actor_of(&root, &["admin"]);

    let doc = engine
        .create_in_workflow(wf.template_id, "Escalated")
        .await
        .unwrap();

    let outcome = engine
        .forward(doc.id, &root, &["handled by admin".to_string()])
        .await
        .expect("admin forward should succeed");
    assert_eq!(outcome.document.current_stage_id, Some(wf.review.id));
}

// ---------------------------------------------------------------------------
// Holder resolution and atomicity
// ---------------------------------------------------------------------------

/// When the target stage's role has no active holder the whole transition
/// aborts before any write: no document change, no trail, no notification.
#[sqlx::test(migrations = "../../db/migrations")]
async fn vacant_target_role_aborts_without_side_effects(pool: PgPool) {
    let intake_role = seed_role(&pool, "intake_clerk").await;
    let vacant_role = seed_role(&pool, "nobody_holds_this").await;
    let alice = seed_user(&pool, "alice", intake_role).await;

    let intake = seed_stage(&pool, "Intake", 1, Some(intake_role)).await;
    let vacant = seed_stage(&pool, "Vacant", 2, Some(vacant_role)).await;
    let template = TemplateRepo::create(
        &pool,
        &CreateTemplate {
            label: "Understaffed".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();
    TemplateRepo::attach_stage(&pool, template.id, intake.id).await.unwrap();
    TemplateRepo::attach_stage(&pool, template.id, vacant.id).await.unwrap();

    let engine = engine(&pool);
    let alice_actor = actor_of(&alice, &["intake_clerk"]);
    let doc = engine
        .create_in_workflow(template.id, "Going nowhere")
        .await
        .unwrap();

    let err = engine
        .forward(doc.id, &alice_actor, &["try anyway".to_string()])
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::NoHolderForRole { role } if role == "nobody_holds_this");

    let current = DocumentRepo::find_by_id(&pool, doc.id).await.unwrap().unwrap();
    assert_eq!(current.current_stage_id, Some(intake.id));
    assert_eq!(current.version, doc.version);
    assert_eq!(
        AuditEntryRepo::count_for_document(&pool, doc.id).await.unwrap(),
        0
    );
    let inbox = NotificationRepo::list_for_user(&pool, alice.id, false, 50, 0)
        .await
        .unwrap();
    assert!(inbox.is_empty());
}

/// When a deactivated user is the only holder, the role counts as vacant.
#[sqlx::test(migrations = "../../db/migrations")]
async fn inactive_holders_do_not_resolve(pool: PgPool) {
    let wf = seed_workflow(&pool).await;

    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(wf.bob.id)
        .execute(&pool)
        .await
        .unwrap();

    let engine = engine(&pool);
    let alice = actor_of(&wf.alice, &["intake_clerk"]);
    let doc = engine
        .create_in_workflow(wf.template_id, "Reviewer on leave")
        .await
        .unwrap();

    let err = engine.forward(doc.id, &alice, &[]).await.unwrap_err();
    assert_matches!(err, CoreError::NoHolderForRole { role } if role == "reviewer");
}

/// Two simultaneous forwards of the same document elect exactly one winner;
/// the loser's transaction rolls back with a conflict.
#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_forwards_elect_one_winner(pool: PgPool) {
    let wf = seed_workflow(&pool).await;
    let engine = engine(&pool);
    let alice = actor_of(&wf.alice, &["intake_clerk"]);

    let doc = engine
        .create_in_workflow(wf.template_id, "Race me")
        .await
        .unwrap();

    let first = ["first".to_string()];
    let second = ["second".to_string()];
    let (a, b) = tokio::join!(
        engine.forward(doc.id, &alice, &first),
        engine.forward(doc.id, &alice, &second),
    );

    let (winner, loser) = match (a, b) {
        (Ok(outcome), Err(err)) | (Err(err), Ok(outcome)) => (outcome, err),
        (Ok(_), Ok(_)) => panic!("both forwards succeeded"),
        (Err(a), Err(b)) => panic!("both forwards failed: {a}; {b}"),
    };
    assert_matches!(loser, CoreError::Conflict(_));
    assert_eq!(winner.document.current_stage_id, Some(wf.review.id));

    // Exactly one annotation and one forward notification survived.
    assert_eq!(
        AuditEntryRepo::count_for_document(&pool, doc.id).await.unwrap(),
        1
    );
    let bob_inbox = NotificationRepo::list_for_user(&pool, wf.bob.id, false, 50, 0)
        .await
        .unwrap();
    assert_eq!(bob_inbox.len(), 1);
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Viewing advances the hand-off one delivery step at a time and settles
/// once it reaches `viewed`.
#[sqlx::test(migrations = "../../db/migrations")]
async fn view_advances_the_handoff(pool: PgPool) {
    let wf = seed_workflow(&pool).await;
    let engine = engine(&pool);
    let alice = actor_of(&wf.alice, &["intake_clerk"]);
    let bob = actor_of(&wf.bob, &["reviewer"]);

    let doc = engine
        .create_in_workflow(wf.template_id, "Read me")
        .await
        .unwrap();
    engine
        .forward(doc.id, &alice, &["scanned".to_string()])
        .await
        .unwrap();

    let viewed = engine.view(doc.id, &bob).await.unwrap();
    assert_eq!(viewed.transfer_status, "received");
    // The hand-off carries alice's annotation, so the stage counts as done.
    assert_eq!(viewed.status, "verified");

    let viewed = engine.view(doc.id, &bob).await.unwrap();
    assert_eq!(viewed.transfer_status, "viewed");

    // Settled: a further view changes nothing.
    let settled = engine.view(doc.id, &bob).await.unwrap();
    assert_eq!(settled.transfer_status, "viewed");
    assert_eq!(settled.version, viewed.version);
}

/// An elevated viewer who is not the destinator sees the recomputed review
/// status but never moves the hand-off delivery state.
#[sqlx::test(migrations = "../../db/migrations")]
async fn view_by_a_non_destinator_keeps_delivery_state(pool: PgPool) {
    let wf = seed_workflow(&pool).await;
    let engine = engine(&pool);
    let alice = actor_of(&wf.alice, &["intake_clerk"]);

    let admin_role = RoleRepo::find_by_name(&pool, "admin").await.unwrap().unwrap();
    let root = seed_user(&pool, "root", admin_role.id).await;
    let root = actor_of(&root, &["admin"]);

    let doc = engine
        .create_in_workflow(wf.template_id, "Spot check")
        .await
        .unwrap();
    engine
        .forward(doc.id, &alice, &["scanned".to_string()])
        .await
        .unwrap();

    let seen = engine.view(doc.id, &root).await.unwrap();
    assert_eq!(seen.transfer_status, "sent", "delivery state is bob's alone");
    assert_eq!(seen.status, "verified");

    // The destinator's own view still advances it.
    let bob = actor_of(&wf.bob, &["reviewer"]);
    let viewed = engine.view(doc.id, &bob).await.unwrap();
    assert_eq!(viewed.transfer_status, "received");
}

/// A rejected document keeps its rejected status through views.
#[sqlx::test(migrations = "../../db/migrations")]
async fn view_preserves_rejected_status(pool: PgPool) {
    let wf = seed_workflow(&pool).await;
    let engine = engine(&pool);
    let alice = actor_of(&wf.alice, &["intake_clerk"]);
    let bob = actor_of(&wf.bob, &["reviewer"]);

    let doc = engine
        .create_in_workflow(wf.template_id, "Sent back")
        .await
        .unwrap();
    engine.forward(doc.id, &alice, &[]).await.unwrap();
    engine
        .reject(doc.id, &bob, &["illegible".to_string()])
        .await
        .unwrap();

    let viewed = engine.view(doc.id, &alice).await.unwrap();
    assert_eq!(viewed.status, "rejected");
    assert_eq!(viewed.transfer_status, "received");
}
