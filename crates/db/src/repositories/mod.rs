pub mod audit_repo;
pub mod document_repo;
pub mod notification_repo;
pub mod role_repo;
pub mod stage_repo;
pub mod template_repo;
pub mod user_repo;

pub use audit_repo::AuditEntryRepo;
pub use document_repo::DocumentRepo;
pub use notification_repo::NotificationRepo;
pub use role_repo::RoleRepo;
pub use stage_repo::StageRepo;
pub use template_repo::TemplateRepo;
pub use user_repo::UserRepo;
