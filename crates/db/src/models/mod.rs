pub mod audit_entry;
pub mod document;
pub mod notification;
pub mod role;
pub mod stage;
pub mod template;
pub mod user;
