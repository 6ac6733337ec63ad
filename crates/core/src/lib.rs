//! Parapheur domain core.
//!
//! Pure domain logic for the sequential document approval workflow:
//! the error taxonomy, role-name classification, document and hand-off
//! status machines, the ordered stage directory, and the role-holder
//! resolution contract. No I/O lives here; persistence and transport
//! are built on top in `parapheur-db` and `parapheur-api`.

pub mod error;
pub mod notifications;
pub mod resolver;
pub mod roles;
pub mod stage;
pub mod status;
pub mod types;

pub use error::CoreError;
