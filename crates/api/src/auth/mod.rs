//! Authentication primitives: JWT issuance/validation and password
//! verification.

pub mod jwt;
pub mod password;
