pub mod admin;
pub mod auth;
pub mod document;
pub mod notification;
