//! Client core for the Fusion Order catalog and ordering service.
//!
//! Everything that talks to the server goes through [`api::ApiClient`],
//! which attaches the bearer token from a [`auth::CredentialStore`],
//! unwraps the server's response envelope, and reports failures as
//! [`api::ApiError`].

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthEvent, CredentialStore};
pub use config::Config;
