//! REST API client module for the order service.
//!
//! `ApiClient` is the single dispatcher every caller goes through. It
//! attaches the bearer token, unwraps the `{ code, message, data }`
//! envelope, and normalizes failures into `ApiError`.
//!
//! Typed wrappers for each endpoint live next to it, one file per area:
//! `account` (login/register/logout), `catalog`, `orders`, `admin`.

pub mod account;
pub mod admin;
pub mod catalog;
pub mod client;
pub mod envelope;
pub mod error;
pub mod orders;

pub use client::ApiClient;
pub use envelope::{Envelope, Payload};
pub use error::{ApiError, DEFAULT_FAILURE_MESSAGE};
