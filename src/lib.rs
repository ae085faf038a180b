//! `courseware-http` is a resilient async HTTP client for the Courseware
//! REST API (courses, enrollments, lessons, users).
//!
//! Every call made through [`CoursewareClient::execute`]:
//! - attaches `Authorization: Bearer <token>` read fresh from a [`TokenStore`]
//! - retries 408/429/500/502/503/504 and connection failures up to
//!   [`retry::MAX_RETRIES`] times with exponential backoff
//! - clears the token and notifies a [`SessionExpiryHandler`] on a 401
//!   received while a session was held
//! - classifies failures into [`CoursewareError`]; [`error_message`] turns
//!   any of them into display text
//!
//! Typed route wrappers live in [`api`] and are reached through
//! [`CoursewareClient::auth`], [`CoursewareClient::courses`], and so on.

#[macro_use]
mod diag;

pub mod api;
mod client;
mod error;
mod options;
mod request;
mod response;
pub mod retry;
mod session;
pub mod types;

pub use client::CoursewareClient;
pub use error::{
    error_message, CoursewareError, HttpFailure, NETWORK_ERROR_MESSAGE, TIMEOUT_ERROR_MESSAGE,
};
pub use options::ClientOptions;
pub use request::RequestDescriptor;
pub use reqwest::Method;
pub use response::{ApiResponse, Envelope};
pub use session::{MemoryTokenStore, SessionExpiryHandler, TokenStore};

pub type Result<T> = std::result::Result<T, CoursewareError>;
