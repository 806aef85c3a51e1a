//! # API Shared
//!
//! Shared definitions for the care orchestration HTTP API and runner.
//!
//! Contains:
//! - Request/response DTOs with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the workspace runner.

pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
