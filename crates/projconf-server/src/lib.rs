// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! projconf HTTP server.
//!
//! [`ProjconfService`] holds the operations; [`create_router`] exposes them
//! under `/v1` with admin key or client secret authentication.

pub mod api;
pub mod api_docs;
pub mod api_types;
pub mod auth;
pub mod error;
pub mod routes;
pub mod service;
pub mod validation;

pub use api::{create_app_state, create_router, AppState};
pub use api_docs::ApiDoc;
pub use error::{ErrorResponse, ServerError};
pub use projconf_server_config::ServerConfig;
pub use service::{ProjconfService, ServiceError, ServiceResult};
