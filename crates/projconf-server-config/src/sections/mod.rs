// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections. Each has a resolved type and a partial layer.

mod auth;
mod database;
mod http;
mod logging;
mod secrets;

pub use auth::{AuthConfig, AuthConfigLayer, MIN_ADMIN_KEY_LENGTH};
pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
pub use secrets::{SecretsConfig, SecretsConfigLayer};
