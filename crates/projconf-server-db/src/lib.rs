// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for projconf.
//!
//! One repository per table family, each owning a cloned [`SqlitePool`].
//! Uniqueness and referential integrity are enforced by the schema and
//! surfaced as [`DbError::Conflict`] and [`DbError::NotFound`].
//!
//! [`SqlitePool`]: sqlx::SqlitePool

pub mod client;
pub mod environment;
pub mod error;
pub mod pool;
pub mod project;
pub mod schema;
pub mod secret;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;
pub mod variable;

pub use client::ClientRepository;
pub use environment::EnvironmentRepository;
pub use error::{DbError, Result};
pub use pool::{check_connection, create_pool};
pub use project::ProjectRepository;
pub use schema::run_migrations;
pub use secret::{InsertOutcome, SecretRepository};
pub use types::{Environment, Project, SecretRecord, Variable};
pub use variable::{NewVariable, VariableRepository};
