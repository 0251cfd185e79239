// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Variable values for projconf.
//!
//! [`GeneratorValidator`] accepts or rejects generator definitions,
//! [`ValueGenerator`] turns a validated spec into a value and
//! [`SecretStore`] persists at most one value per (variable, environment).

pub mod error;
pub mod generator;
pub mod store;

pub use error::{SecretsError, SecretsResult};
pub use generator::{
	GeneratorKind, GeneratorValidator, RandomGenerator, ValidatedGeneratorSpec, ValidationError,
	ValueGenerator, DEFAULT_MAX_RANDOM_LENGTH,
};
pub use store::{EnvironmentSecret, SecretStore, SqliteSecretStore, DEFAULT_MAX_CONFLICT_RETRIES};
