// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Records returned by the repositories and the column parsing they share.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use projconf_common_secret::{serialize_exposed, SecretString};
use projconf_server_auth::{EnvironmentId, ProjectId, SecretId, VariableId};
use serde::Serialize;
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
	pub id: ProjectId,
	pub display: String,
	pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Environment {
	pub id: EnvironmentId,
	pub project_id: ProjectId,
	pub display: String,
	pub created_at: DateTime<Utc>,
}

/// A stored variable definition.
///
/// `generator_type` and `generator_data` are kept as stored; interpreting
/// them is the generator module's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
	pub id: VariableId,
	pub project_id: ProjectId,
	pub key: String,
	pub description: String,
	pub generator_type: String,
	pub generator_data: serde_json::Value,
	/// Bumped each time the generator is replaced.
	pub generator_revision: i64,
	pub created_at: DateTime<Utc>,
}

/// The materialized value of a variable in one environment.
///
/// Serializes its value in the clear; only hand it to authorized callers.
#[derive(Debug, Clone, Serialize)]
pub struct SecretRecord {
	pub id: SecretId,
	pub variable_id: VariableId,
	pub environment_id: EnvironmentId,
	#[serde(serialize_with = "serialize_exposed")]
	pub value: SecretString,
	pub created_at: DateTime<Utc>,
}

/// Timestamp format used for every `created_at` column.
///
/// Fixed width so lexical order matches chronological order.
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
	at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time at the precision stored in the database.
pub(crate) fn now() -> DateTime<Utc> {
	Utc::now().trunc_subsecs(6)
}

pub(crate) fn uuid_column(row: &SqliteRow, column: &str) -> Result<Uuid, DbError> {
	let raw: String = row.get(column);
	Uuid::parse_str(&raw).map_err(|e| DbError::Internal(format!("Invalid {column} UUID: {e}")))
}

pub(crate) fn time_column(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, DbError> {
	let raw: String = row.get(column);
	DateTime::parse_from_rfc3339(&raw)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}
