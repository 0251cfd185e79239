// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP handlers, one module per resource.

pub mod clients;
pub mod environments;
pub mod health;
pub mod projects;
pub mod secrets;
pub mod status;
pub mod variables;

use projconf_server_auth::{parse_id, ProjectId};

use crate::{api::AppState, auth::Caller, error::ServerError, service::ServiceError};

/// Admins may read any project, clients only the one their environment belongs to.
pub(crate) async fn ensure_project_access(
	state: &AppState,
	caller: &Caller,
	project_id: &str,
) -> Result<(), ServerError> {
	let Caller::Client(client) = caller else {
		return Ok(());
	};

	let requested: ProjectId = parse_id(project_id).map_err(ServiceError::from)?;
	let own = state
		.service
		.project_of_environment(&client.environment_id)
		.await?;
	if own.id == requested {
		Ok(())
	} else {
		tracing::warn!(client_id = %client.id, "client denied access outside its project");
		Err(ServerError::Forbidden)
	}
}
