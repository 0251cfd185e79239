// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Router and shared handler state.

use std::sync::Arc;

use axum::{
	middleware::from_fn_with_state,
	routing::{get, post, put},
	Json, Router,
};
use projconf_server_config::ServerConfig;
use sqlx::SqlitePool;
use utoipa::OpenApi;

use crate::{api_docs::ApiDoc, auth::auth_layer, routes, service::ProjconfService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
	pub service: Arc<ProjconfService>,
}

pub fn create_app_state(pool: SqlitePool, config: &ServerConfig) -> AppState {
	if config.auth.admin_api_key.is_none() {
		tracing::warn!("no admin API key configured; admin routes will reject every request");
	}

	AppState {
		service: Arc::new(ProjconfService::new(pool, config)),
	}
}

fn v1_routes(state: AppState) -> Router<AppState> {
	Router::new()
		.route(
			"/projects",
			get(routes::projects::list_projects).post(routes::projects::create_project),
		)
		.route(
			"/projects/{project_id}",
			get(routes::projects::get_project).delete(routes::projects::delete_project),
		)
		.route(
			"/projects/{project_id}/environments",
			get(routes::environments::list_environments)
				.post(routes::environments::create_environment),
		)
		.route(
			"/projects/{project_id}/variables",
			get(routes::variables::list_variables).post(routes::variables::create_variable),
		)
		.route(
			"/projects/{project_id}/environments/{environment_id}/secrets",
			get(routes::secrets::list_environment_secrets),
		)
		.route(
			"/environments/{environment_id}",
			get(routes::environments::get_environment)
				.delete(routes::environments::delete_environment),
		)
		.route(
			"/variables/{variable_id}/generator",
			put(routes::variables::update_generator),
		)
		.route(
			"/variables/{variable_id}/default",
			get(routes::variables::get_default),
		)
		.route(
			"/environments/{environment_id}/clients",
			get(routes::clients::list_clients).post(routes::clients::issue_client),
		)
		.route("/clients/self", get(routes::clients::get_self))
		.route(
			"/clients/{client_id}/secrets",
			post(routes::clients::rotate_client_secret),
		)
		.route("/admin/health", get(routes::health::health_check))
		.layer(from_fn_with_state(state, auth_layer))
}

/// Probes reachable without credentials.
fn status_routes() -> Router<AppState> {
	Router::new()
		.route("/status", get(routes::status::get_status))
		.route("/status/ready", get(routes::status::get_ready))
}

/// Create the API router with all routes.
pub fn create_router(state: AppState) -> Router {
	Router::new()
		.nest("/v1", v1_routes(state.clone()).merge(status_routes()))
		.route(
			"/api/openapi.json",
			get(|| async { Json(ApiDoc::openapi()) }),
		)
		.with_state(state)
}
