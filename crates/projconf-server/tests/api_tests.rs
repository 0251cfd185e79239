// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Router tests for the `/v1` API.
//!
//! Tests cover:
//! - Admin and client authentication
//! - Variable definition and validation errors
//! - Secret materialization through the environment endpoint
//! - Client issuance, rotation and environment scoping
//! - Unauthenticated status checks

use axum::{
	body::Body,
	http::{Request, StatusCode},
	Router,
};
use projconf_common_secret::SecretString;
use projconf_server::{create_app_state, create_router, ServerConfig};
use projconf_server_db::testing::create_test_pool;
use serde_json::{json, Value};
use tower::ServiceExt;

const ADMIN_KEY: &str = "integration-admin-key-0123";

async fn setup_test_app() -> Router {
	let pool = create_test_pool().await;
	let mut config = ServerConfig::default();
	config.auth.admin_api_key = Some(SecretString::new(ADMIN_KEY.to_string()));
	create_router(create_app_state(pool, &config))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
	let response = app.clone().oneshot(request).await.unwrap();
	let status = response.status();
	let body = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	let json = if body.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&body).unwrap()
	};
	(status, json)
}

fn admin_get(uri: &str) -> Request<Body> {
	Request::builder()
		.uri(uri)
		.header("x-admin-api-key", ADMIN_KEY)
		.body(Body::empty())
		.unwrap()
}

fn admin_delete(uri: &str) -> Request<Body> {
	Request::builder()
		.method("DELETE")
		.uri(uri)
		.header("x-admin-api-key", ADMIN_KEY)
		.body(Body::empty())
		.unwrap()
}

fn admin_json(method: &str, uri: &str, body: Value) -> Request<Body> {
	Request::builder()
		.method(method)
		.uri(uri)
		.header("x-admin-api-key", ADMIN_KEY)
		.header("content-type", "application/json")
		.body(Body::from(body.to_string()))
		.unwrap()
}

fn client_get(uri: &str, secret_id: &str, secret: &str) -> Request<Body> {
	Request::builder()
		.uri(uri)
		.header("x-client-secret-id", secret_id)
		.header("x-client-secret", secret)
		.body(Body::empty())
		.unwrap()
}

async fn create_project(app: &Router, display: &str) -> String {
	let (status, body) = send(
		app,
		admin_json("POST", "/v1/projects", json!({ "display": display })),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
	body["id"].as_str().unwrap().to_string()
}

async fn create_environment(app: &Router, project_id: &str, display: &str) -> String {
	let (status, body) = send(
		app,
		admin_json(
			"POST",
			&format!("/v1/projects/{project_id}/environments"),
			json!({ "display": display }),
		),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
	body["id"].as_str().unwrap().to_string()
}

async fn define_variable(app: &Router, project_id: &str, body: Value) -> (StatusCode, Value) {
	send(
		app,
		admin_json("POST", &format!("/v1/projects/{project_id}/variables"), body),
	)
	.await
}

async fn issue_client(app: &Router, environment_id: &str) -> Value {
	let (status, body) = send(
		app,
		admin_json(
			"POST",
			&format!("/v1/environments/{environment_id}/clients"),
			json!({ "display": "ci runner" }),
		),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
	body
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_missing_credentials_returns_401() {
	let app = setup_test_app().await;

	let (status, body) = send(
		&app,
		Request::builder()
			.uri("/v1/projects")
			.body(Body::empty())
			.unwrap(),
	)
	.await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);
	assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_wrong_admin_key_returns_401() {
	let app = setup_test_app().await;

	let (status, _) = send(
		&app,
		Request::builder()
			.uri("/v1/admin/health")
			.header("x-admin-api-key", "not-the-admin-key-at-all")
			.body(Body::empty())
			.unwrap(),
	)
	.await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_health() {
	let app = setup_test_app().await;

	let (status, body) = send(&app, admin_get("/v1/admin/health")).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["status"], "ok");
	assert!(body["timestamp"].is_string());
	assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_openapi_document_is_public() {
	let app = setup_test_app().await;

	let (status, body) = send(
		&app,
		Request::builder()
			.uri("/api/openapi.json")
			.body(Body::empty())
			.unwrap(),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert!(body["paths"]["/v1/projects"].is_object());
}

#[tokio::test]
async fn test_status_endpoints_need_no_credentials() {
	let app = setup_test_app().await;

	let (status, body) = send(
		&app,
		Request::builder()
			.uri("/v1/status")
			.body(Body::empty())
			.unwrap(),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["server"]["is_ready"], true);
	assert_eq!(body["services"]["database"], true);
	assert!(body["server"]["version"].is_string());

	let (status, body) = send(
		&app,
		Request::builder()
			.uri("/v1/status/ready")
			.body(Body::empty())
			.unwrap(),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["msg"], "ready");
}

#[tokio::test]
async fn test_ready_reports_503_when_database_is_gone() {
	let pool = create_test_pool().await;
	let mut config = ServerConfig::default();
	config.auth.admin_api_key = Some(SecretString::new(ADMIN_KEY.to_string()));
	let app = create_router(create_app_state(pool.clone(), &config));
	pool.close().await;

	let (status, body) = send(
		&app,
		Request::builder()
			.uri("/v1/status/ready")
			.body(Body::empty())
			.unwrap(),
	)
	.await;
	assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
	assert_eq!(body["error"], "unavailable");
}

// ============================================================================
// Projects, environments and variables
// ============================================================================

#[tokio::test]
async fn test_get_and_delete_project() {
	let app = setup_test_app().await;
	let project_id = create_project(&app, "Billing").await;
	let env_id = create_environment(&app, &project_id, "production").await;

	let (status, body) = send(&app, admin_get(&format!("/v1/projects/{project_id}"))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["display"], "Billing");

	let (status, _) = send(&app, admin_delete(&format!("/v1/projects/{project_id}"))).await;
	assert_eq!(status, StatusCode::NO_CONTENT);

	let (status, _) = send(&app, admin_get(&format!("/v1/projects/{project_id}"))).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	let (status, _) = send(&app, admin_get(&format!("/v1/environments/{env_id}"))).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
	let (status, _) = send(&app, admin_delete(&format!("/v1/projects/{project_id}"))).await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_and_delete_environment() {
	let app = setup_test_app().await;
	let project_id = create_project(&app, "Billing").await;
	let env_id = create_environment(&app, &project_id, "production").await;

	let (status, body) = send(&app, admin_get(&format!("/v1/environments/{env_id}"))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["display"], "production");
	assert_eq!(body["project_id"], project_id.as_str());

	let (status, _) = send(&app, admin_delete(&format!("/v1/environments/{env_id}"))).await;
	assert_eq!(status, StatusCode::NO_CONTENT);

	let (status, body) = send(
		&app,
		admin_get(&format!("/v1/projects/{project_id}/environments")),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_clients_cannot_delete_and_only_see_own_environment() {
	let app = setup_test_app().await;
	let project_id = create_project(&app, "Billing").await;
	let production = create_environment(&app, &project_id, "production").await;
	let staging = create_environment(&app, &project_id, "staging").await;

	let issued = issue_client(&app, &production).await;
	let secret_id = issued["secret_id"].as_str().unwrap();
	let secret = issued["secret"].as_str().unwrap();

	let (status, _) = send(
		&app,
		client_get(&format!("/v1/environments/{production}"), secret_id, secret),
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	let (status, _) = send(
		&app,
		client_get(&format!("/v1/environments/{staging}"), secret_id, secret),
	)
	.await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	let (status, body) = send(
		&app,
		client_get(&format!("/v1/projects/{project_id}"), secret_id, secret),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["id"], project_id.as_str());

	let (status, _) = send(
		&app,
		Request::builder()
			.method("DELETE")
			.uri(format!("/v1/projects/{project_id}"))
			.header("x-client-secret-id", secret_id)
			.header("x-client-secret", secret)
			.body(Body::empty())
			.unwrap(),
	)
	.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_project_lifecycle() {
	let app = setup_test_app().await;
	let project_id = create_project(&app, "Billing").await;
	create_environment(&app, &project_id, "production").await;
	create_environment(&app, &project_id, "staging").await;

	let (status, body) = send(&app, admin_get("/v1/projects")).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body.as_array().unwrap().len(), 1);
	assert_eq!(body[0]["display"], "Billing");

	let (status, body) = send(
		&app,
		admin_get(&format!("/v1/projects/{project_id}/environments")),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_duplicate_project_returns_409() {
	let app = setup_test_app().await;
	create_project(&app, "Billing").await;

	let (status, body) = send(
		&app,
		admin_json("POST", "/v1/projects", json!({ "display": "Billing" })),
	)
	.await;
	assert_eq!(status, StatusCode::CONFLICT);
	assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_invalid_display_returns_400() {
	let app = setup_test_app().await;

	let (status, body) = send(
		&app,
		admin_json("POST", "/v1/projects", json!({ "display": "bad/name" })),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_malformed_id_returns_400() {
	let app = setup_test_app().await;

	let (status, _) = send(&app, admin_get("/v1/projects/not-a-uuid/variables")).await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_project_returns_404() {
	let app = setup_test_app().await;
	let missing = uuid::Uuid::new_v4();

	let (status, _) = send(
		&app,
		admin_json(
			"POST",
			&format!("/v1/projects/{missing}/environments"),
			json!({ "display": "production" }),
		),
	)
	.await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_define_variable_validation() {
	let app = setup_test_app().await;
	let project_id = create_project(&app, "Billing").await;

	let (status, body) = define_variable(
		&app,
		&project_id,
		json!({
			"key": "DB_PASSWORD",
			"generator": {
				"type": "RANDOM",
				"data": { "length": 16, "letters": false, "numbers": false, "symbols": false }
			}
		}),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert!(body["description"].as_str().unwrap().contains("letters"));

	let (status, _) = define_variable(
		&app,
		&project_id,
		json!({ "key": "DB_PASSWORD", "generator": { "type": "UUID", "data": {} } }),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);

	let (status, _) = define_variable(
		&app,
		&project_id,
		json!({ "key": "db-password", "generator": { "type": "STATIC", "data": "x" } }),
	)
	.await;
	assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_variable_key_returns_409() {
	let app = setup_test_app().await;
	let project_id = create_project(&app, "Billing").await;
	let body = json!({ "key": "API_URL", "generator": { "type": "STATIC", "data": "https://a" } });

	let (status, _) = define_variable(&app, &project_id, body.clone()).await;
	assert_eq!(status, StatusCode::CREATED);
	let (status, _) = define_variable(&app, &project_id, body).await;
	assert_eq!(status, StatusCode::CONFLICT);
}

// ============================================================================
// Secrets
// ============================================================================

#[tokio::test]
async fn test_environment_secrets_materialize_once() {
	let app = setup_test_app().await;
	let project_id = create_project(&app, "Billing").await;
	let env_id = create_environment(&app, &project_id, "production").await;

	define_variable(
		&app,
		&project_id,
		json!({ "key": "API_URL", "generator": { "type": "STATIC", "data": "https://api" } }),
	)
	.await;
	define_variable(
		&app,
		&project_id,
		json!({
			"key": "DB_PASSWORD",
			"generator": {
				"type": "RANDOM",
				"data": { "length": 32, "letters": true, "numbers": true, "symbols": false }
			}
		}),
	)
	.await;

	let uri = format!("/v1/projects/{project_id}/environments/{env_id}/secrets");
	let (status, first) = send(&app, admin_get(&uri)).await;
	assert_eq!(status, StatusCode::OK);
	let first = first.as_array().unwrap().clone();
	assert_eq!(first.len(), 2);
	assert_eq!(first[0]["key"], "API_URL");
	assert_eq!(first[0]["value"], "https://api");
	assert_eq!(first[1]["key"], "DB_PASSWORD");
	let password = first[1]["value"].as_str().unwrap();
	assert_eq!(password.len(), 32);
	assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));

	let (_, second) = send(&app, admin_get(&uri)).await;
	assert_eq!(second[1]["value"], first[1]["value"]);
}

#[tokio::test]
async fn test_environment_secrets_empty_returns_404() {
	let app = setup_test_app().await;
	let project_id = create_project(&app, "Billing").await;
	let env_id = create_environment(&app, &project_id, "production").await;

	let (status, _) = send(
		&app,
		admin_get(&format!(
			"/v1/projects/{project_id}/environments/{env_id}/secrets"
		)),
	)
	.await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generator_update_and_default() {
	let app = setup_test_app().await;
	let project_id = create_project(&app, "Billing").await;
	let env_id = create_environment(&app, &project_id, "production").await;
	let (_, created) = define_variable(
		&app,
		&project_id,
		json!({ "key": "API_URL", "generator": { "type": "STATIC", "data": "https://old" } }),
	)
	.await;
	let variable_id = created["id"].as_str().unwrap().to_string();

	let (status, _) = send(&app, admin_get(&format!("/v1/variables/{variable_id}/default"))).await;
	assert_eq!(status, StatusCode::NOT_FOUND);

	let secrets_uri = format!("/v1/projects/{project_id}/environments/{env_id}/secrets");
	send(&app, admin_get(&secrets_uri)).await;

	let (status, body) = send(&app, admin_get(&format!("/v1/variables/{variable_id}/default"))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["value"], "https://old");
	assert_eq!(body["environment_id"], env_id.as_str());

	let (status, body) = send(
		&app,
		admin_json(
			"PUT",
			&format!("/v1/variables/{variable_id}/generator"),
			json!({ "type": "STATIC", "data": { "value": "https://new" } }),
		),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["generator_data"], "https://new");

	let (_, body) = send(&app, admin_get(&secrets_uri)).await;
	assert_eq!(body[0]["value"], "https://new");
}

// ============================================================================
// Clients
// ============================================================================

#[tokio::test]
async fn test_client_credentials_flow() {
	let app = setup_test_app().await;
	let project_id = create_project(&app, "Billing").await;
	let env_id = create_environment(&app, &project_id, "production").await;
	define_variable(
		&app,
		&project_id,
		json!({ "key": "API_URL", "generator": { "type": "STATIC", "data": "https://api" } }),
	)
	.await;

	let issued = issue_client(&app, &env_id).await;
	let secret_id = issued["secret_id"].as_str().unwrap();
	let secret = issued["secret"].as_str().unwrap();

	let (status, body) = send(&app, client_get("/v1/clients/self", secret_id, secret)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body["id"], issued["client_id"]);
	assert_eq!(body["environment_id"], env_id.as_str());

	let (status, body) = send(
		&app,
		client_get(
			&format!("/v1/projects/{project_id}/environments/{env_id}/secrets"),
			secret_id,
			secret,
		),
	)
	.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body[0]["value"], "https://api");

	let (status, body) = send(&app, client_get("/v1/projects", secret_id, secret)).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body.as_array().unwrap().len(), 1);
	assert_eq!(body[0]["id"], project_id.as_str());

	let (status, _) = send(&app, client_get("/v1/clients/self", secret_id, "pcs_wrong")).await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_client_scoped_to_its_environment() {
	let app = setup_test_app().await;
	let project_id = create_project(&app, "Billing").await;
	let production = create_environment(&app, &project_id, "production").await;
	let staging = create_environment(&app, &project_id, "staging").await;
	define_variable(
		&app,
		&project_id,
		json!({ "key": "API_URL", "generator": { "type": "STATIC", "data": "https://api" } }),
	)
	.await;

	let issued = issue_client(&app, &staging).await;
	let secret_id = issued["secret_id"].as_str().unwrap();
	let secret = issued["secret"].as_str().unwrap();

	let (status, _) = send(
		&app,
		client_get(
			&format!("/v1/projects/{project_id}/environments/{production}/secrets"),
			secret_id,
			secret,
		),
	)
	.await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	let other_project = create_project(&app, "Payroll").await;
	let (status, _) = send(
		&app,
		client_get(
			&format!("/v1/projects/{other_project}/variables"),
			secret_id,
			secret,
		),
	)
	.await;
	assert_eq!(status, StatusCode::FORBIDDEN);

	let (status, _) = send(&app, client_get("/v1/admin/health", secret_id, secret)).await;
	assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_rotation_revokes_previous_secret() {
	let app = setup_test_app().await;
	let project_id = create_project(&app, "Billing").await;
	let env_id = create_environment(&app, &project_id, "production").await;

	let issued = issue_client(&app, &env_id).await;
	let client_id = issued["client_id"].as_str().unwrap();

	let (status, rotated) = send(
		&app,
		admin_json("POST", &format!("/v1/clients/{client_id}/secrets"), json!({})),
	)
	.await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(rotated["client_id"], issued["client_id"]);
	assert_ne!(rotated["secret"], issued["secret"]);

	let (status, _) = send(
		&app,
		client_get(
			"/v1/clients/self",
			issued["secret_id"].as_str().unwrap(),
			issued["secret"].as_str().unwrap(),
		),
	)
	.await;
	assert_eq!(status, StatusCode::UNAUTHORIZED);

	let (status, _) = send(
		&app,
		client_get(
			"/v1/clients/self",
			rotated["secret_id"].as_str().unwrap(),
			rotated["secret"].as_str().unwrap(),
		),
	)
	.await;
	assert_eq!(status, StatusCode::OK);

	let (status, body) = send(&app, admin_get(&format!("/v1/environments/{env_id}/clients"))).await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(body.as_array().unwrap().len(), 1);
	assert!(body[0].get("secret").is_none());
}

#[tokio::test]
async fn test_issue_client_unknown_environment_returns_404() {
	let app = setup_test_app().await;
	let missing = uuid::Uuid::new_v4();

	let (status, _) = send(
		&app,
		admin_json(
			"POST",
			&format!("/v1/environments/{missing}/clients"),
			json!({ "display": "ci" }),
		),
	)
	.await;
	assert_eq!(status, StatusCode::NOT_FOUND);
}
