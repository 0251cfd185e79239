// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAPI document for projconf-server, served at `/api/openapi.json`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "projconf API",
        version = "1.0.0",
        description = "Projects, environments and variables with generated values, plus client credentials scoped to one environment.",
        license(name = "Proprietary")
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    tags(
        (name = "projects", description = "Project management"),
        (name = "environments", description = "Environments within a project"),
        (name = "variables", description = "Variable definitions and their generators"),
        (name = "secrets", description = "Materialized variable values"),
        (name = "clients", description = "Client credentials"),
        (name = "health", description = "Health checks"),
        (name = "status", description = "Unauthenticated status and readiness")
    ),
    paths(
        crate::routes::projects::list_projects,
        crate::routes::projects::create_project,
        crate::routes::projects::get_project,
        crate::routes::projects::delete_project,
        crate::routes::environments::list_environments,
        crate::routes::environments::create_environment,
        crate::routes::environments::get_environment,
        crate::routes::environments::delete_environment,
        crate::routes::variables::list_variables,
        crate::routes::variables::create_variable,
        crate::routes::variables::update_generator,
        crate::routes::variables::get_default,
        crate::routes::secrets::list_environment_secrets,
        crate::routes::clients::list_clients,
        crate::routes::clients::issue_client,
        crate::routes::clients::rotate_client_secret,
        crate::routes::clients::get_self,
        crate::routes::health::health_check,
        crate::routes::status::get_status,
        crate::routes::status::get_ready,
    ),
    components(
        schemas(
            crate::api_types::CreateProjectRequest,
            crate::api_types::CreateEnvironmentRequest,
            crate::api_types::CreateVariableRequest,
            crate::api_types::CreateClientRequest,
            crate::api_types::GeneratorBody,
            crate::api_types::IdResponse,
            crate::api_types::ProjectResponse,
            crate::api_types::EnvironmentResponse,
            crate::api_types::VariableResponse,
            crate::api_types::SecretResponse,
            crate::api_types::EnvironmentSecretResponse,
            crate::api_types::ClientResponse,
            crate::api_types::IssuedCredentialResponse,
            crate::api_types::HealthResponse,
            crate::api_types::StatusResponse,
            crate::api_types::ServerStatus,
            crate::api_types::ServiceStatus,
            crate::api_types::ReadyResponse,
            crate::error::ErrorResponse,
        )
    )
)]
pub struct ApiDoc;
