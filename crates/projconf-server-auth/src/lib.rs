// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client credentials and admin access for projconf.
//!
//! - [`CredentialIssuer`] creates a client with a one-time plaintext secret
//! - [`CredentialVerifier`] checks presented secrets against Argon2id hashes
//! - [`AccessGuard`] recognises the process-wide admin key
//! - [`types`] holds the identifier newtypes used across the server

mod argon2_config;
pub mod credential;
pub mod error;
pub mod guard;
pub mod types;

pub use credential::{
	generate_client_secret, hash_client_secret, verify_client_secret_hash, ClientCredentialStore,
	CredentialIssuer, CredentialVerifier, IssuedCredential, CLIENT_SECRET_PREFIX,
};
pub use error::{AuthError, AuthResult};
pub use guard::AccessGuard;
pub use types::{
	is_uuid, parse_id, Client, ClientId, ClientSecretId, EnvironmentId, InvalidIdentifier,
	ProjectId, SecretId, StoredClientSecret, VariableId,
};
