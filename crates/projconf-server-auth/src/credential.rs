// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client credential issuance and verification.
//!
//! A client credential is `pcs_` followed by 32 random bytes encoded as
//! URL-safe base64 without padding. Only an Argon2id PHC string is persisted;
//! the plaintext leaves [`CredentialIssuer`] once, inside a [`SecretString`].
//!
//! [`CredentialVerifier`] answers `false` for every kind of failure and runs
//! a full Argon2 verification even when the secret id is unknown, so a wrong
//! id costs the same as a wrong secret.

use std::sync::{Arc, LazyLock};

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use projconf_common_secret::SecretString;
use rand::RngCore;
use tracing::{info, instrument, warn};

use crate::argon2_config::argon2_instance;
use crate::error::{AuthError, AuthResult};
use crate::types::{parse_id, Client, ClientId, ClientSecretId, EnvironmentId, StoredClientSecret};

/// Prefix carried by every issued client secret.
pub const CLIENT_SECRET_PREFIX: &str = "pcs_";

const CLIENT_SECRET_BYTES: usize = 32;

/// Hash verified when the presented id does not resolve to a current secret.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
	let throwaway = generate_client_secret();
	hash_client_secret(throwaway.expose()).unwrap_or_default()
});

/// Generate a fresh high-entropy client secret.
pub fn generate_client_secret() -> SecretString {
	let mut bytes = [0u8; CLIENT_SECRET_BYTES];
	rand::rngs::OsRng.fill_bytes(&mut bytes);
	let encoded = URL_SAFE_NO_PAD.encode(bytes);
	SecretString::new(format!("{CLIENT_SECRET_PREFIX}{encoded}"))
}

/// Hash a client secret with Argon2id and a random salt.
pub fn hash_client_secret(secret: &str) -> AuthResult<String> {
	let salt = SaltString::generate(&mut OsRng);
	argon2_instance()
		.hash_password(secret.as_bytes(), &salt)
		.map(|hash| hash.to_string())
		.map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a presented secret against a stored PHC string.
///
/// A malformed stored hash verifies as `false`.
pub fn verify_client_secret_hash(secret: &str, hash: &str) -> bool {
	let Ok(parsed) = PasswordHash::new(hash) else {
		return false;
	};
	argon2_instance()
		.verify_password(secret.as_bytes(), &parsed)
		.is_ok()
}

async fn hash_blocking(secret: SecretString) -> AuthResult<String> {
	tokio::task::spawn_blocking(move || hash_client_secret(secret.expose()))
		.await
		.map_err(|e| AuthError::Hashing(format!("hashing task failed: {e}")))?
}

/// Verify on the blocking pool. `None` verifies against [`DUMMY_HASH`], which
/// is first computed there too.
async fn verify_blocking(secret: SecretString, hash: Option<String>) -> bool {
	tokio::task::spawn_blocking(move || match hash {
		Some(hash) => verify_client_secret_hash(secret.expose(), &hash),
		None => {
			verify_client_secret_hash(secret.expose(), &DUMMY_HASH);
			false
		}
	})
	.await
	.unwrap_or(false)
}

/// Storage operations needed to issue and check client credentials.
#[async_trait]
pub trait ClientCredentialStore: Send + Sync {
	/// Create a client and its first secret atomically.
	///
	/// Fails with [`AuthError::EnvironmentNotFound`] when the environment does not exist.
	async fn create_client_with_secret(
		&self,
		client_id: &ClientId,
		environment_id: &EnvironmentId,
		display: &str,
		secret_id: &ClientSecretId,
		hash: &str,
	) -> AuthResult<Client>;

	/// Append a secret to an existing client; fails with [`AuthError::ClientNotFound`].
	async fn add_client_secret(
		&self,
		client_id: &ClientId,
		secret_id: &ClientSecretId,
		hash: &str,
	) -> AuthResult<()>;

	async fn get_client(&self, id: &ClientId) -> AuthResult<Option<Client>>;

	async fn get_client_secret(&self, id: &ClientSecretId)
		-> AuthResult<Option<StoredClientSecret>>;
}

/// The result of issuing a credential. `secret` is the only copy of the plaintext.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
	pub client_id: ClientId,
	pub secret_id: ClientSecretId,
	pub secret: SecretString,
}

pub struct CredentialIssuer<S> {
	store: Arc<S>,
}

impl<S> Clone for CredentialIssuer<S> {
	fn clone(&self) -> Self {
		Self {
			store: Arc::clone(&self.store),
		}
	}
}

impl<S: ClientCredentialStore> CredentialIssuer<S> {
	pub fn new(store: Arc<S>) -> Self {
		Self { store }
	}

	/// Create a client under `environment_id` together with its first secret.
	#[instrument(skip(self, display), fields(environment_id = %environment_id))]
	pub async fn issue(
		&self,
		environment_id: &EnvironmentId,
		display: &str,
	) -> AuthResult<IssuedCredential> {
		let secret = generate_client_secret();
		let hash = hash_blocking(secret.clone()).await?;
		let client_id = ClientId::generate();
		let secret_id = ClientSecretId::generate();

		self
			.store
			.create_client_with_secret(&client_id, environment_id, display, &secret_id, &hash)
			.await?;

		info!(client_id = %client_id, secret_id = %secret_id, "client credential issued");
		Ok(IssuedCredential {
			client_id,
			secret_id,
			secret,
		})
	}

	/// Issue a replacement secret for an existing client.
	///
	/// The new secret supersedes every earlier one of the same client.
	#[instrument(skip(self), fields(client_id = %client_id))]
	pub async fn rotate(&self, client_id: &ClientId) -> AuthResult<IssuedCredential> {
		let secret = generate_client_secret();
		let hash = hash_blocking(secret.clone()).await?;
		let secret_id = ClientSecretId::generate();

		self
			.store
			.add_client_secret(client_id, &secret_id, &hash)
			.await?;

		info!(client_id = %client_id, secret_id = %secret_id, "client credential rotated");
		Ok(IssuedCredential {
			client_id: *client_id,
			secret_id,
			secret,
		})
	}
}

pub struct CredentialVerifier<S> {
	store: Arc<S>,
}

impl<S> Clone for CredentialVerifier<S> {
	fn clone(&self) -> Self {
		Self {
			store: Arc::clone(&self.store),
		}
	}
}

impl<S: ClientCredentialStore> CredentialVerifier<S> {
	pub fn new(store: Arc<S>) -> Self {
		Self { store }
	}

	/// Check a presented secret against the stored hash for `secret_id`.
	pub async fn verify(&self, secret_id: &str, presented: &str) -> bool {
		self.authenticate(secret_id, presented).await.is_some()
	}

	/// Verify and resolve the owning client.
	///
	/// `None` covers a malformed id, an unknown id, a superseded secret, a
	/// wrong secret and storage failures alike.
	#[instrument(skip_all)]
	pub async fn authenticate(&self, secret_id: &str, presented: &str) -> Option<Client> {
		let stored = match parse_id::<ClientSecretId>(secret_id) {
			Ok(id) => match self.store.get_client_secret(&id).await {
				Ok(found) => found.filter(|s| s.is_current),
				Err(e) => {
					warn!(error = %e, "client secret lookup failed");
					None
				}
			},
			Err(_) => None,
		};

		let (hash, owner) = match stored {
			Some(s) => (Some(s.hash), Some(s.client_id)),
			None => (None, None),
		};

		let matched = verify_blocking(SecretString::new(presented.to_string()), hash).await;
		let client_id = owner.filter(|_| matched)?;

		match self.store.get_client(&client_id).await {
			Ok(client) => client,
			Err(e) => {
				warn!(error = %e, client_id = %client_id, "client lookup failed");
				None
			}
		}
	}
}
