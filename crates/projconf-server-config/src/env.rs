// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Secret loading from the environment with `*_FILE` support.

use std::path::PathBuf;

use projconf_common_secret::SecretString;

#[derive(Debug, thiserror::Error)]
pub enum SecretEnvError {
	#[error("failed to read {var} from {path}: {source}")]
	FileRead {
		var: String,
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Load a secret from `{var}_FILE` or `{var}`.
///
/// The file wins when both are set. One trailing newline is stripped from
/// file contents. Empty values count as unset.
pub fn load_secret_env(var: &str) -> Result<Option<SecretString>, SecretEnvError> {
	let file_var = format!("{var}_FILE");
	if let Some(path) = std::env::var_os(&file_var).filter(|p| !p.is_empty()) {
		let path = PathBuf::from(path);
		let content = std::fs::read_to_string(&path).map_err(|source| SecretEnvError::FileRead {
			var: file_var.clone(),
			path: path.clone(),
			source,
		})?;
		let value = content
			.strip_suffix("\r\n")
			.or_else(|| content.strip_suffix('\n'))
			.unwrap_or(&content);
		return Ok((!value.is_empty()).then(|| SecretString::new(value.to_string())));
	}

	Ok(std::env::var(var)
		.ok()
		.filter(|v| !v.is_empty())
		.map(SecretString::new))
}
