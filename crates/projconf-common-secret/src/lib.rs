// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redacting wrapper for sensitive values handled by projconf.
//!
//! Client credentials, the admin API key and materialized variable values all
//! travel through the server wrapped in [`Secret<T>`]. The wrapper:
//!
//! - prints `[REDACTED]` for both `Debug` and `Display`, so `tracing` fields never leak it
//! - serializes as `"[REDACTED]"` unless a field opts in with [`serialize_exposed`]
//! - zeroizes its memory on drop
//! - compares in constant time via [`Secret::ct_eq`]
//!
//! ```
//! use projconf_common_secret::Secret;
//!
//! let key = Secret::new("pcs_example".to_string());
//! assert_eq!(format!("{key}"), "[REDACTED]");
//! assert_eq!(key.expose(), "pcs_example");
//! ```

use std::fmt;

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// The redaction placeholder used in all output.
pub const REDACTED: &str = "[REDACTED]";

/// A wrapper for sensitive values that prevents accidental exposure.
///
/// There is no `Deref`; callers go through [`Secret::expose`] so every read of
/// the inner value is visible at the call site.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct Secret<T>
where
	T: Zeroize,
{
	inner: T,
}

/// Convenience alias for secret strings.
pub type SecretString = Secret<String>;

impl<T> Secret<T>
where
	T: Zeroize,
{
	pub fn new(inner: T) -> Self {
		Self { inner }
	}

	/// Explicitly access the inner value.
	pub fn expose(&self) -> &T {
		&self.inner
	}

	/// Consume the wrapper and return a copy of the inner value.
	///
	/// The original memory is still zeroized when the wrapper drops.
	pub fn into_inner(self) -> T
	where
		T: Clone,
	{
		self.inner.clone()
	}
}

impl<T> Secret<T>
where
	T: Zeroize + AsRef<[u8]>,
{
	/// Compare against presented bytes without short-circuiting on content.
	///
	/// A length mismatch returns early; only the length is observable.
	pub fn ct_eq(&self, presented: &[u8]) -> bool {
		let expected = self.inner.as_ref();
		if expected.len() != presented.len() {
			return false;
		}
		expected.ct_eq(presented).into()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.as_ref().is_empty()
	}
}

impl<T> Clone for Secret<T>
where
	T: Zeroize + Clone,
{
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T> fmt::Debug for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Secret").field(&REDACTED).finish()
	}
}

impl<T> fmt::Display for Secret<T>
where
	T: Zeroize,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl<T> PartialEq for Secret<T>
where
	T: Zeroize + AsRef<[u8]>,
{
	fn eq(&self, other: &Self) -> bool {
		self.ct_eq(other.inner.as_ref())
	}
}

impl<T> Eq for Secret<T> where T: Zeroize + AsRef<[u8]> {}

impl From<String> for Secret<String> {
	fn from(value: String) -> Self {
		Secret::new(value)
	}
}

#[cfg(feature = "serde")]
mod serde_impl {
	use super::{Secret, REDACTED};
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use zeroize::Zeroize;

	impl<T> Serialize for Secret<T>
	where
		T: Serialize + Zeroize,
	{
		fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			serializer.serialize_str(REDACTED)
		}
	}

	impl<'de, T> Deserialize<'de> for Secret<T>
	where
		T: Deserialize<'de> + Zeroize,
	{
		fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
		where
			D: Deserializer<'de>,
		{
			let inner = T::deserialize(deserializer)?;
			Ok(Secret::new(inner))
		}
	}

	/// Serialize the inner value in the clear.
	///
	/// For response fields that exist to hand a value to its owner, such as a
	/// freshly issued client secret:
	///
	/// ```
	/// use projconf_common_secret::{serialize_exposed, SecretString};
	///
	/// #[derive(serde::Serialize)]
	/// struct Issued {
	///     #[serde(serialize_with = "serialize_exposed")]
	///     secret: SecretString,
	/// }
	///
	/// let body = Issued { secret: SecretString::new("pcs_abc".into()) };
	/// assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"secret":"pcs_abc"}"#);
	/// ```
	pub fn serialize_exposed<T, S>(secret: &Secret<T>, serializer: S) -> Result<S::Ok, S::Error>
	where
		T: Serialize + Zeroize,
		S: Serializer,
	{
		secret.expose().serialize(serializer)
	}
}

#[cfg(feature = "serde")]
pub use serde_impl::serialize_exposed;
