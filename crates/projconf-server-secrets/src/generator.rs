// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Generator specs: how a variable's value is produced.
//!
//! Two kinds exist. `STATIC` carries a literal, `RANDOM` describes a draw
//! from the OS CSPRNG over a set of character classes. Stored generator data
//! is untrusted JSON until [`GeneratorValidator`] turns it into a
//! [`ValidatedGeneratorSpec`]; only validated specs reach [`ValueGenerator`].

use std::fmt;
use std::str::FromStr;

use rand::rngs::OsRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const DIGITS: &[u8] = b"0123456789";
pub const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+";

/// Upper bound on RANDOM lengths unless configured otherwise.
pub const DEFAULT_MAX_RANDOM_LENGTH: u32 = 4096;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
	#[error("invalid generator config: {field} {reason}")]
	InvalidGeneratorConfig { field: &'static str, reason: String },

	#[error("unknown generator kind: {0}")]
	UnknownGeneratorKind(String),

	#[error("invalid display: {0}")]
	InvalidDisplay(String),

	#[error("invalid key: {0}")]
	InvalidKey(String),
}

impl ValidationError {
	fn config(field: &'static str, reason: impl Into<String>) -> Self {
		ValidationError::InvalidGeneratorConfig {
			field,
			reason: reason.into(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GeneratorKind {
	Static,
	Random,
}

impl GeneratorKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			GeneratorKind::Static => "STATIC",
			GeneratorKind::Random => "RANDOM",
		}
	}
}

impl fmt::Display for GeneratorKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for GeneratorKind {
	type Err = ValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"STATIC" => Ok(GeneratorKind::Static),
			"RANDOM" => Ok(GeneratorKind::Random),
			other => Err(ValidationError::UnknownGeneratorKind(other.to_string())),
		}
	}
}

/// Parameters of a RANDOM draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomGenerator {
	pub length: u32,
	pub letters: bool,
	pub numbers: bool,
	pub symbols: bool,
}

impl RandomGenerator {
	/// Union of the enabled character classes.
	pub fn alphabet(&self) -> Vec<u8> {
		let mut alphabet = Vec::with_capacity(LETTERS.len() + DIGITS.len() + SYMBOLS.len());
		if self.letters {
			alphabet.extend_from_slice(LETTERS);
		}
		if self.numbers {
			alphabet.extend_from_slice(DIGITS);
		}
		if self.symbols {
			alphabet.extend_from_slice(SYMBOLS);
		}
		alphabet
	}
}

/// A generator spec that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedGeneratorSpec {
	Static { value: String },
	Random(RandomGenerator),
}

impl ValidatedGeneratorSpec {
	pub fn kind(&self) -> GeneratorKind {
		match self {
			ValidatedGeneratorSpec::Static { .. } => GeneratorKind::Static,
			ValidatedGeneratorSpec::Random(_) => GeneratorKind::Random,
		}
	}

	/// Canonical JSON form persisted as `generator_data`.
	pub fn data(&self) -> Value {
		match self {
			ValidatedGeneratorSpec::Static { value } => Value::String(value.clone()),
			ValidatedGeneratorSpec::Random(random) => json!(random),
		}
	}
}

/// Checks generator data against its kind.
#[derive(Debug, Clone, Copy)]
pub struct GeneratorValidator {
	max_length: u32,
}

impl Default for GeneratorValidator {
	fn default() -> Self {
		Self::new(DEFAULT_MAX_RANDOM_LENGTH)
	}
}

impl GeneratorValidator {
	pub fn new(max_length: u32) -> Self {
		Self { max_length }
	}

	pub fn max_length(&self) -> u32 {
		self.max_length
	}

	/// Validate `data` for the kind named by `kind`.
	///
	/// Kind names are matched exactly; anything other than `STATIC` or
	/// `RANDOM` is [`ValidationError::UnknownGeneratorKind`].
	pub fn validate(&self, kind: &str, data: &Value) -> Result<ValidatedGeneratorSpec, ValidationError> {
		self.validate_kind(kind.parse()?, data)
	}

	pub fn validate_kind(
		&self,
		kind: GeneratorKind,
		data: &Value,
	) -> Result<ValidatedGeneratorSpec, ValidationError> {
		match kind {
			GeneratorKind::Static => validate_static(data),
			GeneratorKind::Random => self.validate_random(data),
		}
	}

	fn validate_random(&self, data: &Value) -> Result<ValidatedGeneratorSpec, ValidationError> {
		let Value::Object(fields) = data else {
			return Err(ValidationError::config("data", "must be an object"));
		};

		let length = match fields.get("length") {
			None => return Err(ValidationError::config("length", "is required")),
			Some(Value::Number(n)) => match n.as_i64() {
				Some(n) => n,
				None if n.is_u64() => i64::MAX,
				None => return Err(ValidationError::config("length", "must be an integer")),
			},
			Some(_) => return Err(ValidationError::config("length", "must be an integer")),
		};
		let letters = flag(fields, "letters")?;
		let numbers = flag(fields, "numbers")?;
		let symbols = flag(fields, "symbols")?;

		if !(letters || numbers || symbols) {
			return Err(ValidationError::config(
				"letters|numbers|symbols",
				"at least one character class must be enabled",
			));
		}
		if length < 1 {
			return Err(ValidationError::config("length", "must be at least 1"));
		}
		if length > i64::from(self.max_length) {
			return Err(ValidationError::config(
				"length",
				format!("must be at most {}", self.max_length),
			));
		}

		Ok(ValidatedGeneratorSpec::Random(RandomGenerator {
			length: length as u32,
			letters,
			numbers,
			symbols,
		}))
	}
}

fn validate_static(data: &Value) -> Result<ValidatedGeneratorSpec, ValidationError> {
	let value = match data {
		Value::Null => String::new(),
		Value::String(s) => s.clone(),
		Value::Object(fields) => match fields.get("value") {
			None | Some(Value::Null) => String::new(),
			Some(Value::String(s)) => s.clone(),
			Some(_) => return Err(ValidationError::config("value", "must be a string")),
		},
		_ => return Err(ValidationError::config("value", "must be a string")),
	};
	Ok(ValidatedGeneratorSpec::Static { value })
}

fn flag(fields: &serde_json::Map<String, Value>, name: &'static str) -> Result<bool, ValidationError> {
	match fields.get(name) {
		Some(Value::Bool(b)) => Ok(*b),
		Some(_) => Err(ValidationError::config(name, "must be a boolean")),
		None => Err(ValidationError::config(name, "is required")),
	}
}

/// Produces concrete values from validated specs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueGenerator;

impl ValueGenerator {
	/// STATIC returns the literal. RANDOM draws `length` characters
	/// uniformly from the enabled classes using the OS CSPRNG.
	pub fn generate(&self, spec: &ValidatedGeneratorSpec) -> String {
		match spec {
			ValidatedGeneratorSpec::Static { value } => value.clone(),
			ValidatedGeneratorSpec::Random(random) => {
				let alphabet = random.alphabet();
				if alphabet.is_empty() {
					return String::new();
				}
				let mut rng = OsRng;
				(0..random.length)
					.map(|_| char::from(alphabet[rng.gen_range(0..alphabet.len())]))
					.collect()
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn validator() -> GeneratorValidator {
		GeneratorValidator::default()
	}

	fn random_data(length: i64, letters: bool, numbers: bool, symbols: bool) -> Value {
		json!({"length": length, "letters": letters, "numbers": numbers, "symbols": symbols})
	}

	fn field_of(err: ValidationError) -> &'static str {
		match err {
			ValidationError::InvalidGeneratorConfig { field, .. } => field,
			other => panic!("expected InvalidGeneratorConfig, got {other:?}"),
		}
	}

	#[test]
	fn test_static_accepts_any_string() {
		for data in [json!("hello"), json!(""), json!({"value": "hello"})] {
			let spec = validator().validate("STATIC", &data).unwrap();
			assert_eq!(spec.kind(), GeneratorKind::Static);
		}
		let spec = validator().validate("STATIC", &json!("literal")).unwrap();
		assert_eq!(spec.data(), json!("literal"));
	}

	#[test]
	fn test_static_null_is_empty() {
		let spec = validator().validate("STATIC", &Value::Null).unwrap();
		assert_eq!(ValueGenerator.generate(&spec), "");
	}

	#[test]
	fn test_static_rejects_non_string() {
		assert_eq!(field_of(validator().validate("STATIC", &json!(42)).unwrap_err()), "value");
		assert_eq!(
			field_of(validator().validate("STATIC", &json!({"value": true})).unwrap_err()),
			"value"
		);
	}

	#[test]
	fn test_random_accepts_letters_only() {
		let spec = validator()
			.validate("RANDOM", &random_data(16, true, false, false))
			.unwrap();
		assert_eq!(
			spec,
			ValidatedGeneratorSpec::Random(RandomGenerator {
				length: 16,
				letters: true,
				numbers: false,
				symbols: false,
			})
		);
	}

	#[test]
	fn test_random_zero_length_rejected() {
		let err = validator()
			.validate("RANDOM", &random_data(0, true, false, false))
			.unwrap_err();
		assert_eq!(field_of(err), "length");
	}

	#[test]
	fn test_random_negative_and_oversized_length_rejected() {
		assert_eq!(
			field_of(validator().validate("RANDOM", &random_data(-3, true, true, true)).unwrap_err()),
			"length"
		);
		assert_eq!(
			field_of(validator().validate("RANDOM", &random_data(4097, true, true, true)).unwrap_err()),
			"length"
		);
		assert!(validator().validate("RANDOM", &random_data(4096, true, true, true)).is_ok());
		assert!(GeneratorValidator::new(8)
			.validate("RANDOM", &random_data(9, true, false, false))
			.is_err());
	}

	#[test]
	fn test_random_names_first_bad_field() {
		let missing = json!({"length": 8, "letters": true, "symbols": false});
		assert_eq!(field_of(validator().validate("RANDOM", &missing).unwrap_err()), "numbers");

		let mistyped = json!({"length": "8", "letters": true, "numbers": true, "symbols": true});
		assert_eq!(field_of(validator().validate("RANDOM", &mistyped).unwrap_err()), "length");

		let fractional = json!({"length": 8.5, "letters": true, "numbers": true, "symbols": true});
		assert_eq!(field_of(validator().validate("RANDOM", &fractional).unwrap_err()), "length");

		let flag = json!({"length": 8, "letters": "yes", "numbers": true, "symbols": true});
		assert_eq!(field_of(validator().validate("RANDOM", &flag).unwrap_err()), "letters");

		assert_eq!(field_of(validator().validate("RANDOM", &json!("abc")).unwrap_err()), "data");
	}

	#[test]
	fn test_unknown_kind_rejected() {
		for kind in ["SEQUENCE", "static", "Random", ""] {
			let err = validator().validate(kind, &json!("x")).unwrap_err();
			assert_eq!(err, ValidationError::UnknownGeneratorKind(kind.to_string()));
		}
	}

	#[test]
	fn test_kind_round_trips_through_str() {
		for kind in [GeneratorKind::Static, GeneratorKind::Random] {
			assert_eq!(kind.as_str().parse::<GeneratorKind>().unwrap(), kind);
		}
	}

	#[test]
	fn test_random_values_differ() {
		let spec = ValidatedGeneratorSpec::Random(RandomGenerator {
			length: 32,
			letters: true,
			numbers: true,
			symbols: true,
		});
		assert_ne!(ValueGenerator.generate(&spec), ValueGenerator.generate(&spec));
	}

	#[test]
	fn test_random_covers_alphabet() {
		let spec = ValidatedGeneratorSpec::Random(RandomGenerator {
			length: 4096,
			letters: false,
			numbers: true,
			symbols: false,
		});
		let value = ValueGenerator.generate(&spec);
		for digit in DIGITS {
			assert!(value.as_bytes().contains(digit));
		}
	}

	fn enabled_flags() -> impl Strategy<Value = (bool, bool, bool)> {
		any::<(bool, bool, bool)>().prop_filter("at least one class", |(l, n, s)| *l || *n || *s)
	}

	proptest! {
		#[test]
		fn random_output_has_exact_length_and_alphabet(
			length in 1u32..=512,
			(letters, numbers, symbols) in enabled_flags(),
		) {
			let spec = validator()
				.validate("RANDOM", &random_data(length.into(), letters, numbers, symbols))
				.unwrap();
			let value = ValueGenerator.generate(&spec);

			prop_assert_eq!(value.chars().count(), length as usize);
			for b in value.bytes() {
				let allowed = (letters && LETTERS.contains(&b))
					|| (numbers && DIGITS.contains(&b))
					|| (symbols && SYMBOLS.contains(&b));
				prop_assert!(allowed, "unexpected byte {}", b);
			}
		}

		#[test]
		fn random_without_classes_always_rejected(length in any::<i64>()) {
			let err = validator()
				.validate("RANDOM", &random_data(length, false, false, false))
				.unwrap_err();
			let is_config_error = matches!(err, ValidationError::InvalidGeneratorConfig { .. });
			prop_assert!(is_config_error);
		}

		#[test]
		fn static_generation_is_idempotent(literal in ".*") {
			let spec = validator().validate("STATIC", &Value::String(literal.clone())).unwrap();
			let first = ValueGenerator.generate(&spec);
			prop_assert_eq!(&first, &literal);
			prop_assert_eq!(ValueGenerator.generate(&spec), first);
		}
	}
}
