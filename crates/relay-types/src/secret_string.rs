//! Secure wrapper for private key material.
//!
//! Relay keys arrive through configuration; this wrapper zeroes the backing
//! memory on drop and redacts the value from `Debug`, `Display`, and serde
//! output so a key can never leak through logs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

/// A string whose contents are zeroed on drop and redacted everywhere.
#[derive(Clone)]
pub struct SecretString(Zeroizing<String>);

impl SecretString {
	pub fn new(s: String) -> Self {
		Self(Zeroizing::new(s))
	}

	/// Exposes the secret to a closure, keeping the borrow scope narrow.
	pub fn with_exposed<F, R>(&self, f: F) -> R
	where
		F: FnOnce(&str) -> R,
	{
		f(&self.0)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("SecretString(***)")
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("***")
	}
}

impl From<&str> for SecretString {
	fn from(s: &str) -> Self {
		Self::new(s.to_string())
	}
}

impl Serialize for SecretString {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str("***")
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		Ok(SecretString::new(String::deserialize(deserializer)?))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn debug_and_display_redact() {
		let secret = SecretString::from("deadbeef");
		assert_eq!(format!("{:?}", secret), "SecretString(***)");
		assert_eq!(format!("{}", secret), "***");
	}

	#[test]
	fn with_exposed_yields_the_value() {
		let secret = SecretString::from("deadbeef");
		assert_eq!(secret.with_exposed(|s| s.len()), 8);
	}

	#[test]
	fn serialization_redacts() {
		let secret = SecretString::from("deadbeef");
		assert_eq!(serde_json::to_string(&secret).unwrap(), "\"***\"");
	}
}
