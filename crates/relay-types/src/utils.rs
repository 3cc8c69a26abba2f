//! Hex and signature formatting helpers.

use alloy_primitives::B256;
use thiserror::Error;

/// Truncates an identifier for log output: first 12 characters plus `..`.
pub fn truncate_id(id: &str) -> String {
	if id.len() <= 12 {
		id.to_string()
	} else {
		format!("{}..", &id[..12])
	}
}

/// Ensures a hex string carries the `0x` prefix.
pub fn with_0x_prefix(hex_str: &str) -> String {
	if hex_str.starts_with("0x") || hex_str.starts_with("0X") {
		hex_str.to_string()
	} else {
		format!("0x{}", hex_str)
	}
}

/// Strips a `0x`/`0X` prefix if present.
pub fn without_0x_prefix(hex_str: &str) -> &str {
	hex_str
		.strip_prefix("0x")
		.or_else(|| hex_str.strip_prefix("0X"))
		.unwrap_or(hex_str)
}

/// Pads a 20-byte EVM address into the canonical 32-byte cross-chain form.
pub fn evm_address_to_bytes32(address: alloy_primitives::Address) -> B256 {
	let mut out = [0u8; 32];
	out[12..].copy_from_slice(address.as_slice());
	B256::from(out)
}

/// Parses a chain-native address string into the canonical 32-byte form.
///
/// Accepts a 20-byte 0x-hex EVM address (left-padded), a 32-byte hex
/// string, or a base58 Solana pubkey. Returns `None` for anything else.
pub fn parse_cross_chain_address(s: &str) -> Option<B256> {
	let stripped = without_0x_prefix(s);
	if let Ok(bytes) = hex::decode(stripped) {
		match bytes.len() {
			20 => {
				let mut out = [0u8; 32];
				out[12..].copy_from_slice(&bytes);
				return Some(B256::from(out));
			}
			32 => return Some(B256::from_slice(&bytes)),
			_ => {}
		}
	}
	let decoded = bs58::decode(s).into_vec().ok()?;
	if decoded.len() == 32 {
		Some(B256::from_slice(&decoded))
	} else {
		None
	}
}

/// Error normalizing a submitted signature string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureFormatError {
	#[error("signature is not valid hex")]
	NotHex,
	#[error("signature length {0} bytes is not a known scheme (expected 64 or 65)")]
	BadLength(usize),
}

/// Normalizes a submitted signature to the canonical `0x`-prefixed
/// lowercase-hex form and returns it with its decoded bytes.
///
/// Accepts an optional `0x`/`0X` prefix and mixed-case hex. Only the two
/// known signature widths pass: 65 bytes (recoverable secp256k1) and
/// 64 bytes (detached ed25519).
pub fn normalize_signature_hex(raw: &str) -> Result<(String, Vec<u8>), SignatureFormatError> {
	let stripped = without_0x_prefix(raw.trim());
	let bytes = hex::decode(stripped).map_err(|_| SignatureFormatError::NotHex)?;
	if bytes.len() != 64 && bytes.len() != 65 {
		return Err(SignatureFormatError::BadLength(bytes.len()));
	}
	Ok((format!("0x{}", hex::encode(&bytes)), bytes))
}
