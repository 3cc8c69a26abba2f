//! Key management and attestation signing for the bridge relay.
//!
//! This crate holds the relay's two key pairs (secp256k1 for EVM
//! destinations, ed25519 for Solana destinations), produces attestations
//! over the canonical payload encodings, and verifies attestations submitted
//! by other relays. The destination chain of a receipt decides which scheme
//! applies; a signature of the wrong scheme never validates.

use std::sync::Arc;

use alloy_primitives::{Address, Signature as EvmSignature, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use ed25519_dalek::{
	Signature as Ed25519Signature, Signer as _, SigningKey, VerifyingKey,
};
use relay_codec::CodecError;
use relay_types::{without_0x_prefix, ChainFamily, Receipt, SecretString};
use thiserror::Error;
use tracing::warn;

/// Errors that can occur during signing and verification.
#[derive(Debug, Error)]
pub enum SignerError {
	/// The signature does not verify against the payload and claimed signer.
	#[error("signature does not match the payload and signer")]
	InvalidSignature,
	/// A cryptographic key is malformed.
	#[error("invalid key: {0}")]
	InvalidKey(String),
	/// The signer verified but is not in the on-chain validator set.
	#[error("signer {0} is not an authorized validator")]
	SignerNotAuthorized(String),
	/// Validator membership was required but no validator source is configured.
	#[error("validator check required but no validator source is configured")]
	ValidatorSetUnconfigured,
	/// Payload encoding failed.
	#[error(transparent)]
	Codec(#[from] CodecError),
	/// The signing backend failed.
	#[error("signing failed: {0}")]
	Signing(String),
}

/// The relay's signing identities, one per chain family.
pub struct RelayKeys {
	evm: PrivateKeySigner,
	svm: SigningKey,
}

impl RelayKeys {
	/// Loads both keys from hex-encoded 32-byte secrets.
	pub fn from_secrets(
		evm_private_key: &SecretString,
		svm_secret_key: &SecretString,
	) -> Result<Self, SignerError> {
		let evm = evm_private_key.with_exposed(|key| {
			key.parse::<PrivateKeySigner>()
				.map_err(|e| SignerError::InvalidKey(format!("evm key: {}", e)))
		})?;
		let svm = svm_secret_key.with_exposed(|key| -> Result<SigningKey, SignerError> {
			let bytes = hex::decode(without_0x_prefix(key))
				.map_err(|e| SignerError::InvalidKey(format!("svm key: {}", e)))?;
			let seed: [u8; 32] = bytes
				.try_into()
				.map_err(|_| SignerError::InvalidKey("svm key must be 32 bytes".into()))?;
			Ok(SigningKey::from_bytes(&seed))
		})?;
		Ok(Self { evm, svm })
	}

	/// The EVM signer address (EIP-55 checksummed).
	pub fn evm_address(&self) -> Address {
		self.evm.address()
	}

	/// The Solana signer public key, base58-encoded.
	pub fn svm_pubkey_base58(&self) -> String {
		bs58::encode(self.svm.verifying_key().as_bytes()).into_string()
	}

	/// The identity string this relay signs under for the given family.
	pub fn identity_for(&self, family: ChainFamily) -> String {
		match family {
			ChainFamily::Evm => self.evm_address().to_string(),
			ChainFamily::SolanaMain | ChainFamily::SolanaDev => self.svm_pubkey_base58(),
		}
	}
}

/// Source of on-chain validator membership, keyed by destination chain.
#[async_trait]
pub trait ValidatorSet: Send + Sync {
	/// Whether `signer` is an authorized validator for `chain_id`.
	async fn is_validator(&self, chain_id: u64, signer: &str) -> Result<bool, SignerError>;
}

/// Optional validator-membership gate applied after signature verification.
#[derive(Clone)]
pub enum ValidatorGate {
	/// No validator source configured. Membership checks are skipped with a
	/// warning unless the engine requires them.
	Unconfigured,
	/// Membership is resolved through the given source.
	Source(Arc<dyn ValidatorSet>),
}

/// Signs and verifies bridge attestations.
pub struct SignatureEngine {
	keys: RelayKeys,
	gate: ValidatorGate,
	require_validator_check: bool,
}

impl SignatureEngine {
	pub fn new(keys: RelayKeys, gate: ValidatorGate, require_validator_check: bool) -> Self {
		Self {
			keys,
			gate,
			require_validator_check,
		}
	}

	pub fn keys(&self) -> &RelayKeys {
		&self.keys
	}

	/// Signs a claim attestation for the receipt, choosing the scheme from
	/// the destination chain's family. Returns 0x-prefixed hex: 65 bytes for
	/// EVM destinations, 64 for Solana.
	pub fn sign_claim(&self, receipt: &Receipt) -> Result<String, SignerError> {
		match ChainFamily::of(receipt.chain_to) {
			ChainFamily::Evm => {
				let digest = relay_codec::evm::receipt_digest(receipt);
				self.sign_evm_digest(digest)
			}
			ChainFamily::SolanaMain | ChainFamily::SolanaDev => {
				let message = relay_codec::svm::receive_payload_bytes(receipt)?;
				let signature = self.keys.svm.sign(&message);
				Ok(format!("0x{}", hex::encode(signature.to_bytes())))
			}
		}
	}

	/// Verifies an attestation against the receipt's canonical payload and
	/// the claimed signer, then applies the validator gate. Returns the
	/// canonical form of the verified signer identity.
	pub async fn verify_claim(
		&self,
		receipt: &Receipt,
		claimed_signer: &str,
		signature: &[u8],
	) -> Result<String, SignerError> {
		let verified = match ChainFamily::of(receipt.chain_to) {
			ChainFamily::Evm => {
				let digest = relay_codec::evm::receipt_digest(receipt);
				let recovered = recover_evm_signer(digest, signature)?;
				let claimed: Address = claimed_signer
					.parse()
					.map_err(|_| SignerError::InvalidSignature)?;
				if recovered != claimed {
					return Err(SignerError::InvalidSignature);
				}
				recovered.to_string()
			}
			ChainFamily::SolanaMain | ChainFamily::SolanaDev => {
				let message = relay_codec::svm::receive_payload_bytes(receipt)?;
				verify_ed25519(&message, claimed_signer, signature)?;
				claimed_signer.to_string()
			}
		};

		match &self.gate {
			ValidatorGate::Unconfigured if self.require_validator_check => {
				return Err(SignerError::ValidatorSetUnconfigured);
			}
			ValidatorGate::Unconfigured => {
				warn!(
					signer = %verified,
					"no validator source configured, skipping membership check"
				);
			}
			ValidatorGate::Source(source) => {
				if !source.is_validator(receipt.chain_to, &verified).await? {
					return Err(SignerError::SignerNotAuthorized(verified));
				}
			}
		}
		Ok(verified)
	}

	/// Signs an EVM send payload digest.
	pub fn sign_send_evm(
		&self,
		payload: &relay_codec::evm::SendPayload,
	) -> Result<String, SignerError> {
		self.sign_evm_digest(relay_codec::evm::send_digest(payload))
	}

	/// Signs a Solana send payload over its raw borsh bytes.
	pub fn sign_send_svm(
		&self,
		payload: &relay_codec::svm::SendPayload,
	) -> Result<String, SignerError> {
		let message = relay_codec::svm::send_payload_bytes(payload)?;
		let signature = self.keys.svm.sign(&message);
		Ok(format!("0x{}", hex::encode(signature.to_bytes())))
	}

	fn sign_evm_digest(&self, digest: B256) -> Result<String, SignerError> {
		let signature = self
			.keys
			.evm
			.sign_hash_sync(&digest)
			.map_err(|e| SignerError::Signing(e.to_string()))?;
		Ok(format!("0x{}", hex::encode(signature.as_bytes())))
	}
}

fn recover_evm_signer(digest: B256, signature: &[u8]) -> Result<Address, SignerError> {
	let parsed =
		EvmSignature::try_from(signature).map_err(|_| SignerError::InvalidSignature)?;
	parsed
		.recover_address_from_prehash(&digest)
		.map_err(|_| SignerError::InvalidSignature)
}

fn verify_ed25519(
	message: &[u8],
	claimed_signer: &str,
	signature: &[u8],
) -> Result<(), SignerError> {
	let pubkey_bytes = bs58::decode(claimed_signer)
		.into_vec()
		.map_err(|_| SignerError::InvalidSignature)?;
	let pubkey_arr: [u8; 32] = pubkey_bytes
		.try_into()
		.map_err(|_| SignerError::InvalidSignature)?;
	let verifying_key =
		VerifyingKey::from_bytes(&pubkey_arr).map_err(|_| SignerError::InvalidSignature)?;
	let sig_arr: [u8; 64] = signature
		.try_into()
		.map_err(|_| SignerError::InvalidSignature)?;
	let signature = Ed25519Signature::from_bytes(&sig_arr);
	verifying_key
		.verify_strict(message, &signature)
		.map_err(|_| SignerError::InvalidSignature)
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{Bytes, U256};
	use relay_types::{normalize_signature_hex, ReceiptId, SOLANA_CHAIN_ID};

	const EVM_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
	const SVM_KEY: &str = "2222222222222222222222222222222222222222222222222222222222222222";

	fn engine(gate: ValidatorGate, require: bool) -> SignatureEngine {
		let keys = RelayKeys::from_secrets(
			&SecretString::from(EVM_KEY),
			&SecretString::from(SVM_KEY),
		)
		.unwrap();
		SignatureEngine::new(keys, gate, require)
	}

	fn receipt(chain_to: u64) -> Receipt {
		Receipt {
			receipt_id: ReceiptId::new(1, chain_to, 7),
			from: alloy_primitives::B256::repeat_byte(0x11),
			to: alloy_primitives::B256::repeat_byte(0xaa),
			token_address_from: alloy_primitives::B256::repeat_byte(0x22),
			token_address_to: alloy_primitives::B256::repeat_byte(0xbb),
			amount_from: U256::from(1000u64),
			amount_to: U256::from(1000u64),
			chain_from: 1,
			chain_to,
			event_id: 7,
			flags: U256::ZERO,
			data: Bytes::new(),
			timestamp: 1_700_000_000,
			claimed: false,
		}
	}

	struct FixedSet(bool);

	#[async_trait]
	impl ValidatorSet for FixedSet {
		async fn is_validator(&self, _chain_id: u64, _signer: &str) -> Result<bool, SignerError> {
			Ok(self.0)
		}
	}

	#[tokio::test]
	async fn evm_claim_round_trips() {
		let engine = engine(ValidatorGate::Unconfigured, false);
		let r = receipt(2);
		let signature = engine.sign_claim(&r).unwrap();
		let (_, bytes) = normalize_signature_hex(&signature).unwrap();
		assert_eq!(bytes.len(), 65);

		let signer = engine.keys().evm_address().to_string();
		let verified = engine.verify_claim(&r, &signer, &bytes).await.unwrap();
		assert_eq!(verified, signer);
	}

	#[test]
	fn rejects_malformed_key_material() {
		let good_evm = SecretString::from(EVM_KEY);
		assert!(matches!(
			RelayKeys::from_secrets(&good_evm, &SecretString::from("0xzz")),
			Err(SignerError::InvalidKey(_))
		));
		assert!(matches!(
			RelayKeys::from_secrets(&good_evm, &SecretString::from("2222")),
			Err(SignerError::InvalidKey(_))
		));
	}

	#[tokio::test]
	async fn evm_tampered_receipt_fails() {
		let engine = engine(ValidatorGate::Unconfigured, false);
		let r = receipt(2);
		let signature = engine.sign_claim(&r).unwrap();
		let (_, bytes) = normalize_signature_hex(&signature).unwrap();

		let mut tampered = receipt(2);
		tampered.amount_to = U256::from(1001u64);
		let signer = engine.keys().evm_address().to_string();
		// recovery yields a different address, so the claimed signer no
		// longer matches
		assert!(matches!(
			engine.verify_claim(&tampered, &signer, &bytes).await,
			Err(SignerError::InvalidSignature)
		));
	}

	#[tokio::test]
	async fn solana_claim_round_trips() {
		let engine = engine(ValidatorGate::Unconfigured, false);
		let r = receipt(SOLANA_CHAIN_ID);
		let signature = engine.sign_claim(&r).unwrap();
		let (_, bytes) = normalize_signature_hex(&signature).unwrap();
		assert_eq!(bytes.len(), 64);

		let signer = engine.keys().svm_pubkey_base58();
		let verified = engine.verify_claim(&r, &signer, &bytes).await.unwrap();
		assert_eq!(verified, signer);
	}

	#[tokio::test]
	async fn evm_substituted_signer_fails() {
		// a valid signature attributed to somebody else must not verify
		let engine = engine(ValidatorGate::Unconfigured, false);
		let r = receipt(2);
		let signature = engine.sign_claim(&r).unwrap();
		let (_, bytes) = normalize_signature_hex(&signature).unwrap();

		let other = "0x0000000000000000000000000000000000000001";
		assert!(matches!(
			engine.verify_claim(&r, other, &bytes).await,
			Err(SignerError::InvalidSignature)
		));
	}

	#[tokio::test]
	async fn solana_substituted_signer_fails() {
		let engine = engine(ValidatorGate::Unconfigured, false);
		let r = receipt(SOLANA_CHAIN_ID);
		let signature = engine.sign_claim(&r).unwrap();
		let (_, bytes) = normalize_signature_hex(&signature).unwrap();

		let other_key = SigningKey::from_bytes(&[0x33u8; 32]);
		let other = bs58::encode(other_key.verifying_key().as_bytes()).into_string();
		assert!(matches!(
			engine.verify_claim(&r, &other, &bytes).await,
			Err(SignerError::InvalidSignature)
		));
	}

	#[tokio::test]
	async fn scheme_follows_destination_family() {
		// A 64-byte ed25519 signature can never satisfy an EVM destination.
		let engine = engine(ValidatorGate::Unconfigured, false);
		let evm_receipt = receipt(2);
		let sol_receipt = receipt(SOLANA_CHAIN_ID);

		let sol_sig = engine.sign_claim(&sol_receipt).unwrap();
		let (_, sol_bytes) = normalize_signature_hex(&sol_sig).unwrap();
		let evm_signer = engine.keys().evm_address().to_string();
		assert!(engine
			.verify_claim(&evm_receipt, &evm_signer, &sol_bytes)
			.await
			.is_err());
	}

	#[tokio::test]
	async fn validator_gate_rejects_non_members() {
		let engine = engine(ValidatorGate::Source(Arc::new(FixedSet(false))), false);
		let r = receipt(2);
		let signature = engine.sign_claim(&r).unwrap();
		let (_, bytes) = normalize_signature_hex(&signature).unwrap();
		let signer = engine.keys().evm_address().to_string();
		assert!(matches!(
			engine.verify_claim(&r, &signer, &bytes).await,
			Err(SignerError::SignerNotAuthorized(_))
		));
	}

	#[tokio::test]
	async fn required_gate_without_source_errors() {
		let engine = engine(ValidatorGate::Unconfigured, true);
		let r = receipt(2);
		let signature = engine.sign_claim(&r).unwrap();
		let (_, bytes) = normalize_signature_hex(&signature).unwrap();
		let signer = engine.keys().evm_address().to_string();
		assert!(matches!(
			engine.verify_claim(&r, &signer, &bytes).await,
			Err(SignerError::ValidatorSetUnconfigured)
		));
	}

	#[tokio::test]
	async fn devnet_destination_uses_ed25519() {
		let engine = engine(ValidatorGate::Unconfigured, false);
		let r = receipt(relay_types::SOLANA_DEV_CHAIN_ID);
		let signature = engine.sign_claim(&r).unwrap();
		let (_, bytes) = normalize_signature_hex(&signature).unwrap();
		assert_eq!(bytes.len(), 64);
		let signer = engine.keys().svm_pubkey_base58();
		assert!(engine.verify_claim(&r, &signer, &bytes).await.is_ok());
	}
}
