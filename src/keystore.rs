// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 GameBridge Contributors

//! # Keystore Signing Service
//!
//! Decrypts a Web3 Secret Storage (version 3) keystore into an immutable
//! secp256k1 key pair and produces recoverable ECDSA signatures over
//! 32-byte digests.
//!
//! Decryption runs once at startup and is a hard gate: a wrong passphrase,
//! a corrupted blob, or an unsupported algorithm aborts the process before
//! any traffic is served. The key derivation function and cipher declared
//! in the blob's metadata are the ones executed; nothing is substituted.
//! Derived keys and the decrypted scalar are wiped after use and never
//! logged.
//!
//! ## Signature format
//!
//! `sign` returns exactly 65 bytes: the 64-byte `r || s` pair followed by
//! the recovery identifier offset by 27, the convention EVM contracts
//! expect from `ecrecover`.

use std::path::Path;

use aes::cipher::{KeyIvInit, StreamCipher};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use serde::Deserialize;
use sha2::Sha256;
use sha3::{Digest, Keccak256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::Zeroizing;

type Aes128Ctr = ctr::Ctr128BE<aes::Aes128>;

/// Keystore format version this service understands.
const KEYSTORE_VERSION: u32 = 3;

/// The only symmetric cipher the version 3 format mandates.
const CIPHER_AES_128_CTR: &str = "aes-128-ctr";

#[derive(Debug, Error)]
pub enum KeystoreError {
    #[error("failed to read keystore file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse keystore JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported keystore version {0}")]
    UnsupportedVersion(u32),
    #[error("unsupported cipher {0:?}")]
    UnsupportedCipher(String),
    #[error("unsupported key derivation function {0:?}")]
    UnsupportedKdf(String),
    #[error("invalid KDF parameters: {0}")]
    InvalidKdfParams(&'static str),
    #[error("invalid hex in keystore field: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("invalid initialization vector length")]
    InvalidIv,
    #[error("MAC mismatch: wrong passphrase or corrupted keystore")]
    MacMismatch,
    #[error("decrypted key is not a valid secp256k1 scalar")]
    InvalidKey,
    #[error("digest must be a 0x-prefixed 32-byte hex string")]
    InvalidDigest,
    #[error("signing failed: {0}")]
    Signing(#[from] k256::ecdsa::Error),
}

/// Serde model of an encrypted version 3 keystore blob.
#[derive(Debug, Deserialize)]
pub struct EncryptedKeystore {
    #[serde(default)]
    pub address: Option<String>,
    pub crypto: CryptoSection,
    pub version: u32,
}

#[derive(Debug, Deserialize)]
pub struct CryptoSection {
    pub cipher: String,
    pub ciphertext: String,
    pub cipherparams: CipherParams,
    pub kdf: String,
    pub kdfparams: KdfParams,
    pub mac: String,
}

#[derive(Debug, Deserialize)]
pub struct CipherParams {
    pub iv: String,
}

/// Parameters for either KDF arm; fields absent for the other arm stay
/// `None` and are validated against the declared `kdf`.
#[derive(Debug, Deserialize)]
pub struct KdfParams {
    pub dklen: u32,
    pub salt: String,
    #[serde(default)]
    pub n: Option<u64>,
    #[serde(default)]
    pub r: Option<u32>,
    #[serde(default)]
    pub p: Option<u32>,
    #[serde(default)]
    pub c: Option<u32>,
    #[serde(default)]
    pub prf: Option<String>,
}

/// Immutable signing service holding the decrypted key pair.
///
/// Constructed once at startup; `sign` takes `&self` and needs no locking.
pub struct KeystoreSigner {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
}

// Manual impl: deriving would print the signing key.
impl std::fmt::Debug for KeystoreSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeystoreSigner")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

impl KeystoreSigner {
    /// Wrap an already-materialized signing key.
    pub fn new(signing_key: SigningKey) -> Self {
        let verifying_key = *signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
        }
    }

    /// Read and decrypt a keystore file.
    pub fn from_file(path: &Path, passphrase: &str) -> Result<Self, KeystoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json, passphrase)
    }

    /// Parse and decrypt a keystore JSON document.
    pub fn from_json(json: &str, passphrase: &str) -> Result<Self, KeystoreError> {
        let keystore: EncryptedKeystore = serde_json::from_str(json)?;
        Self::decrypt(&keystore, passphrase)
    }

    /// Decrypt the keystore into a usable key pair.
    ///
    /// The derived key splits into an encryption half (`[0..16]`) and an
    /// integrity half (`[16..32]`); the MAC is verified in constant time
    /// before the ciphertext is touched.
    pub fn decrypt(
        keystore: &EncryptedKeystore,
        passphrase: &str,
    ) -> Result<Self, KeystoreError> {
        if keystore.version != KEYSTORE_VERSION {
            return Err(KeystoreError::UnsupportedVersion(keystore.version));
        }
        let crypto = &keystore.crypto;
        if crypto.cipher != CIPHER_AES_128_CTR {
            return Err(KeystoreError::UnsupportedCipher(crypto.cipher.clone()));
        }

        let derived = derive_key(&crypto.kdf, &crypto.kdfparams, passphrase)?;

        let ciphertext = hex::decode(&crypto.ciphertext)?;
        let mac = hex::decode(&crypto.mac)?;
        let computed = Keccak256::new()
            .chain_update(&derived[16..32])
            .chain_update(&ciphertext)
            .finalize();
        if mac.len() != computed.len() || !bool::from(computed.as_slice().ct_eq(&mac)) {
            return Err(KeystoreError::MacMismatch);
        }

        let iv = hex::decode(&crypto.cipherparams.iv)?;
        let iv: [u8; 16] = iv.try_into().map_err(|_| KeystoreError::InvalidIv)?;
        let enc_key: [u8; 16] = derived[..16]
            .try_into()
            .map_err(|_| KeystoreError::InvalidKdfParams("dklen must be 32"))?;

        let mut plaintext = Zeroizing::new(ciphertext);
        let mut cipher = Aes128Ctr::new(&enc_key.into(), &iv.into());
        cipher.apply_keystream(&mut plaintext);

        let signing_key =
            SigningKey::from_slice(&plaintext).map_err(|_| KeystoreError::InvalidKey)?;
        Ok(Self::new(signing_key))
    }

    /// Produce a 65-byte recoverable signature over a 32-byte digest.
    pub fn sign(&self, digest: &[u8; 32]) -> Result<[u8; 65], KeystoreError> {
        let (signature, recovery_id): (Signature, RecoveryId) =
            self.signing_key.sign_prehash_recoverable(digest)?;

        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = recovery_id.to_byte() + 27;
        Ok(out)
    }

    /// Like [`sign`](Self::sign), hex-encoded with a `0x` prefix (132 chars).
    pub fn sign_hex(&self, digest: &[u8; 32]) -> Result<String, KeystoreError> {
        Ok(format!("0x{}", hex::encode(self.sign(digest)?)))
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Ethereum-style address of the signing key, 0x-prefixed.
    pub fn address(&self) -> String {
        let point = self.verifying_key.to_encoded_point(false);
        let hash = Keccak256::digest(&point.as_bytes()[1..]);
        format!("0x{}", hex::encode(&hash[12..]))
    }
}

/// Run the KDF the keystore metadata declares and return the 32-byte key.
fn derive_key(
    kdf: &str,
    params: &KdfParams,
    passphrase: &str,
) -> Result<Zeroizing<[u8; 32]>, KeystoreError> {
    if params.dklen != 32 {
        return Err(KeystoreError::InvalidKdfParams("dklen must be 32"));
    }
    let salt = hex::decode(&params.salt)?;
    let mut derived = Zeroizing::new([0u8; 32]);

    match kdf {
        "scrypt" => {
            let n = params
                .n
                .ok_or(KeystoreError::InvalidKdfParams("scrypt requires n"))?;
            let r = params
                .r
                .ok_or(KeystoreError::InvalidKdfParams("scrypt requires r"))?;
            let p = params
                .p
                .ok_or(KeystoreError::InvalidKdfParams("scrypt requires p"))?;
            if n < 2 || !n.is_power_of_two() {
                return Err(KeystoreError::InvalidKdfParams(
                    "scrypt n must be a power of two greater than one",
                ));
            }
            let log_n = n.trailing_zeros() as u8;
            let scrypt_params = scrypt::Params::new(log_n, r, p, derived.len())
                .map_err(|_| KeystoreError::InvalidKdfParams("scrypt parameters out of range"))?;
            scrypt::scrypt(
                passphrase.as_bytes(),
                &salt,
                &scrypt_params,
                derived.as_mut(),
            )
            .map_err(|_| KeystoreError::InvalidKdfParams("scrypt output length invalid"))?;
        }
        "pbkdf2" => {
            if let Some(prf) = &params.prf {
                if prf != "hmac-sha256" {
                    return Err(KeystoreError::InvalidKdfParams(
                        "pbkdf2 prf must be hmac-sha256",
                    ));
                }
            }
            let rounds = params
                .c
                .ok_or(KeystoreError::InvalidKdfParams("pbkdf2 requires c"))?;
            if rounds == 0 {
                return Err(KeystoreError::InvalidKdfParams(
                    "pbkdf2 iteration count must be positive",
                ));
            }
            pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), &salt, rounds, derived.as_mut());
        }
        other => return Err(KeystoreError::UnsupportedKdf(other.to_string())),
    }

    Ok(derived)
}

/// Parse a 0x-prefixed (or bare) 64-character hex digest into 32 bytes.
pub fn parse_digest(digest: &str) -> Result<[u8; 32], KeystoreError> {
    let hex_part = digest.strip_prefix("0x").unwrap_or(digest);
    let bytes = hex::decode(hex_part).map_err(|_| KeystoreError::InvalidDigest)?;
    bytes.try_into().map_err(|_| KeystoreError::InvalidDigest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TEST_PASSPHRASE: &str = "correct horse battery staple";
    const TEST_PRIVATE_KEY: &str =
        "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    const TEST_ADDRESS: &str = "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23";

    // Generated with light scrypt cost so tests stay fast; the derivation
    // path is identical to production-strength parameters.
    const SCRYPT_KEYSTORE: &str = r#"{
        "address": "2c7536e3605d9c16a7a3d7b1898e529396a65c23",
        "crypto": {
            "cipher": "aes-128-ctr",
            "ciphertext": "20eee3cd149d89293d9e1bad4c796990915beaa4f68c40e9e82608a7dd0cfc19",
            "cipherparams": {
                "iv": "6087dab2f9fdbbfaddc31a909735c1e6"
            },
            "kdf": "scrypt",
            "kdfparams": {
                "dklen": 32,
                "n": 4096,
                "p": 1,
                "r": 8,
                "salt": "9af5a8a7a1cdbf79c5e9f4a02b8c3e11d2a64f0e8b7c5d3a1f0e9d8c7b6a5f4e"
            },
            "mac": "0304c5ba6fb9221e074376dec78d95b3de4e6692b3a635b512677c5fc8c837e9"
        },
        "id": "3198bc9c-6672-5ab3-d995-4942343ae5b6",
        "version": 3
    }"#;

    const PBKDF2_KEYSTORE: &str = r#"{
        "address": "2c7536e3605d9c16a7a3d7b1898e529396a65c23",
        "crypto": {
            "cipher": "aes-128-ctr",
            "ciphertext": "84f6cefb3fad9d5be89ae7b677f046c91b2c78965e11ffe1598577eb52f4ce05",
            "cipherparams": {
                "iv": "cecacd85e9cb89788b5aab2f93361233"
            },
            "kdf": "pbkdf2",
            "kdfparams": {
                "c": 10240,
                "dklen": 32,
                "prf": "hmac-sha256",
                "salt": "ae3cd4e7013836a3df6bd7241b12db061dbe2c6785853cce422d148a624ce0bd"
            },
            "mac": "483deb8785468e82f07bf87c97bf9939aa068294caa989a450b90f908186734c"
        },
        "id": "3198bc9c-6672-5ab3-d995-4942343ae5b6",
        "version": 3
    }"#;

    fn test_signer() -> KeystoreSigner {
        let key_bytes = hex::decode(TEST_PRIVATE_KEY).unwrap();
        KeystoreSigner::new(SigningKey::from_slice(&key_bytes).unwrap())
    }

    #[test]
    fn decrypts_scrypt_keystore() {
        let signer = KeystoreSigner::from_json(SCRYPT_KEYSTORE, TEST_PASSPHRASE).unwrap();
        assert_eq!(signer.address(), TEST_ADDRESS);
    }

    #[test]
    fn decrypts_pbkdf2_keystore() {
        let signer = KeystoreSigner::from_json(PBKDF2_KEYSTORE, TEST_PASSPHRASE).unwrap();
        assert_eq!(signer.address(), TEST_ADDRESS);
    }

    #[test]
    fn wrong_passphrase_fails_mac_check() {
        let err = KeystoreSigner::from_json(SCRYPT_KEYSTORE, "wrong passphrase").unwrap_err();
        assert!(matches!(err, KeystoreError::MacMismatch));
    }

    #[test]
    fn unsupported_cipher_is_rejected() {
        let json = SCRYPT_KEYSTORE.replace("aes-128-ctr", "aes-256-gcm");
        let err = KeystoreSigner::from_json(&json, TEST_PASSPHRASE).unwrap_err();
        assert!(matches!(err, KeystoreError::UnsupportedCipher(_)));
    }

    #[test]
    fn unsupported_kdf_is_rejected() {
        let json = SCRYPT_KEYSTORE.replace("\"scrypt\"", "\"argon2id\"");
        let err = KeystoreSigner::from_json(&json, TEST_PASSPHRASE).unwrap_err();
        assert!(matches!(err, KeystoreError::UnsupportedKdf(_)));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let json = SCRYPT_KEYSTORE.replace("\"version\": 3", "\"version\": 4");
        let err = KeystoreSigner::from_json(&json, TEST_PASSPHRASE).unwrap_err();
        assert!(matches!(err, KeystoreError::UnsupportedVersion(4)));
    }

    #[test]
    fn from_file_round_trips() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCRYPT_KEYSTORE.as_bytes()).unwrap();
        let signer = KeystoreSigner::from_file(file.path(), TEST_PASSPHRASE).unwrap();
        assert_eq!(signer.address(), TEST_ADDRESS);
    }

    #[test]
    fn sign_returns_65_bytes_with_offset_recovery_id() {
        let signer = test_signer();
        for seed in ["test1", "test2", "another digest input"] {
            let digest: [u8; 32] = Keccak256::digest(seed.as_bytes()).into();
            let signature = signer.sign(&digest).unwrap();
            assert_eq!(signature.len(), 65);
            assert!(signature[64] == 27 || signature[64] == 28);
        }
    }

    #[test]
    fn signature_recovers_signing_public_key() {
        let signer = test_signer();
        let digest: [u8; 32] = Keccak256::digest(b"recoverable").into();
        let signature = signer.sign(&digest).unwrap();

        let sig = Signature::from_slice(&signature[..64]).unwrap();
        let recovery_id = RecoveryId::try_from(signature[64] - 27).unwrap();
        let recovered = VerifyingKey::recover_from_prehash(&digest, &sig, recovery_id).unwrap();
        assert_eq!(&recovered, signer.verifying_key());
    }

    #[test]
    fn sign_hex_is_132_chars_with_prefix() {
        let signer = test_signer();
        let digest: [u8; 32] = Keccak256::digest(b"hex encoding").into();
        let hex_sig = signer.sign_hex(&digest).unwrap();
        assert_eq!(hex_sig.len(), 132);
        assert!(hex_sig.starts_with("0x"));
        assert!(hex_sig[2..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn debug_output_redacts_key_material() {
        let signer = test_signer();
        let rendered = format!("{signer:?}");
        assert!(rendered.contains(TEST_ADDRESS));
        assert!(!rendered.contains(TEST_PRIVATE_KEY));
    }

    #[test]
    fn parse_digest_accepts_prefixed_and_bare_hex() {
        let bare = "d91c81e564e4f69229a9224943fa9a79ff21b60fcef5096bfb79e1ce28591a85";
        let prefixed = format!("0x{bare}");
        assert_eq!(parse_digest(bare).unwrap(), parse_digest(&prefixed).unwrap());

        assert!(matches!(
            parse_digest("0x1234"),
            Err(KeystoreError::InvalidDigest)
        ));
        assert!(matches!(
            parse_digest("not hex at all"),
            Err(KeystoreError::InvalidDigest)
        ));
    }
}
