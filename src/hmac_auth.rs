// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 GameBridge Contributors

//! HMAC request authentication.
//!
//! Mutating requests carry an `X-HMAC-Signature` header: a lowercase hex
//! HMAC-SHA256 tag over the raw request body, keyed with a pre-shared
//! secret. The secret is injected at construction from configuration and
//! exists nowhere in source.
//!
//! Validation fails closed on a missing tag and compares case-insensitively
//! in constant time.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

/// Computes and validates request tags with a pre-shared secret.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct RequestAuthenticator {
    secret: Vec<u8>,
}

impl RequestAuthenticator {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Tag for a payload: lowercase hex HMAC-SHA256 over the raw bytes.
    pub fn generate_tag(&self, payload: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC accepts keys of any length");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    /// True iff `presented` case-insensitively equals the payload's tag.
    ///
    /// An empty tag always fails. The comparison runs in constant time over
    /// the normalized bytes.
    pub fn validate_tag(&self, payload: &[u8], presented: &str) -> bool {
        if presented.is_empty() {
            return false;
        }

        let expected = self.generate_tag(payload);
        let presented = presented.to_ascii_lowercase();
        bool::from(expected.as_bytes().ct_eq(presented.as_bytes()))
    }
}
