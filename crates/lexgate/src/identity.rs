// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Password hashing and signed bearer tokens.
//!
//! Passwords are stored as `pbkdf2-sha256$<iterations>$<salt>$<hash>` with
//! base64 (unpadded) salt and hash. Tokens are `<claims>.<signature>`, both
//! base64url, where the signature is HMAC-SHA256 over the encoded claims.

use std::num::NonZeroU32;
use std::time::Duration;

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use ring::rand::{SecureRandom, SystemRandom};
use ring::{hmac, pbkdf2};
use serde::{Deserialize, Serialize};

use crate::ledger::AccountId;

const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
const SCHEME: &str = "pbkdf2-sha256";

/// Shortest accepted password.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("random source failure")]
    Rng,
    #[error("token encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

fn iterations(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN)
}

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, IdentityError> {
    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new().fill(&mut salt).map_err(|_| IdentityError::Rng)?;
    let mut hash = [0u8; HASH_LEN];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations(PBKDF2_ITERATIONS),
        &salt,
        password.as_bytes(),
        &mut hash,
    );
    Ok(format!(
        "{SCHEME}${PBKDF2_ITERATIONS}${}${}",
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(hash)
    ))
}

/// Check `password` against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.split('$');
    let (Some(SCHEME), Some(iters), Some(salt), Some(hash), None) =
        (parts.next(), parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let Ok(iters) = iters.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(hash)) = (STANDARD_NO_PAD.decode(salt), STANDARD_NO_PAD.decode(hash))
    else {
        return false;
    };
    pbkdf2::verify(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations(iters),
        &salt,
        password.as_bytes(),
        &hash,
    )
    .is_ok()
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    /// Expiry as epoch seconds.
    exp: u64,
}

/// Issues and verifies bearer tokens.
pub struct TokenSigner {
    key: hmac::Key,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self { key: hmac::Key::new(hmac::HMAC_SHA256, secret), ttl }
    }

    pub fn issue(&self, account: &AccountId) -> Result<String, IdentityError> {
        self.issue_at(account, epoch_secs())
    }

    fn issue_at(&self, account: &AccountId, now: u64) -> Result<String, IdentityError> {
        let exp = now.saturating_add(self.ttl.as_secs());
        let claims = Claims { sub: account.as_str().to_owned(), exp };
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);
        let tag = hmac::sign(&self.key, payload.as_bytes());
        Ok(format!("{payload}.{}", URL_SAFE_NO_PAD.encode(tag.as_ref())))
    }

    /// Verify `token` and return the account it was issued to.
    pub fn verify(&self, token: &str) -> Result<AccountId, IdentityError> {
        let (payload, signature) = token.split_once('.').ok_or(IdentityError::Malformed)?;
        let signature =
            URL_SAFE_NO_PAD.decode(signature).map_err(|_| IdentityError::Malformed)?;
        hmac::verify(&self.key, payload.as_bytes(), &signature)
            .map_err(|_| IdentityError::BadSignature)?;

        let bytes = URL_SAFE_NO_PAD.decode(payload).map_err(|_| IdentityError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&bytes).map_err(|_| IdentityError::Malformed)?;
        if claims.exp <= epoch_secs() {
            return Err(IdentityError::Expired);
        }
        Ok(AccountId::from(claims.sub))
    }
}

fn epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
