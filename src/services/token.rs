use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ring::digest;
use ring::rand::{SecureRandom, SystemRandom};
use thiserror::Error;

const TOKEN_BYTES: usize = 32;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("system RNG unavailable")]
    Rng,
}

/// Mints an opaque bearer token: 32 random bytes, base64url without padding.
pub fn generate() -> Result<String, TokenError> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; TOKEN_BYTES];
    rng.fill(&mut bytes).map_err(|_| TokenError::Rng)?;

    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Hex-encoded SHA-256 digest of a presented token. Tokens are stored and
/// compared only in this form.
pub fn digest(token: &str) -> String {
    let hash = digest::digest(&digest::SHA256, token.as_bytes());
    hex::encode(hash.as_ref())
}
