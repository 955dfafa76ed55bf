//! Salted password hashing.
//!
//! Encoded form: `pbkdf2-sha256$<iterations>$<salt hex>$<hash hex>`.

use anyhow::{Context, Result};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use tokio::task;
use tracing::warn;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_SIZE: usize = 16;
const KEY_SIZE: usize = 32;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str, iterations: u32) -> String {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);

    let mut derived = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut derived);

    format!(
        "{}${}${}${}",
        SCHEME,
        iterations,
        hex::encode(salt),
        hex::encode(derived)
    )
}

/// Check a password against an encoded hash. Malformed hashes never verify.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let Some((iterations, salt, expected)) = parse(encoded) else {
        warn!("Stored password hash has an unknown format");
        return false;
    };

    let mut derived = vec![0u8; expected.len()];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut derived);
    constant_time_eq(&derived, &expected)
}

/// `hash_password` on the blocking pool, for use from request handlers
pub async fn hash_password_blocking(password: String, iterations: u32) -> Result<String> {
    task::spawn_blocking(move || hash_password(&password, iterations))
        .await
        .context("password hashing task failed")
}

/// `verify_password` on the blocking pool, for use from request handlers
pub async fn verify_password_blocking(password: String, encoded: String) -> Result<bool> {
    task::spawn_blocking(move || verify_password(&password, &encoded))
        .await
        .context("password verification task failed")
}

fn parse(encoded: &str) -> Option<(u32, Vec<u8>, Vec<u8>)> {
    let mut parts = encoded.split('$');
    if parts.next()? != SCHEME {
        return None;
    }
    let iterations: u32 = parts.next()?.parse().ok()?;
    let salt = hex::decode(parts.next()?).ok()?;
    let hash = hex::decode(parts.next()?).ok()?;
    if parts.next().is_some() || iterations == 0 || hash.is_empty() {
        return None;
    }
    Some((iterations, salt, hash))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
