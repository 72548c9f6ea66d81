//! Password hash verification for employee logins.
//!
//! Two stored formats are understood:
//! - Werkzeug-style `method$salt$hexdigest` hashes (`pbkdf2:sha256:<iterations>`,
//!   `pbkdf2:sha512:<iterations>`, `scrypt:<n>:<r>:<p>`), which is what existing
//!   employee rows were provisioned with.
//! - PHC strings (`$argon2id$...`), produced by [`hash_password`] for new accounts.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use sha2::{Sha256, Sha512};
use subtle::ConstantTimeEq;
use thiserror::Error;

const WERKZEUG_DEFAULT_PBKDF2_ITERATIONS: u32 = 600_000;
const MAX_PBKDF2_ITERATIONS: u32 = 10_000_000;
const SCRYPT_DIGEST_LEN: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("password must not be empty")]
    EmptyPassword,
    #[error("password hashing failed: {0}")]
    Hashing(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KdfMethod {
    Pbkdf2Sha256 { iterations: u32 },
    Pbkdf2Sha512 { iterations: u32 },
    Scrypt { log_n: u8, r: u32, p: u32 },
}

#[derive(Debug, PartialEq, Eq)]
struct WerkzeugHash<'a> {
    method: KdfMethod,
    salt: &'a str,
    digest: Vec<u8>,
}

/// Hashes a password for storage using argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    if password.is_empty() {
        return Err(AuthError::EmptyPassword);
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|error| AuthError::Hashing(error.to_string()))
}

/// Returns true when `candidate` matches `stored`. Malformed hashes never match.
pub fn verify_password(stored: &str, candidate: &str) -> bool {
    if stored.starts_with('$') {
        return PasswordHash::new(stored)
            .and_then(|parsed| Argon2::default().verify_password(candidate.as_bytes(), &parsed))
            .is_ok();
    }

    match parse_werkzeug(stored) {
        Some(parsed) => match derive(&parsed, candidate) {
            Some(computed) => computed.ct_eq(&parsed.digest).into(),
            None => false,
        },
        None => false,
    }
}

fn parse_werkzeug(stored: &str) -> Option<WerkzeugHash<'_>> {
    let mut parts = stored.splitn(3, '$');
    let method = parts.next()?;
    let salt = parts.next()?;
    let digest = hex::decode(parts.next()?).ok()?;
    if salt.is_empty() || digest.is_empty() {
        return None;
    }

    let mut args = method.split(':');
    let method = match args.next()? {
        "pbkdf2" => {
            let hash_name = args.next().unwrap_or("sha256");
            let iterations = match args.next() {
                Some(raw) => raw.parse::<u32>().ok()?,
                None => WERKZEUG_DEFAULT_PBKDF2_ITERATIONS,
            };
            if iterations == 0 || iterations > MAX_PBKDF2_ITERATIONS {
                return None;
            }
            match hash_name {
                "sha256" => KdfMethod::Pbkdf2Sha256 { iterations },
                "sha512" => KdfMethod::Pbkdf2Sha512 { iterations },
                _ => return None,
            }
        }
        "scrypt" => {
            let n = args.next()?.parse::<u64>().ok()?;
            let r = args.next()?.parse::<u32>().ok()?;
            let p = args.next()?.parse::<u32>().ok()?;
            if n < 2 || !n.is_power_of_two() {
                return None;
            }
            KdfMethod::Scrypt { log_n: n.trailing_zeros() as u8, r, p }
        }
        _ => return None,
    };
    if args.next().is_some() {
        return None;
    }

    Some(WerkzeugHash { method, salt, digest })
}

fn derive(parsed: &WerkzeugHash<'_>, candidate: &str) -> Option<Vec<u8>> {
    let password = candidate.as_bytes();
    let salt = parsed.salt.as_bytes();
    match parsed.method {
        KdfMethod::Pbkdf2Sha256 { iterations } => {
            let mut out = vec![0u8; 32];
            pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut out);
            Some(out)
        }
        KdfMethod::Pbkdf2Sha512 { iterations } => {
            let mut out = vec![0u8; 64];
            pbkdf2::pbkdf2_hmac::<Sha512>(password, salt, iterations, &mut out);
            Some(out)
        }
        KdfMethod::Scrypt { log_n, r, p } => {
            let params = scrypt::Params::new(log_n, r, p, SCRYPT_DIGEST_LEN).ok()?;
            let mut out = vec![0u8; SCRYPT_DIGEST_LEN];
            scrypt::scrypt(password, salt, &params, &mut out).ok()?;
            Some(out)
        }
    }
}
