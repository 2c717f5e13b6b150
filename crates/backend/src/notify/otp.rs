//! Time-based one-time codes (RFC 6238, SHA-1, 6 digits, 30 second step).

use rand::RngCore;
use totp_rs::{Algorithm, TOTP};

use super::NotifyError;

const DIGITS: usize = 6;
const STEP_SECS: u64 = 30;
const SECRET_LEN: usize = 20;

/// Generate a code for the current time step over a fresh random secret.
pub fn generate_code() -> Result<String, NotifyError> {
    let mut secret = vec![0u8; SECRET_LEN];
    rand::thread_rng().fill_bytes(&mut secret);

    totp(secret)?
        .generate_current()
        .map_err(|e| NotifyError::Code(e.to_string()))
}

/// Code for `secret` at `unix_time`.
pub fn code_at(secret: Vec<u8>, unix_time: u64) -> Result<String, NotifyError> {
    Ok(totp(secret)?.generate(unix_time))
}

fn totp(secret: Vec<u8>) -> Result<TOTP, NotifyError> {
    TOTP::new(Algorithm::SHA1, DIGITS, 1, STEP_SECS, secret)
        .map_err(|e| NotifyError::Code(e.to_string()))
}
