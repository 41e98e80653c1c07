//! Time-based one-time codes (RFC 6238).
//!
//! HMAC-SHA1 over the 30-second time step, six digits, base32 shared
//! secret. These are the parameters authenticator apps use for the
//! platform's security codes.

use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use sha1::Sha1;

use crate::{Error, Result};

type HmacSha1 = Hmac<Sha1>;

/// Length of a time step in seconds.
pub const TIME_STEP_SECS: u64 = 30;
/// Number of digits in a code.
pub const DIGITS: u32 = 6;

/// Generate the code for `secret` at `unix_time` (seconds).
///
/// The secret may contain spaces, lower-case letters and `=` padding.
///
/// # Example
///
/// ```
/// use schwab_web_rs::auth::totp;
///
/// let code = totp::generate("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ", 59).unwrap();
/// assert_eq!(code, "287082");
/// ```
pub fn generate(secret: &str, unix_time: u64) -> Result<String> {
    let key = decode_secret(secret)?;
    let counter = unix_time / TIME_STEP_SECS;

    let mut mac = HmacSha1::new_from_slice(&key)
        .map_err(|e| Error::Authentication(format!("invalid TOTP key: {e}")))?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let binary = u32::from_be_bytes([
        digest[offset] & 0x7f,
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]);
    let code = binary % 10u32.pow(DIGITS);
    Ok(format!("{:0width$}", code, width = DIGITS as usize))
}

fn decode_secret(secret: &str) -> Result<Vec<u8>> {
    let normalized: String = secret
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if normalized.is_empty() {
        return Err(Error::Authentication("TOTP secret is empty".to_string()));
    }
    BASE32_NOPAD
        .decode(normalized.as_bytes())
        .map_err(|e| Error::Authentication(format!("failed to generate TOTP code: {e}")))
}
