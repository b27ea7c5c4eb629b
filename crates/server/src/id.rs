//! Secret identifiers.
//!
//! An id is [`ID_BYTES`] bytes from the operating system CSPRNG encoded as
//! unpadded URL-safe base64, i.e. 128 bits of entropy in 22 characters drawn
//! from `[A-Za-z0-9_-]`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::{rngs::OsRng, RngCore};

/// Random bytes per identifier.
pub const ID_BYTES: usize = 16;

/// Upper bound on the length of an id accepted for lookup.
pub const MAX_ID_LEN: usize = 64;

/// Generate a fresh identifier.
///
/// Panics only if the operating system entropy source is unavailable, which is
/// not a condition the service can recover from.
pub fn generate() -> String {
    let mut bytes = [0u8; ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Returns `true` if `id` could be a key in the store.
///
/// Used to turn obviously bogus lookups into not-found without a store round trip.
pub fn is_well_formed(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
