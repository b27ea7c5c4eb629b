//! Client-side encryption contract.
//!
//! The server never encrypts or decrypts. Clients are expected to:
//!
//! - generate a fresh [`KEY_LEN`]-byte symmetric key per secret and keep it out
//!   of every request (typically in the URL fragment of the shared link);
//! - generate a fresh [`IV_LEN`]-byte IV for each encryption;
//! - apply an authenticated cipher (AES-256-GCM or equivalent) and send the
//!   ciphertext and IV as text-safe strings.
//!
//! Both strings are stored and returned byte-for-byte.

/// Byte length of the client-held key (256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of the per-encryption IV (96 bits).
pub const IV_LEN: usize = 12;
