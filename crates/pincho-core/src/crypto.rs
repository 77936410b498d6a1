//! Client-side encryption of notification fields.
//!
//! AES-128-CBC with PKCS7 padding. The key is derived from the password as
//! the first 16 bytes of its SHA-1 digest (the first 32 hex characters of the
//! lowercase hex digest). Ciphertext is Base64 with `+`, `/`, `=` replaced by
//! `-`, `.`, `_` so it survives the receiving app's URL handling.

use aes::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha1::{Digest, Sha1};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

/// AES block size; also the IV length.
pub const IV_LEN: usize = 16;

/// Derive the 16-byte AES-128 key for `password`.
pub fn derive_key(password: &str) -> [u8; 16] {
    let digest = Sha1::digest(password.as_bytes());
    let mut key = [0u8; 16];
    key.copy_from_slice(&digest[..16]);
    key
}

/// Fresh random IV and its lowercase hex form (sent as `iv`).
pub fn generate_iv() -> ([u8; IV_LEN], String) {
    let iv: [u8; IV_LEN] = rand::random();
    let iv_hex = hex::encode(iv);
    (iv, iv_hex)
}

/// Encrypt `plaintext` with a key derived from `password` and the given IV.
pub fn encrypt_field(plaintext: &str, password: &str, iv: &[u8; IV_LEN]) -> String {
    let key = derive_key(password);
    let ciphertext = Aes128CbcEnc::new(&key.into(), &(*iv).into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
    encode_custom_base64(&ciphertext)
}

/// Standard Base64 with `+` → `-`, `/` → `.`, `=` → `_`.
pub fn encode_custom_base64(data: &[u8]) -> String {
    STANDARD
        .encode(data)
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '.',
            '=' => '_',
            other => other,
        })
        .collect()
}
