use anyhow::{anyhow, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use xsalsa20poly1305::aead::{Aead, KeyInit};
use xsalsa20poly1305::{Key, Nonce, XSalsa20Poly1305};

const NONCE_LEN: usize = 24;

pub fn blake3_hash(data: &[u8]) -> [u8; 32] {
    *blake3::hash(data).as_bytes()
}

fn cipher(secret: &str) -> XSalsa20Poly1305 {
    let key = blake3_hash(secret.as_bytes());
    XSalsa20Poly1305::new(Key::from_slice(&key))
}

/// Seals `plaintext` under a key derived from `secret`.
/// Output layout: base64url(nonce || ciphertext).
pub fn encrypt(plaintext: &str, secret: &str) -> Result<String> {
    let mut nonce = [0u8; NONCE_LEN];
    rand::fill(&mut nonce[..]);

    let ciphertext = cipher(secret)
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|_| anyhow!("[encrypt] failed to seal payload"))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    sealed.extend_from_slice(&nonce);
    sealed.extend_from_slice(&ciphertext);
    Ok(URL_SAFE_NO_PAD.encode(sealed))
}

pub fn decrypt(token: &str, secret: &str) -> Result<String> {
    let sealed = URL_SAFE_NO_PAD.decode(token.trim())?;
    if sealed.len() <= NONCE_LEN {
        return Err(anyhow!("[decrypt] token too short"));
    }

    let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
    let plaintext = cipher(secret)
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| anyhow!("[decrypt] token failed authentication"))?;

    Ok(String::from_utf8(plaintext)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sealed_token_opens_with_same_secret() -> Result<()> {
        let token = encrypt(r#"{"user_id":"abc"}"#, "salt")?;
        assert_eq!(decrypt(&token, "salt")?, r#"{"user_id":"abc"}"#);
        Ok(())
    }

    #[test]
    fn test_wrong_secret_is_rejected() -> Result<()> {
        let token = encrypt("payload", "salt")?;
        assert!(decrypt(&token, "other-salt").is_err());
        Ok(())
    }

    #[test]
    fn test_tampered_token_is_rejected() -> Result<()> {
        let token = encrypt("payload", "salt")?;
        let mut bytes = URL_SAFE_NO_PAD.decode(&token)?;
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let tampered = URL_SAFE_NO_PAD.encode(bytes);
        assert!(decrypt(&tampered, "salt").is_err());
        assert!(decrypt("not-a-token", "salt").is_err());
        Ok(())
    }

    #[test]
    fn test_nonce_differs_between_seals() -> Result<()> {
        assert_ne!(encrypt("payload", "salt")?, encrypt("payload", "salt")?);
        Ok(())
    }
}
