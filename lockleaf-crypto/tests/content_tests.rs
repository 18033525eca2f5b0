use lockleaf_crypto::{ContentBlock, CryptoError};

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = [0u8; 16];
    let block = ContentBlock::encrypt(&key, b"hello").unwrap();
    assert_eq!(block.decrypt(&key).unwrap(), b"hello");
}

#[test]
fn empty_plaintext_roundtrips() {
    let key = [7u8; 16];
    let block = ContentBlock::encrypt(&key, b"").unwrap();
    assert_eq!(block.decrypt(&key).unwrap(), b"");
}

#[test]
fn block_aligned_plaintext_roundtrips() {
    // Exactly one cipher block; padding must still come off cleanly.
    let key = [3u8; 16];
    let plaintext = [0x42u8; 16];
    let block = ContentBlock::encrypt(&key, &plaintext).unwrap();
    assert_eq!(block.decrypt(&key).unwrap(), plaintext);
}

#[test]
fn wrong_key_fails_with_authentication_failure() {
    let block = ContentBlock::encrypt(&[0u8; 16], b"hello").unwrap();
    let err = block.decrypt(&[1u8; 16]).unwrap_err();
    assert!(matches!(err, CryptoError::AuthenticationFailure));
}

#[test]
fn long_key_uses_leading_bytes() {
    // A 64-byte base key and its 16-byte prefix are the same cipher key.
    let mut long_key = vec![9u8; 16];
    long_key.extend_from_slice(&[0xEEu8; 48]);
    let block = ContentBlock::encrypt(&long_key, b"secret").unwrap();
    assert_eq!(block.decrypt(&[9u8; 16]).unwrap(), b"secret");
}

#[test]
fn short_key_rejected() {
    let err = ContentBlock::encrypt(&[0u8; 8], b"x").unwrap_err();
    assert!(matches!(err, CryptoError::InvalidKeyLength { .. }));
}

#[test]
fn tampered_ciphertext_fails() {
    let key = [5u8; 16];
    let mut block = ContentBlock::encrypt(&key, b"some longer content here").unwrap();
    block.ciphertext[0] ^= 0x01;
    assert!(matches!(
        block.decrypt(&key),
        Err(CryptoError::AuthenticationFailure)
    ));
}

#[test]
fn tampered_digest_fails() {
    let key = [5u8; 16];
    let mut block = ContentBlock::encrypt(&key, b"content").unwrap();
    block.digest[3] ^= 0x80;
    assert!(matches!(
        block.decrypt(&key),
        Err(CryptoError::AuthenticationFailure)
    ));
}

#[test]
fn tampered_iv_fails() {
    let key = [5u8; 16];
    let mut block = ContentBlock::encrypt(&key, b"content").unwrap();
    block.iv[0] ^= 0xFF;
    assert!(matches!(
        block.decrypt(&key),
        Err(CryptoError::AuthenticationFailure)
    ));
}

#[test]
fn each_encrypt_produces_fresh_iv_and_ciphertext() {
    let key = [1u8; 16];
    let a = ContentBlock::encrypt(&key, b"same plaintext").unwrap();
    let b = ContentBlock::encrypt(&key, b"same plaintext").unwrap();
    assert_ne!(a.iv, b.iv);
    assert_ne!(a.ciphertext, b.ciphertext);
    // But the digest is deterministic over the plaintext.
    assert_eq!(a.digest, b.digest);
}

#[test]
fn iv_is_key_sized() {
    let block = ContentBlock::encrypt(&[0u8; 16], b"x").unwrap();
    assert_eq!(block.iv.len(), block.cipher_type.key_size());
}

#[test]
fn serialized_form_uses_wire_names_and_base64() {
    let block = ContentBlock::encrypt(&[0u8; 16], b"hello").unwrap();
    let value: serde_json::Value = serde_json::to_value(&block).unwrap();

    assert_eq!(value["cipherType"], "AES_128");
    assert_eq!(value["digestType"], "SHA_1");
    for field in ["iv", "digest", "content"] {
        let encoded = value[field].as_str().unwrap();
        assert!(
            base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded).is_ok(),
            "{field} is not standard base64: {encoded}"
        );
    }
}

#[test]
fn serialization_roundtrip_still_decrypts() {
    let key = [8u8; 16];
    let block = ContentBlock::encrypt(&key, b"persisted").unwrap();
    let json = serde_json::to_string(&block).unwrap();
    let restored: ContentBlock = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, block);
    assert_eq!(restored.decrypt(&key).unwrap(), b"persisted");
}

#[test]
fn unknown_cipher_tag_fails_decode() {
    let block = ContentBlock::encrypt(&[0u8; 16], b"x").unwrap();
    let mut value = serde_json::to_value(&block).unwrap();
    value["cipherType"] = "DES_56".into();
    let err = serde_json::from_value::<ContentBlock>(value).unwrap_err();
    assert!(err.to_string().contains("DES_56"));
}

#[test]
fn unknown_digest_tag_fails_decode() {
    let block = ContentBlock::encrypt(&[0u8; 16], b"x").unwrap();
    let mut value = serde_json::to_value(&block).unwrap();
    value["digestType"] = "MD5".into();
    let err = serde_json::from_value::<ContentBlock>(value).unwrap_err();
    assert!(err.to_string().contains("MD5"));
}

// Property-based tests
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn encrypt_decrypt_always_roundtrips(
            key in proptest::collection::vec(any::<u8>(), 16..64),
            plaintext in proptest::collection::vec(any::<u8>(), 0..512),
        ) {
            let block = ContentBlock::encrypt(&key, &plaintext).unwrap();
            prop_assert_eq!(block.decrypt(&key).unwrap(), plaintext);
        }

        #[test]
        fn ciphertext_is_block_aligned_and_padded(
            plaintext in proptest::collection::vec(any::<u8>(), 0..100),
        ) {
            let block = ContentBlock::encrypt(&[0u8; 16], &plaintext).unwrap();
            prop_assert!(block.ciphertext.len() > plaintext.len());
            prop_assert_eq!(block.ciphertext.len() % 16, 0);
        }
    }
}
