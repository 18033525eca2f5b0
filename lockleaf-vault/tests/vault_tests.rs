use chrono::{TimeZone, Utc};
use lockleaf_crypto::CryptoError;
use lockleaf_storage::{Backend, MemoryBackend, Revision, Synchronizer};
use lockleaf_vault::{Session, Vault, VaultError};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn vault_over(backends: &[MemoryBackend]) -> Vault {
    let backends: Vec<Arc<dyn Backend>> = backends
        .iter()
        .map(|b| Arc::new(b.clone()) as Arc<dyn Backend>)
        .collect();
    Vault::new(Synchronizer::new(backends))
}

#[tokio::test]
async fn create_edit_reopen_roundtrip() {
    let a = MemoryBackend::new("a");
    let b = MemoryBackend::new("b");
    let vault = vault_over(&[a.clone(), b.clone()]);

    let mut session = Session::create(vault.clone(), b"passphrase").unwrap();
    assert!(session.content().is_empty());

    let wrote = session.apply_edit(b"first secrets").await.unwrap();
    assert!(wrote);

    // Both replicas hold the same encoded message.
    let stored_a = a.stored().unwrap();
    let stored_b = b.stored().unwrap();
    assert_eq!(stored_a.bytes, stored_b.bytes);

    let reopened = Session::open(vault, b"passphrase").await.unwrap();
    assert_eq!(reopened.content(), b"first secrets");
}

#[tokio::test]
async fn fresh_session_persists_nothing_until_an_effective_edit() {
    let a = MemoryBackend::new("a");
    let vault = vault_over(&[a.clone()]);

    let mut session = Session::create(vault, b"pass").unwrap();

    // Editing empty content to empty content is a no-op.
    let wrote = session.apply_edit(b"").await.unwrap();
    assert!(!wrote);
    assert!(a.stored().is_none());
}

#[tokio::test]
async fn noop_edit_does_not_touch_backends() {
    let a = MemoryBackend::new("a");
    let vault = vault_over(&[a.clone()]);

    let mut session = Session::create(vault, b"pass").unwrap();
    session.apply_edit(b"stable content").await.unwrap();
    let first_write = a.stored().unwrap();

    let wrote = session.apply_edit(b"stable content").await.unwrap();
    assert!(!wrote);
    // Same revision, same timestamp: no write happened.
    assert_eq!(a.stored().unwrap(), first_write);
}

#[tokio::test]
async fn open_without_document_reports_no_document() {
    let vault = vault_over(&[MemoryBackend::new("a")]);
    let err = Session::open(vault, b"pass").await.unwrap_err();
    assert!(matches!(err, VaultError::NoDocument));
}

#[tokio::test]
async fn open_with_wrong_passphrase_surfaces_wrong_passphrase() {
    let a = MemoryBackend::new("a");
    let vault = vault_over(&[a]);

    let mut session = Session::create(vault.clone(), b"right").unwrap();
    session.apply_edit(b"content").await.unwrap();

    let err = Session::open(vault, b"wrong").await.unwrap_err();
    assert!(matches!(
        err,
        VaultError::Crypto(CryptoError::WrongPassphrase { .. })
    ));
}

#[tokio::test]
async fn malformed_backend_bytes_fail_as_decode_not_io() {
    let garbage = Revision {
        bytes: b"definitely not json".to_vec(),
        modified_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
    };
    let a = MemoryBackend::holding("a", garbage);
    let vault = vault_over(&[a]);

    let err = Session::open(vault, b"pass").await.unwrap_err();
    assert!(matches!(err, VaultError::Decode(_)));
}

#[tokio::test]
async fn added_passphrase_unlocks_after_reopen() {
    let a = MemoryBackend::new("a");
    let vault = vault_over(&[a]);

    let mut session = Session::create(vault.clone(), b"original").unwrap();
    session.apply_edit(b"shared").await.unwrap();
    session.add_passphrase(b"teammate").await.unwrap();

    let theirs = Session::open(vault.clone(), b"teammate").await.unwrap();
    assert_eq!(theirs.content(), b"shared");
    let mine = Session::open(vault, b"original").await.unwrap();
    assert_eq!(mine.content(), b"shared");
}

#[tokio::test]
async fn removed_key_stops_unlocking_after_reopen() {
    let a = MemoryBackend::new("a");
    let vault = vault_over(&[a]);

    let mut session = Session::create(vault.clone(), b"keep").unwrap();
    session.apply_edit(b"data").await.unwrap();
    session.add_passphrase(b"temporary").await.unwrap();
    session.remove_key(1).await.unwrap();

    assert!(Session::open(vault.clone(), b"temporary").await.is_err());
    assert_eq!(
        Session::open(vault, b"keep").await.unwrap().content(),
        b"data"
    );
}

#[tokio::test]
async fn changed_passphrase_takes_effect_after_reopen() {
    let a = MemoryBackend::new("a");
    let vault = vault_over(&[a]);

    let mut session = Session::create(vault.clone(), b"old").unwrap();
    session.apply_edit(b"rotating").await.unwrap();
    session.change_passphrase(0, b"new").await.unwrap();

    assert!(Session::open(vault.clone(), b"old").await.is_err());
    assert_eq!(
        Session::open(vault, b"new").await.unwrap().content(),
        b"rotating"
    );
}

#[tokio::test]
async fn stale_replica_converges_when_session_opens() {
    // Replica b misses the latest write; opening a session repairs it.
    let a = MemoryBackend::new("a");
    let vault_a_only = vault_over(&[a.clone()]);

    let mut session = Session::create(vault_a_only, b"pass").unwrap();
    session.apply_edit(b"latest").await.unwrap();

    let b = MemoryBackend::new("b");
    let vault_both = vault_over(&[a.clone(), b.clone()]);
    let reopened = Session::open(vault_both, b"pass").await.unwrap();

    assert_eq!(reopened.content(), b"latest");
    assert_eq!(b.stored().unwrap().bytes, a.stored().unwrap().bytes);
}
