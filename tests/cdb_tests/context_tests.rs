//! Tests for lookup contexts
//!
//! These tests verify:
//! - Context state after finds and misses
//! - Reusing one context across keys
//! - Resuming a search from an encoded snapshot
//! - Snapshots pointing outside their slot table are rejected
//! - Concurrent searches with private contexts

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;
use std::thread;

use common::{build, build_numbered, write_cdb};
use constdb::{cdb_hash, Cdb, CdbError, Config, Context, StorageBackend};
use tempfile::TempDir;

// =============================================================================
// State Tests
// =============================================================================

#[test]
fn test_context_tracks_last_match() {
    let cdb = Cdb::new(build(&[(b"k", b"value")]));
    let mut ctx = Context::new();

    let view = cdb.find(b"k", &mut ctx).unwrap().unwrap();

    assert!(ctx.is_started());
    assert_eq!(ctx.key_hash(), Some(cdb_hash(b"k")));
    assert_eq!(ctx.record(), Some(view));
}

#[test]
fn test_miss_clears_last_match() {
    let cdb = Cdb::new(build(&[(b"k", b"value")]));
    let mut ctx = Context::new();

    cdb.find(b"k", &mut ctx).unwrap().unwrap();
    assert!(cdb.find_next(b"k", &mut ctx).unwrap().is_none());

    assert_eq!(ctx.record(), None);
}

#[test]
fn test_context_reused_across_keys() {
    let cdb = Cdb::new(build_numbered(50));
    let mut ctx = Context::new();

    for i in (0..50).rev() {
        let key = format!("key{}", i);
        let view = cdb.find(key.as_bytes(), &mut ctx).unwrap().unwrap();
        assert_eq!(cdb.read_value(view).unwrap(), format!("value{}", i).as_bytes());
    }
}

#[test]
fn test_new_context_uses_configured_scratch() {
    let temp = TempDir::new().unwrap();
    let path = write_cdb(temp.path(), "scratch.cdb", &build(&[(b"k", b"v")]));

    let config = Config::builder()
        .path(&path)
        .backend(StorageBackend::File)
        .scratch_size(7)
        .build();
    let cdb = Cdb::open_with(config).unwrap();

    let mut ctx = cdb.new_context();
    assert_eq!(ctx.scratch_size(), 7);
    assert_eq!(cdb.data(b"k", &mut ctx).unwrap(), Some(b"v".to_vec()));
}

// =============================================================================
// Snapshot Tests
// =============================================================================

#[test]
fn test_resume_from_encoded_context() {
    let cdb = Cdb::new(build(&[(b"dup", b"1"), (b"dup", b"2"), (b"dup", b"3")]));
    let mut ctx = Context::new();

    let first = cdb.find(b"dup", &mut ctx).unwrap().unwrap();
    assert_eq!(cdb.read_value(first).unwrap(), b"1");

    let snapshot = ctx.encode().unwrap();
    drop(ctx);

    let mut resumed = Context::decode(&snapshot).unwrap();
    assert_eq!(resumed.record(), Some(first));

    let second = cdb.find_next(b"dup", &mut resumed).unwrap().unwrap();
    assert_eq!(cdb.read_value(second).unwrap(), b"2");
    let third = cdb.find_next(b"dup", &mut resumed).unwrap().unwrap();
    assert_eq!(cdb.read_value(third).unwrap(), b"3");
    assert_eq!(cdb.find_next(b"dup", &mut resumed).unwrap(), None);
}

#[test]
fn test_decode_rejects_misaligned_slot_position() {
    let cdb = Cdb::new(build(&[(b"dup", b"1"), (b"dup", b"2")]));
    let mut ctx = Context::new();
    cdb.find(b"dup", &mut ctx).unwrap().unwrap();

    // kpos is the third u32 of the snapshot
    let mut snapshot = ctx.encode().unwrap();
    let kpos = u32::from_le_bytes(snapshot[8..12].try_into().unwrap());
    for stray in [kpos + 4, kpos + 1, kpos + 4096, 0] {
        snapshot[8..12].copy_from_slice(&stray.to_le_bytes());
        let err = Context::decode(&snapshot).unwrap_err();
        assert!(matches!(err, CdbError::Serialization(_)));
    }

    snapshot[8..12].copy_from_slice(&kpos.to_le_bytes());
    let mut resumed = Context::decode(&snapshot).unwrap();
    let second = cdb.find_next(b"dup", &mut resumed).unwrap().unwrap();
    assert_eq!(cdb.read_value(second).unwrap(), b"2");
}

#[test]
fn test_snapshot_of_fresh_context_starts_over() {
    let cdb = Cdb::new(build(&[(b"k", b"v")]));

    let snapshot = Context::new().encode().unwrap();
    let mut ctx = Context::decode(&snapshot).unwrap();

    assert!(!ctx.is_started());
    assert_eq!(cdb.data(b"k", &mut ctx).unwrap(), Some(b"v".to_vec()));
}

#[test]
fn test_find_iter_hands_back_context() {
    let cdb = Cdb::new(build(&[(b"dup", b"1"), (b"dup", b"2")]));

    let mut iter = cdb.find_all(b"dup");
    let first = iter.next().unwrap().unwrap();
    assert_eq!(iter.context().record(), Some(first));

    let mut ctx = iter.into_context();
    let second = cdb.find_next(b"dup", &mut ctx).unwrap().unwrap();
    assert_eq!(cdb.read_value(second).unwrap(), b"2");
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_lookups_with_private_contexts() {
    let temp = TempDir::new().unwrap();
    let path = write_cdb(temp.path(), "shared.cdb", &build_numbered(500));

    for backend in [StorageBackend::Mmap, StorageBackend::File] {
        let config = Config::builder().path(&path).backend(backend).build();
        let cdb = Arc::new(Cdb::open_with(config).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cdb = Arc::clone(&cdb);
                thread::spawn(move || {
                    let mut ctx = cdb.new_context();
                    for i in (t..500).step_by(3) {
                        let key = format!("key{}", i);
                        let value = cdb.data(key.as_bytes(), &mut ctx).unwrap();
                        assert_eq!(value, Some(format!("value{}", i).into_bytes()));
                    }
                    assert_eq!(cdb.data(b"absent", &mut ctx).unwrap(), None);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
