// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn digest_is_deterministic() {
    let d1 = Digest::of(b"hello");
    let d2 = Digest::of(b"hello");
    assert_eq!(d1, d2);
}

#[test]
fn different_bytes_give_different_digests() {
    assert_ne!(Digest::of(b"hello"), Digest::of(b"world"));
}

#[test]
fn class_entry_digest_matches_definition() {
    let entry = ClassEntry::new("Foo", b"bytecode".to_vec());
    assert_eq!(entry.digest, Digest::of(b"bytecode"));
}

#[test]
fn digest_display_is_32_hex_chars() {
    let d = Digest::of(b"x");
    assert_eq!(d.to_string().len(), 32);
    assert!(d.to_string().chars().all(|c| c.is_ascii_hexdigit()));
}
