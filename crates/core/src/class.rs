// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Code-cache entries keyed by (class name, digest) (§3, §4.1).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 16-byte MD5 content digest, the key half of (name, digest) (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest(pub [u8; 16]);

impl Digest {
    pub fn of(bytes: &[u8]) -> Self {
        Self(md5::compute(bytes).0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// One stored class definition (§3 Entities).
///
/// Keyed by `(name, digest)`; the "current" entry for a name is whichever
/// one was written most recently via `put` (§4.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub name: String,
    pub digest: Digest,
    pub definition: Vec<u8>,
}

impl ClassEntry {
    pub fn new(name: impl Into<String>, definition: Vec<u8>) -> Self {
        let digest = Digest::of(&definition);
        Self {
            name: name.into(),
            digest,
            definition,
        }
    }
}

#[cfg(test)]
#[path = "class_tests.rs"]
mod tests;
