// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID generation abstractions.
//!
//! `JobId` is a 128-bit UUID per the wire contract (§3); `TaskId` is a
//! 32-bit integer assigned by the server, unique within a job and never
//! reused (§3).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Define a newtype ID wrapper around [`uuid::Uuid`].
///
/// Generates `new()` for random generation, `from_uuid`/`as_uuid`, `Display`,
/// `FromStr`, and the trait impls needed to use the ID as a `HashMap` key.
///
/// ```ignore
/// define_uuid_id! {
///     /// Doc comment for the ID type.
///     pub struct JobId;
/// }
/// ```
#[macro_export]
macro_rules! define_uuid_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub uuid::Uuid);

        impl $name {
            /// Generate a new random ID.
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Wrap an existing UUID (e.g. parsed off the wire).
            pub fn from_uuid(id: uuid::Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> uuid::Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(uuid::Uuid::parse_str(s)?))
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(id: uuid::Uuid) -> Self {
                Self(id)
            }
        }
    };
}

/// Maximum representable [`TaskId`] value. Zero is reserved (§3): it means
/// "no task / pre-task error" and, in `getFinishedTasks` (§6), "is this job
/// still active?".
pub const NO_TASK: u32 = 0;

/// Unique identifier for a task within one job. Assigned by the server,
/// monotonically increasing, never zero, never reused within the job (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub u32);

impl TaskId {
    /// The wildcard value meaning "no task" / "is the job active" (§3, §6).
    pub const WILDCARD: TaskId = TaskId(NO_TASK);

    pub fn is_wildcard(&self) -> bool {
        self.0 == NO_TASK
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonically increasing sequence generator for [`TaskId`]s within a
/// single job. Never yields zero and never reuses a value already issued.
#[derive(Debug)]
pub struct TaskIdSequence {
    next: u32,
}

impl Default for TaskIdSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskIdSequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
