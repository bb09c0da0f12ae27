//! Per-session cursor image cache.
//!
//! The remote engine announces cursor bitmaps with a lifecycle of
//! new → set → free.  The bridge assigns each bitmap a session-unique id and
//! keeps the encoded image here so the browser can fetch it over an
//! auxiliary channel when the matching pointer event arrives.
//!
//! Invariants:
//!
//! - An id present in the cache corresponds to a pointer the engine has not
//!   yet freed; removal happens together with emitting the "pointer freed"
//!   wire message.
//! - Entries never expire by time.  `created` exists for diagnostics only.

use std::collections::HashMap;
use std::time::SystemTime;

/// One cached cursor: the encoded image plus its creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorEntry {
    /// Encoded cursor image (the output of the image-encoding collaborator).
    pub image: Vec<u8>,
    /// When the pointer was announced.  Diagnostic only, never used for
    /// eviction.
    pub created: SystemTime,
}

/// Maps pointer ids to cached cursor images.
///
/// Ids are assigned by the event bridge: monotonically increasing, 1-based,
/// never reused within a session.  The cache itself does not enforce that —
/// it is a plain map — but `insert` of a duplicate id would indicate a bug
/// in the id allocator.
#[derive(Debug, Default)]
pub struct CursorCache {
    entries: HashMap<u32, CursorEntry>,
}

impl CursorCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an encoded cursor image under `id`, stamped with the current
    /// time.
    pub fn insert(&mut self, id: u32, image: Vec<u8>) {
        self.entries.insert(
            id,
            CursorEntry {
                image,
                created: SystemTime::now(),
            },
        );
    }

    /// Looks up a cached cursor.  Returns `None` for unknown ids, including
    /// ids that have already been freed.
    pub fn get(&self, id: u32) -> Option<&CursorEntry> {
        self.entries.get(&id)
    }

    /// Removes the entry for `id`.  Returns whether an entry was present.
    pub fn remove(&mut self, id: u32) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Drops every entry.  Used when the engine context is torn down.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
