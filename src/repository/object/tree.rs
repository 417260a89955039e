use std::collections::{btree_map::Entry, BTreeMap};

use bstr::{BString, ByteSlice};

use crate::error::{Error, Result};
use crate::oid::{self, Oid};

use super::{Object, ObjectKind};

/// File mode of a tree entry. These four tokens are the only recognized
/// values; anything else in a payload is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryMode {
    Regular,
    Executable,
    Symlink,
    Directory,
}

impl EntryMode {
    /// Octal mode bits.
    pub fn mode_bits(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Executable => 0o100755,
            Self::Symlink => 0o120000,
            Self::Directory => 0o040000,
        }
    }

    /// ASCII token written into tree payloads. Directories serialize as
    /// `40000` without a leading zero, the spelling git itself writes, so
    /// tree digests agree with real tooling.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Regular => "100644",
            Self::Executable => "100755",
            Self::Symlink => "120000",
            Self::Directory => "40000",
        }
    }

    /// Parse a payload mode token. The zero-padded directory spelling
    /// `040000` is accepted alongside `40000`; listings print the padded
    /// form.
    pub fn from_token(token: &[u8]) -> Result<Self> {
        match token {
            b"100644" => Ok(Self::Regular),
            b"100755" => Ok(Self::Executable),
            b"120000" => Ok(Self::Symlink),
            b"40000" | b"040000" => Ok(Self::Directory),
            other => Err(Error::UnsupportedMode(other.as_bstr().to_string())),
        }
    }

    /// `true` when the referenced object is itself a tree.
    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Directory)
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06o}", self.mode_bits())
    }
}

/// One line of a tree payload: mode, name, referenced digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: EntryMode,
    pub name: BString,
    pub oid: Oid,
}

/// Parse a tree payload into its entries, preserving payload order.
///
/// Entries sit back-to-back with no separator, so the scanner isolates the
/// space-terminated mode, the NUL-terminated name, then consumes exactly 20
/// raw digest bytes and starts over. Digest bytes may hold any value,
/// including spaces, newlines, and NULs; the payload must never be treated
/// as text.
pub fn parse(payload: &[u8]) -> Result<Vec<TreeEntry>> {
    let mut entries = Vec::new();
    let mut pos = 0;

    while pos < payload.len() {
        let rest = &payload[pos..];

        let space = rest
            .find_byte(b' ')
            .ok_or_else(|| Error::TruncatedTree(format!("no space after mode at offset {pos}")))?;
        let mode = EntryMode::from_token(&rest[..space])?;

        let after_mode = &rest[space + 1..];
        let nul = after_mode.find_byte(0).ok_or_else(|| {
            Error::TruncatedTree(format!("no NUL after name at offset {}", pos + space + 1))
        })?;
        let name = BString::from(&after_mode[..nul]);

        let digest_start = space + 1 + nul + 1;
        let digest_end = digest_start + oid::RAW_LEN;
        if rest.len() < digest_end {
            return Err(Error::TruncatedTree(format!(
                "entry {:?} has {} digest bytes, need {}",
                name,
                rest.len() - digest_start,
                oid::RAW_LEN
            )));
        }

        let mut raw = [0u8; oid::RAW_LEN];
        raw.copy_from_slice(&rest[digest_start..digest_end]);
        entries.push(TreeEntry {
            mode,
            name,
            oid: Oid::from_raw(raw),
        });

        pos += digest_end;
    }

    Ok(entries)
}

/// A tree object under construction.
///
/// Entries are keyed by name, so serialization always comes out sorted by
/// raw name bytes. That ordering determines the payload and therefore the
/// digest: two directories with the same contents hash identically no
/// matter what order their entries were recorded in.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    entries: BTreeMap<BString, (EntryMode, Oid)>,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Record an entry. Names must be unique within a tree and must not
    /// contain NUL, which terminates the name on disk.
    pub fn add_entry(&mut self, name: BString, mode: EntryMode, oid: Oid) -> Result<()> {
        if name.find_byte(0).is_some() {
            return Err(Error::MalformedObject(format!(
                "tree entry name {name:?} contains NUL"
            )));
        }

        match self.entries.entry(name) {
            Entry::Vacant(e) => e.insert((mode, oid)),
            Entry::Occupied(e) => {
                return Err(Error::MalformedObject(format!(
                    "duplicate tree entry {:?}",
                    e.key()
                )))
            }
        };

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Object for Tree {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Tree
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut payload = Vec::new();
        for (name, (mode, oid)) in &self.entries {
            payload.extend_from_slice(mode.token().as_bytes());
            payload.push(b' ');
            payload.extend_from_slice(name);
            payload.push(0);
            payload.extend_from_slice(oid.as_bytes());
        }
        payload
    }
}
