use chrono::{DateTime, FixedOffset, TimeZone};

use crate::oid::Oid;

use super::{Object, ObjectKind};

/// An author or committer identity with its timestamp.
#[derive(Debug, Clone)]
pub struct Author {
    name: String,
    email: String,
    a_time: DateTime<FixedOffset>,
}

impl Author {
    pub fn new<Tz: TimeZone>(name: String, email: String, atime: DateTime<Tz>) -> Self {
        Self {
            a_time: atime.fixed_offset(),
            name,
            email,
        }
    }

    /// Ident line fragment: `name <email> unix-seconds ±hhmm`.
    pub fn string(&self) -> String {
        let unix_timestamp = self.a_time.timestamp();
        let utc_offset = self.a_time.format("%z");

        format!(
            "{} <{}> {} {}",
            self.name, self.email, unix_timestamp, utc_offset
        )
    }
}

/// A commit object: a tree digest plus metadata, as line-oriented text.
///
/// Unlike trees this payload is textual; the header lines end at `\n` and
/// the free-form message follows a blank line.
#[derive(Debug, Clone)]
pub struct Commit {
    tree: Oid,
    parent: Option<Oid>,
    author: Author,
    committer: Author,
    message: String,
}

impl Commit {
    pub fn new(
        tree_oid: Oid,
        parent: Option<Oid>,
        author: Author,
        committer: Author,
        message: String,
    ) -> Self {
        Self {
            tree: tree_oid,
            parent,
            author,
            committer,
            message,
        }
    }
}

impl Object for Commit {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Commit
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut text = format!("tree {}\n", self.tree);
        if let Some(parent) = self.parent {
            text.push_str(&format!("parent {parent}\n"));
        }
        text.push_str(&format!("author {}\n", self.author.string()));
        text.push_str(&format!("committer {}\n", self.committer.string()));
        text.push('\n');
        text.push_str(&self.message);
        if !self.message.ends_with('\n') {
            text.push('\n');
        }
        text.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str, email: &str) -> Author {
        let when = DateTime::from_timestamp(1700000000, 0).unwrap().fixed_offset();
        Author::new(name.to_string(), email.to_string(), when)
    }

    #[test]
    fn author_line_has_unix_seconds_and_offset() {
        let author = ident("Alice", "alice@example.com");
        assert_eq!(author.string(), "Alice <alice@example.com> 1700000000 +0000");
    }

    #[test]
    fn author_line_keeps_the_original_offset() {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let when = DateTime::from_timestamp(1700000000, 0)
            .unwrap()
            .with_timezone(&offset);
        let author = Author::new("Alice".into(), "alice@example.com".into(), when);
        assert_eq!(author.string(), "Alice <alice@example.com> 1700000000 +0100");
    }

    #[test]
    fn payload_with_parent() {
        let tree = Oid::hash(b"some tree");
        let parent = Oid::hash(b"some parent");
        let commit = Commit::new(
            tree,
            Some(parent),
            ident("Alice", "alice@example.com"),
            ident("Bob", "bob@example.com"),
            "First commit".to_string(),
        );

        let expected = format!(
            "tree {tree}\nparent {parent}\nauthor Alice <alice@example.com> 1700000000 +0000\ncommitter Bob <bob@example.com> 1700000000 +0000\n\nFirst commit\n"
        );
        assert_eq!(commit.to_bytes(), expected.into_bytes());
        assert_eq!(commit.kind(), ObjectKind::Commit);
    }

    #[test]
    fn payload_without_parent_omits_the_line() {
        let tree = Oid::hash(b"some tree");
        let commit = Commit::new(
            tree,
            None,
            ident("Alice", "alice@example.com"),
            ident("Alice", "alice@example.com"),
            "root\n".to_string(),
        );

        let text = String::from_utf8(commit.to_bytes()).unwrap();
        assert!(!text.contains("parent"));
        assert!(text.starts_with(&format!("tree {tree}\n")));
        // an already-terminated message is not given a second newline
        assert!(text.ends_with("\n\nroot\n"));
        assert!(!text.ends_with("root\n\n"));
    }

    #[test]
    fn identical_fields_hash_identically() {
        let tree = Oid::hash(b"t");
        let a = Commit::new(
            tree,
            None,
            ident("A", "a@example.com"),
            ident("A", "a@example.com"),
            "msg".into(),
        );
        let b = Commit::new(
            tree,
            None,
            ident("A", "a@example.com"),
            ident("A", "a@example.com"),
            "msg".into(),
        );
        assert_eq!(a.to_bytes(), b.to_bytes());
    }
}
