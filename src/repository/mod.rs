use std::{
    env, fs,
    os::unix::ffi::{OsStrExt, OsStringExt},
    os::unix::fs::MetadataExt,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::Context;
use bstr::BString;
use chrono::Local;
use email_address::EmailAddress;
use tracing::debug;

use db::Db;
use object::{
    blob::Blob,
    commit::{Author, Commit},
    tree::{self, EntryMode, Tree, TreeEntry},
    Header, ObjectKind,
};
use workspace::Workspace;

use crate::oid::Oid;

pub mod db;
pub mod object;
pub mod workspace;

pub struct ConfigUser {
    pub name: String,
    pub email: String,
}

/// Commit idents, read once from the environment. The committer falls back
/// to the author when unset, like git does.
pub struct Config {
    pub author: ConfigUser,
    pub committer: ConfigUser,
}

fn env_or_default(key: &str) -> String {
    env::var_os(key)
        .map(|var| var.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn env_or(key: &str, fallback: &str) -> String {
    match env::var_os(key) {
        Some(var) => var.to_string_lossy().to_string(),
        None => fallback.to_string(),
    }
}

impl Config {
    fn from_env() -> Self {
        let name = env_or_default("GIT_AUTHOR_NAME");
        let email = env_or_default("GIT_AUTHOR_EMAIL");
        let committer = ConfigUser {
            name: env_or("GIT_COMMITTER_NAME", &name),
            email: env_or("GIT_COMMITTER_EMAIL", &email),
        };

        Self {
            author: ConfigUser { name, email },
            committer,
        }
    }

    fn ident(user: &ConfigUser, role: &str) -> Result<Author, anyhow::Error> {
        if user.name.is_empty() {
            anyhow::bail!("no {role} name configured; set GIT_AUTHOR_NAME / GIT_COMMITTER_NAME");
        }
        EmailAddress::from_str(&user.email)
            .with_context(|| format!("invalid {role} email {:?}", user.email))?;

        Ok(Author::new(
            user.name.clone(),
            user.email.clone(),
            Local::now(),
        ))
    }

    pub fn author_ident(&self) -> Result<Author, anyhow::Error> {
        Self::ident(&self.author, "author")
    }

    pub fn committer_ident(&self) -> Result<Author, anyhow::Error> {
        Self::ident(&self.committer, "committer")
    }
}

pub struct Repository {
    root: PathBuf,
    workspace: Workspace,
    db: Db,
    config: Config,
}

impl Repository {
    pub fn open(path: PathBuf) -> Self {
        let workspace_path = path.clone();
        let root_path = path.join(".git");

        Self {
            root: path,
            workspace: Workspace::new(workspace_path),
            db: Db::new(root_path),
            config: Config::from_env(),
        }
    }

    /// Create the store scaffolding: `.git/objects`, `.git/refs`, and a HEAD
    /// pointing at the default branch. Safe to run on an existing
    /// repository; an existing HEAD is left alone.
    pub fn init(&self) -> Result<(), anyhow::Error> {
        fs::create_dir_all(self.root.join(".git"))?;
        self.db.init()?;

        let head = self.root.join(".git").join("HEAD");
        if let Ok(false) = fs::exists(&head) {
            fs::write(&head, "ref: refs/heads/main\n")?;
        }

        Ok(())
    }

    /// Id of the blob holding `path`'s bytes; persists the object when
    /// `write` is set.
    pub fn hash_object(&self, path: &Path, write: bool) -> Result<Oid, anyhow::Error> {
        let data = self
            .workspace
            .read_file(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        let blob = Blob::new(data);

        if write {
            Ok(self.db.store_object(&blob)?)
        } else {
            Ok(Db::hash_object(&blob))
        }
    }

    /// Load an object's header and payload.
    pub fn cat_file(&self, oid: &Oid) -> crate::error::Result<(Header, Vec<u8>)> {
        self.db.load_object(oid)
    }

    /// Load a tree object and parse its entries, in payload order.
    pub fn ls_tree(&self, oid: &Oid) -> Result<Vec<TreeEntry>, anyhow::Error> {
        let (header, payload) = self.db.load_object(oid)?;
        if header.kind != ObjectKind::Tree {
            anyhow::bail!("object {oid} is a {}, not a tree", header.kind);
        }

        Ok(tree::parse(&payload)?)
    }

    /// Build and persist tree objects for the whole workspace, returning the
    /// root tree's id.
    pub fn write_tree(&self) -> Result<Oid, anyhow::Error> {
        self.build_tree(Path::new(""))
    }

    /// Depth-first over one directory: blobs for files and symlinks, a
    /// recursive call per subdirectory. Children are fully persisted before
    /// the tree that names them, so a stored tree never references a missing
    /// object. Any unreadable child aborts the whole build.
    fn build_tree(&self, dir: &Path) -> Result<Oid, anyhow::Error> {
        let mut tree = Tree::new();

        for child in self.workspace.list_dir(dir)? {
            let name = BString::from(child.file_name().as_bytes());
            let rel = dir.join(child.file_name());
            let file_type = child.file_type();

            if file_type.is_dir() {
                let sub_oid = self.build_tree(&rel)?;
                tree.add_entry(name, EntryMode::Directory, sub_oid)?;
            } else if file_type.is_symlink() {
                let target = self
                    .workspace
                    .read_link(&rel)
                    .with_context(|| format!("could not read link {}", rel.display()))?;
                let blob = Blob::new(target.into_os_string().into_vec());
                let oid = self.db.store_object(&blob)?;
                tree.add_entry(name, EntryMode::Symlink, oid)?;
            } else {
                let data = self
                    .workspace
                    .read_file(&rel)
                    .with_context(|| format!("could not read {}", rel.display()))?;
                let oid = self.db.store_object(&Blob::new(data))?;

                let mode = if child.metadata()?.mode() & 0o111 != 0 {
                    EntryMode::Executable
                } else {
                    EntryMode::Regular
                };
                tree.add_entry(name, mode, oid)?;
            }
        }

        let oid = self.db.store_object(&tree)?;
        debug!(dir = %dir.display(), entries = tree.len(), %oid, "stored tree");
        Ok(oid)
    }

    /// Build and persist a commit object for an already-stored tree.
    pub fn commit_tree(
        &self,
        tree_oid: Oid,
        parent: Option<Oid>,
        message: String,
    ) -> Result<Oid, anyhow::Error> {
        let author = self.config.author_ident()?;
        let committer = self.config.committer_ident()?;

        let commit = Commit::new(tree_oid, parent, author, committer, message);
        let oid = self
            .db
            .store_object(&commit)
            .with_context(|| "Could not store commit")?;

        Ok(oid)
    }
}
