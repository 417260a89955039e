use std::{
    fs, io,
    path::{Path, PathBuf},
};

use walkdir::WalkDir;

use crate::error::Result;

/// The checked-out directory tree that objects are built from.
pub struct Workspace {
    pub root: PathBuf,
}

impl Workspace {
    pub fn new(path: PathBuf) -> Self {
        Self { root: path }
    }

    /// Immediate children of `dir` (workspace-relative), skipping the store's
    /// own `.git` directory. Symlinks are reported, never followed. Order is
    /// whatever the OS returns; callers needing a canonical order sort for
    /// themselves.
    pub fn list_dir(&self, dir: &Path) -> Result<Vec<walkdir::DirEntry>> {
        let mut children = Vec::new();

        for entry in WalkDir::new(self.root.join(dir))
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .follow_root_links(false)
            .same_file_system(true)
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git")
        {
            children.push(entry.map_err(io::Error::from)?);
        }

        Ok(children)
    }

    /// Raw bytes of a file. `path` may be workspace-relative or absolute.
    pub fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(self.root.join(path))
    }

    /// Target of a symbolic link, as recorded in a `120000` blob.
    pub fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        fs::read_link(self.root.join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_immediate_children_without_the_store_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("nested.txt"), "n").unwrap();
        fs::create_dir_all(dir.path().join(".git").join("objects")).unwrap();

        let ws = Workspace::new(dir.path().to_path_buf());
        let mut names: Vec<_> = ws
            .list_dir(Path::new(""))
            .unwrap()
            .iter()
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();

        // only direct children, no .git, no recursion into sub
        assert_eq!(names, ["a.txt", "sub"]);
    }

    #[test]
    fn listing_a_subdirectory_is_relative_to_the_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub").join("inner.txt"), "x").unwrap();

        let ws = Workspace::new(dir.path().to_path_buf());
        let children = ws.list_dir(Path::new("sub")).unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].file_name(), "inner.txt");
    }

    #[test]
    fn read_file_joins_the_workspace_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("data.bin"), b"\x00\x01\x02").unwrap();

        let ws = Workspace::new(dir.path().to_path_buf());
        assert_eq!(ws.read_file(Path::new("data.bin")).unwrap(), b"\x00\x01\x02");
    }
}
