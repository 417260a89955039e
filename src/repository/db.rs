use std::{
    fs::{self, File},
    io::{self, Read, Write},
    path::PathBuf,
};

use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};
use rand::distributions::{Alphanumeric, DistString};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::oid::Oid;

use super::object::{self, Header, Object};

/// Shard path for a hex digest: two-character directory plus the rest.
///
/// The split is total for any string of at least two characters; digest
/// length and hex-ness are validated where untrusted text becomes an `Oid`.
/// Callers outside this module go through [`Db::object_path`], which only
/// accepts a parsed id.
fn shard(hex_digest: &str) -> PathBuf {
    let (group, rest) = hex_digest.split_at(2);
    PathBuf::from(group).join(rest)
}

/// Loose-object database rooted at the store directory.
///
/// One zlib-compressed canonical object per file, at
/// `objects/<2 hex chars>/<38 hex chars>`. Objects are immutable once
/// written; a digest names its bytes forever.
pub struct Db {
    root: PathBuf,
}

impl Db {
    pub fn new(db_path: PathBuf) -> Self {
        Self { root: db_path }
    }

    fn objects_path(&self) -> PathBuf {
        self.root.join("objects")
    }

    /// Absolute path an object is stored at.
    pub fn object_path(&self, oid: &Oid) -> PathBuf {
        self.objects_path().join(shard(&oid.to_hex()))
    }

    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(self.objects_path())?;
        fs::create_dir_all(self.root.join("refs"))?;
        Ok(())
    }

    /// Frame, hash, and persist an object, returning its id.
    pub fn store_object(&self, object: &impl Object) -> Result<Oid> {
        let content = object::encode(object.kind(), &object.to_bytes());
        let oid = Oid::hash(&content);
        self.write_object(&oid, &content)?;
        Ok(oid)
    }

    /// The id an object would be stored under, without writing anything.
    pub fn hash_object(object: &impl Object) -> Oid {
        Oid::hash(&object::encode(object.kind(), &object.to_bytes()))
    }

    /// Compress and write canonical bytes at the sharded path.
    ///
    /// Idempotent per digest: identical digests imply identical bytes, so an
    /// existing file is left untouched. New content goes through a temp file
    /// and a rename, never a partial object at the final path.
    pub fn write_object(&self, oid: &Oid, content: &[u8]) -> Result<()> {
        let hex = oid.to_hex();
        let (group, rest) = hex.split_at(2);
        let group_path = self.objects_path().join(group);
        let object_path = group_path.join(rest);

        if let Ok(true) = fs::exists(&object_path) {
            trace!(%oid, "object already stored");
            return Ok(());
        }

        fs::create_dir_all(&group_path)?;

        let temp_path = group_path.join(generate_temp_name());
        let file = File::create_new(&temp_path)?;

        let mut encoder = ZlibEncoder::new(file, Compression::default());
        encoder.write_all(content)?;
        encoder.finish()?;

        fs::rename(&temp_path, &object_path)?;
        debug!(%oid, path = %object_path.display(), "wrote object");

        Ok(())
    }

    /// Read and inflate an object's canonical bytes.
    pub fn read_object(&self, oid: &Oid) -> Result<Vec<u8>> {
        let object_path = self.object_path(oid);

        let file = match File::open(&object_path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::ObjectNotFound(*oid))
            }
            Err(e) => return Err(e.into()),
        };

        let mut decoder = ZlibDecoder::new(file);
        let mut content = Vec::new();
        decoder.read_to_end(&mut content)?;
        trace!(%oid, bytes = content.len(), "read object");

        Ok(content)
    }

    /// Read an object and strip its framing.
    pub fn load_object(&self, oid: &Oid) -> Result<(Header, Vec<u8>)> {
        let content = self.read_object(oid)?;
        let (header, payload) = object::decode(&content)?;
        Ok((header, payload.to_vec()))
    }
}

fn generate_temp_name() -> String {
    let suffix = Alphanumeric.sample_string(&mut rand::thread_rng(), 6);
    format!("tmp_obj_{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::object::{blob::Blob, ObjectKind};

    fn scratch_db() -> (tempfile::TempDir, Db) {
        let dir = tempfile::tempdir().unwrap();
        let db = Db::new(dir.path().to_path_buf());
        db.init().unwrap();
        (dir, db)
    }

    #[test]
    fn shard_splits_after_two_characters() {
        assert_eq!(shard("abcdef"), PathBuf::from("ab").join("cdef"));
        assert_eq!(
            PathBuf::from("objects").join(shard("abcdef")),
            PathBuf::from("objects/ab/cdef")
        );
    }

    #[test]
    fn object_path_is_rooted_in_objects() {
        let db = Db::new(PathBuf::from(".git"));
        let oid = Oid::from_hex("95d09f2b10159347eece71399a7e2e907ea3df4f").unwrap();
        assert_eq!(
            db.object_path(&oid),
            PathBuf::from(".git/objects/95/d09f2b10159347eece71399a7e2e907ea3df4f")
        );
    }

    #[test]
    fn store_lands_at_the_sharded_path() {
        let (dir, db) = scratch_db();
        let oid = db.store_object(&Blob::new(b"hello world".to_vec())).unwrap();

        assert_eq!(oid.to_hex(), "95d09f2b10159347eece71399a7e2e907ea3df4f");
        let expected = dir
            .path()
            .join("objects")
            .join("95")
            .join("d09f2b10159347eece71399a7e2e907ea3df4f");
        assert!(expected.is_file());
    }

    #[test]
    fn store_then_load_round_trips() {
        let (_dir, db) = scratch_db();
        let oid = db.store_object(&Blob::new(b"hello world".to_vec())).unwrap();

        let (header, payload) = db.load_object(&oid).unwrap();
        assert_eq!(header.kind, ObjectKind::Blob);
        assert_eq!(header.size, 11);
        assert_eq!(payload, b"hello world");
    }

    #[test]
    fn object_files_are_compressed() {
        let (_dir, db) = scratch_db();
        let data = vec![b'a'; 4096];
        let oid = db.store_object(&Blob::new(data)).unwrap();

        let on_disk = fs::read(db.object_path(&oid)).unwrap();
        assert!(on_disk.len() < 4096);
        assert_ne!(&on_disk[..4], b"blob");
    }

    #[test]
    fn double_store_is_idempotent() {
        let (_dir, db) = scratch_db();
        let blob = Blob::new(b"same bytes".to_vec());

        let first = db.store_object(&blob).unwrap();
        let second = db.store_object(&blob).unwrap();
        assert_eq!(first, second);

        // one object file, no leftover temp files
        let shard_dir = db.object_path(&first);
        let shard_dir = shard_dir.parent().unwrap();
        let names: Vec<_> = fs::read_dir(shard_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);

        let (_, payload) = db.load_object(&first).unwrap();
        assert_eq!(payload, b"same bytes");
    }

    #[test]
    fn hash_without_store_matches_store() {
        let (_dir, db) = scratch_db();
        let blob = Blob::new(b"hello world".to_vec());
        let dry = Db::hash_object(&blob);
        let stored = db.store_object(&blob).unwrap();
        assert_eq!(dry, stored);
    }

    #[test]
    fn missing_object_is_reported() {
        let (_dir, db) = scratch_db();
        let absent = Oid::hash(b"never stored");
        assert!(matches!(
            db.read_object(&absent),
            Err(Error::ObjectNotFound(oid)) if oid == absent
        ));
    }

    #[test]
    fn garbage_on_disk_is_an_io_error() {
        let (_dir, db) = scratch_db();
        let oid = Oid::hash(b"garbage target");
        let path = db.object_path(&oid);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"not a zlib stream").unwrap();

        assert!(matches!(db.read_object(&oid), Err(Error::Io(_))));
    }

    #[test]
    fn frameless_content_is_malformed() {
        let (_dir, db) = scratch_db();
        let oid = Oid::hash(b"frameless");
        db.write_object(&oid, b"no separator here").unwrap();

        assert!(matches!(
            db.load_object(&oid),
            Err(Error::MalformedObject(_))
        ));
    }
}
