use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use dagwalk_types::Cid;

use crate::context::FetchContext;
use crate::error::{StoreError, StoreResult};
use crate::traits::BlockStore;

/// Directory-backed block store.
///
/// Each block is a file named by its identifier directly under the root
/// directory. Identifiers are ASCII alphanumeric, so they are always safe
/// file names. Writes land in a temporary file first and are renamed into
/// place, so readers never observe a partial block.
#[derive(Debug, Clone)]
pub struct FsBlockStore {
    root: PathBuf,
}

impl FsBlockStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl AsRef<Path>) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn block_path(&self, cid: &Cid) -> PathBuf {
        self.root.join(cid.as_str())
    }

    /// All identifiers present in the store, sorted.
    ///
    /// Files whose names are not valid identifiers are skipped.
    pub fn list(&self) -> StoreResult<Vec<Cid>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            match name.to_str().map(Cid::parse) {
                Some(Ok(cid)) => ids.push(cid),
                _ => warn!("skipping non-block file {:?} in {:?}", name, self.root),
            }
        }
        ids.sort();
        Ok(ids)
    }
}

impl BlockStore for FsBlockStore {
    fn has(&self, ctx: &FetchContext, cid: &Cid) -> StoreResult<bool> {
        ctx.check()?;
        match fs::metadata(self.block_path(cid)) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn get(&self, ctx: &FetchContext, cid: &Cid) -> StoreResult<Vec<u8>> {
        ctx.check()?;
        match fs::read(self.block_path(cid)) {
            Ok(data) => {
                debug!(cid = %cid.short(), size = data.len(), "read block from disk");
                Ok(data)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound(cid.clone())),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, ctx: &FetchContext, data: &[u8]) -> StoreResult<Cid> {
        ctx.check()?;
        let cid = Cid::for_block(data);
        let path = self.block_path(&cid);
        if path.is_file() {
            return Ok(cid);
        }
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        debug!(cid = %cid.short(), size = data.len(), "wrote block to disk");
        Ok(cid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, FsBlockStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlockStore::open(dir.path().join("blocks")).unwrap();
        (dir, store)
    }

    #[test]
    fn open_creates_directory() {
        let (dir, store) = temp_store();
        assert!(dir.path().join("blocks").is_dir());
        assert_eq!(store.root(), dir.path().join("blocks"));
    }

    #[test]
    fn put_get_has() {
        let (_dir, store) = temp_store();
        let ctx = FetchContext::new();
        let block = r#"["allo","ça","va"]"#.as_bytes();
        let cid = store.put(&ctx, block).unwrap();
        assert!(store.has(&ctx, &cid).unwrap());
        assert_eq!(store.get(&ctx, &cid).unwrap(), block.to_vec());
        assert_eq!(cid.verify(&store.get(&ctx, &cid).unwrap()), Some(true));
    }

    #[test]
    fn put_twice_keeps_one_file() {
        let (_dir, store) = temp_store();
        let ctx = FetchContext::new();
        store.put(&ctx, b"1").unwrap();
        store.put(&ctx, b"1").unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn missing_block() {
        let (_dir, store) = temp_store();
        let ctx = FetchContext::new();
        let cid = Cid::parse("bafy404").unwrap();
        assert!(!store.has(&ctx, &cid).unwrap());
        assert!(matches!(store.get(&ctx, &cid), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn list_skips_foreign_files() {
        let (_dir, store) = temp_store();
        let ctx = FetchContext::new();
        let cid = store.put(&ctx, b"{}").unwrap();
        fs::write(store.root().join("notes.txt"), b"not a block").unwrap();
        fs::create_dir(store.root().join("subdir")).unwrap();
        assert_eq!(store.list().unwrap(), vec![cid]);
    }

    #[test]
    fn reopen_sees_existing_blocks() {
        let (dir, store) = temp_store();
        let ctx = FetchContext::new();
        let cid = store.put(&ctx, b"persisted").unwrap();
        drop(store);
        let reopened = FsBlockStore::open(dir.path().join("blocks")).unwrap();
        assert_eq!(reopened.get(&ctx, &cid).unwrap(), b"persisted".to_vec());
    }

    #[test]
    fn cancelled_context() {
        let (_dir, store) = temp_store();
        let ctx = FetchContext::new();
        ctx.cancel();
        assert!(matches!(
            store.has(&ctx, &Cid::parse("bafy1").unwrap()),
            Err(StoreError::Cancelled(_))
        ));
    }
}
