use crate::error::SkkError;
use log::*;
use std::fs::{copy, create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

///
/// ユーザー辞書の保存先。
/// UserDictは起動時と再読み込み時にload、保存時にstoreを呼ぶ。
///
pub trait DictStore: Send + Sync {
    fn load(&self) -> Result<Vec<u8>, SkkError>;

    fn store(&self, data: &[u8]) -> Result<(), SkkError>;
}

/// 保存先を外から覗けるように共有する場合
impl<T: DictStore> DictStore for Arc<T> {
    fn load(&self) -> Result<Vec<u8>, SkkError> {
        self.as_ref().load()
    }

    fn store(&self, data: &[u8]) -> Result<(), SkkError> {
        self.as_ref().store(data)
    }
}

/// ファイルに保存する。
#[derive(Debug)]
pub struct FileStore {
    file_path: PathBuf,
}

impl FileStore {
    /// ファイルがなければ空で作る
    pub fn new(file_path: &Path) -> Result<Self, SkkError> {
        if !file_path.exists() {
            info!("Creating user dictionary {:?}", file_path);
            if let Some(parent) = file_path.parent() {
                create_dir_all(parent)?;
            }
            File::create(file_path)?;
        }
        Ok(FileStore {
            file_path: file_path.to_owned(),
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn backup_path(&self) -> PathBuf {
        let mut backup = self.file_path.clone().into_os_string();
        backup.push(".BAK");
        PathBuf::from(backup)
    }
}

impl DictStore for FileStore {
    fn load(&self) -> Result<Vec<u8>, SkkError> {
        let mut file = File::open(&self.file_path)?;
        let mut data = vec![];
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// {file_path}.BAK に退避してからfile_pathに保存する
    fn store(&self, data: &[u8]) -> Result<(), SkkError> {
        if self.file_path.exists() {
            copy(&self.file_path, self.backup_path())?;
        }
        let mut file = File::create(&self.file_path)?;
        file.write_all(data)?;
        file.flush()?;
        Ok(())
    }
}

/// メモリ上に保存する。テストや保存しない設定用。
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<Vec<u8>>,
    store_count: Mutex<usize>,
}

impl MemoryStore {
    pub fn new(data: &[u8]) -> Self {
        MemoryStore {
            data: Mutex::new(data.to_vec()),
            store_count: Mutex::new(0),
        }
    }

    /// storeが呼ばれた回数
    pub fn store_count(&self) -> usize {
        self.store_count.lock().map(|count| *count).unwrap_or(0)
    }

    /// 外部からの書き換えを模す
    pub fn replace(&self, data: &[u8]) {
        if let Ok(mut current) = self.data.lock() {
            *current = data.to_vec();
        }
    }
}

impl DictStore for MemoryStore {
    fn load(&self) -> Result<Vec<u8>, SkkError> {
        self.data
            .lock()
            .map(|data| data.clone())
            .map_err(|_| SkkError::Error("Memory store lock poisoned".to_string()))
    }

    fn store(&self, data: &[u8]) -> Result<(), SkkError> {
        let mut current = self
            .data
            .lock()
            .map_err(|_| SkkError::Error("Memory store lock poisoned".to_string()))?;
        *current = data.to_vec();
        if let Ok(mut count) = self.store_count.lock() {
            *count += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn file_store_creates_and_backs_up() -> Result<(), SkkError> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("sub").join("skk-jisyo.utf8");
        let store = FileStore::new(&path)?;
        assert!(path.exists());
        assert!(store.load()?.is_empty());

        store.store("あい /愛/".as_bytes())?;
        store.store("あい /相/".as_bytes())?;
        assert_eq!("あい /相/".as_bytes(), store.load()?.as_slice());
        let backup = std::fs::read(dir.path().join("sub").join("skk-jisyo.utf8.BAK"))?;
        assert_eq!("あい /愛/".as_bytes(), backup.as_slice());
        Ok(())
    }

    #[test]
    fn memory_store() -> Result<(), SkkError> {
        let store = MemoryStore::new(b"abc");
        assert_eq!(b"abc".to_vec(), store.load()?);
        store.store(b"def")?;
        assert_eq!(b"def".to_vec(), store.load()?);
        assert_eq!(1, store.store_count());
        Ok(())
    }
}
