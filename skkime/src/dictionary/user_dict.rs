use crate::config::SkkConfig;
use crate::dictionary::dict_store::{DictStore, FileStore};
use crate::dictionary::dictentry::{parse_entries, serialize_entries};
use crate::dictionary::file_dict::FileDict;
use crate::dictionary::save_worker::{SaveMessage, SaveWorker};
use crate::dictionary::{merge_words, DictionaryType, Entries, Word};
use crate::error::SkkError;
use log::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, RwLock};
use std::time::Duration;

pub const USER_DICT_FILENAME: &str = "skk-jisyo.utf8";

#[derive(Debug, Default)]
struct Tables {
    /// 非プライベートモードのユーザー辞書。変換や単語登録で更新され永続化される。
    user: Entries,
    /// プライベートモード中に変換・登録した単語だけが入る。永続化しない。
    private: Entries,
}

///
/// UserDictの本体。保存スレッドと共有する。
///
pub(crate) struct UserDictInner {
    tables: RwLock<Tables>,
    /// 有効になっている辞書。優先度が高い順。
    dicts: RwLock<Vec<DictionaryType>>,
    private_mode: AtomicBool,
    store: Box<dyn DictStore>,
    /// 自分で書き込んでいる間の変更通知は無視する
    watch_suspended: AtomicBool,
    // 読み込みと書き込みを同時にしない
    io_lock: Mutex<()>,
}

impl UserDictInner {
    pub(crate) fn load(&self) -> Result<(), SkkError> {
        let _io = self
            .io_lock
            .lock()
            .map_err(|_| SkkError::Error("User dictionary io lock poisoned".to_string()))?;
        let data = self.store.load()?;
        let source = String::from_utf8(data)
            .map_err(|e| SkkError::EncodingError(format!("User dictionary is not utf-8: {}", e)))?;
        let entries = parse_entries(&source);
        info!("Loaded {} entries from user dictionary", entries.len());
        let mut tables = self
            .tables
            .write()
            .map_err(|_| SkkError::Error("User dictionary lock poisoned".to_string()))?;
        tables.user = entries;
        Ok(())
    }

    pub(crate) fn save(&self) -> Result<(), SkkError> {
        let _io = self
            .io_lock
            .lock()
            .map_err(|_| SkkError::Error("User dictionary io lock poisoned".to_string()))?;
        let serialized = self.serialize();
        self.watch_suspended.store(true, Ordering::SeqCst);
        let result = self.store.store(serialized.as_bytes());
        self.watch_suspended.store(false, Ordering::SeqCst);
        if result.is_ok() {
            info!("Saved user dictionary");
        }
        result
    }

    fn serialize(&self) -> String {
        match self.tables.read() {
            Ok(tables) => serialize_entries(&tables.user),
            Err(_) => {
                error!("User dictionary lock poisoned. Saving nothing.");
                String::new()
            }
        }
    }
}

///
/// ユーザー辞書。単語登録対象のマイ辞書と、読み取り専用の辞書をまとめて参照する。
///
/// 参照順はプライベートモード用の表(プライベートモード中のみ)、マイ辞書、辞書リストの順。
/// マイ辞書の変更は保存スレッドに送られ、まとめて保存される。
///
pub struct UserDict {
    inner: Arc<UserDictInner>,
    worker: Option<SaveWorker>,
}

impl UserDict {
    pub fn new(
        store: Box<dyn DictStore>,
        dicts: Vec<DictionaryType>,
        private_mode: bool,
        save_interval: Duration,
    ) -> Result<Self, SkkError> {
        let inner = Arc::new(UserDictInner {
            tables: RwLock::new(Tables::default()),
            dicts: RwLock::new(dicts),
            private_mode: AtomicBool::new(private_mode),
            store,
            watch_suspended: AtomicBool::new(false),
            io_lock: Mutex::new(()),
        });
        inner.load()?;
        let worker = SaveWorker::spawn(Arc::clone(&inner), save_interval)?;
        Ok(UserDict {
            inner,
            worker: Some(worker),
        })
    }

    ///
    /// 設定からユーザー辞書を作る。
    /// 読めない辞書ファイルはwarnを出して使わない。
    ///
    pub fn from_config(config: &SkkConfig) -> Result<Self, SkkError> {
        let store = FileStore::new(&config.user_dictionary_path()?)?;
        let mut dicts = vec![];
        for setting in config.dictionaries.iter().filter(|setting| setting.enabled) {
            match FileDict::new(&setting.path, &setting.encoding) {
                Ok(dict) => dicts.push(DictionaryType::File(dict)),
                Err(e) => warn!("Ignoring dictionary {:?}: {}", setting.path, e),
            }
        }
        UserDict::new(
            Box::new(store),
            dicts,
            config.private_mode,
            config.save_interval,
        )
    }

    /// 重複した表記を除いた候補を優先度順に返す
    pub fn refer(&self, yomi: &str) -> Vec<Word> {
        let mut sources = vec![];
        match self.inner.tables.read() {
            Ok(tables) => {
                if self.is_private_mode() {
                    sources.push(tables.private.get(yomi).cloned().unwrap_or_default());
                }
                sources.push(tables.user.get(yomi).cloned().unwrap_or_default());
            }
            Err(_) => warn!("User dictionary read lock failed. Ignoring user entries."),
        }
        match self.inner.dicts.read() {
            Ok(dicts) => {
                for dict in dicts.iter() {
                    sources.push(dict.refer(yomi));
                }
            }
            Err(_) => warn!("Dictionary read lock failed. Ignoring dictionaries."),
        }
        merge_words(sources)
    }

    ///
    /// エントリを先頭に追加する。同じ表記の候補があれば取り除いてから追加する。
    ///
    /// プライベートモード中はプライベートモード用の表だけを更新し、永続化しない。
    ///
    pub fn add(&self, yomi: &str, word: Word) {
        let private_mode = self.is_private_mode();
        match self.inner.tables.write() {
            Ok(mut tables) => {
                let entries = if private_mode {
                    &mut tables.private
                } else {
                    &mut tables.user
                };
                let words = entries.entry(yomi.to_string()).or_default();
                words.retain(|found| !found.same_word(&word));
                words.insert(0, word);
            }
            Err(_) => {
                error!("User dictionary write lock failed. {} is not added.", yomi);
                return;
            }
        }
        if !private_mode {
            self.send(SaveMessage::Save);
        }
    }

    ///
    /// 今有効な表から注釈まで一致するエントリを削除する。
    ///
    /// - 非プライベート時はマイ辞書からのみ削除する。プライベートモード用の表にあっても削除しない
    /// - プライベートモード時はプライベートモード用の表からのみ削除する
    /// - 読み取り専用の辞書にだけある場合は何もしない
    ///
    /// 削除できたかどうかを返す
    ///
    pub fn delete(&self, yomi: &str, word: &Word) -> bool {
        let private_mode = self.is_private_mode();
        let deleted = match self.inner.tables.write() {
            Ok(mut tables) => {
                let entries = if private_mode {
                    &mut tables.private
                } else {
                    &mut tables.user
                };
                UserDict::remove_word(entries, yomi, word)
            }
            Err(_) => {
                error!("User dictionary write lock failed. {} is not deleted.", yomi);
                false
            }
        };
        if deleted && !private_mode {
            self.send(SaveMessage::Save);
        }
        deleted
    }

    fn remove_word(entries: &mut Entries, yomi: &str, word: &Word) -> bool {
        let Some(words) = entries.get_mut(yomi) else {
            return false;
        };
        let Some(index) = words.iter().position(|found| found == word) else {
            return false;
        };
        words.remove(index);
        if words.is_empty() {
            entries.remove(yomi);
        }
        true
    }

    pub fn is_private_mode(&self) -> bool {
        self.inner.private_mode.load(Ordering::SeqCst)
    }

    /// プライベートモードを解除したときにそれまでのエントリを削除する
    pub fn set_private_mode(&self, private_mode: bool) {
        let previous = self.inner.private_mode.swap(private_mode, Ordering::SeqCst);
        if previous && !private_mode {
            info!("Private mode is turned off");
            match self.inner.tables.write() {
                Ok(mut tables) => tables.private.clear(),
                Err(_) => error!("User dictionary write lock failed. Private entries remain."),
            }
        }
    }

    /// マイ辞書をSKK辞書形式にする
    pub fn serialize(&self) -> String {
        self.inner.serialize()
    }

    /// SKK辞書形式の文字列を読む。serializeの逆。
    pub fn parse(source: &str) -> Entries {
        parse_entries(source)
    }

    /// マイ辞書の写し
    pub fn user_entries(&self) -> Entries {
        match self.inner.tables.read() {
            Ok(tables) => tables.user.clone(),
            Err(_) => Entries::new(),
        }
    }

    /// その場で保存する。保存スレッドを待たない。
    pub fn save(&self) -> Result<(), SkkError> {
        self.inner.save()
    }

    /// 保存先から読み直してマイ辞書を置き換える。
    pub fn reload(&self) -> Result<(), SkkError> {
        self.inner.load()
    }

    ///
    /// 保存先が外部で変更されたときに呼ぶ。
    /// 自分で書き込んでいる最中の通知は無視する。
    ///
    pub fn notify_changed(&self) {
        if self.inner.watch_suspended.load(Ordering::SeqCst) {
            debug!("Ignoring change notification while saving");
            return;
        }
        info!("User dictionary is updated");
        self.send(SaveMessage::Reload);
    }

    /// 保留中の保存を今すぐ書き込み、書き込んだかどうかを返す
    pub fn flush(&self) -> bool {
        let (reply, receiver) = mpsc::channel();
        self.send(SaveMessage::Flush(reply));
        receiver.recv().unwrap_or(false)
    }

    /// 読み取り専用の辞書をidで差し替える。なければ末尾に加える。
    pub fn replace_dict(&self, dict: DictionaryType) {
        match self.inner.dicts.write() {
            Ok(mut dicts) => {
                let position = dict
                    .id()
                    .and_then(|id| dicts.iter().position(|d| d.id() == Some(id)));
                match position {
                    Some(index) => dicts[index] = dict,
                    None => dicts.push(dict),
                }
            }
            Err(_) => error!("Dictionary write lock failed. Dictionary is not replaced."),
        }
    }

    /// idの辞書を使わなくする。あったかどうかを返す
    pub fn delete_dict(&self, id: &str) -> bool {
        match self.inner.dicts.write() {
            Ok(mut dicts) => {
                let before = dicts.len();
                dicts.retain(|d| d.id() != Some(id));
                before != dicts.len()
            }
            Err(_) => false,
        }
    }

    /// 読み取り専用の辞書を全て読み直す。失敗した辞書はそれまでの内容のまま。
    pub fn reload_dicts(&self) {
        if let Ok(mut dicts) = self.inner.dicts.write() {
            for dict in dicts.iter_mut() {
                if let Err(e) = dict.reload() {
                    warn!("Failed to reload dictionary {:?}: {}", dict.id(), e);
                }
            }
        }
    }

    pub fn dict_ids(&self) -> Vec<String> {
        match self.inner.dicts.read() {
            Ok(dicts) => dicts
                .iter()
                .filter_map(|d| d.id().map(|id| id.to_string()))
                .collect(),
            Err(_) => vec![],
        }
    }

    fn send(&self, message: SaveMessage) {
        if let Some(worker) = &self.worker {
            worker.send(message);
        }
    }
}

impl Drop for UserDict {
    fn drop(&mut self) {
        // 保存スレッドを止める。保留中の保存はここで書き込まれる。
        self.worker.take();
    }
}
