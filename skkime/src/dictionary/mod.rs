pub mod dict_store;
pub(crate) mod dictentry;
mod dictionary_parser;
pub mod file_dict;
pub mod memory_dict;
pub mod remote_dict;
pub(crate) mod save_worker;
pub mod user_dict;

use crate::dictionary::dictentry::DictEntry;
use crate::error::SkkError;
use file_dict::FileDict;
use log::*;
use memory_dict::MemoryDict;
use remote_dict::RemoteDict;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// 見出し→候補列。候補列は新しく使ったものが先頭。
pub type Entries = BTreeMap<String, Vec<Word>>;

/// 変換候補
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Word {
    pub word: String,
    pub annotation: Option<String>,
}

impl Word {
    pub fn new(word: &str, annotation: Option<&str>) -> Self {
        Word {
            word: word.to_string(),
            annotation: annotation.map(|a| a.to_string()),
        }
    }

    /// 候補リスト内での重複判定。注釈は見ない。
    pub fn same_word(&self, other: &Word) -> bool {
        self.word == other.word
    }
}

impl Display for Word {
    /// "候補;注釈" の形。区切り文字を含む場合は(concat)にする。
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", DictEntry::escape_dictionary_string(&self.word))?;
        if let Some(annotation) = &self.annotation {
            write!(f, ";{}", DictEntry::escape_dictionary_string(annotation))?;
        }
        Ok(())
    }
}

pub trait Dictionary {
    /// 見出しに完全一致する候補を辞書の順で返す。
    fn refer(&self, yomi: &str) -> Vec<Word>;

    /// 元になっているデータを読み直す。
    fn reload(&mut self) -> Result<(), SkkError> {
        Ok(())
    }

    fn is_read_only(&self) -> bool {
        true
    }
}

// 種類は閉じているのでdyn Traitではなくenumでラップする。
#[derive(Debug)]
pub enum DictionaryType {
    Memory(MemoryDict),
    File(FileDict),
    Remote(RemoteDict),
}

impl DictionaryType {
    pub fn refer(&self, yomi: &str) -> Vec<Word> {
        match self {
            DictionaryType::Memory(dict) => dict.refer(yomi),
            DictionaryType::File(dict) => dict.refer(yomi),
            DictionaryType::Remote(dict) => dict.refer(yomi),
        }
    }

    pub fn reload(&mut self) -> Result<(), SkkError> {
        match self {
            DictionaryType::Memory(dict) => dict.reload(),
            DictionaryType::File(dict) => dict.reload(),
            DictionaryType::Remote(dict) => dict.reload(),
        }
    }

    pub fn is_read_only(&self) -> bool {
        match self {
            DictionaryType::Memory(dict) => dict.is_read_only(),
            DictionaryType::File(dict) => dict.is_read_only(),
            DictionaryType::Remote(dict) => dict.is_read_only(),
        }
    }

    /// 設定から差し替えや削除をするための識別子。ファイル辞書以外は持たない。
    pub fn id(&self) -> Option<&str> {
        match self {
            DictionaryType::File(dict) => Some(dict.id()),
            _ => None,
        }
    }
}

///
/// 候補列を先に来たもの優先で連結する。
/// 既に同じ表記の候補があれば後から来たものは捨てる。注釈は先のものが残る。
///
pub(crate) fn merge_words<I>(sources: I) -> Vec<Word>
where
    I: IntoIterator<Item = Vec<Word>>,
{
    let mut result: Vec<Word> = vec![];
    for words in sources {
        for word in words {
            if !result.iter().any(|found| found.same_word(&word)) {
                result.push(word);
            }
        }
    }
    trace!("Merged {} candidates", result.len());
    result
}
