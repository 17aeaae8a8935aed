use crate::dictionary::dictentry::DictEntry;
use crate::dictionary::{Dictionary, Entries, Word};
use crate::error::SkkError;
use encoding_rs::Encoding;
use encoding_rs_io::DecodeReaderBytesBuilder;
use log::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

///
/// ファイルから読み込む読み取り専用の辞書。
/// 変更の監視は外側で行い、変更があればreloadを呼んでもらう。
///
#[derive(Debug)]
pub struct FileDict {
    id: String,
    file_path: PathBuf,
    encode: String,
    entries: Entries,
}

impl FileDict {
    /// file_path: 辞書ファイル
    /// encode: encoding_rsが理解できるエンコーディング名。"utf-8", "euc-jp" 等。
    pub fn new(file_path: &Path, encode: &str) -> Result<Self, SkkError> {
        let entries = load_dictionary(file_path, encode.as_bytes())?;
        let id = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.to_string_lossy().to_string());
        info!("Loaded {} entries from {:?}", entries.len(), file_path);
        Ok(FileDict {
            id,
            file_path: file_path.to_owned(),
            encode: encode.to_string(),
            entries,
        })
    }

    /// 辞書ファイル名
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

impl Dictionary for FileDict {
    fn refer(&self, yomi: &str) -> Vec<Word> {
        self.entries.get(yomi).cloned().unwrap_or_default()
    }

    fn reload(&mut self) -> Result<(), SkkError> {
        self.entries = load_dictionary(&self.file_path, self.encode.as_bytes())?;
        info!(
            "Reloaded {} entries from {:?}",
            self.entries.len(),
            self.file_path
        );
        Ok(())
    }
}

/// 辞書ファイルを読む。エンコーディングがおかしい行や形式が壊れている行は無視する。
pub(in crate::dictionary) fn load_dictionary(
    file_path: &Path,
    encode: &[u8],
) -> Result<Entries, SkkError> {
    let enc = Encoding::for_label_no_replacement(encode).ok_or_else(|| {
        SkkError::EncodingError(format!(
            "Unknown encoding {}",
            String::from_utf8_lossy(encode)
        ))
    })?;
    let dict_file = File::open(file_path)?;
    let decoder = DecodeReaderBytesBuilder::new()
        .encoding(Some(enc))
        .build(dict_file);
    let reader = BufReader::new(decoder);
    let mut entries = Entries::new();

    for line in reader.lines() {
        match line {
            Ok(line) => {
                if line.is_empty() || line.starts_with(';') {
                    continue;
                }
                match DictEntry::from_skkjisyo_line(&line) {
                    Ok(parsed) => {
                        if !parsed.words.is_empty() {
                            entries.entry(parsed.midashi).or_insert(parsed.words);
                        }
                    }
                    Err(_) => {
                        warn!("Dict is ill formatted. Ignored line {}", &line);
                    }
                }
            }
            Err(_) => {
                warn!("Dict is ill encoded. Ignored one line.");
            }
        }
    }
    Ok(entries)
}
