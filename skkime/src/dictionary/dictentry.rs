use crate::dictionary::dictionary_parser::{entry, DictEntryPrototype, WordPrototype};
use crate::dictionary::{Entries, Word};
use crate::error::SkkError;
use anyhow::bail;
use log::*;
use nom::Finish;
use regex::Regex;
use std::fmt::{Display, Formatter};

/// SKK辞書の一行分。見出しと候補の並び。
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DictEntry {
    pub(in crate::dictionary) midashi: String,
    pub(in crate::dictionary) words: Vec<Word>,
}

impl DictEntry {
    pub(in crate::dictionary) fn new(midashi: &str, words: Vec<Word>) -> Self {
        Self {
            midashi: midashi.to_string(),
            words,
        }
    }

    pub(crate) fn from_skkjisyo_line(line: &str) -> Result<Self, SkkError> {
        let parsed = entry(line).finish();
        if let Ok((_, dict_entry_prototype)) = parsed {
            Ok(DictEntry::from_dict_entry_prototype(dict_entry_prototype))
        } else {
            Err(SkkError::ParseError(format!("failed to parse {}", line)))
        }
    }

    fn from_dict_entry_prototype(dict_entry_prototype: DictEntryPrototype) -> Self {
        let midashi = DictEntry::process_lisp_fun(dict_entry_prototype.midashi);
        let words = dict_entry_prototype
            .candidates
            .iter()
            .map(DictEntry::word_from_prototype)
            .collect();
        Self { midashi, words }
    }

    fn word_from_prototype(prototype: &WordPrototype) -> Word {
        Word {
            word: DictEntry::process_lisp_fun(prototype.kouho),
            annotation: prototype.annotation.map(DictEntry::process_lisp_fun),
        }
    }

    ///
    /// 互換性のためLisp関数を適用する。
    /// 入れ子ではない単項concatのみ、さらに旧辞書に含まれていたoctal形式のみ対応する。
    /// See https://www.gnu.org/software/emacs/manual/html_node/elisp/General-Escape-Syntax.html
    ///
    /// なんらかの理由で変換できなかった場合、元の文字列のまま返す。
    ///
    pub(crate) fn process_lisp_fun(entry: &str) -> String {
        match DictEntry::process_lisp_fun_inner(entry) {
            Ok(result) => result,
            Err(e) => {
                debug!("Leaving {} as is: {}", entry, e);
                entry.to_owned()
            }
        }
    }

    fn process_lisp_fun_inner(entry: &str) -> anyhow::Result<String> {
        lazy_static! {
            static ref CONCAT_REGEX: Regex = Regex::new(r#"^\(concat\s+"(.*)"\s*\)$"#).unwrap();
        }
        let body = match CONCAT_REGEX.captures(entry) {
            Some(captures) => captures.get(1).map_or("", |body| body.as_str()).to_owned(),
            None => return Ok(entry.to_owned()),
        };
        if body.is_empty() {
            bail!("empty concat");
        }

        let mut result = String::new();
        let mut chars = body.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '\\' {
                result.push(c);
                continue;
            }
            let mut octal = String::new();
            while octal.len() < 3 {
                match chars.peek() {
                    Some(digit @ '0'..='7') => {
                        octal.push(*digit);
                        chars.next();
                    }
                    _ => break,
                }
            }
            if octal.is_empty() {
                match chars.next() {
                    Some(escaped) => result.push(escaped),
                    None => bail!("dangling backslash"),
                }
                continue;
            }
            let code = u32::from_str_radix(&octal, 8)?;
            match char::from_u32(code) {
                Some(decoded) => result.push(decoded),
                None => bail!("\\{} is not a character", octal),
            }
        }
        Ok(result)
    }

    ///
    /// 辞書の区切り文字やバックスラッシュを含む場合は(concat)で囲う。
    /// "(concat"で始まる単語もそのまま書くと読み込み時に展開されるので囲う。
    ///
    pub(crate) fn escape_dictionary_string(entry: &str) -> String {
        if entry.contains(|c: char| matches!(c, ';' | '/' | '\\')) || entry.starts_with("(concat") {
            let replacing_string = entry
                .replace('\\', "\\\\")
                .replace('"', "\\\"")
                .replace('/', "\\057")
                .replace(';', "\\073");
            return format!(r#"(concat "{}")"#, replacing_string);
        }
        entry.to_owned()
    }
}

impl Display for DictEntry {
    ///
    /// skk辞書内の一行
    ///
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} /", DictEntry::escape_dictionary_string(&self.midashi))?;
        for word in &self.words {
            write!(f, "{}/", word)?;
        }
        Ok(())
    }
}

///
/// SKK辞書形式の文字列から見出し→候補の表を作る。
/// 読めない行はwarnを出して無視する。同じ見出しが複数回出てきたら最初の行を使う。
///
pub(crate) fn parse_entries(source: &str) -> Entries {
    let mut entries = Entries::new();
    for line in source.lines() {
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        match DictEntry::from_skkjisyo_line(line) {
            Ok(parsed) => {
                if parsed.words.is_empty() {
                    continue;
                }
                entries.entry(parsed.midashi).or_insert(parsed.words);
            }
            Err(_) => {
                warn!("Dict is ill formatted. Ignored line {}", line);
            }
        }
    }
    entries
}

/// 見出しごとに一行、改行区切りで書き出す。候補のない見出しは書かない。
pub(crate) fn serialize_entries(entries: &Entries) -> String {
    entries
        .iter()
        .filter(|(_, words)| !words.is_empty())
        .map(|(midashi, words)| DictEntry::new(midashi, words.to_owned()).to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
