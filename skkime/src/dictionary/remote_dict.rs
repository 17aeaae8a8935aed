use crate::dictionary::dictentry::DictEntry;
use crate::dictionary::{Dictionary, Word};
use crate::error::SkkError;
use log::*;
use std::fmt::{Debug, Formatter};

///
/// skkservへの問い合わせ。接続やエンコーディングの扱いは実装側が持つ。
///
/// 見出しを送り、サーバーの応答一行をそのまま返す。
/// "1/愛/相/\n" が見つかった場合、"4あい\n" が見つからなかった場合の応答。
///
pub trait SkkServClient: Send + Sync {
    fn refer(&self, yomi: &str) -> Result<String, SkkError>;
}

/// skkservを辞書として使う
pub struct RemoteDict {
    client: Box<dyn SkkServClient>,
}

impl Debug for RemoteDict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteDict").finish_non_exhaustive()
    }
}

impl RemoteDict {
    pub fn new(client: Box<dyn SkkServClient>) -> Self {
        RemoteDict { client }
    }

    fn parse_response(yomi: &str, response: &str) -> Result<Vec<Word>, SkkError> {
        let response = response.trim_end_matches(&['\n', '\r'][..]);
        match response.chars().next() {
            Some('1') => {
                let line = format!("{} {}", yomi, &response[1..]);
                Ok(DictEntry::from_skkjisyo_line(&line)?.words)
            }
            Some('4') => Ok(vec![]),
            _ => Err(SkkError::RemoteError(format!(
                "Unexpected response: {}",
                response
            ))),
        }
    }
}

impl Dictionary for RemoteDict {
    fn refer(&self, yomi: &str) -> Vec<Word> {
        let result = self
            .client
            .refer(yomi)
            .and_then(|response| RemoteDict::parse_response(yomi, &response));
        match result {
            Ok(words) => words,
            Err(e) => {
                warn!("skkserv lookup for {} failed: {}", yomi, e);
                vec![]
            }
        }
    }
}
