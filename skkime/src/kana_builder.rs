use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::*;
use sequence_trie::SequenceTrie;

use crate::error::SkkError;
use crate::form_changer::kana_form_changer::{adjust_kana_string, KanaFormChanger};
use crate::skk_modes::InputMode;

pub(crate) type Converted = String;
pub(crate) type CarryOver = Vec<char>;

const DEFAULT_RULE: &str = include_str!("../assets/rules/default/rule.toml");

#[derive(Deserialize, Debug)]
struct Rule {
    conversion: HashMap<String, (String, String)>,
}

///
/// ローマ字かな変換で確定したかな一単位。
/// 送り仮名として使われたときに辞書の見出しを作るため、ローマ字の一文字目も持つ。
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Moji {
    pub kana: String,
    pub first_romaji: String,
}

impl Moji {
    pub fn new(kana: &str, first_romaji: &str) -> Self {
        Moji {
            kana: kana.to_string(),
            first_romaji: first_romaji.to_string(),
        }
    }

    /// 撥音「ん」
    pub fn hatsuon() -> Self {
        Moji::new("ん", "n")
    }

    pub fn string(&self, input_mode: InputMode) -> String {
        adjust_kana_string(input_mode, &self.kana)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertResult {
    pub moji: Option<Moji>,
    pub remainder: String,
}

impl ConvertResult {
    fn pending(remainder: &[char]) -> Self {
        ConvertResult {
            moji: None,
            remainder: remainder.iter().collect(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct KanaBuilder {
    process_map: SequenceTrie<char, (Converted, CarryOver)>,
}

impl KanaBuilder {
    /// XDG data dirのrules/default/rule.tomlがあればそれを、なければ組み込みの変換表を使う。
    pub fn default_builder() -> Self {
        let user_rule = xdg::BaseDirectories::with_prefix("skkime")
            .ok()
            .and_then(|base_dirs| base_dirs.find_data_file("rules/default/rule.toml"));
        if let Some(filepath) = user_rule {
            match KanaBuilder::from_path(&filepath) {
                Ok(builder) => return builder,
                Err(e) => warn!("Ignoring broken rule file {:?}: {}", filepath, e),
            }
        }
        KanaBuilder::from_string(DEFAULT_RULE).unwrap_or_else(|e| {
            error!("Builtin rule is broken: {}", e);
            KanaBuilder {
                process_map: SequenceTrie::new(),
            }
        })
    }

    pub fn from_path(filepath: &Path) -> Result<Self, SkkError> {
        let mut file = File::open(filepath)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        KanaBuilder::from_string(&contents)
    }

    pub fn from_string(contents: &str) -> Result<Self, SkkError> {
        let rule = toml::from_str::<Rule>(contents)?;
        let mut process_map = SequenceTrie::new();
        for (k, (carry, conv)) in &rule.conversion {
            if k.is_empty() {
                return Err(SkkError::RuleError("Empty key in conversion rule".to_string()));
            }
            let key: Vec<char> = k.chars().collect();
            let carry_over: Vec<char> = carry.chars().collect();
            process_map.insert(&key, (conv.to_owned(), carry_over));
        }
        Ok(Self { process_map })
    }

    /// 入力済みの未確定ローマ字列に対応するかなと残りの入力
    pub(crate) fn convert(&self, unprocessed: &[char]) -> Option<&(Converted, CarryOver)> {
        self.process_map.get(unprocessed)
    }

    // 今のunprocessedから変換を続けられるか。
    // k j -> false
    // t t -> true ('っt' として続けられるため)
    pub(crate) fn can_continue(&self, unprocessed: &[char]) -> bool {
        self.process_map.get_node(unprocessed).is_some()
    }

    ///
    /// 未確定ローマ字列bufferを解釈する。
    ///
    /// - 規則に完全一致して、それより長い規則がなければかなを確定し、残す入力をremainderとする
    /// - まだ長い規則に続く可能性があれば何も確定せずbufferをそのまま残す
    /// - 続けられない場合、先頭が'n'なら「ん」を確定して残りを次の入力とする
    /// - それ以外はbufferを捨てて最後の一文字からやり直す
    /// - 一文字でも規則にない文字はそのまま一文字として確定する
    ///
    pub fn resolve(&self, buffer: &str) -> ConvertResult {
        let chars: Vec<char> = buffer.chars().map(|c| c.to_ascii_lowercase()).collect();
        if chars.is_empty() {
            return ConvertResult::pending(&chars);
        }

        if self.can_continue(&chars) {
            let is_leaf = self
                .process_map
                .get_node(&chars)
                .map_or(false, |node| node.is_leaf());
            return match self.convert(&chars) {
                Some((converted, carry_over)) if is_leaf => ConvertResult {
                    moji: Some(Moji::new(converted, &Self::first_romaji(converted, &chars))),
                    remainder: carry_over.iter().collect(),
                },
                _ => ConvertResult::pending(&chars),
            };
        }

        if chars.len() == 1 {
            let literal = chars[0].to_string();
            return ConvertResult {
                moji: Some(Moji::new(&literal, &literal)),
                remainder: "".to_string(),
            };
        }
        if chars[0] == 'n' {
            return ConvertResult {
                moji: Some(Moji::hatsuon()),
                remainder: chars[1..].iter().collect(),
            };
        }
        debug!("Dropping unconvertible romaji {:?}", &chars[..chars.len() - 1]);
        self.resolve(&chars[chars.len() - 1].to_string())
    }

    ///
    /// resolveを繰り返し、確定できるかなを全て取り出す。
    /// "n." のように一度の入力で二つ以上確定する場合がある。
    ///
    pub fn resolve_all(&self, buffer: &str) -> (Vec<Moji>, String) {
        let mut mojis = vec![];
        let mut remainder = buffer.to_string();
        loop {
            let result = self.resolve(&remainder);
            match result.moji {
                Some(moji) => {
                    mojis.push(moji);
                    remainder = result.remainder;
                    if remainder.is_empty() {
                        break;
                    }
                }
                None => {
                    remainder = result.remainder;
                    break;
                }
            }
        }
        (mojis, remainder)
    }

    fn first_romaji(converted: &str, input: &[char]) -> String {
        converted
            .chars()
            .next()
            .and_then(|c| KanaFormChanger::kana_to_okuri_prefix(&c.to_string()))
            .map(|s| s.to_string())
            .unwrap_or_else(|| input[0].to_string())
    }
}

#[cfg(test)]
impl KanaBuilder {
    pub(crate) fn test_converter() -> Self {
        let mut process_list = SequenceTrie::new();

        process_list.insert(&['a'], ("あ".to_string(), vec![]));
        process_list.insert(&['i'], ("い".to_string(), vec![]));
        process_list.insert(&['k', 'a'], ("か".to_string(), vec![]));
        process_list.insert(&['k', 'y', 'a'], ("きゃ".to_string(), vec![]));
        process_list.insert(&['n', 'a'], ("な".to_string(), vec![]));
        process_list.insert(&['n', 'n'], ("ん".to_string(), vec![]));
        process_list.insert(&['t', 'a'], ("た".to_string(), vec![]));
        process_list.insert(&['t', 't'], ("っ".to_string(), vec!['t']));
        process_list.insert(&['.'], ("。".to_string(), vec![]));

        KanaBuilder {
            process_map: process_list,
        }
    }
}
