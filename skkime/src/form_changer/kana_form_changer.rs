use crate::error::SkkError;
use crate::skk_modes::InputMode;
use log::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const DEFAULT_KANA_FORM: &str = include_str!("../../assets/rule/kana_form.toml");

pub(crate) struct KanaFormChanger {
    maps: KanaFormMap,
    /// max len in chars. 'う゛' -> 2
    katakana_key_maxlen: usize,
    jisx0201_key_maxlen: usize,
}

#[derive(Deserialize, Default)]
struct KanaFormMap {
    #[serde(default)]
    katakana: BTreeMap<String, String>,
    #[serde(default)]
    jisx0201: BTreeMap<String, String>,
}

/// 送り仮名の先頭のかなと辞書の送り仮名キー(子音)の対応。
/// "じ"はz、"っ"はtで収録されている辞書に合わせる。
const OKURI_PREFIX_ROWS: &[(&str, &str)] = &[
    ("a", "あ"),
    ("i", "い"),
    ("u", "う"),
    ("e", "え"),
    ("o", "お"),
    ("k", "かきくけこ"),
    ("s", "さしすせそ"),
    ("t", "たちつてとっ"),
    ("n", "なにぬねのん"),
    ("h", "はひふへほ"),
    ("m", "まみむめも"),
    ("y", "やゆよ"),
    ("r", "らりるれろ"),
    ("w", "わを"),
    ("g", "がぎぐげご"),
    ("z", "ざじずぜぞ"),
    ("d", "だぢづでど"),
    ("b", "ばびぶべぼ"),
    ("p", "ぱぴぷぺぽ"),
    ("x", "ぁぃぅぇぉゃゅょゎ"),
];

lazy_static! {
    static ref KANA_FORM_CHANGER: KanaFormChanger = KanaFormChanger::default_kanaform_changer();
}

impl KanaFormChanger {
    /// XDG data dirに置換表があればそれを、なければ組み込みの表を使う。
    pub fn default_kanaform_changer() -> Self {
        let user_table = xdg::BaseDirectories::with_prefix("skkime")
            .ok()
            .and_then(|base_dirs| base_dirs.find_data_file("rule/kana_form.toml"));
        if let Some(filepath) = user_table {
            match KanaFormChanger::from_path(&filepath) {
                Ok(changer) => return changer,
                Err(e) => warn!("Ignoring broken kana form file {:?}: {}", filepath, e),
            }
        }
        KanaFormChanger::from_string(DEFAULT_KANA_FORM).unwrap_or_else(|e| {
            error!("Builtin kana form table is broken: {}", e);
            KanaFormChanger::from_map(KanaFormMap::default())
        })
    }

    pub fn from_path(filepath: &Path) -> Result<Self, SkkError> {
        let mut file = File::open(filepath)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        KanaFormChanger::from_string(&contents)
    }

    fn from_string(contents: &str) -> Result<Self, SkkError> {
        let kana_form_map: KanaFormMap = toml::from_str(contents)?;
        Ok(KanaFormChanger::from_map(kana_form_map))
    }

    fn from_map(kana_form_map: KanaFormMap) -> Self {
        let katakana_key_maxlen = kana_form_map
            .katakana
            .keys()
            .map(|x| x.chars().count())
            .max()
            .unwrap_or(1);
        let jisx0201_key_maxlen = kana_form_map
            .jisx0201
            .keys()
            .map(|x| x.chars().count())
            .max()
            .unwrap_or(1);
        KanaFormChanger {
            maps: kana_form_map,
            katakana_key_maxlen,
            jisx0201_key_maxlen,
        }
    }

    ///
    ///  kanaに対してinput modeに合わせた置換をする。
    ///  'う゛' -> 'ヴ', 'ぽ' -> 'ﾎﾟ' 等文字数も変わる可能性がある。
    ///  かなモード以外ではそのまま返す。
    ///
    pub fn adjust_kana_string(&self, input_mode: InputMode, kana: &str) -> String {
        let (replace_map, maxlen) = match input_mode {
            InputMode::Katakana => (&self.maps.katakana, self.katakana_key_maxlen),
            InputMode::HankakuKatakana => (&self.maps.jisx0201, self.jisx0201_key_maxlen),
            _ => return kana.to_string(),
        };
        let chars: Vec<char> = kana.chars().collect();
        let mut result = String::new();
        let mut pos = 0;
        // Greedy match from the longest key.
        'outer: while pos < chars.len() {
            for len in (1..=maxlen.min(chars.len() - pos)).rev() {
                let key: String = chars[pos..pos + len].iter().collect();
                if let Some(replace) = replace_map.get(&key) {
                    result.push_str(replace);
                    pos += len;
                    continue 'outer;
                }
            }
            result.push(chars[pos]);
            pos += 1;
        }
        result
    }

    /// ひらがな一文字から送り仮名キーのアルファベットを返す。
    pub(crate) fn kana_to_okuri_prefix(kana: &str) -> Option<&'static str> {
        let mut chars = kana.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        OKURI_PREFIX_ROWS
            .iter()
            .find(|(_, row)| row.contains(c))
            .map(|(prefix, _)| *prefix)
    }
}

/// 組み込み(またはXDG)の置換表でinput modeに合わせた置換をする。
pub(crate) fn adjust_kana_string(input_mode: InputMode, kana: &str) -> String {
    KANA_FORM_CHANGER.adjust_kana_string(input_mode, kana)
}

#[cfg(test)]
impl KanaFormChanger {
    pub fn test_kana_form_changer() -> Self {
        KanaFormChanger::from_string(
            "\
[katakana]
\"あ\" = \"ア\"
\"ぁ\" = \"ァ\"
\"い\" = \"イ\"
\"き\" = \"キ\"
\"ん\" = \"ン\"
\"う゛\" = \"ヴ\"
\"ぐ\" = \"グ\"
\"っ\" = \"ッ\"
[jisx0201]
\"あ\" = \"ｱ\"
",
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanity_check() {
        let changer = KanaFormChanger::test_kana_form_changer();
        assert_eq!(changer.maps.jisx0201.get("あ").unwrap(), "ｱ");
        assert_eq!(changer.katakana_key_maxlen, 2);
    }

    #[test]
    fn adjust_kana_string_greedy() {
        let changer = KanaFormChanger::test_kana_form_changer();
        let actual = changer.adjust_kana_string(InputMode::Katakana, "う゛ぁいきんぐ");
        assert_eq!("ヴァイキング", actual);
    }

    #[test]
    fn adjust_kana_string_small_tu() {
        let changer = KanaFormChanger::test_kana_form_changer();
        let actual = changer.adjust_kana_string(InputMode::Hiragana, "っ");
        assert_eq!("っ", actual);
    }

    #[test]
    fn builtin_table() {
        assert_eq!("カタカナ", adjust_kana_string(InputMode::Katakana, "かたかな"));
        assert_eq!("ｶﾞｯｺｳ", adjust_kana_string(InputMode::HankakuKatakana, "がっこう"));
        assert_eq!("ひらがな", adjust_kana_string(InputMode::Hiragana, "ひらがな"));
    }

    #[test]
    fn broken_table() {
        assert!(KanaFormChanger::from_string("[katakana\n").is_err());
    }

    #[test]
    fn kana_to_okuri_prefix() {
        assert_eq!(Some("r"), KanaFormChanger::kana_to_okuri_prefix("り"));
        assert_eq!(Some("t"), KanaFormChanger::kana_to_okuri_prefix("っ"));
        assert_eq!(Some("z"), KanaFormChanger::kana_to_okuri_prefix("じ"));
        assert_eq!(None, KanaFormChanger::kana_to_okuri_prefix("ア"));
    }
}
