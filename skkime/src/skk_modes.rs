use crate::SkkError;
use std::fmt::Display;
use std::str::FromStr;

/// SKKの入力モード
/// DDSKK 16.2 マニュアル 4.2 に依る
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Deserialize, Serialize, Display)]
pub enum InputMode {
    // かなモード
    Hiragana,
    // カナモード
    Katakana,
    // JIS X 0201 カナ、 いわゆる半角カナ
    HankakuKatakana,
    // 全英モード
    Zenkaku,
    // アスキーモード。abbrev入力中もこのモードになる
    Ascii,
}

impl Default for InputMode {
    fn default() -> Self {
        InputMode::Hiragana
    }
}

impl FromStr for InputMode {
    type Err = SkkError;

    fn from_str(s: &str) -> Result<InputMode, SkkError> {
        match s {
            "Hiragana" => Ok(InputMode::Hiragana),
            "Katakana" => Ok(InputMode::Katakana),
            "HankakuKatakana" => Ok(InputMode::HankakuKatakana),
            "Zenkaku" => Ok(InputMode::Zenkaku),
            "Ascii" => Ok(InputMode::Ascii),

            s => Err(SkkError::ParseError(s.to_string())),
        }
    }
}

impl InputMode {
    /// ローマ字かな変換を行うモードか
    pub fn has_rom2kana_conversion(&self) -> bool {
        matches!(
            self,
            InputMode::Hiragana | InputMode::Katakana | InputMode::HankakuKatakana
        )
    }
}
