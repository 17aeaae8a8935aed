use crate::dictionary::Word;
use crate::skk_modes::InputMode;
use crate::state::composing::ComposingState;
use crate::state::selecting::SelectingState;
use crate::state::special::SpecialState;

/// 主な入力状態
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum InputMethodState {
    /// 何も入力していない状態
    #[default]
    Normal,
    /// 未確定入力中。▽の有無はComposingState.is_shiftによる
    Composing(ComposingState),
    /// 変換候補選択中。▼
    Selecting(SelectingState),
}

/// ホストに表示してもらう未確定文字列とカーソル位置
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkedText {
    pub text: String,
    /// 文字数で数えたカーソル位置。末尾のときはNone
    pub cursor: Option<usize>,
}

///
/// IMEの状態一式。キー入力ごとに新しい値を作り、古い値は変更しない。
///
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ImeState {
    pub input_mode: InputMode,
    pub input_method: InputMethodState,
    /// 辞書登録、削除確認。input_methodの上に重なる
    pub special_state: Option<SpecialState>,
    /// 選択中の変換候補。選択中でなければ空
    pub candidates: Vec<Word>,
}

impl ImeState {
    pub fn new(input_mode: InputMode) -> Self {
        ImeState {
            input_mode,
            ..Default::default()
        }
    }

    pub fn display_text(&self) -> MarkedText {
        let mut marked_text = String::new();
        // 辞書登録中のカーソルより後ろの文字列
        let mut register_text_suffix = String::new();
        let mut cursor: Option<usize> = None;

        match &self.special_state {
            Some(SpecialState::Register(register)) => {
                let mode = register.prev.mode;
                let composing = &register.prev.composing;
                let mut yomi = composing.text.concat();
                if composing.okuri.is_some() {
                    yomi.push('*');
                    yomi.push_str(&composing.okuri_string(mode));
                }
                marked_text = format!("[登録：{}]", yomi);
                match register.cursor {
                    Some(register_cursor) => {
                        cursor = Some(marked_text.chars().count() + register_cursor);
                        marked_text.extend(register.text.chars().take(register_cursor));
                        register_text_suffix = register.text.chars().skip(register_cursor).collect();
                    }
                    None => marked_text.push_str(&register.text),
                }
            }
            Some(SpecialState::Unregister(unregister)) => {
                marked_text = format!(
                    "{} /{}/ を削除します(yes/no){}",
                    unregister.prev.yomi,
                    unregister.prev.selected().word,
                    unregister.text
                );
            }
            None => {}
        }

        match &self.input_method {
            InputMethodState::Normal => marked_text.push_str(&register_text_suffix),
            InputMethodState::Composing(composing) => {
                let display_text = composing.string(self.input_mode, false);
                let composing_text = if composing.okuri.is_some() {
                    format!(
                        "▽{}*{}{}",
                        display_text,
                        composing.okuri_string(self.input_mode),
                        composing.romaji
                    )
                } else if composing.is_shift {
                    format!("▽{}{}", display_text, composing.romaji)
                } else {
                    composing.romaji.clone()
                };
                // ▽の分
                let marker_len = usize::from(composing.is_shift);
                cursor = match (cursor, composing.cursor) {
                    (Some(current), Some(composing_cursor)) => {
                        Some(current + composing_cursor + marker_len)
                    }
                    (Some(current), None) => Some(current + composing_text.chars().count()),
                    (None, Some(composing_cursor)) => {
                        Some(marked_text.chars().count() + composing_cursor + marker_len)
                    }
                    (None, None) => None,
                };
                marked_text.push_str(&composing_text);
                marked_text.push_str(&register_text_suffix);
            }
            InputMethodState::Selecting(selecting) => {
                marked_text.push('▼');
                marked_text.push_str(&selecting.selected().word);
                marked_text.push_str(&selecting.prev.composing.okuri_string(self.input_mode));
                cursor = None;
            }
        }
        MarkedText {
            text: marked_text,
            cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kana_builder::Moji;
    use crate::state::selecting::PrevComposing;
    use crate::state::special::{RegisterState, UnregisterState};

    fn composing(text: &[&str]) -> ComposingState {
        ComposingState {
            is_shift: true,
            text: text.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn state(input_method: InputMethodState, special_state: Option<SpecialState>) -> ImeState {
        ImeState {
            input_mode: InputMode::Hiragana,
            input_method,
            special_state,
            candidates: vec![],
        }
    }

    fn marked(text: &str, cursor: Option<usize>) -> MarkedText {
        MarkedText {
            text: text.to_string(),
            cursor,
        }
    }

    #[test]
    fn normal() {
        assert_eq!(marked("", None), ImeState::default().display_text());
    }

    #[test]
    fn composing_text() {
        let mut romaji_only = ComposingState::new(false);
        romaji_only.romaji = "k".to_string();
        assert_eq!(
            marked("k", None),
            state(InputMethodState::Composing(romaji_only), None).display_text()
        );

        let mut shift = composing(&["あ", "い"]);
        shift.romaji = "k".to_string();
        assert_eq!(
            marked("▽あいk", None),
            state(InputMethodState::Composing(shift.clone()), None).display_text()
        );
        shift.cursor = Some(1);
        assert_eq!(
            marked("▽あいk", Some(2)),
            state(InputMethodState::Composing(shift), None).display_text()
        );

        let mut okuri = composing(&["あ", "ら"]);
        okuri.okuri = Some(vec![Moji::new("っ", "t")]);
        okuri.romaji = "t".to_string();
        assert_eq!(
            marked("▽あら*っt", None),
            state(InputMethodState::Composing(okuri.clone()), None).display_text()
        );
        let mut katakana = state(InputMethodState::Composing(okuri), None);
        katakana.input_mode = InputMode::Katakana;
        assert_eq!(marked("▽アラ*ッt", None), katakana.display_text());
    }

    #[test]
    fn selecting_text() {
        let mut prev = composing(&["あ", "ら"]);
        prev.okuri = Some(vec![Moji::new("っ", "t"), Moji::new("た", "t")]);
        let selecting = SelectingState::new(
            PrevComposing {
                mode: InputMode::Hiragana,
                composing: prev,
            },
            "あらt",
            vec![Word::new("洗", None)],
        )
        .unwrap();
        assert_eq!(
            marked("▼洗った", None),
            state(InputMethodState::Selecting(selecting), None).display_text()
        );
    }

    #[test]
    fn register_text() {
        let mut prev = composing(&["あ", "ら"]);
        prev.okuri = Some(vec![Moji::new("う", "u")]);
        let register = RegisterState::new(InputMode::Hiragana, prev, "あらu").append_text("洗");
        assert_eq!(
            marked("[登録：あら*う]洗", None),
            state(
                InputMethodState::Normal,
                Some(SpecialState::Register(register.clone()))
            )
            .display_text()
        );

        let mut inner = ComposingState::new(false);
        inner.romaji = "k".to_string();
        assert_eq!(
            marked("[登録：あら*う]洗k", None),
            state(
                InputMethodState::Composing(inner.clone()),
                Some(SpecialState::Register(register.clone()))
            )
            .display_text()
        );

        let register = register.move_cursor_left();
        assert_eq!(
            marked("[登録：あら*う]洗", Some(9)),
            state(
                InputMethodState::Normal,
                Some(SpecialState::Register(register.clone()))
            )
            .display_text()
        );
        assert_eq!(
            marked("[登録：あら*う]k洗", Some(10)),
            state(
                InputMethodState::Composing(inner),
                Some(SpecialState::Register(register))
            )
            .display_text()
        );
    }

    #[test]
    fn unregister_text() {
        let selecting = SelectingState::new(
            PrevComposing {
                mode: InputMode::Hiragana,
                composing: composing(&["あ", "い"]),
            },
            "あい",
            vec![Word::new("愛", None)],
        )
        .unwrap();
        let unregister =
            UnregisterState::new(InputMode::Hiragana, selecting).append_text("ye");
        assert_eq!(
            marked("あい /愛/ を削除します(yes/no)ye", None),
            state(
                InputMethodState::Normal,
                Some(SpecialState::Unregister(unregister))
            )
            .display_text()
        );
    }
}
