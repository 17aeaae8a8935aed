use crate::skk_modes::InputMode;
use crate::state::composing::ComposingState;
use crate::state::selecting::{PrevComposing, SelectingState};

///
/// 辞書登録中の状態。
/// 登録する単語はかな変換済みの文字列として扱い、ローマ字は持たない。
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterState {
    /// 登録モードに入る前の状態
    pub prev: PrevComposing,
    /// 登録する読み
    pub yomi: String,
    /// 入力中の登録単語
    pub text: String,
    /// カーソル位置。文字数で数える。末尾のときはNone。
    pub cursor: Option<usize>,
}

impl RegisterState {
    pub fn new(mode: InputMode, composing: ComposingState, yomi: &str) -> Self {
        RegisterState {
            prev: PrevComposing { mode, composing },
            yomi: yomi.to_string(),
            text: "".to_string(),
            cursor: None,
        }
    }

    pub fn append_text(&self, text: &str) -> Self {
        let mut chars: Vec<char> = self.text.chars().collect();
        let cursor = match self.cursor {
            Some(cursor) => {
                let inserted = text.chars().count();
                chars.splice(cursor..cursor, text.chars());
                Some(cursor + inserted)
            }
            None => {
                chars.extend(text.chars());
                None
            }
        };
        RegisterState {
            text: chars.into_iter().collect(),
            cursor,
            ..self.clone()
        }
    }

    /// カーソルの左の一文字を削除する。削除できる文字がなければNone
    pub fn drop_last(&self) -> Option<Self> {
        let mut chars: Vec<char> = self.text.chars().collect();
        let cursor = match self.cursor {
            Some(0) => return None,
            Some(cursor) => {
                chars.remove(cursor - 1);
                Some(cursor - 1)
            }
            None => {
                chars.pop()?;
                None
            }
        };
        Some(RegisterState {
            text: chars.into_iter().collect(),
            cursor,
            ..self.clone()
        })
    }

    pub fn move_cursor_left(&self) -> Self {
        let len = self.text.chars().count();
        if len == 0 {
            return self.clone();
        }
        RegisterState {
            cursor: Some(self.cursor.unwrap_or(len).saturating_sub(1)),
            ..self.clone()
        }
    }

    pub fn move_cursor_right(&self) -> Self {
        let len = self.text.chars().count();
        let cursor = match self.cursor {
            Some(cursor) if cursor + 1 < len => Some(cursor + 1),
            _ => None,
        };
        RegisterState {
            cursor,
            ..self.clone()
        }
    }
}

///
/// 辞書から単語を削除するか確認中の状態。"yes"の入力で削除する。
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnregisterState {
    pub prev_mode: InputMode,
    pub prev: SelectingState,
    pub text: String,
}

impl UnregisterState {
    pub fn new(mode: InputMode, selecting: SelectingState) -> Self {
        UnregisterState {
            prev_mode: mode,
            prev: selecting,
            text: "".to_string(),
        }
    }

    pub fn append_text(&self, text: &str) -> Self {
        UnregisterState {
            text: format!("{}{}", self.text, text),
            ..self.clone()
        }
    }

    pub fn drop_last(&self) -> Option<Self> {
        let mut text = self.text.clone();
        text.pop()?;
        Some(UnregisterState {
            text,
            ..self.clone()
        })
    }

    pub fn is_confirmed(&self) -> bool {
        self.text == "yes"
    }
}

/// 通常の入力状態に重なる特殊な状態。同時に一つだけ。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpecialState {
    Register(RegisterState),
    Unregister(UnregisterState),
}

impl SpecialState {
    pub fn append_text(&self, text: &str) -> Self {
        match self {
            SpecialState::Register(state) => SpecialState::Register(state.append_text(text)),
            SpecialState::Unregister(state) => SpecialState::Unregister(state.append_text(text)),
        }
    }

    /// 削除できない場合は元のまま
    pub fn drop_last(&self) -> Self {
        match self {
            SpecialState::Register(state) => state
                .drop_last()
                .map_or_else(|| self.clone(), SpecialState::Register),
            SpecialState::Unregister(state) => state
                .drop_last()
                .map_or_else(|| self.clone(), SpecialState::Unregister),
        }
    }

    /// 削除確認はカーソルを持たない
    pub fn move_cursor_left(&self) -> Self {
        match self {
            SpecialState::Register(state) => SpecialState::Register(state.move_cursor_left()),
            SpecialState::Unregister(_) => self.clone(),
        }
    }

    pub fn move_cursor_right(&self) -> Self {
        match self {
            SpecialState::Register(state) => SpecialState::Register(state.move_cursor_right()),
            SpecialState::Unregister(_) => self.clone(),
        }
    }
}
