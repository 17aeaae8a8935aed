use crate::form_changer::kana_form_changer::adjust_kana_string;
use crate::kana_builder::Moji;
use crate::skk_modes::InputMode;

///
/// 入力中の未確定文字列
///
/// 例えば "(Shift)ara(Shift)tta" と入力した場合、次のように遷移する
/// (is_shift, text, okuri, romaji)
///
/// 1. (true, "あ", None, "")
/// 2. (true, "あ", None, "r")
/// 3. (true, "あら", None, "")
/// 4. (true, "あら", Some(""), "t") (Shift押して送り仮名モード)
/// 5. (true, "あら", Some("っ"), "t")
/// 6. (true, "あら", Some("った"), "") (ローマ字がなくなった瞬間に変換 or 辞書登録に遷移する)
///
/// abbrevの "/apple" は (true, "apple", None, "") になる。
///
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComposingState {
    /// Shiftによる未確定入力中かどうか。先頭に▽がついている状態。
    pub is_shift: bool,
    /// かなモードならかなになっている文字列、abbrevなら入力した文字列。一文字ずつ。
    pub text: Vec<String>,
    /// 送り仮名。送り仮名モードになっていなければNone、なった直後はSome(空)
    pub okuri: Option<Vec<Moji>>,
    /// まだかなになっていないローマ字。"k" や "ky" など。
    pub romaji: String,
    /// カーソル位置。末尾のときはNone。先頭の▽は含まない。
    pub cursor: Option<usize>,
}

impl ComposingState {
    pub fn new(is_shift: bool) -> Self {
        ComposingState {
            is_shift,
            ..Default::default()
        }
    }

    /// text部分を指定の入力モードに合わせて文字列に変換する
    /// convert_hatsuon: 未確定のローマ字が"n"だったら撥音「ん」として扱うかどうか
    pub fn string(&self, input_mode: InputMode, convert_hatsuon: bool) -> String {
        let mut text = self.text.concat();
        if convert_hatsuon && self.romaji == "n" {
            text.push('ん');
        }
        adjust_kana_string(input_mode, &text)
    }

    /// 送り仮名部分を指定の入力モードに合わせて文字列に変換する
    pub fn okuri_string(&self, input_mode: InputMode) -> String {
        match &self.okuri {
            Some(okuri) => okuri.iter().map(|moji| moji.string(input_mode)).collect(),
            None => "".to_string(),
        }
    }

    /// カーソル位置にかなを追加する。カーソルは追加した分だけ進む。
    pub fn append_text(&self, moji: &Moji) -> Self {
        let moji_text: Vec<String> = moji.kana.chars().map(|c| c.to_string()).collect();
        let mut new_state = self.clone();
        match self.cursor {
            Some(cursor) => {
                let added = moji_text.len();
                new_state.text.splice(cursor..cursor, moji_text);
                new_state.cursor = Some(cursor + added);
            }
            None => new_state.text.extend(moji_text),
        }
        new_state
    }

    /// 送り仮名を一つ追加する。送り仮名モードでなければ送り仮名モードにする。
    pub fn append_okuri(&self, moji: &Moji) -> Self {
        let mut new_state = self.clone();
        new_state.okuri.get_or_insert_with(Vec::new).push(moji.clone());
        new_state
    }

    /// 入力中の文字列をカーソル位置から一文字削除する。0文字で削除できないときはNoneを返す
    pub fn drop_last(&self) -> Option<Self> {
        let mut new_state = self.clone();
        if !self.romaji.is_empty() {
            new_state.romaji.pop();
        } else if let Some(okuri) = &self.okuri {
            new_state.okuri = if okuri.is_empty() {
                None
            } else {
                Some(okuri[..okuri.len() - 1].to_vec())
            };
        } else if self.text.is_empty() {
            return None;
        } else if let Some(cursor) = self.cursor {
            if cursor > 0 {
                new_state.text.remove(cursor - 1);
                new_state.cursor = Some(cursor - 1);
            }
        } else {
            new_state.text.pop();
        }
        Some(new_state)
    }

    pub fn reset_romaji(&self) -> Self {
        ComposingState {
            romaji: "".to_string(),
            ..self.clone()
        }
    }

    /// カーソルより左のtext部分を返す。
    pub fn sub_text(&self) -> &[String] {
        match self.cursor {
            Some(cursor) => &self.text[0..cursor],
            None => &self.text,
        }
    }

    ///
    /// 辞書を引く際の読みを返す。
    /// カーソルがある場合はカーソルより左側の文字列だけを対象にする。
    /// 送り仮名があれば最初の送り仮名のローマ字一文字目を付ける。"あらt" 等。
    ///
    pub fn yomi(&self, input_mode: InputMode) -> String {
        match input_mode {
            // abbrev
            InputMode::Ascii | InputMode::Zenkaku => self.text.concat(),
            InputMode::Hiragana | InputMode::Katakana | InputMode::HankakuKatakana => {
                let mut yomi = self.sub_text().concat();
                if self.romaji == "n" {
                    yomi.push('ん');
                }
                if let Some(first) = self.okuri.as_ref().and_then(|okuri| okuri.first()) {
                    yomi.push_str(&first.first_romaji);
                }
                yomi
            }
        }
    }

    /// 入力済みの非送り仮名部分のみカーソル移動可能
    pub fn move_cursor_left(&self) -> Self {
        if self.text.is_empty() || !self.is_shift {
            return self.clone();
        }
        let new_cursor = match self.cursor {
            Some(cursor) => cursor.saturating_sub(1),
            None => self.text.len() - 1,
        };
        ComposingState {
            cursor: Some(new_cursor),
            ..self.clone()
        }
    }

    /// 末尾を越えるとカーソルなし(末尾)になる
    pub fn move_cursor_right(&self) -> Self {
        match self.cursor {
            Some(cursor) if self.is_shift && !self.text.is_empty() => ComposingState {
                cursor: if cursor + 1 >= self.text.len() {
                    None
                } else {
                    Some(cursor + 1)
                },
                ..self.clone()
            },
            _ => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composing(text: &[&str], cursor: Option<usize>) -> ComposingState {
        ComposingState {
            is_shift: true,
            text: text.iter().map(|s| s.to_string()).collect(),
            okuri: None,
            romaji: "".to_string(),
            cursor,
        }
    }

    #[test]
    fn append_text() {
        let state = ComposingState::new(true).append_text(&Moji::new("か", "k"));
        assert_eq!(vec!["か".to_string()], state.text);
        assert_eq!("", state.romaji);
        assert_eq!(None, state.cursor);

        let state = composing(&["あ", "い"], Some(1)).append_text(&Moji::new("きゃ", "k"));
        assert_eq!(composing(&["あ", "き", "ゃ", "い"], Some(3)), state);
    }

    #[test]
    fn drop_last_order() {
        let mut state = composing(&["あ", "ら"], None);
        state.okuri = Some(vec![Moji::new("っ", "t")]);
        state.romaji = "t".to_string();

        let state = state.drop_last().unwrap();
        assert_eq!("", state.romaji);
        let state = state.drop_last().unwrap();
        assert_eq!(Some(vec![]), state.okuri);
        let state = state.drop_last().unwrap();
        assert_eq!(None, state.okuri);
        let state = state.drop_last().unwrap();
        assert_eq!(vec!["あ".to_string()], state.text);
        let state = state.drop_last().unwrap();
        assert!(state.text.is_empty());
        assert_eq!(None, state.drop_last());
    }

    #[test]
    fn drop_last_at_cursor() {
        let state = composing(&["あ", "い", "う"], Some(2)).drop_last().unwrap();
        assert_eq!(composing(&["あ", "う"], Some(1)), state);
        let state = composing(&["あ"], Some(0)).drop_last().unwrap();
        assert_eq!(composing(&["あ"], Some(0)), state);
    }

    #[test]
    fn string_for_mode() {
        let mut state = composing(&["か", "ん", "じ"], None);
        assert_eq!("かんじ", state.string(InputMode::Hiragana, false));
        assert_eq!("カンジ", state.string(InputMode::Katakana, false));
        assert_eq!("ｶﾝｼﾞ", state.string(InputMode::HankakuKatakana, false));
        state.romaji = "n".to_string();
        assert_eq!("かんじ", state.string(InputMode::Hiragana, false));
        assert_eq!("かんじん", state.string(InputMode::Hiragana, true));
    }

    #[test]
    fn yomi() {
        let mut state = composing(&["あ", "ら"], None);
        state.okuri = Some(vec![Moji::new("っ", "t"), Moji::new("た", "t")]);
        assert_eq!("あらt", state.yomi(InputMode::Hiragana));
        assert_eq!("あらt", state.yomi(InputMode::Katakana));

        let mut state = composing(&["か"], None);
        state.romaji = "n".to_string();
        assert_eq!("かん", state.yomi(InputMode::Hiragana));

        let state = composing(&["あ", "い", "う"], Some(2));
        assert_eq!("あい", state.yomi(InputMode::Hiragana));

        let state = composing(&["a", "p", "p", "l", "e"], Some(2));
        assert_eq!("apple", state.yomi(InputMode::Ascii));
    }

    #[test]
    fn move_cursor() {
        let state = composing(&["あ", "い"], None);
        let state = state.move_cursor_left();
        assert_eq!(Some(1), state.cursor);
        let state = state.move_cursor_left().move_cursor_left();
        assert_eq!(Some(0), state.cursor);
        let state = state.move_cursor_right();
        assert_eq!(Some(1), state.cursor);
        let state = state.move_cursor_right();
        assert_eq!(None, state.cursor);
        let state = state.move_cursor_right();
        assert_eq!(None, state.cursor);
    }

    #[test]
    fn move_cursor_needs_shift() {
        let mut state = composing(&["あ"], None);
        state.is_shift = false;
        assert_eq!(None, state.move_cursor_left().cursor);
        assert_eq!(None, ComposingState::new(true).move_cursor_left().cursor);
    }
}
