use crate::dictionary::Word;
use crate::skk_modes::InputMode;
use crate::state::composing::ComposingState;

/// 変換前の入力モードと未確定文字列
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrevComposing {
    pub mode: InputMode,
    pub composing: ComposingState,
}

///
/// 変換候補を選択中の状態
///
/// 候補は必ず一つ以上あり、candidate_indexは常に候補の範囲内を指す。
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectingState {
    pub prev: PrevComposing,
    /// 辞書登録するときの読み。送り仮名があれば "あらt" のような形。
    pub yomi: String,
    candidates: Vec<Word>,
    candidate_index: usize,
}

impl SelectingState {
    /// 候補が空ならNone
    pub fn new(prev: PrevComposing, yomi: &str, candidates: Vec<Word>) -> Option<Self> {
        if candidates.is_empty() {
            return None;
        }
        Some(SelectingState {
            prev,
            yomi: yomi.to_string(),
            candidates,
            candidate_index: 0,
        })
    }

    pub fn candidates(&self) -> &[Word] {
        &self.candidates
    }

    pub fn candidate_index(&self) -> usize {
        self.candidate_index
    }

    pub fn selected(&self) -> &Word {
        &self.candidates[self.candidate_index]
    }

    ///
    /// 選択位置をdiffだけ動かす。候補の範囲外になる場合はNone。
    /// 範囲外になったときにどうするか(辞書登録、未確定に戻る)は呼び出し側で決める。
    ///
    pub fn add_candidate_index(&self, diff: isize) -> Option<Self> {
        let new_index = self.candidate_index as isize + diff;
        if new_index < 0 || new_index as usize >= self.candidates.len() {
            return None;
        }
        Some(SelectingState {
            candidate_index: new_index as usize,
            ..self.clone()
        })
    }

    /// 確定する文字列。送り仮名は変換前の入力モードに合わせる。
    pub fn fixed_text(&self) -> String {
        format!(
            "{}{}",
            self.selected().word,
            self.prev.composing.okuri_string(self.prev.mode)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kana_builder::Moji;

    fn selecting(mode: InputMode, okuri: Option<Vec<Moji>>) -> SelectingState {
        let composing = ComposingState {
            is_shift: true,
            text: vec!["あ".to_string(), "ら".to_string()],
            okuri,
            romaji: "".to_string(),
            cursor: None,
        };
        SelectingState::new(
            PrevComposing { mode, composing },
            "あらt",
            vec![Word::new("洗", None), Word::new("荒", Some("あらい"))],
        )
        .unwrap()
    }

    #[test]
    fn empty_candidates() {
        let prev = PrevComposing {
            mode: InputMode::Hiragana,
            composing: ComposingState::new(true),
        };
        assert_eq!(None, SelectingState::new(prev, "ほげ", vec![]));
    }

    #[test]
    fn add_candidate_index() {
        let state = selecting(InputMode::Hiragana, None);
        assert_eq!(None, state.add_candidate_index(-1));
        let next = state.add_candidate_index(1).unwrap();
        assert_eq!(1, next.candidate_index());
        assert_eq!("荒", next.selected().word);
        assert_eq!(None, next.add_candidate_index(1));
        assert_eq!(0, next.add_candidate_index(-1).unwrap().candidate_index());
    }

    #[test]
    fn fixed_text_uses_prev_mode() {
        let okuri = Some(vec![Moji::new("っ", "t"), Moji::new("た", "t")]);
        assert_eq!(
            "洗った",
            selecting(InputMode::Hiragana, okuri.clone()).fixed_text()
        );
        assert_eq!("洗ッタ", selecting(InputMode::Katakana, okuri).fixed_text());
        assert_eq!("洗", selecting(InputMode::Hiragana, None).fixed_text());
    }
}
