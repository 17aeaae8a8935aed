use crate::action::Action;
use crate::dictionary::user_dict::UserDict;
use crate::dictionary::Word;
use crate::form_changer::ascii_form_changer::adjust_ascii_char;
use crate::kana_builder::{KanaBuilder, Moji};
use crate::skk_modes::InputMode;
use crate::state::composing::ComposingState;
use crate::state::ime_state::{ImeState, InputMethodState};
use crate::state::selecting::{PrevComposing, SelectingState};
use crate::state::special::{RegisterState, SpecialState, UnregisterState};
use log::*;
use std::iter;
use std::sync::Arc;

/// 一回の入力を処理した結果
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub state: ImeState,
    /// 確定した文字列。何も確定しなければ空
    pub fixed: String,
}

impl Transition {
    fn new(state: ImeState, fixed: &str) -> Self {
        Transition {
            state,
            fixed: fixed.to_string(),
        }
    }

    fn stay(state: &ImeState) -> Self {
        Transition::new(state.clone(), "")
    }
}

///
/// ImeStateとActionから次のImeStateを作る。
/// 辞書を引くこと、確定時の学習、登録、削除以外の副作用を持たない。
///
pub struct StateMachine {
    kana_builder: KanaBuilder,
    dict: Arc<UserDict>,
}

impl StateMachine {
    pub fn new(kana_builder: KanaBuilder, dict: Arc<UserDict>) -> Self {
        StateMachine { kana_builder, dict }
    }

    pub fn dict(&self) -> &Arc<UserDict> {
        &self.dict
    }

    ///
    /// 入力を一つ処理する。
    /// IMEとして処理しない入力(ホストにそのまま渡すべきもの)ならNoneを返す。
    ///
    pub fn handle(&self, state: &ImeState, action: Action) -> Option<Transition> {
        let transition = StateMachine::settle(self.dispatch(state, action)?);
        debug!(
            "{:?} -> mode: {:?} state: {:?} fixed: {:?}",
            action, transition.state.input_mode, transition.state.input_method, transition.fixed
        );
        Some(transition)
    }

    fn dispatch(&self, state: &ImeState, action: Action) -> Option<Transition> {
        match (&state.special_state, &state.input_method) {
            (Some(SpecialState::Unregister(unregister)), _) => {
                self.handle_unregister(state, unregister, action)
            }
            (_, InputMethodState::Normal) => self.handle_normal(state, action),
            (_, InputMethodState::Composing(composing)) => {
                self.handle_composing(state, composing, action)
            }
            (_, InputMethodState::Selecting(selecting)) => {
                self.handle_selecting(state, selecting, action)
            }
        }
    }

    /// firstの後に続けてactionを処理する。actionが処理されなければfirstのまま
    fn then(&self, first: Transition, action: Action) -> Transition {
        match self.dispatch(&first.state, action) {
            Some(next) => Transition {
                state: next.state,
                fixed: first.fixed + &next.fixed,
            },
            None => first,
        }
    }

    /// 辞書登録中は確定した文字列を登録する単語の方に入れる。
    fn settle(mut transition: Transition) -> Transition {
        let appended = match &transition.state.special_state {
            Some(SpecialState::Register(register)) if !transition.fixed.is_empty() => {
                Some(register.append_text(&transition.fixed))
            }
            _ => None,
        };
        if let Some(register) = appended {
            transition.state.special_state = Some(SpecialState::Register(register));
            transition.fixed.clear();
        }
        transition.state.candidates = match &transition.state.input_method {
            InputMethodState::Selecting(selecting) => selecting.candidates().to_vec(),
            _ => vec![],
        };
        transition
    }

    fn handle_normal(&self, state: &ImeState, action: Action) -> Option<Transition> {
        if let Some(SpecialState::Register(register)) = &state.special_state {
            let special = match action {
                Action::Enter => return Some(self.finish_register(state, register)),
                Action::Cancel => return Some(StateMachine::cancel_register(state, register)),
                Action::Backspace => state.special_state.as_ref().map(SpecialState::drop_last),
                Action::Left => state.special_state.as_ref().map(SpecialState::move_cursor_left),
                Action::Right => state.special_state.as_ref().map(SpecialState::move_cursor_right),
                _ => None,
            };
            if special.is_some() {
                let mut new_state = state.clone();
                new_state.special_state = special;
                return Some(Transition::stay(&new_state));
            }
        }

        match action {
            Action::Input(c) => Some(self.input_normal(state, c)),
            Action::Space => Some(self.input_normal(state, ' ')),
            Action::Hiragana
                if state.input_mode != InputMode::Hiragana || state.special_state.is_some() =>
            {
                Some(Transition::stay(&with_mode(state, InputMode::Hiragana)))
            }
            Action::HankakuKatakana => match state.input_mode {
                InputMode::HankakuKatakana => {
                    Some(Transition::stay(&with_mode(state, InputMode::Hiragana)))
                }
                InputMode::Hiragana | InputMode::Katakana => {
                    Some(Transition::stay(&with_mode(state, InputMode::HankakuKatakana)))
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn input_normal(&self, state: &ImeState, c: char) -> Transition {
        match state.input_mode {
            InputMode::Ascii => Transition::new(state.clone(), &c.to_string()),
            InputMode::Zenkaku => Transition::new(state.clone(), &adjust_ascii_char(c)),
            InputMode::Hiragana | InputMode::Katakana | InputMode::HankakuKatakana => match c {
                'q' => {
                    let mode = match state.input_mode {
                        InputMode::Hiragana => InputMode::Katakana,
                        _ => InputMode::Hiragana,
                    };
                    Transition::stay(&with_mode(state, mode))
                }
                'l' => Transition::stay(&with_mode(state, InputMode::Ascii)),
                'L' => Transition::stay(&with_mode(state, InputMode::Zenkaku)),
                '/' => {
                    let mut new_state = with_mode(state, InputMode::Ascii);
                    new_state.input_method = InputMethodState::Composing(ComposingState::new(true));
                    Transition::stay(&new_state)
                }
                c if c.is_ascii_uppercase() => {
                    self.input_kana(state, ComposingState::new(true), c.to_ascii_lowercase())
                }
                c => self.input_kana(state, ComposingState::new(false), c),
            },
        }
    }

    ///
    /// ローマ字を一文字追加してかなを確定できるだけ確定する。
    /// ▽なしならかなは確定文字列、▽ありなら未確定文字列か送り仮名に入る。
    /// 送り仮名のローマ字がなくなったら変換する。
    ///
    fn input_kana(&self, state: &ImeState, composing: ComposingState, c: char) -> Transition {
        let buffer = format!("{}{}", composing.romaji, c);
        let (mojis, remainder) = self.kana_builder.resolve_all(&buffer);
        let mut composing = composing;
        let mut fixed = String::new();
        for moji in &mojis {
            if composing.okuri.is_some() {
                composing = composing.append_okuri(moji);
            } else if composing.is_shift {
                composing = composing.append_text(moji);
            } else {
                fixed.push_str(&moji.string(state.input_mode));
            }
        }
        composing.romaji = remainder;

        let has_okuri = composing.okuri.as_ref().map_or(false, |okuri| !okuri.is_empty());
        if has_okuri && composing.romaji.is_empty() {
            let mut converted = self.convert(state, composing);
            converted.fixed.insert_str(0, &fixed);
            return converted;
        }

        let mut new_state = state.clone();
        new_state.input_method = if !composing.is_shift && composing.romaji.is_empty() {
            InputMethodState::Normal
        } else {
            InputMethodState::Composing(composing)
        };
        Transition::new(new_state, &fixed)
    }

    /// 未確定のローマ字を捨てて通常状態に戻る。"n"だけは「ん」として確定する
    fn flush_romaji(&self, state: &ImeState, composing: &ComposingState) -> Transition {
        let fixed = if composing.romaji == "n" {
            Moji::hatsuon().string(state.input_mode)
        } else {
            "".to_string()
        };
        let mut new_state = state.clone();
        new_state.input_method = InputMethodState::Normal;
        Transition::new(new_state, &fixed)
    }

    fn handle_composing(
        &self,
        state: &ImeState,
        composing: &ComposingState,
        action: Action,
    ) -> Option<Transition> {
        if state.input_mode == InputMode::Ascii {
            return self.handle_abbrev(state, composing, action);
        }
        if !composing.is_shift {
            // ▽なしでローマ字だけ入力途中
            return match action {
                Action::Input(c) => Some(self.input_composing(state, composing, c)),
                Action::Backspace => {
                    let mut new_state = state.clone();
                    new_state.input_method = match composing.drop_last() {
                        Some(dropped) if !dropped.romaji.is_empty() => {
                            InputMethodState::Composing(dropped)
                        }
                        _ => InputMethodState::Normal,
                    };
                    Some(Transition::stay(&new_state))
                }
                Action::Cancel => {
                    let mut new_state = state.clone();
                    new_state.input_method = InputMethodState::Normal;
                    Some(Transition::stay(&new_state))
                }
                Action::Unhandled => None,
                action => Some(self.then(self.flush_romaji(state, composing), action)),
            };
        }

        let mut new_state = state.clone();
        match action {
            Action::Input(c) => return Some(self.input_composing(state, composing, c)),
            Action::Space => return Some(self.convert(state, composing.clone())),
            Action::Enter => {
                new_state.input_method = InputMethodState::Normal;
                return Some(Transition::new(
                    new_state,
                    &composing_fixed_text(composing, state.input_mode),
                ));
            }
            Action::Hiragana => {
                new_state.input_mode = InputMode::Hiragana;
                new_state.input_method = InputMethodState::Normal;
                return Some(Transition::new(
                    new_state,
                    &composing_fixed_text(composing, state.input_mode),
                ));
            }
            Action::HankakuKatakana => {
                new_state.input_method = InputMethodState::Normal;
                return Some(Transition::new(
                    new_state,
                    &composing_fixed_text(composing, InputMode::HankakuKatakana),
                ));
            }
            Action::Backspace => {
                new_state.input_method = match composing.drop_last() {
                    Some(dropped) => InputMethodState::Composing(dropped),
                    None => InputMethodState::Normal,
                };
            }
            Action::Cancel => new_state.input_method = InputMethodState::Normal,
            Action::Left => {
                new_state.input_method = InputMethodState::Composing(composing.move_cursor_left())
            }
            Action::Right => {
                new_state.input_method = InputMethodState::Composing(composing.move_cursor_right())
            }
            Action::Up | Action::Down => {}
            Action::Unhandled => return None,
        }
        Some(Transition::stay(&new_state))
    }

    fn input_composing(&self, state: &ImeState, composing: &ComposingState, c: char) -> Transition {
        let lower = c.to_ascii_lowercase();
        let buffer: Vec<char> = composing.romaji.chars().chain(iter::once(lower)).collect();
        let continuing = !composing.romaji.is_empty() && self.kana_builder.can_continue(&buffer);

        if !continuing && matches!(c, 'q' | 'l' | 'L' | '/') {
            if !composing.is_shift {
                return self.then(self.flush_romaji(state, composing), Action::Input(c));
            }
            if composing.okuri.is_some() {
                // 送り仮名の入力中はモード切り替えも送り仮名にもしない
                return Transition::stay(state);
            }
            let mut new_state = state.clone();
            new_state.input_method = InputMethodState::Normal;
            match c {
                // 反対のかなで確定
                'q' => {
                    let mode = match state.input_mode {
                        InputMode::Hiragana => InputMode::Katakana,
                        _ => InputMode::Hiragana,
                    };
                    return Transition::new(new_state, &composing.string(mode, true));
                }
                'l' | 'L' => {
                    new_state.input_mode = if c == 'l' {
                        InputMode::Ascii
                    } else {
                        InputMode::Zenkaku
                    };
                    return Transition::new(new_state, &composing.string(state.input_mode, true));
                }
                _ => {}
            }
        }

        if c.is_ascii_uppercase() {
            if !composing.is_shift {
                // "kA" は ▽か になる
                let shifted = ComposingState {
                    is_shift: true,
                    ..composing.clone()
                };
                return self.input_kana(state, shifted, lower);
            }
            if composing.okuri.is_none() && !composing.text.is_empty() {
                // 送り仮名開始。"n"が残っていたら「ん」にしてから
                let mut base = if composing.romaji == "n" {
                    composing.append_text(&Moji::hatsuon())
                } else {
                    composing.clone()
                }
                .reset_romaji();
                base.okuri = Some(vec![]);
                return self.input_kana(state, base, lower);
            }
        }
        self.input_kana(state, composing.clone(), lower)
    }

    /// "/" から始まる abbrev の入力。ローマ字かな変換をしない。
    fn handle_abbrev(
        &self,
        state: &ImeState,
        composing: &ComposingState,
        action: Action,
    ) -> Option<Transition> {
        let mut new_state = state.clone();
        match action {
            Action::Input(c) => {
                let raw = c.to_string();
                new_state.input_method =
                    InputMethodState::Composing(composing.append_text(&Moji::new(&raw, &raw)));
            }
            Action::Space => return Some(self.convert(state, composing.clone())),
            Action::Enter | Action::Hiragana => {
                new_state.input_mode = InputMode::Hiragana;
                new_state.input_method = InputMethodState::Normal;
                return Some(Transition::new(new_state, &composing.text.concat()));
            }
            Action::Backspace => match composing.drop_last() {
                Some(dropped) => new_state.input_method = InputMethodState::Composing(dropped),
                None => {
                    new_state.input_mode = InputMode::Hiragana;
                    new_state.input_method = InputMethodState::Normal;
                }
            },
            Action::Cancel => {
                new_state.input_mode = InputMode::Hiragana;
                new_state.input_method = InputMethodState::Normal;
            }
            Action::Left => {
                new_state.input_method = InputMethodState::Composing(composing.move_cursor_left())
            }
            Action::Right => {
                new_state.input_method = InputMethodState::Composing(composing.move_cursor_right())
            }
            Action::Up | Action::Down | Action::HankakuKatakana => {}
            Action::Unhandled => return None,
        }
        Some(Transition::stay(&new_state))
    }

    ///
    /// 未確定文字列の読みで辞書を引いて候補選択に移る。
    /// 候補がなければ辞書登録に移る。登録中なら▽のまま。
    ///
    fn convert(&self, state: &ImeState, composing: ComposingState) -> Transition {
        let mode = state.input_mode;
        let yomi = composing.yomi(mode);
        let mut new_state = state.clone();
        if yomi.is_empty() {
            new_state.input_method = InputMethodState::Composing(composing);
            return Transition::stay(&new_state);
        }

        let candidates = self.dict.refer(&yomi);
        debug!("{} candidates for {}", candidates.len(), yomi);
        let prev = PrevComposing {
            mode,
            composing: composing.clone(),
        };
        if let Some(selecting) = SelectingState::new(prev, &yomi, candidates) {
            new_state.input_method = InputMethodState::Selecting(selecting);
            return Transition::stay(&new_state);
        }
        match self.start_register(state, mode, &composing, &yomi) {
            Some(registering) => Transition::stay(&registering),
            None => {
                new_state.input_method = InputMethodState::Composing(composing);
                Transition::stay(&new_state)
            }
        }
    }

    /// 辞書登録を始める。既に登録中ならNone
    fn start_register(
        &self,
        state: &ImeState,
        mode: InputMode,
        composing: &ComposingState,
        yomi: &str,
    ) -> Option<ImeState> {
        if state.special_state.is_some() {
            debug!("Already in special state. Not registering {}", yomi);
            return None;
        }
        let mut new_state = state.clone();
        new_state.special_state = Some(SpecialState::Register(RegisterState::new(
            mode,
            composing.clone(),
            yomi,
        )));
        new_state.input_mode = restored_mode(mode);
        new_state.input_method = InputMethodState::Normal;
        Some(new_state)
    }

    fn finish_register(&self, state: &ImeState, register: &RegisterState) -> Transition {
        if register.text.is_empty() {
            return StateMachine::cancel_register(state, register);
        }
        self.dict.add(&register.yomi, Word::new(&register.text, None));
        let fixed = format!(
            "{}{}",
            register.text,
            register.prev.composing.okuri_string(register.prev.mode)
        );
        let mut new_state = state.clone();
        new_state.input_mode = restored_mode(register.prev.mode);
        new_state.input_method = InputMethodState::Normal;
        new_state.special_state = None;
        Transition::new(new_state, &fixed)
    }

    fn cancel_register(state: &ImeState, register: &RegisterState) -> Transition {
        let mut new_state = state.clone();
        new_state.input_mode = register.prev.mode;
        new_state.input_method = InputMethodState::Composing(register.prev.composing.clone());
        new_state.special_state = None;
        Transition::stay(&new_state)
    }

    fn handle_selecting(
        &self,
        state: &ImeState,
        selecting: &SelectingState,
        action: Action,
    ) -> Option<Transition> {
        let mut new_state = state.clone();
        match action {
            Action::Space | Action::Down => match selecting.add_candidate_index(1) {
                Some(next) => new_state.input_method = InputMethodState::Selecting(next),
                None => {
                    if let Some(registering) = self.start_register(
                        state,
                        selecting.prev.mode,
                        &selecting.prev.composing,
                        &selecting.yomi,
                    ) {
                        new_state = registering;
                    }
                }
            },
            Action::Up | Action::Input('x') => match selecting.add_candidate_index(-1) {
                Some(prev) => new_state.input_method = InputMethodState::Selecting(prev),
                None => return Some(Transition::stay(&back_to_composing(state, selecting))),
            },
            Action::Cancel | Action::Backspace => {
                return Some(Transition::stay(&back_to_composing(state, selecting)))
            }
            Action::Enter | Action::Hiragana => return Some(self.commit_selecting(state, selecting)),
            Action::Input('X') => {
                if state.special_state.is_none() {
                    new_state.special_state = Some(SpecialState::Unregister(
                        UnregisterState::new(selecting.prev.mode, selecting.clone()),
                    ));
                    new_state.input_method = InputMethodState::Normal;
                }
            }
            Action::Input(_) => {
                let committed = self.commit_selecting(state, selecting);
                return Some(self.then(committed, action));
            }
            Action::Left | Action::Right | Action::HankakuKatakana => {}
            Action::Unhandled => return None,
        }
        Some(Transition::stay(&new_state))
    }

    /// 選んだ候補を確定して学習する
    fn commit_selecting(&self, state: &ImeState, selecting: &SelectingState) -> Transition {
        self.dict.add(&selecting.yomi, selecting.selected().clone());
        let mut new_state = state.clone();
        new_state.input_mode = restored_mode(selecting.prev.mode);
        new_state.input_method = InputMethodState::Normal;
        Transition::new(new_state, &selecting.fixed_text())
    }

    fn handle_unregister(
        &self,
        state: &ImeState,
        unregister: &UnregisterState,
        action: Action,
    ) -> Option<Transition> {
        let mut new_state = state.clone();
        let special = state.special_state.as_ref()?;
        match action {
            Action::Input(c) => new_state.special_state = Some(special.append_text(&c.to_string())),
            Action::Space => new_state.special_state = Some(special.append_text(" ")),
            Action::Backspace => new_state.special_state = Some(special.drop_last()),
            Action::Enter if unregister.is_confirmed() => {
                let selected = unregister.prev.selected();
                if !self.dict.delete(&unregister.prev.yomi, selected) {
                    info!(
                        "{} /{}/ is not in the user dictionary",
                        unregister.prev.yomi, selected.word
                    );
                }
                new_state.input_mode = restored_mode(unregister.prev_mode);
                new_state.input_method = InputMethodState::Normal;
                new_state.special_state = None;
            }
            Action::Enter | Action::Cancel => {
                new_state.input_mode = unregister.prev_mode;
                new_state.input_method = InputMethodState::Selecting(unregister.prev.clone());
                new_state.special_state = None;
            }
            Action::Unhandled => return None,
            _ => {}
        }
        Some(Transition::stay(&new_state))
    }
}

fn with_mode(state: &ImeState, input_mode: InputMode) -> ImeState {
    ImeState {
        input_mode,
        ..state.clone()
    }
}

/// abbrevから抜けるとかなモードに戻る
fn restored_mode(mode: InputMode) -> InputMode {
    match mode {
        InputMode::Ascii => InputMode::Hiragana,
        mode => mode,
    }
}

fn back_to_composing(state: &ImeState, selecting: &SelectingState) -> ImeState {
    let mut new_state = state.clone();
    new_state.input_mode = selecting.prev.mode;
    new_state.input_method = InputMethodState::Composing(selecting.prev.composing.clone());
    new_state
}

/// ▽の状態で確定するときの文字列。撥音を補い、送り仮名も付ける
fn composing_fixed_text(composing: &ComposingState, mode: InputMode) -> String {
    format!(
        "{}{}",
        composing.string(mode, true),
        composing.okuri_string(mode)
    )
}
