#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate enum_display_derive;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate serde_derive;

use std::fmt;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use log::*;

use crate::action::Action;
use crate::config::SkkConfig;
use crate::dictionary::user_dict::UserDict;
use crate::kana_builder::KanaBuilder;
use crate::keyevent::KeyEvent;
use crate::skk_modes::InputMode;
use crate::state::{ImeState, MarkedText, StateMachine};

pub mod action;
pub mod config;
pub mod dictionary;
pub mod error;
mod form_changer;
pub mod kana_builder;
pub mod keyevent;
pub mod skk_modes;
pub mod state;

pub use error::SkkError;

///
/// 入力セッション一つ分。
/// 状態と確定済み文字列を持ち、キー入力を一つずつ状態遷移に渡す。
///
pub struct SkkContext {
    state: ImeState,
    machine: StateMachine,
    output: String,
}

impl SkkContext {
    pub fn new(input_mode: InputMode, dict: Arc<UserDict>) -> Self {
        SkkContext::with_kana_builder(input_mode, dict, KanaBuilder::default_builder())
    }

    pub fn with_kana_builder(input_mode: InputMode, dict: Arc<UserDict>, kana_builder: KanaBuilder) -> Self {
        SkkContext {
            state: ImeState::new(input_mode),
            machine: StateMachine::new(kana_builder, dict),
            output: String::new(),
        }
    }

    /// 設定からユーザー辞書を作ってセッションを始める
    pub fn from_config(config: &SkkConfig) -> Result<Self, SkkError> {
        let dict = UserDict::from_config(config)?;
        Ok(SkkContext::new(config.input_mode, Arc::new(dict)))
    }

    ///
    /// キー入力を処理する。
    /// IMEとして処理しなかった場合はfalseで、ホストがそのまま扱う。
    ///
    pub fn process_key_event(&mut self, key_event: &KeyEvent) -> bool {
        let action = Action::from_key_event(key_event);
        self.handle(action)
    }

    pub fn handle(&mut self, action: Action) -> bool {
        if action == Action::Unhandled {
            return false;
        }
        match self.machine.handle(&self.state, action) {
            Some(transition) => {
                self.state = transition.state;
                self.output.push_str(&transition.fixed);
                true
            }
            None => false,
        }
    }

    /// Mainly for test purpose. 全てのキーが処理されたらtrue
    pub fn process_key_events(&mut self, key_events: &[KeyEvent]) -> bool {
        let mut all_processed = true;
        for key_event in key_events {
            if !self.process_key_event(key_event) {
                debug!("Key event not processed: {}", key_event);
                all_processed = false;
            }
        }
        all_processed
    }

    /// Mainly for test purpose. "A r a T t a" のような空白区切りのキー列を処理する
    pub fn process_key_events_string(&mut self, key_events: &str) -> bool {
        match KeyEvent::deserialize_seq(key_events) {
            Ok(key_events) => self.process_key_events(&key_events),
            Err(e) => {
                warn!("Ignoring broken key sequence {}: {}", key_events, e);
                false
            }
        }
    }

    ///
    /// 確定済み文字列を取り出す。取り出した文字列は消える。
    ///
    pub fn poll_output(&mut self) -> Option<String> {
        if self.output.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.output))
        }
    }

    pub fn get_preedit(&self) -> String {
        self.display_text().text
    }

    pub fn display_text(&self) -> MarkedText {
        self.state.display_text()
    }

    pub fn state(&self) -> &ImeState {
        &self.state
    }

    pub fn input_mode(&self) -> InputMode {
        self.state.input_mode
    }

    pub fn set_input_mode(&mut self, input_mode: InputMode) {
        self.state.input_mode = input_mode;
    }

    pub fn dict(&self) -> &Arc<UserDict> {
        self.machine.dict()
    }

    pub fn set_private_mode(&self, private_mode: bool) {
        self.machine.dict().set_private_mode(private_mode);
    }

    /// 未確定の入力と確定済み文字列を捨てる。入力モードはそのまま
    pub fn reset(&mut self) {
        self.state = ImeState::new(self.state.input_mode);
        self.output.clear();
    }
}

impl Debug for SkkContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkkContext")
            .field("state", &self.state)
            .field("output", &self.output)
            .finish()
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::dictionary::dict_store::MemoryStore;
    use std::str::FromStr;
    use std::time::Duration;

    fn new_test_context(input_mode: InputMode) -> SkkContext {
        let dict = UserDict::new(
            Box::new(MemoryStore::new("かんじ /漢字/\n".as_bytes())),
            vec![],
            false,
            Duration::from_secs(60),
        )
        .unwrap();
        SkkContext::new(input_mode, Arc::new(dict))
    }

    #[test]
    fn process_key_event() {
        let mut context = new_test_context(InputMode::Ascii);
        assert!(context.process_key_event(&KeyEvent::from_str("a").unwrap()));
        assert!(!context.process_key_event(&KeyEvent::from_str("C-c").unwrap()));
    }

    #[test]
    fn poll_output() {
        let mut context = new_test_context(InputMode::Ascii);
        context.process_key_event(&KeyEvent::from_str("a").unwrap());
        assert_eq!(Some("a".to_string()), context.poll_output());
        assert_eq!(None, context.poll_output());
    }

    #[test]
    fn get_preedit() {
        let mut context = new_test_context(InputMode::Hiragana);
        context.process_key_event(&KeyEvent::from_str("A").unwrap());
        assert_eq!("▽あ", context.get_preedit());
    }

    #[test]
    fn convert_from_user_dict() {
        let mut context = new_test_context(InputMode::Hiragana);
        assert!(context.process_key_events_string("K a n j i space"));
        assert_eq!("▼漢字", context.get_preedit());
        context.process_key_events_string("Return");
        assert_eq!(Some("漢字".to_string()), context.poll_output());
    }

    #[test]
    fn reset() {
        let mut context = new_test_context(InputMode::Katakana);
        context.process_key_events_string("K a");
        context.reset();
        assert_eq!("", context.get_preedit());
        assert_eq!(InputMode::Katakana, context.input_mode());
    }
}
