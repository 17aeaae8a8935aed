#![allow(dead_code)]

use skkime::dictionary::dict_store::MemoryStore;
use skkime::dictionary::file_dict::FileDict;
use skkime::dictionary::user_dict::UserDict;
use skkime::dictionary::DictionaryType;
use skkime::skk_modes::InputMode;
use skkime::SkkContext;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub fn init_test_logger() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub fn test_dictionary() -> DictionaryType {
    DictionaryType::File(
        FileDict::new(Path::new("tests/data/dictionaries/SKK-JISYO.test"), "utf-8").unwrap(),
    )
}

pub fn extra_dictionary() -> DictionaryType {
    DictionaryType::File(
        FileDict::new(Path::new("tests/data/dictionaries/SKK-JISYO.extra"), "utf-8").unwrap(),
    )
}

/// 保存先をテストから覗けるユーザー辞書
pub fn test_user_dict(store: Arc<MemoryStore>, dicts: Vec<DictionaryType>) -> UserDict {
    UserDict::new(Box::new(store), dicts, false, Duration::from_secs(60)).unwrap()
}

pub fn default_test_context() -> SkkContext {
    let dict = test_user_dict(Arc::new(MemoryStore::new(b"")), vec![test_dictionary()]);
    SkkContext::new(InputMode::Hiragana, Arc::new(dict))
}

pub fn transition_check(
    context: &mut SkkContext,
    initial_input_mode: InputMode,
    key_inputs: &str,
    expected_preedit: &str,
    expected_output: &str,
    expected_input_mode: InputMode,
) {
    context.reset();
    context.set_input_mode(initial_input_mode);
    context.process_key_events_string(key_inputs);
    let output = context.poll_output().unwrap_or_default();
    let preedit = context.get_preedit();
    let input_mode = context.input_mode();
    assert_eq!(
        output, expected_output,
        "(output == expected) failed for '{}'",
        key_inputs
    );
    assert_eq!(
        preedit, expected_preedit,
        "(preedit == expected) failed for '{}'",
        key_inputs
    );
    assert_eq!(
        input_mode, expected_input_mode,
        "(input_mode == expected) failed for '{}'",
        key_inputs
    );
}
