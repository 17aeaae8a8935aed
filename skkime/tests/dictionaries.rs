mod utils;

use crate::utils::{extra_dictionary, init_test_logger, test_dictionary, test_user_dict};
use skkime::dictionary::dict_store::MemoryStore;
use skkime::dictionary::file_dict::FileDict;
use skkime::dictionary::memory_dict::MemoryDict;
use skkime::dictionary::remote_dict::{RemoteDict, SkkServClient};
use skkime::dictionary::{DictionaryType, Word};
use skkime::skk_modes::InputMode;
use skkime::{SkkContext, SkkError};
use std::io::Write;
use std::sync::Arc;

fn words(found: Vec<Word>) -> Vec<String> {
    found.into_iter().map(|word| word.word).collect()
}

struct TestSkkServ;

impl SkkServClient for TestSkkServ {
    fn refer(&self, yomi: &str) -> Result<String, SkkError> {
        match yomi {
            "とうきょう" => Ok("1/東京/藤京/\n".to_string()),
            "エラー" => Err(SkkError::RemoteError("connection refused".to_string())),
            _ => Ok(format!("4{}\n", yomi)),
        }
    }
}

#[test]
fn file_dict_refer() {
    init_test_logger();
    let dict = test_dictionary();
    assert_eq!(vec!["漢字", "感じ", "幹事"], words(dict.refer("かんじ")));
    assert_eq!(vec![Word::new("テスト", Some("test"))], dict.refer("てすと"));
    assert!(dict.refer("ふが").is_empty());
    assert!(dict.is_read_only());
    assert_eq!(Some("SKK-JISYO.test"), dict.id());
}

#[test]
fn sources_in_priority_order() {
    let store = Arc::new(MemoryStore::new("かんじ /漢字/\n".as_bytes()));
    let dict = test_user_dict(store, vec![extra_dictionary(), test_dictionary()]);
    assert_eq!(
        vec!["漢字", "感じ", "監事", "幹事"],
        words(dict.refer("かんじ"))
    );
    assert_eq!(vec!["東京"], words(dict.refer("とうきょう")));
}

#[test]
fn replace_and_delete_dictionary() {
    let store = Arc::new(MemoryStore::new(b""));
    let dict = test_user_dict(store, vec![test_dictionary(), extra_dictionary()]);
    assert_eq!(
        vec!["SKK-JISYO.test".to_string(), "SKK-JISYO.extra".to_string()],
        dict.dict_ids()
    );

    assert!(dict.delete_dict("SKK-JISYO.test"));
    assert!(!dict.delete_dict("SKK-JISYO.test"));
    assert_eq!(vec!["感じ", "監事"], words(dict.refer("かんじ")));

    dict.replace_dict(test_dictionary());
    assert_eq!(
        vec!["SKK-JISYO.extra".to_string(), "SKK-JISYO.test".to_string()],
        dict.dict_ids()
    );
    assert_eq!(vec!["感じ", "監事", "漢字", "幹事"], words(dict.refer("かんじ")));
}

#[test]
fn reload_file_dict() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "ねこ /猫/").unwrap();
    file.flush().unwrap();
    let store = Arc::new(MemoryStore::new(b""));
    let dict = test_user_dict(
        store,
        vec![DictionaryType::File(FileDict::new(file.path(), "utf-8").unwrap())],
    );
    assert_eq!(vec!["猫"], words(dict.refer("ねこ")));

    writeln!(file, "いぬ /犬/").unwrap();
    file.flush().unwrap();
    dict.reload_dicts();
    assert_eq!(vec!["犬"], words(dict.refer("いぬ")));
}

#[test]
fn remote_dict() {
    let remote = DictionaryType::Remote(RemoteDict::new(Box::new(TestSkkServ)));
    assert_eq!(vec!["東京", "藤京"], words(remote.refer("とうきょう")));
    assert!(remote.refer("ふが").is_empty());
    assert!(remote.refer("エラー").is_empty());
    assert_eq!(None, remote.id());

    let store = Arc::new(MemoryStore::new(b""));
    let dict = test_user_dict(store, vec![extra_dictionary(), remote]);
    assert_eq!(vec!["東京", "藤京"], words(dict.refer("とうきょう")));
}

#[test]
fn memory_dict_in_context() {
    let store = Arc::new(MemoryStore::new(b""));
    let memory = DictionaryType::Memory(MemoryDict::from_source("ひらがな /平仮名/\n"));
    let dict = test_user_dict(store, vec![memory]);
    let mut context = SkkContext::new(InputMode::Hiragana, Arc::new(dict));
    context.process_key_events_string("H i r a g a n a space Return");
    assert_eq!(Some("平仮名".to_string()), context.poll_output());
}
