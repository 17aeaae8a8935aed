use crate::dictionary::dictentry::parse_entries;
use crate::dictionary::{Dictionary, Entries, Word};
use log::*;

///
/// SKK辞書形式のテキストから作るメモリ上の辞書。
///
#[derive(Debug, Default, Clone)]
pub struct MemoryDict {
    entries: Entries,
}

impl MemoryDict {
    pub fn from_source(source: &str) -> Self {
        let entries = parse_entries(source);
        debug!("Loaded {} entries on memory", entries.len());
        MemoryDict { entries }
    }

    pub fn from_entries(entries: Entries) -> Self {
        MemoryDict { entries }
    }

    pub fn entries(&self) -> &Entries {
        &self.entries
    }
}

impl Dictionary for MemoryDict {
    fn refer(&self, yomi: &str) -> Vec<Word> {
        self.entries.get(yomi).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn refer() {
        let dict = MemoryDict::from_source(
            ";; okuri-ari entries.\nあらt /洗/荒/\n;; okuri-nasi entries.\nあい /愛;love/相/\n",
        );
        assert_eq!(2, dict.entries().len());
        assert_eq!(
            vec![Word::new("愛", Some("love")), Word::new("相", None)],
            dict.refer("あい")
        );
        assert_eq!(vec![Word::new("洗", None), Word::new("荒", None)], dict.refer("あらt"));
        assert!(dict.refer("あら").is_empty());
    }
}
