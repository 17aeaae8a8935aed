use crate::error::SkkError;
use log::*;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const DEFAULT_ASCII_FORM: &str = include_str!("../../assets/rule/ascii_form.toml");

lazy_static! {
    static ref ASCII_FORM_CHANGER: AsciiFormChanger = AsciiFormChanger::default_ascii_form_changer();
}

pub(crate) struct AsciiFormChanger {
    zenkaku_map: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct AsciiFormMap {
    #[serde(default)]
    hankaku: Vec<String>,
    #[serde(default)]
    zenkaku: Vec<String>,
}

impl AsciiFormChanger {
    pub fn default_ascii_form_changer() -> Self {
        let user_table = xdg::BaseDirectories::with_prefix("skkime")
            .ok()
            .and_then(|base_dirs| base_dirs.find_data_file("rule/ascii_form.toml"));
        if let Some(filepath) = user_table {
            match AsciiFormChanger::from_path(&filepath) {
                Ok(changer) => return changer,
                Err(e) => warn!("Ignoring broken ascii form file {:?}: {}", filepath, e),
            }
        }
        AsciiFormChanger::from_string(DEFAULT_ASCII_FORM).unwrap_or_else(|e| {
            error!("Builtin ascii form table is broken: {}", e);
            Self {
                zenkaku_map: BTreeMap::new(),
            }
        })
    }

    pub fn from_path(filepath: &Path) -> Result<Self, SkkError> {
        let mut file = File::open(filepath)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        AsciiFormChanger::from_string(&contents)
    }

    fn from_string(contents: &str) -> Result<Self, SkkError> {
        let ascii_form_map: AsciiFormMap = toml::from_str(contents)?;

        if ascii_form_map.zenkaku.len() != ascii_form_map.hankaku.len() {
            return Err(SkkError::RuleError(
                "source data file for ascii form doesn't match in length".to_string(),
            ));
        }
        let zenkaku_map = ascii_form_map
            .hankaku
            .into_iter()
            .zip(ascii_form_map.zenkaku)
            .collect();
        Ok(Self { zenkaku_map })
    }

    pub(crate) fn adjust_ascii_char(&self, ascii_char: char) -> String {
        if let Some(zenkaku_ascii) = self.zenkaku_map.get(&ascii_char.to_string()) {
            zenkaku_ascii.to_owned()
        } else {
            ascii_char.to_string()
        }
    }
}

/// 全英モード用に一文字を全角にする
pub(crate) fn adjust_ascii_char(ascii_char: char) -> String {
    ASCII_FORM_CHANGER.adjust_ascii_char(ascii_char)
}

#[cfg(test)]
impl AsciiFormChanger {
    pub fn test_ascii_form_changer() -> Self {
        AsciiFormChanger::from_string(
            "\
hankaku = [\" \", \"!\", \"\\\"\", \"a\", \"b\", \"1\", \"\\\\\"]
zenkaku = [\"　\", \"！\", \"”\", \"ａ\", \"ｂ\", \"１\", \"＼\"]
",
        )
        .unwrap()
    }
}
