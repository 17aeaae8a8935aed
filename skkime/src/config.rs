use crate::dictionary::user_dict::USER_DICT_FILENAME;
use crate::error::SkkError;
use crate::skk_modes::InputMode;
use log::*;
use serde_with::serde_as;
use serde_with::DurationSeconds;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.toml";

/// 辞書ファイル一つ分の設定
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct DictionarySetting {
    pub path: PathBuf,
    /// encoding_rsが理解できるエンコーディング名
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_encoding() -> String {
    "euc-jp".to_string()
}

fn default_enabled() -> bool {
    true
}

#[serde_as]
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SkkConfig {
    /// 起動時の入力モード
    pub input_mode: InputMode,
    pub private_mode: bool,
    /// ユーザー辞書を保存するまでの待ち時間。秒で指定する。
    #[serde_as(as = "DurationSeconds<u64>")]
    pub save_interval: Duration,
    /// 指定がなければ XDG_DATA_HOME/skkime/skk-jisyo.utf8
    pub user_dictionary: Option<PathBuf>,
    /// 参照する辞書。優先度が高い順。
    pub dictionaries: Vec<DictionarySetting>,
}

impl Default for SkkConfig {
    fn default() -> Self {
        Self {
            input_mode: InputMode::Hiragana,
            private_mode: false,
            save_interval: Duration::from_secs(60),
            user_dictionary: None,
            dictionaries: vec![],
        }
    }
}

impl SkkConfig {
    /// XDG config dirのskkime/config.tomlを読む。なければデフォルト。
    pub fn load() -> Result<Self, SkkError> {
        let config_file = xdg::BaseDirectories::with_prefix("skkime")
            .map_err(|e| SkkError::ConfigError(e.to_string()))?
            .find_config_file(CONFIG_FILENAME);
        match config_file {
            Some(filepath) => SkkConfig::from_path(&filepath),
            None => {
                info!("No config file found. Using default config.");
                Ok(SkkConfig::default())
            }
        }
    }

    pub fn from_path(filepath: &Path) -> Result<Self, SkkError> {
        let mut file = File::open(filepath)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        SkkConfig::from_string(&contents)
    }

    pub fn from_string(contents: &str) -> Result<Self, SkkError> {
        let config = toml::from_str::<SkkConfig>(contents)?;
        Ok(config)
    }

    ///
    /// ユーザー辞書の場所。設定になければXDG data dirに置く。
    /// 置き場所のディレクトリがなければ作る。
    ///
    pub fn user_dictionary_path(&self) -> Result<PathBuf, SkkError> {
        if let Some(path) = &self.user_dictionary {
            return Ok(path.to_owned());
        }
        xdg::BaseDirectories::with_prefix("skkime")
            .map_err(|e| SkkError::ConfigError(e.to_string()))?
            .place_data_file(USER_DICT_FILENAME)
            .map_err(SkkError::IoError)
    }
}
