use thiserror::Error;

// 外に見せるものと内部のものは現状区別していない。
#[derive(Error, Debug)]
pub enum SkkError {
    #[error("Some kind of error: {0}")]
    Error(String),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Parse failed: {0}")]
    ParseError(String),
    #[error("Rule error: {0}")]
    RuleError(String),
    #[error("Config error: {0}")]
    ConfigError(String),
    #[error(transparent)]
    TomlError(#[from] toml::de::Error),
    #[error("Encoding error: {0}")]
    EncodingError(String),
    #[error("skkserv error: {0}")]
    RemoteError(String),
}
