use crate::error::SkkError;
use serde_with::DeserializeFromStr;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

bitflags! {
    ///
    /// modifier mask. fcitxやlibskkのものから使うものだけ。
    ///
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct SkkKeyModifier: u32 {
        const NONE = 0;
        const SHIFT = 1;
        const CONTROL = 1 << 2;
        const ALT = 1 << 3;
        const META = 1 << 28;
    }
}

/// 文字を持たないキー
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Display)]
pub enum NamedKey {
    Return,
    BackSpace,
    Delete,
    Tab,
    Escape,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
}

impl NamedKey {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Return" => Some(NamedKey::Return),
            "BackSpace" => Some(NamedKey::BackSpace),
            "Delete" => Some(NamedKey::Delete),
            "Tab" => Some(NamedKey::Tab),
            "Escape" => Some(NamedKey::Escape),
            "Left" => Some(NamedKey::Left),
            "Right" => Some(NamedKey::Right),
            "Up" => Some(NamedKey::Up),
            "Down" => Some(NamedKey::Down),
            "Home" => Some(NamedKey::Home),
            "End" => Some(NamedKey::End),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum KeySymbol {
    Char(char),
    Named(NamedKey),
}

impl KeySymbol {
    /// 一文字か、記号の名前
    fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(KeySymbol::Char(c));
        }
        match name {
            "space" => Some(KeySymbol::Char(' ')),
            "period" => Some(KeySymbol::Char('.')),
            "comma" => Some(KeySymbol::Char(',')),
            "slash" => Some(KeySymbol::Char('/')),
            "minus" => Some(KeySymbol::Char('-')),
            "semicolon" => Some(KeySymbol::Char(';')),
            "bracketleft" => Some(KeySymbol::Char('[')),
            "bracketright" => Some(KeySymbol::Char(']')),
            _ => NamedKey::from_name(name).map(KeySymbol::Named),
        }
    }
}

pub type KeyEventSeq = Vec<KeyEvent>;

///
/// In-lib structure of key event
///
/// String representation of key event is paren enclosed LongModifiers and single KeyName, or just one ShortModifier and one KeyName joined, or single KeyName.
/// LongModifier := "control" | "meta" | "alt" | "shift"
/// ShortModifier := "C-" | "A-" | "M-" for ctrl, alt, meta respectively
/// KeyName := single character | "space" | "Return" | "BackSpace" | "Left" ...
///
/// e.g.
/// "(control a)" "C-a" "M-Left" "l" "space"
///
#[derive(Clone, Hash, PartialEq, Eq, Debug, DeserializeFromStr)]
pub struct KeyEvent {
    symbol: KeySymbol,
    modifiers: SkkKeyModifier,
}

impl KeyEvent {
    pub fn new(symbol: KeySymbol, modifiers: SkkKeyModifier) -> Self {
        Self { symbol, modifiers }
    }

    /// 修飾なしの文字入力
    pub fn from_char(c: char) -> Self {
        Self::new(KeySymbol::Char(c), SkkKeyModifier::NONE)
    }

    pub fn get_symbol(&self) -> KeySymbol {
        self.symbol
    }

    pub fn get_modifier(&self) -> SkkKeyModifier {
        self.modifiers
    }

    pub fn get_symbol_char(&self) -> Option<char> {
        match self.symbol {
            KeySymbol::Char(c) => Some(c),
            KeySymbol::Named(_) => None,
        }
    }

    /// 文字入力のために使えるキーイベントならば true
    // SHIFT付きキー入力も明らかにコマンドではない文字入力として扱う。
    pub(crate) fn is_modifierless_input(&self) -> bool {
        self.modifiers.difference(SkkKeyModifier::SHIFT).is_empty()
    }

    ///
    /// Mostly testing purpose.
    ///
    pub fn deserialize_seq(from: &str) -> Result<KeyEventSeq, SkkError> {
        KeyEvent::deserialize_seq_inner(from, Vec::new())
    }

    fn deserialize_seq_inner(keys: &str, mut current: Vec<KeyEvent>) -> Result<KeyEventSeq, SkkError> {
        let keys = keys.trim();
        if keys.is_empty() {
            return Ok(current);
        }
        match KeyEvent::next_tok(keys) {
            Some(tok) => {
                let left = &keys[tok.len()..];
                current.push(KeyEvent::from_str(tok)?);
                KeyEvent::deserialize_seq_inner(left, current)
            }
            _ => Err(SkkError::Error(format!("Syntax error. keys: {keys}"))),
        }
    }

    /// "(foo bar) other" -> "(foo bar)"
    /// "foo bar baz" -> "foo"
    fn next_tok(keys: &str) -> Option<&str> {
        if keys.starts_with('(') {
            let len = keys.find(')');
            len.map(|x| &keys[0..=x])
        } else {
            let len = keys.find(' ');
            match len {
                Some(x) => Some(&keys[0..x]),
                _ => Some(keys),
            }
        }
    }
}

impl FromStr for KeyEvent {
    type Err = SkkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut modifier: SkkKeyModifier = SkkKeyModifier::NONE;
        let mut symbol = None;
        let key = s.trim();
        // parenで囲われているものはスペース区切りのModifierとkeyのみ認める。
        if key.starts_with('(') && key.ends_with(')') {
            let words = key.trim_start_matches('(').trim_end_matches(')').split(' ');
            for word in words {
                match word {
                    "control" => modifier.set(SkkKeyModifier::CONTROL, true),
                    "meta" => modifier.set(SkkKeyModifier::META, true),
                    "alt" => modifier.set(SkkKeyModifier::ALT, true),
                    "shift" => modifier.set(SkkKeyModifier::SHIFT, true),
                    _ => symbol = KeySymbol::from_name(word),
                }
            }
        } else {
            // 簡易な表記として[CMA]- 接頭辞を修飾子として認める。
            let keyname: &str = match key.get(0..2) {
                Some("C-") if key.len() > 2 => {
                    modifier.set(SkkKeyModifier::CONTROL, true);
                    &key[2..]
                }
                Some("M-") if key.len() > 2 => {
                    modifier.set(SkkKeyModifier::META, true);
                    &key[2..]
                }
                Some("A-") if key.len() > 2 => {
                    modifier.set(SkkKeyModifier::ALT, true);
                    &key[2..]
                }
                _ => key,
            };
            symbol = KeySymbol::from_name(keyname);
        }

        match symbol {
            Some(symbol) => Ok(KeyEvent {
                symbol,
                modifiers: modifier,
            }),
            None => Err(SkkError::ParseError(format!("Not a key symbol: {s}"))),
        }
    }
}

impl Display for KeyEvent {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        match self.symbol {
            KeySymbol::Char(c) => write!(formatter, "{}", c),
            KeySymbol::Named(named) => write!(formatter, "{}", named),
        }
    }
}
