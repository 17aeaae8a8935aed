use crate::keyevent::{KeyEvent, KeySymbol, NamedKey, SkkKeyModifier};

///
/// 状態遷移に渡す一回分の入力。キーイベントから作る。
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// 文字入力。Shift付きのアルファベットは大文字になっている
    Input(char),
    /// 変換、次の候補
    Space,
    /// 確定
    Enter,
    Backspace,
    Left,
    Right,
    /// 前の候補
    Up,
    /// 次の候補
    Down,
    /// C-g, Escape
    Cancel,
    /// C-j
    Hiragana,
    /// C-q
    HankakuKatakana,
    /// 処理しない入力
    Unhandled,
}

impl Action {
    pub fn from_key_event(key_event: &KeyEvent) -> Self {
        let modifier = key_event.get_modifier();
        if modifier == SkkKeyModifier::CONTROL {
            return match key_event.get_symbol() {
                KeySymbol::Char(c) => match c.to_ascii_lowercase() {
                    'g' => Action::Cancel,
                    'j' => Action::Hiragana,
                    'q' => Action::HankakuKatakana,
                    'm' => Action::Enter,
                    'h' => Action::Backspace,
                    'b' => Action::Left,
                    'f' => Action::Right,
                    'p' => Action::Up,
                    'n' => Action::Down,
                    _ => Action::Unhandled,
                },
                KeySymbol::Named(_) => Action::Unhandled,
            };
        }
        if !key_event.is_modifierless_input() {
            return Action::Unhandled;
        }
        match key_event.get_symbol() {
            KeySymbol::Named(named) => match named {
                NamedKey::Return => Action::Enter,
                NamedKey::BackSpace => Action::Backspace,
                NamedKey::Left => Action::Left,
                NamedKey::Right => Action::Right,
                NamedKey::Up => Action::Up,
                NamedKey::Down => Action::Down,
                NamedKey::Escape => Action::Cancel,
                _ => Action::Unhandled,
            },
            KeySymbol::Char(' ') => Action::Space,
            KeySymbol::Char(c) if c.is_control() => Action::Unhandled,
            KeySymbol::Char(c) => {
                if modifier.contains(SkkKeyModifier::SHIFT) {
                    Action::Input(c.to_ascii_uppercase())
                } else {
                    Action::Input(c)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn action(key: &str) -> Action {
        Action::from_key_event(&KeyEvent::from_str(key).unwrap())
    }

    #[test]
    fn printable() {
        assert_eq!(Action::Input('a'), action("a"));
        assert_eq!(Action::Input('A'), action("A"));
        assert_eq!(Action::Input('A'), action("(shift a)"));
        assert_eq!(Action::Input('.'), action("period"));
        assert_eq!(Action::Space, action("space"));
        assert_eq!(Action::Input('K'), action("K"));
    }

    #[test]
    fn control_keys() {
        assert_eq!(Action::Cancel, action("C-g"));
        assert_eq!(Action::Cancel, action("Escape"));
        assert_eq!(Action::Hiragana, action("(control j)"));
        assert_eq!(Action::HankakuKatakana, action("C-q"));
        assert_eq!(Action::Enter, action("C-m"));
        assert_eq!(Action::Enter, action("Return"));
        assert_eq!(Action::Backspace, action("C-h"));
        assert_eq!(Action::Left, action("C-b"));
        assert_eq!(Action::Down, action("C-n"));
        assert_eq!(Action::Unhandled, action("C-z"));
        assert_eq!(Action::Unhandled, action("M-x"));
        assert_eq!(Action::Unhandled, action("Tab"));
    }
}
