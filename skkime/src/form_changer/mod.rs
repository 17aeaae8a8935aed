pub(crate) mod ascii_form_changer;
pub(crate) mod kana_form_changer;
