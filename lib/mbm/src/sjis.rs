use std::borrow::Cow;

use encoding_rs::SHIFT_JIS;
use unicode_normalization::UnicodeNormalization;

use crate::control_code::is_marker;
use crate::error::EncodeError;

const IDEOGRAPHIC_SPACE: char = '\u{3000}';
const FULLWIDTH_OFFSET: u32 = 0xFEE0;
const FULLWIDTH_FIRST: char = '\u{FF01}';
const FULLWIDTH_LAST: char = '\u{FF5E}';

pub(crate) fn decode_cell(cell: &[u8]) -> Cow<'_, str> {
  SHIFT_JIS.decode_without_bom_handling(cell).0
}

/// Folds fullwidth ASCII and the ideographic space to their compatibility forms.
///
/// Only width variants are folded, one character at a time, so that
/// [`to_fullwidth`] can restore every folded cell. Fullwidth brackets stay as
/// they are, a plain bracket in display text opens a placeholder.
pub(crate) fn normalize(text: &str) -> String {
  text.chars().map(fold_width).collect()
}

fn fold_width(c: char) -> char {
  if !is_width_variant(c) {
    return c;
  }

  let mut folded = c.nfkc();
  match (folded.next(), folded.next()) {
    (Some(folded), None) => folded,
    _ => c,
  }
}

fn is_width_variant(c: char) -> bool {
  match c {
    '［' | '］' => false,
    IDEOGRAPHIC_SPACE | FULLWIDTH_FIRST..=FULLWIDTH_LAST => true,
    _ => false,
  }
}

/// Inverse of [`normalize`].
pub(crate) fn to_fullwidth(c: char) -> char {
  match c {
    ' ' => IDEOGRAPHIC_SPACE,
    '!'..='~' => char::from_u32(c as u32 + FULLWIDTH_OFFSET).unwrap_or(c),
    _ => c,
  }
}

/// Encodes one character as a two byte cell.
pub(crate) fn encode_cell(c: char) -> Result<[u8; 2], EncodeError> {
  let c = to_fullwidth(c);
  let mut buf = [0u8; 4];
  let (bytes, _, had_errors) = SHIFT_JIS.encode(c.encode_utf8(&mut buf));

  match bytes.as_ref() {
    &[lead, trail] if !had_errors && !is_marker(lead) => Ok([lead, trail]),
    _ => Err(EncodeError::Unencodable(c)),
  }
}

#[cfg(test)]
mod tests {
  use crate::error::EncodeError;
  use crate::sjis::{decode_cell, encode_cell, normalize, to_fullwidth};

  #[test]
  fn test_cells() {
    assert_eq!(encode_cell('A'), Ok([0x82, 0x60]));
    assert_eq!(encode_cell('a'), Ok([0x82, 0x81]));
    assert_eq!(encode_cell(' '), Ok([0x81, 0x40]));
    assert_eq!(encode_cell('あ'), Ok([0x82, 0xA0]));
    assert_eq!(decode_cell(&[0x82, 0xA0]), "あ");
  }

  #[test]
  fn test_fullwidth_folds_back() {
    let decoded = decode_cell(&[0x82, 0x60]);
    assert_eq!(decoded, "Ａ");
    assert_eq!(normalize(&decoded), "A");
  }

  #[test]
  fn test_only_width_variants_fold() {
    assert_eq!(normalize("Ａｚ！～\u{3000}"), "Az!~ ");
    assert_eq!(normalize("…［あ］￥゛℃①"), "…［あ］￥゛℃①");
    assert_eq!(normalize("Ⅰ"), "Ⅰ");
  }

  #[test]
  fn test_fold_is_reversible() {
    for c in ('\u{FF01}'..='\u{FF5E}').chain(['\u{3000}']) {
      let folded = normalize(&c.to_string());
      let restored: String = folded.chars().map(to_fullwidth).collect();
      assert_eq!(restored, c.to_string());
    }
  }

  #[test]
  fn test_single_byte_rejected() {
    assert_eq!(encode_cell('\n'), Err(EncodeError::Unencodable('\n')));
    assert_eq!(encode_cell('😀'), Err(EncodeError::Unencodable('😀')));
  }
}
