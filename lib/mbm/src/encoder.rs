use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::Catalog;
use crate::control_code::{is_marker, CodeKind, MARKER, VOICE_BY_ID_ARGUMENTS};
use crate::error::EncodeError;
use crate::sjis::encode_cell;

static PLACEHOLDER: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\[.*?\]").expect("placeholder pattern is valid"));
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\[(?:(?P<marker>[0-9A-Fa-f]{2}) )?(?P<tag>[0-9A-Fa-f]{2})(?:: (?P<arguments>.*))?\]$")
    .expect("token pattern is valid")
});
static STRING_ARGUMENT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r#"^"(.*)"$"#).expect("string argument pattern is valid"));
static HEX_ARGUMENT: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^0[xX]([0-9A-Fa-f]{1,8})$").expect("hex argument pattern is valid"));

/// A bracketed placeholder found in display text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placeholder<'a> {
  /// Byte offset of the opening bracket.
  pub start: usize,
  pub token: &'a str,
}

impl Placeholder<'_> {
  pub fn end(&self) -> usize {
    self.start + self.token.len()
  }
}

enum ParsedArguments<'a> {
  None,
  Numbers(Vec<u32>),
  Text(&'a str),
}

/// Finds the shortest `[...]` spans, left to right.
pub fn find_placeholders(text: &str) -> Vec<Placeholder<'_>> {
  PLACEHOLDER
    .find_iter(text)
    .map(|found| Placeholder {
      start: found.start(),
      token: found.as_str(),
    })
    .collect()
}

/// Turns display text back into payload bytes, without the terminator.
///
/// Literal text between placeholders is folded to fullwidth and written as
/// Shift-JIS cells, each placeholder is written as its control code bytes in
/// place, so codes sit directly between their neighbouring cells.
pub fn encode(text: &str, catalog: &Catalog) -> Result<Vec<u8>, EncodeError> {
  let mut bytes = Vec::with_capacity(text.len() * 2);
  let mut literal_start = 0;

  for placeholder in find_placeholders(text) {
    encode_literal(&text[literal_start..placeholder.start], &mut bytes)?;
    encode_placeholder(placeholder.token, catalog, &mut bytes)?;
    literal_start = placeholder.end();
  }
  encode_literal(&text[literal_start..], &mut bytes)?;

  Ok(bytes)
}

fn encode_literal(text: &str, bytes: &mut Vec<u8>) -> Result<(), EncodeError> {
  for c in text.chars() {
    bytes.extend(encode_cell(c)?);
  }
  Ok(())
}

fn encode_placeholder(
  token: &str,
  catalog: &Catalog,
  bytes: &mut Vec<u8>,
) -> Result<(), EncodeError> {
  let (marker, tag, arguments) = parse_placeholder(token)?;
  let kind = catalog.kind(tag);

  bytes.extend([marker, tag]);

  match (kind, arguments) {
    (CodeKind::Unknown, ParsedArguments::None) => {}
    (CodeKind::Short(count), ParsedArguments::None) => expect_count(token, count, 0)?,
    (CodeKind::Short(count), ParsedArguments::Numbers(values)) => {
      expect_count(token, count, values.len())?;
      for value in values {
        let value = u16::try_from(value).map_err(|_| EncodeError::ArgumentShape {
          token: token.to_string(),
          expected: "2-byte values",
        })?;
        bytes.extend(value.to_le_bytes());
      }
    }
    (CodeKind::VoiceById, ParsedArguments::Numbers(values)) => {
      expect_count(token, VOICE_BY_ID_ARGUMENTS, values.len())?;
      for value in values {
        bytes.extend(value.to_le_bytes());
      }
    }
    (CodeKind::TelopImmediate, ParsedArguments::Text(text)) => {
      encode_literal(text, bytes)?;
      bytes.extend([0, 0]);
    }
    (CodeKind::VoiceByPath, ParsedArguments::Text(path)) => {
      for c in path.chars() {
        match u8::try_from(c) {
          Ok(byte) if byte != 0 => bytes.push(byte),
          _ => return Err(EncodeError::Unencodable(c)),
        }
      }
      bytes.push(0);
      if bytes.len() % 2 == 1 {
        bytes.push(0);
      }
    }
    (kind, _) => {
      return Err(EncodeError::ArgumentShape {
        token: token.to_string(),
        expected: expected_shape(kind),
      })
    }
  }

  Ok(())
}

fn parse_placeholder(token: &str) -> Result<(u8, u8, ParsedArguments<'_>), EncodeError> {
  let malformed = |reason| EncodeError::MalformedPlaceholder {
    token: token.to_string(),
    reason,
  };

  let captures = TOKEN
    .captures(token)
    .ok_or_else(|| malformed("expected `[TT]`, `[MM TT]` or `[TT: arguments]`"))?;

  let tag = hex_byte(&captures["tag"]);
  let marker = match captures.name("marker") {
    None => MARKER,
    Some(marker) => match hex_byte(marker.as_str()) {
      marker if is_marker(marker) => marker,
      _ => return Err(malformed("first byte is not a control code marker")),
    },
  };

  let arguments = match captures.name("arguments").map(|m| m.as_str()) {
    None => ParsedArguments::None,
    Some(rest) => match STRING_ARGUMENT.captures(rest) {
      Some(string) => ParsedArguments::Text(string.get(1).map_or("", |m| m.as_str())),
      None => ParsedArguments::Numbers(
        rest
          .split(',')
          .map(|value| parse_hex_value(value.trim()))
          .collect::<Option<Vec<_>>>()
          .ok_or_else(|| malformed("argument is not a 0x prefixed hex value"))?,
      ),
    },
  };

  Ok((marker, tag, arguments))
}

// both callers only pass two hex digits matched by `TOKEN`
fn hex_byte(digits: &str) -> u8 {
  u8::from_str_radix(digits, 16).unwrap_or_default()
}

fn parse_hex_value(value: &str) -> Option<u32> {
  let digits = HEX_ARGUMENT.captures(value)?.get(1)?;
  u32::from_str_radix(digits.as_str(), 16).ok()
}

fn expect_count(token: &str, expected: usize, found: usize) -> Result<(), EncodeError> {
  if expected == found {
    return Ok(());
  }

  Err(EncodeError::ArgumentCount {
    token: token.to_string(),
    expected,
    found,
  })
}

fn expected_shape(kind: CodeKind) -> &'static str {
  match kind {
    CodeKind::VoiceById => "two 0x prefixed integers",
    CodeKind::TelopImmediate | CodeKind::VoiceByPath => "one quoted string",
    CodeKind::Short(_) => "0x prefixed 2-byte values",
    CodeKind::Unknown => "no arguments",
  }
}

#[cfg(test)]
mod tests {
  use crate::catalog::Catalog;
  use crate::encoder::{encode, find_placeholders, Placeholder};
  use crate::error::EncodeError;

  #[test]
  fn test_hello_world() {
    let bytes = encode("Hello[01]World", &Catalog::default()).unwrap();

    assert_eq!(
      bytes,
      [
        0x82, 0x67, 0x82, 0x85, 0x82, 0x8C, 0x82, 0x8C, 0x82, 0x8F, // Ｈｅｌｌｏ
        0x80, 0x01, // linebreak at character 5
        0x82, 0x76, 0x82, 0x8F, 0x82, 0x92, 0x82, 0x8C, 0x82, 0x84, // Ｗｏｒｌｄ
      ]
    );
  }

  #[test]
  fn test_find_placeholders() {
    let text = "あ[04: 0x0001]い[01";
    assert_eq!(
      find_placeholders(text),
      vec![Placeholder {
        start: 3,
        token: "[04: 0x0001]"
      }]
    );
  }

  #[test]
  fn test_arguments() {
    let catalog = Catalog::default();

    assert_eq!(
      encode("[58: 0x0001, 0x0002, 0xFFFF]", &catalog).unwrap(),
      [0x80, 0x58, 0x01, 0x00, 0x02, 0x00, 0xFF, 0xFF]
    );
    assert_eq!(
      encode("[13: 0x0001, 0xFFFFFFFF]", &catalog).unwrap(),
      [0x80, 0x13, 0x01, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]
    );
    assert_eq!(
      encode("[1B: \"vo01\"][01]", &catalog).unwrap(),
      [0x80, 0x1B, b'v', b'o', b'0', b'1', 0x00, 0x00, 0x80, 0x01]
    );
    assert_eq!(
      encode("[12: \"あ\"]", &catalog).unwrap(),
      [0x80, 0x12, 0x82, 0xA0, 0x00, 0x00]
    );
    assert_eq!(encode("[F8 7F]", &catalog).unwrap(), [0xF8, 0x7F]);
  }

  #[test]
  fn test_malformed_placeholders() {
    let catalog = Catalog::default();

    assert!(matches!(
      encode("[zz]", &catalog),
      Err(EncodeError::MalformedPlaceholder { .. })
    ));
    assert!(matches!(
      encode("[01 02]", &catalog),
      Err(EncodeError::MalformedPlaceholder { .. })
    ));
    assert!(matches!(
      encode("[04: 3]", &catalog),
      Err(EncodeError::MalformedPlaceholder { .. })
    ));
    assert_eq!(
      encode("[04]", &catalog),
      Err(EncodeError::ArgumentCount {
        token: "[04]".to_string(),
        expected: 1,
        found: 0
      })
    );
    assert!(matches!(
      encode("[04: 0x10000]", &catalog),
      Err(EncodeError::ArgumentShape { .. })
    ));
    assert!(matches!(
      encode("[13: \"x\"]", &catalog),
      Err(EncodeError::ArgumentShape { .. })
    ));
  }

  #[test]
  fn test_unencodable_text() {
    assert_eq!(
      encode("a\nb", &Catalog::default()),
      Err(EncodeError::Unencodable('\n'))
    );
  }
}
