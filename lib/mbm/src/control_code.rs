use crate::catalog::Catalog;

pub const MARKER: u8 = 0x80;
pub const MARKER_EXTENDED: u8 = 0xF8;

pub const TAG_TELOP_IMMEDIATE: u8 = 0x12;
pub const TAG_VOICE_BY_ID: u8 = 0x13;
pub const TAG_VOICE_BY_PATH: u8 = 0x1B;

pub const VOICE_BY_ID_ARGUMENTS: usize = 2;

pub fn is_marker(byte: u8) -> bool {
  byte == MARKER || byte == MARKER_EXTENDED
}

/// How the bytes following a marker are laid out for a given tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodeKind {
  /// Two 4-byte integers.
  VoiceById,
  /// Double-width Shift-JIS characters up to a double-width NUL.
  TelopImmediate,
  /// ASCII bytes up to a NUL, padded back to an even offset.
  VoiceByPath,
  /// A fixed number of 2-byte arguments, taken from the catalog.
  Short(usize),
  /// Not in the catalog, read as a bare code.
  Unknown,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Arguments {
  None,
  Short(Vec<i16>),
  Int(Vec<i32>),
  Str(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlCode {
  marker: u8,
  tag: u8,
  position: usize,
  arguments: Arguments,
  width: usize,
}

impl ControlCode {
  pub fn new(marker: u8, tag: u8, position: usize, arguments: Arguments) -> Self {
    let width = width_of(tag, position, &arguments);
    Self {
      marker,
      tag,
      position,
      arguments,
      width,
    }
  }

  /// Builds a code whose byte width was measured while scanning.
  ///
  /// A decoded string argument need not hold one character per cell it
  /// occupied, invalid cells decode to more than one.
  pub(crate) fn scanned(
    marker: u8,
    tag: u8,
    position: usize,
    arguments: Arguments,
    width: usize,
  ) -> Self {
    Self {
      marker,
      tag,
      position,
      arguments,
      width,
    }
  }

  pub fn marker(&self) -> u8 {
    self.marker
  }

  pub fn tag(&self) -> u8 {
    self.tag
  }

  pub fn position(&self) -> usize {
    self.position
  }

  pub fn arguments(&self) -> &Arguments {
    &self.arguments
  }

  /// Bytes covered by this code, marker included.
  pub fn width(&self) -> usize {
    self.width
  }

  pub fn end(&self) -> usize {
    self.position + self.width
  }

  pub fn describe(&self, catalog: &Catalog) -> String {
    let name = match catalog.description(self.tag) {
      Some(description) => description.to_string(),
      None => format!("0x{:02X}", self.tag),
    };

    match &self.arguments {
      Arguments::None => format!("{name} @ 0x{:04X}", self.position),
      Arguments::Short(values) => format!(
        "{name} @ 0x{:04X} ({})",
        self.position,
        join_hex(values.iter().map(|v| *v as u16 as u32))
      ),
      Arguments::Int(values) => format!(
        "{name} @ 0x{:04X} ({})",
        self.position,
        join_hex(values.iter().map(|v| *v as u32))
      ),
      Arguments::Str(text) => format!("{name} @ 0x{:04X} (\"{text}\")", self.position),
    }
  }
}

pub(crate) fn join_hex(values: impl Iterator<Item = u32>) -> String {
  values
    .map(|value| format!("0x{value:04X}"))
    .collect::<Vec<_>>()
    .join(", ")
}

fn width_of(tag: u8, position: usize, arguments: &Arguments) -> usize {
  match arguments {
    Arguments::None => 2,
    Arguments::Short(values) => 2 + 2 * values.len(),
    Arguments::Int(values) => 2 + 4 * values.len(),
    Arguments::Str(text) if tag == TAG_TELOP_IMMEDIATE => 2 + 2 * (text.chars().count() + 1),
    Arguments::Str(text) => {
      let width = 2 + text.len() + 1;
      width + (position + width) % 2
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::catalog::Catalog;
  use crate::control_code::{Arguments, ControlCode, MARKER};

  #[test]
  fn test_widths() {
    let linebreak = ControlCode::new(MARKER, 0x01, 0, Arguments::None);
    assert_eq!(linebreak.width(), 2);

    let bustup = ControlCode::new(MARKER, 0x58, 4, Arguments::Short(vec![1, 2, 3]));
    assert_eq!(bustup.width(), 8);
    assert_eq!(bustup.end(), 12);

    let voice = ControlCode::new(MARKER, 0x13, 0, Arguments::Int(vec![7, 9]));
    assert_eq!(voice.width(), 10);

    let telop = ControlCode::new(MARKER, 0x12, 0, Arguments::Str("あいう".to_string()));
    assert_eq!(telop.width(), 2 + 2 * 4);

    // 2 + 4 + 1 is odd, one padding byte follows
    let path = ControlCode::new(MARKER, 0x1B, 2, Arguments::Str("vo01".to_string()));
    assert_eq!(path.width(), 8);
    let path = ControlCode::new(MARKER, 0x1B, 2, Arguments::Str("vo001".to_string()));
    assert_eq!(path.width(), 8);
  }

  #[test]
  fn test_describe() {
    let catalog = Catalog::default();

    let color = ControlCode::new(MARKER, 0x04, 6, Arguments::Short(vec![3]));
    assert_eq!(color.describe(&catalog), "Text Color @ 0x0006 (0x0003)");

    let unknown = ControlCode::new(MARKER, 0x7F, 0, Arguments::None);
    assert_eq!(unknown.describe(&catalog), "0x7F @ 0x0000");

    let path = ControlCode::new(MARKER, 0x1B, 0, Arguments::Str("v".to_string()));
    assert_eq!(path.describe(&catalog), "VO Call (Path) @ 0x0000 (\"v\")");
  }
}
