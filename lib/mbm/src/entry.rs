use crate::catalog::Catalog;
use crate::control_code::ControlCode;
use crate::encoder;
use crate::error::{EncodeError, ScanError};
use crate::formatter::{format_code, ControlCodeFormatter, Placeholders};
use crate::scanner::scan;
use crate::sjis::{decode_cell, normalize};

/// One populated text slot: its original table index, the payload without
/// its terminator, and the control codes found in it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
  index: u32,
  payload: Vec<u8>,
  control_codes: Vec<ControlCode>,
}

impl Entry {
  pub fn new(
    index: u32,
    payload: Vec<u8>,
    control_codes: Vec<ControlCode>,
  ) -> Result<Self, ScanError> {
    let mut end = 0;
    for code in &control_codes {
      let position = code.position();
      if position % 2 != 0 {
        return Err(ScanError::Misaligned { position });
      }
      if code.end() > payload.len() {
        return Err(ScanError::OutOfBounds {
          position,
          length: payload.len(),
        });
      }
      if position < end {
        return Err(ScanError::Overlap { position });
      }
      end = code.end();
    }

    Ok(Self {
      index,
      payload,
      control_codes,
    })
  }

  pub fn decode(index: u32, payload: Vec<u8>, catalog: &Catalog) -> Result<Self, ScanError> {
    let control_codes = scan(&payload, catalog)?;
    Self::new(index, payload, control_codes)
  }

  pub fn from_text(index: u32, text: &str, catalog: &Catalog) -> Result<Self, EncodeError> {
    let payload = encoder::encode(text, catalog)?;
    Ok(Self::decode(index, payload, catalog)?)
  }

  pub fn index(&self) -> u32 {
    self.index
  }

  pub fn payload(&self) -> &[u8] {
    &self.payload
  }

  pub fn control_codes(&self) -> &[ControlCode] {
    &self.control_codes
  }

  pub fn text(&self) -> String {
    self.text_with(&Placeholders)
  }

  pub fn text_with<F: ControlCodeFormatter + ?Sized>(&self, formatter: &F) -> String {
    let mut buffer = String::with_capacity(self.payload.len());
    let mut codes = self.control_codes.iter().peekable();
    let mut position = 0;

    while position < self.payload.len() {
      match codes.next_if(|code| code.position() == position) {
        Some(code) => {
          buffer.push_str(&format_code(formatter, self, code));
          position = code.end();
        }
        None => {
          let end = (position + 2).min(self.payload.len());
          buffer.push_str(&decode_cell(&self.payload[position..end]));
          position = end;
        }
      }
    }

    normalize(&buffer)
  }
}

#[cfg(test)]
mod tests {
  use crate::catalog::Catalog;
  use crate::control_code::{Arguments, ControlCode, MARKER};
  use crate::entry::Entry;
  use crate::error::ScanError;
  use crate::formatter::ControlCodeFormatter;

  const MIXED: &[u8] = &[
    0x82, 0x60, // Ａ
    0x80, 0x04, 0x03, 0x00, // text color 3
    0x82, 0xA0, // あ
    0x80, 0x01, // linebreak
    0x80, 0x12, 0x82, 0xA2, 0x00, 0x00, // telop "い"
    0x80, 0x13, 0x10, 0x00, 0x00, 0x00, 0x20, 0x00, 0x00, 0x00, // voice by id
    0xF8, 0x02, // new page, extended marker
    0x81, 0x40, // ideographic space
  ];

  #[test]
  fn test_display_text() {
    let entry = Entry::decode(7, MIXED.to_vec(), &Catalog::default()).unwrap();

    assert_eq!(entry.index(), 7);
    assert_eq!(entry.control_codes().len(), 5);
    assert_eq!(
      entry.text(),
      "A[04: 0x0003]あ[01][12: \"い\"][13: 0x0010, 0x0020][F8 02] "
    );
  }

  #[test]
  fn test_text_round_trip() {
    let catalog = Catalog::default();
    let entry = Entry::decode(0, MIXED.to_vec(), &catalog).unwrap();

    let encoded = Entry::from_text(0, &entry.text(), &catalog).unwrap();
    assert_eq!(encoded.payload(), MIXED);
    assert_eq!(encoded, entry);
  }

  struct Tagged;

  impl ControlCodeFormatter for Tagged {
    fn no_arguments(&self, entry: &Entry, code: &ControlCode) -> String {
      format!("<{}:{:02x}>", entry.index(), code.tag())
    }
  }

  #[test]
  fn test_custom_formatter() {
    let entry = Entry::decode(3, vec![0x82, 0xA0, 0x80, 0x01], &Catalog::default()).unwrap();
    assert_eq!(entry.text_with(&Tagged), "あ<3:01>");
  }

  #[test]
  fn test_invariants() {
    let payload = vec![0x80, 0x04, 0x03, 0x00, 0x80, 0x01];

    let overlapping = vec![
      ControlCode::new(MARKER, 0x04, 0, Arguments::Short(vec![3])),
      ControlCode::new(MARKER, 0x01, 2, Arguments::None),
    ];
    assert_eq!(
      Entry::new(0, payload.clone(), overlapping),
      Err(ScanError::Overlap { position: 2 })
    );

    let outside = vec![ControlCode::new(MARKER, 0x01, 6, Arguments::None)];
    assert_eq!(
      Entry::new(0, payload.clone(), outside),
      Err(ScanError::OutOfBounds {
        position: 6,
        length: 6
      })
    );

    let misaligned = vec![ControlCode::new(MARKER, 0x01, 1, Arguments::None)];
    assert_eq!(
      Entry::new(0, payload, misaligned),
      Err(ScanError::Misaligned { position: 1 })
    );
  }
}
