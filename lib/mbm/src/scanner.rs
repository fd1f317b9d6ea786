use std::io::Cursor;

use binrw::{BinReaderExt, BinResult, NullString};
use log::warn;

use crate::catalog::Catalog;
use crate::control_code::{is_marker, Arguments, CodeKind, ControlCode, VOICE_BY_ID_ARGUMENTS};
use crate::error::ScanError;
use crate::sjis::{decode_cell, normalize};

/// Finds every control code in a payload, in order.
///
/// Cells that do not start with a marker byte are literal text and skipped;
/// they are decoded later by the entry codec.
pub fn scan(payload: &[u8], catalog: &Catalog) -> Result<Vec<ControlCode>, ScanError> {
  let mut codes = Vec::new();
  let mut position = 0;

  while position + 1 < payload.len() {
    if !is_marker(payload[position]) {
      position += 2;
      continue;
    }

    let code = read_control_code(payload, position, catalog)?;
    position = code.end();
    codes.push(code);
  }

  Ok(codes)
}

fn read_control_code(
  payload: &[u8],
  position: usize,
  catalog: &Catalog,
) -> Result<ControlCode, ScanError> {
  let marker = payload[position];
  let tag = payload[position + 1];
  let overrun = move |_: binrw::Error| ScanError::Overrun { tag, position };

  let mut reader = Cursor::new(payload);
  reader.set_position((position + 2) as u64);

  let arguments = match catalog.kind(tag) {
    CodeKind::VoiceById => {
      let values: [i32; VOICE_BY_ID_ARGUMENTS] = reader.read_le().map_err(overrun)?;
      Arguments::Int(values.to_vec())
    }
    CodeKind::TelopImmediate => {
      let mut text = String::new();
      loop {
        let cell: [u8; 2] = reader.read_le().map_err(overrun)?;
        if cell == [0, 0] {
          break;
        }
        text.push_str(&decode_cell(&cell));
      }
      Arguments::Str(normalize(&text))
    }
    CodeKind::VoiceByPath => {
      let path: NullString = reader.read_le().map_err(overrun)?;

      // the next code always starts on an even offset
      if reader.position() % 2 == 1 {
        if reader.position() as usize >= payload.len() {
          return Err(ScanError::Overrun { tag, position });
        }
        reader.set_position(reader.position() + 1);
      }

      Arguments::Str(path.0.iter().map(|byte| *byte as char).collect())
    }
    CodeKind::Short(0) => Arguments::None,
    CodeKind::Short(count) => {
      let values = (0..count)
        .map(|_| reader.read_le::<i16>())
        .collect::<BinResult<Vec<_>>>()
        .map_err(overrun)?;
      Arguments::Short(values)
    }
    CodeKind::Unknown => {
      warn!("unknown control code type 0x{tag:02X} at 0x{position:04X}, reading it without arguments");
      Arguments::None
    }
  };

  let width = reader.position() as usize - position;
  Ok(ControlCode::scanned(marker, tag, position, arguments, width))
}
