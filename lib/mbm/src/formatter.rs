use crate::control_code::{join_hex, Arguments, ControlCode, MARKER};
use crate::entry::Entry;

/// Renders control codes into display text, one hook per argument shape.
///
/// The provided bodies produce the bracket placeholders the encoder reads
/// back: `[TT]`, `[TT: 0xNNNN, ...]` and `[TT: "text"]`, with the marker
/// spelled out as `[MM TT...]` when it is not 0x80.
pub trait ControlCodeFormatter {
  fn no_arguments(&self, _entry: &Entry, code: &ControlCode) -> String {
    format!("[{}]", head(code))
  }

  fn short_arguments(&self, _entry: &Entry, code: &ControlCode, values: &[i16]) -> String {
    let values = values.iter().map(|value| *value as u16 as u32);
    format!("[{}: {}]", head(code), join_hex(values))
  }

  fn int_arguments(&self, _entry: &Entry, code: &ControlCode, values: &[i32]) -> String {
    let values = values.iter().map(|value| *value as u32);
    format!("[{}: {}]", head(code), join_hex(values))
  }

  fn string_argument(&self, _entry: &Entry, code: &ControlCode, text: &str) -> String {
    format!("[{}: \"{}\"]", head(code), text)
  }
}

/// The default bracket placeholders.
#[derive(Clone, Copy, Debug, Default)]
pub struct Placeholders;

impl ControlCodeFormatter for Placeholders {}

pub(crate) fn format_code<F: ControlCodeFormatter + ?Sized>(
  formatter: &F,
  entry: &Entry,
  code: &ControlCode,
) -> String {
  match code.arguments() {
    Arguments::None => formatter.no_arguments(entry, code),
    Arguments::Short(values) => formatter.short_arguments(entry, code, values),
    Arguments::Int(values) => formatter.int_arguments(entry, code, values),
    Arguments::Str(text) => formatter.string_argument(entry, code, text),
  }
}

fn head(code: &ControlCode) -> String {
  if code.marker() == MARKER {
    format!("{:02X}", code.tag())
  } else {
    format!("{:02X} {:02X}", code.marker(), code.tag())
  }
}
