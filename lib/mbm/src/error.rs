use thiserror::Error;

#[derive(Error, Debug)]
pub enum MbmError {
  #[error(transparent)]
  Binary(#[from] binrw::Error),
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error("slot {slot} points to {length} bytes at {offset:#x}, past the end of the archive")]
  PayloadOutOfBounds { slot: usize, offset: u32, length: u32 },
  #[error("entry in slot {slot} is missing its 0xFFFF terminator")]
  MissingTerminator { slot: usize },
  #[error("entry in slot {slot} is malformed: {source}")]
  Scan {
    slot: usize,
    #[source]
    source: ScanError,
  },
  #[error("text for slot {slot} can not be encoded: {source}")]
  Encode {
    slot: usize,
    #[source]
    source: EncodeError,
  },
  #[error("slot {0} does not exist in this archive")]
  SlotOutOfRange(usize),
  #[error("archive does not fit the 32-bit offsets of its entry table")]
  TooLarge,
}

/// Structural problems found while tokenizing a payload.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScanError {
  #[error("control code {tag:#04x} at {position:#06x} runs past the end of the payload")]
  Overrun { tag: u8, position: usize },
  #[error("control code at {position:#06x} lies outside a payload of {length} bytes")]
  OutOfBounds { position: usize, length: usize },
  #[error("control code at {position:#06x} overlaps the code before it")]
  Overlap { position: usize },
  #[error("control code at {position:#06x} does not start on a two byte cell")]
  Misaligned { position: usize },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EncodeError {
  #[error("placeholder `{token}` is malformed: {reason}")]
  MalformedPlaceholder { token: String, reason: &'static str },
  #[error("placeholder `{token}` takes {expected} argument(s), found {found}")]
  ArgumentCount {
    token: String,
    expected: usize,
    found: usize,
  },
  #[error("placeholder `{token}` expects {expected}")]
  ArgumentShape { token: String, expected: &'static str },
  #[error("character {0:?} has no double-width form in Shift-JIS")]
  Unencodable(char),
  #[error(transparent)]
  Scan(#[from] ScanError),
}
