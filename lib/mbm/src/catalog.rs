use std::collections::HashMap;

use crate::control_code::{CodeKind, TAG_TELOP_IMMEDIATE, TAG_VOICE_BY_ID, TAG_VOICE_BY_PATH};

/// Built-in table for the Etrian Odyssey family: tag, description, fixed short argument count.
const ETRIAN_ODYSSEY_CODES: &[(u8, &str, Option<usize>)] = &[
  (0x01, "Linebreak", Some(0)),
  (0x02, "New Page", Some(0)),
  (0x04, "Text Color", Some(1)),
  (0x06, "Wait for Input", Some(0)),
  (0x10, "FlowScript String", Some(1)),
  (0x11, "Type 1 Non-FlowScript String", Some(1)),
  (0x12, "Set Telop (Imm.)", None),
  (0x13, "VO Call (ID)", None),
  (0x14, "Type 2 Non-FlowScript String", Some(1)),
  (0x15, "Type 3 Non-FlowScript String", Some(1)),
  (0x17, "Unknown (SSQ2 + SQ5 Only)", Some(0)),
  (0x19, "Food Effect Value", Some(1)),
  (0x1B, "VO Call (Path)", None),
  (0x40, "Guild Name", Some(0)),
  (0x41, "Item Name", Some(1)),
  (0x42, "Enemy Name", Some(1)),
  (0x43, "PC Name", Some(1)),
  (0x44, "Ship Name", Some(0)),
  (0x45, "Ingredient Icon + Name", Some(1)),
  (0x46, "Conditional Linebreak", Some(0)),
  (0x47, "Level Recommendation (QR)", Some(0)),
  (0x48, "Enemy Name (QR/Req)", Some(1)),
  (0x49, "Item Name (QR/Req)", Some(1)),
  (0x4A, "Quantity (QR/Req)", Some(1)),
  (0x50, "Quest Name (QR/Req)", Some(0)),
  (0x51, "Reward (QR/Req)", Some(0)),
  (0x52, "Floor (Req)", Some(0)),
  (0x53, "Protag Name (EOU)", Some(0)),
  (0x54, "Conditional Text Color", Some(1)),
  (0x55, "Bustup Expression", Some(2)),
  (0x56, "Frederica Name", Some(0)),
  (0x57, "Guild House Name", Some(0)),
  (0x58, "Unk Bustup Change", Some(3)),
  (0x59, "Set Telop", Some(1)),
  (0x5A, "Type 1 Data Section Value", Some(1)),
  (0x5B, "Type 1 Data Section Value", Some(1)),
  (0x5C, "Telop Off", Some(0)),
  (0x5E, "Protag Chloe Name", Some(0)),
  (0x5F, "Arianna Chloe Name", Some(0)),
  (0x60, "Flavio Chloe Name", Some(0)),
  (0x7A, "Unk Debug", Some(1)),
];

#[derive(Clone, Debug, PartialEq, Eq)]
struct CatalogCode {
  description: String,
  short_arguments: Option<usize>,
}

/// Read-only control code metadata, keyed by type tag.
///
/// The three string/int carrying tags are dispatched by the scanner itself,
/// every other tag takes its argument count from here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
  codes: HashMap<u8, CatalogCode>,
}

impl Catalog {
  pub fn empty() -> Self {
    Self {
      codes: HashMap::new(),
    }
  }

  pub fn with_code(
    mut self,
    tag: u8,
    description: impl Into<String>,
    short_arguments: Option<usize>,
  ) -> Self {
    self.codes.insert(
      tag,
      CatalogCode {
        description: description.into(),
        short_arguments,
      },
    );
    self
  }

  pub fn description(&self, tag: u8) -> Option<&str> {
    self.codes.get(&tag).map(|code| code.description.as_str())
  }

  pub fn short_argument_count(&self, tag: u8) -> Option<usize> {
    self.codes.get(&tag).and_then(|code| code.short_arguments)
  }

  pub fn kind(&self, tag: u8) -> CodeKind {
    match tag {
      TAG_VOICE_BY_ID => CodeKind::VoiceById,
      TAG_TELOP_IMMEDIATE => CodeKind::TelopImmediate,
      TAG_VOICE_BY_PATH => CodeKind::VoiceByPath,
      _ => match self.short_argument_count(tag) {
        Some(count) => CodeKind::Short(count),
        None => CodeKind::Unknown,
      },
    }
  }

  pub fn len(&self) -> usize {
    self.codes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.codes.is_empty()
  }
}

impl Default for Catalog {
  fn default() -> Self {
    ETRIAN_ODYSSEY_CODES
      .iter()
      .fold(Self::empty(), |catalog, (tag, description, short_arguments)| {
        catalog.with_code(*tag, *description, *short_arguments)
      })
  }
}

#[cfg(test)]
mod tests {
  use crate::catalog::Catalog;
  use crate::control_code::CodeKind;

  #[test]
  fn test_default_kinds() {
    let catalog = Catalog::default();

    assert_eq!(catalog.kind(0x01), CodeKind::Short(0));
    assert_eq!(catalog.kind(0x04), CodeKind::Short(1));
    assert_eq!(catalog.kind(0x55), CodeKind::Short(2));
    assert_eq!(catalog.kind(0x58), CodeKind::Short(3));
    assert_eq!(catalog.kind(0x12), CodeKind::TelopImmediate);
    assert_eq!(catalog.kind(0x13), CodeKind::VoiceById);
    assert_eq!(catalog.kind(0x1B), CodeKind::VoiceByPath);
    assert_eq!(catalog.kind(0x7F), CodeKind::Unknown);
    assert_eq!(catalog.description(0x01), Some("Linebreak"));
  }

  #[test]
  fn test_custom_catalog_overrides() {
    let catalog = Catalog::empty().with_code(0x01, "Break", Some(2));

    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.kind(0x01), CodeKind::Short(2));
    assert_eq!(catalog.kind(0x02), CodeKind::Unknown);
    // special tags do not depend on the table
    assert_eq!(catalog.kind(0x13), CodeKind::VoiceById);
  }
}
