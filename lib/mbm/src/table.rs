use crate::bin_structure::BinMbmEntryRow;

/// Where the entry table stops.
///
/// The declared entry count can not be trusted, so the table is read until
/// the first populated row is seen. Its payload is the earliest one in the
/// file, so its offset is where the table ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TableBound {
  #[default]
  Unbounded,
  Fixed(u64),
}

impl TableBound {
  /// Feeds one row to the scan. Returns true when this row fixed the bound.
  pub fn observe(&mut self, row: &BinMbmEntryRow) -> bool {
    match self {
      TableBound::Unbounded if !row.is_null() => {
        *self = TableBound::Fixed(row.offset as u64);
        true
      }
      _ => false,
    }
  }

  /// Whether another row may start at `position`.
  pub fn allows(&self, position: u64) -> bool {
    match self {
      TableBound::Unbounded => true,
      TableBound::Fixed(end) => position < *end,
    }
  }

  pub fn end(&self) -> Option<u64> {
    match self {
      TableBound::Unbounded => None,
      TableBound::Fixed(end) => Some(*end),
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::bin_structure::BinMbmEntryRow;
  use crate::table::TableBound;

  #[test]
  fn test_first_populated_row_fixes_bound() {
    let mut bound = TableBound::default();

    assert!(!bound.observe(&BinMbmEntryRow::null(0)));
    assert!(bound.allows(u64::MAX));

    let first = BinMbmEntryRow {
      index: 1,
      length: 4,
      offset: 0x60,
    };
    assert!(bound.observe(&first));
    assert_eq!(bound.end(), Some(0x60));
    assert!(bound.allows(0x50));
    assert!(!bound.allows(0x60));

    let later = BinMbmEntryRow {
      index: 2,
      length: 4,
      offset: 0x40,
    };
    assert!(!bound.observe(&later));
    assert_eq!(bound, TableBound::Fixed(0x60));
  }
}
