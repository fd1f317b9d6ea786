use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use binrw::{BinRead, BinWrite};
use log::{debug, warn};

use crate::bin_structure::{
  BinMbmEntryRow, BinMbmHeader, ENTRY_ROW_SIZE, HEADER_SIZE, TERMINATOR, VERSION,
};
use crate::catalog::Catalog;
use crate::entry::Entry;
use crate::error::MbmError;
use crate::formatter::ControlCodeFormatter;
use crate::table::TableBound;

/// An MBM text archive: an ordered list of slots, some of them empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mbm {
  entries: Vec<Option<Entry>>,
  // table index of every row, empty ones included
  row_indices: Vec<u32>,
  // false for EO3 to EO2U, true for EO5 and EON
  null_entries_write_index: bool,
  table_bound: TableBound,
}

impl Mbm {
  pub fn new(null_entries_write_index: bool) -> Self {
    Self {
      null_entries_write_index,
      ..Self::default()
    }
  }

  pub fn read(path: &Path, catalog: &Catalog) -> Result<Self, MbmError> {
    let mut file = BufReader::new(File::open(path)?);
    Self::from_reader(&mut file, catalog)
  }

  /// Reads a whole archive.
  ///
  /// An archive that ends inside its header or entry table has no usable
  /// entries and comes back empty.
  pub fn from_reader<R: Read + Seek>(reader: &mut R, catalog: &Catalog) -> Result<Self, MbmError> {
    let archive_len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;

    let header = match BinMbmHeader::read(reader) {
      Ok(header) => header,
      Err(err) if err.is_eof() => {
        warn!("archive ends inside its header, treating it as empty");
        return Ok(Self::default());
      }
      Err(err) => return Err(err.into()),
    };
    reader.seek(SeekFrom::Start(header.entry_table_offset as u64))?;

    let mut mbm = Self::default();
    while mbm.table_bound.allows(reader.stream_position()?) {
      let row = match BinMbmEntryRow::read(reader) {
        Ok(row) => row,
        Err(err) if err.is_eof() => {
          warn!("entry table runs into the end of the archive, treating it as empty");
          return Ok(Self::default());
        }
        Err(err) => return Err(err.into()),
      };
      mbm.read_row(reader, row, archive_len, catalog)?;
    }

    if mbm.entries.len() != header.entry_count as usize {
      debug!(
        "header declares {} entries, the table holds {}",
        header.entry_count,
        mbm.entries.len()
      );
    }

    Ok(mbm)
  }

  fn read_row<R: Read + Seek>(
    &mut self,
    reader: &mut R,
    row: BinMbmEntryRow,
    archive_len: u64,
    catalog: &Catalog,
  ) -> Result<(), MbmError> {
    let slot = self.entries.len();
    if self.table_bound.observe(&row) {
      debug!("entry table ends at {:#x}", row.offset);
    }
    self.row_indices.push(row.index);

    if row.is_null() {
      if row.index != 0 && !self.null_entries_write_index {
        debug!("empty slot {slot} carries index {}, empty rows consume indices", row.index);
        self.null_entries_write_index = true;
      }
      self.entries.push(None);
      return Ok(());
    }

    if row.offset as u64 + row.length as u64 > archive_len {
      return Err(MbmError::PayloadOutOfBounds {
        slot,
        offset: row.offset,
        length: row.length,
      });
    }

    let resume = reader.stream_position()?;
    reader.seek(SeekFrom::Start(row.offset as u64))?;
    let mut data = vec![0u8; row.length as usize];
    reader.read_exact(&mut data)?;
    reader.seek(SeekFrom::Start(resume))?;

    if !data.ends_with(&TERMINATOR) {
      return Err(MbmError::MissingTerminator { slot });
    }
    data.truncate(data.len() - TERMINATOR.len());

    let entry =
      Entry::decode(row.index, data, catalog).map_err(|source| MbmError::Scan { slot, source })?;
    self.entries.push(Some(entry));

    Ok(())
  }

  pub fn write(&self, path: &Path) -> Result<(), MbmError> {
    let mut file = BufWriter::new(File::create(path)?);
    self.to_writer(&mut file)?;
    file.flush()?;
    Ok(())
  }

  pub fn to_bytes(&self) -> Result<Vec<u8>, MbmError> {
    let mut cursor = Cursor::new(Vec::new());
    self.to_writer(&mut cursor)?;
    Ok(cursor.into_inner())
  }

  /// Writes the header, every table row, then every payload, in slot order.
  pub fn to_writer<W: Write + Seek>(&self, writer: &mut W) -> Result<(), MbmError> {
    let header = BinMbmHeader {
      version: VERSION,
      file_size: 0,
      entry_count: to_u32(self.entries.len())?,
      entry_table_offset: HEADER_SIZE as u32,
    };
    header.write(writer)?;

    for row in self.rows()? {
      row.write(writer)?;
    }

    for entry in self.entries.iter().flatten() {
      writer.write_all(entry.payload())?;
      writer.write_all(&TERMINATOR)?;
    }

    Ok(())
  }

  fn rows(&self) -> Result<Vec<BinMbmEntryRow>, MbmError> {
    let mut payload_offset = HEADER_SIZE + ENTRY_ROW_SIZE * self.entries.len();

    self
      .entries
      .iter()
      .enumerate()
      .map(|(slot, entry)| -> Result<BinMbmEntryRow, MbmError> {
        let Some(entry) = entry else {
          return Ok(BinMbmEntryRow::null(self.null_row_index(slot)?));
        };

        let length = entry.payload().len() + TERMINATOR.len();
        let row = BinMbmEntryRow {
          index: entry.index(),
          length: to_u32(length)?,
          offset: to_u32(payload_offset)?,
        };
        payload_offset += length;
        Ok(row)
      })
      .collect()
  }

  fn null_row_index(&self, slot: usize) -> Result<u32, MbmError> {
    if self.null_entries_write_index {
      to_u32(slot)
    } else {
      Ok(0)
    }
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn get(&self, slot: usize) -> Option<&Entry> {
    self.entries.get(slot).and_then(Option::as_ref)
  }

  pub fn entries(&self) -> &[Option<Entry>] {
    &self.entries
  }

  pub fn row_index(&self, slot: usize) -> Option<u32> {
    self.row_indices.get(slot).copied()
  }

  pub fn null_entries_write_index(&self) -> bool {
    self.null_entries_write_index
  }

  pub fn set_null_entries_write_index(&mut self, null_entries_write_index: bool) {
    self.null_entries_write_index = null_entries_write_index;
  }

  /// Offset the entry table was found to end at, if any populated row was read.
  pub fn entry_table_end(&self) -> Option<u64> {
    self.table_bound.end()
  }

  pub fn text(&self, slot: usize) -> Option<String> {
    self.get(slot).map(Entry::text)
  }

  pub fn text_with<F: ControlCodeFormatter + ?Sized>(
    &self,
    slot: usize,
    formatter: &F,
  ) -> Option<String> {
    self.get(slot).map(|entry| entry.text_with(formatter))
  }

  /// Re-encodes the text of a slot. Empty slots take their slot number as index.
  pub fn set_text(&mut self, slot: usize, text: &str, catalog: &Catalog) -> Result<(), MbmError> {
    let index = match self.entries.get(slot) {
      None => return Err(MbmError::SlotOutOfRange(slot)),
      Some(Some(entry)) => entry.index(),
      Some(None) => to_u32(slot)?,
    };

    let entry =
      Entry::from_text(index, text, catalog).map_err(|source| MbmError::Encode { slot, source })?;
    self.entries[slot] = Some(entry);
    self.row_indices[slot] = index;

    Ok(())
  }

  pub fn push(&mut self, entry: Option<Entry>) -> Result<usize, MbmError> {
    let slot = self.entries.len();
    let index = match &entry {
      Some(entry) => entry.index(),
      None => self.null_row_index(slot)?,
    };

    self.entries.push(entry);
    self.row_indices.push(index);
    Ok(slot)
  }

  pub fn push_text(&mut self, index: u32, text: &str, catalog: &Catalog) -> Result<usize, MbmError> {
    let slot = self.entries.len();
    let entry =
      Entry::from_text(index, text, catalog).map_err(|source| MbmError::Encode { slot, source })?;
    self.push(Some(entry))
  }

  pub fn push_empty(&mut self) -> Result<usize, MbmError> {
    self.push(None)
  }

  pub fn clear(&mut self, slot: usize) -> Result<(), MbmError> {
    if slot >= self.entries.len() {
      return Err(MbmError::SlotOutOfRange(slot));
    }

    self.entries[slot] = None;
    self.row_indices[slot] = self.null_row_index(slot)?;
    Ok(())
  }
}

fn to_u32(value: usize) -> Result<u32, MbmError> {
  u32::try_from(value).map_err(|_| MbmError::TooLarge)
}

#[cfg(test)]
mod tests {
  use crate::archive::to_u32;
  use crate::error::MbmError;

  #[test]
  fn test_slot_numbers_are_checked() {
    assert_eq!(to_u32(7).unwrap(), 7);

    #[cfg(target_pointer_width = "64")]
    assert!(matches!(
      to_u32(u32::MAX as usize + 1),
      Err(MbmError::TooLarge)
    ));
  }
}
