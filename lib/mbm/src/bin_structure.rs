use binrw::{BinRead, BinWrite};

pub const HEADER_SIZE: usize = 8 * 4;
pub const ENTRY_ROW_SIZE: usize = 4 * 4;
pub const VERSION: u32 = 0x0001_0000;
pub const TERMINATOR: [u8; 2] = [0xFF, 0xFF];

#[derive(Debug, BinRead, BinWrite)]
#[brw(little, magic = b"\0\0\0\0MSG2")]
pub struct BinMbmHeader {
  pub version: u32,
  // not load-bearing, written as 0
  pub file_size: u32,
  // unreliable in most titles, informational only
  pub entry_count: u32,
  #[brw(pad_after = 8)]
  pub entry_table_offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
pub struct BinMbmEntryRow {
  pub index: u32,
  pub length: u32,
  #[brw(pad_after = 4)]
  pub offset: u32,
}

impl BinMbmEntryRow {
  pub fn null(index: u32) -> Self {
    Self {
      index,
      length: 0,
      offset: 0,
    }
  }

  pub fn is_null(&self) -> bool {
    self.length == 0 || self.offset == 0
  }
}
