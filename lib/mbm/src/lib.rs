pub use crate::archive::*;
pub use crate::catalog::*;
pub use crate::control_code::*;
pub use crate::encoder::*;
pub use crate::entry::*;
pub use crate::error::*;
pub use crate::formatter::*;
pub use crate::scanner::*;
pub use crate::table::*;

pub mod bin_structure;

mod archive;
mod catalog;
mod control_code;
mod encoder;
mod entry;
mod error;
mod formatter;
mod scanner;
mod sjis;
mod table;
