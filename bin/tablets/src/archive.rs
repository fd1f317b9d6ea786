use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::info;
use serde::{Deserialize, Serialize};

use mbm::{Catalog, Mbm};

/// Unpacks and repacks MBM text archives.
#[derive(Parser)]
pub(super) struct MbmModule {
  #[clap(subcommand)]
  command: Command,
  /// Control code catalog (json or yaml) replacing the built-in one.
  #[clap(long, global = true)]
  catalog: Option<PathBuf>,
}

#[derive(Clone, ValueEnum)]
pub enum Format {
  Json,
  Yaml,
}

impl Display for Format {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Format::Json => f.write_str("json"),
      Format::Yaml => f.write_str("yaml"),
    }
  }
}

#[derive(Subcommand)]
enum Command {
  /// Writes every slot of an archive as editable text.
  Unpack {
    in_file: PathBuf,
    out_file: PathBuf,
    #[clap(short, long, default_value_t = Format::Json)]
    format: Format,
  },
  /// Builds an archive from a document written by `unpack`.
  Pack {
    in_file: PathBuf,
    out_file: PathBuf,
    #[clap(short, long, default_value_t = Format::Json)]
    format: Format,
  },
  Ls {
    in_file: PathBuf,
    /// Lists the control codes of every entry.
    #[clap(short = 'c', long)]
    codes: bool,
  },
}

#[derive(Serialize, Deserialize)]
struct Document {
  null_entries_write_index: bool,
  entries: Vec<Option<DocumentEntry>>,
}

#[derive(Serialize, Deserialize)]
struct DocumentEntry {
  index: u32,
  text: String,
}

#[derive(Deserialize)]
struct CatalogFile {
  codes: Vec<CatalogCode>,
}

#[derive(Deserialize)]
struct CatalogCode {
  tag: u8,
  description: String,
  short_arguments: Option<usize>,
}

impl MbmModule {
  pub(super) fn execute(self) -> anyhow::Result<()> {
    let catalog = match &self.catalog {
      Some(path) => read_catalog(path)?,
      None => Catalog::default(),
    };

    match self.command {
      Command::Unpack {
        in_file,
        out_file,
        format,
      } => {
        let mbm = Mbm::read(&in_file, &catalog)?;
        info!(
          "read {} slots, entry table ends at {:?}",
          mbm.len(),
          mbm.entry_table_end()
        );

        let document = Document {
          null_entries_write_index: mbm.null_entries_write_index(),
          entries: mbm
            .entries()
            .iter()
            .map(|entry| {
              entry.as_ref().map(|entry| DocumentEntry {
                index: entry.index(),
                text: entry.text(),
              })
            })
            .collect(),
        };

        let mut file = BufWriter::new(File::create(out_file)?);
        match format {
          Format::Json => serde_json::to_writer_pretty(&mut file, &document)?,
          Format::Yaml => serde_yaml::to_writer(&mut file, &document)?,
        }
        file.flush()?;
      }
      Command::Pack {
        in_file,
        out_file,
        format,
      } => {
        let file = BufReader::new(File::open(&in_file)?);
        let document: Document = match format {
          Format::Json => serde_json::from_reader(file)?,
          Format::Yaml => serde_yaml::from_reader(file)?,
        };

        let mut mbm = Mbm::new(document.null_entries_write_index);
        for entry in document.entries {
          match entry {
            Some(entry) => {
              mbm.push_text(entry.index, &entry.text, &catalog)?;
            }
            None => {
              mbm.push_empty()?;
            }
          }
        }

        mbm.write(&out_file)?;
        info!("wrote {} slots to {}", mbm.len(), out_file.to_string_lossy());
      }
      Command::Ls { in_file, codes } => list(&Mbm::read(&in_file, &catalog)?, &catalog, codes),
    }

    Ok(())
  }
}

fn read_catalog(path: &Path) -> anyhow::Result<Catalog> {
  let file = BufReader::new(File::open(path)?);
  let catalog_file: CatalogFile = match path.extension().and_then(|ext| ext.to_str()) {
    Some("yaml" | "yml") => serde_yaml::from_reader(file)?,
    _ => serde_json::from_reader(file)?,
  };

  Ok(
    catalog_file
      .codes
      .into_iter()
      .fold(Catalog::empty(), |catalog, code| {
        catalog.with_code(code.tag, code.description, code.short_arguments)
      }),
  )
}

fn list(mbm: &Mbm, catalog: &Catalog, codes: bool) {
  println!();
  println!(
    "{:<6} | {:<6} | {}",
    "Slot".bold(),
    "Index".bold(),
    "Text".bold()
  );
  println!("-------+--------+---------------------------------------------");

  for (slot, entry) in mbm.entries().iter().enumerate() {
    let Some(entry) = entry else {
      let index = mbm.row_index(slot).unwrap_or_default();
      println!("{:<6} | {:<6} | {}", slot, index, "(empty)".dimmed());
      continue;
    };

    println!("{:<6} | {:<6} | {}", slot, entry.index(), entry.text());

    if codes {
      for code in entry.control_codes() {
        println!("{:<6} | {:<6} |   {}", "", "", code.describe(catalog).cyan());
      }
    }
  }

  println!();
  println!(
    "{} slots, empty rows {}",
    mbm.len(),
    if mbm.null_entries_write_index() {
      "consume indices"
    } else {
      "carry index 0"
    }
  );
}
