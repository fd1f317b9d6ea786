use clap::{Parser, Subcommand};

use crate::archive::MbmModule;

mod archive;

#[derive(Parser)]
#[clap(version)]
pub struct Tablets {
  #[clap(subcommand)]
  module: Module,
}

#[derive(Subcommand)]
enum Module {
  Mbm(MbmModule),
}

impl Tablets {
  pub fn execute(self) -> anyhow::Result<()> {
    match self.module {
      Module::Mbm(module) => module.execute(),
    }
  }
}

fn main() -> anyhow::Result<()> {
  env_logger::init();
  Tablets::parse().execute()
}
