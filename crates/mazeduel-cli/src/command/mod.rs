use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mazeduel_constraints::storage::JsonDirStorage;

use self::{
    choose::ChooseArg, find_path::FindPathArg, inspect::InspectArg, merge::MergeArg,
    record::RecordArg, start_session::StartSessionArg, train::TrainArg,
};

mod choose;
mod find_path;
mod inspect;
mod merge;
mod record;
mod start_session;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Start a new recording session, clearing both role logs
    StartSession(#[clap(flatten)] StartSessionArg),
    /// Record one observed constraint for a role
    Record(#[clap(flatten)] RecordArg),
    /// Append both role logs to the merged training log
    Merge(#[clap(flatten)] MergeArg),
    /// Summarize the role logs and the merged log
    Inspect(#[clap(flatten)] InspectArg),
    /// Train a policy on the merged log using the genetic algorithm
    Train(#[clap(flatten)] TrainArg),
    /// Pick an action for a state with a trained policy
    Choose(#[clap(flatten)] ChooseArg),
    /// Find a route through a grid layout
    FindPath(#[clap(flatten)] FindPathArg),
}

/// Location of the constraint logs.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DataDirArg {
    /// Directory holding the role logs and the merged log
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,
}

impl DataDirArg {
    pub(crate) fn storage(&self) -> JsonDirStorage {
        JsonDirStorage::new(&self.data_dir)
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::StartSession(arg) => start_session::run(&arg)?,
        Mode::Record(arg) => record::run(&arg)?,
        Mode::Merge(arg) => merge::run(&arg)?,
        Mode::Inspect(arg) => inspect::run(&arg)?,
        Mode::Train(arg) => train::run(&arg)?,
        Mode::Choose(arg) => choose::run(&arg)?,
        Mode::FindPath(arg) => find_path::run(&arg)?,
    }
    Ok(())
}
