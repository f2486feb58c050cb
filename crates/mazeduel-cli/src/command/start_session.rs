use anyhow::Context;
use mazeduel_constraints::ConstraintStore;

use super::DataDirArg;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct StartSessionArg {
    #[clap(flatten)]
    data: DataDirArg,
}

pub(crate) fn run(arg: &StartSessionArg) -> anyhow::Result<()> {
    let store = ConstraintStore::start_session(arg.data.storage())
        .context("Failed to clear role logs")?;
    eprintln!("Started new session in {}", store.storage().dir().display());
    Ok(())
}
