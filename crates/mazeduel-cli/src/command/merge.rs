use anyhow::Context;
use mazeduel_constraints::{ConstraintStore, Role};

use super::DataDirArg;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct MergeArg {
    #[clap(flatten)]
    data: DataDirArg,
}

pub(crate) fn run(arg: &MergeArg) -> anyhow::Result<()> {
    let mut store =
        ConstraintStore::resume(arg.data.storage()).context("Failed to load role logs")?;
    let added: usize = Role::ALL.into_iter().map(|role| store.log(role).len()).sum();
    let total = store.merge().context("Failed to merge role logs")?;
    eprintln!("Merged {added} constraints ({total} in merged log)");
    Ok(())
}
