use std::collections::BTreeMap;

use anyhow::Context;
use mazeduel_constraints::{Action, Constraint, ConstraintStore, Role};

use super::DataDirArg;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InspectArg {
    #[clap(flatten)]
    data: DataDirArg,
}

pub(crate) fn run(arg: &InspectArg) -> anyhow::Result<()> {
    let store = ConstraintStore::resume(arg.data.storage()).context("Failed to load role logs")?;
    for role in Role::ALL {
        print_summary(&role.to_string(), store.log(role));
    }
    let merged = store.merged_log().context("Failed to load merged log")?;
    print_summary("merged", &merged);
    Ok(())
}

fn print_summary(name: &str, log: &[Constraint]) {
    println!("{name}: {} constraints", log.len());
    let counts = action_counts(log);
    for (action, count) in &counts {
        println!("  {action:<22} {count:>6}");
    }
    if let (Some(first), Some(last)) = (log.first(), log.last()) {
        println!("  time {:.2} .. {:.2}", first.timestamp(), last.timestamp());
    }
}

fn action_counts(log: &[Constraint]) -> BTreeMap<Action, usize> {
    let mut counts = BTreeMap::new();
    for c in log {
        *counts.entry(c.action()).or_default() += 1;
    }
    counts
}
