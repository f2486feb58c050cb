use anyhow::Context;
use mazeduel_constraints::{
    Action, Constraint, ConstraintStore, DEFAULT_EPSILON, InsertOutcome, Obstruction, Role,
};

use super::DataDirArg;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RecordArg {
    #[clap(flatten)]
    data: DataDirArg,
    /// Role that observed the action (server or client)
    #[arg(long)]
    role: Role,
    /// Observed action label, e.g. Laser, blocking, escaping, showingUp
    #[arg(long)]
    action: Action,
    /// Five comma-separated feature values
    #[arg(long, required = true, value_delimiter = ',', allow_negative_numbers = true)]
    state: Vec<f32>,
    /// Game time of the observation
    #[arg(long)]
    time: f64,
    /// Required score margin over the alternatives
    #[arg(long, default_value_t = DEFAULT_EPSILON)]
    epsilon: f32,
    /// Role closer to a wall blocking the line of sight, if any
    #[arg(long)]
    closer_role: Option<Role>,
}

pub(crate) fn run(arg: &RecordArg) -> anyhow::Result<()> {
    let RecordArg {
        data,
        role,
        action,
        state,
        time,
        epsilon,
        closer_role,
    } = arg;

    let constraint = Constraint::from_slice(state, *action, *time)?.with_epsilon(*epsilon);
    let obstruction = match closer_role {
        Some(closer) => Obstruction::Wall { closer: *closer },
        None => Obstruction::Clear,
    };

    let mut store = ConstraintStore::resume(data.storage()).context("Failed to load role logs")?;
    let outcome = store
        .add_constraint(*role, constraint, obstruction)
        .context("Failed to save role logs")?;

    match outcome {
        InsertOutcome::Suppressed { by } => {
            eprintln!("Discarded {action}@{time}: {} recorded {by} nearby", role.other());
        }
        InsertOutcome::Cancelled => {
            eprintln!("Discarded {action}@{time} together with a wall destruction");
        }
        InsertOutcome::Recorded {
            pair_pruned,
            post_filtered,
        } => {
            eprintln!("Recorded {action}@{time} for {role}");
            if let Some(pruned) = pair_pruned {
                eprintln!("  Removed the escaping of {pruned} (closer to the wall)");
            }
            if post_filtered > 0 {
                eprintln!(
                    "  Removed {post_filtered} conflicting entries from {}",
                    role.other()
                );
            }
        }
    }
    for role in Role::ALL {
        eprintln!("  {role}: {} constraints", store.log(role).len());
    }
    Ok(())
}
