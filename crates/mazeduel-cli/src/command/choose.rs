use std::path::PathBuf;

use mazeduel_constraints::{Action, StateVector};

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ChooseArg {
    /// Trained policy model file
    #[arg(long)]
    model: PathBuf,
    /// Five comma-separated feature values
    #[arg(long, required = true, value_delimiter = ',', allow_negative_numbers = true)]
    state: Vec<f32>,
}

pub(crate) fn run(arg: &ChooseArg) -> anyhow::Result<()> {
    let model = util::read_policy_model_file(&arg.model)?;
    let policy = model.to_policy()?;
    let state = StateVector::from_slice(&arg.state)?;

    let chosen = policy.choose_action(&state);
    println!("{chosen}");
    eprintln!("Scores ({}):", model.name);
    for action in Action::PRIMARY {
        let score = policy.score(action, &state).unwrap_or_default();
        let marker = if action == chosen { "*" } else { " " };
        eprintln!("  {marker} {action:<10} {score:>8.3}");
    }
    Ok(())
}
