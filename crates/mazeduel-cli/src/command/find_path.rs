use std::path::PathBuf;

use anyhow::ensure;
use mazeduel_grid::{Cell, WallGridConfig, WallQuery as _, pathfinding};

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct FindPathArg {
    /// Grid layout file
    #[arg(long)]
    layout: PathBuf,
    /// Start cell as `row,col`
    #[arg(long, value_parser = util::parse_cell)]
    from: Cell,
    /// Goal cell as `row,col`
    #[arg(long, value_parser = util::parse_cell)]
    to: Cell,
}

pub(crate) fn run(arg: &FindPathArg) -> anyhow::Result<()> {
    let layout = util::read_layout_file(&arg.layout)?;
    let grid = layout.to_grid(WallGridConfig::default())?;
    for cell in [arg.from, arg.to] {
        ensure!(
            grid.contains(cell),
            "cell {cell} is outside the {}x{} grid",
            grid.rows(),
            grid.cols()
        );
    }

    let path = pathfinding::find_path(&grid, arg.from, arg.to);
    if path.is_empty() {
        eprintln!("No route from {} to {}", arg.from, arg.to);
        return Ok(());
    }
    let route = path
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ");
    println!("{route}");
    eprintln!("{} steps", path.len() - 1);
    Ok(())
}
