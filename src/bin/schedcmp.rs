//! schedcmp — Compare metrics reports side by side.
//!
//! Reads two or more `.met` files produced by schedsim, refuses files whose
//! key sets differ, and renders one row per key with the better value of
//! each numeric metric marked. Lower is better for waiting, turnaround and
//! timer; higher is better for everything else numeric.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use schedsim::report::{rank_values, MetricsFile, Rank};

/// Compare metrics reports side by side.
#[derive(Parser)]
#[command(name = "schedcmp")]
struct Cli {
    /// Metrics reports (.met) to compare; at least two.
    #[arg(num_args = 2.., required = true)]
    files: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut tables = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let table = MetricsFile::parse(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        tables.push(table);
    }

    for (path, table) in cli.files.iter().zip(&tables).skip(1) {
        if !tables[0].same_keys(table) {
            bail!(
                "{} and {} carry different metrics; regenerate them",
                cli.files[0].display(),
                path.display()
            );
        }
    }

    render(cli, &tables);
    Ok(())
}

fn render(cli: &Cli, tables: &[MetricsFile]) {
    const KEY_WIDTH: usize = 20;
    const CELL_WIDTH: usize = 16;

    print!("{:<KEY_WIDTH$}", "key");
    for path in &cli.files {
        print!(" {:>CELL_WIDTH$}", path.display().to_string());
    }
    println!();

    for (key, _) in tables[0].entries() {
        let values: Vec<&str> = tables
            .iter()
            .map(|t| t.value(key).unwrap_or_default())
            .collect();
        let ranks = rank_values(key, &values);

        print!("{key:<KEY_WIDTH$}");
        for (value, rank) in values.iter().zip(&ranks) {
            let marker = match rank {
                Rank::Best => " +",
                Rank::Worse => " -",
                Rank::Even => "",
            };
            print!(" {:>CELL_WIDTH$}", format!("{value}{marker}"));
        }
        println!();
    }
}
