use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
struct Args {
    path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let ranklist = srk_runner::load_ranklist_json_from_path(args.path)?;
    let title = ranklist.contest.title.as_ref().map(|t| t.fallback()).unwrap_or_default();
    println!("title={title}");
    println!("duration={}", ranklist.contest.duration);
    println!("problems={}", ranklist.problems.len());
    println!("rows={}", ranklist.rows.len());
    println!("icpc_series={}", ranklist.icpc_series().count());
    Ok(())
}
