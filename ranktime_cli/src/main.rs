use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use ranktime::{BuildOptions, RankingView};
use srk_schema::TimeDuration;

mod report;

#[derive(Debug, Parser)]
#[command(name = "ranktime")]
#[command(about = "Rank-over-time reconstruction for ICPC ranklists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write the rank-time dataset of every ICPC series as JSON.
    Compute {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Bucket unit such as `5min` or `1h`; picked from the contest length by default.
        #[arg(long)]
        unit: Option<TimeDuration>,
        /// Sorted solution log to replay instead of the one derived from the rows.
        #[arg(long)]
        solutions: Option<PathBuf>,
    },
    /// Print one user's rank curve in the view that matches the user.
    Timeline {
        input: PathBuf,
        #[arg(long)]
        user: String,
        #[arg(long)]
        marker: Option<String>,
        #[arg(long)]
        unit: Option<TimeDuration>,
    },
    /// Print the standings of every ICPC series at a point in the contest.
    Standings {
        input: PathBuf,
        #[arg(long)]
        at: TimeDuration,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Compute {
            input,
            output,
            unit,
            solutions,
        } => {
            let ranklist = srk_runner::load_ranklist_json_from_path(&input)?;
            let options = BuildOptions { unit };
            let data = match solutions {
                Some(path) => {
                    let log = srk_runner::load_solutions_json_from_path(&path)?;
                    ranktime::build_rank_time_data_with_options(&ranklist, &log, &options)
                }
                None => ranktime::build_rank_time_data_from_rows(&ranklist, &options),
            }
            .with_context(|| format!("compute failed: {}", input.display()))?;

            let json = serde_json::to_string_pretty(&data).context("failed to serialize rank time data")?;
            let out_path = output.unwrap_or_else(|| default_output_path(&input));
            fs::write(&out_path, json)
                .with_context(|| format!("failed to write: {}", out_path.display()))?;
            log::info!("wrote {} views to {}", data.views.len(), out_path.display());
        }
        Command::Timeline {
            input,
            user,
            marker,
            unit,
        } => {
            let ranklist = srk_runner::load_ranklist_json_from_path(&input)?;
            let row = ranklist
                .rows
                .iter()
                .find(|r| r.user.id == user)
                .with_context(|| format!("unknown user: {user}"))?;
            let views = RankingView::collect(&ranklist);
            let view = ranktime::find_user_matched_view(&views, &row.user.marker_ids(), marker.as_deref())
                .with_context(|| format!("no ranking view for user: {user}"))?;

            let data = ranktime::build_rank_time_data_from_rows(&ranklist, &BuildOptions { unit })
                .with_context(|| format!("compute failed: {}", input.display()))?;
            report::print_timeline(&data, &user, view);
        }
        Command::Standings { input, at } => {
            let ranklist = srk_runner::load_ranklist_json_from_path(&input)?;
            let solutions = ranktime::collect_sorted_solutions(&ranklist)
                .with_context(|| format!("failed to collect solutions: {}", input.display()))?;
            let views = ranktime::standings_at(&ranklist, &solutions, &at)
                .with_context(|| format!("standings failed: {}", input.display()))?;
            report::print_standings(&ranklist, &views, &at);
        }
    }

    Ok(())
}

fn default_output_path(input: &Path) -> PathBuf {
    let mut out = input.to_path_buf();
    out.set_extension("ranktime.json");
    out
}
