use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nestegg_core::{CoreError, FinancialPlan};
use nestegg_planner::{
    export_goals_csv, import_goals_csv, Clock, JsonStore, MemoryStore, Planner, PlannerError,
};
use rust_decimal::Decimal;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

mod config;
mod goals_cmd;
mod logging;
mod recurring_cmd;
mod render;
mod setup;
mod state;

use config::Config;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("NESTEGG_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "nestegg", version, long_version = LONG_VERSION, about = "Savings goal planner")]
struct Cli {
    /// Data file to use instead of the configured one
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive first-run setup: write config and the monthly plan
    Init,

    /// Show or change the monthly plan
    Plan {
        #[command(subcommand)]
        command: PlanCommand,
    },

    /// Manage savings goals
    Goal {
        #[command(subcommand)]
        command: goals_cmd::GoalCommand,
    },

    /// Recalculate suggested monthly contributions now
    Allocate {
        /// Print the allocation as JSON
        #[arg(long)]
        json: bool,

        /// Show the result without saving it
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage recurring income and expenses
    Recurring {
        #[command(subcommand)]
        command: recurring_cmd::RecurringCommand,
    },

    /// Export goals to CSV
    Export {
        #[arg(long)]
        csv: PathBuf,
    },

    /// Import goals from CSV (merged by id)
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum PlanCommand {
    /// Print the current plan
    Show,

    /// Update income, savings percentage or auto-distribution
    Set {
        /// Monthly income, e.g. 5000 or "$5,000.00"
        #[arg(long)]
        income: Option<String>,

        /// Share of income for goals, 0-100
        #[arg(long)]
        savings_pct: Option<String>,

        /// Reallocate automatically on every change
        #[arg(long)]
        auto_distribute: Option<bool>,
    },

    /// Suggest an income figure from recurring income items
    Estimate,
}

/// Shared handles for subcommands.
pub struct Ctx {
    pub config: Config,
    pub planner: Planner<JsonStore>,
}

impl Ctx {
    pub fn currency(&self) -> &str {
        &self.config.general.currency
    }
}

fn open_ctx(config: Config, data: Option<PathBuf>) -> Result<Ctx> {
    let path = match data {
        Some(p) => p,
        None => config.data_path()?,
    };
    let tz = config.timezone()?;
    debug!(path = %path.display(), timezone = %tz, "opening data file");
    let planner = Planner::open(JsonStore::new(&path))
        .with_context(|| format!("open {}", path.display()))?
        .with_clock(Clock::Zone(tz));
    Ok(Ctx { config, planner })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

/// 2 for rejected input, 1 for everything else.
fn exit_code(err: &anyhow::Error) -> u8 {
    let bad_input = err.downcast_ref::<CoreError>().is_some()
        || err
            .downcast_ref::<PlannerError>()
            .is_some_and(PlannerError::is_bad_input);
    if bad_input { 2 } else { 1 }
}

fn run(cli: Cli) -> Result<()> {
    let config = config::load_config()?;
    logging::init_tracing(&config.general.log_level);

    match cli.command {
        Command::Init => setup::run_setup(config, cli.data)?,

        Command::Plan { command } => {
            let mut ctx = open_ctx(config, cli.data)?;
            match command {
                PlanCommand::Show => {
                    print!("{}", render::render_plan(ctx.planner.plan(), ctx.currency()));
                }
                PlanCommand::Set {
                    income,
                    savings_pct,
                    auto_distribute,
                } => {
                    let plan =
                        merge_plan(ctx.planner.plan(), income, savings_pct, auto_distribute)?;
                    let allocation = ctx.planner.update_plan(plan)?;
                    print!("{}", render::render_plan(ctx.planner.plan(), ctx.currency()));
                    if let Some(allocation) = allocation {
                        println!();
                        print!("{}", render::render_allocation(&allocation, ctx.currency()));
                    }
                }
                PlanCommand::Estimate => {
                    let estimate =
                        nestegg_core::estimated_monthly_income(ctx.planner.recurring());
                    println!(
                        "Recurring income averages {} per month.",
                        render::money(ctx.currency(), estimate)
                    );
                    println!("Apply it with: nestegg plan set --income {}", estimate);
                }
            }
        }

        Command::Goal { command } => {
            let mut ctx = open_ctx(config, cli.data)?;
            goals_cmd::run(&mut ctx, command)?;
        }

        Command::Allocate { json, dry_run } => {
            let mut ctx = open_ctx(config, cli.data)?;
            let allocation = if dry_run {
                let mut preview = Planner::open(MemoryStore::new(ctx.planner.snapshot().clone()))?
                    .with_clock(ctx.planner.clock());
                preview.recalculate()?
            } else {
                ctx.planner.recalculate()?
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&allocation.lines)?);
            } else {
                print!("{}", render::render_allocation(&allocation, ctx.currency()));
                if dry_run {
                    println!("(dry run, nothing saved)");
                }
            }
        }

        Command::Recurring { command } => {
            let mut ctx = open_ctx(config, cli.data)?;
            recurring_cmd::run(&mut ctx, command)?;
        }

        Command::Export { csv } => {
            let ctx = open_ctx(config, cli.data)?;
            let file = File::create(&csv).with_context(|| format!("create {}", csv.display()))?;
            export_goals_csv(ctx.planner.goals(), file)?;
            println!("Exported {} goal(s) to {}", ctx.planner.goals().len(), csv.display());
        }

        Command::Import { csv } => {
            let mut ctx = open_ctx(config, cli.data)?;
            let file = File::open(&csv).with_context(|| format!("open {}", csv.display()))?;
            let goals = import_goals_csv(file).with_context(|| format!("parsing {}", csv.display()))?;
            let count = ctx.planner.import_goals(goals)?;
            println!("Imported {} goal(s) from {}", count, csv.display());
        }
    }

    Ok(())
}

fn merge_plan(
    current: &FinancialPlan,
    income: Option<String>,
    savings_pct: Option<String>,
    auto_distribute: Option<bool>,
) -> Result<FinancialPlan> {
    let mut plan = current.clone();
    if let Some(income) = income {
        plan.monthly_income = nestegg_core::parse_amount(&income)?;
    }
    if let Some(pct) = savings_pct {
        plan.savings_percentage = pct
            .trim()
            .trim_end_matches('%')
            .parse::<Decimal>()
            .with_context(|| format!("invalid savings percentage: {pct}"))?;
    }
    if let Some(enabled) = auto_distribute {
        plan.auto_distribute = enabled;
    }
    Ok(plan)
}
