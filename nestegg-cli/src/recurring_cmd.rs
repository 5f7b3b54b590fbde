use anyhow::Result;
use clap::{Subcommand, ValueEnum};
use nestegg_core::{parse_amount, parse_deadline, Frequency, RecurringTransaction, TransactionKind};

use crate::render;
use crate::Ctx;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Income,
    Expense,
}

impl From<KindArg> for TransactionKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Income => TransactionKind::Income,
            KindArg::Expense => TransactionKind::Expense,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FrequencyArg {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl From<FrequencyArg> for Frequency {
    fn from(f: FrequencyArg) -> Self {
        match f {
            FrequencyArg::Daily => Frequency::Daily,
            FrequencyArg::Weekly => Frequency::Weekly,
            FrequencyArg::Monthly => Frequency::Monthly,
            FrequencyArg::Yearly => Frequency::Yearly,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum RecurringCommand {
    /// Register a recurring income or expense
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        amount: String,

        #[arg(long, value_enum)]
        kind: KindArg,

        #[arg(long, value_enum)]
        frequency: FrequencyArg,

        /// First occurrence, YYYY-MM-DD (default: today)
        #[arg(long)]
        start: Option<String>,

        /// Last possible occurrence, YYYY-MM-DD
        #[arg(long)]
        end: Option<String>,
    },

    /// List recurring items with their next date
    List,

    /// Show occurrences due up to today that were not generated yet
    Due,

    /// Mark everything due up to today as generated
    Generate { id: String },

    /// Delete a recurring item
    Remove { id: String },
}

pub fn run(ctx: &mut Ctx, cmd: RecurringCommand) -> Result<()> {
    let today = ctx.planner.today();
    match cmd {
        RecurringCommand::Add {
            title,
            amount,
            kind,
            frequency,
            start,
            end,
        } => {
            let start_date = match start {
                Some(s) => parse_deadline(&s)?,
                None => today,
            };
            let mut item = RecurringTransaction::new(
                title,
                parse_amount(&amount)?,
                kind.into(),
                frequency.into(),
                start_date,
            );
            if let Some(e) = end {
                item = item.with_end_date(parse_deadline(&e)?);
            }
            let item = ctx.planner.add_recurring(item)?;
            println!(
                "Added {} ({}), {} per month",
                item.title,
                item.id,
                render::money(ctx.currency(), item.monthly_equivalent())
            );
        }

        RecurringCommand::List => {
            print!(
                "{}",
                render::render_recurring(ctx.planner.recurring(), today, ctx.currency())
            );
        }

        RecurringCommand::Due => {
            let mut any = false;
            for item in ctx.planner.recurring() {
                let due = item.due_occurrences(today);
                if due.is_empty() {
                    continue;
                }
                any = true;
                println!(
                    "{} ({}): {} occurrence(s) of {}",
                    item.title,
                    item.id,
                    due.len(),
                    render::money(ctx.currency(), item.amount)
                );
                for d in due {
                    println!("  - {}", d);
                }
            }
            if !any {
                println!("Nothing due.");
            }
        }

        RecurringCommand::Generate { id } => {
            let due = ctx.planner.mark_generated(&id, today)?;
            println!("Marked {} occurrence(s) of {} as generated", due.len(), id);
        }

        RecurringCommand::Remove { id } => {
            let removed = ctx.planner.remove_recurring(&id)?;
            println!("Removed {}", removed.title);
        }
    }
    Ok(())
}
