use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Subcommand;
use nestegg_core::{parse_amount, parse_deadline, GoalId, DEFAULT_PRIORITY};
use nestegg_planner::{GoalPatch, NewGoal};
use rust_decimal::Decimal;

use crate::render;
use crate::Ctx;

#[derive(Subcommand, Debug)]
pub enum GoalCommand {
    /// Create a goal
    Add {
        #[arg(long)]
        title: String,

        /// Target amount
        #[arg(long)]
        target: String,

        /// Amount already saved
        #[arg(long)]
        current: Option<String>,

        /// YYYY-MM-DD
        #[arg(long)]
        deadline: Option<String>,

        /// 1 (highest) to 5 (lowest)
        #[arg(long, default_value_t = DEFAULT_PRIORITY)]
        priority: i32,

        /// Keep surplus on this goal when it completes
        #[arg(long)]
        no_auto_redistribute: bool,
    },

    /// List goals with progress and suggested contributions
    List {
        #[arg(long)]
        json: bool,

        /// Hide completed goals
        #[arg(long)]
        active: bool,
    },

    /// Change a goal
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        target: Option<String>,

        /// YYYY-MM-DD, or "none" to clear
        #[arg(long)]
        deadline: Option<String>,

        #[arg(long)]
        priority: Option<i32>,

        #[arg(long)]
        auto_redistribute: Option<bool>,

        /// Override the suggested monthly amount
        #[arg(long)]
        monthly: Option<String>,
    },

    /// Delete a goal
    Remove { id: String },

    /// Add money to a goal
    Contribute { id: String, amount: String },
}

pub fn run(ctx: &mut Ctx, cmd: GoalCommand) -> Result<()> {
    match cmd {
        GoalCommand::Add {
            title,
            target,
            current,
            deadline,
            priority,
            no_auto_redistribute,
        } => {
            let new = NewGoal {
                current_amount: current
                    .as_deref()
                    .map(parse_amount)
                    .transpose()?
                    .unwrap_or(Decimal::ZERO),
                deadline: deadline.as_deref().map(parse_deadline).transpose()?,
                priority,
                auto_redistribute: !no_auto_redistribute,
                ..NewGoal::new(title, parse_amount(&target)?)
            };
            let goal = ctx.planner.create_goal(new)?;
            println!("Created goal {} ({})", goal.title, goal.id);
            if goal.is_completed {
                println!("Target already reached; marked completed.");
            } else {
                println!(
                    "Suggested monthly contribution: {}",
                    render::money(ctx.currency(), goal.monthly_contribution)
                );
            }
        }

        GoalCommand::List { json, active } => {
            let goals: Vec<_> = ctx
                .planner
                .goals()
                .iter()
                .filter(|g| !active || !g.is_completed)
                .cloned()
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&goals)?);
            } else {
                print!("{}", render::render_goals(&goals, ctx.currency()));
            }
        }

        GoalCommand::Update {
            id,
            title,
            target,
            deadline,
            priority,
            auto_redistribute,
            monthly,
        } => {
            let patch = GoalPatch {
                title,
                target_amount: target.as_deref().map(parse_amount).transpose()?,
                deadline: deadline.as_deref().map(parse_deadline_arg).transpose()?,
                priority,
                auto_redistribute,
                monthly_contribution: monthly.as_deref().map(parse_amount).transpose()?,
            };
            let goal = ctx.planner.update_goal(&GoalId::from(id), patch)?;
            println!("Updated goal {} ({})", goal.title, goal.id);
        }

        GoalCommand::Remove { id } => {
            let removed = ctx.planner.delete_goal(&GoalId::from(id))?;
            println!("Removed goal {}", removed.title);
        }

        GoalCommand::Contribute { id, amount } => {
            let amount = parse_amount(&amount)?;
            let c = ctx
                .planner
                .add_amount(&GoalId::from(id.as_str()), amount)
                .with_context(|| format!("contribute to {id}"))?;
            println!(
                "{}: {} of {} ({}%)",
                c.goal.title,
                render::money(ctx.currency(), c.goal.current_amount),
                render::money(ctx.currency(), c.goal.target_amount),
                c.goal.progress()
            );
            if c.completed {
                println!("Goal completed!");
            }
            if let Some(r) = &c.redistribution {
                print!(
                    "{}",
                    render::render_redistribution(r, ctx.planner.goals(), ctx.currency())
                );
            }
            for r in &c.cascaded {
                print!(
                    "{}",
                    render::render_redistribution(r, ctx.planner.goals(), ctx.currency())
                );
            }
            if let Some(allocation) = &c.allocation {
                print!("{}", render::render_allocation(allocation, ctx.currency()));
            }
        }
    }
    Ok(())
}

fn parse_deadline_arg(s: &str) -> Result<Option<NaiveDate>> {
    match s.trim() {
        "" | "none" => Ok(None),
        other => Ok(Some(parse_deadline(other)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deadline_arg() {
        assert_eq!(parse_deadline_arg("none").unwrap(), None);
        assert_eq!(
            parse_deadline_arg("2027-06-30").unwrap(),
            NaiveDate::from_ymd_opt(2027, 6, 30)
        );
        assert!(parse_deadline_arg("next june").is_err());
    }
}
