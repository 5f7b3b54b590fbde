//! Plain-text tables for terminal output.

use chrono::NaiveDate;
use nestegg_core::{Allocation, FinancialPlan, Goal, Outcome, Redistribution, RecurringTransaction};
use rust_decimal::Decimal;
use std::fmt::Write;

pub fn money(currency: &str, amount: Decimal) -> String {
    format!("{} {:.2}", currency, amount)
}

pub fn render_plan(plan: &FinancialPlan, currency: &str) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "Monthly income:   {}", money(currency, plan.monthly_income));
    let _ = writeln!(s, "Savings:          {}%", plan.savings_percentage.normalize());
    let _ = writeln!(s, "Available/month:  {}", money(currency, plan.total_available()));
    let _ = writeln!(
        s,
        "Auto-distribute:  {}",
        if plan.auto_distribute { "on" } else { "off" }
    );
    s
}

pub fn render_goals(goals: &[Goal], currency: &str) -> String {
    if goals.is_empty() {
        return "(no goals yet; add one with `nestegg goal add`)\n".to_string();
    }

    let mut s = String::new();
    let _ = writeln!(
        s,
        "{:<36}  {:<20}  {:>3}  {:>14}  {:>14}  {:>6}  {:>14}  {:<10}",
        "ID", "TITLE", "PRI", "SAVED", "TARGET", "PROG", "MONTHLY", "DEADLINE"
    );
    for g in goals {
        let deadline = g
            .deadline
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        let title = if g.is_completed {
            format!("{} [done]", g.title)
        } else {
            g.title.clone()
        };
        let _ = writeln!(
            s,
            "{:<36}  {:<20}  {:>3}  {:>14}  {:>14}  {:>5}%  {:>14}  {:<10}",
            g.id,
            truncate(&title, 20),
            g.priority,
            money(currency, g.current_amount),
            money(currency, g.target_amount),
            g.progress(),
            money(currency, g.monthly_contribution),
            deadline
        );
    }
    s
}

pub fn render_allocation(alloc: &Allocation, currency: &str) -> String {
    let mut s = String::new();
    if let Outcome::Skipped(reason) = alloc.outcome {
        let _ = writeln!(s, "Nothing to allocate: {reason}.");
        return s;
    }

    let _ = writeln!(
        s,
        "Allocated {} across {} active goal(s):",
        money(currency, alloc.total_available),
        alloc.lines.len()
    );
    for line in &alloc.lines {
        let title = alloc
            .goals
            .iter()
            .find(|g| g.id == line.goal_id)
            .map(|g| g.title.as_str())
            .unwrap_or("?");
        let basis = if line.deadline_bound() {
            "deadline"
        } else {
            "priority"
        };
        let _ = writeln!(
            s,
            "- {:<20} {:>14}  (score {}, {})",
            truncate(title, 20),
            money(currency, line.contribution),
            line.score,
            basis
        );
    }

    let total: Decimal = alloc.lines.iter().map(|l| l.contribution).sum();
    if total > alloc.total_available {
        let _ = writeln!(
            s,
            "Deadlines require {} more than the plan sets aside.",
            money(currency, total - alloc.total_available)
        );
    }
    s
}

pub fn render_redistribution(r: &Redistribution, goals: &[Goal], currency: &str) -> String {
    let mut s = String::new();
    match r.outcome {
        Outcome::Skipped(reason) => {
            let _ = writeln!(s, "Surplus not redistributed: {reason}.");
        }
        Outcome::Applied => {
            let _ = writeln!(s, "Redistributed surplus of {}:", money(currency, r.excess));
            for share in &r.shares {
                let title = goals
                    .iter()
                    .find(|g| g.id == share.goal_id)
                    .map(|g| g.title.as_str())
                    .unwrap_or("?");
                let _ = writeln!(s, "- {:<20} +{}", truncate(title, 20), money(currency, share.amount));
            }
        }
    }
    s
}

pub fn render_recurring(items: &[RecurringTransaction], today: NaiveDate, currency: &str) -> String {
    if items.is_empty() {
        return "(no recurring transactions)\n".to_string();
    }

    let mut s = String::new();
    for r in items {
        let next = r
            .next_occurrence(today)
            .map(|d| d.to_string())
            .unwrap_or_else(|| "ended".to_string());
        let _ = writeln!(
            s,
            "{}  {:<20} {:>8} {:>9} {:>14}  next {}  ({}/month){}",
            r.id,
            truncate(&r.title, 20),
            format!("{:?}", r.kind),
            format!("{:?}", r.frequency),
            money(currency, r.amount),
            next,
            money(currency, r.monthly_equivalent()),
            if r.active { "" } else { "  [paused]" }
        );
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
