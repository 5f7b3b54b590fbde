use anyhow::{Context, Result};
use nestegg_core::{parse_amount, parse_timezone, FinancialPlan};
use nestegg_planner::{Clock, JsonStore, Planner};
use rust_decimal::Decimal;
use std::io::{self, Write};
use std::path::PathBuf;

use crate::config::{config_path, save_config, Config};
use crate::render;

fn prompt(label: &str, default: &str) -> Result<String> {
    if default.is_empty() {
        print!("{}: ", label);
    } else {
        print!("{} [{}]: ", label, default);
    }
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    let s = s.trim();
    Ok(if s.is_empty() { default } else { s }.to_string())
}

fn prompt_yes_no(label: &str, default: bool) -> Result<bool> {
    let answer = prompt(label, if default { "y" } else { "n" })?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

pub fn run_setup(mut config: Config, data: Option<PathBuf>) -> Result<()> {
    println!("Nestegg setup\n");

    config.general.currency = prompt("Currency", &config.general.currency)?;
    loop {
        let tz = prompt("Timezone (IANA)", &config.general.timezone)?;
        if parse_timezone(&tz).is_ok() {
            config.general.timezone = tz;
            break;
        }
        println!("Unknown timezone: {}", tz);
    }

    let path = match data {
        Some(p) => p,
        None => config.data_path()?,
    };
    let mut planner = Planner::open(JsonStore::new(&path))
        .with_context(|| format!("open {}", path.display()))?
        .with_clock(Clock::Zone(config.timezone()?));
    let current = planner.plan().clone();

    let income = loop {
        let raw = prompt("Monthly income", &current.monthly_income.to_string())?;
        match parse_amount(&raw) {
            Ok(v) if v >= Decimal::ZERO => break v,
            _ => println!("Enter a non-negative amount, e.g. 4500 or $4,500.00"),
        }
    };
    let savings_percentage = loop {
        let raw = prompt(
            "Percent of income for goals",
            &current.savings_percentage.normalize().to_string(),
        )?;
        match raw.trim_end_matches('%').parse::<Decimal>() {
            Ok(v) if (Decimal::ZERO..=Decimal::ONE_HUNDRED).contains(&v) => break v,
            _ => println!("Enter a number between 0 and 100"),
        }
    };
    let auto = prompt_yes_no("Reallocate automatically on changes", current.auto_distribute)?;

    save_config(&config)?;
    planner.update_plan(FinancialPlan::new(income, savings_percentage).with_auto_distribute(auto))?;

    println!("\nWrote:");
    println!("- {}", config_path()?.display());
    println!("- {}", path.display());
    println!();
    print!("{}", render::render_plan(planner.plan(), &config.general.currency));

    println!("\nNext recommended steps:");
    println!("- nestegg goal add --title \"Emergency fund\" --target 10000 --priority 1");
    println!("- nestegg recurring add --title Salary --amount 4500 --kind income --frequency monthly");
    println!("- nestegg allocate");

    Ok(())
}
