//! CSV export and import of goals.
//!
//! Columns:
//! id,title,target_amount,current_amount,deadline,priority,monthly_contribution,auto_redistribute,is_completed,created_at,completed_at
//!
//! The two timestamp columns are optional on import so older files still load.

use chrono::{DateTime, NaiveDate, Utc};
use nestegg_core::{Goal, GoalId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::str::FromStr;

use crate::error::{PlannerError, Result};

#[derive(Debug, Serialize, Deserialize)]
struct GoalRow {
    id: String,
    title: String,
    target_amount: String,
    current_amount: String,
    deadline: Option<NaiveDate>,
    priority: i32,
    monthly_contribution: String,
    auto_redistribute: bool,
    is_completed: bool,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
}

impl From<&Goal> for GoalRow {
    fn from(g: &Goal) -> Self {
        Self {
            id: g.id.to_string(),
            title: g.title.clone(),
            target_amount: g.target_amount.to_string(),
            current_amount: g.current_amount.to_string(),
            deadline: g.deadline,
            priority: g.priority,
            monthly_contribution: g.monthly_contribution.to_string(),
            auto_redistribute: g.auto_redistribute,
            is_completed: g.is_completed,
            created_at: Some(g.created_at),
            completed_at: g.completed_at,
        }
    }
}

fn decimal_field(line: u64, name: &str, value: &str) -> Result<Decimal> {
    Decimal::from_str(value.trim()).map_err(|e| PlannerError::InvalidRow {
        line,
        message: format!("{name} '{value}': {e}"),
    })
}

impl GoalRow {
    fn into_goal(self, line: u64) -> Result<Goal> {
        let target = decimal_field(line, "target_amount", &self.target_amount)?;
        let mut goal = Goal::new(self.title, target)
            .with_id(GoalId::from(self.id))
            .with_current(decimal_field(line, "current_amount", &self.current_amount)?)
            .with_priority(self.priority)
            .with_auto_redistribute(self.auto_redistribute);
        goal.deadline = self.deadline;
        goal.monthly_contribution =
            decimal_field(line, "monthly_contribution", &self.monthly_contribution)?;
        goal.is_completed = self.is_completed;
        if let Some(created_at) = self.created_at {
            goal.created_at = created_at;
        }
        if goal.is_completed {
            goal.completed_at = self.completed_at.or_else(|| Some(Utc::now()));
        }
        goal.validate().map_err(|e| PlannerError::InvalidRow {
            line,
            message: e.to_string(),
        })?;
        Ok(goal)
    }
}

/// Write goals as CSV with a header row.
pub fn export_goals_csv<W: Write>(goals: &[Goal], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for goal in goals {
        wtr.serialize(GoalRow::from(goal))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read goals from CSV. Rows are validated; the first bad row aborts the import.
pub fn import_goals_csv<R: Read>(reader: R) -> Result<Vec<Goal>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut goals = Vec::new();

    for result in rdr.deserialize::<GoalRow>() {
        let row = result?;
        // Header is line 1.
        let line = goals.len() as u64 + 2;
        goals.push(row.into_goal(line)?);
    }

    Ok(goals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn stamp(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_export_writes_header_and_rows() {
        let mut car = Goal::new("Car, used", dec!(5000))
            .with_id("car")
            .with_current(dec!(250.50))
            .with_priority(2);
        car.created_at = stamp("2026-01-01T00:00:00Z");
        let goals = vec![car];

        let mut out = Vec::new();
        export_goals_csv(&goals, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "id,title,target_amount,current_amount,deadline,priority,monthly_contribution,auto_redistribute,is_completed,created_at,completed_at"
        );
        assert_eq!(
            lines.next().unwrap(),
            "car,\"Car, used\",5000,250.50,,2,0,true,false,2026-01-01T00:00:00Z,"
        );
    }

    #[test]
    fn test_import_reads_hand_written_csv() {
        let csv = "\
id,title,target_amount,current_amount,deadline,priority,monthly_contribution,auto_redistribute,is_completed
g1,Emergency fund,10000,2500.75,2027-06-30,1,300,true,false
g2,Old phone,400,400,,5,0,false,true
";
        let goals = import_goals_csv(csv.as_bytes()).unwrap();
        assert_eq!(goals.len(), 2);
        assert_eq!(goals[0].id.as_str(), "g1");
        assert_eq!(goals[0].current_amount, dec!(2500.75));
        assert_eq!(goals[0].deadline, NaiveDate::from_ymd_opt(2027, 6, 30));
        assert!(goals[1].is_completed);
        assert!(!goals[1].auto_redistribute);
        assert!(goals[1].completed_at.is_some());
    }

    #[test]
    fn test_import_reports_bad_row() {
        let csv = "\
id,title,target_amount,current_amount,deadline,priority,monthly_contribution,auto_redistribute,is_completed
g1,Fine,100,0,,3,0,true,false
g2,Broken,-100,0,,3,0,true,false
";
        let err = import_goals_csv(csv.as_bytes()).unwrap_err();
        match err {
            PlannerError::InvalidRow { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_export_then_import_keeps_amounts() {
        let goals = vec![
            Goal::new("A", dec!(1234.56)).with_id("a").with_current(dec!(0.01)),
            Goal::new("B", dec!(99)).with_id("b").with_priority(5),
        ];
        let mut out = Vec::new();
        export_goals_csv(&goals, &mut out).unwrap();

        let back = import_goals_csv(out.as_slice()).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].target_amount, dec!(1234.56));
        assert_eq!(back[0].current_amount, dec!(0.01));
        assert_eq!(back[1].priority, 5);
    }

    #[test]
    fn test_round_trip_keeps_timestamps() {
        let mut done = Goal::new("Laptop", dec!(1500))
            .with_id("laptop")
            .with_current(dec!(1500))
            .completed();
        done.created_at = stamp("2025-03-04T10:00:00Z");
        done.completed_at = Some(stamp("2025-11-20T18:30:00Z"));
        let mut open = Goal::new("Trip", dec!(900)).with_id("trip");
        open.created_at = stamp("2025-06-01T08:00:00Z");

        let mut out = Vec::new();
        export_goals_csv(&[done.clone(), open.clone()], &mut out).unwrap();
        let back = import_goals_csv(out.as_slice()).unwrap();

        assert_eq!(back[0].created_at, done.created_at);
        assert_eq!(back[0].completed_at, done.completed_at);
        assert_eq!(back[1].created_at, open.created_at);
        assert_eq!(back[1].completed_at, None);
    }
}
