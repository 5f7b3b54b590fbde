//! Planner: owns the snapshot, validates edits, and triggers the engine.
//!
//! Every mutation works on a copy of the snapshot, persists it, and only then
//! replaces the in-memory state, so a failed save leaves the planner unchanged.
//! `&mut self` keeps a single writer per planner.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use nestegg_core::{
    allocate, redistribute_on_completion, today_in, Allocation, CoreError, FinancialPlan, Goal, GoalId,
    Redistribution, RecurringTransaction, DEFAULT_PRIORITY,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::{PlannerError, Result};
use crate::store::{Snapshot, Store};

/// Source of "today" for deadline math.
#[derive(Debug, Clone, Copy)]
pub enum Clock {
    Zone(Tz),
    Fixed(NaiveDate),
}

impl Clock {
    pub fn today(&self) -> NaiveDate {
        match self {
            Clock::Zone(tz) => today_in(*tz),
            Clock::Fixed(date) => *date,
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::Zone(Tz::UTC)
    }
}

/// Fields for a goal about to be created.
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub title: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub deadline: Option<NaiveDate>,
    pub priority: i32,
    pub auto_redistribute: bool,
}

impl NewGoal {
    pub fn new(title: impl Into<String>, target_amount: Decimal) -> Self {
        Self {
            title: title.into(),
            target_amount,
            current_amount: Decimal::ZERO,
            deadline: None,
            priority: DEFAULT_PRIORITY,
            auto_redistribute: true,
        }
    }
}

/// Partial update of a goal. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct GoalPatch {
    pub title: Option<String>,
    pub target_amount: Option<Decimal>,
    /// `Some(None)` clears the deadline.
    pub deadline: Option<Option<NaiveDate>>,
    pub priority: Option<i32>,
    pub auto_redistribute: Option<bool>,
    /// Manual override of the suggested amount.
    pub monthly_contribution: Option<Decimal>,
}

impl GoalPatch {
    fn touches_allocation(&self) -> bool {
        self.target_amount.is_some() || self.deadline.is_some() || self.priority.is_some()
    }
}

/// Result of adding money to a goal.
#[derive(Debug, Clone)]
pub struct Contribution {
    pub goal: Goal,
    /// The goal crossed its target with this contribution.
    pub completed: bool,
    pub redistribution: Option<Redistribution>,
    /// Recipients pushed past their own target, completed and redistributed in turn.
    pub cascaded: Vec<Redistribution>,
    pub allocation: Option<Allocation>,
}

pub struct Planner<S: Store> {
    store: S,
    snapshot: Snapshot,
    clock: Clock,
}

impl<S: Store> Planner<S> {
    pub fn open(store: S) -> Result<Self> {
        let snapshot = store.load()?;
        debug!(goals = snapshot.goals.len(), "planner opened");
        Ok(Self {
            store,
            snapshot,
            clock: Clock::default(),
        })
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn clock(&self) -> Clock {
        self.clock
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn plan(&self) -> &FinancialPlan {
        &self.snapshot.plan
    }

    pub fn goals(&self) -> &[Goal] {
        &self.snapshot.goals
    }

    pub fn goal(&self, id: &GoalId) -> Result<&Goal> {
        self.snapshot
            .goals
            .iter()
            .find(|g| &g.id == id)
            .ok_or_else(|| PlannerError::GoalNotFound(id.clone()))
    }

    pub fn recurring(&self) -> &[RecurringTransaction] {
        &self.snapshot.recurring
    }

    fn commit(&mut self, next: Snapshot) -> Result<()> {
        self.store.save(&next)?;
        self.snapshot = next;
        Ok(())
    }

    fn allocate_into(&self, next: &mut Snapshot) -> Allocation {
        let allocation = allocate(&next.goals, &next.plan, self.today());
        next.goals = allocation.goals.clone();
        allocation
    }

    fn auto_allocate_into(&self, next: &mut Snapshot) -> Option<Allocation> {
        next.plan
            .auto_distribute
            .then(|| self.allocate_into(next))
    }

    /// Complete every active goal that has reached its target and pass its surplus on.
    ///
    /// Each round completes one goal, so this stops after at most `goals.len()` rounds.
    fn settle_completions(next: &mut Snapshot) -> Vec<Redistribution> {
        let mut settled = Vec::new();
        for _ in 0..next.goals.len() {
            let Some(goal) = next
                .goals
                .iter_mut()
                .find(|g| !g.is_completed && g.target_reached())
            else {
                break;
            };
            goal.is_completed = true;
            goal.completed_at = Some(Utc::now());
            let id = goal.id.clone();

            let r = redistribute_on_completion(&next.goals, &id);
            next.goals = r.goals.clone();
            info!(goal = %id, outcome = ?r.outcome, "goal reached target");
            settled.push(r);
        }
        settled
    }

    fn position(goals: &[Goal], id: &GoalId) -> Result<usize> {
        goals
            .iter()
            .position(|g| &g.id == id)
            .ok_or_else(|| PlannerError::GoalNotFound(id.clone()))
    }

    /// Replace the plan. Reallocates when the new plan has `auto_distribute` set.
    pub fn update_plan(&mut self, plan: FinancialPlan) -> Result<Option<Allocation>> {
        plan.validate()?;

        let mut next = self.snapshot.clone();
        next.plan = plan;
        let allocation = self.auto_allocate_into(&mut next);
        self.commit(next)?;

        info!(
            income = %self.snapshot.plan.monthly_income,
            savings_pct = %self.snapshot.plan.savings_percentage,
            reallocated = allocation.is_some(),
            "plan updated"
        );
        Ok(allocation)
    }

    pub fn create_goal(&mut self, new: NewGoal) -> Result<Goal> {
        let mut goal = Goal::new(new.title.trim(), new.target_amount)
            .with_current(new.current_amount)
            .with_priority(new.priority)
            .with_auto_redistribute(new.auto_redistribute);
        goal.deadline = new.deadline;
        goal.validate()?;
        if goal.target_reached() {
            goal.is_completed = true;
            goal.completed_at = Some(Utc::now());
        }

        let id = goal.id.clone();
        let mut next = self.snapshot.clone();
        next.goals.push(goal);
        self.auto_allocate_into(&mut next);
        self.commit(next)?;

        info!(goal = %id, "goal created");
        Ok(self.goal(&id)?.clone())
    }

    pub fn update_goal(&mut self, id: &GoalId, patch: GoalPatch) -> Result<Goal> {
        let mut next = self.snapshot.clone();
        let idx = Self::position(&next.goals, id)?;

        let goal = &mut next.goals[idx];
        if let Some(title) = &patch.title {
            goal.title = title.trim().to_string();
        }
        if let Some(target) = patch.target_amount {
            goal.target_amount = target;
        }
        if let Some(deadline) = patch.deadline {
            goal.deadline = deadline;
        }
        if let Some(priority) = patch.priority {
            goal.priority = priority;
        }
        if let Some(enabled) = patch.auto_redistribute {
            goal.auto_redistribute = enabled;
        }
        if let Some(amount) = patch.monthly_contribution {
            goal.monthly_contribution = amount;
        }
        goal.validate()?;

        let settled = Self::settle_completions(&mut next);
        if patch.touches_allocation() || !settled.is_empty() {
            self.auto_allocate_into(&mut next);
        }
        self.commit(next)?;

        info!(goal = %id, "goal updated");
        Ok(self.goal(id)?.clone())
    }

    pub fn delete_goal(&mut self, id: &GoalId) -> Result<Goal> {
        let mut next = self.snapshot.clone();
        let idx = Self::position(&next.goals, id)?;
        let removed = next.goals.remove(idx);
        self.auto_allocate_into(&mut next);
        self.commit(next)?;

        info!(goal = %id, "goal deleted");
        Ok(removed)
    }

    /// Add money to an active goal.
    ///
    /// Reaching the target marks the goal completed and hands any surplus to
    /// the other active goals before contributions are reallocated.
    pub fn add_amount(&mut self, id: &GoalId, amount: Decimal) -> Result<Contribution> {
        if amount <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount(amount.to_string()).into());
        }

        let mut next = self.snapshot.clone();
        let idx = Self::position(&next.goals, id)?;
        let goal = &mut next.goals[idx];
        if goal.is_completed {
            return Err(PlannerError::GoalCompleted(id.clone()));
        }

        goal.current_amount += amount;
        let completed = goal.target_reached();
        let mut redistribution = None;
        if completed {
            goal.is_completed = true;
            goal.completed_at = Some(Utc::now());
            let r = redistribute_on_completion(&next.goals, id);
            next.goals = r.goals.clone();
            redistribution = Some(r);
        }
        let cascaded = Self::settle_completions(&mut next);

        let allocation = self.auto_allocate_into(&mut next);
        self.commit(next)?;

        info!(goal = %id, amount = %amount, completed, "contribution recorded");
        Ok(Contribution {
            goal: self.goal(id)?.clone(),
            completed,
            redistribution,
            cascaded,
            allocation,
        })
    }

    /// On-demand allocation, regardless of `auto_distribute`.
    pub fn recalculate(&mut self) -> Result<Allocation> {
        let mut next = self.snapshot.clone();
        let allocation = self.allocate_into(&mut next);
        if allocation.outcome.is_applied() {
            self.commit(next)?;
        }
        info!(outcome = ?allocation.outcome, "contributions recalculated");
        Ok(allocation)
    }

    /// Merge imported goals by id; unknown ids are appended.
    pub fn import_goals(&mut self, imported: Vec<Goal>) -> Result<usize> {
        for goal in &imported {
            goal.validate()?;
        }

        let mut next = self.snapshot.clone();
        let count = imported.len();
        for goal in imported {
            match next.goals.iter_mut().find(|g| g.id == goal.id) {
                Some(existing) => *existing = goal,
                None => next.goals.push(goal),
            }
        }
        self.auto_allocate_into(&mut next);
        self.commit(next)?;

        info!(count, "goals imported");
        Ok(count)
    }

    pub fn add_recurring(&mut self, item: RecurringTransaction) -> Result<RecurringTransaction> {
        if item.title.trim().is_empty() {
            return Err(CoreError::EmptyTitle.into());
        }
        if item.amount <= Decimal::ZERO {
            return Err(CoreError::InvalidAmount(item.amount.to_string()).into());
        }

        let mut next = self.snapshot.clone();
        next.recurring.push(item.clone());
        self.commit(next)?;

        info!(recurring = %item.id, "recurring transaction added");
        Ok(item)
    }

    pub fn remove_recurring(&mut self, id: &str) -> Result<RecurringTransaction> {
        let mut next = self.snapshot.clone();
        let idx = next
            .recurring
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| PlannerError::RecurringNotFound(id.to_string()))?;
        let removed = next.recurring.remove(idx);
        self.commit(next)?;

        info!(recurring = %id, "recurring transaction removed");
        Ok(removed)
    }

    /// Record that every occurrence up to `through` has been turned into a transaction.
    /// Returns the dates that were due.
    pub fn mark_generated(&mut self, id: &str, through: NaiveDate) -> Result<Vec<NaiveDate>> {
        let mut next = self.snapshot.clone();
        let item = next
            .recurring
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| PlannerError::RecurringNotFound(id.to_string()))?;

        let due = item.due_occurrences(through);
        if let Some(last) = due.last() {
            item.last_generated = Some(*last);
            self.commit(next)?;
        }

        debug!(recurring = %id, generated = due.len(), "marked occurrences generated");
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use nestegg_core::{Frequency, Outcome, SkipReason, TransactionKind};
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn planner() -> Planner<MemoryStore> {
        Planner::open(MemoryStore::default())
            .unwrap()
            .with_clock(Clock::Fixed(today()))
    }

    fn planner_with_plan(income: Decimal, pct: Decimal) -> Planner<MemoryStore> {
        let mut p = planner();
        p.update_plan(FinancialPlan::new(income, pct)).unwrap();
        p
    }

    fn new_goal(title: &str, target: Decimal, priority: i32) -> NewGoal {
        NewGoal {
            priority,
            ..NewGoal::new(title, target)
        }
    }

    #[test]
    fn test_update_plan_rejects_invalid() {
        let mut p = planner();
        let err = p
            .update_plan(FinancialPlan::new(dec!(1000), dec!(120)))
            .unwrap_err();
        assert!(err.is_bad_input());
        assert_eq!(p.store().saves(), 0);
    }

    #[test]
    fn test_create_goal_auto_allocates() {
        let mut p = planner_with_plan(dec!(5000), dec!(20));
        let a = p.create_goal(new_goal("Emergency", dec!(10000), 1)).unwrap();
        assert_eq!(a.monthly_contribution, dec!(1000));

        p.create_goal(new_goal("Trip", dec!(2000), 5)).unwrap();
        let a = p.goal(&a.id).unwrap();
        assert_eq!(a.monthly_contribution, dec!(833.33));
    }

    #[test]
    fn test_create_goal_without_auto_distribute() {
        let mut p = planner();
        p.update_plan(FinancialPlan::new(dec!(5000), dec!(20)).with_auto_distribute(false))
            .unwrap();
        let g = p.create_goal(new_goal("Trip", dec!(2000), 1)).unwrap();
        assert_eq!(g.monthly_contribution, Decimal::ZERO);

        let alloc = p.recalculate().unwrap();
        assert_eq!(alloc.outcome, Outcome::Applied);
        assert_eq!(p.goal(&g.id).unwrap().monthly_contribution, dec!(1000));
    }

    #[test]
    fn test_create_goal_validates() {
        let mut p = planner();
        let err = p.create_goal(new_goal("", dec!(100), 3)).unwrap_err();
        assert!(matches!(err, PlannerError::Core(CoreError::EmptyTitle)));
        let err = p.create_goal(new_goal("Bad", dec!(100), 7)).unwrap_err();
        assert!(matches!(
            err,
            PlannerError::Core(CoreError::PriorityOutOfRange(7))
        ));
        assert!(p.goals().is_empty());
    }

    #[test]
    fn test_add_amount_completes_and_redistributes() {
        let mut p = planner_with_plan(dec!(3000), dec!(10));
        let done = p.create_goal(new_goal("Deposit", dec!(1000), 3)).unwrap();
        let car = p.create_goal(new_goal("Car", dec!(5000), 2)).unwrap();
        let trip = p.create_goal(new_goal("Trip", dec!(2000), 4)).unwrap();

        let c = p.add_amount(&done.id, dec!(1200)).unwrap();
        assert!(c.completed);
        assert!(c.goal.is_completed);
        assert!(c.goal.completed_at.is_some());
        assert_eq!(c.goal.current_amount, dec!(1200));

        let r = c.redistribution.unwrap();
        assert_eq!(r.outcome, Outcome::Applied);
        assert_eq!(p.goal(&car.id).unwrap().current_amount, dec!(133.33));
        assert_eq!(p.goal(&trip.id).unwrap().current_amount, dec!(66.67));

        // 300 pool now split between the two remaining goals only.
        assert_eq!(p.goal(&car.id).unwrap().monthly_contribution, dec!(200));
        assert_eq!(p.goal(&trip.id).unwrap().monthly_contribution, dec!(100));
    }

    #[test]
    fn test_add_amount_respects_auto_redistribute_flag() {
        let mut p = planner_with_plan(dec!(3000), dec!(10));
        let done = p
            .create_goal(NewGoal {
                auto_redistribute: false,
                ..NewGoal::new("Deposit", dec!(1000))
            })
            .unwrap();
        let other = p.create_goal(new_goal("Car", dec!(5000), 2)).unwrap();

        let c = p.add_amount(&done.id, dec!(1500)).unwrap();
        assert_eq!(
            c.redistribution.unwrap().outcome,
            Outcome::Skipped(SkipReason::AutoRedistributeDisabled)
        );
        assert_eq!(p.goal(&other.id).unwrap().current_amount, Decimal::ZERO);
    }

    #[test]
    fn test_add_amount_rejects_completed_and_non_positive() {
        let mut p = planner();
        let g = p.create_goal(new_goal("Small", dec!(10), 3)).unwrap();
        assert!(p.add_amount(&g.id, dec!(0)).is_err());
        p.add_amount(&g.id, dec!(10)).unwrap();
        assert!(matches!(
            p.add_amount(&g.id, dec!(1)),
            Err(PlannerError::GoalCompleted(_))
        ));
    }

    #[test]
    fn test_update_goal_patch() {
        let mut p = planner_with_plan(dec!(1000), dec!(50));
        let g = p.create_goal(new_goal("Laptop", dec!(2400), 3)).unwrap();
        assert_eq!(g.monthly_contribution, dec!(500));

        let deadline = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let g = p
            .update_goal(
                &g.id,
                GoalPatch {
                    deadline: Some(Some(deadline)),
                    ..GoalPatch::default()
                },
            )
            .unwrap();
        assert_eq!(g.monthly_contribution, dec!(1200));

        let g = p
            .update_goal(
                &g.id,
                GoalPatch {
                    monthly_contribution: Some(dec!(50)),
                    ..GoalPatch::default()
                },
            )
            .unwrap();
        assert_eq!(g.monthly_contribution, dec!(50));

        let err = p
            .update_goal(
                &g.id,
                GoalPatch {
                    target_amount: Some(dec!(-5)),
                    ..GoalPatch::default()
                },
            )
            .unwrap_err();
        assert!(err.is_bad_input());
        assert_eq!(p.goal(&g.id).unwrap().target_amount, dec!(2400));
    }

    #[test]
    fn test_delete_goal_reallocates() {
        let mut p = planner_with_plan(dec!(1000), dec!(30));
        let a = p.create_goal(new_goal("A", dec!(900), 1)).unwrap();
        let b = p.create_goal(new_goal("B", dec!(900), 1)).unwrap();
        assert_eq!(p.goal(&a.id).unwrap().monthly_contribution, dec!(150));

        p.delete_goal(&b.id).unwrap();
        assert_eq!(p.goal(&a.id).unwrap().monthly_contribution, dec!(300));
        assert!(matches!(
            p.delete_goal(&b.id),
            Err(PlannerError::GoalNotFound(_))
        ));
    }

    #[test]
    fn test_recalculate_without_goals_does_not_save() {
        let mut p = planner();
        let alloc = p.recalculate().unwrap();
        assert_eq!(alloc.outcome, Outcome::Skipped(SkipReason::NoActiveGoals));
        assert_eq!(p.store().saves(), 0);
    }

    #[test]
    fn test_recurring_lifecycle() {
        let mut p = planner();
        let item = RecurringTransaction::new(
            "Salary",
            dec!(2500),
            TransactionKind::Income,
            Frequency::Monthly,
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        )
        .with_id("salary");
        p.add_recurring(item).unwrap();

        let due = p.mark_generated("salary", today()).unwrap();
        assert_eq!(due.len(), 3);
        assert_eq!(
            p.recurring()[0].last_generated,
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
        assert!(p.mark_generated("salary", today()).unwrap().is_empty());

        p.remove_recurring("salary").unwrap();
        assert!(matches!(
            p.remove_recurring("salary"),
            Err(PlannerError::RecurringNotFound(_))
        ));
    }

    #[test]
    fn test_import_goals_merges_by_id() {
        let mut p = planner_with_plan(dec!(1000), dec!(10));
        let g = p.create_goal(new_goal("Bike", dec!(500), 3)).unwrap();

        let mut renamed = g.clone();
        renamed.title = "Road bike".into();
        let fresh = Goal::new("Camera", dec!(700)).with_id("camera");

        assert_eq!(p.import_goals(vec![renamed, fresh]).unwrap(), 2);
        assert_eq!(p.goals().len(), 2);
        assert_eq!(p.goal(&g.id).unwrap().title, "Road bike");
        assert_eq!(
            p.goal(&GoalId::from("camera")).unwrap().monthly_contribution,
            dec!(50)
        );
    }

    #[test]
    fn test_redistribution_completes_recipients_in_turn() {
        let mut p = planner_with_plan(dec!(1000), dec!(10));
        let big = p.create_goal(new_goal("Big", dec!(100), 3)).unwrap();
        let small = p.create_goal(new_goal("Small", dec!(50), 3)).unwrap();
        let car = p.create_goal(new_goal("Car", dec!(1000), 3)).unwrap();

        let c = p.add_amount(&big.id, dec!(500)).unwrap();
        assert!(c.completed);
        assert_eq!(c.redistribution.unwrap().excess, dec!(400));

        // Small got 200 against a 50 target and passes 150 on to Car.
        let small = p.goal(&small.id).unwrap();
        assert!(small.is_completed);
        assert!(small.completed_at.is_some());
        assert_eq!(small.current_amount, dec!(200));
        assert_eq!(c.cascaded.len(), 1);
        assert_eq!(c.cascaded[0].excess, dec!(150));

        let car = p.goal(&car.id).unwrap();
        assert!(!car.is_completed);
        assert_eq!(car.current_amount, dec!(350));
        assert_eq!(car.monthly_contribution, dec!(100));
    }

    #[test]
    fn test_last_recipient_completed_with_nowhere_to_go() {
        let mut p = planner_with_plan(dec!(1000), dec!(10));
        let big = p.create_goal(new_goal("Big", dec!(100), 3)).unwrap();
        let small = p.create_goal(new_goal("Small", dec!(50), 3)).unwrap();

        let c = p.add_amount(&big.id, dec!(500)).unwrap();
        let small = p.goal(&small.id).unwrap();
        assert!(small.is_completed);
        assert_eq!(small.current_amount, dec!(400));
        assert_eq!(
            c.cascaded[0].outcome,
            Outcome::Skipped(SkipReason::NoRecipients)
        );
        assert_eq!(
            c.allocation.unwrap().outcome,
            Outcome::Skipped(SkipReason::NoActiveGoals)
        );
    }

    #[test]
    fn test_lowering_target_below_current_completes_goal() {
        let mut p = planner_with_plan(dec!(1000), dec!(10));
        let a = p.create_goal(new_goal("A", dec!(500), 3)).unwrap();
        let b = p.create_goal(new_goal("B", dec!(1000), 3)).unwrap();
        p.add_amount(&a.id, dec!(300)).unwrap();

        let a = p
            .update_goal(
                &a.id,
                GoalPatch {
                    target_amount: Some(dec!(200)),
                    ..GoalPatch::default()
                },
            )
            .unwrap();
        assert!(a.is_completed);
        assert!(a.completed_at.is_some());

        let b = p.goal(&b.id).unwrap();
        assert_eq!(b.current_amount, dec!(100));
        assert_eq!(b.monthly_contribution, dec!(100));
    }

    #[test]
    fn test_dry_run_on_memory_copy_leaves_original_alone() {
        let mut p = planner();
        p.update_plan(FinancialPlan::new(dec!(2000), dec!(10)).with_auto_distribute(false))
            .unwrap();
        let g = p.create_goal(new_goal("Desk", dec!(400), 3)).unwrap();

        let mut dry = Planner::open(MemoryStore::new(p.snapshot().clone()))
            .unwrap()
            .with_clock(p.clock());
        let alloc = dry.recalculate().unwrap();
        assert_eq!(alloc.outcome, Outcome::Applied);
        assert_eq!(dry.goal(&g.id).unwrap().monthly_contribution, dec!(200));
        assert_eq!(p.goal(&g.id).unwrap().monthly_contribution, Decimal::ZERO);
    }
}
