//! Fluent construction of timeline entries.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::ids::ProjectId;
use crate::timeline::{
    Architect, Engineer, Expense, Material, ProjectManager, TimelineEntry, Tool, Worker,
};

/// Builder for [`TimelineEntry`].
#[derive(Debug, Clone)]
pub struct TimelineEntryBuilder {
    entry: TimelineEntry,
}

impl TimelineEntryBuilder {
    /// Starts an entry for a project on a date.
    pub fn new(project_id: impl Into<ProjectId>, date: NaiveDate) -> Self {
        Self {
            entry: TimelineEntry::new(project_id, date),
        }
    }

    pub fn worker(mut self, name: impl Into<String>, role: impl Into<String>, hours: Decimal) -> Self {
        self.entry.workers.push(Worker::new(name, role, hours));
        self
    }

    pub fn engineer(
        mut self,
        name: impl Into<String>,
        specialty: impl Into<String>,
        hours: Decimal,
    ) -> Self {
        self.entry.engineers.push(Engineer::new(name, specialty, hours));
        self
    }

    pub fn architect(
        mut self,
        name: impl Into<String>,
        specialty: impl Into<String>,
        hours: Decimal,
    ) -> Self {
        self.entry.architects.push(Architect::new(name, specialty, hours));
        self
    }

    pub fn manager(mut self, name: impl Into<String>, contact: impl Into<String>) -> Self {
        self.entry.project_managers.push(ProjectManager {
            name: name.into(),
            contact: contact.into(),
        });
        self
    }

    pub fn expense(mut self, description: impl Into<String>, amount: Decimal) -> Self {
        self.entry.expenses.push(Expense::new(description, amount));
        self
    }

    pub fn material(
        mut self,
        name: impl Into<String>,
        quantity: Decimal,
        unit: impl Into<String>,
        cost: Decimal,
    ) -> Self {
        self.entry
            .materials
            .push(Material::new(name, quantity, unit, cost));
        self
    }

    pub fn tool(mut self, name: impl Into<String>, quantity: Decimal, status: impl Into<String>) -> Self {
        self.entry.tools.push(Tool::new(name, quantity, status));
        self
    }

    /// Adds a tool with a day cost.
    pub fn rented_tool(
        mut self,
        name: impl Into<String>,
        quantity: Decimal,
        status: impl Into<String>,
        cost: Decimal,
    ) -> Self {
        self.entry
            .tools
            .push(Tool::new(name, quantity, status).with_cost(cost));
        self
    }

    /// Appends any record the typed helpers do not cover, e.g. a worker with a flat cost.
    pub fn push_worker(mut self, worker: Worker) -> Self {
        self.entry.workers.push(worker);
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.entry.notes = notes.into();
        self
    }

    pub fn build(self) -> TimelineEntry {
        self.entry
    }
}

impl TimelineEntry {
    /// Creates a builder for a new entry.
    pub fn builder(project_id: impl Into<ProjectId>, date: NaiveDate) -> TimelineEntryBuilder {
        TimelineEntryBuilder::new(project_id, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn test_builder_collects_records() {
        let entry = TimelineEntry::builder("proj-1", day())
            .worker("Ana", "mason", dec!(8))
            .engineer("Ben", "structural", dec!(3))
            .architect("Cy", "interiors", dec!(1))
            .manager("Lee", "lee@site.test")
            .expense("fuel", dec!(60))
            .material("rebar", dec!(40), "m", dec!(320))
            .tool("crane", dec!(1), "in use")
            .rented_tool("compactor", dec!(2), "available", dec!(90))
            .notes("slab poured")
            .build();

        assert_eq!(entry.workers.len(), 1);
        assert_eq!(entry.engineers[0].specialty, "structural");
        assert_eq!(entry.architects[0].hours_worked, dec!(1));
        assert_eq!(entry.project_managers[0].name, "Lee");
        assert_eq!(entry.expenses[0].amount, dec!(60));
        assert_eq!(entry.materials[0].unit, "m");
        assert_eq!(entry.tools[0].cost, Decimal::ZERO);
        assert_eq!(entry.tools[1].cost, dec!(90));
        assert_eq!(entry.notes, "slab poured");
    }

    #[test]
    fn test_builder_sanitizes_numbers() {
        let entry = TimelineEntry::builder("proj-1", day())
            .worker("Ana", "mason", dec!(-4))
            .expense("refund", dec!(-100))
            .build();

        assert_eq!(entry.workers[0].hours_worked, Decimal::ZERO);
        assert_eq!(entry.expenses[0].amount, Decimal::ZERO);
    }

    #[test]
    fn test_push_worker_keeps_flat_cost() {
        let mut worker = Worker::new("Raj", "laborer", Decimal::ZERO);
        worker.cost = Some(dec!(150));
        let entry = TimelineEntry::builder("proj-1", day())
            .push_worker(worker)
            .build();

        assert_eq!(entry.workers[0].cost, Some(dec!(150)));
    }
}
