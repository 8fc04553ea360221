//! The financial roll-up.
//!
//! Aggregation is a pure, synchronous pass over records that were already
//! fetched. It never fails: malformed numbers were zeroed at decode time and
//! are clamped again here, so every cost total is non-negative. All money is
//! [`Decimal`], so totals do not depend on the order records arrive in.

use std::collections::{BTreeMap, HashMap, HashSet};

use rust_decimal::Decimal;
use tracing::debug;

use sitebook_models::lenient::sanitize;
use sitebook_models::{Project, ProjectId, TimelineEntry};

use crate::rates::{LaborCategory, LaborRates};
use crate::scope::Scope;
use crate::summary::{
    CostBreakdown, DashboardSummary, FinancialSummary, LaborAnalytics, LaborCategoryTotals,
    MaterialAnalytics, MaterialLine, ProjectRollup, ToolAnalytics,
};

const UNSPECIFIED_ROLE: &str = "unspecified";
const UNKNOWN_STATUS: &str = "unknown";

/// Computes dashboard figures from timeline entries and project metadata.
#[derive(Debug, Clone, Default)]
pub struct FinancialAggregator {
    rates: LaborRates,
}

impl FinancialAggregator {
    /// Creates an aggregator costing labor with the given rates.
    pub fn new(rates: LaborRates) -> Self {
        Self {
            rates: rates.sanitized(),
        }
    }

    pub fn rates(&self) -> &LaborRates {
        &self.rates
    }

    /// Cost of a single entry, split by category.
    pub fn entry_cost(&self, entry: &TimelineEntry) -> CostBreakdown {
        let labor = entry
            .workers
            .iter()
            .map(|w| {
                self.rates
                    .labor_cost(LaborCategory::Worker, &w.role, w.hours_worked, w.cost)
            })
            .chain(entry.engineers.iter().map(|e| {
                self.rates
                    .labor_cost(LaborCategory::Engineer, &e.specialty, e.hours_worked, e.cost)
            }))
            .chain(entry.architects.iter().map(|a| {
                self.rates
                    .labor_cost(LaborCategory::Architect, &a.specialty, a.hours_worked, a.cost)
            }))
            .sum();

        CostBreakdown {
            labor,
            materials: entry.materials.iter().map(|m| sanitize(m.cost)).sum(),
            tools: entry.tools.iter().map(|t| sanitize(t.cost)).sum(),
            expenses: entry.expenses.iter().map(|e| sanitize(e.amount)).sum(),
        }
    }

    /// Computes the full dashboard for the entries inside `scope`.
    pub fn aggregate(
        &self,
        entries: &[TimelineEntry],
        projects: &[Project],
        scope: &Scope,
    ) -> DashboardSummary {
        let in_scope: Vec<&TimelineEntry> = entries.iter().filter(|e| scope.matches(e)).collect();
        let index = index_projects(projects);

        debug!(
            total = entries.len(),
            in_scope = in_scope.len(),
            projects = projects.len(),
            "Aggregating timelines"
        );

        DashboardSummary {
            summary: self.summary_of(&in_scope, &index),
            projects: self.rollups_of(&in_scope, &index),
            labor: self.labor_of(&in_scope),
            materials: materials_of(&in_scope),
            tools: tools_of(&in_scope),
        }
    }

    /// Computes only the headline summary for the entries inside `scope`.
    pub fn summarize(
        &self,
        entries: &[TimelineEntry],
        projects: &[Project],
        scope: &Scope,
    ) -> FinancialSummary {
        let in_scope: Vec<&TimelineEntry> = entries.iter().filter(|e| scope.matches(e)).collect();
        self.summary_of(&in_scope, &index_projects(projects))
    }

    /// Rolls up the entries belonging to one project against its budget.
    pub fn project_rollup(&self, project: &Project, entries: &[TimelineEntry]) -> ProjectRollup {
        let mut costs = CostBreakdown::default();
        let mut count = 0;
        for entry in entries.iter().filter(|e| e.belongs_to(&project.id)) {
            costs.add(&self.entry_cost(entry));
            count += 1;
        }
        build_rollup(&project.id, Some(project), costs, count)
    }

    fn summary_of(
        &self,
        entries: &[&TimelineEntry],
        index: &HashMap<&ProjectId, &Project>,
    ) -> FinancialSummary {
        let mut totals = CostBreakdown::default();
        let mut referenced: HashSet<&ProjectId> = HashSet::new();

        for entry in entries {
            totals.add(&self.entry_cost(entry));
            if let Some(ref id) = entry.project_id {
                referenced.insert(id);
            }
        }

        let grand_total = totals.total();
        let project_count = referenced.len();
        let budget: Decimal = referenced
            .iter()
            .filter_map(|id| index.get(id))
            .map(|p| sanitize(p.budget))
            .sum();

        FinancialSummary {
            grand_total,
            total_labor_cost: totals.labor,
            total_material_cost: totals.materials,
            total_tool_cost: totals.tools,
            total_expenses: totals.expenses,
            project_count,
            timeline_entries: entries.len(),
            average_project_cost: grand_total
                .checked_div(Decimal::from(project_count))
                .unwrap_or_default(),
            roi: ((budget - grand_total) * Decimal::ONE_HUNDRED)
                .checked_div(grand_total)
                .unwrap_or_default(),
        }
    }

    /// One rollup per referenced project. Entries without a project
    /// reference count toward the summary but have no rollup.
    fn rollups_of(
        &self,
        entries: &[&TimelineEntry],
        index: &HashMap<&ProjectId, &Project>,
    ) -> Vec<ProjectRollup> {
        let mut grouped: BTreeMap<&ProjectId, (CostBreakdown, usize)> = BTreeMap::new();
        for entry in entries {
            if let Some(ref id) = entry.project_id {
                let slot = grouped.entry(id).or_default();
                slot.0.add(&self.entry_cost(entry));
                slot.1 += 1;
            }
        }

        let mut rollups: Vec<ProjectRollup> = grouped
            .into_iter()
            .map(|(id, (costs, count))| build_rollup(id, index.get(id).copied(), costs, count))
            .collect();

        rollups.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.code.cmp(&b.code))
                .then_with(|| a.project_id.cmp(&b.project_id))
        });
        rollups
    }

    fn labor_of(&self, entries: &[&TimelineEntry]) -> LaborAnalytics {
        let mut analytics = LaborAnalytics::default();
        let mut names: HashSet<String> = HashSet::new();

        let mut record = |analytics: &mut LaborAnalytics,
                          category: LaborCategory,
                          name: &str,
                          role: &str,
                          hours: Decimal,
                          flat_cost: Option<Decimal>| {
            let hours = sanitize(hours);
            let cost = self.rates.labor_cost(category, role, hours, flat_cost);
            let totals = match category {
                LaborCategory::Worker => &mut analytics.workers,
                LaborCategory::Engineer => &mut analytics.engineers,
                LaborCategory::Architect => &mut analytics.architects,
            };
            totals.hours += hours;
            totals.cost += cost;
            totals.records += 1;

            let role_key = normalize_key(role, UNSPECIFIED_ROLE);
            *analytics.hours_by_role.entry(role_key).or_default() += hours;

            let name = name.trim().to_lowercase();
            if !name.is_empty() {
                names.insert(name);
            }
        };

        for entry in entries {
            for w in &entry.workers {
                record(
                    &mut analytics,
                    LaborCategory::Worker,
                    &w.name,
                    &w.role,
                    w.hours_worked,
                    w.cost,
                );
            }
            for e in &entry.engineers {
                record(
                    &mut analytics,
                    LaborCategory::Engineer,
                    &e.name,
                    &e.specialty,
                    e.hours_worked,
                    e.cost,
                );
            }
            for a in &entry.architects {
                record(
                    &mut analytics,
                    LaborCategory::Architect,
                    &a.name,
                    &a.specialty,
                    a.hours_worked,
                    a.cost,
                );
            }
        }

        let categories: [&LaborCategoryTotals; 3] =
            [&analytics.workers, &analytics.engineers, &analytics.architects];
        analytics.total_hours = categories.iter().map(|c| c.hours).sum();
        analytics.total_cost = categories.iter().map(|c| c.cost).sum();
        analytics.headcount = names.len();
        analytics.average_hourly_cost = analytics
            .total_cost
            .checked_div(analytics.total_hours)
            .unwrap_or_default();
        analytics
    }
}

fn index_projects(projects: &[Project]) -> HashMap<&ProjectId, &Project> {
    let mut index = HashMap::with_capacity(projects.len());
    for project in projects {
        index.entry(&project.id).or_insert(project);
    }
    index
}

fn build_rollup(
    id: &ProjectId,
    project: Option<&Project>,
    costs: CostBreakdown,
    entries: usize,
) -> ProjectRollup {
    let total = costs.total();
    let budget = project.map(|p| sanitize(p.budget)).unwrap_or_default();

    ProjectRollup {
        project_id: id.clone(),
        code: project.map(|p| p.code.clone()).unwrap_or_default(),
        name: project.map(|p| p.name.clone()).unwrap_or_default(),
        budget,
        costs,
        total,
        remaining_budget: budget - total,
        budget_used_percent: (total * Decimal::ONE_HUNDRED)
            .checked_div(budget)
            .unwrap_or_default(),
        entries,
    }
}

fn materials_of(entries: &[&TimelineEntry]) -> MaterialAnalytics {
    let mut merged: BTreeMap<(String, String), MaterialLine> = BTreeMap::new();

    for material in entries.iter().flat_map(|e| e.materials.iter()) {
        let key = (
            material.name.trim().to_lowercase(),
            material.unit.trim().to_lowercase(),
        );
        let line = merged.entry(key).or_insert_with(|| MaterialLine {
            name: material.name.trim().to_string(),
            unit: material.unit.trim().to_string(),
            quantity: Decimal::ZERO,
            cost: Decimal::ZERO,
        });
        line.quantity += sanitize(material.quantity);
        line.cost += sanitize(material.cost);
    }

    let mut lines: Vec<MaterialLine> = merged.into_values().collect();
    lines.sort_by(|a, b| {
        b.cost
            .cmp(&a.cost)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.unit.cmp(&b.unit))
    });

    MaterialAnalytics {
        total_cost: lines.iter().map(|l| l.cost).sum(),
        lines,
    }
}

fn tools_of(entries: &[&TimelineEntry]) -> ToolAnalytics {
    let mut analytics = ToolAnalytics::default();

    for tool in entries.iter().flat_map(|e| e.tools.iter()) {
        let quantity = sanitize(tool.quantity);
        analytics.total_quantity += quantity;
        analytics.total_cost += sanitize(tool.cost);
        *analytics
            .by_status
            .entry(normalize_key(&tool.status, UNKNOWN_STATUS))
            .or_default() += quantity;
    }

    analytics
}

fn normalize_key(raw: &str, fallback: &str) -> String {
    let key = raw.trim().to_lowercase();
    if key.is_empty() {
        fallback.to_string()
    } else {
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use sitebook_models::Worker;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, d).unwrap()
    }

    fn project(id: &str, code: &str, budget: Decimal) -> Project {
        let mut p = Project::new(code, format!("Project {}", code)).with_budget(budget);
        p.id = ProjectId::from(id);
        p
    }

    #[test]
    fn test_entry_cost_by_category() {
        let entry = TimelineEntry::builder("p1", day(1))
            .worker("Ana", "mason", dec!(8)) // 8 * 25
            .engineer("Ben", "civil", dec!(2)) // 2 * 60
            .architect("Cy", "facade", dec!(1)) // 1 * 75
            .material("cement", dec!(10), "bag", dec!(95))
            .rented_tool("mixer", dec!(1), "in use", dec!(40))
            .tool("shovel", dec!(4), "available")
            .expense("permit", dec!(150))
            .build();

        let cost = FinancialAggregator::default().entry_cost(&entry);
        assert_eq!(cost.labor, dec!(395));
        assert_eq!(cost.materials, dec!(95));
        assert_eq!(cost.tools, dec!(40));
        assert_eq!(cost.expenses, dec!(150));
        assert_eq!(cost.total(), dec!(680));
    }

    #[test]
    fn test_flat_labor_cost_used_when_present() {
        let mut worker = Worker::new("Raj", "laborer", dec!(10));
        worker.cost = Some(dec!(100));
        let entry = TimelineEntry::builder("p1", day(1)).push_worker(worker).build();

        assert_eq!(FinancialAggregator::default().entry_cost(&entry).labor, dec!(100));
    }

    #[test]
    fn test_out_of_range_flat_cost_is_clamped() {
        let mut worker = Worker::new("Raj", "laborer", dec!(10));
        worker.cost = Some(Decimal::MAX);
        let entry = TimelineEntry::builder("p1", day(1)).push_worker(worker).build();

        let aggregator = FinancialAggregator::default();
        assert_eq!(aggregator.entry_cost(&entry).labor, dec!(250));

        let labor = aggregator.aggregate(&[entry], &[], &Scope::all()).labor;
        assert_eq!(labor.workers.cost, dec!(250));
    }

    #[test]
    fn test_negative_fields_set_in_code_are_clamped() {
        let mut entry = TimelineEntry::new("p1", day(1));
        entry.materials.push(sitebook_models::Material {
            name: "refund".to_string(),
            quantity: dec!(1),
            unit: "ea".to_string(),
            cost: dec!(-500),
        });
        let cost = FinancialAggregator::default().entry_cost(&entry);
        assert_eq!(cost.materials, Decimal::ZERO);
    }

    #[test]
    fn test_summary_metrics() {
        let projects = vec![project("p1", "A", dec!(1000)), project("p2", "B", dec!(500))];
        let entries = vec![
            TimelineEntry::builder("p1", day(1)).expense("a", dec!(300)).build(),
            TimelineEntry::builder("p1", day(2)).expense("b", dec!(200)).build(),
            TimelineEntry::builder("p2", day(2)).expense("c", dec!(250)).build(),
        ];

        let summary = FinancialAggregator::default().summarize(&entries, &projects, &Scope::all());

        assert_eq!(summary.grand_total, dec!(750));
        assert_eq!(summary.total_expenses, dec!(750));
        assert_eq!(summary.project_count, 2);
        assert_eq!(summary.timeline_entries, 3);
        assert_eq!(summary.average_project_cost, dec!(375));
        // (1500 - 750) / 750
        assert_eq!(summary.roi, dec!(100));
    }

    #[test]
    fn test_roi_ignores_projects_outside_scope() {
        let projects = vec![project("p1", "A", dec!(1000)), project("p2", "B", dec!(9000))];
        let entries = vec![TimelineEntry::builder("p1", day(1)).expense("a", dec!(500)).build()];

        let summary = FinancialAggregator::default().summarize(&entries, &projects, &Scope::all());
        assert_eq!(summary.project_count, 1);
        assert_eq!(summary.roi, dec!(100));
    }

    #[test]
    fn test_entries_without_metadata_still_count() {
        let entries = vec![TimelineEntry::builder("ghost", day(1)).expense("a", dec!(80)).build()];

        let dashboard = FinancialAggregator::default().aggregate(&entries, &[], &Scope::all());
        assert_eq!(dashboard.summary.grand_total, dec!(80));
        assert_eq!(dashboard.summary.project_count, 1);
        // No budget known: everything spent is a loss.
        assert_eq!(dashboard.summary.roi, dec!(-100));
        assert_eq!(dashboard.projects[0].code, "");
        assert_eq!(dashboard.projects[0].budget, Decimal::ZERO);
    }

    #[test]
    fn test_unassigned_entries_have_no_rollup() {
        let mut entry = TimelineEntry::builder("p1", day(1)).expense("a", dec!(10)).build();
        entry.project_id = None;

        let dashboard = FinancialAggregator::default().aggregate(&[entry], &[], &Scope::all());
        assert_eq!(dashboard.summary.grand_total, dec!(10));
        assert_eq!(dashboard.summary.project_count, 0);
        assert_eq!(dashboard.summary.average_project_cost, Decimal::ZERO);
        assert!(dashboard.projects.is_empty());
    }

    #[test]
    fn test_rollups_sorted_by_total() {
        let projects = vec![project("p1", "A", dec!(100)), project("p2", "B", dec!(100))];
        let entries = vec![
            TimelineEntry::builder("p1", day(1)).expense("a", dec!(50)).build(),
            TimelineEntry::builder("p2", day(1)).expense("b", dec!(150)).build(),
        ];

        let dashboard = FinancialAggregator::default().aggregate(&entries, &projects, &Scope::all());
        let codes: Vec<&str> = dashboard.projects.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["B", "A"]);

        let over = &dashboard.projects[0];
        assert!(over.is_over_budget());
        assert_eq!(over.remaining_budget, dec!(-50));
        assert_eq!(over.budget_used_percent, dec!(150));
    }

    #[test]
    fn test_project_rollup() {
        let p1 = project("p1", "A", dec!(1000));
        let entries = vec![
            TimelineEntry::builder("p1", day(1)).worker("Ana", "mason", dec!(4)).build(),
            TimelineEntry::builder("p2", day(1)).worker("Ben", "mason", dec!(4)).build(),
        ];

        let rollup = FinancialAggregator::default().project_rollup(&p1, &entries);
        assert_eq!(rollup.entries, 1);
        assert_eq!(rollup.costs.labor, dec!(100));
        assert_eq!(rollup.remaining_budget, dec!(900));
        assert_eq!(rollup.budget_used_percent, dec!(10));
    }

    #[test]
    fn test_labor_analytics() {
        let rates = LaborRates::default().with_role("electrician", dec!(40));
        let entries = vec![
            TimelineEntry::builder("p1", day(1))
                .worker("Ana", "Mason", dec!(8))
                .worker("Eli", "electrician", dec!(6))
                .engineer("Ben", "", dec!(2))
                .build(),
            TimelineEntry::builder("p1", day(2))
                .worker(" ana ", "mason", dec!(4))
                .build(),
        ];

        let labor = FinancialAggregator::new(rates).aggregate(&entries, &[], &Scope::all()).labor;

        assert_eq!(labor.workers.hours, dec!(18));
        assert_eq!(labor.workers.records, 3);
        assert_eq!(labor.workers.cost, dec!(12) * dec!(25) + dec!(6) * dec!(40));
        assert_eq!(labor.engineers.cost, dec!(120));
        assert_eq!(labor.total_hours, dec!(20));
        assert_eq!(labor.total_cost, dec!(660));
        assert_eq!(labor.average_hourly_cost, dec!(33));
        assert_eq!(labor.hours_by_role.get("mason"), Some(&dec!(12)));
        assert_eq!(labor.hours_by_role.get("unspecified"), Some(&dec!(2)));
        assert_eq!(labor.headcount, 3);
    }

    #[test]
    fn test_material_analytics_merges_by_name_and_unit() {
        let entries = vec![
            TimelineEntry::builder("p1", day(1))
                .material("Cement", dec!(10), "bag", dec!(100))
                .material("sand", dec!(2), "m3", dec!(300))
                .build(),
            TimelineEntry::builder("p2", day(1))
                .material("cement ", dec!(5), "Bag", dec!(50))
                .material("cement", dec!(1), "t", dec!(120))
                .build(),
        ];

        let materials = FinancialAggregator::default()
            .aggregate(&entries, &[], &Scope::all())
            .materials;

        assert_eq!(materials.total_cost, dec!(570));
        assert_eq!(materials.lines.len(), 3);
        assert_eq!(materials.lines[0].name, "sand");
        assert_eq!(materials.lines[1].name, "Cement");
        assert_eq!(materials.lines[1].quantity, dec!(15));
        assert_eq!(materials.lines[1].cost, dec!(150));
    }

    #[test]
    fn test_tool_analytics() {
        let entries = vec![TimelineEntry::builder("p1", day(1))
            .tool("drill", dec!(2), "In Use")
            .tool("saw", dec!(1), "in use")
            .rented_tool("lift", dec!(1), "", dec!(75))
            .build()];

        let tools = FinancialAggregator::default()
            .aggregate(&entries, &[], &Scope::all())
            .tools;

        assert_eq!(tools.total_quantity, dec!(4));
        assert_eq!(tools.total_cost, dec!(75));
        assert_eq!(tools.by_status.get("in use"), Some(&dec!(3)));
        assert_eq!(tools.by_status.get("unknown"), Some(&dec!(1)));
    }

    #[test]
    fn test_scope_limits_everything() {
        let projects = vec![project("p1", "A", Decimal::ZERO), project("p2", "B", Decimal::ZERO)];
        let entries = vec![
            TimelineEntry::builder("p1", day(1)).expense("a", dec!(10)).build(),
            TimelineEntry::builder("p1", day(9)).expense("b", dec!(20)).build(),
            TimelineEntry::builder("p2", day(9)).expense("c", dec!(40)).build(),
        ];
        let scope = Scope::project("p1").with_from(day(5));

        let dashboard = FinancialAggregator::default().aggregate(&entries, &projects, &scope);
        assert_eq!(dashboard.summary.grand_total, dec!(20));
        assert_eq!(dashboard.summary.timeline_entries, 1);
        assert_eq!(dashboard.projects.len(), 1);
        assert_eq!(dashboard.projects[0].code, "A");
    }
}
