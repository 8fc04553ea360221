//! Dashboard output types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use sitebook_models::ProjectId;

/// Cost of a set of entries split by category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub labor: Decimal,
    pub materials: Decimal,
    pub tools: Decimal,
    pub expenses: Decimal,
}

impl CostBreakdown {
    /// Sum of the four categories.
    pub fn total(&self) -> Decimal {
        self.labor + self.materials + self.tools + self.expenses
    }

    /// Adds another breakdown category by category.
    pub fn add(&mut self, other: &CostBreakdown) {
        self.labor += other.labor;
        self.materials += other.materials;
        self.tools += other.tools;
        self.expenses += other.expenses;
    }
}

/// The headline numbers of a dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub grand_total: Decimal,
    pub total_labor_cost: Decimal,
    pub total_material_cost: Decimal,
    pub total_tool_cost: Decimal,
    pub total_expenses: Decimal,
    /// Distinct projects referenced by the entries in scope.
    pub project_count: usize,
    pub timeline_entries: usize,
    pub average_project_cost: Decimal,
    /// `(budget - cost) / cost` as a percentage; zero when nothing was spent.
    pub roi: Decimal,
}

/// Cost of one project against its budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRollup {
    pub project_id: ProjectId,
    /// Empty when the project's record was not available.
    pub code: String,
    pub name: String,
    pub budget: Decimal,
    pub costs: CostBreakdown,
    pub total: Decimal,
    /// `budget - total`; negative when over budget.
    pub remaining_budget: Decimal,
    /// Share of the budget spent, in percent; zero without a budget.
    pub budget_used_percent: Decimal,
    pub entries: usize,
}

impl ProjectRollup {
    pub fn is_over_budget(&self) -> bool {
        !self.budget.is_zero() && self.total > self.budget
    }
}

/// Hours and cost for one labor category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborCategoryTotals {
    pub hours: Decimal,
    pub cost: Decimal,
    /// Number of labor records (person-days).
    pub records: usize,
}

/// Who worked, for how long, at what cost.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborAnalytics {
    pub total_hours: Decimal,
    pub total_cost: Decimal,
    pub workers: LaborCategoryTotals,
    pub engineers: LaborCategoryTotals,
    pub architects: LaborCategoryTotals,
    /// Hours per role or specialty (lowercased; blank roles as "unspecified").
    pub hours_by_role: BTreeMap<String, Decimal>,
    /// Distinct people by name, across all three categories.
    pub headcount: usize,
    /// `total_cost / total_hours`; zero without hours.
    pub average_hourly_cost: Decimal,
}

/// Spend on one material, merged across entries by name and unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialLine {
    pub name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub cost: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialAnalytics {
    pub total_cost: Decimal,
    /// Most expensive first.
    pub lines: Vec<MaterialLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolAnalytics {
    /// Sum of tool quantities.
    pub total_quantity: Decimal,
    pub total_cost: Decimal,
    /// Quantity per status (lowercased; blank as "unknown").
    pub by_status: BTreeMap<String, Decimal>,
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub summary: FinancialSummary,
    /// Highest total first.
    pub projects: Vec<ProjectRollup>,
    pub labor: LaborAnalytics,
    pub materials: MaterialAnalytics,
    pub tools: ToolAnalytics,
}
