//! Plain-text rendering for tables and the dashboard.

use std::collections::HashMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use sitebook_finance::{DashboardSummary, FinancialAggregator, LaborCategoryTotals, ProjectRollup};
use sitebook_models::{Project, ProjectId, TimelineEntry};

/// Material lines shown on the dashboard before the rest is summarized.
const MATERIAL_LINES_SHOWN: usize = 10;

/// Rounds half away from zero, the way amounts are rounded on paper.
fn rounded(value: Decimal, places: u32) -> Decimal {
    value.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero)
}

/// Formats an amount as dollars with thousands separators: `-$1,234.50`.
pub fn money(amount: Decimal) -> String {
    let amount = rounded(amount, 2);
    let cents = (amount.abs() * Decimal::ONE_HUNDRED)
        .to_u128()
        .unwrap_or_default();
    let whole = (cents / 100).to_string();

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount.is_sign_negative() && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

pub fn percent(value: Decimal) -> String {
    format!("{:.1}%", rounded(value, 1))
}

/// Hours or quantities with one decimal place.
fn tenths(value: Decimal) -> String {
    format!("{:.1}", rounded(value, 1))
}

/// Shortens `s` to at most `max_len` characters, marking the cut with "...".
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

pub fn project_table(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "No projects found.".to_string();
    }

    let mut lines = vec![
        format!(
            "{:<12}  {:<28}  {:<12}  {:<8}  {:>14}",
            "CODE", "NAME", "STATUS", "PRIORITY", "BUDGET"
        ),
        "-".repeat(82),
    ];
    for project in projects {
        lines.push(format!(
            "{:<12}  {:<28}  {:<12}  {:<8}  {:>14}",
            truncate(project.label(), 12),
            truncate(&project.name, 28),
            project.status,
            project.priority,
            money(project.budget)
        ));
    }
    lines.push(format!("\n{} project(s)", projects.len()));
    lines.join("\n")
}

pub fn project_brief(projects: &[Project]) -> String {
    projects
        .iter()
        .map(|p| format!("{}\t{}\t{}", p.id, p.code, p.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// A project's details followed by its spend against budget.
pub fn project_detail(project: &Project, rollup: &ProjectRollup) -> String {
    let mut lines = vec![
        format!("Project: {} ({})", project.name, project.id),
        format!("  Code: {}", project.code),
    ];
    if !project.project_type.is_empty() {
        lines.push(format!("  Type: {}", project.project_type));
    }
    lines.push(format!("  Status: {}", project.status));
    lines.push(format!("  Priority: {}", project.priority));
    if let Some(name) = &project.owner.name {
        lines.push(format!("  Owner: {}", name));
    }
    for contact in [&project.owner.email, &project.owner.phone].into_iter().flatten() {
        lines.push(format!("         {}", contact));
    }
    if !project.issues.trim().is_empty() {
        lines.push(format!("  Issues: {}", project.issues));
    }
    if !project.observations.trim().is_empty() {
        lines.push(format!("  Observations: {}", project.observations));
    }
    lines.push(format!("  Created: {}", project.created_at.format("%Y-%m-%d")));

    lines.push(String::new());
    lines.push(format!("  Budget:    {:>14}", money(rollup.budget)));
    lines.push(format!(
        "  Spent:     {:>14}  ({} entries)",
        money(rollup.total),
        rollup.entries
    ));
    lines.push(format!("  Remaining: {:>14}", money(rollup.remaining_budget)));
    if !rollup.budget.is_zero() {
        let flag = if rollup.is_over_budget() { "  OVER BUDGET" } else { "" };
        lines.push(format!(
            "  Used:      {:>14}{}",
            percent(rollup.budget_used_percent),
            flag
        ));
    }
    lines.push(format!(
        "    labor {}, materials {}, tools {}, expenses {}",
        money(rollup.costs.labor),
        money(rollup.costs.materials),
        money(rollup.costs.tools),
        money(rollup.costs.expenses)
    ));
    lines.join("\n")
}

/// Timeline entries with their cost, labelled by project code.
pub fn timeline_table(
    entries: &[TimelineEntry],
    labels: &HashMap<ProjectId, String>,
    aggregator: &FinancialAggregator,
) -> String {
    if entries.is_empty() {
        return "No timeline entries found.".to_string();
    }

    let mut lines = vec![
        format!(
            "{:<10}  {:<12}  {:>7}  {:>12}  {:<40}  NOTES",
            "DATE", "PROJECT", "HOURS", "COST", "ID"
        ),
        "-".repeat(100),
    ];
    for entry in entries {
        let date = entry
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let project = match &entry.project_id {
            Some(id) => labels.get(id).cloned().unwrap_or_else(|| id.to_string()),
            None => "-".to_string(),
        };
        lines.push(format!(
            "{:<10}  {:<12}  {:>7}  {:>12}  {:<40}  {}",
            date,
            truncate(&project, 12),
            tenths(entry.total_hours()),
            money(aggregator.entry_cost(entry).total()),
            entry.id,
            truncate(entry.notes.trim(), 30)
        ));
    }
    lines.push(format!("\n{} entry(ies)", entries.len()));
    lines.join("\n")
}

pub fn timeline_brief(entries: &[TimelineEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            let date = e.date.map(|d| d.to_string()).unwrap_or_default();
            let project = e.project_id.as_ref().map(|p| p.as_str()).unwrap_or_default();
            format!("{}\t{}\t{}", e.id, date, project)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn labor_row(label: &str, totals: &LaborCategoryTotals) -> String {
    format!(
        "  {:<11} {:>9}h  {:>14}  ({} records)",
        label,
        tenths(totals.hours),
        money(totals.cost),
        totals.records
    )
}

/// The full dashboard as text.
pub fn dashboard(dashboard: &DashboardSummary) -> String {
    let s = &dashboard.summary;
    let mut lines = vec![
        "FINANCIAL SUMMARY".to_string(),
        format!("  Grand total:      {:>14}", money(s.grand_total)),
        format!("  Labor:            {:>14}", money(s.total_labor_cost)),
        format!("  Materials:        {:>14}", money(s.total_material_cost)),
        format!("  Tools:            {:>14}", money(s.total_tool_cost)),
        format!("  Expenses:         {:>14}", money(s.total_expenses)),
        format!("  Projects:         {:>14}", s.project_count),
        format!("  Timeline entries: {:>14}", s.timeline_entries),
        format!("  Avg per project:  {:>14}", money(s.average_project_cost)),
        format!("  ROI:              {:>14}", percent(s.roi)),
    ];

    if !dashboard.projects.is_empty() {
        lines.push(String::new());
        lines.push("PROJECTS".to_string());
        lines.push(format!(
            "  {:<12}  {:<24}  {:>14}  {:>14}  {:>8}",
            "CODE", "NAME", "SPENT", "BUDGET", "USED"
        ));
        for rollup in &dashboard.projects {
            let code = if rollup.code.is_empty() {
                rollup.project_id.as_str()
            } else {
                &rollup.code
            };
            let used = if !rollup.budget.is_zero() {
                percent(rollup.budget_used_percent)
            } else {
                "-".to_string()
            };
            let flag = if rollup.is_over_budget() { "  !" } else { "" };
            lines.push(format!(
                "  {:<12}  {:<24}  {:>14}  {:>14}  {:>8}{}",
                truncate(code, 12),
                truncate(&rollup.name, 24),
                money(rollup.total),
                money(rollup.budget),
                used,
                flag
            ));
        }
    }

    let labor = &dashboard.labor;
    if !labor.total_hours.is_zero() || !labor.total_cost.is_zero() {
        lines.push(String::new());
        lines.push("LABOR".to_string());
        lines.push(labor_row("Workers", &labor.workers));
        lines.push(labor_row("Engineers", &labor.engineers));
        lines.push(labor_row("Architects", &labor.architects));
        lines.push(format!(
            "  {} people, {}h total, {} per hour on average",
            labor.headcount,
            tenths(labor.total_hours),
            money(labor.average_hourly_cost)
        ));
        for (role, hours) in &labor.hours_by_role {
            lines.push(format!("    {:<20} {:>9}h", truncate(role, 20), tenths(*hours)));
        }
    }

    let materials = &dashboard.materials;
    if !materials.lines.is_empty() {
        lines.push(String::new());
        lines.push("MATERIALS".to_string());
        for line in materials.lines.iter().take(MATERIAL_LINES_SHOWN) {
            lines.push(format!(
                "  {:<24} {:>10} {:<8} {:>14}",
                truncate(&line.name, 24),
                format!("{:.2}", rounded(line.quantity, 2)),
                truncate(&line.unit, 8),
                money(line.cost)
            ));
        }
        let hidden = materials.lines.len().saturating_sub(MATERIAL_LINES_SHOWN);
        if hidden > 0 {
            lines.push(format!("  ... and {} more", hidden));
        }
    }

    let tools = &dashboard.tools;
    if !tools.total_quantity.is_zero() || !tools.total_cost.is_zero() {
        lines.push(String::new());
        lines.push("TOOLS".to_string());
        lines.push(format!(
            "  {} on site, {} in rental/wear",
            tools.total_quantity,
            money(tools.total_cost)
        ));
        for (status, quantity) in &tools.by_status {
            lines.push(format!("    {:<20} {:>9}", truncate(status, 20), quantity));
        }
    }

    lines.join("\n")
}

/// One-line dashboard summary.
pub fn dashboard_brief(dashboard: &DashboardSummary) -> String {
    let s = &dashboard.summary;
    format!(
        "total={:.2} labor={:.2} materials={:.2} tools={:.2} expenses={:.2} projects={} entries={} roi={:.1}",
        rounded(s.grand_total, 2),
        rounded(s.total_labor_cost, 2),
        rounded(s.total_material_cost, 2),
        rounded(s.total_tool_cost, 2),
        rounded(s.total_expenses, 2),
        s.project_count,
        s.timeline_entries,
        rounded(s.roi, 1)
    )
}
