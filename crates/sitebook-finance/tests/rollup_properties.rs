//! Properties every dashboard must satisfy, checked over a generated set
//! of timeline entries.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sitebook_finance::{FinancialAggregator, FinancialSummary, LaborRates, Scope};
use sitebook_models::{Project, ProjectId, TimelineEntry, Worker};

fn projects() -> Vec<Project> {
    ["north", "south", "east"]
        .iter()
        .enumerate()
        .map(|(i, code)| {
            let mut p = Project::new(code.to_uppercase(), format!("{} wing", code))
                .with_budget(dec!(20000) * Decimal::from(i + 1));
            p.id = ProjectId::from(*code);
            p
        })
        .collect()
}

/// Deterministic spread of entries with uneven amounts and some gaps.
fn entries() -> Vec<TimelineEntry> {
    let codes = ["north", "south", "east"];
    (0..30u32)
        .map(|i| {
            let n = Decimal::from(i);
            let date = NaiveDate::from_ymd_opt(2024, 9, 1 + i).unwrap();
            let mut builder = TimelineEntry::builder(codes[(i % 3) as usize], date)
                .worker(
                    format!("worker-{}", i % 7),
                    "mason",
                    dec!(1.5) * Decimal::from(i % 9),
                )
                .material("cement", Decimal::from(i % 4), "bag", dec!(13.37) * n);

            if i % 2 == 0 {
                builder = builder.engineer("Ben", "civil", dec!(0.25) * n);
            }
            if i % 5 == 0 {
                builder = builder.rented_tool("excavator", dec!(1), "in use", dec!(410.1) + n);
            }
            if i % 4 == 1 {
                builder = builder.expense("fuel", dec!(33.3) * Decimal::from(i % 11));
            }
            if i % 6 == 3 {
                let mut worker = Worker::new("subcontractor", "electrician", Decimal::ZERO);
                worker.cost = Some(dec!(777.77));
                builder = builder.push_worker(worker);
            }
            builder.build()
        })
        .collect()
}

/// Cent amounts split over three entries on one project, matched by one entry on another.
fn cent_entries() -> Vec<TimelineEntry> {
    let day = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
    vec![
        TimelineEntry::builder("pz", day).expense("a", dec!(0.1)).build(),
        TimelineEntry::builder("pz", day).expense("b", dec!(0.2)).build(),
        TimelineEntry::builder("pz", day).expense("c", dec!(0.3)).build(),
        TimelineEntry::builder("pa", day).expense("d", dec!(0.6)).build(),
    ]
}

#[test]
fn test_grand_total_is_sum_of_categories() {
    let aggregator = FinancialAggregator::new(LaborRates::default().with_role("civil", dec!(52.5)));
    let scopes = [
        Scope::all(),
        Scope::project("south"),
        Scope::all().with_from(NaiveDate::from_ymd_opt(2024, 9, 10).unwrap()),
    ];

    for scope in &scopes {
        let s = aggregator.summarize(&entries(), &projects(), scope);
        assert_eq!(
            s.grand_total,
            s.total_labor_cost + s.total_material_cost + s.total_tool_cost + s.total_expenses
        );
    }
}

#[test]
fn test_empty_set_yields_zero_summary() {
    let aggregator = FinancialAggregator::default();

    let summary = aggregator.summarize(&[], &projects(), &Scope::all());
    assert_eq!(summary, FinancialSummary::default());

    let dashboard = aggregator.aggregate(&[], &[], &Scope::all());
    assert_eq!(dashboard.summary, FinancialSummary::default());
    assert!(dashboard.projects.is_empty());
    assert!(dashboard.materials.lines.is_empty());
    assert_eq!(dashboard.labor.headcount, 0);
    assert_eq!(dashboard.tools.total_quantity, Decimal::ZERO);
}

#[test]
fn test_scope_with_no_matches_yields_zero_summary() {
    let summary = FinancialAggregator::default().summarize(
        &entries(),
        &projects(),
        &Scope::project("nowhere"),
    );
    assert_eq!(summary, FinancialSummary::default());
}

#[test]
fn test_aggregation_is_order_independent() {
    let aggregator = FinancialAggregator::default();
    let forward = entries();
    let mut reversed = forward.clone();
    reversed.reverse();
    let mut rotated = forward.clone();
    rotated.rotate_left(11);
    let mut shuffled_projects = projects();
    shuffled_projects.swap(0, 2);

    let baseline = aggregator.aggregate(&forward, &projects(), &Scope::all());
    for (entries, projects) in [(&reversed, &projects()), (&rotated, &shuffled_projects)] {
        let other = aggregator.aggregate(entries, projects, &Scope::all());
        assert_eq!(baseline.summary, other.summary);
        assert_eq!(baseline.projects, other.projects);
        assert_eq!(baseline.materials, other.materials);
        assert_eq!(baseline.labor, other.labor);
        assert_eq!(baseline.tools, other.tools);
    }
}

#[test]
fn test_cent_amounts_are_order_independent() {
    let aggregator = FinancialAggregator::default();
    let forward = cent_entries();
    let mut reversed = forward.clone();
    reversed.reverse();

    let a = aggregator.aggregate(&forward, &[], &Scope::all());
    let b = aggregator.aggregate(&reversed, &[], &Scope::all());

    assert_eq!(a.summary.grand_total, dec!(1.2));
    assert_eq!(a.summary, b.summary);

    // Both projects spent exactly 0.6; the tie is broken by ID.
    let ids: Vec<&str> = a.projects.iter().map(|r| r.project_id.as_str()).collect();
    assert_eq!(ids, vec!["pa", "pz"]);
    assert_eq!(a.projects, b.projects);
    assert_eq!(a.projects[0].total, a.projects[1].total);
}

#[test]
fn test_no_double_counting_across_categories() {
    let aggregator = FinancialAggregator::default();
    let entries = entries();
    let dashboard = aggregator.aggregate(&entries, &projects(), &Scope::all());

    // Category analytics agree with the summary totals.
    assert_eq!(dashboard.labor.total_cost, dashboard.summary.total_labor_cost);
    assert_eq!(dashboard.materials.total_cost, dashboard.summary.total_material_cost);
    assert_eq!(dashboard.tools.total_cost, dashboard.summary.total_tool_cost);

    // Per-project rollups partition the grand total.
    let rolled: Decimal = dashboard.projects.iter().map(|r| r.total).sum();
    assert_eq!(rolled, dashboard.summary.grand_total);

    // Per-entry costs partition it too.
    let per_entry: Decimal = entries.iter().map(|e| aggregator.entry_cost(e).total()).sum();
    assert_eq!(per_entry, dashboard.summary.grand_total);
}

#[test]
fn test_project_scopes_partition_dashboard() {
    let aggregator = FinancialAggregator::default();
    let entries = entries();
    let projects = projects();

    let whole = aggregator.summarize(&entries, &projects, &Scope::all());
    let parts: Decimal = projects
        .iter()
        .map(|p| {
            aggregator
                .summarize(&entries, &projects, &Scope::project(p.id.clone()))
                .grand_total
        })
        .sum();

    assert_eq!(whole.grand_total, parts);
    assert_eq!(whole.project_count, 3);
    assert_eq!(whole.timeline_entries, 30);
}

#[test]
fn test_malformed_json_entries_aggregate_as_zero() {
    let raw = serde_json::json!([
        {"project": "north", "date": "2024-09-02", "expenses": [{"description": "x", "amount": "oops"}]},
        {"project": "north", "materials": "not a list", "workers": [{"hoursWorked": "ten"}]},
        {"project": null, "tools": [{"name": "saw", "cost": -12}]}
    ]);
    let entries: Vec<TimelineEntry> = serde_json::from_value(raw).unwrap();

    let dashboard = FinancialAggregator::default().aggregate(&entries, &projects(), &Scope::all());
    assert_eq!(dashboard.summary.grand_total, Decimal::ZERO);
    assert_eq!(dashboard.summary.timeline_entries, 3);
    assert_eq!(dashboard.summary.project_count, 1);
    assert_eq!(dashboard.summary.roi, Decimal::ZERO);
}
