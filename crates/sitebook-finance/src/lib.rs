//! Financial roll-ups for SiteBook.
//!
//! Given timeline entries and the projects they belong to, the
//! [`FinancialAggregator`] produces a [`DashboardSummary`]: cost totals per
//! category, per-project rollups against budget, labor/material/tool
//! analytics, and the derived averages and ROI.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal::Decimal;
//! use sitebook_finance::{FinancialAggregator, Scope};
//! use sitebook_models::{Project, TimelineEntry};
//!
//! let project = Project::new("TWR-01", "Harbour Tower").with_budget(Decimal::from(10_000));
//! let day = NaiveDate::from_ymd_opt(2024, 5, 14).unwrap();
//! let entry = TimelineEntry::builder(project.id.clone(), day)
//!     .worker("Ana", "mason", Decimal::from(8))
//!     .material("cement", Decimal::from(20), "bag", Decimal::new(18050, 2))
//!     .build();
//!
//! let dashboard = FinancialAggregator::default().aggregate(&[entry], &[project], &Scope::all());
//! assert_eq!(dashboard.summary.grand_total, Decimal::new(38050, 2));
//! ```

pub mod aggregator;
pub mod rates;
pub mod scope;
pub mod summary;

pub use aggregator::FinancialAggregator;
pub use rates::{LaborCategory, LaborRates};
pub use scope::Scope;
pub use summary::{
    CostBreakdown, DashboardSummary, FinancialSummary, LaborAnalytics, LaborCategoryTotals,
    MaterialAnalytics, MaterialLine, ProjectRollup, ToolAnalytics,
};
