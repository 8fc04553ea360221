//! Timeline entries: one day of site activity for a project.
//!
//! An entry lists who worked and for how long, what was bought, which
//! tools were on site and any other expenses. Every list may be absent and
//! every number may be malformed; see [`crate::lenient`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{ProjectId, TimelineId};
use crate::lenient::{
    lenient_date, lenient_decimal, lenient_opt_decimal, lenient_string, lenient_vec, project_ref,
    sanitize,
};

/// A labourer on site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// Trade, e.g. "mason" or "electrician".
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub hours_worked: Decimal,
    /// Flat cost for the day; replaces hours × rate when present.
    #[serde(
        default,
        deserialize_with = "lenient_opt_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub cost: Option<Decimal>,
}

impl Worker {
    pub fn new(name: impl Into<String>, role: impl Into<String>, hours_worked: Decimal) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            hours_worked: sanitize(hours_worked),
            cost: None,
        }
    }
}

/// An engineer on site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Engineer {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub specialty: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub hours_worked: Decimal,
    #[serde(
        default,
        deserialize_with = "lenient_opt_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub cost: Option<Decimal>,
}

impl Engineer {
    pub fn new(name: impl Into<String>, specialty: impl Into<String>, hours_worked: Decimal) -> Self {
        Self {
            name: name.into(),
            specialty: specialty.into(),
            hours_worked: sanitize(hours_worked),
            cost: None,
        }
    }
}

/// An architect on site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Architect {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub specialty: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub hours_worked: Decimal,
    #[serde(
        default,
        deserialize_with = "lenient_opt_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub cost: Option<Decimal>,
}

impl Architect {
    pub fn new(name: impl Into<String>, specialty: impl Into<String>, hours_worked: Decimal) -> Self {
        Self {
            name: name.into(),
            specialty: specialty.into(),
            hours_worked: sanitize(hours_worked),
            cost: None,
        }
    }
}

/// The project manager responsible for the day. Carries no cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManager {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub contact: String,
}

/// A miscellaneous expense (permits, fuel, catering...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub amount: Decimal,
    #[serde(default, deserialize_with = "lenient_date", skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl Expense {
    pub fn new(description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            description: description.into(),
            amount: sanitize(amount),
            date: None,
        }
    }
}

/// A material purchase. `cost` is the total for the line, not a unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub quantity: Decimal,
    #[serde(default, deserialize_with = "lenient_string")]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub cost: Decimal,
}

impl Material {
    pub fn new(name: impl Into<String>, quantity: Decimal, unit: impl Into<String>, cost: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity: sanitize(quantity),
            unit: unit.into(),
            cost: sanitize(cost),
        }
    }
}

/// A tool on site. `cost` covers rental or wear for the day, if recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub quantity: Decimal,
    /// Free-form condition, e.g. "available", "in use", "broken".
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub cost: Decimal,
}

impl Tool {
    pub fn new(name: impl Into<String>, quantity: Decimal, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: sanitize(quantity),
            status: status.into(),
            cost: Decimal::ZERO,
        }
    }

    pub fn with_cost(mut self, cost: Decimal) -> Self {
        self.cost = sanitize(cost);
        self
    }
}

/// One day of activity on one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "TimelineEntryRepr")]
pub struct TimelineEntry {
    pub id: TimelineId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// The project this day belongs to. `None` when the record lost its
    /// reference; such entries still count toward dashboard totals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,

    pub workers: Vec<Worker>,
    pub engineers: Vec<Engineer>,
    pub architects: Vec<Architect>,
    pub project_managers: Vec<ProjectManager>,
    pub expenses: Vec<Expense>,
    pub materials: Vec<Material>,
    pub tools: Vec<Tool>,
    pub notes: String,
}

/// Wire shape of a timeline entry.
///
/// Records written by the backend carry `_id` and a `project` reference,
/// ours carry `id` and `projectId`, and some carry both spellings. The
/// canonical key wins when both are present.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineEntryRepr {
    #[serde(default)]
    id: Option<TimelineId>,
    #[serde(default, rename = "_id")]
    backend_id: Option<TimelineId>,
    #[serde(default, deserialize_with = "lenient_date")]
    date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "project_ref")]
    project_id: Option<ProjectId>,
    #[serde(default, deserialize_with = "project_ref")]
    project: Option<ProjectId>,
    #[serde(default, deserialize_with = "lenient_vec")]
    workers: Vec<Worker>,
    #[serde(default, deserialize_with = "lenient_vec")]
    engineers: Vec<Engineer>,
    #[serde(default, deserialize_with = "lenient_vec")]
    architects: Vec<Architect>,
    #[serde(default, deserialize_with = "lenient_vec")]
    project_managers: Vec<ProjectManager>,
    #[serde(default, deserialize_with = "lenient_vec")]
    expenses: Vec<Expense>,
    #[serde(default, deserialize_with = "lenient_vec")]
    materials: Vec<Material>,
    #[serde(default, deserialize_with = "lenient_vec")]
    tools: Vec<Tool>,
    #[serde(default, deserialize_with = "lenient_string")]
    notes: String,
}

impl From<TimelineEntryRepr> for TimelineEntry {
    fn from(repr: TimelineEntryRepr) -> Self {
        Self {
            id: repr.id.or(repr.backend_id).unwrap_or_default(),
            date: repr.date,
            project_id: repr.project_id.or(repr.project),
            workers: repr.workers,
            engineers: repr.engineers,
            architects: repr.architects,
            project_managers: repr.project_managers,
            expenses: repr.expenses,
            materials: repr.materials,
            tools: repr.tools,
            notes: repr.notes,
        }
    }
}

impl TimelineEntry {
    /// Creates an empty entry for a project on a date.
    pub fn new(project_id: impl Into<ProjectId>, date: NaiveDate) -> Self {
        Self {
            id: TimelineId::new(),
            date: Some(date),
            project_id: Some(project_id.into()),
            workers: Vec::new(),
            engineers: Vec::new(),
            architects: Vec::new(),
            project_managers: Vec::new(),
            expenses: Vec::new(),
            materials: Vec::new(),
            tools: Vec::new(),
            notes: String::new(),
        }
    }

    /// True if the entry belongs to the given project.
    pub fn belongs_to(&self, project_id: &ProjectId) -> bool {
        self.project_id.as_ref() == Some(project_id)
    }

    /// Total hours logged by workers, engineers and architects.
    pub fn total_hours(&self) -> Decimal {
        self.workers.iter().map(|w| w.hours_worked).sum::<Decimal>()
            + self.engineers.iter().map(|e| e.hours_worked).sum::<Decimal>()
            + self.architects.iter().map(|a| a.hours_worked).sum::<Decimal>()
    }

    /// True if nothing was recorded besides the date and project.
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
            && self.engineers.is_empty()
            && self.architects.is_empty()
            && self.project_managers.is_empty()
            && self.expenses.is_empty()
            && self.materials.is_empty()
            && self.tools.is_empty()
            && self.notes.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 14).unwrap()
    }

    #[test]
    fn test_new_entry_is_empty() {
        let entry = TimelineEntry::new("proj-1", day());

        assert!(entry.id.as_str().starts_with("tl-"));
        assert_eq!(entry.date, Some(day()));
        assert!(entry.belongs_to(&ProjectId::from("proj-1")));
        assert!(entry.is_empty());
        assert_eq!(entry.total_hours(), Decimal::ZERO);
    }

    #[test]
    fn test_total_hours() {
        let mut entry = TimelineEntry::new("proj-1", day());
        entry.workers.push(Worker::new("Ana", "mason", dec!(8)));
        entry.engineers.push(Engineer::new("Ben", "structural", dec!(4.5)));
        entry.architects.push(Architect::new("Cy", "facade", dec!(2)));

        assert_eq!(entry.total_hours(), dec!(14.5));
        assert!(!entry.is_empty());
    }

    #[test]
    fn test_decode_form_submission() {
        let entry: TimelineEntry = serde_json::from_value(json!({
            "_id": "6620aa",
            "date": "2024-05-14T00:00:00.000Z",
            "project": {"_id": "p-77", "name": "Depot"},
            "workers": [
                {"name": "Ana", "role": "mason", "hoursWorked": "8"},
                {"name": "Raj", "role": "laborer", "hoursWorked": null, "cost": "120"}
            ],
            "engineers": null,
            "projectManagers": [{"name": "Lee", "contact": 5551234}],
            "expenses": [{"description": "permit", "amount": "abc"}],
            "materials": [{"name": "cement", "quantity": 20, "unit": "bag", "cost": 180.0}],
            "tools": [{"name": "mixer", "quantity": 1, "status": "in use"}, "garbage"],
            "notes": "pour delayed by rain"
        }))
        .unwrap();

        assert_eq!(entry.id.as_str(), "6620aa");
        assert_eq!(entry.date, Some(day()));
        assert_eq!(entry.project_id, Some(ProjectId::from("p-77")));
        assert_eq!(entry.workers[0].hours_worked, dec!(8));
        assert_eq!(entry.workers[1].hours_worked, Decimal::ZERO);
        assert_eq!(entry.workers[1].cost, Some(dec!(120)));
        assert!(entry.engineers.is_empty());
        assert_eq!(entry.project_managers[0].contact, "5551234");
        assert_eq!(entry.expenses[0].amount, Decimal::ZERO);
        assert_eq!(entry.materials[0].cost, dec!(180));
        assert_eq!(entry.tools.len(), 1);
        assert_eq!(entry.tools[0].cost, Decimal::ZERO);
    }

    #[test]
    fn test_decode_both_id_and_project_spellings() {
        let entry: TimelineEntry = serde_json::from_value(json!({
            "_id": "t1",
            "project": "p1",
            "projectId": "p1",
            "expenses": [{"amount": 50}]
        }))
        .unwrap();

        assert_eq!(entry.id.as_str(), "t1");
        assert_eq!(entry.project_id, Some(ProjectId::from("p1")));
        assert_eq!(entry.expenses[0].amount, dec!(50));

        let entry: TimelineEntry = serde_json::from_value(json!({
            "id": "ours",
            "_id": "theirs",
            "projectId": "p2",
            "project": {"_id": "p3"}
        }))
        .unwrap();

        assert_eq!(entry.id.as_str(), "ours");
        assert_eq!(entry.project_id, Some(ProjectId::from("p2")));
    }

    #[test]
    fn test_decode_numeric_ids() {
        let entry: TimelineEntry = serde_json::from_value(json!({
            "_id": 1042,
            "project": 7,
            "workers": [{"name": "Ana", "hoursWorked": 8}]
        }))
        .unwrap();

        assert_eq!(entry.id.as_str(), "1042");
        assert_eq!(entry.project_id, Some(ProjectId::from("7")));
        assert_eq!(entry.total_hours(), dec!(8));
    }

    #[test]
    fn test_decoded_entry_round_trips_through_storage_shape() {
        let entry: TimelineEntry = serde_json::from_value(json!({
            "_id": "t9",
            "project": "p1",
            "materials": [{"name": "sand", "quantity": "3", "cost": 0.1}]
        }))
        .unwrap();
        let stored = serde_json::to_value(&entry).unwrap();
        let reloaded: TimelineEntry = serde_json::from_value(stored).unwrap();

        assert_eq!(reloaded, entry);
        assert_eq!(reloaded.materials[0].cost, dec!(0.1));
    }

    #[test]
    fn test_decode_minimal_record() {
        let entry: TimelineEntry = serde_json::from_value(json!({})).unwrap();

        assert!(entry.date.is_none());
        assert!(entry.project_id.is_none());
        assert!(entry.is_empty());
    }

    #[test]
    fn test_serialized_field_names() {
        let mut entry = TimelineEntry::new("proj-1", day());
        entry.workers.push(Worker::new("Ana", "mason", dec!(8)));
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["projectId"], "proj-1");
        assert_eq!(value["date"], "2024-05-14");
        assert_eq!(value["workers"][0]["hoursWorked"], 8.0);
        assert!(value["workers"][0].get("cost").is_none());
        assert!(value["projectManagers"].as_array().unwrap().is_empty());
    }
}
