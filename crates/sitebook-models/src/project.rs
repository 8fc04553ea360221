//! Project records.
//!
//! A project is a construction job with a budget. Timeline entries point
//! at projects by ID; the budget is what the dashboard measures cost
//! against.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::ids::ProjectId;
use crate::lenient::{lenient_decimal, lenient_string, sanitize};

/// Normalizes a free-form enum label: "In Progress" and "in-progress" both
/// become "in_progress".
fn normalize_label(raw: &str) -> String {
    raw.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Declares a string-labelled enum whose `Deserialize` falls back to the
/// default variant for labels it does not know.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? } default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $(
                #[doc = $label]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match normalize_label(s).as_str() {
                    $($label => Ok($name::$variant),)+
                    other => Err(format!(
                        "unknown {}: '{}' (expected one of: {})",
                        stringify!($name),
                        other,
                        [$($label),+].join(", ")
                    )),
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let value = Option::<Value>::deserialize(deserializer)?;
                Ok(value
                    .as_ref()
                    .and_then(Value::as_str)
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_default())
            }
        }
    };
}

labelled_enum! {
    /// How urgently a project is staffed and funded.
    ProjectPriority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    } default Medium
}

labelled_enum! {
    /// Lifecycle status of a project.
    ProjectStatus {
        Planning => "planning",
        InProgress => "in_progress",
        OnHold => "on_hold",
        Completed => "completed",
        Cancelled => "cancelled",
    } default Planning
}

/// Contact details of the project owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "OwnerRepr")]
pub struct Owner {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Owner {
    /// Creates an owner known only by name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// Wire shapes accepted for an owner: a bare name or a contact object.
#[derive(Deserialize)]
#[serde(untagged)]
enum OwnerRepr {
    Name(String),
    Contact {
        #[serde(default, alias = "ownerName")]
        name: Option<String>,
        #[serde(default)]
        email: Option<String>,
        #[serde(default)]
        phone: Option<String>,
    },
    Other(Value),
}

impl From<OwnerRepr> for Owner {
    fn from(repr: OwnerRepr) -> Self {
        match repr {
            OwnerRepr::Name(name) if name.trim().is_empty() => Owner::default(),
            OwnerRepr::Name(name) => Owner::named(name),
            OwnerRepr::Contact { name, email, phone } => Owner { name, email, phone },
            OwnerRepr::Other(_) => Owner::default(),
        }
    }
}

/// A construction project.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique identifier for the project.
    #[serde(default, alias = "_id")]
    pub id: ProjectId,

    /// Short human-facing code, e.g. "TWR-01".
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    /// Kind of work (residential, commercial, roadworks, ...).
    #[serde(default, alias = "type", deserialize_with = "lenient_string")]
    pub project_type: String,

    #[serde(default)]
    pub priority: ProjectPriority,

    /// Approved budget. Never negative.
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub budget: Decimal,

    #[serde(default)]
    pub status: ProjectStatus,

    #[serde(default, skip_serializing_if = "Owner::is_empty")]
    pub owner: Owner,

    /// Known problems on site.
    #[serde(default, deserialize_with = "lenient_string")]
    pub issues: String,

    #[serde(default, deserialize_with = "lenient_string")]
    pub observations: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Creates a new project with the given code and name.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ProjectId::new(),
            code: code.into(),
            name: name.into(),
            project_type: String::new(),
            priority: ProjectPriority::default(),
            budget: Decimal::ZERO,
            status: ProjectStatus::default(),
            owner: Owner::default(),
            issues: String::new(),
            observations: String::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Sets the budget, clamping it to a non-negative amount.
    pub fn with_budget(mut self, budget: Decimal) -> Self {
        self.budget = sanitize(budget);
        self
    }

    /// Records a modification.
    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    pub fn set_status(&mut self, status: ProjectStatus) {
        self.status = status;
        self.touch();
    }

    /// True when `key` is this project's ID or (case-insensitively) its code.
    pub fn matches_key(&self, key: &str) -> bool {
        let key = key.trim();
        self.id.as_str() == key || (!self.code.is_empty() && self.code.eq_ignore_ascii_case(key))
    }

    /// Label used in listings: the code when there is one, else the ID.
    pub fn label(&self) -> &str {
        if self.code.is_empty() {
            self.id.as_str()
        } else {
            &self.code
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_project_creation() {
        let project = Project::new("TWR-01", "Harbour Tower");

        assert!(project.id.as_str().starts_with("proj-"));
        assert_eq!(project.code, "TWR-01");
        assert_eq!(project.name, "Harbour Tower");
        assert_eq!(project.priority, ProjectPriority::Medium);
        assert_eq!(project.status, ProjectStatus::Planning);
        assert_eq!(project.budget, Decimal::ZERO);
        assert!(project.updated_at.is_none());
    }

    #[test]
    fn test_with_budget_clamps() {
        assert_eq!(Project::new("A", "a").with_budget(dec!(-10)).budget, Decimal::ZERO);
        assert_eq!(Project::new("A", "a").with_budget(dec!(5000.25)).budget, dec!(5000.25));
    }

    #[test]
    fn test_set_status_touches() {
        let mut project = Project::new("A", "a");
        project.set_status(ProjectStatus::InProgress);

        assert_eq!(project.status, ProjectStatus::InProgress);
        assert!(project.updated_at.is_some());
    }

    #[test]
    fn test_matches_key() {
        let project = Project::new("twr-01", "Tower");
        assert!(project.matches_key("TWR-01"));
        assert!(project.matches_key(project.id.as_str()));
        assert!(!project.matches_key("TWR-02"));

        let uncoded = Project::new("", "No code");
        assert!(!uncoded.matches_key(""));
        assert_eq!(uncoded.label(), uncoded.id.as_str());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!("In Progress".parse::<ProjectStatus>(), Ok(ProjectStatus::InProgress));
        assert_eq!("on-hold".parse::<ProjectStatus>(), Ok(ProjectStatus::OnHold));
        assert!("demolished".parse::<ProjectStatus>().is_err());
        assert_eq!(ProjectStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn test_decode_backend_shape() {
        let project: Project = serde_json::from_value(json!({
            "_id": "65f1",
            "code": "RD-7",
            "name": "Ring road",
            "type": "roadworks",
            "priority": "High",
            "budget": "250000",
            "status": "in progress",
            "owner": {"name": "City Council", "email": "works@city.gov"},
            "issues": null
        }))
        .unwrap();

        assert_eq!(project.id.as_str(), "65f1");
        assert_eq!(project.project_type, "roadworks");
        assert_eq!(project.priority, ProjectPriority::High);
        assert_eq!(project.budget, dec!(250000));
        assert_eq!(project.status, ProjectStatus::InProgress);
        assert_eq!(project.owner.name.as_deref(), Some("City Council"));
        assert!(project.issues.is_empty());
    }

    #[test]
    fn test_decode_unknown_labels_fall_back() {
        let project: Project = serde_json::from_value(json!({
            "name": "x",
            "priority": "whenever",
            "status": 7,
            "owner": "Dana Ruiz"
        }))
        .unwrap();

        assert_eq!(project.priority, ProjectPriority::Medium);
        assert_eq!(project.status, ProjectStatus::Planning);
        assert_eq!(project.owner, Owner::named("Dana Ruiz"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let mut project = Project::new("A", "a");
        project.project_type = "residential".to_string();
        let value = serde_json::to_value(&project).unwrap();

        assert_eq!(value["projectType"], "residential");
        assert_eq!(value["status"], "planning");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("owner").is_none());
    }
}
