//! Hourly labor rates.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use sitebook_models::lenient::{coerce_decimal, lenient_decimal, sanitize};

/// Which list a labor record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaborCategory {
    Worker,
    Engineer,
    Architect,
}

pub const DEFAULT_WORKER_RATE: Decimal = Decimal::from_parts(25, 0, 0, false, 0);
pub const DEFAULT_ENGINEER_RATE: Decimal = Decimal::from_parts(60, 0, 0, false, 0);
pub const DEFAULT_ARCHITECT_RATE: Decimal = Decimal::from_parts(75, 0, 0, false, 0);

/// Hourly rates used to cost labor records that carry no flat cost.
///
/// A role or specialty listed in `by_role` overrides the category rate.
/// Role keys are matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LaborRates {
    #[serde(deserialize_with = "lenient_decimal")]
    pub worker: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub engineer: Decimal,
    #[serde(deserialize_with = "lenient_decimal")]
    pub architect: Decimal,
    #[serde(deserialize_with = "lenient_rate_map")]
    pub by_role: BTreeMap<String, Decimal>,
}

impl Default for LaborRates {
    fn default() -> Self {
        Self {
            worker: DEFAULT_WORKER_RATE,
            engineer: DEFAULT_ENGINEER_RATE,
            architect: DEFAULT_ARCHITECT_RATE,
            by_role: BTreeMap::new(),
        }
    }
}

impl LaborRates {
    /// Sets the rate for a role or specialty.
    pub fn with_role(mut self, role: impl AsRef<str>, rate: Decimal) -> Self {
        self.by_role
            .insert(role.as_ref().trim().to_lowercase(), sanitize(rate));
        self
    }

    /// Returns a copy with every rate clamped to a non-negative amount and
    /// role keys normalized.
    pub fn sanitized(&self) -> Self {
        Self {
            worker: sanitize(self.worker),
            engineer: sanitize(self.engineer),
            architect: sanitize(self.architect),
            by_role: self
                .by_role
                .iter()
                .map(|(role, rate)| (role.trim().to_lowercase(), sanitize(*rate)))
                .collect(),
        }
    }

    /// Hourly rate for a record of `category` with the given role/specialty.
    pub fn rate_for(&self, category: LaborCategory, role: &str) -> Decimal {
        let role = role.trim().to_lowercase();
        if let Some(rate) = self.by_role.get(&role) {
            return *rate;
        }
        match category {
            LaborCategory::Worker => self.worker,
            LaborCategory::Engineer => self.engineer,
            LaborCategory::Architect => self.architect,
        }
    }

    /// Cost of one labor record: the flat cost when a usable one was
    /// recorded, otherwise hours × rate.
    pub fn labor_cost(
        &self,
        category: LaborCategory,
        role: &str,
        hours: Decimal,
        flat_cost: Option<Decimal>,
    ) -> Decimal {
        match flat_cost.map(sanitize) {
            Some(cost) if !cost.is_zero() => cost,
            _ => sanitize(hours) * self.rate_for(category, role),
        }
    }
}

/// `deserialize_with` for the role table; unreadable rates become zero.
fn lenient_rate_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(role, rate)| (role.clone(), coerce_decimal(rate)))
            .collect(),
        _ => BTreeMap::new(),
    })
}
