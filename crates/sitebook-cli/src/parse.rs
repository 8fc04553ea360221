//! Value parsers for compact command-line values such as `Ana:mason:8`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use sitebook_models::lenient::{number_from_value, MAX_AMOUNT};
use sitebook_models::{Architect, Engineer, Expense, Material, ProjectManager, Tool, Worker};

/// Parses a `YYYY-MM-DD` date.
pub fn date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{}' (expected YYYY-MM-DD)", s))
}

/// Parses a non-negative amount. Accepts "1250.5", "1,250.50" and "$1,250.50".
pub fn amount(s: &str) -> Result<Decimal, String> {
    match number_from_value(&Value::String(s.to_string())) {
        Some(n) if n.is_sign_negative() && !n.is_zero() => {
            Err(format!("amount must be zero or more: '{}'", s))
        }
        Some(n) if n > Decimal::from(MAX_AMOUNT) => Err(format!("amount too large: '{}'", s)),
        Some(n) => Ok(n.abs().normalize()),
        None => Err(format!("invalid amount '{}'", s)),
    }
}

/// Splits `raw` on ':' into between `min` and `max` trimmed fields.
fn fields<'a>(raw: &'a str, min: usize, max: usize, shape: &str) -> Result<Vec<&'a str>, String> {
    let parts: Vec<&str> = raw.split(':').map(str::trim).collect();
    if parts.len() < min || parts.len() > max {
        return Err(format!("expected {}, got '{}'", shape, raw));
    }
    if parts[0].is_empty() {
        return Err(format!("missing name in '{}'", raw));
    }
    Ok(parts)
}

/// Reads an optional flat cost from the field at `index`.
fn flat_cost(parts: &[&str], index: usize) -> Result<Option<Decimal>, String> {
    parts
        .get(index)
        .filter(|raw| !raw.is_empty())
        .map(|raw| amount(raw))
        .transpose()
}

/// `name:role:hours[:cost]`
pub fn worker(s: &str) -> Result<Worker, String> {
    let parts = fields(s, 3, 4, "name:role:hours[:cost]")?;
    let mut worker = Worker::new(parts[0], parts[1], amount(parts[2])?);
    worker.cost = flat_cost(&parts, 3)?;
    Ok(worker)
}

/// `name:specialty:hours[:cost]`
pub fn engineer(s: &str) -> Result<Engineer, String> {
    let parts = fields(s, 3, 4, "name:specialty:hours[:cost]")?;
    let mut engineer = Engineer::new(parts[0], parts[1], amount(parts[2])?);
    engineer.cost = flat_cost(&parts, 3)?;
    Ok(engineer)
}

/// `name:specialty:hours[:cost]`
pub fn architect(s: &str) -> Result<Architect, String> {
    let parts = fields(s, 3, 4, "name:specialty:hours[:cost]")?;
    let mut architect = Architect::new(parts[0], parts[1], amount(parts[2])?);
    architect.cost = flat_cost(&parts, 3)?;
    Ok(architect)
}

/// `name[:contact]`
pub fn manager(s: &str) -> Result<ProjectManager, String> {
    let (name, contact) = match s.split_once(':') {
        Some((name, contact)) => (name.trim(), contact.trim()),
        None => (s.trim(), ""),
    };
    if name.is_empty() {
        return Err(format!("missing name in '{}'", s));
    }
    Ok(ProjectManager {
        name: name.to_string(),
        contact: contact.to_string(),
    })
}

/// `name:quantity:unit:cost`, where cost is the line total.
pub fn material(s: &str) -> Result<Material, String> {
    let parts = fields(s, 4, 4, "name:quantity:unit:cost")?;
    Ok(Material::new(
        parts[0],
        amount(parts[1])?,
        parts[2],
        amount(parts[3])?,
    ))
}

/// `name:quantity:status[:cost]`
pub fn tool(s: &str) -> Result<Tool, String> {
    let parts = fields(s, 3, 4, "name:quantity:status[:cost]")?;
    let tool = Tool::new(parts[0], amount(parts[1])?, parts[2]);
    Ok(match flat_cost(&parts, 3)? {
        Some(cost) => tool.with_cost(cost),
        None => tool,
    })
}

/// `description:amount`; the description may itself contain ':'.
pub fn expense(s: &str) -> Result<Expense, String> {
    let (description, raw) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("expected description:amount, got '{}'", s))?;
    if description.trim().is_empty() {
        return Err(format!("missing description in '{}'", s));
    }
    Ok(Expense::new(description.trim(), amount(raw)?))
}
