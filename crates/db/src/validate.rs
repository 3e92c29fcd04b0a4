//! Write-time enforcement of registered field groups.

use std::collections::BTreeMap;

use serde_json::Value;
use shelf_kernel::content::FieldViolation;
use shelf_kernel::schema::{FieldDef, FieldGroup, FieldKind};

const STEP_TOLERANCE: f64 = 1e-6;

/// Check `fields` against every group. Returns all violations at once.
pub fn check_fields<'a>(
    groups: impl IntoIterator<Item = &'a FieldGroup>,
    fields: &BTreeMap<String, Value>,
) -> Vec<FieldViolation> {
    let mut violations = Vec::new();
    for group in groups {
        for def in &group.fields {
            if let Some(problem) = check_field(def, fields.get(&def.name)) {
                violations.push(FieldViolation::new(&def.name, problem));
            }
        }
    }
    violations
}

fn check_field(def: &FieldDef, value: Option<&Value>) -> Option<String> {
    let value = match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(other) => Some(other),
    };

    let Some(value) = value else {
        return def.required.then(|| "is required".to_string());
    };

    match def.kind {
        FieldKind::Text => match value {
            Value::String(_) => None,
            _ => Some("must be text".to_string()),
        },
        FieldKind::Number => match as_number(value) {
            Some(number) => check_bounds(def, number),
            None => Some("must be a number".to_string()),
        },
        FieldKind::Select => {
            let accepted = value
                .as_str()
                .is_some_and(|key| def.choices.iter().any(|c| c.value == key));
            if accepted {
                None
            } else {
                let keys: Vec<&str> = def.choices.iter().map(|c| c.value.as_str()).collect();
                Some(format!("must be one of: {}", keys.join(", ")))
            }
        }
    }
}

fn check_bounds(def: &FieldDef, number: f64) -> Option<String> {
    if let Some(min) = def.min {
        if number < min {
            return Some(format!("must be at least {min}"));
        }
    }
    if let Some(max) = def.max {
        if number > max {
            return Some(format!("must be at most {max}"));
        }
    }
    if let Some(step) = def.step.filter(|s| *s > 0.0) {
        let steps = (number - def.min.unwrap_or(0.0)) / step;
        if (steps - steps.round()).abs() > STEP_TOLERANCE {
            return Some(format!("must be a multiple of {step}"));
        }
    }
    None
}

/// Numbers, or text holding a number.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shelf_kernel::schema::LocationRule;

    fn group() -> FieldGroup {
        FieldGroup {
            key: "group_test".into(),
            title: "Test".into(),
            fields: vec![
                FieldDef::text("field_author", "Author", "author").required(),
                FieldDef::number("field_price", "Price", "price")
                    .required()
                    .min(0.0)
                    .step(0.01),
                FieldDef::number("field_rating", "Rating", "rating")
                    .min(0.0)
                    .max(5.0)
                    .step(1.0),
                FieldDef::select("field_genre", "Genre", "genre", &[("fiction", "Fiction")]),
            ],
            location: LocationRule::PostTypeIs("test".into()),
        }
    }

    fn fields(value: Value) -> BTreeMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    fn problems(value: Value) -> Vec<String> {
        check_fields([&group()], &fields(value))
            .into_iter()
            .map(|v| v.to_string())
            .collect()
    }

    #[test]
    fn test_valid_fields_pass() {
        assert!(problems(json!({"author": "Herbert", "price": 9.99, "rating": 4, "genre": "fiction"})).is_empty());
    }

    #[test]
    fn test_numeric_text_is_accepted() {
        assert!(problems(json!({"author": "A", "price": "12.50"})).is_empty());
    }

    #[test]
    fn test_required_fields_reject_missing_null_and_empty() {
        assert_eq!(
            problems(json!({"author": "", "price": null})),
            ["author: is required", "price: is required"]
        );
    }

    #[test]
    fn test_bounds_and_step_are_enforced() {
        assert_eq!(
            problems(json!({"author": "A", "price": -1, "rating": 6})),
            ["price: must be at least 0", "rating: must be at most 5"]
        );
        assert_eq!(
            problems(json!({"author": "A", "price": 1.005, "rating": 2.5})),
            ["price: must be a multiple of 0.01", "rating: must be a multiple of 1"]
        );
    }

    #[test]
    fn test_select_rejects_unknown_choice() {
        assert_eq!(
            problems(json!({"author": "A", "price": 1, "genre": "poetry"})),
            ["genre: must be one of: fiction"]
        );
    }

    #[test]
    fn test_type_mismatches_are_reported() {
        assert_eq!(
            problems(json!({"author": 42, "price": "cheap"})),
            ["author: must be text", "price: must be a number"]
        );
    }
}
