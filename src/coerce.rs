// Lenient coercion for vendor JSON payloads.
//
// Scanner feeds are inconsistent: the same field arrives as a bool, a number,
// a string ("0", "true", "15.2") or not at all. Everything funnels through
// these helpers so the classifier itself never touches raw JSON shapes.

use serde_json::Value;

/// Walk a nested path, returning None as soon as a segment is missing.
pub fn read<'a>(value: Option<&'a Value>, path: &[&str]) -> Option<&'a Value> {
    let mut current = value?;
    for key in path {
        current = current.get(key)?;
    }
    Some(current)
}

/// Boolean coercion. Numbers are truthy when non-zero, strings when they
/// spell "1", "true" or "yes" (case-insensitive). Anything else is false.
pub fn to_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => {
            matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes")
        }
        _ => false,
    }
}

/// Numeric coercion. Finite numbers pass through, parseable finite strings
/// parse, everything else (bools included) collapses to 0.
pub fn to_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(0.0),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_read_walks_nested_paths() {
        let value = json!({"priceChange": {"h1": 15.2}});
        let found = read(Some(&value), &["priceChange", "h1"]);
        assert_eq!(found, Some(&json!(15.2)));
        assert_eq!(read(Some(&value), &["priceChange", "h24"]), None);
        assert_eq!(read(None, &["priceChange"]), None);
    }

    #[test]
    fn test_read_stops_on_non_object_segment() {
        let value = json!({"txns": 5});
        assert_eq!(read(Some(&value), &["txns", "h1"]), None);
    }

    #[test]
    fn test_to_bool_accepts_vendor_truthy_spellings() {
        assert!(to_bool(Some(&json!(true))));
        assert!(to_bool(Some(&json!(1))));
        assert!(to_bool(Some(&json!("1"))));
        assert!(to_bool(Some(&json!("true"))));
        assert!(to_bool(Some(&json!("  YES "))));
    }

    #[test]
    fn test_to_bool_rejects_everything_else() {
        assert!(!to_bool(Some(&json!(false))));
        assert!(!to_bool(Some(&json!(0))));
        assert!(!to_bool(Some(&json!("0"))));
        assert!(!to_bool(Some(&json!("no"))));
        assert!(!to_bool(Some(&json!("truthy"))));
        assert!(!to_bool(Some(&json!(null))));
        assert!(!to_bool(Some(&json!({"a": 1}))));
        assert!(!to_bool(None));
    }

    #[test]
    fn test_to_number_coerces_numbers_and_strings() {
        assert_eq!(to_number(Some(&json!(42.5))), 42.5);
        assert_eq!(to_number(Some(&json!("42.5"))), 42.5);
        assert_eq!(to_number(Some(&json!(" 7 "))), 7.0);
        assert_eq!(to_number(Some(&json!(-3))), -3.0);
    }

    #[test]
    fn test_to_number_defaults_to_zero() {
        assert_eq!(to_number(Some(&json!("not a number"))), 0.0);
        assert_eq!(to_number(Some(&json!(true))), 0.0);
        assert_eq!(to_number(Some(&json!(null))), 0.0);
        assert_eq!(to_number(Some(&json!([1, 2]))), 0.0);
        assert_eq!(to_number(None), 0.0);
    }
}
