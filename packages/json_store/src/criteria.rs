//! Evaluating query filters and orderings against stored records.

use std::cmp::Ordering;

use regex::Regex;

use schemashim_mapping::Error;
use schemashim_records::{
    ConditionExpression, ConditionOperator, FilterExpression, LogicalOperator, OrderExpression,
    OrderType, Record, Value,
};

/// Whether `record` passes `filter`. An empty filter passes everything.
pub fn matches(record: &Record, filter: &FilterExpression) -> Result<bool, Error> {
    let mut results = Vec::with_capacity(filter.conditions.len() + filter.filters.len());
    for condition in &filter.conditions {
        results.push(condition_matches(record, condition)?);
    }
    for nested in &filter.filters {
        results.push(matches(record, nested)?);
    }

    Ok(match filter.filter_operator {
        LogicalOperator::And => results.iter().all(|&r| r),
        LogicalOperator::Or => results.is_empty() || results.iter().any(|&r| r),
    })
}

fn condition_matches(record: &Record, condition: &ConditionExpression) -> Result<bool, Error> {
    let value = record
        .attributes
        .get(&condition.attribute_name)
        .unwrap_or(&Value::Null);
    let values = &condition.values;

    let single = || -> Result<&Value, Error> {
        match values.as_slice() {
            [operand] => Ok(operand),
            _ => Err(Error::invalid_request(format!(
                "condition on '{}' takes exactly one value, got {}",
                condition.attribute_name,
                values.len()
            ))),
        }
    };

    Ok(match condition.operator {
        ConditionOperator::Equal => equal(value, single()?),
        ConditionOperator::NotEqual => !equal(value, single()?),
        ConditionOperator::GreaterThan => compare(value, single()?) == Some(Ordering::Greater),
        ConditionOperator::GreaterEqual => matches!(
            compare(value, single()?),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        ConditionOperator::LessThan => compare(value, single()?) == Some(Ordering::Less),
        ConditionOperator::LessEqual => matches!(
            compare(value, single()?),
            Some(Ordering::Less | Ordering::Equal)
        ),
        ConditionOperator::Null => value.is_null(),
        ConditionOperator::NotNull => !value.is_null(),
        ConditionOperator::In => values.iter().any(|v| equal(value, v)),
        ConditionOperator::NotIn => !values.iter().any(|v| equal(value, v)),
        ConditionOperator::Like => like(value, single()?, &condition.attribute_name)?,
        ConditionOperator::NotLike => !like(value, single()?, &condition.attribute_name)?,
    })
}

fn equal(a: &Value, b: &Value) -> bool {
    compare(a, b) == Some(Ordering::Equal)
}

/// Compare two attribute values. `None` when they are not comparable.
///
/// Integers and floats compare numerically; GUIDs compare with strings by
/// their text form, case-insensitively.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Integer(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
        (Value::Float(a), Value::Integer(b)) => a.partial_cmp(&(*b as f64)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Guid(a), Value::Guid(b)) => Some(a.cmp(b)),
        (Value::Guid(g), Value::String(s)) => Some(g.to_string().cmp(&s.to_ascii_lowercase())),
        (Value::String(s), Value::Guid(g)) => Some(s.to_ascii_lowercase().cmp(&g.to_string())),
        _ => None,
    }
}

/// SQL `LIKE` matching, case-insensitive: `%` matches any run of
/// characters and `_` exactly one.
fn like(value: &Value, pattern: &Value, attribute: &str) -> Result<bool, Error> {
    let Some(pattern) = pattern.as_str() else {
        return Err(Error::invalid_request(format!(
            "like pattern for '{}' must be a string",
            attribute
        )));
    };
    let Some(text) = value.as_str() else {
        return Ok(false);
    };
    let matcher = like_regex(pattern).map_err(|e| {
        Error::invalid_request(format!("like pattern '{}' for '{}': {}", pattern, attribute, e))
    })?;
    Ok(matcher.is_match(text))
}

fn like_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push_str("(?is)^");
    let mut literal = String::new();
    for ch in pattern.chars() {
        match ch {
            '%' | '_' => {
                expr.push_str(&regex::escape(&literal));
                literal.clear();
                expr.push_str(if ch == '%' { ".*" } else { "." });
            }
            other => literal.push(other),
        }
    }
    expr.push_str(&regex::escape(&literal));
    expr.push('$');
    Regex::new(&expr)
}

/// Order two records by a list of orderings. Nulls sort first.
pub fn order(a: &Record, b: &Record, orders: &[OrderExpression]) -> Ordering {
    for order in orders {
        let left = a.attributes.get(&order.attribute_name).unwrap_or(&Value::Null);
        let right = b.attributes.get(&order.attribute_name).unwrap_or(&Value::Null);
        let ordering = match (left.is_null(), right.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => compare(left, right).unwrap_or(Ordering::Equal),
        };
        let ordering = match order.order_type {
            OrderType::Ascending => ordering,
            OrderType::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemashim_mapping::ErrorKind;

    fn acme() -> Record {
        Record::new("account")
            .with_attribute("name", "Acme Corp")
            .with_attribute("revenue", 1500i64)
            .with_attribute("rating", 4.5)
    }

    fn condition(attribute: &str, operator: ConditionOperator, values: Vec<Value>) -> FilterExpression {
        FilterExpression::default().with_condition(ConditionExpression::new(attribute, operator, values))
    }

    #[test]
    fn comparisons() {
        let record = acme();
        let check = |attribute: &str, operator, value: Value| {
            matches(&record, &condition(attribute, operator, vec![value])).unwrap()
        };

        assert!(check("name", ConditionOperator::Equal, "Acme Corp".into()));
        assert!(check("name", ConditionOperator::NotEqual, "Other".into()));
        assert!(check("revenue", ConditionOperator::GreaterThan, 1000i64.into()));
        assert!(check("revenue", ConditionOperator::GreaterEqual, 1500i64.into()));
        assert!(!check("revenue", ConditionOperator::LessThan, 1500i64.into()));
        assert!(check("revenue", ConditionOperator::LessEqual, 1500.0.into()));
        assert!(check("rating", ConditionOperator::GreaterThan, 4i64.into()));
    }

    #[test]
    fn null_checks_treat_missing_as_null() {
        let record = acme();
        assert!(matches(&record, &condition("phone", ConditionOperator::Null, vec![])).unwrap());
        assert!(matches(&record, &condition("name", ConditionOperator::NotNull, vec![])).unwrap());
    }

    #[test]
    fn in_lists() {
        let record = acme();
        let values = vec![Value::from(1i64), Value::from(1500i64)];
        assert!(matches(&record, &condition("revenue", ConditionOperator::In, values.clone())).unwrap());
        assert!(!matches(&record, &condition("revenue", ConditionOperator::NotIn, values)).unwrap());
    }

    fn like(text: &str, pattern: &str) -> bool {
        like_regex(pattern).unwrap().is_match(text)
    }

    #[test]
    fn like_patterns() {
        assert!(like("acme corp", "acme%"));
        assert!(like("acme corp", "%corp"));
        assert!(like("acme corp", "%me%co%"));
        assert!(like("acme corp", "%"));
        assert!(!like("acme corp", "corp%"));
        assert!(!like("ab", "a%b%b"));

        let record = acme();
        assert!(matches(&record, &condition("name", ConditionOperator::Like, vec!["ACME%".into()])).unwrap());
        assert!(matches(&record, &condition("name", ConditionOperator::NotLike, vec!["x%".into()])).unwrap());
    }

    #[test]
    fn like_underscore_matches_one_character() {
        assert!(like("acme", "a_me"));
        assert!(like("ACME", "a_m_"));
        assert!(!like("acme", "a_e"));
        assert!(!like("ame", "a_me"));
    }

    #[test]
    fn like_treats_regex_syntax_literally() {
        assert!(like("a.b (x)", "a.b (%)"));
        assert!(!like("axb", "a.b"));
        assert!(like("50$+", "50$+"));
    }

    #[test]
    fn wrong_operand_count_is_invalid() {
        let err = matches(&acme(), &condition("name", ConditionOperator::Equal, vec![])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Invalid);
    }

    #[test]
    fn logical_operators() {
        let record = acme();
        let yes = ConditionExpression::new("name", ConditionOperator::NotNull, vec![]);
        let no = ConditionExpression::new("name", ConditionOperator::Null, vec![]);

        let and = FilterExpression::new(LogicalOperator::And)
            .with_condition(yes.clone())
            .with_condition(no.clone());
        let or = FilterExpression::new(LogicalOperator::Or)
            .with_condition(yes)
            .with_condition(no);

        assert!(!matches(&record, &and).unwrap());
        assert!(matches(&record, &or).unwrap());
        assert!(matches(&record, &FilterExpression::new(LogicalOperator::Or)).unwrap());
    }

    #[test]
    fn ordering_puts_nulls_first() {
        let a = Record::new("t").with_attribute("n", 2i64);
        let b = Record::new("t").with_attribute("n", 1i64);
        let c = Record::new("t");
        let mut rows = vec![a, b, c];

        rows.sort_by(|x, y| order(x, y, &[OrderExpression::new("n", OrderType::Ascending)]));
        let ns: Vec<Option<i64>> = rows.iter().map(|r| r.get("n").and_then(Value::as_i64)).collect();
        assert_eq!(ns, vec![None, Some(1), Some(2)]);

        rows.sort_by(|x, y| order(x, y, &[OrderExpression::new("n", OrderType::Descending)]));
        let ns: Vec<Option<i64>> = rows.iter().map(|r| r.get("n").and_then(Value::as_i64)).collect();
        assert_eq!(ns, vec![Some(2), Some(1), None]);
    }
}
