//! Expression builders.
//!
//! Attribute names are always referenced through `#name` placeholders so
//! reserved words (`timestamp`, `country`, `position`, ...) never reach the
//! expression text.

use std::collections::HashMap;

use crate::record::Attribute;

/// A built expression with its placeholder bindings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    pub text: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, Attribute>,
}

impl Expression {
    /// True when no condition was built.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Builds `#<prefix>0 = :<prefix>0 AND #<prefix>1 = :<prefix>1 ...`.
///
/// # Examples
///
/// ```
/// use cbdynamo_core::expression::equality_expression;
/// use cbdynamo_core::Attribute;
///
/// let expr = equality_expression("f", &[("country".to_string(), Attribute::from("chile"))]);
/// assert_eq!(expr.text, "#f0 = :f0");
/// assert_eq!(expr.names["#f0"], "country");
/// ```
pub fn equality_expression(prefix: &str, pairs: &[(String, Attribute)]) -> Expression {
    let mut expr = Expression::default();
    let mut clauses = Vec::with_capacity(pairs.len());

    for (i, (name, value)) in pairs.iter().enumerate() {
        let name_ph = format!("#{prefix}{i}");
        let value_ph = format!(":{prefix}{i}");
        clauses.push(format!("{name_ph} = {value_ph}"));
        expr.names.insert(name_ph, name.clone());
        expr.values.insert(value_ph, value.clone());
    }

    expr.text = clauses.join(" AND ");
    expr
}

/// Builds a projection expression `#p0, #p1, ...` for the given attributes.
///
/// Duplicate attribute names are projected once.
pub fn projection_expression(attributes: &[String]) -> Expression {
    let mut expr = Expression::default();
    let mut seen: Vec<&str> = Vec::with_capacity(attributes.len());

    for name in attributes {
        if seen.contains(&name.as_str()) {
            continue;
        }
        let placeholder = format!("#p{}", seen.len());
        expr.names.insert(placeholder, name.clone());
        seen.push(name);
    }

    expr.text = (0..seen.len())
        .map(|i| format!("#p{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    expr
}
