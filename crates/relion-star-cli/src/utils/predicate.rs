use relion_star::core::models::table::{Row, Table, normalize_label};
use relion_star::core::models::value::Value;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PredicateError {
    #[error("No comparison operator in '{0}'. Expected 'LABEL OP VALUE' with OP one of ==, !=, <, <=, >, >=.")]
    MissingOperator(String),

    #[error("Invalid operator '{op}' in '{expr}'. Use ==, !=, <, <=, > or >=.")]
    InvalidOperator { expr: String, op: String },

    #[error("Component '{component}' cannot be empty in condition '{expr}'.")]
    EmptyComponent {
        component: &'static str,
        expr: String,
    },

    #[error("Column '{0}' used in a condition does not exist")]
    UnknownColumn(String),

    #[error("Column '{label}' is numeric but '{value}' is not a number")]
    NonNumericValue { label: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    fn accepts(self, ordering: Option<Ordering>) -> bool {
        match (self, ordering) {
            (CompareOp::Ne, None) => true,
            (_, None) => false,
            (CompareOp::Eq, Some(o)) => o == Ordering::Equal,
            (CompareOp::Ne, Some(o)) => o != Ordering::Equal,
            (CompareOp::Lt, Some(o)) => o == Ordering::Less,
            (CompareOp::Le, Some(o)) => o != Ordering::Greater,
            (CompareOp::Gt, Some(o)) => o == Ordering::Greater,
            (CompareOp::Ge, Some(o)) => o != Ordering::Less,
        }
    }
}

/// A row condition such as `rlnClassNumber == 3` or `rlnDefocusU<15000`.
///
/// Numeric columns compare as numbers and string columns compare
/// lexicographically. NaN cells only satisfy `!=`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub label: String,
    pub op: CompareOp,
    pub value: String,
    number: Option<f64>,
}

impl Predicate {
    /// Checks the condition against the columns of `table`.
    pub fn validate(&self, table: &Table) -> Result<(), PredicateError> {
        let kind = table
            .column_type(&self.label)
            .map_err(|_| PredicateError::UnknownColumn(self.label.clone()))?;
        if kind.is_numeric() && self.number.is_none() {
            return Err(PredicateError::NonNumericValue {
                label: self.label.clone(),
                value: self.value.clone(),
            });
        }
        Ok(())
    }

    pub fn matches(&self, row: &Row<'_>) -> bool {
        let ordering = match row.get(&self.label) {
            Some(Value::Str(s)) => Some(s.as_str().cmp(self.value.as_str())),
            Some(value) => match (value.as_f64(), self.number) {
                (Ok(cell), Some(target)) => cell.partial_cmp(&target),
                _ => None,
            },
            None => return false,
        };
        self.op.accepts(ordering)
    }
}

impl FromStr for Predicate {
    type Err = PredicateError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        let start = expr
            .find(['=', '!', '<', '>'])
            .ok_or_else(|| PredicateError::MissingOperator(expr.to_string()))?;
        let rest = &expr[start..];
        let op_len = rest
            .char_indices()
            .find(|(_, c)| !matches!(c, '=' | '!' | '<' | '>'))
            .map_or(rest.len(), |(i, _)| i);
        let op = match &rest[..op_len] {
            "==" => CompareOp::Eq,
            "!=" => CompareOp::Ne,
            "<" => CompareOp::Lt,
            "<=" => CompareOp::Le,
            ">" => CompareOp::Gt,
            ">=" => CompareOp::Ge,
            other => {
                return Err(PredicateError::InvalidOperator {
                    expr: expr.to_string(),
                    op: other.to_string(),
                });
            }
        };

        let label = normalize_label(expr[..start].trim());
        if label.is_empty() {
            return Err(PredicateError::EmptyComponent {
                component: "label",
                expr: expr.to_string(),
            });
        }
        let value = unquote(rest[op_len..].trim());
        if value.is_empty() {
            return Err(PredicateError::EmptyComponent {
                component: "value",
                expr: expr.to_string(),
            });
        }

        Ok(Self {
            label: label.to_string(),
            op,
            value: value.to_string(),
            number: value.parse().ok(),
        })
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.label, self.op.symbol(), self.value)
    }
}

fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = s
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    s
}
