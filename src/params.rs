use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ParametrizeError;

/// A single parameter value. Kept as a small closed set so bindings stay
/// serializable and render deterministically in labels and saved records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{v}"),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Str(v) => write!(f, "{v}"),
        }
    }
}

impl From<&ParamValue> for serde_json::Value {
    fn from(v: &ParamValue) -> Self {
        match v {
            ParamValue::Bool(b) => serde_json::Value::Bool(*b),
            ParamValue::Int(i) => serde_json::Value::from(*i),
            ParamValue::Float(f) => serde_json::Value::from(*f),
            ParamValue::Str(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<usize> for ParamValue {
    fn from(v: usize) -> Self {
        ParamValue::Int(v as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(v.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(v)
    }
}

/// One concrete argument binding, in parameter declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    pairs: Vec<(String, ParamValue)>,
}

impl Params {
    pub fn new(pairs: Vec<(String, ParamValue)>) -> Self {
        Self { pairs }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, ParamValue)> {
        self.pairs.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// # Panics
    /// Panics if `name` is not bound to an integer.
    pub fn int(&self, name: &str) -> i64 {
        self.get(name)
            .and_then(ParamValue::as_i64)
            .unwrap_or_else(|| panic!("no integer parameter `{name}`"))
    }

    /// # Panics
    /// Panics if `name` is not bound to a number.
    pub fn float(&self, name: &str) -> f64 {
        self.get(name)
            .and_then(ParamValue::as_f64)
            .unwrap_or_else(|| panic!("no float parameter `{name}`"))
    }

    /// # Panics
    /// Panics if `name` is not bound to a boolean.
    pub fn boolean(&self, name: &str) -> bool {
        self.get(name)
            .and_then(ParamValue::as_bool)
            .unwrap_or_else(|| panic!("no boolean parameter `{name}`"))
    }

    /// # Panics
    /// Panics if `name` is not bound to a string.
    pub fn str(&self, name: &str) -> &str {
        self.get(name)
            .and_then(ParamValue::as_str)
            .unwrap_or_else(|| panic!("no string parameter `{name}`"))
    }

    /// `a=1,b=5` in declaration order; used to build case labels.
    pub fn label_fragment(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// JSON object rendering in declaration order, e.g. `{"a":1,"b":5}`.
    /// This is what the `parameters` field of a saved record holds.
    pub fn render_json(&self) -> String {
        let mut out = String::from("{");
        for (i, (k, v)) in self.pairs.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&serde_json::Value::String(k.clone()).to_string());
            out.push(':');
            out.push_str(&serde_json::Value::from(v).to_string());
        }
        out.push('}');
        out
    }
}

/// A parametrization spec attached to a benchmark function.
#[derive(Debug, Clone, PartialEq)]
pub enum ParametrizeSpec {
    /// Dict-of-lists style: expands to the Cartesian product across all
    /// names, iterating names in declaration order with the last-declared
    /// name varying fastest.
    NamedLists {
        names: Vec<String>,
        values: HashMap<String, Vec<ParamValue>>,
    },
    /// Name/tuple-list style: each row is one case verbatim, in declared
    /// order. Row arity must equal the number of names.
    TupleRows {
        names: Vec<String>,
        rows: Vec<Vec<ParamValue>>,
    },
}

impl ParametrizeSpec {
    /// Build a `NamedLists` spec from `(name, values)` axes in declaration
    /// order.
    pub fn matrix<N, V, A, I>(axes: I) -> Self
    where
        N: Into<String>,
        V: Into<ParamValue>,
        A: IntoIterator<Item = V>,
        I: IntoIterator<Item = (N, A)>,
    {
        let mut names = Vec::new();
        let mut values = HashMap::new();
        for (name, vals) in axes {
            let name = name.into();
            names.push(name.clone());
            values.insert(name, vals.into_iter().map(Into::into).collect());
        }
        ParametrizeSpec::NamedLists { names, values }
    }

    /// Build a `TupleRows` spec from a name sequence and literal rows.
    pub fn rows<N, I>(names: I, rows: Vec<Vec<ParamValue>>) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = N>,
    {
        ParametrizeSpec::TupleRows {
            names: names.into_iter().map(Into::into).collect(),
            rows,
        }
    }

    /// Expand the spec into an ordered sequence of concrete bindings.
    pub fn expand(&self) -> Result<Vec<Params>, ParametrizeError> {
        match self {
            ParametrizeSpec::NamedLists { names, values } => {
                let mut axes = Vec::with_capacity(names.len());
                for name in names {
                    let vals = values
                        .get(name)
                        .ok_or_else(|| ParametrizeError::MissingName(name.clone()))?;
                    axes.push(vals);
                }
                Ok(cartesian(names, &axes))
            }
            ParametrizeSpec::TupleRows { names, rows } => {
                let mut out = Vec::with_capacity(rows.len());
                for (index, row) in rows.iter().enumerate() {
                    if row.len() != names.len() {
                        return Err(ParametrizeError::ArityMismatch {
                            index,
                            expected: names.len(),
                            found: row.len(),
                        });
                    }
                    out.push(Params::new(
                        names.iter().cloned().zip(row.iter().cloned()).collect(),
                    ));
                }
                Ok(out)
            }
        }
    }
}

/// Lexicographic product in axis declaration order: the rightmost axis
/// varies fastest, the leftmost slowest.
fn cartesian(names: &[String], axes: &[&Vec<ParamValue>]) -> Vec<Params> {
    if names.is_empty() {
        return Vec::new();
    }
    let counts: Vec<usize> = axes.iter().map(|a| a.len()).collect();
    if counts.iter().any(|&c| c == 0) {
        return Vec::new();
    }
    let total: usize = counts.iter().product();
    let mut out = Vec::with_capacity(total);
    let mut cursor = vec![0usize; axes.len()];
    for _ in 0..total {
        out.push(Params::new(
            names
                .iter()
                .zip(cursor.iter())
                .enumerate()
                .map(|(axis, (name, &i))| (name.clone(), axes[axis][i].clone()))
                .collect(),
        ));
        for pos in (0..cursor.len()).rev() {
            cursor[pos] += 1;
            if cursor[pos] < counts[pos] {
                break;
            }
            cursor[pos] = 0;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_fragment_keeps_declaration_order() {
        let p = Params::new(vec![
            ("b".to_owned(), ParamValue::Int(2)),
            ("a".to_owned(), ParamValue::Str("x".to_owned())),
        ]);
        assert_eq!(p.label_fragment(), "b=2,a=x");
    }

    #[test]
    fn json_rendering_quotes_strings() {
        let p = Params::new(vec![
            ("n".to_owned(), ParamValue::Int(10)),
            ("mode".to_owned(), ParamValue::Str("fast".to_owned())),
        ]);
        assert_eq!(p.render_json(), r#"{"n":10,"mode":"fast"}"#);
    }

    #[test]
    fn empty_axis_expands_to_nothing() {
        let spec = ParametrizeSpec::matrix([("a", Vec::<i64>::new())]);
        assert_eq!(spec.expand().unwrap(), vec![]);
    }
}
