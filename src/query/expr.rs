//! Typed building blocks for `$filter`, `$select`, and `$orderby` values.
//!
//! Property and method-call references are modeled as explicit [`Expr`]
//! nodes and rendered to their OData form; constants are formatted per the
//! OData literal rules by [`ODataValue`].

use crate::core::ExactError;
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

/// Comparison operator for `$filter` predicates, rendered lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `eq`
    Eq,
    /// `ne`
    Ne,
    /// `gt`
    Gt,
    /// `ge`
    Ge,
    /// `lt`
    Lt,
    /// `le`
    Le,
}

impl Operator {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
        }
    }
}

/// A constant value rendered into a query per the OData literal rules.
#[derive(Debug, Clone, PartialEq)]
pub enum ODataValue {
    /// Single-quoted: `'value'`.
    String(String),
    /// Single-quoted: `'v'`.
    Char(char),
    /// Prefixed: `guid'9f2b...'`.
    Guid(Uuid),
    /// Prefixed, second precision: `datetime'2024-01-31T12:00:00'`.
    DateTime(DateTime<Utc>),
    /// Lowercase `true` / `false`.
    Bool(bool),
    /// Plain string form.
    Int(i64),
    /// Plain string form.
    Float(f64),
    /// The unquoted literal `null`.
    Null,
}

impl ODataValue {
    /// Render the literal to its OData form.
    pub fn to_odata(&self) -> String {
        match self {
            Self::String(s) => format!("'{s}'"),
            Self::Char(c) => format!("'{c}'"),
            Self::Guid(g) => format!("guid'{g}'"),
            Self::DateTime(d) => format!("datetime'{}'", d.format("%Y-%m-%dT%H:%M:%S")),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Null => "null".to_string(),
        }
    }
}

impl fmt::Display for ODataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_odata())
    }
}

impl From<&str> for ODataValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ODataValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<char> for ODataValue {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl From<Uuid> for ODataValue {
    fn from(value: Uuid) -> Self {
        Self::Guid(value)
    }
}

impl From<DateTime<Utc>> for ODataValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

impl From<bool> for ODataValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for ODataValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for ODataValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for ODataValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T> From<Option<T>> for ODataValue
where
    T: Into<ODataValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

/// A property or method-call reference inside a filter, select, or order
/// directive.
///
/// ```
/// use exactonline_rs::Expr;
///
/// let expr = Expr::property("Name").call("ToLower", []);
/// assert_eq!(expr.to_odata().unwrap(), "tolower(Name)");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A direct reference to a property on the queried entity.
    Property(String),
    /// A method applied to a target expression, e.g. `substringof(Name,'x')`.
    MethodCall {
        /// The method name; lowercased when rendered.
        name: String,
        /// The expression the method applies to.
        target: Box<Expr>,
        /// Constant arguments, formatted per the literal rules.
        args: Vec<ODataValue>,
    },
    /// A bare constant. Not translatable on its own; only meaningful as a
    /// method argument.
    Constant(ODataValue),
}

impl Expr {
    /// Reference a property by name.
    pub fn property(name: impl Into<String>) -> Self {
        Self::Property(name.into())
    }

    /// Wrap this expression in a method call:
    /// `Expr::property("Name").call("substringof", [ODataValue::from("x")])`.
    pub fn call(
        self,
        name: impl Into<String>,
        args: impl IntoIterator<Item = ODataValue>,
    ) -> Self {
        Self::MethodCall {
            name: name.into(),
            target: Box::new(self),
            args: args.into_iter().collect(),
        }
    }

    /// Render the expression to its OData form.
    ///
    /// Method names are lowercased and targets are translated recursively.
    /// Anything that is not a property or method-call reference is rejected
    /// with a validation error naming the offending construct.
    pub fn to_odata(&self) -> Result<String, ExactError> {
        match self {
            Self::Property(name) => Ok(name.clone()),
            Self::MethodCall { name, target, args } => {
                let mut rendered = format!("{}({}", name.to_lowercase(), target.to_odata()?);
                for arg in args {
                    rendered.push(',');
                    rendered.push_str(&arg.to_odata());
                }
                rendered.push(')');
                Ok(rendered)
            }
            Self::Constant(value) => Err(ExactError::Validation(format!(
                "unsupported expression '{}': expected a property or method-call reference",
                value.to_odata()
            ))),
        }
    }
}
