//! OData query composition.
//!
//! [`QueryBuilder`] accumulates `$filter`/`$select`/`$orderby`/paging
//! directives and serializes them in a fixed order. Predicates can be raw
//! strings or built from typed [`Expr`] nodes.

mod expr;

pub use expr::{Expr, ODataValue, Operator};

use crate::core::ExactError;
use crate::core::services::LinkedFieldRegistry;
use std::fmt;
use std::sync::Arc;

/// Accumulates OData query directives and serializes them.
///
/// Non-empty sections are always emitted in the order `$filter`, `$select`,
/// `$skip`, `$expand`, `$top`, `$skiptoken`, `$orderby`, joined by `&`. The
/// builder produces the raw query string; URL escaping happens when the
/// transport layer parses the final URL.
///
/// ```
/// use exactonline_rs::QueryBuilder;
///
/// let query = QueryBuilder::new()
///     .filter("Name eq 'Acme'")?
///     .select(["ID", "Name"])
///     .top(10)
///     .build(true)?;
/// assert_eq!(query, "$filter=Name eq 'Acme'&$select=ID,Name&$top=10");
/// # Ok::<(), exactonline_rs::ExactError>(())
/// ```
#[derive(Clone, Default)]
pub struct QueryBuilder {
    filter: Option<String>,
    and_clauses: Vec<String>,
    select: Option<String>,
    expand: Option<String>,
    order_by: Option<String>,
    top: Option<u64>,
    skip: Option<u64>,
    skip_token: Option<String>,
    registry: Option<Arc<dyn LinkedFieldRegistry>>,
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The registry handle has no Debug; everything else is plain data.
        f.debug_struct("QueryBuilder")
            .field("filter", &self.filter)
            .field("and_clauses", &self.and_clauses)
            .field("select", &self.select)
            .field("expand", &self.expand)
            .field("order_by", &self.order_by)
            .field("top", &self.top)
            .field("skip", &self.skip)
            .field("skip_token", &self.skip_token)
            .finish_non_exhaustive()
    }
}

impl QueryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the linked-field registry notified by [`expand`](Self::expand).
    pub fn with_linked_field_registry(mut self, registry: Arc<dyn LinkedFieldRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Set the `$filter` predicate. A second call replaces the first; use
    /// [`and`](Self::and) to combine predicates.
    pub fn filter(mut self, predicate: impl Into<String>) -> Result<Self, ExactError> {
        let predicate = predicate.into();
        if predicate.is_empty() {
            return Err(ExactError::Validation(
                "query 'where' operator cannot be empty".into(),
            ));
        }
        self.filter = Some(predicate);
        Ok(self)
    }

    /// Typed variant of [`filter`](Self::filter): renders
    /// `<property> <operator> <literal>`.
    pub fn filter_expr(
        self,
        property: &Expr,
        operator: Operator,
        value: impl Into<ODataValue>,
    ) -> Result<Self, ExactError> {
        let predicate = comparison(property, operator, &value.into())?;
        self.filter(predicate)
    }

    /// Append an `and` predicate to the filter. Cannot be called before
    /// [`filter`](Self::filter).
    pub fn and(mut self, predicate: impl Into<String>) -> Result<Self, ExactError> {
        let predicate = predicate.into();
        if predicate.is_empty() {
            return Err(ExactError::Validation(
                "query 'and' operator cannot be empty".into(),
            ));
        }
        if self.filter.is_none() {
            return Err(ExactError::Validation(
                "query 'and' operator cannot be used before the 'where' operator is set".into(),
            ));
        }
        self.and_clauses.push(predicate);
        Ok(self)
    }

    /// Typed variant of [`and`](Self::and).
    pub fn and_expr(
        self,
        property: &Expr,
        operator: Operator,
        value: impl Into<ODataValue>,
    ) -> Result<Self, ExactError> {
        let predicate = comparison(property, operator, &value.into())?;
        self.and(predicate)
    }

    /// Add fields to `$select`. Accumulates across calls; an empty iterator
    /// is a no-op.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = join_fields(fields);
        if joined.is_empty() {
            return self;
        }
        append_joined(&mut self.select, &joined);
        self
    }

    /// Typed variant of [`select`](Self::select).
    pub fn select_expr<'a, I>(mut self, fields: I) -> Result<Self, ExactError>
    where
        I: IntoIterator<Item = &'a Expr>,
    {
        let joined = join_exprs(fields)?;
        if joined.is_empty() {
            return Ok(self);
        }
        append_joined(&mut self.select, &joined);
        Ok(self)
    }

    /// Add ascending fields to `$orderby`. Accumulates across calls.
    pub fn order_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = join_fields(fields);
        if joined.is_empty() {
            return self;
        }
        append_joined(&mut self.order_by, &joined);
        self
    }

    /// Typed variant of [`order_by`](Self::order_by).
    pub fn order_by_expr<'a, I>(mut self, fields: I) -> Result<Self, ExactError>
    where
        I: IntoIterator<Item = &'a Expr>,
    {
        let joined = join_exprs(fields)?;
        if joined.is_empty() {
            return Ok(self);
        }
        append_joined(&mut self.order_by, &joined);
        Ok(self)
    }

    /// Add descending fields to `$orderby`.
    ///
    /// The ` desc` suffix lands between the joined fields of one call, so
    /// the last field of the call gets no suffix. This mirrors the query
    /// grammar the service accepts for the SDK; it is deliberate.
    pub fn order_by_descending<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = fields
            .into_iter()
            .map(|f| f.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" desc,");
        if joined.is_empty() {
            return self;
        }
        append_joined(&mut self.order_by, &joined);
        self
    }

    /// Specify the number of records to retrieve.
    pub fn top(mut self, top: u64) -> Self {
        self.top = Some(top);
        self
    }

    /// Paging: specify the number of records to skip.
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Paging: inject a continuation cursor from a prior response (see
    /// [`crate::response::skip_token`]). Emitted as `$skiptoken=<value>`
    /// verbatim; empty tokens are ignored.
    pub fn skip_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        if !token.is_empty() {
            self.skip_token = Some(token);
        }
        self
    }

    /// Set the `$expand` field and register it with the linked-field
    /// registry, so downstream materialization treats it as nested.
    pub fn expand(mut self, field: impl Into<String>) -> Self {
        let field = field.into();
        if let Some(registry) = &self.registry {
            registry.register_linked_field(&field);
        }
        self.expand = Some(field);
        self
    }

    /// Serialize the accumulated directives.
    ///
    /// List retrievals pass `select_is_mandatory = true` and fail validation
    /// without a `$select`; single-entity and count retrievals pass `false`.
    pub fn build(&self, select_is_mandatory: bool) -> Result<String, ExactError> {
        let mut parts: Vec<String> = Vec::new();

        if let Some(filter) = &self.filter {
            let mut clause = format!("$filter={filter}");
            for and in &self.and_clauses {
                clause.push_str(" and ");
                clause.push_str(and);
            }
            parts.push(clause);
        }

        match &self.select {
            Some(select) => parts.push(format!("$select={select}")),
            None if select_is_mandatory => {
                return Err(ExactError::Validation(
                    "you have to specify which fields you want to select".into(),
                ));
            }
            None => {}
        }

        if let Some(skip) = self.skip {
            parts.push(format!("$skip={skip}"));
        }
        if let Some(expand) = &self.expand {
            parts.push(format!("$expand={expand}"));
        }
        if let Some(top) = self.top {
            parts.push(format!("$top={top}"));
        }
        if let Some(token) = &self.skip_token {
            parts.push(format!("$skiptoken={token}"));
        }
        if let Some(order) = &self.order_by {
            parts.push(format!("$orderby={order}"));
        }

        Ok(parts.join("&"))
    }
}

fn comparison(property: &Expr, operator: Operator, value: &ODataValue) -> Result<String, ExactError> {
    Ok(format!(
        "{} {} {}",
        property.to_odata()?,
        operator.as_str(),
        value.to_odata()
    ))
}

fn join_fields<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|f| f.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn join_exprs<'a, I>(fields: I) -> Result<String, ExactError>
where
    I: IntoIterator<Item = &'a Expr>,
{
    Ok(fields
        .into_iter()
        .map(Expr::to_odata)
        .collect::<Result<Vec<_>, _>>()?
        .join(","))
}

fn append_joined(section: &mut Option<String>, joined: &str) {
    match section {
        Some(existing) => {
            existing.push(',');
            existing.push_str(joined);
        }
        None => *section = Some(joined.to_string()),
    }
}
