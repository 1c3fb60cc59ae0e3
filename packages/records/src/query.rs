//! The QueryExpression tree - a structured query against one record type.
//!
//! A query names a primary record type, the columns to return, a filter
//! tree, orderings, paging, and any number of nested link entities (joins),
//! each of which is itself a small query against the linked type.

use serde::{Deserialize, Serialize};

use crate::Value;

/// The attributes to return.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSet {
    /// Every attribute of the record type.
    All,
    /// The listed attributes, in order.
    Columns(Vec<String>),
}

impl Default for ColumnSet {
    fn default() -> Self {
        ColumnSet::Columns(Vec::new())
    }
}

impl ColumnSet {
    pub fn all() -> Self {
        ColumnSet::All
    }

    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ColumnSet::Columns(columns.into_iter().map(Into::into).collect())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, ColumnSet::All)
    }

    /// The listed columns. Empty for `All`.
    pub fn columns(&self) -> &[String] {
        match self {
            ColumnSet::All => &[],
            ColumnSet::Columns(columns) => columns,
        }
    }

    /// Whether an attribute is selected by this column set.
    pub fn contains(&self, attribute: &str) -> bool {
        match self {
            ColumnSet::All => true,
            ColumnSet::Columns(columns) => columns.iter().any(|c| c == attribute),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterEqual,
    LessThan,
    LessEqual,
    Null,
    NotNull,
    In,
    NotIn,
    Like,
    NotLike,
}

/// One attribute test inside a filter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConditionExpression {
    /// Alias of the link entity the attribute belongs to, when the
    /// condition is placed outside that link entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    pub attribute_name: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl ConditionExpression {
    pub fn new(
        attribute_name: impl Into<String>,
        operator: ConditionOperator,
        values: Vec<Value>,
    ) -> Self {
        Self {
            entity_name: None,
            attribute_name: attribute_name.into(),
            operator,
            values,
        }
    }

    /// Qualify the condition with a link-entity alias.
    pub fn on(mut self, entity_alias: impl Into<String>) -> Self {
        self.entity_name = Some(entity_alias.into());
        self
    }
}

/// A boolean tree of conditions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterExpression {
    #[serde(default)]
    pub filter_operator: LogicalOperator,
    #[serde(default)]
    pub conditions: Vec<ConditionExpression>,
    #[serde(default)]
    pub filters: Vec<FilterExpression>,
}

impl FilterExpression {
    pub fn new(filter_operator: LogicalOperator) -> Self {
        Self {
            filter_operator,
            ..Self::default()
        }
    }

    pub fn with_condition(mut self, condition: ConditionExpression) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_filter(mut self, filter: FilterExpression) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.filters.iter().all(FilterExpression::is_empty)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    #[default]
    Ascending,
    Descending,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderExpression {
    /// Alias of the link entity the attribute belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    pub attribute_name: String,
    #[serde(default)]
    pub order_type: OrderType,
}

impl OrderExpression {
    pub fn new(attribute_name: impl Into<String>, order_type: OrderType) -> Self {
        Self {
            entity_name: None,
            attribute_name: attribute_name.into(),
            order_type,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinOperator {
    #[default]
    Inner,
    LeftOuter,
    Natural,
}

/// A join from the enclosing entity to a linked record type.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkEntity {
    pub link_from_entity_name: String,
    pub link_to_entity_name: String,
    pub link_from_attribute_name: String,
    pub link_to_attribute_name: String,
    #[serde(default)]
    pub join_operator: JoinOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_alias: Option<String>,
    #[serde(default)]
    pub columns: ColumnSet,
    #[serde(default)]
    pub link_criteria: FilterExpression,
    #[serde(default)]
    pub link_entities: Vec<LinkEntity>,
    #[serde(default)]
    pub orders: Vec<OrderExpression>,
}

impl LinkEntity {
    pub fn new(
        link_from_entity_name: impl Into<String>,
        link_to_entity_name: impl Into<String>,
        link_from_attribute_name: impl Into<String>,
        link_to_attribute_name: impl Into<String>,
        join_operator: JoinOperator,
    ) -> Self {
        Self {
            link_from_entity_name: link_from_entity_name.into(),
            link_to_entity_name: link_to_entity_name.into(),
            link_from_attribute_name: link_from_attribute_name.into(),
            link_to_attribute_name: link_to_attribute_name.into(),
            join_operator,
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.entity_alias = Some(alias.into());
        self
    }

    pub fn with_columns(mut self, columns: ColumnSet) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_link(mut self, link: LinkEntity) -> Self {
        self.link_entities.push(link);
        self
    }

    /// The name this join is addressed by: its alias, or the linked type
    /// name when no alias is given.
    pub fn key(&self) -> &str {
        self.entity_alias
            .as_deref()
            .unwrap_or(&self.link_to_entity_name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagingInfo {
    /// Page size. `0` means unbounded.
    #[serde(default)]
    pub count: u32,
    /// 1-based page number.
    #[serde(default = "first_page")]
    pub page_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paging_cookie: Option<String>,
    #[serde(default)]
    pub return_total_record_count: bool,
}

fn first_page() -> u32 {
    1
}

impl Default for PagingInfo {
    fn default() -> Self {
        Self {
            count: 0,
            page_number: first_page(),
            paging_cookie: None,
            return_total_record_count: false,
        }
    }
}

impl PagingInfo {
    pub fn page(count: u32, page_number: u32) -> Self {
        Self {
            count,
            page_number,
            ..Self::default()
        }
    }
}

/// A query against one primary record type.
///
/// # Example
///
/// ```rust
/// use schemashim_records::{ColumnSet, JoinOperator, LinkEntity, QueryExpression};
///
/// let query = QueryExpression::new("Customer")
///     .with_columns(ColumnSet::new(["CustomerName"]))
///     .with_link(
///         LinkEntity::new("Customer", "Contact", "CustomerId", "ParentCustomerId", JoinOperator::Inner)
///             .with_alias("c"),
///     );
///
/// assert_eq!(query.link_entities[0].key(), "c");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryExpression {
    pub entity_name: String,
    #[serde(default)]
    pub columns: ColumnSet,
    #[serde(default)]
    pub criteria: FilterExpression,
    #[serde(default)]
    pub link_entities: Vec<LinkEntity>,
    #[serde(default)]
    pub orders: Vec<OrderExpression>,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default)]
    pub no_lock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_info: Option<PagingInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_hints: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension_data: Option<Value>,
}

impl QueryExpression {
    pub fn new(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
            ..Self::default()
        }
    }

    pub fn with_columns(mut self, columns: ColumnSet) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_criteria(mut self, criteria: FilterExpression) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn with_link(mut self, link: LinkEntity) -> Self {
        self.link_entities.push(link);
        self
    }

    pub fn with_order(mut self, order: OrderExpression) -> Self {
        self.orders.push(order);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_set_contains() {
        let cols = ColumnSet::new(["a", "b"]);
        assert!(cols.contains("a"));
        assert!(!cols.contains("c"));
        assert!(ColumnSet::all().contains("anything"));
        assert!(ColumnSet::all().columns().is_empty());
    }

    #[test]
    fn link_key_falls_back_to_type_name() {
        let link = LinkEntity::new("account", "contact", "accountid", "parentcustomerid", JoinOperator::Inner);
        assert_eq!(link.key(), "contact");
        assert_eq!(link.with_alias("primary").key(), "primary");
    }

    #[test]
    fn nested_empty_filters_are_empty() {
        let filter = FilterExpression::new(LogicalOperator::Or)
            .with_filter(FilterExpression::default());
        assert!(filter.is_empty());

        let filter = filter.with_condition(ConditionExpression::new(
            "name",
            ConditionOperator::NotNull,
            vec![],
        ));
        assert!(!filter.is_empty());
    }

    #[test]
    fn query_from_json() {
        let query: QueryExpression = serde_json::from_str(
            r#"{
                "entity_name": "Customer",
                "columns": {"columns": ["CustomerName"]},
                "criteria": {"conditions": [
                    {"attribute_name": "CustomerName", "operator": "like", "values": ["A%"]}
                ]},
                "page_info": {"count": 10}
            }"#,
        )
        .unwrap();

        assert_eq!(query.columns, ColumnSet::new(["CustomerName"]));
        assert_eq!(query.criteria.filter_operator, LogicalOperator::And);
        assert_eq!(query.criteria.conditions[0].operator, ConditionOperator::Like);
        assert_eq!(query.page_info.unwrap().page_number, 1);
    }

    #[test]
    fn all_columns_from_json() {
        let cols: ColumnSet = serde_json::from_str(r#""all""#).unwrap();
        assert!(cols.is_all());
    }
}
