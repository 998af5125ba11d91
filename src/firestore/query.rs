//! Structured query builder

use serde_json::json;
use std::cmp::Ordering;

use super::filter::{Direction, FilterOperator};
use super::value::{encode, FieldValue, Fields};
use super::Document;
use crate::error::Error;

/// A single `field <op> value` condition
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: FieldValue,
}

impl FieldFilter {
    fn matches(&self, fields: &Fields) -> bool {
        let Some(actual) = fields.get(&self.field) else {
            return false;
        };

        match self.operator {
            FilterOperator::Eq => actual == &self.value,
            FilterOperator::Neq => !actual.is_null() && actual != &self.value,
            op => match actual.compare(&self.value) {
                Some(ord) => match op {
                    FilterOperator::Gt => ord == Ordering::Greater,
                    FilterOperator::Gte => ord != Ordering::Less,
                    FilterOperator::Lt => ord == Ordering::Less,
                    FilterOperator::Lte => ord != Ordering::Greater,
                    FilterOperator::Eq | FilterOperator::Neq => false,
                },
                None => false,
            },
        }
    }
}

/// Sort key of a query
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Query over a single collection
///
/// Filters are combined with AND. Documents missing a filtered or ordered
/// field never match.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    collection: String,
    filters: Vec<FieldFilter>,
    order_by: Vec<OrderBy>,
    limit: Option<i32>,
}

impl Query {
    /// Create a query returning every document of `collection`
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_string(),
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn filters(&self) -> &[FieldFilter] {
        &self.filters
    }

    /// Add a filter
    pub fn filter(mut self, field: &str, operator: FilterOperator, value: impl Into<FieldValue>) -> Self {
        self.filters.push(FieldFilter {
            field: field.to_string(),
            operator,
            value: value.into(),
        });
        self
    }

    /// Filter documents where field equals a value
    pub fn where_eq(self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.filter(field, FilterOperator::Eq, value)
    }

    /// Filter documents where field is greater than or equal to a value
    pub fn where_gte(self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.filter(field, FilterOperator::Gte, value)
    }

    /// Filter documents where field is less than or equal to a value
    pub fn where_lte(self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.filter(field, FilterOperator::Lte, value)
    }

    /// Order the results by a field
    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by.push(OrderBy {
            field: field.to_string(),
            direction,
        });
        self
    }

    /// Limit the number of documents returned
    pub fn limit(mut self, count: i32) -> Self {
        self.limit = Some(count);
        self
    }

    /// Effective sort keys
    ///
    /// Without an explicit order, a query with an inequality filter is sorted
    /// by that field ascending.
    fn effective_order(&self) -> Vec<OrderBy> {
        if !self.order_by.is_empty() {
            return self.order_by.clone();
        }
        self.filters
            .iter()
            .find(|f| f.operator.is_inequality())
            .map(|f| {
                vec![OrderBy {
                    field: f.field.clone(),
                    direction: Direction::Ascending,
                }]
            })
            .unwrap_or_default()
    }

    /// Whether a document's fields satisfy this query
    pub fn matches(&self, fields: &Fields) -> bool {
        self.filters.iter().all(|f| f.matches(fields))
            && self
                .order_by
                .iter()
                .all(|o| fields.contains_key(&o.field))
    }

    /// Filter, sort and limit documents the way the platform does
    pub fn apply(&self, documents: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let order = self.effective_order();
        let mut matched: Vec<Document> = documents
            .into_iter()
            .filter(|d| self.matches(&d.fields))
            .collect();

        matched.sort_by(|a, b| {
            for key in &order {
                let ord = match (a.fields.get(&key.field), b.fields.get(&key.field)) {
                    (Some(x), Some(y)) => x.compare(y).unwrap_or(Ordering::Equal),
                    _ => Ordering::Equal,
                };
                let ord = match key.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            a.id.cmp(&b.id)
        });

        if let Some(limit) = self.limit {
            matched.truncate(limit.max(0) as usize);
        }
        matched
    }

    /// Build the REST `structuredQuery` body
    pub fn to_structured_query(&self) -> Result<serde_json::Value, Error> {
        let mut query = json!({
            "from": [{ "collectionId": self.collection }],
        });

        let mut filters = self
            .filters
            .iter()
            .map(|f| {
                Ok(json!({
                    "fieldFilter": {
                        "field": { "fieldPath": f.field },
                        "op": f.operator.as_str(),
                        "value": encode(&f.value)?,
                    }
                }))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        match filters.len() {
            0 => {}
            1 => query["where"] = filters.remove(0),
            _ => {
                query["where"] = json!({
                    "compositeFilter": { "op": "AND", "filters": filters }
                })
            }
        }

        if !self.order_by.is_empty() {
            query["orderBy"] = self
                .order_by
                .iter()
                .map(|o| {
                    json!({
                        "field": { "fieldPath": o.field },
                        "direction": o.direction.as_str(),
                    })
                })
                .collect();
        }

        if let Some(limit) = self.limit {
            query["limit"] = json!(limit);
        }

        Ok(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, name: &str, created: i64) -> Document {
        let mut fields = Fields::new();
        fields.insert("name".into(), FieldValue::from(name));
        fields.insert("created".into(), FieldValue::Integer(created));
        Document {
            id: id.to_string(),
            fields,
        }
    }

    #[test]
    fn single_filter_is_sent_as_field_filter() {
        let query = Query::new("cars").where_eq("uid", "u1");
        let body = query.to_structured_query().unwrap();

        assert_eq!(body["from"][0]["collectionId"], "cars");
        assert_eq!(body["where"]["fieldFilter"]["op"], "EQUAL");
        assert_eq!(body["where"]["fieldFilter"]["field"]["fieldPath"], "uid");
        assert_eq!(body["where"]["fieldFilter"]["value"]["stringValue"], "u1");
        assert!(body.get("orderBy").is_none());
    }

    #[test]
    fn range_filters_are_combined_with_and() {
        let query = Query::new("cars")
            .where_gte("name", "GOL")
            .where_lte("name", "GOL\u{f8ff}");
        let body = query.to_structured_query().unwrap();

        let composite = &body["where"]["compositeFilter"];
        assert_eq!(composite["op"], "AND");
        assert_eq!(composite["filters"][0]["fieldFilter"]["op"], "GREATER_THAN_OR_EQUAL");
        assert_eq!(composite["filters"][1]["fieldFilter"]["op"], "LESS_THAN_OR_EQUAL");
    }

    #[test]
    fn order_by_is_serialized() {
        let body = Query::new("cars")
            .order_by("created", Direction::Descending)
            .limit(10)
            .to_structured_query()
            .unwrap();

        assert_eq!(body["orderBy"][0]["field"]["fieldPath"], "created");
        assert_eq!(body["orderBy"][0]["direction"], "DESCENDING");
        assert_eq!(body["limit"], 10);
    }

    #[test]
    fn apply_orders_descending() {
        let docs = vec![doc("a", "GOL", 1), doc("b", "ONIX", 3), doc("c", "UNO", 2)];
        let result = Query::new("cars")
            .order_by("created", Direction::Descending)
            .apply(docs);

        let ids: Vec<_> = result.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn prefix_range_orders_by_filtered_field() {
        let docs = vec![
            doc("1", "GOLF", 1),
            doc("2", "GOL", 2),
            doc("3", "ONIX", 3),
            doc("4", "GO", 4),
        ];
        let result = Query::new("cars")
            .where_gte("name", "GOL")
            .where_lte("name", "GOL\u{f8ff}")
            .apply(docs);

        let names: Vec<_> = result
            .iter()
            .map(|d| d.fields["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["GOL", "GOLF"]);
    }

    #[test]
    fn missing_order_field_excludes_document() {
        let mut no_created = doc("x", "GOL", 0);
        no_created.fields.remove("created");

        let query = Query::new("cars").order_by("created", Direction::Descending);
        assert!(query.apply(vec![no_created]).is_empty());
    }
}
