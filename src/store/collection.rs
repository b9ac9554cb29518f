use crate::error::StoreError;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A persisted document with a natural integer key.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn key(&self) -> i64;
}

#[derive(Clone, Debug, PartialEq)]
pub enum Condition {
    Eq(Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
}

impl Condition {
    fn matches(&self, value: &Value) -> bool {
        match self {
            Condition::Eq(expected) => value == expected,
            Condition::In(values) => values.contains(value),
            Condition::NotIn(values) => !values.contains(value),
        }
    }
}

/// Conjunction of field conditions evaluated against a document's JSON form.
/// A missing field compares as `null`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Condition)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), Condition::Eq(value.into())));
        self
    }

    pub fn is_in<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.clauses.push((field.into(), Condition::In(values.into_iter().map(Into::into).collect())));
        self
    }

    pub fn not_in<I, V>(mut self, field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.clauses.push((field.into(), Condition::NotIn(values.into_iter().map(Into::into).collect())));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.clauses.iter().all(|(field, condition)| {
            let value = document.get(field).unwrap_or(&Value::Null);
            condition.matches(value)
        })
    }
}

/// Field assignments merged into a matched document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Patch {
    set: Map<String, Value>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.insert(field.into(), value.into());
        self
    }

    pub fn apply<D: Document>(&self, document: &D) -> Result<D, StoreError> {
        let mut value = serde_json::to_value(document)?;
        let Value::Object(fields) = &mut value else {
            return Err(StoreError::InvalidPatch(format!("{} documents are not objects", D::COLLECTION)));
        };
        for (field, new_value) in &self.set {
            fields.insert(field.clone(), new_value.clone());
        }
        let patched: D = serde_json::from_value(value)?;
        if patched.key() != document.key() {
            return Err(StoreError::InvalidPatch("patch must not change the document key".to_string()));
        }
        Ok(patched)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stage {
    /// Keep documents matching the filter.
    Match(Filter),
    /// Emit one document per element of an array field, with the field
    /// replaced by that element. Documents without the array are dropped.
    Unwind(String),
    /// Replace each document with the value of one field.
    Project(String),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn run(&self, documents: Vec<Value>) -> Vec<Value> {
        self.stages.iter().fold(documents, |docs, stage| match stage {
            Stage::Match(filter) => docs.into_iter().filter(|doc| filter.matches(doc)).collect(),
            Stage::Unwind(field) => docs
                .into_iter()
                .flat_map(|doc| {
                    let items = match doc.get(field) {
                        Some(Value::Array(items)) => items.clone(),
                        _ => Vec::new(),
                    };
                    items.into_iter().map(move |item| {
                        let mut unwound = doc.clone();
                        if let Value::Object(fields) = &mut unwound {
                            fields.insert(field.clone(), item);
                        }
                        unwound
                    })
                })
                .collect(),
            Stage::Project(field) => docs.into_iter().filter_map(|doc| doc.get(field).cloned()).collect(),
        })
    }
}

/// Keyed document collection. Implemented by the persistence adapter; the
/// sync and query layers only consume it.
#[async_trait]
pub trait CollectionStore<D: Document>: Send + Sync {
    async fn find(&self, filter: &Filter) -> Result<Vec<D>, StoreError>;

    async fn insert_one(&self, document: D) -> Result<D, StoreError>;

    /// Applies `patch` to the first matching document, returning the updated document.
    async fn update_one(&self, filter: &Filter, patch: &Patch) -> Result<Option<D>, StoreError>;

    /// Bulk upsert keyed by [`Document::key`]. Last writer wins.
    async fn put_many(&self, documents: Vec<D>) -> Result<Vec<D>, StoreError>;

    /// Removes every matching document, returning how many were removed.
    async fn delete_many(&self, filter: &Filter) -> Result<usize, StoreError>;

    async fn aggregate(&self, pipeline: &Pipeline) -> Result<Vec<Value>, StoreError> {
        let documents = self
            .find(&Filter::all())
            .await?
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pipeline.run(documents))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_conditions() {
        let doc = json!({ "market_group_id": 4, "parent_group_id": null, "types": [1, 2] });

        assert!(Filter::all().matches(&doc));
        assert!(Filter::all().eq("market_group_id", 4).matches(&doc));
        assert!(!Filter::all().eq("market_group_id", 5).matches(&doc));
        assert!(Filter::all().is_in("market_group_id", [3, 4]).matches(&doc));
        assert!(Filter::all().not_in("parent_group_id", [2, 150]).matches(&doc));
        assert!(Filter::all().not_in("missing_field", [2]).matches(&doc));
    }

    #[test]
    fn test_pipeline_unwind_and_project() {
        let docs = vec![
            json!({ "market_group_id": 2, "types": [10, 11] }),
            json!({ "market_group_id": 4, "types": [1, 2] }),
            json!({ "market_group_id": 5 }),
        ];
        let pipeline = Pipeline::new()
            .stage(Stage::Match(Filter::all().not_in("market_group_id", [2])))
            .stage(Stage::Unwind("types".to_string()))
            .stage(Stage::Project("types".to_string()));

        assert_eq!(pipeline.run(docs), vec![json!(1), json!(2)]);
    }
}
