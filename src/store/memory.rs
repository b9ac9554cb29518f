use super::collection::{CollectionStore, Document, Filter, Patch};
use crate::error::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

/// In-process collection backed by a `DashMap`. Reads are returned ordered by
/// key so that downstream folds see a deterministic iteration order.
#[derive(Debug)]
pub struct MemoryCollection<D: Document> {
    documents: DashMap<i64, D>,
}

impl<D: Document> Default for MemoryCollection<D> {
    fn default() -> Self {
        Self { documents: DashMap::new() }
    }
}

impl<D: Document> MemoryCollection<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents(documents: impl IntoIterator<Item = D>) -> Self {
        let collection = Self::new();
        for document in documents {
            collection.documents.insert(document.key(), document);
        }
        collection
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn sorted(&self) -> Vec<D> {
        let mut documents: Vec<D> = self.documents.iter().map(|entry| entry.value().clone()).collect();
        documents.sort_by_key(|document| document.key());
        documents
    }
}

#[async_trait]
impl<D: Document> CollectionStore<D> for MemoryCollection<D> {
    async fn find(&self, filter: &Filter) -> Result<Vec<D>, StoreError> {
        let documents = self.sorted();
        if filter.is_empty() {
            return Ok(documents);
        }
        let mut matched = Vec::new();
        for document in documents {
            if filter.matches(&serde_json::to_value(&document)?) {
                matched.push(document);
            }
        }
        Ok(matched)
    }

    async fn insert_one(&self, document: D) -> Result<D, StoreError> {
        self.documents.insert(document.key(), document.clone());
        Ok(document)
    }

    async fn update_one(&self, filter: &Filter, patch: &Patch) -> Result<Option<D>, StoreError> {
        let Some(target) = self.find(filter).await?.into_iter().next() else {
            return Ok(None);
        };
        let patched = patch.apply(&target)?;
        self.documents.insert(patched.key(), patched.clone());
        Ok(Some(patched))
    }

    async fn put_many(&self, documents: Vec<D>) -> Result<Vec<D>, StoreError> {
        debug!(collection = D::COLLECTION, count = documents.len(), "Upserting documents");
        for document in &documents {
            self.documents.insert(document.key(), document.clone());
        }
        Ok(documents)
    }

    async fn delete_many(&self, filter: &Filter) -> Result<usize, StoreError> {
        let doomed: Vec<i64> = self.find(filter).await?.iter().map(Document::key).collect();
        for key in &doomed {
            self.documents.remove(key);
        }
        debug!(collection = D::COLLECTION, count = doomed.len(), "Deleted documents");
        Ok(doomed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MarketGroup, Region};
    use crate::store::{Pipeline, Stage};

    #[tokio::test]
    async fn test_put_many_upserts_by_key() {
        let regions = MemoryCollection::<Region>::new();
        regions.put_many(vec![Region::new(2, "Two", vec![]), Region::new(1, "One", vec![])]).await.unwrap();
        regions.put_many(vec![Region::new(2, "Two (renamed)", vec![20])]).await.unwrap();

        let all = regions.find(&Filter::all()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].region_id, 1);
        assert_eq!(all[1].name, "Two (renamed)");
        assert_eq!(all[1].constellations, vec![20]);
    }

    #[tokio::test]
    async fn test_update_one_patches_first_match() {
        let regions = MemoryCollection::with_documents(vec![Region::new(1, "One", vec![])]);

        let updated = regions
            .update_one(&Filter::all().eq("region_id", 1), &Patch::new().set("name", "Uno"))
            .await
            .unwrap();
        assert_eq!(updated.map(|region| region.name), Some("Uno".to_string()));

        let missing = regions
            .update_one(&Filter::all().eq("region_id", 9), &Patch::new().set("name", "Nine"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_update_one_rejects_key_change() {
        let regions = MemoryCollection::with_documents(vec![Region::new(1, "One", vec![])]);
        let result = regions.update_one(&Filter::all(), &Patch::new().set("region_id", 7)).await;
        assert!(matches!(result, Err(StoreError::InvalidPatch(_))));
    }

    #[tokio::test]
    async fn test_delete_many_removes_matches_only() {
        let regions = MemoryCollection::with_documents(vec![
            Region::new(1, "One", vec![]),
            Region::new(2, "Two", vec![]),
            Region::new(3, "Three", vec![]),
        ]);

        let removed = regions.delete_many(&Filter::all().is_in("region_id", [1, 3])).await.unwrap();

        assert_eq!(removed, 2);
        assert_eq!(regions.find(&Filter::all()).await.unwrap(), vec![Region::new(2, "Two", vec![])]);
        assert_eq!(regions.delete_many(&Filter::all().eq("region_id", 9)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_aggregate_collects_type_ids() {
        let groups = MemoryCollection::with_documents(vec![
            MarketGroup::new(2, None, "Blueprints", vec![100]),
            MarketGroup::new(4, None, "Ships", vec![1, 2]),
        ]);
        let pipeline = Pipeline::new()
            .stage(Stage::Match(Filter::all().not_in("market_group_id", [2])))
            .stage(Stage::Unwind("types".to_string()))
            .stage(Stage::Project("types".to_string()));

        let ids = groups.aggregate(&pipeline).await.unwrap();
        assert_eq!(ids, vec![serde_json::json!(1), serde_json::json!(2)]);
    }
}
