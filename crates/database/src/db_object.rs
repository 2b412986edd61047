use bson::oid::ObjectId;
use bson::{self, doc, Document};
use futures::StreamExt;
use mongodb::error::Error as MongoDbError;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::{Database, IndexModel};
use serde::{de::DeserializeOwned, Serialize};

/// A document stored in its own collection and addressed by an `ObjectId` `_id`.
#[allow(async_fn_in_trait)]
pub trait MongoDbObject:
    Sized + Serialize + DeserializeOwned + Sync + Unpin + Send + Clone
{
    const COLLECTION_NAME: &'static str;
    type Error: From<MongoDbError> + From<bson::ser::Error> + From<bson::de::Error> + std::fmt::Debug;

    fn get_id(&self) -> ObjectId;

    fn indexes() -> Vec<IndexModel> {
        Vec::new()
    }

    async fn ensure_indexes(db: &Database) -> Result<(), Self::Error> {
        let indexes = Self::indexes();
        if indexes.is_empty() {
            return Ok(());
        }

        let col = db.collection::<Document>(Self::COLLECTION_NAME);
        col.create_indexes(indexes, None).await?;
        Ok(())
    }

    async fn insert(self, db: &Database) -> Result<Self, Self::Error> {
        let col = db.collection::<Document>(Self::COLLECTION_NAME);
        col.insert_one(bson::to_document(&self)?, None).await?;
        Ok(self)
    }

    async fn select_one_by_index(db: &Database, index: &ObjectId) -> Result<Option<Self>, Self::Error> {
        Self::select_one_by_filter(db, doc! { "_id": *index }).await
    }

    async fn select_one_by_filter(db: &Database, filter: Document) -> Result<Option<Self>, Self::Error> {
        let col = db.collection::<Document>(Self::COLLECTION_NAME);
        let doc = col.find_one(filter, None).await?;
        match doc {
            Some(d) => Ok(Some(bson::from_document(d)?)),
            None => Ok(None),
        }
    }

    async fn select_many(
        db: &Database, filter: Document,
        sort: Option<Document>, limit: Option<i64>, skip: Option<u64>,
    ) -> Result<Vec<Self>, Self::Error> {
        let col = db.collection::<Document>(Self::COLLECTION_NAME);
        let options = FindOptions::builder()
            .sort(sort)
            .limit(limit)
            .skip(skip)
            .build();

        let mut docs = col.find(filter, options).await?;
        let mut vec = Vec::new();
        while let Some(doc) = docs.next().await {
            vec.push(bson::from_document(doc?)?);
        }
        Ok(vec)
    }

    /// Applies `update` to the first match and returns the document as it is
    /// after the update, or `None` when nothing matched.
    async fn find_one_and_update(
        db: &Database, filter: Document, update: Document,
    ) -> Result<Option<Self>, Self::Error> {
        let col = db.collection::<Document>(Self::COLLECTION_NAME);
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        match col.find_one_and_update(filter, update, options).await? {
            Some(d) => Ok(Some(bson::from_document(d)?)),
            None => Ok(None),
        }
    }

    async fn delete_one_by_index(db: &Database, index: &ObjectId) -> Result<u64, Self::Error> {
        let col = db.collection::<Document>(Self::COLLECTION_NAME);
        let result = col.delete_one(doc! { "_id": *index }, None).await?;
        Ok(result.deleted_count)
    }

    async fn delete_many(db: &Database, filter: Document) -> Result<u64, Self::Error> {
        let col = db.collection::<Document>(Self::COLLECTION_NAME);
        let result = col.delete_many(filter, None).await?;
        Ok(result.deleted_count)
    }

    async fn total_count(db: &Database, filter: Document) -> Result<u64, Self::Error> {
        let col = db.collection::<Document>(Self::COLLECTION_NAME);
        let total_count = col.count_documents(filter, None).await?;
        Ok(total_count)
    }
}
