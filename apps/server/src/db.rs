//! Order store backends. The dashboard only reads orders and changes their
//! status; creating orders belongs to the storefront.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOneAndReplaceOptions, IndexOptions, ReturnDocument},
    Client, Collection, IndexModel,
};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::config::{MongoConfig, StoreConfig};
use crate::models::{Order, OrderStatus, StatusChangeError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
    #[error("cannot load seed orders: {0}")]
    Seed(String),
}

#[derive(Debug, Error)]
pub enum StatusUpdateError {
    #[error("order not found")]
    NotFound,
    #[error(transparent)]
    Rejected(#[from] StatusChangeError),
    #[error("order {0} kept changing while being updated")]
    Contended(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Compare-and-swap attempts before giving up on a busy order.
const STATUS_UPDATE_ATTEMPTS: usize = 3;

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Order>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Order>, StoreError>;

    /// Applies [`Order::change_status`] to the stored order and saves it in
    /// one step, so two concurrent changes cannot both pass the closed-order
    /// check.
    async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        rejection_reason: Option<String>,
    ) -> Result<Order, StatusUpdateError>;
}

pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn OrderRepository>, StoreError> {
    match config {
        StoreConfig::Memory { seed_file: None } => {
            tracing::info!("Using empty in-memory order store");
            Ok(Arc::new(MemoryOrderStore::default()))
        }
        StoreConfig::Memory {
            seed_file: Some(path),
        } => Ok(Arc::new(MemoryOrderStore::from_seed_file(path).await?)),
        StoreConfig::Mongo(mongo) => Ok(Arc::new(MongoOrderStore::connect(mongo).await?)),
    }
}

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<Vec<Order>>,
}

impl MemoryOrderStore {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            orders: RwLock::new(orders),
        }
    }

    /// Loads a JSON array of orders as exported by the storefront.
    pub async fn from_seed_file(path: &Path) -> Result<Self, StoreError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| StoreError::Seed(format!("{}: {}", path.display(), e)))?;
        let orders: Vec<Order> = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Seed(format!("{}: {}", path.display(), e)))?;

        tracing::info!(
            path = %path.display(),
            orders = orders.len(),
            "Loaded seed orders"
        );
        Ok(Self::new(orders))
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderStore {
    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.orders.read().await.clone())
    }

    async fn get(&self, id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self
            .orders
            .read()
            .await
            .iter()
            .find(|order| order.id == id)
            .cloned())
    }

    async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        rejection_reason: Option<String>,
    ) -> Result<Order, StatusUpdateError> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .iter_mut()
            .find(|stored| stored.id == id)
            .ok_or(StatusUpdateError::NotFound)?;

        stored.change_status(status, rejection_reason)?;
        Ok(stored.clone())
    }
}

pub struct MongoOrderStore {
    orders: Collection<Order>,
}

impl MongoOrderStore {
    pub async fn connect(config: &MongoConfig) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(&config.uri).await?;
        let db = client.database(&config.database);

        // Ping to verify connection
        db.run_command(doc! { "ping": 1 }, None).await?;
        tracing::info!(database = %config.database, "Connected to MongoDB");

        let store = Self {
            orders: db.collection("orders"),
        };
        store.create_indices().await?;
        Ok(store)
    }

    async fn create_indices(&self) -> Result<(), StoreError> {
        // Order numbers are unique across the store
        let index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.orders.create_index(index, None).await?;
        tracing::info!("Database indices created");
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for MongoOrderStore {
    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        let orders: Vec<Order> = self.orders.find(None, None).await?.try_collect().await?;
        Ok(orders)
    }

    async fn get(&self, id: &str) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.find_one(doc! { "id": id }, None).await?)
    }

    async fn update_status(
        &self,
        id: &str,
        status: OrderStatus,
        rejection_reason: Option<String>,
    ) -> Result<Order, StatusUpdateError> {
        let options = FindOneAndReplaceOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        for _ in 0..STATUS_UPDATE_ATTEMPTS {
            let current = self
                .orders
                .find_one(doc! { "id": id }, None)
                .await
                .map_err(StoreError::from)?
                .ok_or(StatusUpdateError::NotFound)?;

            let mut updated = current.clone();
            updated.change_status(status, rejection_reason.clone())?;

            // Only replace if nobody moved the order since it was read
            let filter = doc! { "id": id, "status": current.status.as_str() };
            let replaced = self
                .orders
                .find_one_and_replace(filter, &updated, options.clone())
                .await
                .map_err(StoreError::from)?;

            if let Some(order) = replaced {
                return Ok(order);
            }
            tracing::debug!(order_id = %id, "order status changed concurrently, retrying");
        }

        Err(StatusUpdateError::Contended(id.to_string()))
    }
}
