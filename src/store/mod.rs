//! Persistence seams. Services depend on these traits; `InMemoryStore`
//! implements all of them.

pub mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Consumer, Order, Profile, User};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("{0}")]
    Duplicate(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Duplicate` when the email is already taken.
    async fn insert_user(&self, user: User) -> StoreResult<User>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn upsert_profile(&self, profile: Profile) -> StoreResult<()>;
    async fn find_profile(&self, user_id: &str) -> StoreResult<Option<Profile>>;
}

#[async_trait]
pub trait ConsumerStore: Send + Sync {
    /// Fails with `Duplicate` when the owning user already has a consumer with this email.
    async fn insert_consumer(&self, consumer: Consumer) -> StoreResult<Consumer>;
    async fn find_consumer(&self, id: &str) -> StoreResult<Option<Consumer>>;
    /// Newest first.
    async fn list_consumers(&self, user_id: &str) -> StoreResult<Vec<Consumer>>;
    /// Same per-user email rule as `insert_consumer`.
    async fn update_consumer(&self, consumer: Consumer) -> StoreResult<()>;
    async fn delete_consumer(&self, id: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: Order) -> StoreResult<Order>;
    async fn find_order(&self, id: &str) -> StoreResult<Option<Order>>;
    /// Newest first.
    async fn list_orders(&self, user_id: &str) -> StoreResult<Vec<Order>>;
    async fn update_order(&self, order: Order) -> StoreResult<()>;
    async fn delete_order(&self, id: &str) -> StoreResult<bool>;
    /// Returns how many orders were removed.
    async fn delete_orders_for_consumer(&self, consumer_id: &str) -> StoreResult<usize>;
}
