use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use super::{ConsumerStore, OrderStore, ProfileStore, StoreError, StoreResult, UserStore};
use crate::domain::{normalize_email, Consumer, Order, Profile, User};

/// Map value tagged with its insertion sequence so listings have a stable
/// tiebreak when timestamps collide.
#[derive(Debug, Clone)]
struct Entry<T> {
    seq: u64,
    value: T,
}

#[derive(Default)]
struct Tables {
    next_seq: u64,
    users: HashMap<String, Entry<User>>,
    profiles: HashMap<String, Profile>,
    consumers: HashMap<String, Entry<Consumer>>,
    orders: HashMap<String, Entry<Order>>,
}

impl Tables {
    fn seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// Process-local store backing every store trait.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T: Clone>(
    entries: impl Iterator<Item = (u64, chrono::DateTime<chrono::Utc>, T)>,
) -> Vec<T> {
    let mut rows: Vec<_> = entries.collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
    rows.into_iter().map(|(_, _, value)| value).collect()
}

const DUPLICATE_CONSUMER: &str = "Consumer Already in Your Record";

/// Consumer emails are unique per owning user.
fn consumer_email_taken(consumers: &HashMap<String, Entry<Consumer>>, consumer: &Consumer) -> bool {
    let email = normalize_email(&consumer.email);
    consumers.values().any(|e| {
        e.value.id != consumer.id
            && e.value.user_id == consumer.user_id
            && normalize_email(&e.value.email) == email
    })
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: User) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        let email = normalize_email(&user.email);
        if tables
            .users
            .values()
            .any(|e| normalize_email(&e.value.email) == email)
        {
            return Err(StoreError::Duplicate("User Already Registered".to_string()));
        }
        let seq = tables.seq();
        tables.users.insert(
            user.id.clone(),
            Entry {
                seq,
                value: user.clone(),
            },
        );
        trace!("Stored user {}", user.id);
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let email = normalize_email(email);
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|e| normalize_email(&e.value.email) == email)
            .map(|e| e.value.clone()))
    }

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(id).map(|e| e.value.clone()))
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn upsert_profile(&self, profile: Profile) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.profiles.insert(profile.user_id.clone(), profile);
        Ok(())
    }

    async fn find_profile(&self, user_id: &str) -> StoreResult<Option<Profile>> {
        let tables = self.tables.read().await;
        Ok(tables.profiles.get(user_id).cloned())
    }
}

#[async_trait]
impl ConsumerStore for InMemoryStore {
    async fn insert_consumer(&self, consumer: Consumer) -> StoreResult<Consumer> {
        let mut tables = self.tables.write().await;
        if consumer_email_taken(&tables.consumers, &consumer) {
            return Err(StoreError::Duplicate(DUPLICATE_CONSUMER.to_string()));
        }
        let seq = tables.seq();
        tables.consumers.insert(
            consumer.id.clone(),
            Entry {
                seq,
                value: consumer.clone(),
            },
        );
        Ok(consumer)
    }

    async fn find_consumer(&self, id: &str) -> StoreResult<Option<Consumer>> {
        let tables = self.tables.read().await;
        Ok(tables.consumers.get(id).map(|e| e.value.clone()))
    }

    async fn list_consumers(&self, user_id: &str) -> StoreResult<Vec<Consumer>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .consumers
                .values()
                .filter(|e| e.value.user_id == user_id)
                .map(|e| (e.seq, e.value.created_at, e.value.clone())),
        ))
    }

    async fn update_consumer(&self, consumer: Consumer) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if consumer_email_taken(&tables.consumers, &consumer) {
            return Err(StoreError::Duplicate(DUPLICATE_CONSUMER.to_string()));
        }
        match tables.consumers.get_mut(&consumer.id) {
            Some(entry) => {
                entry.value = consumer;
                Ok(())
            }
            None => Err(StoreError::Backend(format!(
                "consumer {} vanished during update",
                consumer.id
            ))),
        }
    }

    async fn delete_consumer(&self, id: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.consumers.remove(id).is_some())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, order: Order) -> StoreResult<Order> {
        let mut tables = self.tables.write().await;
        let seq = tables.seq();
        tables.orders.insert(
            order.id.clone(),
            Entry {
                seq,
                value: order.clone(),
            },
        );
        Ok(order)
    }

    async fn find_order(&self, id: &str) -> StoreResult<Option<Order>> {
        let tables = self.tables.read().await;
        Ok(tables.orders.get(id).map(|e| e.value.clone()))
    }

    async fn list_orders(&self, user_id: &str) -> StoreResult<Vec<Order>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .orders
                .values()
                .filter(|e| e.value.user_id == user_id)
                .map(|e| (e.seq, e.value.created_at, e.value.clone())),
        ))
    }

    async fn update_order(&self, order: Order) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        match tables.orders.get_mut(&order.id) {
            Some(entry) => {
                entry.value = order;
                Ok(())
            }
            None => Err(StoreError::Backend(format!(
                "order {} vanished during update",
                order.id
            ))),
        }
    }

    async fn delete_order(&self, id: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.orders.remove(id).is_some())
    }

    async fn delete_orders_for_consumer(&self, consumer_id: &str) -> StoreResult<usize> {
        let mut tables = self.tables.write().await;
        let before = tables.orders.len();
        tables.orders.retain(|_, e| e.value.consumer_id != consumer_id);
        Ok(before - tables.orders.len())
    }
}
