use std::sync::Arc;

use tracing::{debug, info};

use crate::business::RequestValidator;
use crate::domain::{
    Consumer, ConsumerOptions, ConsumerPage, CreateConsumer, DashboardStats, MessageResponse,
    PageRequest, UpdateConsumer,
};
use crate::error::AppError;
use crate::store::{ConsumerStore, OrderStore};

/// Consumer records owned by a signed-in user, plus the dashboard totals.
pub struct ConsumerService {
    validator: RequestValidator,
    consumers: Arc<dyn ConsumerStore>,
    orders: Arc<dyn OrderStore>,
    page_size: usize,
}

impl ConsumerService {
    pub fn new(
        consumers: Arc<dyn ConsumerStore>,
        orders: Arc<dyn OrderStore>,
        page_size: usize,
    ) -> Self {
        Self {
            validator: RequestValidator::new(),
            consumers,
            orders,
            page_size,
        }
    }

    pub async fn create(
        &self,
        user_id: &str,
        body: CreateConsumer,
    ) -> Result<MessageResponse, AppError> {
        self.validator.validate_new_consumer(&body)?;

        let consumer = self
            .consumers
            .insert_consumer(Consumer::new(body, user_id.to_string()))
            .await?;
        info!("User {} created consumer {}", user_id, consumer.id);
        Ok(MessageResponse::new("Consumer Created :)"))
    }

    pub async fn list(
        &self,
        user_id: &str,
        query: Option<&str>,
        page: Option<i64>,
    ) -> Result<ConsumerPage, AppError> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let consumers: Vec<Consumer> = self
            .consumers
            .list_consumers(user_id)
            .await?
            .into_iter()
            .filter(|c| query.map(|q| c.matches(q)).unwrap_or(true))
            .collect();

        let (data, has_more) = PageRequest::new(page, self.page_size).apply(consumers);
        debug!("Listed {} consumers for user {}", data.len(), user_id);
        Ok(ConsumerPage { data, has_more })
    }

    pub async fn get(&self, user_id: &str, id: &str) -> Result<Consumer, AppError> {
        self.consumers
            .find_consumer(id)
            .await?
            .filter(|c| c.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Consumer Not Found".to_string()))
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        body: UpdateConsumer,
    ) -> Result<MessageResponse, AppError> {
        self.validator.validate_consumer_update(&body)?;
        let mut consumer = self.get(user_id, id).await?;

        consumer.apply(body);
        self.consumers.update_consumer(consumer).await?;
        info!("User {} updated consumer {}", user_id, id);
        Ok(MessageResponse::new("Consumer Updated :)"))
    }

    /// Removes the consumer together with its orders.
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<MessageResponse, AppError> {
        let consumer = self.get(user_id, id).await?;

        let removed_orders = self.orders.delete_orders_for_consumer(&consumer.id).await?;
        self.consumers.delete_consumer(&consumer.id).await?;
        info!(
            "User {} deleted consumer {} and {} orders",
            user_id, consumer.id, removed_orders
        );
        Ok(MessageResponse::new("Consumer Deleted :)"))
    }

    pub async fn options(&self, user_id: &str) -> Result<ConsumerOptions, AppError> {
        let users = self
            .consumers
            .list_consumers(user_id)
            .await?
            .iter()
            .map(Consumer::option)
            .collect();
        Ok(ConsumerOptions { users })
    }

    pub async fn dashboard(&self, user_id: &str) -> Result<DashboardStats, AppError> {
        let consumers = self.consumers.list_consumers(user_id).await?.len() as u64;
        let orders: Vec<_> = self
            .orders
            .list_orders(user_id)
            .await?
            .into_iter()
            .filter(|o| o.is_active)
            .collect();

        Ok(DashboardStats {
            consumers,
            orders: orders.len() as u64,
            sell: orders.iter().map(|o| o.total()).sum(),
            quantity: orders.iter().map(|o| o.quantity()).sum(),
        })
    }
}
