use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::business::RequestValidator;
use crate::domain::{
    Consumer, CreateOrder, Invoice, MessageResponse, Order, OrderPage, PageRequest, UpdateOrder,
};
use crate::error::AppError;
use crate::store::{ConsumerStore, OrderStore, UserStore};

/// Order service scoped to the signed-in user
pub struct OrderService {
    validator: RequestValidator,
    orders: Arc<dyn OrderStore>,
    consumers: Arc<dyn ConsumerStore>,
    users: Arc<dyn UserStore>,
    page_size: usize,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        consumers: Arc<dyn ConsumerStore>,
        users: Arc<dyn UserStore>,
        page_size: usize,
    ) -> Self {
        Self {
            validator: RequestValidator::new(),
            orders,
            consumers,
            users,
            page_size,
        }
    }

    /// Validate the order, check the consumer belongs to the caller, then
    /// store it.
    pub async fn create(&self, user_id: &str, body: CreateOrder) -> Result<MessageResponse, AppError> {
        debug!("Validating order for user {}", user_id);
        self.validator.validate_order(&body)?;

        let consumer = self.owned_consumer(user_id, body.consumer.trim()).await?;
        let order = self
            .orders
            .insert_order(Order::new(user_id.to_string(), consumer.id, body.items))
            .await?;

        info!("Created order {} for user {}", order.id, user_id);
        Ok(MessageResponse::new("Order Created Successfully"))
    }

    /// Active orders, newest first, optionally filtered by item or consumer name.
    pub async fn list(
        &self,
        user_id: &str,
        query: Option<&str>,
        page: Option<i64>,
    ) -> Result<OrderPage, AppError> {
        let consumers: HashMap<String, Consumer> = self
            .consumers
            .list_consumers(user_id)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let matching: Vec<Order> = self
            .orders
            .list_orders(user_id)
            .await?
            .into_iter()
            .filter(|o| o.is_active)
            .filter(|o| {
                query
                    .map(|q| {
                        let name = consumers.get(&o.consumer_id).map(|c| c.name.as_str());
                        o.matches(q, name)
                    })
                    .unwrap_or(true)
            })
            .collect();

        let (orders, has_more) = PageRequest::new(page, self.page_size).apply(matching);
        let data = orders
            .iter()
            .map(|o| o.view(consumers.get(&o.consumer_id)))
            .collect();
        Ok(OrderPage { data, has_more })
    }

    pub async fn invoice(&self, user_id: &str, id: &str) -> Result<Invoice, AppError> {
        let order = self.owned_order(user_id, id).await?;
        let consumer = self.owned_consumer(user_id, &order.consumer_id).await?;
        let user = self
            .users
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::BadRequest("User Not Registered".to_string()))?;

        Ok(order.invoice(&user, &consumer))
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        body: UpdateOrder,
    ) -> Result<MessageResponse, AppError> {
        if let Some(ref items) = body.items {
            self.validator.validate_items(items)?;
        }
        let mut order = self.owned_order(user_id, id).await?;
        order.apply(body);
        self.orders.update_order(order).await?;

        info!("Updated order {} for user {}", id, user_id);
        Ok(MessageResponse::new("Order Updated Successfully"))
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> Result<MessageResponse, AppError> {
        let order = self.owned_order(user_id, id).await?;
        self.orders.delete_order(&order.id).await?;

        info!("Deleted order {} for user {}", id, user_id);
        Ok(MessageResponse::new("Order Deleted Successfully"))
    }

    async fn owned_order(&self, user_id: &str, id: &str) -> Result<Order, AppError> {
        self.orders
            .find_order(id)
            .await?
            .filter(|o| o.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Order Not Found".to_string()))
    }

    async fn owned_consumer(&self, user_id: &str, id: &str) -> Result<Consumer, AppError> {
        self.consumers
            .find_consumer(id)
            .await?
            .filter(|c| c.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Consumer Not Found".to_string()))
    }
}
