use chrono::{DateTime, Utc};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use super::{Consumer, User};

fn default_quantity() -> i64 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Object)]
pub struct OrderItem {
    #[oai(default)]
    #[serde(default)]
    pub name: String,
    #[oai(default)]
    #[serde(default)]
    pub price: f64,
    #[oai(default = "default_quantity")]
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

impl OrderItem {
    pub fn subtotal(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct CreateOrder {
    #[oai(default)]
    #[serde(default)]
    pub consumer: String,
    #[oai(default)]
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Object)]
pub struct UpdateOrder {
    pub items: Option<Vec<OrderItem>>,
    #[oai(rename = "isActive")]
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub consumer_id: String,
    pub items: Vec<OrderItem>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(user_id: String, consumer_id: String, items: Vec<OrderItem>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            consumer_id,
            items: trim_items(items),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: UpdateOrder) {
        if let Some(items) = update.items {
            self.items = trim_items(items);
        }
        if let Some(active) = update.is_active {
            self.is_active = active;
        }
        self.updated_at = Utc::now();
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(OrderItem::subtotal).sum()
    }

    pub fn quantity(&self) -> u64 {
        self.items.iter().map(|i| i.quantity.max(0) as u64).sum()
    }

    /// Case-insensitive match against item names or the consumer's name.
    pub fn matches(&self, query: &str, consumer_name: Option<&str>) -> bool {
        let query = query.to_lowercase();
        self.items
            .iter()
            .any(|item| item.name.to_lowercase().contains(&query))
            || consumer_name
                .map(|name| name.to_lowercase().contains(&query))
                .unwrap_or(false)
    }

    pub fn view(&self, consumer: Option<&Consumer>) -> OrderView {
        OrderView {
            id: self.id.clone(),
            consumer: consumer.map(|c| ConsumerSummary {
                id: c.id.clone(),
                name: c.name.clone(),
                email: c.email.clone(),
            }),
            items: self.items.clone(),
            is_active: self.is_active,
            total: self.total(),
            created_at: self.created_at,
        }
    }

    pub fn invoice(&self, user: &User, consumer: &Consumer) -> Invoice {
        Invoice {
            id: self.id.clone(),
            user: InvoiceUser {
                name: user.name.clone(),
                email: user.email.clone(),
            },
            consumer: InvoiceConsumer {
                name: consumer.name.clone(),
                email: consumer.email.clone(),
                mobile: consumer.mobile.clone(),
                address: consumer.address.clone(),
            },
            items: self.items.clone(),
            total: self.total(),
            created_at: self.created_at,
        }
    }
}

fn trim_items(items: Vec<OrderItem>) -> Vec<OrderItem> {
    items
        .into_iter()
        .map(|item| OrderItem {
            name: item.name.trim().to_string(),
            ..item
        })
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct ConsumerSummary {
    #[oai(rename = "_id")]
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct OrderView {
    #[oai(rename = "_id")]
    #[serde(rename = "_id")]
    pub id: String,
    pub consumer: Option<ConsumerSummary>,
    pub items: Vec<OrderItem>,
    #[oai(rename = "isActive")]
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub total: f64,
    #[oai(rename = "createdAt")]
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct OrderPage {
    pub data: Vec<OrderView>,
    #[oai(rename = "hasMore")]
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct InvoiceUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct InvoiceConsumer {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct Invoice {
    #[oai(rename = "_id")]
    #[serde(rename = "_id")]
    pub id: String,
    pub user: InvoiceUser,
    pub consumer: InvoiceConsumer,
    pub items: Vec<OrderItem>,
    pub total: f64,
    #[oai(rename = "createdAt")]
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}
