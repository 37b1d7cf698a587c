use chrono::{DateTime, Utc};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct CreateConsumer {
    #[oai(default)]
    #[serde(default)]
    pub name: String,
    #[oai(default)]
    #[serde(default)]
    pub email: String,
    #[oai(default)]
    #[serde(default)]
    pub mobile: String,
    pub dob: Option<String>,
    pub address: Option<String>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Object)]
pub struct UpdateConsumer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub dob: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct Consumer {
    #[oai(rename = "_id")]
    #[serde(rename = "_id")]
    pub id: String,
    #[oai(skip)]
    #[serde(skip)]
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub dob: Option<String>,
    pub address: Option<String>,
    #[oai(rename = "createdAt")]
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[oai(rename = "updatedAt")]
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Consumer {
    pub fn new(body: CreateConsumer, user_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id,
            name: body.name.trim().to_string(),
            email: super::normalize_email(&body.email),
            mobile: body.mobile.trim().to_string(),
            dob: body.dob,
            address: body.address,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: UpdateConsumer) {
        if let Some(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Some(email) = update.email {
            self.email = super::normalize_email(&email);
        }
        if let Some(mobile) = update.mobile {
            self.mobile = mobile.trim().to_string();
        }
        if update.dob.is_some() {
            self.dob = update.dob;
        }
        if update.address.is_some() {
            self.address = update.address;
        }
        self.updated_at = Utc::now();
    }

    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query) || self.email.contains(&query)
    }

    pub fn option(&self) -> ConsumerOption {
        ConsumerOption {
            id: self.id.clone(),
            name: self.name.clone(),
            dob: self.dob.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct ConsumerPage {
    pub data: Vec<Consumer>,
    #[oai(rename = "hasMore")]
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct ConsumerOption {
    #[oai(rename = "_id")]
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub dob: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct ConsumerOptions {
    pub users: Vec<ConsumerOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Object)]
pub struct DashboardStats {
    pub consumers: u64,
    pub orders: u64,
    pub sell: f64,
    pub quantity: u64,
}
