use chrono::{DateTime, Utc};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct RegisterUser {
    #[oai(default)]
    #[serde(default)]
    pub name: String,
    #[oai(default)]
    #[serde(default)]
    pub email: String,
    #[oai(default)]
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct LoginUser {
    #[oai(default)]
    #[serde(default)]
    pub email: String,
    #[oai(default)]
    #[serde(default)]
    pub password: String,
}

/// Stored account. The password is kept as submitted.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn from_registration(body: RegisterUser) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: body.name.trim().to_string(),
            email: super::normalize_email(&body.email),
            password: body.password,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Per-user record holding the long-lived refresh token.
#[derive(Debug, Clone)]
pub struct Profile {
    pub user_id: String,
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct PublicUser {
    #[oai(rename = "_id")]
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct AuthToken {
    pub msg: String,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Object)]
pub struct ProfileResponse {
    pub msg: String,
    pub user: PublicUser,
}
