use crate::domain::{CreateConsumer, CreateOrder, LoginUser, OrderItem, RegisterUser, UpdateConsumer};
use crate::error::AppError;

/// Validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyName,
    MissingEmail,
    InvalidEmail,
    MissingPassword,
    PasswordTooShort(usize),
    EmptyMobile,
    MissingConsumer,
    NoItems,
    EmptyItemName,
    NonPositivePrice,
    InvalidQuantity,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::EmptyName => write!(f, "name cannot be empty"),
            ValidationError::MissingEmail => write!(f, "email is required"),
            ValidationError::InvalidEmail => write!(f, "email must be valid"),
            ValidationError::MissingPassword => write!(f, "password is required"),
            ValidationError::PasswordTooShort(min) => {
                write!(f, "password must include at least {} characters", min)
            }
            ValidationError::EmptyMobile => write!(f, "mobile cannot be empty"),
            ValidationError::MissingConsumer => write!(f, "consumer is required"),
            ValidationError::NoItems => write!(f, "At least one item is required for the order."),
            ValidationError::EmptyItemName => write!(f, "Item name is required."),
            ValidationError::NonPositivePrice => write!(f, "Price must be greater than 0."),
            ValidationError::InvalidQuantity => write!(f, "Quantity must be at least 1."),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Request rules checked before any store access. The first failing rule wins.
pub struct RequestValidator {
    min_password_length: usize,
}

impl Default for RequestValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestValidator {
    pub fn new() -> Self {
        Self {
            min_password_length: 6,
        }
    }

    pub fn validate_register(&self, body: &RegisterUser) -> Result<(), ValidationError> {
        self.validate_name(&body.name)?;
        self.validate_email(&body.email)?;
        self.validate_password(&body.password)
    }

    pub fn validate_login(&self, body: &LoginUser) -> Result<(), ValidationError> {
        self.validate_email(&body.email)?;
        self.validate_password(&body.password)
    }

    pub fn validate_new_consumer(&self, body: &CreateConsumer) -> Result<(), ValidationError> {
        self.validate_name(&body.name)?;
        self.validate_email(&body.email)?;
        self.validate_mobile(&body.mobile)
    }

    pub fn validate_consumer_update(&self, body: &UpdateConsumer) -> Result<(), ValidationError> {
        if let Some(ref name) = body.name {
            self.validate_name(name)?;
        }
        if let Some(ref email) = body.email {
            self.validate_email(email)?;
        }
        if let Some(ref mobile) = body.mobile {
            self.validate_mobile(mobile)?;
        }
        Ok(())
    }

    pub fn validate_order(&self, body: &CreateOrder) -> Result<(), ValidationError> {
        if body.consumer.trim().is_empty() {
            return Err(ValidationError::MissingConsumer);
        }
        self.validate_items(&body.items)
    }

    pub fn validate_items(&self, items: &[OrderItem]) -> Result<(), ValidationError> {
        if items.is_empty() {
            return Err(ValidationError::NoItems);
        }
        for item in items {
            if item.name.trim().is_empty() {
                return Err(ValidationError::EmptyItemName);
            }
            if !item.price.is_finite() || item.price <= 0.0 {
                return Err(ValidationError::NonPositivePrice);
            }
            if item.quantity < 1 {
                return Err(ValidationError::InvalidQuantity);
            }
        }
        Ok(())
    }

    pub fn validate_name(&self, name: &str) -> Result<(), ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }

    pub fn validate_email(&self, email: &str) -> Result<(), ValidationError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }

    pub fn validate_password(&self, password: &str) -> Result<(), ValidationError> {
        if password.is_empty() {
            return Err(ValidationError::MissingPassword);
        }
        if password.chars().count() < self.min_password_length {
            return Err(ValidationError::PasswordTooShort(self.min_password_length));
        }
        Ok(())
    }

    pub fn validate_mobile(&self, mobile: &str) -> Result<(), ValidationError> {
        if mobile.trim().is_empty() {
            return Err(ValidationError::EmptyMobile);
        }
        Ok(())
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return false,
    };
    if local.is_empty() || !domain.contains('.') {
        return false;
    }
    domain.split('.').all(|label| !label.is_empty())
}
