//! Form payloads posted by the browser and their client-side validation.

use serde::{Deserialize, Serialize};

use crate::api::{Credentials, SignupRequest};
use crate::error::FormError;
use crate::models::{NewProduct, ProductPatch};

fn required(value: &str, field: &'static str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        Err(FormError::Required(field))
    } else {
        Ok(value.to_string())
    }
}

fn parse_price(raw: &str) -> Result<f64, FormError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
        .ok_or(FormError::InvalidPrice)
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn credentials(&self) -> Result<Credentials, FormError> {
        if self.username.trim().is_empty() || self.password.is_empty() {
            return Err(FormError::MissingFields);
        }
        Ok(Credentials {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub contact_number: String,
}

impl SignupForm {
    pub fn request(&self) -> Result<SignupRequest, FormError> {
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        let fields = [
            &self.first_name,
            &self.last_name,
            &self.email,
            &self.password,
            &self.contact_number,
        ];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(FormError::MissingFields);
        }

        Ok(SignupRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            contact_number: self.contact_number.trim().to_string(),
        })
    }

    /// Copy safe to echo back into the page after a failed attempt.
    pub fn without_passwords(&self) -> Self {
        Self {
            password: String::new(),
            confirm_password: String::new(),
            ..self.clone()
        }
    }
}

/// Fields of the add-product and edit-product forms, as typed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub category: String,
    pub price: String,
    pub image_url: String,
    pub description: String,
}

impl ProductForm {
    pub fn new_product(&self) -> Result<NewProduct, FormError> {
        Ok(NewProduct {
            name: required(&self.name, "Name")?,
            category: required(&self.category, "Category")?,
            price: parse_price(&self.price)?,
            image_url: self.image_url.trim().to_string(),
            description: self.description.trim().to_string(),
        })
    }

    /// The edit form always carries the full field-set.
    pub fn patch(&self) -> Result<ProductPatch, FormError> {
        let product = self.new_product()?;
        Ok(ProductPatch {
            name: Some(product.name),
            category: Some(product.category),
            price: Some(product.price),
            image_url: Some(product.image_url),
            description: Some(product.description),
        })
    }
}
