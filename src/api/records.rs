//! Storefront API records

use std::fmt::{Display, Formatter, Result as FmtResult};

use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};

use crate::{
    api::ApiError,
    pricing::price_from_major,
    products::{Product, ProductId},
};

/// Product as returned by the API, priced in major units.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProductRecord {
    /// Product ID
    pub id: ProductId,

    /// Name
    pub name: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Price in major units
    pub price: f64,

    /// Image URL
    #[serde(default)]
    pub image: Option<String>,

    /// Category
    pub category: String,
}

impl ProductRecord {
    /// Convert into a [`Product`] priced in `currency`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidPrice`] if the price is negative, not finite
    /// or does not fit in minor units.
    pub fn into_product(self, currency: &'static Currency) -> Result<Product, ApiError> {
        let price = Decimal::from_f64(self.price)
            .filter(|price| !price.is_sign_negative())
            .and_then(|price| price_from_major(price, currency))
            .ok_or(ApiError::InvalidPrice(self.id))?;

        Ok(Product {
            id: self.id,
            name: self.name,
            description: self.description,
            price,
            image: self.image.filter(|image| !image.is_empty()),
            category: self.category,
        })
    }
}

/// Service offered by the business.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceRecord {
    /// Service ID
    pub id: i64,

    /// Name
    pub name: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Image URL
    #[serde(default)]
    pub image: Option<String>,
}

/// Handling state of a customer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Not yet handled
    #[default]
    Pending,

    /// Handled by staff
    Handled,
}

impl RequestStatus {
    /// Path segment and wire value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Handled => "handled",
        }
    }
}

impl Display for RequestStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// New service request submitted by a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomerRequest {
    /// Customer name
    pub name: String,

    /// Contact phone number
    pub phone: String,

    /// Requested service
    pub service_type: String,

    /// Free-form details
    pub description: String,

    /// Where the service is needed
    pub location: String,

    /// Mobile money provider
    pub payment_method: String,
}

/// Stored customer request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    /// Request ID
    pub id: i64,

    /// Customer name
    pub name: String,

    /// Contact phone number
    pub phone: String,

    /// Requested service
    pub service_type: String,

    /// Free-form details
    #[serde(default)]
    pub description: String,

    /// Where the service is needed
    #[serde(default)]
    pub location: String,

    /// Mobile money provider
    #[serde(default)]
    pub payment_method: String,

    /// Handling state
    #[serde(default)]
    pub status: RequestStatus,

    /// Submission date as sent by the server
    #[serde(default)]
    pub date: Option<String>,
}
