//! Storefront REST API client.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use reqwest::{Client, RequestBuilder, Response, Url};
use rusty_money::iso::Currency;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::InMemoryCatalog,
    products::{CategoryFilter, Product, ProductId},
};

pub mod records;

pub use records::{
    CustomerRequest, NewCustomerRequest, ProductRecord, RequestStatus, ServiceRecord,
};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Errors that can occur when talking to the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-2xx response.
    #[error("unexpected response from storefront API: {0}")]
    UnexpectedResponse(String),

    /// The base URL cannot be used for API calls.
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// A product price cannot be represented in the configured currency.
    #[error("product {0} has an invalid price")]
    InvalidPrice(ProductId),
}

/// Configuration for connecting to the storefront API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, e.g. `"http://localhost:5000/api"`.
    pub base_url: String,

    /// Bearer token sent with every request, if set.
    pub token: Option<String>,

    /// Currency the API prices products in.
    pub currency: &'static Currency,
}

/// HTTP client for the storefront API.
#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    token: Option<String>,
    currency: &'static Currency,
    http: Client,
}

impl ApiClient {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if the base URL does not parse or
    /// cannot carry path segments.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let base = Url::parse(&config.base_url)
            .map_err(|error| ApiError::InvalidBaseUrl(format!("{}: {error}", config.base_url)))?;

        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.base_url));
        }

        Ok(Self {
            base,
            token: config.token.filter(|token| !token.trim().is_empty()),
            currency: config.currency,
            http: Client::new(),
        })
    }

    /// Store a bearer token for later requests.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Forget the stored bearer token.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Whether a bearer token is stored.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Currency product prices are converted into.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// List the services on offer.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or an unexpected response body.
    pub async fn services(&self) -> Result<Vec<ServiceRecord>, ApiError> {
        self.get_json(&["services"]).await
    }

    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or an unexpected response body.
    pub async fn products(&self) -> Result<Vec<ProductRecord>, ApiError> {
        self.get_json(&["products"]).await
    }

    /// List products in a category. [`CategoryFilter::All`] lists every product.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or an unexpected response body.
    pub async fn products_by_category(
        &self,
        filter: &CategoryFilter,
    ) -> Result<Vec<ProductRecord>, ApiError> {
        match filter {
            CategoryFilter::All => self.products().await,
            CategoryFilter::Named(category) => {
                self.get_json(&["products", "category", category.as_str()])
                    .await
            }
        }
    }

    /// Fetch products and index them in an [`InMemoryCatalog`].
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure, an unexpected response body, or a
    /// price that cannot be converted to the configured currency.
    pub async fn catalog(&self, filter: &CategoryFilter) -> Result<InMemoryCatalog, ApiError> {
        let products = self
            .products_by_category(filter)
            .await?
            .into_iter()
            .map(|record| record.into_product(self.currency))
            .collect::<Result<Vec<Product>, _>>()?;

        debug!(%filter, products = products.len(), "fetched catalog");

        Ok(InMemoryCatalog::from_products(products))
    }

    /// Submit a customer service request.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or an unexpected response body.
    pub async fn create_request(
        &self,
        request: &NewCustomerRequest,
    ) -> Result<CustomerRequest, ApiError> {
        let url = self.endpoint(&["requests"])?;

        debug!(%url, "POST");

        let response = self.authorize(self.http.post(url).json(request)).send().await?;

        Self::parse(response, "create request").await
    }

    /// List every customer request.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or an unexpected response body.
    pub async fn requests(&self) -> Result<Vec<CustomerRequest>, ApiError> {
        self.get_json(&["requests"]).await
    }

    /// List customer requests with the given status.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or an unexpected response body.
    pub async fn requests_by_status(
        &self,
        status: RequestStatus,
    ) -> Result<Vec<CustomerRequest>, ApiError> {
        self.get_json(&["requests", "status", status.as_str()]).await
    }

    /// Fetch one section of editable site content.
    ///
    /// # Errors
    ///
    /// Returns an error on HTTP failure or an unexpected response body.
    pub async fn site_content(&self, section: &str) -> Result<Value, ApiError> {
        self.get_json(&["site-content", section]).await
    }

    /// Build the URL for the given path segments below the base URL.
    ///
    /// Segments are percent-encoded, so a category name containing `/` stays
    /// a single segment.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if the base URL cannot carry path
    /// segments.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();

        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;

        debug!(%url, "GET");

        let response = self.authorize(self.http.get(url.clone())).send().await?;

        Self::parse(response, url.path()).await
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, ApiError> {
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(ApiError::UnexpectedResponse(format!(
                "{what} failed with status {status}: {text}"
            )));
        }

        Ok(response.json().await?)
    }
}

impl Debug for ApiClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .field("token", &self.token.as_ref().map(|_token| "<redacted>"))
            .field("currency", &self.currency.iso_alpha_code)
            .finish_non_exhaustive()
    }
}
