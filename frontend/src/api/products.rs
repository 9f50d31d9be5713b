use reqwest::Method;

use super::ApiClient;
use crate::controller::ProductSource;
use crate::error::ApiError;
use crate::models::{ListFilter, NewProduct, Product, ProductId, ProductPatch};

/// Query pairs of the product list; blank filters are already `None` and
/// are left out.
fn list_query(filter: &ListFilter) -> Vec<(&'static str, &str)> {
    let mut params = Vec::new();
    if let Some(category) = &filter.category {
        params.push(("category", category.as_str()));
    }
    if let Some(search) = &filter.search {
        params.push(("search", search.as_str()));
    }
    params
}

fn product_path(id: &ProductId) -> String {
    format!("/products/{}", urlencoding::encode(id.as_str()))
}

impl ApiClient {
    pub async fn fetch_categories(&self, token: &str) -> Result<Vec<String>, ApiError> {
        self.get_json("/products/categories", Some(token), &[]).await
    }

    pub async fn fetch_products(
        &self,
        token: &str,
        filter: &ListFilter,
    ) -> Result<Vec<Product>, ApiError> {
        self.get_json("/products", Some(token), &list_query(filter)).await
    }

    pub async fn create_product(&self, token: &str, product: &NewProduct) -> Result<(), ApiError> {
        self.send(Method::POST, "/products", Some(token), &[], Some(product))
            .await
            .map(|_| ())
    }

    pub async fn update_product(
        &self,
        token: &str,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<(), ApiError> {
        self.send(Method::PUT, &product_path(id), Some(token), &[], Some(patch))
            .await
            .map(|_| ())
    }

    pub async fn delete_product(&self, token: &str, id: &ProductId) -> Result<(), ApiError> {
        self.send::<()>(Method::DELETE, &product_path(id), Some(token), &[], None)
            .await
            .map(|_| ())
    }
}

impl ProductSource for ApiClient {
    async fn categories(&self, token: &str) -> Result<Vec<String>, ApiError> {
        self.fetch_categories(token).await
    }

    async fn products(&self, token: &str, filter: &ListFilter) -> Result<Vec<Product>, ApiError> {
        self.fetch_products(token, filter).await
    }

    async fn update(&self, token: &str, id: &ProductId, patch: &ProductPatch) -> Result<(), ApiError> {
        self.update_product(token, id, patch).await
    }

    async fn delete(&self, token: &str, id: &ProductId) -> Result<(), ApiError> {
        self.delete_product(token, id).await
    }
}
