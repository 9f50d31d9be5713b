//! Product list controller.
//!
//! Owns the filter/sort/search state of the product screen together with the
//! last successfully fetched collection. Category and search changes fetch a
//! fresh collection; sorting is derived locally; edits and deletes are
//! reconciled into the local collection without fetching again.

use tracing::warn;

use crate::error::ApiError;
use crate::models::{ListFilter, Notification, Product, ProductId, ProductPatch, SortOrder};
use crate::session::Session;

/// The slice of the remote API the controller depends on.
#[allow(async_fn_in_trait)]
pub trait ProductSource {
    async fn categories(&self, token: &str) -> Result<Vec<String>, ApiError>;

    async fn products(&self, token: &str, filter: &ListFilter) -> Result<Vec<Product>, ApiError>;

    async fn update(&self, token: &str, id: &ProductId, patch: &ProductPatch) -> Result<(), ApiError>;

    async fn delete(&self, token: &str, id: &ProductId) -> Result<(), ApiError>;
}

#[derive(Debug)]
pub struct ProductListController {
    session: Session,
    filter: ListFilter,
    sort: SortOrder,
    products: Vec<Product>,
    categories: Vec<String>,
    notification: Option<Notification>,
    loaded: bool,
}

impl ProductListController {
    /// Only a signed-in session can own a product list.
    pub fn new(session: Session, filter: ListFilter, sort: SortOrder) -> Self {
        Self {
            session,
            filter,
            sort,
            products: Vec::new(),
            categories: Vec::new(),
            notification: None,
            loaded: false,
        }
    }

    /// Initial load: categories and the filtered products, fetched concurrently.
    pub async fn mount<S: ProductSource>(&mut self, source: &S) {
        let token = self.session.token.as_str();
        let (categories, products) = tokio::join!(
            source.categories(token),
            source.products(token, &self.filter)
        );

        match categories {
            Ok(categories) => self.categories = categories,
            Err(err) => {
                warn!("failed to load categories: {}", err);
                self.notification = Some(Notification::error("Failed to load categories"));
            }
        }
        self.apply_fetch(products);
    }

    /// Returns `true` when the change triggered a fetch.
    pub async fn set_category<S: ProductSource>(
        &mut self,
        source: &S,
        category: Option<String>,
    ) -> bool {
        let filter = ListFilter::new(category, self.filter.search.clone());
        self.change_filter(source, filter).await
    }

    /// Returns `true` when the change triggered a fetch.
    pub async fn set_search<S: ProductSource>(&mut self, source: &S, search: Option<String>) -> bool {
        let filter = ListFilter::new(self.filter.category.clone(), search);
        self.change_filter(source, filter).await
    }

    async fn change_filter<S: ProductSource>(&mut self, source: &S, filter: ListFilter) -> bool {
        if filter == self.filter {
            return false;
        }
        self.filter = filter;
        let result = source.products(&self.session.token, &self.filter).await;
        self.apply_fetch(result);
        true
    }

    fn apply_fetch(&mut self, result: Result<Vec<Product>, ApiError>) {
        match result {
            Ok(products) => {
                self.products = products;
                self.loaded = true;
            }
            Err(err) => {
                warn!("failed to load products: {}", err);
                self.notification = Some(Notification::error("Failed to load products"));
            }
        }
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
    }

    /// The collection in display order. Sorting is stable and works on a
    /// copy; the fetched collection keeps its order.
    pub fn displayed(&self) -> Vec<&Product> {
        let mut view: Vec<&Product> = self.products.iter().collect();
        match self.sort {
            SortOrder::Default => {}
            SortOrder::PriceHigh => view.sort_by(|a, b| b.price.total_cmp(&a.price)),
            SortOrder::PriceLow => view.sort_by(|a, b| a.price.total_cmp(&b.price)),
            // `None` orders below any timestamp, so undated products go last.
            SortOrder::Newest => {
                view.sort_by(|a, b| b.created_timestamp().cmp(&a.created_timestamp()))
            }
        }
        view
    }

    pub async fn edit<S: ProductSource>(
        &mut self,
        source: &S,
        id: &ProductId,
        patch: ProductPatch,
    ) -> Result<(), ApiError> {
        let name = patch
            .name
            .clone()
            .unwrap_or_else(|| self.display_name(id));

        match source.update(&self.session.token, id, &patch).await {
            Ok(()) => {
                if let Some(product) = self.products.iter_mut().find(|p| &p.id == id) {
                    product.apply(&patch);
                }
                self.notification = Some(Notification::success(format!(
                    "Product {} modified successfully",
                    name
                )));
                Ok(())
            }
            Err(err) => {
                self.notification = Some(Notification::error(format!(
                    "Failed to modify product {}",
                    name
                )));
                Err(err)
            }
        }
    }

    pub async fn delete<S: ProductSource>(&mut self, source: &S, id: &ProductId) -> Result<(), ApiError> {
        let name = self.display_name(id);

        match source.delete(&self.session.token, id).await {
            Ok(()) => {
                self.products.retain(|p| &p.id != id);
                self.notification = Some(Notification::success(format!(
                    "Product {} deleted successfully",
                    name
                )));
                Ok(())
            }
            Err(err) => {
                self.notification = Some(Notification::error(format!(
                    "Failed to delete product {}",
                    name
                )));
                Err(err)
            }
        }
    }

    fn display_name(&self, id: &ProductId) -> String {
        self.products
            .iter()
            .find(|p| &p.id == id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
    }

    pub fn take_notification(&mut self) -> Option<Notification> {
        self.notification.take()
    }

    /// Whether a product fetch has succeeded since construction.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Edit/delete controls are a display concern only; the API decides.
    pub fn is_admin(&self) -> bool {
        self.session.is_admin()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn filter(&self) -> &ListFilter {
        &self.filter
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use reqwest::{Method, StatusCode};

    use super::*;
    use crate::models::NotificationKind;
    use crate::session::Role;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Categories,
        Products(ListFilter),
        Update(ProductId, ProductPatch),
        Delete(ProductId),
    }

    /// In-memory catalog recording every call made against it.
    #[derive(Default)]
    struct RecordingCatalog {
        products: Vec<Product>,
        categories: Vec<String>,
        fail_products: bool,
        fail_mutations: bool,
        calls: RefCell<Vec<Call>>,
    }

    impl RecordingCatalog {
        fn with_products(products: Vec<Product>) -> Self {
            Self {
                products,
                categories: vec!["Kitchen".to_string(), "Office".to_string()],
                ..Self::default()
            }
        }

        fn product_fetches(&self) -> Vec<ListFilter> {
            self.calls
                .borrow()
                .iter()
                .filter_map(|c| match c {
                    Call::Products(filter) => Some(filter.clone()),
                    _ => None,
                })
                .collect()
        }

        fn rejected(method: Method, path: String) -> ApiError {
            ApiError::Status {
                method,
                path,
                status: StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl ProductSource for RecordingCatalog {
        async fn categories(&self, _token: &str) -> Result<Vec<String>, ApiError> {
            self.calls.borrow_mut().push(Call::Categories);
            Ok(self.categories.clone())
        }

        async fn products(&self, _token: &str, filter: &ListFilter) -> Result<Vec<Product>, ApiError> {
            self.calls.borrow_mut().push(Call::Products(filter.clone()));
            if self.fail_products {
                return Err(Self::rejected(Method::GET, "/products".to_string()));
            }
            Ok(self
                .products
                .iter()
                .filter(|p| filter.category.as_ref().is_none_or(|c| &p.category == c))
                .cloned()
                .collect())
        }

        async fn update(&self, _token: &str, id: &ProductId, patch: &ProductPatch) -> Result<(), ApiError> {
            self.calls
                .borrow_mut()
                .push(Call::Update(id.clone(), patch.clone()));
            if self.fail_mutations {
                return Err(Self::rejected(Method::PUT, format!("/products/{}", id)));
            }
            Ok(())
        }

        async fn delete(&self, _token: &str, id: &ProductId) -> Result<(), ApiError> {
            self.calls.borrow_mut().push(Call::Delete(id.clone()));
            if self.fail_mutations {
                return Err(Self::rejected(Method::DELETE, format!("/products/{}", id)));
            }
            Ok(())
        }
    }

    fn product(id: i64, name: &str, category: &str, price: f64, created_at: &str) -> Product {
        Product {
            id: ProductId::from(id),
            name: name.to_string(),
            category: category.to_string(),
            price,
            image_url: None,
            description: Some(format!("{} description", name)),
            created_at: Some(created_at.to_string()),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Kettle", "Kitchen", 1200.0, "2024-01-05T09:00:00Z"),
            product(7, "Mug", "Kitchen", 249.0, "2024-03-01T10:00:00Z"),
            product(3, "Stapler", "Office", 399.5, "2023-11-20T08:30:00Z"),
            product(4, "Notebook", "Office", 99.0, "2024-02-14T12:00:00Z"),
        ]
    }

    fn admin() -> Session {
        Session::new("admin-token", Role::Admin)
    }

    async fn mounted(source: &RecordingCatalog) -> ProductListController {
        let mut controller = ProductListController::new(admin(), ListFilter::default(), SortOrder::Default);
        controller.mount(source).await;
        controller
    }

    fn ids(products: &[&Product]) -> Vec<String> {
        products.iter().map(|p| p.id.to_string()).collect()
    }

    #[tokio::test]
    async fn mount_fetches_categories_and_products_once() {
        let source = RecordingCatalog::with_products(catalog());
        let controller = mounted(&source).await;

        let calls = source.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert!(calls.contains(&Call::Categories));
        assert!(calls.contains(&Call::Products(ListFilter::default())));
        assert_eq!(controller.products().len(), 4);
        assert_eq!(controller.categories(), ["Kitchen", "Office"]);
        assert!(controller.is_loaded());
    }

    #[tokio::test]
    async fn failed_mount_is_not_loaded() {
        let mut source = RecordingCatalog::with_products(catalog());
        source.fail_products = true;
        let controller = mounted(&source).await;

        assert!(!controller.is_loaded());
        assert!(controller.products().is_empty());
    }

    #[tokio::test]
    async fn default_sort_keeps_fetch_order() {
        let source = RecordingCatalog::with_products(catalog());
        let controller = mounted(&source).await;

        assert_eq!(ids(&controller.displayed()), ["1", "7", "3", "4"]);
    }

    #[tokio::test]
    async fn price_sorts_are_mutual_reverses() {
        let source = RecordingCatalog::with_products(catalog());
        let mut controller = mounted(&source).await;

        controller.set_sort(SortOrder::PriceHigh);
        let high = ids(&controller.displayed());
        controller.set_sort(SortOrder::PriceLow);
        let mut low = ids(&controller.displayed());

        assert_eq!(high, ["1", "3", "7", "4"]);
        low.reverse();
        assert_eq!(high, low);
    }

    #[tokio::test]
    async fn sorting_never_fetches_or_reorders_the_collection() {
        let source = RecordingCatalog::with_products(catalog());
        let mut controller = mounted(&source).await;
        let calls_before = source.calls.borrow().len();

        for order in SortOrder::ALL {
            controller.set_sort(order);
            let mut shown = ids(&controller.displayed());
            let mut fetched: Vec<String> = controller.products().iter().map(|p| p.id.to_string()).collect();
            shown.sort();
            fetched.sort();
            assert_eq!(shown, fetched);
        }

        assert_eq!(source.calls.borrow().len(), calls_before);
        let order: Vec<String> = controller.products().iter().map(|p| p.id.to_string()).collect();
        assert_eq!(order, ["1", "7", "3", "4"]);
    }

    #[tokio::test]
    async fn newest_sorts_by_creation_time_with_undated_last() {
        let mut products = catalog();
        products.push(Product {
            created_at: Some("whenever".to_string()),
            ..product(9, "Mystery", "Office", 10.0, "")
        });
        let source = RecordingCatalog::with_products(products);
        let mut controller = mounted(&source).await;

        controller.set_sort(SortOrder::Newest);
        assert_eq!(ids(&controller.displayed()), ["7", "4", "1", "3", "9"]);
    }

    #[tokio::test]
    async fn category_change_fetches_exactly_once() {
        let source = RecordingCatalog::with_products(catalog());
        let mut controller = mounted(&source).await;

        assert!(controller.set_category(&source, Some("Office".to_string())).await);

        let fetches = source.product_fetches();
        assert_eq!(fetches.len(), 2);
        assert_eq!(fetches[1], ListFilter::new(Some("Office".to_string()), None));
        assert_eq!(ids(&controller.displayed()), ["3", "4"]);
    }

    #[tokio::test]
    async fn search_change_keeps_category() {
        let source = RecordingCatalog::with_products(catalog());
        let mut controller = mounted(&source).await;
        controller.set_category(&source, Some("Kitchen".to_string())).await;

        assert!(controller.set_search(&source, Some("mug".to_string())).await);

        let fetches = source.product_fetches();
        assert_eq!(fetches.len(), 3);
        assert_eq!(
            fetches[2],
            ListFilter::new(Some("Kitchen".to_string()), Some("mug".to_string()))
        );
    }

    #[tokio::test]
    async fn unchanged_filter_does_not_fetch() {
        let source = RecordingCatalog::with_products(catalog());
        let mut controller = mounted(&source).await;

        assert!(!controller.set_category(&source, Some("  ".to_string())).await);
        assert!(!controller.set_search(&source, None).await);
        assert_eq!(source.product_fetches().len(), 1);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_collection() {
        let mut source = RecordingCatalog::with_products(catalog());
        let mut controller = mounted(&source).await;
        source.fail_products = true;

        controller.set_category(&source, Some("Office".to_string())).await;

        assert_eq!(controller.products().len(), 4);
        let notification = controller.take_notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
    }

    #[tokio::test]
    async fn edit_merges_locally_without_fetching() {
        let source = RecordingCatalog::with_products(catalog());
        let mut controller = mounted(&source).await;
        let id = ProductId::from(7);
        let before = controller.products()[1].clone();

        let patch = ProductPatch {
            price: Some(199.0),
            ..ProductPatch::default()
        };
        controller.edit(&source, &id, patch.clone()).await.unwrap();

        let edited = controller.products().iter().find(|p| p.id == id).unwrap();
        assert_eq!(edited.price, 199.0);
        assert_eq!(edited.name, before.name);
        assert_eq!(edited.category, before.category);
        assert_eq!(edited.description, before.description);
        assert_eq!(edited.created_at, before.created_at);

        assert_eq!(source.product_fetches().len(), 1);
        assert!(source.calls.borrow().contains(&Call::Update(id, patch)));
        assert_eq!(
            controller.take_notification(),
            Some(Notification::success("Product Mug modified successfully"))
        );
    }

    #[tokio::test]
    async fn failed_edit_is_surfaced_and_changes_nothing() {
        let mut source = RecordingCatalog::with_products(catalog());
        source.fail_mutations = true;
        let mut controller = mounted(&source).await;
        let before = controller.products().to_vec();

        let result = controller
            .edit(
                &source,
                &ProductId::from(7),
                ProductPatch {
                    price: Some(1.0),
                    ..ProductPatch::default()
                },
            )
            .await;

        assert!(result.is_err());
        assert_eq!(controller.products(), before.as_slice());
        assert_eq!(
            controller.take_notification(),
            Some(Notification::error("Failed to modify product Mug"))
        );
    }

    #[tokio::test]
    async fn delete_removes_entry_by_id() {
        let source = RecordingCatalog::with_products(catalog());
        let mut controller = mounted(&source).await;
        let id = ProductId::from(7);

        controller.delete(&source, &id).await.unwrap();

        assert!(controller.products().iter().all(|p| p.id != id));
        assert_eq!(controller.products().len(), 3);
        assert_eq!(source.product_fetches().len(), 1);
        assert_eq!(
            controller.take_notification(),
            Some(Notification::success("Product Mug deleted successfully"))
        );
    }

    #[tokio::test]
    async fn failed_delete_keeps_entry() {
        let mut source = RecordingCatalog::with_products(catalog());
        source.fail_mutations = true;
        let mut controller = mounted(&source).await;

        assert!(controller.delete(&source, &ProductId::from(7)).await.is_err());

        assert_eq!(controller.products().len(), 4);
        assert_eq!(
            controller.take_notification(),
            Some(Notification::error("Failed to delete product Mug"))
        );
    }

    #[test]
    fn admin_flag_follows_session_role() {
        let shopper = ProductListController::new(
            Session::new("t", Role::User),
            ListFilter::default(),
            SortOrder::Default,
        );
        assert!(!shopper.is_admin());

        let admin = ProductListController::new(admin(), ListFilter::default(), SortOrder::Default);
        assert!(admin.is_admin());
    }
}
