use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tera::Tera;
use tracing::warn;

use super::{redirect, render, shell_context};
use crate::api::ApiClient;
use crate::controller::ProductListController;
use crate::forms::ProductForm;
use crate::models::{ListFilter, Notification, Product, ProductId, SortOrder};
use crate::session::CurrentSession;
use crate::store::ProductLists;

const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/300x140";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

#[derive(Serialize)]
struct ProductCard<'a> {
    id: String,
    path_id: String,
    name: &'a str,
    category: &'a str,
    description: &'a str,
    image_url: &'a str,
    image_src: &'a str,
    price: String,
    price_label: String,
}

impl<'a> ProductCard<'a> {
    fn new(product: &'a Product) -> Self {
        let image_url = product.image_url.as_deref().unwrap_or("");
        Self {
            id: product.id.to_string(),
            path_id: urlencoding::encode(product.id.as_str()).into_owned(),
            name: &product.name,
            category: &product.category,
            description: product.description.as_deref().unwrap_or(""),
            image_url,
            image_src: if image_url.is_empty() { PLACEHOLDER_IMAGE } else { image_url },
            price: product.price.to_string(),
            price_label: format!("₹{}", product.price),
        }
    }
}

#[derive(Serialize)]
struct SortOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

/// `/products` carrying the list's current view, so a reload shows the same
/// page without repeating the mutation.
fn list_location(controller: &ProductListController) -> String {
    let filter = controller.filter();
    let mut params = Vec::new();

    if let Some(category) = &filter.category {
        params.push(format!("category={}", urlencoding::encode(category)));
    }
    if let Some(search) = &filter.search {
        params.push(format!("search={}", urlencoding::encode(search)));
    }
    let sort = controller.sort().as_param();
    if !sort.is_empty() {
        params.push(format!("sort={}", sort));
    }

    if params.is_empty() {
        "/products".to_string()
    } else {
        format!("/products?{}", params.join("&"))
    }
}

/// Mounts a list that has never loaded, e.g. after its entry expired.
/// Returns `false` while the products still cannot be fetched; the load
/// error is then the pending notification.
async fn ensure_loaded(controller: &mut ProductListController, api: &ApiClient) -> bool {
    if !controller.is_loaded() {
        controller.mount(api).await;
    }
    controller.is_loaded()
}

fn render_list(tmpl: &Tera, controller: &mut ProductListController) -> HttpResponse {
    let mut context = shell_context(Some(controller.session()));

    let filter = controller.filter();
    let category = filter.category.clone().unwrap_or_default();
    let search = filter.search.clone().unwrap_or_default();
    let sort = controller.sort();

    let cards: Vec<ProductCard> = controller
        .displayed()
        .into_iter()
        .map(ProductCard::new)
        .collect();
    let sort_options: Vec<SortOption> = SortOrder::ALL
        .iter()
        .map(|order| SortOption {
            value: order.as_param(),
            label: order.label(),
            selected: *order == sort,
        })
        .collect();

    context.insert("products", &cards);
    context.insert("categories", controller.categories());
    context.insert("category", &category);
    context.insert("search", &search);
    context.insert("sort", sort.as_param());
    context.insert("sort_options", &sort_options);
    context.insert("can_manage", &controller.is_admin());

    context.insert("notification", &controller.take_notification());
    render(tmpl, "products.html", &context)
}

#[get("/products")]
pub async fn list_products(
    tmpl: web::Data<Tera>,
    api: web::Data<ApiClient>,
    lists: web::Data<ProductLists>,
    session: CurrentSession,
    query: web::Query<ListQuery>,
) -> HttpResponse {
    let Some(session) = session.into_inner() else {
        return redirect("/login");
    };

    let query = query.into_inner();
    let shared = lists.checkout(&session);
    let mut controller = shared.lock().await;

    if controller.is_loaded() {
        // Absent parameters keep the stored value; each setter fetches only
        // when its value actually changes.
        if let Some(category) = query.category {
            controller.set_category(api.get_ref(), Some(category)).await;
        }
        if let Some(search) = query.search {
            controller.set_search(api.get_ref(), Some(search)).await;
        }
    } else {
        let pending = controller.take_notification();
        let sort = controller.sort();
        *controller =
            ProductListController::new(session, ListFilter::new(query.category, query.search), sort);
        controller.mount(api.get_ref()).await;

        if let Some(notification) = controller.take_notification().or(pending) {
            controller.notify(notification);
        }
    }

    if let Some(sort) = query.sort {
        controller.set_sort(SortOrder::from_param(&sort));
    }

    render_list(&tmpl, &mut controller)
}

#[post("/products/{id}/edit")]
pub async fn edit_product(
    api: web::Data<ApiClient>,
    lists: web::Data<ProductLists>,
    session: CurrentSession,
    path: web::Path<String>,
    form: web::Form<ProductForm>,
) -> HttpResponse {
    let Some(session) = session.into_inner() else {
        return redirect("/login");
    };

    let id = ProductId::new(path.into_inner());
    let shared = lists.checkout(&session);
    let mut controller = shared.lock().await;

    if ensure_loaded(&mut controller, api.get_ref()).await {
        match form.patch() {
            Ok(patch) => {
                if let Err(err) = controller.edit(api.get_ref(), &id, patch).await {
                    warn!(product = %id, "product update failed: {}", err);
                }
            }
            Err(err) => controller.notify(Notification::error(err.to_string())),
        }
    }

    redirect(&list_location(&controller))
}

#[post("/products/{id}/delete")]
pub async fn delete_product(
    api: web::Data<ApiClient>,
    lists: web::Data<ProductLists>,
    session: CurrentSession,
    path: web::Path<String>,
) -> HttpResponse {
    let Some(session) = session.into_inner() else {
        return redirect("/login");
    };

    let id = ProductId::new(path.into_inner());
    let shared = lists.checkout(&session);
    let mut controller = shared.lock().await;

    if ensure_loaded(&mut controller, api.get_ref()).await {
        if let Err(err) = controller.delete(api.get_ref(), &id).await {
            warn!(product = %id, "product delete failed: {}", err);
        }
    }

    redirect(&list_location(&controller))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Role, Session};

    fn controller(filter: ListFilter, sort: SortOrder) -> ProductListController {
        ProductListController::new(Session::new("tok", Role::Admin), filter, sort)
    }

    #[test]
    fn default_view_redirects_to_bare_list() {
        let controller = controller(ListFilter::default(), SortOrder::Default);
        assert_eq!(list_location(&controller), "/products");
    }

    #[test]
    fn view_is_carried_in_the_location() {
        let controller = controller(
            ListFilter::new(Some("Home & Kitchen".to_string()), Some("red mug".to_string())),
            SortOrder::PriceLow,
        );
        assert_eq!(
            list_location(&controller),
            "/products?category=Home%20%26%20Kitchen&search=red%20mug&sort=priceLow"
        );
    }
}
