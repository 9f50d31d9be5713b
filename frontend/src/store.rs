//! Product list state kept between requests.
//!
//! Each signed-in session owns one [`ProductListController`], keyed by its
//! token. Sorting, filtering and edit/delete reconciliation all act on that
//! stored controller, so the collection is only fetched when the controller
//! itself decides to fetch. Entries are dropped on logout and after sitting
//! idle; adding a product drops the adder's list too.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::controller::ProductListController;
use crate::models::{ListFilter, SortOrder};
use crate::session::Session;

pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

pub type SharedController = Arc<Mutex<ProductListController>>;

struct Entry {
    controller: SharedController,
    last_used: Instant,
}

pub struct ProductLists {
    entries: DashMap<String, Entry>,
    idle_ttl: Duration,
}

impl Default for ProductLists {
    fn default() -> Self {
        Self::with_idle_ttl(DEFAULT_IDLE_TTL)
    }
}

impl ProductLists {
    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            idle_ttl,
        }
    }

    /// The controller of `session`. A session seen for the first time gets an
    /// unloaded controller with the default filter and sort.
    pub fn checkout(&self, session: &Session) -> SharedController {
        self.entries
            .retain(|_, entry| entry.last_used.elapsed() < self.idle_ttl);

        let mut entry = self
            .entries
            .entry(session.token.clone())
            .or_insert_with(|| {
                debug!(admin = session.is_admin(), "new product list for session");
                Entry {
                    controller: Arc::new(Mutex::new(ProductListController::new(
                        session.clone(),
                        ListFilter::default(),
                        SortOrder::Default,
                    ))),
                    last_used: Instant::now(),
                }
            });
        entry.last_used = Instant::now();
        entry.controller.clone()
    }

    /// Drops the stored list of `token`; the next visit mounts a fresh one.
    pub fn evict(&self, token: &str) {
        if self.entries.remove(token).is_some() {
            debug!("product list dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;

    #[test]
    fn same_session_gets_the_same_controller() {
        let lists = ProductLists::default();
        let session = Session::new("tok", Role::User);

        let first = lists.checkout(&session);
        let second = lists.checkout(&session);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(lists.entries.len(), 1);
    }

    #[test]
    fn sessions_do_not_share_lists() {
        let lists = ProductLists::default();

        let admin = lists.checkout(&Session::new("a", Role::Admin));
        let shopper = lists.checkout(&Session::new("b", Role::User));

        assert!(!Arc::ptr_eq(&admin, &shopper));
        assert_eq!(lists.entries.len(), 2);
    }

    #[test]
    fn evicted_session_starts_over() {
        let lists = ProductLists::default();
        let session = Session::new("tok", Role::User);
        let before = lists.checkout(&session);

        lists.evict("tok");
        assert!(lists.entries.is_empty());

        let after = lists.checkout(&session);
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn idle_lists_are_dropped() {
        let lists = ProductLists::with_idle_ttl(Duration::ZERO);
        lists.checkout(&Session::new("old", Role::User));

        lists.checkout(&Session::new("new", Role::User));

        assert_eq!(lists.entries.len(), 1);
    }

    #[tokio::test]
    async fn fresh_controller_is_unloaded() {
        let lists = ProductLists::default();
        let controller = lists.checkout(&Session::new("tok", Role::Admin));
        let controller = controller.lock().await;

        assert!(!controller.is_loaded());
        assert!(controller.is_admin());
        assert_eq!(controller.sort(), SortOrder::Default);
    }
}
