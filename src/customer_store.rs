// Acting customer selection shared by every view
// Injected explicitly as an Arc<CustomerStore>; views watch the selected id to react to changes

use crate::api::TravelApi;
use crate::models::{Customer, CustomerId};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug)]
struct Inner {
    customers: Vec<Customer>,
    loading: bool,
    last_error: Option<String>,
}

pub struct CustomerStore {
    api: Arc<dyn TravelApi>,
    inner: RwLock<Inner>,
    selected: watch::Sender<CustomerId>,
}

impl CustomerStore {
    pub fn new(api: Arc<dyn TravelApi>, initial_customer: CustomerId) -> Self {
        let (selected, _) = watch::channel(initial_customer);
        Self {
            api,
            inner: RwLock::new(Inner {
                customers: Vec::new(),
                loading: true,
                last_error: None,
            }),
            selected,
        }
    }

    /// Loads the customer list, falling back to the first customer when the
    /// current selection is not part of it.
    pub async fn initialize(&self) {
        self.inner.write().loading = true;

        match self.api.list_customers().await {
            Ok(customers) => {
                let selected = self.selected_id();
                let fallback = customers
                    .iter()
                    .all(|c| c.id != selected)
                    .then(|| customers.first().map(|c| c.id))
                    .flatten();

                debug!(count = customers.len(), "customers loaded");
                {
                    let mut inner = self.inner.write();
                    inner.customers = customers;
                    inner.last_error = None;
                    inner.loading = false;
                }

                if let Some(first) = fallback {
                    info!(missing = selected, selected = first, "selected customer not found, using first");
                    self.set_selected_id(first);
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to load customers");
                let mut inner = self.inner.write();
                inner.customers.clear();
                inner.last_error = Some(e.to_string());
                inner.loading = false;
            }
        }
    }

    pub fn customers(&self) -> Vec<Customer> {
        self.inner.read().customers.clone()
    }

    pub fn selected_id(&self) -> CustomerId {
        *self.selected.borrow()
    }

    pub fn selected_customer(&self) -> Option<Customer> {
        let selected = self.selected_id();
        self.inner
            .read()
            .customers
            .iter()
            .find(|c| c.id == selected)
            .cloned()
    }

    pub fn set_selected_id(&self, customer_id: CustomerId) {
        // Only notify watchers on a real change
        self.selected.send_if_modified(|current| {
            if *current == customer_id {
                false
            } else {
                *current = customer_id;
                true
            }
        });
    }

    pub fn is_loading(&self) -> bool {
        self.inner.read().loading
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.read().last_error.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CustomerId> {
        self.selected.subscribe()
    }
}
