// Navigation bar and acting-customer selector

use crate::customer_store::CustomerStore;
use crate::models::CustomerId;
use crate::routes::{Navigator, Route};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct NavLink {
    pub label: &'static str,
    pub route: Route,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CustomerSelector {
    pub options: Vec<(CustomerId, String)>,
    pub selected: CustomerId,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub links: Vec<NavLink>,
    pub selector: CustomerSelector,
}

const NAV_ITEMS: [(&str, Route); 3] = [
    ("Trips", Route::TripList),
    ("My Reservations", Route::MyBookings),
    ("Reservations Table", Route::ReservationsTable),
];

impl Header {
    pub fn build(store: &CustomerStore, navigator: &Navigator) -> Self {
        let links = NAV_ITEMS
            .iter()
            .map(|&(label, route)| NavLink {
                label,
                route,
                active: navigator.is_active(route),
            })
            .collect();

        let loading = store.is_loading();
        let options = if loading {
            Vec::new()
        } else {
            store
                .customers()
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect()
        };

        Self {
            links,
            selector: CustomerSelector {
                options,
                selected: store.selected_id(),
                disabled: loading,
            },
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TravelAgency |")?;
        for link in &self.links {
            if link.active {
                write!(f, " *{}*", link.label)?;
            } else {
                write!(f, " {}", link.label)?;
            }
        }

        let selected = self
            .selector
            .options
            .iter()
            .find(|(id, _)| *id == self.selector.selected)
            .map(|(_, name)| name.as_str());
        match (self.selector.disabled, selected) {
            (true, _) => writeln!(f, " | Customer: Loading..."),
            (false, Some(name)) => writeln!(f, " | Customer: {name}"),
            (false, None) => writeln!(f, " | Customer: -"),
        }
    }
}
