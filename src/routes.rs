// Client-side navigation surface

use crate::models::TripId;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    TripList,
    TripDetail(TripId),
    MyBookings,
    ReservationsTable,
    NotFound,
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let path = path.split(|c: char| c == '?' || c == '#').next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::TripList,
            ["trip", id] => id
                .parse()
                .map(Route::TripDetail)
                .unwrap_or(Route::NotFound),
            ["my-bookings"] => Route::MyBookings,
            ["reservations-table"] => Route::ReservationsTable,
            _ => Route::NotFound,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::TripList => "/".to_string(),
            Route::TripDetail(id) => format!("/trip/{id}"),
            Route::MyBookings => "/my-bookings".to_string(),
            Route::ReservationsTable => "/reservations-table".to_string(),
            Route::NotFound => "/404".to_string(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// One navigation event; the key changes on every navigation, even to the same route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub route: Route,
    pub key: u64,
}

#[derive(Debug)]
pub struct Navigator {
    current: Location,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Route::TripList)
    }
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        Self {
            current: Location {
                route: initial,
                key: 0,
            },
        }
    }

    pub fn navigate(&mut self, route: Route) -> Location {
        self.current = Location {
            route,
            key: self.current.key.wrapping_add(1),
        };
        self.current
    }

    pub fn navigate_to(&mut self, path: &str) -> Location {
        self.navigate(Route::parse(path))
    }

    pub fn location(&self) -> Location {
        self.current
    }

    pub fn is_active(&self, route: Route) -> bool {
        self.current.route == route
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("/", Route::TripList; "root")]
    #[test_case("", Route::TripList; "empty")]
    #[test_case("/trip/12", Route::TripDetail(12); "trip detail")]
    #[test_case("/trip/12/", Route::TripDetail(12); "trailing slash")]
    #[test_case("/trip/abc", Route::NotFound; "non numeric trip id")]
    #[test_case("/trip", Route::NotFound; "trip without id")]
    #[test_case("/my-bookings", Route::MyBookings; "my bookings")]
    #[test_case("/my-bookings?tab=all", Route::MyBookings; "query string ignored")]
    #[test_case("/reservations-table", Route::ReservationsTable; "reservations table")]
    #[test_case("/admin", Route::NotFound; "unknown")]
    fn test_parse_route(path: &str, expected: Route) {
        assert_eq!(Route::parse(path), expected);
    }

    #[test]
    fn test_path_parses_back() {
        for route in [
            Route::TripList,
            Route::TripDetail(5),
            Route::MyBookings,
            Route::ReservationsTable,
        ] {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn test_navigation_key_changes_on_same_route() {
        let mut navigator = Navigator::default();
        let first = navigator.navigate(Route::ReservationsTable);
        let second = navigator.navigate(Route::ReservationsTable);

        assert_eq!(first.route, second.route);
        assert_ne!(first.key, second.key);
        assert!(navigator.is_active(Route::ReservationsTable));
        assert!(!navigator.is_active(Route::TripList));
    }
}
