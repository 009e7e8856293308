//! Ordered route list.
//!
//! Routes are tried in the order they were added, first match wins. No
//! sorting, no trees: a REST API has tens of routes, not thousands, and the
//! order you register them in is the order they are checked.

use std::slice;

use crate::request::{Destination, RouteMatch, RouteRequest};
use crate::route::Route;

/// The application's routes.
///
/// Build it once at startup; hand it to [`App::new`](crate::App::new) or use
/// it directly. Each [`RouteList::route`] call returns `self` so
/// registrations chain naturally.
#[derive(Clone, Debug, Default)]
pub struct RouteList {
    routes: Vec<Route>,
}

impl RouteList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a route. Returns `self` for chaining.
    pub fn route(mut self, route: Route) -> Self {
        self.push(route);
        self
    }

    pub fn push(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Places `routes` ahead of every route already in the list.
    ///
    /// Both groups keep their own order. Used to put API routes in front of
    /// an application's catch-all routes.
    pub fn prepend(&mut self, routes: impl IntoIterator<Item = Route>) {
        let mut combined: Vec<Route> = routes.into_iter().collect();
        combined.append(&mut self.routes);
        self.routes = combined;
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Route> {
        self.routes.iter()
    }

    /// First route that matches `req`, with its result.
    pub fn match_request(&self, req: &RouteRequest) -> Option<(&Route, RouteMatch)> {
        self.routes
            .iter()
            .find_map(|route| route.match_request(req).map(|m| (route, m)))
    }

    /// URL built by the first route able to build one for `dest`.
    pub fn construct_url(&self, dest: &Destination, base_url: &str) -> Option<String> {
        self.routes
            .iter()
            .find_map(|route| route.construct_url(dest, base_url))
    }
}

impl<'a> IntoIterator for &'a RouteList {
    type Item = &'a Route;
    type IntoIter = slice::Iter<'a, Route>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Route> for RouteList {
    fn from_iter<I: IntoIterator<Item = Route>>(iter: I) -> Self {
        Self { routes: iter.into_iter().collect() }
    }
}
