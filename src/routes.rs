//! Static route table: which path shows which view.
//!
//! Views are referenced by [`ViewKind`] and only instantiated through
//! [`ViewKind::load`] when a path is actually navigated to.

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::views::{AboutView, CinemaView, DiscoverView, HomeView, SearchView, View};

pub const DEFAULT_PATH: &str = "/home";
const MAX_REDIRECTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    Home,
    About,
    Cinema,
    Discover,
    Search,
}

impl ViewKind {
    pub fn load(self) -> Box<dyn View> {
        match self {
            ViewKind::Home => Box::new(HomeView),
            ViewKind::About => Box::new(AboutView),
            ViewKind::Cinema => Box::new(CinemaView),
            ViewKind::Discover => Box::new(DiscoverView),
            ViewKind::Search => Box::new(SearchView),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ViewKind::Home => "home",
            ViewKind::About => "about",
            ViewKind::Cinema => "cinema",
            ViewKind::Discover => "discover",
            ViewKind::Search => "search",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    View(ViewKind),
    Redirect(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub path: &'static str,
    pub target: Target,
}

static ROUTES: Lazy<Vec<Route>> = Lazy::new(|| {
    vec![
        Route {
            path: "/home",
            target: Target::View(ViewKind::Home),
        },
        Route {
            path: "/",
            target: Target::Redirect(DEFAULT_PATH),
        },
        Route {
            path: "/about",
            target: Target::View(ViewKind::About),
        },
        Route {
            path: "/cinema",
            target: Target::View(ViewKind::Cinema),
        },
        Route {
            path: "/discover",
            target: Target::View(ViewKind::Discover),
        },
        Route {
            path: "/search",
            target: Target::View(ViewKind::Search),
        },
    ]
});

pub fn table() -> &'static [Route] {
    &ROUTES
}

pub fn lookup(path: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|r| r.path == path)
}

/// The view a path ends up on after following redirects.
pub fn resolve(path: &str) -> Option<ViewKind> {
    let mut current = path;
    for _ in 0..=MAX_REDIRECTS {
        match lookup(current)?.target {
            Target::View(kind) => return Some(kind),
            Target::Redirect(to) => current = to,
        }
    }
    None
}
