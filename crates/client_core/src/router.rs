//! Which view a path lands on, given the sign-in state.

use serde::{Deserialize, Serialize};

pub const LOGIN_PATH: &str = "/";
pub const PRODUCTS_PATH: &str = "/products";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Login,
    Products,
}

impl View {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Login => LOGIN_PATH,
            Self::Products => PRODUCTS_PATH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub view: View,
    /// True when the requested path was replaced by the view's own path.
    pub redirected: bool,
}

impl RouteDecision {
    fn render(view: View) -> Self {
        Self {
            view,
            redirected: false,
        }
    }

    fn redirect(view: View) -> Self {
        Self {
            view,
            redirected: true,
        }
    }

    pub fn path(&self) -> &'static str {
        self.view.path()
    }
}

pub fn resolve(path: &str, authenticated: bool) -> RouteDecision {
    match normalize(path) {
        LOGIN_PATH => RouteDecision::render(View::Login),
        PRODUCTS_PATH if authenticated => RouteDecision::render(View::Products),
        _ => RouteDecision::redirect(View::Login),
    }
}

pub fn after_login() -> RouteDecision {
    RouteDecision::redirect(View::Products)
}

pub fn after_logout() -> RouteDecision {
    RouteDecision::redirect(View::Login)
}

fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        LOGIN_PATH
    } else {
        trimmed
    }
}
