//! Route table and the sign-in gate.
//!
//! Paths arrive from a hash router (`#/comics`) or a plain location
//! (`/comics/`). Both forms resolve the same way, matching is case-insensitive
//! and anything unknown lands on the home page.

use core_library::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Search,
    Library,
    Comics,
    Profile,
    Debug,
}

impl Route {
    /// Sidebar order.
    pub const ALL: [Route; 6] = [
        Route::Home,
        Route::Search,
        Route::Library,
        Route::Comics,
        Route::Profile,
        Route::Debug,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Search => "/search",
            Route::Library => "/library",
            Route::Comics => "/comics",
            Route::Profile => "/profile",
            Route::Debug => "/debug",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Search => "Search",
            Route::Library => "Your Library",
            Route::Comics => "Comics",
            Route::Profile => "Profile",
            Route::Debug => "Diagnostics",
        }
    }

    /// Text shown by pages that have no content yet.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Route::Search => Some("Search Feature Coming Soon"),
            Route::Library => Some("Your Library is Empty"),
            _ => None,
        }
    }

    /// Exact match on a normalized path.
    fn from_normalized(path: &str) -> Option<Route> {
        Route::ALL
            .into_iter()
            .find(|route| route.path().eq_ignore_ascii_case(path))
    }
}

/// Strip the hash prefix, query, fragment and trailing slashes.
pub fn normalize_path(raw: &str) -> String {
    let path = raw.trim();
    let path = path.strip_prefix('#').unwrap_or(path);
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = path.trim_end_matches('/');

    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// What the shell should show for a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Nobody is signed in; every route shows the sign-in page.
    Login,
    Page {
        route: Route,
        /// Set when the requested path was unknown and the shell must rewrite
        /// the location to [`Route::path`].
        redirected: bool,
    },
}

pub fn resolve(raw_path: &str, signed_in: bool) -> Screen {
    if !signed_in {
        return Screen::Login;
    }
    match Route::from_normalized(&normalize_path(raw_path)) {
        Some(route) => Screen::Page {
            route,
            redirected: false,
        },
        None => Screen::Page {
            route: Route::Home,
            redirected: true,
        },
    }
}

/// Sign-in page with the role tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginView {
    pub selected: UserRole,
}

impl Default for LoginView {
    fn default() -> Self {
        Self {
            selected: UserRole::Listener,
        }
    }
}

impl LoginView {
    pub fn select(&mut self, role: UserRole) {
        self.selected = role;
    }

    pub fn submit_label(&self) -> &'static str {
        match self.selected {
            UserRole::Listener => "Log In to Listen",
            UserRole::Artist => "Log In to Dashboard",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("#/"), "/");
        assert_eq!(normalize_path("#/comics"), "/comics");
        assert_eq!(normalize_path("/profile/"), "/profile");
        assert_eq!(normalize_path("debug"), "/debug");
        assert_eq!(normalize_path("/search?q=m83"), "/search");
    }

    #[test]
    fn test_known_routes_resolve() {
        for route in Route::ALL {
            assert_eq!(
                resolve(route.path(), true),
                Screen::Page {
                    route,
                    redirected: false
                }
            );
        }
        assert_eq!(
            resolve("#/COMICS/", true),
            Screen::Page {
                route: Route::Comics,
                redirected: false
            }
        );
    }

    #[test]
    fn test_unknown_route_redirects_home() {
        assert_eq!(
            resolve("/settings", true),
            Screen::Page {
                route: Route::Home,
                redirected: true
            }
        );
    }

    #[test]
    fn test_signed_out_always_sees_login() {
        assert_eq!(resolve("/profile", false), Screen::Login);
        assert_eq!(resolve("/nowhere", false), Screen::Login);
    }

    #[test]
    fn test_login_labels() {
        let mut login = LoginView::default();
        assert_eq!(login.submit_label(), "Log In to Listen");
        login.select(UserRole::Artist);
        assert_eq!(login.submit_label(), "Log In to Dashboard");
        assert_eq!(Route::Search.placeholder(), Some("Search Feature Coming Soon"));
        assert_eq!(Route::Home.placeholder(), None);
    }
}
