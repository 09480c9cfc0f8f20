//! Navigation seam.
//!
//! The session layer never owns the browser location; it asks a `Navigator`
//! for the current path and tells it where to go. `navigate` is a client-side
//! route change, `redirect` is a hard redirect that resets all page state.

use parking_lot::Mutex;
use reqwest::Url;
use tracing::debug;

pub trait Navigator: Send + Sync {
    /// Path component of the current location
    fn current_path(&self) -> String;

    /// Client-side route change
    fn navigate(&self, path: &str);

    /// Full navigation; `url` may be a path or an absolute URL
    fn redirect(&self, url: &str);

    fn is_under(&self, prefix: &str) -> bool {
        self.current_path().starts_with(prefix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Route(String),
    Redirect(String),
}

struct Location {
    path: String,
    history: Vec<Navigation>,
}

/// In-memory location that records every navigation request.
pub struct MemoryNavigator {
    location: Mutex<Location>,
}

impl MemoryNavigator {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            location: Mutex::new(Location {
                path: initial_path.into(),
                history: Vec::new(),
            }),
        }
    }

    pub fn history(&self) -> Vec<Navigation> {
        self.location.lock().history.clone()
    }

    fn path_of(url: &str) -> String {
        if url.starts_with('/') {
            return url.to_string();
        }
        Url::parse(url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| url.to_string())
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.location.lock().path.clone()
    }

    fn navigate(&self, path: &str) {
        debug!(path = path, "Route change");
        let mut location = self.location.lock();
        location.path = path.to_string();
        location.history.push(Navigation::Route(path.to_string()));
    }

    fn redirect(&self, url: &str) {
        debug!(url = url, "Hard redirect");
        let mut location = self.location.lock();
        location.path = Self::path_of(url);
        location.history.push(Navigation::Redirect(url.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_navigator_records_history() {
        let nav = MemoryNavigator::new("/notes");
        assert_eq!(nav.current_path(), "/notes");
        assert!(!nav.is_under("/login"));

        nav.navigate("/login");
        assert!(nav.is_under("/login"));

        nav.redirect("https://accounts.google.com/o/oauth2/auth?state=x");
        assert_eq!(nav.current_path(), "/o/oauth2/auth");
        assert_eq!(
            nav.history(),
            vec![
                Navigation::Route("/login".to_string()),
                Navigation::Redirect("https://accounts.google.com/o/oauth2/auth?state=x".to_string()),
            ]
        );
    }
}
