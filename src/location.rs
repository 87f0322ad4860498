use std::fmt;

use url::Url;

// Locations are app-relative; this base only gives `url` something to resolve against.
const APP_BASE: &str = "app://reader/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Feed,
    Bookmarks,
}

/// An address-bar location: a route plus the raw `page` query value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub route: Route,
    pub page: Option<String>,
}

impl Default for Location {
    fn default() -> Self {
        Self::root()
    }
}

impl Location {
    pub fn root() -> Self {
        Self {
            route: Route::Feed,
            page: None,
        }
    }

    pub fn bookmarks() -> Self {
        Self {
            route: Route::Bookmarks,
            page: None,
        }
    }

    pub fn feed(page: usize) -> Self {
        Self {
            route: Route::Feed,
            page: Some(page.to_string()),
        }
    }

    /// Parses text such as `/?page=3` or `/bookmarks`. Unknown paths resolve
    /// to the feed.
    pub fn parse(text: &str) -> Self {
        let base = match Url::parse(APP_BASE) {
            Ok(base) => base,
            Err(_) => return Self::root(),
        };
        let url = match base.join(text.trim()) {
            Ok(url) => url,
            Err(err) => {
                log::debug!("unparseable location {:?}: {}", text, err);
                return Self::root();
            }
        };

        let route = match url.path().trim_end_matches('/') {
            "/bookmarks" => Route::Bookmarks,
            _ => Route::Feed,
        };
        let page = url
            .query_pairs()
            .find(|(key, _)| key == "page")
            .map(|(_, value)| value.into_owned());

        Self { route, page }
    }

    /// Zero-based chunk index from `page`; absent or invalid means 0.
    pub fn page_index(&self) -> usize {
        self.page
            .as_deref()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = match self.route {
            Route::Feed => "/",
            Route::Bookmarks => "/bookmarks",
        };
        match &self.page {
            Some(page) => {
                let query = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("page", page)
                    .finish();
                write!(f, "{}?{}", path, query)
            }
            None => f.write_str(path),
        }
    }
}

/// Navigation history, newest entry last.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Location>,
}

impl History {
    pub fn new(start: Location) -> Self {
        Self {
            entries: vec![start],
        }
    }

    pub fn current(&self) -> &Location {
        // `entries` is never empty: `back` keeps the first entry.
        &self.entries[self.entries.len() - 1]
    }

    pub fn push(&mut self, location: Location) {
        if self.current() != &location {
            self.entries.push(location);
        }
    }

    /// Swaps the current entry for `location` without growing the history.
    pub fn replace(&mut self, location: Location) {
        if let Some(current) = self.entries.last_mut() {
            *current = location;
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.entries.len() > 1
    }

    /// Drops the current entry and returns the one before it.
    pub fn back(&mut self) -> Option<&Location> {
        if !self.can_go_back() {
            return None;
        }
        self.entries.pop();
        Some(self.current())
    }
}
