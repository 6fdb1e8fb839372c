//! Comic gallery and the paged reader.

use core_library::{Catalog, Comic};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicCard {
    pub id: String,
    pub title: String,
    pub author: String,
    pub cover_url: String,
    pub page_count: usize,
}

impl From<&Comic> for ComicCard {
    fn from(comic: &Comic) -> Self {
        Self {
            id: comic.id.clone(),
            title: comic.title.clone(),
            author: comic.author.clone(),
            cover_url: comic.cover_url.clone(),
            page_count: comic.page_count(),
        }
    }
}

pub fn comic_shelf(catalog: &Catalog) -> Vec<ComicCard> {
    catalog.comics().iter().map(ComicCard::from).collect()
}

/// Keys the reader reacts to while a comic is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderKey {
    Next,
    Previous,
    Close,
}

impl ReaderKey {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" => Some(ReaderKey::Next),
            "ArrowLeft" => Some(ReaderKey::Previous),
            "Escape" => Some(ReaderKey::Close),
            _ => None,
        }
    }
}

/// Reader state. `page` is zero-based and always within the open comic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComicReader {
    active: Option<Comic>,
    page: usize,
    immersive: bool,
}

impl ComicReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, comic: Comic) {
        self.active = Some(comic);
        self.page = 0;
        self.immersive = false;
    }

    pub fn close(&mut self) {
        self.active = None;
        self.page = 0;
        self.immersive = false;
    }

    pub fn active(&self) -> Option<&Comic> {
        self.active.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn is_immersive(&self) -> bool {
        self.immersive
    }

    /// Immersive mode hides the chrome; only meaningful while a comic is open.
    pub fn toggle_immersive(&mut self) {
        if self.is_open() {
            self.immersive = !self.immersive;
        }
    }

    fn page_count(&self) -> usize {
        self.active.as_ref().map_or(0, Comic::page_count)
    }

    pub fn can_next(&self) -> bool {
        self.page + 1 < self.page_count()
    }

    pub fn can_prev(&self) -> bool {
        self.is_open() && self.page > 0
    }

    /// Returns whether the page changed.
    pub fn next(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.page += 1;
        true
    }

    pub fn prev(&mut self) -> bool {
        if !self.can_prev() {
            return false;
        }
        self.page -= 1;
        true
    }

    /// Apply a key press. Ignored when no comic is open. Returns whether state changed.
    pub fn handle_key(&mut self, key: &str) -> bool {
        if !self.is_open() {
            return false;
        }
        match ReaderKey::from_key(key) {
            Some(ReaderKey::Next) => self.next(),
            Some(ReaderKey::Previous) => self.prev(),
            Some(ReaderKey::Close) => {
                self.close();
                true
            }
            None => false,
        }
    }

    pub fn current_page_url(&self) -> Option<&str> {
        self.active
            .as_ref()
            .and_then(|comic| comic.pages.get(self.page))
            .map(String::as_str)
    }

    /// "Page n of m"; "Page 0 of 0" for a comic without pages.
    pub fn page_label(&self) -> Option<String> {
        let (current, total) = self.position()?;
        Some(format!("Page {current} of {total}"))
    }

    /// Compact "n / m" counter for narrow screens.
    pub fn counter(&self) -> Option<String> {
        let (current, total) = self.position()?;
        Some(format!("{current} / {total}"))
    }

    fn position(&self) -> Option<(usize, usize)> {
        self.active.as_ref()?;
        let total = self.page_count();
        let current = if total == 0 { 0 } else { self.page + 1 };
        Some((current, total))
    }
}
