use std::{collections::HashSet, sync::Mutex};

use url::Url;

/// `scrollIntoView` arguments, using the DOM's option names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollOptions {
    pub behavior: &'static str,
    pub block: &'static str,
}

impl ScrollOptions {
    pub const SMOOTH_START: Self = Self {
        behavior: "smooth",
        block: "start",
    };
}

/// Host environment the view model runs in.
pub trait Platform: Send + Sync {
    /// Whether data documents can be fetched from the current origin.
    fn is_http_origin(&self) -> bool;
    fn has_element(&self, id: &str) -> bool;
    fn scroll_into_view(&self, id: &str, options: ScrollOptions);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrollRequest {
    pub element_id: String,
    pub options: ScrollOptions,
}

impl ScrollRequest {
    /// Inline script replaying the request in the browser. A URL fragment
    /// (e.g. after toggling a day) takes precedence.
    pub fn script(&self) -> String {
        format!(
            "if (!window.location.hash) document.getElementById({id:?})?.scrollIntoView({{behavior:'{behavior}',block:'{block}'}});",
            id = self.element_id,
            behavior = self.options.behavior,
            block = self.options.block,
        )
    }
}

/// Server-rendered page: knows the sections it renders and records scroll
/// requests so the template can emit them.
#[derive(Debug)]
pub struct PagePlatform {
    origin: Url,
    elements: HashSet<String>,
    scroll: Mutex<Option<ScrollRequest>>,
}

impl PagePlatform {
    pub fn for_origin(origin: Url) -> Self {
        Self {
            origin,
            elements: HashSet::new(),
            scroll: Mutex::new(None),
        }
    }

    pub fn with_elements<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.elements.extend(ids);
        self
    }

    pub fn take_scroll(&self) -> Option<ScrollRequest> {
        self.scroll.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl Platform for PagePlatform {
    fn is_http_origin(&self) -> bool {
        matches!(self.origin.scheme(), "http" | "https")
    }

    fn has_element(&self, id: &str) -> bool {
        self.elements.contains(id)
    }

    fn scroll_into_view(&self, id: &str, options: ScrollOptions) {
        if let Ok(mut slot) = self.scroll.lock() {
            *slot = Some(ScrollRequest {
                element_id: id.to_string(),
                options,
            });
        }
    }
}
