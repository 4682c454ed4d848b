//! A single stop on a tour

use std::fmt;
use std::sync::Arc;

use super::options::{ShowHook, TourHook};
use super::Tour;
use crate::element::{ElementRef, Placement};

/// One step of a tour, bound to at most one element.
///
/// `prev` and `next` override the neighbouring indices (`current ± 1`);
/// a negative override means there is nothing in that direction.
#[derive(Clone)]
pub struct Step {
    pub element: Option<ElementRef>,
    /// Page the step lives on
    pub path: Option<String>,
    pub placement: Placement,
    pub title: String,
    pub content: String,
    pub prev: Option<isize>,
    pub next: Option<isize>,
    /// Showing this step ends the tour
    pub end: bool,
    pub animation: bool,
    pub on_show: Option<ShowHook>,
    pub on_hide: Option<TourHook>,
    pub on_shown: Option<TourHook>,
}

impl Step {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(mut self, element: impl Into<ElementRef>) -> Self {
        self.element = Some(element.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn prev(mut self, prev: isize) -> Self {
        self.prev = Some(prev);
        self
    }

    pub fn next(mut self, next: isize) -> Self {
        self.next = Some(next);
        self
    }

    pub fn end(mut self, end: bool) -> Self {
        self.end = end;
        self
    }

    pub fn animation(mut self, animation: bool) -> Self {
        self.animation = animation;
        self
    }

    pub fn on_show(mut self, f: impl Fn(&Tour) -> bool + Send + Sync + 'static) -> Self {
        self.on_show = Some(Arc::new(f));
        self
    }

    pub fn on_hide(mut self, f: impl Fn(&Tour) + Send + Sync + 'static) -> Self {
        self.on_hide = Some(Arc::new(f));
        self
    }

    pub fn on_shown(mut self, f: impl Fn(&Tour) + Send + Sync + 'static) -> Self {
        self.on_shown = Some(Arc::new(f));
        self
    }
}

impl Default for Step {
    fn default() -> Self {
        Self {
            element: None,
            path: None,
            placement: Placement::default(),
            title: String::new(),
            content: String::new(),
            prev: None,
            next: None,
            end: false,
            animation: true,
            on_show: None,
            on_hide: None,
            on_shown: None,
        }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("element", &self.element)
            .field("path", &self.path)
            .field("placement", &self.placement)
            .field("title", &self.title)
            .field("content", &self.content)
            .field("prev", &self.prev)
            .field("next", &self.next)
            .field("end", &self.end)
            .field("animation", &self.animation)
            .field("on_show", &self.on_show.is_some())
            .field("on_hide", &self.on_hide.is_some())
            .field("on_shown", &self.on_shown.is_some())
            .finish()
    }
}
