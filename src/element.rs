//! Presentation capabilities consumed by a tour.
//!
//! The tour never draws anything itself. It asks an [`Element`] whether it
//! can be shown, hands it a [`Callout`] to render, and tells it to hide.
//! Steps can point at an element directly or by selector, in which case the
//! tour resolves the selector through its [`Document`] each time the step is
//! shown. A [`Navigator`] moves the user to a step's page when it has a path.
//!
//! Mock implementations record every call for tests.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Where a callout sits relative to its element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    #[default]
    Right,
    Left,
    Top,
    Bottom,
}

impl Placement {
    pub fn label(&self) -> &'static str {
        match self {
            Placement::Right => "right",
            Placement::Left => "left",
            Placement::Top => "top",
            Placement::Bottom => "bottom",
        }
    }
}

/// Everything an element needs to render a step's callout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callout {
    /// Index of the step being shown
    pub step: usize,
    pub placement: Placement,
    pub title: String,
    pub content: String,
    pub animation: bool,
    /// Whether a "previous" affordance should be offered
    pub has_prev: bool,
    /// Whether a "next" affordance should be offered
    pub has_next: bool,
}

/// A UI element a step can be attached to
pub trait Element: Send + Sync {
    /// Whether the element is present in the document
    fn exists(&self) -> bool;

    /// Whether the element is currently visible
    fn is_visible(&self) -> bool;

    /// Render the callout next to the element
    fn show(&self, callout: &Callout);

    /// Remove the rendered callout
    fn hide(&self);

    /// Whether a callout is currently rendered
    fn is_shown(&self) -> bool;
}

/// Resolves selectors to elements
pub trait Document: Send + Sync {
    fn resolve(&self, selector: &str) -> Option<Arc<dyn Element>>;
}

/// Moves the user between pages
pub trait Navigator: Send + Sync {
    /// Path of the page currently displayed
    fn current_path(&self) -> String;

    fn navigate(&self, path: &str);
}

/// How a step refers to its element
#[derive(Clone)]
pub enum ElementRef {
    /// A live element handle
    Handle(Arc<dyn Element>),
    /// A selector looked up through the tour's document when shown
    Selector(String),
}

impl ElementRef {
    /// Resolve to a live element, if one can be found
    pub fn resolve(&self, document: Option<&dyn Document>) -> Option<Arc<dyn Element>> {
        match self {
            ElementRef::Handle(element) => Some(Arc::clone(element)),
            ElementRef::Selector(selector) => document.and_then(|d| d.resolve(selector)),
        }
    }

    pub fn selector(&self) -> Option<&str> {
        match self {
            ElementRef::Handle(_) => None,
            ElementRef::Selector(selector) => Some(selector),
        }
    }
}

impl fmt::Debug for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementRef::Handle(_) => f.write_str("Handle(..)"),
            ElementRef::Selector(selector) => f.debug_tuple("Selector").field(selector).finish(),
        }
    }
}

impl<E: Element + 'static> From<Arc<E>> for ElementRef {
    fn from(element: Arc<E>) -> Self {
        ElementRef::Handle(element)
    }
}

impl From<&str> for ElementRef {
    fn from(selector: &str) -> Self {
        ElementRef::Selector(selector.to_string())
    }
}

impl From<String> for ElementRef {
    fn from(selector: String) -> Self {
        ElementRef::Selector(selector)
    }
}

/// Mock element for testing
#[derive(Debug, Default)]
pub struct MockElement {
    /// Whether the element is "in the document"
    pub present: Mutex<bool>,
    /// Whether the element is "visible"
    pub visible: Mutex<bool>,
    shown: Mutex<bool>,
    /// Every callout this element was asked to render
    pub callouts: Mutex<Vec<Callout>>,
    /// Number of hide calls received
    pub hide_count: Mutex<usize>,
}

impl MockElement {
    /// A present, visible element
    pub fn new() -> Self {
        Self {
            present: Mutex::new(true),
            visible: Mutex::new(true),
            ..Self::default()
        }
    }

    /// A present element that is hidden from view
    pub fn invisible() -> Self {
        let element = Self::new();
        *element.visible.lock().unwrap() = false;
        element
    }

    /// An element that is not in the document
    pub fn detached() -> Self {
        let element = Self::new();
        *element.present.lock().unwrap() = false;
        element
    }

    pub fn set_visible(&self, visible: bool) {
        *self.visible.lock().unwrap() = visible;
    }

    /// Number of times a callout was rendered
    pub fn show_count(&self) -> usize {
        self.callouts.lock().unwrap().len()
    }

    pub fn last_callout(&self) -> Option<Callout> {
        self.callouts.lock().unwrap().last().cloned()
    }
}

impl Element for MockElement {
    fn exists(&self) -> bool {
        *self.present.lock().unwrap()
    }

    fn is_visible(&self) -> bool {
        *self.present.lock().unwrap() && *self.visible.lock().unwrap()
    }

    fn show(&self, callout: &Callout) {
        self.callouts.lock().unwrap().push(callout.clone());
        *self.shown.lock().unwrap() = true;
    }

    fn hide(&self) {
        *self.hide_count.lock().unwrap() += 1;
        *self.shown.lock().unwrap() = false;
    }

    fn is_shown(&self) -> bool {
        *self.shown.lock().unwrap()
    }
}

/// Mock document mapping selectors to mock elements
#[derive(Debug, Default)]
pub struct MockDocument {
    elements: Mutex<HashMap<String, Arc<MockElement>>>,
}

impl MockDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a visible element under `selector` and return its handle
    pub fn insert(&self, selector: &str) -> Arc<MockElement> {
        let element = Arc::new(MockElement::new());
        self.elements
            .lock()
            .unwrap()
            .insert(selector.to_string(), Arc::clone(&element));
        element
    }

    pub fn remove(&self, selector: &str) {
        self.elements.lock().unwrap().remove(selector);
    }
}

impl Document for MockDocument {
    fn resolve(&self, selector: &str) -> Option<Arc<dyn Element>> {
        self.elements
            .lock()
            .unwrap()
            .get(selector)
            .map(|e| Arc::clone(e) as Arc<dyn Element>)
    }
}

/// Mock navigator recording requested paths
#[derive(Debug)]
pub struct MockNavigator {
    pub path: Mutex<String>,
    pub navigations: Mutex<Vec<String>>,
}

impl MockNavigator {
    pub fn at(path: &str) -> Self {
        Self {
            path: Mutex::new(path.to_string()),
            navigations: Mutex::new(Vec::new()),
        }
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

impl Navigator for MockNavigator {
    fn current_path(&self) -> String {
        self.path.lock().unwrap().clone()
    }

    fn navigate(&self, path: &str) {
        self.navigations.lock().unwrap().push(path.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_element_records_show_and_hide() {
        let element = MockElement::new();
        let callout = Callout {
            step: 0,
            placement: Placement::Left,
            title: "Title".to_string(),
            content: "Body".to_string(),
            animation: true,
            has_prev: false,
            has_next: true,
        };

        element.show(&callout);
        assert!(element.is_shown());
        assert_eq!(element.last_callout(), Some(callout));

        element.hide();
        assert!(!element.is_shown());
        assert_eq!(*element.hide_count.lock().unwrap(), 1);
    }

    #[test]
    fn test_detached_element_is_not_visible() {
        let element = MockElement::detached();
        assert!(!element.exists());
        assert!(!element.is_visible());
    }

    #[test]
    fn test_selector_resolves_through_document() {
        let document = MockDocument::new();
        document.insert("#nav");

        let found = ElementRef::from("#nav");
        let missing = ElementRef::from("#tour-test");

        assert!(found.resolve(Some(&document)).is_some());
        assert!(missing.resolve(Some(&document)).is_none());
        assert!(found.resolve(None).is_none());
    }

    #[test]
    fn test_handle_resolves_without_document() {
        let element = Arc::new(MockElement::new());
        let reference = ElementRef::from(element);
        assert!(reference.resolve(None).is_some());
        assert_eq!(reference.selector(), None);
    }

    #[test]
    fn test_placement_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            placement: Placement,
        }
        let parsed: Wrapper = toml::from_str("placement = \"bottom\"").unwrap();
        assert_eq!(parsed.placement, Placement::Bottom);
    }
}
