//! Terminal page: a tour target described in TOML.
//!
//! A page lists named elements and the tour's steps. Elements render their
//! callouts as text boxes on a shared writer, and navigation just moves the
//! page's location, so a whole tour can be walked through in a terminal.
//!
//! ```toml
//! location = "/dashboard"
//!
//! [[elements]]
//! id = "#sidebar"
//! label = "Sidebar"
//!
//! [[steps]]
//! element = "#sidebar"
//! title = "Navigation"
//! content = "Everything lives here."
//! placement = "right"
//! ```

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Deserialize;

use crate::element::{Callout, Document, Element, ElementRef, Navigator, Placement};
use crate::error::PageError;
use crate::tour::Step;

/// Writer shared by every element on a page
pub type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Line ending that also works while the terminal is in raw mode
const EOL: &str = "\r\n";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn default_location() -> String {
    "/".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageSpec {
    /// Path the page starts at
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub elements: Vec<ElementSpec>,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementSpec {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepSpec {
    #[serde(default)]
    pub element: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub prev: Option<isize>,
    #[serde(default)]
    pub next: Option<isize>,
    #[serde(default)]
    pub end: bool,
    #[serde(default = "default_true")]
    pub animation: bool,
}

impl StepSpec {
    pub fn to_step(&self) -> Step {
        Step {
            element: self.element.clone().map(ElementRef::Selector),
            path: self.path.clone(),
            placement: self.placement,
            title: self.title.clone(),
            content: self.content.clone(),
            prev: self.prev,
            next: self.next,
            end: self.end,
            animation: self.animation,
            ..Step::default()
        }
    }
}

/// An element that draws callouts as text
pub struct TerminalElement {
    id: String,
    label: String,
    visible: Mutex<bool>,
    shown: Mutex<bool>,
    out: SharedWriter,
}

impl TerminalElement {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_visible(&self, visible: bool) {
        *lock(&self.visible) = visible;
    }

    fn write(&self, text: &str) {
        let mut out = lock(&self.out);
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
            tracing::warn!(element = %self.id, error = %e, "Failed to draw callout");
        }
    }
}

impl Element for TerminalElement {
    fn exists(&self) -> bool {
        true
    }

    fn is_visible(&self) -> bool {
        *lock(&self.visible)
    }

    fn show(&self, callout: &Callout) {
        self.write(&render_callout(&self.label, callout));
        *lock(&self.shown) = true;
    }

    fn hide(&self) {
        *lock(&self.shown) = false;
    }

    fn is_shown(&self) -> bool {
        *lock(&self.shown)
    }
}

/// Render a callout box for an element labelled `label`
pub fn render_callout(label: &str, callout: &Callout) -> String {
    let mut text = String::new();
    text.push_str(&format!(
        "┌─ {} ─ {} of {label}{EOL}",
        callout.title,
        callout.placement.label()
    ));
    for line in callout.content.lines() {
        text.push_str(&format!("│ {line}{EOL}"));
    }

    let mut nav = Vec::new();
    if callout.has_prev {
        nav.push("← prev");
    }
    if callout.has_next {
        nav.push("→ next");
    }
    nav.push("esc end tour");
    text.push_str(&format!("└─ {}{EOL}", nav.join(" · ")));
    text
}

/// A terminal page acting as the tour's document and navigator
pub struct Page {
    elements: HashMap<String, Arc<TerminalElement>>,
    steps: Vec<StepSpec>,
    location: Mutex<String>,
    pending_navigation: Mutex<Option<String>>,
    out: SharedWriter,
}

impl Page {
    pub fn new(spec: PageSpec, out: SharedWriter) -> Result<Self, PageError> {
        let mut elements = HashMap::new();
        for element in spec.elements {
            if elements.contains_key(&element.id) {
                return Err(PageError::DuplicateElement(element.id));
            }
            let label = element.label.unwrap_or_else(|| element.id.clone());
            elements.insert(
                element.id.clone(),
                Arc::new(TerminalElement {
                    id: element.id,
                    label,
                    visible: Mutex::new(element.visible),
                    shown: Mutex::new(false),
                    out: Arc::clone(&out),
                }),
            );
        }

        Ok(Self {
            elements,
            steps: spec.steps,
            location: Mutex::new(spec.location),
            pending_navigation: Mutex::new(None),
            out,
        })
    }

    pub fn from_toml(source: &str, out: SharedWriter) -> Result<Self, PageError> {
        let spec: PageSpec = toml::from_str(source)?;
        Self::new(spec, out)
    }

    pub fn load(path: &Path, out: SharedWriter) -> Result<Self, PageError> {
        let source = std::fs::read_to_string(path).map_err(|source| PageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source, out)
    }

    /// Steps described by the page, elements referenced by selector
    pub fn steps(&self) -> Vec<Step> {
        self.steps.iter().map(StepSpec::to_step).collect()
    }

    pub fn element(&self, id: &str) -> Option<Arc<TerminalElement>> {
        self.elements.get(id).cloned()
    }

    pub fn location(&self) -> String {
        lock(&self.location).clone()
    }

    /// Path navigated to since the last call, if any
    pub fn take_navigation(&self) -> Option<String> {
        lock(&self.pending_navigation).take()
    }
}

impl Document for Page {
    fn resolve(&self, selector: &str) -> Option<Arc<dyn Element>> {
        self.elements
            .get(selector)
            .map(|e| Arc::clone(e) as Arc<dyn Element>)
    }
}

impl Navigator for Page {
    fn current_path(&self) -> String {
        self.location()
    }

    fn navigate(&self, path: &str) {
        *lock(&self.location) = path.to_string();
        *lock(&self.pending_navigation) = Some(path.to_string());

        let mut out = lock(&self.out);
        if let Err(e) = write!(out, "⇢ {path}{EOL}").and_then(|()| out.flush()) {
            tracing::warn!(path = %path, error = %e, "Failed to report navigation");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Persistence;
    use crate::tour::{Configuration, Tour};

    /// Writer whose contents stay readable after being shared
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn page(source: &str) -> (Arc<Page>, Capture) {
        let capture = Capture::default();
        let out: SharedWriter = Arc::new(Mutex::new(Box::new(capture.clone())));
        (Arc::new(Page::from_toml(source, out).unwrap()), capture)
    }

    const PAGE: &str = r##"
location = "/dashboard"

[[elements]]
id = "#sidebar"
label = "Sidebar"

[[elements]]
id = "#hidden"
visible = false

[[elements]]
id = "#billing"
label = "Billing"

[[steps]]
element = "#sidebar"
title = "Navigation"
content = "Everything lives here.\nUse it often."

[[steps]]
element = "#hidden"
title = "Never shown"

[[steps]]
element = "#missing"
title = "Also never shown"

[[steps]]
element = "#billing"
path = "/settings"
title = "Billing"
placement = "bottom"
end = true
"##;

    #[test]
    fn test_page_parses_elements_and_steps() {
        let (page, _) = page(PAGE);
        assert_eq!(page.location(), "/dashboard");
        assert_eq!(page.element("#sidebar").unwrap().label(), "Sidebar");
        assert_eq!(page.element("#hidden").unwrap().label(), "#hidden");

        let steps = page.steps();
        assert_eq!(steps.len(), 4);
        assert_eq!(
            steps[0].element.as_ref().and_then(ElementRef::selector),
            Some("#sidebar")
        );
        assert_eq!(steps[3].placement, Placement::Bottom);
        assert!(steps[3].end);
        assert!(steps[0].animation);
    }

    #[test]
    fn test_duplicate_element_is_rejected() {
        let capture = Capture::default();
        let out: SharedWriter = Arc::new(Mutex::new(Box::new(capture)));
        let result = Page::from_toml(
            "[[elements]]\nid = \"#a\"\n[[elements]]\nid = \"#a\"\n",
            out,
        );
        assert!(matches!(result, Err(PageError::DuplicateElement(id)) if id == "#a"));
    }

    #[test]
    fn test_invalid_toml_is_a_parse_error() {
        let capture = Capture::default();
        let out: SharedWriter = Arc::new(Mutex::new(Box::new(capture)));
        assert!(matches!(
            Page::from_toml("[[steps]\n", out),
            Err(PageError::Parse(_))
        ));
    }

    #[test]
    fn test_render_callout_lists_navigation() {
        let callout = Callout {
            step: 1,
            placement: Placement::Top,
            title: "Search".to_string(),
            content: "Find anything".to_string(),
            animation: true,
            has_prev: true,
            has_next: false,
        };
        let text = render_callout("Search bar", &callout);
        assert!(text.starts_with("┌─ Search ─ top of Search bar\r\n"));
        assert!(text.contains("│ Find anything\r\n"));
        assert!(text.ends_with("└─ ← prev · esc end tour\r\n"));
    }

    #[test]
    fn test_element_shown_later_joins_the_tour() {
        let (page, capture) = page(PAGE);
        let hidden = page.element("#hidden").unwrap();
        assert_eq!(hidden.id(), "#hidden");

        let mut tour = Tour::new(
            Configuration::new("page_reveal").persistence(Persistence::Memory),
        )
        .with_document(page.clone())
        .with_navigator(page.clone());
        for step in page.steps() {
            tour.add_step(step);
        }

        hidden.set_visible(true);
        tour.start(false);
        tour.next();

        assert!(hidden.is_shown());
        assert_eq!(tour.current(), 1);
        assert!(capture.text().contains("┌─ Never shown ─ right of #hidden\r\n"));
    }

    #[test]
    fn test_tour_walks_page_skipping_and_redirecting() {
        let (page, capture) = page(PAGE);
        let mut tour = Tour::new(Configuration::new("page_walk").persistence(Persistence::Memory))
            .with_document(page.clone())
            .with_navigator(page.clone());
        for step in page.steps() {
            tour.add_step(step);
        }

        tour.start(false);
        assert!(page.element("#sidebar").unwrap().is_shown());
        assert!(capture.text().contains("│ Use it often.\r\n"));

        // Hidden and missing elements are skipped; billing lives elsewhere.
        tour.next();
        assert_eq!(page.take_navigation().as_deref(), Some("/settings"));
        assert_eq!(tour.current(), 3);
        assert!(!tour.ended());

        // Arriving on the new page resumes the tour there.
        tour.start(false);
        assert!(page.element("#billing").unwrap().is_shown());
        assert!(tour.ended());
        assert!(capture.text().contains("⇢ /settings\r\n"));
    }
}
