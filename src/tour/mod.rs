//! Tour controller.
//!
//! A [`Tour`] owns an ordered list of [`Step`]s and the index of the step it
//! believes is current. Showing a step runs its hooks, persists the index
//! and asks the step's element to render a callout. Steps whose element is
//! missing or hidden are skipped in the direction of travel.
//!
//! State is read from the [`StateStore`] on every query, so a tour picks up
//! changes made by another tour instance sharing the same store.

use std::collections::HashSet;
use std::sync::Arc;

use crossterm::event::KeyCode;

use crate::element::{Callout, Document, Element, Navigator};
use crate::store::{self, StateStore};

mod options;
mod step;

pub use options::{Configuration, ShowHook, StateObserver, TourHook, DEFAULT_TOUR_NAME};
pub use step::Step;


/// State key holding the current step index
pub const CURRENT_STEP_KEY: &str = "current_step";

/// State key marking the tour as ended
pub const END_KEY: &str = "end";

/// Value written under [`END_KEY`] by [`Tour::end`]
pub const END_MARKER: &str = "yes";

/// Where a tour stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourStatus {
    NotStarted,
    Showing(usize),
    Ended,
}

/// Direction used when skipping unshowable steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

pub struct Tour {
    options: Configuration,
    steps: Vec<Step>,
    current: isize,
    store: Box<dyn StateStore>,
    document: Option<Arc<dyn Document>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl Tour {
    /// Create a tour persisting through the backend its options select
    pub fn new(options: Configuration) -> Self {
        let store = store::open(options.persistence, &options.name, &options.storage);
        Self::with_store(options, store)
    }

    /// Create a tour persisting through an explicit store
    pub fn with_store(options: Configuration, store: Box<dyn StateStore>) -> Self {
        tracing::debug!(
            tour = %options.name,
            store = store.kind(),
            "Created tour"
        );
        Self {
            options,
            steps: Vec::new(),
            current: 0,
            store,
            document: None,
            navigator: None,
        }
    }

    /// Resolve selector-based steps through `document`
    pub fn with_document(mut self, document: Arc<dyn Document>) -> Self {
        self.document = Some(document);
        self
    }

    /// Redirect to a step's path through `navigator`
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn name(&self) -> &str {
        &self.options.name
    }

    pub fn options(&self) -> &Configuration {
        &self.options
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// In-memory current index; may be out of range
    pub fn current(&self) -> isize {
        self.current
    }

    /// Append a step and return the new step count
    pub fn add_step(&mut self, step: Step) -> usize {
        self.steps.push(step);
        self.steps.len()
    }

    pub fn get_step(&self, i: isize) -> Option<&Step> {
        usize::try_from(i).ok().and_then(|i| self.steps.get(i))
    }

    /// Set the current index and persist it, or with `None` reload it from
    /// persisted state (0 when absent or unreadable).
    pub fn set_current_step(&mut self, i: Option<isize>) {
        match i {
            Some(i) => {
                self.current = i;
                self.set_state(CURRENT_STEP_KEY, Some(&i.to_string()));
            }
            None => {
                self.current = match self.get_state(CURRENT_STEP_KEY) {
                    Some(value) => value.trim().parse().unwrap_or_else(|_| {
                        tracing::warn!(
                            tour = %self.options.name,
                            value = %value,
                            "Ignoring malformed current step"
                        );
                        0
                    }),
                    None => 0,
                };
            }
        }
    }

    /// Resume from the persisted step. An ended tour stays ended unless
    /// `force` is set.
    pub fn start(&mut self, force: bool) {
        if self.ended() && !force {
            tracing::debug!(tour = %self.options.name, "Tour already ended, not starting");
            return;
        }

        self.set_current_step(None);
        tracing::info!(tour = %self.options.name, step = self.current, "Starting tour");
        self.show_step(self.current);
    }

    /// Hide the current step and show the one after it
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        self.hide_step(self.current);
        self.show_next_step();
    }

    /// Hide the current step and show the one before it
    pub fn prev(&mut self) {
        self.hide_step(self.current);
        self.show_prev_step();
    }

    pub fn show_next_step(&mut self) {
        if let Some(target) = self.next_index(self.current) {
            self.show_towards(target, Direction::Forward);
        }
    }

    pub fn show_prev_step(&mut self) {
        if let Some(target) = self.prev_index(self.current) {
            self.show_towards(target, Direction::Backward);
        }
    }

    /// Show step `i`, skipping forward past steps that cannot be shown
    pub fn show_step(&mut self, i: isize) {
        self.show_towards(i, Direction::Forward);
    }

    /// Run the hide hook for step `i` and remove its callout
    pub fn hide_step(&mut self, i: isize) {
        let Some(step) = self.get_step(i) else {
            return;
        };
        let hook = step.on_hide.clone().or_else(|| self.options.on_hide.clone());
        let element = self.resolve_element(step);

        if let Some(hook) = hook {
            hook(&*self);
        }
        if let Some(element) = element {
            if element.is_shown() {
                element.hide();
            }
        }
        tracing::debug!(tour = %self.options.name, step = i, "Hid step");
    }

    /// Hide the current step and mark the tour ended
    pub fn end(&mut self) {
        self.hide_step(self.current);
        self.set_state(END_KEY, Some(END_MARKER));
        tracing::info!(tour = %self.options.name, step = self.current, "Tour ended");
    }

    pub fn ended(&self) -> bool {
        self.get_state(END_KEY).is_some()
    }

    /// Forget all progress and start from the first step
    pub fn restart(&mut self) {
        self.set_state(CURRENT_STEP_KEY, None);
        self.set_state(END_KEY, None);
        self.start(false);
    }

    pub fn get_state(&self, key: &str) -> Option<String> {
        let value = self.store.get(&self.namespaced(key));
        if let Some(observer) = &self.options.after_get_state {
            observer(key, value.as_deref());
        }
        value
    }

    pub fn set_state(&self, key: &str, value: Option<&str>) {
        self.store.set(&self.namespaced(key), value);
        if let Some(observer) = &self.options.after_set_state {
            observer(key, value);
        }
    }

    /// Route a key press to navigation. Returns whether it was handled.
    pub fn handle_key(&mut self, key: KeyCode) -> bool {
        if !self.options.keyboard {
            return false;
        }

        match key {
            KeyCode::Right => self.next(),
            KeyCode::Left => self.prev(),
            KeyCode::Esc => self.end(),
            _ => return false,
        }
        true
    }

    pub fn status(&self) -> TourStatus {
        if let Some(i) = self.shown_step() {
            TourStatus::Showing(i)
        } else if self.ended() {
            TourStatus::Ended
        } else {
            TourStatus::NotStarted
        }
    }

    /// Index of the current step if its callout is rendered
    fn shown_step(&self) -> Option<usize> {
        let step = self.get_step(self.current)?;
        let element = self.resolve_element(step)?;
        if element.is_shown() {
            usize::try_from(self.current).ok()
        } else {
            None
        }
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}_{}", self.options.name, key)
    }

    /// Index after `i`, `None` past the end of the index range
    fn next_index(&self, i: isize) -> Option<isize> {
        self.get_step(i)
            .and_then(|s| s.next)
            .or_else(|| i.checked_add(1))
    }

    /// Index before `i`, `None` past the start of the index range
    fn prev_index(&self, i: isize) -> Option<isize> {
        self.get_step(i)
            .and_then(|s| s.prev)
            .or_else(|| i.checked_sub(1))
    }

    fn in_bounds(&self, i: Option<isize>) -> bool {
        i.and_then(|i| self.get_step(i)).is_some()
    }

    fn resolve_element(&self, step: &Step) -> Option<Arc<dyn Element>> {
        step.element
            .as_ref()
            .and_then(|e| e.resolve(self.document.as_deref()))
    }

    /// Walk from `start` in `direction` until a step can be shown. Each index
    /// is tried at most once; running off either end shows nothing.
    fn show_towards(&mut self, start: isize, direction: Direction) {
        let mut tried = HashSet::new();
        let mut i = start;

        loop {
            let Some(step) = self.get_step(i) else {
                tracing::debug!(tour = %self.options.name, step = i, "No step to show");
                return;
            };
            if !tried.insert(i) {
                tracing::debug!(tour = %self.options.name, step = i, "Skip loop detected");
                return;
            }

            if let Some(path) = self.redirect_path(step) {
                self.set_current_step(Some(i));
                tracing::info!(
                    tour = %self.options.name,
                    step = i,
                    path = %path,
                    "Redirecting to step page"
                );
                if let Some(navigator) = &self.navigator {
                    navigator.navigate(&path);
                }
                return;
            }

            match self.resolve_element(step) {
                Some(element) if element.exists() && element.is_visible() => {
                    self.present(i, element);
                    return;
                }
                _ => {
                    tracing::debug!(
                        tour = %self.options.name,
                        step = i,
                        "Skipping unshowable step"
                    );
                    let next = match direction {
                        Direction::Forward => self.next_index(i),
                        Direction::Backward => self.prev_index(i),
                    };
                    let Some(next) = next else {
                        return;
                    };
                    i = next;
                }
            }
        }
    }

    /// The step's path when a navigator is present and elsewhere
    fn redirect_path(&self, step: &Step) -> Option<String> {
        let path = step.path.as_deref().filter(|p| !p.is_empty())?;
        let navigator = self.navigator.as_ref()?;
        let location = navigator.current_path();
        let file_name = location.rsplit(['/', '\\']).next().unwrap_or_default();

        if location == path || file_name == path {
            None
        } else {
            Some(path.to_string())
        }
    }

    fn present(&mut self, i: isize, element: Arc<dyn Element>) {
        let Some(step) = self.get_step(i) else {
            return;
        };
        let on_show = step.on_show.clone().or_else(|| self.options.on_show.clone());
        let on_shown = step.on_shown.clone().or_else(|| self.options.on_shown.clone());
        let ends_tour = step.end;

        if let Some(hook) = on_show {
            if !hook(&*self) {
                tracing::debug!(tour = %self.options.name, step = i, "Step vetoed by on_show");
                return;
            }
        }

        self.set_current_step(Some(i));
        if ends_tour {
            self.set_state(END_KEY, Some(END_MARKER));
        }

        let callout = self.callout_for(i);
        element.show(&callout);
        tracing::debug!(tour = %self.options.name, step = i, "Showed step");

        if let Some(hook) = on_shown {
            hook(&*self);
        }
    }

    fn callout_for(&self, i: isize) -> Callout {
        let step = &self.steps[i as usize];
        Callout {
            step: i as usize,
            placement: step.placement,
            title: step.title.clone(),
            content: step.content.clone(),
            animation: step.animation,
            has_prev: self.in_bounds(self.prev_index(i)),
            has_next: self.in_bounds(self.next_index(i)),
        }
    }
}
