//! Tour configuration and lifecycle hooks

use std::fmt;
use std::sync::Arc;

use super::Tour;
use crate::config::{Settings, StorageSettings};
use crate::store::Persistence;

/// Runs before a step is rendered; returning `false` vetoes the step
pub type ShowHook = Arc<dyn Fn(&Tour) -> bool + Send + Sync>;

/// Runs after a step is rendered, or before it is hidden
pub type TourHook = Arc<dyn Fn(&Tour) + Send + Sync>;

/// Observes state reads and writes with `(key, value)`
pub type StateObserver = Arc<dyn Fn(&str, Option<&str>) + Send + Sync>;

/// Name used when none is configured
pub const DEFAULT_TOUR_NAME: &str = "tour";

/// Options a tour is constructed with.
///
/// Tour-level hooks apply to every step that does not bring its own.
#[derive(Clone)]
pub struct Configuration {
    /// Namespace for persisted state keys
    pub name: String,
    pub persistence: Persistence,
    /// Where durable backends keep their files
    pub storage: StorageSettings,
    /// Arrow keys move between steps and Esc ends the tour
    pub keyboard: bool,
    pub after_get_state: Option<StateObserver>,
    pub after_set_state: Option<StateObserver>,
    pub on_show: Option<ShowHook>,
    pub on_hide: Option<TourHook>,
    pub on_shown: Option<TourHook>,
}

impl Configuration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn persistence(mut self, persistence: Persistence) -> Self {
        self.persistence = persistence;
        self
    }

    pub fn storage(mut self, storage: StorageSettings) -> Self {
        self.storage = storage;
        self
    }

    pub fn keyboard(mut self, keyboard: bool) -> Self {
        self.keyboard = keyboard;
        self
    }

    pub fn after_get_state(
        mut self,
        f: impl Fn(&str, Option<&str>) + Send + Sync + 'static,
    ) -> Self {
        self.after_get_state = Some(Arc::new(f));
        self
    }

    pub fn after_set_state(
        mut self,
        f: impl Fn(&str, Option<&str>) + Send + Sync + 'static,
    ) -> Self {
        self.after_set_state = Some(Arc::new(f));
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

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: DEFAULT_TOUR_NAME.to_string(),
            persistence: Persistence::default(),
            storage: StorageSettings::default(),
            keyboard: true,
            after_get_state: None,
            after_set_state: None,
            on_show: None,
            on_hide: None,
            on_shown: None,
        }
    }
}

impl From<&Settings> for Configuration {
    fn from(settings: &Settings) -> Self {
        Self {
            name: settings.tour.name.clone(),
            persistence: settings.tour.persistence,
            storage: settings.storage.clone(),
            keyboard: settings.tour.keyboard,
            ..Self::default()
        }
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("name", &self.name)
            .field("persistence", &self.persistence)
            .field("storage", &self.storage)
            .field("keyboard", &self.keyboard)
            .field("after_get_state", &self.after_get_state.is_some())
            .field("after_set_state", &self.after_set_state.is_some())
            .field("on_show", &self.on_show.is_some())
            .field("on_hide", &self.on_hide.is_some())
            .field("on_shown", &self.on_shown.is_some())
            .finish()
    }
}
