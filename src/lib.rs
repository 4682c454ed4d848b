//! Tourguide - guided tours with resumable, persisted step state
//!
//! A [`Tour`] walks a user through a sequence of UI elements, showing a
//! callout next to each one. Progress is persisted through a pluggable
//! [`StateStore`] so a tour resumes where it left off and stays finished once
//! ended.

pub mod config;
pub mod element;
pub mod error;
pub mod logging;
pub mod page;
pub mod store;
pub mod tour;

pub use element::{Callout, Document, Element, ElementRef, Navigator, Placement};
pub use store::{Persistence, StateStore};
pub use tour::{Configuration, Step, Tour, TourStatus};
