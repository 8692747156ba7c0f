//! Colorcard — a themed card whose colors can be swapped at runtime.
//!
//! The crate is built around a small theme synchronization core:
//! [`store::ThemeStore`] owns the current theme and the lifecycle of the most
//! recent asynchronous color fetch, and [`controller::ThemeController`]
//! turns user intents into store dispatches while talking to a
//! [`source::ColorSource`].
//!
//! # Quick start
//!
//! ```no_run
//! use colorcard::controller::ThemeController;
//! use colorcard::source::PresetColorSource;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let controller = ThemeController::bootstrap(Arc::new(PresetColorSource::builtin())).unwrap();
//! let _sub = controller.store().subscribe(|state| println!("{}", state.theme));
//! controller.request_random_theme().settled().await;
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod source;
pub mod store;
#[cfg(test)]
pub mod testsupport;
pub mod theme;
pub mod ui;
