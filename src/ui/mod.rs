//! Terminal presentation layer.
//!
//! `card` draws one snapshot of store state; `terminal` owns the interactive
//! session that maps keys to controller calls and redraws on store changes.

pub mod card;
pub mod terminal;
