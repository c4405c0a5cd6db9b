//! Terminal input handling

pub mod keys;

pub use keys::{UiAction, map_key};
