//! # Built-in Locales
//!
//! Ready-made [`LocaleTable`]s. None is installed by default; callers opt in
//! with [`crate::configure_locale`] or pass one per parse.

pub mod en;

use crate::locale::LocaleTable;

pub use en::en;

/// Look up a built-in locale by name (case-insensitive).
pub fn builtin(name: &str) -> Option<LocaleTable> {
    match name.to_ascii_lowercase().as_str() {
        "en" | "en-us" | "en_us" | "english" => Some(en()),
        _ => None,
    }
}
