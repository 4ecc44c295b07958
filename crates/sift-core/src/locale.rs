//! # Locale Tables & Message Formatting
//!
//! Maps issue codes to human-readable text without baking any language
//! into the engine.
//!
//! ## Resolution Order
//!
//! For each issue the formatter uses, in order:
//!
//! 1. the message supplied by the schema author on the failing check;
//! 2. the renderer registered for the issue's code in the explicitly passed
//!    table (per-parse override), else in the process-wide table;
//! 3. [`FALLBACK_MESSAGE`].
//!
//! With no locale installed every issue renders to the fallback regardless
//! of code or parameters.
//!
//! ## Global State
//!
//! The process-wide table is a single `RwLock` slot. [`configure_locale`]
//! replaces it, [`reset_locale`] empties it. Nothing is reverted
//! automatically. The table is read when issues are rendered at the end of
//! a parse, not when schemas are constructed.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::issue::{Issue, IssueCode, IssueDetail};
use crate::locales;

/// Text used for every issue when no renderer applies.
pub const FALLBACK_MESSAGE: &str = "Invalid input";

/// Environment variable naming a built-in locale to install.
pub const LOCALE_ENV_VAR: &str = "SIFT_LOCALE";

/// Renders one issue into text.
pub type MessageRenderer = Arc<dyn Fn(&Issue) -> String + Send + Sync>;

/// Mapping from issue code to message renderer.
#[derive(Clone)]
pub struct LocaleTable {
    name: String,
    renderers: HashMap<IssueCode, MessageRenderer>,
}

impl fmt::Debug for LocaleTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<&IssueCode> = self.renderers.keys().collect();
        codes.sort();
        f.debug_struct("LocaleTable")
            .field("name", &self.name)
            .field("codes", &codes)
            .finish()
    }
}

impl LocaleTable {
    /// An empty table. Every code renders to the fallback until a renderer
    /// is registered for it.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            renderers: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register (or replace) the renderer for `code`.
    pub fn insert<F>(&mut self, code: IssueCode, renderer: F)
    where
        F: Fn(&Issue) -> String + Send + Sync + 'static,
    {
        self.renderers.insert(code, Arc::new(renderer));
    }

    /// Builder form of [`LocaleTable::insert`].
    pub fn with_renderer<F>(mut self, code: IssueCode, renderer: F) -> Self
    where
        F: Fn(&Issue) -> String + Send + Sync + 'static,
    {
        self.insert(code, renderer);
        self
    }

    pub fn covers(&self, code: IssueCode) -> bool {
        self.renderers.contains_key(&code)
    }

    /// Render `issue` with this table, ignoring any author-supplied message.
    pub fn render(&self, issue: &Issue) -> String {
        match self.renderers.get(&issue.code()) {
            Some(renderer) => renderer(issue),
            None => FALLBACK_MESSAGE.to_string(),
        }
    }
}

static ACTIVE_LOCALE: RwLock<Option<Arc<LocaleTable>>> = parking_lot::const_rwlock(None);

/// Install `table` as the process-wide locale, returning the previous one.
pub fn configure_locale(table: LocaleTable) -> Option<Arc<LocaleTable>> {
    let table = Arc::new(table);
    let previous = ACTIVE_LOCALE.write().replace(table.clone());
    if let Some(prev) = &previous {
        tracing::warn!(
            previous = prev.name(),
            next = table.name(),
            "replacing installed locale"
        );
    } else {
        tracing::debug!(locale = table.name(), "locale installed");
    }
    previous
}

/// Uninstall the process-wide locale, returning it.
pub fn reset_locale() -> Option<Arc<LocaleTable>> {
    ACTIVE_LOCALE.write().take()
}

/// The currently installed process-wide locale, if any.
pub fn current_locale() -> Option<Arc<LocaleTable>> {
    ACTIVE_LOCALE.read().clone()
}

/// Install the built-in locale named by `SIFT_LOCALE`.
///
/// Returns the installed locale name. An unset or empty variable leaves
/// the current state untouched; an unknown name is logged and ignored.
pub fn configure_locale_from_env() -> Option<String> {
    let requested = std::env::var(LOCALE_ENV_VAR).ok()?;
    let requested = requested.trim();
    if requested.is_empty() {
        return None;
    }
    match locales::builtin(requested) {
        Some(table) => {
            let name = table.name().to_string();
            configure_locale(table);
            Some(name)
        }
        None => {
            tracing::warn!(
                locale = requested,
                "{LOCALE_ENV_VAR} names no built-in locale, keeping current locale"
            );
            None
        }
    }
}

/// Render one issue's message using `locale`, falling back to the installed
/// table when `locale` is `None`.
pub fn render_message(issue: &Issue, locale: Option<&LocaleTable>) -> String {
    if let Some(message) = &issue.custom_message {
        return message.clone();
    }
    match locale {
        Some(table) => table.render(issue),
        None => match current_locale() {
            Some(table) => table.render(issue),
            None => FALLBACK_MESSAGE.to_string(),
        },
    }
}

/// Fill in the message of every issue, including union sub-issues.
///
/// The table is resolved once per call: an explicit `locale` wins, else
/// the table installed at the time of this call.
pub fn render_issues(issues: &mut [Issue], locale: Option<&LocaleTable>) {
    let installed;
    let table = match locale {
        Some(table) => Some(table),
        None => {
            installed = current_locale();
            installed.as_deref()
        }
    };
    render_with(issues, table);
}

fn render_with(issues: &mut [Issue], table: Option<&LocaleTable>) {
    for issue in issues.iter_mut() {
        if let IssueDetail::InvalidUnion { errors } = &mut issue.detail {
            for branch in errors.iter_mut() {
                render_with(branch, table);
            }
        }
        let message = match (&issue.custom_message, table) {
            (Some(message), _) => message.clone(),
            (None, Some(table)) => table.render(issue),
            (None, None) => FALLBACK_MESSAGE.to_string(),
        };
        issue.message = Some(message);
    }
}
