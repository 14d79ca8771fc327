//! Build context: the flat variable scope every template renders against

use std::collections::BTreeMap;
use std::fmt;

/// A context value. Templates only ever see the rendered string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextValue {
    Text(String),
    Flag(bool),
    List(Vec<String>),
}

impl fmt::Display for ContextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextValue::Text(s) => write!(f, "{}", s),
            // Rendered the way the generated Python code expects
            ContextValue::Flag(true) => write!(f, "True"),
            ContextValue::Flag(false) => write!(f, "False"),
            ContextValue::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        ContextValue::Text(s.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        ContextValue::Text(s)
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> Self {
        ContextValue::Flag(b)
    }
}

impl From<Vec<String>> for ContextValue {
    fn from(items: Vec<String>) -> Self {
        ContextValue::List(items)
    }
}

/// Per-folder decision of whether the folder becomes an importable package
pub type InitStrategy = BTreeMap<String, bool>;

/// Template variables for one build, plus the folder init strategy.
///
/// Owned by a single build and never shared across builds.
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    vars: BTreeMap<String, ContextValue>,
    init_strategy: InitStrategy,
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Insert only when the key is absent, so explicit request values win over defaults
    pub fn insert_default(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.vars.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.vars.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// String form of a value, if present
    pub fn text(&self, key: &str) -> Option<String> {
        self.vars.get(key).map(|v| v.to_string())
    }

    /// Truthiness of a value: flags as-is, text tokens like `"true"`/`"yes"`/`"1"`
    pub fn flag(&self, key: &str) -> bool {
        match self.vars.get(key) {
            Some(ContextValue::Flag(b)) => *b,
            Some(ContextValue::Text(s)) => {
                matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "y" | "1")
            }
            Some(ContextValue::List(items)) => !items.is_empty(),
            None => false,
        }
    }

    pub fn list(&self, key: &str) -> Vec<String> {
        match self.vars.get(key) {
            Some(ContextValue::List(items)) => items.clone(),
            Some(ContextValue::Text(s)) if !s.trim().is_empty() => s
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ContextValue)> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn init_strategy(&self) -> &InitStrategy {
        &self.init_strategy
    }

    pub fn set_init_strategy(&mut self, strategy: InitStrategy) {
        self.init_strategy = strategy;
    }

    /// Mark a folder as a package unless the strategy already decides it
    pub fn default_init(&mut self, folder: &str, package: bool) {
        self.init_strategy
            .entry(folder.to_string())
            .or_insert(package);
    }
}
