//! Configuration-source provenance tracking
//!
//! Every overridable facet on the mutable model records where its value came
//! from. When two configurations compete, the higher source wins; convention
//! values may be silently replaced, explicit ones may not.

/// Provenance of a configured value, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigurationSource {
    /// Derived by the model-building conventions.
    Convention,
    /// Declared through a mapping attribute on the domain type.
    DataAnnotation,
    /// Configured explicitly by the user.
    Explicit,
}

impl ConfigurationSource {
    /// Whether a value from this source may replace one from `other`.
    pub fn overrides(self, other: Option<ConfigurationSource>) -> bool {
        match other {
            None => true,
            Some(existing) => self >= existing,
        }
    }

    /// The stronger of this source and an optional existing one.
    pub fn max(self, other: Option<ConfigurationSource>) -> ConfigurationSource {
        match other {
            Some(existing) if existing > self => existing,
            _ => self,
        }
    }

    /// Whether conflicting configuration from this source must fail instead of
    /// silently replacing what is already there. Convention-derived values are
    /// the only ones allowed to lose silently.
    pub fn is_strict(self) -> bool {
        self != ConfigurationSource::Convention
    }
}
