//! Checking named values against definitions.

use crate::cache::{Compiled, DefinitionCache};
use crate::describe::describe;
use contour_core::{DefinitionError, MatchError, MatchResult};
use contour_match::{Introspector, Matcher, TypeRegistry};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name used for values checked by [`Checker::ensure`]
pub const RETURN_VALUE: &str = "value";

/// Check error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    /// A definition failed to compile
    #[error(transparent)]
    Definition(#[from] DefinitionError),
    /// Matching failed
    #[error(transparent)]
    Match(#[from] MatchError),
    /// No value is bound to a checked name
    #[error("Argument '{name}' is not defined.")]
    UnknownBinding {
        /// Checked name
        name: String,
    },
    /// A value does not match its definition
    #[error("{}", mismatch_message(.name, .actual, .expected))]
    Mismatch {
        /// Checked name
        name: String,
        /// Description of the value's type
        actual: String,
        /// Definition it was checked against
        expected: String,
    },
}

fn mismatch_message(name: &str, actual: &str, expected: &str) -> String {
    if expected.trim_start().starts_with('#') {
        format!("Object '{}' does not respond to {}.", name, expected)
    } else {
        format!("Object '{}' is {} but expected {}.", name, actual, expected)
    }
}

/// Check configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Return mismatching names instead of failing on the first one
    pub collect_invalids: bool,
}

impl CheckConfig {
    /// Create the default (strict) configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether mismatches are collected
    #[must_use]
    pub fn with_collect_invalids(mut self, collect_invalids: bool) -> Self {
        self.collect_invalids = collect_invalids;
        self
    }
}

/// Checks values against definitions, compiling through a cache
pub struct Checker<'h, V> {
    cache: &'h DefinitionCache,
    matcher: Matcher<'h, V>,
    introspector: &'h dyn Introspector<V>,
    config: CheckConfig,
}

impl<'h, V> Checker<'h, V> {
    /// Create a strict checker over the process-wide cache
    #[must_use]
    pub fn new(registry: &'h dyn TypeRegistry<V>, introspector: &'h dyn Introspector<V>) -> Self {
        Self {
            cache: DefinitionCache::global(),
            matcher: Matcher::new(registry, introspector),
            introspector,
            config: CheckConfig::default(),
        }
    }

    /// Use a specific cache
    #[must_use]
    pub fn with_cache(mut self, cache: &'h DefinitionCache) -> Self {
        self.cache = cache;
        self
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: CheckConfig) -> Self {
        self.config = config;
        self
    }

    /// Check bound values against `(name, definition)` pairs in order
    ///
    /// Returns the names whose values do not match. In strict mode that
    /// list is always empty, since the first mismatch is an error.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::UnknownBinding`] for a name with no value,
    /// a definition or match error, or in strict mode
    /// [`CheckError::Mismatch`] for the first mismatch
    pub fn check(
        &self,
        bindings: &IndexMap<String, V>,
        checks: &[(&str, &str)],
    ) -> Result<Vec<String>, CheckError> {
        self.run(bindings, checks, self.config.collect_invalids)
    }

    /// [`Checker::check`] collecting every mismatching name
    ///
    /// # Errors
    ///
    /// Returns error for unknown names, bad definitions or unknown types
    pub fn review(
        &self,
        bindings: &IndexMap<String, V>,
        checks: &[(&str, &str)],
    ) -> Result<Vec<String>, CheckError> {
        self.run(bindings, checks, true)
    }

    /// Pass `value` through if it matches `definition`
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Mismatch`] naming the value `value` if it does
    /// not match, or a definition or match error
    pub fn ensure(&self, value: V, definition: &str) -> Result<V, CheckError> {
        if self.is_match(definition, &value)? {
            Ok(value)
        } else {
            Err(self.mismatch(RETURN_VALUE, &value, definition))
        }
    }

    /// Whether `value` matches `definition`
    ///
    /// # Errors
    ///
    /// Returns error if the definition does not compile or names an
    /// unknown type
    pub fn is_match(&self, definition: &str, value: &V) -> Result<bool, CheckError> {
        let expr = self.cache.get_or_compile(definition)?;
        Ok(self.matcher.matches(&expr, value)?)
    }

    fn run(
        &self,
        bindings: &IndexMap<String, V>,
        checks: &[(&str, &str)],
        collect_invalids: bool,
    ) -> Result<Vec<String>, CheckError> {
        let mut invalids = Vec::new();
        for &(name, definition) in checks {
            let value = bindings
                .get(name)
                .ok_or_else(|| CheckError::UnknownBinding {
                    name: name.to_string(),
                })?;
            if self.is_match(definition, value)? {
                continue;
            }

            tracing::debug!(name, expected = definition, "value does not match definition");
            if !collect_invalids {
                return Err(self.mismatch(name, value, definition));
            }
            invalids.push(name.to_string());
        }
        Ok(invalids)
    }

    fn mismatch(&self, name: &str, value: &V, definition: &str) -> CheckError {
        CheckError::Mismatch {
            name: name.to_string(),
            actual: describe(value, self.introspector),
            expected: definition.to_string(),
        }
    }
}

/// Compile `definition` through the process-wide cache and match `value`
///
/// # Errors
///
/// Returns [`MatchError::Definition`] if the definition does not compile,
/// or [`MatchError::UnknownType`] for an unknown type name
pub fn matches_definition<V>(
    definition: &str,
    value: &V,
    registry: &dyn TypeRegistry<V>,
    introspector: &dyn Introspector<V>,
) -> MatchResult<bool> {
    let compiled: Compiled = DefinitionCache::global().get_or_compile(definition);
    let expr = compiled?;
    Matcher::new(registry, introspector).matches(&expr, value)
}
