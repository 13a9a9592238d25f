// crates/mesh-suites-core/src/registry.rs
// ============================================================================
// Module: Suite Registry
// Description: Ordered, explicitly built list of named suite instances.
// Purpose: Replace implicit global test registration with explicit composition.
// Dependencies: thiserror, crate::{identifiers, suite}
// ============================================================================

//! ## Overview
//! A [`SuiteRegistry`] is built by a single entry point and handed to the
//! dispatcher. Names must be non-empty and unique; registration order is
//! preserved and becomes report order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::identifiers::SuiteName;
use crate::suite::RunnableSuite;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registration failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Suite names must contain a non-whitespace character.
    #[error("suite name must be non-empty")]
    EmptyName,
    /// Suite names must be unique within a run.
    #[error("suite {0} is already registered")]
    Duplicate(SuiteName),
}

/// Checks a candidate name against blank and duplicate rules.
pub(crate) fn validate_name<'a>(
    name: &SuiteName,
    mut existing: impl Iterator<Item = &'a SuiteName>,
) -> Result<(), RegistryError> {
    if name.is_blank() {
        return Err(RegistryError::EmptyName);
    }
    if existing.any(|other| other == name) {
        return Err(RegistryError::Duplicate(name.clone()));
    }
    Ok(())
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// A suite instance paired with its registered name.
pub(crate) struct RegisteredSuite {
    /// Registered name.
    pub(crate) name: SuiteName,
    /// Owned suite instance.
    pub(crate) suite: Box<dyn RunnableSuite>,
}

/// Ordered collection of named suites.
#[derive(Default)]
pub struct SuiteRegistry {
    /// Entries in registration order.
    entries: Vec<RegisteredSuite>,
}

impl SuiteRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a suite under a unique name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the name is blank or already taken.
    pub fn register<S>(
        &mut self,
        name: impl Into<SuiteName>,
        suite: S,
    ) -> Result<&mut Self, RegistryError>
    where
        S: RunnableSuite + 'static,
    {
        self.register_boxed(name, Box::new(suite))
    }

    /// Registers an already boxed suite under a unique name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the name is blank or already taken.
    pub fn register_boxed(
        &mut self,
        name: impl Into<SuiteName>,
        suite: Box<dyn RunnableSuite>,
    ) -> Result<&mut Self, RegistryError> {
        let name = name.into();
        validate_name(&name, self.entries.iter().map(|entry| &entry.name))?;
        self.entries.push(RegisteredSuite {
            name,
            suite,
        });
        Ok(self)
    }

    /// Builder form of [`SuiteRegistry::register`].
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] when the name is blank or already taken.
    pub fn with<S>(mut self, name: impl Into<SuiteName>, suite: S) -> Result<Self, RegistryError>
    where
        S: RunnableSuite + 'static,
    {
        self.register(name, suite)?;
        Ok(self)
    }

    /// Returns registered names in order.
    #[must_use]
    pub fn names(&self) -> Vec<&SuiteName> {
        self.entries.iter().map(|entry| &entry.name).collect()
    }

    /// Returns true when a suite with the given name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name.as_str() == name)
    }

    /// Number of registered suites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the registry, yielding entries in registration order.
    pub(crate) fn into_entries(self) -> Vec<RegisteredSuite> {
        self.entries
    }
}
