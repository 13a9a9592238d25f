// crates/mesh-suites-cli/src/catalog.rs
// ============================================================================
// Module: Suite Catalog
// Description: Compiled-in suite groups and their registry construction.
// Purpose: Provide the fixed list of named suites handed to the dispatcher.
// Dependencies: clap, mesh-suites-core, mesh-suites-script
// ============================================================================

//! ## Overview
//! The catalog is the single place that names the suites this binary runs.
//! Each entry pairs a suite name with the manifest file that supplies its
//! steps. Groups mirror the two test entry points of the mesh deployment:
//! single-cluster suites and interdomain suites.

// ============================================================================
// SECTION: Imports
// ============================================================================

use clap::ValueEnum;
use mesh_suites_core::RegistryError;
use mesh_suites_core::SuiteRegistry;
use mesh_suites_script::ScriptOptions;
use mesh_suites_script::ScriptSuite;

// ============================================================================
// SECTION: Entries
// ============================================================================

/// One compiled-in suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Registered suite name.
    pub name: &'static str,
    /// Manifest file name under the suites directory.
    pub manifest: &'static str,
}

impl CatalogEntry {
    /// Creates an entry.
    const fn new(name: &'static str, manifest: &'static str) -> Self {
        Self {
            name,
            manifest,
        }
    }
}

/// Suites run against a single cluster, in registration order.
pub const SINGLE_CLUSTER: &[CatalogEntry] = &[
    CatalogEntry::new("heal", "heal.toml"),
    CatalogEntry::new("features", "features.toml"),
    CatalogEntry::new("basic", "basic.toml"),
    CatalogEntry::new("memory", "memory.toml"),
    CatalogEntry::new("remotevlan", "remotevlan.toml"),
    CatalogEntry::new("observability", "observability.toml"),
    CatalogEntry::new("k8s_monolith", "k8s_monolith.toml"),
];

/// Suites spanning multiple clusters, in registration order.
pub const INTERDOMAIN: &[CatalogEntry] = &[
    CatalogEntry::new("floating_interdomain", "floating_interdomain.toml"),
    CatalogEntry::new("interdomain", "interdomain.toml"),
];

// ============================================================================
// SECTION: Groups
// ============================================================================

/// Named group of compiled-in suites.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SuiteGroup {
    /// Single-cluster suites.
    SingleCluster,
    /// Interdomain suites.
    Interdomain,
    /// Single-cluster suites followed by interdomain suites.
    #[default]
    All,
}

impl SuiteGroup {
    /// Returns the group label used on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SingleCluster => "single-cluster",
            Self::Interdomain => "interdomain",
            Self::All => "all",
        }
    }

    /// Returns the group's entries in registration order.
    #[must_use]
    pub fn entries(self) -> Vec<CatalogEntry> {
        match self {
            Self::SingleCluster => SINGLE_CLUSTER.to_vec(),
            Self::Interdomain => INTERDOMAIN.to_vec(),
            Self::All => SINGLE_CLUSTER.iter().chain(INTERDOMAIN).copied().collect(),
        }
    }

    /// Returns the group's suite names in registration order.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        self.entries().into_iter().map(|entry| entry.name).collect()
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Builds a registry of scripted suites for a group.
///
/// # Errors
///
/// Returns [`RegistryError`] if the catalog contains a blank or duplicate
/// name.
pub fn build_registry(
    group: SuiteGroup,
    options: &ScriptOptions,
) -> Result<SuiteRegistry, RegistryError> {
    let mut registry = SuiteRegistry::new();
    for entry in group.entries() {
        let manifest = options.suites_dir.join(entry.manifest);
        registry.register(entry.name, ScriptSuite::with_manifest_path(manifest, options))?;
    }
    Ok(registry)
}
