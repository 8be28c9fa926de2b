// crates/privilege-gate-core/src/core/catalog.rs
// ============================================================================
// Module: Resource Catalog View
// Description: Immutable snapshot of indices, aliases, and data streams.
// Purpose: Answer topology lookups for resolution and authorization.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The catalog is a point-in-time view of cluster resource topology built from
//! a [`CatalogSnapshot`]. Construction validates the topology and fails
//! closed; after that every lookup is a read against immutable maps.
//!
//! Invariants:
//! - Names are unique across indices, aliases, data streams, and backing indices.
//! - Data-stream backing indices are listed as hidden indices.
//! - Failure-store backing indices are never listed and never resolvable by name;
//!   they are only reachable through [`ResourceCatalog::backing_indices_of_data_stream`]
//!   with [`Component::Failures`].
//!
//! Security posture: snapshots come from the metadata provider and are
//! validated before use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Resource Types
// ============================================================================

/// Kind of a named resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Concrete index.
    Index,
    /// Alias over indices or data streams.
    Alias,
    /// Data stream with rolling backing indices.
    DataStream,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Index => "index",
            Self::Alias => "alias",
            Self::DataStream => "data_stream",
        };
        f.write_str(label)
    }
}

/// Sub-structure of a data stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    /// Main data backing indices.
    Data,
    /// Failure-store backing indices.
    Failures,
}

/// Listed resource as returned by [`ResourceCatalog::list_all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource name.
    pub name: String,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Hidden from open wildcard expansion.
    pub hidden: bool,
    /// System resource.
    pub system: bool,
}

/// Declared index metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    /// Index name.
    pub name: String,
    /// Hidden flag.
    #[serde(default)]
    pub hidden: bool,
    /// System flag.
    #[serde(default)]
    pub system: bool,
}

impl IndexMeta {
    /// Creates visible, non-system index metadata.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hidden: false,
            system: false,
        }
    }

    /// Marks the index hidden.
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Marks the index as a system index.
    #[must_use]
    pub const fn system(mut self) -> Self {
        self.system = true;
        self
    }
}

/// Declared alias metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasMeta {
    /// Alias name.
    pub name: String,
    /// Ordered member names (indices or data streams).
    pub members: Vec<String>,
    /// Designated write member.
    #[serde(default)]
    pub write_index: Option<String>,
    /// Hidden flag.
    #[serde(default)]
    pub hidden: bool,
}

impl AliasMeta {
    /// Creates alias metadata without a write member.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
            write_index: None,
            hidden: false,
        }
    }

    /// Designates the write member.
    #[must_use]
    pub fn with_write_index(mut self, member: impl Into<String>) -> Self {
        self.write_index = Some(member.into());
        self
    }

    /// Marks the alias hidden.
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// Declared data stream metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataStreamMeta {
    /// Data stream name.
    pub name: String,
    /// Main backing indices, oldest first; the last one is the write target.
    pub backing_indices: Vec<String>,
    /// Failure-store backing indices, oldest first.
    #[serde(default)]
    pub failure_indices: Vec<String>,
    /// Hidden flag.
    #[serde(default)]
    pub hidden: bool,
    /// System flag.
    #[serde(default)]
    pub system: bool,
}

impl DataStreamMeta {
    /// Creates data stream metadata without a failure store.
    #[must_use]
    pub fn new<I, S>(name: impl Into<String>, backing_indices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            backing_indices: backing_indices.into_iter().map(Into::into).collect(),
            failure_indices: Vec::new(),
            hidden: false,
            system: false,
        }
    }

    /// Sets the failure-store backing indices.
    #[must_use]
    pub fn with_failure_indices<I, S>(mut self, failure_indices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failure_indices = failure_indices.into_iter().map(Into::into).collect();
        self
    }

    /// Marks the data stream hidden.
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Marks the data stream as a system data stream.
    #[must_use]
    pub const fn system(mut self) -> Self {
        self.system = true;
        self
    }
}

/// Direct alias member with its write flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasMember<'a> {
    /// Member name.
    pub name: &'a str,
    /// Member kind (index or data stream).
    pub kind: ResourceKind,
    /// True when this member is the designated write member.
    pub is_write_index: bool,
}

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// Serializable catalog snapshot supplied by the metadata provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// Declared indices (not backing indices).
    #[serde(default)]
    pub indices: Vec<IndexMeta>,
    /// Declared aliases.
    #[serde(default)]
    pub aliases: Vec<AliasMeta>,
    /// Declared data streams.
    #[serde(default)]
    pub data_streams: Vec<DataStreamMeta>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while validating a catalog snapshot.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A resource name was empty.
    #[error("resource names must not be empty")]
    EmptyName,
    /// A name was declared more than once.
    #[error("duplicate resource name: {0}")]
    DuplicateName(String),
    /// An alias references a member that is neither an index nor a data stream.
    #[error("alias {alias} references unknown member {member}")]
    UnknownAliasMember {
        /// Alias name.
        alias: String,
        /// Missing member name.
        member: String,
    },
    /// An alias references another alias.
    #[error("alias {alias} cannot contain alias {member}")]
    NestedAlias {
        /// Alias name.
        alias: String,
        /// Nested alias name.
        member: String,
    },
    /// An alias names a write member outside its member list.
    #[error("alias {alias} write index {write_index} is not a member")]
    WriteIndexNotMember {
        /// Alias name.
        alias: String,
        /// Declared write member.
        write_index: String,
    },
    /// A data stream was declared without backing indices.
    #[error("data stream {0} has no backing indices")]
    EmptyDataStream(String),
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Immutable, validated catalog view.
///
/// # Invariants
/// - All maps are keyed by unique resource names.
/// - `data_parent` covers exactly the main backing indices.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    /// Listable resources keyed by name.
    resources: BTreeMap<String, Resource>,
    /// Alias metadata keyed by alias name.
    aliases: BTreeMap<String, AliasMeta>,
    /// Data stream metadata keyed by stream name.
    data_streams: BTreeMap<String, DataStreamMeta>,
    /// Owning data stream of each main backing index.
    data_parent: BTreeMap<String, String>,
    /// Aliases that directly contain each member, in alias-name order.
    member_aliases: BTreeMap<String, Vec<String>>,
}

impl ResourceCatalog {
    /// Returns a builder for incremental construction.
    #[must_use]
    pub fn builder() -> ResourceCatalogBuilder {
        ResourceCatalogBuilder::default()
    }

    /// Validates a snapshot and builds the catalog view.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the topology is inconsistent.
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        let mut seen = BTreeSet::new();
        let mut claim = |name: &str| -> Result<(), CatalogError> {
            if name.is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if !seen.insert(name.to_string()) {
                return Err(CatalogError::DuplicateName(name.to_string()));
            }
            Ok(())
        };

        for index in &snapshot.indices {
            claim(index.name.as_str())?;
        }
        for stream in &snapshot.data_streams {
            claim(stream.name.as_str())?;
            if stream.backing_indices.is_empty() {
                return Err(CatalogError::EmptyDataStream(stream.name.clone()));
            }
            for backing in stream.backing_indices.iter().chain(&stream.failure_indices) {
                claim(backing.as_str())?;
            }
        }
        for alias in &snapshot.aliases {
            claim(alias.name.as_str())?;
        }

        for index in snapshot.indices {
            catalog.resources.insert(
                index.name.clone(),
                Resource {
                    name: index.name,
                    kind: ResourceKind::Index,
                    hidden: index.hidden,
                    system: index.system,
                },
            );
        }
        for stream in snapshot.data_streams {
            for backing in &stream.backing_indices {
                catalog.resources.insert(
                    backing.clone(),
                    Resource {
                        name: backing.clone(),
                        kind: ResourceKind::Index,
                        hidden: true,
                        system: stream.system,
                    },
                );
                catalog.data_parent.insert(backing.clone(), stream.name.clone());
            }
            catalog.resources.insert(
                stream.name.clone(),
                Resource {
                    name: stream.name.clone(),
                    kind: ResourceKind::DataStream,
                    hidden: stream.hidden,
                    system: stream.system,
                },
            );
            catalog.data_streams.insert(stream.name.clone(), stream);
        }

        let alias_names: BTreeSet<&str> =
            snapshot.aliases.iter().map(|alias| alias.name.as_str()).collect();
        for alias in &snapshot.aliases {
            for member in &alias.members {
                if alias_names.contains(member.as_str()) {
                    return Err(CatalogError::NestedAlias {
                        alias: alias.name.clone(),
                        member: member.clone(),
                    });
                }
                let known = catalog.data_streams.contains_key(member)
                    || catalog
                        .resources
                        .get(member)
                        .is_some_and(|resource| resource.kind == ResourceKind::Index);
                if !known {
                    return Err(CatalogError::UnknownAliasMember {
                        alias: alias.name.clone(),
                        member: member.clone(),
                    });
                }
            }
            if let Some(write_index) = &alias.write_index
                && !alias.members.contains(write_index)
            {
                return Err(CatalogError::WriteIndexNotMember {
                    alias: alias.name.clone(),
                    write_index: write_index.clone(),
                });
            }
        }

        for alias in snapshot.aliases {
            for member in &alias.members {
                let entry = catalog.member_aliases.entry(member.clone()).or_default();
                if !entry.contains(&alias.name) {
                    entry.push(alias.name.clone());
                }
            }
            catalog.resources.insert(
                alias.name.clone(),
                Resource {
                    name: alias.name.clone(),
                    kind: ResourceKind::Alias,
                    hidden: alias.hidden,
                    system: false,
                },
            );
            catalog.aliases.insert(alias.name.clone(), alias);
        }
        for aliases in catalog.member_aliases.values_mut() {
            aliases.sort();
        }
        Ok(catalog)
    }

    /// Lists every addressable resource in name order.
    pub fn list_all(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Returns the listed resource named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    /// Returns alias metadata.
    #[must_use]
    pub fn alias(&self, name: &str) -> Option<&AliasMeta> {
        self.aliases.get(name)
    }

    /// Returns data stream metadata.
    #[must_use]
    pub fn data_stream(&self, name: &str) -> Option<&DataStreamMeta> {
        self.data_streams.get(name)
    }

    /// Returns the direct members of an alias with the write member flagged.
    #[must_use]
    pub fn members_of_alias(&self, name: &str) -> Vec<AliasMember<'_>> {
        let Some(alias) = self.aliases.get(name) else {
            return Vec::new();
        };
        alias
            .members
            .iter()
            .map(|member| AliasMember {
                name: member,
                kind: if self.data_streams.contains_key(member) {
                    ResourceKind::DataStream
                } else {
                    ResourceKind::Index
                },
                is_write_index: alias.write_index.as_deref() == Some(member.as_str()),
            })
            .collect()
    }

    /// Returns true when an alias contains at least one data stream.
    #[must_use]
    pub fn alias_has_data_streams(&self, name: &str) -> bool {
        self.aliases
            .get(name)
            .is_some_and(|alias| alias.members.iter().any(|m| self.data_streams.contains_key(m)))
    }

    /// Returns the backing indices of a data stream for one component.
    #[must_use]
    pub fn backing_indices_of_data_stream(&self, name: &str, component: Component) -> &[String] {
        match (self.data_streams.get(name), component) {
            (Some(stream), Component::Data) => &stream.backing_indices,
            (Some(stream), Component::Failures) => &stream.failure_indices,
            (None, _) => &[],
        }
    }

    /// Returns true when the named resource is hidden.
    #[must_use]
    pub fn is_hidden(&self, name: &str) -> bool {
        self.resources.get(name).is_some_and(|resource| resource.hidden)
    }

    /// Returns true when the named resource is a system resource.
    #[must_use]
    pub fn is_system(&self, name: &str) -> bool {
        self.resources.get(name).is_some_and(|resource| resource.system)
    }

    /// Returns the aliases that directly contain an index or data stream.
    #[must_use]
    pub fn aliases_of(&self, name: &str) -> &[String] {
        self.member_aliases.get(name).map_or(&[], Vec::as_slice)
    }

    /// Returns the data stream owning a main backing index.
    #[must_use]
    pub fn parent_data_stream(&self, index: &str) -> Option<&str> {
        self.data_parent.get(index).map(String::as_str)
    }

    /// Returns every alias containing `index` directly or through its data stream.
    #[must_use]
    pub fn ancestor_aliases(&self, index: &str) -> Vec<String> {
        let mut aliases: BTreeSet<String> = self.aliases_of(index).iter().cloned().collect();
        if let Some(stream) = self.parent_data_stream(index) {
            aliases.extend(self.aliases_of(stream).iter().cloned());
        }
        aliases.into_iter().collect()
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Incremental catalog builder.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalogBuilder {
    /// Snapshot under construction.
    snapshot: CatalogSnapshot,
}

impl ResourceCatalogBuilder {
    /// Adds an index.
    #[must_use]
    pub fn index(mut self, index: IndexMeta) -> Self {
        self.snapshot.indices.push(index);
        self
    }

    /// Adds an alias.
    #[must_use]
    pub fn alias(mut self, alias: AliasMeta) -> Self {
        self.snapshot.aliases.push(alias);
        self
    }

    /// Adds a data stream.
    #[must_use]
    pub fn data_stream(mut self, stream: DataStreamMeta) -> Self {
        self.snapshot.data_streams.push(stream);
        self
    }

    /// Validates and builds the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when the topology is inconsistent.
    pub fn build(self) -> Result<ResourceCatalog, CatalogError> {
        ResourceCatalog::from_snapshot(self.snapshot)
    }
}
