//! Persistence adapter: definition ⇄ relational rows, and the edit protocol.
//!
//! The store itself is an external collaborator behind `DefinitionStore`.
//! Every write carries the revision number it was decided against; a store
//! that has moved on answers with a retryable `StoreError::Conflict`.

pub mod memory;
pub mod rows;

pub use memory::MemoryStore;
pub use rows::{from_row, to_row, DefinitionRow};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::canonical::{from_canonical, to_canonical};
use crate::error::ProcessError;
use crate::parse::types::ProcessDefinition;
use crate::step::NodeRegistry;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Store-assigned id of one persisted revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub u64);

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Namespace revisions are numbered in, usually a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(pub String);

impl Scope {
    pub fn new(name: impl Into<String>) -> Self {
        Scope(name.into())
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// STORE CONTRACT
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("No definition with identity {0}")]
    NotFound(Identity),

    #[error("Revision conflict on `{name}`: expected latest {expected:?}, found {found:?}")]
    Conflict {
        name: String,
        expected: Option<u32>,
        found: Option<u32>,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "STO-001",
            StoreError::Conflict { .. } => "STO-002",
            StoreError::Unavailable(_) => "STO-003",
            StoreError::Corrupt(_) => "STO-004",
        }
    }

    /// Conflicts and outages may go away on their own; the rest will not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Conflict { .. } | StoreError::Unavailable(_))
    }
}

/// Fields an in-place edit is allowed to touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InPlaceUpdate {
    pub name: String,
    pub text: String,
    pub ext_version: String,
    pub last_updated: Option<DateTime<Utc>>,
    pub last_updated_by: String,
}

pub trait DefinitionStore {
    /// Highest revision of `name` in `scope`, with its row.
    fn find_latest(
        &self,
        name: &str,
        scope: &Scope,
    ) -> Result<Option<(u32, DefinitionRow)>, StoreError>;

    /// Append a revision. Must fail with `Conflict` unless the latest
    /// revision of `row.name` in `row.scope` is still `expected_latest`.
    fn insert_revision(
        &self,
        row: DefinitionRow,
        expected_latest: Option<u32>,
    ) -> Result<Identity, StoreError>;

    /// Patch the labels of one revision. Must fail with `Conflict` when the
    /// update renames the row onto a name that already has revisions in its
    /// scope.
    fn update_in_place(&self, identity: Identity, update: InPlaceUpdate) -> Result<(), StoreError>;

    fn load_by_identity(&self, identity: Identity) -> Result<DefinitionRow, StoreError>;
}

// =============================================================================
// EDIT PROTOCOL
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditAction {
    NoOp,
    InPlace,
    NewVersion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EditOutcome {
    pub identity: Identity,
    pub version: u32,
    pub action: EditAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Persisted {
    pub identity: Identity,
    pub version: u32,
}

/// Decide what an edit from `existing` to `new` amounts to.
///
/// Name and ext_version are labels; everything in the canonical tree outside
/// `_meta` is content. A label-only change is patched in place, any content
/// change is a new revision.
pub fn classify(existing: &ProcessDefinition, new: &ProcessDefinition) -> EditAction {
    let common_attrs_equal =
        new.config.name == existing.config.name && new.ext_version == existing.ext_version;
    let canonical_equal = new.canonical_eq(existing);

    match (canonical_equal, common_attrs_equal) {
        (true, true) => EditAction::NoOp,
        (true, false) => EditAction::InPlace,
        (false, _) => EditAction::NewVersion,
    }
}

/// Store `pd` as the next revision of its name in `scope`.
pub fn persist_new<S>(
    store: &S,
    pd: &ProcessDefinition,
    scope: &Scope,
) -> Result<Persisted, ProcessError>
where
    S: DefinitionStore + ?Sized,
{
    let latest = store.find_latest(pd.name(), scope)?.map(|(version, _)| version);
    let version = latest.map_or(1, |v| v + 1);

    let mut tree = to_canonical(pd);
    tree.meta.version = version;
    if tree.meta.created.is_none() {
        tree.meta.created = Some(Utc::now());
    }

    let row = to_row(&tree, scope)?;
    let identity = store.insert_revision(row, latest)?;

    info!(name = %pd.name(), %scope, %identity, version, "persisted process definition");
    Ok(Persisted { identity, version })
}

fn revision(row: &DefinitionRow) -> Result<ProcessDefinition, ProcessError> {
    let tree = from_row(row)?;
    let mut pd = from_canonical(&tree, &NodeRegistry::default())?;
    pd.identity = row.identity;
    Ok(pd)
}

/// Rebuild the revision stored under `identity`.
pub fn load<S>(store: &S, identity: Identity) -> Result<ProcessDefinition, ProcessError>
where
    S: DefinitionStore + ?Sized,
{
    let row = store.load_by_identity(identity)?;
    let mut pd = revision(&row)?;
    pd.identity = Some(identity);

    debug!(%identity, name = %pd.name(), version = pd.version, "loaded process definition");
    Ok(pd)
}

/// Apply `new` on top of the revision stored under `identity`.
///
/// The edit is decided against the latest revision of that revision's
/// chain, so repeating an edit that already landed is a no-op. A rename
/// onto a name that already has revisions in `scope` is appended to that
/// chain instead of patching the row.
pub fn edit<S>(
    store: &S,
    identity: Identity,
    new: &ProcessDefinition,
    scope: &Scope,
) -> Result<EditOutcome, ProcessError>
where
    S: DefinitionStore + ?Sized,
{
    let existing = load(store, identity)?;
    let chain = store.find_latest(existing.name(), scope)?;
    let chain_latest = chain.as_ref().map(|(version, _)| *version);

    let base = match chain {
        Some((version, row)) if version > existing.version => {
            debug!(%identity, version, "edit applies to a newer revision");
            revision(&row)?
        }
        _ => existing,
    };
    let base_identity = base.identity.unwrap_or(identity);

    let mut action = classify(&base, new);
    let mut latest = chain_latest;
    if new.name() != base.name() {
        latest = store.find_latest(new.name(), scope)?.map(|(version, _)| version);
        if action == EditAction::InPlace && latest.is_some() {
            action = EditAction::NewVersion;
        }
    }

    let outcome = match action {
        EditAction::NoOp => EditOutcome {
            identity: base_identity,
            version: base.version,
            action,
        },
        EditAction::InPlace => {
            store.update_in_place(
                base_identity,
                InPlaceUpdate {
                    name: new.config.name.clone(),
                    text: new.text.clone(),
                    ext_version: new.ext_version.clone(),
                    last_updated: Some(new.last_updated.unwrap_or_else(Utc::now)),
                    last_updated_by: new.last_updated_by.clone(),
                },
            )?;
            EditOutcome {
                identity: base_identity,
                version: base.version,
                action,
            }
        }
        EditAction::NewVersion => {
            let version = latest.map_or(1, |v| v + 1);

            let mut tree = to_canonical(new);
            tree.meta.version = version;
            tree.meta.created = base.created.or(new.created);
            tree.meta.created_by = if base.created_by.is_empty() {
                new.created_by.clone()
            } else {
                base.created_by.clone()
            };
            tree.meta.last_updated = Some(new.last_updated.unwrap_or_else(Utc::now));

            let row = to_row(&tree, scope)?;
            let new_identity = store.insert_revision(row, latest)?;
            EditOutcome {
                identity: new_identity,
                version,
                action,
            }
        }
    };

    info!(
        name = %new.name(),
        %scope,
        identity = %outcome.identity,
        version = outcome.version,
        action = ?outcome.action,
        "edited process definition"
    );
    Ok(outcome)
}
