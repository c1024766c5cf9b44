// src/chain/dependency.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::chain::job::JobId;
use crate::errors::QchainError;

/// The eight PBS dependency relations.
///
/// The `before*` kinds exist for caller convenience only: the chain rewrites
/// them into their `after*` counterparts when the edge is declared, so edges
/// stored on a job always carry `after` semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepKind {
    After,
    AfterAny,
    AfterOk,
    AfterNotOk,
    Before,
    BeforeAny,
    BeforeOk,
    BeforeNotOk,
}

impl DepKind {
    pub const ALL: [DepKind; 8] = [
        DepKind::After,
        DepKind::AfterAny,
        DepKind::AfterOk,
        DepKind::AfterNotOk,
        DepKind::Before,
        DepKind::BeforeAny,
        DepKind::BeforeOk,
        DepKind::BeforeNotOk,
    ];

    /// The exact string the scheduler expects in `-W depend=<kind>:...`.
    pub fn as_str(self) -> &'static str {
        match self {
            DepKind::After => "after",
            DepKind::AfterAny => "afterany",
            DepKind::AfterOk => "afterok",
            DepKind::AfterNotOk => "afternotok",
            DepKind::Before => "before",
            DepKind::BeforeAny => "beforeany",
            DepKind::BeforeOk => "beforeok",
            DepKind::BeforeNotOk => "beforenotok",
        }
    }

    pub fn is_before(self) -> bool {
        matches!(
            self,
            DepKind::Before | DepKind::BeforeAny | DepKind::BeforeOk | DepKind::BeforeNotOk
        )
    }

    /// `beforeX(base, target)` is equivalent to `afterX(target, base)`;
    /// this returns the `afterX` half of that rewrite.
    pub fn after_counterpart(self) -> DepKind {
        match self {
            DepKind::Before => DepKind::After,
            DepKind::BeforeAny => DepKind::AfterAny,
            DepKind::BeforeOk => DepKind::AfterOk,
            DepKind::BeforeNotOk => DepKind::AfterNotOk,
            other => other,
        }
    }
}

impl fmt::Display for DepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DepKind {
    type Err = QchainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DepKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                QchainError::InvalidArgument(format!("'{s}' is not a supported dependency kind"))
            })
    }
}

/// A directed, typed edge between two registered jobs.
///
/// `base` is the job that owns the edge and will be submitted second;
/// `target` is the job it depends on. Edges are created through
/// [`JobChain::declare_dependency`](crate::chain::JobChain::declare_dependency),
/// which has already applied the before→after rewrite by the time a
/// `Dependency` value exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dependency {
    base: JobId,
    target: JobId,
    kind: DepKind,
}

impl Dependency {
    pub fn new(base: JobId, target: JobId, kind: DepKind) -> Self {
        Self { base, target, kind }
    }

    pub fn base(&self) -> JobId {
        self.base
    }

    pub fn target(&self) -> JobId {
        self.target
    }

    pub fn kind(&self) -> DepKind {
        self.kind
    }
}

/// A dependency paired with the target's scheduler id, as known at the
/// moment the base job is submitted. `sched_id` is `None` when the target
/// has not been submitted yet, which the job-level submit turns into a
/// hard error.
#[derive(Debug, Clone)]
pub struct ResolvedDependency {
    pub dep: Dependency,
    pub sched_id: Option<String>,
}
