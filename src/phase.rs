//! Phase taxonomy and capability set.
//!
//! A phase names one lifecycle operation on a hosted algorithm. Phases come
//! in two classes:
//!
//! - **Work phases** (`pre_execute`, `execute`, `get_info`) — mandatory.
//!   The [`Algorithm`](crate::Algorithm) trait makes them required methods,
//!   so their absence is a compile-time failure, never a runtime gap.
//! - **Lifecycle phases** (`setup`, `teardown`, `on_step_start`,
//!   `on_step_finish`, `reset`) — optional and capability-gated. The
//!   algorithm declares which of them it actually implements through an
//!   explicit [`CapabilitySet`].
//!
//! # Example
//!
//! ```
//! use procvision_adapter::phase::{CapabilitySet, LifecyclePhase, Phase, WorkPhase};
//!
//! let phase: Phase = "setup".parse().unwrap();
//! assert_eq!(phase, Phase::Lifecycle(LifecyclePhase::Setup));
//!
//! let caps = CapabilitySet::new()
//!     .with(LifecyclePhase::Setup)
//!     .with(LifecyclePhase::Reset);
//! assert!(caps.contains(LifecyclePhase::Reset));
//! assert!(!caps.contains(LifecyclePhase::Teardown));
//! assert_eq!(caps.names(), vec!["setup", "reset"]);
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// All lifecycle phases, in canonical wire order.
pub const LIFECYCLE_PHASES: [LifecyclePhase; 5] = [
    LifecyclePhase::Setup,
    LifecyclePhase::Teardown,
    LifecyclePhase::OnStepStart,
    LifecyclePhase::OnStepFinish,
    LifecyclePhase::Reset,
];

/// A mandatory phase, assumed always implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkPhase {
    /// Validate inputs ahead of an execution step.
    PreExecute,
    /// Run one inspection step.
    Execute,
    /// Describe the algorithm (name, version, steps, parameters).
    GetInfo,
}

impl WorkPhase {
    /// Wire name of this phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkPhase::PreExecute => "pre_execute",
            WorkPhase::Execute => "execute",
            WorkPhase::GetInfo => "get_info",
        }
    }
}

/// An optional, capability-gated phase.
///
/// Ordered by canonical wire order so capability lists serialize
/// deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LifecyclePhase {
    /// One-time initialization after the process starts.
    Setup,
    /// Best-effort cleanup before the process exits.
    Teardown,
    /// Notification before a step runs.
    OnStepStart,
    /// Notification after a step finished, carrying its result.
    OnStepFinish,
    /// Reset per-session state.
    Reset,
}

impl LifecyclePhase {
    /// Wire name of this phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecyclePhase::Setup => "setup",
            LifecyclePhase::Teardown => "teardown",
            LifecyclePhase::OnStepStart => "on_step_start",
            LifecyclePhase::OnStepFinish => "on_step_finish",
            LifecyclePhase::Reset => "reset",
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A phase identifier as carried in a `call` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Mandatory phase, invoked unconditionally.
    Work(WorkPhase),
    /// Optional phase, invoked only when in the capability set.
    Lifecycle(LifecyclePhase),
}

impl Phase {
    /// Wire name of this phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Work(p) => p.as_str(),
            Phase::Lifecycle(p) => p.as_str(),
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a phase name is not part of the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPhase(pub String);

impl fmt::Display for UnknownPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown phase: {}", self.0)
    }
}

impl std::error::Error for UnknownPhase {}

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "pre_execute" => Ok(Phase::Work(WorkPhase::PreExecute)),
            "execute" => Ok(Phase::Work(WorkPhase::Execute)),
            "get_info" => Ok(Phase::Work(WorkPhase::GetInfo)),
            "setup" => Ok(Phase::Lifecycle(LifecyclePhase::Setup)),
            "teardown" => Ok(Phase::Lifecycle(LifecyclePhase::Teardown)),
            "on_step_start" => Ok(Phase::Lifecycle(LifecyclePhase::OnStepStart)),
            "on_step_finish" => Ok(Phase::Lifecycle(LifecyclePhase::OnStepFinish)),
            "reset" => Ok(Phase::Lifecycle(LifecyclePhase::Reset)),
            other => Err(UnknownPhase(other.to_string())),
        }
    }
}

/// The set of lifecycle phases an algorithm implements.
///
/// Computed once at startup from the algorithm's declaration and immutable
/// for the process lifetime. Work phases never appear here; the trait makes
/// them mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    inner: BTreeSet<LifecyclePhase>,
}

impl CapabilitySet {
    /// Create an empty capability set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set containing every lifecycle phase.
    pub fn all() -> Self {
        LIFECYCLE_PHASES.iter().copied().collect()
    }

    /// Add a capability (builder style).
    pub fn with(mut self, phase: LifecyclePhase) -> Self {
        self.inner.insert(phase);
        self
    }

    /// Check whether a lifecycle phase is implemented.
    pub fn contains(&self, phase: LifecyclePhase) -> bool {
        self.inner.contains(&phase)
    }

    /// Check if no lifecycle phase is implemented.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of implemented lifecycle phases.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterate over the implemented phases in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = LifecyclePhase> + '_ {
        self.inner.iter().copied()
    }

    /// Wire names of the implemented phases, for the `hello` frame.
    pub fn names(&self) -> Vec<String> {
        self.inner.iter().map(|p| p.as_str().to_string()).collect()
    }
}

impl FromIterator<LifecyclePhase> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = LifecyclePhase>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}
