use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifier of a variable. Identifiers are handed out in creation order,
/// which is also the tie-break order used by the elimination planner
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VariableId(pub usize);

impl VariableId {
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for VariableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A role a variable plays in a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableRole {
    /// A latent variable carrying its own prior factor
    LatentPrior,

    /// A latent variable selecting one of several other variables
    LatentIndex,

    /// A variable fully determined by its neighbours (gates, selectors)
    DeterministicGate,

    /// A variable expected to be clamped by evidence
    Observed,
}

/// A discrete variable with the domain `[0, domain_size)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    id: VariableId,
    name: String,
    domain_size: usize,
    role: VariableRole,
}

impl Variable {
    #[inline]
    pub(crate) fn new(id: VariableId, name: String, domain_size: usize, role: VariableRole) -> Self {
        Variable {
            id,
            name,
            domain_size,
            role,
        }
    }

    #[inline(always)]
    pub fn id(&self) -> VariableId {
        self.id
    }

    /// Human readable name, used in logs and error messages
    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn domain_size(&self) -> usize {
        self.domain_size
    }

    #[inline(always)]
    pub fn role(&self) -> VariableRole {
        self.role
    }
}
