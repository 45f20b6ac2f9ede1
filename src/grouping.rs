use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::discovery::Candidate;
use crate::outcome::{Outcome, SkipReason};
use crate::semantic::{SemanticModel, SymbolId, TypeSymbol};
use crate::syntax::TypeKind;

/// A type declared directly inside a namespace that owns one or more candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwningType {
    /// Empty for the global namespace
    pub namespace: String,
    pub name: String,
    pub kind: TypeKind,
}

impl OwningType {
    /// Identity of the generated unit for this type.
    pub fn key(&self) -> (&str, &str) {
        (&self.namespace, &self.name)
    }

    pub fn display_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

impl From<&TypeSymbol> for OwningType {
    fn from(symbol: &TypeSymbol) -> Self {
        Self {
            namespace: symbol.containing_namespace.clone(),
            name: symbol.name.clone(),
            kind: symbol.kind,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CandidateGroup<'ast> {
    pub owner: OwningType,
    /// Discovery order, not re-sorted
    pub candidates: Vec<Candidate<'ast>>,
}

struct PendingGroup<'ast> {
    owner: TypeSymbol,
    candidates: Vec<Candidate<'ast>>,
}

/// Partition candidates by their directly enclosing type.
///
/// Types nested in another type are dropped whole, along with every candidate
/// they own. Skips come first in the result, followed by the qualifying groups
/// ordered by `(namespace, name)`.
pub fn group_by_owner<'ast, M: SemanticModel + ?Sized>(
    model: &M,
    candidates: Vec<Candidate<'ast>>,
) -> Vec<Outcome<CandidateGroup<'ast>>> {
    let mut outcomes = Vec::new();
    let mut pending: Vec<PendingGroup<'ast>> = Vec::new();
    let mut by_owner: HashMap<SymbolId, usize> = HashMap::new();

    for candidate in candidates {
        let Some(owner) = model.containing_type(&candidate.symbol) else {
            debug!(property = %candidate.name(), "skipping property without containing type");
            outcomes.push(Outcome::Skipped(SkipReason::MissingContainingType {
                property: candidate.name().to_string(),
            }));
            continue;
        };

        match by_owner.get(&owner.id) {
            Some(&index) => pending[index].candidates.push(candidate),
            None => {
                by_owner.insert(owner.id, pending.len());
                pending.push(PendingGroup {
                    owner,
                    candidates: vec![candidate],
                });
            }
        }
    }

    let mut groups = Vec::new();
    for group in pending {
        if !group.owner.is_namespace_member() {
            debug!(
                owner = %group.owner.display_name(),
                candidates = group.candidates.len(),
                "dropping group owned by a nested type"
            );
            outcomes.push(Outcome::Skipped(SkipReason::NestedOwningType {
                owner: group.owner.display_name(),
                candidates: group.candidates.len(),
            }));
            continue;
        }
        groups.push(CandidateGroup {
            owner: OwningType::from(&group.owner),
            candidates: group.candidates,
        });
    }

    groups.sort_by(|a, b| a.owner.key().cmp(&b.owner.key()));
    outcomes.extend(groups.into_iter().map(Outcome::Emitted));
    outcomes
}
