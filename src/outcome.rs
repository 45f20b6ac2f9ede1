use thiserror::Error;

/// Result of processing one candidate or one owning-type group.
///
/// Skips never surface to the host: a pass drops them before producing
/// output and only logs them at debug level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Emitted(T),
    Skipped(SkipReason),
}

impl<T> Outcome<T> {
    pub fn emitted(self) -> Option<T> {
        match self {
            Outcome::Emitted(value) => Some(value),
            Outcome::Skipped(_) => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("symbol for property '{property}' could not be resolved")]
    UnresolvedSymbol { property: String },

    #[error("property '{property}' has no accessor syntax")]
    MissingAccessorSyntax { property: String },

    #[error("property '{property}' has no containing type")]
    MissingContainingType { property: String },

    #[error("type '{owner}' is not declared directly in a namespace ({candidates} candidate(s) dropped)")]
    NestedOwningType { owner: String, candidates: usize },

    #[error("property '{owner}.{property}' is not expression-bodied")]
    NotExpressionBodied { owner: String, property: String },
}

/// Splits outcomes into emitted values and skip reasons, keeping order.
pub fn partition<T>(outcomes: Vec<Outcome<T>>) -> (Vec<T>, Vec<SkipReason>) {
    let mut emitted = Vec::new();
    let mut skipped = Vec::new();
    for outcome in outcomes {
        match outcome {
            Outcome::Emitted(value) => emitted.push(value),
            Outcome::Skipped(reason) => skipped.push(reason),
        }
    }
    (emitted, skipped)
}
