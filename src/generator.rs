//! One generation pass: discovery → grouping → emission.
//!
//! A pass recomputes everything from the trees it is given and keeps no
//! state between runs. Skips are collected for inspection and logging but
//! never become part of the produced sources.

use sha2::{Digest, Sha256};
use tracing::info;

use crate::body::extract_expression_body;
use crate::bootstrap::marker_attribute_source;
use crate::codegen::{emit_unit, GeneratedSource};
use crate::discovery::discover_candidates;
use crate::grouping::{group_by_owner, CandidateGroup};
use crate::model::{Compilation, ModelOptions};
use crate::options::GeneratorOptions;
use crate::outcome::{partition, SkipReason};
use crate::semantic::SemanticModel;
use crate::signature::describe_type;
use crate::syntax::SyntaxTree;

/// Discovered and grouped candidates, ready for emission.
#[derive(Debug)]
pub struct PassPlan<'ast> {
    pub groups: Vec<CandidateGroup<'ast>>,
    pub skipped: Vec<SkipReason>,
    /// SHA-256 over the full candidate set and the options that shape output
    pub fingerprint: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub bootstrap: GeneratedSource,
    /// One unit per qualifying owning type, ordered by `(namespace, name)`
    pub units: Vec<GeneratedSource>,
    pub skipped: Vec<SkipReason>,
    pub fingerprint: String,
}

impl PassReport {
    /// The sources handed to the host: bootstrap first, then the units.
    pub fn into_sources(self) -> Vec<GeneratedSource> {
        let mut sources = Vec::with_capacity(self.units.len() + 1);
        sources.push(self.bootstrap);
        sources.extend(self.units);
        sources
    }
}

#[derive(Debug, Clone, Default)]
pub struct BonsaiGenerator {
    options: GeneratorOptions,
}

impl BonsaiGenerator {
    /// A custom `marker_attribute` only matches in a compilation that knows
    /// it as an attribute class; build one with [`BonsaiGenerator::compile`].
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    /// Build a compilation with this generator's marker registered, the way
    /// the emitted bootstrap unit would declare it for a real compiler.
    pub fn compile(&self, trees: Vec<SyntaxTree>, model: ModelOptions) -> Compilation {
        Compilation::new(
            trees,
            model.with_attribute_class(&self.options.marker_attribute),
        )
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    pub fn plan<'ast, M: SemanticModel + ?Sized>(
        &self,
        model: &M,
        trees: &'ast [SyntaxTree],
    ) -> PassPlan<'ast> {
        let discovered = discover_candidates(model, trees, &self.options.marker_attribute);
        let (candidates, mut skipped) = partition(discovered);

        let (groups, dropped) = partition(group_by_owner(model, candidates));
        skipped.extend(dropped);

        let fingerprint = fingerprint(model, &groups, &self.options);
        PassPlan {
            groups,
            skipped,
            fingerprint,
        }
    }

    pub fn emit<M: SemanticModel + ?Sized>(&self, model: &M, plan: PassPlan<'_>) -> PassReport {
        let PassPlan {
            groups,
            mut skipped,
            fingerprint,
        } = plan;

        let mut units = Vec::with_capacity(groups.len());
        for group in &groups {
            let (unit, omitted) = emit_unit(model, group, &self.options);
            units.push(unit);
            skipped.extend(omitted);
        }

        info!(
            units = units.len(),
            skipped = skipped.len(),
            fingerprint = %fingerprint,
            "bonsai generation pass complete"
        );

        PassReport {
            bootstrap: marker_attribute_source(&self.options),
            units,
            skipped,
            fingerprint,
        }
    }

    pub fn run<M: SemanticModel + ?Sized>(&self, model: &M, trees: &[SyntaxTree]) -> PassReport {
        let plan = self.plan(model, trees);
        self.emit(model, plan)
    }
}

/// Run a pass over a compilation with default options and return the sources.
pub fn generate(compilation: &Compilation) -> Vec<GeneratedSource> {
    BonsaiGenerator::default()
        .run(compilation, compilation.syntax_trees())
        .into_sources()
}

const FIELD_SEPARATOR: &[u8] = &[0x1f];
const RECORD_SEPARATOR: &[u8] = &[0x1e];

/// Identity of everything that feeds emission. Two plans with equal
/// fingerprints render identical sources.
pub fn fingerprint<M: SemanticModel + ?Sized>(
    model: &M,
    groups: &[CandidateGroup<'_>],
    options: &GeneratorOptions,
) -> String {
    let mut hasher = Sha256::new();
    for field in [
        &options.marker_attribute,
        &options.method_suffix,
        &options.expression_separator,
        &options.indent,
    ] {
        hasher.update(field.as_bytes());
        hasher.update(FIELD_SEPARATOR);
    }

    for group in groups {
        hasher.update(RECORD_SEPARATOR);
        hasher.update(group.owner.namespace.as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(group.owner.name.as_bytes());
        hasher.update(FIELD_SEPARATOR);
        hasher.update(group.owner.kind.keyword().as_bytes());

        for candidate in &group.candidates {
            hasher.update(RECORD_SEPARATOR);
            hasher.update(candidate.name().as_bytes());
            hasher.update(FIELD_SEPARATOR);
            hasher.update([candidate.is_static() as u8]);
            hasher.update(FIELD_SEPARATOR);
            hasher.update(describe_type(model, candidate.declared_type()).as_bytes());
            hasher.update(FIELD_SEPARATOR);
            match extract_expression_body(candidate.node) {
                Some(expression) => {
                    hasher.update([1u8]);
                    hasher.update(expression.as_bytes());
                }
                None => hasher.update([0u8]),
            }
        }
    }

    format!("{:x}", hasher.finalize())
}
