//! Host Module for the Bonsai generator
//!
//! Loads declaration trees from disk, runs a pass and writes the generated
//! sources back out. This is the glue a build tool would call; the pipeline
//! itself never touches the filesystem.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::cache::OutputCache;
use crate::codegen::GeneratedSource;
use crate::error::HostError;
use crate::generator::BonsaiGenerator;
use crate::model::{Compilation, ModelOptions};
use crate::options::GeneratorOptions;
use crate::syntax::SyntaxTree;
use crate::validate::validate_tree;

pub const DEFAULT_EXTENSION: &str = "decl.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HostOptions {
    pub generator: GeneratorOptions,
    pub model: ModelOptions,
    /// Declaration files end in `.{extension}`
    pub extension: String,
    /// Output cache location; no caching when unset
    pub cache_dir: Option<PathBuf>,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            generator: GeneratorOptions::default(),
            model: ModelOptions::default(),
            extension: DEFAULT_EXTENSION.to_string(),
            cache_dir: None,
        }
    }
}

impl HostOptions {
    /// Model options with the configured marker registered as an attribute
    /// class, as the bootstrap unit would do for a real compiler.
    pub fn model_options(&self) -> ModelOptions {
        self.model
            .clone()
            .with_attribute_class(&self.generator.marker_attribute)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOADING
// ═══════════════════════════════════════════════════════════════════════════════

/// All declaration files under `dir`, sorted by path.
pub fn find_declaration_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, HostError> {
    let suffix = format!(".{}", extension);
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(&suffix));
        if matches {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

pub fn load_tree(path: &Path) -> Result<SyntaxTree, HostError> {
    let source = fs::read_to_string(path).map_err(|source| HostError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut tree: SyntaxTree = serde_json::from_str(&source).map_err(|source| HostError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    if tree.path.is_empty() {
        tree.path = path.to_string_lossy().to_string();
    }

    let errors = validate_tree(&tree);
    if !errors.is_empty() {
        return Err(HostError::Invalid {
            path: path.to_path_buf(),
            errors,
        });
    }
    Ok(tree)
}

pub fn load_directory(dir: &Path, options: &HostOptions) -> Result<Compilation, HostError> {
    if !dir.exists() {
        return Err(HostError::MissingSourceDir(dir.to_path_buf()));
    }

    let trees = find_declaration_files(dir, &options.extension)?
        .iter()
        .map(|path| load_tree(path))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(dir = %dir.display(), trees = trees.len(), "loaded declaration trees");

    Ok(Compilation::new(trees, options.model_options()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

pub fn write_sources(out_dir: &Path, sources: &[GeneratedSource]) -> Result<Vec<PathBuf>, HostError> {
    fs::create_dir_all(out_dir).map_err(|source| HostError::Write {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::with_capacity(sources.len());
    for generated in sources {
        let path = out_dir.join(&generated.hint_name);
        fs::write(&path, &generated.text).map_err(|source| HostError::Write {
            path: path.clone(),
            source,
        })?;
        written.push(path);
    }
    Ok(written)
}

/// Load `source_dir`, run one pass and write the sources into `out_dir`.
///
/// With a cache directory configured, a pass whose candidate-set fingerprint
/// was seen before reuses the stored sources. Cache failures are logged and
/// otherwise ignored.
pub fn run_directory(
    source_dir: &Path,
    out_dir: &Path,
    options: &HostOptions,
) -> Result<Vec<GeneratedSource>, HostError> {
    let compilation = load_directory(source_dir, options)?;
    let generator = BonsaiGenerator::new(options.generator.clone());
    let plan = generator.plan(&compilation, compilation.syntax_trees());

    let cache = match &options.cache_dir {
        Some(dir) => match OutputCache::new(dir) {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!(error = %e, "output cache unavailable");
                None
            }
        },
        None => None,
    };

    if let Some(sources) = cache.as_ref().and_then(|c| c.get(&plan.fingerprint)) {
        debug!(fingerprint = %plan.fingerprint, "reusing cached generation output");
        write_sources(out_dir, &sources)?;
        return Ok(sources);
    }

    let fingerprint = plan.fingerprint.clone();
    let sources = generator.emit(&compilation, plan).into_sources();
    if let Some(cache) = &cache {
        if let Err(e) = cache.set(&fingerprint, &sources) {
            warn!(error = %e, "failed to store generation output");
        }
    }

    write_sources(out_dir, &sources)?;
    Ok(sources)
}
