//! Tree-set loading: walk a source tree, parse every accepted leaf, and merge
//! the results into one keyed collection.
//!
//! A [`TreeSet`] is built by a single loading pass and read-only afterwards.
//! Loading is depth-first, files before subdirectories at each level, and
//! fail-fast: the first read, encoding or parse error aborts the whole
//! operation and surfaces unchanged. Entries that derive the same canonical
//! name overwrite each other, last write wins.
//!
//! Collections are plain values. Callers that want hot reload build a fresh
//! collection per request and swap references; nothing here is mutated in
//! place after loading, and the crate imposes no caching policy.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tera::Tera;
use tracing::{debug, trace};

use crate::error::{Result, ViewError};
use crate::syntax;
use crate::vfs::{Dir, File, Filter, canonical_name};

/// Named map of functions exposed to template expressions.
///
/// Functions are stored behind [`Arc`] so one table can be registered into
/// every engine instance the crate creates: the scratch engine used for parse
/// validation at load time, and the fresh engine built by each assembly.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use viewset::FunctionTable;
///
/// let mut functions = FunctionTable::new();
/// functions.insert("shout", |args: &HashMap<String, tera::Value>| -> tera::Result<tera::Value> {
///     let word = args.get("word").and_then(tera::Value::as_str).unwrap_or("");
///     Ok(tera::Value::from(word.to_uppercase()))
/// });
/// assert_eq!(functions.len(), 1);
/// ```
#[derive(Default, Clone)]
pub struct FunctionTable {
    functions: HashMap<String, Arc<dyn tera::Function>>,
}

/// Adapter so a shared function can be handed to an engine by value.
#[derive(Clone)]
struct SharedFunction(Arc<dyn tera::Function>);

impl tera::Function for SharedFunction {
    fn call(&self, args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
        self.0.call(args)
    }

    fn is_safe(&self) -> bool {
        self.0.is_safe()
    }
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under `name`. Later inserts under the same name
    /// replace earlier ones.
    pub fn insert(&mut self, name: impl Into<String>, function: impl tera::Function + 'static) {
        self.functions.insert(name.into(), Arc::new(function));
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    fn merge(&mut self, other: FunctionTable) {
        self.functions.extend(other.functions);
    }

    pub(crate) fn register_into(&self, tera: &mut Tera) {
        for (name, function) in &self.functions {
            tera.register_function(name, SharedFunction(Arc::clone(function)));
        }
    }
}

impl fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("FunctionTable").field("functions", &names).finish()
    }
}

/// One loaded template: a canonical name paired with normalized,
/// parse-checked source. Immutable once created.
#[derive(Debug, Clone)]
pub struct TemplateEntry {
    name: String,
    source: String,
}

impl TemplateEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Template source after delimiter normalization, exactly what assembly
    /// binds into the engine.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Keyed collection of parsed template entries produced by one loading pass.
///
/// # Examples
///
/// ```
/// use viewset::{FunctionTable, MemoryTree, TreeSet};
/// use viewset::vfs::TemplateExtensions;
///
/// # fn main() -> viewset::Result<()> {
/// let mut tree = MemoryTree::new();
/// tree.insert("index/index.html", "hello {{ who }}");
/// let root = tree.into_root();
///
/// let set = TreeSet::load(&root, FunctionTable::new(), Some(&TemplateExtensions))?;
/// assert!(set.contains("index/index.html"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct TreeSet {
    entries: HashMap<String, TemplateEntry>,
    functions: FunctionTable,
}

impl TreeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a fresh collection from `dir`. Convenience over
    /// [`TreeSet::load_into`] for the common one-pass case.
    pub fn load(
        dir: &dyn Dir,
        functions: FunctionTable,
        filter: Option<&dyn Filter>,
    ) -> Result<Self> {
        let mut set = Self::new();
        set.load_into(dir, functions, filter)?;
        Ok(set)
    }

    /// Recursively load `dir` into this collection.
    ///
    /// Per directory level: direct files first, then direct subdirectories,
    /// each in the backend's enumeration order. `filter` (when present) is
    /// consulted for files and directories alike; a rejected directory prunes
    /// its whole subtree. Any read, encoding or parse error aborts the entire
    /// call.
    ///
    /// Loading into a non-empty collection merges, overwriting entries whose
    /// canonical names collide.
    pub fn load_into(
        &mut self,
        dir: &dyn Dir,
        functions: FunctionTable,
        filter: Option<&dyn Filter>,
    ) -> Result<()> {
        self.functions.merge(functions);
        self.walk(dir, filter)
    }

    fn walk(&mut self, dir: &dyn Dir, filter: Option<&dyn Filter>) -> Result<()> {
        let here = canonical_name(dir);
        trace!(dir = %here, "walking source directory");

        let files = dir.read_files().map_err(|source| ViewError::Read {
            name: here.clone(),
            source,
        })?;
        for file in files {
            if let Some(filter) = filter {
                if !filter.accepts(file.as_ref()) {
                    trace!(file = %canonical_name(file.as_ref()), "filter rejected file");
                    continue;
                }
            }
            self.load_file(file.as_ref())?;
        }

        let dirs = dir.read_dirs().map_err(|source| ViewError::Read {
            name: here,
            source,
        })?;
        for sub in dirs {
            if let Some(filter) = filter {
                if !filter.accepts(sub.as_ref()) {
                    debug!(dir = %canonical_name(sub.as_ref()), "filter pruned directory");
                    continue;
                }
            }
            self.walk(sub.as_ref(), filter)?;
        }
        Ok(())
    }

    fn load_file(&mut self, file: &dyn File) -> Result<()> {
        let name = canonical_name(file);
        let raw = file.contents().map_err(|source| ViewError::Read {
            name: name.clone(),
            source,
        })?;
        let text = String::from_utf8(raw).map_err(|source| ViewError::Encoding {
            name: name.clone(),
            source,
        })?;

        let delims = syntax::delimiters_for(&name);
        let source = syntax::normalize(&text, delims);

        // Parse now so syntax errors surface at load time carrying the
        // canonical name, not at first render.
        let mut scratch = Tera::default();
        self.functions.register_into(&mut scratch);
        scratch.add_raw_template(&name, &source).map_err(|source| ViewError::Parse {
            name: name.clone(),
            source,
        })?;

        let replaced = self
            .entries
            .insert(name.clone(), TemplateEntry { name: name.clone(), source })
            .is_some();
        debug!(template = %name, replaced, "loaded template");
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TemplateEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Entry names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &TemplateEntry> {
        self.entries.values()
    }

    pub(crate) fn functions(&self) -> &FunctionTable {
        &self.functions
    }
}
