//! Alias resolution and render invocation.
//!
//! Assembly takes a loaded [`TreeSet`] plus a per-request [`AliasTable`] and
//! produces one [`ExecutableTemplate`]: every entry bound under its own
//! canonical name, plus one extra binding per alias whose target exists in
//! the collection. The same underlying template then answers to two names,
//! which is how layouts reach the request's view without knowing its concrete
//! name.
//!
//! An alias whose target is absent is skipped silently. Alias tables are
//! speculative by design - built from request defaults that may not all apply
//! - so a dangling slot only becomes a problem if something actually executes
//! it, and at that point it fails with the ordinary not-found condition.
//!
//! Artifacts are cheap to build relative to a filesystem load, and they are
//! never mutated after construction. Build a fresh one per request rather
//! than sharing one across requests with different alias tables.

use std::collections::HashMap;
use std::io;

use serde::Serialize;
use tera::{Context, Tera};
use tracing::{debug, trace};

use crate::error::{Result, ViewError};
use crate::treeset::TreeSet;

/// Conventional slot name for the request's view body.
pub const SLOT_CONTENTS: &str = "contents";

/// Conventional slot name for the outer layout.
pub const SLOT_MAIN: &str = "main";

/// Mapping from logical slot name to concrete entry name.
///
/// Keys are slot names; [`SLOT_CONTENTS`] and [`SLOT_MAIN`] are the
/// documented conventions, and further slots are fair game by agreement
/// between layouts and handlers. Targets are not validated at construction
/// time - lookups happen only during [`TreeSet::assemble`], where absent
/// targets are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    slots: HashMap<String, String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `slot` at the entry named `target`, replacing any previous
    /// mapping for that slot.
    pub fn set(&mut self, slot: impl Into<String>, target: impl Into<String>) -> &mut Self {
        self.slots.insert(slot.into(), target.into());
        self
    }

    pub fn get(&self, slot: &str) -> Option<&str> {
        self.slots.get(slot).map(String::as_str)
    }

    pub fn contains(&self, slot: &str) -> bool {
        self.slots.contains_key(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.slots.iter().map(|(slot, target)| (slot.as_str(), target.as_str()))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<S, T> FromIterator<(S, T)> for AliasTable
where
    S: Into<String>,
    T: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (slot, target) in iter {
            table.set(slot, target);
        }
        table
    }
}

impl TreeSet {
    /// Resolve `aliases` against this collection and produce a render-ready
    /// artifact.
    ///
    /// Every entry is bound under its own name; a binding the engine rejects
    /// aborts with [`ViewError::Bind`]. Each alias whose target is present is
    /// bound as a second name over the same source; aliases with absent
    /// targets are skipped. An empty table yields the unaliased collection.
    pub fn assemble(&self, aliases: &AliasTable) -> Result<ExecutableTemplate> {
        let mut tera = Tera::default();
        // Escaping must not depend on which of a template's names was
        // executed, so suffix-based autoescaping stays off.
        tera.autoescape_on(Vec::new());
        self.functions().register_into(&mut tera);

        for entry in self.entries() {
            tera.add_raw_template(entry.name(), entry.source()).map_err(|source| {
                ViewError::Bind {
                    name: entry.name().to_string(),
                    source,
                }
            })?;
        }

        for (slot, target) in aliases.iter() {
            match self.get(target) {
                Some(entry) => {
                    trace!(slot, target, "binding alias");
                    tera.add_raw_template(slot, entry.source()).map_err(|source| {
                        ViewError::Bind {
                            name: slot.to_string(),
                            source,
                        }
                    })?;
                }
                None => {
                    debug!(slot, target, "alias target not in collection, skipping");
                }
            }
        }

        Ok(ExecutableTemplate { tera })
    }
}

/// Render-ready artifact produced by [`TreeSet::assemble`].
///
/// Immutable after construction. Entries are reachable under their canonical
/// names and under any alias names that resolved at assembly.
pub struct ExecutableTemplate {
    tera: Tera,
}

impl ExecutableTemplate {
    /// Evaluate the entry named `name` against `data`, streaming output to
    /// `sink`.
    ///
    /// Fails with [`ViewError::TemplateNotFound`] if `name` is absent and
    /// with [`ViewError::Render`] if evaluation fails. On a render failure
    /// the sink may already hold partial output; nothing is rolled back.
    pub fn execute<W: io::Write>(&self, name: &str, data: &Context, sink: W) -> Result<()> {
        self.tera.render_to(name, data, sink).map_err(|err| match err.kind {
            tera::ErrorKind::TemplateNotFound(_) => ViewError::TemplateNotFound {
                name: name.to_string(),
            },
            _ => ViewError::Render {
                name: name.to_string(),
                source: err,
            },
        })
    }

    /// Like [`ExecutableTemplate::execute`], but builds the render context
    /// from any serializable value.
    pub fn execute_serialize<T: Serialize, W: io::Write>(
        &self,
        name: &str,
        data: &T,
        sink: W,
    ) -> Result<()> {
        let context = Context::from_serialize(data).map_err(|source| ViewError::Render {
            name: name.to_string(),
            source,
        })?;
        self.execute(name, &context, sink)
    }

    /// True if `name` is bound, either as a canonical name or as an alias.
    pub fn contains(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// All bound names, canonical and alias alike, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tera.get_template_names()
    }
}

impl std::fmt::Debug for ExecutableTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        f.debug_struct("ExecutableTemplate").field("names", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treeset::FunctionTable;
    use crate::vfs::memory::MemoryTree;

    fn sample_set() -> TreeSet {
        let mut tree = MemoryTree::new();
        tree.insert("index/index.html", "hello {{ who }}");
        tree.insert("layout/main.html", "[{{ include \"contents\" }}]");
        TreeSet::load(&tree.into_root(), FunctionTable::new(), None).unwrap()
    }

    fn render(exec: &ExecutableTemplate, name: &str, data: &Context) -> Result<String> {
        let mut out = Vec::new();
        exec.execute(name, data, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn who_is(name: &str) -> Context {
        let mut data = Context::new();
        data.insert("who", name);
        data
    }

    #[test]
    fn empty_alias_table_yields_the_unaliased_collection() {
        let exec = sample_set().assemble(&AliasTable::new()).unwrap();
        assert!(exec.contains("index/index.html"));
        assert!(exec.contains("layout/main.html"));
        assert!(!exec.contains(SLOT_CONTENTS));

        let out = render(&exec, "index/index.html", &who_is("world")).unwrap();
        assert_eq!(out, "hello world");
    }

    #[test]
    fn alias_and_canonical_name_render_identically() {
        let mut aliases = AliasTable::new();
        aliases.set(SLOT_CONTENTS, "index/index.html");
        let exec = sample_set().assemble(&aliases).unwrap();

        let data = who_is("anyone");
        let direct = render(&exec, "index/index.html", &data).unwrap();
        let aliased = render(&exec, SLOT_CONTENTS, &data).unwrap();
        assert_eq!(direct, aliased);
    }

    #[test]
    fn layouts_reach_the_view_through_a_slot() {
        let mut aliases = AliasTable::new();
        aliases.set(SLOT_CONTENTS, "index/index.html");
        let exec = sample_set().assemble(&aliases).unwrap();

        let out = render(&exec, "layout/main.html", &who_is("world")).unwrap();
        assert_eq!(out, "[hello world]");
    }

    #[test]
    fn missing_alias_target_is_skipped_silently() {
        let mut aliases = AliasTable::new();
        aliases.set(SLOT_CONTENTS, "missing.html");
        let exec = sample_set().assemble(&aliases).unwrap();

        // Originally-present entries are untouched.
        let out = render(&exec, "index/index.html", &who_is("world")).unwrap();
        assert_eq!(out, "hello world");

        // The dangling slot fails only when executed.
        let err = render(&exec, SLOT_CONTENTS, &Context::new()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn executing_an_unknown_name_is_not_found() {
        let exec = sample_set().assemble(&AliasTable::new()).unwrap();
        let err = render(&exec, "nope.html", &Context::new()).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.template_name(), Some("nope.html"));
    }

    #[test]
    fn evaluation_failures_are_render_errors() {
        let exec = sample_set().assemble(&AliasTable::new()).unwrap();
        let err = render(&exec, "index/index.html", &Context::new()).unwrap_err();
        assert!(matches!(err, ViewError::Render { .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn functions_are_available_during_render() {
        let mut tree = MemoryTree::new();
        tree.insert("shout.html", "{{ shout(word=who) }}");
        let mut functions = FunctionTable::new();
        functions.insert(
            "shout",
            |args: &HashMap<String, tera::Value>| -> tera::Result<tera::Value> {
                let word = args.get("word").and_then(tera::Value::as_str).unwrap_or("");
                Ok(tera::Value::from(word.to_uppercase()))
            },
        );
        let set = TreeSet::load(&tree.into_root(), functions, None).unwrap();
        let exec = set.assemble(&AliasTable::new()).unwrap();

        let out = render(&exec, "shout.html", &who_is("quiet")).unwrap();
        assert_eq!(out, "QUIET");
    }

    #[test]
    fn execute_serialize_accepts_any_serializable_data() {
        #[derive(serde::Serialize)]
        struct Data {
            who: &'static str,
        }

        let exec = sample_set().assemble(&AliasTable::new()).unwrap();
        let mut out = Vec::new();
        exec.execute_serialize("index/index.html", &Data { who: "serde" }, &mut out).unwrap();
        assert_eq!(out, b"hello serde");
    }
}
