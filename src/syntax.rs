//! Delimiter selection and normalization into the engine's dialect.
//!
//! Templates are authored with a single open/close marker pair chosen per
//! file extension, so script-ish sources (`.js`, `.json`, `.css`) can use
//! `<% %>` and keep their literal braces untouched, while everything else
//! uses `{{ }}`.
//!
//! The engine underneath (tera) distinguishes `{{ expression }}` from
//! `{% statement %}` tags, so [`normalize`] rewrites each authored span into
//! the right tag by looking at its leading word: a statement keyword
//! (`include`, `if`, `for`, `set`, `macro`, ...) produces a statement tag,
//! anything else an expression. `template` is accepted as an alias for
//! `include`, so `{{template "a.html"}}` invokes the named entry; the word is
//! reserved and cannot double as a variable name.
//!
//! Under the default pair, native tera tags already present in the source
//! pass through untouched, as do tera comments. Under any other pair the
//! authored markers are the only live syntax: `{{`, `{%` and `{#` outside a
//! span are literal content (braces in script sources must stay inert) and
//! are escaped so the engine emits them verbatim.
//!
//! Template inheritance (`extends`) is deliberately not part of the authored
//! dialect: layout composition in this crate goes through `include` plus the
//! alias table ("slots"), so a layout pulls its body in with
//! `{{ include "contents" }}`.

/// Open/close template markers for one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub open: &'static str,
    pub close: &'static str,
}

/// Marker pair used by `.html` files and any unrecognized extension.
pub const DEFAULT_DELIMITERS: Delimiters = Delimiters { open: "{{", close: "}}" };

/// Marker pair used by `.js`, `.json` and `.css` files.
pub const SCRIPT_DELIMITERS: Delimiters = Delimiters { open: "<%", close: "%>" };

/// Choose the delimiter pair for a canonical name from its extension.
///
/// Total function: unknown suffixes get [`DEFAULT_DELIMITERS`].
pub fn delimiters_for(name: &str) -> Delimiters {
    if name.ends_with(".js") || name.ends_with(".json") || name.ends_with(".css") {
        SCRIPT_DELIMITERS
    } else {
        DEFAULT_DELIMITERS
    }
}

/// Leading words that turn a span into a statement tag.
const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "endif", "for", "endfor", "break", "continue", "include", "import",
    "block", "endblock", "set", "set_global", "endset", "macro", "endmacro", "filter",
    "endfilter", "raw", "endraw",
];

/// Rewrite delimiter-enclosed spans into the engine's native tags.
///
/// Text outside the markers is copied verbatim under the default pair; under
/// any other pair, native tag openers in that text are escaped so they render
/// as literal content. An unterminated open marker leaves the tail untouched
/// so the parser reports it with its own diagnostic.
///
/// # Examples
///
/// ```
/// use viewset::syntax::{normalize, DEFAULT_DELIMITERS, SCRIPT_DELIMITERS};
///
/// assert_eq!(
///     normalize("B {{ include \"a.html\" }}", DEFAULT_DELIMITERS),
///     "B {% include \"a.html\" %}",
/// );
/// assert_eq!(
///     normalize("var x = {v: <% value %>};", SCRIPT_DELIMITERS),
///     "var x = {v: {{ value }}};",
/// );
/// ```
pub fn normalize(source: &str, delims: Delimiters) -> String {
    // Under non-native markers, brace sequences in the text are data.
    let escape_native = delims != DEFAULT_DELIMITERS;
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find(delims.open) {
        push_text(&mut out, &rest[..start], escape_native);
        let after = &rest[start + delims.open.len()..];
        let Some(end) = after.find(delims.close) else {
            push_text(&mut out, &rest[start..], escape_native);
            rest = "";
            break;
        };
        let inner = after[..end].trim();
        let (word, args) = match inner.split_once(char::is_whitespace) {
            Some((word, args)) => (word, args.trim_start()),
            None => (inner, ""),
        };
        // Go-style template invocation spells tera's include.
        let word = if word == "template" { "include" } else { word };
        if STATEMENT_KEYWORDS.contains(&word) {
            out.push_str("{% ");
            out.push_str(word);
            if !args.is_empty() {
                out.push(' ');
                out.push_str(args);
            }
            out.push_str(" %}");
        } else {
            out.push_str("{{ ");
            out.push_str(inner);
            out.push_str(" }}");
        }
        rest = &after[end + delims.close.len()..];
    }
    push_text(&mut out, rest, escape_native);
    out
}

/// Copy text that sits outside authored spans, escaping native tag openers
/// when the authored markers are not tera's own.
fn push_text(out: &mut String, text: &str, escape_native: bool) {
    if !escape_native {
        out.push_str(text);
        return;
    }
    let mut rest = text;
    while let Some(pos) = find_native_open(rest) {
        out.push_str(&rest[..pos]);
        out.push_str("{{ \"");
        out.push_str(&rest[pos..pos + 2]);
        out.push_str("\" }}");
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
}

fn find_native_open(text: &str) -> Option<usize> {
    text.as_bytes()
        .windows(2)
        .position(|pair| pair[0] == b'{' && matches!(pair[1], b'{' | b'%' | b'#'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_is_total() {
        assert_eq!(delimiters_for("index.html"), DEFAULT_DELIMITERS);
        assert_eq!(delimiters_for("app.js"), SCRIPT_DELIMITERS);
        assert_eq!(delimiters_for("data.json"), SCRIPT_DELIMITERS);
        assert_eq!(delimiters_for("style.css"), SCRIPT_DELIMITERS);
        assert_eq!(delimiters_for("notes.txt"), DEFAULT_DELIMITERS);
        assert_eq!(delimiters_for("no-extension"), DEFAULT_DELIMITERS);
    }

    #[test]
    fn keywords_become_statements() {
        assert_eq!(
            normalize("{{ if logged_in }}hi{{ endif }}", DEFAULT_DELIMITERS),
            "{% if logged_in %}hi{% endif %}",
        );
        assert_eq!(
            normalize("{{ include \"contents\" }}", DEFAULT_DELIMITERS),
            "{% include \"contents\" %}",
        );
    }

    #[test]
    fn everything_else_stays_an_expression() {
        assert_eq!(normalize("hello {{ name }}", DEFAULT_DELIMITERS), "hello {{ name }}");
        assert_eq!(normalize("{{name|upper}}", DEFAULT_DELIMITERS), "{{ name|upper }}");
    }

    #[test]
    fn script_markers_leave_braces_alone() {
        assert_eq!(
            normalize("function f() { return <% count %>; }", SCRIPT_DELIMITERS),
            "function f() { return {{ count }}; }",
        );
        assert_eq!(
            normalize("<% for item in items %>x<% endfor %>", SCRIPT_DELIMITERS),
            "{% for item in items %}x{% endfor %}",
        );
    }

    #[test]
    fn template_spans_become_includes() {
        assert_eq!(
            normalize("B {{template \"a.html\"}}", DEFAULT_DELIMITERS),
            "B {% include \"a.html\" %}",
        );
        assert_eq!(
            normalize("<% template \"nav.html\" %>", SCRIPT_DELIMITERS),
            "{% include \"nav.html\" %}",
        );
    }

    #[test]
    fn native_markers_in_script_sources_stay_literal() {
        assert_eq!(
            normalize("if(a){{b()}} v=<% v %>;", SCRIPT_DELIMITERS),
            "if(a){{ \"{{\" }}b()}} v={{ v }};",
        );
        assert_eq!(
            normalize("{% not a tag %} {# nor this #}", SCRIPT_DELIMITERS),
            "{{ \"{%\" }} not a tag %} {{ \"{#\" }} nor this #}",
        );
    }

    #[test]
    fn native_tags_pass_through() {
        assert_eq!(
            normalize("{% if a %}{{ b }}{% endif %}{# note #}", DEFAULT_DELIMITERS),
            "{% if a %}{{ b }}{% endif %}{# note #}",
        );
    }

    #[test]
    fn unterminated_marker_is_left_for_the_parser() {
        assert_eq!(normalize("oops {{ name", DEFAULT_DELIMITERS), "oops {{ name");
    }
}
