//! Codegen module for the Bonsai generator
//!
//! Emits one partial redeclaration per owning type, holding one
//! `{Member}Bonsai()` method per expression-bodied candidate. Output is a pure
//! function of its input: the same groups always render the same bytes.

#[cfg(feature = "napi")]
use napi_derive::napi;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::body::extract_expression_body;
use crate::discovery::Candidate;
use crate::grouping::{CandidateGroup, OwningType};
use crate::options::GeneratorOptions;
use crate::outcome::{partition, Outcome, SkipReason};
use crate::semantic::SemanticModel;
use crate::signature::describe_type;

pub const AUTO_GENERATED_HEADER: &str = "// <auto-generated/>";

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// A named text unit handed back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSource {
    pub hint_name: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMember {
    pub method_name: String,
    pub is_static: bool,
    /// Unescaped literal value
    pub value: String,
}

// ═══════════════════════════════════════════════════════════════════════════════
// MEMBERS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn build_member<M: SemanticModel + ?Sized>(
    model: &M,
    owner: &OwningType,
    candidate: &Candidate<'_>,
    options: &GeneratorOptions,
) -> Outcome<GeneratedMember> {
    let Some(expression) = extract_expression_body(candidate.node) else {
        debug!(
            owner = %owner.display_name(),
            property = %candidate.name(),
            "omitting member without expression body"
        );
        return Outcome::Skipped(SkipReason::NotExpressionBodied {
            owner: owner.display_name(),
            property: candidate.name().to_string(),
        });
    };

    let descriptor = describe_type(model, candidate.declared_type());
    Outcome::Emitted(GeneratedMember {
        method_name: format!("{}{}", candidate.name(), options.method_suffix),
        is_static: candidate.is_static(),
        value: format!("{}{}{}", descriptor, options.expression_separator, expression),
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// UNITS
// ═══════════════════════════════════════════════════════════════════════════════

/// Emit the unit for one group. The unit is produced even when every member
/// was omitted.
pub fn emit_unit<M: SemanticModel + ?Sized>(
    model: &M,
    group: &CandidateGroup<'_>,
    options: &GeneratorOptions,
) -> (GeneratedSource, Vec<SkipReason>) {
    let outcomes = group
        .candidates
        .iter()
        .map(|candidate| build_member(model, &group.owner, candidate, options))
        .collect();
    let (members, skipped) = partition(outcomes);

    let source = GeneratedSource {
        hint_name: hint_name(&group.owner, options),
        text: render_unit(&group.owner, &members, options),
    };
    (source, skipped)
}

pub fn hint_name(owner: &OwningType, options: &GeneratorOptions) -> String {
    format!("{}.{}.g.cs", owner.display_name(), options.method_suffix)
}

pub fn render_unit(owner: &OwningType, members: &[GeneratedMember], options: &GeneratorOptions) -> String {
    let mut writer = SourceWriter::new(&options.indent);
    writer.line(AUTO_GENERATED_HEADER);

    let namespaced = !owner.namespace.is_empty();
    if namespaced {
        writer.line(&format!("namespace {}", owner.namespace));
        writer.open();
    }

    writer.line(&format!("partial {} {}", owner.kind.keyword(), owner.name));
    writer.open();
    for member in members {
        writer.line(&render_member(member));
    }
    writer.close();

    if namespaced {
        writer.close();
    }
    writer.finish()
}

fn render_member(member: &GeneratedMember) -> String {
    let modifiers = if member.is_static {
        "public static"
    } else {
        "public"
    };
    format!(
        "{} string {}() => \"{}\";",
        modifiers,
        member.method_name,
        escape_string_literal(&member.value)
    )
}

/// Escape text for a regular (non-verbatim) string literal.
pub fn escape_string_literal(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\0' => escaped.push_str("\\0"),
            '\u{85}' | '\u{2028}' | '\u{2029}' => {
                escaped.push_str(&format!("\\u{:04X}", c as u32))
            }
            c if c.is_control() => escaped.push_str(&format!("\\u{:04X}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE WRITER
// ═══════════════════════════════════════════════════════════════════════════════

/// Line-oriented writer for brace-delimited blocks. Lines end in `\n`.
pub(crate) struct SourceWriter<'a> {
    out: String,
    indent: &'a str,
    depth: usize,
}

impl<'a> SourceWriter<'a> {
    pub(crate) fn new(indent: &'a str) -> Self {
        Self {
            out: String::new(),
            indent,
            depth: 0,
        }
    }

    pub(crate) fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(self.indent);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    pub(crate) fn open(&mut self) {
        self.line("{");
        self.depth += 1;
    }

    pub(crate) fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TypeKind;

    fn owner(namespace: &str) -> OwningType {
        OwningType {
            namespace: namespace.to_string(),
            name: "Program".to_string(),
            kind: TypeKind::Class,
        }
    }

    #[test]
    fn test_escape_string_literal() {
        assert_eq!(escape_string_literal("hello\"world"), "hello\\\"world");
        assert_eq!(escape_string_literal("line1\nline2"), "line1\\nline2");
        assert_eq!(escape_string_literal("a\\b"), "a\\\\b");
        assert_eq!(escape_string_literal("a\r\n\tb"), "a\\r\\n\\tb");
        assert_eq!(escape_string_literal("x\u{2028}y"), "x\\u2028y");
        assert_eq!(escape_string_literal("x => x + 1"), "x => x + 1");
    }

    #[test]
    fn test_render_unit_in_namespace() {
        let members = vec![
            GeneratedMember {
                method_name: "StringLengthBonsai".to_string(),
                is_static: true,
                value: "Func Argument 0: string Argument 1: int Expression: message => message.Length"
                    .to_string(),
            },
            GeneratedMember {
                method_name: "GreetingBonsai".to_string(),
                is_static: false,
                value: " Expression: \"hi\"".to_string(),
            },
        ];
        let text = render_unit(&owner("Demo"), &members, &GeneratorOptions::default());
        let expected = concat!(
            "// <auto-generated/>\n",
            "namespace Demo\n",
            "{\n",
            "    partial class Program\n",
            "    {\n",
            "        public static string StringLengthBonsai() => \"Func Argument 0: string Argument 1: int Expression: message => message.Length\";\n",
            "        public string GreetingBonsai() => \" Expression: \\\"hi\\\"\";\n",
            "    }\n",
            "}\n",
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_unit_in_global_namespace() {
        let mut record = owner("");
        record.kind = TypeKind::Record;
        let text = render_unit(&record, &[], &GeneratorOptions::default());
        assert_eq!(
            text,
            "// <auto-generated/>\npartial record Program\n{\n}\n"
        );
    }

    #[test]
    fn test_hint_name() {
        let options = GeneratorOptions::default();
        assert_eq!(hint_name(&owner("Demo.App"), &options), "Demo.App.Program.Bonsai.g.cs");
        assert_eq!(hint_name(&owner(""), &options), "Program.Bonsai.g.cs");
    }
}
