use crate::codegen::{GeneratedSource, SourceWriter, AUTO_GENERATED_HEADER};
use crate::options::GeneratorOptions;

/// The marker attribute definition, added to every pass regardless of what
/// discovery finds. Usable on properties only, once per property, and not
/// inherited.
pub fn marker_attribute_source(options: &GeneratorOptions) -> GeneratedSource {
    let (namespace, name) = options.marker_parts();
    let mut writer = SourceWriter::new(&options.indent);
    writer.line(AUTO_GENERATED_HEADER);

    let namespaced = !namespace.is_empty();
    if namespaced {
        writer.line(&format!("namespace {}", namespace));
        writer.open();
    }

    writer.line(
        "[System.AttributeUsage(System.AttributeTargets.Property, AllowMultiple = false, Inherited = false)]",
    );
    writer.line(&format!("public sealed class {} : System.Attribute", name));
    writer.open();
    writer.close();

    if namespaced {
        writer.close();
    }

    GeneratedSource {
        hint_name: format!("{}.g.cs", name),
        text: writer.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_marker_source() {
        let source = marker_attribute_source(&GeneratorOptions::default());
        assert_eq!(source.hint_name, "BonsaiAttribute.g.cs");
        assert_eq!(
            source.text,
            concat!(
                "// <auto-generated/>\n",
                "namespace Bonsai\n",
                "{\n",
                "    [System.AttributeUsage(System.AttributeTargets.Property, AllowMultiple = false, Inherited = false)]\n",
                "    public sealed class BonsaiAttribute : System.Attribute\n",
                "    {\n",
                "    }\n",
                "}\n",
            )
        );
    }

    #[test]
    fn test_global_marker_source() {
        let options = GeneratorOptions {
            marker_attribute: "TraceAttribute".to_string(),
            ..Default::default()
        };
        let source = marker_attribute_source(&options);
        assert_eq!(source.hint_name, "TraceAttribute.g.cs");
        assert!(source.text.starts_with("// <auto-generated/>\n[System.AttributeUsage"));
        assert!(source.text.contains("public sealed class TraceAttribute : System.Attribute\n{\n}\n"));
    }
}
