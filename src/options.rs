use serde::{Deserialize, Serialize};

pub const DEFAULT_MARKER_ATTRIBUTE: &str = "Bonsai.BonsaiAttribute";
pub const DEFAULT_METHOD_SUFFIX: &str = "Bonsai";
pub const DEFAULT_EXPRESSION_SEPARATOR: &str = " Expression: ";
pub const DEFAULT_INDENT: &str = "    ";

/// Knobs for one generation pass. The defaults are the canonical contract;
/// changing them changes the generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneratorOptions {
    /// Fully qualified name of the marker attribute type
    pub marker_attribute: String,
    /// Appended to the member name to form the generated method name
    pub method_suffix: String,
    /// Placed between the type descriptor and the expression text
    pub expression_separator: String,
    pub indent: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            marker_attribute: DEFAULT_MARKER_ATTRIBUTE.to_string(),
            method_suffix: DEFAULT_METHOD_SUFFIX.to_string(),
            expression_separator: DEFAULT_EXPRESSION_SEPARATOR.to_string(),
            indent: DEFAULT_INDENT.to_string(),
        }
    }
}

impl GeneratorOptions {
    /// Splits the marker into `(namespace, type name)`; the namespace is empty
    /// when the marker lives in the global namespace.
    pub fn marker_parts(&self) -> (&str, &str) {
        match self.marker_attribute.rsplit_once('.') {
            Some((namespace, name)) => (namespace, name),
            None => ("", self.marker_attribute.as_str()),
        }
    }
}
