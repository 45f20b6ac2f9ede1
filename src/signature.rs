use crate::semantic::{SemanticModel, TypeRef};

/// Canonical descriptor of a declared type.
///
/// Function-valued types serialize as their simple name followed by one
/// `" Argument {i}: {name}"` segment per positional type argument. Arguments
/// are named by their simple name only and are not descended into. Any other
/// type serializes as the empty string.
pub fn describe_type<M: SemanticModel + ?Sized>(model: &M, ty: &TypeRef) -> String {
    let Some(arguments) = model.type_arguments(ty) else {
        return String::new();
    };

    let mut descriptor = ty.name.clone();
    for (index, argument) in arguments.iter().enumerate() {
        descriptor.push_str(&format!(" Argument {}: {}", index, argument.name));
    }
    descriptor
}
