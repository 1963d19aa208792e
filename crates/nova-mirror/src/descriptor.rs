//! Descriptor strings for types and members, rendered through the `nova_classfile` grammar.

use nova_classfile::{BaseType, FieldType, MethodDescriptor, ParamDescriptor, ReturnType};
use nova_types::{ClassId, PrimitiveType, Type, TypeEnv};

use crate::members::{Constructor, Method};

fn base_type(prim: PrimitiveType) -> BaseType {
    match prim {
        PrimitiveType::Boolean => BaseType::Boolean,
        PrimitiveType::Byte => BaseType::Byte,
        PrimitiveType::Short => BaseType::Short,
        PrimitiveType::Char => BaseType::Char,
        PrimitiveType::Int => BaseType::Int,
        PrimitiveType::Long => BaseType::Long,
        PrimitiveType::Float => BaseType::Float,
        PrimitiveType::Double => BaseType::Double,
    }
}

fn binary_name(env: &dyn TypeEnv, class: ClassId) -> String {
    nova_types::java_name(env, &Type::class(class, vec![]))
}

/// The erased field type of `ty`; `None` for `void`.
pub(crate) fn field_type(env: &dyn TypeEnv, ty: &Type) -> Option<FieldType> {
    Some(match ty.erasure(env) {
        Type::Void => return None,
        Type::Primitive(prim) => FieldType::Base(base_type(prim)),
        Type::Array(component) => FieldType::Array(Box::new(field_type(env, &component)?)),
        Type::Class(class) => FieldType::object_from_binary_name(&binary_name(env, class.def)),
        Type::TypeVar(_) | Type::Wildcard(_) => {
            FieldType::object_from_binary_name(&binary_name(env, env.well_known().object))
        }
    })
}

fn return_type(env: &dyn TypeEnv, ty: &Type) -> ReturnType {
    field_type(env, ty).map_or(ReturnType::Void, ReturnType::Type)
}

fn field_types(env: &dyn TypeEnv, params: &[Type]) -> Vec<FieldType> {
    params.iter().filter_map(|param| field_type(env, param)).collect()
}

/// Slash-separated binary name: `java/lang/String`.
pub fn path(env: &dyn TypeEnv, class: ClassId) -> String {
    binary_name(env, class).replace('.', "/")
}

/// `I`, `[J`, `Ljava/lang/String;`, `V`.
pub fn type_descriptor(env: &dyn TypeEnv, ty: &Type) -> String {
    return_type(env, ty).to_string()
}

/// `(ILjava/lang/String;)`.
pub fn param_descriptor(env: &dyn TypeEnv, params: &[Type]) -> String {
    ParamDescriptor(&field_types(env, params)).to_string()
}

/// Parameter descriptor followed by the return type descriptor.
pub fn method_descriptor(env: &dyn TypeEnv, method: &Method<'_>) -> String {
    MethodDescriptor {
        params: field_types(env, method.params()),
        return_type: return_type(env, method.return_type()),
    }
    .to_string()
}

/// Parameter descriptor followed by `V`.
pub fn constructor_descriptor(env: &dyn TypeEnv, constructor: &Constructor<'_>) -> String {
    MethodDescriptor::constructor(field_types(env, constructor.params())).to_string()
}
