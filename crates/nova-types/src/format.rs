use crate::{ClassId, ClassType, FieldDef, Type, TypeEnv, WildcardBound};

/// Java source-style name of the erased type: `int`, `java.lang.String`, `long[][]`.
pub fn java_name(env: &dyn TypeEnv, ty: &Type) -> String {
    write_type(env, ty, false)
}

/// Like [`java_name`] but keeps type arguments: `java.util.Map<java.lang.String, ?>`.
pub fn java_name_generic(env: &dyn TypeEnv, ty: &Type) -> String {
    write_type(env, ty, true)
}

fn class_name(env: &dyn TypeEnv, id: ClassId) -> String {
    env.class(id)
        .map(|def| def.name.clone())
        .unwrap_or_else(|| format!("<unknown#{}>", id.to_raw()))
}

fn write_type(env: &dyn TypeEnv, ty: &Type, generic: bool) -> String {
    match ty {
        Type::Void => "void".to_string(),
        Type::Primitive(prim) => prim.keyword().to_string(),
        Type::Class(ClassType { def, args }) => {
            let mut out = class_name(env, *def);
            if generic && !args.is_empty() {
                let args: Vec<String> = args.iter().map(|a| write_type(env, a, true)).collect();
                out.push('<');
                out.push_str(&args.join(", "));
                out.push('>');
            }
            out
        }
        Type::Array(component) => format!("{}[]", write_type(env, component, generic)),
        Type::TypeVar(id) => env
            .type_param(*id)
            .map(|tp| tp.name.clone())
            .unwrap_or_else(|| "?".to_string()),
        Type::Wildcard(WildcardBound::Unbounded) => "?".to_string(),
        Type::Wildcard(WildcardBound::Extends(upper)) => {
            format!("? extends {}", write_type(env, upper, generic))
        }
        Type::Wildcard(WildcardBound::Super(lower)) => {
            format!("? super {}", write_type(env, lower, generic))
        }
    }
}

/// The `Field#toGenericString` rendering: modifiers, generic type, then `Owner.name`.
pub fn field_generic_string(env: &dyn TypeEnv, owner: ClassId, field: &FieldDef) -> String {
    let mut parts = Vec::new();
    if let Some(vis) = field.visibility.keyword() {
        parts.push(vis.to_string());
    }
    if field.is_static {
        parts.push("static".to_string());
    }
    if field.is_final {
        parts.push("final".to_string());
    }
    parts.push(java_name_generic(env, &field.ty));
    parts.push(format!("{}.{}", class_name(env, owner), field.name));
    parts.join(" ")
}
