use std::collections::{HashSet, VecDeque};

use crate::{ClassId, ClassKind, ClassType, Type, TypeEnv, WildcardBound};

/// Walk the `extends` chain of `class`, starting with `class` itself.
///
/// Interfaces have no superclass chain beyond themselves.
pub fn superclass_chain(env: &dyn TypeEnv, class: ClassId) -> Vec<ClassId> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut current = Some(class);
    while let Some(id) = current {
        if !seen.insert(id) {
            break;
        }
        out.push(id);
        current = env
            .class(id)
            .and_then(|def| def.super_class.as_ref())
            .and_then(Type::class_id);
    }
    out
}

/// Erased `sub <: sup` over classes and interfaces (`Class#isAssignableFrom`).
pub fn is_subclass(env: &dyn TypeEnv, sub: ClassId, sup: ClassId) -> bool {
    if sub == sup || sup == env.well_known().object {
        return true;
    }

    let mut queue = VecDeque::from([sub]);
    let mut seen = HashSet::new();
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current) {
            continue;
        }
        if current == sup {
            return true;
        }
        let Some(def) = env.class(current) else {
            continue;
        };
        if let Some(id) = def.super_class.as_ref().and_then(Type::class_id) {
            queue.push_back(id);
        }
        queue.extend(def.interfaces.iter().filter_map(Type::class_id));
        if def.kind == ClassKind::Interface {
            queue.push_back(env.well_known().object);
        }
    }
    false
}

/// Erased assignability: `true` when a value of type `sub` can be stored where `sup` is
/// declared, without boxing or primitive widening.
///
/// Type arguments are ignored (reflection operates on runtime classes).
pub fn is_subtype(env: &dyn TypeEnv, sub: &Type, sup: &Type) -> bool {
    if sub == sup {
        return true;
    }

    let wk = env.well_known();
    match (sub, sup) {
        (Type::Primitive(a), Type::Primitive(b)) => a == b,
        (Type::Void, _) | (_, Type::Void) => false,
        (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
        (Type::Array(_), Type::Class(ClassType { def, .. })) => {
            *def == wk.object || *def == wk.cloneable || *def == wk.serializable
        }
        (Type::Array(a), Type::Array(b)) => match (a.as_ref(), b.as_ref()) {
            (Type::Primitive(x), Type::Primitive(y)) => x == y,
            (Type::Primitive(_), _) | (_, Type::Primitive(_)) => false,
            (a, b) => is_subtype(env, a, b),
        },
        (Type::Class(_), Type::Array(_)) => false,
        (Type::Class(ClassType { def: a, .. }), Type::Class(ClassType { def: b, .. })) => {
            is_subclass(env, *a, *b)
        }
        (Type::TypeVar(_) | Type::Wildcard(_), _) => {
            let erased = sub.erasure(env);
            erased != *sub && is_subtype(env, &erased, sup)
        }
        (_, Type::Wildcard(WildcardBound::Unbounded)) => true,
        (_, Type::TypeVar(_) | Type::Wildcard(_)) => {
            let erased = sup.erasure(env);
            erased != *sup && is_subtype(env, sub, &erased)
        }
    }
}
