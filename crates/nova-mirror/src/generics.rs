//! Generic type arguments of superclasses and fields.

use nova_types::{field_generic_string, superclass_chain, ClassType, Type, TypeEnv};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::error::{MirrorError, Result};
use crate::members::Field;
use crate::{Mirror, TRACE_TARGET};

static GENERIC_ARGS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(<)(.+)(>)").expect("valid regex"));

fn is_concrete(ty: &Type) -> bool {
    match ty {
        Type::Class(ClassType { args, .. }) => args.is_empty(),
        Type::Array(component) => is_concrete(component),
        Type::Primitive(_) => true,
        _ => false,
    }
}

impl<'r> Mirror<'r> {
    /// Type arguments of the nearest parameterized superclass.
    ///
    /// `None` when the walk reaches `Object` (or a class without a superclass) first.
    pub fn type_params(&self) -> Option<Vec<Type>> {
        let env = self.env();
        let object = self.wk().object;
        for class in superclass_chain(env, self.class_id()?) {
            let super_class = env.class(class)?.super_class.as_ref()?;
            match super_class {
                Type::Class(ClassType { def, .. }) if *def == object => return None,
                Type::Class(ClassType { args, .. }) if !args.is_empty() => {
                    return Some(args.clone())
                }
                _ => {}
            }
        }
        None
    }

    /// One concrete superclass type argument.
    pub fn type_param(&self, index: usize) -> Result<Type> {
        let params = self.type_params().unwrap_or_default();
        let Some(param) = params.get(index) else {
            return Err(MirrorError::invalid(format!(
                "class type param out of range {index}/{}",
                params.len()
            )));
        };
        if !is_concrete(param) {
            return Err(MirrorError::invalid(format!(
                "type '{}' is not a class",
                nova_types::java_name_generic(self.env(), param)
            )));
        }
        Ok(param.clone())
    }

    /// Erased type arguments of a field's declared type (`List<String>` gives `String`).
    ///
    /// Wildcards and type variables become `Object`.
    pub fn generic_types(&self, field: &Field<'_>) -> Vec<Type> {
        let env = self.env();
        let object = Type::class(self.wk().object, vec![]);
        match field.ty() {
            Type::Class(ClassType { args, .. }) => args
                .iter()
                .map(|arg| match arg {
                    Type::Class(_) | Type::Array(_) => arg.erasure(env),
                    _ => object.clone(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Legacy text-based variant of [`Mirror::generic_types`]: scrapes the field's generic
    /// string. Prefer the structured form.
    pub fn generic_types_from_signature(&self, field: &Field<'_>) -> Vec<Type> {
        let env = self.env();
        let text = field_generic_string(env, field.owner(), field.def());
        let Some(args) = GENERIC_ARGS_RE.captures(&text).and_then(|caps| caps.get(2)) else {
            return Vec::new();
        };

        let object = Type::class(self.wk().object, vec![]);
        args.as_str()
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                if name.starts_with('?') {
                    return object.clone();
                }
                let raw = name.split('<').next().unwrap_or(name);
                match env.lookup_class(raw) {
                    Some(class) => Type::class(class, vec![]),
                    None => {
                        warn!(
                            target: TRACE_TARGET,
                            field = field.name(),
                            class = raw,
                            "unknown class in generic signature; using java.lang.Object"
                        );
                        object.clone()
                    }
                }
            })
            .collect()
    }
}
