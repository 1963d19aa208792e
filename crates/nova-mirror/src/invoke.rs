//! Overload resolution and invocation plans.
//!
//! Resolution is first-match in declaration order: an exact signature wins outright, then
//! the first candidate matching [`MatchType::Exact`], then the first matching
//! [`MatchType::Lack`]. There is no most-specific selection and no ambiguity error.

use std::fmt;

use nova_types::{ClassId, ClassKind, Type, TypeEnv, Visibility};
use tracing::{debug, trace};

use crate::cache::{CacheKey, CachedMember};
use crate::error::{MirrorError, Result};
use crate::members::{ConstructorId, Method, MethodId};
use crate::mirror::can_cast_to_directly;
use crate::reflector::Reflector;
use crate::value::{ArrayObject, ObjectRef, Value};
use crate::{Mirror, TRACE_TARGET};

/// How a declared parameter list relates to a caller's argument types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MatchType {
    /// Same arity and every argument castable to its parameter.
    Exact,
    /// The last parameter is an array; the leading arguments are castable and the trailing
    /// ones (possibly none) are gathered into that array.
    Lack,
    None,
}

/// Runtime types of `args` (`null` evaluates to `java.lang.Object`).
pub fn eval_to_types(env: &dyn TypeEnv, args: &[Value]) -> Vec<Type> {
    args.iter().map(|arg| arg.runtime_type(env)).collect()
}

fn all_castable(env: &dyn TypeEnv, args: &[Type], params: &[Type]) -> bool {
    args.iter()
        .zip(params)
        .all(|(arg, param)| can_cast_to_directly(env, arg, param))
}

pub fn match_param_types(env: &dyn TypeEnv, params: &[Type], arg_types: &[Type]) -> MatchType {
    if params.len() == arg_types.len() && all_castable(env, arg_types, params) {
        return MatchType::Exact;
    }
    let Some((last, leading)) = params.split_last() else {
        return MatchType::None;
    };
    if last.is_array()
        && arg_types.len() >= leading.len()
        && all_castable(env, &arg_types[..leading.len()], leading)
    {
        MatchType::Lack
    } else {
        MatchType::None
    }
}

/// How caller arguments are laid out before reaching a body.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArgPacking {
    /// Passed through unchanged.
    AsIs,
    /// Arguments from `from` onward packed into a fresh `component[]`.
    Packed { from: usize, component: Type },
    /// Heterogeneous trailing arguments from `from` onward, passed as an `Object[]`.
    Sequence { from: usize },
}

impl ArgPacking {
    fn plan(env: &dyn TypeEnv, params: &[Type], arg_types: &[Type], match_type: MatchType) -> Self {
        if match_type != MatchType::Lack {
            return ArgPacking::AsIs;
        }
        let Some(from) = params.len().checked_sub(1) else {
            return ArgPacking::AsIs;
        };
        let wk = env.well_known();
        let declared = params[from]
            .erasure(env)
            .component()
            .cloned()
            .unwrap_or_else(|| Type::class(wk.object, vec![]));

        match arg_types.get(from..).unwrap_or_default() {
            [] => ArgPacking::Packed {
                from,
                component: declared,
            },
            [single] if single.is_array() => ArgPacking::AsIs,
            [first, rest @ ..] if rest.iter().all(|ty| ty == first) => {
                let component = match &declared {
                    Type::Primitive(prim) if first.class_id() == Some(wk.wrapper_of(*prim)) => {
                        declared.clone()
                    }
                    _ => first.clone(),
                };
                ArgPacking::Packed { from, component }
            }
            _ => ArgPacking::Sequence { from },
        }
    }

    /// Lay `args` out for the body.
    pub fn apply(&self, env: &dyn TypeEnv, args: &[Value]) -> Vec<Value> {
        let (from, component) = match self {
            ArgPacking::AsIs => return args.to_vec(),
            ArgPacking::Packed { from, component } => (*from, component.clone()),
            ArgPacking::Sequence { from } => {
                (*from, Type::class(env.well_known().object, vec![]))
            }
        };
        let from = from.min(args.len());
        let mut out = args[..from].to_vec();
        out.push(Value::Array(ArrayObject::new(component, args[from..].to_vec())));
        out
    }
}

/// Picks the first EXACT candidate, else the first LACK one.
fn first_match<T: Copy>(
    env: &dyn TypeEnv,
    candidates: &[(T, &[Type])],
    arg_types: &[Type],
) -> Option<(T, MatchType)> {
    let mut lack = None;
    for (candidate, params) in candidates {
        match match_param_types(env, params, arg_types) {
            MatchType::Exact => return Some((*candidate, MatchType::Exact)),
            MatchType::Lack if lack.is_none() => lack = Some(*candidate),
            _ => {}
        }
    }
    lack.map(|candidate| (candidate, MatchType::Lack))
}

/// A resolved method call, reusable for argument lists of the same shape.
#[derive(Clone)]
pub struct Invoking<'r> {
    reflector: &'r Reflector,
    method: MethodId,
    match_type: MatchType,
    packing: ArgPacking,
}

impl fmt::Debug for Invoking<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invoking")
            .field("method", &self.method)
            .field("match_type", &self.match_type)
            .field("packing", &self.packing)
            .finish_non_exhaustive()
    }
}

impl<'r> Invoking<'r> {
    pub fn method_id(&self) -> MethodId {
        self.method
    }

    pub fn method(&self) -> Option<Method<'r>> {
        self.reflector.method(self.method)
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    pub fn packing(&self) -> &ArgPacking {
        &self.packing
    }

    /// Call the method on `receiver` (`Value::Null` for static methods).
    pub fn invoke(&self, receiver: &Value, args: &[Value]) -> Result<Value> {
        let args = self.packing.apply(self.reflector.env(), args);
        self.reflector.call(self.method, receiver, &args)
    }
}

/// A resolved constructor call.
#[derive(Clone)]
pub struct Borning<'r> {
    reflector: &'r Reflector,
    constructor: ConstructorId,
    match_type: MatchType,
    packing: ArgPacking,
}

impl fmt::Debug for Borning<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Borning")
            .field("constructor", &self.constructor)
            .field("match_type", &self.match_type)
            .field("packing", &self.packing)
            .finish_non_exhaustive()
    }
}

impl<'r> Borning<'r> {
    pub fn constructor_id(&self) -> ConstructorId {
        self.constructor
    }

    pub fn match_type(&self) -> MatchType {
        self.match_type
    }

    pub fn packing(&self) -> &ArgPacking {
        &self.packing
    }

    /// Allocate a new instance and run the constructor body against it.
    pub fn born(&self, args: &[Value]) -> Result<ObjectRef> {
        let reflector = self.reflector;
        let class = self.constructor.owner;
        let obj = reflector.allocate(class)?;
        if let Some(body) = reflector.constructor_body(self.constructor) {
            let args = self.packing.apply(reflector.env(), args);
            body(&obj, &args).map_err(|err| MirrorError::InvocationFailure {
                owner: reflector.class_name(class),
                method: "<init>".to_string(),
                message: format!("{err:#}"),
            })?;
        }
        Ok(obj)
    }
}

impl Reflector {
    /// Run `method` against `receiver`, dispatching on the receiver's runtime class: the
    /// most-derived bound body with the same name and parameter descriptor wins.
    pub fn call(&self, method: MethodId, receiver: &Value, args: &[Value]) -> Result<Value> {
        let resolved = self.method(method).ok_or_else(|| {
            MirrorError::invalid(format!(
                "method #{} of [{}] is not defined",
                method.index,
                self.class_name(method.owner)
            ))
        })?;
        let failure = |message: String| MirrorError::InvocationFailure {
            owner: self.class_name(method.owner),
            method: resolved.name().to_string(),
            message,
        };

        if !resolved.is_static() && receiver.is_null() {
            return Err(failure("null receiver".to_string()));
        }
        let body = self
            .dispatch(&resolved, receiver)
            .ok_or_else(|| failure("no body is bound (abstract method)".to_string()))?;
        body(receiver, args).map_err(|err| failure(format!("{err:#}")))
    }

    fn dispatch(&self, method: &Method<'_>, receiver: &Value) -> Option<&crate::NativeMethod> {
        if let (false, Some(obj)) = (method.is_static(), receiver.as_object()) {
            let env = self.env();
            let key = method.signature_key(env);
            let runtime = self.mirror_class(obj.class());
            for owner in runtime.hierarchy() {
                let found = runtime
                    .declared_methods(owner)
                    .into_iter()
                    .filter(|candidate| !candidate.is_static())
                    .filter(|candidate| candidate.signature_key(env) == key)
                    .find_map(|candidate| self.method_body(candidate.id()));
                if found.is_some() {
                    return found;
                }
            }
        }
        self.method_body(method.id())
    }
}

impl<'r> Mirror<'r> {
    fn resolve_method(&self, name: &str, arg_types: &[Type]) -> Result<(Method<'r>, MatchType)> {
        if let Some(method) = self.get_method(name, arg_types) {
            debug!(target: TRACE_TARGET, ty = %self, name, "exact signature match");
            return Ok((method, MatchType::Exact));
        }

        let candidates: Vec<(Method<'r>, &[Type])> = self
            .public_methods()
            .into_iter()
            .filter(|method| method.name() == name)
            .map(|method| (method, method.params()))
            .collect();
        match first_match(self.env(), &candidates, arg_types) {
            Some((method, match_type)) => {
                debug!(
                    target: TRACE_TARGET,
                    ty = %self,
                    name,
                    ?match_type,
                    owner = method.owner().to_raw(),
                    "overload resolved"
                );
                Ok((method, match_type))
            }
            None => {
                let shape: Vec<String> = arg_types
                    .iter()
                    .map(|ty| nova_types::java_name(self.env(), ty))
                    .collect();
                Err(MirrorError::not_found(
                    "method",
                    self.name(),
                    format!("{name}({})", shape.join(", ")),
                ))
            }
        }
    }

    /// The public method `name` accepting `param_types`: exact signature first, then the
    /// first EXACT, then the first LACK candidate.
    pub fn find_method(&self, name: &str, param_types: &[Type]) -> Result<Method<'r>> {
        self.resolve_method(name, param_types).map(|(method, _)| method)
    }

    fn cached(&self, key: &CacheKey) -> Option<CachedMember> {
        let cache = self.reflector().cache()?;
        let hit = cache.get(key);
        trace!(
            target: TRACE_TARGET,
            ty = %self,
            name = %key.name,
            hit = hit.is_some(),
            "member cache lookup"
        );
        hit
    }

    fn remember(&self, key: CacheKey, member: CachedMember) {
        if let Some(cache) = self.reflector().cache() {
            cache.insert(key, member);
        }
    }

    /// Resolve `name` for a call with `args` into a reusable plan.
    pub fn invoking(&self, name: &str, args: &[Value]) -> Result<Invoking<'r>> {
        let env = self.env();
        let arg_types = eval_to_types(env, args);
        let key = CacheKey::new(self.ty().clone(), name, arg_types.clone());
        if let Some(CachedMember::Method {
            id,
            match_type,
            packing,
        }) = self.cached(&key)
        {
            return Ok(Invoking {
                reflector: self.reflector(),
                method: id,
                match_type,
                packing,
            });
        }

        let (method, match_type) = self.resolve_method(name, &arg_types)?;
        let packing = ArgPacking::plan(env, method.params(), &arg_types, match_type);
        self.remember(
            key,
            CachedMember::Method {
                id: method.id(),
                match_type,
                packing: packing.clone(),
            },
        );
        Ok(Invoking {
            reflector: self.reflector(),
            method: method.id(),
            match_type,
            packing,
        })
    }

    /// Resolve and call `name` on `receiver` in one step.
    pub fn invoke(&self, receiver: &Value, name: &str, args: &[Value]) -> Result<Value> {
        self.invoking(name, args)?.invoke(receiver, args)
    }

    fn instantiable(&self) -> Result<ClassId> {
        let def = self
            .class_def()
            .ok_or_else(|| MirrorError::invalid(format!("type [{self}] can not be instantiated")))?;
        if def.is_abstract || matches!(def.kind, ClassKind::Interface | ClassKind::Annotation) {
            return Err(MirrorError::invalid(format!(
                "can not instantiate abstract type [{self}]"
            )));
        }
        self.class_id()
            .ok_or_else(|| MirrorError::invalid(format!("type [{self}] can not be instantiated")))
    }

    /// Resolve the constructor a `new` with `args` would run.
    ///
    /// A class declaring no constructors has the implicit public no-arg one.
    pub fn borning(&self, args: &[Value]) -> Result<Borning<'r>> {
        let class = self.instantiable()?;
        let env = self.env();
        let arg_types = eval_to_types(env, args);
        let key = CacheKey::new(self.ty().clone(), "", arg_types.clone());
        if let Some(CachedMember::Constructor {
            id,
            match_type,
            packing,
        }) = self.cached(&key)
        {
            return Ok(Borning {
                reflector: self.reflector(),
                constructor: id,
                match_type,
                packing,
            });
        }

        let declared = self
            .class_def()
            .map(|def| def.constructors.as_slice())
            .unwrap_or_default();
        let no_params: &[Type] = &[];
        let resolved = if declared.is_empty() {
            arg_types
                .is_empty()
                .then_some((ConstructorId::implicit(class), MatchType::Exact, no_params))
        } else {
            let candidates: Vec<(ConstructorId, &[Type])> = declared
                .iter()
                .enumerate()
                .filter(|(_, ctor)| ctor.visibility == Visibility::Public)
                .map(|(index, ctor)| {
                    (
                        ConstructorId {
                            owner: class,
                            index: index as u32,
                        },
                        ctor.params.as_slice(),
                    )
                })
                .collect();
            let exact = candidates.iter().find(|(_, params)| {
                params.len() == arg_types.len()
                    && params
                        .iter()
                        .zip(&arg_types)
                        .all(|(param, arg)| param.erasure(env) == *arg)
            });
            match exact {
                Some((id, params)) => Some((*id, MatchType::Exact, *params)),
                None => first_match(env, &candidates, &arg_types).and_then(|(id, match_type)| {
                    candidates
                        .iter()
                        .find(|(candidate, _)| *candidate == id)
                        .map(|(_, params)| (id, match_type, *params))
                }),
            }
        };

        let Some((id, match_type, params)) = resolved else {
            let shape: Vec<String> = arg_types
                .iter()
                .map(|ty| nova_types::java_name(env, ty))
                .collect();
            return Err(MirrorError::not_found(
                "constructor",
                self.name(),
                format!("<init>({})", shape.join(", ")),
            ));
        };
        debug!(target: TRACE_TARGET, ty = %self, ?match_type, "constructor resolved");

        let packing = ArgPacking::plan(env, params, &arg_types, match_type);
        self.remember(
            key,
            CachedMember::Constructor {
                id,
                match_type,
                packing: packing.clone(),
            },
        );
        Ok(Borning {
            reflector: self.reflector(),
            constructor: id,
            match_type,
            packing,
        })
    }

    /// Resolve a constructor for `args`, allocate and run it.
    pub fn born(&self, args: &[Value]) -> Result<ObjectRef> {
        self.borning(args)?.born(args)
    }
}
