//! Member identities, borrowed member views and the name-based resolvers.

use std::collections::{HashSet, VecDeque};

use nova_types::{superclass_chain, ClassId, FieldDef, MethodDef, Type, TypeEnv, Visibility};

use crate::descriptor::{param_descriptor, type_descriptor};
use crate::error::{MirrorError, Result};
use crate::reflector::Reflector;
use crate::Mirror;

/// Index of a field in its owner's `ClassDef::fields`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldId {
    pub owner: ClassId,
    pub index: u32,
}

/// Index of a method in its owner's `ClassDef::methods`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MethodId {
    pub owner: ClassId,
    pub index: u32,
}

/// Index of a constructor in its owner's `ClassDef::constructors`, or the implicit
/// no-arg constructor of a class that declares none.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConstructorId {
    pub owner: ClassId,
    pub index: u32,
}

impl ConstructorId {
    const IMPLICIT: u32 = u32::MAX;

    pub fn implicit(owner: ClassId) -> Self {
        Self {
            owner,
            index: Self::IMPLICIT,
        }
    }

    pub fn is_implicit(&self) -> bool {
        self.index == Self::IMPLICIT
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Field<'r> {
    id: FieldId,
    def: &'r FieldDef,
}

impl<'r> Field<'r> {
    pub(crate) fn new(id: FieldId, def: &'r FieldDef) -> Self {
        Self { id, def }
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn owner(&self) -> ClassId {
        self.id.owner
    }

    pub fn name(&self) -> &'r str {
        &self.def.name
    }

    pub fn ty(&self) -> &'r Type {
        &self.def.ty
    }

    pub fn def(&self) -> &'r FieldDef {
        self.def
    }

    pub fn has_marker(&self, marker: ClassId) -> bool {
        self.def.annotations.contains(&marker)
    }

    /// Static fields and the synthetic outer-instance reference are never looked up.
    fn is_hidden(&self) -> bool {
        self.def.is_static || self.def.is_synthetic || self.def.name.starts_with("this$")
    }

    /// Discovery additionally skips final fields.
    fn is_ignored(&self) -> bool {
        self.is_hidden() || self.def.is_final
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Method<'r> {
    id: MethodId,
    def: &'r MethodDef,
}

impl<'r> Method<'r> {
    pub(crate) fn new(id: MethodId, def: &'r MethodDef) -> Self {
        Self { id, def }
    }

    pub fn id(&self) -> MethodId {
        self.id
    }

    pub fn owner(&self) -> ClassId {
        self.id.owner
    }

    pub fn name(&self) -> &'r str {
        &self.def.name
    }

    pub fn params(&self) -> &'r [Type] {
        &self.def.params
    }

    pub fn return_type(&self) -> &'r Type {
        &self.def.return_type
    }

    pub fn is_static(&self) -> bool {
        self.def.is_static
    }

    pub fn def(&self) -> &'r MethodDef {
        self.def
    }

    /// `name(descriptor)`: the key overrides share across a class chain.
    pub(crate) fn signature_key(&self, env: &dyn TypeEnv) -> String {
        format!("{}{}", self.def.name, param_descriptor(env, &self.def.params))
    }

    fn has_erased_params(&self, env: &dyn TypeEnv, params: &[Type]) -> bool {
        self.def.params.len() == params.len()
            && self
                .def
                .params
                .iter()
                .zip(params)
                .all(|(declared, given)| declared.erasure(env) == given.erasure(env))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Constructor<'r> {
    id: ConstructorId,
    params: &'r [Type],
}

impl<'r> Constructor<'r> {
    pub(crate) fn new(id: ConstructorId, params: &'r [Type]) -> Self {
        Self { id, params }
    }

    pub fn id(&self) -> ConstructorId {
        self.id
    }

    pub fn owner(&self) -> ClassId {
        self.id.owner
    }

    pub fn params(&self) -> &'r [Type] {
        self.params
    }
}

pub(crate) fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl<'r> Mirror<'r> {
    /// This class and its superclasses, stopping before `java.lang.Object`.
    pub(crate) fn class_chain(&self) -> Vec<ClassId> {
        let Some(class) = self.class_id() else {
            return Vec::new();
        };
        let object = self.wk().object;
        superclass_chain(self.env(), class)
            .into_iter()
            .take_while(|id| *id != object)
            .collect()
    }

    /// The superclass chain (including `Object`) followed by every reachable interface.
    pub(crate) fn hierarchy(&self) -> Vec<ClassId> {
        let Some(class) = self.class_id() else {
            return Vec::new();
        };
        let chain = superclass_chain(self.env(), class);
        let mut seen: HashSet<ClassId> = chain.iter().copied().collect();
        let mut queue: VecDeque<ClassId> = chain.iter().copied().collect();
        let mut out = chain;
        while let Some(id) = queue.pop_front() {
            let Some(def) = self.env().class(id) else {
                continue;
            };
            for iface in def.interfaces.iter().filter_map(Type::class_id) {
                if seen.insert(iface) {
                    out.push(iface);
                    queue.push_back(iface);
                }
            }
        }
        out
    }

    fn declared_fields(&self, owner: ClassId) -> Vec<Field<'r>> {
        let Some(def) = self.env().class(owner) else {
            return Vec::new();
        };
        def.fields
            .iter()
            .enumerate()
            .map(|(index, def)| {
                Field::new(
                    FieldId {
                        owner,
                        index: index as u32,
                    },
                    def,
                )
            })
            .collect()
    }

    pub(crate) fn declared_methods(&self, owner: ClassId) -> Vec<Method<'r>> {
        let Some(def) = self.env().class(owner) else {
            return Vec::new();
        };
        def.methods
            .iter()
            .enumerate()
            .map(|(index, def)| {
                Method::new(
                    MethodId {
                        owner,
                        index: index as u32,
                    },
                    def,
                )
            })
            .collect()
    }

    /// Every discoverable instance field of the chain, one per name, most-derived first.
    pub fn fields(&self) -> Vec<Field<'r>> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for owner in self.class_chain() {
            for field in self.declared_fields(owner) {
                if !field.is_ignored() && seen.insert(field.name()) {
                    out.push(field);
                }
            }
        }
        out
    }

    /// The first instance field called `name` walking up from this class, final ones
    /// included.
    pub fn field(&self, name: &str) -> Result<Field<'r>> {
        self.class_chain()
            .into_iter()
            .flat_map(|owner| self.declared_fields(owner))
            .find(|field| !field.is_hidden() && field.name() == name)
            .ok_or_else(|| MirrorError::not_found("field", self.name(), name))
    }

    /// The first discoverable field tagged with the `marker` annotation.
    pub fn field_by_marker(&self, marker: ClassId) -> Result<Field<'r>> {
        self.fields()
            .into_iter()
            .find(|field| field.has_marker(marker))
            .ok_or_else(|| {
                let marker = self.reflector().class_name(marker);
                MirrorError::not_found("field", self.name(), format!("@{marker}"))
            })
    }

    pub fn fields_by_marker(&self, marker: ClassId) -> Vec<Field<'r>> {
        self.fields()
            .into_iter()
            .filter(|field| field.has_marker(marker))
            .collect()
    }

    /// [`Mirror::field_by_marker`] without the error.
    pub fn find_field(reflector: &'r Reflector, ty: &Type, marker: ClassId) -> Option<Field<'r>> {
        reflector.mirror(ty).field_by_marker(marker).ok()
    }

    /// Every method declared along the chain (any visibility), duplicates kept.
    pub fn methods(&self) -> Vec<Method<'r>> {
        self.class_chain()
            .into_iter()
            .flat_map(|owner| self.declared_methods(owner))
            .collect()
    }

    /// Methods declared from this class up to (excluding) `top`, one per name and
    /// parameter descriptor, the most-derived declaration winning.
    pub fn all_declared_methods(&self, top: ClassId) -> Vec<Method<'r>> {
        let env = self.env();
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for owner in self.class_chain() {
            if owner == top {
                break;
            }
            for method in self.declared_methods(owner) {
                if seen.insert(method.signature_key(env)) {
                    out.push(method);
                }
            }
        }
        out
    }

    pub fn all_declared_methods_without_top(&self) -> Vec<Method<'r>> {
        self.all_declared_methods(self.wk().object)
    }

    /// Public methods, own and inherited (interfaces included), overridden ones hidden.
    pub fn public_methods(&self) -> Vec<Method<'r>> {
        let env = self.env();
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for owner in self.hierarchy() {
            for method in self.declared_methods(owner) {
                if method.def().visibility == Visibility::Public
                    && seen.insert(method.signature_key(env))
                {
                    out.push(method);
                }
            }
        }
        out
    }

    pub fn static_methods(&self) -> Vec<Method<'r>> {
        self.public_methods()
            .into_iter()
            .filter(Method::is_static)
            .collect()
    }

    /// The public method `name` with exactly these (erased) parameter types.
    pub fn get_method(&self, name: &str, params: &[Type]) -> Option<Method<'r>> {
        let env = self.env();
        self.public_methods()
            .into_iter()
            .find(|method| method.name() == name && method.has_erased_params(env, params))
    }

    /// Public methods called `name`, optionally restricted to one arity.
    pub fn find_methods(&self, name: &str, arity: Option<usize>) -> Vec<Method<'r>> {
        self.public_methods()
            .into_iter()
            .filter(|method| method.name() == name)
            .filter(|method| arity.map_or(true, |n| method.params().len() == n))
            .collect()
    }

    /// The first public method whose return and parameter types are exactly these.
    pub fn find_method_by_signature(
        &self,
        return_type: &Type,
        params: &[Type],
    ) -> Result<Method<'r>> {
        let env = self.env();
        let return_type = return_type.erasure(env);
        self.public_methods()
            .into_iter()
            .find(|method| {
                method.return_type().erasure(env) == return_type
                    && method.has_erased_params(env, params)
            })
            .ok_or_else(|| {
                MirrorError::not_found(
                    "method",
                    self.name(),
                    format!(
                        "{}{}",
                        param_descriptor(env, params),
                        type_descriptor(env, &return_type)
                    ),
                )
            })
    }

    /// Getter for the logical property `name`: `getX()`, then `isX()` when it returns a
    /// boolean, then a bare `x()`.
    pub fn getter(&self, name: &str) -> Result<Method<'r>> {
        let cap = capitalize(name);
        let candidates = [
            (format!("get{cap}"), false),
            (format!("is{cap}"), true),
            (name.to_string(), false),
        ];
        for (candidate, needs_boolean) in candidates {
            let Some(method) = self.get_method(&candidate, &[]) else {
                continue;
            };
            if !needs_boolean || self.other(method.return_type()).is_boolean() {
                return Ok(method);
            }
        }
        Err(MirrorError::not_found("getter", self.name(), name))
    }

    /// Getter for a known field: `isX()` for boolean fields, `getX()` otherwise, then a
    /// bare `x()`.
    pub fn getter_for_field(&self, field: &Field<'_>) -> Result<Method<'r>> {
        let cap = capitalize(field.name());
        let conventional = if self.other(field.ty()).is_boolean() {
            format!("is{cap}")
        } else {
            format!("get{cap}")
        };
        [conventional, field.name().to_string()]
            .iter()
            .find_map(|candidate| self.get_method(candidate, &[]))
            .ok_or_else(|| MirrorError::not_found("getter", self.name(), field.name()))
    }

    /// Setter for a known field: `setX(T)`, then `setSuffix(T)` for a boolean field named
    /// `isSuffix`, then a bare `x(T)`.
    pub fn setter_for_field(&self, field: &Field<'_>) -> Result<Method<'r>> {
        let name = field.name();
        let params = std::slice::from_ref(field.ty());
        let mut candidates = vec![format!("set{}", capitalize(name))];
        if let Some(suffix) = name.strip_prefix("is") {
            if self.other(field.ty()).is_boolean() {
                candidates.push(format!("set{suffix}"));
            }
        }
        candidates.push(name.to_string());

        candidates
            .iter()
            .find_map(|candidate| self.get_method(candidate, params))
            .ok_or_else(|| MirrorError::not_found("setter", self.name(), name))
    }

    /// Setter for `name` accepting a value of runtime type `value_ty`.
    ///
    /// Exact `setX(V)`, then bare `x(V)`, then the first one-parameter `setX`/`x` (in
    /// declaration order) whose parameter `V` can be cast to directly.
    pub fn setter(&self, name: &str, value_ty: &Type) -> Result<Method<'r>> {
        let setter_name = format!("set{}", capitalize(name));
        let params = std::slice::from_ref(value_ty);
        if let Some(method) = self
            .get_method(&setter_name, params)
            .or_else(|| self.get_method(name, params))
        {
            return Ok(method);
        }

        let value = self.other(value_ty);
        self.public_methods()
            .into_iter()
            .filter(|method| method.params().len() == 1)
            .filter(|method| method.name() == setter_name || method.name() == name)
            .find(|method| value.can_cast_to_directly(&method.params()[0]))
            .ok_or_else(|| {
                MirrorError::not_found("setter", self.name(), format!("{name}({value})"))
            })
    }

    /// Every non-static one-parameter public method literally named `setX`.
    pub fn find_setters(&self, name: &str) -> Vec<Method<'r>> {
        let setter_name = format!("set{}", capitalize(name));
        self.public_methods()
            .into_iter()
            .filter(|method| {
                !method.is_static() && method.params().len() == 1 && method.name() == setter_name
            })
            .collect()
    }
}
