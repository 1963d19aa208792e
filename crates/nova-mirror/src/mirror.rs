//! The type handle and its classification predicates.

use std::fmt;
use std::sync::Arc;

use nova_types::{
    is_subtype, java_name, ClassDef, ClassId, ClassKind, PrimitiveType, Type, TypeEnv,
    WellKnownTypes,
};

use crate::error::{MirrorError, Result};
use crate::extractor::TypeExtractor;
use crate::reflector::Reflector;

/// A handle on one concrete (erased) type.
///
/// Cheap to clone; every introspection operation goes through it. Two mirrors of the same
/// type behave identically regardless of which one is used.
#[derive(Clone)]
pub struct Mirror<'r> {
    reflector: &'r Reflector,
    ty: Type,
    extractor: Arc<dyn TypeExtractor>,
}

impl fmt::Debug for Mirror<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Mirror").field(&self.to_string()).finish()
    }
}

impl fmt::Display for Mirror<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&java_name(self.env(), &self.ty))
    }
}

impl<'r> Mirror<'r> {
    pub(crate) fn new(
        reflector: &'r Reflector,
        ty: &Type,
        extractor: Arc<dyn TypeExtractor>,
    ) -> Self {
        Self {
            reflector,
            ty: ty.erasure(reflector.env()),
            extractor,
        }
    }

    pub fn reflector(&self) -> &'r Reflector {
        self.reflector
    }

    pub fn env(&self) -> &'r dyn TypeEnv {
        self.reflector.env()
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Swap the extraction strategy on this handle.
    pub fn with_extractor(mut self, extractor: Arc<dyn TypeExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Representative ancestor types as chosen by the handle's extraction strategy.
    pub fn extract_types(&self) -> Vec<Type> {
        self.extractor.extract(self)
    }

    pub(crate) fn wk(&self) -> &'r WellKnownTypes {
        self.env().well_known()
    }

    pub(crate) fn other(&self, ty: &Type) -> Mirror<'r> {
        Mirror::new(self.reflector, ty, self.extractor.clone())
    }

    pub fn class_id(&self) -> Option<ClassId> {
        self.ty.class_id()
    }

    pub fn class_def(&self) -> Option<&'r ClassDef> {
        self.class_id().and_then(|id| self.env().class(id))
    }

    pub(crate) fn name(&self) -> String {
        self.to_string()
    }

    /// Strict identity: a subtype is not `is` its supertype.
    pub fn is(&self, ty: &Type) -> bool {
        self.ty == ty.erasure(self.env())
    }

    pub fn is_class(&self, class: ClassId) -> bool {
        self.class_id() == Some(class) && !self.ty.is_array()
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name() == name
    }

    /// `true` when the wrapped type is `ty` or a subtype/implementer of it.
    pub fn is_of(&self, ty: &Type) -> bool {
        is_subtype(self.env(), &self.ty, &ty.erasure(self.env()))
    }

    pub(crate) fn is_of_class(&self, class: ClassId) -> bool {
        self.is_of(&Type::class(class, vec![]))
    }

    fn is_prim_or_wrapper(&self, prim: PrimitiveType) -> bool {
        self.ty == Type::Primitive(prim) || self.is_class(self.wk().wrapper_of(prim))
    }

    pub fn is_primitive(&self) -> bool {
        self.ty.is_primitive()
    }

    pub fn is_array(&self) -> bool {
        self.ty.is_array()
    }

    pub fn is_string(&self) -> bool {
        self.is_class(self.wk().string)
    }

    pub fn is_string_like(&self) -> bool {
        !self.is_primitive() && self.is_of_class(self.wk().char_sequence)
    }

    pub fn is_char(&self) -> bool {
        self.is_prim_or_wrapper(PrimitiveType::Char)
    }

    pub fn is_boolean(&self) -> bool {
        self.is_prim_or_wrapper(PrimitiveType::Boolean)
    }

    pub fn is_float(&self) -> bool {
        self.is_prim_or_wrapper(PrimitiveType::Float)
    }

    pub fn is_double(&self) -> bool {
        self.is_prim_or_wrapper(PrimitiveType::Double)
    }

    pub fn is_int(&self) -> bool {
        self.is_prim_or_wrapper(PrimitiveType::Int)
    }

    pub fn is_long(&self) -> bool {
        self.is_prim_or_wrapper(PrimitiveType::Long)
    }

    pub fn is_short(&self) -> bool {
        self.is_prim_or_wrapper(PrimitiveType::Short)
    }

    pub fn is_byte(&self) -> bool {
        self.is_prim_or_wrapper(PrimitiveType::Byte)
    }

    /// Integral kinds, plus `BigDecimal`.
    pub fn is_int_like(&self) -> bool {
        self.is_int()
            || self.is_long()
            || self.is_short()
            || self.is_byte()
            || self.is_class(self.wk().big_decimal)
    }

    pub fn is_decimal(&self) -> bool {
        self.is_float() || self.is_double()
    }

    /// A numeric primitive or its wrapper.
    pub fn is_primitive_number(&self) -> bool {
        self.is_int()
            || self.is_long()
            || self.is_float()
            || self.is_double()
            || self.is_byte()
            || self.is_short()
    }

    pub fn is_number(&self) -> bool {
        match &self.ty {
            Type::Primitive(prim) => prim.is_numeric(),
            Type::Void => false,
            _ => self.is_of_class(self.wk().number),
        }
    }

    pub fn is_enum(&self) -> bool {
        match self.class_def() {
            Some(def) if !self.is_array() => {
                def.kind == ClassKind::Enum
                    || (self.class_id() != Some(self.wk().enum_)
                        && self.is_of_class(self.wk().enum_))
            }
            _ => false,
        }
    }

    pub fn is_date_time_like(&self) -> bool {
        let wk = self.wk();
        [wk.calendar, wk.date, wk.sql_date, wk.sql_time]
            .into_iter()
            .any(|class| self.is_of_class(class))
    }

    pub fn is_collection(&self) -> bool {
        self.is_of_class(self.wk().collection)
    }

    pub fn is_list(&self) -> bool {
        self.is_of_class(self.wk().list)
    }

    pub fn is_map(&self) -> bool {
        self.is_of_class(self.wk().map)
    }

    /// The boxed counterpart of a primitive type; a wrapper type maps to itself.
    ///
    /// Fails for every type without primitive/wrapper duality.
    pub fn wrapper_class(&self) -> Result<Type> {
        boxed(self.env(), &self.ty)
            .map(|class| Type::class(class, vec![]))
            .ok_or_else(|| {
                MirrorError::invalid(format!("type [{self}] has no primitive/wrapper duality"))
            })
    }

    /// [`Mirror::wrapper_class`] for primitives, the type itself otherwise. Never fails.
    pub fn wrapper(&self) -> Type {
        if self.is_primitive() {
            if let Ok(wrapper) = self.wrapper_class() {
                return wrapper;
            }
        }
        self.ty.clone()
    }

    /// The primitive counterpart of a wrapper type; a primitive maps to itself.
    pub fn unwrapped(&self) -> Result<Type> {
        let wk = self.wk();
        if self.is_primitive() {
            return Ok(self.ty.clone());
        }
        if self.is_class(wk.void) {
            return Ok(Type::Void);
        }
        self.class_id()
            .and_then(|id| wk.primitive_of(id))
            .map(Type::Primitive)
            .ok_or_else(|| {
                MirrorError::invalid(format!("type [{self}] is not a primitive wrapper"))
            })
    }

    /// `true` when this type is the wrapper of `ty`.
    pub fn is_wrapper_of(&self, ty: &Type) -> bool {
        self.other(ty)
            .wrapper_class()
            .is_ok_and(|wrapper| wrapper == self.ty)
    }

    /// See [`can_cast_to_directly`].
    pub fn can_cast_to_directly(&self, target: &Type) -> bool {
        can_cast_to_directly(self.env(), &self.ty, target)
    }

    /// For a non-static nested class `Outer$Inner`, the enclosing class when it is known.
    pub fn outer_class(&self) -> Option<ClassId> {
        let def = self.class_def()?;
        if def.is_static || self.is_array() {
            return None;
        }
        let (outer, _) = def.name.rsplit_once('$')?;
        self.env().lookup_class(outer)
    }
}

/// The boxed representative of `ty`: the wrapper of a primitive (`Void` for `void`), or a
/// wrapper class itself.
fn boxed(env: &dyn TypeEnv, ty: &Type) -> Option<ClassId> {
    let wk = env.well_known();
    match ty {
        Type::Void => Some(wk.void),
        Type::Primitive(prim) => Some(wk.wrapper_of(*prim)),
        Type::Class(class) => wk.primitive_of(class.def).map(|_| class.def),
        _ => None,
    }
}

/// Whether a value of type `source` may be used where `target` is required: subtyping,
/// else primitive numeric widening (truncation allowed), else boxed/unboxed equivalence.
///
/// Reflexive but not transitive.
pub fn can_cast_to_directly(env: &dyn TypeEnv, source: &Type, target: &Type) -> bool {
    let source = source.erasure(env);
    let target = target.erasure(env);
    if source == target || is_subtype(env, &source, &target) {
        return true;
    }
    if let (Type::Primitive(a), Type::Primitive(b)) = (&source, &target) {
        if a.is_numeric() && b.is_numeric() {
            return true;
        }
    }
    match (boxed(env, &source), boxed(env, &target)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
