//! Class metadata model shared by Nova's reflection crates.
//!
//! A [`TypeStore`] holds erased-plus-generic descriptions of classes
//! ([`ClassDef`]) the way a JVM would expose them through reflection: declared
//! fields, methods and constructors, the (possibly parameterized) superclass and
//! interfaces, and per-member modifiers. Nothing here touches live instances.

#![forbid(unsafe_code)]

use std::collections::HashMap;
use std::fmt;

mod format;
mod minimal_jdk;
mod subtyping;

pub use format::{field_generic_string, java_name, java_name_generic};
pub use subtyping::{is_subclass, is_subtype, superclass_chain};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    pub fn to_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVarId(u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Char,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    /// `true` for the six numeric kinds (everything but `boolean` and `char`).
    pub fn is_numeric(self) -> bool {
        !matches!(self, PrimitiveType::Boolean | PrimitiveType::Char)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<Type>),
    Super(Box<Type>),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub def: ClassId,
    pub args: Vec<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Primitive(PrimitiveType),
    Class(ClassType),
    Array(Box<Type>),
    TypeVar(TypeVarId),
    Wildcard(WildcardBound),
}

impl Type {
    pub fn class(def: ClassId, args: Vec<Type>) -> Self {
        Type::Class(ClassType { def, args })
    }

    pub fn array(component: Type) -> Self {
        Type::Array(Box::new(component))
    }

    pub fn boolean() -> Self {
        Type::Primitive(PrimitiveType::Boolean)
    }

    pub fn char() -> Self {
        Type::Primitive(PrimitiveType::Char)
    }

    pub fn int() -> Self {
        Type::Primitive(PrimitiveType::Int)
    }

    pub fn long() -> Self {
        Type::Primitive(PrimitiveType::Long)
    }

    pub fn double() -> Self {
        Type::Primitive(PrimitiveType::Double)
    }

    pub fn float() -> Self {
        Type::Primitive(PrimitiveType::Float)
    }

    /// `void` counts as primitive, matching `Class#isPrimitive`.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_) | Type::Void)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Type::Array(_))
    }

    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            Type::Class(ClassType { def, .. }) => Some(*def),
            _ => None,
        }
    }

    pub fn component(&self) -> Option<&Type> {
        match self {
            Type::Array(component) => Some(component),
            _ => None,
        }
    }

    /// Drop type arguments, keeping only the runtime (erased) shape.
    ///
    /// Type variables and wildcards erase to their first upper bound, or `Object`.
    pub fn erasure(&self, env: &dyn TypeEnv) -> Type {
        match self {
            Type::Class(ClassType { def, .. }) => Type::class(*def, vec![]),
            Type::Array(component) => Type::array(component.erasure(env)),
            Type::TypeVar(id) => env
                .type_param(*id)
                .and_then(|tp| tp.upper_bounds.first())
                .map(|bound| bound.erasure(env))
                .unwrap_or_else(|| Type::class(env.well_known().object, vec![])),
            Type::Wildcard(WildcardBound::Extends(upper)) => upper.erasure(env),
            Type::Wildcard(_) => Type::class(env.well_known().object, vec![]),
            other => other.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Package,
    Private,
}

impl Visibility {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            Visibility::Public => Some("public"),
            Visibility::Protected => Some("protected"),
            Visibility::Package => None,
            Visibility::Private => Some("private"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParamDef {
    pub name: String,
    pub upper_bounds: Vec<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub ty: Type,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    /// Compiler-generated (e.g. the `this$0` outer-instance reference).
    pub is_synthetic: bool,
    /// Annotation types present on the field.
    pub annotations: Vec<ClassId>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            visibility: Visibility::Private,
            is_static: false,
            is_final: false,
            is_synthetic: false,
            annotations: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDef {
    pub name: String,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_varargs: bool,
    pub is_abstract: bool,
}

impl MethodDef {
    pub fn new(name: impl Into<String>, params: Vec<Type>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
            visibility: Visibility::Public,
            is_static: false,
            is_varargs: false,
            is_abstract: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructorDef {
    pub params: Vec<Type>,
    pub visibility: Visibility,
    pub is_varargs: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassDef {
    /// Binary name, e.g. `com.example.Outer$Inner`.
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<TypeVarId>,
    /// The generic superclass as declared (`Base<String>`), `None` for `Object` and interfaces.
    pub super_class: Option<Type>,
    pub interfaces: Vec<Type>,
    /// For nested classes: whether the class is `static` (has no outer instance).
    pub is_static: bool,
    pub is_abstract: bool,
    pub fields: Vec<FieldDef>,
    pub constructors: Vec<ConstructorDef>,
    pub methods: Vec<MethodDef>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub char_sequence: ClassId,
    pub number: ClassId,
    pub boolean: ClassId,
    pub character: ClassId,
    pub byte: ClassId,
    pub short: ClassId,
    pub integer: ClassId,
    pub long: ClassId,
    pub float: ClassId,
    pub double: ClassId,
    pub void: ClassId,
    pub big_decimal: ClassId,
    pub big_integer: ClassId,
    pub enum_: ClassId,
    pub calendar: ClassId,
    pub date: ClassId,
    pub sql_date: ClassId,
    pub sql_time: ClassId,
    pub sql_timestamp: ClassId,
    pub iterable: ClassId,
    pub collection: ClassId,
    pub list: ClassId,
    pub set: ClassId,
    pub map: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
    /// `java.lang.reflect.Array`, the representative type of every array.
    pub array: ClassId,
}

impl WellKnownTypes {
    /// Boxed counterpart of a primitive kind.
    pub fn wrapper_of(&self, prim: PrimitiveType) -> ClassId {
        match prim {
            PrimitiveType::Boolean => self.boolean,
            PrimitiveType::Byte => self.byte,
            PrimitiveType::Short => self.short,
            PrimitiveType::Char => self.character,
            PrimitiveType::Int => self.integer,
            PrimitiveType::Long => self.long,
            PrimitiveType::Float => self.float,
            PrimitiveType::Double => self.double,
        }
    }

    /// Inverse of [`WellKnownTypes::wrapper_of`].
    pub fn primitive_of(&self, wrapper: ClassId) -> Option<PrimitiveType> {
        PrimitiveType::ALL
            .into_iter()
            .find(|prim| self.wrapper_of(*prim) == wrapper)
    }
}

/// Read-only view over class metadata.
pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;
    fn lookup_class(&self, name: &str) -> Option<ClassId>;
    fn well_known(&self) -> &WellKnownTypes;
}

#[derive(Clone, Debug)]
pub struct TypeStore {
    classes: Vec<ClassDef>,
    by_name: HashMap<String, ClassId>,
    type_params: Vec<TypeParamDef>,
    well_known: Option<WellKnownTypes>,
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::with_minimal_jdk()
    }
}

impl TypeStore {
    fn empty() -> Self {
        Self {
            classes: Vec::new(),
            by_name: HashMap::new(),
            type_params: Vec::new(),
            well_known: None,
        }
    }

    /// A store pre-populated with the `java.*` types reflection code asks about.
    pub fn with_minimal_jdk() -> Self {
        let mut store = Self::empty();
        let well_known = minimal_jdk::populate(&mut store);
        store.well_known = Some(well_known);
        store
    }

    /// Reserve an id for `name`, creating an empty placeholder definition if needed.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(ClassDef {
            name: name.to_string(),
            ..ClassDef::default()
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Replace the definition behind an interned id.
    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        let idx = id.0 as usize;
        if let Some(old) = self.classes.get(idx) {
            if old.name != def.name {
                self.by_name.remove(&old.name);
                self.by_name.insert(def.name.clone(), id);
            }
            self.classes[idx] = def;
        }
    }

    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        self.upsert_class(def)
    }

    /// Define `def`, reusing the existing id when a class of the same name exists.
    pub fn upsert_class(&mut self, def: ClassDef) -> ClassId {
        let id = self.intern_class_id(&def.name);
        self.define_class(id, def);
        id
    }

    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut ClassDef> {
        self.classes.get_mut(id.0 as usize)
    }

    /// Exact binary-name lookup (no implicit `java.lang` import).
    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub fn add_type_param(&mut self, name: &str, upper_bounds: Vec<Type>) -> TypeVarId {
        let id = TypeVarId(self.type_params.len() as u32);
        self.type_params.push(TypeParamDef {
            name: name.to_string(),
            upper_bounds,
        });
        id
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassDef)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(idx, def)| (ClassId(idx as u32), def))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.0 as usize)
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.type_params.get(id.0 as usize)
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        if let Some(id) = self.class_id(name) {
            return Some(id);
        }
        if !name.contains('.') {
            return self.class_id(&format!("java.lang.{name}"));
        }
        None
    }

    fn well_known(&self) -> &WellKnownTypes {
        self.well_known
            .as_ref()
            .unwrap_or_else(|| unreachable!("TypeStore is always built with well-known types"))
    }
}
