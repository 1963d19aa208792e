use std::sync::Arc;

use nova_types::{
    ClassDef, ClassId, ClassKind, ConstructorDef, FieldDef, MethodDef, Type, TypeEnv, TypeVarId,
    Visibility,
};

use crate::members::{ConstructorId, MethodId};
use crate::reflector::{NativeConstructor, NativeMethod, Reflector};
use crate::value::{ObjectRef, Value};

/// Fluent registration of a class together with its member bodies.
///
/// Classes extend `java.lang.Object` (enums `java.lang.Enum`) unless [`ClassBuilder::extends`]
/// says otherwise.
pub struct ClassBuilder {
    def: ClassDef,
    method_bodies: Vec<Option<NativeMethod>>,
    constructor_bodies: Vec<Option<NativeConstructor>>,
    enum_constants: Vec<String>,
}

impl ClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            def: ClassDef {
                name: name.into(),
                ..ClassDef::default()
            },
            method_bodies: Vec::new(),
            constructor_bodies: Vec::new(),
            enum_constants: Vec::new(),
        }
    }

    pub fn interface(name: impl Into<String>) -> Self {
        let mut builder = Self::new(name);
        builder.def.kind = ClassKind::Interface;
        builder.def.is_abstract = true;
        builder
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        let mut builder = Self::new(name);
        builder.def.kind = ClassKind::Enum;
        builder
    }

    pub fn extends(mut self, super_class: Type) -> Self {
        self.def.super_class = Some(super_class);
        self
    }

    pub fn implements(mut self, interface: Type) -> Self {
        self.def.interfaces.push(interface);
        self
    }

    pub fn type_param(mut self, param: TypeVarId) -> Self {
        self.def.type_params.push(param);
        self
    }

    /// For nested classes: no outer instance.
    pub fn is_static(mut self, is_static: bool) -> Self {
        self.def.is_static = is_static;
        self
    }

    pub fn is_abstract(mut self, is_abstract: bool) -> Self {
        self.def.is_abstract = is_abstract;
        self
    }

    /// A private instance field.
    pub fn field(self, name: impl Into<String>, ty: Type) -> Self {
        self.field_def(FieldDef::new(name, ty))
    }

    pub fn field_def(mut self, field: FieldDef) -> Self {
        self.def.fields.push(field);
        self
    }

    /// A public instance method.
    pub fn method<F>(self, name: impl Into<String>, params: Vec<Type>, ret: Type, body: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.method_def(MethodDef::new(name, params, ret), Some(Arc::new(body)))
    }

    /// A public static method; its body receives `Value::Null` as receiver.
    pub fn static_method<F>(
        self,
        name: impl Into<String>,
        params: Vec<Type>,
        ret: Type,
        body: F,
    ) -> Self
    where
        F: Fn(&Value, &[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        let def = MethodDef {
            is_static: true,
            ..MethodDef::new(name, params, ret)
        };
        self.method_def(def, Some(Arc::new(body)))
    }

    /// A public method without a body; invoking it fails unless a subclass overrides it.
    pub fn abstract_method(self, name: impl Into<String>, params: Vec<Type>, ret: Type) -> Self {
        let def = MethodDef {
            is_abstract: true,
            ..MethodDef::new(name, params, ret)
        };
        self.method_def(def, None)
    }

    pub fn method_def(mut self, def: MethodDef, body: Option<NativeMethod>) -> Self {
        self.def.methods.push(def);
        self.method_bodies.push(body);
        self
    }

    /// A public constructor.
    pub fn constructor<F>(self, params: Vec<Type>, body: F) -> Self
    where
        F: Fn(&ObjectRef, &[Value]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let def = ConstructorDef {
            params,
            visibility: Visibility::Public,
            is_varargs: false,
        };
        self.constructor_def(def, Some(Arc::new(body)))
    }

    pub fn constructor_def(mut self, def: ConstructorDef, body: Option<NativeConstructor>) -> Self {
        self.def.constructors.push(def);
        self.constructor_bodies.push(body);
        self
    }

    /// A constant of an enum class: a `public static final` field holding the instance.
    pub fn enum_constant(mut self, name: impl Into<String>) -> Self {
        self.enum_constants.push(name.into());
        self
    }

    /// Define the class in the reflector's store and bind its bodies.
    pub fn register(self, reflector: &mut Reflector) -> ClassId {
        let Self {
            mut def,
            method_bodies,
            constructor_bodies,
            enum_constants,
        } = self;

        let wk = reflector.env().well_known();
        if def.super_class.is_none() {
            def.super_class = match def.kind {
                ClassKind::Class => Some(Type::class(wk.object, vec![])),
                ClassKind::Enum => Some(Type::class(wk.enum_, vec![])),
                ClassKind::Interface | ClassKind::Annotation => None,
            };
        }

        let store = reflector.store_mut();
        let id = store.intern_class_id(&def.name);
        for constant in &enum_constants {
            def.fields.push(FieldDef {
                visibility: Visibility::Public,
                is_static: true,
                is_final: true,
                ..FieldDef::new(constant.clone(), Type::class(id, vec![]))
            });
        }
        store.define_class(id, def);
        reflector.unbind_class(id);

        for (index, body) in method_bodies.into_iter().enumerate() {
            if let Some(body) = body {
                let method = MethodId {
                    owner: id,
                    index: index as u32,
                };
                reflector.bind_method(method, body);
            }
        }
        for (index, body) in constructor_bodies.into_iter().enumerate() {
            if let Some(body) = body {
                let constructor = ConstructorId {
                    owner: id,
                    index: index as u32,
                };
                reflector.bind_constructor(constructor, body);
            }
        }
        for constant in enum_constants {
            if let Ok(obj) = reflector.allocate_named(id, Some(constant.clone())) {
                reflector.set_static_value(id, &constant, Value::Object(obj));
            }
        }
        id
    }
}
