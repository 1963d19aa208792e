use std::collections::HashMap;
use std::sync::Arc;

use nova_types::{superclass_chain, ClassId, ClassKind, Type, TypeEnv, TypeStore};
use parking_lot::RwLock;

use crate::cache::MemberCache;
use crate::castor::{Castor, DefaultCastor};
use crate::config::MirrorConfig;
use crate::error::{MirrorError, Result};
use crate::extractor::{DefaultTypeExtractor, TypeExtractor};
use crate::members::{Constructor, ConstructorId, Field, FieldId, Method, MethodId};
use crate::value::{Instance, ObjectRef, Value};
use crate::Mirror;

/// Body of a method: receiver (`Null` for static methods) and the already-packed arguments.
pub type NativeMethod = Arc<dyn Fn(&Value, &[Value]) -> anyhow::Result<Value> + Send + Sync>;

/// Body of a constructor, run against a freshly allocated instance.
pub type NativeConstructor = Arc<dyn Fn(&ObjectRef, &[Value]) -> anyhow::Result<()> + Send + Sync>;

/// Owner of class metadata and everything needed to act on live instances: bound member
/// bodies, static values, the value-coercion facility and the optional plan cache.
///
/// A `Reflector` is `Send + Sync`; [`Mirror`] handles borrow it.
pub struct Reflector {
    store: TypeStore,
    methods: HashMap<MethodId, NativeMethod>,
    constructors: HashMap<ConstructorId, NativeConstructor>,
    statics: RwLock<HashMap<(ClassId, String), Value>>,
    castor: Arc<dyn Castor>,
    extractor: Arc<dyn TypeExtractor>,
    cache: Option<Arc<MemberCache>>,
    config: MirrorConfig,
}

impl Default for Reflector {
    fn default() -> Self {
        Self::new(TypeStore::with_minimal_jdk())
    }
}

impl Reflector {
    pub fn new(store: TypeStore) -> Self {
        Self::with_config(store, MirrorConfig::default())
    }

    pub fn with_config(store: TypeStore, config: MirrorConfig) -> Self {
        let cache = config
            .cache
            .enabled
            .then(|| Arc::new(MemberCache::new(config.cache.max_entries)));
        Self {
            store,
            methods: HashMap::new(),
            constructors: HashMap::new(),
            statics: RwLock::new(HashMap::new()),
            castor: Arc::new(DefaultCastor),
            extractor: Arc::new(DefaultTypeExtractor),
            cache,
            config,
        }
    }

    /// Replace the value-coercion facility used by field writes.
    pub fn set_castor(&mut self, castor: Arc<dyn Castor>) {
        self.castor = castor;
    }

    /// Share a plan cache between reflectors (or drop caching with `None`).
    pub fn set_cache(&mut self, cache: Option<Arc<MemberCache>>) {
        self.cache = cache;
    }

    /// The extraction strategy handed to new mirrors by default.
    pub fn set_default_extractor(&mut self, extractor: Arc<dyn TypeExtractor>) {
        self.extractor = extractor;
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    pub fn store(&self) -> &TypeStore {
        &self.store
    }

    /// Mutating the store invalidates nothing already bound, but cached plans may go stale;
    /// the cache is cleared.
    pub fn store_mut(&mut self) -> &mut TypeStore {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
        &mut self.store
    }

    pub fn env(&self) -> &dyn TypeEnv {
        &self.store
    }

    pub fn castor(&self) -> &dyn Castor {
        self.castor.as_ref()
    }

    pub fn cache(&self) -> Option<&MemberCache> {
        self.cache.as_deref()
    }

    pub fn mirror(&self, ty: &Type) -> Mirror<'_> {
        Mirror::new(self, ty, self.extractor.clone())
    }

    pub fn mirror_class(&self, class: ClassId) -> Mirror<'_> {
        self.mirror(&Type::class(class, vec![]))
    }

    /// A mirror of the value's runtime class; `None` for `null`.
    pub fn mirror_of(&self, value: &Value) -> Option<Mirror<'_>> {
        if value.is_null() {
            return None;
        }
        Some(self.mirror(&value.runtime_type(self.env())))
    }

    /// A mirror with a caller-chosen extraction strategy.
    pub fn mirror_with(&self, ty: &Type, extractor: Arc<dyn TypeExtractor>) -> Mirror<'_> {
        Mirror::new(self, ty, extractor)
    }

    pub fn class_name(&self, class: ClassId) -> String {
        nova_types::java_name(self.env(), &Type::class(class, vec![]))
    }

    pub fn bind_method(&mut self, id: MethodId, body: NativeMethod) {
        self.methods.insert(id, body);
    }

    pub fn bind_constructor(&mut self, id: ConstructorId, body: NativeConstructor) {
        self.constructors.insert(id, body);
    }

    /// Drop every body and static value bound to `class`, ahead of redefining it.
    pub fn unbind_class(&mut self, class: ClassId) {
        self.methods.retain(|id, _| id.owner != class);
        self.constructors.retain(|id, _| id.owner != class);
        self.statics.write().retain(|(owner, _), _| *owner != class);
    }

    pub fn method_body(&self, id: MethodId) -> Option<&NativeMethod> {
        self.methods.get(&id)
    }

    pub fn constructor_body(&self, id: ConstructorId) -> Option<&NativeConstructor> {
        self.constructors.get(&id)
    }

    pub fn field(&self, id: FieldId) -> Option<Field<'_>> {
        let def = self.store.class(id.owner)?.fields.get(id.index as usize)?;
        Some(Field::new(id, def))
    }

    pub fn method(&self, id: MethodId) -> Option<Method<'_>> {
        let def = self.store.class(id.owner)?.methods.get(id.index as usize)?;
        Some(Method::new(id, def))
    }

    pub fn constructor(&self, id: ConstructorId) -> Option<Constructor<'_>> {
        if id.is_implicit() {
            return Some(Constructor::new(id, &[]));
        }
        let def = self.store.class(id.owner)?.constructors.get(id.index as usize)?;
        Some(Constructor::new(id, &def.params))
    }

    pub fn static_value(&self, owner: ClassId, name: &str) -> Option<Value> {
        self.statics.read().get(&(owner, name.to_string())).cloned()
    }

    pub fn set_static_value(&self, owner: ClassId, name: &str, value: Value) {
        self.statics.write().insert((owner, name.to_string()), value);
    }

    /// Allocate an instance of `class` with every instance field of its chain set to its
    /// default (`null`, or the primitive zero).
    pub fn allocate(&self, class: ClassId) -> Result<ObjectRef> {
        self.allocate_named(class, None)
    }

    pub(crate) fn allocate_named(
        &self,
        class: ClassId,
        enum_name: Option<String>,
    ) -> Result<ObjectRef> {
        let def = self.store.class(class).ok_or_else(|| {
            MirrorError::invalid(format!("class #{} is not defined", class.to_raw()))
        })?;
        if def.is_abstract || matches!(def.kind, ClassKind::Interface | ClassKind::Annotation) {
            return Err(MirrorError::invalid(format!(
                "can not instantiate abstract type [{}]",
                def.name
            )));
        }

        let mut slots = Vec::new();
        for owner in superclass_chain(self.env(), class) {
            let Some(owner_def) = self.store.class(owner) else {
                continue;
            };
            for field in owner_def.fields.iter().filter(|f| !f.is_static) {
                slots.push((owner, field.name.clone(), Value::zero_of(&field.ty)));
            }
        }
        Ok(Arc::new(Instance::new(class, enum_name, slots)))
    }
}
