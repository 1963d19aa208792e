//! Live values the engine reads, writes and passes to invoked members.

use std::fmt;
use std::sync::Arc;

use nova_types::{ClassId, PrimitiveType, Type, TypeEnv};
use parking_lot::RwLock;

pub type ObjectRef = Arc<Instance>;
pub type ArrayRef = Arc<ArrayObject>;

/// A runtime value.
///
/// Primitive payloads double as their boxed form: an `Int` observed as an object is a
/// `java.lang.Integer` (see [`Value::runtime_type`]).
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Boolean(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(Arc<str>),
    Object(ObjectRef),
    Array(ArrayRef),
}

impl Value {
    pub fn str(s: impl AsRef<str>) -> Self {
        Value::Str(Arc::from(s.as_ref()))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The zero-equivalent stored into a slot of type `ty` when no value is given.
    pub fn zero_of(ty: &Type) -> Self {
        match ty {
            Type::Primitive(PrimitiveType::Boolean) => Value::Boolean(false),
            Type::Primitive(PrimitiveType::Char) => Value::Char('\0'),
            Type::Primitive(PrimitiveType::Byte) => Value::Byte(0),
            Type::Primitive(PrimitiveType::Short) => Value::Short(0),
            Type::Primitive(PrimitiveType::Int) => Value::Int(0),
            Type::Primitive(PrimitiveType::Long) => Value::Long(0),
            Type::Primitive(PrimitiveType::Float) => Value::Float(0.0),
            Type::Primitive(PrimitiveType::Double) => Value::Double(0.0),
            _ => Value::Null,
        }
    }

    /// The primitive kind carried by the payload, if any.
    pub fn primitive_kind(&self) -> Option<PrimitiveType> {
        Some(match self {
            Value::Boolean(_) => PrimitiveType::Boolean,
            Value::Char(_) => PrimitiveType::Char,
            Value::Byte(_) => PrimitiveType::Byte,
            Value::Short(_) => PrimitiveType::Short,
            Value::Int(_) => PrimitiveType::Int,
            Value::Long(_) => PrimitiveType::Long,
            Value::Float(_) => PrimitiveType::Float,
            Value::Double(_) => PrimitiveType::Double,
            _ => return None,
        })
    }

    /// The class this value reports at runtime (`Object#getClass`); `null` evaluates to
    /// `java.lang.Object`.
    pub fn runtime_type(&self, env: &dyn TypeEnv) -> Type {
        let wk = env.well_known();
        if let Some(prim) = self.primitive_kind() {
            return Type::class(wk.wrapper_of(prim), vec![]);
        }
        match self {
            Value::Str(_) => Type::class(wk.string, vec![]),
            Value::Object(obj) => Type::class(obj.class(), vec![]),
            Value::Array(arr) => Type::array(arr.component().clone()),
            _ => Type::class(wk.object, vec![]),
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integral payloads (and `char`) widened to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Short(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            Value::Char(c) => Some(i64::from(u32::from(*c))),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(f64::from(*v)),
            Value::Double(v) => Some(*v),
            other => other.as_i64().map(|v| v as f64),
        }
    }

    /// Read the most-derived field `name` of an object value; `Null` when absent.
    pub fn field(&self, name: &str) -> Value {
        self.as_object()
            .and_then(|obj| obj.get(name))
            .unwrap_or(Value::Null)
    }

    /// Write the most-derived field `name` of an object value.
    pub fn set_field(&self, name: &str, value: Value) -> bool {
        self.as_object().is_some_and(|obj| obj.set(name, value))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Char(v) => write!(f, "{v}"),
            Value::Byte(v) => write!(f, "{v}"),
            Value::Short(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Double(v) => write!(f, "{v:?}"),
            Value::Str(v) => f.write_str(v),
            Value::Object(obj) => match obj.enum_name() {
                Some(name) => f.write_str(name),
                None => write!(f, "object@{}", obj.class().to_raw()),
            },
            Value::Array(arr) => {
                f.write_str("[")?;
                for (idx, item) in arr.to_vec().iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::str(v)
    }
}

#[derive(Debug)]
struct Slot {
    owner: ClassId,
    name: String,
    value: Value,
}

/// An allocated object: its class plus one slot per instance field of the class chain.
///
/// Slots are laid out most-derived class first, so a by-name lookup sees the shadowing
/// field before the shadowed one.
#[derive(Debug)]
pub struct Instance {
    class: ClassId,
    enum_name: Option<String>,
    slots: RwLock<Vec<Slot>>,
}

impl Instance {
    pub(crate) fn new(
        class: ClassId,
        enum_name: Option<String>,
        fields: Vec<(ClassId, String, Value)>,
    ) -> Self {
        let slots = fields
            .into_iter()
            .map(|(owner, name, value)| Slot { owner, name, value })
            .collect();
        Self {
            class,
            enum_name,
            slots: RwLock::new(slots),
        }
    }

    pub fn class(&self) -> ClassId {
        self.class
    }

    /// For enum constants, the constant's name.
    pub fn enum_name(&self) -> Option<&str> {
        self.enum_name.as_deref()
    }

    pub fn read(&self, owner: ClassId, name: &str) -> Option<Value> {
        self.slots
            .read()
            .iter()
            .find(|slot| slot.owner == owner && slot.name == name)
            .map(|slot| slot.value.clone())
    }

    pub fn write(&self, owner: ClassId, name: &str, value: Value) -> bool {
        let mut slots = self.slots.write();
        match slots
            .iter_mut()
            .find(|slot| slot.owner == owner && slot.name == name)
        {
            Some(slot) => {
                slot.value = value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.slots
            .read()
            .iter()
            .find(|slot| slot.name == name)
            .map(|slot| slot.value.clone())
    }

    pub fn set(&self, name: &str, value: Value) -> bool {
        let mut slots = self.slots.write();
        match slots.iter_mut().find(|slot| slot.name == name) {
            Some(slot) => {
                slot.value = value;
                true
            }
            None => false,
        }
    }
}

/// A homogeneous array; `component` is the element type the array was allocated with.
#[derive(Debug)]
pub struct ArrayObject {
    component: Type,
    elements: RwLock<Vec<Value>>,
}

impl ArrayObject {
    pub fn new(component: Type, elements: Vec<Value>) -> ArrayRef {
        Arc::new(Self {
            component,
            elements: RwLock::new(elements),
        })
    }

    pub fn component(&self) -> &Type {
        &self.component
    }

    pub fn len(&self) -> usize {
        self.elements.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.elements.read().get(index).cloned()
    }

    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.elements.write().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.elements.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_types::TypeStore;

    #[test]
    fn runtime_type_boxes_primitives() {
        let env = TypeStore::with_minimal_jdk();
        let wk = env.well_known();
        assert_eq!(Value::Int(1).runtime_type(&env), Type::class(wk.integer, vec![]));
        assert_eq!(Value::Char('a').runtime_type(&env), Type::class(wk.character, vec![]));
        assert_eq!(Value::str("a").runtime_type(&env), Type::class(wk.string, vec![]));
        assert_eq!(Value::Null.runtime_type(&env), Type::class(wk.object, vec![]));

        let arr = ArrayObject::new(Type::int(), vec![Value::Int(1)]);
        assert_eq!(Value::Array(arr).runtime_type(&env), Type::array(Type::int()));
    }

    #[test]
    fn shadowing_slot_wins_by_name() {
        let env = TypeStore::with_minimal_jdk();
        let wk = env.well_known();
        let obj = Instance::new(
            wk.integer,
            None,
            vec![
                (wk.integer, "x".to_string(), Value::Int(1)),
                (wk.number, "x".to_string(), Value::Int(2)),
            ],
        );
        assert_eq!(obj.get("x"), Some(Value::Int(1)));
        assert_eq!(obj.read(wk.number, "x"), Some(Value::Int(2)));
        assert!(obj.write(wk.number, "x", Value::Int(3)));
        assert_eq!(obj.read(wk.number, "x"), Some(Value::Int(3)));
        assert_eq!(obj.get("x"), Some(Value::Int(1)));
    }
}
