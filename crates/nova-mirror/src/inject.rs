use crate::error::{MirrorError, Result};
use crate::members::{FieldId, MethodId};
use crate::reflector::Reflector;
use crate::value::Value;
use crate::Mirror;

/// How a property gets populated on a freshly built instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Injecting {
    BySetter(MethodId),
    ByField(FieldId),
}

impl Injecting {
    /// Write `value` into `obj`, coercing it to the setter parameter or field type first.
    pub fn inject(&self, reflector: &Reflector, obj: &Value, value: Value) -> Result<()> {
        match *self {
            Injecting::BySetter(id) => {
                let method = reflector.method(id).ok_or_else(|| {
                    MirrorError::invalid(format!("setter #{} is not defined", id.index))
                })?;
                let owner = reflector.class_name(method.owner());
                let failure = |value: &Value, reason: String| MirrorError::ValueWriteFailure {
                    value: value.to_string(),
                    owner: owner.clone(),
                    name: method.name().to_string(),
                    reason,
                };
                let Some(param) = method.params().first() else {
                    return Err(failure(&value, "setter takes no parameter".to_string()));
                };
                let arg = if value.is_null() {
                    Value::zero_of(param)
                } else {
                    reflector
                        .castor()
                        .cast(reflector, value.clone(), param)
                        .map_err(|err| failure(&value, err.to_string()))?
                };
                reflector
                    .call(id, obj, &[arg])
                    .map_err(|err| failure(&value, err.to_string()))?;
                Ok(())
            }
            Injecting::ByField(id) => {
                let field = reflector.field(id).ok_or_else(|| {
                    MirrorError::invalid(format!("field #{} is not defined", id.index))
                })?;
                reflector
                    .mirror_class(field.owner())
                    .set_field_value(obj, &field, value)
            }
        }
    }
}

impl<'r> Mirror<'r> {
    /// Prefer the only `setX` overload; else the field's conventional setter; else the
    /// field itself.
    pub fn injecting(&self, name: &str) -> Result<Injecting> {
        if let [setter] = self.find_setters(name).as_slice() {
            return Ok(Injecting::BySetter(setter.id()));
        }
        let field = self.field(name)?;
        Ok(match self.setter_for_field(&field) {
            Ok(setter) => Injecting::BySetter(setter.id()),
            Err(_) => Injecting::ByField(field.id()),
        })
    }
}
