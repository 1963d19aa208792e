//! Reading and writing values on live instances.
//!
//! Accessor-based paths fall back to direct field access; only the final failure is
//! reported.

use tracing::debug;

use crate::error::{MirrorError, Result};
use crate::members::Field;
use crate::value::Value;
use crate::{Mirror, TRACE_TARGET};

impl<'r> Mirror<'r> {
    fn read_failure(&self, name: &str) -> MirrorError {
        MirrorError::ValueReadFailure {
            owner: self.name(),
            name: name.to_string(),
        }
    }

    fn write_failure(&self, value: &Value, name: &str, reason: impl Into<String>) -> MirrorError {
        MirrorError::ValueWriteFailure {
            value: value.to_string(),
            owner: self.name(),
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    fn as_write_failure(&self, err: MirrorError, value: &Value, name: &str) -> MirrorError {
        match err {
            MirrorError::ValueWriteFailure { .. } => err,
            other => self.write_failure(value, name, other.to_string()),
        }
    }

    /// Direct field read; access modifiers do not apply.
    pub fn get_field_value(&self, obj: &Value, field: &Field<'_>) -> Result<Value> {
        obj.as_object()
            .and_then(|instance| instance.read(field.owner(), field.name()))
            .ok_or_else(|| self.read_failure(field.name()))
    }

    /// Read property `name` through its getter, falling back to the field.
    pub fn get_value(&self, obj: &Value, name: &str) -> Result<Value> {
        let via_getter = self
            .getter(name)
            .and_then(|getter| self.reflector().call(getter.id(), obj, &[]));
        match via_getter {
            Ok(value) => Ok(value),
            Err(err) => {
                debug!(
                    target: TRACE_TARGET,
                    ty = %self,
                    name,
                    error = %err,
                    "getter failed; reading field"
                );
                let field = self.field(name).map_err(|_| self.read_failure(name))?;
                self.get_field_value(obj, &field)
            }
        }
    }

    /// Direct field write; access modifiers do not apply.
    ///
    /// Non-null values are coerced to the field type. `null` written to a primitive field
    /// stores the primitive zero.
    pub fn set_field_value(&self, obj: &Value, field: &Field<'_>, value: Value) -> Result<()> {
        let name = field.name();
        let stored = if value.is_null() {
            Value::zero_of(field.ty())
        } else {
            let reflector = self.reflector();
            reflector
                .castor()
                .cast(reflector, value.clone(), field.ty())
                .map_err(|err| self.write_failure(&value, name, err.to_string()))?
        };

        let Some(instance) = obj.as_object() else {
            return Err(self.write_failure(&value, name, "target is not an object"));
        };
        if instance.write(field.owner(), name, stored) {
            Ok(())
        } else {
            Err(self.write_failure(&value, name, "no such field on the target instance"))
        }
    }

    /// Write property `name` through a setter accepting the value's runtime type, falling
    /// back to the field. `null` always goes straight to the field.
    pub fn set_value(&self, obj: &Value, name: &str, value: Value) -> Result<()> {
        if !value.is_null() {
            let runtime = value.runtime_type(self.env());
            let via_setter = self.setter(name, &runtime).and_then(|setter| {
                self.reflector()
                    .call(setter.id(), obj, std::slice::from_ref(&value))
            });
            match via_setter {
                Ok(_) => return Ok(()),
                Err(err) => {
                    debug!(
                        target: TRACE_TARGET,
                        ty = %self,
                        name,
                        error = %err,
                        "setter failed; writing field"
                    );
                }
            }
        }
        self.field(name)
            .and_then(|field| self.set_field_value(obj, &field, value.clone()))
            .map_err(|err| self.as_write_failure(err, &value, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_types::{FieldDef, Type, TypeEnv};
    use pretty_assertions::assert_eq;

    use crate::{ClassBuilder, Reflector};

    #[test]
    fn get_value_prefers_getter() {
        let mut reflector = Reflector::default();
        let string = Type::class(reflector.env().well_known().string, vec![]);
        let person = ClassBuilder::new("com.example.Person")
            .field("name", string.clone())
            .method(
                "getName",
                vec![],
                string,
                |this, _| Ok(Value::str(format!("Dr. {}", this.field("name")))),
            )
            .register(&mut reflector);

        let mirror = reflector.mirror_class(person);
        let obj = Value::Object(reflector.allocate(person).unwrap());
        obj.set_field("name", Value::str("Who"));
        assert_eq!(mirror.get_value(&obj, "name").unwrap(), Value::str("Dr. Who"));

        let field = mirror.field("name").unwrap();
        assert_eq!(mirror.get_field_value(&obj, &field).unwrap(), Value::str("Who"));
    }

    #[test]
    fn get_value_without_getter_or_field_fails() {
        let mut reflector = Reflector::default();
        let empty = ClassBuilder::new("com.example.Empty").register(&mut reflector);
        let obj = Value::Object(reflector.allocate(empty).unwrap());
        assert_eq!(
            reflector.mirror_class(empty).get_value(&obj, "missing"),
            Err(MirrorError::ValueReadFailure {
                owner: "com.example.Empty".to_string(),
                name: "missing".to_string(),
            })
        );
    }

    #[test]
    fn final_instance_field_is_readable_and_writable() {
        let mut reflector = Reflector::default();
        let string = Type::class(reflector.env().well_known().string, vec![]);
        let user = ClassBuilder::new("com.example.User")
            .field_def(FieldDef {
                is_final: true,
                ..FieldDef::new("id", string)
            })
            .register(&mut reflector);

        let mirror = reflector.mirror_class(user);
        assert!(mirror.fields().is_empty());

        let obj = Value::Object(reflector.allocate(user).unwrap());
        obj.set_field("id", Value::str("u1"));
        assert_eq!(mirror.get_value(&obj, "id").unwrap(), Value::str("u1"));

        mirror.set_value(&obj, "id", Value::str("u2")).unwrap();
        assert_eq!(obj.field("id"), Value::str("u2"));
    }

    #[test]
    fn failing_setter_falls_back_to_field() {
        let mut reflector = Reflector::default();
        let point = ClassBuilder::new("com.example.Point")
            .field("x", Type::long())
            .method(
                "setX",
                vec![Type::long()],
                Type::Void,
                |_, _| anyhow::bail!("read-only"),
            )
            .register(&mut reflector);

        let mirror = reflector.mirror_class(point);
        let obj = Value::Object(reflector.allocate(point).unwrap());
        mirror.set_value(&obj, "x", Value::Long(5)).unwrap();
        assert_eq!(obj.field("x"), Value::Long(5));
    }

    #[test]
    fn uncastable_write_reports_write_failure() {
        let mut reflector = Reflector::default();
        let point = ClassBuilder::new("com.example.Point")
            .field("x", Type::int())
            .register(&mut reflector);

        let mirror = reflector.mirror_class(point);
        let obj = Value::Object(reflector.allocate(point).unwrap());
        let err = mirror.set_value(&obj, "x", Value::str("abc")).unwrap_err();
        assert!(matches!(err, MirrorError::ValueWriteFailure { .. }), "{err}");
        assert_eq!(obj.field("x"), Value::Int(0));
    }
}
