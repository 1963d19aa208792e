//! Value coercion used by field writes and injection.

use nova_types::{is_subtype, java_name, PrimitiveType, Type};
use thiserror::Error;

use crate::reflector::Reflector;
use crate::value::Value;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CastError {
    #[error("can not cast [{value}] to [{target}]")]
    Unsupported { value: String, target: String },

    #[error("can not parse '{text}' as {target}")]
    Parse { text: String, target: String },
}

/// Converts a value to a target type.
pub trait Castor: Send + Sync {
    fn cast(&self, reflector: &Reflector, value: Value, target: &Type) -> Result<Value, CastError>;
}

/// Identity, numeric and character conversions, string parsing and rendering, and enum
/// constants by name.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCastor;

enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Num> {
        match value {
            Value::Float(v) => Some(Num::Float(f64::from(*v))),
            Value::Double(v) => Some(Num::Float(*v)),
            Value::Boolean(b) => Some(Num::Int(i64::from(*b))),
            Value::Str(text) => {
                let text = text.trim();
                text.parse::<i64>()
                    .map(Num::Int)
                    .or_else(|_| text.parse::<f64>().map(Num::Float))
                    .ok()
            }
            other => other.as_i64().map(Num::Int),
        }
    }

    fn to_primitive(&self, kind: PrimitiveType) -> Option<Value> {
        let (int, float) = match *self {
            Num::Int(v) => (v, v as f64),
            Num::Float(v) => (v as i64, v),
        };
        Some(match kind {
            PrimitiveType::Boolean => Value::Boolean(int != 0),
            PrimitiveType::Char => Value::Char(char::from_u32(u32::try_from(int).ok()?)?),
            PrimitiveType::Byte => Value::Byte(int as i8),
            PrimitiveType::Short => Value::Short(int as i16),
            PrimitiveType::Int => Value::Int(int as i32),
            PrimitiveType::Long => Value::Long(int),
            PrimitiveType::Float => Value::Float(float as f32),
            PrimitiveType::Double => Value::Double(float),
        })
    }
}

impl DefaultCastor {
    fn to_primitive(
        value: &Value,
        kind: PrimitiveType,
        target_name: &str,
    ) -> Result<Value, CastError> {
        if value.primitive_kind() == Some(kind) {
            return Ok(value.clone());
        }
        if let Value::Str(text) = value {
            let trimmed = text.trim();
            match kind {
                PrimitiveType::Boolean => {
                    if trimmed.eq_ignore_ascii_case("true") {
                        return Ok(Value::Boolean(true));
                    }
                    if trimmed.eq_ignore_ascii_case("false") {
                        return Ok(Value::Boolean(false));
                    }
                }
                PrimitiveType::Char => {
                    let mut chars = text.chars();
                    if let (Some(c), None) = (chars.next(), chars.next()) {
                        return Ok(Value::Char(c));
                    }
                }
                _ => {}
            }
            return Num::of(value)
                .and_then(|num| num.to_primitive(kind))
                .ok_or_else(|| CastError::Parse {
                    text: text.to_string(),
                    target: target_name.to_string(),
                });
        }
        Num::of(value)
            .and_then(|num| num.to_primitive(kind))
            .ok_or_else(|| CastError::Unsupported {
                value: value.to_string(),
                target: target_name.to_string(),
            })
    }

    fn to_enum(reflector: &Reflector, value: &Value, target: &Type) -> Option<Value> {
        let name = value.as_str()?.trim();
        let class = target.class_id()?;
        reflector
            .static_value(class, name)
            .filter(|constant| {
                constant
                    .as_object()
                    .is_some_and(|obj| obj.enum_name() == Some(name))
            })
    }
}

impl Castor for DefaultCastor {
    fn cast(&self, reflector: &Reflector, value: Value, target: &Type) -> Result<Value, CastError> {
        let env = reflector.env();
        let target = target.erasure(env);
        let target_name = java_name(env, &target);
        let mirror = reflector.mirror(&target);

        if value.is_null() {
            return Ok(Value::zero_of(&target));
        }
        if let Type::Primitive(kind) = target {
            return Self::to_primitive(&value, kind, &target_name);
        }
        if is_subtype(env, &value.runtime_type(env), &target) {
            return Ok(value);
        }
        if mirror.is_string() {
            return Ok(Value::str(value.to_string()));
        }
        if let Ok(Type::Primitive(kind)) = mirror.unwrapped() {
            return Self::to_primitive(&value, kind, &target_name);
        }
        if mirror.is_enum() {
            if let Some(constant) = Self::to_enum(reflector, &value, &target) {
                return Ok(constant);
            }
        }
        Err(CastError::Unsupported {
            value: value.to_string(),
            target: target_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_types::TypeEnv;
    use pretty_assertions::assert_eq;

    fn cast(value: Value, target: &Type) -> Result<Value, CastError> {
        let reflector = Reflector::default();
        DefaultCastor.cast(&reflector, value, target)
    }

    #[test]
    fn numbers_convert_with_truncation() {
        assert_eq!(cast(Value::Double(3.9), &Type::int()), Ok(Value::Int(3)));
        assert_eq!(cast(Value::Int(7), &Type::long()), Ok(Value::Long(7)));
        assert_eq!(
            cast(Value::Long(300), &Type::Primitive(PrimitiveType::Byte)),
            Ok(Value::Byte(44))
        );
        assert_eq!(cast(Value::Int(65), &Type::char()), Ok(Value::Char('A')));
        assert_eq!(cast(Value::Boolean(true), &Type::int()), Ok(Value::Int(1)));
        assert_eq!(cast(Value::Int(2), &Type::boolean()), Ok(Value::Boolean(true)));
    }

    #[test]
    fn strings_parse_and_render() {
        let reflector = Reflector::default();
        let wk = reflector.env().well_known();
        let string = Type::class(wk.string, vec![]);
        let integer = Type::class(wk.integer, vec![]);

        assert_eq!(cast(Value::str(" 42 "), &integer), Ok(Value::Int(42)));
        assert_eq!(cast(Value::str("2.5"), &Type::double()), Ok(Value::Double(2.5)));
        assert_eq!(cast(Value::str("TRUE"), &Type::boolean()), Ok(Value::Boolean(true)));
        assert_eq!(cast(Value::str("x"), &Type::char()), Ok(Value::Char('x')));
        assert_eq!(cast(Value::Long(12), &string), Ok(Value::str("12")));
        assert!(matches!(
            cast(Value::str("abc"), &Type::int()),
            Err(CastError::Parse { .. })
        ));
    }

    #[test]
    fn assignable_values_pass_through() {
        let reflector = Reflector::default();
        let wk = reflector.env().well_known();
        let seq = Type::class(wk.char_sequence, vec![]);
        assert_eq!(cast(Value::str("abc"), &seq), Ok(Value::str("abc")));
        assert_eq!(cast(Value::Null, &seq), Ok(Value::Null));
        assert_eq!(cast(Value::Null, &Type::int()), Ok(Value::Int(0)));
    }

    #[test]
    fn unsupported_targets_fail() {
        let reflector = Reflector::default();
        let list = Type::class(reflector.env().well_known().list, vec![]);
        assert!(matches!(
            cast(Value::Int(1), &list),
            Err(CastError::Unsupported { .. })
        ));
    }
}
