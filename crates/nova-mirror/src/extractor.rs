use nova_types::Type;

use crate::Mirror;

/// Produces the representative ancestor types of a mirrored type, ending with
/// `java.lang.Object`.
pub trait TypeExtractor: Send + Sync {
    fn extract(&self, mirror: &Mirror<'_>) -> Vec<Type>;
}

/// The fixed priority table:
///
/// | type            | extracted                                   |
/// |-----------------|---------------------------------------------|
/// | primitive       | wrapper, plus `Number` for numeric kinds    |
/// | calendar-like   | `Calendar`                                  |
/// | enum            | itself, `Enum`                              |
/// | array           | itself, `java.lang.reflect.Array`           |
/// | string-like     | itself, `CharSequence`                      |
/// | number          | itself, `Number`                            |
/// | map             | itself, `Map`                               |
/// | list            | itself, `List`, `Collection`                |
/// | collection      | itself, `Collection`                        |
/// | anything else   | itself                                      |
///
/// `Object` is appended unless the type already is `Object`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultTypeExtractor;

impl TypeExtractor for DefaultTypeExtractor {
    fn extract(&self, mirror: &Mirror<'_>) -> Vec<Type> {
        let wk = mirror.env().well_known();
        let class = |id| Type::class(id, vec![]);
        let ty = mirror.ty();
        let mut out = Vec::with_capacity(5);

        if mirror.is_primitive() {
            out.push(mirror.wrapper());
            if let Type::Primitive(prim) = ty {
                if prim.is_numeric() {
                    out.push(class(wk.number));
                }
            }
        } else if mirror.is_of(&class(wk.calendar)) {
            out.push(class(wk.calendar));
        } else {
            out.push(ty.clone());
            if mirror.is_enum() {
                out.push(class(wk.enum_));
            } else if mirror.is_array() {
                out.push(class(wk.array));
            } else if mirror.is_string_like() {
                out.push(class(wk.char_sequence));
            } else if mirror.is_number() {
                out.push(class(wk.number));
            } else if mirror.is_map() {
                out.push(class(wk.map));
            } else if mirror.is_list() {
                out.push(class(wk.list));
                out.push(class(wk.collection));
            } else if mirror.is_collection() {
                out.push(class(wk.collection));
            }
        }

        let object = class(wk.object);
        if *ty != object {
            out.push(object);
        }
        out
    }
}
