use std::collections::HashSet;

use nova_classfile::{
    parse_field_descriptor, parse_method_descriptor, BaseType, FieldType, MethodDescriptor,
    ReturnType,
};
use nova_mirror::{
    can_cast_to_directly, method_descriptor, param_descriptor, type_descriptor, ArgPacking,
    ClassBuilder, MatchType, MirrorError, Reflector, Value,
};
use nova_types::{PrimitiveType, Type, TypeEnv};

use pretty_assertions::assert_eq;

const PRIMITIVES: [PrimitiveType; 8] = [
    PrimitiveType::Boolean,
    PrimitiveType::Char,
    PrimitiveType::Byte,
    PrimitiveType::Short,
    PrimitiveType::Int,
    PrimitiveType::Long,
    PrimitiveType::Float,
    PrimitiveType::Double,
];

#[test]
fn wrapper_is_a_bijection_over_primitives() {
    let reflector = Reflector::default();
    let mut wrappers = HashSet::new();
    for prim in PRIMITIVES {
        let wrapper = reflector.mirror(&Type::Primitive(prim)).wrapper_class().unwrap();
        assert!(wrappers.insert(wrapper.clone()), "{prim:?} shares a wrapper");
        assert_eq!(reflector.mirror(&wrapper).unwrapped(), Ok(Type::Primitive(prim)));
        assert_eq!(reflector.mirror(&wrapper).wrapper_class(), Ok(wrapper.clone()));
    }
    assert_eq!(wrappers.len(), PRIMITIVES.len());

    let wk = reflector.env().well_known();
    assert_eq!(
        reflector.mirror(&Type::Void).wrapper_class(),
        Ok(Type::class(wk.void, vec![]))
    );
}

#[test]
fn wrapper_of_non_boxed_type_is_invalid() {
    let reflector = Reflector::default();
    let wk = reflector.env().well_known();
    for class in [wk.string, wk.number, wk.object, wk.big_decimal] {
        let mirror = reflector.mirror_class(class);
        assert!(
            matches!(mirror.wrapper_class(), Err(MirrorError::InvalidOperation(_))),
            "{mirror}"
        );
        assert_eq!(mirror.wrapper(), Type::class(class, vec![]));
    }
}

#[test]
fn can_cast_is_reflexive() {
    let mut reflector = Reflector::default();
    let custom = ClassBuilder::new("com.example.Custom").register(&mut reflector);
    let wk = reflector.env().well_known();
    let mut types: Vec<Type> = PRIMITIVES.iter().copied().map(Type::Primitive).collect();
    types.extend([
        Type::Void,
        Type::class(wk.object, vec![]),
        Type::class(wk.string, vec![]),
        Type::class(wk.integer, vec![]),
        Type::class(wk.list, vec![Type::class(wk.string, vec![])]),
        Type::class(custom, vec![]),
        Type::array(Type::int()),
        Type::array(Type::class(wk.string, vec![])),
    ]);

    for ty in &types {
        assert!(can_cast_to_directly(reflector.env(), ty, ty), "{ty:?}");
    }
}

#[test]
fn can_cast_is_not_transitive() {
    let reflector = Reflector::default();
    let env = reflector.env();
    let integer = Type::class(env.well_known().integer, vec![]);

    assert!(can_cast_to_directly(env, &Type::long(), &Type::int()));
    assert!(can_cast_to_directly(env, &Type::int(), &integer));
    assert!(!can_cast_to_directly(env, &Type::long(), &integer));
}

#[test]
fn boolean_field_getter_prefers_is_prefix() {
    let mut reflector = Reflector::default();
    let account = ClassBuilder::new("com.example.Account")
        .field("active", Type::boolean())
        .method("getActive", vec![], Type::boolean(), |_, _| Ok(Value::Boolean(false)))
        .method("isActive", vec![], Type::boolean(), |_, _| Ok(Value::Boolean(true)))
        .register(&mut reflector);

    let mirror = reflector.mirror_class(account);
    let field = mirror.field("active").unwrap();
    assert_eq!(mirror.getter_for_field(&field).unwrap().name(), "isActive");

    // By property name the `get` form is tried first.
    assert_eq!(mirror.getter("active").unwrap().name(), "getActive");
}

#[test]
fn is_prefix_requires_boolean_return() {
    let mut reflector = Reflector::default();
    let string = Type::class(reflector.env().well_known().string, vec![]);
    let job = ClassBuilder::new("com.example.Job")
        .field("ready", string.clone())
        .method("isReady", vec![], string, |_, _| Ok(Value::str("yes")))
        .register(&mut reflector);

    let err = reflector.mirror_class(job).getter("ready").unwrap_err();
    assert!(err.is_member_not_found(), "{err}");
}

#[test]
fn setter_by_runtime_type_is_deterministic() {
    let mut reflector = Reflector::default();
    let wk = reflector.env().well_known().clone();
    let number = Type::class(wk.number, vec![]);
    let integer = Type::class(wk.integer, vec![]);
    let string = Type::class(wk.string, vec![]);
    let holder = ClassBuilder::new("com.example.Holder")
        .field("hit", string)
        .method("setValue", vec![number], Type::Void, |this, _| {
            this.set_field("hit", Value::str("Number"));
            Ok(Value::Null)
        })
        .method("setValue", vec![integer.clone()], Type::Void, |this, _| {
            this.set_field("hit", Value::str("Integer"));
            Ok(Value::Null)
        })
        .register(&mut reflector);

    let mirror = reflector.mirror_class(holder);
    let picks: HashSet<String> = (0..16)
        .map(|_| {
            let setter = mirror.setter("value", &integer).unwrap();
            format!("{:?}", setter.params())
        })
        .collect();
    assert_eq!(picks.len(), 1);
    assert_eq!(mirror.setter("value", &integer).unwrap().params(), &[integer]);

    let obj = Value::Object(reflector.allocate(holder).unwrap());
    mirror.set_value(&obj, "value", Value::Int(1)).unwrap();
    assert_eq!(obj.field("hit"), Value::str("Integer"));

    // No exact overload for Long: the first castable one in declaration order wins.
    mirror.set_value(&obj, "value", Value::Long(1)).unwrap();
    assert_eq!(obj.field("hit"), Value::str("Number"));
}

#[test]
fn same_typed_trailing_arguments_are_packed() {
    let mut reflector = Reflector::default();
    let wk = reflector.env().well_known().clone();
    let string = Type::class(wk.string, vec![]);
    let object = Type::class(wk.object, vec![]);
    let formatter = ClassBuilder::new("com.example.Formatter")
        .method(
            "f",
            vec![string.clone(), Type::array(object.clone())],
            object,
            |_, args| Ok(args[1].clone()),
        )
        .register(&mut reflector);

    let mirror = reflector.mirror_class(formatter);
    let obj = Value::Object(reflector.allocate(formatter).unwrap());

    let args = [Value::str("a"), Value::str("b"), Value::str("c")];
    let plan = mirror.invoking("f", &args).unwrap();
    assert_eq!(plan.match_type(), MatchType::Lack);
    assert_eq!(
        plan.packing(),
        &ArgPacking::Packed {
            from: 1,
            component: string.clone(),
        }
    );
    let packed = plan.invoke(&obj, &args).unwrap();
    let packed = packed.as_array().unwrap();
    assert_eq!(packed.component(), &string);
    assert_eq!(packed.to_vec(), vec![Value::str("b"), Value::str("c")]);
}

#[test]
fn mixed_trailing_arguments_stay_a_sequence() {
    let mut reflector = Reflector::default();
    let wk = reflector.env().well_known().clone();
    let string = Type::class(wk.string, vec![]);
    let object = Type::class(wk.object, vec![]);
    let formatter = ClassBuilder::new("com.example.Formatter")
        .method(
            "f",
            vec![string, Type::array(object.clone())],
            object.clone(),
            |_, args| Ok(args[1].clone()),
        )
        .register(&mut reflector);

    let mirror = reflector.mirror_class(formatter);
    let obj = Value::Object(reflector.allocate(formatter).unwrap());

    let args = [Value::str("a"), Value::str("b"), Value::Int(2)];
    let plan = mirror.invoking("f", &args).unwrap();
    assert_eq!(plan.match_type(), MatchType::Lack);
    assert_eq!(plan.packing(), &ArgPacking::Sequence { from: 1 });

    let trailing = plan.invoke(&obj, &args).unwrap();
    let trailing = trailing.as_array().unwrap();
    assert_eq!(trailing.component(), &object);
    assert_eq!(trailing.to_vec(), vec![Value::str("b"), Value::Int(2)]);
}

#[test]
fn redeclared_field_is_discovered_once_from_subclass() {
    let mut reflector = Reflector::default();
    let parent = ClassBuilder::new("com.example.Parent")
        .field("id", Type::int())
        .field("shared", Type::int())
        .register(&mut reflector);
    let child = ClassBuilder::new("com.example.Child")
        .extends(Type::class(parent, vec![]))
        .field("id", Type::long())
        .register(&mut reflector);

    let fields = reflector.mirror_class(child).fields();
    let summary: Vec<(&str, bool, &Type)> = fields
        .iter()
        .map(|field| (field.name(), field.owner() == child, field.ty()))
        .collect();
    assert_eq!(
        summary,
        vec![("id", true, &Type::long()), ("shared", false, &Type::int())]
    );
}

#[test]
fn method_descriptor_is_bit_exact() {
    let mut reflector = Reflector::default();
    let string = Type::class(reflector.env().well_known().string, vec![]);
    let checker = ClassBuilder::new("com.example.Checker")
        .abstract_method("f", vec![Type::int(), string.clone()], Type::boolean())
        .register(&mut reflector);

    let env = reflector.env();
    let method = reflector.mirror_class(checker).find_methods("f", Some(2)).remove(0);
    let descriptor = method_descriptor(env, &method);
    assert_eq!(descriptor, "(ILjava/lang/String;)Z");
    assert_eq!(param_descriptor(env, &[Type::int(), string]), "(ILjava/lang/String;)");

    assert_eq!(
        parse_method_descriptor(&descriptor).unwrap(),
        MethodDescriptor {
            params: vec![
                FieldType::Base(BaseType::Int),
                FieldType::Object("java/lang/String".to_string()),
            ],
            return_type: ReturnType::Type(FieldType::Base(BaseType::Boolean)),
        }
    );
}

#[test]
fn field_descriptors_parse_back_to_the_same_shape() {
    let reflector = Reflector::default();
    let env = reflector.env();
    let wk = env.well_known();
    let string = FieldType::Object("java/lang/String".to_string());
    let cases = [
        (Type::int(), FieldType::Base(BaseType::Int)),
        (Type::char(), FieldType::Base(BaseType::Char)),
        (Type::class(wk.string, vec![]), string.clone()),
        (
            Type::class(wk.list, vec![Type::class(wk.string, vec![])]),
            FieldType::Object("java/util/List".to_string()),
        ),
        (
            Type::array(Type::array(Type::class(wk.string, vec![]))),
            FieldType::Array(Box::new(FieldType::Array(Box::new(string)))),
        ),
    ];

    for (ty, expected) in cases {
        let descriptor = type_descriptor(env, &ty);
        assert_eq!(parse_field_descriptor(&descriptor).unwrap(), expected, "{descriptor}");
    }
    assert!(parse_field_descriptor(&type_descriptor(env, &Type::Void)).is_err());
}

#[test]
fn null_write_to_primitive_stores_zero() {
    let mut reflector = Reflector::default();
    let counter = ClassBuilder::new("com.example.Counter")
        .field("count", Type::int())
        .field("enabled", Type::boolean())
        .field("initial", Type::char())
        .register(&mut reflector);

    let mirror = reflector.mirror_class(counter);
    let obj = Value::Object(reflector.allocate(counter).unwrap());
    obj.set_field("count", Value::Int(5));
    obj.set_field("enabled", Value::Boolean(true));
    obj.set_field("initial", Value::Char('x'));

    mirror.set_value(&obj, "count", Value::Null).unwrap();
    mirror.set_value(&obj, "enabled", Value::Null).unwrap();
    let initial = mirror.field("initial").unwrap();
    mirror.set_field_value(&obj, &initial, Value::Null).unwrap();

    assert_eq!(obj.field("count"), Value::Int(0));
    assert_eq!(obj.field("enabled"), Value::Boolean(false));
    assert_eq!(obj.field("initial"), Value::Char('\0'));
}
