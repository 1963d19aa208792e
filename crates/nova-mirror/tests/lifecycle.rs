use std::sync::Arc;

use nova_mirror::{
    ArgPacking, CacheConfig, ClassBuilder, ConstructorId, Injecting, MatchType, MirrorConfig,
    MirrorError, Reflector, Value,
};
use nova_types::{Type, TypeEnv, TypeStore};

use pretty_assertions::assert_eq;

fn person(reflector: &mut Reflector) -> nova_types::ClassId {
    let string = Type::class(reflector.env().well_known().string, vec![]);
    ClassBuilder::new("com.example.Person")
        .field("name", string.clone())
        .field("age", Type::int())
        .constructor(vec![string.clone()], |this, args| {
            this.set("name", args[0].clone());
            Ok(())
        })
        .constructor(vec![string, Type::int()], |this, args| {
            this.set("name", args[0].clone());
            this.set("age", args[1].clone());
            Ok(())
        })
        .register(reflector)
}

#[test]
fn born_runs_matching_constructor() {
    let mut reflector = Reflector::default();
    let class = person(&mut reflector);
    let mirror = reflector.mirror_class(class);

    let ada = Value::Object(mirror.born(&[Value::str("Ada")]).unwrap());
    assert_eq!(ada.field("name"), Value::str("Ada"));
    assert_eq!(ada.field("age"), Value::Int(0));

    let grace = Value::Object(mirror.born(&[Value::str("Grace"), Value::Int(85)]).unwrap());
    assert_eq!(grace.field("age"), Value::Int(85));

    let err = mirror.born(&[]).unwrap_err();
    assert!(err.is_member_not_found(), "{err}");
}

#[test]
fn class_without_constructors_has_implicit_one() {
    let mut reflector = Reflector::default();
    let plain = ClassBuilder::new("com.example.Plain")
        .field("n", Type::long())
        .register(&mut reflector);
    let mirror = reflector.mirror_class(plain);

    let plan = mirror.borning(&[]).unwrap();
    assert_eq!(plan.constructor_id(), ConstructorId::implicit(plain));
    assert!(plan.constructor_id().is_implicit());
    let obj = Value::Object(plan.born(&[]).unwrap());
    assert_eq!(obj.field("n"), Value::Long(0));

    assert!(mirror.born(&[Value::Int(1)]).unwrap_err().is_member_not_found());
}

#[test]
fn abstract_types_are_not_instantiable() {
    let mut reflector = Reflector::default();
    let shape = ClassBuilder::new("com.example.Shape")
        .is_abstract(true)
        .register(&mut reflector);
    let drawable = ClassBuilder::interface("com.example.Drawable").register(&mut reflector);

    for class in [shape, drawable] {
        assert!(matches!(
            reflector.mirror_class(class).born(&[]),
            Err(MirrorError::InvalidOperation(_))
        ));
    }
}

#[test]
fn vararg_constructor_packs_primitive_component() {
    let mut reflector = Reflector::default();
    let bag = ClassBuilder::new("com.example.Bag")
        .field("size", Type::int())
        .constructor(vec![Type::array(Type::int())], |this, args| {
            let len = args[0].as_array().map_or(0, |arr| arr.len());
            this.set("size", Value::Int(len as i32));
            Ok(())
        })
        .register(&mut reflector);
    let mirror = reflector.mirror_class(bag);

    let plan = mirror.borning(&[Value::Int(1), Value::Int(2), Value::Int(3)]).unwrap();
    assert_eq!(plan.match_type(), MatchType::Lack);
    assert_eq!(
        plan.packing(),
        &ArgPacking::Packed {
            from: 0,
            component: Type::int(),
        }
    );
    let obj = Value::Object(plan.born(&[Value::Int(1), Value::Int(2), Value::Int(3)]).unwrap());
    assert_eq!(obj.field("size"), Value::Int(3));

    let empty = Value::Object(mirror.born(&[]).unwrap());
    assert_eq!(empty.field("size"), Value::Int(0));
}

#[test]
fn failing_constructor_reports_invocation_failure() {
    let mut reflector = Reflector::default();
    let strict = ClassBuilder::new("com.example.Strict")
        .constructor(vec![], |_, _| anyhow::bail!("refused"))
        .register(&mut reflector);

    match reflector.mirror_class(strict).born(&[]) {
        Err(MirrorError::InvocationFailure { method, message, .. }) => {
            assert_eq!(method, "<init>");
            assert!(message.contains("refused"), "{message}");
        }
        other => panic!("expected invocation failure, got {other:?}"),
    }
}

#[test]
fn invocation_dispatches_on_runtime_class() {
    let mut reflector = Reflector::default();
    let string = Type::class(reflector.env().well_known().string, vec![]);
    let animal = ClassBuilder::new("com.example.Animal")
        .method("sound", vec![], string.clone(), |_, _| Ok(Value::str("...")))
        .abstract_method("legs", vec![], Type::int())
        .register(&mut reflector);
    let dog = ClassBuilder::new("com.example.Dog")
        .extends(Type::class(animal, vec![]))
        .method("sound", vec![], string, |_, _| Ok(Value::str("woof")))
        .method("legs", vec![], Type::int(), |_, _| Ok(Value::Int(4)))
        .register(&mut reflector);

    let base = reflector.mirror_class(animal);
    let rex = Value::Object(reflector.allocate(dog).unwrap());
    let generic = Value::Object(reflector.allocate(animal).unwrap());

    assert_eq!(base.invoke(&rex, "sound", &[]).unwrap(), Value::str("woof"));
    assert_eq!(base.invoke(&rex, "legs", &[]).unwrap(), Value::Int(4));
    assert_eq!(base.invoke(&generic, "sound", &[]).unwrap(), Value::str("..."));
    assert!(matches!(
        base.invoke(&generic, "legs", &[]),
        Err(MirrorError::InvocationFailure { .. })
    ));
    assert!(matches!(
        base.invoke(&Value::Null, "sound", &[]),
        Err(MirrorError::InvocationFailure { .. })
    ));
}

#[test]
fn static_methods_run_without_receiver() {
    let mut reflector = Reflector::default();
    let math = ClassBuilder::new("com.example.MathUtil")
        .static_method("twice", vec![Type::long()], Type::long(), |_, args| {
            Ok(Value::Long(args[0].as_i64().unwrap_or_default() * 2))
        })
        .register(&mut reflector);

    let mirror = reflector.mirror_class(math);
    assert_eq!(mirror.static_methods().len(), 1);
    assert_eq!(
        mirror.invoke(&Value::Null, "twice", &[Value::Long(21)]).unwrap(),
        Value::Long(42)
    );
    // A boxed `Integer` neither unboxes to `long` nor widens.
    assert!(mirror
        .invoke(&Value::Null, "twice", &[Value::Int(21)])
        .unwrap_err()
        .is_member_not_found());
}

#[test]
fn unknown_method_is_member_not_found() {
    let mut reflector = Reflector::default();
    let empty = ClassBuilder::new("com.example.Empty").register(&mut reflector);
    let err = reflector
        .mirror_class(empty)
        .invoking("missing", &[Value::Int(1)])
        .unwrap_err();
    assert_eq!(
        err,
        MirrorError::MemberNotFound {
            what: "method",
            owner: "com.example.Empty".to_string(),
            member: "missing(java.lang.Integer)".to_string(),
        }
    );
}

#[test]
fn resolved_plans_are_cached() {
    let mut reflector = Reflector::default();
    let echo = ClassBuilder::new("com.example.Echo")
        .method(
            "echo",
            vec![Type::int()],
            Type::int(),
            |_, args| Ok(args[0].clone()),
        )
        .register(&mut reflector);

    let cache = reflector.cache().unwrap();
    assert!(cache.is_empty());
    let mirror = reflector.mirror_class(echo);
    let first = mirror.invoking("echo", &[Value::Int(1)]).unwrap();
    assert_eq!(cache.len(), 1);
    let second = mirror.invoking("echo", &[Value::Int(2)]).unwrap();
    assert_eq!(cache.len(), 1);
    assert_eq!(first.method_id(), second.method_id());
    assert_eq!(first.match_type(), MatchType::Exact);
}

#[test]
fn cache_can_be_disabled_or_shared() {
    let config = MirrorConfig {
        cache: CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        },
        ..MirrorConfig::default()
    };
    let mut reflector = Reflector::with_config(TypeStore::with_minimal_jdk(), config);
    assert!(reflector.cache().is_none());

    let echo = ClassBuilder::new("com.example.Echo")
        .method("echo", vec![Type::int()], Type::int(), |_, args| {
            Ok(args[0].clone())
        })
        .register(&mut reflector);
    let mirror = reflector.mirror_class(echo);
    let obj = Value::Object(reflector.allocate(echo).unwrap());
    assert_eq!(mirror.invoke(&obj, "echo", &[Value::Int(7)]).unwrap(), Value::Int(7));

    let shared = Arc::new(nova_mirror::MemberCache::new(16));
    reflector.set_cache(Some(Arc::clone(&shared)));
    let mirror = reflector.mirror_class(echo);
    mirror.invoke(&obj, "echo", &[Value::Int(7)]).unwrap();
    assert_eq!(shared.len(), 1);
}

#[test]
fn injecting_prefers_setters_and_coerces() {
    let mut reflector = Reflector::default();
    let string = Type::class(reflector.env().well_known().string, vec![]);
    let service = ClassBuilder::new("com.example.Service")
        .field("port", Type::int())
        .field("host", string)
        .method("setPort", vec![Type::int()], Type::Void, |this, args| {
            let port = args[0].as_i64().unwrap_or_default();
            this.set_field("port", Value::Int(port as i32 + 1));
            Ok(Value::Null)
        })
        .register(&mut reflector);

    let mirror = reflector.mirror_class(service);
    let obj = Value::Object(reflector.allocate(service).unwrap());

    let port = mirror.injecting("port").unwrap();
    assert!(matches!(port, Injecting::BySetter(_)));
    port.inject(&reflector, &obj, Value::str("8079")).unwrap();
    assert_eq!(obj.field("port"), Value::Int(8080));

    let host = mirror.injecting("host").unwrap();
    assert!(matches!(host, Injecting::ByField(_)));
    host.inject(&reflector, &obj, Value::Int(127)).unwrap();
    assert_eq!(obj.field("host"), Value::str("127"));

    assert!(mirror.injecting("missing").unwrap_err().is_member_not_found());
}

#[test]
fn mirror_of_value_uses_runtime_class() {
    let mut reflector = Reflector::default();
    let class = person(&mut reflector);
    let obj = Value::Object(reflector.allocate(class).unwrap());

    let mirror = reflector.mirror_of(&obj).unwrap();
    assert!(mirror.is_class(class));
    assert!(reflector.mirror_of(&Value::Null).is_none());
    assert!(reflector.mirror_of(&Value::Int(1)).unwrap().is_class(
        reflector.env().well_known().integer
    ));
}
