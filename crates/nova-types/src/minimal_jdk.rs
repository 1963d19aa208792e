//! The slice of the JDK class hierarchy that reflection helpers classify against.

use crate::{ClassDef, ClassId, ClassKind, Type, TypeStore, WellKnownTypes};

struct Jdk<'a> {
    store: &'a mut TypeStore,
    object: ClassId,
}

impl Jdk<'_> {
    fn raw(&self, id: ClassId) -> Type {
        Type::class(id, vec![])
    }

    fn interface(&mut self, name: &str, type_params: &[&str], extends: Vec<Type>) -> ClassId {
        let bound = self.raw(self.object);
        let type_params = type_params
            .iter()
            .map(|tp| self.store.add_type_param(tp, vec![bound.clone()]))
            .collect();
        self.store.add_class(ClassDef {
            name: name.to_string(),
            kind: ClassKind::Interface,
            type_params,
            interfaces: extends,
            is_abstract: true,
            ..ClassDef::default()
        })
    }

    fn class(&mut self, name: &str, super_class: ClassId, interfaces: Vec<Type>) -> ClassId {
        self.store.add_class(ClassDef {
            name: name.to_string(),
            super_class: Some(self.raw(super_class)),
            interfaces,
            ..ClassDef::default()
        })
    }

    /// `name<P...> extends Object implements iface<P...>`
    fn generic_impl(&mut self, name: &str, type_params: &[&str], iface: ClassId) -> ClassId {
        let bound = self.raw(self.object);
        let vars: Vec<_> = type_params
            .iter()
            .map(|tp| self.store.add_type_param(tp, vec![bound.clone()]))
            .collect();
        let args = vars.iter().map(|v| Type::TypeVar(*v)).collect();
        self.store.add_class(ClassDef {
            name: name.to_string(),
            type_params: vars,
            super_class: Some(bound),
            interfaces: vec![Type::class(iface, args)],
            ..ClassDef::default()
        })
    }

    fn abstract_class(
        &mut self,
        name: &str,
        super_class: ClassId,
        interfaces: Vec<Type>,
    ) -> ClassId {
        let id = self.class(name, super_class, interfaces);
        if let Some(def) = self.store.class_mut(id) {
            def.is_abstract = true;
        }
        id
    }

    /// Re-parameterize `iface` with the type variables of the interface itself (`List<E> extends
    /// Collection<E>`).
    fn forward_params(&mut self, id: ClassId, iface: ClassId) {
        if let Some(def) = self.store.class_mut(id) {
            let args = def.type_params.iter().map(|v| Type::TypeVar(*v)).collect();
            def.interfaces = vec![Type::class(iface, args)];
        }
    }
}

pub(crate) fn populate(store: &mut TypeStore) -> WellKnownTypes {
    let object = store.add_class(ClassDef {
        name: "java.lang.Object".to_string(),
        ..ClassDef::default()
    });
    let mut jdk = Jdk { store, object };

    let serializable = jdk.interface("java.io.Serializable", &[], vec![]);
    let cloneable = jdk.interface("java.lang.Cloneable", &[], vec![]);
    let char_sequence = jdk.interface("java.lang.CharSequence", &[], vec![]);
    let comparable = jdk.interface("java.lang.Comparable", &["T"], vec![]);
    let ser = jdk.raw(serializable);
    let clone = jdk.raw(cloneable);
    let cmp = jdk.raw(comparable);

    let number = jdk.abstract_class("java.lang.Number", object, vec![ser.clone()]);
    let numeric_ifaces = vec![ser.clone(), cmp.clone()];
    let byte = jdk.class("java.lang.Byte", number, numeric_ifaces.clone());
    let short = jdk.class("java.lang.Short", number, numeric_ifaces.clone());
    let integer = jdk.class("java.lang.Integer", number, numeric_ifaces.clone());
    let long = jdk.class("java.lang.Long", number, numeric_ifaces.clone());
    let float = jdk.class("java.lang.Float", number, numeric_ifaces.clone());
    let double = jdk.class("java.lang.Double", number, numeric_ifaces.clone());
    let big_integer = jdk.class("java.math.BigInteger", number, numeric_ifaces.clone());
    let big_decimal = jdk.class("java.math.BigDecimal", number, numeric_ifaces.clone());
    let boolean = jdk.class("java.lang.Boolean", object, numeric_ifaces.clone());
    let character = jdk.class("java.lang.Character", object, numeric_ifaces.clone());
    let void = jdk.class("java.lang.Void", object, vec![]);

    let cs = jdk.raw(char_sequence);
    let string = jdk.class("java.lang.String", object, vec![ser.clone(), cmp.clone(), cs.clone()]);
    jdk.class("java.lang.StringBuilder", object, vec![ser.clone(), cs]);

    let enum_ = jdk.abstract_class("java.lang.Enum", object, vec![ser.clone(), cmp]);

    let calendar = jdk.abstract_class(
        "java.util.Calendar",
        object,
        vec![ser.clone(), clone.clone()],
    );
    jdk.class("java.util.GregorianCalendar", calendar, vec![]);
    let date = jdk.class("java.util.Date", object, vec![ser.clone(), clone]);
    let sql_date = jdk.class("java.sql.Date", date, vec![]);
    let sql_time = jdk.class("java.sql.Time", date, vec![]);
    let sql_timestamp = jdk.class("java.sql.Timestamp", date, vec![]);

    let iterable = jdk.interface("java.lang.Iterable", &["T"], vec![]);
    let collection = jdk.interface("java.util.Collection", &["E"], vec![]);
    jdk.forward_params(collection, iterable);
    let list = jdk.interface("java.util.List", &["E"], vec![]);
    jdk.forward_params(list, collection);
    let set = jdk.interface("java.util.Set", &["E"], vec![]);
    jdk.forward_params(set, collection);
    let map = jdk.interface("java.util.Map", &["K", "V"], vec![]);

    jdk.generic_impl("java.util.ArrayList", &["E"], list);
    jdk.generic_impl("java.util.LinkedList", &["E"], list);
    jdk.generic_impl("java.util.HashSet", &["E"], set);
    jdk.generic_impl("java.util.HashMap", &["K", "V"], map);

    let array = jdk.class("java.lang.reflect.Array", object, vec![]);

    WellKnownTypes {
        object,
        string,
        char_sequence,
        number,
        boolean,
        character,
        byte,
        short,
        integer,
        long,
        float,
        double,
        void,
        big_decimal,
        big_integer,
        enum_,
        calendar,
        date,
        sql_date,
        sql_time,
        sql_timestamp,
        iterable,
        collection,
        list,
        set,
        map,
        cloneable,
        serializable,
        array,
    }
}
