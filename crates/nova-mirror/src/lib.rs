//! Reflection over [`nova_types`] class metadata.
//!
//! A [`Reflector`] owns a [`TypeStore`](nova_types::TypeStore) plus the native bodies bound
//! to its methods and constructors. [`Mirror`] handles borrow it and answer questions about
//! one type: how it classifies, which field or accessor implements a logical property,
//! which overload a call resolves to, and how to read or write values on live instances.

#![forbid(unsafe_code)]

mod access;
mod builder;
mod cache;
mod castor;
mod config;
mod descriptor;
mod error;
mod extractor;
mod generics;
mod inject;
mod invoke;
mod members;
mod mirror;
mod reflector;
mod value;

pub use crate::builder::ClassBuilder;
pub use crate::cache::{CacheKey, CachedMember, MemberCache};
pub use crate::castor::{CastError, Castor, DefaultCastor};
pub use crate::config::{
    CacheConfig, ConfigError, LoggingConfig, MirrorConfig, DEFAULT_CACHE_ENTRIES,
};
pub use crate::descriptor::{
    constructor_descriptor, method_descriptor, param_descriptor, path, type_descriptor,
};
pub use crate::error::{MirrorError, Result};
pub use crate::extractor::{DefaultTypeExtractor, TypeExtractor};
pub use crate::inject::Injecting;
pub use crate::invoke::{eval_to_types, match_param_types, ArgPacking, Borning, Invoking, MatchType};
pub use crate::members::{Constructor, ConstructorId, Field, FieldId, Method, MethodId};
pub use crate::mirror::{can_cast_to_directly, Mirror};
pub use crate::reflector::{NativeConstructor, NativeMethod, Reflector};
pub use crate::value::{ArrayObject, ArrayRef, Instance, ObjectRef, Value};

/// `tracing` target for everything this crate logs.
pub const TRACE_TARGET: &str = "nova.mirror";
