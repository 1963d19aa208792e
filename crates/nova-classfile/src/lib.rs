//! JVM type descriptor grammar (JVMS 4.3).
//!
//! Descriptors are parsed into [`FieldType`] / [`MethodDescriptor`] and written
//! back through their `Display` impls, so both directions share one grammar.

#![forbid(unsafe_code)]

mod descriptor;
mod error;

pub use crate::descriptor::{parse_field_descriptor, parse_method_descriptor};
pub use crate::descriptor::{BaseType, FieldType, MethodDescriptor, ParamDescriptor, ReturnType};
pub use crate::error::{Error, Result};
