//! Runtime support for `tabula` records: the plain-data tree, the field
//! pipeline's error taxonomy, marshalling of text-wire scalars, the value
//! traits the generated code leans on, and the process-wide type registry.
//!
//! Record and collection types themselves are generated by the macros in
//! `tabula_macros`; nothing here is specific to any one record.
//!
//! Instances are deeply immutable once constructed. The registries are the
//! only shared mutable state: the type registry is populated at link time,
//! and marshaller registration is expected during program initialization;
//! steady-state registration must be externally synchronized.

mod plain;
pub use plain::*;

mod error;
pub use error::*;

mod field;
pub use field::*;

mod marshal;
pub use marshal::*;

mod value;
pub use value::*;

mod key;
pub use key::*;

mod record;
pub use record::*;

mod registry;
pub use registry::*;

mod json;
pub use json::*;

mod cleaner;
pub use cleaner::*;

mod shortcuts;
pub use shortcuts::*;

// Generated registry entries reference these through the facade.
pub use linkme;
