//! Input and parameter schemas plus the validator that binds a loaded
//! frame against them.

pub mod input;
pub mod params;
pub mod validate;

pub use input::{BindRule, Cardinality, InputSchema, Role, RoleSlot, ValueKindSet};
pub use params::{alpha_spec, ParamKind, ParamSchema, ParamSpec, ParamValue, ParamValues};
pub use validate::{validate, Binding, Validated};
