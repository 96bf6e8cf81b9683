//! Fault taxonomy shared by every component.
//!
//! Kernels and collaborators return typed faults; the harness catches
//! everything else and converts it to `InternalInvariant`. Each kind
//! maps to one locale-bundle message key so the front end can render
//! `lookup(kind_key).format(detail)` without knowing the procedure.

use thiserror::Error;

/// One invocation-scoped failure.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Fault {
    /// No input path was supplied.
    #[error("input path missing")]
    InputMissing,
    /// The input path does not resolve to a file.
    #[error("input path does not exist: {0}")]
    InputAbsent(String),
    /// The loader could not parse the file.
    #[error("failed to load input: {0}")]
    LoadFailure(String),
    /// A user-named column does not exist in the frame.
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    /// A bound column's value kind is incompatible with its slot.
    #[error("column has wrong value kind: {0}")]
    WrongKind(String),
    /// A required role slot could not be filled.
    #[error("input schema unsatisfied: {0}")]
    SchemaUnsatisfied(String),
    /// A parameter failed its validation predicate.
    #[error("invalid parameter: {0}")]
    ParameterInvalid(String),
    /// Singular matrix, non-convergent fit, or non-finite result.
    #[error("numeric failure: {0}")]
    NumericFailure(String),
    /// The user aborted at a column prompt.
    #[error("cancelled by user")]
    UserCancelled,
    /// The document sink or plot backend refused an emission.
    #[error("sink failure: {0}")]
    SinkFailure(String),
    /// Descriptor/bundle consistency violation; should be impossible.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

impl Fault {
    /// Locale-bundle message key for this fault kind.
    pub fn kind_key(&self) -> &'static str {
        match self {
            Fault::InputMissing => "fault-input-missing",
            Fault::InputAbsent(_) => "fault-input-absent",
            Fault::LoadFailure(_) => "fault-load-failure",
            Fault::UnknownColumn(_) => "fault-unknown-column",
            Fault::WrongKind(_) => "fault-wrong-kind",
            Fault::SchemaUnsatisfied(_) => "fault-schema-unsatisfied",
            Fault::ParameterInvalid(_) => "fault-parameter-invalid",
            Fault::NumericFailure(_) => "fault-numeric-failure",
            Fault::UserCancelled => "fault-user-cancelled",
            Fault::SinkFailure(_) => "fault-sink-failure",
            Fault::InternalInvariant(_) => "fault-internal-invariant",
        }
    }

    /// Stable machine-readable identifier, used on the invocation surface.
    pub fn kind_id(&self) -> &'static str {
        match self {
            Fault::InputMissing => "input-missing",
            Fault::InputAbsent(_) => "input-absent",
            Fault::LoadFailure(_) => "load-failure",
            Fault::UnknownColumn(_) => "unknown-column",
            Fault::WrongKind(_) => "wrong-kind",
            Fault::SchemaUnsatisfied(_) => "schema-unsatisfied",
            Fault::ParameterInvalid(_) => "parameter-invalid",
            Fault::NumericFailure(_) => "numeric-failure",
            Fault::UserCancelled => "user-cancelled",
            Fault::SinkFailure(_) => "sink-failure",
            Fault::InternalInvariant(_) => "internal-invariant",
        }
    }

    /// Detail string interpolated into the localized message.
    pub fn detail(&self) -> String {
        match self {
            Fault::InputMissing | Fault::UserCancelled => String::new(),
            Fault::InputAbsent(d)
            | Fault::LoadFailure(d)
            | Fault::UnknownColumn(d)
            | Fault::WrongKind(d)
            | Fault::SchemaUnsatisfied(d)
            | Fault::ParameterInvalid(d)
            | Fault::NumericFailure(d)
            | Fault::SinkFailure(d)
            | Fault::InternalInvariant(d) => d.clone(),
        }
    }
}

impl From<std::io::Error> for Fault {
    fn from(err: std::io::Error) -> Self {
        Fault::SinkFailure(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Fault>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_keys_are_distinct() {
        let faults = [
            Fault::InputMissing,
            Fault::InputAbsent("x".into()),
            Fault::LoadFailure("x".into()),
            Fault::UnknownColumn("x".into()),
            Fault::WrongKind("x".into()),
            Fault::SchemaUnsatisfied("x".into()),
            Fault::ParameterInvalid("x".into()),
            Fault::NumericFailure("x".into()),
            Fault::UserCancelled,
            Fault::SinkFailure("x".into()),
            Fault::InternalInvariant("x".into()),
        ];
        let mut keys: Vec<_> = faults.iter().map(|f| f.kind_key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 11);
    }

    #[test]
    fn detail_round_trips() {
        let f = Fault::UnknownColumn("Z".into());
        assert_eq!(f.detail(), "Z");
        assert_eq!(f.kind_id(), "unknown-column");
    }
}
