//! Input schema: the role slots a procedure expects its columns to fill.
//!
//! Roles are assigned by the schema, never inferred from column
//! content. Each slot carries a disambiguation rule used when the user
//! has not named columns; rules fire in declaration order and only
//! consume columns whose value kind the slot permits.

use serde::{Deserialize, Serialize};

use crate::frame::ValueKind;

/// The role a column plays for one procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Feature,
    Target,
    Group,
    Covariate,
    TimeIndex,
    Weight,
    Ignored,
}

impl Role {
    /// Stable name used for user hints (`--col target=price`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Feature => "feature",
            Role::Target => "target",
            Role::Group => "group",
            Role::Covariate => "covariate",
            Role::TimeIndex => "time-index",
            Role::Weight => "weight",
            Role::Ignored => "ignored",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "feature" => Some(Role::Feature),
            "target" => Some(Role::Target),
            "group" => Some(Role::Group),
            "covariate" => Some(Role::Covariate),
            "time-index" => Some(Role::TimeIndex),
            "weight" => Some(Role::Weight),
            "ignored" => Some(Role::Ignored),
            _ => None,
        }
    }
}

/// How many columns a slot must receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    ExactlyOne,
    OneOrMore,
    ZeroOrMore,
    AllRemaining,
}

impl Cardinality {
    pub fn is_required(&self) -> bool {
        matches!(self, Cardinality::ExactlyOne | Cardinality::OneOrMore)
    }
}

/// Permitted value kinds for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueKindSet {
    pub numeric: bool,
    pub categorical: bool,
    pub datetime: bool,
}

impl ValueKindSet {
    pub const NUMERIC: ValueKindSet =
        ValueKindSet { numeric: true, categorical: false, datetime: false };
    pub const CATEGORICAL: ValueKindSet =
        ValueKindSet { numeric: false, categorical: true, datetime: false };
    pub const DATETIME: ValueKindSet =
        ValueKindSet { numeric: false, categorical: false, datetime: true };
    pub const ANY: ValueKindSet =
        ValueKindSet { numeric: true, categorical: true, datetime: true };
    /// Group labels may arrive numeric-coded or textual.
    pub const GROUPABLE: ValueKindSet =
        ValueKindSet { numeric: true, categorical: true, datetime: false };

    pub fn permits(&self, kind: ValueKind) -> bool {
        match kind {
            ValueKind::Numeric => self.numeric,
            ValueKind::Categorical => self.categorical,
            ValueKind::Datetime => self.datetime,
        }
    }
}

/// Disambiguation rule applied when the user supplied no hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindRule {
    /// The last not-yet-bound permitted column.
    LastColumn,
    /// The first not-yet-bound permitted column.
    FirstColumn,
    /// Every not-yet-bound permitted column, in frame order.
    AllRemaining,
    /// The first not-yet-bound categorical column; defers when none.
    FirstCategorical,
    /// The first not-yet-bound datetime column; defers when none.
    FirstDatetime,
    /// No rule: the slot binds only via hint or prompt.
    NoRule,
}

/// One position in a procedure's input schema.
#[derive(Debug, Clone)]
pub struct RoleSlot {
    pub role: Role,
    pub cardinality: Cardinality,
    pub kinds: ValueKindSet,
    pub rule: BindRule,
    /// Locale-bundle key for the interactive column prompt, when the
    /// rule cannot decide and the slot is required.
    pub prompt_key: Option<&'static str>,
}

impl RoleSlot {
    pub fn new(role: Role, cardinality: Cardinality, kinds: ValueKindSet, rule: BindRule) -> Self {
        RoleSlot { role, cardinality, kinds, rule, prompt_key: None }
    }

    pub fn with_prompt(mut self, key: &'static str) -> Self {
        self.prompt_key = Some(key);
        self
    }
}

/// Ordered list of role slots for one procedure.
#[derive(Debug, Clone)]
pub struct InputSchema {
    pub slots: Vec<RoleSlot>,
}

impl InputSchema {
    pub fn new(slots: Vec<RoleSlot>) -> Self {
        InputSchema { slots }
    }

    pub fn slot(&self, role: Role) -> Option<&RoleSlot> {
        self.slots.iter().find(|s| s.role == role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_names_round_trip() {
        for role in [
            Role::Feature,
            Role::Target,
            Role::Group,
            Role::Covariate,
            Role::TimeIndex,
            Role::Weight,
            Role::Ignored,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("bogus"), None);
    }

    #[test]
    fn kind_sets_permit_expected_kinds() {
        assert!(ValueKindSet::NUMERIC.permits(ValueKind::Numeric));
        assert!(!ValueKindSet::NUMERIC.permits(ValueKind::Categorical));
        assert!(ValueKindSet::GROUPABLE.permits(ValueKind::Categorical));
        assert!(!ValueKindSet::GROUPABLE.permits(ValueKind::Datetime));
    }

    #[test]
    fn required_cardinalities() {
        assert!(Cardinality::ExactlyOne.is_required());
        assert!(Cardinality::OneOrMore.is_required());
        assert!(!Cardinality::ZeroOrMore.is_required());
        assert!(!Cardinality::AllRemaining.is_required());
    }
}
