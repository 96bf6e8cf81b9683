//! Input validator: binds frame columns to role slots.
//!
//! First-fault semantics throughout; the frame is never mutated. The
//! validator is total: for any frame and schema it returns a binding,
//! a prompt request, or a fault, and never panics.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::Fault;
use crate::frame::{Column, Frame};
use crate::schema::input::{BindRule, Cardinality, InputSchema, Role};

/// Concrete assignment of columns to role slots, in slot order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    entries: Vec<(Role, Vec<usize>)>,
}

impl Binding {
    /// Column indices bound to `role`; empty when the role is unbound.
    pub fn indices(&self, role: Role) -> &[usize] {
        self.entries
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, idx)| idx.as_slice())
            .unwrap_or(&[])
    }

    /// Columns bound to `role`, resolved against `frame`.
    pub fn columns<'a>(&self, frame: &'a Frame, role: Role) -> Vec<&'a Column> {
        self.indices(role)
            .iter()
            .filter_map(|&i| frame.columns().get(i))
            .collect()
    }

    /// The single column bound to `role`.
    pub fn column<'a>(&self, frame: &'a Frame, role: Role) -> Result<&'a Column, Fault> {
        let idx = self.indices(role);
        match idx {
            [i] => frame
                .columns()
                .get(*i)
                .ok_or_else(|| Fault::InternalInvariant(format!("binding index {i} out of range"))),
            _ => Err(Fault::InternalInvariant(format!(
                "role {} bound to {} columns, expected 1",
                role.as_str(),
                idx.len()
            ))),
        }
    }
}

/// Validation outcome: a complete binding, or a request for one more
/// column name from the user collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validated {
    Complete(Binding),
    Prompt { role: Role, prompt_key: &'static str },
}

/// Binds `frame` columns to `schema` slots, honoring `hints` first and
/// the slots' disambiguation rules second.
///
/// `hints` maps role names (`Role::as_str`) to user-named columns;
/// `min_rows` is the procedure's row-count floor.
pub fn validate(
    frame: &Frame,
    schema: &InputSchema,
    hints: &BTreeMap<String, Vec<String>>,
    min_rows: usize,
) -> Result<Validated, Fault> {
    for name in hints.keys() {
        if Role::parse(name).is_none() {
            return Err(Fault::SchemaUnsatisfied(format!("unknown role hint '{name}'")));
        }
    }

    let ncols = frame.columns().len();
    let mut taken = vec![false; ncols];
    let mut bound: Vec<(Role, Vec<usize>)> = Vec::with_capacity(schema.slots.len());

    // Pass 1: user hints, in slot declaration order.
    for slot in &schema.slots {
        let Some(named) = hints.get(slot.role.as_str()) else {
            continue;
        };
        let mut indices = Vec::with_capacity(named.len());
        for name in named {
            let idx = frame
                .column_index(name)
                .ok_or_else(|| Fault::UnknownColumn(name.clone()))?;
            if taken[idx] {
                return Err(Fault::SchemaUnsatisfied(format!(
                    "column '{name}' bound to more than one role"
                )));
            }
            taken[idx] = true;
            indices.push(idx);
        }
        bound.push((slot.role, indices));
    }

    // Pass 2: disambiguation rules over the remaining columns.
    for slot in &schema.slots {
        if bound.iter().any(|(r, _)| *r == slot.role) {
            continue;
        }
        let free: Vec<usize> = (0..ncols)
            .filter(|&i| !taken[i] && slot.kinds.permits(frame.columns()[i].kind()))
            .collect();
        let chosen: Vec<usize> = match slot.rule {
            BindRule::LastColumn => free.last().copied().into_iter().collect(),
            BindRule::FirstColumn => free.first().copied().into_iter().collect(),
            BindRule::AllRemaining => free,
            BindRule::FirstCategorical => free
                .iter()
                .copied()
                .find(|&i| frame.columns()[i].kind() == crate::frame::ValueKind::Categorical)
                .into_iter()
                .collect(),
            BindRule::FirstDatetime => free
                .iter()
                .copied()
                .find(|&i| frame.columns()[i].kind() == crate::frame::ValueKind::Datetime)
                .into_iter()
                .collect(),
            BindRule::NoRule => Vec::new(),
        };
        for &i in &chosen {
            taken[i] = true;
        }
        bound.push((slot.role, chosen));
    }

    // Pass 3: unbound required slots prompt when they can, fault when
    // they cannot.
    for slot in &schema.slots {
        let indices = bound
            .iter()
            .find(|(r, _)| *r == slot.role)
            .map(|(_, idx)| idx.clone())
            .unwrap_or_default();
        if indices.is_empty() && slot.cardinality.is_required() {
            if let Some(prompt_key) = slot.prompt_key {
                debug!(role = slot.role.as_str(), "validation needs a column prompt");
                return Ok(Validated::Prompt { role: slot.role, prompt_key });
            }
            return Err(Fault::SchemaUnsatisfied(slot.role.as_str().to_string()));
        }
        if slot.cardinality == Cardinality::ExactlyOne && indices.len() > 1 {
            return Err(Fault::SchemaUnsatisfied(format!(
                "role {} takes exactly one column, got {}",
                slot.role.as_str(),
                indices.len()
            )));
        }
    }

    // Pass 4: value-kind compatibility for every binding.
    for slot in &schema.slots {
        if let Some((_, indices)) = bound.iter().find(|(r, _)| *r == slot.role) {
            for &i in indices {
                let col = &frame.columns()[i];
                if !slot.kinds.permits(col.kind()) {
                    return Err(Fault::WrongKind(col.name.clone()));
                }
            }
        }
    }

    // Pass 5: overall frame shape.
    if frame.rows() < min_rows {
        return Err(Fault::SchemaUnsatisfied(format!(
            "{} rows, need at least {min_rows}",
            frame.rows()
        )));
    }

    // Preserve slot declaration order in the binding.
    let mut entries = Vec::with_capacity(schema.slots.len());
    for slot in &schema.slots {
        if let Some((role, indices)) = bound.iter().find(|(r, _)| *r == slot.role) {
            entries.push((*role, indices.clone()));
        }
    }
    Ok(Validated::Complete(Binding { entries }))
}
