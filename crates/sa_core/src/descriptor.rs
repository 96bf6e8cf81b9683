//! Analysis descriptors: the static declaration of one procedure and
//! the framework's unit of extension.

use crate::error::{Fault, Result};
use crate::kernel::{Kernel, KernelOutput, KernelShape, MissingPolicy};
use crate::locale::LocaleBundle;
use crate::schema::{InputSchema, ParamSchema};

/// One entry in a descriptor's output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionTemplate {
    /// A statistic table pulled from a keyed kernel output slot.
    TableStatistic { slot: &'static str, title_key: &'static str, transposed: bool },
    /// One-row prose table explaining the referenced table's statistics.
    TableExplanation { slot: &'static str, title_key: &'static str },
    /// One-row prose table interpreting the referenced table's statistics.
    TableInterpretation { slot: &'static str, title_key: &'static str },
    /// A figure rendered from the kernel recipe named `recipe`, or from
    /// every recipe named `recipe:<suffix>` when the kernel emits one
    /// per column.
    Figure { recipe: &'static str, title_key: &'static str },
    /// A free-standing localized paragraph.
    Prose { text_key: &'static str, title_key: &'static str },
}

/// Static registry entry for one analysis procedure.
pub struct AnalysisDescriptor {
    pub id: &'static str,
    pub shape: KernelShape,
    pub input_schema: InputSchema,
    pub param_schema: ParamSchema,
    pub missing: MissingPolicy,
    pub min_rows: usize,
    pub output_layout: Vec<SectionTemplate>,
    pub bundle: LocaleBundle,
    /// Side-car image naming template with `{base}` and `{figure}` slots.
    pub naming_template: &'static str,
    pub kernel: Box<dyn Kernel>,
}

impl AnalysisDescriptor {
    /// Table slots the output layout references.
    pub fn referenced_slots(&self) -> Vec<&'static str> {
        let mut slots = Vec::new();
        for template in &self.output_layout {
            match template {
                SectionTemplate::TableStatistic { slot, .. }
                | SectionTemplate::TableExplanation { slot, .. }
                | SectionTemplate::TableInterpretation { slot, .. } => {
                    if !slots.contains(slot) {
                        slots.push(*slot);
                    }
                }
                _ => {}
            }
        }
        slots
    }

    /// Recipe names (or per-column prefixes) the layout references.
    pub fn referenced_recipes(&self) -> Vec<&'static str> {
        self.output_layout
            .iter()
            .filter_map(|t| match t {
                SectionTemplate::Figure { recipe, .. } => Some(*recipe),
                _ => None,
            })
            .collect()
    }

    /// Checks that a kernel output satisfies this layout. Violations
    /// are descriptor bugs, reported as `internal-invariant`.
    pub fn check_output(&self, output: &KernelOutput) -> Result<()> {
        for slot in self.referenced_slots() {
            if output.table(slot).is_none() {
                return Err(Fault::InternalInvariant(format!(
                    "kernel for '{}' did not emit table slot '{slot}'",
                    self.id
                )));
            }
        }
        for recipe in self.referenced_recipes() {
            let prefix = format!("{recipe}:");
            let found = output
                .recipe_names()
                .iter()
                .any(|n| *n == recipe || n.starts_with(&prefix));
            if !found {
                return Err(Fault::InternalInvariant(format!(
                    "kernel for '{}' did not emit plot recipe '{recipe}'",
                    self.id
                )));
            }
        }
        Ok(())
    }

    /// Every locale-bundle key this descriptor's schemas and layout
    /// reference. Used by the completeness tests and the registry's
    /// startup audit.
    pub fn referenced_keys(&self) -> Vec<String> {
        let mut keys = vec!["title".to_string()];
        for slot in &self.input_schema.slots {
            if let Some(prompt) = slot.prompt_key {
                keys.push(prompt.to_string());
            }
        }
        for spec in &self.param_schema.specs {
            keys.push(spec.message_key.to_string());
        }
        for template in &self.output_layout {
            match template {
                SectionTemplate::TableStatistic { title_key, .. }
                | SectionTemplate::TableExplanation { title_key, .. }
                | SectionTemplate::TableInterpretation { title_key, .. }
                | SectionTemplate::Figure { title_key, .. } => {
                    keys.push(title_key.to_string());
                }
                SectionTemplate::Prose { text_key, title_key } => {
                    keys.push(text_key.to_string());
                    keys.push(title_key.to_string());
                }
            }
        }
        keys.sort();
        keys.dedup();
        keys
    }

    /// Side-car image file name for one figure of one artifact.
    pub fn image_file_name(&self, base: &str, figure: &str) -> String {
        self.naming_template
            .replace("{base}", base)
            .replace("{figure}", figure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_names_follow_the_template() {
        let template = "{base}_{figure}.svg";
        assert_eq!(
            template.replace("{base}", "report").replace("{figure}", "histogram-x"),
            "report_histogram-x.svg"
        );
    }
}
