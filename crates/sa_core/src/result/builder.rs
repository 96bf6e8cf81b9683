//! Builds the localized result document from a kernel output.
//!
//! This is the only place where table cells turn into strings: labels
//! are localized here, numbers are rendered here, and figure recipes
//! get their localized titles here. Downstream sinks only ever see
//! finished text.

use crate::descriptor::{AnalysisDescriptor, SectionTemplate};
use crate::error::{Fault, Result};
use crate::kernel::{Cell, KernelOutput, Label, TableArtifact};
use crate::locale::Localizer;
use crate::result::format::FormatPolicy;
use crate::result::{FigureSection, ProseSection, ResultDocument, Section, TableSection};

/// Walks the descriptor's output layout and freezes every section.
pub fn build(
    descriptor: &AnalysisDescriptor,
    output: &KernelOutput,
    localizer: &Localizer,
) -> Result<ResultDocument> {
    descriptor.check_output(output)?;
    let policy = FormatPolicy::default();
    let mut document = ResultDocument {
        title: localizer.text("title"),
        sections: Vec::new(),
    };

    for template in &descriptor.output_layout {
        match template {
            SectionTemplate::TableStatistic { slot, title_key, transposed } => {
                let table = require_table(descriptor, output, slot)?;
                document.sections.push(Section::Table(render_table(
                    table,
                    localizer.text(title_key),
                    *transposed,
                    localizer,
                    &policy,
                )));
            }
            SectionTemplate::TableExplanation { slot, title_key } => {
                let table = require_table(descriptor, output, slot)?;
                document.sections.push(Section::Table(prose_table(
                    table,
                    localizer.text(title_key),
                    "explain",
                    localizer,
                )));
            }
            SectionTemplate::TableInterpretation { slot, title_key } => {
                let table = require_table(descriptor, output, slot)?;
                document.sections.push(Section::Table(prose_table(
                    table,
                    localizer.text(title_key),
                    "interpret",
                    localizer,
                )));
            }
            SectionTemplate::Figure { recipe, title_key } => {
                for name in matching_recipes(output, recipe) {
                    let recipe = output.recipe(&name).ok_or_else(|| {
                        Fault::InternalInvariant(format!("recipe '{name}' vanished"))
                    })?;
                    let mut localized = recipe.clone();
                    localized.title_key = localizer.text(&recipe.title_key);
                    localized.x_label_key = localizer.text(&recipe.x_label_key);
                    localized.y_label_key = localizer.text(&recipe.y_label_key);
                    document.sections.push(Section::Figure(FigureSection {
                        title: figure_title(localizer.text(title_key), &name),
                        figure_name: figure_name(&name),
                        caption: localized.title_key.clone(),
                        recipe: localized,
                    }));
                }
            }
            SectionTemplate::Prose { text_key, title_key } => {
                document.sections.push(Section::Prose(ProseSection {
                    title: localizer.text(title_key),
                    text: localizer.text(text_key),
                }));
            }
        }
    }

    Ok(document)
}

fn require_table<'a>(
    descriptor: &AnalysisDescriptor,
    output: &'a KernelOutput,
    slot: &str,
) -> Result<&'a TableArtifact> {
    output.table(slot).ok_or_else(|| {
        Fault::InternalInvariant(format!(
            "layout of '{}' references missing table slot '{slot}'",
            descriptor.id
        ))
    })
}

/// Recipe names matching a layout reference: the exact name, or every
/// per-column recipe named `<reference>:<column>` in kernel order.
fn matching_recipes(output: &KernelOutput, reference: &str) -> Vec<String> {
    let prefix = format!("{reference}:");
    output
        .recipe_names()
        .iter()
        .filter(|n| **n == reference || n.starts_with(&prefix))
        .map(|n| n.to_string())
        .collect()
}

/// File-name-safe figure identifier within the document.
fn figure_name(recipe_name: &str) -> String {
    recipe_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect()
}

/// Per-column figures get the column appended to the section title.
fn figure_title(base: String, recipe_name: &str) -> String {
    match recipe_name.split_once(':') {
        Some((_, column)) => format!("{base}: {column}"),
        None => base,
    }
}

fn render_label(label: &Label, localizer: &Localizer) -> String {
    match label {
        Label::Key(k) => localizer.text(k),
        Label::Verbatim(v) => v.clone(),
    }
}

fn render_cell(cell: &Cell, localizer: &Localizer, policy: &FormatPolicy) -> String {
    match cell {
        Cell::Count(v) => policy.render_count(*v),
        Cell::Statistic(v) => policy.render_statistic(*v),
        Cell::Proportion(v) => policy.render_proportion(*v),
        Cell::Text(s) => s.clone(),
        Cell::Key(k) => localizer.text(k),
        Cell::Empty => String::new(),
    }
}

fn render_table(
    table: &TableArtifact,
    title: String,
    transposed: bool,
    localizer: &Localizer,
    policy: &FormatPolicy,
) -> TableSection {
    let mut header = Vec::with_capacity(table.col_labels.len() + 1);
    header.push(String::new());
    header.extend(table.col_labels.iter().map(|l| render_label(l, localizer)));
    let rows = table
        .row_labels
        .iter()
        .zip(table.cells.iter())
        .map(|(label, cells)| {
            let mut row = Vec::with_capacity(cells.len() + 1);
            row.push(render_label(label, localizer));
            row.extend(cells.iter().map(|c| render_cell(c, localizer, policy)));
            row
        })
        .collect();
    TableSection { title, header, rows, transposed }
}

/// One-row explanation/interpretation table derived from a statistic
/// table: same headers, each cell the localized `<prefix>-<stat-key>`
/// prose. Verbatim headers (column names, group levels) get no prose.
fn prose_table(
    table: &TableArtifact,
    title: String,
    prefix: &str,
    localizer: &Localizer,
) -> TableSection {
    let mut header = vec![String::new()];
    let mut row = vec![String::new()];
    for label in &table.col_labels {
        if let Label::Key(key) = label {
            header.push(localizer.text(key));
            row.push(localizer.text(&format!("{prefix}-{key}")));
        }
    }
    TableSection { title, header, rows: vec![row], transposed: false }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Column, Frame};
    use crate::kernel::descriptive::DescriptiveKernel;
    use crate::kernel::MissingPolicy;
    use crate::kernel::{KernelInput, KernelShape};
    use crate::locale::LocaleBundle;
    use crate::schema::input::{BindRule, Cardinality, InputSchema, RoleSlot, ValueKindSet};
    use crate::schema::params::ParamSchema;
    use crate::schema::{validate, Role, Validated};
    use std::collections::BTreeMap;

    fn descriptor() -> AnalysisDescriptor {
        let ftl_en = concat!(
            "title = Descriptive Statistics\n",
            "section-stats = Statistics\n",
            "section-explain = Explanation\n",
            "section-figures = Distribution\n",
            "stat-count = N\n",
            "stat-mean = Mean\n",
            "stat-median = Median\n",
            "stat-stdev = Std. Deviation\n",
            "stat-min = Minimum\n",
            "stat-max = Maximum\n",
            "stat-range = Range\n",
            "stat-q1 = Q1\n",
            "stat-q3 = Q3\n",
            "stat-iqr = IQR\n",
            "explain-stat-count = Number of observations.\n",
            "explain-stat-mean = Arithmetic average.\n",
            "explain-stat-median = Middle value.\n",
            "explain-stat-stdev = Spread around the mean.\n",
            "explain-stat-min = Smallest value.\n",
            "explain-stat-max = Largest value.\n",
            "explain-stat-range = Max minus min.\n",
            "explain-stat-q1 = First quartile.\n",
            "explain-stat-q3 = Third quartile.\n",
            "explain-stat-iqr = Q3 minus Q1.\n",
            "figure-histogram = Histogram\n",
            "axis-value = Value\n",
            "axis-frequency = Frequency\n",
        );
        AnalysisDescriptor {
            id: "descriptive",
            shape: KernelShape::UnivariateDescriptive,
            input_schema: InputSchema::new(vec![RoleSlot::new(
                Role::Feature,
                Cardinality::OneOrMore,
                ValueKindSet::NUMERIC,
                BindRule::AllRemaining,
            )]),
            param_schema: ParamSchema::empty(),
            missing: MissingPolicy::DropRow,
            min_rows: 2,
            output_layout: vec![
                SectionTemplate::TableStatistic {
                    slot: "statistics",
                    title_key: "section-stats",
                    transposed: false,
                },
                SectionTemplate::TableExplanation {
                    slot: "statistics",
                    title_key: "section-explain",
                },
                SectionTemplate::Figure {
                    recipe: "histogram",
                    title_key: "section-figures",
                },
            ],
            bundle: LocaleBundle::from_sources(&[("en-US", ftl_en)]).unwrap(),
            naming_template: "{base}_{figure}.svg",
            kernel: Box::new(DescriptiveKernel),
        }
    }

    fn built() -> ResultDocument {
        let d = descriptor();
        let frame = Frame::new(vec![Column::numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0])])
            .unwrap();
        let Validated::Complete(binding) =
            validate(&frame, &d.input_schema, &BTreeMap::new(), d.min_rows).unwrap()
        else {
            panic!("expected binding");
        };
        let params = d.param_schema.resolve(&BTreeMap::new()).unwrap();
        let input = KernelInput {
            frame: &frame,
            binding: &binding,
            params: &params,
            missing: d.missing,
        };
        let output = d.kernel.run(&input).unwrap();
        let localizer = Localizer::new(&d.bundle, "en-US");
        build(&d, &output, &localizer).unwrap()
    }

    #[test]
    fn statistic_table_localizes_headers_and_formats_cells() {
        let doc = built();
        assert_eq!(doc.title, "Descriptive Statistics");
        let table = doc.tables().next().unwrap();
        assert_eq!(table.title, "Statistics");
        assert_eq!(table.header[1], "N");
        assert_eq!(table.header[2], "Mean");
        assert_eq!(table.rows[0][0], "x");
        assert_eq!(table.rows[0][1], "5");
        assert_eq!(table.rows[0][2], "3.0000");
        assert_eq!(table.rows[0][4], "1.5811");
    }

    #[test]
    fn explanation_table_has_one_prose_row() {
        let doc = built();
        let table = doc.tables().nth(1).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.header[1], "N");
        assert_eq!(table.rows[0][1], "Number of observations.");
    }

    #[test]
    fn per_column_figures_expand_with_sanitized_names() {
        let doc = built();
        let figure = doc.figures().next().unwrap();
        assert_eq!(figure.figure_name, "histogram-x");
        assert_eq!(figure.title, "Distribution: x");
        assert_eq!(figure.recipe.title_key, "Histogram");
    }

    #[test]
    fn missing_slot_is_an_internal_invariant() {
        let d = descriptor();
        let localizer = Localizer::new(&d.bundle, "en-US");
        let empty = KernelOutput::default();
        assert!(matches!(
            build(&d, &empty, &localizer),
            Err(Fault::InternalInvariant(_))
        ));
    }
}
