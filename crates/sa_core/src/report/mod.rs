//! Report assembly: one result document in, one artifact out.
//!
//! The assembler owns file placement. Figures land in a side-car
//! directory next to the artifact, named `<stem>_figures`, with image
//! file names derived from the descriptor's naming template.

pub mod backend;
pub mod sink;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::descriptor::AnalysisDescriptor;
use crate::error::{Fault, Result};
use crate::result::ResultDocument;

pub use backend::{NullBackend, PlotBackend, SvgBackend};
pub use sink::{DocumentSink, MarkdownSink};

/// Writes the artifact (and its figure side-car) for one run. Returns
/// the artifact path actually written.
pub fn assemble(
    descriptor: &AnalysisDescriptor,
    document: &ResultDocument,
    output_path: &Path,
    sink: &dyn DocumentSink,
    backend: &dyn PlotBackend,
) -> Result<PathBuf> {
    let artifact = output_path.with_extension(sink.extension());
    let stem = artifact
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Fault::SinkFailure(format!("unusable output path {artifact:?}")))?
        .to_string();

    let mut images = BTreeMap::new();
    let figures: Vec<_> = document.figures().collect();
    if !figures.is_empty() {
        let dir_name = format!("{stem}_figures");
        let figures_dir = match artifact.parent() {
            Some(parent) if parent != Path::new("") => parent.join(&dir_name),
            _ => PathBuf::from(&dir_name),
        };
        fs::create_dir_all(&figures_dir)?;
        for figure in figures {
            let bytes = backend.render(figure)?;
            if bytes.is_empty() {
                continue;
            }
            let file = format!(
                "{}.{}",
                descriptor.image_file_name(&stem, &figure.figure_name),
                backend.extension()
            );
            fs::write(figures_dir.join(&file), bytes)?;
            images.insert(figure.figure_name.clone(), format!("{dir_name}/{file}"));
            debug!(figure = %figure.figure_name, file = %file, "figure rendered");
        }
    }

    let text = sink.render(document, &images)?;
    fs::write(&artifact, text)?;
    debug!(path = %artifact.display(), "artifact written");
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Column, Frame};
    use crate::kernel::descriptive::DescriptiveKernel;
    use crate::kernel::{KernelInput, KernelShape, MissingPolicy};
    use crate::locale::{LocaleBundle, Localizer};
    use crate::result::build;
    use crate::schema::input::{BindRule, Cardinality, InputSchema, RoleSlot, ValueKindSet};
    use crate::schema::{validate, ParamSchema, Role, Validated};
    use crate::descriptor::SectionTemplate;
    use std::collections::BTreeMap as Map;

    fn descriptor() -> AnalysisDescriptor {
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
                SectionTemplate::Figure { recipe: "histogram", title_key: "section-figures" },
            ],
            bundle: LocaleBundle::from_sources(&[(
                "en-US",
                "title = Report\nsection-stats = Statistics\nsection-figures = Figures\n\
                 figure-histogram = Histogram\naxis-value = Value\naxis-frequency = Frequency\n",
            )])
            .unwrap(),
            naming_template: "{base}-{figure}",
            kernel: Box::new(DescriptiveKernel),
        }
    }

    fn document(d: &AnalysisDescriptor) -> ResultDocument {
        let frame =
            Frame::new(vec![Column::numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0])]).unwrap();
        let Validated::Complete(binding) =
            validate(&frame, &d.input_schema, &Map::new(), d.min_rows).unwrap()
        else {
            panic!("expected binding");
        };
        let params = d.param_schema.resolve(&Map::new()).unwrap();
        let input = KernelInput {
            frame: &frame,
            binding: &binding,
            params: &params,
            missing: d.missing,
        };
        let output = d.kernel.run(&input).unwrap();
        build(d, &output, &Localizer::new(&d.bundle, "en-US")).unwrap()
    }

    #[test]
    fn writes_artifact_and_figure_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let d = descriptor();
        let doc = document(&d);
        let path = assemble(
            &d,
            &doc,
            &dir.path().join("report.md"),
            &MarkdownSink,
            &SvgBackend::default(),
        )
        .unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("![Histogram](report_figures/report-histogram-x.svg)"));
        assert!(dir.path().join("report_figures/report-histogram-x.svg").exists());
    }

    #[test]
    fn null_backend_skips_the_sidecar_images() {
        let dir = tempfile::tempdir().unwrap();
        let d = descriptor();
        let doc = document(&d);
        let path =
            assemble(&d, &doc, &dir.path().join("report.md"), &MarkdownSink, &NullBackend)
                .unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("*Histogram*"));
    }

    #[test]
    fn extension_follows_the_sink() {
        let dir = tempfile::tempdir().unwrap();
        let d = descriptor();
        let doc = document(&d);
        let path =
            assemble(&d, &doc, &dir.path().join("report.txt"), &MarkdownSink, &NullBackend)
                .unwrap();
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("md"));
    }
}
