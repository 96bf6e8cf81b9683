//! The execution harness: one invocation from raw inputs to artifact.
//!
//! Every run walks the same state machine: validate (prompting as
//! needed), resolve parameters, run the kernel under a panic guard,
//! build the localized document, assemble the artifact. Any fault on
//! the way out is reported through the run report; a fault never
//! leaves a partial artifact behind.

use std::collections::BTreeMap;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::descriptor::AnalysisDescriptor;
use crate::error::{Fault, Result};
use crate::frame::{load_frame, Frame};
use crate::locale::Localizer;
use crate::registry;
use crate::report::{assemble, DocumentSink, PlotBackend};
use crate::result::build;
use crate::schema::{ParamValue, Role, Validated};

/// Interactive collaborator for column prompts. `ask` returns the
/// column names the user picked, or `None` when they cancelled.
pub trait PromptChannel {
    fn ask(&mut self, role: Role, prompt: &str) -> Option<Vec<String>>;
}

/// A channel with nobody on the other end: every prompt cancels.
pub struct NoPrompt;

impl PromptChannel for NoPrompt {
    fn ask(&mut self, _role: Role, _prompt: &str) -> Option<Vec<String>> {
        None
    }
}

/// Canned answers, keyed by role name. Used by hosts that collected
/// bindings up front, and by tests.
pub struct ScriptedPrompt(pub BTreeMap<String, Vec<String>>);

impl PromptChannel for ScriptedPrompt {
    fn ask(&mut self, role: Role, _prompt: &str) -> Option<Vec<String>> {
        self.0.remove(role.as_str())
    }
}

/// Everything one invocation needs beyond the descriptor.
pub struct Invocation<'a> {
    pub frame: &'a Frame,
    /// Role-name to column-name bindings supplied up front.
    pub hints: BTreeMap<String, Vec<String>>,
    /// Raw parameter values, pre-validation.
    pub params: BTreeMap<String, ParamValue>,
    pub locale: String,
    pub output_path: PathBuf,
}

/// Machine-readable outcome of one run, serialized on the invocation
/// surface. `message` is localized with the run's locale.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: RunStatus,
    pub procedure: String,
    pub locale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault_kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    Ok,
    Cancelled,
    Fault,
}

/// Runs one invocation end to end and folds any fault into the report.
pub fn execute(
    descriptor: &AnalysisDescriptor,
    invocation: Invocation,
    prompts: &mut dyn PromptChannel,
    sink: &dyn DocumentSink,
    backend: &dyn PlotBackend,
) -> RunReport {
    let localizer = Localizer::new(&descriptor.bundle, &invocation.locale);
    let locale = localizer.locale().to_string();
    let output_path = invocation.output_path.clone();
    info!(procedure = descriptor.id, locale = %locale, "run started");

    match run(descriptor, invocation, prompts, sink, backend, &localizer) {
        Ok(artifact) => {
            info!(procedure = descriptor.id, path = %artifact.display(), "run finished");
            RunReport {
                status: RunStatus::Ok,
                procedure: descriptor.id.to_string(),
                locale,
                artifact_path: Some(artifact.display().to_string()),
                fault_kind: None,
                message: None,
            }
        }
        Err(fault) => {
            discard_partial(&output_path, sink);
            let status = match fault {
                Fault::UserCancelled => RunStatus::Cancelled,
                _ => RunStatus::Fault,
            };
            warn!(procedure = descriptor.id, kind = fault.kind_id(), "run faulted: {fault}");
            let message = descriptor.bundle.lookup_with(
                &locale,
                fault.kind_key(),
                Some(&fault.detail()),
            );
            RunReport {
                status,
                procedure: descriptor.id.to_string(),
                locale,
                artifact_path: None,
                fault_kind: Some(fault.kind_id().to_string()),
                message: Some(message),
            }
        }
    }
}

fn run(
    descriptor: &AnalysisDescriptor,
    invocation: Invocation,
    prompts: &mut dyn PromptChannel,
    sink: &dyn DocumentSink,
    backend: &dyn PlotBackend,
    localizer: &Localizer,
) -> Result<PathBuf> {
    let Invocation { frame, mut hints, params, output_path, .. } = invocation;

    // Validation may round-trip through the prompt channel until every
    // required slot is bound.
    let binding = loop {
        match crate::schema::validate(frame, &descriptor.input_schema, &hints, descriptor.min_rows)?
        {
            Validated::Complete(binding) => break binding,
            Validated::Prompt { role, prompt_key } => {
                let prompt = localizer.text(prompt_key);
                let Some(columns) = prompts.ask(role, &prompt) else {
                    return Err(Fault::UserCancelled);
                };
                hints.insert(role.as_str().to_string(), columns);
            }
        }
    };

    let params = descriptor.param_schema.resolve(&params)?;
    let input = crate::kernel::KernelInput {
        frame,
        binding: &binding,
        params: &params,
        missing: descriptor.missing,
    };

    // A panicking kernel is a bug, not a user error; fold it into the
    // taxonomy instead of unwinding through the host.
    let output = panic::catch_unwind(AssertUnwindSafe(|| descriptor.kernel.run(&input)))
        .map_err(|payload| {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "kernel panicked".to_string());
            Fault::InternalInvariant(detail)
        })??;

    descriptor.check_output(&output)?;
    let document = build(descriptor, &output, localizer)?;
    assemble(descriptor, &document, &output_path, sink, backend)
}

/// Removes whatever a faulted run managed to write.
fn discard_partial(output_path: &Path, sink: &dyn DocumentSink) {
    let artifact = output_path.with_extension(sink.extension());
    if artifact.exists() {
        let _ = fs::remove_file(&artifact);
    }
    if let Some(stem) = artifact.file_stem().and_then(|s| s.to_str()) {
        let dir = match artifact.parent() {
            Some(parent) if parent != Path::new("") => parent.join(format!("{stem}_figures")),
            _ => PathBuf::from(format!("{stem}_figures")),
        };
        if dir.is_dir() {
            let _ = fs::remove_dir_all(&dir);
        }
    }
}

/// The invocation surface: look up a registered procedure, load the
/// input file, run, report.
pub fn run_analysis(
    procedure: &str,
    input_path: Option<&Path>,
    output_path: &Path,
    hints: BTreeMap<String, Vec<String>>,
    params: BTreeMap<String, ParamValue>,
    locale: &str,
    prompts: &mut dyn PromptChannel,
    sink: &dyn DocumentSink,
    backend: &dyn PlotBackend,
) -> RunReport {
    let Some(descriptor) = registry::descriptor(procedure) else {
        return RunReport {
            status: RunStatus::Fault,
            procedure: procedure.to_string(),
            locale: locale.to_string(),
            artifact_path: None,
            fault_kind: Some("parameter-invalid".to_string()),
            message: Some(format!("unknown procedure '{procedure}'")),
        };
    };

    let loaded = match input_path {
        Some(path) => load_frame(path),
        None => Err(Fault::InputMissing),
    };
    let frame = match loaded {
        Ok(frame) => frame,
        Err(fault) => {
            let localizer = Localizer::new(&descriptor.bundle, locale);
            let message = descriptor.bundle.lookup_with(
                localizer.locale(),
                fault.kind_key(),
                Some(&fault.detail()),
            );
            return RunReport {
                status: RunStatus::Fault,
                procedure: procedure.to_string(),
                locale: localizer.locale().to_string(),
                artifact_path: None,
                fault_kind: Some(fault.kind_id().to_string()),
                message: Some(message),
            };
        }
    };

    let invocation = Invocation {
        frame: &frame,
        hints,
        params,
        locale: locale.to_string(),
        output_path: output_path.to_path_buf(),
    };
    execute(descriptor, invocation, prompts, sink, backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Column;
    use crate::kernel::{Kernel, KernelInput, KernelOutput, KernelShape, MissingPolicy};
    use crate::locale::LocaleBundle;
    use crate::report::{MarkdownSink, NullBackend};
    use crate::descriptor::SectionTemplate;
    use crate::schema::input::{BindRule, Cardinality, InputSchema, RoleSlot, ValueKindSet};
    use crate::schema::ParamSchema;

    struct PanicKernel;

    impl Kernel for PanicKernel {
        fn shape(&self) -> KernelShape {
            KernelShape::UnivariateDescriptive
        }

        fn run(&self, _input: &KernelInput) -> crate::error::Result<KernelOutput> {
            panic!("index out of bounds");
        }
    }

    fn panic_descriptor() -> AnalysisDescriptor {
        AnalysisDescriptor {
            id: "panicky",
            shape: KernelShape::UnivariateDescriptive,
            input_schema: InputSchema::new(vec![RoleSlot::new(
                Role::Feature,
                Cardinality::OneOrMore,
                ValueKindSet::NUMERIC,
                BindRule::AllRemaining,
            )]),
            param_schema: ParamSchema::empty(),
            missing: MissingPolicy::DropRow,
            min_rows: 1,
            output_layout: vec![SectionTemplate::TableStatistic {
                slot: "statistics",
                title_key: "section-stats",
                transposed: false,
            }],
            bundle: LocaleBundle::from_sources(&[(
                "en-US",
                "title = T\nsection-stats = S\n\
                 fault-internal-invariant = Internal error: { $detail }\n\
                 fault-user-cancelled = Cancelled.\n",
            )])
            .unwrap(),
            naming_template: "{base}-{figure}",
            kernel: Box::new(PanicKernel),
        }
    }

    #[test]
    fn kernel_panic_becomes_internal_invariant() {
        let dir = tempfile::tempdir().unwrap();
        let frame = Frame::new(vec![Column::numeric("x", vec![1.0, 2.0])]).unwrap();
        let report = execute(
            &panic_descriptor(),
            Invocation {
                frame: &frame,
                hints: BTreeMap::new(),
                params: BTreeMap::new(),
                locale: "en-US".into(),
                output_path: dir.path().join("out.md"),
            },
            &mut NoPrompt,
            &MarkdownSink,
            &NullBackend,
        );
        assert_eq!(report.status, RunStatus::Fault);
        assert_eq!(report.fault_kind.as_deref(), Some("internal-invariant"));
        assert_eq!(report.message.as_deref(), Some("Internal error: index out of bounds"));
        assert!(!dir.path().join("out.md").exists());
    }

    #[test]
    fn cancelled_prompt_reports_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let frame = Frame::new(vec![Column::numeric("x", vec![1.0, 2.0])]).unwrap();
        let mut descriptor = panic_descriptor();
        descriptor.input_schema = InputSchema::new(vec![RoleSlot::new(
            Role::Group,
            Cardinality::ExactlyOne,
            ValueKindSet::CATEGORICAL,
            BindRule::NoRule,
        )
        .with_prompt("prompt-group")]);
        let report = execute(
            &descriptor,
            Invocation {
                frame: &frame,
                hints: BTreeMap::new(),
                params: BTreeMap::new(),
                locale: "en-US".into(),
                output_path: dir.path().join("out.md"),
            },
            &mut NoPrompt,
            &MarkdownSink,
            &NullBackend,
        );
        assert_eq!(report.status, RunStatus::Cancelled);
        assert_eq!(report.fault_kind.as_deref(), Some("user-cancelled"));
    }

    #[test]
    fn scripted_prompt_fills_the_missing_slot() {
        let mut answers = BTreeMap::new();
        answers.insert("feature".to_string(), vec!["x".to_string()]);
        let mut channel = ScriptedPrompt(answers);
        assert_eq!(channel.ask(Role::Feature, "pick"), Some(vec!["x".to_string()]));
        assert_eq!(channel.ask(Role::Feature, "pick"), None);
    }
}
