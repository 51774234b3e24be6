//! Types for the hook module.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::command::ResolvedCommands;
use crate::config::{BuildConfig, ResolvedOptions};
use crate::runner::{ArgumentVector, ExecutionResult};

/// Program name used when the build system does not provide one.
pub const DEFAULT_PROG_NAME: &str = "firmware";

/// Extension of the firmware image produced by the build.
pub const IMAGE_EXTENSION: &str = "hex";

/// Extension of the generated waveform.
pub const WAV_EXTENSION: &str = "wav";

/// Exit code reported by the on-demand target when the run could not start.
pub const EXIT_CONFIG_ERROR: i32 = 1;

/// Exit code reported by the on-demand target when the converter succeeded
/// but left no WAV behind.
pub const EXIT_MISSING_OUTPUT: i32 = 1;

/// What started a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// The build just produced the firmware image.
    PostBuild,
    /// The `wav` target was requested explicitly.
    OnDemand,
}

impl Trigger {
    /// Name used to tag log events.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PostBuild => "post-build",
            Self::OnDemand => "wav",
        }
    }
}

/// Steps of a conversion run, in the order they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookState {
    Start,
    Converting,
    Converted,
    ConvertFailed,
    Playing,
    Done,
}

/// Build output location as reported by the build system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub build_dir: PathBuf,
    pub prog_name: Option<String>,
}

impl BuildContext {
    pub fn new(build_dir: impl Into<PathBuf>, prog_name: Option<String>) -> Self {
        Self {
            build_dir: build_dir.into(),
            prog_name,
        }
    }

    /// The program name, or `firmware` when none (or a blank one) was given.
    pub fn prog_name(&self) -> &str {
        prog_name_or_default(self.prog_name.as_deref())
    }
}

impl From<&BuildConfig> for BuildContext {
    fn from(config: &BuildConfig) -> Self {
        Self::new(config.build_dir.clone(), Some(config.prog_name.clone()))
    }
}

/// Firmware image in, waveform out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactPaths {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl ArtifactPaths {
    /// `<build_dir>/<prog>.hex` -> `<build_dir>/<prog>.wav`
    pub fn from_build(ctx: &BuildContext) -> Self {
        let prog = ctx.prog_name();
        Self {
            input: ctx
                .build_dir
                .join(format!("{}.{}", prog, IMAGE_EXTENSION)),
            output: ctx.build_dir.join(format!("{}.{}", prog, WAV_EXTENSION)),
        }
    }

    /// Uses a known image path; the WAV goes next to it as `<prog>.wav`.
    pub fn from_image(image: &Path, prog_name: Option<&str>) -> Self {
        let build_dir = image.parent().unwrap_or_else(|| Path::new(""));
        let prog = prog_name_or_default(prog_name);
        Self {
            input: image.to_path_buf(),
            output: build_dir.join(format!("{}.{}", prog, WAV_EXTENSION)),
        }
    }
}

/// Picks the firmware image out of a post-build action's targets and
/// sources: the first target if it is a `.hex` file, otherwise the first
/// source.
pub fn select_image(targets: &[PathBuf], sources: &[PathBuf]) -> Option<PathBuf> {
    match targets.first() {
        Some(target) if has_image_extension(target) => Some(target.clone()),
        _ => sources.first().cloned(),
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case(IMAGE_EXTENSION))
        .unwrap_or(false)
}

fn prog_name_or_default(name: Option<&str>) -> &str {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => DEFAULT_PROG_NAME,
    }
}

/// Options and final templates a run would use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookPlan {
    pub options: ResolvedOptions,
    pub commands: ResolvedCommands,
}

/// One external program invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub argv: ArgumentVector,
    pub result: ExecutionResult,
}

/// Everything that happened during one conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    pub trigger: Trigger,
    pub paths: ArtifactPaths,
    pub plan: HookPlan,
    pub converter: StepRecord,
    /// Whether the WAV existed after the converter exited.
    pub output_exists: bool,
    /// Present only if auto-play was on and the conversion succeeded.
    pub player: Option<StepRecord>,
    /// States entered, in order.
    pub states: Vec<HookState>,
}

impl ConversionReport {
    /// Whether the WAV was produced.
    pub fn converted(&self) -> bool {
        self.states.contains(&HookState::Converted)
    }

    pub fn final_state(&self) -> HookState {
        self.states.last().copied().unwrap_or(HookState::Start)
    }

    /// Status for the on-demand target: the converter's exit code, or
    /// `EXIT_MISSING_OUTPUT` if it exited cleanly without writing the WAV.
    /// Playback never changes it.
    pub fn exit_code(&self) -> i32 {
        let code = self.converter.result.exit_code;
        if code != 0 {
            code
        } else if !self.output_exists {
            EXIT_MISSING_OUTPUT
        } else {
            0
        }
    }
}
