//! Conversion hook: firmware image in, WAV out, optional playback.
//!
//! A run moves through these states:
//!
//! ```text
//! Start -> Converting -> Converted -> [Playing] -> Done
//!                     \-> ConvertFailed -> Done
//! ```
//!
//! The converter counts as failed if it exits non-zero or leaves no WAV
//! behind. A failed conversion is logged and never escalated; playback only
//! starts after a successful conversion and its exit code is only logged.
//!
//! There are two entry points:
//!
//! - `ConversionHook::post_build`, called after the build produced the image.
//!   It never fails.
//! - `ConversionHook::on_demand`, the `wav` target. It always runs, and its
//!   report's `exit_code()` is the converter's exit code.
//!
//! # Example
//!
//! ```ignore
//! use hexwav_core::{BuildContext, ConversionHook, SystemRunner};
//!
//! let config = load_config(Path::new("hexwav.toml"))?;
//! let hook = ConversionHook::new(SystemRunner::new(), config.clone());
//!
//! let report = hook.on_demand(&BuildContext::from(&config.build)).await?;
//! std::process::exit(report.exit_code());
//! ```

mod error;
mod orchestrator;
mod types;

pub use error::HookError;
pub use orchestrator::ConversionHook;
pub use types::{
    select_image, ArtifactPaths, BuildContext, ConversionReport, HookPlan, HookState, StepRecord,
    Trigger, DEFAULT_PROG_NAME, EXIT_CONFIG_ERROR, EXIT_MISSING_OUTPUT, IMAGE_EXTENSION,
    WAV_EXTENSION,
};
