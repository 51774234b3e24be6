//! The conversion run: resolve, convert, verify, optionally play.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::error::HookError;
use super::types::{
    select_image, ArtifactPaths, BuildContext, ConversionReport, HookPlan, HookState, StepRecord,
    Trigger,
};
use crate::command::{ensure_program_resolved, resolve_commands, CommandTemplate, QuoteStyle};
use crate::config::{OptionSource, ResolvedOptions};
use crate::platform::HostPlatform;
use crate::runner::{ArgumentVector, ProcessRunner};

const CONVERTER_STEP: &str = "converter";
const PLAYER_STEP: &str = "player";

/// Converts a firmware image into a WAV with an external tool and
/// optionally plays it.
///
/// Options are read from the injected `OptionSource` on every run, and the
/// host platform is only consulted when a default command is needed.
pub struct ConversionHook<R, S> {
    runner: R,
    options: S,
    host: HostPlatform,
    quote_style: QuoteStyle,
}

impl<R: ProcessRunner, S: OptionSource> ConversionHook<R, S> {
    pub fn new(runner: R, options: S) -> Self {
        Self {
            runner,
            options,
            host: HostPlatform::current(),
            quote_style: QuoteStyle::native(),
        }
    }

    /// Overrides the detected host (used to pick default tools).
    pub fn with_host(mut self, host: HostPlatform) -> Self {
        self.host = host;
        self
    }

    /// Overrides the quoting rules used to split command templates.
    pub fn with_quote_style(mut self, style: QuoteStyle) -> Self {
        self.quote_style = style;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Reads the options and resolves the converter and player templates.
    pub fn plan(&self) -> HookPlan {
        let options = ResolvedOptions::from_source(&self.options);
        let commands = resolve_commands(&options, &self.host);
        HookPlan { options, commands }
    }

    /// Runs one conversion for `paths`.
    ///
    /// Only configuration problems are returned as errors, and they are
    /// detected before anything is started. Tool failures are logged and
    /// recorded in the report.
    pub async fn run(
        &self,
        trigger: Trigger,
        paths: &ArtifactPaths,
    ) -> Result<ConversionReport, HookError> {
        let span = info_span!("hex2wav", trigger = trigger.label());
        self.run_steps(trigger, paths).instrument(span).await
    }

    /// Post-build entry point. Never fails: every problem is logged and the
    /// build carries on.
    pub async fn post_build(
        &self,
        targets: &[PathBuf],
        sources: &[PathBuf],
        prog_name: Option<&str>,
    ) -> Option<ConversionReport> {
        let result = match select_image(targets, sources) {
            Some(image) => {
                let paths = ArtifactPaths::from_image(&image, prog_name);
                self.run(Trigger::PostBuild, &paths).await
            }
            None => Err(HookError::NoImage),
        };

        match result {
            Ok(report) => Some(report),
            Err(e) => {
                error!("Skipping WAV conversion: {}", e);
                None
            }
        }
    }

    /// On-demand entry point. Always converts, whether or not the image was
    /// just rebuilt; paths come from the current build context.
    pub async fn on_demand(&self, ctx: &BuildContext) -> Result<ConversionReport, HookError> {
        let paths = ArtifactPaths::from_build(ctx);
        let result = self.run(Trigger::OnDemand, &paths).await;
        if let Err(ref e) = result {
            error!("WAV target aborted: {}", e);
        }
        result
    }

    async fn run_steps(
        &self,
        trigger: Trigger,
        paths: &ArtifactPaths,
    ) -> Result<ConversionReport, HookError> {
        let mut states = vec![HookState::Start];
        let plan = self.plan();
        debug!(
            "Converter: {:?}, player: {:?}, auto-play: {}",
            plan.commands.converter, plan.commands.player, plan.options.auto_play
        );

        // Both commands are built up front so a bad player template stops
        // the run before the converter starts.
        let converter_argv = self.prepare(CONVERTER_STEP, &plan.commands.converter, paths)?;
        let player_argv = if plan.options.auto_play {
            Some(self.prepare(PLAYER_STEP, &plan.commands.player, paths)?)
        } else {
            None
        };

        states.push(HookState::Converting);
        let converter_result = self.runner.run(&converter_argv).await;
        let output_exists = file_exists(&paths.output).await;

        let mut report = ConversionReport {
            trigger,
            paths: paths.clone(),
            plan,
            converter: StepRecord {
                argv: converter_argv,
                result: converter_result,
            },
            output_exists,
            player: None,
            states,
        };

        let code = report.converter.result.exit_code;
        if code != 0 || !output_exists {
            if trigger == Trigger::OnDemand && code != 0 {
                warn!("hex2wav failed with code {}", code);
            } else {
                warn!("Failed to create WAV at {}", paths.output.display());
            }
            report.states.push(HookState::ConvertFailed);
            report.states.push(HookState::Done);
            return Ok(report);
        }

        report.states.push(HookState::Converted);
        info!("WAV created: {}", paths.output.display());

        if let Some(argv) = player_argv {
            report.states.push(HookState::Playing);
            info!("Auto-playing WAV...");
            let result = self.runner.run(&argv).await;
            if !result.success() {
                warn!("Player exited with code {}", result.exit_code);
            }
            report.player = Some(StepRecord { argv, result });
        }

        report.states.push(HookState::Done);
        Ok(report)
    }

    fn prepare(
        &self,
        step: &'static str,
        template: &str,
        paths: &ArtifactPaths,
    ) -> Result<ArgumentVector, HookError> {
        let template = CommandTemplate::parse(template, self.quote_style)
            .map_err(|source| HookError::configuration(step, source))?;
        if !template.uses_output() {
            warn!("The {} command does not mention {{output}}: {}", step, template.as_str());
        }
        if step == CONVERTER_STEP && !template.uses_input() {
            warn!("The {} command does not mention {{input}}: {}", step, template.as_str());
        }

        template
            .expand(&paths.input, &paths.output)
            .and_then(|argv| ensure_program_resolved(&argv).map(|()| argv))
            .map_err(|source| HookError::configuration(step, source))
    }
}

async fn file_exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}
