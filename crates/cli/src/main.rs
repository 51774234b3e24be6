use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hexwav_core::{
    load_config, load_config_from_env, validate_config, BuildContext, Config, ConversionHook,
    ConversionReport, SystemRunner, EXIT_CONFIG_ERROR,
};

/// Config file looked up in the working directory when none is given.
const DEFAULT_CONFIG_FILE: &str = "hexwav.toml";

#[derive(Parser, Debug)]
#[command(name = "hexwav")]
#[command(version, about = "Turn firmware images into audio-bootloader WAV files", long_about = None)]
struct Cli {
    /// Project configuration file (defaults to ./hexwav.toml when present)
    #[arg(long, env = "HEXWAV_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert the image a build just produced. Never fails the build.
    PostBuild {
        /// Build targets; the first one is used when it is a .hex image
        targets: Vec<PathBuf>,

        /// Build sources, used when no target is a .hex image
        #[arg(long = "source")]
        sources: Vec<PathBuf>,

        /// Program name for the WAV file (defaults to the configured one)
        #[arg(long)]
        prog_name: Option<String>,

        /// Print the conversion report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert <build-dir>/<prog-name>.hex on demand and exit with the
    /// converter's status
    Wav {
        /// Build directory (defaults to the configured one)
        #[arg(long)]
        build_dir: Option<PathBuf>,

        /// Program name (defaults to the configured one)
        #[arg(long)]
        prog_name: Option<String>,

        /// Print the conversion report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the converter and player commands that would be used
    Resolve {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    let code = match run(cli, &mut std::io::stdout()).await {
        Ok(code) => code,
        Err(e) => {
            error!("Fatal error: {:#}", e);
            1
        }
    };
    std::process::exit(code);
}

fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so --json reports stay parseable on stdout.
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

/// Runs one command and returns the process exit status. Reports are
/// written to `out`.
async fn run<W: Write>(cli: Cli, out: &mut W) -> Result<i32> {
    match cli.command {
        Commands::PostBuild {
            targets,
            sources,
            prog_name,
            json,
        } => {
            let config = match load_project_config(cli.config.as_deref()) {
                Ok(config) => config,
                Err(e) => {
                    error!("Skipping WAV conversion: {:#}", e);
                    return Ok(0);
                }
            };

            let prog_name = prog_name.unwrap_or_else(|| config.build.prog_name.clone());
            let hook = ConversionHook::new(runner_for(&config), config);
            if let Some(report) = hook
                .post_build(&targets, &sources, Some(prog_name.as_str()))
                .await
            {
                if json {
                    if let Err(e) = write_report(out, &report) {
                        error!("Could not print the conversion report: {:#}", e);
                    }
                }
            }
            Ok(0)
        }

        Commands::Wav {
            build_dir,
            prog_name,
            json,
        } => {
            let config = match load_project_config(cli.config.as_deref()) {
                Ok(config) => config,
                Err(e) => {
                    error!("WAV target aborted: {:#}", e);
                    return Ok(EXIT_CONFIG_ERROR);
                }
            };

            let ctx = BuildContext::new(
                build_dir.unwrap_or_else(|| config.build.build_dir.clone()),
                Some(prog_name.unwrap_or_else(|| config.build.prog_name.clone())),
            );
            let hook = ConversionHook::new(runner_for(&config), config);
            match hook.on_demand(&ctx).await {
                Ok(report) => {
                    if json {
                        if let Err(e) = write_report(out, &report) {
                            error!("Could not print the conversion report: {:#}", e);
                        }
                    }
                    Ok(report.exit_code())
                }
                Err(_) => Ok(EXIT_CONFIG_ERROR),
            }
        }

        Commands::Resolve { json } => {
            let config = load_project_config(cli.config.as_deref())?;
            let plan = ConversionHook::new(SystemRunner::new(), config).plan();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&plan)?)?;
            } else {
                writeln!(out, "converter: {}", plan.commands.converter)?;
                writeln!(out, "player:    {}", plan.commands.player)?;
                writeln!(out, "auto-play: {}", plan.options.auto_play)?;
            }
            Ok(0)
        }
    }
}

/// Loads and validates the project configuration.
///
/// An explicit path must exist. Without one, `./hexwav.toml` is used when
/// present, otherwise defaults plus `HEXWAV_*` environment overrides.
fn load_project_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                info!("Loading configuration from {:?}", default_path);
                load_config(default_path)
                    .with_context(|| format!("Failed to load config from {:?}", default_path))?
            } else {
                load_config_from_env().context("Failed to load config from environment")?
            }
        }
    };

    validate_config(&config).context("Configuration validation failed")?;
    Ok(config)
}

fn runner_for(config: &Config) -> SystemRunner {
    match &config.build.project_dir {
        Some(dir) => SystemRunner::new().with_working_dir(dir.clone()),
        None => SystemRunner::new(),
    }
}

fn write_report<W: Write>(out: &mut W, report: &ConversionReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    writeln!(out, "{}", json).context("Failed to write report")?;
    out.flush().context("Failed to write report")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_post_build() {
        let cli = Cli::try_parse_from([
            "hexwav",
            "post-build",
            ".pio/build/attiny85/firmware.hex",
            "--source",
            ".pio/build/attiny85/firmware.elf",
            "--prog-name",
            "blink",
        ])
        .unwrap();

        match cli.command {
            Commands::PostBuild {
                targets,
                sources,
                prog_name,
                json,
            } => {
                assert_eq!(targets, vec![PathBuf::from(".pio/build/attiny85/firmware.hex")]);
                assert_eq!(sources, vec![PathBuf::from(".pio/build/attiny85/firmware.elf")]);
                assert_eq!(prog_name.as_deref(), Some("blink"));
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_wav_with_global_flags() {
        let cli = Cli::try_parse_from([
            "hexwav",
            "wav",
            "--build-dir",
            "out",
            "--json",
            "--log-format",
            "json",
            "--config",
            "project.toml",
        ])
        .unwrap();

        assert_eq!(cli.log_format, LogFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("project.toml")));
        match cli.command {
            Commands::Wav {
                build_dir,
                prog_name,
                json,
            } => {
                assert_eq!(build_dir, Some(PathBuf::from("out")));
                assert!(prog_name.is_none());
                assert!(json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_requires_subcommand() {
        assert!(Cli::try_parse_from(["hexwav"]).is_err());
    }

    #[test]
    fn test_explicit_missing_config_is_an_error() {
        let result = load_project_config(Some(Path::new("/nonexistent/hexwav.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_explicit_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[build]
build_dir = "out"
prog_name = "blink"
project_dir = "/tmp"

[options]
custom_hex2wav_auto_play = true
"#
        )
        .unwrap();

        let config = load_project_config(Some(file.path())).unwrap();
        assert_eq!(config.build.build_dir, PathBuf::from("out"));
        assert_eq!(config.build.prog_name, "blink");

        let runner = runner_for(&config);
        assert_eq!(runner.working_dir(), Some(Path::new("/tmp")));
    }

    #[test]
    fn test_blank_prog_name_fails_validation() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[build]\nprog_name = \"  \"").unwrap();
        assert!(load_project_config(Some(file.path())).is_err());
    }

    /// A project dir with `build/firmware.hex` and a config using `converter`.
    struct Project {
        dir: tempfile::TempDir,
    }

    impl Project {
        fn new(converter: &str) -> Self {
            let dir = tempfile::TempDir::new().unwrap();
            let build_dir = dir.path().join("build");
            std::fs::create_dir_all(&build_dir).unwrap();
            std::fs::write(build_dir.join("firmware.hex"), ":00000001FF\n").unwrap();
            std::fs::write(
                dir.path().join("hexwav.toml"),
                format!(
                    "[build]\nbuild_dir = '{}'\n\n[options]\nhex2wav_cmd = \"{}\"\n",
                    build_dir.display(),
                    converter
                ),
            )
            .unwrap();
            Self { dir }
        }

        fn config(&self) -> PathBuf {
            self.dir.path().join("hexwav.toml")
        }

        fn image(&self) -> PathBuf {
            self.dir.path().join("build/firmware.hex")
        }

        fn wav(&self) -> PathBuf {
            self.dir.path().join("build/firmware.wav")
        }

        fn cli(&self, args: &[&str]) -> Cli {
            let config = self.config();
            let mut argv = vec!["hexwav", "--config", config.to_str().unwrap()];
            argv.extend_from_slice(args);
            Cli::try_parse_from(argv).unwrap()
        }
    }

    /// Writer whose every write fails, like a closed stdout.
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_post_build_converter_failure_exits_zero() {
        let project = Project::new("sh -c 'exit 3'");
        let image = project.image();
        let cli = project.cli(&["post-build", image.to_str().unwrap()]);

        let code = run(cli, &mut Vec::new()).await.unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_post_build_config_error_exits_zero() {
        let cli = Cli::try_parse_from([
            "hexwav",
            "--config",
            "/nonexistent/hexwav.toml",
            "post-build",
            "firmware.hex",
        ])
        .unwrap();

        let code = run(cli, &mut Vec::new()).await.unwrap();
        assert_eq!(code, 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_post_build_json_report_is_written() {
        let project = Project::new("sh -c 'exit 3'");
        let image = project.image();
        let cli = project.cli(&["post-build", image.to_str().unwrap(), "--json"]);

        let mut out = Vec::new();
        let code = run(cli, &mut out).await.unwrap();

        assert_eq!(code, 0);
        let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(report["trigger"], "post_build");
        assert_eq!(report["converter"]["result"]["exit_code"], 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_post_build_unserializable_report_exits_zero() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let project = Project::new("sh -c 'exit 3'");
        let config = project.config();
        // Paths that are not UTF-8 cannot be written as JSON strings.
        let image = project
            .dir
            .path()
            .join(OsStr::from_bytes(b"p\xffdir/firmware.hex"));
        let cli = Cli::try_parse_from([
            OsStr::new("hexwav"),
            OsStr::new("--config"),
            config.as_os_str(),
            OsStr::new("post-build"),
            image.as_os_str(),
            OsStr::new("--json"),
        ])
        .unwrap();

        let mut out = Vec::new();
        let code = run(cli, &mut out).await.unwrap();

        assert_eq!(code, 0);
        assert!(out.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_post_build_closed_stdout_exits_zero() {
        let project = Project::new("sh -c 'exit 3'");
        let image = project.image();
        let cli = project.cli(&["post-build", image.to_str().unwrap(), "--json"]);

        let code = run(cli, &mut ClosedPipe).await.unwrap();
        assert_eq!(code, 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_wav_passes_converter_code_through() {
        let project = Project::new("sh -c 'exit 3'");
        let cli = project.cli(&["wav"]);

        let code = run(cli, &mut Vec::new()).await.unwrap();
        assert_eq!(code, 3);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_wav_success_creates_wav() {
        let project = Project::new("cp {input} {output}");
        let cli = project.cli(&["wav"]);

        let code = run(cli, &mut Vec::new()).await.unwrap();
        assert_eq!(code, 0);
        assert!(project.wav().exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_wav_closed_stdout_keeps_converter_code() {
        let project = Project::new("sh -c 'exit 3'");
        let cli = project.cli(&["wav", "--json"]);

        let code = run(cli, &mut ClosedPipe).await.unwrap();
        assert_eq!(code, 3);
    }

    #[tokio::test]
    async fn test_wav_bad_template_is_a_config_error() {
        let project = Project::new(r#"cp \"{input}"#);
        let cli = project.cli(&["wav"]);

        let code = run(cli, &mut Vec::new()).await.unwrap();
        assert_eq!(code, EXIT_CONFIG_ERROR);
    }

    #[tokio::test]
    async fn test_wav_missing_config_is_a_config_error() {
        let cli = Cli::try_parse_from([
            "hexwav",
            "--config",
            "/nonexistent/hexwav.toml",
            "wav",
        ])
        .unwrap();

        let code = run(cli, &mut Vec::new()).await.unwrap();
        assert_eq!(code, EXIT_CONFIG_ERROR);
    }

    #[tokio::test]
    async fn test_resolve_writes_commands() {
        let project = Project::new("cp {input} {output}");
        let cli = project.cli(&["resolve"]);

        let mut out = Vec::new();
        let code = run(cli, &mut out).await.unwrap();

        assert_eq!(code, 0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("converter: cp {input} {output}"));
        assert!(text.contains("auto-play: false"));
    }
}
