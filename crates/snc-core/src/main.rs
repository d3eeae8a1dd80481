//! SNC Core - stochastic network calculus bounds from the command line
//!
//! The main entry point for snc-core, handling:
//! - Bound evaluation for scenario files
//! - Strategy comparison on the built-in demo scenarios
//! - Analysis configuration inspection and validation

use clap::{Args, Parser, Subcommand};
use snc_common::{format_error_human, OutputFormat, StructuredError};
use snc_config::{
    load_analysis_config, validate_scenario, LoadedConfig, OptMethod, PresetName, ScenarioSpec,
    ValidationError, CONFIG_SCHEMA_VERSION,
};
use snc_core::analysis::{analyze, demo_scenarios, AnalysisReport};
use snc_core::exit_codes::ExitCode;
use snc_core::log_event;
use snc_core::logging::{
    event_names, generate_run_id, init_logging, LogConfig, LogContext, LogFormat, Stage,
};
use std::io::IsTerminal;
use std::path::PathBuf;
use thiserror::Error;

/// SNC Core - Tail bounds for queueing networks via stochastic network calculus
#[derive(Parser)]
#[command(name = "snc-core")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Analysis configuration file (JSON or TOML)
    #[arg(long, global = true, env = "SNC_CONFIG")]
    config: Option<PathBuf>,

    /// Built-in analysis preset (quick, standard, thorough)
    #[arg(long, global = true)]
    preset: Option<PresetName>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr (human or jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the tightest bound for a scenario file
    Bound(BoundArgs),

    /// Compare strategies on the two built-in scenarios
    Demo(DemoArgs),

    /// Configuration management
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
struct BoundArgs {
    /// Scenario file (JSON or TOML)
    #[arg(long)]
    scenario: PathBuf,

    /// Optimization method; repeat to compare several (default: from config)
    #[arg(long = "method", short = 'm')]
    methods: Vec<OptMethod>,

    /// Also optimize one Lyapunov parameter next to theta
    #[arg(long)]
    lyapunov: bool,
}

#[derive(Args, Debug)]
struct DemoArgs {
    /// Optimization method; repeat to compare several (default: from config)
    #[arg(long = "method", short = 'm')]
    methods: Vec<OptMethod>,

    /// Also optimize one Lyapunov parameter next to theta
    #[arg(long)]
    lyapunov: bool,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the resolved analysis configuration
    Show,

    /// Validate the analysis configuration and, optionally, a scenario file
    Validate {
        /// Scenario file to validate as well
        #[arg(long)]
        scenario: Option<PathBuf>,
    },
}

/// Failures surfaced to the user.
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Snc(#[from] snc_common::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to serialize output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Snc(e) => ExitCode::for_error(e),
            CliError::Validation(ValidationError::IoError(_)) => ExitCode::IoError,
            CliError::Validation(_) => ExitCode::ConfigError,
            CliError::Output(_) => ExitCode::InternalError,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_config =
        LogConfig::from_env(cli.global.verbose, cli.global.quiet, cli.global.log_format);
    init_logging(&log_config);

    let ctx = LogContext::new(generate_run_id());
    log_event!(ctx, DEBUG, event_names::RUN_STARTED, Stage::Init, "snc-core started");

    let result = match &cli.command {
        Commands::Bound(args) => run_bound(&cli.global, &ctx, args),
        Commands::Demo(args) => run_demo(&cli.global, &ctx, args),
        Commands::Config(args) => match &args.command {
            ConfigCommands::Show => run_config_show(&cli.global),
            ConfigCommands::Validate { scenario } => {
                run_config_validate(&cli.global, scenario.as_deref())
            }
        },
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => output_error(&cli.global, &ctx, &e),
    };
    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_FINISHED,
        Stage::Report,
        "snc-core finished",
        exit_code = exit_code.as_i32() as i64
    );
    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Commands
// ============================================================================

fn load_config(global: &GlobalOpts, ctx: &LogContext) -> Result<LoadedConfig, CliError> {
    let loaded = load_analysis_config(global.config.as_deref(), global.preset)?;
    log_event!(
        ctx,
        DEBUG,
        event_names::CONFIG_LOADED,
        Stage::Init,
        "analysis configuration loaded",
        source = loaded.source.to_string().as_str()
    );
    Ok(loaded)
}

/// Apply `--method` and `--lyapunov` on top of the loaded configuration.
fn effective_methods(
    loaded: &mut LoadedConfig,
    methods: &[OptMethod],
    lyapunov: bool,
) -> Vec<OptMethod> {
    if lyapunov {
        loaded.config.number_l = 1;
    }
    if methods.is_empty() {
        loaded.config.methods.clone()
    } else {
        methods.to_vec()
    }
}

fn run_bound(
    global: &GlobalOpts,
    ctx: &LogContext,
    args: &BoundArgs,
) -> Result<ExitCode, CliError> {
    let scenario = ScenarioSpec::from_file(&args.scenario)?;
    validate_scenario(&scenario)?;
    let mut loaded = load_config(global, ctx)?;
    let methods = effective_methods(&mut loaded, &args.methods, args.lyapunov);

    let report = analyze(&scenario, &methods, &loaded.config, ctx)?;
    print_reports(global, ctx, std::slice::from_ref(&report))?;
    Ok(outcome_code(std::slice::from_ref(&report)))
}

fn run_demo(global: &GlobalOpts, ctx: &LogContext, args: &DemoArgs) -> Result<ExitCode, CliError> {
    let mut loaded = load_config(global, ctx)?;
    let methods = effective_methods(&mut loaded, &args.methods, args.lyapunov);

    let reports = demo_scenarios()?
        .iter()
        .map(|scenario| analyze(scenario, &methods, &loaded.config, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    print_reports(global, ctx, &reports)?;
    Ok(outcome_code(&reports))
}

fn outcome_code(reports: &[AnalysisReport]) -> ExitCode {
    if reports.iter().all(AnalysisReport::has_guarantee) {
        ExitCode::Ok
    } else {
        ExitCode::NoGuarantee
    }
}

fn print_reports(
    global: &GlobalOpts,
    ctx: &LogContext,
    reports: &[AnalysisReport],
) -> Result<(), CliError> {
    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": CONFIG_SCHEMA_VERSION,
                "run_id": ctx.run_id,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "reports": reports,
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Summary => {
            for report in reports {
                for line in report.summary_lines() {
                    println!("[{}] {}", ctx.run_id, line);
                }
            }
        }
    }
    Ok(())
}

fn run_config_show(global: &GlobalOpts) -> Result<ExitCode, CliError> {
    let loaded = load_analysis_config(global.config.as_deref(), global.preset)?;
    let path = loaded.path.as_ref().map(|p| p.display().to_string());

    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": CONFIG_SCHEMA_VERSION,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "source": loaded.source.to_string(),
                "path": path,
                "config": &loaded.config,
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Summary => {
            println!(
                "# source: {} ({})",
                loaded.source,
                path.as_deref().unwrap_or("no file")
            );
            let text = toml::to_string_pretty(&loaded.config)
                .map_err(|e| snc_common::Error::Config(e.to_string()))?;
            print!("{text}");
        }
    }
    Ok(ExitCode::Ok)
}

fn run_config_validate(
    global: &GlobalOpts,
    scenario: Option<&std::path::Path>,
) -> Result<ExitCode, CliError> {
    let loaded = load_analysis_config(global.config.as_deref(), global.preset)?;
    let scenario_label = match scenario {
        Some(path) => {
            let spec = ScenarioSpec::from_file(path)?;
            validate_scenario(&spec)?;
            Some(spec.label())
        }
        None => None,
    };

    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": CONFIG_SCHEMA_VERSION,
                "status": "valid",
                "source": loaded.source.to_string(),
                "path": loaded.path.as_ref().map(|p| p.display().to_string()),
                "scenario": scenario_label,
            });
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Summary => {
            println!("config validate: OK ({})", loaded.source);
            if let Some(label) = scenario_label {
                println!("scenario validate: OK ({label})");
            }
        }
    }
    Ok(ExitCode::Ok)
}

// ============================================================================
// Error output
// ============================================================================

/// Report an error on stderr and pick the exit code.
fn output_error(global: &GlobalOpts, ctx: &LogContext, error: &CliError) -> ExitCode {
    let exit_code = error.exit_code();
    log_event!(
        ctx,
        DEBUG,
        event_names::RUN_FAILED,
        Stage::Report,
        "command failed",
        exit_code = exit_code.as_i32() as i64
    );

    match global.format {
        OutputFormat::Json => {
            let error_json = match error {
                CliError::Snc(e) => serde_json::to_value(StructuredError::from(e)).ok(),
                CliError::Validation(e) => Some(serde_json::json!({
                    "code": e.code(),
                    "category": "config",
                    "message": e.to_string(),
                })),
                CliError::Output(e) => Some(serde_json::json!({
                    "code": exit_code.as_i32(),
                    "category": "io",
                    "message": e.to_string(),
                })),
            };
            let response = serde_json::json!({
                "schema_version": CONFIG_SCHEMA_VERSION,
                "run_id": ctx.run_id,
                "status": "error",
                "exit_code": exit_code.code_name(),
                "error": error_json,
            });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&response).unwrap_or_else(|_| error.to_string())
            );
        }
        OutputFormat::Summary => match error {
            CliError::Snc(e) => {
                eprintln!("{}", format_error_human(e, std::io::stderr().is_terminal()))
            }
            other => eprintln!("error: {other}"),
        },
    }

    exit_code
}
