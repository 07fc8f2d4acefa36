//! Command execution

use std::io::{self, IsTerminal, Read};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::{build, ApplicationError, RenderModel, TreeDisplay};
use crate::cli::args::{BuildArgs, Cli, Commands, ConfigCommands, FormatArg, ModeArg, WeightArg};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, OutputFormat, Settings};
use crate::domain::{search_trace, BuildMode, BuildResult, NodeId};

/// Execute a CLI command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = load_settings(cli.config_dir.as_deref())?;

    match &cli.command {
        Some(Commands::Build { build, format }) => cmd_build(&settings, build, *format),
        Some(Commands::Search { value, tokens }) => cmd_search(&settings, value, tokens),
        Some(Commands::Hint { mode, weight }) => cmd_hint(&settings, *mode, *weight),
        Some(Commands::Config { command }) => cmd_config(&settings, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, run with --help for usage".to_string(),
        )),
    }
}

fn load_settings(config_dir: Option<&Path>) -> CliResult<Settings> {
    let settings = match config_dir {
        Some(dir) => Settings::load(Some(dir))?,
        None => {
            let cwd = std::env::current_dir().map_err(|e| CliError::Io {
                context: "get current directory".to_string(),
                source: e,
            })?;
            Settings::load(Some(&cwd))?
        }
    };
    debug!(?settings, "effective settings");
    Ok(settings)
}

/// Join token arguments, or read stdin when none were given.
fn read_input(tokens: &[String]) -> CliResult<String> {
    if !tokens.is_empty() {
        return Ok(tokens.join(" "));
    }
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }
    let mut input = String::new();
    stdin
        .lock()
        .read_to_string(&mut input)
        .map_err(|e| CliError::Io {
            context: "read tokens from stdin".to_string(),
            source: e,
        })?;
    Ok(input)
}

#[instrument(skip(settings))]
fn cmd_build(settings: &Settings, args: &BuildArgs, format: Option<FormatArg>) -> CliResult<()> {
    let mut options = settings.build_options();
    args.apply(&mut options);
    let format = format.map(OutputFormat::from).unwrap_or(settings.format);
    let input = read_input(&args.tokens)?;

    let result = match build(&input, &options) {
        Ok(result) => result,
        Err(e) if e.is_empty_state() => {
            output::warning(&e);
            output::detail(options.mode.input_hint(options.weighted));
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    for warning in &result.warnings {
        output::warning(warning);
    }
    match format {
        OutputFormat::Tree => output::info(&result.to_tree_string()),
        OutputFormat::Json => output::info(&RenderModel::from_result(&result).to_json()?),
    }
    Ok(())
}

#[instrument(skip(settings))]
fn cmd_search(settings: &Settings, value: &str, tokens: &[String]) -> CliResult<()> {
    if value.trim().is_empty() {
        return Err(CliError::InvalidArgs("search value must not be blank".to_string()));
    }
    let mut options = settings.build_options();
    options.mode = BuildMode::Bst;
    let input = read_input(tokens)?;

    let result = build(&input, &options)?;
    let trace = search_trace(&result, value);

    output::header(&format!("search {value}"));
    output::detail(&format!("path: {}", join_values(&result, &trace.visited)));
    match trace.found {
        Some(_) => output::success(&format!("found {value}")),
        None => output::failure(&format!("{value} not found")),
    }
    if !trace.dimmed.is_empty() {
        output::detail(&format!("skipped: {}", join_values(&result, &trace.dimmed)));
    }
    Ok(())
}

fn join_values(result: &BuildResult, ids: &[NodeId]) -> String {
    ids.iter().map(|&idx| result.value(idx)).join(" -> ")
}

fn cmd_hint(settings: &Settings, mode: Option<ModeArg>, weight: Option<WeightArg>) -> CliResult<()> {
    let mode = mode.map(BuildMode::from).unwrap_or(settings.mode);
    let weighted = weight
        .map(|w| w == WeightArg::Weighted)
        .unwrap_or(settings.weighted);
    output::header(&format!("{mode} input"));
    output::info(mode.input_hint(weighted));
    Ok(())
}

fn cmd_config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => {
                return Err(ApplicationError::Config {
                    message: "cannot determine config directory".to_string(),
                }
                .into())
            }
        },
    }
    Ok(())
}
