#![forbid(unsafe_code)]

mod cmd;
mod output;
mod roster;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::process;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "tm",
    author,
    version,
    about = "tablemates: fair rotating dinner groups",
    long_about = None
)]
struct Cli {
    /// Enable debug logging (overridden by `TABLEMATES_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of text.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Schedule groups for a roster.
    #[command(
        after_help = "EXAMPLES:\n    # Twelve weeks in groups of four\n    tm generate --roster members.txt\n\n\
                      # Continue from last term, reproducibly\n    \
                      tm generate --roster members.txt --history last.json --seed 7 --format json"
    )]
    Generate(cmd::generate::GenerateArgs),

    /// Verify scheduler invariants across many seeds.
    Check(cmd::check::CheckArgs),

    /// Print a shell completion script.
    Completions(CompletionsArgs),
}

/// Arguments for `tm completions`.
#[derive(Args, Debug)]
struct CompletionsArgs {
    /// Target shell for completion script generation.
    #[arg(value_enum)]
    shell: Shell,
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TABLEMATES_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "tablemates=debug,info"
        } else {
            "tablemates=info,warn"
        })
    });

    let format = env::var("TABLEMATES_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn run(cli: &Cli, output: OutputMode) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate(ref args) => {
            let project_root = env::current_dir()?;
            cmd::generate::run_generate(args, output, &project_root)
        }
        Commands::Check(ref args) => cmd::check::run_check(args, output),
        Commands::Completions(ref args) => {
            clap_complete::generate(args.shell, &mut Cli::command(), "tm", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(command = ?cli.command, "starting");

    let output = cli.output_mode();
    if let Err(err) = run(&cli, output) {
        if let Err(render_err) = render_error(output, &CliError::from(&err)) {
            eprintln!("error: {err:#} ({render_err})");
        }
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_flags_parse() {
        let cli = Cli::parse_from([
            "tm",
            "generate",
            "--roster",
            "members.txt",
            "--group-size",
            "3",
            "--weeks",
            "6",
            "--seed",
            "42",
        ]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.roster.as_deref(), Some(std::path::Path::new("members.txt")));
        assert_eq!(args.group_size, Some(3));
        assert_eq!(args.weeks, Some(6));
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.history, None);
    }

    #[test]
    fn format_flag_after_subcommand() {
        let cli = Cli::parse_from(["tm", "check", "--format", "json"]);
        assert_eq!(cli.format, Some(OutputMode::Json));
        assert_eq!(cli.output_mode(), OutputMode::Json);
    }

    #[test]
    fn json_flag_sets_output_mode() {
        let cli = Cli::parse_from(["tm", "--json", "check"]);
        assert!(cli.json);
        assert_eq!(cli.output_mode(), OutputMode::Json);
    }

    #[test]
    fn check_defaults() {
        let cli = Cli::parse_from(["tm", "check"]);
        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.seeds, 100);
        assert_eq!(args.seed_start, 0);
        assert_eq!(args.members, 18);
        assert_eq!(args.group_size, 4);
        assert_eq!(args.weeks, 12);
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["tm", "check", "-v"]);
        assert!(cli.verbose);
    }

    #[test]
    fn completions_takes_a_shell() {
        let cli = Cli::parse_from(["tm", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Commands::Completions(CompletionsArgs { shell: Shell::Bash })
        ));
    }
}
