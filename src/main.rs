use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use cmg_help::config::{self, Config};
use cmg_help::format;

#[derive(Parser, Debug)]
#[command(
    name = "cmg-help",
    version,
    about = "Look up CMG simulator keyword documentation",
    long_about = "A command-line tool for looking up GEM/IMEX/STARS keyword documentation \
        from a local CMG installation.\n\n\
        Keywords are resolved through CMGKeywords.json (default: ~/CMGKeywords.json), \
        preferring the configured solver and falling back to the others.\n\n\
        Examples:\n  \
        cmg-help --root-prefix /opt/cmg --cmg-version 2023.10 --solver IMEX lookup '*PERMI *ALL'\n  \
        cmg-help doc PERMI --format markdown\n  \
        cmg-help keywords 'PERM*'\n  \
        cmg-help versions\n  \
        cmg-help lsp"
)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    #[arg(
        long,
        global = true,
        default_value = "json",
        help = "Output format",
        long_help = "Output format.\n  json     — JSON (default, best for programmatic use)\n  markdown — Human-readable markdown"
    )]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct SettingsArgs {
    #[arg(long, global = true, env = config::ENV_ROOT_PREFIX, help = "CMG installation root")]
    root_prefix: Option<String>,

    #[arg(
        long = "cmg-version",
        global = true,
        env = config::ENV_VERSION,
        help = "Installed version directory (e.g. 2023.10)"
    )]
    version: Option<String>,

    #[arg(long, global = true, env = config::ENV_SOLVER, help = "Preferred solver: GEM, IMEX or STARS")]
    solver: Option<String>,

    #[arg(long, global = true, env = config::ENV_KEYWORD_DATA, help = "Path to CMGKeywords.json")]
    keyword_data: Option<String>,
}

impl From<SettingsArgs> for Config {
    fn from(args: SettingsArgs) -> Self {
        Config {
            root_prefix: args.root_prefix,
            version: args.version,
            solver: args.solver,
            keyword_data_path: args.keyword_data,
            ..Default::default()
        }
    }
}

#[derive(ValueEnum, Clone, Debug)]
enum OutputFormat {
    Json,
    Markdown,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the keyword a deck line starts with (exit code 0 = found, 1 = not found)
    #[command(long_about = "Resolve the keyword a deck line starts with.\n\n\
        Leading blanks and asterisks are ignored; only the first token of the\n\
        line is considered. A bare keyword in any case also works:\n  \
        cmg-help lookup '*PERMI *ALL 100.0'\n  \
        cmg-help lookup permi")]
    Lookup {
        /// Deck line or keyword
        text: String,
    },

    /// Show the manual page for a keyword or page link
    #[command(long_about = "Show the manual page for a keyword or page link.\n\n\
        The page is looked up under the configured version directory and,\n\
        if missing, under every other version in the dictionary. Links printed\n\
        in a rendered page (file:// URIs) can be passed back in to follow them.\n\n\
        Examples:\n  \
        cmg-help doc PERMI\n  \
        cmg-help doc 'imex/permi_1.htm#units'")]
    Doc {
        /// Keyword or page path relative to the version directory
        target: String,
    },

    /// List dictionary versions and the one in use
    Versions,

    /// List keywords of the merged table
    Keywords {
        /// Glob pattern (e.g. "PERM*", "*-OIL")
        pattern: Option<String>,

        #[arg(long, short, default_value = "200", help = "Maximum number of results")]
        limit: usize,
    },

    /// Start the Language Server Protocol server (stdio)
    Lsp,
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_env("CMGHELP_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Handle SIGPIPE gracefully (prevents broken pipe panics when piped through head/less)
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    let cli = Cli::parse();

    // stdout carries the LSP transport, so logs always go to stderr
    init_logging(if matches!(cli.command, Command::Lsp) { "info" } else { "warn" });

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::from(cli.settings);

    match cli.command {
        Command::Lookup { text } => {
            let result = cmg_help::lookup(&config, &text)?;
            let found = result.found;
            print_output(&cli.format, &result, format::lookup)?;
            Ok(if found {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }

        Command::Doc { target } => {
            let result = cmg_help::documentation(&config, &target)?;
            print_output(&cli.format, &result, format::doc)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Versions => {
            let result = cmg_help::list_versions(&config)?;
            print_output(&cli.format, &result, format::versions)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Keywords { pattern, limit } => {
            let result = cmg_help::list_keywords(&config, pattern.as_deref(), limit)?;
            print_output(&cli.format, &result, format::keywords)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Lsp => {
            cmg_help::lsp::serve_stdio(config).await;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Print output in the requested format
fn print_output<T: serde::Serialize>(
    fmt: &OutputFormat,
    value: &T,
    markdown_fn: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    match fmt {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Markdown => {
            print!("{}", markdown_fn(value));
        }
    }
    Ok(())
}
