use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use commands::{config, import, parse, setup_db, RunContext};
use std::path::PathBuf;
use watchlog_config::{IdStrategy, PathManager};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "watchlog")]
#[command(about = "watchlog - Load the movie-night watch log into the movies table")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Key-value file holding POSTGRES_URL and TMDB_API_KEY (default: .env.local)
    #[arg(long, global = true, value_name = "FILE")]
    env_file: Option<PathBuf>,

    /// Config file (default: config.toml in the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write logs to a daily-rotated file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Write logs to watchlog.log under the platform config directory
    #[arg(long, global = true, conflicts_with = "log_file")]
    log_to_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the watch log, look up each movie on TMDB and insert the rows
    #[command(long_about = "Run the full import: parse the watch log, look up each title on TMDB (one request at a time) and insert one row per entry, each in its own transaction. Without --input the bundled watch log is imported.")]
    Import {
        /// Watch log to import instead of the bundled one
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Parse and enrich, then print the rows instead of writing them
        #[arg(long, action = ArgAction::SetTrue)]
        dry_run: bool,

        /// Do not query TMDB; every row gets a null id and release year 0
        #[arg(long, action = ArgAction::SetTrue)]
        skip_lookup: bool,

        /// Row id scheme (overrides [import].id_strategy from the config file)
        #[arg(long, value_enum)]
        id_strategy: Option<IdStrategyArg>,
    },
    /// Parse the watch log and print the entries without touching TMDB or the database
    Parse {
        /// Watch log to parse instead of the bundled one
        #[arg(long, value_name = "FILE")]
        input: Option<PathBuf>,
    },
    /// Create the movies table if it does not exist
    SetupDb,
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show resolved configuration (masks secrets)
    Show {
        /// Print secrets unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum IdStrategyArg {
    /// import-<unix seconds>-<5 random hex>
    Timestamped,
    /// import-<year>-<month>-<title slug>, re-imports skip existing rows
    Content,
}

impl From<IdStrategyArg> for IdStrategy {
    fn from(arg: IdStrategyArg) -> Self {
        match arg {
            IdStrategyArg::Timestamped => IdStrategy::Timestamped,
            IdStrategyArg::Content => IdStrategy::Content,
        }
    }
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = logging::resolve_log_file(cli.log_file.clone(), cli.log_to_file, &PathManager::default());
    logging::init_logging(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);
    let ctx = RunContext {
        env_file: cli.env_file,
        config_file: cli.config,
    };

    match cli.command {
        Commands::Import {
            input,
            dry_run,
            skip_lookup,
            id_strategy,
        } => {
            let args = import::ImportArgs {
                input,
                dry_run,
                skip_lookup,
                id_strategy: id_strategy.map(IdStrategy::from),
            };
            import::run_import(&ctx, args, &output).await
        }
        Commands::Parse { input } => parse::run_parse(&ctx, input, &output),
        Commands::SetupDb => setup_db::run_setup_db(&ctx, &output).await,
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show { full } => config::show_config(&ctx, full, &output),
        },
    }
}
