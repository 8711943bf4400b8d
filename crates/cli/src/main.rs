mod changes;
mod config;
mod config_cmd;
mod init_cmd;
mod run_cmd;
mod template;
mod update;
mod validate;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "difflens",
    version,
    about = "Screenshot the UI affected by your code changes, through a coding agent"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Project directory
    #[arg(long, global = true, default_value = ".")]
    dir: String,

    /// Dump raw events and classification decisions to stderr
    #[arg(long, global = true)]
    debug: bool,

    /// Branch or ref to diff against (default: uncommitted changes)
    #[arg(long)]
    branch: Option<String>,

    /// Print the changed files and capture prompt without starting a session
    #[arg(long)]
    dry_run: bool,

    /// Report files filtered out of change detection
    #[arg(short, long)]
    verbose: bool,

    /// Skip the weekly version check
    #[arg(long)]
    skip_update_check: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the project and generate DIFFLENS.md
    Init {
        /// Regenerate without asking, even if DIFFLENS.md exists
        #[arg(long)]
        force: bool,
    },

    /// Manage credentials and defaults interactively
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Some(Commands::Init { force }) => {
            init_cmd::run_init(init_cmd::InitOptions {
                dir: cli.dir,
                force,
                debug: cli.debug,
            })
            .await
        }
        Some(Commands::Config) => config_cmd::run_config(),
        None => {
            run_cmd::run(run_cmd::RunOptions {
                dir: cli.dir,
                branch: cli.branch,
                dry_run: cli.dry_run,
                verbose: cli.verbose,
                debug: cli.debug,
                skip_update_check: cli.skip_update_check,
            })
            .await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so the transcript owns stdout. `--debug` raises our
/// crates to debug; RUST_LOG still overrides everything.
fn init_tracing(debug: bool) {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());
    if debug {
        for directive in [
            "difflens=debug",
            "difflens_stream=debug",
            "difflens_transcript=debug",
        ] {
            filter = filter.add_directive(directive.parse().expect("static directive"));
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
