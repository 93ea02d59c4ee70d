use anyhow::Result;
use clap::Parser;
use rgi::application::InstallOptions;
use rgi::commands::{EXIT_FAILURE, InstallCommand, install};
use rgi::source::Domain;
use rgi::version::Requirement;
use std::path::PathBuf;
use std::process::ExitCode;

/// rgi - gem resolver and installer
///
/// Resolve gems against the current directory and any number of remote
/// sources, then install them into a local store.
///
/// If the RGI_TOKEN environment variable is set, it is sent as a bearer token
/// to every remote source.
///
/// Examples:
///   rgi install rake              # Install the latest release of rake
///   rgi install rake -v '~> 13.0' # Install a version matching a constraint
#[derive(Parser, Debug)]
#[command(author, version = env!("RGI_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Store root directory (overrides defaults; also via RGI_ROOT)
    #[arg(
        long = "root",
        short = 'r',
        env = "RGI_ROOT",
        value_name = "PATH",
        global = true
    )]
    pub root: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Install gems and their dependencies
    Install(InstallArgs),
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    /// Names of the gems to install
    #[arg(value_name = "GEMNAME")]
    pub names: Vec<String>,

    /// Version constraint for a single gem (e.g. "2.a", ">= 1, < 2")
    #[arg(short = 'v', long = "version", value_name = "REQUIREMENT")]
    pub version: Option<Requirement>,

    /// Allow prerelease versions
    #[arg(long)]
    pub pre: bool,

    /// Resolve against the current directory only
    #[arg(long, conflicts_with_all = ["remote", "both"])]
    pub local: bool,

    /// Resolve against remote sources only
    #[arg(long, conflicts_with = "both")]
    pub remote: bool,

    /// Resolve against local and remote sources (default)
    #[arg(long)]
    pub both: bool,

    /// Skip gems an installed version already satisfies
    #[arg(long)]
    pub conservative: bool,

    /// Do not install dependencies
    #[arg(long)]
    pub ignore_dependencies: bool,

    /// Install into this directory instead of the store root
    #[arg(short = 'i', long = "install-dir", value_name = "PATH")]
    pub install_dir: Option<PathBuf>,

    /// Install into ~/.rgi
    #[arg(long)]
    pub user_install: bool,

    /// Remote source URL, repeatable (also via RGI_SOURCES, comma separated)
    #[arg(short = 's', long = "source", value_name = "URL")]
    pub sources: Vec<String>,

    /// Do not write documentation for installed gems
    #[arg(long)]
    pub no_document: bool,
}

impl InstallArgs {
    fn domain(&self) -> Domain {
        if self.local {
            Domain::Local
        } else if self.remote {
            Domain::Remote
        } else {
            Domain::Both
        }
    }

    fn into_command(self, root: Option<PathBuf>) -> InstallCommand {
        let options = InstallOptions {
            domain: self.domain(),
            prerelease: self.pre,
            version: self.version,
            conservative: self.conservative,
            ignore_dependencies: self.ignore_dependencies,
            install_dir: self.install_dir,
            user_install: self.user_install,
        };
        InstallCommand {
            names: self.names,
            options,
            root,
            sources: self.sources,
            document: !self.no_document,
        }
    }
}

async fn run(cli: Cli) -> Result<u8> {
    let runtime = rgi::runtime::RealRuntime;
    match cli.command {
        Commands::Install(args) => install(runtime, args.into_command(cli.root)).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("ERROR:  {:#}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
