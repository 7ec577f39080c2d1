use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use relgate_validate::{verify, Classifier};
use relgate_vcs_git::GitRepo;

mod config;
mod doctor;
mod report;

use config::Config;
use report::Reporter;

/// Exit status for anything that is not a verdict (bad refs, git failures, config).
const EXIT_ERROR: u8 = 2;

#[derive(Parser)]
#[command(name = "relgate", version, about = "Gate a release branch on its three-commit structure")]
struct Cli {
    /// Repository root (defaults to the work tree containing the current directory)
    #[arg(long, global = true)]
    repo: Option<PathBuf>,

    /// Config file (defaults to .relgate/relgate.toml under the repo root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter (env-filter syntax); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    #[command(flatten)]
    refs: RefArgs,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Verify the commits on head against base (default)
    Verify,

    /// Check that git runs and both refs resolve
    Doctor,

    /// Write the default config file if none exists
    Init,
}

#[derive(Args)]
struct RefArgs {
    /// Base branch the release branch is compared against
    #[arg(long, global = true)]
    base: Option<String>,

    /// Release branch tip
    #[arg(long, global = true)]
    head: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            println!("[ERROR] {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let repo_root = match cli.repo {
        Some(p) => p,
        None => discover_root(std::env::current_dir()?),
    };
    let refs = cli.refs;

    match cli.cmd.unwrap_or(Command::Verify) {
        Command::Init => {
            let (path, created) = Config::init(&repo_root)?;
            if created {
                println!("Wrote {}", path.display());
            } else {
                println!("{} already exists", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Doctor => {
            let cfg = Config::load(&repo_root, cli.config.as_deref())?;
            let (base, head) = refs.resolve(&cfg);
            let git = GitRepo::new(&repo_root).with_program(cfg.git_program());
            let report = doctor::doctor(&git, &base, &head)?;
            println!("{}", report.git_version);
            println!("base {} -> {}", base, report.base);
            println!("head {} -> {}", head, report.head);
            println!("OK");
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify => {
            let cfg = Config::load(&repo_root, cli.config.as_deref())?;
            let (base, head) = refs.resolve(&cfg);
            let git = GitRepo::new(&repo_root).with_program(cfg.git_program());
            let classifier = Classifier::release(&cfg.slots);
            tracing::info!(%base, %head, repo = %repo_root.display(), "verifying release branch");

            let mut reporter = Reporter::new(std::io::stdout());
            reporter.header(&base, &head);
            match verify(&git, &classifier, &base, &head, &mut reporter) {
                Ok(result) => {
                    let signal = reporter.finish(&result)?;
                    Ok(ExitCode::from(signal.code()))
                }
                Err(e) => {
                    reporter.error(&e)?;
                    Ok(ExitCode::from(EXIT_ERROR))
                }
            }
        }
    }
}

/// Top of the work tree containing `cwd`, or `cwd` itself outside a repository.
fn discover_root(cwd: PathBuf) -> PathBuf {
    match GitRepo::new(&cwd).toplevel() {
        Ok(root) => root,
        Err(e) => {
            tracing::debug!(error = %e, cwd = %cwd.display(), "no enclosing work tree");
            cwd
        }
    }
}

impl RefArgs {
    /// Flags win over the config file.
    fn resolve(self, cfg: &Config) -> (String, String) {
        (
            self.base.unwrap_or_else(|| cfg.refs.base.clone()),
            self.head.unwrap_or_else(|| cfg.refs.head.clone()),
        )
    }
}
