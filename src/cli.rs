use clap::{ArgAction, Parser};
use recrop_config::Overrides;
use recrop_database::PostType;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "recrop", version, about = "Rewrite references to missing image crops in CMS content")]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Report which posts would change, then roll back
    #[arg(long)]
    pub dry_run: bool,

    /// Rewrite the content of posts or pages ("post" or "page")
    #[arg(long)]
    pub post_type: Option<PostType>,

    /// More logging; repeat for even more (overridden by RUST_LOG)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Command-line values that take precedence over every config source.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            dry_run: self.dry_run.then_some(true),
            post_type: self.post_type,
        }
    }

    fn level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level()))
    }
}
