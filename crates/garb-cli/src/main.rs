#![forbid(unsafe_code)]

mod cmd;
mod output;
mod user;
mod validate;

use clap::{Parser, Subcommand};
use output::OutputMode;
use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "garb: digital wardrobe catalog with smart collections",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Act as this user (skips env/config resolution).
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags.
    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        }
    }

    /// Get the user flag as an `Option<&str>` for resolution.
    fn user_flag(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Initialize a catalog in the current directory",
        after_help = "EXAMPLES:\n    # Create a catalog here\n    gb init\n\n    # Record the default acting user\n    gb init --default-user ana"
    )]
    Init(cmd::init::InitArgs),

    #[command(
        about = "Manage garments",
        after_help = "EXAMPLES:\n    # Add a garment\n    gb garment add --name \"Linen Shirt\" --category Shirts\n\n    # List shirts in the laundry\n    gb garment list --category Shirts --status laundry"
    )]
    Garment {
        #[command(subcommand)]
        command: cmd::garment::GarmentCommand,
    },

    #[command(
        about = "Manage tags and garment tagging",
        after_help = "EXAMPLES:\n    # Create a tag and attach it\n    gb tag add summer\n    gb tag attach gm-0a1b2c3d summer"
    )]
    Tag {
        #[command(subcommand)]
        command: cmd::tag::TagCommand,
    },

    #[command(
        about = "Manage collections",
        after_help = "EXAMPLES:\n    # A smart collection of shirts\n    gb collection create Shirts --rule category:equals:Shirts\n\n    # A manual collection\n    gb collection create Favorites\n    gb collection add cl-0a1b2c3d gm-deadbeef"
    )]
    Collection {
        #[command(subcommand)]
        command: cmd::collection::CollectionCommand,
    },

    #[command(
        about = "Manage smart-collection rules",
        after_help = "EXAMPLES:\n    # Replace the rule set (refreshes automatically)\n    gb rule set cl-0a1b2c3d category:equals:Shirts tags:contains:summer\n\n    # What can rules query?\n    gb rule fields"
    )]
    Rule {
        #[command(subcommand)]
        command: cmd::rule::RuleCommand,
    },

    #[command(
        about = "Re-derive smart collection membership",
        after_help = "EXAMPLES:\n    # One collection\n    gb refresh cl-0a1b2c3d\n\n    # Every smart collection, isolating failures\n    gb refresh --all"
    )]
    Refresh(cmd::refresh::RefreshArgs),

    #[command(
        about = "Show aggregate wardrobe statistics",
        after_help = "EXAMPLES:\n    gb stats\n    gb stats --json"
    )]
    Stats(cmd::stats::StatsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("GARB_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "garb=debug,info"
        } else {
            "garb=info,warn"
        })
    });

    let format = env::var("GARB_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = std::env::current_dir()?;
    let output = cli.output_mode();
    let user_flag = cli.user_flag();

    match cli.command {
        Commands::Init(ref args) => cmd::init::run_init(args, user_flag, output, &project_root),
        Commands::Garment { ref command } => {
            cmd::garment::run(command, user_flag, output, &project_root)
        }
        Commands::Tag { ref command } => cmd::tag::run(command, user_flag, output, &project_root),
        Commands::Collection { ref command } => {
            cmd::collection::run(command, user_flag, output, &project_root)
        }
        Commands::Rule { ref command } => cmd::rule::run(command, user_flag, output, &project_root),
        Commands::Refresh(ref args) => cmd::refresh::run(args, user_flag, output, &project_root),
        Commands::Stats(ref args) => cmd::stats::run(args, user_flag, output, &project_root),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_sets_output_mode() {
        let cli = Cli::parse_from(["gb", "--json", "stats"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["gb", "stats", "--json"]);
        assert!(cli.json);
        assert!(cli.output_mode().is_json());
    }

    #[test]
    fn default_output_is_human() {
        let cli = Cli::parse_from(["gb", "stats"]);
        assert!(!cli.json);
        assert!(!cli.output_mode().is_json());
    }

    #[test]
    fn user_flag_parsed_globally() {
        let cli = Cli::parse_from(["gb", "--user", "ana", "garment", "list"]);
        assert_eq!(cli.user_flag(), Some("ana"));

        let cli = Cli::parse_from(["gb", "garment", "list", "--user", "ana"]);
        assert_eq!(cli.user_flag(), Some("ana"));
    }

    #[test]
    fn all_subcommands_parse() {
        let subcommands = [
            vec!["gb", "init"],
            vec!["gb", "garment", "add", "--name", "x", "--category", "y"],
            vec!["gb", "garment", "list"],
            vec!["gb", "garment", "show", "gm-0a1b2c3d"],
            vec!["gb", "garment", "update", "gm-0a1b2c3d", "--status", "laundry"],
            vec!["gb", "garment", "rm", "gm-0a1b2c3d"],
            vec!["gb", "tag", "add", "summer"],
            vec!["gb", "tag", "list"],
            vec!["gb", "tag", "attach", "gm-0a1b2c3d", "summer"],
            vec!["gb", "tag", "detach", "gm-0a1b2c3d", "summer"],
            vec!["gb", "collection", "create", "Shirts"],
            vec!["gb", "collection", "list"],
            vec!["gb", "collection", "show", "cl-0a1b2c3d"],
            vec!["gb", "collection", "add", "cl-0a1b2c3d", "gm-deadbeef"],
            vec!["gb", "rule", "set", "cl-0a1b2c3d", "category:equals:Shirts"],
            vec!["gb", "rule", "list", "cl-0a1b2c3d"],
            vec!["gb", "rule", "clear", "cl-0a1b2c3d"],
            vec!["gb", "rule", "fields"],
            vec!["gb", "refresh", "cl-0a1b2c3d"],
            vec!["gb", "refresh", "--all"],
            vec!["gb", "stats"],
        ];
        for args in &subcommands {
            let result = Cli::try_parse_from(args.iter());
            assert!(
                result.is_ok(),
                "Failed to parse: {:?} — error: {:?}",
                args,
                result.err()
            );
        }
    }
}
