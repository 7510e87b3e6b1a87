//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::builder::PossibleValuesParser;
use clap::{Args, Parser, Subcommand, ValueEnum};

use eduverza_core::resource::{DEPARTMENTS, RESOURCE_TYPES};

/// Browse and share college study resources.
///
/// EduVerza catalogs notes, previous papers and lab records by department,
/// year and semester. Data lives in a hosted table store configured with
/// `--url`/`--anon-key`, the environment, or the config file.
#[derive(Parser, Debug)]
#[command(name = "eduverza")]
#[command(author, version, about)]
pub struct Cli {
    /// Increase output verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Backend connection overrides shared by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Backend project URL (overrides environment and config file)
    #[arg(long, global = true, value_name = "URL")]
    pub url: Option<String>,

    /// Public anon API key (overrides environment and config file)
    #[arg(long, global = true, value_name = "KEY")]
    pub anon_key: Option<String>,

    /// Use a built-in sample catalog instead of a hosted backend
    #[arg(long, global = true, conflicts_with_all = ["url", "anon_key"])]
    pub demo: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show catalog statistics
    Home {
        /// Keep running and refresh the numbers on every change
        #[arg(long)]
        watch: bool,
    },

    /// List resources, optionally filtered
    Browse(BrowseArgs),

    /// Show the details of one resource
    Show {
        /// Resource identifier
        id: String,

        /// Keep running and re-render on every change to this resource
        #[arg(long)]
        watch: bool,
    },

    /// Download a resource (prints its document location)
    Download {
        /// Resource identifier
        id: String,
    },

    /// About EduVerza
    About,

    /// Administrative actions
    Admin {
        #[command(subcommand)]
        action: AdminCommand,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Args, Debug, Clone)]
pub struct BrowseArgs {
    /// Free-text search over title, subject and description
    #[arg(short, long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Department filter
    #[arg(short, long, default_value = "All", value_parser = PossibleValuesParser::new(DEPARTMENTS))]
    pub department: String,

    /// Academic year filter (1-4)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub year: Option<u8>,

    /// Semester filter; must belong to the selected year
    #[arg(long, requires = "year", value_parser = clap::value_parser!(u8).range(1..=8))]
    pub sem: Option<u8>,

    /// Subject filter; applies once year and semester are selected
    #[arg(long, requires = "sem")]
    pub subject: Option<String>,

    /// Resource type filter
    #[arg(short = 't', long = "type", default_value = "All", value_parser = PossibleValuesParser::new(RESOURCE_TYPES))]
    pub resource_type: String,

    /// Output layout
    #[arg(long, value_enum, default_value_t = ViewMode::Grid)]
    pub view: ViewMode,

    /// Keep running and re-render on every change
    #[arg(long)]
    pub watch: bool,
}

/// Browse output layout.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Full cards
    Grid,
    /// One line per resource
    List,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    /// Submit metadata for a new resource
    Upload(UploadArgs),
}

#[derive(Args, Debug, Clone)]
pub struct UploadArgs {
    /// Resource title
    #[arg(long)]
    pub title: String,

    /// Department
    #[arg(long)]
    pub department: String,

    /// Academic year (1-4)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub year: u8,

    /// Semester (1-8)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=8))]
    pub sem: u8,

    /// Subject
    #[arg(long)]
    pub subject: String,

    /// Resource type
    #[arg(long = "type")]
    pub resource_type: String,

    /// Optional description
    #[arg(long)]
    pub description: Option<String>,

    /// Document whose size is recorded (contents are not uploaded)
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_browse_defaults() {
        let cli = Cli::try_parse_from(["eduverza", "browse"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(!cli.quiet);
        let Command::Browse(args) = cli.command else {
            panic!("expected browse");
        };
        assert_eq!(args.department, "All");
        assert_eq!(args.resource_type, "All");
        assert_eq!(args.view, ViewMode::Grid);
        assert!(args.year.is_none());
        assert!(!args.watch);
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let cli = Cli::try_parse_from(["eduverza", "-vv", "about"]).unwrap();
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["eduverza", "about", "--verbose"]).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        let err = Cli::try_parse_from(["eduverza", "-q", "-v", "about"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_cli_browse_all_filters() {
        let cli = Cli::try_parse_from([
            "eduverza",
            "browse",
            "--search",
            "notes",
            "--department",
            "Computer Science",
            "--year",
            "2",
            "--sem",
            "3",
            "--subject",
            "Data Structures",
            "--type",
            "Notes",
            "--view",
            "list",
        ])
        .unwrap();
        let Command::Browse(args) = cli.command else {
            panic!("expected browse");
        };
        assert_eq!(args.search.as_deref(), Some("notes"));
        assert_eq!(args.department, "Computer Science");
        assert_eq!(args.year, Some(2));
        assert_eq!(args.sem, Some(3));
        assert_eq!(args.subject.as_deref(), Some("Data Structures"));
        assert_eq!(args.resource_type, "Notes");
        assert_eq!(args.view, ViewMode::List);
    }

    #[test]
    fn test_cli_browse_unknown_department_rejected() {
        let err = Cli::try_parse_from(["eduverza", "browse", "-d", "Biology"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_cli_browse_year_out_of_range_rejected() {
        let err = Cli::try_parse_from(["eduverza", "browse", "--year", "5"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_browse_sem_requires_year() {
        let err = Cli::try_parse_from(["eduverza", "browse", "--sem", "3"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_show_requires_id() {
        let err = Cli::try_parse_from(["eduverza", "show"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli = Cli::try_parse_from(["eduverza", "show", "42", "--watch"]).unwrap();
        assert!(matches!(cli.command, Command::Show { ref id, watch: true } if id == "42"));
    }

    #[test]
    fn test_cli_connection_flags_are_global() {
        let cli = Cli::try_parse_from([
            "eduverza",
            "home",
            "--url",
            "https://abc.supabase.co",
            "--anon-key",
            "key",
        ])
        .unwrap();
        assert_eq!(cli.connection.url.as_deref(), Some("https://abc.supabase.co"));
        assert_eq!(cli.connection.anon_key.as_deref(), Some("key"));
        assert!(!cli.connection.demo);
    }

    #[test]
    fn test_cli_demo_conflicts_with_url() {
        let err = Cli::try_parse_from(["eduverza", "--demo", "--url", "https://x.supabase.co", "home"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_cli_admin_upload_parses_fields() {
        let cli = Cli::try_parse_from([
            "eduverza",
            "admin",
            "upload",
            "--title",
            "Signals Notes",
            "--department",
            "Electronics",
            "--year",
            "2",
            "--sem",
            "4",
            "--subject",
            "Signals",
            "--type",
            "Notes",
        ])
        .unwrap();
        let Command::Admin {
            action: AdminCommand::Upload(args),
        } = cli.command
        else {
            panic!("expected admin upload");
        };
        assert_eq!(args.title, "Signals Notes");
        assert_eq!(args.sem, 4);
        assert!(args.file.is_none());
        assert!(args.description.is_none());
    }

    #[test]
    fn test_cli_admin_upload_missing_title_rejected() {
        let err = Cli::try_parse_from(["eduverza", "admin", "upload", "--year", "1"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let err = Cli::try_parse_from(["eduverza", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let err = Cli::try_parse_from(["eduverza", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["eduverza"]).is_err());
    }
}
