//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use pdt_core::{CollectionName, ModRecord};

/// ProjectDaedalus Database Tool - manage the Icarus ProjectDaedalus database
#[derive(Parser, Debug)]
#[command(name = "pdt")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.pdtconfig.json, ~/.pdtconfig.toml)
    #[arg(long, global = true, env = "PDT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log output (-v warnings, -vv info, -vvv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Show what would be written without writing anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Replace existing entries instead of rejecting duplicates
    #[arg(long, global = true)]
    pub force: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Add entries to the database
    Add {
        #[command(subcommand)]
        target: AddTarget,
    },

    /// Delete entries from the database
    #[command(alias = "rm")]
    Del {
        #[command(subcommand)]
        target: DelTarget,
    },

    /// List the entries of a collection
    ///
    /// Examples:
    ///   pdt list repos
    ///   pdt list mods --json
    #[command(alias = "ls")]
    List {
        /// Collection to list
        target: ListTarget,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reload every modinfo document into the mods collection
    Sync,
}

/// What `add` operates on
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum AddTarget {
    /// Add repository URLs
    #[command(alias = "repos")]
    Repo {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Add modinfo URLs and load the mods they list
    Modinfo {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Add toolinfo URLs
    Toolinfo {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Add or update a single mod
    Mod(ModArgs),
}

/// What `del` operates on
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum DelTarget {
    /// Remove repository URLs
    #[command(alias = "repos")]
    Repo {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Remove modinfo URLs
    Modinfo {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Remove toolinfo URLs
    Toolinfo {
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Remove a mod by name and author
    Mod {
        #[arg(long)]
        name: String,

        #[arg(long)]
        author: String,
    },
}

/// Fields of a mod record
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ModArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub author: String,

    #[arg(long, default_value = "")]
    pub version: String,

    /// Game build the mod works with (e.g. w57)
    #[arg(long, default_value = "")]
    pub compatibility: String,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long)]
    pub image_url: Option<String>,

    #[arg(long)]
    pub readme_url: Option<String>,

    /// Download URL of the .pak file
    #[arg(long)]
    pub pak: Option<String>,

    /// Download URL of the .exmodz file
    #[arg(long)]
    pub exmodz: Option<String>,
}

impl ModArgs {
    pub fn into_record(self) -> ModRecord {
        let mut record = ModRecord::new(self.name, self.author)
            .with_version(self.version)
            .with_compatibility(self.compatibility)
            .with_description(self.description);
        if let Some(url) = self.image_url {
            record = record.with_image_url(url);
        }
        if let Some(url) = self.readme_url {
            record = record.with_readme_url(url);
        }
        if let Some(url) = self.pak {
            record = record.with_pak(url);
        }
        if let Some(url) = self.exmodz {
            record = record.with_exmodz(url);
        }
        record
    }
}

/// Collections `list` can show
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTarget {
    #[value(aliases = ["repo", "repositories"])]
    Repos,
    Modinfo,
    Toolinfo,
    #[value(alias = "mod")]
    Mods,
}

impl From<ListTarget> for CollectionName {
    fn from(target: ListTarget) -> Self {
        match target {
            ListTarget::Repos => CollectionName::Repositories,
            ListTarget::Modinfo => CollectionName::ModInfo,
            ListTarget::Toolinfo => CollectionName::ToolInfo,
            ListTarget::Mods => CollectionName::Mods,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_the_command() {
        let cli = Cli::try_parse_from(["pdt", "add", "repo", "https://a.test", "-vv", "--force"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.force);
        assert_eq!(
            cli.command,
            Commands::Add {
                target: AddTarget::Repo {
                    urls: vec!["https://a.test".to_string()]
                }
            }
        );
    }

    #[test]
    fn add_requires_at_least_one_url() {
        assert!(Cli::try_parse_from(["pdt", "add", "toolinfo"]).is_err());
    }

    #[test]
    fn list_accepts_aliases() {
        let cli = Cli::try_parse_from(["pdt", "ls", "repositories", "--json"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::List {
                target: ListTarget::Repos,
                json: true
            }
        );
    }

    #[test]
    fn mod_args_build_a_record() {
        let cli = Cli::try_parse_from([
            "pdt", "add", "mod", "--name", "Foo", "--author", "Bar", "--version", "1.0", "--pak",
            "https://x.test/foo.pak",
        ])
        .unwrap();
        let Commands::Add {
            target: AddTarget::Mod(args),
        } = cli.command
        else {
            panic!("expected add mod");
        };

        let record = args.into_record();
        assert_eq!(record.to_string(), "Foo v1.0 by Bar");
        assert_eq!(record.files.pak.as_deref(), Some("https://x.test/foo.pak"));
        assert_eq!(record.image_url, None);
    }

    #[test]
    fn del_mod_needs_name_and_author() {
        assert!(Cli::try_parse_from(["pdt", "del", "mod", "--name", "Foo"]).is_err());
        let cli = Cli::try_parse_from(["pdt", "del", "mod", "--name", "Foo", "--author", "Bar"]).unwrap();
        assert!(matches!(cli.command, Commands::Del { target: DelTarget::Mod { .. } }));
    }
}
