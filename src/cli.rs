use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use jiff::civil::Date;

use crate::commands::{
    CommandContext, LsOptions, cmd_config_get, cmd_config_set, cmd_config_show, cmd_create,
    cmd_ls, cmd_resources, cmd_rm, cmd_set, cmd_show, cmd_update,
};
use crate::gateway::ListFilters;

#[derive(Parser)]
#[command(name = "projectdesk")]
#[command(about = "List, edit and manage project and finance records")]
#[command(version)]
pub struct Cli {
    /// Serve records from a JSON fixture file instead of the API
    #[arg(long, global = true, value_name = "FILE")]
    pub fixture: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the resources that can be managed
    Resources {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List records of a resource, one page at a time
    #[command(visible_alias = "l")]
    Ls {
        /// Resource name (projects, invoices, man-power, ...)
        resource: String,

        /// Case-insensitive search across every field
        #[arg(short, long)]
        search: Option<String>,

        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,

        /// Rows per page (default from display.page_size)
        #[arg(long)]
        page_size: Option<usize>,

        /// Year sent to the backend
        #[arg(long)]
        year: Option<i32>,

        /// Month (1-12) sent to the backend
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
        month: Option<u8>,

        /// Range selector sent to the backend (e.g. monthly, yearly, custom)
        #[arg(long)]
        range_type: Option<String>,

        /// Start date (YYYY-MM-DD) sent to the backend
        #[arg(long)]
        from: Option<Date>,

        /// End date (YYYY-MM-DD) sent to the backend
        #[arg(long)]
        to: Option<Date>,

        /// Only rows where field equals value (repeatable)
        #[arg(short = 'w', long = "where", value_name = "FIELD=VALUE")]
        wheres: Vec<String>,

        /// Hide a column (repeatable)
        #[arg(long, value_name = "COLUMN")]
        hide: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Display a single record
    #[command(visible_alias = "s")]
    Show {
        resource: String,

        /// Record id; composite ids are written as a/b
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change one field of a record after confirmation
    Set {
        resource: String,

        /// Record id; composite ids are written as a/b
        id: String,

        /// Column key to change
        field: String,

        /// New value (JSON if it parses, otherwise text)
        value: String,

        /// Confirm without prompting
        #[arg(short, long)]
        yes: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a record from field=value pairs
    #[command(visible_alias = "c")]
    Create {
        resource: String,

        /// Field assignments, e.g. name="Tower A" contract_value=1500000
        #[arg(required = true, value_name = "FIELD=VALUE")]
        fields: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update several fields of a record
    Update {
        resource: String,

        /// Record id; composite ids are written as a/b
        id: String,

        /// Field assignments
        #[arg(required = true, value_name = "FIELD=VALUE")]
        fields: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a record
    Rm {
        resource: String,

        /// Record id; composite ids are written as a/b
        id: String,

        /// Delete without prompting
        #[arg(short, long)]
        force: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for [possible values: bash, zsh, fish, powershell, elvish]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set a configuration value
    Set {
        /// Configuration key (api.base_url, api.token, display.page_size, display.timezone, display.currency_symbol)
        key: String,
        /// Value to set
        value: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Execute the command, dispatching to the appropriate handler.
    pub async fn run(self) -> crate::error::Result<()> {
        let fixture = self.fixture;
        match self.command {
            Commands::Resources { json } => cmd_resources(json),

            Commands::Ls {
                resource,
                search,
                page,
                page_size,
                year,
                month,
                range_type,
                from,
                to,
                wheres,
                hide,
                json,
            } => {
                let ctx = CommandContext::load(fixture)?;
                let options = LsOptions {
                    resource,
                    search,
                    page,
                    page_size,
                    remote: ListFilters {
                        year,
                        range_type,
                        month,
                        from,
                        to,
                        ..ListFilters::default()
                    },
                    wheres,
                    hide,
                    json,
                };
                cmd_ls(&ctx, options).await
            }

            Commands::Show { resource, id, json } => {
                let ctx = CommandContext::load(fixture)?;
                cmd_show(&ctx, &resource, &id, json).await
            }

            Commands::Set {
                resource,
                id,
                field,
                value,
                yes,
                json,
            } => {
                let ctx = CommandContext::load(fixture)?;
                cmd_set(&ctx, &resource, &id, &field, &value, yes, json).await
            }

            Commands::Create {
                resource,
                fields,
                json,
            } => {
                let ctx = CommandContext::load(fixture)?;
                cmd_create(&ctx, &resource, &fields, json).await
            }

            Commands::Update {
                resource,
                id,
                fields,
                json,
            } => {
                let ctx = CommandContext::load(fixture)?;
                cmd_update(&ctx, &resource, &id, &fields, json).await
            }

            Commands::Rm {
                resource,
                id,
                force,
                json,
            } => {
                let ctx = CommandContext::load(fixture)?;
                cmd_rm(&ctx, &resource, &id, force, json).await
            }

            Commands::Config { action } => match action {
                ConfigAction::Show { json } => cmd_config_show(json),
                ConfigAction::Set { key, value, json } => cmd_config_set(&key, &value, json),
                ConfigAction::Get { key, json } => cmd_config_get(&key, json),
            },

            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "projectdesk", &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ls_with_remote_filters() {
        let cli = Cli::try_parse_from([
            "projectdesk",
            "ls",
            "invoices",
            "--year",
            "2024",
            "--from",
            "2024-01-01",
            "--where",
            "status=A",
            "--where",
            "paid=1",
            "--page",
            "2",
        ])
        .unwrap();
        match cli.command {
            Commands::Ls {
                year,
                from,
                wheres,
                page,
                ..
            } => {
                assert_eq!(year, Some(2024));
                assert_eq!(from, Some(jiff::civil::date(2024, 1, 1)));
                assert_eq!(wheres, vec!["status=A", "paid=1"]);
                assert_eq!(page, 2);
            }
            _ => panic!("expected ls"),
        }
    }

    #[test]
    fn test_month_out_of_range_is_rejected() {
        assert!(Cli::try_parse_from(["projectdesk", "ls", "projects", "--month", "13"]).is_err());
    }

    #[test]
    fn test_fixture_is_global() {
        let cli = Cli::try_parse_from(["projectdesk", "show", "users", "3", "--fixture", "desk.json"])
            .unwrap();
        assert_eq!(cli.fixture, Some(PathBuf::from("desk.json")));
    }
}
