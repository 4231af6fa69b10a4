pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "shortline")]
#[command(about = "Browse and manage a short-video feed", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/shortline/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and forget the session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show the shorts feed
    Feed {
        /// Only shorts tagged with this hashtag
        #[arg(long)]
        hashtag: Option<String>,
        /// Only shorts from this channel id
        #[arg(long)]
        channel: Option<String>,
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: usize,
    },
    /// Toggle a short in your favorites
    Favorite {
        /// YouTube video id of the short
        video_id: String,
    },
    /// List subscribed channel ids
    Subscriptions,
    /// Toggle a channel subscription
    Subscribe {
        channel_id: String,
    },
    /// List categories
    Categories {
        #[arg(long)]
        search: Option<String>,
    },
    /// List channels
    Channels {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// List hashtags
    Hashtags {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Manage content (admins only)
    Admin {
        #[arg(value_enum)]
        resource: AdminResource,
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AdminResource {
    Shorts,
    Categories,
    Channels,
    Hashtags,
}

impl AdminResource {
    /// Route guarding this resource's admin page.
    pub fn route_name(self) -> &'static str {
        match self {
            AdminResource::Shorts => "admin-shorts",
            AdminResource::Categories => "admin-categories",
            AdminResource::Channels => "admin-channels",
            AdminResource::Hashtags => "admin-hashtags",
        }
    }
}

#[derive(Subcommand)]
pub enum AdminAction {
    /// Create a record from a JSON object
    Create {
        #[arg(long)]
        json: String,
    },
    /// Replace a record's fields from a JSON object
    Update {
        id: i64,
        #[arg(long)]
        json: String,
    },
    /// Delete a record
    Delete { id: i64 },
}

impl Commands {
    /// Route a command is checked against before it runs, if any.
    pub fn route_name(&self) -> Option<&'static str> {
        match self {
            Commands::Login { .. } => Some("login"),
            Commands::Register { .. } => Some("register"),
            Commands::Logout | Commands::Whoami => None,
            Commands::Feed { .. } => Some("home"),
            Commands::Favorite { .. } | Commands::Subscriptions | Commands::Subscribe { .. } => {
                Some("favorites")
            }
            Commands::Categories { .. } => Some("categories"),
            Commands::Channels { .. } | Commands::Hashtags { .. } => Some("home"),
            Commands::Admin { resource, .. } => Some(resource.route_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_admin_command() {
        let cli = Cli::parse_from([
            "shortline",
            "admin",
            "hashtags",
            "update",
            "4",
            "--json",
            r#"{"name":"lofi"}"#,
        ]);
        match cli.command {
            Commands::Admin {
                resource,
                action: AdminAction::Update { id, json },
            } => {
                assert_eq!(resource, AdminResource::Hashtags);
                assert_eq!(id, 4);
                assert_eq!(json, r#"{"name":"lofi"}"#);
            }
            _ => panic!("expected admin update"),
        }
    }

    #[test]
    fn test_every_guarded_command_has_a_route() {
        let commands = [
            Commands::Feed {
                hashtag: None,
                channel: None,
                pages: 1,
            },
            Commands::Subscriptions,
            Commands::Categories { search: None },
            Commands::Admin {
                resource: AdminResource::Shorts,
                action: AdminAction::Delete { id: 1 },
            },
        ];
        for command in commands {
            let name = command.route_name().unwrap();
            assert!(router::find(name).is_some(), "missing route {name}");
        }
        for resource in [
            AdminResource::Shorts,
            AdminResource::Categories,
            AdminResource::Channels,
            AdminResource::Hashtags,
        ] {
            assert!(router::find(resource.route_name()).unwrap().requires_admin);
        }
    }
}
