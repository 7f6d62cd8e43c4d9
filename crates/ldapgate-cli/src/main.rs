//! Ldapgate - directory authentication gateway
//!
//! Operator tool for the per-tenant LDAP delegation settings, the request
//! gate and directory connection checks.

mod commands;

use clap::{Parser, Subcommand};
use ldapgate_core::{GatewayConfig, TenantId};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ldapgate")]
#[command(author = "Ldapgate Team")]
#[command(version = ldapgate_core::VERSION)]
#[command(about = "Directory authentication gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Settings database URL
    #[arg(long, global = true, env = "LDAPGATE_DATABASE_URL")]
    database_url: Option<String>,

    /// Plugin name the settings are stored under
    #[arg(long, global = true)]
    plugin: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "LDAPGATE_LOG_LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective value of a setting for a tenant
    Resolve {
        #[arg(short, long, default_value = "0")]
        tenant: TenantId,

        /// Setting name
        #[arg(short, long)]
        name: String,
    },

    /// Ask the gate whether a request would be intercepted
    Check {
        #[arg(short, long, default_value = "0")]
        tenant: TenantId,

        /// Requested page
        page: String,

        /// Requested operation within the page
        operation: String,
    },

    /// Enable directory authentication for a tenant
    Enable {
        #[arg(short, long, default_value = "0")]
        tenant: TenantId,
    },

    /// Disable directory authentication for a tenant
    Disable {
        #[arg(short, long, default_value = "0")]
        tenant: TenantId,
    },

    /// Show enablement and toggle rights for a tenant
    Status {
        #[arg(short, long, default_value = "0")]
        tenant: TenantId,
    },

    /// Open and negotiate a connection to a directory server
    Connect {
        /// Server URI, e.g. ldap://ldap.example.com:389
        server_uri: String,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = if let Some(config_path) = &cli.config {
        GatewayConfig::from_file(config_path)?
    } else {
        GatewayConfig::from_env()
    };

    // Override with CLI args
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    if let Some(plugin) = cli.plugin {
        config.ldap.plugin_name = plugin;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_logging(&config);
    config.validate()?;

    match cli.command {
        Commands::Version => {
            println!("ldapgate {}", ldapgate_core::VERSION);
        }
        Commands::Resolve { tenant, name } => {
            commands::resolve(&config, tenant, &name).await?;
        }
        Commands::Check {
            tenant,
            page,
            operation,
        } => {
            commands::check(&config, tenant, &page, &operation).await?;
        }
        Commands::Enable { tenant } => {
            commands::set_enabled(&config, tenant, true).await?;
        }
        Commands::Disable { tenant } => {
            commands::set_enabled(&config, tenant, false).await?;
        }
        Commands::Status { tenant } => {
            commands::status(&config, tenant).await?;
        }
        Commands::Connect { server_uri } => {
            info!("Negotiating connection to {}", server_uri);
            commands::connect(&config, &server_uri).await?;
        }
    }

    Ok(())
}

fn init_logging(config: &GatewayConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_arguments() {
        let cli = Cli::try_parse_from(["ldapgate", "check", "--tenant", "5", "login", "signIn"])
            .unwrap();

        match cli.command {
            Commands::Check {
                tenant,
                page,
                operation,
            } => {
                assert_eq!(tenant, TenantId::new(5));
                assert_eq!(page, "login");
                assert_eq!(operation, "signIn");
            }
            _ => panic!("expected check"),
        }
    }

    #[test]
    fn test_tenant_defaults_to_global() {
        let cli = Cli::try_parse_from(["ldapgate", "status"]).unwrap();
        assert!(matches!(cli.command, Commands::Status { tenant } if tenant.is_global()));
    }

    #[test]
    fn test_invalid_tenant_rejected() {
        assert!(Cli::try_parse_from(["ldapgate", "enable", "--tenant", "abc"]).is_err());
    }
}
