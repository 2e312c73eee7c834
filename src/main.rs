use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sea_orm::DatabaseConnection;
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use coursepath::auth::AdminRole;
use coursepath::config::CatalogConfig;
use coursepath::database::{self, MigrateDirection};
use coursepath::pathway_graph::{render_forest, PathwayRules};
use coursepath::services::{AuditService, AuthorizationService, CatalogService, PathwayService};

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    /// YAML settings file
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,
    /// SQLite database path, or `:memory:`
    #[clap(short, long, global = true)]
    database: Option<String>,
    #[clap(long, global = true)]
    max_depth: Option<usize>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Db {
        #[clap(subcommand)]
        command: DbCommands,
    },
    Admin {
        #[clap(subcommand)]
        command: AdminCommands,
    },
    Pathway {
        #[clap(subcommand)]
        command: PathwayCommands,
    },
    /// Print every pathway tree, rooted at immersive courses
    Forest,
    /// Per entry point summary
    Overview,
    /// What deleting a course would affect
    Impact {
        #[clap(long)]
        course: i32,
    },
    /// Most recent audit records
    Audit {
        #[clap(long)]
        limit: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
enum DbCommands {
    Init,
    Migrate {
        #[clap(subcommand)]
        direction: MigrateDirection,
    },
}

#[derive(Subcommand, Debug)]
enum AdminCommands {
    /// Register an administrator without an acting user
    Add {
        #[clap(long)]
        username: String,
        #[clap(long)]
        email: String,
        #[clap(long, default_value = "admin")]
        role: String,
    },
}

#[derive(Subcommand, Debug)]
enum PathwayCommands {
    Link {
        #[clap(long = "as")]
        acting_user: String,
        #[clap(long)]
        from: i32,
        #[clap(long)]
        to: i32,
        #[clap(long, default_value = "1")]
        order: i32,
    },
    Unlink {
        #[clap(long = "as")]
        acting_user: String,
        #[clap(long)]
        id: i32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    let config = CatalogConfig::load_or_default(args.config.as_deref())?.with_overrides(
        args.database.clone(),
        args.log_level.clone(),
        args.max_depth,
    );
    config.validate()?;
    setup_logging(&config.log_level);

    match args.command {
        Commands::Db { command } => match command {
            DbCommands::Init => {
                info!("Initializing database: {}", config.database);
                database::migrate_database(&config.database, MigrateDirection::Up).await?;
            }
            DbCommands::Migrate { direction } => {
                info!("Running database migration: {:?}", direction);
                database::migrate_database(&config.database, direction).await?;
            }
        },
        Commands::Admin { command } => match command {
            AdminCommands::Add {
                username,
                email,
                role,
            } => {
                let role: AdminRole = role.parse()?;
                let db = connect(&config).await?;
                let user = AuthorizationService::new(db)
                    .register_admin(&username, &email, role, None)
                    .await?;
                println!("Registered {} as {}", user.username, user.role);
            }
        },
        Commands::Pathway { command } => {
            let db = connect(&config).await?;
            let actors = AuthorizationService::new(db.clone());
            let pathways = PathwayService::new(db)
                .with_rules(PathwayRules::new(config.max_pathway_depth));
            match command {
                PathwayCommands::Link {
                    acting_user,
                    from,
                    to,
                    order,
                } => {
                    let actor = actors.resolve_actor(&acting_user).await?;
                    let pathway = pathways.create_pathway(&actor, from, to, order).await?;
                    println!("Created pathway {}", pathway.id);
                }
                PathwayCommands::Unlink { acting_user, id } => {
                    let actor = actors.resolve_actor(&acting_user).await?;
                    pathways.delete_pathway(&actor, id).await?;
                    println!("Deleted pathway {}", id);
                }
            }
        }
        Commands::Forest => {
            let db = connect(&config).await?;
            let forest = CatalogService::new(db).pathway_forest().await?;
            print!("{}", render_forest(&forest));
        }
        Commands::Overview => {
            let db = connect(&config).await?;
            for entry in CatalogService::new(db).pathway_overview().await? {
                let types = entry
                    .course_types
                    .iter()
                    .map(|course_type| course_type.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                println!(
                    "{}: {} courses, {} next steps [{}]",
                    entry.immersive.name, entry.total_courses, entry.direct_next_steps, types
                );
            }
        }
        Commands::Impact { course } => {
            let db = connect(&config).await?;
            let impact = PathwayService::new(db).get_delete_impact(course).await?;
            println!("{}", serde_json::to_string_pretty(&impact)?);
        }
        Commands::Audit { limit } => {
            let db = connect(&config).await?;
            let records = AuditService::new(db)
                .recent(Some(limit.unwrap_or(config.audit_log_limit)))
                .await?;
            for record in records {
                println!(
                    "{} {} {} {} #{} {}",
                    record.created_at.format("%Y-%m-%d %H:%M:%S"),
                    record.admin_username,
                    record.action,
                    record.entity_type,
                    record.entity_id,
                    record.change_description.unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}

async fn connect(config: &CatalogConfig) -> Result<DatabaseConnection> {
    let database_url = database::get_database_url(Some(&config.database));
    let db = database::establish_connection(&database_url).await?;
    database::setup_database(&db).await?;
    Ok(db)
}

fn setup_logging(log_level: &str) {
    let log_level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sea_orm_migration=warn,{}", log_level)))
        .without_time()
        .init();
}
