//! oxide-conv CLI
//!
//! Command-line tool for diffing, reflecting and checking MySQL schemas.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use oxide_conv::migration_header;
use oxide_conv::prelude::*;
use oxide_conv_core::factory::{AnySpecParser, DatabaseStructureFactory};

/// Schema-to-schema migrations for MySQL.
#[derive(Parser)]
#[command(name = "oxide-conv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// MySQL connection URL, needed by `mysql:` and `sql:` sources.
    #[arg(short, long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Scratch database created and dropped for `sql:` sources.
    #[arg(
        long,
        env = "CONV_SCRATCH_DATABASE",
        default_value = DEFAULT_SCRATCH_DATABASE,
        global = true
    )]
    scratch_database: String,

    /// Leave out tables whose name matches this regex (repeatable).
    #[arg(long = "ignore", value_name = "REGEX", global = true)]
    ignore: Vec<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the migration that turns one schema into another.
    Diff {
        /// Current schema (`mysql:<db>`, `spec:<dir>` or `sql:<dir>`).
        #[arg(long)]
        from: SchemaSource,

        /// Target schema.
        #[arg(long)]
        to: SchemaSource,

        /// Write the migration to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a schema out as spec files, one per table.
    Reflect {
        /// Schema to reflect.
        #[arg(long)]
        from: SchemaSource,

        /// Output directory.
        #[arg(short, long)]
        output: PathBuf,

        /// Spec file format.
        #[arg(long, value_enum, default_value_t = SpecFormat::Yaml)]
        format: SpecFormat,
    },

    /// Validate a spec directory.
    Check {
        /// Spec directory.
        dir: PathBuf,
    },
}

async fn connect(cli: &Cli, sources: &[&SchemaSource]) -> anyhow::Result<Option<MySqlCatalog>> {
    if !sources.iter().any(|s| s.requires_database()) {
        return Ok(None);
    }
    let Some(url) = &cli.database_url else {
        anyhow::bail!("--database-url (or DATABASE_URL) is required for mysql: and sql: sources");
    };
    Ok(Some(MySqlCatalog::connect(url).await?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let options = ConvOptions::new()
        .scratch_database(cli.scratch_database.clone())
        .ignore_patterns(&cli.ignore)?;

    match &cli.command {
        Commands::Diff { from, to, output } => {
            let mut catalog = connect(&cli, &[from, to]).await?;
            let mut progress = LogProgress::new("load");

            let before = from.load(catalog.as_mut(), &options, &mut progress).await?;
            let after = to.load(catalog.as_mut(), &options, &mut progress).await?;
            if let Some(catalog) = catalog {
                catalog.close().await?;
            }

            let migration = generate_migration(&before, &after);
            let mut sql = migration_header(from, to, chrono::Utc::now());
            if migration.is_empty() {
                info!("Schemas are identical.");
            } else {
                sql.push('\n');
                sql.push_str(&migration.to_sql());
            }

            match output {
                Some(path) => {
                    std::fs::write(path, sql)?;
                    info!(
                        statements = migration.len(),
                        "Migration written to {}",
                        path.display()
                    );
                }
                None => print!("{sql}"),
            }
        }

        Commands::Reflect {
            from,
            output,
            format,
        } => {
            let mut catalog = connect(&cli, &[from]).await?;
            let mut progress = LogProgress::new("reflect");

            let snapshot = from.load(catalog.as_mut(), &options, &mut progress).await?;
            if let Some(catalog) = catalog {
                catalog.close().await?;
            }
            if snapshot.is_empty() {
                warn!("{from} has no tables.");
            }

            let paths = SpecWriter::new(output, *format).write_database(&snapshot)?;
            info!("Wrote {} spec files to {}", paths.len(), output.display());
        }

        Commands::Check { dir } => {
            let snapshot =
                DatabaseStructureFactory::from_spec_dir(dir, &AnySpecParser, |t| options.accepts(t))?;
            for table in snapshot.tables.values() {
                let reference_missing = table
                    .references()
                    .into_iter()
                    .find(|r| snapshot.get_table(r).is_none());
                if let Some(reference) = reference_missing {
                    warn!(table = %table.name, reference = %reference, "references a table with no spec");
                }
            }
            info!("{}: {} tables OK", dir.display(), snapshot.len());
        }
    }

    Ok(())
}
