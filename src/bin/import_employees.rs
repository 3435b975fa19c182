use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sqlx::postgres::PgPoolOptions;

use employee_directory::csv_import::parse_candidates;
use employee_directory::db::run_migrations;
use employee_directory::service::{BulkImporter, EmployeeService};
use employee_directory::store::PgEmployeeStore;

#[derive(Parser, Debug)]
#[command(
    name = "import_employees",
    about = "Import employees from a CSV file into the directory database"
)]
struct Args {
    /// CSV file with a header row naming name, email, phone, department and salary.
    #[arg(long)]
    file: PathBuf,

    /// Validate rows and report counts without writing anything.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    let file = File::open(&args.file).map_err(|err| {
        io::Error::new(
            err.kind(),
            format!("cannot open {}: {err}", args.file.display()),
        )
    })?;
    let candidates = parse_candidates(BufReader::new(file))?;

    if candidates.is_empty() {
        writeln!(io::stderr(), "error: no data rows found in {}", args.file.display())?;
        std::process::exit(1);
    }

    if args.dry_run {
        let preview = BulkImporter::preview(&candidates);
        println!(
            "{} rows would be attempted, {} would be skipped as invalid",
            preview.valid, preview.invalid
        );
        return Ok(());
    }

    let database_url = std::env::var("DATABASE_URL")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;
    run_migrations(&pool).await?;

    let service = EmployeeService::new(Arc::new(PgEmployeeStore::new(pool)));
    let summary = service.bulk_import(&candidates).await?;

    println!("Inserted {} employees, skipped {}", summary.inserted, summary.skipped);
    Ok(())
}
