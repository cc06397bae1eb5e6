//! Sadhak clinic tool
//!
//! Inspects and maintains the clinic's document store. Every command prints
//! JSON on stdout; logs go to stderr.

use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use tracing::info;

use sadhak_clinic::{
    ClinicConfig, dashboard, delete_with_dependents, init_logging, patient_summary,
    seed_demo_data,
};
use sadhak_persistence::schema::{Collection, ID, Patient};
use sadhak_persistence::types::StoredDocument;
use sadhak_persistence::{DocumentAccess, StoreConnection};

#[derive(Debug, Parser)]
#[command(name = "sadhak")]
#[command(about = "Sadhak clinic data tool", version)]
struct Cli {
    #[command(flatten)]
    config: ClinicConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the store configuration and run the connection self-test.
    Check,
    /// Create the demo clinic data.
    Seed,
    /// Count the documents of a collection.
    Count { collection: Collection },
    /// List one page of a collection in id order.
    List {
        collection: Collection,
        /// Page size (defaults to SADHAK_DEFAULT_PAGE_SIZE).
        #[arg(long)]
        page_size: Option<usize>,
        /// Cursor returned by the previous page.
        #[arg(long)]
        cursor: Option<String>,
    },
    /// Show a patient with follow-ups, payments and totals.
    Patient { id: String },
    /// Show the dashboard figures.
    Dashboard,
    /// Delete a patient.
    DeletePatient {
        id: String,
        /// Also delete the patient's appointments, follow-ups and payments.
        #[arg(long)]
        cascade: bool,
    },
}

fn document_json(document: StoredDocument) -> Value {
    let mut fields = document.fields;
    fields.insert(ID.to_string(), Value::String(document.id));
    Value::Object(fields)
}

async fn check(config: &ClinicConfig, access: &DocumentAccess) -> Value {
    let summary = config.to_store_config().summary();
    match access.probe().await {
        Ok(report) => json!({ "config": summary, "connected": true, "probe": report }),
        Err(e) => json!({ "config": summary, "connected": false, "error": e.to_string() }),
    }
}

async fn run(command: Command, config: &ClinicConfig, access: &DocumentAccess) -> anyhow::Result<Value> {
    let output = match command {
        Command::Check => check(config, access).await,
        Command::Seed => serde_json::to_value(seed_demo_data(access).await?)?,
        Command::Count { collection } => {
            json!({ "collection": collection, "count": access.count_in(collection).await? })
        }
        Command::List {
            collection,
            page_size,
            cursor,
        } => {
            let page = access
                .paginate_documents(collection, config.page_size(page_size), cursor.as_deref())
                .await?;
            serde_json::to_value(page.map(document_json))?
        }
        Command::Patient { id } => match patient_summary(access, &id).await? {
            Some(summary) => serde_json::to_value(summary)?,
            None => anyhow::bail!("patient {} not found", id),
        },
        Command::Dashboard => serde_json::to_value(dashboard(access).await?)?,
        Command::DeletePatient { id, cascade } => {
            if cascade {
                serde_json::to_value(delete_with_dependents(access, &id).await?)?
            } else {
                access.delete::<Patient>(&id).await?;
                json!({ "deleted": id })
            }
        }
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.config.log_level);

    if let Err(errors) = cli.config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    let connection = StoreConnection::from_config(&cli.config.to_store_config())
        .map_err(|e| anyhow::anyhow!("Failed to open document store: {}", e))?;
    info!(connected = connection.is_connected(), "Starting Sadhak");

    let access = DocumentAccess::new(connection);
    let output = run(cli.command, &cli.config, &access).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        let cli = Cli::try_parse_from(["sadhak", "list", "followUps", "--page-size", "5"]).unwrap();
        match cli.command {
            Command::List {
                collection,
                page_size,
                cursor,
            } => {
                assert_eq!(collection, Collection::FollowUps);
                assert_eq!(page_size, Some(5));
                assert!(cursor.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_collection() {
        assert!(Cli::try_parse_from(["sadhak", "count", "invoices"]).is_err());
    }

    #[test]
    fn test_parse_delete_patient_cascade() {
        let cli = Cli::try_parse_from(["sadhak", "delete-patient", "p1", "--cascade"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::DeletePatient { cascade: true, .. }
        ));
    }

    #[test]
    fn test_document_json_includes_id() {
        let mut fields = sadhak_persistence::schema::FieldMap::new();
        fields.insert("name".to_string(), json!("Brahmi Oil"));
        let value = document_json(StoredDocument::new("m1", fields));
        assert_eq!(value, json!({ "id": "m1", "name": "Brahmi Oil" }));
    }
}
