//! Stored map listing.

use std::path::Path;

use crate::commands::open_store;
use crate::output::{OutputFormat, print_table};

/// Run the `list` command
pub fn run(path: &Path, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path)?;
    let tables = store.tables();

    match format {
        OutputFormat::Human => {
            if tables.is_empty() {
                println!("No maps found.");
                return Ok(());
            }

            let rows: Vec<Vec<String>> = tables
                .iter()
                .map(|(id, fields)| vec![id.to_string(), fields.to_string()])
                .collect();
            print_table(&["MAP ID", "FIELDS"], &rows);
        }
        OutputFormat::Json => {
            let entries: Vec<_> = tables
                .iter()
                .map(|(id, fields)| {
                    serde_json::json!({
                        "id": id.to_string(),
                        "fields": fields,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string(&entries)?);
        }
    }

    Ok(())
}
