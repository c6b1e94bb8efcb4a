//! Show one stored map, field by field.

use std::path::Path;
use std::rc::Rc;

use idmap::{FrozenMap, ID, Identifiable, Store};

use crate::cli::ShowArgs;
use crate::commands::open_store;
use crate::output::{OutputFormat, print_table};

/// Run the `show` command
pub fn run(
    path: &Path,
    args: &ShowArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let id: ID = args.id.trim().parse()?;
    let store: Rc<dyn Store> = Rc::new(open_store(path)?);

    let Some(map) = FrozenMap::fetch(&id, &store)? else {
        return Err(format!("No map with id {id} in {}", path.display()).into());
    };

    let mut fields = Vec::with_capacity(map.len());
    for (name, entry) in map.entries() {
        let value = if args.eval {
            Some(entry.value()?.to_string())
        } else {
            None
        };
        fields.push((name.to_string(), entry.id(), value));
    }

    match format {
        OutputFormat::Human => {
            println!("Map: {id}");
            if fields.is_empty() {
                println!("No fields.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = fields
                .iter()
                .map(|(name, field_id, value)| {
                    let mut row = vec![name.clone(), field_id.to_string()];
                    if let Some(value) = value {
                        row.push(value.clone());
                    }
                    row
                })
                .collect();
            if args.eval {
                print_table(&["FIELD", "ID", "VALUE"], &rows);
            } else {
                print_table(&["FIELD", "ID"], &rows);
            }
        }
        OutputFormat::Json => {
            let entries: Vec<_> = fields
                .iter()
                .map(|(name, field_id, value)| {
                    let mut entry = serde_json::json!({
                        "name": name,
                        "id": field_id.to_string(),
                    });
                    if let Some(value) = value {
                        entry["value"] = serde_json::Value::String(value.clone());
                    }
                    entry
                })
                .collect();
            let value = serde_json::json!({
                "id": id.to_string(),
                "fields": entries,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}
