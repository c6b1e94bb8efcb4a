//! Store info command - shows the file, map and value counts.

use std::path::Path;

use crate::commands::open_store;
use crate::output::OutputFormat;

/// Run the info command
pub fn run(path: &Path, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(path)?;

    let items = store.len();
    let maps = store.tables().len();
    let values = items - maps;

    match format {
        OutputFormat::Human => {
            println!("Store:    {}", path.display());
            println!("Items:    {items}");
            println!("Maps:     {maps}");
            println!("Values:   {values}");
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "store": path.display().to_string(),
                "items": items,
                "maps": maps,
                "values": values,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}
