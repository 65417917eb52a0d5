use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::cli::CollectionsArgs;
use crate::config::Config;

/// Collection name, journal count and journals, umbrella last
pub fn collection_rows(config: &Config) -> Vec<(String, usize, String)> {
    config
        .collection_names()
        .into_iter()
        .map(|name| {
            let journals = config.journals(&name).unwrap_or_default();
            (name, journals.len(), journals.join(" "))
        })
        .collect()
}

pub fn run_collections(args: CollectionsArgs) -> Result<()> {
    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Collection").fg(Color::Cyan),
            Cell::new("Journals").fg(Color::Cyan),
            Cell::new("Bibstems").fg(Color::Cyan),
        ]);

    for (name, count, journals) in collection_rows(&config) {
        table.add_row(vec![Cell::new(name), Cell::new(count), Cell::new(journals)]);
    }

    println!("{table}");
    Ok(())
}
