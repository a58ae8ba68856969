use anyhow::{bail, Result};
use dtfj_compare::{catalog, catalog_for, MemberCatalog};
use std::process::ExitCode;

pub fn run(entity: Option<&str>, json: bool) -> Result<ExitCode> {
    let entries = match entity {
        Some(name) => match catalog_for(name) {
            Some(entry) => vec![entry],
            None => {
                let known: Vec<&str> = catalog().iter().map(|e| e.entity).collect();
                bail!("unknown entity '{name}'. expected one of: {}", known.join(" | "));
            }
        },
        None => catalog(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            print_entry(entry);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_entry(entry: &MemberCatalog) {
    println!("{}", entry.entity);
    println!("  members:  {}", entry.members.join(" "));
    println!("  identity: {}", entry.identity.join(" "));
    if !entry.omitted.is_empty() {
        println!("  omitted by default: {}", entry.omitted.join(" "));
    }
}
