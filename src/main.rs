// Gamedex CLI - interactive catalog shell over the B-tree engine
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::warn;

use gamedex::{
    init_logging_with_level, load_catalog, log_operation, save_catalog, save_keys, with_trace_id,
    BTree, Catalog, MinDegree, Operation, OperationContext, RecordBuilder,
};

#[derive(Parser, Debug)]
#[command(
    name = "gamedex",
    about = "A B-tree backed catalog database for game records",
    version
)]
struct Cli {
    /// Catalog data file, loaded at startup and written on exit
    #[arg(long, default_value = "games.txt")]
    file: PathBuf,

    /// Derived-key listing written on exit
    #[arg(long, default_value = "ids.txt")]
    ids_file: PathBuf,

    /// Minimum degree of the B-tree
    #[arg(long, default_value_t = 3)]
    degree: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn print_menu() {
    println!();
    println!("Menu:");
    println!("1. Insert a game");
    println!("2. Search for a game");
    println!("3. Remove a game");
    println!("4. Edit a game");
    println!("5. List all games");
    println!("6. Save and exit");
}

/// Print a label and read one trimmed line from stdin. Returns `None`
/// once the input is exhausted, which is distinct from a blank line.
fn prompt(input: &mut impl BufRead, label: &str) -> Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush().context("Failed to flush stdout")?;
    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Split comma-separated location input, dropping empty fragments.
fn parse_locations(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_record(input: &mut impl BufRead) -> Result<gamedex::Record> {
    let name = prompt(input, "Name: ")?.context("Input ended mid-record")?;
    let category = prompt(input, "Category: ")?.context("Input ended mid-record")?;
    let locations =
        prompt(input, "Locations (comma separated): ")?.context("Input ended mid-record")?;
    RecordBuilder::new()
        .name(name)
        .category(category)
        .locations(parse_locations(&locations))
        .build()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging_with_level(cli.verbose, cli.quiet)?;

    let session = OperationContext::new("session");
    log_operation(
        &session,
        &Operation::Startup {
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        &Ok(()),
    );

    let degree = MinDegree::new(cli.degree)?;
    let mut tree = BTree::new(degree);

    // A missing or unreadable catalog file is reported, not fatal: the
    // session simply starts with an empty catalog.
    let load_ctx = session.child("catalog_load");
    match with_trace_id("catalog_load", load_catalog(&cli.file, &mut tree)).await {
        Ok(loaded) => {
            log_operation(
                &load_ctx,
                &Operation::CatalogLoad {
                    file: cli.file.display().to_string(),
                    records: loaded,
                },
                &Ok(()),
            );
            if !cli.quiet {
                println!("Loaded {} record(s) from {}", loaded, cli.file.display());
            }
        }
        Err(e) => {
            warn!(error = %e, file = %cli.file.display(), "starting with an empty catalog");
            log_operation(
                &load_ctx,
                &Operation::CatalogLoad {
                    file: cli.file.display().to_string(),
                    records: 0,
                },
                &Err(e),
            );
        }
    }

    let stdin = std::io::stdin();
    let mut input = stdin.lock();

    loop {
        print_menu();
        // Closed stdin means no more commands are coming; leave the loop
        // instead of re-printing the menu against an exhausted reader.
        let Some(choice) = prompt(&mut input, "Choose an option: ")? else {
            log_operation(
                &session,
                &Operation::Shutdown {
                    reason: "input ended".to_string(),
                },
                &Ok(()),
            );
            break;
        };

        match choice.trim() {
            "1" => match read_record(&mut input) {
                Ok(record) => {
                    println!("Inserted with key: {}", record.key());
                    log_operation(
                        &session.child("tree_insert"),
                        &Operation::TreeInsert {
                            key: record.key().to_string(),
                        },
                        &Ok(()),
                    );
                    tree.insert(record);
                }
                Err(e) => println!("Could not build record: {e}"),
            },
            "2" => {
                let Some(key) = prompt(&mut input, "Key to search: ")? else {
                    continue;
                };
                let found = match tree.search(&key) {
                    Some(record) => {
                        println!("{record}");
                        true
                    }
                    None => {
                        println!("Game not found");
                        false
                    }
                };
                log_operation(
                    &session.child("tree_search"),
                    &Operation::TreeSearch { key, found },
                    &Ok(()),
                );
            }
            "3" => {
                let Some(key) = prompt(&mut input, "Key to remove: ")? else {
                    continue;
                };
                let outcome = tree.remove(&key);
                println!("Result: {outcome}");
                log_operation(
                    &session.child("tree_remove"),
                    &Operation::TreeRemove {
                        key,
                        removed: outcome.removed(),
                    },
                    &Ok(()),
                );
            }
            "4" => {
                let Some(old_key) = prompt(&mut input, "Key to edit: ")? else {
                    continue;
                };
                match read_record(&mut input) {
                    Ok(record) => {
                        let new_key = record.key().to_string();
                        // Editing a missing key inserts the new record
                        // anyway; surface the removal outcome so the user
                        // can tell the difference.
                        let outcome = tree.edit(&old_key, record);
                        println!("Previous record: {outcome}");
                        log_operation(
                            &session.child("tree_edit"),
                            &Operation::TreeEdit { old_key, new_key },
                            &Ok(()),
                        );
                    }
                    Err(e) => println!("Could not build record: {e}"),
                }
            }
            "5" => {
                if tree.is_empty() {
                    println!("The catalog is empty");
                } else {
                    for record in tree.traverse() {
                        println!("{record}");
                        println!();
                    }
                }
            }
            "6" => {
                let save_ctx = session.child("catalog_save");
                match with_trace_id("catalog_save", save_catalog(&cli.file, &tree)).await {
                    Ok(saved) => {
                        log_operation(
                            &save_ctx,
                            &Operation::CatalogSave {
                                file: cli.file.display().to_string(),
                                records: saved,
                            },
                            &Ok(()),
                        );
                        if !cli.quiet {
                            println!("Saved {} record(s) to {}", saved, cli.file.display());
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "catalog was not saved");
                        log_operation(
                            &save_ctx,
                            &Operation::CatalogSave {
                                file: cli.file.display().to_string(),
                                records: 0,
                            },
                            &Err(e),
                        );
                    }
                }
                let keys_ctx = session.child("key_listing_save");
                match with_trace_id("key_listing_save", save_keys(&cli.ids_file, &tree)).await {
                    Ok(written) => {
                        log_operation(
                            &keys_ctx,
                            &Operation::KeyListingSave {
                                file: cli.ids_file.display().to_string(),
                                keys: written,
                            },
                            &Ok(()),
                        );
                    }
                    Err(e) => {
                        warn!(error = %e, "key listing was not saved");
                        log_operation(
                            &keys_ctx,
                            &Operation::KeyListingSave {
                                file: cli.ids_file.display().to_string(),
                                keys: 0,
                            },
                            &Err(e),
                        );
                    }
                }
                log_operation(
                    &session,
                    &Operation::Shutdown {
                        reason: "save and exit".to_string(),
                    },
                    &Ok(()),
                );
                break;
            }
            "" => {}
            _ => println!("Invalid choice, try again."),
        }
    }

    Ok(())
}
