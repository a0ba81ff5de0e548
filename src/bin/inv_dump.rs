/// Diagnostic tool: decodes an Inventor document extracted to a directory
/// and reports what the reader finds.
///
/// Usage:
///     cargo run --bin inv_dump -- <extracted_dir> [--graph] [--parallel] [--failsafe] [--nodes]
///
/// Set `RUST_LOG=invrust=debug` for per-segment tracing.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use invrust::io::{InventorReader, InventorReaderConfiguration};
use invrust::model::SegmentOutcome;
use invrust::notification::NotificationType;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(path) = args.iter().find(|a| !a.starts_with("--")).map(PathBuf::from) else {
        bail!("usage: inv_dump <extracted_dir> [--graph] [--parallel] [--failsafe] [--nodes]");
    };
    let flag = |name: &str| args.iter().any(|a| a == name);

    let config = InventorReaderConfiguration {
        failsafe: flag("--failsafe"),
        parallel: flag("--parallel"),
        build_graph: flag("--graph"),
        ..Default::default()
    };
    let model = InventorReader::from_directory(&path)
        .with_context(|| format!("opening {}", path.display()))?
        .with_config(config)
        .read()
        .with_context(|| format!("reading {}", path.display()))?;

    let info = &model.info;
    println!("Document: {}", path.display());
    println!("  title:       {}", info.title);
    println!("  author:      {}", info.author);
    println!("  application: {}", info.created_by);
    if let Some(fp) = &model.fingerprint {
        println!("  release:     {} ({})", fp.release, fp.application);
    }
    if let Some(db) = &model.database {
        println!("  database:    version {:#X}, document {}", db.version, db.document);
    }
    println!("  embedded:    {}", model.embedded.len());
    println!();

    println!("{:<32} {:>8} {:>8}  flavor", "segment", "nodes", "errors");
    for (name, outcome) in &model.segments {
        match outcome {
            SegmentOutcome::Decoded(table) => {
                let errors = table.iter().filter(|n| n.has_error()).count();
                println!("{:<32} {:>8} {:>8}  {}", name, table.len(), errors, table.flavor);
                if flag("--nodes") {
                    for node in table.iter() {
                        println!(
                            "    ({}): {} '{}'{}",
                            node.index,
                            node.type_label(),
                            node.name.as_deref().unwrap_or(""),
                            node.error.as_deref().map(|e| format!("  ERROR {e}")).unwrap_or_default()
                        );
                    }
                }
            }
            SegmentOutcome::Failed { stream, error } => {
                println!("{:<32} FAILED ({stream}): {error}", name);
            }
        }
    }
    println!();

    if flag("--graph") {
        print!("{}", model.graph.render());
        println!();
    }

    println!(
        "Notifications: {} errors, {} warnings, {} not implemented",
        model.notifications.of_type(NotificationType::Error).len(),
        model.notifications.of_type(NotificationType::Warning).len(),
        model.notifications.of_type(NotificationType::NotImplemented).len(),
    );
    Ok(())
}
