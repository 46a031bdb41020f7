//! Build documentation for a Go module and print the page paths.
//!
//! ```text
//! cargo run -p gsd-docs --example render_tree -- path/to/module
//! ```

use gsd_docs::{Corpus, CorpusOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let root = std::env::args().nth(1).unwrap_or_else(|| ".".to_string());

    let corpus = Corpus::new(CorpusOptions::new(root))?;
    let report = corpus.build()?;
    println!(
        "{} packages, {} pages in {:?}",
        report.packages, report.pages, report.duration
    );

    if let Some(snapshot) = corpus.store().current() {
        for path in snapshot.paths() {
            println!("/{path}");
        }
    }
    Ok(())
}
