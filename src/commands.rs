use lsif_moniker::adapter::{FactsFile, ProgramAdapter};
use lsif_moniker::config::{write_config, MonikerConfig};
use lsif_moniker::output::{is_quiet, write_graph, OutputFormat};
use lsif_moniker::ui::{self, Icons};
use lsif_moniker::{Graph, Indexer, IndexerOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Read a facts file and build its graph, applying a root override
fn build_graph(facts_path: &Path, options: IndexerOptions, root: Option<String>) -> anyhow::Result<Graph> {
    let adapter = FactsFile::new(facts_path);
    let mut facts = adapter.analyze()?;
    if let Some(root) = root {
        tracing::debug!(root = %root, "Overriding project root");
        facts.root = root;
    }
    Ok(Indexer::new(options).index_facts(&facts)?)
}

pub fn run_index(
    facts_path: &Path,
    out: Option<PathBuf>,
    format: OutputFormat,
    options: IndexerOptions,
    root: Option<String>,
) -> anyhow::Result<()> {
    let quiet = is_quiet();
    let started = Instant::now();
    if !quiet {
        ui::header(&format!("Indexing {}", facts_path.display()));
        ui::info(Icons::TAG, "Scheme", &options.scheme);
    }

    let graph = build_graph(facts_path, options, root)?;

    match &out {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            write_graph(&mut BufWriter::new(file), &graph, format)?;
        }
        None => {
            let stdout = std::io::stdout();
            write_graph(&mut stdout.lock(), &graph, format)?;
        }
    }

    if !quiet {
        let stats = graph.stats();
        ui::section("Graph");
        eprintln!("{}", ui::graph_stats_table(&stats));
        ui::summary_row("Elements:", &stats.last_id.to_string());
        ui::summary_row("Monikers:", &stats.vertex_count("moniker").to_string());
        ui::summary_row("Attach edges:", &stats.edge_count("attach").to_string());
        if stats.vertex_count("moniker") == 0 {
            ui::warn("No monikers were emitted");
        }
        if let Some(path) = &out {
            ui::info(Icons::FILE, "Written to", &path.display().to_string());
        }
        ui::timing(&format!("{:.2?}", started.elapsed()));
        ui::success("Indexing complete");
    }
    Ok(())
}

pub fn run_stats(facts_path: &Path, options: IndexerOptions, root: Option<String>) -> anyhow::Result<()> {
    let graph = build_graph(facts_path, options, root)?;
    let stats = graph.stats();

    if is_quiet() {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    ui::header(&format!("{} Graph statistics for {}", Icons::STATS, facts_path.display()));
    println!("{}", ui::graph_stats_table(&stats));
    ui::summary_row("Elements:", &stats.last_id.to_string());
    Ok(())
}

pub fn run_init(config_path: &Path, force: bool) -> anyhow::Result<()> {
    write_config(config_path, &MonikerConfig::starter(), force)?;
    if !is_quiet() {
        ui::success(&format!("Wrote {}", config_path.display()));
        ui::info(Icons::GEAR, "Edit it to change", &ui::dim("scheme, language_id, format, root"));
    }
    Ok(())
}
