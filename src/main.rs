use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use reader_timeline::{
    Analyzer, Cli, ConfigManager, Output, PlotExporter, ProgressCallback, TimelineRenderer,
};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help, version and bad options all exit successfully.
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = e.print();
                }
                _ => {
                    eprintln!("{}", e);
                    print!("{}", Output::new().banner());
                    println!("{}", Cli::command().render_help());
                }
            }
            return ExitCode::SUCCESS;
        }
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_filter().into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = ConfigManager::load_config(cli).context("Failed to load configuration")?;
    let output = Output::new();

    print!("{}", output.banner());

    let printer = output.clone();
    let progress: ProgressCallback = Arc::new(move |update| {
        if let Some(line) = printer.format_progress(&update) {
            println!("{}", line);
        }
    });

    let analyzer = Analyzer::new(config.extract_context());
    let results = analyzer.analyze_dirs(&cli.paths, Some(progress))?;
    if results.skipped_dates > 0 {
        tracing::warn!(
            nodes = results.skipped_dates,
            "nodes skipped because of unparseable dates"
        );
    }

    let events = &results.events;
    let renderer = TimelineRenderer::new(&config.display);
    print!(
        "{}",
        output.format_timeline(&renderer, events.sorted(), events.len())
    );

    if config.plot.enabled {
        let exporter = PlotExporter::new(config.display.max_book_path_len);
        let books = exporter
            .write_file(events, &config.plot.output)
            .with_context(|| {
                format!(
                    "Failed to write gnuplot data file {}",
                    config.plot.output.display()
                )
            })?;
        print!("{}", output.format_legend(&config.plot.output, &books));
    }

    println!();
    Ok(())
}
