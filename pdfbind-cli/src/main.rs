//! pdfbind - Bind PDF documents behind a generated table of contents.
//!
//! Also runs single-file format conversions through a bounded task queue.

mod cli;

use clap::Parser;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, ConvertArgs};
use pdfbind::compose::merge_documents;
use pdfbind::config::{MergeConfig, OverwriteMode};
use pdfbind::convert::{Dispatcher, FormatKind, submit_conversion};
use pdfbind::error::PdfBindError;
use pdfbind::output::{
    OutputFormatter, ProgressBoard, display_merge_summary, display_task_outcomes, event_line,
    format_table,
};
use pdfbind::queue::{ConversionQueue, ConversionTask, EventKind, QueueEvent, TaskId, TaskStatus};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Install the log subscriber. `RUST_LOG` overrides the flag-derived level.
fn init_tracing(verbose: bool, quiet: bool) {
    let default = if verbose {
        "pdfbind=debug"
    } else if quiet {
        "pdfbind=warn"
    } else {
        "pdfbind=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), PdfBindError> {
    match &cli.command {
        Command::Merge(args) => {
            let config = args.to_config(cli.verbose, cli.quiet)?;
            run_merge(&config).await
        }
        Command::Convert(args) => {
            let formatter = OutputFormatter::new(cli.quiet, cli.verbose);
            run_convert(args, &formatter).await
        }
        Command::Formats { json } => {
            print_formats(*json);
            Ok(())
        }
    }
}

async fn run_merge(config: &MergeConfig) -> Result<(), PdfBindError> {
    let formatter = OutputFormatter::from_config(config);

    if !formatter.is_quiet() {
        formatter.info(&format!("{} v{}", pdfbind::NAME, pdfbind::VERSION));
    }

    if !config.dry_run {
        handle_output_overwrite(config, &formatter).await?;
    }

    formatter.info(&format!("Binding {} file(s)...", config.inputs.len()));
    let outcome = merge_documents(config).await?;
    display_merge_summary(&formatter, &outcome, &config.output);

    Ok(())
}

async fn run_convert(args: &ConvertArgs, formatter: &OutputFormatter) -> Result<(), PdfBindError> {
    let queue = ConversionQueue::new(args.queue_config()?)?;
    let config = args.convert_config();
    let target = args.to;

    let board = Arc::new(Mutex::new(if formatter.is_quiet() || args.json {
        ProgressBoard::hidden()
    } else {
        ProgressBoard::new()
    }));
    attach_listeners(&queue, &board, formatter);

    let mut submitted: Vec<(PathBuf, TaskId)> = Vec::with_capacity(args.inputs.len());
    for input in &args.inputs {
        // Unsupported pairs still go through the queue and end up Failed.
        if let Err(err) =
            FormatKind::from_path(input).and_then(|source| Dispatcher::route(source, target))
        {
            formatter.warning(&format!("{}: {err}", input.display()));
        }

        // Early events may beat this; the board keeps them under the id.
        let id = submit_conversion(&queue, input.clone(), target, &config);
        board.lock().track(id, input.display().to_string());
        debug!(task = %id, input = %input.display(), %target, "submitted");
        submitted.push((input.clone(), id));
    }

    queue.wait_all().await;
    board.lock().finish();

    let outcomes: Vec<_> = submitted
        .iter()
        .filter_map(|(input, id)| queue.status(id).map(|task| (input.clone(), task)))
        .collect();

    if args.json {
        print_outcomes_json(&outcomes)?;
    } else {
        display_task_outcomes(formatter, &outcomes);
    }

    let unsuccessful: Vec<&PathBuf> = outcomes
        .iter()
        .filter(|(_, task)| task.status != TaskStatus::Completed)
        .map(|(input, _)| input)
        .collect();
    match unsuccessful.first() {
        Some(first) => Err(PdfBindError::conversion_failed(
            (*first).clone(),
            format!(
                "{} of {} conversion(s) did not complete",
                unsuccessful.len(),
                outcomes.len()
            ),
        )),
        None => Ok(()),
    }
}

/// Forward queue events to the progress board, or to verbose event lines
/// when the board is not drawing.
fn attach_listeners(
    queue: &ConversionQueue,
    board: &Arc<Mutex<ProgressBoard>>,
    formatter: &OutputFormatter,
) {
    for kind in [
        EventKind::Progress,
        EventKind::Completed,
        EventKind::Failed,
        EventKind::Cancelled,
    ] {
        let board = Arc::clone(board);
        let formatter = formatter.clone();
        queue.on(kind, move |id: &TaskId, event: &QueueEvent| {
            let mut board = board.lock();
            board.apply(id, event);
            if !board.is_live() {
                let name = board.label(id).unwrap_or("?");
                formatter.debug(&event_line(name, id, event));
            }
        });
    }
}

fn print_outcomes_json(outcomes: &[(PathBuf, ConversionTask)]) -> Result<(), PdfBindError> {
    let rows: Vec<_> = outcomes
        .iter()
        .map(|(input, task)| serde_json::json!({ "input": input, "task": task }))
        .collect();
    let rendered = serde_json::to_string_pretty(&rows)
        .map_err(|err| PdfBindError::other(format!("Failed to render JSON: {err}")))?;
    println!("{rendered}");
    Ok(())
}

fn print_formats(json: bool) {
    let pairs = Dispatcher::supported_pairs();
    if json {
        let rows: Vec<_> = pairs
            .iter()
            .map(|(from, to, strategy)| {
                serde_json::json!({
                    "from": from.to_string(),
                    "to": to.to_string(),
                    "strategy": strategy.name(),
                })
            })
            .collect();
        println!("{}", serde_json::Value::Array(rows));
        return;
    }

    for row in format_table(&pairs) {
        println!("{row}");
    }
}

/// Decide whether an existing output may be replaced.
async fn handle_output_overwrite(
    config: &MergeConfig,
    formatter: &OutputFormatter,
) -> Result<(), PdfBindError> {
    if !tokio::fs::try_exists(&config.output).await.unwrap_or(false) {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(PdfBindError::output_exists(config.output.clone())),
        OverwriteMode::Prompt => {
            // Nobody to ask in quiet mode.
            if formatter.is_quiet() {
                return Err(PdfBindError::output_exists(config.output.clone()));
            }

            formatter.warning(&format!(
                "Output file already exists: {}",
                config.output.display()
            ));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| PdfBindError::other(format!("Failed to read input: {err}")))?;

            match response.trim().to_lowercase().as_str() {
                "y" | "yes" => Ok(()),
                _ => Err(PdfBindError::Cancelled),
            }
        }
    }
}
