//! Command-line driver: replays a sequence of file selections through the
//! controller and prints one JSON report line per event.
//!
//! Usage:
//!   image-input face.png                    Single selection
//!   image-input face.png id.jpg --clear     PNG, then JPEG, then cancel
//!   image-input --type image/png scan.bin   Override the declared type
//!   image-input --no-verify face.png        Skip header sniffing

use crate::capture::{ImageCaptureController, SelectedFile, ValidationState};
use crate::config::CaptureConfig;
use crate::host::{ErrorNotice, MemoryErrorModel, MemoryModel, MemoryPreview, SubmitButton};
use serde::Serialize;
use std::path::PathBuf;

pub const USAGE: &str = "Usage:\n  image-input [--no-verify] [--type <mime>] <file | --clear>...";

/// One selection event from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    File { path: PathBuf, mime_type: Option<String> },
    Clear,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub no_verify: bool,
    pub selections: Vec<Selection>,
}

/// Parses arguments (without the program name).
pub fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut parsed = CliArgs::default();
    let mut next_type: Option<String> = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--no-verify" => parsed.no_verify = true,
            "--clear" => parsed.selections.push(Selection::Clear),
            "--type" => {
                let mime = iter.next().ok_or("--type requires a MIME type")?;
                next_type = Some(mime.clone());
            }
            flag if flag.starts_with("--") => return Err(format!("Unknown option: {}", flag)),
            path => parsed.selections.push(Selection::File {
                path: PathBuf::from(path),
                mime_type: next_type.take(),
            }),
        }
    }

    if next_type.is_some() {
        return Err("--type must be followed by a file".to_string());
    }
    if parsed.selections.is_empty() {
        return Err(USAGE.to_string());
    }
    Ok(parsed)
}

/// What the host would observe after one event.
#[derive(Debug, Serialize)]
pub struct Report {
    pub selection: String,
    pub state: ValidationState,
    pub submit_enabled: bool,
    pub data_len: usize,
    pub error: ErrorNotice,
}

/// Runs every selection in order and returns the reports.
pub async fn replay(config: CaptureConfig, selections: Vec<Selection>) -> Vec<Report> {
    let model = MemoryModel::new();
    let errors = MemoryErrorModel::new();
    let submit = SubmitButton::new();
    let slot = config.slot_name.clone();

    let mut controller = ImageCaptureController::new(config, model.clone(), MemoryPreview::new())
        .with_error_sink(errors.clone())
        .with_submit_control(submit.clone());

    let mut reports = Vec::with_capacity(selections.len());
    for selection in selections {
        let (label, file) = match selection {
            Selection::Clear => ("--clear".to_string(), None),
            Selection::File { path, mime_type } => {
                let label = path.display().to_string();
                let file = match mime_type {
                    Some(mime) => SelectedFile::from_path(path, mime),
                    None => SelectedFile::from_path_guess_type(path),
                };
                (label, Some(file))
            }
        };

        controller.on_file_selected(file);
        let state = controller.settle().await;

        reports.push(Report {
            selection: label,
            state,
            submit_enabled: submit.is_enabled(),
            data_len: model.get(&slot).map(|d| d.len()).unwrap_or(0),
            error: errors.notice(),
        });
    }
    reports
}

/// Entry point used by `run()`.
pub fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let cli = parse_args(args)?;

    let mut config = CaptureConfig::load()?;
    if cli.no_verify {
        config.verify_content = false;
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let start = std::time::Instant::now();
    let reports = runtime.block_on(replay(config, cli.selections));
    for report in &reports {
        println!("{}", serde_json::to_string(report)?);
    }
    eprintln!(
        "--- {} selection(s) in {}ms ---",
        reports.len(),
        start.elapsed().as_millis()
    );
    Ok(())
}
