//! Image input: library entry point.
//!
//! Wires together:
//! - Capture domain (capture/): validation, async decode, state machine
//! - Host collaborators (host/): data sink, error sink, preview, submit control
//! - Configuration (config.rs) and the CLI driver (cli.rs)

pub mod capture;
pub mod cli;
pub mod config;
pub mod host;

pub use capture::{
    CaptureError, CaptureEvent, EncodedImage, ImageCaptureController, SelectedFile, ValidationState,
};
pub use config::CaptureConfig;

/// Entry point, called by the `image-input` binary.
pub fn run() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = cli::run(&args) {
        log::error!("image-input failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
