//! CLI entry point for colorcard.

mod cli;

use clap::Parser;
use colorcard::config::load_config;
use colorcard::controller::ThemeController;
use colorcard::logging::{self, LogTarget};
use colorcard::source::source_from_config;
use colorcard::ui::card::write_summary;
use colorcard::ui::terminal::{is_interactive, run_interactive};
use std::io::{self, IsTerminal};
use tracing::{debug, info};

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();

    // Load config.
    let mut config = match load_config(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    // Apply CLI overrides.
    if let Some(kind) = args.source {
        config.source.kind = kind;
    }
    if let Some(delay) = args.delay_ms {
        config.source.delay_ms = delay;
    }
    if let Some(theme) = &args.theme {
        config.source.initial = Some(theme.clone());
    }
    if args.no_color {
        config.display.color = false;
    }

    match logging::init_global(&config.logging, args.log_file.as_deref()) {
        Ok(LogTarget::File(path)) => info!(path = %path.display(), "logging to file"),
        Ok(LogTarget::Stderr) => {}
        Err(err) => eprintln!("colorcard: log setup skipped: {err}"),
    }
    info!(source = ?config.source.kind, delay_ms = config.source.delay_ms, "colorcard starting");

    let source = source_from_config(&config.source, &config.themes);
    let controller = match ThemeController::bootstrap(source) {
        Ok(controller) => controller,
        Err(e) => {
            eprintln!("error: failed to load initial theme: {e}");
            std::process::exit(1);
        }
    };
    let _state_log = controller.store().subscribe(|state| {
        debug!(
            version = state.version,
            request = state.request.label(),
            theme = %state.theme,
            "theme state changed"
        );
    });

    if let Some(name) = config.source.initial.as_deref() {
        if let Err(e) = controller.apply_preset(name) {
            let available = controller.source().preset_names().join(", ");
            eprintln!("warning: {e}. Available presets: {available}");
        }
    }
    if let Some(payload) = args.set.as_deref() {
        if let Err(e) = controller.set_theme_json(payload) {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    }

    if args.once || !is_interactive() {
        if args.once {
            controller.request_random_theme().settled().await;
        }
        let color = config.display.color && io::stdout().is_terminal();
        if let Err(e) = write_summary(&mut io::stdout(), &controller.store().state(), color) {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = run_interactive(&controller, config.display.color).await {
        eprintln!("error: terminal session failed: {e}");
        std::process::exit(1);
    }
}
