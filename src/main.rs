//! Quip - A pocket voice-assistant demo
//!
//! Main entry point for the Quip application.

use std::sync::Arc;

use eframe::egui;
use quip::inference::{HttpInferenceClient, InferenceConfig};
use quip::pipeline::Dispatcher;
use quip::ui::QuipApp;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quip=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Quip assistant");

    let config = InferenceConfig::from_env();
    let service = Arc::new(HttpInferenceClient::new(config));

    let handle = match Dispatcher::new(service).start_worker() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!("Failed to start dispatch worker: {}", e);
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([440.0, 640.0])
            .with_min_inner_size([360.0, 480.0])
            .with_title("Quip"),
        ..Default::default()
    };

    eframe::run_native(
        "Quip",
        options,
        Box::new(move |cc| Ok(Box::new(QuipApp::new(cc, handle)))),
    )
}
