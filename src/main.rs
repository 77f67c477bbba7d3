use anyhow::Context;
use eframe::egui;
use loan_approval::app::LoanApp;
use loan_approval::config::PredictorConfig;
use loan_approval::{bootstrap, logging};

fn main() -> anyhow::Result<()> {
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }

    let config = PredictorConfig::default();
    let (predictor, accuracy) = bootstrap(&config)
        .with_context(|| format!("failed to train on {}", config.csv_path.display()))?;
    println!("✅ Model trained with accuracy: {accuracy:.2}");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.window_title.as_str())
            .with_inner_size(config.window_size),
        ..Default::default()
    };

    let app = LoanApp::new(predictor, accuracy);
    eframe::run_native(
        &config.window_title,
        native_options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("window failed: {e}"))?;

    Ok(())
}
