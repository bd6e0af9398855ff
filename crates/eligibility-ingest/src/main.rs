mod bootstrap;

use anyhow::{Context, Result};
use eligibility_core::partners::PartnerRegistry;
use eligibility_core::settings::Settings;
use eligibility_data::reader::CsvRowSource;
use eligibility_data::writer::CsvDatasetWriter;
use eligibility_runtime::orchestrator::IngestOrchestrator;
use eligibility_runtime::report::{format_preview, IngestReport};

fn main() -> Result<()> {
    let settings = Settings::load();

    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("Eligibility ingest v{} starting", env!("CARGO_PKG_VERSION"));

    let report = run_pipeline(&settings)?;

    let preview = format_preview(&report.unified, settings.preview);
    if !preview.is_empty() {
        print!("{}", preview);
    }

    Ok(())
}

/// Load the partner registry, ingest every partner and write both datasets.
fn run_pipeline(settings: &Settings) -> Result<IngestReport> {
    let output_delimiter = settings.output_delimiter_byte()?;
    bootstrap::ensure_output_dir(&settings.output_dir).with_context(|| {
        format!(
            "creating output directory {}",
            settings.output_dir.display()
        )
    })?;

    let registry = PartnerRegistry::load_from(&settings.config).with_context(|| {
        format!(
            "loading partner configuration from {}",
            settings.config.display()
        )
    })?;
    tracing::info!(
        "Loaded {} partner(s) from {}",
        registry.len(),
        settings.config.display()
    );

    let orchestrator = IngestOrchestrator::new(registry, CsvRowSource);
    let report = orchestrator.run();

    let mut writer = CsvDatasetWriter::new(&settings.output_dir, output_delimiter);
    report.write_to(&mut writer)?;

    let failed = report.failed_partners().count();
    if failed > 0 {
        tracing::warn!("{} partner(s) could not be read and contributed no rows", failed);
    }
    tracing::info!(
        "Pipeline completed successfully. Wrote {} rows to {}",
        report.unified.len(),
        writer.unified_path().display()
    );
    tracing::info!(
        "Wrote {} dropped rows to {}",
        report.dropped.len(),
        writer.dropped_path().display()
    );

    Ok(report)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
