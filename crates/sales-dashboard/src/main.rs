mod bootstrap;

use std::path::PathBuf;

use anyhow::Result;
use sales_core::error::DashboardError;
use sales_core::settings::Settings;
use sales_data::analysis::{analyze_file, build_report, AnalysisOptions, Section};
use sales_data::export::{export_to_path, DEFAULT_EXPORT_NAME};
use sales_data::reader::{DateParsePolicy, LoadOptions};
use sales_ui::app::App;

fn main() -> Result<()> {
    let settings = Settings::load();

    let logs_dir = bootstrap::ensure_directories()?;
    let interactive = settings.format == "tui" && settings.export.is_none();
    let log_file = bootstrap::resolve_log_file(settings.log_file.as_deref(), interactive, &logs_dir);
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    tracing::info!("Sales Dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "File: {}, Section: {}, Theme: {}",
        settings.file.display(),
        settings.section,
        settings.theme
    );

    let (from, to) = settings.range_bounds()?;
    let options = AnalysisOptions {
        load: LoadOptions {
            date_policy: if settings.skip_bad_dates {
                DateParsePolicy::SkipRow
            } else {
                DateParsePolicy::Strict
            },
        },
        from,
        to,
    };
    let data = analyze_file(&settings.file, &options)?;

    if let Some(path) = &settings.export {
        export_to_path(&data.table, path)?;
        tracing::info!("Exported {} rows to {}", data.table.len(), path.display());
        eprintln!("Saved {} rows to {}", data.table.len(), path.display());
    }

    if settings.format == "json" {
        let report = build_report(&data);
        println!("{}", serde_json::to_string_pretty(&report).map_err(DashboardError::from)?);
        return Ok(());
    }
    if !interactive {
        return Ok(());
    }

    let section = Section::from_name(&settings.section).unwrap_or(Section::Overview);
    let app = App::new(&settings.theme, section, data, PathBuf::from(DEFAULT_EXPORT_NAME));
    app.run()
        .map_err(|e| DashboardError::Terminal(e.to_string()))?;

    tracing::info!("Sales Dashboard exiting");
    Ok(())
}
