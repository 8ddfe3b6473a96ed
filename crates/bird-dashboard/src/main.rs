mod bootstrap;

use anyhow::Result;
use dashboard_core::settings::Settings;
use dashboard_data::analysis::build_dashboard;
use dashboard_runtime::data_manager::SourceManager;
use dashboard_runtime::session::SessionContext;
use dashboard_ui::app::DashboardApp;
use dashboard_ui::report::render_report;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();
    let home = bootstrap::home_dir();

    bootstrap::ensure_directories_in(&home)?;
    let log_file = bootstrap::log_file_for(&settings, &home);
    bootstrap::setup_logging(&settings.log_level, log_file.as_deref())?;

    tracing::info!("Bird dashboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Theme: {}, Species: {}, Year: {}",
        settings.view,
        settings.theme,
        settings.species,
        settings.year
    );

    let fallback = settings
        .fallback
        .clone()
        .unwrap_or_else(|| bootstrap::default_fallback_path_in(&home));
    let manager = SourceManager::new(settings.file.clone(), fallback);

    let loaded = match manager.load() {
        Ok(loaded) => loaded,
        Err(e) if e.is_source_error() => {
            eprintln!("{}", bootstrap::blocking_message(&e, manager.fallback_path()));
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let session = SessionContext::from_settings(loaded.identity.clone(), &settings)?;

    match settings.view.as_str() {
        "dashboard" => {
            let app = DashboardApp::new(
                &settings.theme,
                settings.timezone.clone(),
                session,
                loaded.records,
            );

            // The TUI handles 'q' / Ctrl+C itself; the OS-level signal covers
            // interrupts that arrive outside raw mode.
            tokio::select! {
                result = app.run() => result?,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down");
                }
            }
        }

        "report" => {
            let view = build_dashboard(&loaded.records, &session.request());
            print!("{}", render_report(&view, &session));
        }

        "json" => {
            let view = build_dashboard(&loaded.records, &session.request());
            println!("{}", serde_json::to_string_pretty(&view)?);
        }

        unknown => anyhow::bail!("unknown view mode: {unknown}"),
    }

    Ok(())
}
