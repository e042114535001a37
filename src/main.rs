use candidate_intake::core::ConfigProvider;
use candidate_intake::utils::error::{ErrorSeverity, IntakeError};
use candidate_intake::utils::{logger, validation::Validate};
use candidate_intake::{build_router, open_storage, AppConfig, AppState, CliConfig};
use clap::Parser;

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("🛑 Shutdown signal received");
}

async fn serve(config: AppConfig) -> candidate_intake::Result<()> {
    // 儲存層在啟動時開啟一次，注入到 router state，結束時明確關閉
    let storage = open_storage(&config).await?;
    let app = build_router(AppState::new(storage.clone()), config.allowed_origins());

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!("🚀 Listening on {}", config.bind_addr());

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    storage.close().await;
    result?;
    Ok(())
}

fn report_failure(e: &IntakeError) -> ! {
    tracing::error!(
        "❌ candidate-intake failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    logger::init_logger(cli.verbose, cli.log_json);
    tracing::info!("Starting candidate-intake");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => report_failure(&e),
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        report_failure(&e);
    }
    tracing::info!(
        backend = ?config.backend,
        bind = %config.bind_addr,
        "✅ Configuration loaded"
    );

    if let Err(e) = serve(config).await {
        report_failure(&e);
    }

    tracing::info!("👋 candidate-intake stopped");
}
