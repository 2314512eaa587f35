use std::{future::IntoFuture, process, sync::Arc, time::Duration};

use patronage::{
    application::{
        composer::ComposerService,
        error::AppError,
        publisher::{DiagnosticPublisher, PostPublisher},
    },
    config,
    infra::{
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli().map_err(|err| {
        AppError::from(InfraError::configuration(format!(
            "failed to load configuration: {err}"
        )))
    })?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match cli_args.command {
        Some(config::Command::Serve(_)) | None => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let state = build_http_state(&settings);
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "patronage::serve",
        addr = %settings.server.addr,
        upload_limit_bytes = settings.uploads.max_request_bytes.get(),
        max_sessions = settings.composer.max_sessions.get(),
        "composer listening"
    );

    serve_until_shutdown(listener, router, settings.server.graceful_shutdown).await
}

fn build_http_state(settings: &config::Settings) -> HttpState {
    let publisher: Arc<dyn PostPublisher> = Arc::new(DiagnosticPublisher);
    HttpState {
        composer: Arc::new(ComposerService::new(&settings.composer)),
        publisher,
        profile: Arc::new(settings.profile.clone()),
        navigation: Arc::new(settings.navigation.clone()),
        upload_limit_bytes: settings.uploads.max_request_bytes.get(),
    }
}

/// Serve until Ctrl-C, then give in-flight requests `grace` to finish.
async fn serve_until_shutdown(
    listener: tokio::net::TcpListener,
    router: axum::Router,
    grace: Duration,
) -> Result<(), AppError> {
    let shutdown = Arc::new(Notify::new());
    let notified = shutdown.clone();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move { notified.notified().await });
    let mut server = tokio::spawn(server.into_future());

    tokio::select! {
        joined = &mut server => return server_result(joined),
        interrupted = tokio::signal::ctrl_c() => {
            if let Err(err) = interrupted {
                warn!(target = "patronage::serve", error = %err, "failed to listen for shutdown signal");
                return server_result(server.await);
            }
            info!(
                target = "patronage::serve",
                grace_seconds = grace.as_secs(),
                "shutdown requested, draining connections"
            );
            shutdown.notify_one();
        }
    }

    match tokio::time::timeout(grace, server).await {
        Ok(joined) => server_result(joined),
        Err(_) => {
            warn!(
                target = "patronage::serve",
                "graceful shutdown timed out, dropping remaining connections"
            );
            Ok(())
        }
    }
}

fn server_result(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(AppError::from(InfraError::from(err))),
        Err(err) => Err(AppError::unexpected(format!("server task failed: {err}"))),
    }
}
