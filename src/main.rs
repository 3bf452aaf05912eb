use std::sync::Arc;

use rangeserve::config::{AppState, Config};
use rangeserve::logger;
use rangeserve::server::{self, ServiceKind};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cfg = Config::load()?;
    logger::init(&cfg.logging)?;

    // Worker threads follow `server.workers`, defaulting to the CPU count
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app_addr = cfg.get_socket_addr()?;
    let api_addr = cfg.get_api_socket_addr()?;

    let app_listener = server::create_listener(app_addr)?;
    let api_listener = server::create_listener(api_addr)?;

    let state = Arc::new(AppState::new(cfg));
    state.start().await?;
    logger::log_server_start(&app_addr, &api_addr, &state.config);

    tokio::select! {
        () = server::run(app_listener, Arc::clone(&state), ServiceKind::Content) => {}
        () = server::run(api_listener, Arc::clone(&state), ServiceKind::Management) => {}
        () = server::shutdown_signal() => {}
    }

    Ok(())
}
