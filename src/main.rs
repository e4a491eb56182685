use std::sync::Arc;
use tokio::sync::Notify;

mod config;
mod http;
mod logger;
mod router;
mod server;
mod todos;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load()?;
    logger::init(&cfg)?;

    // Routes are fixed before any traffic is accepted
    let store = Arc::new(todos::TodoStore::new());
    let mut router = router::Router::new();
    todos::register(&mut router, &store)?;
    if router.is_empty() {
        logger::log_warning("No routes registered, every request will get 404");
    }

    // Build the Tokio runtime, sized by the workers setting
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
        logger::log_info(&format!("[CONFIG] Using {workers} worker threads"));
    } else {
        logger::log_info("[CONFIG] Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg, router))
}

async fn async_main(
    cfg: config::Config,
    router: router::Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    logger::log_server_start(&addr, &cfg, router.len());
    for route in router.routes() {
        logger::log_info(&format!(
            "  - {:<6} {}",
            route.method().as_str(),
            route.pattern().template()
        ));
    }

    let state = Arc::new(config::AppState::new(cfg, router));
    let shutdown = Arc::new(Notify::new());
    server::start_signal_handler(Arc::clone(&shutdown))?;

    server::start_server_loop(listener, state, shutdown).await;
    Ok(())
}
