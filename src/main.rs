mod config;
mod events;
mod frame;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = config::Config::from_env().expect("invalid configuration");
    let port = config.port;
    tracing::info!(
        stroke_log_capacity = config.stroke_log_capacity,
        outbound_buffer = config.outbound_buffer,
        overflow = ?config.overflow_policy,
        recolor = ?config.recolor_policy,
        static_dir = ?config.static_dir,
        "config loaded"
    );
    let state = state::AppState::new(config);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "sketchroom listening");
    axum::serve(listener, app).await.expect("server failed");
}
