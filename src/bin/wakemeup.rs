use wakemeup::config;
use wakemeup::registry::{ServerRegistry, ServerSummary};
use wakemeup::wol;
use wakemeup::wol::{WakeDispatcher, WakeError};

use axum::extract;
use axum::http::Request;
use axum::http::StatusCode;
use axum::middleware;
use axum::response;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing;
use axum::Router;
use clap::Parser;
use log::{error, info};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

async fn index() -> impl IntoResponse {
    response::Html(include_str!("../index.html"))
}

#[derive(Serialize)]
struct Message {
    message: String,
}

fn message(text: String) -> response::Json<Message> {
    response::Json(Message { message: text })
}

async fn list_servers(
    app_state: extract::State<AppState>,
) -> response::Json<Vec<ServerSummary>> {
    response::Json(app_state.registry.list())
}

async fn wake_server(
    app_state: extract::State<AppState>,
    extract::Path(name): extract::Path<String>,
) -> (StatusCode, response::Json<Message>) {
    match app_state.dispatcher.wake(&name) {
        Ok(()) => (
            StatusCode::OK,
            message(format!("Wake-on-LAN packet sent to {}", name)),
        ),
        Err(e @ WakeError::NotFound(_)) => (StatusCode::NOT_FOUND, message(e.to_string())),
        Err(e @ WakeError::Inactive(_)) => (StatusCode::BAD_REQUEST, message(e.to_string())),
        // Configuration and I/O faults are already logged with full
        // context by the dispatcher; the client supplied only a name, so
        // it gets no MAC or gateway details back.
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            message("Failed to send Wake-on-LAN packet".to_string()),
        ),
    }
}

async fn varz() -> response::Result<impl IntoResponse> {
    let metrics = prometheus::gather();
    let encoder = prometheus::TextEncoder::new();
    encoder
        .encode_to_string(&metrics)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{}", e)).into())
}

async fn add_observability<B>(
    req: Request<B>,
    next: middleware::Next<B>,
) -> response::Result<Response> {
    let path = req.uri().path().to_string();
    let resp = next.run(req).await;
    info!(
        "{request} {status}",
        request = path,
        status = resp.status().as_str(),
    );
    Ok(resp)
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:8080")]
    http_addr: String,

    /// Path to the JSON file listing wakeable servers.
    #[arg(long, env = "WAKEMEUP_CONFIG", default_value = "servers.json")]
    config: PathBuf,

    /// If true, log magic packets instead of sending them.
    #[arg(long)]
    use_fake_transport: bool,
}

#[derive(Clone)]
struct AppState {
    registry: Arc<ServerRegistry>,
    dispatcher: Arc<WakeDispatcher>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("INFO"))
        .format_timestamp(Some(env_logger::fmt::TimestampPrecision::Millis))
        .init();

    let servers = config::load_servers(&args.config).map_err(|e| {
        error!("could not load {}: {}", args.config.display(), e);
        e
    })?;
    info!(
        "loaded {} servers from {}",
        servers.len(),
        args.config.display()
    );
    let registry = Arc::new(ServerRegistry::new(servers));

    let transport: Box<dyn wol::WolTransport + Sync + Send> = if args.use_fake_transport {
        Box::new(wol::noop::LogOnlyTransport)
    } else {
        Box::new(wol::UdpBroadcast)
    };
    let dispatcher = Arc::new(WakeDispatcher::new(registry.clone(), transport));

    let app_state = AppState {
        registry,
        dispatcher,
    };

    let app = Router::new()
        .route("/", routing::get(index))
        .route("/varz", routing::get(varz))
        .route("/api/servers", routing::get(list_servers))
        .route("/api/servers/:name/wake", routing::post(wake_server))
        .route_layer(middleware::from_fn(add_observability))
        .with_state(app_state);

    info!("Starting server...");
    axum::Server::bind(&args.http_addr.parse()?)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
