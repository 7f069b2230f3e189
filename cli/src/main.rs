mod reconnect;

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Map, Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use crate::reconnect::Backoff;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("invalid point `{0}`; expected x,y")]
    InvalidPoint(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned HTTP {0}")]
    HttpStatus(u16),
    #[error("websocket error: {0}")]
    Ws(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("timed out waiting for websocket frame")]
    Timeout,
    #[error("reconnection failed after {0} attempts")]
    ReconnectFailed(u32),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for CliError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Ws(Box::new(error))
    }
}

#[derive(Parser, Debug)]
#[command(name = "sketch-cli", about = "Shared canvas websocket CLI")]
struct Cli {
    #[arg(long, env = "SKETCH_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check `/healthz`.
    Ping,
    /// Print `/api/stats`.
    Stats,
    /// Print every inbound frame as a JSON line, reconnecting on loss.
    Watch,
    /// Draw one straight stroke.
    Stroke(StrokeArgs),
    Clear,
    Undo,
    Redo,
}

#[derive(Args, Debug)]
struct StrokeArgs {
    #[arg(long, value_parser = parse_point)]
    from: (f64, f64),
    #[arg(long, value_parser = parse_point)]
    to: (f64, f64),
    #[arg(long)]
    size: Option<f64>,
    #[arg(long)]
    color: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let base_url = cli.base_url.trim_end_matches('/').to_owned();

    match cli.command {
        Command::Ping => run_ping(&base_url).await,
        Command::Stats => run_stats(&base_url).await,
        Command::Watch => run_watch(&base_url).await,
        Command::Stroke(args) => run_stroke(&base_url, args).await,
        Command::Clear => send_single(&base_url, "clear-canvas").await,
        Command::Undo => send_single(&base_url, "undo").await,
        Command::Redo => send_single(&base_url, "redo").await,
    }
}

// =============================================================================
// HTTP
// =============================================================================

async fn run_ping(base_url: &str) -> Result<(), CliError> {
    let response = reqwest::get(format!("{base_url}/healthz")).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::HttpStatus(status.as_u16()));
    }
    println!("ok");
    Ok(())
}

async fn run_stats(base_url: &str) -> Result<(), CliError> {
    let response = reqwest::get(format!("{base_url}/api/stats")).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::HttpStatus(status.as_u16()));
    }
    let body: Value = response.json().await?;
    print_json(&body)
}

// =============================================================================
// WEBSOCKET
// =============================================================================

async fn run_watch(base_url: &str) -> Result<(), CliError> {
    let url = ws_url(base_url)?;
    let mut backoff = Backoff::new();

    loop {
        match connect_async(url.as_str()).await {
            Ok((mut stream, _)) => {
                backoff.reset();
                eprintln!("connected: {url}");
                if let Err(error) = print_frames(&mut stream).await {
                    eprintln!("connection lost: {error}");
                }
            }
            Err(error) => eprintln!("connect failed: {error}"),
        }

        let Some(delay) = backoff.next_delay() else {
            return Err(CliError::ReconnectFailed(backoff.attempts()));
        };
        eprintln!("reconnecting in {}ms (attempt {})", delay.as_millis(), backoff.attempts());
        tokio::time::sleep(delay).await;
    }
}

/// Print frames until the connection ends. Always returns an error
/// describing why it ended.
async fn print_frames(stream: &mut WsStream) -> Result<(), CliError> {
    loop {
        let Some(message) = stream.next().await else {
            return Err(CliError::WsClosed);
        };
        match message? {
            Message::Text(text) => println!("{}", text.as_str()),
            Message::Close(_) => return Err(CliError::WsClosed),
            _ => {}
        }
    }
}

async fn run_stroke(base_url: &str, args: StrokeArgs) -> Result<(), CliError> {
    let mut stream = join(base_url).await?;

    let mut style = Map::new();
    if let Some(size) = args.size {
        style.insert("size".into(), json!(size));
    }
    if let Some(color) = args.color {
        style.insert("color".into(), json!(color));
    }

    let (from, to) = (args.from, args.to);
    for (event, (x, y)) in [("draw-start", from), ("draw", to), ("draw-end", to)] {
        let mut data = style.clone();
        data.insert("x".into(), json!(x));
        data.insert("y".into(), json!(y));
        send_event(&mut stream, event, Value::Object(data)).await?;
    }

    stream.close(None).await?;
    eprintln!("stroke sent: ({}, {}) -> ({}, {})", from.0, from.1, to.0, to.1);
    Ok(())
}

async fn send_single(base_url: &str, event: &str) -> Result<(), CliError> {
    let mut stream = join(base_url).await?;
    send_event(&mut stream, event, Value::Null).await?;
    stream.close(None).await?;
    eprintln!("{event} sent");
    Ok(())
}

/// Connect and wait for the `init` snapshot.
async fn join(base_url: &str) -> Result<WsStream, CliError> {
    let (mut stream, _) = connect_async(ws_url(base_url)?).await?;
    loop {
        let frame = recv_next(&mut stream, Duration::from_secs(5)).await?;
        if frame.get("event").and_then(Value::as_str) == Some("init") {
            let data = &frame["data"];
            eprintln!(
                "joined as {} ({}), {} strokes on canvas",
                data["userId"].as_str().unwrap_or("?"),
                data["color"].as_str().unwrap_or("?"),
                data["strokes"].as_array().map_or(0, Vec::len),
            );
            return Ok(stream);
        }
    }
}

async fn recv_next(stream: &mut WsStream, timeout: Duration) -> Result<Value, CliError> {
    let fut = async {
        loop {
            let Some(message) = stream.next().await else {
                return Err(CliError::WsClosed);
            };
            match message? {
                Message::Text(text) => return serde_json::from_str(text.as_str()).map_err(CliError::from),
                Message::Close(_) => return Err(CliError::WsClosed),
                _ => {}
            }
        }
    };

    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| CliError::Timeout)?
}

async fn send_event(stream: &mut WsStream, event: &str, data: Value) -> Result<(), CliError> {
    let text = json!({ "event": event, "data": data }).to_string();
    stream.send(Message::Text(text.into())).await?;
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

fn ws_url(base_url: &str) -> Result<String, CliError> {
    if let Some(rest) = base_url.strip_prefix("http://") {
        return Ok(format!("ws://{rest}/ws"));
    }
    if let Some(rest) = base_url.strip_prefix("https://") {
        return Ok(format!("wss://{rest}/ws"));
    }

    Err(CliError::InvalidBaseUrl(base_url.to_owned()))
}

fn parse_point(raw: &str) -> Result<(f64, f64), CliError> {
    let invalid = || CliError::InvalidPoint(raw.to_owned());
    let (x, y) = raw.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse().map_err(|_| invalid())?;
    let y = y.trim().parse().map_err(|_| invalid())?;
    Ok((x, y))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
