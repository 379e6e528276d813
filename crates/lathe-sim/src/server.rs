use lathe_core::{Lathe, RandomSource};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

/// One JSON line per sample. `sequence` restarts per client; `uptime_us`
/// is monotonic from server start.
#[derive(Debug, Serialize)]
struct TelemetryMsg {
    #[serde(rename = "type")]
    msg_type: &'static str,
    sequence: u64,
    uptime_us: u64,
    enabled: bool,
    failure: bool,
    produced: u64,
    rejected: u64,
    temperature: f64,
    pressure: f64,
    depth: f64,
    speed: f64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub sample_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_millis(1_000),
        }
    }
}

/// Publish device snapshots to every connected client until the shutdown
/// signal flips. The caller binds the listener so a bind failure
/// surfaces as a startup error; each client gets its own cooperative
/// task sampling the device on demand.
pub async fn serve<R>(
    listener: TcpListener,
    device: Rc<RefCell<Lathe<R>>>,
    config: ServerConfig,
    mut shutdown: watch::Receiver<bool>,
) where
    R: RandomSource + 'static,
{
    let started = Instant::now();

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    info!(client_addr = %addr, "telemetry client connected");
                    let device = Rc::clone(&device);
                    let shutdown = shutdown.clone();
                    let sample_interval = config.sample_interval;
                    tokio::task::spawn_local(async move {
                        serve_client(stream, device, sample_interval, started, shutdown).await;
                        info!(client_addr = %addr, "telemetry client disconnected");
                    });
                }
                Err(err) => {
                    warn!(error = %err, "telemetry accept error");
                }
            },
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("telemetry server stopping");
                    break;
                }
            }
        }
    }
}

async fn serve_client<R>(
    stream: TcpStream,
    device: Rc<RefCell<Lathe<R>>>,
    sample_interval: Duration,
    started: Instant,
    mut shutdown: watch::Receiver<bool>,
) where
    R: RandomSource + 'static,
{
    let (reader, mut writer) = stream.into_split();
    let mut drain = BufReader::new(reader).lines();
    // First sample goes out immediately on connect.
    let mut ticker = time::interval(sample_interval);
    let mut sequence: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                sequence = sequence.wrapping_add(1);
                let snapshot = device.borrow_mut().snapshot();
                let msg = TelemetryMsg {
                    msg_type: "telemetry",
                    sequence,
                    uptime_us: started.elapsed().as_micros() as u64,
                    enabled: snapshot.enabled,
                    failure: snapshot.failure,
                    produced: snapshot.produced,
                    rejected: snapshot.rejected,
                    temperature: snapshot.temperature,
                    pressure: snapshot.pressure,
                    depth: snapshot.depth,
                    speed: snapshot.speed,
                };
                let line = match serde_json::to_string(&msg) {
                    Ok(line) => line,
                    Err(err) => {
                        warn!(error = %err, "telemetry encode error");
                        continue;
                    }
                };
                if let Err(err) = write_line(&mut writer, &line).await {
                    debug!(error = %err, "telemetry write error");
                    break;
                }
            }
            line = drain.next_line() => match line {
                // Read-only surface: client input is discarded.
                Ok(Some(_)) => {}
                Ok(None) | Err(_) => break,
            },
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}

async fn write_line(writer: &mut OwnedWriteHalf, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
