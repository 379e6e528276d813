use crate::console;
use crate::cycle::CycleDriver;
use crate::runtime::config::RuntimeConfig;
use crate::runtime::logging::init_tracing;
use crate::server::{self, ServerConfig};
use lathe_core::{CommandError, Dispatcher, Lathe, ThreadRandom};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("command table: {0}")]
    Config(#[from] CommandError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub fn run_from_args() {
    let config = RuntimeConfig::from_env();
    if config.show_help {
        RuntimeConfig::print_help();
        return;
    }

    init_tracing(config.json_logs);

    if let Err(err) = run(config) {
        error!(error = %err, "startup failed");
        std::process::exit(1);
    }
}

/// Everything runs on one cooperative scheduler: the cycle tick task,
/// the console loop, and the telemetry client tasks interleave on a
/// current-thread runtime, so the device is shared without locks.
pub fn run(config: RuntimeConfig) -> Result<(), RuntimeError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = tokio::task::LocalSet::new();

    local.block_on(&runtime, async move {
        let device = Rc::new(RefCell::new(Lathe::new(
            ThreadRandom,
            !config.start_disabled,
        )));
        let mut cycle = CycleDriver::new(Duration::from_millis(config.cycle_interval_ms));
        cycle.reconcile(&device);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let server_task = if config.server_enabled {
            let listener = TcpListener::bind(&config.bind_addr).await?;
            info!(addr = %listener.local_addr()?, "telemetry server listening");
            let server_config = ServerConfig {
                sample_interval: Duration::from_millis(config.sample_interval_ms),
            };
            Some(tokio::task::spawn_local(server::serve(
                listener,
                Rc::clone(&device),
                server_config,
                shutdown_rx,
            )))
        } else {
            info!("telemetry server disabled");
            None
        };

        let running = Rc::new(Cell::new(true));
        let actions = console::build_commands(Rc::clone(&device), Rc::clone(&running))?;
        let dispatcher = Dispatcher::new(actions, running)?;

        info!(status = %device.borrow().status(), "lathe ready");
        info!("press Ctrl-C or type stop to quit");

        console::run_console(&dispatcher, &device, &mut cycle).await;

        // Shutdown runs once: stop the cycle, then wait for the
        // telemetry server before returning.
        info!("shutting down...");
        cycle.stop();
        let _ = shutdown_tx.send(true);
        if let Some(task) = server_task {
            let _ = task.await;
        }
        info!("shut down");

        Ok(())
    })
}
