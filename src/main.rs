use color_eyre::{eyre::eyre, Result};
use padcore::config::{Acquisition, InputConfig};
use padcore::input::lock::LogDisplay;
use padcore::input::port::RpiBinder;
use padcore::input::source::{
    ExternalSource, NullSource, OverrideSlot, PhysicalSource, RawStateSource,
};
use padcore::input::tick::MonotonicClock;
use padcore::input::InputCore;
use padcore::runtime::{spawn_stdin_feeder, OverrideTarget, PollerHandle};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

// Queued overrides waiting for a poll
const OVERRIDE_QUEUE_DEPTH: usize = 64;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = InputConfig::load_or_default(config_path.as_deref())
        .map_err(|e| eyre!("Failed to load configuration: {}", e))?;
    info!(
        "Configuration: {:?} acquisition, {} lines, {} ms poll, {} ms debounce",
        config.acquisition,
        config.lines.len(),
        config.poll_interval_ms,
        config.debounce_ms
    );

    let lines = config.line_table()?;
    let core = InputCore::create(
        lines.clone(),
        config.pipeline_settings(),
        Box::new(MonotonicClock::new(config.ticks_per_ms)),
        Box::new(LogDisplay),
    );

    // The queue sender lives until main returns so the slot never disconnects
    let (override_queue, slot) = if config.override_queue {
        let (queue, slot) = OverrideSlot::channel(OVERRIDE_QUEUE_DEPTH);
        (Some(queue), slot)
    } else {
        (None, OverrideSlot::disabled())
    };

    // Binding failures and port cache overflow abort startup here
    let (source, target): (Box<dyn RawStateSource>, Option<OverrideTarget>) =
        match config.acquisition {
            Acquisition::Physical => {
                let mut binder = RpiBinder::new()?;
                let source = PhysicalSource::bind(&lines, &mut binder, slot)?;
                (
                    Box::new(source) as Box<dyn RawStateSource>,
                    override_queue.clone().map(OverrideTarget::Queue),
                )
            }
            Acquisition::External => {
                let (source, handle) = ExternalSource::new(slot);
                (
                    Box::new(source) as Box<dyn RawStateSource>,
                    Some(OverrideTarget::External(handle)),
                )
            }
            Acquisition::None => (
                Box::new(NullSource::new(slot)) as Box<dyn RawStateSource>,
                override_queue.clone().map(OverrideTarget::Queue),
            ),
        };

    let shutdown = CancellationToken::new();
    let poller = PollerHandle::spawn(
        core.attach(source),
        Duration::from_millis(config.poll_interval_ms),
        shutdown.clone(),
    );

    if let Some(target) = target {
        let _feeder = spawn_stdin_feeder(target, shutdown.clone())?;
    }

    let mut states = poller.subscribe();
    let _watcher = tokio::spawn(async move {
        while states.changed().await.is_ok() {
            let state = *states.borrow();
            info!(
                "dpad: {:?} ls: ({:#04x},{:#04x}) rs: ({:#04x},{:#04x}) select/start/home: {}/{}/{}",
                state.dpad,
                state.left_stick_x,
                state.left_stick_y,
                state.right_stick_x,
                state.right_stick_y,
                state.button_select,
                state.button_start,
                state.button_home
            );
            debug!("Full state: {:?}", state);
        }
    });

    let ctrl_c = shutdown.clone();
    let _signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping poll loop");
            ctrl_c.cancel();
        }
    });

    let result = poller.join().await;
    shutdown.cancel();
    drop(override_queue);

    // Any poll error is a hardware fault; exit instead of emitting stale input
    result.map_err(|e| eyre!("Input pipeline halted: {}", e))?;
    info!("Shut down cleanly");
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    let level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|value| value.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
