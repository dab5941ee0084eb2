//! Join coordination and dialog queue demonstration
//!
//! Binds three delayed operations (one of them failing) to a join
//! coordinator, then opens four dialogs at once on a console surface and
//! dismisses them one by one.
//!
//! Run with:
//! ```bash
//! # Pretty format (default in debug)
//! cargo run --example dialog_demo
//!
//! # JSON format, with the scheduler internals
//! cargo run --example dialog_demo -- json "info,apice::modal=debug"
//! ```

use apice_async::time::{sleep, Duration};
use apice_core::dialog::{DialogContent, DialogSurface};
use apice_core::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
use apice_core::{
    ButtonSpec, Dialog, DialogConfig, DialogHost, DialogSpec, DialogStyle, JoinCoordinator, Result,
};
use async_trait::async_trait;
use std::env;
use std::rc::Rc;
use tracing::info;

const ANIMATION: Duration = Duration::from_millis(150);

/// Prints what a browser surface would draw.
struct ConsoleSurface;

#[async_trait(?Send)]
impl DialogSurface for ConsoleSurface {
    fn render(&self, content: &DialogContent) {
        info!(
            id = %content.id,
            style = %content.style,
            title = %content.title,
            body = %content.body,
            buttons = ?content.buttons,
            "Render dialog"
        );
    }

    async fn show_mask(&self) -> Result<()> {
        sleep(ANIMATION).await;
        info!("Mask shown");
        Ok(())
    }

    async fn animate_open(&self, style: DialogStyle) -> Result<()> {
        sleep(ANIMATION * 2).await;
        info!(%style, "Dialog animated in");
        Ok(())
    }

    async fn hide_mask(&self) -> Result<()> {
        sleep(ANIMATION).await;
        info!("Mask hidden");
        Ok(())
    }

    async fn animate_close(&self) -> Result<()> {
        sleep(ANIMATION * 2).await;
        info!("Dialog animated out");
        Ok(())
    }

    fn clear(&self) {
        info!("Surface cleared");
    }
}

async fn join_demo() {
    info!("=== Join coordinator ===");
    let join = JoinCoordinator::<String>::new();
    join.then(|| info!("All bound operations resolved"));
    let aggregate = join.catch(|cause| info!(%cause, "A bound operation failed"));

    for (index, delay, outcome) in [
        (1, 100, Ok(())),
        (2, 200, Err("xxx".to_string())),
        (3, 300, Ok(())),
    ] {
        let derived = join.bind(Some(async move {
            sleep(Duration::from_millis(delay)).await;
            info!(index, "Operation settled");
            outcome
        }));
        if let Some(derived) = derived {
            derived.then(move |()| info!(index, "Wait resolved"));
            derived.catch(move |cause| info!(index, %cause, "Wait failed"));
        }
    }

    // Nothing to bind: logs a warning and leaves the counters alone
    join.bind(None::<std::future::Ready<std::result::Result<(), String>>>);

    if aggregate.await.is_ok() {
        info!(
            bound = join.bound(),
            resolved = join.resolved(),
            failed = join.failed(),
            "Join settled"
        );
    }
    sleep(Duration::from_millis(250)).await;
}

fn create_dialog(host: &DialogHost, style: DialogStyle, id: &str, body: &str) -> Dialog {
    let dialog = host.create(style, DialogSpec::new(body).with_id(id));

    let pressed = id.to_string();
    dialog
        .add_button(ButtonSpec::close())
        .add_button(ButtonSpec::new("Ok").with_action(move || {
            info!(id = %pressed, "The Ok button has been pressed");
            true
        }));

    let closed = id.to_string();
    dialog.on_close(move || {
        info!(id = %closed, "Close event");
        Ok(())
    });

    let opened = id.to_string();
    dialog
        .open()
        .then(move |()| info!(id = %opened, "Open completion resolved"));
    dialog
}

async fn dialog_demo() -> Result<()> {
    info!("=== Dialog queue ===");
    let host = DialogHost::new(Rc::new(ConsoleSurface), DialogConfig::default());

    let dialogs = [
        create_dialog(&host, DialogStyle::Error, "dialog1", "This is the dialog 1"),
        create_dialog(&host, DialogStyle::Warn, "dialog2", "This is the dialog 2"),
        create_dialog(&host, DialogStyle::Info, "dialog3", "This is the dialog 3"),
        create_dialog(&host, DialogStyle::Success, "dialog4", "This is the dialog 4"),
    ];
    info!(current = ?host.current(), pending = ?host.pending(), "Dialogs requested");

    for dialog in &dialogs {
        dialog.open().wait().await?;
        sleep(Duration::from_millis(500)).await;

        // Alternate between the "Close" and "Ok" buttons
        let button = if host.pending().len() % 2 == 0 { 1 } else { 0 };
        if let Some(closed) = dialog.press(button) {
            closed.wait().await?;
        }
    }

    info!("All dialogs closed");
    Ok(())
}

#[apice_async::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let format = match args.get(1).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        Some("pretty") => LogFormat::Pretty,
        _ => LogFormat::default(),
    };

    let mut config = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Info)
        .with_spans(false);
    if let Some(filter) = args.get(2) {
        config = config.with_filter(filter.clone());
    }
    init_logging(config)?;

    join_demo().await;
    dialog_demo().await
}
