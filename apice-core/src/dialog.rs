//! # Dialogs
//!
//! Modal dialogs sharing one surface, opened strictly one at a time.
//!
//! ## Overview
//!
//! A [`DialogHost`] owns the surface and a [`ModalScheduler`] keyed by
//! [`DialogId`]. Opening a dialog while another one is visible queues it;
//! closing the visible dialog runs the close transition, fires its close
//! listeners and then hands the surface to the next queued dialog, in the
//! order the dialogs were opened.
//!
//! Rendering and animation are delegated to a [`DialogSurface`]. The mask and
//! the dialog transitions run concurrently and are joined with a
//! [`JoinCoordinator`]; an open or close completes when both are done.
//!
//! ## Usage
//!
//! ```ignore
//! let host = DialogHost::new(Rc::new(BrowserSurface::new()), DialogConfig::default());
//!
//! let dialog = host.error("The upload failed");
//! dialog.add_button(ButtonSpec::close());
//! dialog.on_close(|| {
//!     tracing::info!("error acknowledged");
//!     Ok(())
//! });
//! dialog.open().wait().await?;
//! ```

use crate::config::DialogConfig;
use crate::error::{Error, Result};
use crate::id::prefixed_id;
use crate::join::JoinCoordinator;
use crate::modal::{ModalScheduler, Release};
use apice_async::{task, Completion};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, error, warn};

/// Visual flavour of a dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogStyle {
    Error,
    Warn,
    Info,
    Success,
}

impl DialogStyle {
    pub const ALL: [DialogStyle; 4] = [
        DialogStyle::Error,
        DialogStyle::Warn,
        DialogStyle::Info,
        DialogStyle::Success,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DialogStyle::Error => "error",
            DialogStyle::Warn => "warn",
            DialogStyle::Info => "info",
            DialogStyle::Success => "success",
        }
    }
}

impl fmt::Display for DialogStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DialogId(String);

impl DialogId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a dialog shows. A bare string converts into a spec with that body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogSpec {
    pub id: Option<String>,
    pub title: Option<String>,
    pub body: String,
}

impl DialogSpec {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl From<&str> for DialogSpec {
    fn from(body: &str) -> Self {
        Self::new(body)
    }
}

impl From<String> for DialogSpec {
    fn from(body: String) -> Self {
        Self::new(body)
    }
}

type ButtonAction = Rc<dyn Fn() -> bool>;

/// A footer button.
///
/// Pressing it runs the action (if any); the dialog then closes unless the
/// action returned `false` or the button was made [`ButtonSpec::keep_open`].
#[derive(Clone)]
pub struct ButtonSpec {
    label: String,
    closes: bool,
    action: Option<ButtonAction>,
}

impl ButtonSpec {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            closes: true,
            action: None,
        }
    }

    /// A plain "Close" button.
    pub fn close() -> Self {
        Self::new("Close")
    }

    pub fn with_action(mut self, action: impl Fn() -> bool + 'static) -> Self {
        self.action = Some(Rc::new(action));
        self
    }

    pub fn keep_open(mut self) -> Self {
        self.closes = false;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for ButtonSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonSpec")
            .field("label", &self.label)
            .field("closes", &self.closes)
            .field("action", &self.action.is_some())
            .finish()
    }
}

/// Everything a surface needs to render a dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogContent {
    pub id: DialogId,
    pub style: DialogStyle,
    pub title: String,
    pub body: String,
    pub buttons: Vec<String>,
}

/// Rendering collaborator for the dialog surface.
///
/// The host guarantees `render`/`show_mask`/`animate_open` are only called
/// while the surface is closed, and `hide_mask`/`animate_close` only while it
/// is open.
#[async_trait(?Send)]
pub trait DialogSurface {
    /// Writes header, body and footer for `content`.
    fn render(&self, content: &DialogContent);

    async fn show_mask(&self) -> Result<()>;

    async fn animate_open(&self, style: DialogStyle) -> Result<()>;

    async fn hide_mask(&self) -> Result<()>;

    async fn animate_close(&self) -> Result<()>;

    /// Empties header, body and footer once the close transition ended.
    fn clear(&self);
}

struct HostInner {
    surface: Rc<dyn DialogSurface>,
    config: DialogConfig,
    modal: ModalScheduler<DialogId>,
    visible: Cell<bool>,
}

/// Owner of one dialog surface.
#[derive(Clone)]
pub struct DialogHost {
    inner: Rc<HostInner>,
}

impl DialogHost {
    pub fn new(surface: Rc<dyn DialogSurface>, config: DialogConfig) -> Self {
        Self {
            inner: Rc::new(HostInner {
                surface,
                config,
                modal: ModalScheduler::new(),
                visible: Cell::new(false),
            }),
        }
    }

    pub fn error(&self, spec: impl Into<DialogSpec>) -> Dialog {
        self.create(DialogStyle::Error, spec)
    }

    pub fn warn(&self, spec: impl Into<DialogSpec>) -> Dialog {
        self.create(DialogStyle::Warn, spec)
    }

    pub fn info(&self, spec: impl Into<DialogSpec>) -> Dialog {
        self.create(DialogStyle::Info, spec)
    }

    pub fn success(&self, spec: impl Into<DialogSpec>) -> Dialog {
        self.create(DialogStyle::Success, spec)
    }

    pub fn create(&self, style: DialogStyle, spec: impl Into<DialogSpec>) -> Dialog {
        let spec = spec.into();
        let id = spec
            .id
            .unwrap_or_else(|| prefixed_id(&self.inner.config.id_prefix));

        Dialog {
            inner: Rc::new(DialogInner {
                id: DialogId::new(id),
                style,
                title: spec.title,
                body: spec.body,
                buttons: RefCell::new(Vec::new()),
                close_listeners: RefCell::new(Vec::new()),
                opening: RefCell::new(None),
                closing: Cell::new(false),
                host: Rc::clone(&self.inner),
            }),
        }
    }

    /// Dialog currently owning the surface.
    pub fn current(&self) -> Option<DialogId> {
        self.inner.modal.owner()
    }

    /// Dialogs waiting for the surface, next first.
    pub fn pending(&self) -> Vec<DialogId> {
        self.inner.modal.queued()
    }

    /// Whether the surface is shown (or transitioning in).
    pub fn is_visible(&self) -> bool {
        self.inner.visible.get()
    }

    pub fn config(&self) -> &DialogConfig {
        &self.inner.config
    }
}

impl fmt::Debug for DialogHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialogHost")
            .field("modal", &self.inner.modal)
            .field("visible", &self.inner.visible.get())
            .finish()
    }
}

type CloseListener = Rc<dyn Fn() -> Result<()>>;

struct DialogInner {
    id: DialogId,
    style: DialogStyle,
    title: Option<String>,
    body: String,
    buttons: RefCell<Vec<ButtonSpec>>,
    close_listeners: RefCell<Vec<CloseListener>>,
    opening: RefCell<Option<Completion<(), Error>>>,
    closing: Cell<bool>,
    host: Rc<HostInner>,
}

/// A dialog bound to a [`DialogHost`]. Clones refer to the same dialog.
#[derive(Clone)]
pub struct Dialog {
    inner: Rc<DialogInner>,
}

impl Dialog {
    pub fn id(&self) -> &DialogId {
        &self.inner.id
    }

    pub fn style(&self) -> DialogStyle {
        self.inner.style
    }

    /// Explicit title, or the host's default title for the style.
    pub fn title(&self) -> String {
        self.inner
            .title
            .clone()
            .unwrap_or_else(|| self.inner.host.config.title_for(self.inner.style).to_string())
    }

    pub fn body(&self) -> &str {
        &self.inner.body
    }

    pub fn add_button(&self, button: ButtonSpec) -> &Self {
        self.inner.buttons.borrow_mut().push(button);
        self
    }

    /// Adds a listener that runs after every close of this dialog.
    pub fn on_close(&self, listener: impl Fn() -> Result<()> + 'static) -> &Self {
        self.inner.close_listeners.borrow_mut().push(Rc::new(listener));
        self
    }

    pub fn is_open(&self) -> bool {
        self.inner.host.modal.is_owner(&self.inner.id)
    }

    pub fn is_queued(&self) -> bool {
        self.inner.host.modal.is_queued(&self.inner.id)
    }

    /// Opens the dialog, or queues it behind the dialog currently shown.
    ///
    /// The returned completion settles once the dialog is visible. It is
    /// already resolved when the dialog is the current one, and opening a
    /// dialog again while it is queued or transitioning in returns the same
    /// pending completion. A dialog that is closed while still queued never
    /// becomes visible, and its completion stays pending.
    pub fn open(&self) -> Completion<(), Error> {
        let pending = self
            .inner
            .opening
            .borrow()
            .as_ref()
            .filter(|opening| opening.is_pending())
            .cloned();
        if let Some(opening) = pending {
            debug!(target: "apice::dialog", id = %self.inner.id, "Dialog is already being opened");
            return opening;
        }

        let host = &self.inner.host;
        if host.modal.is_owner(&self.inner.id) {
            debug!(target: "apice::dialog", id = %self.inner.id, "Dialog is already opened");
            return Completion::resolved(());
        }

        let grant = host.modal.acquire(self.inner.id.clone());
        if !grant.is_granted() {
            debug!(
                target: "apice::dialog",
                id = %self.inner.id,
                "Another dialog is opened; dialog queued"
            );
        }

        let opened = Completion::new();
        *self.inner.opening.borrow_mut() = Some(opened.clone());

        let settled = opened.clone();
        let dialog = self.clone();
        task::spawn_local(async move {
            grant.wait().await;
            debug!(target: "apice::dialog", id = %dialog.inner.id, "Opening dialog");
            settled.settle(dialog.show().await);
        });
        opened
    }

    /// Closes the dialog.
    ///
    /// For the current dialog this hides the surface, fires the close
    /// listeners and hands the surface to the next queued dialog. A queued
    /// dialog is only removed from the queue. The completion carries the
    /// close transition's error, if any; the surface is handed over either way.
    pub fn close(&self) -> Completion<(), Error> {
        let host = &self.inner.host;
        if !host.modal.is_owner(&self.inner.id) {
            match host.modal.release(&self.inner.id) {
                Release::Withdrawn => {
                    self.inner.opening.borrow_mut().take();
                    debug!(
                        target: "apice::dialog",
                        id = %self.inner.id,
                        "Dialog is not opened; removed from the queue"
                    )
                }
                _ => warn!(
                    target: "apice::dialog",
                    id = %self.inner.id,
                    "Dialog is neither opened nor queued"
                ),
            }
            return Completion::resolved(());
        }

        if self.inner.closing.replace(true) {
            debug!(target: "apice::dialog", id = %self.inner.id, "Dialog is already closing");
            return Completion::resolved(());
        }

        debug!(target: "apice::dialog", id = %self.inner.id, "Closing dialog");
        let closed = Completion::new();
        let settled = closed.clone();
        let dialog = self.clone();
        task::spawn_local(async move {
            let result = dialog.hide().await;
            if let Err(e) = &result {
                error!(target: "apice::dialog", id = %dialog.inner.id, error = %e, "Close transition failed");
            }
            dialog.fire_close_listeners();
            dialog.inner.closing.set(false);

            match dialog.inner.host.modal.release(&dialog.inner.id) {
                Release::Released { next: Some(next) } => debug!(
                    target: "apice::dialog",
                    next = %next,
                    "Opening the next dialog from the queue"
                ),
                _ => debug!(target: "apice::dialog", "No more dialogs in the queue"),
            }
            settled.settle(result);
        });
        closed
    }

    /// Presses the footer button at `index`.
    ///
    /// Returns the close completion when the press closed the dialog.
    pub fn press(&self, index: usize) -> Option<Completion<(), Error>> {
        let button = self.inner.buttons.borrow().get(index).cloned()?;
        let proceed = button.action.as_ref().map_or(true, |action| action());
        if proceed && button.closes {
            Some(self.close())
        } else {
            None
        }
    }

    fn content(&self) -> DialogContent {
        DialogContent {
            id: self.inner.id.clone(),
            style: self.inner.style,
            title: self.title(),
            body: self.inner.body.clone(),
            buttons: self
                .inner
                .buttons
                .borrow()
                .iter()
                .map(|b| b.label.clone())
                .collect(),
        }
    }

    async fn show(&self) -> Result<()> {
        let host = &self.inner.host;
        if host.visible.replace(true) {
            debug!(target: "apice::dialog", "Dialog container is already visible");
            return Ok(());
        }

        host.surface.render(&self.content());

        let transitions = JoinCoordinator::<Error>::new();
        let surface = Rc::clone(&host.surface);
        let mask = transitions.bind(Some(async move { surface.show_mask().await }));
        let surface = Rc::clone(&host.surface);
        let style = self.inner.style;
        let dialog = transitions.bind(Some(async move { surface.animate_open(style).await }));
        settle_transitions(&transitions, [mask, dialog]).await
    }

    async fn hide(&self) -> Result<()> {
        let host = &self.inner.host;
        if !host.visible.replace(false) {
            debug!(target: "apice::dialog", "Dialog container is already closed");
            return Ok(());
        }

        let transitions = JoinCoordinator::<Error>::new();
        let surface = Rc::clone(&host.surface);
        let mask = transitions.bind(Some(async move { surface.hide_mask().await }));
        let surface = Rc::clone(&host.surface);
        let dialog = transitions.bind(Some(async move {
            let result = surface.animate_close().await;
            surface.clear();
            result
        }));
        settle_transitions(&transitions, [mask, dialog]).await
    }

    fn fire_close_listeners(&self) {
        let listeners: Vec<CloseListener> = self.inner.close_listeners.borrow().clone();
        for listener in listeners {
            if let Err(e) = listener() {
                error!(
                    target: "apice::dialog",
                    id = %self.inner.id,
                    error = %e,
                    "Close listener failed"
                );
            }
        }
    }
}

/// Waits for every transition to finish, then reports the first failure.
///
/// The aggregate alone rejects as soon as one transition fails, while the
/// other may still be running on the surface.
async fn settle_transitions(
    transitions: &JoinCoordinator<Error>,
    handles: [Option<Completion<(), Error>>; 2],
) -> Result<()> {
    for handle in handles.into_iter().flatten() {
        let _ = handle.wait().await;
    }
    transitions.wait().await
}

impl fmt::Debug for Dialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialog")
            .field("id", &self.inner.id)
            .field("style", &self.inner.style)
            .field("title", &self.inner.title)
            .field("buttons", &self.inner.buttons.borrow())
            .finish()
    }
}
