//! Runtime context: the event queue, the dispatcher and the background
//! services that feed it.
//!
//! `Runtime` lives on the main thread and owns the widget tree's root, the
//! rendering backend and the keybinding/style tables. `Handle` is its
//! thread-safe face: any thread can post events, request updates, add
//! timeouts or ask the main loop to exit through it.

pub mod input;
pub mod signals;
pub mod timeout;
pub mod updates;
pub mod wakeup;

use std::io;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::config::keybindings::Keybindings;
use crate::config::settings::Settings;
use crate::config::styles::Styles;
use crate::error::{Error, Result};
use crate::event::{from_fn, BoxedEvent, EventQueue, LocalEvent, LocalKey};
use crate::sync::{ReentrantGuard, ReentrantLock};
use crate::thread::Thread;
use crate::ui::backend::Backend;
use crate::ui::core::canvas::Canvas;
use crate::ui::core::geom::{Pos, Rect};
use crate::ui::core::input::{InputEvent, Key, KeyEventKind};
use crate::ui::core::painter::Painter;
use crate::widgets::core::{Widget, WidgetExt, WidgetRef};

pub use input::{FdReadiness, ReadOutcome, Readiness};
pub use timeout::{TimeoutId, TimeoutScheduler};
pub use updates::{PendingUpdates, UpdateFlags};

pub const GLOBAL_SCOPE: &str = "global";

struct Shared {
    queue: EventQueue<BoxedEvent>,
    updates: PendingUpdates,
    timeouts: TimeoutScheduler,
    global: ReentrantLock,
    exit: AtomicBool,
    suspend_count: AtomicU64,
}

/// Thread-safe access to a runtime.
#[derive(Clone)]
pub struct Handle {
    shared: Arc<Shared>,
}

impl Handle {
    pub(crate) fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: EventQueue::new(),
                updates: PendingUpdates::new(),
                timeouts: TimeoutScheduler::new(),
                global: ReentrantLock::new(),
                exit: AtomicBool::new(false),
                suspend_count: AtomicU64::new(0),
            }),
        }
    }

    pub fn post_event(&self, event: BoxedEvent) {
        self.shared.queue.put(event);
    }

    pub fn post_fn<F>(&self, f: F)
    where
        F: FnOnce(&mut Runtime) -> Result<()> + Send + 'static,
    {
        self.post_event(from_fn(f));
    }

    pub fn request_relayout(&self) {
        self.request(UpdateFlags::RELAYOUT);
    }

    pub fn request_redraw(&self) {
        self.request(UpdateFlags::REDRAW);
    }

    pub fn request_cursor_update(&self) {
        self.request(UpdateFlags::CURSOR);
    }

    /// Merges `flags` into the pending updates; the first request since the
    /// last apply posts the apply event.
    pub fn request(&self, flags: UpdateFlags) {
        if self.shared.updates.request(flags) {
            self.post_fn(|rt| rt.apply_updates());
        }
    }

    pub fn add_timeout(&self, event: BoxedEvent, delay: Duration) -> Result<TimeoutId> {
        self.shared.timeouts.add(event, delay)
    }

    pub fn remove_timeout(&self, id: TimeoutId) -> bool {
        self.shared.timeouts.remove(id)
    }

    /// Makes `mainloop` return once the events already queued are handled.
    pub fn exit_main(&self) {
        self.shared.exit.store(true, Ordering::Release);
        // Wakes a dispatcher blocked on the empty queue.
        self.post_fn(|_| Ok(()));
    }

    /// Excludes the dispatcher while the guard lives.
    pub fn lock(&self) -> ReentrantGuard<'_> {
        self.shared.global.acquire()
    }

    pub fn pending_events(&self) -> usize {
        self.shared.queue.len()
    }

    pub fn suspend_count(&self) -> u64 {
        self.shared.suspend_count.load(Ordering::Acquire)
    }

    fn exit_requested(&self) -> bool {
        self.shared.exit.load(Ordering::Acquire)
    }
}

/// Produces the input thread's readiness source; called again on resume.
pub type ReadinessFactory = Box<dyn FnMut() -> Box<dyn Readiness>>;

type LocalFn = Box<dyn FnOnce(&mut Runtime) -> Result<()>>;
type MainHook = Box<dyn FnMut(&mut Runtime)>;

pub struct RuntimeOptions {
    /// Source for the input thread; `None` runs without one.
    pub input: Option<ReadinessFactory>,
    /// Relay SIGWINCH and termination signals.
    pub signals: bool,
    pub settings: Option<Settings>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            input: Some(Box::new(|| Box::new(FdReadiness::stdin()))),
            signals: true,
            settings: None,
        }
    }
}

impl RuntimeOptions {
    /// No background input or signal thread; input is read with
    /// `Runtime::read_input`.
    pub fn headless() -> Self {
        Self {
            input: None,
            signals: false,
            settings: None,
        }
    }
}

pub struct Runtime {
    handle: Handle,
    backend: Box<dyn Backend>,
    root: Option<WidgetRef>,
    global_bindings: Rc<Keybindings>,
    scopes: FxHashMap<String, Rc<Keybindings>>,
    styles: Styles,
    locals: SlotMap<LocalKey, LocalFn>,
    hooks: Vec<MainHook>,
    readiness: Option<ReadinessFactory>,
    input: Option<input::InputThread>,
    signals: Option<Thread>,
    suspended: bool,
    shut_down: bool,
}

impl Runtime {
    /// Takes over `backend`, installs the default keybindings and styles and
    /// starts the background services.
    pub fn init(backend: impl Backend + 'static, options: RuntimeOptions) -> Result<Self> {
        let global_bindings = Rc::new(Keybindings::with_defaults());
        let mut scopes = FxHashMap::default();
        scopes.insert(GLOBAL_SCOPE.to_string(), Rc::clone(&global_bindings));
        let mut rt = Self {
            handle: Handle::new(),
            backend: Box::new(backend),
            root: None,
            global_bindings,
            scopes,
            styles: Styles::with_defaults(),
            locals: SlotMap::with_key(),
            hooks: Vec::new(),
            readiness: options.input,
            input: None,
            signals: None,
            suspended: false,
            shut_down: false,
        };
        if let Some(settings) = &options.settings {
            rt.apply_settings(settings);
        }

        let poster = rt.handle.clone();
        rt.handle
            .shared
            .timeouts
            .start(move |event| poster.post_event(event))?;
        if options.signals {
            rt.signals = Some(signals::spawn(rt.handle.clone())?);
        }
        rt.start_input()?;
        tracing::info!(
            size = ?rt.backend.size(),
            input = rt.input.is_some(),
            signals = rt.signals.is_some(),
            "runtime initialised"
        );
        Ok(rt)
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    pub fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub fn backend_mut(&mut self) -> &mut dyn Backend {
        self.backend.as_mut()
    }

    pub fn root(&self) -> Option<WidgetRef> {
        self.root.clone()
    }

    pub fn global_bindings(&self) -> Rc<Keybindings> {
        Rc::clone(&self.global_bindings)
    }

    /// Named keybinding scope, created as a child of the global scope on
    /// first use.
    pub fn bindings_scope(&mut self, name: &str) -> Rc<Keybindings> {
        let global = &self.global_bindings;
        Rc::clone(
            self.scopes
                .entry(name.to_string())
                .or_insert_with(|| Rc::new(Keybindings::new(Some(Rc::clone(global))))),
        )
    }

    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    /// Applies keybinding and style overrides. Rules for scopes that do not
    /// exist yet are skipped, so create scopes first.
    pub fn apply_settings(&mut self, settings: &Settings) {
        let scopes = &self.scopes;
        settings.apply(|name| scopes.get(name).cloned(), &mut self.styles);
    }

    pub fn suspend_count(&self) -> u64 {
        self.handle.suspend_count()
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Installs `root` as the single top of the tree and returns the previous
    /// one, unfocused and detached but not destroyed.
    pub fn set_root_widget(&mut self, root: Option<WidgetRef>) -> Result<Option<WidgetRef>> {
        let old = std::mem::replace(&mut self.root, root.clone());
        if let Some(old) = &old {
            old.unfocus();
            old.core().set_toplevel(None);
        }
        if let Some(root) = &root {
            root.core().set_toplevel(Some(self.handle.clone()));
            root.alloc_size(self.full_area());
            root.show_all();
            root.focus();
        }
        self.redraw()?;
        Ok(old)
    }

    /// Dispatches events until `Handle::exit_main` is called or the root is
    /// removed. An error from an event ends the loop and is returned; the
    /// caller should then `shutdown` before reporting it.
    pub fn mainloop(&mut self) -> Result<()> {
        tracing::debug!("entering main loop");
        let result = self.run_loop();
        self.handle.shared.exit.store(false, Ordering::Release);
        tracing::debug!(ok = result.is_ok(), "left main loop");
        result
    }

    fn run_loop(&mut self) -> Result<()> {
        while !self.handle.exit_requested() && self.root.is_some() {
            let event = self.handle.shared.queue.get();
            self.dispatch(event)?;
            self.drain()?;
            self.run_main_hooks();
        }
        Ok(())
    }

    /// Dispatches whatever is queued without blocking; returns how many
    /// events ran.
    pub fn poll(&mut self) -> Result<usize> {
        let count = self.drain()?;
        self.run_main_hooks();
        Ok(count)
    }

    fn drain(&mut self) -> Result<usize> {
        let mut count = 0;
        while let Some(event) = self.handle.shared.queue.try_get() {
            self.dispatch(event)?;
            count += 1;
        }
        Ok(count)
    }

    fn dispatch(&mut self, event: BoxedEvent) -> Result<()> {
        let shared = Arc::clone(&self.handle.shared);
        let _guard = shared.global.acquire();
        event.dispatch(self)
    }

    /// Runs `hook` after every main loop turn and every `poll`.
    pub fn on_main_hook(&mut self, hook: impl FnMut(&mut Runtime) + 'static) {
        self.hooks.push(Box::new(hook));
    }

    fn run_main_hooks(&mut self) {
        let mut hooks = std::mem::take(&mut self.hooks);
        for hook in &mut hooks {
            hook(self);
        }
        hooks.append(&mut self.hooks);
        self.hooks = hooks;
    }

    /// Parks a main-thread closure and returns a `Send` event that runs it
    /// once when dispatched.
    pub fn local_event(&mut self, f: impl FnOnce(&mut Runtime) -> Result<()> + 'static) -> LocalEvent {
        LocalEvent {
            key: self.locals.insert(Box::new(f)),
        }
    }

    /// Drops a parked closure that will never be dispatched.
    pub fn forget_local(&mut self, event: LocalEvent) -> bool {
        self.locals.remove(event.key).is_some()
    }

    pub(crate) fn run_local(&mut self, key: LocalKey) -> Result<()> {
        match self.locals.remove(key) {
            Some(f) => f(self),
            None => Ok(()),
        }
    }

    /// Applies the pending updates: at most one relayout, one paint and one
    /// cursor pass, in that order.
    pub(crate) fn apply_updates(&mut self) -> Result<()> {
        let flags = self.handle.shared.updates.take();
        if flags.is_empty() || self.suspended {
            return Ok(());
        }
        tracing::trace!(?flags, "applying updates");
        if flags.relayout {
            self.relayout();
        }
        if flags.redraw {
            self.repaint();
        }
        if flags.cursor {
            self.update_cursor();
        }
        self.backend.flush()?;
        Ok(())
    }

    /// Repaints every cell of the surface.
    pub fn redraw(&mut self) -> Result<()> {
        if self.suspended {
            return Ok(());
        }
        self.backend.clear()?;
        self.relayout();
        self.repaint();
        self.update_cursor();
        self.backend.flush()?;
        Ok(())
    }

    fn full_area(&self) -> Rect {
        Rect::from_size(self.backend.size())
    }

    fn relayout(&mut self) {
        if let Some(root) = self.root.clone() {
            root.alloc_size(self.full_area());
        }
    }

    fn repaint(&mut self) {
        let area = self.full_area();
        let mut painter = Painter::new();
        {
            let base = self.styles.get("Default");
            let mut canvas = Canvas::with_styles(&mut painter, area, &self.styles);
            canvas.erase(base);
            if let Some(root) = self.root.as_ref().filter(|r| r.is_visible()) {
                root.display(&mut canvas, base);
            }
        }
        self.backend.draw(painter.cmds());
    }

    fn update_cursor(&mut self) {
        let pos = self.cursor_position();
        self.backend.set_cursor(pos);
    }

    /// Re-reads the surface size, reallocates the root and redraws.
    pub fn handle_resize(&mut self) -> Result<()> {
        if self.suspended {
            return Ok(());
        }
        let size = self.backend.refresh_size()?;
        tracing::debug!(?size, "surface resized");
        self.redraw()
    }

    /// Reads and dispatches every input event the backend has available.
    /// Called by the input thread's event; embedders running without the
    /// thread call it themselves.
    pub fn read_input(&mut self) -> Result<ReadOutcome> {
        let mut consumed = false;
        loop {
            match self.backend.read_input() {
                Ok(Some(event)) => {
                    consumed = true;
                    self.dispatch_input(event)?;
                }
                Ok(None) => break,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                    consumed = true;
                    break;
                }
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(err) => {
                    tracing::warn!(error = %err, "reading input failed");
                    if !consumed {
                        return Ok(ReadOutcome::Eof {
                            errno: err.raw_os_error(),
                        });
                    }
                    break;
                }
            }
        }
        Ok(if consumed {
            ReadOutcome::Consumed
        } else {
            ReadOutcome::Eof { errno: None }
        })
    }

    /// Routes one input event: resizes relayout, the "Refresh" action redraws,
    /// keys go to the root and mouse events are translated into its frame.
    pub fn dispatch_input(&mut self, event: InputEvent) -> Result<()> {
        match event {
            InputEvent::Resize(..) => self.handle_resize(),
            InputEvent::Key(key_event) => {
                if key_event.kind == KeyEventKind::Release {
                    return Ok(());
                }
                self.dispatch_key(Key::from(key_event))
            }
            InputEvent::Paste(text) => {
                for ch in text.chars() {
                    self.dispatch_key(Key::char(ch))?;
                }
                Ok(())
            }
            InputEvent::Mouse(mouse) => {
                if let Some(root) = self.root.clone().filter(|r| r.is_visible()) {
                    let origin = root.geometry().origin();
                    if let Some(mouse) = mouse.translated(origin.x, origin.y) {
                        root.dispatch_mouse(mouse);
                    }
                }
                Ok(())
            }
            InputEvent::FocusGained | InputEvent::FocusLost => Ok(()),
        }
    }

    fn dispatch_key(&mut self, key: Key) -> Result<()> {
        if self.global_bindings.key_matches(&key, "Refresh") {
            return self.redraw();
        }
        if let Some(root) = self.root.clone().filter(|r| r.is_visible()) {
            let handled = root.dispatch_key(&key);
            tracing::trace!(%key, handled, "key dispatched");
        }
        Ok(())
    }

    /// Hands the surface back, e.g. to run a subprocess. The input thread is
    /// stopped; input events queued before this are discarded.
    pub fn suspend(&mut self) -> Result<()> {
        if self.suspended {
            return Ok(());
        }
        self.stop_input()?;
        let count = self.handle.shared.suspend_count.fetch_add(1, Ordering::AcqRel) + 1;
        self.suspended = true;
        self.backend.suspend()?;
        tracing::info!(count, "runtime suspended");
        Ok(())
    }

    /// Takes the surface back and redraws it.
    pub fn resume(&mut self) -> Result<()> {
        if !self.suspended {
            return Ok(());
        }
        self.backend.resume()?;
        self.suspended = false;
        self.backend.refresh_size()?;
        self.start_input()?;
        tracing::info!("runtime resumed");
        self.redraw()
    }

    /// Destroys the root, hands the surface back, stops every background
    /// thread and discards queued events and timeouts. Later calls do
    /// nothing. The first failure is returned after every step has run.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.shut_down {
            return Ok(());
        }
        self.shut_down = true;
        if let Some(root) = self.root.take() {
            root.unfocus();
            root.core().set_toplevel(None);
            root.destroy();
        }
        let mut first_err: Option<Error> = None;
        let mut record = |result: Result<()>| {
            if let Err(err) = result {
                tracing::warn!(error = %err, "shutdown step failed");
                first_err.get_or_insert(err);
            }
        };
        record(self.suspend());
        record(self.stop_services());
        let discarded = self.handle.shared.queue.clear();
        self.handle.shared.timeouts.clear();
        self.locals.clear();
        self.hooks.clear();
        tracing::info!(discarded, "runtime shut down");
        first_err.map_or(Ok(()), Err)
    }

    fn start_input(&mut self) -> Result<()> {
        if self.input.is_some() {
            return Ok(());
        }
        if let Some(factory) = self.readiness.as_mut() {
            self.input = Some(input::InputThread::spawn(self.handle.clone(), factory())?);
        }
        Ok(())
    }

    fn stop_input(&mut self) -> Result<()> {
        match self.input.take() {
            Some(thread) => thread.stop(),
            None => Ok(()),
        }
    }

    fn stop_services(&mut self) -> Result<()> {
        let input = self.stop_input();
        let signals = match self.signals.take() {
            Some(thread) => thread.cancel_and_join(),
            None => Ok(()),
        };
        let timeouts = self.handle.shared.timeouts.stop();
        input.and(signals).and(timeouts)
    }

    /// Where the focused widget wants the cursor, in surface coordinates.
    pub fn cursor_position(&self) -> Option<Pos> {
        self.root
            .as_ref()
            .filter(|r| r.is_visible() && r.cursor_visible())
            .map(|r| r.geometry().origin().offset(r.cursor_loc()))
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if let Err(err) = self.stop_services() {
            tracing::warn!(error = %err, "stopping runtime services failed");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/runtime.rs"]
mod tests;
