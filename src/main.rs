//! cellkit-demo: tabbed pages in a frame with a ticking clock.
//!
//! Tab or pagedown/pageup cycles pages, ctrl+l redraws, q quits.

use std::process::ExitCode;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use cellkit::config::settings::{ensure_settings_file, load_settings, settings_path, Settings};
use cellkit::ui::backend::terminal::TerminalBackend;
use cellkit::widgets::{bin, Boxed, Container, Label, Multiplex, WidgetExt, WidgetRef};
use cellkit::{Result, Runtime, RuntimeOptions};

const APP: &str = "cellkit";

const INTRO: &str = "cellkit demo

Tab / pagedown / pageup  switch pages
ctrl+l                  redraw
q                       quit";

fn main() -> ExitCode {
    let settings = load_demo_settings();
    let filter = settings.as_ref().and_then(|s| s.log_filter.clone());
    let _logging = cellkit::logging::init(APP, None, filter.as_deref());

    match run(settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "demo failed");
            eprintln!("cellkit-demo: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_demo_settings() -> Option<Settings> {
    let path = settings_path(APP)?;
    if let Err(err) = ensure_settings_file(&path) {
        eprintln!("cellkit-demo: cannot create {}: {err}", path.display());
    }
    match load_settings(&path) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("cellkit-demo: ignoring settings: {err}");
            None
        }
    }
}

fn run(settings: Option<Settings>) -> Result<()> {
    let backend = TerminalBackend::new()?;
    let restorer = backend.restorer();
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = restorer.restore();
        previous(info);
    }));

    let options = RuntimeOptions {
        settings,
        ..RuntimeOptions::default()
    };
    let mut rt = Runtime::init(backend, options)?;
    let result = build_and_run(&mut rt);
    // The surface must be handed back before the error is reported.
    let shutdown = rt.shutdown();
    result.and(shutdown)
}

fn build_and_run(rt: &mut Runtime) -> Result<()> {
    let bindings = rt.global_bindings();

    let pages = Multiplex::new(true);
    let clock = Label::new("");
    let intro: WidgetRef = bin::center(Label::new(INTRO));
    let titled: [(WidgetRef, &str); 3] = [
        (intro.clone(), "Intro"),
        (bin::center(clock.clone()), "Clock"),
        (bin::center(Label::new("Nothing to see here.")), "About"),
    ];
    for (page, title) in titled {
        pages.add_widget_titled(page.clone(), title);
        page.show_all();
    }
    pages.show_widget(&intro);

    let status = Label::new("q quits");
    status.set_style_name("Status");

    let layout = Boxed::vertical();
    layout.add_widget_opts(bin::frame(pages.clone()), true);
    layout.add_widget(status);

    let handle = rt.handle().clone();
    let _quit = layout.connect_key("Quit", &bindings, move || handle.exit_main());
    let _next = layout.connect_key_post("Cycle", &bindings, cycler(&pages, true));
    let _page_down = layout.connect_key_post("NextPage", &bindings, cycler(&pages, true));
    let _page_up = layout.connect_key_post("PrevPage", &bindings, cycler(&pages, false));

    let root: WidgetRef = layout;
    rt.set_root_widget(Some(root))?;
    schedule_clock(rt, clock, Instant::now())?;
    rt.mainloop()
}

fn cycler(pages: &Rc<Multiplex>, forward: bool) -> impl Fn() + 'static {
    let pages: Weak<Multiplex> = Rc::downgrade(pages);
    move || {
        if let Some(pages) = pages.upgrade() {
            if forward {
                pages.cycle_forward();
            } else {
                pages.cycle_backward();
            }
        }
    }
}

/// Updates the clock now and re-arms itself every second.
fn schedule_clock(rt: &mut Runtime, clock: Rc<Label>, started: Instant) -> Result<()> {
    let secs = started.elapsed().as_secs();
    clock.set_text(format!("Running for {:02}:{:02}", secs / 60, secs % 60));
    let tick = rt.local_event(move |rt| schedule_clock(rt, clock, started));
    rt.handle().add_timeout(Box::new(tick), Duration::from_secs(1))?;
    Ok(())
}
