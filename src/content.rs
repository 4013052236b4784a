/// Content-script lifecycle: one watcher per page injection
use crate::config::Config;
use crate::error::Error;
use crate::locator::TwitterLocator;
use crate::relay::RuntimeRelay;
use crate::watcher::ProfileWatcher;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

thread_local! {
    static WATCHER: RefCell<Option<ProfileWatcher>> = const { RefCell::new(None) };
}

/// Start watching; restarts cleanly if a watcher already exists
pub fn start(config: &Config) -> Result<(), Error> {
    stop();

    let window = web_sys::window().ok_or(Error::MissingGlobal("window"))?;
    let document = window.document().ok_or(Error::MissingGlobal("document"))?;

    let watcher = ProfileWatcher::new(
        document,
        Box::new(TwitterLocator),
        Rc::new(RuntimeRelay),
        config,
    )?;
    watcher.start()?;
    WATCHER.with(|slot| *slot.borrow_mut() = Some(watcher));

    Ok(())
}

pub fn stop() {
    if let Some(watcher) = WATCHER.with(|slot| slot.borrow_mut().take()) {
        watcher.dispose();
        log::debug!("Profile watcher disposed");
    }
}

fn is_running() -> bool {
    WATCHER.with(|slot| slot.borrow().is_some())
}

/// Dispose on `pagehide`; start again if the page comes back from the
/// back/forward cache.
pub fn install_lifecycle(config: Config) -> Result<(), Error> {
    let window = web_sys::window().ok_or(Error::MissingGlobal("window"))?;

    let on_hide = Closure::<dyn FnMut()>::new(stop);
    window.add_event_listener_with_callback("pagehide", on_hide.as_ref().unchecked_ref())?;
    on_hide.forget();

    let on_show = Closure::<dyn FnMut()>::new(move || {
        if !is_running() {
            if let Err(e) = start(&config) {
                log::warn!("Failed to restart profile watcher: {}", e);
            }
        }
    });
    window.add_event_listener_with_callback("pageshow", on_show.as_ref().unchecked_ref())?;
    on_show.forget();

    Ok(())
}
