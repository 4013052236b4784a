/// Profile-page watcher for the content script.
///
/// Observes the host page with a `MutationObserver`, works out which profile
/// is on screen, asks the relay for its screen-name history and renders a
/// single "Previously:" panel under the profile name.
use crate::config::Config;
use crate::error::Error;
use crate::history::{PastScreenName, past_screen_names};
use crate::locator::{ProfileIdentity, ProfileLocator, StyleClasses, screen_name_from_path};
use crate::model::{Account, LookupResult};
use crate::protocol::LookupRequest;
use crate::relay::LookupTransport;
use std::cell::RefCell;
use std::rc::Rc;
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, MutationObserver, MutationObserverInit, MutationRecord, NodeList};

pub const PANEL_ID: &str = "memory-lol";
const PANEL_LABEL: &str = "Previously: ";
const SEPARATOR: &str = " | ";
const HIDDEN_STYLE: &str = "display: none;";

/// An outstanding lookup, tied to the navigation that issued it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    generation: u64,
    pub request: LookupRequest,
    pub screen_name: String,
}

/// Decides when a lookup starts and whether its answer is still wanted.
///
/// Every navigation bumps the generation; a ticket is only accepted while its
/// generation is the latest one.
#[derive(Debug, Default)]
pub struct NavigationTracker {
    current_url: Option<String>,
    generation: u64,
    // Whether the current URL was looked up by account id
    by_id: bool,
}

impl NavigationTracker {
    pub fn new() -> NavigationTracker {
        NavigationTracker::default()
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    /// Start a lookup for `identity` unless `url` is already being shown.
    ///
    /// A visible handle can be read before the page metadata arrives. When the
    /// metadata does arrive on the same URL, its id replaces the screen-name
    /// lookup and the earlier ticket stops being accepted.
    pub fn begin(&mut self, url: &str, identity: ProfileIdentity) -> Option<LookupTicket> {
        if self.current_url() == Some(url) && (self.by_id || identity.id.is_none()) {
            return None;
        }

        let request = match identity.id {
            Some(id) => LookupRequest::by_id(id),
            None => LookupRequest::by_screen_name(&identity.screen_name).ok()?,
        };

        self.generation += 1;
        self.current_url = Some(url.to_string());
        self.by_id = identity.id.is_some();

        Some(LookupTicket {
            generation: self.generation,
            request,
            screen_name: identity.screen_name,
        })
    }

    /// The metadata went away. Returns `true` if this was a real navigation.
    ///
    /// Firefox removes and re-adds the metadata on the same URL; that is not
    /// a navigation and leaves the current lookup alone.
    pub fn invalidate(&mut self, url: &str) -> bool {
        if self.current_url() == Some(url) {
            false
        } else {
            self.reset();
            true
        }
    }

    pub fn reset(&mut self) {
        self.current_url = None;
        self.by_id = false;
        self.generation += 1;
    }

    pub fn accepts(&self, ticket: &LookupTicket) -> bool {
        ticket.generation == self.generation
    }
}

/// The account a lookup answer describes.
///
/// A screen name can have been used by several accounts; the one still using
/// it wins over one that used it in the past.
pub fn select_account<'a>(result: &'a LookupResult, screen_name: &str) -> Option<&'a Account> {
    let entries = result.entries();

    entries
        .iter()
        .find(|(_, account)| account.is_latest_screen_name(screen_name))
        .or_else(|| {
            entries
                .iter()
                .find(|(_, account)| account.has_screen_name(screen_name))
        })
        .or_else(|| entries.first())
        .map(|(_, account)| *account)
}

/// Names to show for `ticket` given the relay's raw JSON body
pub fn resolve_past_names(ticket: &LookupTicket, body: &str) -> Result<Vec<PastScreenName>, Error> {
    let result = LookupResult::from_json(body)?;

    Ok(select_account(&result, &ticket.screen_name)
        .map(|account| past_screen_names(&account.screen_names, &ticket.screen_name))
        .unwrap_or_default())
}

/// The single injected element
struct Panel {
    document: Document,
    container: Element,
    label: Element,
}

impl Panel {
    fn new(document: &Document) -> Result<Panel, Error> {
        let container = document.create_element("div")?;
        container.set_id(PANEL_ID);
        container.set_attribute("style", HIDDEN_STYLE)?;

        let label = document.create_element("span")?;
        label.set_text_content(Some(PANEL_LABEL));
        container.append_child(&label)?;

        Ok(Panel {
            document: document.clone(),
            container,
            label,
        })
    }

    /// Back to the bare label, hidden
    fn reset(&self) -> Result<(), Error> {
        self.container.set_text_content(None);
        self.container.append_child(&self.label)?;
        self.container.set_attribute("style", HIDDEN_STYLE)?;
        Ok(())
    }

    fn apply_styles(&self, styles: &StyleClasses) -> Result<(), Error> {
        if let Some(class) = &styles.container {
            self.container.set_attribute("class", class)?;
        }
        Ok(())
    }

    fn attach_after(&self, anchor: &Element) -> Result<(), Error> {
        let next = anchor.next_sibling();
        if self.container.is_same_node(next.as_ref()) {
            return Ok(());
        }

        if let Some(parent) = anchor.parent_node() {
            parent.insert_before(&self.container, next.as_ref())?;
        }
        Ok(())
    }

    fn render(
        &self,
        names: &[PastScreenName],
        styles: Option<&StyleClasses>,
        archive_base: &Url,
    ) -> Result<(), Error> {
        self.reset()?;

        if names.is_empty() {
            return Ok(());
        }

        for (index, name) in names.iter().enumerate() {
            let link = self.document.create_element("a")?;
            if let Some(class) = styles.and_then(|styles| styles.link.as_deref()) {
                link.set_attribute("class", class)?;
            }
            link.set_attribute("href", &name.archive_link(archive_base))?;
            if let Some(title) = name.title() {
                link.set_attribute("title", &title)?;
            }
            link.set_text_content(Some(&name.label()));
            self.container.append_child(&link)?;

            if index + 1 < names.len() {
                let separator = self.document.create_element("span")?;
                if let Some(class) = styles.and_then(|styles| styles.separator.as_deref()) {
                    separator.set_attribute("class", class)?;
                }
                separator.set_text_content(Some(SEPARATOR));
                self.container.append_child(&separator)?;
            }
        }

        self.container.remove_attribute("style")?;
        Ok(())
    }

    fn detach(&self) {
        self.container.remove();
    }
}

struct WatcherState {
    document: Document,
    panel: Panel,
    styles: Option<StyleClasses>,
    tracker: NavigationTracker,
    locator: Box<dyn ProfileLocator>,
    transport: Rc<dyn LookupTransport>,
    archive_base: Url,
}

/// Owns the observer and the panel for one content-script injection
pub struct ProfileWatcher {
    state: Rc<RefCell<WatcherState>>,
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
}

impl ProfileWatcher {
    pub fn new(
        document: Document,
        locator: Box<dyn ProfileLocator>,
        transport: Rc<dyn LookupTransport>,
        config: &Config,
    ) -> Result<ProfileWatcher, Error> {
        // A previous injection may have left its panel behind.
        if let Some(stale) = document.get_element_by_id(PANEL_ID) {
            stale.remove();
        }

        let panel = Panel::new(&document)?;
        let state = Rc::new(RefCell::new(WatcherState {
            document,
            panel,
            styles: None,
            tracker: NavigationTracker::new(),
            locator,
            transport,
            archive_base: config.archive_base.clone(),
        }));

        let weak = Rc::downgrade(&state);
        let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
            move |records: js_sys::Array, _observer: MutationObserver| {
                if let Some(state) = weak.upgrade() {
                    on_mutations(&state, &records);
                }
            },
        );
        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;

        Ok(ProfileWatcher {
            state,
            observer,
            _callback: callback,
        })
    }

    /// Scan the page as it is now, then follow every DOM change
    pub fn start(&self) -> Result<(), Error> {
        scan(&self.state);

        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);

        let document = self.state.borrow().document.clone();
        self.observer.observe_with_options(&document, &options)?;
        log::info!("Watching profile pages");
        Ok(())
    }

    /// Stop observing and take the panel off the page
    pub fn dispose(&self) {
        self.observer.disconnect();

        let mut state = self.state.borrow_mut();
        state.tracker.reset();
        state.panel.detach();
    }
}

impl Drop for ProfileWatcher {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

fn location_href(document: &Document) -> Option<String> {
    document.location()?.href().ok()
}

fn location_path(document: &Document) -> Option<String> {
    document.location()?.pathname().ok()
}

fn elements(nodes: &NodeList) -> impl Iterator<Item = Element> + '_ {
    (0..nodes.length())
        .filter_map(|index| nodes.get(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
}

fn scan(state: &Rc<RefCell<WatcherState>>) {
    let (url, identity) = {
        let s = state.borrow();
        let identity = s
            .locator
            .metadata(&s.document)
            .and_then(|metadata| s.locator.identity_from_metadata(&metadata));
        (location_href(&s.document), identity)
    };

    let Some(url) = url else {
        return;
    };

    if let Some(identity) = identity {
        begin_lookup(state, &url, identity);
    }
    refresh(state, &url);
}

fn on_mutations(state: &Rc<RefCell<WatcherState>>, records: &js_sys::Array) {
    let Some(url) = location_href(&state.borrow().document) else {
        return;
    };

    for record in records.iter() {
        let Ok(record) = record.dyn_into::<MutationRecord>() else {
            continue;
        };
        if record.type_() != "childList" {
            continue;
        }

        for element in elements(&record.removed_nodes()) {
            let mut s = state.borrow_mut();
            if s.locator.is_metadata(&element) && s.tracker.invalidate(&url) {
                log::debug!("Profile metadata removed, navigated to {}", url);
                if let Err(e) = s.panel.reset() {
                    log::warn!("Failed to reset panel: {}", e);
                }
            }
        }

        for element in elements(&record.added_nodes()) {
            let identity = {
                let s = state.borrow();
                if s.locator.is_metadata(&element) {
                    s.locator.identity_from_metadata(&element)
                } else {
                    None
                }
            };

            if let Some(identity) = identity {
                begin_lookup(state, &url, identity);
            }
        }
    }

    refresh(state, &url);
}

/// Sample styles once, keep the panel anchored, and fall back to the visible
/// handle on profiles that have no metadata.
fn refresh(state: &Rc<RefCell<WatcherState>>, url: &str) {
    let degraded = {
        let mut guard = state.borrow_mut();
        let s = &mut *guard;

        if s.styles.is_none() {
            if let Some(styles) = s.locator.style_template(&s.document) {
                if let Err(e) = s.panel.apply_styles(&styles) {
                    log::warn!("Failed to apply host styles: {}", e);
                }
                s.styles = Some(styles);
            }
        }

        if let Some(anchor) = s.locator.anchor(&s.document) {
            if let Err(e) = s.panel.attach_after(&anchor) {
                log::warn!("Failed to anchor panel: {}", e);
            }
        }

        degraded_identity(s, url)
    };

    if let Some(identity) = degraded {
        begin_lookup(state, url, identity);
    }
}

fn degraded_identity(state: &WatcherState, url: &str) -> Option<ProfileIdentity> {
    if state.tracker.current_url() == Some(url) || state.locator.metadata(&state.document).is_some()
    {
        return None;
    }

    // The header can still show the previous profile's handle while the new
    // page renders, so only trust a handle that matches the URL.
    let expected = location_path(&state.document).and_then(|path| screen_name_from_path(&path))?;
    let handle = state.locator.degraded_handle(&state.document)?;

    handle.eq_ignore_ascii_case(&expected).then(|| ProfileIdentity {
        id: None,
        screen_name: handle,
    })
}

fn begin_lookup(state: &Rc<RefCell<WatcherState>>, url: &str, identity: ProfileIdentity) {
    let (ticket, transport) = {
        let mut s = state.borrow_mut();
        let Some(ticket) = s.tracker.begin(url, identity) else {
            return;
        };
        if let Err(e) = s.panel.reset() {
            log::warn!("Failed to reset panel: {}", e);
        }
        (ticket, s.transport.clone())
    };

    log::debug!("Looking up {:?} for {}", ticket.request, url);
    let weak = Rc::downgrade(state);

    spawn_local(async move {
        let outcome = transport
            .lookup(ticket.request.clone())
            .await
            .and_then(|body| resolve_past_names(&ticket, &body));

        let Some(state) = weak.upgrade() else {
            return;
        };
        let s = state.borrow();

        if !s.tracker.accepts(&ticket) {
            log::debug!("Discarding stale lookup for {}", ticket.screen_name);
            return;
        }

        match outcome {
            Ok(names) => {
                if let Err(e) = s.panel.render(&names, s.styles.as_ref(), &s.archive_base) {
                    log::warn!("Failed to render panel: {}", e);
                }
            }
            Err(e) => log::warn!("Lookup for {} failed: {}", ticket.screen_name, e),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const HISTORY: &str = r#"{
        "id": 1470631321496084481,
        "screen-names": {
            "i_am_not_a_nazi": ["2022-05-19", "2022-06-08"],
            "WLMact": ["2022-06-10", "2022-07-10"]
        }
    }"#;

    fn identity(id: u64, screen_name: &str) -> ProfileIdentity {
        ProfileIdentity {
            id: Some(id),
            screen_name: screen_name.to_string(),
        }
    }

    #[test]
    fn test_begin_issues_one_lookup_per_url() {
        let mut tracker = NavigationTracker::new();

        let first = tracker.begin("https://twitter.com/a", identity(1, "a"));
        let repeat = tracker.begin("https://twitter.com/a", identity(1, "a"));

        assert!(first.is_some());
        assert!(repeat.is_none());
        assert_eq!(first.unwrap().request, LookupRequest::by_id(1));
    }

    #[test]
    fn test_degraded_identity_looks_up_by_screen_name() {
        let mut tracker = NavigationTracker::new();

        let ticket = tracker
            .begin(
                "https://twitter.com/gone",
                ProfileIdentity {
                    id: None,
                    screen_name: "gone".to_string(),
                },
            )
            .unwrap();

        assert_eq!(ticket.request, LookupRequest::by_screen_name("gone").unwrap());
    }

    #[test]
    fn test_stale_lookup_rejected() {
        let mut tracker = NavigationTracker::new();

        let a = tracker.begin("https://twitter.com/a", identity(1, "a")).unwrap();
        let b = tracker.begin("https://twitter.com/b", identity(2, "b")).unwrap();

        assert!(!tracker.accepts(&a));
        assert!(tracker.accepts(&b));
    }

    #[test]
    fn test_metadata_flicker_on_same_url_keeps_lookup() {
        let mut tracker = NavigationTracker::new();
        let ticket = tracker.begin("https://twitter.com/a", identity(1, "a")).unwrap();

        assert!(!tracker.invalidate("https://twitter.com/a"));
        assert!(tracker.begin("https://twitter.com/a", identity(1, "a")).is_none());
        assert!(tracker.accepts(&ticket));
    }

    #[test]
    fn test_navigation_away_discards_pending_lookup() {
        let mut tracker = NavigationTracker::new();
        let ticket = tracker.begin("https://twitter.com/a", identity(1, "a")).unwrap();

        assert!(tracker.invalidate("https://twitter.com/home"));
        assert!(!tracker.accepts(&ticket));
        assert_eq!(tracker.current_url(), None);
    }

    #[test]
    fn test_returning_to_profile_looks_up_again() {
        let mut tracker = NavigationTracker::new();
        tracker.begin("https://twitter.com/a", identity(1, "a")).unwrap();
        tracker.invalidate("https://twitter.com/home");

        assert!(tracker.begin("https://twitter.com/a", identity(1, "a")).is_some());
    }

    #[test]
    fn test_metadata_replaces_degraded_lookup_on_same_url() {
        let mut tracker = NavigationTracker::new();
        let degraded = tracker
            .begin(
                "https://twitter.com/jack",
                ProfileIdentity {
                    id: None,
                    screen_name: "jack".to_string(),
                },
            )
            .unwrap();

        let upgraded = tracker.begin("https://twitter.com/jack", identity(12, "jack")).unwrap();

        assert_eq!(upgraded.request, LookupRequest::by_id(12));
        assert!(!tracker.accepts(&degraded));
        assert!(tracker.accepts(&upgraded));
        assert!(tracker.begin("https://twitter.com/jack", identity(12, "jack")).is_none());
    }

    #[test]
    fn test_handle_does_not_replace_id_lookup() {
        let mut tracker = NavigationTracker::new();
        let ticket = tracker.begin("https://twitter.com/jack", identity(12, "jack")).unwrap();

        let degraded = tracker.begin(
            "https://twitter.com/jack",
            ProfileIdentity {
                id: None,
                screen_name: "jack".to_string(),
            },
        );

        assert!(degraded.is_none());
        assert!(tracker.accepts(&ticket));
    }

    #[test]
    fn test_resolve_prefers_current_holder_of_screen_name() {
        let body = r#"{"accounts": [
            {"id": 99, "screen-names": {"jack": null, "someone_else": null}},
            {"id": 12, "screen-names": {"real_old_name": null, "jack": null}}
        ]}"#;
        let mut tracker = NavigationTracker::new();
        let ticket = tracker
            .begin(
                "https://twitter.com/jack",
                ProfileIdentity {
                    id: None,
                    screen_name: "jack".to_string(),
                },
            )
            .unwrap();

        let names = resolve_past_names(&ticket, body).unwrap();

        assert_eq!(names.len(), 1);
        assert_eq!(names[0].screen_name, "real_old_name");
    }

    #[test]
    fn test_resolve_past_names() {
        let mut tracker = NavigationTracker::new();
        let ticket = tracker
            .begin("https://twitter.com/WLMact", identity(1470631321496084481, "wlmact"))
            .unwrap();

        let names = resolve_past_names(&ticket, HISTORY).unwrap();

        assert_eq!(names.len(), 1);
        assert_eq!(names[0].screen_name, "i_am_not_a_nazi");
        assert_eq!(names[0].title(), Some("2022-05-19 to 2022-06-08".to_string()));
    }

    #[test]
    fn test_resolve_only_current_name_is_empty() {
        let mut tracker = NavigationTracker::new();
        let ticket = tracker.begin("https://twitter.com/jack", identity(12, "JACK")).unwrap();

        let names = resolve_past_names(&ticket, r#"{"id": 12, "screen-names": {"jack": null}}"#)
            .unwrap();

        assert!(names.is_empty());
    }

    #[test]
    fn test_resolve_prefers_matching_account() {
        let body = r#"{"accounts": [
            {"id": 1, "screen-names": {"other": null, "older": null}},
            {"id": 2, "screen-names": {"gone": null, "before": ["2020-01-01"]}}
        ]}"#;
        let mut tracker = NavigationTracker::new();
        let ticket = tracker
            .begin(
                "https://twitter.com/gone",
                ProfileIdentity {
                    id: None,
                    screen_name: "gone".to_string(),
                },
            )
            .unwrap();

        let names = resolve_past_names(&ticket, body).unwrap();

        assert_eq!(names.len(), 1);
        assert_eq!(names[0].screen_name, "before");
        assert_eq!(names[0].title(), Some("2020-01-01".to_string()));
    }

    #[test]
    fn test_resolve_rejects_malformed_body() {
        let mut tracker = NavigationTracker::new();
        let ticket = tracker.begin("https://twitter.com/a", identity(1, "a")).unwrap();

        assert!(resolve_past_names(&ticket, "<html>").is_err());
    }

    #[test]
    fn test_select_account_empty_result() {
        let result = LookupResult::from_json(r#"{"accounts": []}"#).unwrap();
        assert!(select_account(&result, "jack").is_none());
    }
}
