//! Browser backend.
//!
//! Renders the clock into the page and wires the screen to the DOM:
//! `visibilitychange` and `fullscreenchange` on the document, the wake-lock
//! sentinel's `release` event, a `gloo-timers` interval for the ticker and
//! the fullscreen button's `click`.
//!
//! The Screen Wake Lock and Fullscreen APIs are called through `js-sys`
//! reflection. Feature detection is a property check on `navigator`, and
//! both APIs are invoked synchronously inside the triggering event so the
//! user activation is still valid; only the returned promise is awaited.
//!
//! # Example
//!
//! ```rust,ignore
//! use wakeclock::{web, ClockConfig, Variant};
//!
//! let clock = web::mount(Variant::Meridiem.config())?;
//! // ... later, on navigation away:
//! drop(clock);
//! ```

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use gloo_timers::callback::Interval;
use js_sys::{Array, Function, Promise, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, Element, EventTarget, Navigator, VisibilityState, Window};

use crate::platform::{system_now, Platform};
use crate::render::{ClockView, FULLSCREEN_ARIA_LABEL, FULLSCREEN_LABEL};
use crate::wake_lock::RequestId;
use crate::{ClockConfig, ClockScreen, Error};

type SharedScreen = Rc<RefCell<ClockScreen<WebPlatform>>>;
type WeakScreen = Weak<RefCell<ClockScreen<WebPlatform>>>;

/// [`Platform`] implementation on top of `window` and `document`.
pub struct WebPlatform {
    document: Document,
    navigator: Navigator,
    screen: WeakScreen,
    tz: Option<Tz>,
    ticker: Option<Interval>,
    dom: Dom,
}

impl Platform for WebPlatform {
    type Sentinel = JsValue;

    fn now(&self) -> NaiveDateTime {
        system_now(self.tz)
    }

    fn start_ticker(&mut self, period: Duration) {
        let screen = self.screen.clone();
        let millis = u32::try_from(period.as_millis()).unwrap_or(u32::MAX);
        self.ticker = Some(Interval::new(millis, move || {
            dispatch(&screen, |s| s.tick());
        }));
    }

    fn stop_ticker(&mut self) {
        // Dropping the interval clears it.
        self.ticker = None;
    }

    fn is_visible(&self) -> bool {
        self.document.visibility_state() == VisibilityState::Visible
    }

    fn wake_lock_supported(&self) -> bool {
        Reflect::get(&self.navigator, &JsValue::from_str("wakeLock"))
            .map(|wake_lock| !wake_lock.is_undefined() && !wake_lock.is_null())
            .unwrap_or(false)
    }

    fn request_wake_lock(&mut self, id: RequestId) {
        let pending = Reflect::get(&self.navigator, &JsValue::from_str("wakeLock"))
            .map_err(rejected)
            .and_then(|wake_lock| {
                invoke(&wake_lock, "request", &Array::of1(&JsValue::from_str("screen")))
            });
        let screen = self.screen.clone();

        spawn_local(async move {
            match resolve(pending).await {
                Ok(sentinel) => {
                    watch_release(&sentinel, &screen, id);
                    deliver_grant(&screen, id, sentinel);
                }
                Err(error) => {
                    dispatch(&screen, |s| s.wake_lock_denied(id, error));
                }
            }
        });
    }

    fn release_wake_lock(&mut self, sentinel: JsValue) {
        release_sentinel(sentinel);
    }

    fn is_fullscreen(&self) -> bool {
        self.document.fullscreen_element().is_some()
    }

    fn request_fullscreen(&mut self) {
        let pending = match self.document.document_element() {
            Some(root) => invoke(&root, "requestFullscreen", &Array::new()),
            None => Err(Error::Unsupported("fullscreen")),
        };
        self.settle_fullscreen(pending);
    }

    fn exit_fullscreen(&mut self) {
        let pending = invoke(&self.document, "exitFullscreen", &Array::new());
        self.settle_fullscreen(pending);
    }

    fn present(&mut self, view: &ClockView) {
        if let Err(err) = self.dom.render(view) {
            tracing::warn!("Failed to render clock: {}", describe(&err));
        }
    }
}

impl WebPlatform {
    fn settle_fullscreen(&self, pending: Result<JsValue, Error>) {
        let screen = self.screen.clone();
        spawn_local(async move {
            let outcome = resolve(pending).await.map(|_| ());
            dispatch(&screen, |s| s.fullscreen_settled(outcome));
        });
    }
}

/// A clock attached to the page. Dropping it unmounts the screen, removes
/// its listeners and its markup.
pub struct MountedClock {
    screen: SharedScreen,
    root: Element,
    listeners: Vec<Listener>,
}

impl MountedClock {
    /// The view currently on screen.
    pub fn view(&self) -> ClockView {
        self.screen.borrow().view()
    }
}

impl Drop for MountedClock {
    fn drop(&mut self) {
        for listener in self.listeners.drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.event,
                listener.callback.as_ref().unchecked_ref(),
            );
        }
        match self.screen.try_borrow_mut() {
            Ok(mut screen) => screen.unmount(),
            Err(_) => tracing::warn!("clock screen busy during unmount"),
        }
        self.root.remove();
    }
}

/// Mount a clock into `document.body`.
pub fn mount(config: ClockConfig) -> Result<MountedClock, JsValue> {
    let window: Window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no document body"))?;

    let dom = Dom::build(&document)?;
    body.append_child(&dom.root)?;
    let root = dom.root.clone();
    let button = dom.button.clone();

    let tz = config.tz();
    let navigator = window.navigator();
    let platform_document = document.clone();
    let screen: SharedScreen = Rc::new_cyclic(|weak| {
        RefCell::new(ClockScreen::new(
            config,
            WebPlatform {
                document: platform_document,
                navigator,
                screen: weak.clone(),
                tz,
                ticker: None,
                dom,
            },
        ))
    });

    let listeners = vec![
        Listener::new(
            EventTarget::from(document.clone()),
            "visibilitychange",
            &screen,
            |s| s.visibility_changed(),
        )?,
        Listener::new(
            EventTarget::from(document),
            "fullscreenchange",
            &screen,
            |s| s.fullscreen_changed(),
        )?,
        Listener::new(EventTarget::from(button), "click", &screen, |s| {
            s.toggle_fullscreen()
        })?,
    ];

    screen.borrow_mut().mount();

    Ok(MountedClock {
        screen,
        root,
        listeners,
    })
}

/// Mount a clock configured from the page's query string.
///
/// An invalid query is logged and the default configuration is used.
pub fn mount_from_location() -> Result<MountedClock, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let search = window.location().search()?;
    let config = ClockConfig::from_query_string(&search).unwrap_or_else(|e| {
        tracing::warn!("Ignoring page configuration: {}", e);
        ClockConfig::default()
    });
    mount(config)
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut()>,
}

impl Listener {
    fn new(
        target: EventTarget,
        event: &'static str,
        screen: &SharedScreen,
        handler: fn(&mut ClockScreen<WebPlatform>),
    ) -> Result<Self, JsValue> {
        let weak = Rc::downgrade(screen);
        let callback = Closure::<dyn FnMut()>::new(move || {
            dispatch(&weak, handler);
        });
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target,
            event,
            callback,
        })
    }
}

/// Markup of the clock face.
struct Dom {
    root: Element,
    button: Element,
    hour: Element,
    minute: Element,
    second: Element,
    separators: [Element; 2],
    meridiem: Element,
    date: Element,
}

impl Dom {
    fn build(document: &Document) -> Result<Self, JsValue> {
        let root = element(document, "main", "clock-screen")?;
        root.set_attribute("aria-label", "No sleep clock screen")?;

        let button = element(document, "button", "fullscreen-toggle")?;
        button.set_attribute("type", "button")?;
        button.set_attribute("aria-label", FULLSCREEN_ARIA_LABEL)?;
        button.set_text_content(Some(FULLSCREEN_LABEL));

        let content = element(document, "div", "clock-content")?;
        let time = element(document, "h1", "clock-time")?;
        time.set_attribute("aria-live", "polite")?;

        let hour = element(document, "span", "clock-hour")?;
        let minute = element(document, "span", "clock-minute")?;
        let second = element(document, "span", "clock-second")?;
        let separators = [
            element(document, "span", "clock-separator")?,
            element(document, "span", "clock-separator")?,
        ];
        for sep in &separators {
            sep.set_text_content(Some(":"));
        }
        let meridiem = element(document, "span", "clock-meridiem")?;
        let date = element(document, "p", "clock-date")?;

        for child in [&hour, &separators[0], &minute, &separators[1], &second, &meridiem] {
            time.append_child(child)?;
        }
        content.append_child(&time)?;
        content.append_child(&date)?;
        root.append_child(&button)?;
        root.append_child(&content)?;

        Ok(Self {
            root,
            button,
            hour,
            minute,
            second,
            separators,
            meridiem,
            date,
        })
    }

    fn render(&self, view: &ClockView) -> Result<(), JsValue> {
        self.hour.set_text_content(Some(&view.hour));
        self.minute.set_text_content(Some(&view.minute));
        self.second.set_text_content(view.second.as_deref());
        self.meridiem.set_text_content(view.meridiem);
        self.date.set_text_content(Some(&view.date));

        for sep in &self.separators {
            sep.class_list()
                .toggle_with_force("is-dim", !view.separators_lit)?;
        }

        set_hidden(&self.second, view.second.is_none())?;
        set_hidden(&self.separators[1], view.second.is_none())?;
        set_hidden(&self.meridiem, view.meridiem.is_none())?;
        set_hidden(&self.button, !view.show_fullscreen_button)?;
        Ok(())
    }
}

fn element(document: &Document, tag: &str, class: &str) -> Result<Element, JsValue> {
    let el = document.create_element(tag)?;
    el.set_class_name(class);
    Ok(el)
}

fn set_hidden(el: &Element, hidden: bool) -> Result<(), JsValue> {
    if hidden {
        el.set_attribute("hidden", "")
    } else {
        el.remove_attribute("hidden")
    }
}

/// Run `f` against the screen if it still exists and is not already borrowed.
fn dispatch(screen: &WeakScreen, f: impl FnOnce(&mut ClockScreen<WebPlatform>)) {
    let Some(screen) = screen.upgrade() else {
        return;
    };
    let mut guard = match screen.try_borrow_mut() {
        Ok(guard) => guard,
        Err(_) => {
            tracing::warn!("clock screen busy, dropping event");
            return;
        }
    };
    f(&mut guard);
}

/// Hand a granted sentinel to the screen, or release it if nobody can take it.
fn deliver_grant(screen: &WeakScreen, id: RequestId, sentinel: JsValue) {
    let Some(screen) = screen.upgrade() else {
        tracing::debug!(request = id.get(), "screen gone, releasing late wake lock");
        release_sentinel(sentinel);
        return;
    };
    let mut guard = match screen.try_borrow_mut() {
        Ok(guard) => guard,
        Err(_) => {
            tracing::warn!(request = id.get(), "clock screen busy, releasing wake lock");
            release_sentinel(sentinel);
            return;
        }
    };
    guard.wake_lock_granted(id, sentinel);
}

/// Forward the sentinel's one-shot `release` event to the screen.
fn watch_release(sentinel: &JsValue, screen: &WeakScreen, id: RequestId) {
    let Some(target) = sentinel.dyn_ref::<EventTarget>() else {
        return;
    };
    let screen = screen.clone();
    let callback = Closure::once_into_js(move || {
        dispatch(&screen, |s| s.wake_lock_released(id));
    });
    if let Err(err) = target.add_event_listener_with_callback("release", callback.unchecked_ref())
    {
        tracing::debug!("Failed to watch wake lock release: {}", describe(&err));
    }
}

fn release_sentinel(sentinel: JsValue) {
    let pending = invoke(&sentinel, "release", &Array::new());
    spawn_local(async move {
        if let Err(error) = resolve(pending).await {
            tracing::debug!(%error, "wake lock release failed");
        }
    });
}

/// Call `target[name](...args)`.
fn invoke(target: &JsValue, name: &'static str, args: &Array) -> Result<JsValue, Error> {
    let method: Function = Reflect::get(target, &JsValue::from_str(name))
        .map_err(rejected)?
        .dyn_into()
        .map_err(|_| Error::Unsupported(name))?;
    Reflect::apply(&method, target, args).map_err(rejected)
}

/// Await the value if it is a promise; older engines return `undefined`.
async fn resolve(pending: Result<JsValue, Error>) -> Result<JsValue, Error> {
    match pending?.dyn_into::<Promise>() {
        Ok(promise) => JsFuture::from(promise).await.map_err(rejected),
        Err(value) => Ok(value),
    }
}

fn rejected(value: JsValue) -> Error {
    Error::Rejected(describe(&value))
}

fn describe(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
