//! Browser implementations of the platform capabilities

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::orientation::{
    OrientationSource, PermissionDecision, PermissionFuture, PermissionGate,
    RawOrientationSample, SampleHandler,
};

use super::{Clock, Viewport};

/// `Date.now()` clock
#[derive(Debug, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

/// Window inner dimensions, queried fresh on every call
#[derive(Debug, Default)]
pub struct BrowserViewport;

impl Viewport for BrowserViewport {
    fn size(&self) -> (f64, f64) {
        let Some(window) = web_sys::window() else {
            return (0.0, 0.0);
        };
        let width = window
            .inner_width()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0);
        let height = window
            .inner_height()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0);
        (width, height)
    }
}

/// `deviceorientation` listener with a detachable closure
///
/// The closure is retained rather than `forget`-ed so `stop` can actually
/// remove the listener from the window again.
#[derive(Default)]
pub struct DeviceOrientationSource {
    listener: Option<Closure<dyn FnMut(web_sys::DeviceOrientationEvent)>>,
}

impl OrientationSource for DeviceOrientationSource {
    fn is_supported(&self) -> bool {
        let Some(window) = web_sys::window() else {
            return false;
        };
        js_sys::Reflect::has(window.as_ref(), &JsValue::from_str("DeviceOrientationEvent"))
            .unwrap_or(false)
    }

    fn start(&mut self, handler: SampleHandler) {
        self.stop();
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::DeviceOrientationEvent| {
            (*handler)(RawOrientationSample::new(
                event.alpha(),
                event.beta(),
                event.gamma(),
            ));
        });
        if window
            .add_event_listener_with_callback("deviceorientation", closure.as_ref().unchecked_ref())
            .is_ok()
        {
            self.listener = Some(closure);
        } else {
            log::warn!("failed to attach deviceorientation listener");
        }
    }

    fn stop(&mut self) {
        let Some(closure) = self.listener.take() else {
            return;
        };
        if let Some(window) = web_sys::window() {
            let _ = window.remove_event_listener_with_callback(
                "deviceorientation",
                closure.as_ref().unchecked_ref(),
            );
        }
    }
}

/// Permission gate over `DeviceOrientationEvent.requestPermission`
///
/// iOS exposes the explicit request; everything else that has the sensor
/// API is treated as pre-granted. A rejected request reads as a denial.
#[derive(Debug, Default)]
pub struct BrowserPermissionGate;

impl PermissionGate for BrowserPermissionGate {
    fn request(&self) -> PermissionFuture {
        Box::pin(async {
            let Some(window) = web_sys::window() else {
                return PermissionDecision::Unsupported;
            };
            let ctor = match js_sys::Reflect::get(
                window.as_ref(),
                &JsValue::from_str("DeviceOrientationEvent"),
            ) {
                Ok(value) if !value.is_undefined() && !value.is_null() => value,
                _ => return PermissionDecision::Unsupported,
            };

            let request_fn =
                match js_sys::Reflect::get(&ctor, &JsValue::from_str("requestPermission")) {
                    Ok(value) => value,
                    Err(_) => return PermissionDecision::Granted,
                };
            let Some(request_fn) = request_fn.dyn_ref::<js_sys::Function>() else {
                // No explicit gate on this platform: pre-granted
                return PermissionDecision::Granted;
            };

            let pending = match request_fn.call0(&ctor) {
                Ok(value) => js_sys::Promise::resolve(&value),
                Err(_) => return PermissionDecision::Denied,
            };
            match JsFuture::from(pending).await {
                Ok(outcome) => {
                    if outcome.as_string().as_deref() == Some("granted") {
                        PermissionDecision::Granted
                    } else {
                        PermissionDecision::Denied
                    }
                }
                Err(_) => PermissionDecision::Denied,
            }
        })
    }
}
