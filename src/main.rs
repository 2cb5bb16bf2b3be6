//! Angel Scope entry point
//!
//! Wires the browser platform pieces into the orientation pipeline and
//! runs the UI glue: permission overlay, calibrate button, HUD readouts.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;

    use angel_scope::angles::AngleCalculator;
    use angel_scope::display::AngelDisplaySystem;
    use angel_scope::orientation::{OrientationManager, RawOrientationSample};
    use angel_scope::platform::web::{
        BrowserClock, BrowserPermissionGate, BrowserViewport, DeviceOrientationSource,
    };
    use angel_scope::render::dom::DomRenderHost;
    use angel_scope::settings::Settings;

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Angel Scope starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let mut settings = Settings::load();
        settings.sanitize();
        settings.save();

        let clock = Rc::new(BrowserClock);
        let viewport = Rc::new(BrowserViewport);

        let manager = Rc::new(RefCell::new(OrientationManager::new(
            Box::new(DeviceOrientationSource::default()),
            clock.clone(),
        )));
        manager
            .borrow_mut()
            .set_smoothing_factor(settings.smoothing_factor);

        let mut display =
            AngelDisplaySystem::new(Box::new(DomRenderHost::new("angel-layer")), clock, viewport)
                .with_calculator(AngleCalculator::new(settings.angle_resolution))
                .with_label_prefixes(&settings.horizontal_prefix, &settings.vertical_prefix);
        display.set_display_update_rate(settings.display_update_rate);
        display.set_smoothing_enabled(settings.smoothing_enabled);
        display.initialize();
        let display = Rc::new(RefCell::new(display));

        // The display rides the manager's smoothed output
        {
            let display = display.clone();
            let _ = manager.borrow_mut().on_orientation_change(move |snapshot| {
                display
                    .borrow_mut()
                    .update_current_angel(&RawOrientationSample::new(
                        Some(snapshot.current),
                        snapshot.tilt,
                        None,
                    ));
            });
        }

        setup_hud(&manager);
        setup_permission_overlay(&manager);
        setup_calibrate_button(&manager);

        // First attempt; platforms that want a user gesture for the
        // permission prompt go through the overlay's button instead
        let granted = OrientationManager::initialize(&manager, &BrowserPermissionGate).await;
        set_overlay_visible(!granted);

        log::info!("Angel Scope running (tracking: {granted})");
    }

    fn setup_hud(manager: &Rc<RefCell<OrientationManager>>) {
        let _ = manager.borrow_mut().on_orientation_change(|snapshot| {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document
                .query_selector("#hud-heading .hud-value")
                .ok()
                .flatten()
            {
                el.set_text_content(Some(&format!("{:.0}°", snapshot.current)));
            }
            if let Some(el) = document
                .query_selector("#hud-delta .hud-value")
                .ok()
                .flatten()
            {
                el.set_text_content(Some(&format!("{:+.0}°", snapshot.delta_from_reference)));
            }
        });

        let _ = manager.borrow_mut().on_permission_change(|granted| {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document.get_element_by_id("status-text") {
                el.set_text_content(Some(if *granted {
                    "tracking"
                } else {
                    "motion access needed"
                }));
            }
        });
    }

    fn set_overlay_visible(visible: bool) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.get_element_by_id("permission-overlay") {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    fn setup_permission_overlay(manager: &Rc<RefCell<OrientationManager>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(btn) = document.get_element_by_id("enable-motion-btn") {
            let manager = manager.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let manager = manager.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    let granted =
                        OrientationManager::initialize(&manager, &BrowserPermissionGate).await;
                    set_overlay_visible(!granted);
                });
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_calibrate_button(manager: &Rc<RefCell<OrientationManager>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(btn) = document.get_element_by_id("calibrate-btn") {
            let manager = manager.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                manager.borrow_mut().set_reference_horizon(None);
                log::info!("reference horizon recalibrated");
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Angel Scope (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    println!("\nRunning pipeline smoke test...");
    smoke_test_pipeline();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn smoke_test_pipeline() {
    use std::cell::RefCell;
    use std::rc::Rc;

    use angel_scope::orientation::{
        OrientationManager, OrientationSource, PreGrantedGate, RawOrientationSample, SampleHandler,
    };
    use angel_scope::platform::SystemClock;

    struct ScriptedSource {
        handler: Rc<RefCell<Option<SampleHandler>>>,
    }

    impl OrientationSource for ScriptedSource {
        fn is_supported(&self) -> bool {
            true
        }
        fn start(&mut self, handler: SampleHandler) {
            *self.handler.borrow_mut() = Some(handler);
        }
        fn stop(&mut self) {
            self.handler.borrow_mut().take();
        }
    }

    let feed = Rc::new(RefCell::new(None));
    let manager = Rc::new(RefCell::new(OrientationManager::new(
        Box::new(ScriptedSource {
            handler: feed.clone(),
        }),
        Rc::new(SystemClock),
    )));

    let granted = pollster::block_on(OrientationManager::initialize(&manager, &PreGrantedGate));
    assert!(granted, "pre-granted gate should start tracking");

    manager.borrow_mut().set_reference_horizon(Some(350.0));
    let handler = feed.borrow().clone().expect("source attached");
    (*handler)(RawOrientationSample::heading(10.0, 30.0));

    let state = *manager.borrow().state();
    assert_eq!(state.current_orientation, 10.0);
    assert_eq!(state.delta_from_reference, 20.0);
    println!("✓ Pipeline smoke test passed!");
}
