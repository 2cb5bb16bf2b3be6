//! Rate-limited mapping from orientation samples to screen space
//!
//! Converts readings through the angle calculator, caps visual refreshes
//! at a target frequency, maps the sphere onto the viewport, and drives
//! the render host: one angel sprite plus two angle labels.

use std::rc::Rc;

use glam::Vec2;
use serde::Serialize;

use crate::angles::AngleCalculator;
use crate::consts::{
    ANGEL_SPRITE_SCALE, DEFAULT_DISPLAY_UPDATE_RATE, FULL_TURN, LABEL_LINE_HEIGHT_PX,
    LABEL_MARGIN_PX, MAX_DISPLAY_UPDATE_RATE, POSITION_TWEEN_MS, VERTICAL_LIMIT,
};
use crate::orientation::RawOrientationSample;
use crate::platform::{Clock, Viewport};
use crate::render::{RenderHost, SpriteId, SpriteSpec, TextId, TextSpec};

/// Display-side state for the single on-screen angel
#[derive(Debug, Clone, Copy)]
pub struct AngelState {
    /// Degrees in [0, 360)
    pub horizontal_angle: f64,
    /// Degrees in [-90, 90]
    pub vertical_angle: f64,
    /// Mapped position in viewport pixels
    pub screen: Vec2,
    /// Always true while the display is alive; there is exactly one angel
    pub is_visible: bool,
    /// Timestamp of the last accepted refresh (ms)
    pub last_update_time: Option<f64>,
}

/// Exported view of the display state, free of render handles
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AngelSnapshot {
    pub horizontal_angle: f64,
    pub vertical_angle: f64,
    pub is_visible: bool,
    pub screen_position: Vec2,
    /// Whether the angel sprite currently exists
    pub angel_active: bool,
}

/// Map normalized angles onto a width x height viewport
///
/// 0 degrees lands on the left edge and 180 mid-screen; +90 tilt is the
/// top edge, -90 the bottom.
pub fn angle_to_screen(horizontal: f64, vertical: f64, width: f64, height: f64) -> Vec2 {
    let x = horizontal / FULL_TURN * width;
    let y = (1.0 - (vertical + VERTICAL_LIMIT) / (2.0 * VERTICAL_LIMIT)) * height;
    Vec2::new(x as f32, y as f32)
}

/// Round to whole degrees and render as `"<prefix>: <value>°"`
///
/// `wrap_full_turn` is the horizontal-label rule: a rounded 360 shows as
/// 0. Vertical labels pass `false` and display whatever they were given.
pub fn format_angle_text(angle: f64, prefix: &str, wrap_full_turn: bool) -> String {
    let mut value = if angle.is_finite() {
        angle.round() as i64
    } else {
        0
    };
    if wrap_full_turn && value == FULL_TURN as i64 {
        value = 0;
    }
    format!("{prefix}: {value}°")
}

/// Turns normalized orientation readings into sprite motion and labels
pub struct AngelDisplaySystem {
    host: Box<dyn RenderHost>,
    clock: Rc<dyn Clock>,
    viewport: Rc<dyn Viewport>,
    calculator: AngleCalculator,
    state: Option<AngelState>,
    sprite: Option<SpriteId>,
    horizontal_label: Option<TextId>,
    vertical_label: Option<TextId>,
    display_update_rate: f64,
    update_interval_ms: f64,
    smoothing_enabled: bool,
    horizontal_prefix: String,
    vertical_prefix: String,
}

impl AngelDisplaySystem {
    pub fn new(host: Box<dyn RenderHost>, clock: Rc<dyn Clock>, viewport: Rc<dyn Viewport>) -> Self {
        Self {
            host,
            clock,
            viewport,
            calculator: AngleCalculator::default(),
            state: None,
            sprite: None,
            horizontal_label: None,
            vertical_label: None,
            display_update_rate: DEFAULT_DISPLAY_UPDATE_RATE,
            update_interval_ms: 1000.0 / DEFAULT_DISPLAY_UPDATE_RATE,
            smoothing_enabled: true,
            horizontal_prefix: "H".to_string(),
            vertical_prefix: "V".to_string(),
        }
    }

    pub fn with_calculator(mut self, calculator: AngleCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    pub fn with_label_prefixes(mut self, horizontal: &str, vertical: &str) -> Self {
        self.horizontal_prefix = horizontal.to_string();
        self.vertical_prefix = vertical.to_string();
        self
    }

    /// Create render resources and reset display state
    ///
    /// Re-initializing releases the previous resources first.
    pub fn initialize(&mut self) {
        self.release_resources();
        let (width, height) = self.viewport.size();
        let start = angle_to_screen(0.0, 0.0, width, height);

        self.sprite = Some(self.host.create_sprite(SpriteSpec {
            position: start,
            scale: ANGEL_SPRITE_SCALE,
            asset: "angel".to_string(),
        }));
        self.horizontal_label = Some(self.host.create_text(TextSpec {
            position: Vec2::new(LABEL_MARGIN_PX, LABEL_MARGIN_PX),
            text: format_angle_text(0.0, &self.horizontal_prefix, true),
            class: "angle-label".to_string(),
        }));
        self.vertical_label = Some(self.host.create_text(TextSpec {
            position: Vec2::new(LABEL_MARGIN_PX, LABEL_MARGIN_PX + LABEL_LINE_HEIGHT_PX),
            text: format_angle_text(0.0, &self.vertical_prefix, false),
            class: "angle-label".to_string(),
        }));
        self.state = Some(AngelState {
            horizontal_angle: 0.0,
            vertical_angle: 0.0,
            screen: start,
            is_visible: true,
            last_update_time: None,
        });
    }

    /// Feed one orientation reading through the display pipeline
    ///
    /// Calls arriving inside the refresh interval are complete no-ops; an
    /// accepted call converts, normalizes, remaps against the current
    /// viewport, moves the sprite, and rewrites both labels.
    pub fn update_current_angel(&mut self, sample: &RawOrientationSample) {
        let Some(state) = self.state.as_ref() else {
            return;
        };
        let now = self.clock.now_ms();
        if let Some(last) = state.last_update_time {
            if now - last < self.update_interval_ms {
                return;
            }
        }

        let horizontal = self.calculator.to_horizontal_angle(sample.alpha);
        let vertical = self.calculator.to_vertical_angle(sample.beta);
        let normalized = self.calculator.normalize(horizontal, vertical);
        let (width, height) = self.viewport.size();
        let screen = angle_to_screen(normalized.horizontal, normalized.vertical, width, height);

        if let Some(state) = self.state.as_mut() {
            state.last_update_time = Some(now);
            state.horizontal_angle = normalized.horizontal;
            state.vertical_angle = normalized.vertical;
            state.screen = screen;
        }

        self.move_sprite(screen);
        let horizontal_text =
            format_angle_text(normalized.horizontal, &self.horizontal_prefix, true);
        let vertical_text = format_angle_text(normalized.vertical, &self.vertical_prefix, false);
        if let Some(id) = self.horizontal_label {
            self.host.set_text(id, &horizontal_text);
        }
        if let Some(id) = self.vertical_label {
            self.host.set_text(id, &vertical_text);
        }
    }

    fn move_sprite(&mut self, target: Vec2) {
        let Some(id) = self.sprite else {
            return;
        };
        if self.smoothing_enabled {
            self.host.tween_sprite_to(id, target, POSITION_TWEEN_MS);
        } else {
            self.host.set_sprite_position(id, target);
        }
    }

    /// Cap visual refreshes; rejects rates outside (0, 120]
    pub fn set_display_update_rate(&mut self, fps: f64) {
        if !(fps > 0.0 && fps <= MAX_DISPLAY_UPDATE_RATE) {
            log::debug!(
                "display update rate {fps} out of range, keeping {}",
                self.display_update_rate
            );
            return;
        }
        self.display_update_rate = fps;
        self.update_interval_ms = 1000.0 / fps;
    }

    pub fn display_update_rate(&self) -> f64 {
        self.display_update_rate
    }

    /// Toggle tweened motion; takes effect on the next accepted update
    pub fn set_smoothing_enabled(&mut self, enabled: bool) {
        self.smoothing_enabled = enabled;
    }

    pub fn smoothing_enabled(&self) -> bool {
        self.smoothing_enabled
    }

    /// Export the current display state for unrelated consumers
    pub fn current_state(&self) -> Option<AngelSnapshot> {
        self.state.as_ref().map(|state| AngelSnapshot {
            horizontal_angle: state.horizontal_angle,
            vertical_angle: state.vertical_angle,
            is_visible: state.is_visible,
            screen_position: state.screen,
            angel_active: self.sprite.is_some(),
        })
    }

    /// Release render resources and clear state. Idempotent.
    pub fn destroy(&mut self) {
        self.release_resources();
        self.state = None;
    }

    fn release_resources(&mut self) {
        if let Some(id) = self.sprite.take() {
            self.host.destroy_sprite(id);
        }
        if let Some(id) = self.horizontal_label.take() {
            self.host.destroy_text(id);
        }
        if let Some(id) = self.vertical_label.take() {
            self.host.destroy_text(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::FixedViewport;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum HostOp {
        CreateSprite(Vec2),
        SetPosition(u32, Vec2),
        Tween(u32, Vec2, f64),
        DestroySprite(u32),
        CreateText(String),
        SetText(u32, String),
        DestroyText(u32),
    }

    #[derive(Default)]
    struct RecordingHost {
        ops: Rc<RefCell<Vec<HostOp>>>,
        next_id: u32,
    }

    impl RecordingHost {
        fn new(ops: Rc<RefCell<Vec<HostOp>>>) -> Self {
            Self { ops, next_id: 1 }
        }

        fn alloc(&mut self) -> u32 {
            let id = self.next_id;
            self.next_id += 1;
            id
        }
    }

    impl RenderHost for RecordingHost {
        fn create_sprite(&mut self, spec: SpriteSpec) -> SpriteId {
            self.ops.borrow_mut().push(HostOp::CreateSprite(spec.position));
            SpriteId(self.alloc())
        }
        fn set_sprite_position(&mut self, id: SpriteId, position: Vec2) {
            self.ops.borrow_mut().push(HostOp::SetPosition(id.0, position));
        }
        fn tween_sprite_to(&mut self, id: SpriteId, position: Vec2, duration_ms: f64) {
            self.ops.borrow_mut().push(HostOp::Tween(id.0, position, duration_ms));
        }
        fn destroy_sprite(&mut self, id: SpriteId) {
            self.ops.borrow_mut().push(HostOp::DestroySprite(id.0));
        }
        fn create_text(&mut self, spec: TextSpec) -> TextId {
            self.ops.borrow_mut().push(HostOp::CreateText(spec.text));
            TextId(self.alloc())
        }
        fn set_text(&mut self, id: TextId, text: &str) {
            self.ops.borrow_mut().push(HostOp::SetText(id.0, text.to_string()));
        }
        fn destroy_text(&mut self, id: TextId) {
            self.ops.borrow_mut().push(HostOp::DestroyText(id.0));
        }
    }

    struct ManualClock(Rc<Cell<f64>>);

    impl Clock for ManualClock {
        fn now_ms(&self) -> f64 {
            self.0.get()
        }
    }

    struct Fixture {
        display: AngelDisplaySystem,
        ops: Rc<RefCell<Vec<HostOp>>>,
        now: Rc<Cell<f64>>,
    }

    impl Fixture {
        fn new() -> Self {
            let ops = Rc::new(RefCell::new(Vec::new()));
            let now = Rc::new(Cell::new(10_000.0));
            let display = AngelDisplaySystem::new(
                Box::new(RecordingHost::new(ops.clone())),
                Rc::new(ManualClock(now.clone())),
                Rc::new(FixedViewport {
                    width: 800.0,
                    height: 600.0,
                }),
            );
            Self { display, ops, now }
        }

        fn tween_count(&self) -> usize {
            self.ops
                .borrow()
                .iter()
                .filter(|op| matches!(op, HostOp::Tween(..)))
                .count()
        }
    }

    #[test]
    fn test_screen_mapping() {
        assert_eq!(angle_to_screen(0.0, 0.0, 800.0, 600.0), Vec2::new(0.0, 300.0));
        assert_eq!(angle_to_screen(180.0, 0.0, 800.0, 600.0), Vec2::new(400.0, 300.0));
        assert_eq!(angle_to_screen(0.0, 90.0, 800.0, 600.0).y, 0.0);
        assert_eq!(angle_to_screen(0.0, -90.0, 800.0, 600.0).y, 600.0);
        assert_eq!(angle_to_screen(90.0, 45.0, 400.0, 400.0), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_format_angle_text() {
        assert_eq!(format_angle_text(360.0, "H", true), "H: 0°");
        assert_eq!(format_angle_text(45.7, "H", true), "H: 46°");
        assert_eq!(format_angle_text(-30.6, "V", false), "V: -31°");
        assert_eq!(format_angle_text(360.0, "V", false), "V: 360°");
        assert_eq!(format_angle_text(180.0, "", true), ": 180°");
    }

    #[test]
    fn test_initialize_creates_resources() {
        let mut fixture = Fixture::new();
        fixture.display.initialize();

        let ops = fixture.ops.borrow();
        assert_eq!(ops[0], HostOp::CreateSprite(Vec2::new(0.0, 300.0)));
        assert_eq!(ops[1], HostOp::CreateText("H: 0°".to_string()));
        assert_eq!(ops[2], HostOp::CreateText("V: 0°".to_string()));
        drop(ops);

        let snapshot = fixture.display.current_state().expect("state exists");
        assert!(snapshot.is_visible);
        assert!(snapshot.angel_active);
    }

    #[test]
    fn test_update_maps_and_labels() {
        let mut fixture = Fixture::new();
        fixture.display.initialize();
        fixture.display.update_current_angel(&RawOrientationSample::heading(180.0, 0.0));

        let snapshot = fixture.display.current_state().unwrap();
        assert_eq!(snapshot.horizontal_angle, 180.0);
        assert_eq!(snapshot.vertical_angle, 0.0);
        assert_eq!(snapshot.screen_position, Vec2::new(400.0, 300.0));

        let ops = fixture.ops.borrow();
        assert!(ops.contains(&HostOp::Tween(1, Vec2::new(400.0, 300.0), 50.0)));
        assert!(ops.contains(&HostOp::SetText(2, "H: 180°".to_string())));
        assert!(ops.contains(&HostOp::SetText(3, "V: 0°".to_string())));
    }

    #[test]
    fn test_rate_limiting_drops_second_call() {
        let mut fixture = Fixture::new();
        fixture.display.initialize();

        fixture.display.update_current_angel(&RawOrientationSample::heading(90.0, 10.0));
        fixture.now.set(10_010.0); // within the 33ms window at 30 fps
        fixture.display.update_current_angel(&RawOrientationSample::heading(270.0, -10.0));

        let snapshot = fixture.display.current_state().unwrap();
        assert_eq!(snapshot.horizontal_angle, 90.0);
        assert_eq!(snapshot.vertical_angle, 10.0);
        assert_eq!(fixture.tween_count(), 1);

        fixture.now.set(10_050.0);
        fixture.display.update_current_angel(&RawOrientationSample::heading(270.0, -10.0));
        assert_eq!(fixture.display.current_state().unwrap().horizontal_angle, 270.0);
        assert_eq!(fixture.tween_count(), 2);
    }

    #[test]
    fn test_update_rate_setter_validates() {
        let mut fixture = Fixture::new();
        fixture.display.set_display_update_rate(60.0);
        assert_eq!(fixture.display.display_update_rate(), 60.0);

        fixture.display.set_display_update_rate(0.0);
        assert_eq!(fixture.display.display_update_rate(), 60.0);
        fixture.display.set_display_update_rate(-5.0);
        assert_eq!(fixture.display.display_update_rate(), 60.0);
        fixture.display.set_display_update_rate(200.0);
        assert_eq!(fixture.display.display_update_rate(), 60.0);
        fixture.display.set_display_update_rate(f64::NAN);
        assert_eq!(fixture.display.display_update_rate(), 60.0);

        fixture.display.set_display_update_rate(120.0);
        assert_eq!(fixture.display.display_update_rate(), 120.0);
    }

    #[test]
    fn test_smoothing_disabled_sets_position_directly() {
        let mut fixture = Fixture::new();
        fixture.display.initialize();
        fixture.display.set_smoothing_enabled(false);
        fixture.display.update_current_angel(&RawOrientationSample::heading(180.0, 0.0));

        let ops = fixture.ops.borrow();
        assert!(ops.contains(&HostOp::SetPosition(1, Vec2::new(400.0, 300.0))));
        assert_eq!(
            ops.iter().filter(|op| matches!(op, HostOp::Tween(..))).count(),
            0
        );
    }

    #[test]
    fn test_extreme_inputs_normalized() {
        let mut fixture = Fixture::new();
        fixture.display.initialize();
        fixture
            .display
            .update_current_angel(&RawOrientationSample::heading(999_999.0, -999_999.0));

        let snapshot = fixture.display.current_state().unwrap();
        assert!((0.0..360.0).contains(&snapshot.horizontal_angle));
        assert_eq!(snapshot.vertical_angle, -90.0);
    }

    #[test]
    fn test_absent_axes_read_as_zero() {
        let mut fixture = Fixture::new();
        fixture.display.initialize();
        fixture
            .display
            .update_current_angel(&RawOrientationSample::new(None, None, None));

        let snapshot = fixture.display.current_state().unwrap();
        assert_eq!(snapshot.horizontal_angle, 0.0);
        assert_eq!(snapshot.vertical_angle, 0.0);
    }

    #[test]
    fn test_update_before_initialize_is_noop() {
        let mut fixture = Fixture::new();
        fixture.display.update_current_angel(&RawOrientationSample::heading(90.0, 0.0));
        assert!(fixture.display.current_state().is_none());
        assert!(fixture.ops.borrow().is_empty());
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut fixture = Fixture::new();
        fixture.display.initialize();
        fixture.display.destroy();
        fixture.display.destroy();

        assert!(fixture.display.current_state().is_none());
        let destroys = fixture
            .ops
            .borrow()
            .iter()
            .filter(|op| matches!(op, HostOp::DestroySprite(_) | HostOp::DestroyText(_)))
            .count();
        assert_eq!(destroys, 3);

        // Updates after destroy stay no-ops
        let before = fixture.ops.borrow().len();
        fixture.display.update_current_angel(&RawOrientationSample::heading(45.0, 0.0));
        assert_eq!(fixture.ops.borrow().len(), before);
    }

    #[test]
    fn test_viewport_requeried_on_each_update() {
        struct GrowingViewport(Cell<f64>);
        impl Viewport for GrowingViewport {
            fn size(&self) -> (f64, f64) {
                let width = self.0.get();
                self.0.set(width * 2.0);
                (width, 600.0)
            }
        }

        let ops = Rc::new(RefCell::new(Vec::new()));
        let now = Rc::new(Cell::new(10_000.0));
        let mut display = AngelDisplaySystem::new(
            Box::new(RecordingHost::new(ops.clone())),
            Rc::new(ManualClock(now.clone())),
            Rc::new(GrowingViewport(Cell::new(400.0))),
        );
        display.initialize();

        display.update_current_angel(&RawOrientationSample::heading(180.0, 0.0));
        assert_eq!(display.current_state().unwrap().screen_position.x, 400.0);

        now.set(20_000.0);
        display.update_current_angel(&RawOrientationSample::heading(180.0, 0.0));
        assert_eq!(display.current_state().unwrap().screen_position.x, 800.0);
    }
}
