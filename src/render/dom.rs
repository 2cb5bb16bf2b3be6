//! DOM-backed render host
//!
//! Sprites and labels are absolutely positioned elements inside a
//! container layer; the tween primitive rides on CSS transitions. A
//! missing container (or element creation failure) leaves every
//! operation a quiet no-op.

use std::collections::HashMap;

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use super::{RenderHost, SpriteId, SpriteSpec, TextId, TextSpec};

pub struct DomRenderHost {
    container: Option<HtmlElement>,
    sprites: HashMap<u32, HtmlElement>,
    texts: HashMap<u32, HtmlElement>,
    next_id: u32,
}

impl DomRenderHost {
    /// Host rendering into the element with the given id, usually a
    /// full-screen layer above the camera feed
    pub fn new(container_id: &str) -> Self {
        let container = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(container_id))
            .and_then(|element| element.dyn_into::<HtmlElement>().ok());
        if container.is_none() {
            log::warn!("render container #{container_id} missing; rendering disabled");
        }
        Self {
            container,
            sprites: HashMap::new(),
            texts: HashMap::new(),
            next_id: 1,
        }
    }

    fn alloc_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn make_element(&self, class: &str) -> Option<HtmlElement> {
        let document = web_sys::window()?.document()?;
        let element = document
            .create_element("div")
            .ok()?
            .dyn_into::<HtmlElement>()
            .ok()?;
        element.set_class_name(class);
        let _ = element.style().set_property("position", "absolute");
        self.container.as_ref()?.append_child(&element).ok()?;
        Some(element)
    }

    fn place(element: &HtmlElement, position: Vec2, transition_ms: Option<f64>) {
        let style = element.style();
        match transition_ms {
            Some(ms) => {
                let _ = style.set_property(
                    "transition",
                    &format!("left {ms}ms linear, top {ms}ms linear"),
                );
            }
            None => {
                let _ = style.set_property("transition", "none");
            }
        }
        let _ = style.set_property("left", &format!("{}px", position.x));
        let _ = style.set_property("top", &format!("{}px", position.y));
    }
}

impl RenderHost for DomRenderHost {
    fn create_sprite(&mut self, spec: SpriteSpec) -> SpriteId {
        let id = self.alloc_id();
        if let Some(element) = self.make_element(&format!("sprite sprite-{}", spec.asset)) {
            let _ = element
                .style()
                .set_property("transform", &format!("scale({})", spec.scale));
            Self::place(&element, spec.position, None);
            self.sprites.insert(id, element);
        }
        SpriteId(id)
    }

    fn set_sprite_position(&mut self, id: SpriteId, position: Vec2) {
        if let Some(element) = self.sprites.get(&id.0) {
            Self::place(element, position, None);
        }
    }

    fn tween_sprite_to(&mut self, id: SpriteId, position: Vec2, duration_ms: f64) {
        if let Some(element) = self.sprites.get(&id.0) {
            Self::place(element, position, Some(duration_ms));
        }
    }

    fn destroy_sprite(&mut self, id: SpriteId) {
        if let Some(element) = self.sprites.remove(&id.0) {
            element.remove();
        }
    }

    fn create_text(&mut self, spec: TextSpec) -> TextId {
        let id = self.alloc_id();
        if let Some(element) = self.make_element(&spec.class) {
            element.set_text_content(Some(&spec.text));
            Self::place(&element, spec.position, None);
            self.texts.insert(id, element);
        }
        TextId(id)
    }

    fn set_text(&mut self, id: TextId, text: &str) {
        if let Some(element) = self.texts.get(&id.0) {
            element.set_text_content(Some(text));
        }
    }

    fn destroy_text(&mut self, id: TextId) {
        if let Some(element) = self.texts.remove(&id.0) {
            element.remove();
        }
    }
}
