//! The hosting page: element lookup, canvases, and configuration attributes.

use flipbook_core::config::ATTRIBUTE_KEYS;
use flipbook_core::{
    ConfigError, DisplaySize, DrawingSurface, FlipbookConfig, FlipbookError, FlipbookResult,
    PageSide, PixelSize, ViewerHost,
};
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, Element, HtmlCanvasElement, HtmlElement, Window};

pub const ROOT_ID: &str = "flipbook-root";
pub const LEFT_CANVAS_ID: &str = "left-canvas";
pub const RIGHT_CANVAS_ID: &str = "right-canvas";
pub const PREV_BUTTON_ID: &str = "prev-btn";
pub const NEXT_BUTTON_ID: &str = "next-btn";
pub const INDICATOR_ID: &str = "page-indicator";

const SOURCE_ATTRIBUTE: &str = "data-pdf";
const CONFIG_ATTRIBUTE: &str = "data-config";

/// A `<canvas>` with its 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> FlipbookResult<Self> {
        let context = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|context| context.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| FlipbookError::Host("canvas has no 2d context".to_string()))?;

        Ok(Self {
            canvas,
            context,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.context
    }
}

impl DrawingSurface for CanvasSurface {
    fn resize(&self, backing: PixelSize, display: DisplaySize, device_pixel_ratio: f64) {
        self.canvas.set_width(backing.width);
        self.canvas.set_height(backing.height);

        let style = self.canvas.style();
        for (property, value) in [("width", display.width), ("height", display.height)] {
            if style.set_property(property, &format!("{value}px")).is_err() {
                log::warn!("canvas {property} rejected: {value}px");
            }
        }

        if self
            .context
            .set_transform(device_pixel_ratio, 0.0, 0.0, device_pixel_ratio, 0.0, 0.0)
            .is_err()
        {
            log::warn!("canvas transform rejected for ratio {device_pixel_ratio}");
        }
    }

    fn clear(&self) {
        // Cleared in backing-store pixels.
        if self.context.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).is_err() {
            log::warn!("canvas transform reset rejected");
        }
        self.context.clear_rect(
            0.0,
            0.0,
            f64::from(self.canvas.width()),
            f64::from(self.canvas.height()),
        );
    }
}

/// The viewer's anchors on the current page.
pub struct DomHost {
    window: Window,
    document: Document,
    root: HtmlElement,
    source_ref: String,
    left: Option<CanvasSurface>,
    right: Option<CanvasSurface>,
    indicator: Option<Element>,
}

impl DomHost {
    /// Looks up the viewer elements. Only the root and its document
    /// reference are required; a missing canvas or indicator just disables
    /// that part of the viewer.
    pub fn from_window(window: Window) -> FlipbookResult<Self> {
        let document = window
            .document()
            .ok_or_else(|| FlipbookError::Host("window has no document".to_string()))?;

        let root = document
            .get_element_by_id(ROOT_ID)
            .and_then(|element| element.dyn_into::<HtmlElement>().ok())
            .ok_or(FlipbookError::MissingElement(ROOT_ID))?;

        let source_ref = root
            .get_attribute(SOURCE_ATTRIBUTE)
            .filter(|value| !value.trim().is_empty())
            .ok_or(FlipbookError::MissingAttribute(SOURCE_ATTRIBUTE))?;

        let left = canvas_surface(&document, LEFT_CANVAS_ID);
        let right = canvas_surface(&document, RIGHT_CANVAS_ID);
        let indicator = document.get_element_by_id(INDICATOR_ID);
        if indicator.is_none() {
            log::warn!("#{INDICATOR_ID} not found, page indicator disabled");
        }

        Ok(Self {
            window,
            document,
            root,
            source_ref,
            left,
            right,
            indicator,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Reads `data-config` JSON first, then lets individual `data-*`
    /// attributes override it.
    pub fn read_config(&self) -> Result<FlipbookConfig, ConfigError> {
        let mut config = match self.root.get_attribute(CONFIG_ATTRIBUTE) {
            Some(json) if !json.trim().is_empty() => FlipbookConfig::from_json(&json)?,
            _ => FlipbookConfig::default(),
        };

        let attributes = ATTRIBUTE_KEYS.iter().filter_map(|key| {
            self.root.get_attribute(&format!("data-{key}")).map(|value| (*key, value))
        });
        config.apply_attributes(attributes)?;

        Ok(config)
    }
}

fn canvas_surface(document: &Document, id: &str) -> Option<CanvasSurface> {
    let canvas = document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<HtmlCanvasElement>().ok());

    let Some(canvas) = canvas else {
        log::warn!("#{id} not found, that side will stay blank");
        return None;
    };

    match CanvasSurface::new(canvas) {
        Ok(surface) => Some(surface),
        Err(err) => {
            log::warn!("#{id} unusable: {err}");
            None
        }
    }
}

impl ViewerHost for DomHost {
    type Surface = CanvasSurface;

    fn source_ref(&self) -> String {
        self.source_ref.clone()
    }

    fn surface(&self, side: PageSide) -> Option<&CanvasSurface> {
        match side {
            PageSide::Left => self.left.as_ref(),
            PageSide::Right => self.right.as_ref(),
        }
    }

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|width| width.as_f64())
            .unwrap_or(0.0)
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.window.device_pixel_ratio()
    }

    fn set_indicator_text(&self, text: &str) {
        if let Some(indicator) = &self.indicator {
            indicator.set_text_content(Some(text));
        }
    }

    fn show_load_error(&self, message: &str) {
        self.root.set_text_content(None);

        let paragraph = match self.document.create_element("p") {
            Ok(paragraph) => paragraph,
            Err(_) => {
                self.root.set_text_content(Some(message));
                return;
            }
        };
        paragraph.set_text_content(Some(message));

        if self.root.append_child(&paragraph).is_err() {
            self.root.set_text_content(Some(message));
        }
    }
}
