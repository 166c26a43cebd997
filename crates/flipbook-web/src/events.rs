//! Wires page input to the viewer.
//!
//! Listeners live as long as the page, so their closures are leaked with
//! `forget` once registered.

use crate::dom::{NEXT_BUTTON_ID, PREV_BUTTON_ID};
use crate::WebViewer;
use flipbook_core::NavigationAction;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget, HtmlElement, KeyboardEvent};

pub fn bind(viewer: &Rc<WebViewer>) -> Result<(), JsValue> {
    let window = viewer.host().window().clone();
    let document = viewer.host().document().clone();

    let buttons = [
        (PREV_BUTTON_ID, NavigationAction::Prev),
        (NEXT_BUTTON_ID, NavigationAction::Next),
    ];
    for (id, action) in buttons {
        let Some(button) = document.get_element_by_id(id) else {
            log::warn!("#{id} not found, button navigation disabled");
            continue;
        };

        let viewer = Rc::clone(viewer);
        listen(&button, "click", move |_event: Event| viewer.spawn_navigation(action))?;
    }

    {
        let viewer = Rc::clone(viewer);
        listen(&document, "keydown", move |event: Event| {
            let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            if event.ctrl_key() || event.meta_key() || event.alt_key() {
                return;
            }
            if targets_text_entry(event) {
                return;
            }
            if let Some(action) = NavigationAction::from_key(&event.key()) {
                event.prevent_default();
                viewer.spawn_navigation(action);
            }
        })?;
    }

    {
        let viewer = Rc::clone(viewer);
        listen(&window, "resize", move |_event: Event| viewer.on_window_resize())?;
    }

    match window.visual_viewport() {
        Some(visual_viewport) => {
            let resize_viewer = Rc::clone(viewer);
            listen(&visual_viewport, "resize", move |_event: Event| {
                resize_viewer.on_viewport_metrics_change()
            })?;

            let scroll_viewer = Rc::clone(viewer);
            listen(&visual_viewport, "scroll", move |_event: Event| {
                scroll_viewer.on_viewport_scroll()
            })?;
        }
        None => log::warn!("visualViewport unavailable, pinch-zoom freeze disabled"),
    }

    Ok(())
}

/// Arrow keys typed into a form field belong to that field.
fn targets_text_entry(event: &KeyboardEvent) -> bool {
    event
        .target()
        .and_then(|target| target.dyn_into::<HtmlElement>().ok())
        .is_some_and(|element| is_text_entry(&element.tag_name(), element.is_content_editable()))
}

fn is_text_entry(tag_name: &str, content_editable: bool) -> bool {
    content_editable
        || ["INPUT", "TEXTAREA", "SELECT"]
            .iter()
            .any(|tag| tag_name.eq_ignore_ascii_case(tag))
}

fn listen<F>(target: &EventTarget, event: &str, handler: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
