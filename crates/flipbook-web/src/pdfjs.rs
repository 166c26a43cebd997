//! pdf.js as the document renderer.
//!
//! Expects the pdf.js module to have been loaded by the host page, which
//! publishes it as `globalThis.pdfjsLib`.

use crate::dom::CanvasSurface;
use flipbook_core::{
    DocumentHandle, DocumentSource, FlipbookError, PageHandle, PageViewport, PaintTask,
};
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use js_sys::{Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    type LoadingTask;

    #[wasm_bindgen(catch, js_namespace = pdfjsLib, js_name = getDocument)]
    fn get_document(src: &str) -> Result<LoadingTask, JsValue>;

    #[wasm_bindgen(method, getter)]
    fn promise(this: &LoadingTask) -> Promise;

    #[derive(Clone)]
    type PdfDocumentProxy;

    #[wasm_bindgen(method, getter, js_name = numPages)]
    fn num_pages(this: &PdfDocumentProxy) -> u32;

    #[wasm_bindgen(method, js_name = getPage)]
    fn get_page(this: &PdfDocumentProxy, number: u32) -> Promise;

    #[derive(Clone)]
    type PdfPageProxy;

    #[wasm_bindgen(method, js_name = getViewport)]
    fn get_viewport(this: &PdfPageProxy, params: &Object) -> PdfPageViewport;

    #[wasm_bindgen(method, catch)]
    fn render(this: &PdfPageProxy, params: &Object) -> Result<RenderTask, JsValue>;

    type PdfPageViewport;

    #[wasm_bindgen(method, getter)]
    fn width(this: &PdfPageViewport) -> f64;

    #[wasm_bindgen(method, getter)]
    fn height(this: &PdfPageViewport) -> f64;

    #[derive(Clone)]
    type RenderTask;

    #[wasm_bindgen(method, getter)]
    fn promise(this: &RenderTask) -> Promise;

    /// Stops the render; its promise then rejects with a cancellation error.
    #[wasm_bindgen(method)]
    fn cancel(this: &RenderTask);
}

/// Best-effort text for a thrown JS value.
pub(crate) fn js_error_message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }

    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn object_with(entries: &[(&str, &JsValue)]) -> Result<Object, JsValue> {
    let object = Object::new();
    for (key, value) in entries {
        Reflect::set(&object, &JsValue::from_str(key), value)?;
    }
    Ok(object)
}

pub struct PdfJsSource;

impl PdfJsSource {
    /// Points pdf.js at its worker script. A missing `pdfjsLib` is reported
    /// here but is not fatal; the open call will fail and surface it.
    pub fn new(worker_src: &str) -> Self {
        if let Err(err) = set_worker_src(worker_src) {
            log::warn!("could not set pdf.js worker source: {}", js_error_message(&err));
        }
        Self
    }
}

fn set_worker_src(worker_src: &str) -> Result<(), JsValue> {
    let library = Reflect::get(&js_sys::global(), &JsValue::from_str("pdfjsLib"))?;
    if library.is_undefined() {
        return Err(JsValue::from_str("pdfjsLib is not loaded"));
    }

    let options = Reflect::get(&library, &JsValue::from_str("GlobalWorkerOptions"))?;
    Reflect::set(&options, &JsValue::from_str("workerSrc"), &JsValue::from_str(worker_src))?;
    Ok(())
}

impl DocumentSource for PdfJsSource {
    type Document = PdfJsDocument;

    fn open(
        &self,
        source_ref: &str,
    ) -> LocalBoxFuture<'static, Result<PdfJsDocument, FlipbookError>> {
        let task = get_document(source_ref);

        async move {
            let task =
                task.map_err(|err| FlipbookError::DocumentOpen(js_error_message(&err)))?;
            let proxy = JsFuture::from(task.promise())
                .await
                .map_err(|err| FlipbookError::DocumentOpen(js_error_message(&err)))?;

            Ok(PdfJsDocument {
                proxy: proxy.unchecked_into(),
            })
        }
        .boxed_local()
    }
}

pub struct PdfJsDocument {
    proxy: PdfDocumentProxy,
}

impl DocumentHandle for PdfJsDocument {
    type Surface = CanvasSurface;
    type Page = PdfJsPage;

    fn page_count(&self) -> u32 {
        self.proxy.num_pages()
    }

    fn page(&self, number: u32) -> LocalBoxFuture<'static, Result<PdfJsPage, FlipbookError>> {
        let promise = self.proxy.get_page(number);

        async move {
            let page = JsFuture::from(promise).await.map_err(|err| FlipbookError::PageFetch {
                page: number,
                reason: js_error_message(&err),
            })?;

            Ok(PdfJsPage {
                number,
                proxy: page.unchecked_into(),
            })
        }
        .boxed_local()
    }
}

pub struct PdfJsPage {
    number: u32,
    proxy: PdfPageProxy,
}

impl PdfJsPage {
    fn js_viewport(&self, scale: f64) -> Result<PdfPageViewport, JsValue> {
        let params = object_with(&[("scale", &JsValue::from_f64(scale))])?;
        Ok(self.proxy.get_viewport(&params))
    }

    fn start_render(&self, surface: &CanvasSurface, scale: f64) -> Result<RenderTask, JsValue> {
        let viewport = self.js_viewport(scale)?;
        let context: &JsValue = surface.context();
        let viewport: &JsValue = &viewport;
        let params = object_with(&[("canvasContext", context), ("viewport", viewport)])?;

        self.proxy.render(&params)
    }

    fn paint_error(&self, err: &JsValue) -> FlipbookError {
        FlipbookError::Paint {
            page: self.number,
            reason: js_error_message(err),
        }
    }
}

impl PageHandle for PdfJsPage {
    type Surface = CanvasSurface;

    fn viewport(&self, scale: f64) -> PageViewport {
        match self.js_viewport(scale) {
            Ok(viewport) => PageViewport {
                scale,
                width: viewport.width(),
                height: viewport.height(),
            },
            Err(err) => {
                log::warn!("page {} viewport unavailable: {}", self.number, js_error_message(&err));
                PageViewport {
                    scale,
                    width: 0.0,
                    height: 0.0,
                }
            }
        }
    }

    /// pdf.js refuses a second render on a canvas that is still busy, so the
    /// returned task cancels the underlying `RenderTask`.
    fn render_into(&self, surface: &CanvasSurface, viewport: PageViewport) -> PaintTask {
        let task = match self.start_render(surface, viewport.scale) {
            Ok(task) => task,
            Err(err) => return PaintTask::ready(Err(self.paint_error(&err))),
        };

        let number = self.number;
        let promise = task.promise();
        PaintTask::new(async move {
            JsFuture::from(promise).await.map_err(|err| FlipbookError::Paint {
                page: number,
                reason: js_error_message(&err),
            })?;
            Ok(())
        })
        .on_cancel(move || task.cancel())
    }
}
