//! WASM bindings for the sunburst-core library.
//!
//! All functions exposed to JavaScript via wasm-bindgen are defined here.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde_json::to_string;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::chart::{Chart, FocusListener, Settled};
use crate::config::ChartConfig;
use crate::error::SunburstError;
use crate::layout::NodeId;
use crate::output::{ErrorInfo, ErrorOutput};
use crate::render::{build_scene, to_svg};
use crate::tree::TreeNode;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = log)]
    pub fn console_log(s: &str);

    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub fn console_error(s: &str);
}

fn to_js(e: SunburstError) -> JsValue {
    console_error(&format!("sunburst: {e}"));
    JsValue::from_str(&e.to_string())
}

fn error_json(e: &SunburstError) -> String {
    let output = ErrorOutput { error: ErrorInfo { message: e.to_string() } };
    to_string(&output).unwrap_or_else(|_| "{\"error\": {\"message\": \"unknown\"}}".to_string())
}

fn load(tree_json: &str, config_json: Option<&str>) -> Result<Chart, SunburstError> {
    let tree = TreeNode::from_json(tree_json)?;
    let config = match config_json {
        Some(json) if !json.trim().is_empty() => ChartConfig::from_json(json)?,
        _ => ChartConfig::default(),
    };
    Chart::new(tree, config)
}

/// Lay out a tree and return the initial scene as JSON, fully shown.
#[wasm_bindgen]
pub fn render_scene(tree_json: &str, config_json: &str) -> String {
    let mut chart = match load(tree_json, Some(config_json)) {
        Ok(chart) => chart,
        Err(e) => {
            console_error(&format!("Error building chart: {e}"));
            return error_json(&e);
        }
    };
    show_now(&mut chart);
    to_string(&build_scene(&chart)).unwrap_or_else(|e| error_json(&e.into()))
}

/// Lay out a tree and return the initial chart as an SVG document.
/// Returns an empty string when the input is rejected.
#[wasm_bindgen]
pub fn render_svg(tree_json: &str, config_json: &str) -> String {
    match load(tree_json, Some(config_json)) {
        Ok(mut chart) => {
            show_now(&mut chart);
            to_svg(&build_scene(&chart))
        }
        Err(e) => {
            console_error(&format!("Error building chart: {e}"));
            String::new()
        }
    }
}

fn show_now(chart: &mut Chart) {
    let fade = chart.config().fade_duration_ms;
    chart.enter(0.0);
    chart.tick(fade);
}

/// Calls a page function with the focused name, outside the current call
/// stack so the page may call back into the chart.
struct JsFocusListener(js_sys::Function);

impl FocusListener for JsFocusListener {
    fn focus_changed(&self, name: &str) {
        let callback = self.0.clone();
        let name = JsValue::from_str(name);
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = callback.call1(&JsValue::NULL, &name) {
                console_error(&format!("focus listener failed: {e:?}"));
            }
        });
    }
}

fn settled_promise(settled: Settled) -> js_sys::Promise {
    wasm_bindgen_futures::future_to_promise(async move {
        settled
            .await
            .map(|_| JsValue::UNDEFINED)
            .map_err(|_| JsValue::from_str("animation abandoned"))
    })
}

fn now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// requestAnimationFrame loop that redraws the host while anything animates.
struct FrameLoop {
    chart: Rc<RefCell<Chart>>,
    host: web_sys::Element,
    callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
    running: Cell<bool>,
}

impl FrameLoop {
    fn new(chart: Rc<RefCell<Chart>>, host: web_sys::Element) -> Rc<Self> {
        let frames = Rc::new(Self {
            chart,
            host,
            callback: RefCell::new(None),
            running: Cell::new(false),
        });
        let weak: Weak<FrameLoop> = Rc::downgrade(&frames);
        let callback = Closure::<dyn FnMut(f64)>::new(move |ts: f64| {
            if let Some(frames) = weak.upgrade() {
                frames.frame(ts);
            }
        });
        *frames.callback.borrow_mut() = Some(callback);
        frames
    }

    fn draw(&self) {
        let svg = to_svg(&build_scene(&self.chart.borrow()));
        self.host.set_inner_html(&svg);
    }

    fn frame(&self, ts: f64) {
        let animating = {
            let mut chart = self.chart.borrow_mut();
            chart.tick(ts);
            chart.is_animating()
        };
        self.draw();
        self.running.set(false);
        if animating {
            self.kick();
        }
    }

    fn kick(&self) {
        if self.running.get() {
            return;
        }
        let Some(window) = web_sys::window() else { return };
        if let Some(cb) = self.callback.borrow().as_ref() {
            match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                Ok(_) => self.running.set(true),
                Err(e) => console_error(&format!("requestAnimationFrame failed: {e:?}")),
            }
        }
    }
}

/// Route clicks on `[data-node]` elements to the chart.
fn on_click(chart: &Rc<RefCell<Chart>>, frames: &Rc<FrameLoop>, event: web_sys::Event) {
    let Some(target) = event.target().and_then(|t| t.dyn_into::<web_sys::Element>().ok()) else {
        return;
    };
    let Ok(Some(hit)) = target.closest("[data-node]") else { return };

    let now = now();
    let result = if hit.get_attribute("data-hub").is_some() {
        chart.borrow_mut().click_hub(now).map(|_| ())
    } else {
        match hit.get_attribute("data-node").and_then(|id| id.parse::<usize>().ok()) {
            Some(id) => chart.borrow_mut().click(NodeId(id), now).map(|_| ()),
            None => return,
        }
    };
    match result {
        Ok(()) => frames.kick(),
        Err(e) => console_error(&format!("click failed: {e}")),
    }
}

#[wasm_bindgen]
pub struct SunburstChart {
    chart: Rc<RefCell<Chart>>,
    frames: Option<Rc<FrameLoop>>,
    click: Option<Closure<dyn FnMut(web_sys::Event)>>,
    /// Element id the chart is mounted on. The page holds the click and
    /// frame closures until the chart is freed.
    mounted: Option<String>,
}

impl SunburstChart {
    fn ensure_unmounted(&self) -> Result<(), SunburstError> {
        match &self.mounted {
            Some(id) => Err(SunburstError::AlreadyMounted(id.clone())),
            None => Ok(()),
        }
    }

    /// Wake the frame loop when mounted.
    fn changed(&self) {
        if let Some(frames) = &self.frames {
            frames.kick();
        }
    }
}

#[wasm_bindgen]
impl SunburstChart {
    #[wasm_bindgen(constructor)]
    pub fn new(tree_json: &str, config_json: Option<String>) -> Result<SunburstChart, JsValue> {
        let chart = load(tree_json, config_json.as_deref()).map_err(to_js)?;
        console_log(&format!("sunburst: {} nodes", chart.layout().len()));
        Ok(Self { chart: Rc::new(RefCell::new(chart)), frames: None, click: None, mounted: None })
    }

    pub fn scene_json(&self) -> String {
        to_string(&build_scene(&self.chart.borrow())).unwrap_or_else(|e| error_json(&e.into()))
    }

    pub fn svg(&self) -> String {
        to_svg(&build_scene(&self.chart.borrow()))
    }

    /// Click an arc by id. Returns the new focus name, or nothing for leaves.
    pub fn click(&self, id: usize, now: f64) -> Result<Option<String>, JsValue> {
        let focused = self.chart.borrow_mut().click(NodeId(id), now).map_err(to_js)?;
        self.changed();
        let chart = self.chart.borrow();
        Ok(focused.and_then(|nid| chart.layout().get(nid)).map(|n| n.name.clone()))
    }

    /// Click the hub. Returns the new focus name.
    pub fn click_hub(&self, now: f64) -> Result<String, JsValue> {
        let nid = self.chart.borrow_mut().click_hub(now).map_err(to_js)?;
        self.changed();
        let chart = self.chart.borrow();
        Ok(chart.layout().get(nid).map(|n| n.name.clone()).unwrap_or_default())
    }

    /// Focus a node by its `/`-joined path from the root.
    pub fn focus_path(&self, path: &str, now: f64) -> Result<bool, JsValue> {
        let nid = self.chart.borrow().layout().find_by_path(path);
        let Some(nid) = nid else {
            console_error(&format!("sunburst: no node at '{path}'"));
            return Ok(false);
        };
        let focused = self.chart.borrow_mut().focus_on(nid, now).map_err(to_js)?;
        self.changed();
        Ok(focused)
    }

    /// Advance animations. Returns the completed events as JSON.
    pub fn tick(&self, now: f64) -> String {
        let events = self.chart.borrow_mut().tick(now);
        to_string(&events).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn enter(&self, now: f64) {
        self.chart.borrow_mut().enter(now);
        self.changed();
    }

    pub fn rebuild(&self, criterion: &str, now: f64) -> Result<(), JsValue> {
        self.chart.borrow_mut().rebuild(criterion, now).map_err(to_js)?;
        self.changed();
        Ok(())
    }

    pub fn is_animating(&self) -> bool {
        self.chart.borrow().is_animating()
    }

    /// Register the page's statistics callback, called with the focused name.
    pub fn on_focus(&self, callback: js_sys::Function) {
        self.chart.borrow_mut().set_focus_listener(JsFocusListener(callback));
    }

    /// Promise resolved when the running zoom completes.
    pub fn zoom_settled(&self) -> js_sys::Promise {
        settled_promise(self.chart.borrow_mut().zoom_settled())
    }

    /// Promise resolved when the chart is fully shown.
    pub fn settled(&self) -> js_sys::Promise {
        settled_promise(self.chart.borrow_mut().stage_settled())
    }

    /// Render into the element with `element_id`, route its clicks to the
    /// chart and animate with requestAnimationFrame. Starts the fade-in.
    pub fn mount(&mut self, element_id: &str) -> Result<(), JsValue> {
        self.ensure_unmounted().map_err(to_js)?;
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let host = document
            .get_element_by_id(element_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element '{element_id}'")))?;

        let frames = FrameLoop::new(self.chart.clone(), host.clone());

        let chart = self.chart.clone();
        let click_frames = frames.clone();
        let click = Closure::<dyn FnMut(web_sys::Event)>::new(move |event: web_sys::Event| {
            on_click(&chart, &click_frames, event);
        });
        host.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;

        frames.draw();
        self.chart.borrow_mut().enter(now());
        frames.kick();

        self.frames = Some(frames);
        self.click = Some(click);
        self.mounted = Some(element_id.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> SunburstChart {
        let tree = TreeNode::new("app", 0.0).with_children(vec![TreeNode::new("react", 1.0)]);
        let chart = Chart::new(tree, ChartConfig::default()).unwrap();
        SunburstChart { chart: Rc::new(RefCell::new(chart)), frames: None, click: None, mounted: None }
    }

    #[test]
    fn test_first_mount_is_allowed() {
        assert!(chart().ensure_unmounted().is_ok());
    }

    #[test]
    fn test_second_mount_is_rejected() {
        let mut chart = chart();
        chart.mounted = Some("sunburst".to_string());
        let err = chart.ensure_unmounted().unwrap_err();
        assert!(matches!(err, SunburstError::AlreadyMounted(id) if id == "sunburst"));
    }

    #[test]
    fn test_load_uses_default_config_for_blank_input() {
        let chart = load(r#"{"name": "app", "children": [{"name": "a", "size": 2}]}"#, Some("  ")).unwrap();
        assert_eq!(chart.config(), &ChartConfig::default());
        assert_eq!(chart.layout().len(), 2);
    }
}
