//! Line-number gutter and line highlight overlays.
//!
//! Both consume the bridge's line metrics and never take part in text or
//! selection logic. Line numbers are 1-based.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};
use weaver_code_core::GutterConfig;

use crate::bridge::LineMetric;
use crate::error::DomError;

pub const GUTTER_CLASS: &str = "weaver-code-gutter";
pub const GUTTER_LINE_CLASS: &str = "weaver-code-gutter-line";
pub const HIGHLIGHTED_CLASS: &str = "weaver-code-highlighted";
pub const HIGHLIGHT_LAYER_CLASS: &str = "weaver-code-highlights";
pub const HIGHLIGHT_CLASS: &str = "weaver-code-line-highlight";

/// Consumer of line counts and metrics.
pub trait Gutter {
    fn set_number_of_lines(&self, count: usize) -> Result<(), DomError>;

    /// Re-render one line, e.g. after its customizer state changed.
    fn update_line_number(&self, line: usize);

    fn set_line_metrics(&self, metrics: &[LineMetric]);

    fn set_highlighted_line(&self, line: Option<usize>);

    /// Follow the editor's vertical scroll.
    fn set_scroll_offset(&self, _top: f64) {}
}

/// DOM slots of one gutter row, handed to the customizer.
#[derive(Debug, Clone)]
pub struct GutterLine {
    pub row: HtmlElement,
    pub number: HtmlElement,
    /// Free slot for markers such as breakpoints.
    pub accessory: HtmlElement,
}

/// Per-line hook run whenever a gutter row is (re)rendered.
pub trait LineCustomizer {
    fn customize(&self, line: usize, elements: &GutterLine);
}

impl<F: Fn(usize, &GutterLine)> LineCustomizer for F {
    fn customize(&self, line: usize, elements: &GutterLine) {
        self(line, elements)
    }
}

pub(crate) fn create_div(document: &Document, class: &str) -> Result<HtmlElement, DomError> {
    let element = document
        .create_element("div")
        .map_err(|e| DomError::js("create_element", e))?
        .dyn_into::<HtmlElement>()
        .map_err(|_| DomError::Js {
            operation: "dyn_into",
            message: "created element is not an HtmlElement".into(),
        })?;
    element.set_class_name(class);
    Ok(element)
}

fn place(element: &HtmlElement, metric: LineMetric) {
    let style = element.style();
    let _ = style.set_property("top", &format!("{}px", metric.top));
    let _ = style.set_property("height", &format!("{}px", metric.height));
}

/// The default DOM gutter: one numbered row per line.
pub struct LineNumberGutter {
    document: Document,
    element: HtmlElement,
    rows: RefCell<Vec<GutterLine>>,
    metrics: RefCell<Vec<LineMetric>>,
    highlighted: Cell<Option<usize>>,
    customizer: Option<Rc<dyn LineCustomizer>>,
}

impl LineNumberGutter {
    pub fn new(
        document: Document,
        config: &GutterConfig,
        customizer: Option<Rc<dyn LineCustomizer>>,
    ) -> Result<Self, DomError> {
        let element = create_div(&document, GUTTER_CLASS)?;
        if let Some(class) = config.class.as_deref().filter(|c| !c.is_empty()) {
            let _ = element.class_list().add_1(class);
        }
        let style = element.style();
        if let Some(width) = &config.width {
            let _ = style.set_property("width", width);
        }
        if !config.border {
            let _ = style.set_property("border", "none");
        }
        let _ = element.set_attribute("aria-hidden", "true");
        Ok(Self {
            document,
            element,
            rows: RefCell::new(Vec::new()),
            metrics: RefCell::new(Vec::new()),
            highlighted: Cell::new(None),
            customizer,
        })
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    pub fn len(&self) -> usize {
        self.rows.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.borrow().is_empty()
    }

    fn render_row(&self, line: usize, row: &GutterLine) {
        row.number.set_text_content(Some(&line.to_string()));
        let highlighted = self.highlighted.get() == Some(line);
        let _ = row
            .row
            .class_list()
            .toggle_with_force(HIGHLIGHTED_CLASS, highlighted);
        if let Some(metric) = self.metrics.borrow().get(line - 1) {
            place(&row.row, *metric);
        }
        if let Some(customizer) = &self.customizer {
            customizer.customize(line, row);
        }
    }

    fn create_row(&self) -> Result<GutterLine, DomError> {
        let row = create_div(&self.document, GUTTER_LINE_CLASS)?;
        let number = create_div(&self.document, "weaver-code-gutter-number")?;
        let accessory = create_div(&self.document, "weaver-code-gutter-accessory")?;
        row.append_child(&number)
            .map_err(|e| DomError::js("append_child", e))?;
        row.append_child(&accessory)
            .map_err(|e| DomError::js("append_child", e))?;
        self.element
            .append_child(&row)
            .map_err(|e| DomError::js("append_child", e))?;
        Ok(GutterLine {
            row,
            number,
            accessory,
        })
    }
}

impl Gutter for LineNumberGutter {
    fn set_number_of_lines(&self, count: usize) -> Result<(), DomError> {
        let current = self.len();
        if count < current {
            for row in self.rows.borrow_mut().drain(count..) {
                row.row.remove();
            }
        } else {
            for line in current + 1..=count {
                let row = self.create_row()?;
                self.render_row(line, &row);
                self.rows.borrow_mut().push(row);
            }
        }
        Ok(())
    }

    fn update_line_number(&self, line: usize) {
        let row = line
            .checked_sub(1)
            .and_then(|i| self.rows.borrow().get(i).cloned());
        if let Some(row) = row {
            self.render_row(line, &row);
        }
    }

    fn set_line_metrics(&self, metrics: &[LineMetric]) {
        *self.metrics.borrow_mut() = metrics.to_vec();
        for (row, metric) in self.rows.borrow().iter().zip(metrics) {
            place(&row.row, *metric);
        }
    }

    fn set_highlighted_line(&self, line: Option<usize>) {
        let previous = self.highlighted.replace(line);
        let rows = self.rows.borrow();
        for (line, on) in [(previous, false), (line, true)] {
            if let Some(row) = line.and_then(|l| l.checked_sub(1)).and_then(|i| rows.get(i)) {
                let _ = row.row.class_list().toggle_with_force(HIGHLIGHTED_CLASS, on);
            }
        }
    }

    fn set_scroll_offset(&self, top: f64) {
        let _ = self
            .element
            .style()
            .set_property("transform", &format!("translateY({}px)", -top));
    }
}

// === Line highlights ===

struct HighlightEntry {
    element: HtmlElement,
    line: Option<usize>,
    visible: bool,
    css_class: Option<String>,
    deleted: bool,
}

struct HighlightLayer {
    document: Document,
    element: HtmlElement,
    entries: RefCell<Vec<Rc<RefCell<HighlightEntry>>>>,
    metrics: RefCell<Vec<LineMetric>>,
}

impl HighlightLayer {
    fn layout(&self, entry: &HighlightEntry) {
        let metric = entry
            .line
            .and_then(|l| l.checked_sub(1))
            .and_then(|i| self.metrics.borrow().get(i).copied());
        let style = entry.element.style();
        match metric {
            Some(metric) if entry.visible => {
                let _ = style.remove_property("display");
                place(&entry.element, metric);
            }
            _ => {
                let _ = style.set_property("display", "none");
            }
        }
    }
}

/// Registry of overlay highlights positioned from line metrics.
#[derive(Clone)]
pub struct LineHighlights {
    layer: Rc<HighlightLayer>,
}

impl LineHighlights {
    pub fn new(document: Document) -> Result<Self, DomError> {
        let element = create_div(&document, HIGHLIGHT_LAYER_CLASS)?;
        let _ = element.set_attribute("aria-hidden", "true");
        Ok(Self {
            layer: Rc::new(HighlightLayer {
                document,
                element,
                entries: RefCell::new(Vec::new()),
                metrics: RefCell::new(Vec::new()),
            }),
        })
    }

    pub fn element(&self) -> &HtmlElement {
        &self.layer.element
    }

    pub fn len(&self) -> usize {
        self.layer.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.layer.entries.borrow().is_empty()
    }

    /// Add a hidden highlight with no line.
    pub fn create(&self) -> Result<HighlightHandle, DomError> {
        let element = create_div(&self.layer.document, HIGHLIGHT_CLASS)?;
        self.layer
            .element
            .append_child(&element)
            .map_err(|e| DomError::js("append_child", e))?;
        let entry = Rc::new(RefCell::new(HighlightEntry {
            element,
            line: None,
            visible: false,
            css_class: None,
            deleted: false,
        }));
        self.layer.layout(&entry.borrow());
        self.layer.entries.borrow_mut().push(entry.clone());
        Ok(HighlightHandle {
            entry,
            layer: Rc::downgrade(&self.layer),
        })
    }

    pub fn set_line_metrics(&self, metrics: &[LineMetric]) {
        *self.layer.metrics.borrow_mut() = metrics.to_vec();
        for entry in self.layer.entries.borrow().iter() {
            self.layer.layout(&entry.borrow());
        }
    }

    pub fn set_scroll_offset(&self, top: f64) {
        let _ = self
            .layer
            .element
            .style()
            .set_property("transform", &format!("translateY({}px)", -top));
    }

    /// Remove every highlight.
    pub fn clear(&self) {
        for entry in self.layer.entries.borrow_mut().drain(..) {
            let mut entry = entry.borrow_mut();
            entry.deleted = true;
            entry.element.remove();
        }
    }
}

/// One overlay highlight. Setters take effect immediately.
#[derive(Clone)]
pub struct HighlightHandle {
    entry: Rc<RefCell<HighlightEntry>>,
    layer: Weak<HighlightLayer>,
}

impl HighlightHandle {
    fn update(&self, f: impl FnOnce(&mut HighlightEntry)) {
        if self.is_deleted() {
            return;
        }
        f(&mut self.entry.borrow_mut());
        if let Some(layer) = self.layer.upgrade() {
            layer.layout(&self.entry.borrow());
        }
    }

    pub fn line_number(&self) -> Option<usize> {
        self.entry.borrow().line
    }

    pub fn set_line_number(&self, line: Option<usize>) {
        self.update(|e| e.line = line);
    }

    pub fn visible(&self) -> bool {
        self.entry.borrow().visible
    }

    pub fn set_visible(&self, visible: bool) {
        self.update(|e| e.visible = visible);
    }

    pub fn css_class(&self) -> Option<String> {
        self.entry.borrow().css_class.clone()
    }

    pub fn set_css_class(&self, class: Option<String>) {
        self.update(|e| {
            let list = e.element.class_list();
            if let Some(old) = e.css_class.take() {
                let _ = list.remove_1(&old);
            }
            if let Some(new) = class.as_deref().filter(|c| !c.is_empty()) {
                let _ = list.add_1(new);
            }
            e.css_class = class;
        });
    }

    /// Remove the highlight. Later setter calls are ignored.
    pub fn delete(&self) {
        {
            let mut entry = self.entry.borrow_mut();
            entry.deleted = true;
            entry.element.remove();
        }
        if let Some(layer) = self.layer.upgrade() {
            layer
                .entries
                .borrow_mut()
                .retain(|e| !Rc::ptr_eq(e, &self.entry));
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.entry.borrow().deleted || self.layer.upgrade().is_none()
    }
}
