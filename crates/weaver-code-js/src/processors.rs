//! JavaScript functions as input processors.
//!
//! A processor is called as `fn(doc, args)` where `args` is
//! `{ handled: false, event }`. Returning a document replaces the current
//! one; setting `args.handled = true` stops the pipeline and suppresses the
//! browser default.

use js_sys::{Array, Function, Object, Reflect};
use wasm_bindgen::prelude::*;
use weaver_code_browser::{
    BracketProcessor, DocumentError, EditorConfig, InputProcessor, KeyEvent, NewlineProcessor,
    Pipeline, ProcessOutcome, ProcessorKind, TabProcessor, TextDocument,
};

use crate::types::{JsKeyEvent, JsTextDocument};

fn processor_error(value: JsValue) -> DocumentError {
    let message = value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"));
    DocumentError::Processor(message)
}

fn get(target: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

/// Rebuild a document from anything shaped like `TextDocument`.
///
/// Reads `text`, `anchorIndex`, `focusIndex` and `hasSelection`, so plain
/// objects work as well as `TextDocument` instances.
pub fn document_from_js(value: &JsValue) -> Option<TextDocument> {
    let text = get(value, "text")?.as_string()?;
    let has_selection = get(value, "hasSelection")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);
    let doc = TextDocument::new(text);
    if !has_selection {
        return Some(doc);
    }
    let index = |key| get(value, key).and_then(|v| v.as_f64());
    match (index("anchorIndex"), index("focusIndex")) {
        (Some(anchor), Some(focus)) => {
            Some(doc.with_selection(anchor.max(0.0) as usize, focus.max(0.0) as usize))
        }
        (Some(offset), None) | (None, Some(offset)) => {
            let offset = offset.max(0.0) as usize;
            Some(doc.with_selection(offset, offset))
        }
        (None, None) => Some(doc),
    }
}

/// A processor backed by a JS function.
pub struct JsProcessor {
    function: Function,
}

impl JsProcessor {
    pub fn new(function: Function) -> Self {
        Self { function }
    }
}

impl InputProcessor for JsProcessor {
    fn process(
        &self,
        doc: &TextDocument,
        event: &KeyEvent,
    ) -> Result<ProcessOutcome, DocumentError> {
        let event = serde_wasm_bindgen::to_value(&JsKeyEvent::from(event))
            .map_err(|e| DocumentError::Processor(e.to_string()))?;
        let args = Object::new();
        Reflect::set(&args, &"handled".into(), &JsValue::FALSE).map_err(processor_error)?;
        Reflect::set(&args, &"event".into(), &event).map_err(processor_error)?;

        let input = JsValue::from(JsTextDocument::from(doc.clone()));
        let returned = self
            .function
            .call2(&JsValue::NULL, &input, &args)
            .map_err(processor_error)?;

        let handled = get(&args, "handled").is_some_and(|v| v.is_truthy());
        let next = if returned.is_undefined() || returned.is_null() {
            None
        } else {
            Some(document_from_js(&returned).ok_or_else(|| {
                DocumentError::Processor("processor returned a value that is not a document".into())
            })?)
        };

        Ok(match (next, handled) {
            (None, false) => ProcessOutcome::Unchanged,
            (Some(next), false) => ProcessOutcome::Replace(next),
            (next, true) => ProcessOutcome::Handled(next.unwrap_or_else(|| doc.clone())),
        })
    }

    fn name(&self) -> &str {
        "js"
    }
}

/// Build a pipeline from an array of functions and built-in names.
pub fn pipeline_from_js(value: &JsValue, config: &EditorConfig) -> Result<Pipeline, JsError> {
    let array = value
        .dyn_ref::<Array>()
        .ok_or_else(|| JsError::new("pipeline must be an array"))?;
    let mut pipeline = Pipeline::new();
    for entry in array.iter() {
        if let Some(function) = entry.dyn_ref::<Function>() {
            pipeline.push(JsProcessor::new(function.clone()));
            continue;
        }
        let name = entry
            .as_string()
            .ok_or_else(|| JsError::new("pipeline entries must be functions or processor names"))?;
        let kind: ProcessorKind = serde_wasm_bindgen::from_value(JsValue::from_str(&name))
            .map_err(|_| JsError::new(&format!("unknown processor `{name}`")))?;
        match kind {
            ProcessorKind::Tab => pipeline.push(TabProcessor::new(
                config.tab.clone(),
                config.tab_processor.clone(),
            )),
            ProcessorKind::Newline => pipeline.push(
                NewlineProcessor::new(config.tab.clone(), &config.newline_processor)
                    .map_err(crate::types::js_error)?,
            ),
            ProcessorKind::Bracket => {
                pipeline.push(BracketProcessor::new(config.bracket_processor.clone()))
            }
        }
    }
    Ok(pipeline)
}
