//! WASM bindings for NFS-e to TISS conversion.
//!
//! The browser front end reads the file, shows the extracted record in an
//! editable form and downloads the generated XML. These bindings cover the
//! steps in between.

use wasm_bindgen::prelude::*;

use guia_core::nfse::RuleMatch;
use guia_core::tiss::format;
use guia_core::{
    ExtractedInvoiceRecord, GuiaConfig, InvoiceParser, ManualOverride, NfseParser, TissGenerator,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn manual_from_js(manual: JsValue) -> Result<ManualOverride, JsValue> {
    if manual.is_null() || manual.is_undefined() {
        return Ok(ManualOverride::default());
    }
    serde_wasm_bindgen::from_value(manual).map_err(to_js_error)
}

/// Extract the invoice record from NFS-e text.
///
/// Returns `null` when the text is not a readable XML document.
#[wasm_bindgen]
pub fn parse_nfse(text: &str) -> Result<JsValue, JsValue> {
    match NfseParser::new().parse(text) {
        Ok(result) => serde_wasm_bindgen::to_value(&result.record).map_err(to_js_error),
        Err(_) => Ok(JsValue::NULL),
    }
}

/// Generate the TISS document for a (possibly edited) record.
#[wasm_bindgen]
pub fn generate_tiss(record: JsValue, manual: JsValue) -> Result<String, JsValue> {
    let record: ExtractedInvoiceRecord =
        serde_wasm_bindgen::from_value(record).map_err(to_js_error)?;
    let manual = manual_from_js(manual)?;

    guia_core::generate_tiss(&record, &manual).map_err(to_js_error)
}

/// Format a currency value with two decimals ("1.234,5" -> "1234.50").
#[wasm_bindgen]
pub fn format_currency(value: Option<String>) -> String {
    format::format_currency(value.as_deref())
}

/// Strip everything but digits.
#[wasm_bindgen]
pub fn digits_only(value: &str) -> String {
    format::digits_only(value)
}

/// Converter class holding a configuration.
#[wasm_bindgen]
pub struct GuiaConverter {
    config: GuiaConfig,
}

#[wasm_bindgen]
impl GuiaConverter {
    /// Create a converter with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            config: GuiaConfig::default(),
        }
    }

    /// Create a converter from a JSON configuration document.
    #[wasm_bindgen(js_name = fromConfigJson)]
    pub fn from_config_json(json: &str) -> Result<GuiaConverter, JsValue> {
        let config: GuiaConfig = serde_json::from_str(json).map_err(to_js_error)?;
        Ok(Self { config })
    }

    /// Extract the record together with warnings and the rules that matched.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        let result = NfseParser::new()
            .with_config(self.config.extraction.clone())
            .parse(text)
            .map_err(to_js_error)?;

        #[derive(serde::Serialize)]
        struct ExtractResult {
            record: ExtractedInvoiceRecord,
            warnings: Vec<String>,
            applied_rules: Vec<RuleMatch>,
            processing_time_ms: u64,
        }

        let output = ExtractResult {
            record: result.record,
            warnings: result.warnings,
            applied_rules: result.applied_rules,
            processing_time_ms: result.processing_time_ms,
        };

        serde_wasm_bindgen::to_value(&output).map_err(to_js_error)
    }

    /// Generate the TISS document, returning `{ xml, hash }`.
    #[wasm_bindgen]
    pub fn generate(&self, record: JsValue, manual: JsValue) -> Result<JsValue, JsValue> {
        let record: ExtractedInvoiceRecord =
            serde_wasm_bindgen::from_value(record).map_err(to_js_error)?;
        let manual = manual_from_js(manual)?;

        let document = TissGenerator::new()
            .with_config(self.config.tiss.clone())
            .generate(&record, &manual)
            .map_err(to_js_error)?;

        serde_wasm_bindgen::to_value(&document).map_err(to_js_error)
    }
}

impl Default for GuiaConverter {
    fn default() -> Self {
        Self::new()
    }
}
