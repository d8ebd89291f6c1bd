#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

use guia_wasm::{generate_tiss, parse_nfse};

const NFSE: &str = r#"<CompNfse xmlns:n="urn:nfse">
  <n:InfNfse>
    <n:Numero>42</n:Numero>
    <n:Servico>
      <n:Discriminacao>Paciente: JOSE LIMA
3 DIARIAS</n:Discriminacao>
    </n:Servico>
  </n:InfNfse>
</CompNfse>"#;

#[wasm_bindgen_test]
fn parse_returns_null_for_garbage() {
    assert!(parse_nfse("not xml").unwrap().is_null());
}

#[wasm_bindgen_test]
fn parse_then_generate() {
    let record = parse_nfse(NFSE).unwrap();
    assert!(!record.is_null());

    let xml = generate_tiss(record, JsValue::UNDEFINED).unwrap();
    assert!(xml.contains("<ans:nomeBeneficiario>JOSE LIMA</ans:nomeBeneficiario>"));
    assert!(xml.contains("<ans:quantidadeExecutada>3</ans:quantidadeExecutada>"));
}
