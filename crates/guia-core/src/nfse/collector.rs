//! Structural field collection from a parsed NFS-e tree.
//!
//! Municipal layouts (ABRASF 1.x/2.x, GINFES, ISSNet, ...) nest the same
//! elements at different depths. Each field is looked up under its semantic
//! parent first; when none of the parent candidates exist the whole document
//! is searched, for fields where that cannot pick up the wrong party.

use chrono::NaiveDate;
use roxmltree::{Document, Node};

use super::xml::{find_element, find_text};

/// Where to look for one record field.
#[derive(Debug, Clone, Copy)]
pub struct FieldLookup {
    /// Parent elements, in order of preference.
    pub contexts: &'static [&'static str],
    /// Candidate element names under the parent, in order of preference.
    pub tags: &'static [&'static str],
    /// Search the whole document when no parent exists.
    pub document_fallback: bool,
}

impl FieldLookup {
    /// Resolve the lookup against a document. Empty results are `None`.
    pub fn resolve(&self, doc: &Document<'_>) -> Option<String> {
        let root = doc.root();
        let context = self
            .contexts
            .iter()
            .find_map(|name| find_element(root, name));

        let scope = match context {
            Some(node) => node,
            None if self.document_fallback => root,
            None => return None,
        };

        first_text(scope, self.tags)
    }
}

fn first_text(scope: Node<'_, '_>, tags: &[&str]) -> Option<String> {
    tags.iter()
        .map(|tag| find_text(Some(scope), tag))
        .find(|text| !text.is_empty())
}

const PROVIDER_BLOCKS: &[&str] = &["PrestadorServico", "Prestador"];
const CLIENT_BLOCKS: &[&str] = &["TomadorServico", "Tomador"];

pub const CLIENT_TAX_ID: FieldLookup = FieldLookup {
    contexts: CLIENT_BLOCKS,
    tags: &["Cnpj", "Cpf"],
    document_fallback: false,
};

pub const INVOICE_NUMBER: FieldLookup = FieldLookup {
    contexts: &["InfNfse"],
    tags: &["Numero"],
    document_fallback: true,
};

pub const PROVIDER_NAME: FieldLookup = FieldLookup {
    contexts: PROVIDER_BLOCKS,
    tags: &["RazaoSocial", "NomeFantasia"],
    document_fallback: false,
};

pub const DESCRIPTION: FieldLookup = FieldLookup {
    contexts: &["Servico"],
    tags: &["Discriminacao"],
    document_fallback: true,
};

pub const TOTAL_VALUE: FieldLookup = FieldLookup {
    contexts: &["Valores"],
    tags: &["ValorServicos", "ValorLiquidoNfse"],
    document_fallback: true,
};

pub const ISSUE_DATE: FieldLookup = FieldLookup {
    contexts: &["InfNfse"],
    tags: &["DataEmissao", "DataEmissaoRps"],
    document_fallback: true,
};

/// Provider tax id lookup; the document-wide fallback is configurable.
pub fn provider_tax_id(document_fallback: bool) -> FieldLookup {
    FieldLookup {
        contexts: PROVIDER_BLOCKS,
        tags: &["Cnpj", "Cpf"],
        document_fallback,
    }
}

/// Structural fields read straight from the document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuralFields {
    pub provider_tax_id: Option<String>,
    pub client_tax_id: Option<String>,
    pub invoice_number: Option<String>,
    pub provider_name: Option<String>,
    pub description: Option<String>,
    pub total_value: Option<String>,
    pub issue_date: Option<NaiveDate>,
}

/// Run the fixed lookup plan over a parsed document.
pub fn collect(doc: &Document<'_>, document_fallback: bool) -> StructuralFields {
    StructuralFields {
        provider_tax_id: provider_tax_id(document_fallback).resolve(doc),
        client_tax_id: CLIENT_TAX_ID.resolve(doc),
        invoice_number: INVOICE_NUMBER.resolve(doc),
        provider_name: PROVIDER_NAME.resolve(doc),
        description: DESCRIPTION.resolve(doc),
        total_value: TOTAL_VALUE.resolve(doc),
        issue_date: ISSUE_DATE.resolve(doc).as_deref().and_then(parse_issue_date),
    }
}

/// Parse an NFS-e date or timestamp ("2024-12-31T10:00:00", "2024-12-31", "31/12/2024").
pub fn parse_issue_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let head = value.get(..10).unwrap_or(value);

    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(head, "%d/%m/%Y"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ABRASF_V2: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CompNfse xmlns="http://www.abrasf.org.br/nfse.xsd">
  <Nfse versao="2.02">
    <InfNfse Id="nfse1">
      <Numero>202400000000123</Numero>
      <CodigoVerificacao>ABC123</CodigoVerificacao>
      <DataEmissao>2025-01-05T14:32:10</DataEmissao>
      <ValoresNfse>
        <ValorLiquidoNfse>45000.00</ValorLiquidoNfse>
      </ValoresNfse>
      <PrestadorServico>
        <IdentificacaoPrestador>
          <CpfCnpj><Cnpj>11222333000181</Cnpj></CpfCnpj>
        </IdentificacaoPrestador>
        <RazaoSocial>HOSPITAL SANTA CLARA LTDA</RazaoSocial>
      </PrestadorServico>
      <DeclaracaoPrestacaoServico>
        <InfDeclaracaoPrestacaoServico>
          <Servico>
            <Valores><ValorServicos>45000.00</ValorServicos></Valores>
            <Discriminacao>Paciente: JOAO DA SILVA</Discriminacao>
          </Servico>
          <Tomador>
            <IdentificacaoTomador>
              <CpfCnpj><Cnpj>99888777000166</Cnpj></CpfCnpj>
            </IdentificacaoTomador>
            <RazaoSocial>OPERADORA DE SAUDE SA</RazaoSocial>
          </Tomador>
        </InfDeclaracaoPrestacaoServico>
      </DeclaracaoPrestacaoServico>
    </InfNfse>
  </Nfse>
</CompNfse>"#;

    #[test]
    fn test_collect_abrasf_v2() {
        let doc = Document::parse(ABRASF_V2).unwrap();
        let fields = collect(&doc, true);

        assert_eq!(
            fields,
            StructuralFields {
                provider_tax_id: Some("11222333000181".to_string()),
                client_tax_id: Some("99888777000166".to_string()),
                invoice_number: Some("202400000000123".to_string()),
                provider_name: Some("HOSPITAL SANTA CLARA LTDA".to_string()),
                description: Some("Paciente: JOAO DA SILVA".to_string()),
                total_value: Some("45000.00".to_string()),
                issue_date: NaiveDate::from_ymd_opt(2025, 1, 5),
            }
        );
    }

    #[test]
    fn test_provider_fallback_only_without_provider_block() {
        let doc = Document::parse("<Nfse><Cnpj>11222333000181</Cnpj></Nfse>").unwrap();
        assert_eq!(
            collect(&doc, true).provider_tax_id.as_deref(),
            Some("11222333000181")
        );
        assert_eq!(collect(&doc, false).provider_tax_id, None);
    }

    #[test]
    fn test_client_never_falls_back_to_document() {
        let doc = Document::parse(
            "<Nfse><Prestador><Cnpj>11222333000181</Cnpj></Prestador></Nfse>",
        )
        .unwrap();
        let fields = collect(&doc, true);
        assert_eq!(fields.provider_tax_id.as_deref(), Some("11222333000181"));
        assert_eq!(fields.client_tax_id, None);
    }

    #[test]
    fn test_client_cpf() {
        let doc = Document::parse(
            "<Nfse><Tomador><CpfCnpj><Cpf>12345678909</Cpf></CpfCnpj></Tomador></Nfse>",
        )
        .unwrap();
        assert_eq!(collect(&doc, true).client_tax_id.as_deref(), Some("12345678909"));
    }

    #[test]
    fn test_empty_document_yields_absent_fields() {
        let doc = Document::parse("<Nfse/>").unwrap();
        assert_eq!(collect(&doc, true), StructuralFields::default());
    }

    #[test]
    fn test_parse_issue_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 12, 31);
        assert_eq!(parse_issue_date("2024-12-31T10:00:00-03:00"), expected);
        assert_eq!(parse_issue_date("2024-12-31"), expected);
        assert_eq!(parse_issue_date("31/12/2024"), expected);
        assert_eq!(parse_issue_date("ontem"), None);
        assert_eq!(parse_issue_date(""), None);
    }
}
