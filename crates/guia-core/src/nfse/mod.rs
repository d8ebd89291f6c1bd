//! NFS-e extraction: structural lookup plus description heuristics.

pub mod collector;
pub mod rules;
pub mod xml;

use std::time::Instant;

use roxmltree::Document;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::ParseError;
use crate::models::config::{ExtractionConfig, IssueDatePolicy};
use crate::models::record::ExtractedInvoiceRecord;

pub use rules::{DescriptionRule, RuleMatch, RuleSet};
pub use xml::{decode_source, find_text, normalize_namespaces};

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Result of NFS-e extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted invoice record.
    pub record: ExtractedInvoiceRecord,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Description rules that matched, in evaluation order.
    pub applied_rules: Vec<RuleMatch>,
    /// Whether prefixes had to be stripped textually before parsing.
    pub normalized: bool,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for NFS-e parsing.
pub trait InvoiceParser {
    /// Parse an NFS-e from document text.
    fn parse(&self, source: &str) -> Result<ExtractionResult>;

    /// Parse an NFS-e from raw bytes (UTF-8 or ISO-8859-1).
    fn parse_bytes(&self, bytes: &[u8]) -> Result<ExtractionResult> {
        self.parse(&decode_source(bytes))
    }
}

/// NFS-e parser with a configurable rule set and issue-date policy.
pub struct NfseParser<C: Clock = SystemClock> {
    rules: RuleSet,
    config: ExtractionConfig,
    clock: C,
}

impl NfseParser<SystemClock> {
    /// Create a parser with the standard rules and default settings.
    pub fn new() -> Self {
        Self {
            rules: RuleSet::standard(),
            config: ExtractionConfig::default(),
            clock: SystemClock,
        }
    }
}

impl Default for NfseParser<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> NfseParser<C> {
    /// Replace the description rules.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Replace the extraction settings.
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the missing issue date policy.
    pub fn with_issue_date_policy(mut self, policy: IssueDatePolicy) -> Self {
        self.config.issue_date_policy = policy;
        self
    }

    /// Use another time source for the `Today` issue-date policy.
    pub fn with_clock<D: Clock>(self, clock: D) -> NfseParser<D> {
        NfseParser {
            rules: self.rules,
            config: self.config,
            clock,
        }
    }

    fn extract(&self, doc: &Document<'_>, source: &str) -> (ExtractedInvoiceRecord, Vec<RuleMatch>) {
        let fields = collector::collect(doc, self.config.document_fallback);

        let mut record = ExtractedInvoiceRecord {
            provider_tax_id: fields.provider_tax_id,
            client_tax_id: fields.client_tax_id,
            description: fields.description,
            invoice_number: fields.invoice_number,
            provider_name: fields.provider_name,
            issue_date: fields.issue_date,
            total_value: fields.total_value,
            ..ExtractedInvoiceRecord::from_source(source)
        };

        if record.issue_date.is_none() && self.config.issue_date_policy == IssueDatePolicy::Today {
            debug!("No issue date in document, using current date");
            record.issue_date = Some(self.clock.today());
        }

        let applied = self.rules.enrich(&mut record);
        (record, applied)
    }
}

impl<C: Clock> InvoiceParser for NfseParser<C> {
    fn parse(&self, source: &str) -> Result<ExtractionResult> {
        let start = Instant::now();

        if source.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        info!("Parsing NFS-e from {} characters of text", source.len());

        let mut normalized = false;
        let (record, applied_rules) = match Document::parse(source) {
            Ok(doc) => self.extract(&doc, source),
            Err(roxmltree::Error::UnknownNamespace(prefix, _)) => {
                warn!(
                    "Undeclared namespace prefix '{}', stripping prefixes before parsing",
                    prefix
                );
                normalized = true;
                let cleaned = normalize_namespaces(source);
                let doc = Document::parse(&cleaned)?;
                self.extract(&doc, source)
            }
            Err(e) => return Err(e.into()),
        };

        let warnings: Vec<String> = record
            .missing_fields()
            .into_iter()
            .map(|field| format!("Could not extract {}", field))
            .collect();

        debug!(
            "Extracted NFS-e {:?} with {} warnings and {} description matches",
            record.invoice_number,
            warnings.len(),
            applied_rules.len()
        );

        Ok(ExtractionResult {
            record,
            warnings,
            applied_rules,
            normalized,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const GINFES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ns3:ConsultarNfseResposta xmlns:ns3="http://www.ginfes.com.br/servico_consultar_nfse_resposta_v03.xsd" xmlns:ns4="http://www.ginfes.com.br/tipos_v03.xsd">
  <ns3:ListaNfse>
    <ns3:CompNfse>
      <ns4:Nfse>
        <ns4:InfNfse>
          <ns4:Numero>871</ns4:Numero>
          <ns4:DataEmissao>2025-01-10T09:15:00</ns4:DataEmissao>
          <ns4:Servico>
            <ns4:Valores>
              <ns4:ValorServicos>18750.00</ns4:ValorServicos>
            </ns4:Valores>
            <ns4:Discriminacao>INTERNACAO EM UTI
Paciente: MARIA APARECIDA SOUZA
15 DIARIAS - VALOR DA DIARIA: R$ 1.250,00
COMPETENCIA DEZEMBRO DE 2024</ns4:Discriminacao>
          </ns4:Servico>
          <ns4:PrestadorServico>
            <ns4:IdentificacaoPrestador>
              <ns4:Cnpj>11222333000181</ns4:Cnpj>
            </ns4:IdentificacaoPrestador>
            <ns4:RazaoSocial>HOSPITAL SANTA CLARA LTDA</ns4:RazaoSocial>
          </ns4:PrestadorServico>
          <ns4:TomadorServico>
            <ns4:IdentificacaoTomador>
              <ns4:CpfCnpj><ns4:Cnpj>99888777000166</ns4:Cnpj></ns4:CpfCnpj>
            </ns4:IdentificacaoTomador>
          </ns4:TomadorServico>
        </ns4:InfNfse>
      </ns4:Nfse>
    </ns3:CompNfse>
  </ns3:ListaNfse>
</ns3:ConsultarNfseResposta>"#;

    fn with_prefix(xml: &str, from: &str, to: &str) -> String {
        xml.replace(&format!("<{}:", from), &format!("<{}:", to))
            .replace(&format!("</{}:", from), &format!("</{}:", to))
            .replace(&format!("xmlns:{}=", from), &format!("xmlns:{}=", to))
    }

    fn without_prefixes(xml: &str) -> String {
        normalize_namespaces(xml)
            .replace("xmlns:ns3=", "data-ns3=")
            .replace("xmlns:ns4=", "data-ns4=")
    }

    #[test]
    fn test_parse_full_document() {
        let result = NfseParser::new().parse(GINFES).unwrap();
        let description = result.record.description.clone().unwrap();
        let quantity = result
            .applied_rules
            .iter()
            .find(|m| m.rule == "daily_rate_quantity")
            .unwrap();
        let (start, end) = quantity.span.unwrap();
        assert_eq!(&description[start..end], "15 DIARIAS");

        let record = result.record;

        assert_eq!(record.provider_tax_id.as_deref(), Some("11222333000181"));
        assert_eq!(record.client_tax_id.as_deref(), Some("99888777000166"));
        assert_eq!(record.invoice_number.as_deref(), Some("871"));
        assert_eq!(record.provider_name.as_deref(), Some("HOSPITAL SANTA CLARA LTDA"));
        assert_eq!(record.total_value.as_deref(), Some("18750.00"));
        assert_eq!(record.issue_date, NaiveDate::from_ymd_opt(2025, 1, 10));
        assert_eq!(record.patient_name.as_deref(), Some("MARIA APARECIDA SOUZA"));
        assert_eq!(record.daily_rate_quantity, Some(15));
        assert_eq!(record.daily_rate_unit_value.as_deref(), Some("1250.00"));
        assert_eq!(record.period_start, NaiveDate::from_ymd_opt(2024, 12, 1));
        assert_eq!(record.period_end, NaiveDate::from_ymd_opt(2024, 12, 31));
        assert_eq!(record.raw_source, GINFES);
        assert!(result.warnings.is_empty());
        assert!(!result.normalized);
    }

    #[test]
    fn test_unseen_prefix_extracts_same_fields() {
        let parser = NfseParser::new();
        let baseline = parser.parse(&without_prefixes(GINFES)).unwrap().record;
        let renamed = parser
            .parse(&with_prefix(GINFES, "ns4", "zz9"))
            .unwrap()
            .record;

        assert_eq!(renamed.provider_tax_id, baseline.provider_tax_id);
        assert_eq!(renamed.client_tax_id, baseline.client_tax_id);
        assert_eq!(renamed.invoice_number, baseline.invoice_number);
        assert_eq!(renamed.provider_name, baseline.provider_name);
        assert_eq!(renamed.description, baseline.description);
        assert_eq!(renamed.total_value, baseline.total_value);
        assert_eq!(renamed.issue_date, baseline.issue_date);
    }

    #[test]
    fn test_undeclared_prefixes_fall_back_to_normalization() {
        let xml = "<tc:CompNfse><tc:Nfse><tc:InfNfse><tc:Numero>55</tc:Numero>\
                   <tc:Servico><tc:Discriminacao>Paciente - MARIA</tc:Discriminacao></tc:Servico>\
                   </tc:InfNfse></tc:Nfse></tc:CompNfse>";

        let result = NfseParser::new().parse(xml).unwrap();
        assert!(result.normalized);
        assert_eq!(result.record.raw_source, xml);
        assert_eq!(result.record.invoice_number.as_deref(), Some("55"));
        assert_eq!(result.record.patient_name.as_deref(), Some("MARIA"));
    }

    #[test]
    fn test_latin1_bytes() {
        let mut bytes = b"<CompNfse><Servico><Discriminacao>3 DI".to_vec();
        bytes.push(0xC1); // Á
        bytes.extend_from_slice(b"RIAS - MAR");
        bytes.push(0xC7); // Ç
        bytes.extend_from_slice(b"O 2025</Discriminacao></Servico></CompNfse>");

        let record = NfseParser::new().parse_bytes(&bytes).unwrap().record;
        assert_eq!(record.daily_rate_quantity, Some(3));
        assert_eq!(record.billing_period_label.as_deref(), Some("MARÇO 2025"));
    }

    #[test]
    fn test_malformed_input_is_a_parse_error() {
        assert!(matches!(
            NfseParser::new().parse("<CompNfse><Numero>1</CompNfse>"),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(
            NfseParser::new().parse("PDF-1.4 not xml"),
            Err(ParseError::Malformed(_))
        ));
        assert!(matches!(NfseParser::new().parse("  \n"), Err(ParseError::Empty)));
    }

    #[test]
    fn test_missing_anchors_still_produce_record() {
        let result = NfseParser::new().parse("<Qualquer><Coisa/></Qualquer>").unwrap();
        assert_eq!(result.record.provider_tax_id, None);
        assert_eq!(result.record.issue_date, None);
        assert_eq!(result.warnings.len(), 7);
    }

    #[test]
    fn test_issue_date_policy_today() {
        let clock = FixedClock::at(2025, 3, 14, 10, 0, 0).unwrap();
        let parser = NfseParser::new()
            .with_issue_date_policy(IssueDatePolicy::Today)
            .with_clock(clock);

        let record = parser.parse("<CompNfse/>").unwrap().record;
        assert_eq!(record.issue_date, NaiveDate::from_ymd_opt(2025, 3, 14));
    }

    #[test]
    fn test_custom_rule_set() {
        let parser = NfseParser::new().with_rules(RuleSet::empty());
        let record = parser.parse(GINFES).unwrap().record;
        assert_eq!(record.patient_name, None);
        assert_eq!(record.period_start, None);
    }
}
