//! Assembly of the `ans:mensagemTISS` tree for one internment-summary guide.
//!
//! Every value is merged here: record fields first, then operator overrides,
//! then configured defaults. Nothing in this module can fail.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use super::format::{digits_only, format_currency, observation_text};
use super::tree::Element;
use super::{ANS_NAMESPACE, ANS_PREFIX, SCHEMA_LOCATION, SCHEMA_VERSION, XSI_NAMESPACE};
use crate::models::config::TissConfig;
use crate::models::manual::{GuideType, ManualOverride};
use crate::models::record::ExtractedInvoiceRecord;
use crate::nfse::rules::month_bounds;

/// Billing type "total" (tipoFaturamento).
const BILLING_TYPE_TOTAL: &str = "4";
/// Elective admission (caraterAtendimento).
const CARE_ELECTIVE: &str = "1";
/// Clinical internment (tipoInternacao).
const INTERNMENT_CLINICAL: &str = "1";
/// Hospital regime (regimeInternacao).
const REGIME_HOSPITAL: &str = "1";

fn ans(name: &str) -> String {
    format!("{}:{}", ANS_PREFIX, name)
}

fn node(name: &str) -> Element {
    Element::new(ans(name))
}

fn leaf(name: &str, text: impl Into<String>) -> Element {
    Element::leaf(ans(name), text)
}

fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Guide billing period, taken whole from one source.
///
/// The record wins when it carries either bound, then the override, then
/// `today`. A lone bound is completed to its calendar month, and the end is
/// never earlier than the start.
fn billing_period(
    record: &ExtractedInvoiceRecord,
    manual: &ManualOverride,
    today: NaiveDate,
) -> (NaiveDate, NaiveDate) {
    let bounds = if record.period_start.is_some() || record.period_end.is_some() {
        (record.period_start, record.period_end)
    } else {
        (manual.period_start, manual.period_end)
    };

    let (start, end) = match bounds {
        (Some(start), Some(end)) => (start, end),
        (Some(start), None) => {
            let end = month_bounds(start.year(), start.month()).map_or(start, |(_, last)| last);
            (start, end)
        }
        (None, Some(end)) => {
            let start = month_bounds(end.year(), end.month()).map_or(end, |(first, _)| first);
            (start, end)
        }
        (None, None) => (today, today),
    };

    (start, end.max(start))
}

/// Values resolved from the record, the override and the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedGuide {
    pub guide_number: String,
    pub member_card_number: String,
    pub patient_name: String,
    pub provider_tax_id: String,
    pub provider_name: String,
    pub provider_code: Option<String>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub execution_date: NaiveDate,
    pub procedure_code: String,
    pub quantity: u32,
    pub unit_value: String,
    pub total_value: String,
    pub observation: String,
}

impl MergedGuide {
    /// Apply the precedence rules. `today` stands in for any missing date.
    pub fn merge(
        record: &ExtractedInvoiceRecord,
        manual: &ManualOverride,
        config: &TissConfig,
        today: NaiveDate,
    ) -> Self {
        let (period_start, period_end) = billing_period(record, manual, today);

        let unit_value = record
            .daily_rate_unit_value
            .as_deref()
            .or(record.total_value.as_deref());

        let provider_code = Some(manual.provider_code.trim())
            .filter(|code| !code.is_empty())
            .map(str::to_string);

        Self {
            guide_number: record
                .invoice_number
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or(&config.default_guide_number)
                .to_string(),
            member_card_number: digits_only(&manual.member_card_number),
            patient_name: record
                .patient_name
                .clone()
                .unwrap_or_else(|| config.patient_sentinel.clone()),
            provider_tax_id: record
                .provider_tax_id
                .as_deref()
                .map(digits_only)
                .unwrap_or_default(),
            provider_name: record
                .provider_name
                .clone()
                .unwrap_or_else(|| config.provider_sentinel.clone()),
            provider_code,
            period_start,
            period_end,
            execution_date: record.issue_date.unwrap_or(period_start),
            procedure_code: manual
                .procedure_code()
                .unwrap_or(&config.default_procedure_code)
                .to_string(),
            quantity: record.daily_rate_quantity.unwrap_or(1),
            unit_value: format_currency(unit_value),
            total_value: format_currency(record.total_value.as_deref()),
            observation: observation_text(
                record.description.as_deref(),
                config.observation_max_chars,
            )
            .unwrap_or_else(|| config.default_observation.clone()),
        }
    }
}

/// Builds the document tree from merged values.
pub struct DocumentBuilder<'a> {
    config: &'a TissConfig,
    now: NaiveDateTime,
}

impl<'a> DocumentBuilder<'a> {
    pub fn new(config: &'a TissConfig, now: NaiveDateTime) -> Self {
        Self { config, now }
    }

    /// Build the full message, without the epilogue.
    pub fn build(&self, record: &ExtractedInvoiceRecord, manual: &ManualOverride) -> Element {
        if manual.guide_type == GuideType::Sadt {
            warn!("SADT guides are not supported, building an internment summary instead");
        }

        let guide = MergedGuide::merge(record, manual, self.config, self.now.date());
        debug!(
            "Building guide {} for {} ({} daily rates)",
            guide.guide_number, guide.patient_name, guide.quantity
        );

        node("mensagemTISS")
            .attr(format!("xmlns:{}", ANS_PREFIX), ANS_NAMESPACE)
            .attr("xmlns:xsi", XSI_NAMESPACE)
            .attr("xsi:schemaLocation", SCHEMA_LOCATION)
            .child(self.header(&guide))
            .child(
                node("prestadorParaOperadora").child(
                    node("loteGuias")
                        .child(leaf("numeroLote", self.config.batch_number.as_str()))
                        .child(node("guiasTISS").child(self.internment_summary(&guide))),
                ),
            )
    }

    fn header(&self, guide: &MergedGuide) -> Element {
        let provider_id = match &guide.provider_code {
            Some(code) => leaf("codigoPrestadorNaOperadora", code.as_str()),
            None => leaf("cnpjContratado", guide.provider_tax_id.as_str()),
        };

        node("cabecalho")
            .child(
                node("identificacaoTransacao")
                    .child(leaf("tipoTransacao", self.config.transaction_type.as_str()))
                    .child(leaf("sequencialTransacao", "1"))
                    .child(leaf(
                        "dataRegistroTransacao",
                        self.now.format("%Y-%m-%d").to_string(),
                    ))
                    .child(leaf(
                        "horaRegistroTransacao",
                        self.now.format("%H:%M:%S").to_string(),
                    )),
            )
            .child(node("origem").child(node("identificacaoPrestador").child(provider_id)))
            .child(node("destino").child(leaf("registroANS", self.config.registro_ans.as_str())))
            .child(leaf("padrao", SCHEMA_VERSION))
    }

    fn internment_summary(&self, guide: &MergedGuide) -> Element {
        let config = self.config;

        node("guiaResumoInternacao")
            .child(
                node("cabecalhoGuia")
                    .child(leaf("registroANS", config.registro_ans.as_str()))
                    .child(leaf("numeroGuiaPrestador", guide.guide_number.as_str())),
            )
            .child(
                node("dadosBeneficiario")
                    .child(leaf("numeroCarteira", guide.member_card_number.as_str()))
                    .child(leaf("atendimentoRN", "N"))
                    .child(leaf("nomeBeneficiario", guide.patient_name.as_str())),
            )
            .child(
                node("dadosExecutante")
                    .child(
                        node("contratadoExecutante")
                            .child(leaf("cnpjContratado", guide.provider_tax_id.as_str()))
                            .child(leaf("nomeContratado", guide.provider_name.as_str())),
                    )
                    .child(leaf("CNES", config.cnes.as_str())),
            )
            .child(
                node("dadosInternacao")
                    .child(leaf("caraterAtendimento", CARE_ELECTIVE))
                    .child(leaf("tipoFaturamento", BILLING_TYPE_TOTAL))
                    .child(leaf("dataInicioFaturamento", iso_date(guide.period_start)))
                    .child(leaf("dataFinalFaturamento", iso_date(guide.period_end)))
                    .child(leaf("tipoInternacao", INTERNMENT_CLINICAL))
                    .child(leaf("regimeInternacao", REGIME_HOSPITAL)),
            )
            .child(
                node("procedimentosExecutados").child(
                    node("procedimentoExecutado")
                        .child(leaf("sequencialItem", "1"))
                        .child(leaf("dataExecucao", iso_date(guide.execution_date)))
                        .child(
                            node("procedimento")
                                .child(leaf("codigoTabela", config.procedure_table.as_str()))
                                .child(leaf("codigoProcedimento", guide.procedure_code.as_str()))
                                .child(leaf(
                                    "descricaoProcedimento",
                                    config.procedure_description.as_str(),
                                )),
                        )
                        .child(leaf("quantidadeExecutada", guide.quantity.to_string()))
                        .child(leaf("valorUnitario", guide.unit_value.as_str()))
                        .child(leaf("valorTotal", guide.total_value.as_str())),
                ),
            )
            .child(
                node("valorTotal")
                    .child(leaf("valorDiarias", guide.total_value.as_str()))
                    .child(leaf("valorTotalGeral", guide.total_value.as_str())),
            )
            .child(leaf("observacao", guide.observation.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn now() -> NaiveDateTime {
        date(2025, 1, 10).and_hms_opt(9, 15, 0).unwrap()
    }

    fn enriched_record() -> ExtractedInvoiceRecord {
        ExtractedInvoiceRecord {
            provider_tax_id: Some("11.222.333/0001-81".to_string()),
            client_tax_id: Some("99888777000166".to_string()),
            description: Some(
                "Paciente: MARIA SOUZA\nREFERENTE A 15 DIARIAS\nDEZEMBRO DE 2024".to_string(),
            ),
            invoice_number: Some("2024123".to_string()),
            provider_name: Some("HOSPITAL SANTA CLARA LTDA".to_string()),
            issue_date: Some(date(2025, 1, 5)),
            total_value: Some("18750.00".to_string()),
            patient_name: Some("MARIA SOUZA".to_string()),
            billing_period_label: Some("DEZEMBRO DE 2024".to_string()),
            daily_rate_quantity: Some(15),
            daily_rate_unit_value: Some("1250.00".to_string()),
            period_start: Some(date(2024, 12, 1)),
            period_end: Some(date(2024, 12, 31)),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_prefers_record_values() {
        let manual = ManualOverride {
            provider_code: " 12345 ".to_string(),
            member_card_number: "0012.3456.7890-1".to_string(),
            period_start: Some(date(2024, 11, 1)),
            period_end: Some(date(2024, 11, 30)),
            ..Default::default()
        };
        let guide = MergedGuide::merge(&enriched_record(), &manual, &TissConfig::default(), now().date());

        assert_eq!(guide.guide_number, "2024123");
        assert_eq!(guide.member_card_number, "0012345678901");
        assert_eq!(guide.patient_name, "MARIA SOUZA");
        assert_eq!(guide.provider_tax_id, "11222333000181");
        assert_eq!(guide.provider_code.as_deref(), Some("12345"));
        assert_eq!(guide.period_start, date(2024, 12, 1));
        assert_eq!(guide.period_end, date(2024, 12, 31));
        assert_eq!(guide.execution_date, date(2025, 1, 5));
        assert_eq!(guide.procedure_code, "60000775");
        assert_eq!(guide.quantity, 15);
        assert_eq!(guide.unit_value, "1250.00");
        assert_eq!(guide.total_value, "18750.00");
        assert_eq!(
            guide.observation,
            "Paciente: MARIA SOUZA REFERENTE A 15 DIARIAS DEZEMBRO DE 2024"
        );
    }

    #[test]
    fn test_merge_defaults_for_empty_record() {
        let manual = ManualOverride {
            period_start: Some(date(2024, 11, 1)),
            period_end: Some(date(2024, 11, 30)),
            procedure_code: Some("60000123".to_string()),
            ..Default::default()
        };
        let config = TissConfig::default();
        let guide = MergedGuide::merge(&ExtractedInvoiceRecord::default(), &manual, &config, now().date());

        assert_eq!(guide.guide_number, "1");
        assert_eq!(guide.patient_name, "NAO INFORMADO");
        assert_eq!(guide.provider_name, "PRESTADOR");
        assert_eq!(guide.provider_tax_id, "");
        assert_eq!(guide.provider_code, None);
        assert_eq!(guide.period_start, date(2024, 11, 1));
        assert_eq!(guide.period_end, date(2024, 11, 30));
        assert_eq!(guide.execution_date, date(2024, 11, 1));
        assert_eq!(guide.procedure_code, "60000123");
        assert_eq!(guide.quantity, 1);
        assert_eq!(guide.unit_value, "0.00");
        assert_eq!(guide.total_value, "0.00");
        assert_eq!(guide.observation, config.default_observation);
    }

    #[test]
    fn test_unit_value_falls_back_to_total() {
        let record = ExtractedInvoiceRecord {
            total_value: Some("3500,5".to_string()),
            ..Default::default()
        };
        let guide = MergedGuide::merge(
            &record,
            &ManualOverride::default(),
            &TissConfig::default(),
            now().date(),
        );
        assert_eq!(guide.unit_value, "3500.50");
        assert_eq!(guide.total_value, "3500.50");
    }

    #[test]
    fn test_missing_period_uses_build_date() {
        let guide = MergedGuide::merge(
            &ExtractedInvoiceRecord::default(),
            &ManualOverride::default(),
            &TissConfig::default(),
            now().date(),
        );
        assert_eq!(guide.period_start, date(2025, 1, 10));
        assert_eq!(guide.period_end, date(2025, 1, 10));
    }

    #[test]
    fn test_override_with_only_start_ends_with_its_month() {
        let manual = ManualOverride {
            period_start: Some(date(2025, 2, 1)),
            ..Default::default()
        };
        let guide = MergedGuide::merge(
            &ExtractedInvoiceRecord::default(),
            &manual,
            &TissConfig::default(),
            now().date(),
        );
        assert_eq!(guide.period_start, date(2025, 2, 1));
        assert_eq!(guide.period_end, date(2025, 2, 28));
    }

    #[test]
    fn test_override_with_only_end_starts_its_month() {
        let manual = ManualOverride {
            period_end: Some(date(2024, 11, 20)),
            ..Default::default()
        };
        let guide = MergedGuide::merge(
            &ExtractedInvoiceRecord::default(),
            &manual,
            &TissConfig::default(),
            now().date(),
        );
        assert_eq!(guide.period_start, date(2024, 11, 1));
        assert_eq!(guide.period_end, date(2024, 11, 20));
    }

    #[test]
    fn test_inverted_override_period_is_clamped() {
        let manual = ManualOverride {
            period_start: Some(date(2024, 12, 31)),
            period_end: Some(date(2024, 12, 1)),
            ..Default::default()
        };
        let guide = MergedGuide::merge(
            &ExtractedInvoiceRecord::default(),
            &manual,
            &TissConfig::default(),
            now().date(),
        );
        assert_eq!(guide.period_start, date(2024, 12, 31));
        assert_eq!(guide.period_end, date(2024, 12, 31));
    }

    #[test]
    fn test_record_period_is_not_mixed_with_override() {
        let record = ExtractedInvoiceRecord {
            period_start: Some(date(2024, 12, 1)),
            ..Default::default()
        };
        let manual = ManualOverride {
            period_start: Some(date(2024, 6, 1)),
            period_end: Some(date(2024, 6, 30)),
            ..Default::default()
        };
        let guide = MergedGuide::merge(&record, &manual, &TissConfig::default(), now().date());
        assert_eq!(guide.period_start, date(2024, 12, 1));
        assert_eq!(guide.period_end, date(2024, 12, 31));
    }

    #[test]
    fn test_partial_override_never_ends_before_start_in_document() {
        let config = TissConfig::default();
        let manual = ManualOverride {
            period_start: Some(date(2025, 2, 1)),
            ..Default::default()
        };
        let root = DocumentBuilder::new(&config, now()).build(&ExtractedInvoiceRecord::default(), &manual);

        assert_eq!(root.find_text("ans:dataInicioFaturamento"), Some("2025-02-01"));
        assert_eq!(root.find_text("ans:dataFinalFaturamento"), Some("2025-02-28"));
    }

    #[test]
    fn test_build_tree_layout() {
        let config = TissConfig::default();
        let manual = ManualOverride {
            provider_code: "12345".to_string(),
            member_card_number: "0012 3456".to_string(),
            ..Default::default()
        };
        let root = DocumentBuilder::new(&config, now()).build(&enriched_record(), &manual);

        assert_eq!(root.name, "ans:mensagemTISS");
        assert_eq!(
            root.attributes[0],
            ("xmlns:ans".to_string(), ANS_NAMESPACE.to_string())
        );
        assert_eq!(root.find_text("ans:padrao"), Some("4.01.00"));
        assert_eq!(root.find_text("ans:dataRegistroTransacao"), Some("2025-01-10"));
        assert_eq!(root.find_text("ans:horaRegistroTransacao"), Some("09:15:00"));
        assert_eq!(root.find_text("ans:codigoPrestadorNaOperadora"), Some("12345"));
        assert_eq!(root.find_text("ans:numeroCarteira"), Some("00123456"));
        assert_eq!(root.find_text("ans:nomeBeneficiario"), Some("MARIA SOUZA"));
        assert_eq!(root.find_text("ans:cnpjContratado"), Some("11222333000181"));
        assert_eq!(root.find_text("ans:dataInicioFaturamento"), Some("2024-12-01"));
        assert_eq!(root.find_text("ans:dataFinalFaturamento"), Some("2024-12-31"));
        assert_eq!(root.find_text("ans:codigoTabela"), Some("18"));
        assert_eq!(root.find_text("ans:codigoProcedimento"), Some("60000775"));
        assert_eq!(root.find_text("ans:quantidadeExecutada"), Some("15"));
        assert_eq!(root.find_text("ans:valorUnitario"), Some("1250.00"));
        assert_eq!(root.find_text("ans:valorTotalGeral"), Some("18750.00"));
        assert_eq!(root.count("ans:guiaResumoInternacao"), 1);
        assert_eq!(root.count("ans:epilogo"), 0);
    }

    #[test]
    fn test_blank_provider_code_identifies_by_tax_id() {
        let config = TissConfig::default();
        let root = DocumentBuilder::new(&config, now())
            .build(&enriched_record(), &ManualOverride::default());

        let origin = root.find("ans:origem").unwrap();
        assert!(origin.find("ans:codigoPrestadorNaOperadora").is_none());
        assert_eq!(origin.find_text("ans:cnpjContratado"), Some("11222333000181"));
    }

    #[test]
    fn test_sadt_request_builds_internment_summary() {
        let config = TissConfig::default();
        let manual = ManualOverride {
            guide_type: GuideType::Sadt,
            ..Default::default()
        };
        let root = DocumentBuilder::new(&config, now()).build(&enriched_record(), &manual);
        assert_eq!(root.count("ans:guiaResumoInternacao"), 1);
    }
}
