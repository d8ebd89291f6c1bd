//! Regex patterns for Brazilian NFS-e service descriptions.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // "Paciente: NOME", "Paciente - NOME", "PACIENTE.. NOME"
    pub static ref PATIENT_NAME: Regex = Regex::new(
        r"(?i)Paciente\s*[:.\-]+[ \t]*([^\n\r]+)"
    ).unwrap();

    // "15 DIÁRIAS", "3 diarias"
    pub static ref DAILY_RATE_QUANTITY: Regex = Regex::new(
        r"(?i)(\d+)\s*DI[ÁA]RIAS?\b"
    ).unwrap();

    // "VALOR DA DIÁRIA: R$ 1.250,00"
    pub static ref DAILY_RATE_UNIT_VALUE: Regex = Regex::new(
        r"(?i)VALOR\s+(?:DA\s+|DE\s+|POR\s+)?DI[ÁA]RIA\s*[:\-]?\s*R\$\s*(\d[\d.]*(?:,\d+)?)"
    ).unwrap();

    // "DEZEMBRO DE 2024", "fevereiro 2024", "MARÇO/2025"
    pub static ref MONTH_YEAR: Regex = Regex::new(
        r"(?i)\b(JANEIRO|FEVEREIRO|MAR[ÇC]O|ABRIL|MAIO|JUNHO|JULHO|AGOSTO|SETEMBRO|OUTUBRO|NOVEMBRO|DEZEMBRO)[\s/]*(?:DE\s+)?(\d{4})\b"
    ).unwrap();

    // "REF: 12/2024", "REF. 01/2025"
    pub static ref REFERENCE_MONTH: Regex = Regex::new(
        r"(?i)\bREF[:.]?\s*(\d{2})/(\d{4})\b"
    ).unwrap();

    // "VALOR TOTAL: R$ 4.500,00"
    pub static ref DESCRIPTION_TOTAL: Regex = Regex::new(
        r"(?i)VALOR\s+TOTAL\s*[:\-]?\s*(?:R\$)?\s*(\d[\d.]*(?:,\d+)?)"
    ).unwrap();
}
