//! RMA entry type and the shared ordered field list
//!
//! Every positional consumer (workbook columns, workbook reader, text importer,
//! CLI tables) walks [`Field::ALL`], so the column contract lives in one place.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One field of an [`RmaEntry`], in report column order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ReceivedDate,
    Client,
    InvoiceNumber,
    ServiceOrder,
    Triage,
    ShippedProduct,
    Unit,
    Platform,
    Code,
    SerialNumber,
    Status,
    ConfigurationOrDefect,
    MarketplaceOrder,
    TechnicalReport,
}

impl Field {
    /// All fields in column order
    pub const ALL: [Field; 14] = [
        Field::ReceivedDate,
        Field::Client,
        Field::InvoiceNumber,
        Field::ServiceOrder,
        Field::Triage,
        Field::ShippedProduct,
        Field::Unit,
        Field::Platform,
        Field::Code,
        Field::SerialNumber,
        Field::Status,
        Field::ConfigurationOrDefect,
        Field::MarketplaceOrder,
        Field::TechnicalReport,
    ];

    /// Number of fields (and report columns)
    pub const COUNT: usize = Self::ALL.len();

    /// Zero-based column position
    pub fn index(self) -> usize {
        self as usize
    }

    /// snake_case key used in session files, config and CLI flags
    pub fn key(self) -> &'static str {
        match self {
            Field::ReceivedDate => "received_date",
            Field::Client => "client",
            Field::InvoiceNumber => "invoice_number",
            Field::ServiceOrder => "service_order",
            Field::Triage => "triage",
            Field::ShippedProduct => "shipped_product",
            Field::Unit => "unit",
            Field::Platform => "platform",
            Field::Code => "code",
            Field::SerialNumber => "serial_number",
            Field::Status => "status",
            Field::ConfigurationOrDefect => "configuration_or_defect",
            Field::MarketplaceOrder => "marketplace_order",
            Field::TechnicalReport => "technical_report",
        }
    }

    /// Column header as printed in the report
    pub fn header(self) -> &'static str {
        match self {
            Field::ReceivedDate => "RECEBIMENTO",
            Field::Client => "Cliente",
            Field::InvoiceNumber => "NF",
            Field::ServiceOrder => "OS",
            Field::Triage => "Triagem",
            Field::ShippedProduct => "Produto enviado",
            Field::Unit => "UND",
            Field::Platform => "Plataforma",
            Field::Code => "Código",
            Field::SerialNumber => "Numero de serie",
            Field::Status => "Status",
            Field::ConfigurationOrDefect => "Configuração/Avaria",
            Field::MarketplaceOrder => "Pedido Marketplace",
            Field::TechnicalReport => "LAUDO TÉCNICO",
        }
    }

    /// Free-text fields that wrap in the report
    pub fn wraps(self) -> bool {
        matches!(self, Field::ConfigurationOrDefect | Field::TechnicalReport)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Field::ALL
            .iter()
            .copied()
            .find(|f| f.key() == wanted)
            .ok_or_else(|| {
                format!(
                    "Invalid field: {}. Use one of: {}",
                    s,
                    Field::ALL.map(|f| f.key()).join(", ")
                )
            })
    }
}

/// A single return case. Every field is plain text and may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RmaEntry {
    pub received_date: String,
    pub client: String,
    pub invoice_number: String,
    pub service_order: String,
    pub triage: String,
    pub shipped_product: String,
    pub unit: String,
    pub platform: String,
    pub code: String,
    pub serial_number: String,
    pub status: String,
    pub configuration_or_defect: String,
    pub marketplace_order: String,
    pub technical_report: String,
}

impl RmaEntry {
    /// Build an entry from positional values in [`Field::ALL`] order.
    ///
    /// Values are trimmed; missing trailing values become empty strings and
    /// values beyond the fourteenth are ignored.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entry = RmaEntry::default();
        for (field, value) in Field::ALL.iter().zip(values) {
            entry.set(*field, value.as_ref().trim());
        }
        entry
    }

    /// Value of one field
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::ReceivedDate => &self.received_date,
            Field::Client => &self.client,
            Field::InvoiceNumber => &self.invoice_number,
            Field::ServiceOrder => &self.service_order,
            Field::Triage => &self.triage,
            Field::ShippedProduct => &self.shipped_product,
            Field::Unit => &self.unit,
            Field::Platform => &self.platform,
            Field::Code => &self.code,
            Field::SerialNumber => &self.serial_number,
            Field::Status => &self.status,
            Field::ConfigurationOrDefect => &self.configuration_or_defect,
            Field::MarketplaceOrder => &self.marketplace_order,
            Field::TechnicalReport => &self.technical_report,
        }
    }

    /// Replace one field
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::ReceivedDate => &mut self.received_date,
            Field::Client => &mut self.client,
            Field::InvoiceNumber => &mut self.invoice_number,
            Field::ServiceOrder => &mut self.service_order,
            Field::Triage => &mut self.triage,
            Field::ShippedProduct => &mut self.shipped_product,
            Field::Unit => &mut self.unit,
            Field::Platform => &mut self.platform,
            Field::Code => &mut self.code,
            Field::SerialNumber => &mut self.serial_number,
            Field::Status => &mut self.status,
            Field::ConfigurationOrDefect => &mut self.configuration_or_defect,
            Field::MarketplaceOrder => &mut self.marketplace_order,
            Field::TechnicalReport => &mut self.technical_report,
        };
        *slot = value.into();
    }

    /// Builder-style variant of [`RmaEntry::set`]
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// All values in column order
    pub fn values(&self) -> [&str; Field::COUNT] {
        Field::ALL.map(|f| self.get(f))
    }

    /// True when every field is empty after trimming
    pub fn is_blank(&self) -> bool {
        self.values().iter().all(|v| v.trim().is_empty())
    }
}
