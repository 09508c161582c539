use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An invoice or receipt as delivered by the extraction step.
///
/// Nothing here has been checked yet. The audit engine reads it and never
/// mutates it; every verdict lives in the returned `AuditResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedInvoice {
    /// Vendor name as printed on the document.
    #[serde(default)]
    pub vendor_name: Option<String>,
    /// Vendor CVR number as printed (may carry a "DK" prefix or spacing).
    #[serde(default)]
    pub vendor_cvr: Option<String>,
    /// Issue date, if legible.
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    /// ISO 4217 currency code (e.g. "DKK").
    pub currency_code: String,
    /// Whether line totals include VAT.
    pub price_basis: PriceBasis,
    /// Document total VAT as declared on the invoice.
    #[serde(default)]
    pub total_vat: Option<Decimal>,
    /// Document grand total as declared on the invoice.
    #[serde(default)]
    pub total_amount: Option<Decimal>,
    /// Exchange rate to the home currency, for foreign-currency documents.
    #[serde(default)]
    pub exchange_rate: Option<Decimal>,
    /// Line items in document order.
    pub lines: Vec<LineItem>,
}

/// Whether the amounts on a document are stated with or without VAT.
///
/// Most Danish retail receipts are tax-inclusive; B2B invoices usually
/// state net amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBasis {
    /// Line totals include VAT.
    TaxInclusive,
    /// Line totals exclude VAT.
    TaxExclusive,
}

/// One purchased item on an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Free-text item description (e.g. "Arla Sødmælk").
    pub description: String,
    /// Quantity; must be positive.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
    /// Line total in the document's price basis.
    pub line_total: Decimal,
    /// Declared VAT rate in percent, if stated.
    #[serde(default)]
    pub vat_rate: Option<Decimal>,
    /// Declared VAT amount, if stated.
    #[serde(default)]
    pub vat_amount: Option<Decimal>,
}
