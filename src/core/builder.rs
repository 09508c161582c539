use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::*;

/// Builder for extracted invoices, mostly used by tests and fixtures.
///
/// ```
/// use revisor::core::*;
/// use rust_decimal_macros::dec;
///
/// let invoice = InvoiceBuilder::new(PriceBasis::TaxExclusive)
///     .vendor("Netto", "35954716")
///     .total_vat(dec!(25.00))
///     .add_line(LineItemBuilder::new("Kaffe", dec!(1), dec!(100.00))
///         .vat(dec!(25), dec!(25.00))
///         .build())
///     .build();
///
/// assert_eq!(invoice.currency_code, "DKK");
/// assert_eq!(invoice.lines[0].line_total, dec!(100.00));
/// ```
pub struct InvoiceBuilder {
    vendor_name: Option<String>,
    vendor_cvr: Option<String>,
    issue_date: Option<NaiveDate>,
    currency_code: String,
    price_basis: PriceBasis,
    total_vat: Option<Decimal>,
    total_amount: Option<Decimal>,
    exchange_rate: Option<Decimal>,
    lines: Vec<LineItem>,
}

impl InvoiceBuilder {
    pub fn new(price_basis: PriceBasis) -> Self {
        Self {
            vendor_name: None,
            vendor_cvr: None,
            issue_date: None,
            currency_code: "DKK".to_string(),
            price_basis,
            total_vat: None,
            total_amount: None,
            exchange_rate: None,
            lines: Vec::new(),
        }
    }

    pub fn vendor(mut self, name: impl Into<String>, cvr: impl Into<String>) -> Self {
        self.vendor_name = Some(name.into());
        self.vendor_cvr = Some(cvr.into());
        self
    }

    pub fn vendor_name(mut self, name: impl Into<String>) -> Self {
        self.vendor_name = Some(name.into());
        self
    }

    pub fn issue_date(mut self, date: NaiveDate) -> Self {
        self.issue_date = Some(date);
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency_code = code.into();
        self
    }

    pub fn total_vat(mut self, amount: Decimal) -> Self {
        self.total_vat = Some(amount);
        self
    }

    pub fn total_amount(mut self, amount: Decimal) -> Self {
        self.total_amount = Some(amount);
        self
    }

    pub fn exchange_rate(mut self, rate: Decimal) -> Self {
        self.exchange_rate = Some(rate);
        self
    }

    pub fn add_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    pub fn build(self) -> ExtractedInvoice {
        ExtractedInvoice {
            vendor_name: self.vendor_name,
            vendor_cvr: self.vendor_cvr,
            issue_date: self.issue_date,
            currency_code: self.currency_code,
            price_basis: self.price_basis,
            total_vat: self.total_vat,
            total_amount: self.total_amount,
            exchange_rate: self.exchange_rate,
            lines: self.lines,
        }
    }
}

/// Builder for line items.
///
/// The line total defaults to `quantity * unit_price` unless set explicitly.
pub struct LineItemBuilder {
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    line_total: Option<Decimal>,
    vat_rate: Option<Decimal>,
    vat_amount: Option<Decimal>,
}

impl LineItemBuilder {
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            line_total: None,
            vat_rate: None,
            vat_amount: None,
        }
    }

    pub fn line_total(mut self, total: Decimal) -> Self {
        self.line_total = Some(total);
        self
    }

    /// Set both the declared VAT rate (percent) and amount.
    pub fn vat(mut self, rate: Decimal, amount: Decimal) -> Self {
        self.vat_rate = Some(rate);
        self.vat_amount = Some(amount);
        self
    }

    pub fn vat_rate(mut self, rate: Decimal) -> Self {
        self.vat_rate = Some(rate);
        self
    }

    pub fn vat_amount(mut self, amount: Decimal) -> Self {
        self.vat_amount = Some(amount);
        self
    }

    pub fn build(self) -> LineItem {
        LineItem {
            line_total: self
                .line_total
                .unwrap_or(self.quantity * self.unit_price),
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            vat_rate: self.vat_rate,
            vat_amount: self.vat_amount,
        }
    }
}
