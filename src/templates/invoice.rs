//! Invoice template.

use serde::{Deserialize, Serialize};

use super::{lenient_number, party_lines, section, stem_with_id, Party, ReportTemplate};
use crate::config::LayoutConfig;
use crate::layout::{or_placeholder, ContentBlock, Heading, KeyValueEntry, KeyValueLine, Paragraph};
use crate::table::{format_currency, format_number, Cell, Column, Table};

/// Characters kept from a line item description before it is cut.
const DESCRIPTION_LIMIT: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineItem {
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub quantity: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub unit_price: Option<f64>,
    /// Explicit line total; defaults to quantity × unit price.
    #[serde(deserialize_with = "lenient_number")]
    pub amount: Option<f64>,
}

impl LineItem {
    pub fn amount(&self) -> Option<f64> {
        self.amount
            .or_else(|| Some(self.quantity? * self.unit_price?))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Invoice {
    pub invoice_number: Option<String>,
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    pub status: Option<String>,
    pub from: Option<Party>,
    pub bill_to: Option<Party>,
    pub line_items: Vec<LineItem>,
    /// Percent, e.g. `13` for 13%.
    #[serde(deserialize_with = "lenient_number")]
    pub tax_rate: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub subtotal: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub tax: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub total: Option<f64>,
    pub notes: Option<String>,
    #[serde(alias = "terms")]
    pub payment_terms: Option<String>,
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Invoice {
    /// Explicit subtotal, or the sum of line item amounts.
    pub fn subtotal(&self) -> f64 {
        self.subtotal
            .unwrap_or_else(|| self.line_items.iter().filter_map(LineItem::amount).sum())
    }

    /// Explicit tax, or subtotal × rate, rounded to cents.
    pub fn tax_amount(&self) -> f64 {
        self.tax
            .unwrap_or_else(|| round_cents(self.subtotal() * self.tax_rate.unwrap_or(0.0) / 100.0))
    }

    pub fn total(&self) -> f64 {
        self.total
            .unwrap_or_else(|| round_cents(self.subtotal() + self.tax_amount()))
    }

    fn line_items_table(&self, left: f32) -> Table {
        let columns = vec![
            Column::new("Description", left).max_chars(DESCRIPTION_LIMIT),
            Column::new("Qty", left + 290.0).number(),
            Column::new("Unit Price", left + 340.0).currency(),
            Column::new("Amount", left + 430.0).currency(),
        ];
        let rows = self
            .line_items
            .iter()
            .map(|item| {
                vec![
                    Cell::from(item.description.clone()),
                    Cell::from(item.quantity),
                    Cell::from(item.unit_price),
                    Cell::from(item.amount()),
                ]
            })
            .collect();
        Table {
            rows,
            ..Table::new(columns)
        }
    }

    fn totals(&self, label_x: f32, value_x: f32) -> Vec<ContentBlock> {
        let tax_label = match self.tax_rate {
            Some(rate) => format!("Tax ({}%):", format_number(rate)),
            None => "Tax:".to_string(),
        };
        let line = |label: &str, amount: f64| {
            KeyValueLine::new(vec![KeyValueEntry::new(label, Some(format_currency(amount)))
                .at(label_x)
                .value_at(value_x)])
        };

        // The first line asks for room for all three.
        vec![
            ContentBlock::KeyValue(line("Subtotal:", self.subtotal()).min_space(70.0)),
            ContentBlock::KeyValue(line(&tax_label, self.tax_amount())),
            ContentBlock::KeyValue(line("Total:", self.total()).highlighted().size(12.0)),
        ]
    }
}

impl ReportTemplate for Invoice {
    fn title(&self) -> String {
        match self.invoice_number.as_deref() {
            Some(n) if !n.trim().is_empty() => format!("Invoice {}", n.trim()),
            _ => "Invoice".to_string(),
        }
    }

    fn file_stem(&self) -> String {
        stem_with_id("invoice", self.invoice_number.as_deref())
    }

    fn blocks(&self, config: &LayoutConfig) -> Vec<ContentBlock> {
        let left = config.left_margin;
        let right_col = left + config.content_width() * 0.6;
        let value_x = left + 60.0;

        let mut blocks = vec![
            ContentBlock::Heading(Heading::new("INVOICE").size(22.0)),
            ContentBlock::KeyValue(KeyValueLine::new(vec![
                KeyValueEntry::new("Invoice #:", self.invoice_number.clone()).value_at(value_x),
                KeyValueEntry::new("Date:", self.issue_date.clone())
                    .at(right_col)
                    .value_at(right_col + 60.0),
            ])),
            ContentBlock::KeyValue(KeyValueLine::new(vec![
                KeyValueEntry::new("Status:", self.status.clone()).value_at(value_x),
                KeyValueEntry::new("Due Date:", self.due_date.clone())
                    .at(right_col)
                    .value_at(right_col + 60.0),
            ])),
            ContentBlock::Spacer { height: 8.0 },
            section("From", 90.0),
        ];
        blocks.extend(party_lines(self.from.as_ref(), value_x));
        blocks.push(ContentBlock::Spacer { height: 6.0 });
        blocks.push(section("Bill To", 90.0));
        blocks.extend(party_lines(self.bill_to.as_ref(), value_x));
        blocks.push(ContentBlock::Divider);

        blocks.push(ContentBlock::Table(self.line_items_table(left)));
        blocks.push(ContentBlock::Divider);
        blocks.extend(self.totals(left + 330.0, left + 430.0));

        blocks.push(ContentBlock::Spacer { height: 10.0 });
        blocks.push(section("Notes", 60.0));
        blocks.push(ContentBlock::Paragraph(
            Paragraph::new(or_placeholder(self.notes.as_deref())).size(9.0),
        ));
        blocks.push(section("Payment Terms", 60.0));
        blocks.push(ContentBlock::Paragraph(
            Paragraph::new(or_placeholder(self.payment_terms.as_deref())).size(9.0),
        ));
        blocks.push(ContentBlock::Footer {
            text: "Thank you for your business.".to_string(),
        });
        blocks
    }
}
