//! Equipment inspection report template.

use serde::{Deserialize, Serialize};

use super::{party_lines, section, stem_with_id, table_section, Party, ReportTemplate};
use crate::config::LayoutConfig;
use crate::layout::{
    or_placeholder, ContentBlock, Heading, KeyValueEntry, KeyValueLine, Paragraph, PLACEHOLDER,
};
use crate::table::{Cell, Column, Table};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Equipment {
    pub name: Option<String>,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub location: Option<String>,
    pub condition: Option<String>,
    pub last_service_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecklistItem {
    pub item: Option<String>,
    /// Pass / Fail / N/A, free-form.
    pub result: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectionReport {
    pub account_number: Option<String>,
    #[serde(alias = "report_date")]
    pub inspection_date: Option<String>,
    pub next_inspection_date: Option<String>,
    pub inspector: Option<String>,
    pub client: Option<Party>,
    pub site_address: Option<String>,
    pub equipment: Vec<Equipment>,
    pub checklist: Vec<ChecklistItem>,
    pub findings: Option<String>,
    pub recommendations: Option<String>,
    pub notes: Option<String>,
}

impl InspectionReport {
    fn equipment_table(&self, left: f32) -> Table {
        let columns = vec![
            Column::new("Equipment", left).max_chars(20).placeholder(PLACEHOLDER),
            Column::new("Make / Model", left + 105.0).max_chars(16),
            Column::new("Serial #", left + 190.0).max_chars(12),
            Column::new("Location", left + 255.0).max_chars(14),
            Column::new("Condition", left + 330.0).max_chars(12),
            Column::new("Last Service", left + 400.0).max_chars(12),
        ];
        let rows = self
            .equipment
            .iter()
            .map(|e| {
                let make_model = [e.manufacturer.as_deref(), e.model.as_deref()]
                    .into_iter()
                    .flatten()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                vec![
                    Cell::from(e.name.clone()),
                    Cell::from(Some(make_model).filter(|s| !s.is_empty())),
                    Cell::from(e.serial_number.clone()),
                    Cell::from(e.location.clone()),
                    Cell::from(e.condition.clone()),
                    Cell::from(e.last_service_date.clone()),
                ]
            })
            .collect();
        Table {
            rows,
            ..Table::new(columns)
        }
    }

    fn checklist_table(&self, left: f32) -> Table {
        let columns = vec![
            Column::new("Item", left).max_chars(50).placeholder(PLACEHOLDER),
            Column::new("Result", left + 280.0).max_chars(10),
            Column::new("Comments", left + 350.0).max_chars(30),
        ];
        let rows = self
            .checklist
            .iter()
            .map(|c| {
                vec![
                    Cell::from(c.item.clone()),
                    Cell::from(c.result.clone()),
                    Cell::from(c.comment.clone()),
                ]
            })
            .collect();
        Table {
            rows,
            ..Table::new(columns)
        }
    }

    fn narrative(title: &str, text: Option<&str>) -> [ContentBlock; 2] {
        [
            section(title, 60.0),
            ContentBlock::Paragraph(Paragraph::new(or_placeholder(text)).size(9.0)),
        ]
    }
}

impl ReportTemplate for InspectionReport {
    fn title(&self) -> String {
        match self.account_number.as_deref() {
            Some(n) if !n.trim().is_empty() => format!("Inspection Report {}", n.trim()),
            _ => "Inspection Report".to_string(),
        }
    }

    fn file_stem(&self) -> String {
        stem_with_id("inspection", self.account_number.as_deref())
    }

    fn blocks(&self, config: &LayoutConfig) -> Vec<ContentBlock> {
        let left = config.left_margin;
        let right_col = left + config.content_width() * 0.55;
        let value_x = left + 70.0;

        let mut blocks = vec![
            ContentBlock::Heading(Heading::new("EQUIPMENT INSPECTION REPORT").size(18.0)),
            ContentBlock::KeyValue(KeyValueLine::new(vec![
                KeyValueEntry::new("Account #:", self.account_number.clone()).value_at(value_x),
                KeyValueEntry::new("Inspection Date:", self.inspection_date.clone())
                    .at(right_col)
                    .value_at(right_col + 95.0),
            ])),
            ContentBlock::KeyValue(KeyValueLine::new(vec![
                KeyValueEntry::new("Inspector:", self.inspector.clone()).value_at(value_x),
                KeyValueEntry::new("Next Inspection:", self.next_inspection_date.clone())
                    .at(right_col)
                    .value_at(right_col + 95.0),
            ])),
            ContentBlock::Spacer { height: 8.0 },
            section("Client Information", 90.0),
        ];
        blocks.extend(party_lines(self.client.as_ref(), value_x));
        blocks.push(ContentBlock::KeyValue(KeyValueLine::single(
            "Site:",
            self.site_address.clone(),
        )));
        blocks.push(ContentBlock::Divider);

        blocks.push(table_section("Equipment", config));
        blocks.push(ContentBlock::Table(self.equipment_table(left)));
        blocks.push(ContentBlock::Spacer { height: 10.0 });

        blocks.push(table_section("Inspection Checklist", config));
        blocks.push(ContentBlock::Table(self.checklist_table(left)));
        blocks.push(ContentBlock::Divider);

        blocks.extend(Self::narrative("Findings", self.findings.as_deref()));
        blocks.extend(Self::narrative("Recommendations", self.recommendations.as_deref()));
        blocks.extend(Self::narrative("Technician Notes", self.notes.as_deref()));

        blocks.push(ContentBlock::Footer {
            text: "This report reflects equipment condition at the time of inspection."
                .to_string(),
        });
        blocks
    }
}
