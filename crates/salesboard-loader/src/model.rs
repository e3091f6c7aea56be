use std::path::PathBuf;

use chrono::{DateTime, Utc};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Canonical columns of an inquiry export. The CRM writes Korean headers;
/// exports that passed through a spreadsheet are often re-labelled in
/// snake_case, so both spellings are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InquiryColumn {
    InquiryDate,
    Team,
    Owner,
    Company,
    Status,
    Revenue,
    Margin,
    Channel,
}

impl InquiryColumn {
    pub const ALL: [InquiryColumn; 8] = [
        InquiryColumn::InquiryDate,
        InquiryColumn::Team,
        InquiryColumn::Owner,
        InquiryColumn::Company,
        InquiryColumn::Status,
        InquiryColumn::Revenue,
        InquiryColumn::Margin,
        InquiryColumn::Channel,
    ];

    pub fn canonical_name(&self) -> &'static str {
        match self {
            InquiryColumn::InquiryDate => "inquiry_date",
            InquiryColumn::Team => "team",
            InquiryColumn::Owner => "owner",
            InquiryColumn::Company => "company",
            InquiryColumn::Status => "status",
            InquiryColumn::Revenue => "revenue",
            InquiryColumn::Margin => "margin",
            InquiryColumn::Channel => "channel",
        }
    }

    fn source_headers(&self) -> &'static [&'static str] {
        match self {
            InquiryColumn::InquiryDate => &["문의 일자", "inquiry_date"],
            InquiryColumn::Team => &["진행 팀", "team"],
            InquiryColumn::Owner => &["담당자", "owner"],
            InquiryColumn::Company => &["기업명", "company"],
            InquiryColumn::Status => &["상태", "status"],
            InquiryColumn::Revenue => &["매출액", "revenue"],
            InquiryColumn::Margin => &["마진금액", "margin"],
            InquiryColumn::Channel => &["문의경로", "channel"],
        }
    }

    pub fn matches_header(&self, header: &str) -> bool {
        let trimmed = header.trim();
        self.source_headers()
            .iter()
            .any(|candidate| trimmed.eq_ignore_ascii_case(candidate))
    }

    pub fn from_header(header: &str) -> Option<InquiryColumn> {
        Self::ALL
            .into_iter()
            .find(|column| column.matches_header(header))
    }
}

/// Which optional columns the loaded export actually carries. Computed once
/// from the header row and threaded through every downstream stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaCapabilities {
    pub has_inquiry_date: bool,
    pub has_team: bool,
    pub has_owner: bool,
    pub has_company: bool,
    pub has_status: bool,
    /// Revenue AND margin present; the sales charts need both.
    pub has_sales: bool,
    pub has_channel: bool,
}

impl SchemaCapabilities {
    pub fn from_columns(columns: &[InquiryColumn]) -> Self {
        let has = |column: InquiryColumn| columns.contains(&column);
        Self {
            has_inquiry_date: has(InquiryColumn::InquiryDate),
            has_team: has(InquiryColumn::Team),
            has_owner: has(InquiryColumn::Owner),
            has_company: has(InquiryColumn::Company),
            has_status: has(InquiryColumn::Status),
            has_sales: has(InquiryColumn::Revenue) && has(InquiryColumn::Margin),
            has_channel: has(InquiryColumn::Channel),
        }
    }
}

/// A loaded export: the working table plus everything the presentation layer
/// reports about the file itself.
#[derive(Debug, Clone)]
pub struct InquiryTable {
    pub df: DataFrame,
    pub capabilities: SchemaCapabilities,
    pub source_path: PathBuf,
    pub modified_at: Option<DateTime<Utc>>,
}
