//! Report sections and the per-section payload handed to renderers

use serde::Serialize;

use crate::model::ReportSummary;

use super::columns::resolve_columns;
use super::rows::{SerializedRecord, records_json, serialize_sheet, string_array_json};

/// Worksheets a complete weekly workbook contains, in report order
pub const EXPECTED_SHEETS: &[&str] = &[
    "VW_Abnormal_IDs",
    "VW_ICP_ApiSe_Stats",
    "VW_ICPSeErrorsDetails",
    "VW_MemUploadTCount",
    "VW_SD_SeErrorDetails",
    "VW_SD_SeErrorDetailsIC",
    "VW_SD_SeHitCount",
];

/// A logical block of the rendered report, backed by one worksheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub sheet: &'static str,
    pub preferred_columns: &'static [&'static str],
}

pub const REPORT_SECTIONS: &[ReportSection] = &[
    ReportSection {
        id: "abnormal-ids",
        title: "Abnormal Member IDs",
        description: "Policies uploaded per insurance company that carried incorrect or dummy identifiers.",
        sheet: "VW_Abnormal_IDs",
        preferred_columns: &["InsuranceCompanyName", "PolicyCount"],
    },
    ReportSection {
        id: "icp-api-stats",
        title: "ICP Service Success vs Failure",
        description: "Success and failure counts for the core ICP services.",
        sheet: "VW_ICP_ApiSe_Stats",
        preferred_columns: &["ServiceName", "SuccessCount", "FailureCount"],
    },
    ReportSection {
        id: "icp-error-details",
        title: "ICP Failure Reasons",
        description: "Failure reasons with response codes and volumes.",
        sheet: "VW_ICPSeErrorsDetails",
        preferred_columns: &["ServiceName", "Error_Description", "ResponseCode", "Error_Count"],
    },
    ReportSection {
        id: "mem-upload-counts",
        title: "Policy Upload Channels",
        description: "API uploads against manual uploads for each insurance company.",
        sheet: "VW_MemUploadTCount",
        preferred_columns: &["InsuranceCompanyName", "API_Upload", "Manual_Upload"],
    },
    ReportSection {
        id: "sd-error-ratio",
        title: "Service Failure Ratios",
        description: "Failure counts, total API calls and failure ratios by insurance company.",
        sheet: "VW_SD_SeErrorDetails",
        preferred_columns: &[
            "InsuranceCompanyName",
            "FailureCount",
            "Total_API_Calls",
            "API_Failure_Ratio",
        ],
    },
    ReportSection {
        id: "sd-error-details-ic",
        title: "Error Details by Insurance Company",
        description: "Failures broken down by service, code and description.",
        sheet: "VW_SD_SeErrorDetailsIC",
        preferred_columns: &[
            "InsuranceCompanyName",
            "ServiceName",
            "Error_Code",
            "Error_Description",
            "Error_Count",
        ],
    },
];

pub fn find_section(id: &str) -> Option<&'static ReportSection> {
    REPORT_SECTIONS.iter().find(|s| s.id == id)
}

/// Resolved columns and escaped records for one section
///
/// Recomputed every time a section is rendered; nothing here is cached.
#[derive(Debug, Clone)]
pub struct SectionPayload {
    pub section: &'static ReportSection,
    /// False when the backing worksheet was missing from the workbook
    pub sheet_present: bool,
    pub row_count: usize,
    pub columns: Vec<String>,
    pub records: Vec<SerializedRecord>,
}

impl SectionPayload {
    pub fn build(section: &'static ReportSection, summary: &ReportSummary) -> Self {
        let sheet = summary.sheet(section.sheet);
        let columns = resolve_columns(sheet, section.preferred_columns);
        let records = serialize_sheet(&columns, sheet);

        Self {
            section,
            sheet_present: sheet.is_some(),
            row_count: sheet.map(|s| s.row_count()).unwrap_or(0),
            columns,
            records,
        }
    }

    /// Payloads for every section, in report order
    pub fn build_all(summary: &ReportSummary) -> Vec<Self> {
        REPORT_SECTIONS
            .iter()
            .map(|section| Self::build(section, summary))
            .collect()
    }

    pub fn columns_json(&self) -> String {
        string_array_json(&self.columns)
    }

    pub fn records_json(&self) -> String {
        records_json(&self.records)
    }
}
