//! # Read Parameters
//!
//! List-records query parameters, encoded the way the service expects
//! them on the query string.

use serde::{Deserialize, Serialize};

use crate::errors::{AirtableError, AirtableResult};

/// Largest page the service will return
pub const MAX_PAGE_SIZE: u32 = 100;

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Sort clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
}

/// Cell rendering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellFormat {
    #[default]
    Json,
    String,
}

impl CellFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellFormat::Json => "json",
            CellFormat::String => "string",
        }
    }
}

/// Parameters accepted by `read` and the "where" operations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadParams {
    /// Formula rows must satisfy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_by_formula: Option<String>,

    /// Cap across all pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_records: Option<u32>,

    /// Rows per page (1..=100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortField>,

    /// View name or ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,

    /// Only return these columns
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_format: Option<CellFormat>,

    /// Required by the service when `cell_format` is `string`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,

    /// Required by the service when `cell_format` is `string`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_locale: Option<String>,
}

impl ReadParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters selecting the rows matching a formula
    pub fn matching(formula: impl Into<String>) -> Self {
        Self::new().filter_by_formula(formula)
    }

    pub fn filter_by_formula(mut self, formula: impl Into<String>) -> Self {
        let formula = formula.into();
        self.filter_by_formula = if formula.is_empty() { None } else { Some(formula) };
        self
    }

    pub fn max_records(mut self, max_records: u32) -> Self {
        self.max_records = Some(max_records);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.sort.push(SortField {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }

    pub fn cell_format(mut self, cell_format: CellFormat) -> Self {
        self.cell_format = Some(cell_format);
        self
    }

    pub fn time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }

    pub fn user_locale(mut self, user_locale: impl Into<String>) -> Self {
        self.user_locale = Some(user_locale.into());
        self
    }

    /// Reject values the service would refuse
    pub fn validate(&self) -> AirtableResult<()> {
        if let Some(size) = self.page_size {
            if size == 0 || size > MAX_PAGE_SIZE {
                return Err(AirtableError::invalid_argument(format!(
                    "pageSize must be between 1 and {}, got {}",
                    MAX_PAGE_SIZE, size
                )));
            }
        }
        if self.max_records == Some(0) {
            return Err(AirtableError::invalid_argument("maxRecords must be positive"));
        }
        Ok(())
    }

    /// Encode as query-string pairs, `offset` included when resuming
    pub fn to_query_pairs(&self, offset: Option<&str>) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if let Some(formula) = &self.filter_by_formula {
            pairs.push(("filterByFormula".to_string(), formula.clone()));
        }
        if let Some(max) = self.max_records {
            pairs.push(("maxRecords".to_string(), max.to_string()));
        }
        if let Some(size) = self.page_size {
            pairs.push(("pageSize".to_string(), size.to_string()));
        }
        for (i, sort) in self.sort.iter().enumerate() {
            pairs.push((format!("sort[{}][field]", i), sort.field.clone()));
            pairs.push((
                format!("sort[{}][direction]", i),
                sort.direction.as_str().to_string(),
            ));
        }
        if let Some(view) = &self.view {
            pairs.push(("view".to_string(), view.clone()));
        }
        for field in &self.fields {
            pairs.push(("fields[]".to_string(), field.clone()));
        }
        if let Some(cell_format) = self.cell_format {
            pairs.push(("cellFormat".to_string(), cell_format.as_str().to_string()));
        }
        if let Some(tz) = &self.time_zone {
            pairs.push(("timeZone".to_string(), tz.clone()));
        }
        if let Some(locale) = &self.user_locale {
            pairs.push(("userLocale".to_string(), locale.clone()));
        }
        if let Some(offset) = offset {
            pairs.push(("offset".to_string(), offset.to_string()));
        }

        pairs
    }
}
