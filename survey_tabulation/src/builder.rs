pub use crate::config::*;
use crate::{Cell, RespondentRow, SurveyDataset};

/// A builder for assembling a read-only survey dataset.
///
/// Every cell is validated against the schema as it is added; the resulting
/// dataset is guaranteed to only hold values from the declared domains.
///
/// ```
/// pub use survey_tabulation::builder::Builder;
/// pub use survey_tabulation::SurveySchema;
/// # use survey_tabulation::SurveyErrors;
///
/// let mut builder = Builder::new(&SurveySchema::dancefloor())?;
///
/// builder.add_respondent(&[
///     ("Gender identity".to_string(), "Female".to_string()),
///     ("Role_DJ".to_string(), "1".to_string()),
/// ])?;
///
/// let data = builder.build();
/// assert_eq!(data.num_respondents(), 1);
/// # Ok::<(), SurveyErrors>(())
/// ```
pub struct Builder {
    pub(crate) _schema: SurveySchema,
    pub(crate) _rows: Vec<RespondentRow>,
}

impl Builder {
    pub fn new(schema: &SurveySchema) -> Result<Builder, SurveyErrors> {
        Ok(Builder {
            _schema: schema.clone(),
            _rows: Vec::new(),
        })
    }

    /// Adds one respondent from (column name, raw value) pairs.
    ///
    /// Columns absent from the pairs are recorded as missing answers and role
    /// flags default to unset. An unknown column name or an out-of-domain
    /// value fails the whole row.
    pub fn add_respondent(&mut self, cells: &[(String, String)]) -> Result<(), SurveyErrors> {
        let mut row = RespondentRow {
            cells: vec![Cell::Missing; self._schema.columns.len()],
            roles: vec![false; self._schema.roles.len()],
        };
        for (name, value) in cells {
            match resolve_cell(&self._schema, name, value)? {
                ResolvedCell::Answer { column, cell } => row.cells[column] = cell,
                ResolvedCell::Role { role, flag } => row.roles[role] = flag,
            }
        }
        self._rows.push(row);
        Ok(())
    }

    pub fn build(self) -> SurveyDataset {
        SurveyDataset {
            schema: self._schema,
            rows: self._rows,
        }
    }
}

pub(crate) enum ResolvedCell {
    Answer { column: usize, cell: Cell },
    Role { role: usize, flag: bool },
}

/// Maps a raw (column, value) pair to its internal representation, checking
/// domain membership along the way.
pub(crate) fn resolve_cell(
    schema: &SurveySchema,
    name: &str,
    value: &str,
) -> Result<ResolvedCell, SurveyErrors> {
    if let Some(role_name) = name.strip_prefix(ROLE_PREFIX) {
        if let Some(role) = schema.roles.iter().position(|r| r == role_name) {
            let flag = parse_flag(value).ok_or_else(|| SurveyErrors::InvalidCategory {
                column: name.to_string(),
                value: value.to_string(),
            })?;
            return Ok(ResolvedCell::Role { role, flag });
        }
    }
    let column = schema
        .columns
        .iter()
        .position(|c| c.name == name)
        .ok_or_else(|| SurveyErrors::UnknownColumn {
            column: name.to_string(),
        })?;
    if value.is_empty() {
        return Ok(ResolvedCell::Answer {
            column,
            cell: Cell::Missing,
        });
    }
    let cell = match &schema.columns[column].kind {
        ColumnKind::Categorical { domain } => domain
            .iter()
            .position(|d| d == value)
            .map(|idx| Cell::Category(idx as u8)),
        ColumnKind::Ordinal { levels } => match value.parse::<u8>() {
            Ok(level) if level >= 1 && level <= *levels => Some(Cell::Level(level)),
            _ => None,
        },
    };
    match cell {
        Some(c) => Ok(ResolvedCell::Answer { column, cell: c }),
        None => Err(SurveyErrors::InvalidCategory {
            column: name.to_string(),
            value: value.to_string(),
        }),
    }
}

// The survey export is loose about booleans.
fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "" | "0" | "false" | "False" | "FALSE" | "no" | "No" => Some(false),
        "1" | "true" | "True" | "TRUE" | "yes" | "Yes" => Some(true),
        _ => None,
    }
}
