// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

// The questionnaire columns, as they appear in the survey export.
pub const COL_AGE: &str = "How old are you?";
pub const COL_GENDER: &str = "Gender identity";
pub const COL_ATTENDANCE: &str = "How often do you attend raves/electronic music events?";
pub const COL_EXPERIENCE: &str = "Years of experience in the rave scene";
pub const COL_TALK_FREQUENCY: &str = "How often do you engage in conversations on the dancefloor?";
pub const COL_TALK_DURATION: &str = "How long do your dancefloor conversations typically last?";
pub const COL_TALK_PERCEPTION: &str = "Do you perceive talking on the dancefloor as:";
pub const COL_IMPACT_EXPERIENCE: &str = "Do you think talking on the dancefloor affects your own experience?";
pub const COL_IMPACT_DJ: &str = "Do you think talking on the dancefloor affects DJ's performance?";
pub const COL_IMPACT_ATMOSPHERE: &str =
    "Do you think talking on the dancefloor affects overall event atmosphere?";
pub const COL_QUIET_IMPORTANCE: &str =
    "How important is it to you to have a quiet dancefloor environment?";
pub const COL_LIKELIHOOD_INTERVENE: &str =
    "How likely are you to ask others to stop talking if it's disturbing your experience?";

/// Role membership columns carry this prefix in the survey export
/// (`Role_DJ`, `Role_Club staff`, ...).
pub const ROLE_PREFIX: &str = "Role_";

/// How the values of a single survey column are interpreted.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ColumnKind {
    /// A closed set of text answers. The declared order is the canonical axis
    /// order for every table computed over this column. Never alphabetical,
    /// never frequency-based.
    Categorical { domain: Vec<String> },
    /// An integer scale `1..=levels` (Likert-style).
    Ordinal { levels: u8 },
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

/// The declared shape of the survey: the answer columns with their domains,
/// plus the role set. Role flags are independent memberships: a respondent
/// may hold several roles, or none at all.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SurveySchema {
    pub columns: Vec<ColumnSpec>,
    pub roles: Vec<String>,
}

impl SurveySchema {
    pub fn new(columns: Vec<ColumnSpec>, roles: Vec<String>) -> SurveySchema {
        // Duplicated or oversized declarations are programming errors, not
        // data errors.
        for (idx, c) in columns.iter().enumerate() {
            assert!(
                !columns[..idx].iter().any(|c2| c2.name == c.name),
                "duplicate column declared: {}",
                c.name
            );
            if let ColumnKind::Categorical { domain } = &c.kind {
                assert!(!domain.is_empty(), "empty domain for column: {}", c.name);
                assert!(domain.len() <= u8::MAX as usize);
            }
        }
        for (idx, r) in roles.iter().enumerate() {
            assert!(!roles[..idx].contains(r), "duplicate role declared: {}", r);
        }
        SurveySchema { columns, roles }
    }

    /// The fixed dancefloor questionnaire.
    pub fn dancefloor() -> SurveySchema {
        fn categorical(name: &str, domain: &[&str]) -> ColumnSpec {
            ColumnSpec {
                name: name.to_string(),
                kind: ColumnKind::Categorical {
                    domain: domain.iter().map(|s| s.to_string()).collect(),
                },
            }
        }
        fn ordinal(name: &str, levels: u8) -> ColumnSpec {
            ColumnSpec {
                name: name.to_string(),
                kind: ColumnKind::Ordinal { levels },
            }
        }
        let impact = ["Yes, positively", "Yes, negatively", "No effect"];
        SurveySchema::new(
            vec![
                categorical(COL_AGE, &["18-24", "25-34", "35-44+"]),
                categorical(
                    COL_GENDER,
                    &["Male", "Female", "Non-binary", "Prefer not to say"],
                ),
                categorical(COL_ATTENDANCE, &["Weekly", "Monthly", "Every few months"]),
                categorical(COL_EXPERIENCE, &["0-3", "4-7", "8+"]),
                categorical(
                    COL_TALK_FREQUENCY,
                    &["Never", "Rarely", "Sometimes", "Often", "Always"],
                ),
                categorical(
                    COL_TALK_DURATION,
                    &["Just a few words", "1-5 minutes", ">5 minutes"],
                ),
                categorical(
                    COL_TALK_PERCEPTION,
                    &[
                        "Completely acceptable",
                        "Somewhat acceptable",
                        "Neutral",
                        "Somewhat unacceptable",
                        "Completely unacceptable",
                    ],
                ),
                categorical(COL_IMPACT_EXPERIENCE, &impact),
                categorical(COL_IMPACT_DJ, &impact),
                categorical(COL_IMPACT_ATMOSPHERE, &impact),
                ordinal(COL_QUIET_IMPORTANCE, 5),
                ordinal(COL_LIKELIHOOD_INTERVENE, 5),
            ],
            [
                "Attendee/Raver",
                "DJ",
                "Producer",
                "Event organizer",
                "Club staff",
                "Other",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        )
    }

    /// Checks a single (column, value) pair against the schema without
    /// building anything. Readers use this to decide whether to keep a cell.
    pub fn validate_cell(&self, name: &str, value: &str) -> Result<(), SurveyErrors> {
        crate::builder::resolve_cell(self, name, value).map(|_| ())
    }
}

// ******** Scoring configuration *********

/// The lookup tables behind the Yapping Factor. Both tables are immutable
/// once handed to the engine; the normalization ceiling is derived from them,
/// not hardcoded.
#[derive(PartialEq, Debug, Clone)]
pub struct ScoreTables {
    pub frequency: Vec<(String, f64)>,
    pub duration: Vec<(String, f64)>,
    pub frequency_weight: f64,
    pub duration_weight: f64,
}

impl ScoreTables {
    /// The fixed dancefloor tables.
    pub fn dancefloor_default() -> ScoreTables {
        fn table(entries: &[(&str, f64)]) -> Vec<(String, f64)> {
            entries.iter().map(|(n, s)| (n.to_string(), *s)).collect()
        }
        ScoreTables {
            frequency: table(&[
                ("Never", 0.0),
                ("Rarely", 1.0),
                ("Sometimes", 2.0),
                ("Often", 4.0),
                ("Always", 6.0),
            ]),
            duration: table(&[
                ("Just a few words", 1.0),
                ("1-5 minutes", 3.0),
                (">5 minutes", 5.0),
            ]),
            frequency_weight: 0.7,
            duration_weight: 0.3,
        }
    }
}

/// Interpretation bands over the normalized Yapping Factor. Only used for
/// user-facing text. The boundaries are intentionally asymmetric: a score of
/// exactly 80 is still `Chatty`, while exactly 100 is its own band.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum YappingBand {
    Silence,
    SilentGift,
    LowTalker,
    Goldilocks,
    Chatty,
    Champion,
    Maximum,
}

impl YappingBand {
    pub fn of_score(score: f64) -> YappingBand {
        if score == 0.0 {
            YappingBand::Silence
        } else if score <= 20.0 {
            YappingBand::SilentGift
        } else if score <= 40.0 {
            YappingBand::LowTalker
        } else if score <= 60.0 {
            YappingBand::Goldilocks
        } else if score <= 80.0 {
            YappingBand::Chatty
        } else if score < 100.0 {
            YappingBand::Champion
        } else {
            YappingBand::Maximum
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            YappingBand::Silence => "Congratulations! You've achieved monk-like silence. 🧘",
            YappingBand::SilentGift => "Your silence is a gift to the dancefloor. 🎁",
            YappingBand::LowTalker => {
                "Low talker alert! You're more about the groove than the chat. 🕺"
            }
            YappingBand::Goldilocks => {
                "The Goldilocks of conversation - not too much, not too little. Or is it? 🤔"
            }
            YappingBand::Chatty => "Chatty Cathy, is that you? The music might be missing you! 🎵",
            YappingBand::Champion => {
                "We've got a champion yapper here! Your vocals might be competing with the DJ's. 🎤"
            }
            YappingBand::Maximum => {
                "🏆 Maximum Yapper Achievement Unlocked! You're the life of the party... or are you? 🎉"
            }
        }
    }
}

// ******** Output data structures *********

/// A dense two-dimensional tabulation. Every combination of the two axis
/// domains is present, zero-filled where unobserved, so consumers can index
/// freely. The denominator behind `percentages` depends on the operation
/// that produced the table (per-role, per-row or grand total).
#[derive(PartialEq, Debug, Clone)]
pub struct CrossTab {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    /// `counts[row][col]`, aligned with the label vectors.
    pub counts: Vec<Vec<u64>>,
    pub percentages: Vec<Vec<f64>>,
}

impl CrossTab {
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }
}

/// Mean of a numeric annotation per (row category, column category) pair.
/// `None` marks a combination with no respondents.
#[derive(PartialEq, Debug, Clone)]
pub struct GroupedMeans {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    pub means: Vec<Vec<Option<f64>>>,
}

/// Aggregate view of a numeric annotation column.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct SummaryStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Errors that prevent a tabulation from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SurveyErrors {
    /// A value outside the declared domain of its column.
    InvalidCategory { column: String, value: String },
    /// A request named a column that is not part of the schema.
    UnknownColumn { column: String },
}

impl Error for SurveyErrors {}

impl Display for SurveyErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurveyErrors::InvalidCategory { column, value } => {
                write!(f, "invalid category {:?} for column {:?}", value, column)
            }
            SurveyErrors::UnknownColumn { column } => {
                write!(f, "unknown column {:?}", column)
            }
        }
    }
}
