pub mod builder;
mod config;
pub mod manual;

use log::debug;

pub use crate::config::*;

// **** Private structures ****

/// One validated answer cell. Categories and levels are stored as indexes
/// into the column's declared domain.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub(crate) enum Cell {
    Missing,
    Category(u8),
    /// 1-based ordinal level.
    Level(u8),
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub(crate) struct RespondentRow {
    // Aligned with SurveySchema::columns.
    pub(crate) cells: Vec<Cell>,
    // Aligned with SurveySchema::roles.
    pub(crate) roles: Vec<bool>,
}

/// An immutable collection of validated survey responses.
///
/// Built once through [builder::Builder] and then only read: every tabulation
/// returns a freshly computed result and leaves the dataset untouched.
#[derive(PartialEq, Debug, Clone)]
pub struct SurveyDataset {
    pub(crate) schema: SurveySchema,
    pub(crate) rows: Vec<RespondentRow>,
}

impl SurveyDataset {
    pub fn schema(&self) -> &SurveySchema {
        &self.schema
    }

    pub fn num_respondents(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn column_position(schema: &SurveySchema, column: &str) -> Result<usize, SurveyErrors> {
    schema
        .columns
        .iter()
        .position(|c| c.name == column)
        .ok_or_else(|| SurveyErrors::UnknownColumn {
            column: column.to_string(),
        })
}

// The canonical axis of a column: the declared domain for categorical
// columns, "1".."levels" for ordinal ones.
fn axis_labels(spec: &ColumnSpec) -> Vec<String> {
    match &spec.kind {
        ColumnKind::Categorical { domain } => domain.clone(),
        ColumnKind::Ordinal { levels } => (1..=*levels).map(|l| l.to_string()).collect(),
    }
}

fn axis_index(cell: &Cell) -> Option<usize> {
    match cell {
        Cell::Missing => None,
        Cell::Category(idx) => Some(*idx as usize),
        Cell::Level(level) => Some((*level - 1) as usize),
    }
}

fn cell_label(spec: &ColumnSpec, cell: &Cell) -> Option<String> {
    axis_index(cell).map(|idx| axis_labels(spec)[idx].clone())
}

// **** Scoring ****

/// Converts a (talk frequency, talk duration) pair into the normalized
/// Yapping Factor in `[0, 100]`.
///
/// The raw score tables and their weights are owned by the engine; the
/// normalization ceiling is recomputed from them at construction so that the
/// mapping stays correct if the tables are ever revised.
pub struct ScoreEngine {
    tables: ScoreTables,
    max_combined: f64,
}

impl ScoreEngine {
    pub fn new(tables: ScoreTables) -> ScoreEngine {
        let max_frequency = tables
            .frequency
            .iter()
            .map(|(_, s)| *s)
            .fold(0.0, f64::max);
        let max_duration = tables.duration.iter().map(|(_, s)| *s).fold(0.0, f64::max);
        let max_combined =
            max_frequency * tables.frequency_weight + max_duration * tables.duration_weight;
        assert!(max_combined > 0.0, "score tables must allow a positive score");
        ScoreEngine {
            tables,
            max_combined,
        }
    }

    pub fn dancefloor_default() -> ScoreEngine {
        ScoreEngine::new(ScoreTables::dancefloor_default())
    }

    /// The highest reachable combined (pre-normalization) score.
    pub fn max_combined(&self) -> f64 {
        self.max_combined
    }

    /// Scores a single ad-hoc pair. Both values must belong to their score
    /// tables.
    ///
    /// A respondent who never talks scores 0 no matter which duration they
    /// reported: the duration answer carries no information in that case.
    pub fn normalized(&self, frequency: &str, duration: &str) -> Result<f64, SurveyErrors> {
        let frequency_score = table_lookup(&self.tables.frequency, "frequency", frequency)?;
        let duration_score = table_lookup(&self.tables.duration, "duration", duration)?;
        let combined = if frequency_score == 0.0 {
            0.0
        } else {
            frequency_score * self.tables.frequency_weight
                + duration_score * self.tables.duration_weight
        };
        Ok(combined / self.max_combined * 100.0)
    }

    /// Scores every respondent, producing the analysis annotation column.
    /// Respondents with a missing frequency or duration answer get `None`.
    pub fn annotate(
        &self,
        data: &SurveyDataset,
        frequency_col: &str,
        duration_col: &str,
    ) -> Result<Vec<Option<f64>>, SurveyErrors> {
        let fpos = column_position(&data.schema, frequency_col)?;
        let dpos = column_position(&data.schema, duration_col)?;
        let fspec = &data.schema.columns[fpos];
        let dspec = &data.schema.columns[dpos];
        debug!("annotate: scoring {} respondents", data.rows.len());
        let mut res: Vec<Option<f64>> = Vec::with_capacity(data.rows.len());
        for row in data.rows.iter() {
            let frequency = cell_label(fspec, &row.cells[fpos]);
            let duration = cell_label(dspec, &row.cells[dpos]);
            match (frequency, duration) {
                (Some(f), Some(d)) => res.push(Some(self.normalized(&f, &d)?)),
                _ => res.push(None),
            }
        }
        Ok(res)
    }
}

fn table_lookup(table: &[(String, f64)], label: &str, value: &str) -> Result<f64, SurveyErrors> {
    table
        .iter()
        .find(|(name, _)| name == value)
        .map(|(_, score)| *score)
        .ok_or_else(|| SurveyErrors::InvalidCategory {
            column: label.to_string(),
            value: value.to_string(),
        })
}

// **** Numeric annotations ****

/// Reads an ordinal column as a numeric annotation, one entry per respondent.
/// Missing answers and non-ordinal cells yield `None`.
pub fn ordinal_values(data: &SurveyDataset, column: &str) -> Result<Vec<Option<f64>>, SurveyErrors> {
    let pos = column_position(&data.schema, column)?;
    Ok(data
        .rows
        .iter()
        .map(|row| match row.cells[pos] {
            Cell::Level(level) => Some(level as f64),
            _ => None,
        })
        .collect())
}

pub fn mean_of(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().cloned().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

pub fn summary_stats(values: &[Option<f64>]) -> Option<SummaryStats> {
    let present: Vec<f64> = values.iter().flatten().cloned().collect();
    if present.is_empty() {
        return None;
    }
    Some(SummaryStats {
        mean: present.iter().sum::<f64>() / present.len() as f64,
        min: present.iter().cloned().fold(f64::INFINITY, f64::min),
        max: present.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    })
}

/// Fixed-width histogram of an annotation over `[0, 100]`. A value of exactly
/// 100 lands in the last bin. Returns (lower bin edge, count) pairs.
pub fn score_histogram(values: &[Option<f64>], num_bins: usize) -> Vec<(f64, u64)> {
    assert!(num_bins > 0);
    let width = 100.0 / num_bins as f64;
    let mut bins: Vec<u64> = vec![0; num_bins];
    for v in values.iter().flatten() {
        let idx = ((v / width) as usize).min(num_bins - 1);
        bins[idx] += 1;
    }
    bins.iter()
        .enumerate()
        .map(|(idx, count)| (idx as f64 * width, *count))
        .collect()
}

// **** Tabulations ****

/// Mean of a numeric annotation per value of a grouping column.
///
/// The output follows the grouping column's declared order; group values with
/// no scored respondents are omitted.
pub fn group_means(
    data: &SurveyDataset,
    values: &[Option<f64>],
    group_col: &str,
) -> Result<Vec<(String, f64)>, SurveyErrors> {
    assert_eq!(values.len(), data.rows.len());
    let gpos = column_position(&data.schema, group_col)?;
    let labels = axis_labels(&data.schema.columns[gpos]);
    let mut sums: Vec<f64> = vec![0.0; labels.len()];
    let mut counts: Vec<u64> = vec![0; labels.len()];
    for (row, value) in data.rows.iter().zip(values.iter()) {
        if let (Some(idx), Some(v)) = (axis_index(&row.cells[gpos]), value) {
            sums[idx] += v;
            counts[idx] += 1;
        }
    }
    Ok(labels
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| counts[*idx] > 0)
        .map(|(idx, label)| (label, sums[idx] / counts[idx] as f64))
        .collect())
}

/// Mean of a numeric annotation per (row category, column category) pair,
/// e.g. mean intervention likelihood by quiet-importance level and age group.
pub fn grouped_means(
    data: &SurveyDataset,
    values: &[Option<f64>],
    row_col: &str,
    col_col: &str,
) -> Result<GroupedMeans, SurveyErrors> {
    assert_eq!(values.len(), data.rows.len());
    let rpos = column_position(&data.schema, row_col)?;
    let cpos = column_position(&data.schema, col_col)?;
    let row_labels = axis_labels(&data.schema.columns[rpos]);
    let col_labels = axis_labels(&data.schema.columns[cpos]);
    let mut sums = vec![vec![0.0; col_labels.len()]; row_labels.len()];
    let mut counts = vec![vec![0u64; col_labels.len()]; row_labels.len()];
    for (row, value) in data.rows.iter().zip(values.iter()) {
        let r = axis_index(&row.cells[rpos]);
        let c = axis_index(&row.cells[cpos]);
        if let (Some(r), Some(c), Some(v)) = (r, c, value) {
            sums[r][c] += v;
            counts[r][c] += 1;
        }
    }
    let means = sums
        .iter()
        .zip(counts.iter())
        .map(|(srow, crow)| {
            srow.iter()
                .zip(crow.iter())
                .map(|(s, c)| if *c > 0 { Some(s / *c as f64) } else { None })
                .collect()
        })
        .collect();
    Ok(GroupedMeans {
        row_labels,
        col_labels,
        means,
    })
}

/// Count of respondents for every (group value, secondary value) pair.
///
/// The grid is complete and zero-filled in the declared order of both
/// domains; cell percentages are taken over the grand total of the table.
pub fn count_table(
    data: &SurveyDataset,
    group_col: &str,
    secondary_col: &str,
) -> Result<CrossTab, SurveyErrors> {
    let gpos = column_position(&data.schema, group_col)?;
    let spos = column_position(&data.schema, secondary_col)?;
    let row_labels = axis_labels(&data.schema.columns[gpos]);
    let col_labels = axis_labels(&data.schema.columns[spos]);
    let mut counts = vec![vec![0u64; col_labels.len()]; row_labels.len()];
    for row in data.rows.iter() {
        if let (Some(r), Some(c)) = (
            axis_index(&row.cells[gpos]),
            axis_index(&row.cells[spos]),
        ) {
            counts[r][c] += 1;
        }
    }
    let grand_total: u64 = counts.iter().flatten().sum();
    let percentages = percentages_of(&counts, |_, _| grand_total);
    Ok(CrossTab {
        row_labels,
        col_labels,
        counts,
        percentages,
    })
}

/// The role-conditioned impact heatmap.
///
/// Rows are the impact categories in declared order, columns the role set in
/// declaration order. Each percentage is taken against the total number of
/// respondents holding that role; a role with no members gets 0 everywhere.
/// Role flags are independent, so the per-role totals do not add up to the
/// number of respondents.
pub fn role_impact_table(data: &SurveyDataset, impact_col: &str) -> Result<CrossTab, SurveyErrors> {
    let ipos = column_position(&data.schema, impact_col)?;
    let row_labels = axis_labels(&data.schema.columns[ipos]);
    let col_labels = data.schema.roles.clone();
    let mut counts = vec![vec![0u64; col_labels.len()]; row_labels.len()];
    let mut role_totals: Vec<u64> = vec![0; col_labels.len()];
    for row in data.rows.iter() {
        for (role, flag) in row.roles.iter().enumerate() {
            if !*flag {
                continue;
            }
            role_totals[role] += 1;
            if let Some(cat) = axis_index(&row.cells[ipos]) {
                counts[cat][role] += 1;
            }
        }
    }
    debug!("role_impact_table: {}: role totals {:?}", impact_col, role_totals);
    let percentages = percentages_of(&counts, |_, col| role_totals[col]);
    Ok(CrossTab {
        row_labels,
        col_labels,
        counts,
        percentages,
    })
}

/// Percentage distribution of an impact answer for every value of a
/// demographic column.
///
/// Every demographic value of the domain appears (zero-filled), and every
/// impact outcome appears for each of them. Percentages are per row: the
/// share of that demographic's answers, 0 for a demographic nobody reported.
pub fn impact_breakdown(
    data: &SurveyDataset,
    demographic_col: &str,
    impact_col: &str,
) -> Result<CrossTab, SurveyErrors> {
    let table = count_table(data, demographic_col, impact_col)?;
    let row_totals: Vec<u64> = table.counts.iter().map(|row| row.iter().sum()).collect();
    let percentages = percentages_of(&table.counts, |row, _| row_totals[row]);
    Ok(CrossTab {
        percentages,
        ..table
    })
}

/// The paired ordinal heatmap: intervention likelihood (rows) against
/// quiet-environment importance (columns).
///
/// Both axes carry every level in ascending order even when unobserved, so a
/// 5-level pairing always yields 25 cells. Percentages are taken over the
/// grand total of the table.
pub fn paired_ordinal_table(
    data: &SurveyDataset,
    importance_col: &str,
    likelihood_col: &str,
) -> Result<CrossTab, SurveyErrors> {
    // Counted with importance as the grouping axis, then transposed so the
    // likelihood ends up on the row axis.
    let by_importance = count_table(data, importance_col, likelihood_col)?;
    let counts: Vec<Vec<u64>> = (0..by_importance.col_labels.len())
        .map(|c| by_importance.counts.iter().map(|row| row[c]).collect())
        .collect();
    let grand_total: u64 = counts.iter().flatten().sum();
    let percentages = percentages_of(&counts, |_, _| grand_total);
    Ok(CrossTab {
        row_labels: by_importance.col_labels,
        col_labels: by_importance.row_labels,
        counts,
        percentages,
    })
}

/// Count of respondents per value of one column, zero-filled over the whole
/// domain in declared order.
pub fn category_counts(
    data: &SurveyDataset,
    column: &str,
) -> Result<Vec<(String, u64)>, SurveyErrors> {
    let pos = column_position(&data.schema, column)?;
    let labels = axis_labels(&data.schema.columns[pos]);
    let mut counts: Vec<u64> = vec![0; labels.len()];
    for row in data.rows.iter() {
        if let Some(idx) = axis_index(&row.cells[pos]) {
            counts[idx] += 1;
        }
    }
    Ok(labels.into_iter().zip(counts).collect())
}

/// Number of respondents holding each role, largest first. Ties keep the
/// declaration order.
pub fn role_counts(data: &SurveyDataset) -> Vec<(String, u64)> {
    let mut counts: Vec<(String, u64)> = data
        .schema
        .roles
        .iter()
        .enumerate()
        .map(|(role, name)| {
            let count = data.rows.iter().filter(|row| row.roles[role]).count() as u64;
            (name.clone(), count)
        })
        .collect();
    counts.sort_by_key(|(_, count)| std::cmp::Reverse(*count));
    counts
}

// Shared percentage grid with the divide-by-zero guard: an empty denominator
// yields 0, never an error.
fn percentages_of<F>(counts: &[Vec<u64>], denominator: F) -> Vec<Vec<f64>>
where
    F: Fn(usize, usize) -> u64,
{
    counts
        .iter()
        .enumerate()
        .map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(|(c, count)| {
                    let total = denominator(r, c);
                    if total == 0 {
                        0.0
                    } else {
                        *count as f64 / total as f64 * 100.0
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    fn dataset(rows: &[Vec<(&str, &str)>]) -> SurveyDataset {
        let mut builder = Builder::new(&SurveySchema::dancefloor()).unwrap();
        for row in rows {
            let cells: Vec<(String, String)> = row
                .iter()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect();
            builder.add_respondent(&cells).unwrap();
        }
        builder.build()
    }

    fn empty_dataset() -> SurveyDataset {
        dataset(&[])
    }

    #[test]
    fn normalized_score_stays_in_bounds_for_all_pairs() {
        let engine = ScoreEngine::dancefloor_default();
        for frequency in ["Never", "Rarely", "Sometimes", "Often", "Always"] {
            for duration in ["Just a few words", "1-5 minutes", ">5 minutes"] {
                let score = engine.normalized(frequency, duration).unwrap();
                assert!(
                    (0.0..=100.0).contains(&score),
                    "out of bounds: {} / {} -> {}",
                    frequency,
                    duration,
                    score
                );
            }
        }
    }

    #[test]
    fn score_is_zero_exactly_when_never_talking() {
        let engine = ScoreEngine::dancefloor_default();
        for duration in ["Just a few words", "1-5 minutes", ">5 minutes"] {
            assert_eq!(engine.normalized("Never", duration).unwrap(), 0.0);
        }
        for frequency in ["Rarely", "Sometimes", "Often", "Always"] {
            for duration in ["Just a few words", "1-5 minutes", ">5 minutes"] {
                assert!(engine.normalized(frequency, duration).unwrap() > 0.0);
            }
        }
    }

    #[test]
    fn normalization_ceiling_is_derived_from_the_tables() {
        let engine = ScoreEngine::dancefloor_default();
        assert!((engine.max_combined() - 5.7).abs() < 1e-9);
        assert_eq!(engine.normalized("Always", ">5 minutes").unwrap(), 100.0);
    }

    #[test]
    fn often_for_a_few_minutes_scores_just_under_sixty_five() {
        let engine = ScoreEngine::dancefloor_default();
        let score = engine.normalized("Often", "1-5 minutes").unwrap();
        assert!((score - 3.7 / 5.7 * 100.0).abs() < 1e-9);
        assert!((score - 64.9123).abs() < 1e-3);
    }

    #[test]
    fn band_boundaries_are_asymmetric() {
        assert_eq!(YappingBand::of_score(0.0), YappingBand::Silence);
        assert_eq!(YappingBand::of_score(20.0), YappingBand::SilentGift);
        assert_eq!(YappingBand::of_score(40.0), YappingBand::LowTalker);
        assert_eq!(YappingBand::of_score(60.0), YappingBand::Goldilocks);
        // 80 belongs to the lower band, 100 is its own band.
        assert_eq!(YappingBand::of_score(80.0), YappingBand::Chatty);
        assert_eq!(YappingBand::of_score(95.0), YappingBand::Champion);
        assert_eq!(YappingBand::of_score(100.0), YappingBand::Maximum);
    }

    #[test]
    fn ad_hoc_pairs_outside_the_tables_are_rejected() {
        let engine = ScoreEngine::dancefloor_default();
        assert_eq!(
            engine.normalized("Constantly", "1-5 minutes"),
            Err(SurveyErrors::InvalidCategory {
                column: "frequency".to_string(),
                value: "Constantly".to_string()
            })
        );
        assert!(engine.normalized("Often", "hours").is_err());
    }

    #[test]
    fn annotate_skips_respondents_with_missing_answers() {
        let data = dataset(&[
            vec![
                (COL_TALK_FREQUENCY, "Often"),
                (COL_TALK_DURATION, "1-5 minutes"),
            ],
            vec![(COL_TALK_FREQUENCY, "Often")],
            vec![],
        ]);
        let engine = ScoreEngine::dancefloor_default();
        let scores = engine
            .annotate(&data, COL_TALK_FREQUENCY, COL_TALK_DURATION)
            .unwrap();
        assert_eq!(scores.len(), 3);
        assert!(scores[0].is_some());
        assert_eq!(scores[1], None);
        assert_eq!(scores[2], None);
    }

    #[test]
    fn group_means_follow_domain_order_and_omit_empty_groups() {
        let data = dataset(&[
            // Monthly scores higher than Weekly on purpose: the output order
            // must still be the declared one.
            vec![
                (COL_ATTENDANCE, "Monthly"),
                (COL_TALK_FREQUENCY, "Always"),
                (COL_TALK_DURATION, ">5 minutes"),
            ],
            vec![
                (COL_ATTENDANCE, "Weekly"),
                (COL_TALK_FREQUENCY, "Rarely"),
                (COL_TALK_DURATION, "Just a few words"),
            ],
        ]);
        let engine = ScoreEngine::dancefloor_default();
        let scores = engine
            .annotate(&data, COL_TALK_FREQUENCY, COL_TALK_DURATION)
            .unwrap();
        let means = group_means(&data, &scores, COL_ATTENDANCE).unwrap();
        let labels: Vec<&str> = means.iter().map(|(l, _)| l.as_str()).collect();
        // "Every few months" has no respondents and is omitted.
        assert_eq!(labels, vec!["Weekly", "Monthly"]);
        assert!(means[1].1 > means[0].1);
    }

    #[test]
    fn count_table_produces_a_complete_zero_filled_grid() {
        let data = dataset(&[vec![
            (COL_GENDER, "Female"),
            (COL_TALK_PERCEPTION, "Neutral"),
        ]]);
        let table = count_table(&data, COL_GENDER, COL_TALK_PERCEPTION).unwrap();
        assert_eq!(table.row_labels.len(), 4);
        assert_eq!(table.col_labels.len(), 5);
        assert_eq!(table.counts.iter().flatten().count(), 20);
        assert_eq!(table.total(), 1);
        assert_eq!(table.counts[1][2], 1);
    }

    #[test]
    fn role_conditioned_counts_respect_per_role_totals() {
        let data = dataset(&[
            // Holds two roles at once.
            vec![
                ("Role_Attendee/Raver", "1"),
                ("Role_DJ", "1"),
                (COL_IMPACT_DJ, "Yes, negatively"),
            ],
            vec![("Role_DJ", "1"), (COL_IMPACT_DJ, "No effect")],
            // Holds no role at all.
            vec![(COL_IMPACT_DJ, "Yes, positively")],
        ]);
        let table = role_impact_table(&data, COL_IMPACT_DJ).unwrap();
        let dj = table.col_labels.iter().position(|r| r == "DJ").unwrap();
        let dj_total: u64 = table.counts.iter().map(|row| row[dj]).sum();
        assert_eq!(dj_total, 2);
        let attendee = table
            .col_labels
            .iter()
            .position(|r| r == "Attendee/Raver")
            .unwrap();
        let attendee_total: u64 = table.counts.iter().map(|row| row[attendee]).sum();
        assert_eq!(attendee_total, 1);
        // Per-role percentages of each column sum to 100 when the role has
        // members with an answer.
        let dj_pct: f64 = table.percentages.iter().map(|row| row[dj]).sum();
        assert!((dj_pct - 100.0).abs() < 1e-9);
        // Nobody declared "Club staff": zero counts, zero percentages, no
        // division error.
        let staff = table
            .col_labels
            .iter()
            .position(|r| r == "Club staff")
            .unwrap();
        assert!(table.counts.iter().all(|row| row[staff] == 0));
        assert!(table.percentages.iter().all(|row| row[staff] == 0.0));
    }

    #[test]
    fn impact_breakdown_rows_cover_the_domain_and_sum_to_hundred() {
        let data = dataset(&[
            vec![(COL_AGE, "18-24"), (COL_IMPACT_EXPERIENCE, "No effect")],
            vec![(COL_AGE, "18-24"), (COL_IMPACT_EXPERIENCE, "No effect")],
            vec![
                (COL_AGE, "18-24"),
                (COL_IMPACT_EXPERIENCE, "Yes, negatively"),
            ],
            vec![(COL_AGE, "25-34"), (COL_IMPACT_EXPERIENCE, "Yes, positively")],
        ]);
        let table = impact_breakdown(&data, COL_AGE, COL_IMPACT_EXPERIENCE).unwrap();
        // All three age brackets present, even the empty one.
        assert_eq!(table.row_labels, vec!["18-24", "25-34", "35-44+"]);
        assert_eq!(table.col_labels.len(), 3);
        for (row, label) in table.percentages.iter().zip(table.row_labels.iter()) {
            let sum: f64 = row.iter().sum();
            if label == "35-44+" {
                assert_eq!(sum, 0.0);
            } else {
                assert!((sum - 100.0).abs() < 1e-9, "row {} sums to {}", label, sum);
            }
        }
        let negative = table.col_labels.iter().position(|c| c == "Yes, negatively");
        assert!((table.percentages[0][negative.unwrap()] - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn paired_ordinal_table_is_always_five_by_five() {
        let data = dataset(&[
            vec![
                (COL_QUIET_IMPORTANCE, "5"),
                (COL_LIKELIHOOD_INTERVENE, "1"),
            ],
            vec![
                (COL_QUIET_IMPORTANCE, "5"),
                (COL_LIKELIHOOD_INTERVENE, "1"),
            ],
            vec![
                (COL_QUIET_IMPORTANCE, "2"),
                (COL_LIKELIHOOD_INTERVENE, "4"),
            ],
        ]);
        let table =
            paired_ordinal_table(&data, COL_QUIET_IMPORTANCE, COL_LIKELIHOOD_INTERVENE).unwrap();
        // Likelihood on the row axis, ascending.
        assert_eq!(table.row_labels, vec!["1", "2", "3", "4", "5"]);
        assert_eq!(table.col_labels, vec!["1", "2", "3", "4", "5"]);
        assert_eq!(table.counts.iter().flatten().count(), 25);
        assert_eq!(table.total(), data.num_respondents() as u64);
        // (likelihood 1, importance 5) holds two respondents.
        assert_eq!(table.counts[0][4], 2);
        assert_eq!(table.counts[3][1], 1);
        let pct_sum: f64 = table.percentages.iter().flatten().sum();
        assert!((pct_sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_columns_are_rejected_by_every_operation() {
        let data = empty_dataset();
        let missing = "Shoe size";
        let unknown = |column: &str| SurveyErrors::UnknownColumn {
            column: column.to_string(),
        };
        assert_eq!(
            group_means(&data, &[], missing).unwrap_err(),
            unknown(missing)
        );
        assert_eq!(
            count_table(&data, missing, COL_GENDER).unwrap_err(),
            unknown(missing)
        );
        assert_eq!(
            count_table(&data, COL_GENDER, missing).unwrap_err(),
            unknown(missing)
        );
        assert_eq!(
            role_impact_table(&data, missing).unwrap_err(),
            unknown(missing)
        );
        assert_eq!(
            impact_breakdown(&data, missing, COL_IMPACT_DJ).unwrap_err(),
            unknown(missing)
        );
        assert_eq!(
            paired_ordinal_table(&data, missing, COL_LIKELIHOOD_INTERVENE).unwrap_err(),
            unknown(missing)
        );
        assert_eq!(
            ordinal_values(&data, missing).unwrap_err(),
            unknown(missing)
        );
        assert_eq!(
            category_counts(&data, missing).unwrap_err(),
            unknown(missing)
        );
        let engine = ScoreEngine::dancefloor_default();
        assert_eq!(
            engine
                .annotate(&data, missing, COL_TALK_DURATION)
                .unwrap_err(),
            unknown(missing)
        );
    }

    #[test]
    fn empty_datasets_reduce_to_zero_filled_results() {
        let data = empty_dataset();
        let engine = ScoreEngine::dancefloor_default();
        let scores = engine
            .annotate(&data, COL_TALK_FREQUENCY, COL_TALK_DURATION)
            .unwrap();
        assert!(scores.is_empty());
        assert!(group_means(&data, &scores, COL_AGE).unwrap().is_empty());
        assert!(summary_stats(&scores).is_none());
        let heat = paired_ordinal_table(&data, COL_QUIET_IMPORTANCE, COL_LIKELIHOOD_INTERVENE)
            .unwrap();
        assert_eq!(heat.total(), 0);
        assert!(heat.percentages.iter().flatten().all(|p| *p == 0.0));
        let roles = role_impact_table(&data, COL_IMPACT_ATMOSPHERE).unwrap();
        assert!(roles.percentages.iter().flatten().all(|p| *p == 0.0));
        let counts = category_counts(&data, COL_GENDER).unwrap();
        assert_eq!(counts.len(), 4);
        assert!(counts.iter().all(|(_, c)| *c == 0));
    }

    #[test]
    fn category_counts_keep_the_declared_order() {
        let data = dataset(&[
            vec![(COL_TALK_FREQUENCY, "Always")],
            vec![(COL_TALK_FREQUENCY, "Always")],
            vec![(COL_TALK_FREQUENCY, "Never")],
        ]);
        let counts = category_counts(&data, COL_TALK_FREQUENCY).unwrap();
        let labels: Vec<&str> = counts.iter().map(|(l, _)| l.as_str()).collect();
        // Declared order, not frequency order.
        assert_eq!(labels, vec!["Never", "Rarely", "Sometimes", "Often", "Always"]);
        assert_eq!(counts[0].1, 1);
        assert_eq!(counts[4].1, 2);
    }

    #[test]
    fn role_counts_sort_descending() {
        let data = dataset(&[
            vec![("Role_Producer", "1")],
            vec![("Role_Producer", "1"), ("Role_DJ", "1")],
        ]);
        let counts = role_counts(&data);
        assert_eq!(counts[0], ("Producer".to_string(), 2));
        assert_eq!(counts[1], ("DJ".to_string(), 1));
        assert_eq!(counts.len(), 6);
    }

    #[test]
    fn grouped_means_mark_empty_combinations() {
        let data = dataset(&[
            vec![
                (COL_QUIET_IMPORTANCE, "4"),
                (COL_LIKELIHOOD_INTERVENE, "5"),
                (COL_AGE, "18-24"),
            ],
            vec![
                (COL_QUIET_IMPORTANCE, "4"),
                (COL_LIKELIHOOD_INTERVENE, "3"),
                (COL_AGE, "18-24"),
            ],
        ]);
        let likelihood = ordinal_values(&data, COL_LIKELIHOOD_INTERVENE).unwrap();
        let table = grouped_means(&data, &likelihood, COL_QUIET_IMPORTANCE, COL_AGE).unwrap();
        assert_eq!(table.row_labels.len(), 5);
        assert_eq!(table.col_labels.len(), 3);
        assert_eq!(table.means[3][0], Some(4.0));
        assert_eq!(table.means[0][0], None);
        assert_eq!(table.means[3][1], None);
    }

    #[test]
    fn score_histogram_keeps_every_score_including_the_ceiling() {
        let values = vec![Some(0.0), Some(12.5), Some(99.9), Some(100.0), None];
        let bins = score_histogram(&values, 20);
        assert_eq!(bins.len(), 20);
        let total: u64 = bins.iter().map(|(_, c)| *c).sum();
        assert_eq!(total, 4);
        // 100 falls into the last bin, not past it.
        assert_eq!(bins[19].1, 2);
        assert_eq!(bins[0].1, 1);
        assert_eq!(bins[2].1, 1);
    }

    #[test]
    fn ordinal_means_average_the_reported_levels() {
        let data = dataset(&[
            vec![(COL_QUIET_IMPORTANCE, "5")],
            vec![(COL_QUIET_IMPORTANCE, "2")],
            vec![],
        ]);
        let values = ordinal_values(&data, COL_QUIET_IMPORTANCE).unwrap();
        assert_eq!(mean_of(&values), Some(3.5));
    }
}
