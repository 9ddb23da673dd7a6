/*!

This is the long-form manual for `survey_tabulation` and `yapstat`.

## The dataset

The engine works on a fixed-schema survey export: one row per respondent, one
column per question. Each categorical column has a declared, ordered domain
(for example talk frequency: `Never < Rarely < Sometimes < Often < Always`);
the two Likert columns are integer scales `1..=5`. The declared order is the
canonical axis order for every table the engine produces. It is never
re-sorted alphabetically or by frequency.

Role membership is recorded as one boolean-ish column per role, prefixed with
`Role_` (`Role_DJ`, `Role_Club staff`, ...). The flags are independent: a
respondent can hold several roles at once, or none. Per-role totals therefore
do not add up to the number of respondents, and every per-role percentage is
computed against that role's own total.

A dataset is assembled through [crate::builder::Builder], which validates
every cell against the schema. A value outside its column's domain is an
[crate::SurveyErrors::InvalidCategory] error; naming a column outside the
schema is [crate::SurveyErrors::UnknownColumn]. Blank cells are recorded as
missing answers and are skipped by the tabulations that involve the column.

## The Yapping Factor

The [crate::ScoreEngine] collapses talk frequency and talk duration into one
number in `[0, 100]`:

```text
combined   = frequency_score * 0.7 + duration_score * 0.3
normalized = combined / max_combined * 100
```

`max_combined` is derived from the score tables at construction, so the
normalization stays correct if the tables are revised. Respondents who never
talk score 0 regardless of their duration answer.

```
use survey_tabulation::{ScoreEngine, YappingBand};

let engine = ScoreEngine::dancefloor_default();
let score = engine.normalized("Often", "1-5 minutes")?;
assert!(score > 60.0 && score < 70.0);
assert_eq!(YappingBand::of_score(score), YappingBand::Chatty);
# Ok::<(), survey_tabulation::SurveyErrors>(())
```

## Tabulations

All tabulations return dense, zero-filled tables ordered by the declared
domains, so a renderer can index them without bounds checks:

* [crate::group_means] — mean of a numeric annotation per group value.
* [crate::count_table] — counts for every (group, secondary) pair.
* [crate::role_impact_table] — impact categories against the role set, with
  per-role percentages.
* [crate::impact_breakdown] — impact outcome shares per demographic value.
* [crate::paired_ordinal_table] — the full likelihood-by-importance grid.
* [crate::category_counts], [crate::role_counts], [crate::score_histogram] —
  single-column distributions.

Percentages with an empty denominator are defined to be 0; an empty dataset
reduces every table to its zero-filled shape without errors.

*/
