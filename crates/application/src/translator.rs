use std::collections::BTreeMap;

use chrono::NaiveDate;
use restmeta_core::{AppError, AppResult};
use restmeta_domain::{FilterKind, FilterSpec};
use serde_json::{Value, json};

use crate::predicate::PredicateBuilder;

/// Decoded query string parameters, keyed by parameter name.
pub type QueryParams = BTreeMap<String, String>;

/// Packed query parameter carrying several amount intervals at once,
/// as `field:low-high` members separated by commas.
pub const AMOUNT_RANGES_PARAM: &str = "amount_ranges";

/// Packed query parameter carrying several date intervals at once, as
/// `field:from:to` members separated by commas.
pub const DATE_RANGES_PARAM: &str = "date_ranges";

/// How the translator treats malformed filter values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranslationMode {
    /// Malformed values drop their filter and are logged.
    #[default]
    Lenient,
    /// Malformed values fail the whole translation.
    Strict,
}

/// One translated filter, pairing the filter name with the predicate
/// built for the configured backend.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause<P> {
    /// Name of the filter (or packed-range field) the clause came from.
    pub filter_name: String,
    /// Backend predicate for the clause.
    pub predicate: P,
}

/// Translates query parameters against a resource's filter list into
/// backend predicates.
#[derive(Debug, Clone)]
pub struct FilterTranslator<B> {
    builder: B,
    mode: TranslationMode,
}

impl<B: PredicateBuilder> FilterTranslator<B> {
    /// Creates a translator for the given backend builder.
    #[must_use]
    pub fn new(builder: B, mode: TranslationMode) -> Self {
        Self { builder, mode }
    }

    /// Returns how malformed values are treated.
    #[must_use]
    pub fn mode(&self) -> TranslationMode {
        self.mode
    }

    /// Translates all recognized parameters into filter clauses.
    ///
    /// Clause order follows the filter list; packed range clauses come
    /// last. Parameters matching no filter are ignored. Translation is
    /// a pure function of its inputs.
    pub fn translate(
        &self,
        specs: &[FilterSpec],
        params: &QueryParams,
    ) -> AppResult<Vec<FilterClause<B::Predicate>>> {
        let mut clauses = Vec::new();

        for spec in specs {
            if let Some(predicate) = self.translate_spec(spec, params)? {
                clauses.push(FilterClause {
                    filter_name: spec.name().as_str().to_owned(),
                    predicate,
                });
            }
        }

        if let Some(raw) = non_empty(params.get(AMOUNT_RANGES_PARAM)) {
            clauses.extend(self.translate_packed_amounts(raw)?);
        }
        if let Some(raw) = non_empty(params.get(DATE_RANGES_PARAM)) {
            clauses.extend(self.translate_packed_dates(raw)?);
        }

        Ok(clauses)
    }

    /// Combines clauses into one conjunction, or `None` when nothing
    /// was filtered. Clauses only ever combine with AND.
    #[must_use]
    pub fn combined(&self, clauses: Vec<FilterClause<B::Predicate>>) -> Option<B::Predicate> {
        let mut predicates: Vec<_> = clauses.into_iter().map(|clause| clause.predicate).collect();
        match predicates.len() {
            0 => None,
            1 => Some(predicates.remove(0)),
            _ => Some(self.builder.all_of(predicates)),
        }
    }

    fn translate_spec(
        &self,
        spec: &FilterSpec,
        params: &QueryParams,
    ) -> AppResult<Option<B::Predicate>> {
        let name = spec.name().as_str();

        match spec.kind() {
            FilterKind::Select { multiple, .. } => {
                let Some(raw) = non_empty(params.get(name)) else {
                    return Ok(None);
                };
                if *multiple {
                    let values: Vec<_> = raw
                        .split(',')
                        .map(str::trim)
                        .filter(|member| !member.is_empty())
                        .map(coerce_scalar)
                        .collect();
                    if values.is_empty() {
                        return Ok(None);
                    }

                    let alternatives = values
                        .into_iter()
                        .map(|value| self.targeted(spec, |field| self.builder.exact(field, value.clone())))
                        .collect();
                    Ok(Some(self.builder.any_of(alternatives)))
                } else {
                    let value = coerce_scalar(raw);
                    Ok(Some(self.targeted(spec, |field| {
                        self.builder.exact(field, value.clone())
                    })))
                }
            }
            FilterKind::Autocomplete { .. } => {
                let Some(raw) = non_empty(params.get(name)) else {
                    return Ok(None);
                };
                let value = coerce_scalar(raw);
                Ok(Some(self.targeted(spec, |field| {
                    self.builder.exact(field, value.clone())
                })))
            }
            FilterKind::Boolean => {
                let Some(raw) = non_empty(params.get(name)) else {
                    return Ok(None);
                };
                match parse_bool(raw) {
                    Some(flag) => Ok(Some(self.targeted(spec, |field| {
                        self.builder.exact(field, Value::Bool(flag))
                    }))),
                    None => self.drop_value(name, raw, "expected a boolean"),
                }
            }
            FilterKind::Date | FilterKind::DateRange => self.translate_date(spec, params),
            FilterKind::AmountRange { subunit_scale } => {
                self.translate_numeric(spec, params, Some(*subunit_scale))
            }
            FilterKind::NumericRange { .. } => self.translate_numeric(spec, params, None),
            FilterKind::FormValue { .. } => {
                let Some(raw) = non_empty(params.get(name)) else {
                    return Ok(None);
                };
                Ok(Some(self.targeted(spec, |field| {
                    self.builder.text_match(field, raw)
                })))
            }
        }
    }

    /// A single calendar day `d` filters as the half-open day interval
    /// `[d, d+1)`; explicit `_from`/`_to` bounds filter as `[from, to)`.
    fn translate_date(
        &self,
        spec: &FilterSpec,
        params: &QueryParams,
    ) -> AppResult<Option<B::Predicate>> {
        let name = spec.name().as_str();

        if let Some(raw) = non_empty(params.get(name)) {
            let Some(day) = parse_date(raw) else {
                return self.drop_value(name, raw, "expected an ISO date");
            };
            let Some(next_day) = day.succ_opt() else {
                return self.drop_value(name, raw, "date has no following day");
            };

            return Ok(Some(self.targeted(spec, |field| {
                self.builder.range(
                    field,
                    Some(json!(day.to_string())),
                    Some(json!(next_day.to_string())),
                )
            })));
        }

        let from_raw = non_empty(params.get(&format!("{name}_from")));
        let to_raw = non_empty(params.get(&format!("{name}_to")));
        if from_raw.is_none() && to_raw.is_none() {
            return Ok(None);
        }

        let mut from = None;
        if let Some(raw) = from_raw {
            match parse_date(raw) {
                Some(day) => from = Some(json!(day.to_string())),
                None => return self.drop_value(name, raw, "expected an ISO date"),
            }
        }
        let mut to = None;
        if let Some(raw) = to_raw {
            match parse_date(raw) {
                Some(day) => to = Some(json!(day.to_string())),
                None => return self.drop_value(name, raw, "expected an ISO date"),
            }
        }

        Ok(Some(self.targeted(spec, |field| {
            self.builder.range(field, from.clone(), to.clone())
        })))
    }

    fn translate_numeric(
        &self,
        spec: &FilterSpec,
        params: &QueryParams,
        subunit_scale: Option<u32>,
    ) -> AppResult<Option<B::Predicate>> {
        let name = spec.name().as_str();
        let min_raw = non_empty(params.get(&format!("{name}_min")));
        let max_raw = non_empty(params.get(&format!("{name}_max")));
        if min_raw.is_none() && max_raw.is_none() {
            return Ok(None);
        }

        let mut lower = None;
        if let Some(raw) = min_raw {
            match parse_number(raw, subunit_scale) {
                Some(value) => lower = Some(value),
                None => return self.drop_value(name, raw, "expected a number"),
            }
        }
        let mut upper = None;
        if let Some(raw) = max_raw {
            match parse_number(raw, subunit_scale) {
                Some(value) => upper = Some(value),
                None => return self.drop_value(name, raw, "expected a number"),
            }
        }

        Ok(Some(self.targeted(spec, |field| {
            self.builder.range(field, lower.clone(), upper.clone())
        })))
    }

    /// Packed `field:low-high` members; both bounds are required and a
    /// malformed member drops (or fails) individually. Bounds are taken
    /// in stored units as-is; the subunit scaling of a declared amount
    /// filter does not apply here.
    fn translate_packed_amounts(
        &self,
        raw: &str,
    ) -> AppResult<Vec<FilterClause<B::Predicate>>> {
        let mut clauses = Vec::new();

        for member in raw.split(',').map(str::trim).filter(|member| !member.is_empty()) {
            let parsed = member.split_once(':').and_then(|(field, bounds)| {
                let (low, high) = bounds.split_once('-')?;
                let low = parse_number(low.trim(), None)?;
                let high = parse_number(high.trim(), None)?;
                Some((field.trim(), low, high))
            });

            match parsed {
                Some((field, low, high)) if !field.is_empty() => clauses.push(FilterClause {
                    filter_name: field.to_owned(),
                    predicate: self.builder.range(field, Some(low), Some(high)),
                }),
                _ => {
                    self.drop_value(AMOUNT_RANGES_PARAM, member, "expected field:low-high")?;
                }
            }
        }

        Ok(clauses)
    }

    /// Packed `field:from:to` members; `to` may be omitted and a
    /// malformed member drops (or fails) individually.
    fn translate_packed_dates(&self, raw: &str) -> AppResult<Vec<FilterClause<B::Predicate>>> {
        let mut clauses = Vec::new();

        for member in raw.split(',').map(str::trim).filter(|member| !member.is_empty()) {
            let parsed = member.split_once(':').and_then(|(field, bounds)| {
                let field = field.trim();
                if field.is_empty() {
                    return None;
                }

                let (from_raw, to_raw) = match bounds.split_once(':') {
                    Some((from, to)) => (from.trim(), Some(to.trim())),
                    None => (bounds.trim(), None),
                };
                let from = parse_date(from_raw)?;
                let to = match to_raw {
                    Some(to) if !to.is_empty() => Some(parse_date(to)?),
                    _ => None,
                };
                Some((field, from, to))
            });

            match parsed {
                Some((field, from, to)) => clauses.push(FilterClause {
                    filter_name: field.to_owned(),
                    predicate: self.builder.range(
                        field,
                        Some(json!(from.to_string())),
                        to.map(|day| json!(day.to_string())),
                    ),
                }),
                None => {
                    self.drop_value(DATE_RANGES_PARAM, member, "expected field:from:to")?;
                }
            }
        }

        Ok(clauses)
    }

    fn targeted<F>(&self, spec: &FilterSpec, make: F) -> B::Predicate
    where
        F: Fn(&str) -> B::Predicate,
    {
        let targets = spec.target_fields();
        if targets.len() == 1 {
            make(targets[0].as_str())
        } else {
            self.builder
                .any_of(targets.iter().map(|field| make(field.as_str())).collect())
        }
    }

    fn drop_value(
        &self,
        filter_name: &str,
        raw: &str,
        reason: &str,
    ) -> AppResult<Option<B::Predicate>> {
        match self.mode {
            TranslationMode::Lenient => {
                tracing::debug!(filter = filter_name, value = raw, reason, "dropped filter value");
                Ok(None)
            }
            TranslationMode::Strict => Err(AppError::Validation(format!(
                "filter '{filter_name}' rejected value '{raw}': {reason}"
            ))),
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|raw| !raw.trim().is_empty())
}

/// Coerces a raw query value to the closest JSON scalar, so exact
/// matches line up with how the value is stored.
fn coerce_scalar(raw: &str) -> Value {
    let raw = raw.trim();
    if let Ok(int) = raw.parse::<i64>() {
        return json!(int);
    }
    if let Ok(float) = raw.parse::<f64>() {
        return json!(float);
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_owned()),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Parses a numeric bound, scaling major units to stored subunits
/// when a scale is given.
fn parse_number(raw: &str, subunit_scale: Option<u32>) -> Option<Value> {
    let number = raw.trim().parse::<f64>().ok()?;
    if !number.is_finite() {
        return None;
    }

    let scaled = match subunit_scale {
        Some(scale) => number * 10f64.powi(scale.min(18) as i32),
        None => number,
    };

    if scaled.fract() == 0.0 && scaled.abs() < i64::MAX as f64 {
        Some(json!(scaled as i64))
    } else {
        Some(json!(scaled))
    }
}

#[cfg(test)]
mod tests {
    use restmeta_domain::{FilterKind, FilterSpec};
    use serde_json::json;

    use crate::predicate::{CompareOp, Predicate, RelationalPredicateBuilder};

    use super::{FilterTranslator, QueryParams, TranslationMode};

    fn translator(mode: TranslationMode) -> FilterTranslator<RelationalPredicateBuilder> {
        FilterTranslator::new(RelationalPredicateBuilder, mode)
    }

    fn spec(title: &str, name: &str, kind: FilterKind) -> FilterSpec {
        FilterSpec::new(title, name, kind).unwrap_or_else(|_| unreachable!())
    }

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[test]
    fn single_day_equals_day_interval() {
        let specs = vec![spec("Due", "due_date", FilterKind::Date)];
        let translator = translator(TranslationMode::Lenient);

        let legacy = translator
            .translate(&specs, &params(&[("due_date", "2026-03-14")]))
            .unwrap_or_else(|_| unreachable!());
        let interval = translator
            .translate(
                &specs,
                &params(&[("due_date_from", "2026-03-14"), ("due_date_to", "2026-03-15")]),
            )
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(legacy, interval);
    }

    #[test]
    fn malformed_date_is_dropped_in_lenient_mode() {
        let specs = vec![spec("Due", "due_date", FilterKind::Date)];
        let clauses = translator(TranslationMode::Lenient)
            .translate(&specs, &params(&[("due_date", "tomorrow")]))
            .unwrap_or_else(|_| unreachable!());
        assert!(clauses.is_empty());
    }

    #[test]
    fn malformed_date_fails_in_strict_mode() {
        let specs = vec![spec("Due", "due_date", FilterKind::Date)];
        let result = translator(TranslationMode::Strict)
            .translate(&specs, &params(&[("due_date", "tomorrow")]));
        assert!(result.is_err());
    }

    #[test]
    fn select_multiple_builds_a_disjunction() {
        let select = spec(
            "Status",
            "status",
            FilterKind::Select {
                source: restmeta_domain::ChoiceSource::Inline(vec![
                    restmeta_domain::ChoiceOption::new(json!("open"), "Open")
                        .unwrap_or_else(|_| unreachable!()),
                ]),
                multiple: true,
            },
        );
        let clauses = translator(TranslationMode::Lenient)
            .translate(&[select], &params(&[("status", "open,pending")]))
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(clauses.len(), 1);
        assert_eq!(
            clauses[0].predicate,
            Predicate::Any(vec![
                Predicate::Compare {
                    field: "status".to_owned(),
                    op: CompareOp::Eq,
                    value: json!("open"),
                },
                Predicate::Compare {
                    field: "status".to_owned(),
                    op: CompareOp::Eq,
                    value: json!("pending"),
                },
            ])
        );
    }

    #[test]
    fn empty_select_value_means_unfiltered() {
        let select = spec(
            "Status",
            "status",
            FilterKind::Select {
                source: restmeta_domain::ChoiceSource::Inline(vec![
                    restmeta_domain::ChoiceOption::new(json!("open"), "Open")
                        .unwrap_or_else(|_| unreachable!()),
                ]),
                multiple: false,
            },
        );
        let clauses = translator(TranslationMode::Lenient)
            .translate(&[select], &params(&[("status", "")]))
            .unwrap_or_else(|_| unreachable!());
        assert!(clauses.is_empty());
    }

    #[test]
    fn amount_range_scales_major_units_to_subunits() {
        let specs = vec![spec(
            "Amount",
            "amount",
            FilterKind::AmountRange { subunit_scale: 2 },
        )];
        let clauses = translator(TranslationMode::Lenient)
            .translate(
                &specs,
                &params(&[("amount_min", "10"), ("amount_max", "25.5")]),
            )
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(
            clauses[0].predicate,
            Predicate::All(vec![
                Predicate::Compare {
                    field: "amount".to_owned(),
                    op: CompareOp::Gte,
                    value: json!(1000),
                },
                Predicate::Compare {
                    field: "amount".to_owned(),
                    op: CompareOp::Lt,
                    value: json!(2550),
                },
            ])
        );
    }

    #[test]
    fn numeric_range_accepts_a_single_bound() {
        let specs = vec![spec(
            "Quantity",
            "quantity",
            FilterKind::NumericRange {
                min: None,
                max: None,
                step: None,
            },
        )];
        let clauses = translator(TranslationMode::Lenient)
            .translate(&specs, &params(&[("quantity_min", "3")]))
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(
            clauses[0].predicate,
            Predicate::Compare {
                field: "quantity".to_owned(),
                op: CompareOp::Gte,
                value: json!(3),
            }
        );
    }

    #[test]
    fn packed_amount_bounds_are_taken_in_stored_units() {
        let clauses = translator(TranslationMode::Lenient)
            .translate(&[], &params(&[("amount_ranges", "amount:100-500")]))
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(
            clauses[0].predicate,
            Predicate::All(vec![
                Predicate::Compare {
                    field: "amount".to_owned(),
                    op: CompareOp::Gte,
                    value: json!(100),
                },
                Predicate::Compare {
                    field: "amount".to_owned(),
                    op: CompareOp::Lt,
                    value: json!(500),
                },
            ])
        );
    }

    #[test]
    fn packed_amount_ranges_skip_malformed_members() {
        let clauses = translator(TranslationMode::Lenient)
            .translate(
                &[],
                &params(&[("amount_ranges", "total:100-500,broken,fee:x-9")]),
            )
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].filter_name, "total");
    }

    #[test]
    fn packed_date_ranges_allow_open_upper_bound() {
        let clauses = translator(TranslationMode::Lenient)
            .translate(&[], &params(&[("date_ranges", "issued_at:2026-01-01")]))
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(
            clauses[0].predicate,
            Predicate::Compare {
                field: "issued_at".to_owned(),
                op: CompareOp::Gte,
                value: json!("2026-01-01"),
            }
        );
    }

    #[test]
    fn translation_is_idempotent() {
        let specs = vec![
            spec("Paid", "paid", FilterKind::Boolean),
            spec("Due", "due_date", FilterKind::DateRange),
        ];
        let query = params(&[("paid", "true"), ("due_date_from", "2026-01-01")]);
        let translator = translator(TranslationMode::Lenient);

        let first = translator
            .translate(&specs, &query)
            .unwrap_or_else(|_| unreachable!());
        let second = translator
            .translate(&specs, &query)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(first, second);
    }

    #[test]
    fn combined_clauses_form_a_conjunction() {
        let specs = vec![
            spec("Paid", "paid", FilterKind::Boolean),
            spec(
                "Quantity",
                "quantity",
                FilterKind::NumericRange {
                    min: None,
                    max: None,
                    step: None,
                },
            ),
        ];
        let translator = translator(TranslationMode::Lenient);
        let clauses = translator
            .translate(&specs, &params(&[("paid", "1"), ("quantity_min", "2")]))
            .unwrap_or_else(|_| unreachable!());

        match translator.combined(clauses) {
            Some(Predicate::All(children)) => assert_eq!(children.len(), 2),
            other => panic!("expected a conjunction, got {other:?}"),
        }
    }
}
