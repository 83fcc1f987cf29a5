use crate::domain::entities::{Criterion, EmployeeDetails};
use crate::domain::value_objects::{
    ObservationStatus, RecordCategory, RecordPayload, ResponseValue, Severity,
};
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

/// Context shared by every record built during a tour.
#[derive(Debug, Clone)]
pub struct BuildContext<'a> {
    pub employee: &'a EmployeeDetails,
    pub recorded_at: DateTime<Utc>,
}

/// Fixed response → status table. Checklist rejections await review;
/// cycle rejections are terminal.
pub fn status_code(category: RecordCategory, response: ResponseValue) -> ObservationStatus {
    match response {
        ResponseValue::Approved => ObservationStatus::Approved,
        ResponseValue::NotApplicable => ObservationStatus::NotApplicable,
        ResponseValue::Rejected => match category {
            RecordCategory::ChecklistObservation | RecordCategory::NotApplicableObservation => {
                ObservationStatus::Pending
            }
            _ => ObservationStatus::Rejected,
        },
    }
}

/// Approvals and NA carry the baseline; rejections split on the near-miss
/// flag.
pub fn severity_for(response: ResponseValue, near_miss: bool) -> Severity {
    match response {
        ResponseValue::Rejected if near_miss => Severity::NearMiss,
        ResponseValue::Rejected => Severity::High,
        _ => Severity::Baseline,
    }
}

/// Cream percentage = (sandwich − shell) / sandwich × 100, rounded to two
/// decimals. Non-numeric input, a zero or negative sandwich weight, a
/// negative shell weight, or shell heavier than sandwich all yield `None` —
/// never a panic, never NaN in a payload.
pub fn cream_percentage(sandwich_weight: &str, shell_weight: &str) -> Option<String> {
    let sandwich: f64 = sandwich_weight.trim().parse().ok()?;
    let shell: f64 = shell_weight.trim().parse().ok()?;
    if !sandwich.is_finite() || !shell.is_finite() {
        return None;
    }
    if sandwich <= 0.0 || shell < 0.0 || shell > sandwich {
        return None;
    }
    let percentage = (sandwich - shell) / sandwich * 100.0;
    Some(format!("{percentage:.2}"))
}

/// Average ignoring missing entries; all-missing yields `None`, not zero.
pub fn average(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().filter_map(|v| *v).collect();
    if present.is_empty() {
        return None;
    }
    Some(present.iter().sum::<f64>() / present.len() as f64)
}

/// Derived tour score: percent of approved over scorable (non-NA)
/// observations, two decimals.
pub fn tour_score(statuses: &[ObservationStatus]) -> Option<f64> {
    let scorable = statuses
        .iter()
        .filter(|s| !matches!(s, ObservationStatus::NotApplicable))
        .count();
    if scorable == 0 {
        return None;
    }
    let approved = statuses
        .iter()
        .filter(|s| matches!(s, ObservationStatus::Approved))
        .count();
    Some((approved as f64 / scorable as f64 * 10_000.0).round() / 100.0)
}

struct FieldMapping {
    canonical: &'static str,
    sources: &'static [&'static str],
}

const CHECKLIST_FIELDS: &[FieldMapping] = &[
    FieldMapping {
        canonical: "comment",
        sources: &["comment", "remarks", "observationText"],
    },
    FieldMapping {
        canonical: "correctiveAction",
        sources: &["correctiveAction", "action"],
    },
    FieldMapping {
        canonical: "evidenceRef",
        sources: &["evidenceRef", "photoId"],
    },
];

const CYCLE_FIELDS: &[FieldMapping] = &[
    FieldMapping {
        canonical: "line",
        sources: &["line", "productionLine"],
    },
    FieldMapping {
        canonical: "product",
        sources: &["product", "sku", "productName"],
    },
    FieldMapping {
        canonical: "comment",
        sources: &["comment", "remarks"],
    },
];

fn mappings_for(category: RecordCategory) -> &'static [FieldMapping] {
    match category {
        RecordCategory::ChecklistObservation | RecordCategory::NotApplicableObservation => {
            CHECKLIST_FIELDS
        }
        _ => CYCLE_FIELDS,
    }
}

/// Resolve raw UI-collected fields into canonical payload fields through
/// the category's fallback chain. The first non-empty source wins; a
/// missing chain resolves to an empty string.
pub fn map_raw_fields(category: RecordCategory, raw: &Map<String, Value>) -> Map<String, Value> {
    let mut canonical = Map::new();
    for mapping in mappings_for(category) {
        let value = mapping
            .sources
            .iter()
            .filter_map(|source| raw.get(*source))
            .find(|v| match v {
                Value::String(s) => !s.trim().is_empty(),
                Value::Null => false,
                _ => true,
            })
            .cloned()
            .unwrap_or_else(|| Value::String(String::new()));
        canonical.insert(mapping.canonical.to_string(), value);
    }
    canonical
}

/// Canonical checklist observation payload. Pure: identical inputs produce
/// identical content apart from the supplied timestamp.
pub fn build_observation(
    ctx: &BuildContext<'_>,
    criterion: &Criterion,
    response: ResponseValue,
    near_miss: bool,
    raw_fields: &Map<String, Value>,
) -> RecordPayload {
    let category = match response {
        ResponseValue::NotApplicable => RecordCategory::NotApplicableObservation,
        _ => RecordCategory::ChecklistObservation,
    };
    let mut payload = Map::new();
    payload.insert("criterionId".into(), json!(criterion.id));
    payload.insert("area".into(), json!(criterion.area));
    payload.insert(
        "status".into(),
        json!(status_code(category, response).as_str()),
    );
    payload.insert(
        "severity".into(),
        json!(severity_for(response, near_miss).as_str()),
    );
    payload.insert("inspectorId".into(), json!(ctx.employee.employee_id));
    payload.insert("department".into(), json!(ctx.employee.department));
    payload.insert("plant".into(), json!(ctx.employee.plant));
    payload.insert("recordedAt".into(), json!(ctx.recorded_at.to_rfc3339()));
    payload.extend(map_raw_fields(category, raw_fields));

    RecordPayload::new(Value::Object(payload)).expect("observation payload is an object")
}

/// One weighed sandwich in a cream-percentage cycle.
#[derive(Debug, Clone)]
pub struct WeightSample {
    pub sandwich_weight: String,
    pub shell_weight: String,
}

/// Canonical cream-percentage cycle payload: per-sample percentages plus
/// their average, with missing derivations carried as null.
pub fn build_cream_percentage_cycle(
    ctx: &BuildContext<'_>,
    cycle_number: u32,
    samples: &[WeightSample],
    raw_fields: &Map<String, Value>,
) -> RecordPayload {
    let percentages: Vec<Option<String>> = samples
        .iter()
        .map(|s| cream_percentage(&s.sandwich_weight, &s.shell_weight))
        .collect();
    let numeric: Vec<Option<f64>> = percentages
        .iter()
        .map(|p| p.as_deref().and_then(|v| v.parse::<f64>().ok()))
        .collect();
    let avg = average(&numeric).map(|v| format!("{v:.2}"));

    let mut payload = Map::new();
    payload.insert("cycleNumber".into(), json!(cycle_number));
    payload.insert(
        "samples".into(),
        Value::Array(
            samples
                .iter()
                .zip(percentages.iter())
                .map(|(sample, pct)| {
                    json!({
                        "sandwichWeight": sample.sandwich_weight,
                        "shellWeight": sample.shell_weight,
                        "creamPercentage": pct,
                    })
                })
                .collect(),
        ),
    );
    payload.insert("averageCreamPercentage".into(), json!(avg));
    payload.insert("inspectorId".into(), json!(ctx.employee.employee_id));
    payload.insert("recordedAt".into(), json!(ctx.recorded_at.to_rfc3339()));
    payload.extend(map_raw_fields(
        RecordCategory::CreamPercentageCycle,
        raw_fields,
    ));

    RecordPayload::new(Value::Object(payload)).expect("cycle payload is an object")
}

/// Generic measurement-cycle payload for the sieve/magnet and product
/// monitoring categories, whose shapes differ only in their checks.
pub fn build_cycle(
    ctx: &BuildContext<'_>,
    category: RecordCategory,
    cycle_number: u32,
    response: ResponseValue,
    raw_fields: &Map<String, Value>,
) -> RecordPayload {
    let mut payload = Map::new();
    payload.insert("cycleNumber".into(), json!(cycle_number));
    payload.insert(
        "status".into(),
        json!(status_code(category, response).as_str()),
    );
    payload.insert("inspectorId".into(), json!(ctx.employee.employee_id));
    payload.insert("recordedAt".into(), json!(ctx.recorded_at.to_rfc3339()));
    payload.extend(map_raw_fields(category, raw_fields));

    RecordPayload::new(Value::Object(payload)).expect("cycle payload is an object")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee() -> EmployeeDetails {
        EmployeeDetails {
            employee_id: "e-42".into(),
            name: "Inspector".into(),
            role: "QA".into(),
            plant: "P01".into(),
            department: "Sandwich Line".into(),
        }
    }

    fn criterion() -> Criterion {
        Criterion {
            id: "c-7".into(),
            area: "Mixing".into(),
            category: "Hygiene".into(),
            what_text: "Floors".into(),
            criteria_text: "Free of debris".into(),
        }
    }

    #[test]
    fn cream_percentage_happy_path() {
        assert_eq!(cream_percentage("10", "4").as_deref(), Some("60.00"));
    }

    #[test]
    fn cream_percentage_zero_sandwich_is_none() {
        assert_eq!(cream_percentage("0", "5"), None);
    }

    #[test]
    fn cream_percentage_shell_heavier_is_none() {
        assert_eq!(cream_percentage("5", "9"), None);
    }

    #[test]
    fn cream_percentage_non_numeric_is_none() {
        assert_eq!(cream_percentage("abc", "4"), None);
        assert_eq!(cream_percentage("10", ""), None);
        assert_eq!(cream_percentage("NaN", "1"), None);
    }

    #[test]
    fn average_ignores_missing_entries() {
        assert_eq!(average(&[Some(10.0), None, Some(20.0)]), Some(15.0));
    }

    #[test]
    fn average_of_all_missing_is_none() {
        assert_eq!(average(&[None, None]), None);
    }

    #[test]
    fn rejected_checklist_maps_to_pending() {
        assert_eq!(
            status_code(RecordCategory::ChecklistObservation, ResponseValue::Rejected),
            ObservationStatus::Pending
        );
        assert_eq!(
            status_code(RecordCategory::SieveAndMagnetCycle, ResponseValue::Rejected),
            ObservationStatus::Rejected
        );
    }

    #[test]
    fn severity_splits_on_near_miss() {
        assert_eq!(severity_for(ResponseValue::Rejected, true), Severity::NearMiss);
        assert_eq!(severity_for(ResponseValue::Rejected, false), Severity::High);
        assert_eq!(severity_for(ResponseValue::Approved, true), Severity::Baseline);
        assert_eq!(
            severity_for(ResponseValue::NotApplicable, false),
            Severity::Baseline
        );
    }

    #[test]
    fn field_mapping_prefers_first_non_empty_source() {
        let mut raw = Map::new();
        raw.insert("remarks".into(), json!("from remarks"));
        raw.insert("comment".into(), json!(""));
        let mapped = map_raw_fields(RecordCategory::ChecklistObservation, &raw);
        assert_eq!(mapped.get("comment"), Some(&json!("from remarks")));
        assert_eq!(mapped.get("correctiveAction"), Some(&json!("")));
    }

    #[test]
    fn observation_payload_is_deterministic() {
        let employee = employee();
        let criterion = criterion();
        let recorded_at = Utc::now();
        let ctx = BuildContext {
            employee: &employee,
            recorded_at,
        };
        let raw = Map::new();
        let a = build_observation(&ctx, &criterion, ResponseValue::Approved, false, &raw);
        let b = build_observation(&ctx, &criterion, ResponseValue::Approved, false, &raw);
        assert_eq!(a, b);
        assert_eq!(a.as_json()["status"], json!("Approved"));
        assert_eq!(a.as_json()["severity"], json!("LOW"));
    }

    #[test]
    fn cream_cycle_payload_carries_nulls_not_nan() {
        let employee = employee();
        let ctx = BuildContext {
            employee: &employee,
            recorded_at: Utc::now(),
        };
        let samples = vec![
            WeightSample {
                sandwich_weight: "10".into(),
                shell_weight: "4".into(),
            },
            WeightSample {
                sandwich_weight: "0".into(),
                shell_weight: "5".into(),
            },
        ];
        let payload = build_cream_percentage_cycle(&ctx, 1, &samples, &Map::new());
        let rendered = serde_json::to_string(payload.as_json()).unwrap();
        assert!(!rendered.contains("NaN"));
        assert_eq!(
            payload.as_json()["samples"][0]["creamPercentage"],
            json!("60.00")
        );
        assert_eq!(payload.as_json()["samples"][1]["creamPercentage"], json!(null));
        assert_eq!(payload.as_json()["averageCreamPercentage"], json!("60.00"));
    }

    #[test]
    fn tour_score_skips_not_applicable() {
        let statuses = [
            ObservationStatus::Approved,
            ObservationStatus::Approved,
            ObservationStatus::Pending,
            ObservationStatus::NotApplicable,
        ];
        assert_eq!(tour_score(&statuses), Some(66.67));
        assert_eq!(tour_score(&[ObservationStatus::NotApplicable]), None);
        assert_eq!(tour_score(&[]), None);
    }
}
