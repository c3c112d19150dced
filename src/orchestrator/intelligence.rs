//! Clinical-intelligence gathering (§4.9, §5): builds a causal timeline
//! first, then runs treatment-response tracking, functional-evolution
//! analysis, and relationship extraction concurrently off of it — their
//! relative completion order must not affect the merged report, so they
//! are joined into a single tuple rather than raced.

use chrono::NaiveDate;

use crate::lexical::calculate_combined_similarity;
use crate::model::record::ExtractedRecord;
use crate::pattern_store::PatternStore;
use crate::validator::ValidationOutcome;

#[derive(Debug, Clone)]
pub struct CausalTimelineEvent {
    pub date: Option<NaiveDate>,
    pub category: String,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct TreatmentResponse {
    pub medication: String,
    pub linked_complication: Option<String>,
    pub note: String,
}

#[derive(Debug, Clone)]
pub struct FunctionalEvolution {
    pub scale: String,
    pub observed_value: String,
    pub interpretation: String,
}

#[derive(Debug, Clone)]
pub struct RelationshipEdge {
    pub from_category: String,
    pub from_name: String,
    pub to_category: String,
    pub to_name: String,
    pub basis: String,
}

#[derive(Debug, Clone, Default)]
pub struct IntelligenceReport {
    pub causal_timeline: Vec<CausalTimelineEvent>,
    pub treatment_response: Vec<TreatmentResponse>,
    pub functional_evolution: Vec<FunctionalEvolution>,
    pub relationships: Vec<RelationshipEdge>,
    pub pathology_analysis: Vec<String>,
    pub completeness_check: Vec<String>,
    pub consistency_check: Vec<String>,
    pub learned_pattern_recall: usize,
    pub improvement_suggestions: Vec<String>,
    pub validation_feedback: Vec<String>,
}

fn build_causal_timeline(record: &ExtractedRecord) -> Vec<CausalTimelineEvent> {
    let mut events: Vec<CausalTimelineEvent> = Vec::new();

    if let Some(admission) = record.reference_dates.admission {
        events.push(CausalTimelineEvent { date: Some(admission), category: "admission".to_string(), label: "admission".to_string() });
    }
    for procedure in &record.procedures {
        events.push(CausalTimelineEvent { date: procedure.date, category: "procedures".to_string(), label: procedure.name.clone() });
    }
    for complication in &record.complications {
        events.push(CausalTimelineEvent { date: complication.date, category: "complications".to_string(), label: complication.name.clone() });
    }
    for medication in &record.medications {
        events.push(CausalTimelineEvent { date: medication.date, category: "medications".to_string(), label: medication.name.clone() });
    }
    if let Some(discharge) = record.reference_dates.discharge {
        events.push(CausalTimelineEvent { date: Some(discharge), category: "discharge".to_string(), label: "discharge".to_string() });
    }

    events.sort_by(|a, b| match (a.date, b.date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    events
}

/// Correlate each medication with the complication it most plausibly
/// addresses by name similarity (e.g. nimodipine <-> vasospasm), a coarse
/// stand-in for a true indication ontology.
fn compute_treatment_response(record: &ExtractedRecord, _timeline: &[CausalTimelineEvent]) -> Vec<TreatmentResponse> {
    record
        .medications
        .iter()
        .map(|medication| {
            let linked = record
                .complications
                .iter()
                .filter(|c| medication.date.is_none() || c.date.is_none() || medication.date >= c.date)
                .max_by(|a, b| {
                    let sa = calculate_combined_similarity(&medication.name, &a.name);
                    let sb = calculate_combined_similarity(&medication.name, &b.name);
                    sa.partial_cmp(&sb).unwrap_or(std::cmp::Ordering::Equal)
                });

            match linked {
                Some(complication) => TreatmentResponse {
                    medication: medication.name.clone(),
                    linked_complication: Some(complication.name.clone()),
                    note: format!("{} administered on or after onset of {}", medication.name, complication.name),
                },
                None => TreatmentResponse {
                    medication: medication.name.clone(),
                    linked_complication: None,
                    note: "no temporally-linked complication found".to_string(),
                },
            }
        })
        .collect()
}

fn compute_functional_evolution(record: &ExtractedRecord) -> Vec<FunctionalEvolution> {
    let mut evolution = Vec::new();
    let scores = &record.functional_scores;

    if let Some(kps) = scores.kps {
        let interpretation = if kps >= 80 {
            "independent functional status"
        } else if kps >= 50 {
            "requires assistance"
        } else {
            "disabled, requires active care"
        };
        evolution.push(FunctionalEvolution { scale: "KPS".to_string(), observed_value: kps.to_string(), interpretation: interpretation.to_string() });
    }
    if let Some(mrs) = scores.mrs {
        let interpretation = if mrs <= 2 { "favorable outcome" } else { "unfavorable outcome" };
        evolution.push(FunctionalEvolution { scale: "mRS".to_string(), observed_value: mrs.to_string(), interpretation: interpretation.to_string() });
    }
    if record.late_recovery.flagged {
        evolution.push(FunctionalEvolution {
            scale: "length_of_stay".to_string(),
            observed_value: record.late_recovery.los_days.map(|d| d.to_string()).unwrap_or_default(),
            interpretation: "late recovery trajectory flagged".to_string(),
        });
    }

    evolution
}

/// Link canonical entities that share a cluster origin (same date, high
/// name similarity across categories) as a coarse relationship graph.
fn compute_relationships(record: &ExtractedRecord) -> Vec<RelationshipEdge> {
    let mut edges = Vec::new();

    for procedure in &record.procedures {
        for complication in &record.complications {
            if procedure.date.is_some() && procedure.date == complication.date {
                edges.push(RelationshipEdge {
                    from_category: "procedures".to_string(),
                    from_name: procedure.name.clone(),
                    to_category: "complications".to_string(),
                    to_name: complication.name.clone(),
                    basis: "same-day occurrence".to_string(),
                });
            }
        }
    }

    for anticoagulant in &record.anticoagulation {
        for pathology in &record.pathology {
            if pathology.pathology_type.is_hemorrhagic() {
                edges.push(RelationshipEdge {
                    from_category: "anticoagulation".to_string(),
                    from_name: anticoagulant.drug_name.clone(),
                    to_category: "pathology".to_string(),
                    to_name: pathology.name.clone(),
                    basis: "anticoagulation documented alongside hemorrhagic pathology".to_string(),
                });
            }
        }
    }

    edges
}

fn pathology_analysis(record: &ExtractedRecord) -> Vec<String> {
    record
        .pathology
        .iter()
        .map(|finding| {
            let grade_summary = finding
                .grades
                .iter()
                .map(|g| format!("{}={}", g.scale, g.value))
                .collect::<Vec<_>>()
                .join(", ");
            if grade_summary.is_empty() {
                format!("{} detected with confidence {:.2}", finding.name, finding.confidence)
            } else {
                format!("{} detected ({}) with confidence {:.2}", finding.name, grade_summary, finding.confidence)
            }
        })
        .collect()
}

fn completeness_check(record: &ExtractedRecord) -> Vec<String> {
    ExtractedRecord::category_names()
        .iter()
        .filter(|category| !crate::validator::category_is_populated(record, category))
        .map(|category| format!("{category} has no extracted data"))
        .collect()
}

fn consistency_check(validation: &ValidationOutcome) -> Vec<String> {
    validation
        .warnings
        .iter()
        .map(|w| w.message.clone())
        .chain(validation.errors.iter().map(|e| e.message.clone()))
        .collect()
}

fn improvement_suggestions(record: &ExtractedRecord, validation: &ValidationOutcome) -> Vec<String> {
    let mut suggestions = Vec::new();

    if record.reference_dates.admission.is_none() {
        suggestions.push("no admission date found; dates anchored to it cannot resolve".to_string());
    }
    if !validation.flags.is_empty() {
        suggestions.push(format!("{} literal(s) did not trace to source text and may need pattern refinement", validation.flags.len()));
    }
    if record.procedures.is_empty() && record.complications.is_empty() {
        suggestions.push("no procedures or complications extracted; note may use unrecognized phrasing".to_string());
    }

    suggestions
}

fn validation_feedback(validation: &ValidationOutcome) -> Vec<String> {
    let mut feedback: Vec<String> = validation.flags.iter().map(|f| format!("{}.{}: {}", f.category, f.field, f.reason)).collect();
    feedback.extend(validation.invalid_fields.iter().map(|field| format!("{field} was pruned by a logical check")));
    feedback
}

fn count_recallable_patterns(record: &ExtractedRecord, pattern_store: &dyn PatternStore) -> usize {
    record
        .pathology
        .iter()
        .map(|p| p.pathology_type)
        .collect::<std::collections::HashSet<_>>()
        .into_iter()
        .filter_map(|pathology_type| pattern_store.filter_by_pathology(pathology_type).ok())
        .map(|patterns| patterns.len())
        .sum()
}

/// Build the causal timeline first, then run the three independent
/// analyses concurrently (§5): their completion order has no bearing on
/// `IntelligenceReport` since each is folded into a fixed struct field.
pub async fn gather_intelligence(
    record: &ExtractedRecord,
    validation: &ValidationOutcome,
    pattern_store: &dyn PatternStore,
) -> IntelligenceReport {
    let causal_timeline = build_causal_timeline(record);

    let (treatment_response, functional_evolution, relationships) = tokio::join!(
        async { compute_treatment_response(record, &causal_timeline) },
        async { compute_functional_evolution(record) },
        async { compute_relationships(record) },
    );

    IntelligenceReport {
        causal_timeline,
        treatment_response,
        functional_evolution,
        relationships,
        pathology_analysis: pathology_analysis(record),
        completeness_check: completeness_check(record),
        consistency_check: consistency_check(validation),
        learned_pattern_recall: count_recallable_patterns(record, pattern_store),
        improvement_suggestions: improvement_suggestions(record, validation),
        validation_feedback: validation_feedback(validation),
    }
}
