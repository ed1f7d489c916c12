//! Survey page handlers
//!
//! `GET /` only renders. Moving a slider updates the page locally and never
//! reaches the server. `POST /` is the single predict-and-save trigger.

use axum::{extract::State, response::Html, Form};
use minijinja::{context, Environment};
use serde::Serialize;

use crate::{AppResult, AppState};
use crate::models::{
    format_percent, FeatureVector, Label, PredictionOutcome, PredictionRecord, SurveyInput, FEATURE_SPECS,
};

/// The `.html` suffix turns on auto-escaping
const TEMPLATE_NAME: &str = "index.html";
const TEMPLATE: &str = include_str!("../../templates/index.html");

const HISTORY_COLUMNS: [&str; 9] = [
    "id",
    "timestamp",
    "sleep_quality",
    "headaches_per_week",
    "academic_performance",
    "study_load",
    "extracurricular_activities",
    "prediction_result",
    "prediction_probability",
];

/// What the result panel shows
pub enum PageResult {
    Idle,
    Predicted(PredictionOutcome),
    Failed(String),
}

#[derive(Serialize)]
struct SliderView {
    name: &'static str,
    label: &'static str,
    min: i64,
    max: i64,
    value: i64,
}

#[derive(Serialize)]
struct BreakdownColumn {
    heading: String,
    percent: String,
}

#[derive(Serialize)]
struct OutcomeView<'a> {
    label: &'static str,
    css: &'static str,
    confidence: &'a str,
    notice: &'a str,
    notice_css: &'static str,
    breakdown: Vec<BreakdownColumn>,
}

#[derive(Serialize)]
struct HistoryRow<'a> {
    id: i64,
    timestamp: &'a str,
    sleep_quality: i64,
    headaches_per_week: i64,
    academic_performance: i64,
    study_load: i64,
    extracurricular_activities: i64,
    prediction_result: &'a str,
    probability: String,
}

/// Render the form with defaults and the latest history
pub async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    let history = state.service.history(state.config.history_limit).await;
    Ok(Html(render(&FeatureVector::default(), &PageResult::Idle, &history)?))
}

/// Run one prediction from the submitted form and render it
pub async fn submit(State(state): State<AppState>, Form(input): Form<SurveyInput>) -> AppResult<Html<String>> {
    let features = FeatureVector::from(input);

    let result = match state.service.predict_and_record(features).await {
        Ok(outcome) => PageResult::Predicted(outcome),
        Err(e) => {
            tracing::warn!("Prediction failed: {}", e);
            PageResult::Failed(format!("An error occurred during prediction: {}", e))
        }
    };

    let history = state.service.history(state.config.history_limit).await;
    Ok(Html(render(&features, &result, &history)?))
}

pub fn render(
    features: &FeatureVector,
    result: &PageResult,
    history: &[PredictionRecord],
) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, TEMPLATE)?;
    let template = env.get_template(TEMPLATE_NAME)?;

    let sliders: Vec<SliderView> = FEATURE_SPECS
        .iter()
        .zip(features.as_array())
        .map(|(spec, value)| SliderView {
            name: spec.name,
            label: spec.label,
            min: spec.min,
            max: spec.max,
            value,
        })
        .collect();

    let (outcome, error) = match result {
        PageResult::Idle => (None, None),
        PageResult::Predicted(outcome) => (Some(outcome_view(outcome)), None),
        PageResult::Failed(message) => (None, Some(message.as_str())),
    };

    let history: Vec<HistoryRow> = history
        .iter()
        .map(|r| HistoryRow {
            id: r.id,
            timestamp: &r.timestamp,
            sleep_quality: r.sleep_quality,
            headaches_per_week: r.headaches_per_week,
            academic_performance: r.academic_performance,
            study_load: r.study_load,
            extracurricular_activities: r.extracurricular_activities,
            prediction_result: &r.prediction_result,
            probability: format!("{:.4}", r.prediction_probability),
        })
        .collect();

    template.render(context! {
        sliders,
        outcome,
        error,
        history_columns => HISTORY_COLUMNS,
        history,
    })
}

fn outcome_view(outcome: &PredictionOutcome) -> OutcomeView<'_> {
    // Map iteration follows class index, so Low (0) comes before High (1)
    let breakdown = outcome
        .class_probabilities
        .iter()
        .map(|(label, p)| BreakdownColumn {
            heading: format!("{} ({})", label.display_name(), label.class_index()),
            percent: format_percent(*p),
        })
        .collect();

    OutcomeView {
        label: outcome.label.as_str(),
        css: match outcome.label {
            Label::High => "error",
            Label::LowOrNormal => "success",
        },
        confidence: &outcome.confidence_display,
        notice: &outcome.notice,
        notice_css: if outcome.saved { "success" } else { "error" },
        breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn outcome(saved: bool) -> PredictionOutcome {
        let mut class_probabilities = BTreeMap::new();
        class_probabilities.insert(Label::High, 0.91);
        class_probabilities.insert(Label::LowOrNormal, 0.09);
        PredictionOutcome {
            label: Label::High,
            probability: 0.91,
            confidence_display: "91.00%".to_string(),
            class_probabilities,
            saved,
            notice: if saved { "saved" } else { "not saved" }.to_string(),
        }
    }

    #[test]
    fn test_idle_page_shows_defaults_and_hint() {
        let html = render(&FeatureVector::default(), &PageResult::Idle, &[]).unwrap();
        assert!(html.contains("name=\"sleep_quality\" min=\"1\" max=\"5\" value=\"3\""));
        assert!(html.contains("name=\"headaches_per_week\" min=\"1\" max=\"5\" value=\"2\""));
        assert!(html.contains("Adjust the sliders"));
        assert!(!html.contains("Prediction result"));
    }

    #[test]
    fn test_prediction_is_rendered_with_notice() {
        let html = render(&FeatureVector::default(), &PageResult::Predicted(outcome(false)), &[]).unwrap();
        assert!(html.contains("Predicted: STRES TINGGI"));
        assert!(html.contains("confidence: 91.00%"));
        assert!(html.contains("<p class=\"error\">not saved</p>"));
    }

    #[test]
    fn test_breakdown_columns_follow_class_index() {
        let html = render(&FeatureVector::default(), &PageResult::Predicted(outcome(true)), &[]).unwrap();

        let low = html.find("<th>Low stress (0)</th>").unwrap();
        let high = html.find("<th>High stress (1)</th>").unwrap();
        assert!(low < high);
        assert!(html.contains("<th>Probability</th><td>9.00%</td><td>91.00%</td>"));
    }

    #[test]
    fn test_history_rows_rendered_and_escaped() {
        let rows = vec![PredictionRecord {
            id: 7,
            timestamp: "2024-01-01 10:00:00".to_string(),
            sleep_quality: 5,
            headaches_per_week: 1,
            academic_performance: 5,
            study_load: 1,
            extracurricular_activities: 1,
            prediction_result: "<b>STRES TINGGI</b>".to_string(),
            prediction_probability: 0.91,
        }];
        let html = render(&FeatureVector::default(), &PageResult::Failed("bad <input>".to_string()), &rows).unwrap();
        assert!(html.contains("<td>7</td><td>2024-01-01 10:00:00</td><td>5</td>"));
        assert!(html.contains("<td>0.9100</td>"));
        assert!(html.contains("<p class=\"error\">bad &lt;input&gt;</p>"));
        assert!(html.contains("<td>&lt;b&gt;STRES TINGGI&lt;"));
        assert!(!html.contains("<b>STRES TINGGI"));
    }
}
