//! Output renderers and formatting helpers for CLI commands.

use std::path::Path;

use anyhow::anyhow;
use radview_api_models::{Report, Template};
use radview_core::{PredictionResult, ReportDetailView, ReportListView, Session};
use serde::Serialize;
use serde_json::{Value, json};

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

const AWAITING_INFORMATION_NOTICE: &str =
    "Doctor has asked for more information. Please update the history and side labels.";

pub(crate) fn render_session(
    session: &Session,
    credential_path: &Path,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "authenticated": session.is_authenticated(),
            "credentials": credential_path.display().to_string(),
        }))?,
        OutputFormat::Table => {
            let state = if session.is_authenticated() {
                "logged in"
            } else {
                "logged out"
            };
            println!("session: {state}");
            println!("credentials: {}", credential_path.display());
        }
    }
    Ok(())
}

pub(crate) fn render_report_page(view: &ReportListView, format: OutputFormat) -> CliResult<()> {
    let page = view.page();
    let pagination = view.pagination();
    match format {
        OutputFormat::Json => print_json(&json!({
            "reports": page,
            "page": pagination.current_page,
            "total_pages": pagination.total_pages,
            "has_previous": pagination.has_previous(),
            "has_next": pagination.has_next(),
            "statuses": view.facets(),
        }))?,
        OutputFormat::Table => {
            println!(
                "{:<4} {:<26} {:<24} {:<16} {:<12} {:<16} UPLOADED",
                "ROW", "KEY", "PATIENT", "STATUS", "BODY PART", "DOCTOR"
            );
            for (row, report) in page.iter().enumerate() {
                println!(
                    "{:<4} {:<26} {:<24} {:<16} {:<12} {:<16} {}",
                    row,
                    report.key,
                    report.patient_name,
                    report.status,
                    or_dash(report.body_part.as_deref()),
                    or_dash(report.doctor_name.as_deref()),
                    or_dash(report.upload_time.as_deref()),
                );
            }
            if page.is_empty() {
                println!("no reports match");
            }
            println!(
                "page {} of {}{}{}",
                pagination.current_page,
                pagination.total_pages,
                if pagination.has_previous() { " [prev]" } else { "" },
                if pagination.has_next() { " [next]" } else { "" },
            );
        }
    }
    Ok(())
}

pub(crate) fn render_report_detail(view: &ReportDetailView, format: OutputFormat) -> CliResult<()> {
    let report = view.draft().ok_or_else(|| CliError::failure(anyhow!("report is not available")))?;
    match format {
        OutputFormat::Json => print_json(&json!({
            "report": report,
            "template": view.effective_template(),
            "findings": view.effective_findings(),
            "impression": view.effective_impression(),
            "awaiting_information": view.awaiting_information(),
            "predictions": predictions_json(view.predictions()),
        }))?,
        OutputFormat::Table => {
            print_report_header(report);
            if view.awaiting_information() {
                println!();
                println!("{AWAITING_INFORMATION_NOTICE}");
            }
            println!();
            println!("history: {}", report.history);
            println!("images:");
            for (index, image) in report.images.iter().enumerate() {
                let prediction = view
                    .predictions()
                    .get(index)
                    .and_then(Option::as_ref)
                    .map_or_else(String::new, |result| format!("  -> {result}"));
                println!(
                    "  [{index}] {:<10} {}{prediction}",
                    image.side,
                    or_dash(image.image_url.as_deref()),
                );
            }
            println!();
            println!("template: {}", or_dash(view.effective_template()));
            println!("findings:");
            for finding in view.effective_findings() {
                println!("  - {finding}");
            }
            println!("impression: {}", view.effective_impression());
            if let Some(feedback) = &report.feedback {
                println!("doctor feedback: {feedback}");
            }
        }
    }
    Ok(())
}

pub(crate) fn render_predictions(view: &ReportDetailView, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&predictions_json(view.predictions()))?,
        OutputFormat::Table => {
            println!("{:<6} {:>8} LABEL", "IMAGE", "CONF");
            for (index, slot) in view.predictions().iter().enumerate() {
                match slot {
                    Some(result) => println!(
                        "{:<6} {:>7}% {}",
                        index, result.confidence_percent, result.label
                    ),
                    None => println!("{index:<6} {:>8} <no image>", "-"),
                }
            }
        }
    }
    Ok(())
}

pub(crate) fn render_template_list(templates: &[Template], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&templates)?,
        OutputFormat::Table => {
            println!("{:<26} {:<24} {:>8} IMPRESSION", "KEY", "HEADING", "FINDINGS");
            for template in templates {
                println!(
                    "{:<26} {:<24} {:>8} {}",
                    template.id,
                    template.heading,
                    template.findings.len(),
                    template.impression
                );
            }
        }
    }
    Ok(())
}

fn print_report_header(report: &Report) {
    println!("key: {}", report.key);
    if let Some(display_id) = &report.display_id {
        println!("id: {display_id}");
    }
    println!("patient: {}", report.patient_name);
    if let Some(age) = &report.age {
        println!("age: {age}");
    }
    if let Some(gender) = &report.gender {
        println!("gender: {gender}");
    }
    if let Some(location) = &report.location {
        println!("location: {location}");
    }
    if let Some(body_part) = &report.body_part {
        println!("body part: {body_part}");
    }
    println!("status: {}", report.status);
    if let Some(doctor) = &report.doctor_name {
        println!("doctor: {doctor}");
    }
    if let Some(uploaded) = &report.upload_time {
        println!("uploaded: {uploaded}");
    }
}

fn predictions_json(predictions: &[Option<PredictionResult>]) -> Value {
    Value::Array(
        predictions
            .iter()
            .map(|slot| {
                slot.as_ref().map_or(Value::Null, |result| {
                    json!({
                        "label": result.label,
                        "confidence_percent": result.confidence_percent,
                        "error": result.is_error(),
                    })
                })
            })
            .collect(),
    )
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_slots_serialize_with_nulls_for_missing_images() {
        let value = predictions_json(&[
            Some(PredictionResult {
                label: "chest".into(),
                confidence_percent: 84.2,
            }),
            None,
            Some(PredictionResult::failed()),
        ]);
        assert_eq!(
            value,
            json!([
                {"label": "chest", "confidence_percent": 84.2, "error": false},
                null,
                {"label": "Error in prediction", "confidence_percent": 0.0, "error": true},
            ])
        );
    }

    #[test]
    fn missing_fields_render_as_dash() {
        assert_eq!(or_dash(None), "-");
        assert_eq!(or_dash(Some("Chest")), "Chest");
    }

    #[test]
    fn empty_views_still_render() {
        let list = ReportListView::new();
        render_report_page(&list, OutputFormat::Table).expect("empty page renders");
        render_template_list(&[], OutputFormat::Json).expect("empty catalog renders");
        render_session(&Session::default(), Path::new("creds.json"), OutputFormat::Table)
            .expect("session renders");
    }

    #[test]
    fn unloaded_detail_is_a_failure() {
        let view = ReportDetailView::new("r-1".into());
        let err = render_report_detail(&view, OutputFormat::Table).expect_err("no draft");
        assert_eq!(err.exit_code(), 3);
    }
}
