//! Wire-shaped JSON fixtures mirroring what the report service returns.

use serde_json::{Value, json};

/// Build a fully populated report document.
///
/// The document carries every modelled field plus one unmodelled field
/// (`isChest`) so suites can check that unknown data survives a round trip.
#[must_use]
pub fn report_json(key: &str, patient_name: &str, status: &str) -> Value {
    json!({
        "_id": key,
        "id": format!("RPT-{key}"),
        "patientName": patient_name,
        "age": 52,
        "gender": "F",
        "location": "North Clinic",
        "bodyPart": "Chest",
        "status": status,
        "doctorName": "Dr. Ames",
        "uploadTime": "2024-03-01 10:15",
        "history": "Persistent cough",
        "xrayFiles": [
            { "imageUrl": format!("/images/{key}-1.jpg"), "side": "PA" },
            { "imageUrl": format!("/images/{key}-2.jpg"), "side": "Lateral" }
        ],
        "findings": ["Clear lung fields"],
        "impression": "No acute disease",
        "reportTemplate": "Chest PA",
        "doctor_feedback": "",
        "isChest": true
    })
}

/// Build a minimal report document for list-oriented tests.
#[must_use]
pub fn list_report_json(key: &str, patient_name: &str, status: &str) -> Value {
    json!({
        "_id": key,
        "patientName": patient_name,
        "status": status
    })
}

/// Build `count` list reports named `Patient 1..=count`, cycling through the
/// given statuses.
///
/// # Panics
///
/// Panics when `statuses` is empty.
#[must_use]
pub fn report_collection(count: usize, statuses: &[&str]) -> Value {
    assert!(!statuses.is_empty(), "at least one status is required");
    let reports: Vec<Value> = (1..=count)
        .map(|index| {
            list_report_json(
                &format!("r-{index}"),
                &format!("Patient {index}"),
                statuses[(index - 1) % statuses.len()],
            )
        })
        .collect();
    json!({ "reports": reports })
}

/// Build a template document.
#[must_use]
pub fn template_json(id: &str, heading: &str, findings: &[&str], impression: &str) -> Value {
    json!({
        "_id": id,
        "heading": heading,
        "findings": findings,
        "impression": impression
    })
}

/// Build the `GET /templates` body from template documents.
#[must_use]
pub fn template_catalog(templates: Vec<Value>) -> Value {
    json!({ "templates": templates })
}

/// Build a classifier response body.
#[must_use]
pub fn prediction_json(class_name: &str, confidence: f64) -> Value {
    json!({
        "class_name": class_name,
        "confidence_score": confidence
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_collection_cycles_statuses() {
        let value = report_collection(3, &["Pending", "Complete"]);
        let reports = value["reports"].as_array().expect("reports array");
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0]["status"], "Pending");
        assert_eq!(reports[1]["status"], "Complete");
        assert_eq!(reports[2]["status"], "Pending");
        assert_eq!(reports[2]["patientName"], "Patient 3");
    }
}
