//! Scoring commands: ping, predict and feedback

use crate::client::ApiClient;
use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use scoring_lib::{model::read_records, FeedbackRecord, PredictionRequest};
use std::fs::File;
use std::path::Path;
use tabled::Tabled;

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: i64,
}

/// Call the liveness endpoint
pub async fn ping(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let ack = client.ping().await?;

    match format {
        OutputFormat::Json => output::print_json(&ack)?,
        OutputFormat::Table => output::print_success(&format!("Service is up: {}", ack.hackathon)),
    }

    Ok(())
}

/// Score a single applicant
pub async fn predict(
    client: &ApiClient,
    request: PredictionRequest,
    format: OutputFormat,
) -> Result<()> {
    let response = client.predict(&request).await?;

    match format {
        OutputFormat::Json => output::print_json(&response)?,
        OutputFormat::Table => {
            let rows: Vec<FieldRow> = scoring_lib::FEATURE_NAMES
                .into_iter()
                .zip(request.features())
                .map(|(field, value)| FieldRow {
                    field,
                    value: value as i64,
                })
                .collect();
            output::print_table(&rows);
            println!(
                "{}: {}",
                scoring_lib::RISK_FIELD,
                output::color_risk(response.cost_matrix_risk)
            );
        }
    }

    Ok(())
}

/// Submit a labeled feedback batch read from `path`
pub async fn feedback(client: &ApiClient, path: &Path, format: OutputFormat) -> Result<()> {
    let records = read_feedback_file(path)?;
    if records.is_empty() {
        output::print_warning("Feedback file contains no records, nothing to submit");
        return Ok(());
    }

    if let OutputFormat::Table = format {
        output::print_info(&format!("Submitting {} feedback records", records.len()));
    }

    let detail = client.feedback(&records).await?;

    match format {
        OutputFormat::Json => output::print_json(&detail)?,
        OutputFormat::Table => output::print_success(&detail.detail),
    }

    Ok(())
}

/// Read feedback as CSV (seed dataset layout) or a JSON array, by extension
pub fn read_feedback_file(path: &Path) -> Result<Vec<FeedbackRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open feedback file {}", path.display()))?;

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        let records = read_records(file)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(records)
    } else {
        serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse {} as a JSON array", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoring_lib::RiskClass;
    use std::io::Write;

    #[test]
    fn test_read_json_feedback() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"Duration_in_month":24,"Credit_amount":5000,
                "Installment_rate_in_percentage_of_disposable_income":3,
                "Present_residence_since":2,"Age_in_years":30,
                "Number_of_existing_credits_at_this_bank":1,
                "Number_of_people_being_liable_to_provide_maintenance_for":1,
                "Cost_Matrix_Risk":"bad"}}]"#
        )
        .unwrap();

        let records = read_feedback_file(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].risk, RiskClass::Bad);
        assert_eq!(records[0].applicant.credit_amount, 5000);
    }

    #[test]
    fn test_read_json_rejects_missing_label() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"Duration_in_month":24,"Credit_amount":5000,
                "Installment_rate_in_percentage_of_disposable_income":3,
                "Present_residence_since":2,"Age_in_years":30,
                "Number_of_existing_credits_at_this_bank":1,
                "Number_of_people_being_liable_to_provide_maintenance_for":1}}]"#
        )
        .unwrap();

        assert!(read_feedback_file(file.path()).is_err());
    }

    #[test]
    fn test_read_csv_feedback() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        let seed = std::fs::read_to_string("../../data/credit_seed.csv").unwrap();
        let mut lines = seed.lines();
        writeln!(file, "{}", lines.next().unwrap()).unwrap();
        for line in lines.take(3) {
            writeln!(file, "{}", line).unwrap();
        }

        let records = read_feedback_file(file.path()).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_missing_file() {
        let err = read_feedback_file(Path::new("/nonexistent/feedback.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to open"));
    }
}
