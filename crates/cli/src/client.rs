//! API client for communicating with the credit scorer service

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use scoring_lib::{
    Detail, FeedbackRecord, HealthAck, HealthResponse, ModelInfo, PredictionRequest,
    PredictionResponse, ReadinessResponse,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

/// Operator endpoints, fixed on the server side
mod paths {
    pub const MODEL_INFO: &str = "/model_info";
    pub const HEALTHZ: &str = "/healthz";
    pub const READYZ: &str = "/readyz";
}

/// Public endpoint paths; the service lets operators rename these
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routes {
    #[serde(default = "default_health_path")]
    pub health: String,
    #[serde(default = "default_predict_path")]
    pub predict: String,
    #[serde(default = "default_feedback_path")]
    pub feedback: String,
}

fn default_health_path() -> String {
    "/hackathon".to_string()
}

fn default_predict_path() -> String {
    "/predict_creditscore".to_string()
}

fn default_feedback_path() -> String {
    "/feedback_loop".to_string()
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            health: default_health_path(),
            predict: default_predict_path(),
            feedback: default_feedback_path(),
        }
    }
}

/// API client for the credit scorer
pub struct ApiClient {
    client: Client,
    base_url: Url,
    routes: Routes,
}

impl ApiClient {
    pub fn new(base_url: &str, routes: Routes) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let mut base_url = Url::parse(base_url).context("Invalid API URL")?;
        // Url::join replaces the last segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            routes,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .context("Invalid path")
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(self.url(path)?)
            .send()
            .await
            .context("Failed to send request")?;

        parse(response, false).await
    }

    /// GET a probe endpoint whose body is meaningful on 503 as well
    async fn get_probe<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .client
            .get(self.url(path)?)
            .send()
            .await
            .context("Failed to send request")?;

        parse(response, true).await
    }

    async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .client
            .post(self.url(path)?)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        parse(response, false).await
    }

    pub async fn ping(&self) -> Result<HealthAck> {
        self.get(&self.routes.health).await
    }

    pub async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse> {
        self.post(&self.routes.predict, request).await
    }

    pub async fn feedback(&self, records: &[FeedbackRecord]) -> Result<Detail> {
        self.post(&self.routes.feedback, records).await
    }

    pub async fn model_info(&self) -> Result<ModelInfo> {
        self.get(paths::MODEL_INFO).await
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.get_probe(paths::HEALTHZ).await
    }

    pub async fn readiness(&self) -> Result<ReadinessResponse> {
        self.get_probe(paths::READYZ).await
    }
}

async fn parse<T: DeserializeOwned>(response: Response, allow_unavailable: bool) -> Result<T> {
    let status = response.status();
    if !status.is_success() && !(allow_unavailable && status == StatusCode::SERVICE_UNAVAILABLE) {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Detail>(&body)
            .map(|d| d.detail)
            .unwrap_or(body);
        anyhow::bail!("API error ({}): {}", status, message);
    }

    response.json().await.context("Failed to parse response")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoring_lib::RiskClass;

    fn applicant() -> PredictionRequest {
        PredictionRequest {
            duration_in_month: 12,
            credit_amount: 1000,
            installment_rate: 4,
            present_residence_since: 2,
            age_in_years: 35,
            existing_credits: 1,
            dependents: 1,
        }
    }

    #[tokio::test]
    async fn test_predict_posts_wire_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/predict_creditscore")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "Duration_in_month": 12,
                "Credit_amount": 1000
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"Cost_Matrix_Risk":"bad"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), Routes::default()).unwrap();
        let response = client.predict(&applicant()).await.unwrap();

        assert_eq!(response.cost_matrix_risk, RiskClass::Bad);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_validation_error_surfaces_detail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/feedback_loop")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail":"feedback batch must contain at least one record"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), Routes::default()).unwrap();
        let err = client.feedback(&[]).await.unwrap_err().to_string();

        assert!(err.contains("422"));
        assert!(err.contains("at least one record"));
    }

    #[tokio::test]
    async fn test_readiness_body_read_on_503() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/readyz")
            .with_status(503)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ready":false,"reason":"Model not loaded yet"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), Routes::default()).unwrap();
        let readiness = client.readiness().await.unwrap();

        assert!(!readiness.ready);
        assert_eq!(readiness.reason.as_deref(), Some("Model not loaded yet"));
    }

    #[tokio::test]
    async fn test_ping() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/hackathon")
            .with_status(200)
            .with_body(r#"{"hackathon":"go through it"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), Routes::default()).unwrap();
        assert_eq!(client.ping().await.unwrap().hackathon, "go through it");
    }

    #[tokio::test]
    async fn test_renamed_health_route() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/healthcheck")
            .with_status(200)
            .with_body(r#"{"hackathon":"go through it"}"#)
            .create_async()
            .await;

        let routes = Routes {
            health: "/healthcheck".to_string(),
            ..Routes::default()
        };
        let client = ApiClient::new(&server.url(), routes).unwrap();

        assert_eq!(client.ping().await.unwrap().hackathon, "go through it");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_base_path_is_kept() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/scorer/model_info")
            .with_status(200)
            .with_body(
                r#"{"version":"v3","training_samples":90,"decision_threshold":0.25,
                    "features":[],"trained_at":0}"#,
            )
            .create_async()
            .await;

        let base = format!("{}/scorer", server.url());
        let client = ApiClient::new(&base, Routes::default()).unwrap();

        assert_eq!(client.model_info().await.unwrap().version, "v3");
        mock.assert_async().await;
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(ApiClient::new("not a url", Routes::default()).is_err());
    }
}
