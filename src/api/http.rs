// src/api/http.rs

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;
use validator::Validate;

use crate::{
    api::ExamApi,
    config::Config,
    error::AppError,
    models::{
        exam::Exam,
        exam_session::{ExamSession, StartSessionRequest, SubmitResponseRequest},
        fraud::{FraudReport, SecurityEvent},
        question::AnswerValue,
    },
};

/// `ExamApi` over the backend's JSON endpoints.
#[derive(Debug, Clone)]
pub struct HttpExamApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpExamApi {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, AppError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("Invalid API url {}: {}", base_url, e)))?;

        Ok(Self {
            client: Client::new(),
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(&config.api_url, config.api_token.clone())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends the request and maps non-2xx statuses to `AppError::Api`,
    /// using the backend's `detail` field when present.
    async fn send(&self, request: RequestBuilder, fallback: &str) -> Result<Response, AppError> {
        let response = self.authorize(request).send().await.map_err(|e| {
            tracing::error!("{}: {:?}", fallback, e);
            AppError::Network(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let detail = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body.get("detail").and_then(|d| d.as_str()).map(str::to_string));

        Err(AppError::Api {
            status: status.as_u16(),
            message: detail.unwrap_or_else(|| fallback.to_string()),
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, AppError> {
        let response = self.send(request, fallback).await?;
        response.json::<T>().await.map_err(|e| {
            tracing::error!("Unexpected response body ({}): {:?}", fallback, e);
            AppError::Network(e.to_string())
        })
    }
}

#[async_trait]
impl ExamApi for HttpExamApi {
    async fn list_exams(&self) -> Result<Vec<Exam>, AppError> {
        let request = self.client.get(self.endpoint("exams"));
        self.send_json(request, "Failed to fetch available exams").await
    }

    async fn start_session(&self, exam_id: &str) -> Result<ExamSession, AppError> {
        let request = self
            .client
            .post(self.endpoint("exam-sessions"))
            .json(&StartSessionRequest { exam_id });
        self.send_json(request, "Failed to start exam session").await
    }

    async fn submit_response(
        &self,
        session_id: &str,
        question_id: &str,
        answer: &AnswerValue,
    ) -> Result<(), AppError> {
        let payload = SubmitResponseRequest {
            exam_session_id: session_id.to_string(),
            question_id: question_id.to_string(),
            answer: answer.clone(),
        };
        payload.validate()?;

        let request = self.client.post(self.endpoint("exam-responses")).json(&payload);
        self.send(request, "Failed to record response").await?;
        Ok(())
    }

    async fn end_session(&self, session_id: &str) -> Result<ExamSession, AppError> {
        let request = self
            .client
            .patch(self.endpoint(&format!("exam-sessions/{}/end", session_id)));
        self.send_json(request, "Failed to end exam session").await
    }

    async fn list_sessions(&self) -> Result<Vec<ExamSession>, AppError> {
        let request = self.client.get(self.endpoint("exam-sessions"));
        self.send_json(request, "Failed to fetch exam sessions").await
    }

    async fn auto_submit(&self, session_id: &str) -> Result<(), AppError> {
        let request = self
            .client
            .post(self.endpoint(&format!("exam-sessions/{}/auto-submit/", session_id)));
        self.send(request, "Failed to auto-submit exam").await?;
        Ok(())
    }

    async fn report_fraud(&self, report: &FraudReport) -> Result<(), AppError> {
        report.validate()?;
        let request = self.client.post(self.endpoint("fraud")).json(report);
        self.send(request, "Failed to record violation").await?;
        Ok(())
    }

    async fn report_security_event(&self, event: &SecurityEvent) -> Result<(), AppError> {
        let request = self
            .client
            .post(self.endpoint("api/v1/security/event"))
            .json(event);
        self.send(request, "Failed to send security event").await?;
        Ok(())
    }
}
