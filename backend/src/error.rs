//! Error handling for the appliance remote bot
//!
//! Provides consistent error responses in English and Japanese

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{ApplianceType, PayloadError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Startup errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    // Inbound request errors
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid webhook signature")]
    InvalidSignature,

    // Appliance API errors
    #[error("Appliance API returned HTTP {status}")]
    RemoteApi { status: u16 },

    #[error("Appliance API request failed: {0}")]
    Transport(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("No appliance of type {0}")]
    ApplianceNotFound(ApplianceType),

    // Messaging platform errors
    #[error("Invalid buttons template: {0}")]
    InvalidTemplate(String),

    #[error("Reply delivery failed: {0}")]
    Delivery(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<PayloadError> for AppError {
    fn from(err: PayloadError) -> Self {
        AppError::MalformedPayload(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedPayload(err.to_string())
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_ja: String,
}

impl AppError {
    /// Machine readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            AppError::InvalidSignature => "INVALID_SIGNATURE",
            AppError::RemoteApi { .. } => "REMOTE_API_ERROR",
            AppError::Transport(_) => "REMOTE_API_UNREACHABLE",
            AppError::Decode(_) => "DECODE_ERROR",
            AppError::ApplianceNotFound(_) => "APPLIANCE_NOT_FOUND",
            AppError::InvalidTemplate(_) => "INVALID_TEMPLATE",
            AppError::Delivery(_) => "DELIVERY_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// HTTP status returned for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidSignature => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message_ja(&self) -> String {
        match self {
            AppError::Configuration(_) => "設定エラー".to_string(),
            AppError::MalformedPayload(_) => "リクエストの形式が不正です".to_string(),
            AppError::InvalidSignature => "署名が一致しません".to_string(),
            AppError::RemoteApi { status } => format!("家電APIエラー (HTTP {})", status),
            AppError::Transport(_) => "家電APIに接続できません".to_string(),
            AppError::Decode(_) => "家電APIの応答を解析できません".to_string(),
            AppError::ApplianceNotFound(t) => format!("{} の家電が見つかりません", t),
            AppError::InvalidTemplate(_) => "ボタンテンプレートが不正です".to_string(),
            AppError::Delivery(_) => "LINE接続エラー".to_string(),
            AppError::Internal(_) => "サーバー内部エラー".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_detail = ErrorDetail {
            code: self.code().to_string(),
            message_en: self.to_string(),
            message_ja: self.message_ja(),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
