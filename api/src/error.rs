use std::convert::Infallible;

use airdrop_merkle_tree::error::MerkleTreeError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    BoxError, Json,
};
use merkle_airdrop::error::AirdropError;
use serde_derive::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Merkle Tree Validation Error: {0}")]
    MerkleTreeError(#[from] MerkleTreeError),

    #[error(transparent)]
    AirdropError(#[from] AirdropError),

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Proof not found for user {0}")]
    ProofNotFound(String),

    #[error("Parse Address Error: {0}")]
    ParseAddressError(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Error {
    pub code: String,
    pub error: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::MerkleTreeError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "MERKLE_TREE"),
            ApiError::UserNotFound(_) => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            ApiError::ProofNotFound(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PROOF_NOT_FOUND"),
            ApiError::ParseAddressError(_) => (StatusCode::BAD_REQUEST, "INVALID_ADDRESS"),
            ApiError::AirdropError(e) => {
                let status = match e {
                    AirdropError::NotFound(_) => StatusCode::NOT_FOUND,
                    AirdropError::Unauthorized(_) => StatusCode::FORBIDDEN,
                    AirdropError::NotStarted { .. }
                    | AirdropError::AlreadyActive(_)
                    | AirdropError::NotActive(_)
                    | AirdropError::TimeExpired { .. } => StatusCode::CONFLICT,
                    AirdropError::InvalidProof
                    | AirdropError::ExceedsPending { .. }
                    | AirdropError::InvalidTimeWindow { .. }
                    | AirdropError::ZeroTotalReward
                    | AirdropError::ZeroClaimAmount
                    | AirdropError::ExceedsCampaignBudget { .. }
                    | AirdropError::InvalidTotalReward { .. } => StatusCode::BAD_REQUEST,
                    AirdropError::CustodianTransfer(_) => StatusCode::SERVICE_UNAVAILABLE,
                    AirdropError::ArithmeticError => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.code())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // internal failures are logged in full but not exposed
        let error_message = if status.is_server_error() {
            error!("{}: {:?}", code, self);
            match status {
                StatusCode::SERVICE_UNAVAILABLE => self.to_string(),
                _ => "Internal Server Error".to_string(),
            }
        } else {
            warn!("{}: {}", code, self);
            self.to_string()
        };

        (
            status,
            Json(Error {
                code: code.to_string(),
                error: error_message,
            }),
        )
            .into_response()
    }
}

pub async fn handle_error(error: BoxError) -> Result<impl IntoResponse, Infallible> {
    if error.is::<tower::timeout::error::Elapsed>() {
        return Ok((
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({
                "code" : "REQUEST_TIMEOUT",
                "error" : "Request Timeout",
            })),
        ));
    };
    if error.is::<tower::load_shed::error::Overloaded>() {
        return Ok((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "code" : "OVERLOADED",
                "error" : "Service Unavailable",
            })),
        ));
    }

    error!("unhandled middleware error: {error}");
    Ok((
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "code" : "INTERNAL",
            "error" : "Internal Server Error",
        })),
    ))
}
