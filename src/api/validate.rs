// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 GameBridge Contributors

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};

use crate::{
    error::{ApiError, ErrorCode},
    keystore::parse_digest,
    models::{ValidateRequest, ValidateResponse},
    state::AppState,
    validation::ValidationError,
};

use super::session_id;

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidSessionId => {
                ApiError::bad_request(ErrorCode::InvalidSessionId)
            }
            ValidationError::InvalidIntent => ApiError::bad_request(ErrorCode::InvalidIntent),
            ValidationError::UuidMapping(_) => ApiError::internal(ErrorCode::UuidMappingFailed),
            ValidationError::InsufficientBalance(_) => {
                ApiError::bad_request(ErrorCode::InsufficientBalance)
            }
            ValidationError::Signature(_) => {
                ApiError::internal(ErrorCode::SignatureGenerationFailed)
            }
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/validate",
    request_body = ValidateRequest,
    params(
        ("X-Dapp-SessionID" = String, Header, description = "Session the intent spends from"),
        ("X-HMAC-Signature" = String, Header, description = "HMAC tag over the raw request body")
    ),
    tag = "Validation",
    responses(
        (status = 200, body = ValidateResponse),
        (status = 400, description = "Invalid session, intent, or balance"),
        (status = 401, description = "HMAC tag missing or invalid")
    )
)]
pub async fn validate_user_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let Json(request) =
        payload.map_err(|_| ApiError::bad_request(ErrorCode::InvalidRequest))?;

    let session_id =
        session_id(&headers).ok_or_else(|| ApiError::bad_request(ErrorCode::InvalidSessionId))?;

    let digest = parse_digest(&request.digest)
        .map_err(|_| ApiError::bad_request(ErrorCode::InvalidRequest))?;

    let data = state
        .validator
        .validate_user_action(&session_id, &request, &digest)
        .await?;

    Ok(Json(ValidateResponse {
        success: true,
        data,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::test_state;
    use crate::api::SESSION_HEADER;
    use crate::models::{Intent, PairAsset};
    use axum::http::StatusCode;
    use uuid::Uuid;

    const TEST_DIGEST: &str =
        "0xd91c81e564e4f69229a9224943fa9a79ff21b60fcef5096bfb79e1ce28591a85";

    fn session_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, "s1".parse().unwrap());
        headers
    }

    fn mint_request(amount: u64) -> ValidateRequest {
        ValidateRequest {
            uuid: Uuid::new_v4().to_string(),
            user_sig: "0xuser".into(),
            user_address: "0x100cbc7ac2abdb4e75d8e08c6842d1dd8c04df73".into(),
            digest: TEST_DIGEST.into(),
            intent: Intent {
                method: "mint".into(),
                from: vec![PairAsset::asset("asset_money", amount)],
                to: vec![PairAsset::asset("asset_gold", 1)],
            },
        }
    }

    #[tokio::test]
    async fn missing_session_header_is_rejected() {
        let state = test_state();
        let err = validate_user_action(
            State(state),
            HeaderMap::new(),
            Ok(Json(mint_request(1))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSessionId);
    }

    #[tokio::test]
    async fn malformed_digest_is_a_generic_rejection() {
        let state = test_state();
        let mut request = mint_request(1);
        request.digest = "0xnothex".into();
        let err = validate_user_action(State(state), session_headers(), Ok(Json(request)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn valid_mint_returns_both_signatures() {
        let state = test_state();
        let before = state.ledger.get_or_create("s1").await.unwrap();

        let Json(response) = validate_user_action(
            State(state.clone()),
            session_headers(),
            Ok(Json(mint_request(100))),
        )
        .await
        .unwrap();

        assert!(response.success);
        assert_eq!(response.data.user_sig, "0xuser");
        assert_eq!(response.data.validator_sig.len(), 132);
        assert!(response.data.validator_sig.starts_with("0x"));

        let after = state.ledger.get_or_create("s1").await.unwrap();
        assert_eq!(
            after.balances["asset_money"],
            before.balances["asset_money"] - 100
        );
    }

    #[tokio::test]
    async fn overdraft_maps_to_insufficient_balance() {
        let state = test_state();
        let err = validate_user_action(
            State(state),
            session_headers(),
            Ok(Json(mint_request(u64::MAX))),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, ErrorCode::InsufficientBalance);
    }

    #[tokio::test]
    async fn invalid_intent_maps_to_invalid_intent() {
        let state = test_state();
        let mut request = mint_request(1);
        request.intent.from.clear();
        let err = validate_user_action(State(state), session_headers(), Ok(Json(request)))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidIntent);
    }
}
