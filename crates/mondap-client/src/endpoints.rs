//! API endpoint definitions and wire types.
//!
//! Paths and payload shapes match the mondap backend. Domain payloads stay
//! opaque JSON; only the credential-renewal exchange is typed here.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use mondap_core::{CallDescriptor, FilePart};

// ============================================================================
// Endpoint Paths
// ============================================================================

/// POST: exchange the refresh token for a new access token.
pub const AUTH_REFRESH: &str = "/user/v1/auth/refresh";

/// GET: paginated question list.
pub const QUESTION_LIST: &str = "/post/v1/auth/questions";

/// GET: single question with its content blocks.
pub const QUESTION_DETAIL: &str = "/post/v1/auth/questions/detail";

/// POST: create a question.
pub const QUESTION_CREATE: &str = "/post/v1/questions/create";

/// POST: update a question.
pub const QUESTION_UPDATE: &str = "/post/v1/questions/update";

/// POST: delete a question.
pub const QUESTION_DELETE: &str = "/post/v1/questions/delete";

/// GET: paginated answers for a question.
pub const ANSWER_LIST: &str = "/post/v1/auth/comments/detail";

/// POST: create an answer.
pub const ANSWER_CREATE: &str = "/post/v1/questions/answer/create";

/// POST: update an answer.
pub const ANSWER_UPDATE: &str = "/post/v1/questions/answer/update";

/// POST: delete an answer.
pub const ANSWER_DELETE: &str = "/post/v1/questions/answer/delete";

/// POST: adopt an answer as the accepted one.
pub const ANSWER_ADOPT: &str = "/post/v1/questions/answer/adopt";

/// POST: like a question or answer.
pub const LIKE: &str = "/post/v1/like";

/// POST: upload an image for a content block; multipart, field `image`.
pub const IMAGE_UPLOAD: &str = "/post/v1/image";

/// GET: ranking detail for the current user.
pub const RANKING_DETAIL: &str = "/leaderboard/v1/detail";

/// GET: ranking table by likes received.
pub const RANKING_LIKES: &str = "/leaderboard/v1/auth/likes/all";

/// GET: ranking table by adopted answers.
pub const RANKING_ADOPTED: &str = "/leaderboard/v1/auth/selected/all";

// ============================================================================
// Call Descriptor Builders
// ============================================================================

pub fn list_questions(page: u32, offset: u32) -> CallDescriptor {
    CallDescriptor::get(QUESTION_LIST)
        .query("page", page)
        .query("offset", offset)
}

pub fn question_detail(question_id: u64) -> CallDescriptor {
    CallDescriptor::get(QUESTION_DETAIL).query("questionId", question_id)
}

pub fn create_question(title: &str, content: &Value) -> CallDescriptor {
    CallDescriptor::post(
        QUESTION_CREATE,
        json!({ "title": title, "content": content }),
    )
}

pub fn update_question(body: Value) -> CallDescriptor {
    CallDescriptor::post(QUESTION_UPDATE, body)
}

pub fn delete_question(body: Value) -> CallDescriptor {
    CallDescriptor::post(QUESTION_DELETE, body)
}

pub fn list_answers(question_id: u64, page: u32, offset: u32) -> CallDescriptor {
    CallDescriptor::get(ANSWER_LIST)
        .query("questionId", question_id)
        .query("page", page)
        .query("offset", offset)
}

pub fn create_answer(body: Value) -> CallDescriptor {
    CallDescriptor::post(ANSWER_CREATE, body)
}

pub fn update_answer(body: Value) -> CallDescriptor {
    CallDescriptor::post(ANSWER_UPDATE, body)
}

pub fn delete_answer(body: Value) -> CallDescriptor {
    CallDescriptor::post(ANSWER_DELETE, body)
}

pub fn adopt_answer(body: Value) -> CallDescriptor {
    CallDescriptor::post(ANSWER_ADOPT, body)
}

pub fn like(body: Value) -> CallDescriptor {
    CallDescriptor::post(LIKE, body)
}

pub fn upload_image(file_name: &str, content_type: &str, bytes: Vec<u8>) -> CallDescriptor {
    CallDescriptor::upload(
        IMAGE_UPLOAD,
        FilePart::new("image", file_name, content_type, bytes),
    )
}

pub fn ranking_detail() -> CallDescriptor {
    CallDescriptor::get(RANKING_DETAIL)
}

pub fn ranking_likes() -> CallDescriptor {
    CallDescriptor::get(RANKING_LIKES)
}

pub fn ranking_adopted() -> CallDescriptor {
    CallDescriptor::get(RANKING_ADOPTED)
}

// ============================================================================
// Renewal Wire Types
// ============================================================================

/// Request body for the renewal endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub token: &'a str,
}

/// Response from the renewal endpoint.
///
/// The new access token sits at `data.access.token`; servers that rotate
/// refresh tokens also return `data.refresh.token`.
#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
    pub data: RefreshData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RefreshData {
    pub access: TokenEnvelope,
    #[serde(default)]
    pub refresh: Option<TokenEnvelope>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenEnvelope {
    pub token: String,
}

/// Error body shape used by the API for non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: Option<String>,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mondap_core::Method;

    #[test]
    fn question_list_descriptor_is_paginated_get() {
        let call = list_questions(3, 30);
        assert_eq!(call.method(), Method::Get);
        assert_eq!(call.path(), QUESTION_LIST);
        assert_eq!(
            call.query_params(),
            &[
                ("page".to_string(), "3".to_string()),
                ("offset".to_string(), "30".to_string()),
            ]
        );
    }

    #[test]
    fn create_question_wraps_title_and_content() {
        let content = serde_json::json!([{"type": "paragraph", "text": "hi"}]);
        let call = create_question("How do I?", &content);
        let body = call.body().unwrap().as_json().unwrap();
        assert_eq!(body["title"], "How do I?");
        assert_eq!(body["content"][0]["type"], "paragraph");
    }

    #[test]
    fn upload_image_is_a_multipart_post() {
        let call = upload_image("photo.png", "image/png", vec![0x89, 0x50]);
        assert_eq!(call.method(), Method::Post);
        assert_eq!(call.path(), IMAGE_UPLOAD);
        match call.body().unwrap() {
            mondap_core::Body::Multipart(part) => {
                assert_eq!(part.field(), "image");
                assert_eq!(part.content_type(), "image/png");
            }
            other => panic!("unexpected body: {other:?}"),
        }
    }

    #[test]
    fn refresh_response_parses_without_rotated_token() {
        let body = serde_json::json!({
            "data": { "access": { "token": "new-access" } }
        });
        let parsed: RefreshResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.data.access.token, "new-access");
        assert!(parsed.data.refresh.is_none());
    }

    #[test]
    fn refresh_response_parses_rotated_token() {
        let body = serde_json::json!({
            "data": {
                "access": { "token": "new-access" },
                "refresh": { "token": "new-refresh" }
            }
        });
        let parsed: RefreshResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.data.refresh.unwrap().token, "new-refresh");
    }
}
