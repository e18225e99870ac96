use actix_web::http::header::LOCATION;
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Outcome body of actions that report success instead of redirecting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }

    /// A bare `{success}` body.
    pub fn status(success: bool) -> Self {
        Self {
            success,
            message: None,
        }
    }
}

/// `303 See Other` to `location`, with the destination echoed in the body for
/// clients that do not follow redirects.
pub fn redirect_to(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .json(json!({ "redirect": location }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn test_redirect_to() {
        let response = redirect_to("/todos");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/todos");
    }

    #[test]
    fn test_action_result_serialization() {
        assert_eq!(
            serde_json::to_value(ActionResult::status(false)).unwrap(),
            json!({ "success": false })
        );
        assert_eq!(
            serde_json::to_value(ActionResult::ok("done")).unwrap(),
            json!({ "success": true, "message": "done" })
        );
    }
}
