use crate::{
    LoginRequest, NearbyQuery, NewSubmission, RegisterRequest, SubmissionRead, SubmissionUpdate,
    TokenResponse, UserRead, UserUpdate, Vote,
};
use serde::{Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

/// How the request body travels on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyEncoding {
    /// No body at all.
    Empty,
    /// `application/json` of the request value itself.
    Json,
    /// `application/x-www-form-urlencoded` built from `form_fields()`.
    Form,
    /// `multipart/form-data` built from `form_fields()` plus a file attachment.
    Multipart,
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// Body encoding.
    const ENCODING: BodyEncoding;
    /// Whether the backend rejects the call without a bearer token.
    const REQUIRES_AUTH: bool;

    /// The URL path relative to the API base.
    fn path(&self) -> String;

    /// Query string pairs.
    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Field pairs for `Form` and `Multipart` encodings.
    fn form_fields(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

// =========================================================
// Request Definitions
// =========================================================

impl ApiRequest for LoginRequest {
    type Response = TokenResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const ENCODING: BodyEncoding = BodyEncoding::Form;
    const REQUIRES_AUTH: bool = false;

    fn path(&self) -> String {
        "/auth/login".to_string()
    }

    fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("username", self.username.clone()),
            ("password", self.password.clone()),
        ]
    }
}

impl ApiRequest for RegisterRequest {
    type Response = UserRead;
    const METHOD: HttpMethod = HttpMethod::Post;
    const ENCODING: BodyEncoding = BodyEncoding::Json;
    const REQUIRES_AUTH: bool = false;

    fn path(&self) -> String {
        "/auth/register".to_string()
    }
}

/// Fetch the logged-in user
#[derive(Debug, Serialize)]
pub struct CurrentUserRequest;

impl ApiRequest for CurrentUserRequest {
    type Response = UserRead;
    const METHOD: HttpMethod = HttpMethod::Get;
    const ENCODING: BodyEncoding = BodyEncoding::Empty;
    const REQUIRES_AUTH: bool = true;

    fn path(&self) -> String {
        "/users/me".to_string()
    }
}

impl ApiRequest for UserUpdate {
    type Response = UserRead;
    const METHOD: HttpMethod = HttpMethod::Put;
    const ENCODING: BodyEncoding = BodyEncoding::Json;
    const REQUIRES_AUTH: bool = true;

    fn path(&self) -> String {
        "/users/me".to_string()
    }
}

/// List the logged-in user's own submissions
#[derive(Debug, Serialize)]
pub struct MySubmissionsRequest;

impl ApiRequest for MySubmissionsRequest {
    type Response = Vec<SubmissionRead>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const ENCODING: BodyEncoding = BodyEncoding::Empty;
    const REQUIRES_AUTH: bool = true;

    fn path(&self) -> String {
        "/users/me/submissions".to_string()
    }
}

impl ApiRequest for NearbyQuery {
    type Response = Vec<SubmissionRead>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const ENCODING: BodyEncoding = BodyEncoding::Empty;
    const REQUIRES_AUTH: bool = false;

    fn path(&self) -> String {
        "/submissions/nearby".to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("radius_km", self.radius_km.to_string()),
        ]
    }
}

/// The image itself is attached by the client as the `image` part.
impl ApiRequest for NewSubmission {
    type Response = SubmissionRead;
    const METHOD: HttpMethod = HttpMethod::Post;
    const ENCODING: BodyEncoding = BodyEncoding::Multipart;
    const REQUIRES_AUTH: bool = true;

    fn path(&self) -> String {
        "/submissions/".to_string()
    }

    /// 没有描述时不发送该字段，后端存为 null
    fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::with_capacity(3);
        if let Some(description) = &self.description {
            fields.push(("description", description.clone()));
        }
        fields.push(("latitude", self.latitude.to_string()));
        fields.push(("longitude", self.longitude.to_string()));
        fields
    }
}

/// Edit a submission's description (only within the edit window)
#[derive(Debug, Serialize)]
pub struct EditSubmissionRequest {
    #[serde(skip)]
    pub id: i64,
    #[serde(flatten)]
    pub update: SubmissionUpdate,
}

impl ApiRequest for EditSubmissionRequest {
    type Response = SubmissionRead;
    const METHOD: HttpMethod = HttpMethod::Put;
    const ENCODING: BodyEncoding = BodyEncoding::Json;
    const REQUIRES_AUTH: bool = true;

    fn path(&self) -> String {
        format!("/submissions/{}", self.id)
    }
}

/// Delete a submission, the backend echoes the deleted record
#[derive(Debug, Serialize)]
pub struct DeleteSubmissionRequest {
    pub id: i64,
}

impl ApiRequest for DeleteSubmissionRequest {
    type Response = SubmissionRead;
    const METHOD: HttpMethod = HttpMethod::Delete;
    const ENCODING: BodyEncoding = BodyEncoding::Empty;
    const REQUIRES_AUTH: bool = true;

    fn path(&self) -> String {
        format!("/submissions/{}", self.id)
    }
}

/// Thumbs up / down
#[derive(Debug, Serialize)]
pub struct VoteRequest {
    pub id: i64,
    pub vote: Vote,
}

impl ApiRequest for VoteRequest {
    type Response = SubmissionRead;
    const METHOD: HttpMethod = HttpMethod::Post;
    // The backend accepts an empty JSON object here.
    const ENCODING: BodyEncoding = BodyEncoding::Empty;
    const REQUIRES_AUTH: bool = false;

    fn path(&self) -> String {
        format!("/submissions/{}/{}", self.id, self.vote.path_segment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paths_embed_ids() {
        let vote = VoteRequest { id: 12, vote: Vote::Down };
        assert_eq!(vote.path(), "/submissions/12/thumbs_down");
        assert_eq!(DeleteSubmissionRequest { id: 4 }.path(), "/submissions/4");
    }

    #[test]
    fn edit_body_carries_only_the_update() {
        let req = EditSubmissionRequest {
            id: 9,
            update: SubmissionUpdate {
                description: Some("sunset".into()),
            },
        };
        assert_eq!(req.path(), "/submissions/9");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "description": "sunset" })
        );
    }

    #[test]
    fn login_is_form_encoded_with_username_field() {
        let req = LoginRequest {
            username: "a@b.c".into(),
            password: "pw".into(),
        };
        assert_eq!(LoginRequest::ENCODING, BodyEncoding::Form);
        assert_eq!(
            req.form_fields(),
            vec![("username", "a@b.c".to_string()), ("password", "pw".to_string())]
        );
    }

    #[test]
    fn submission_without_description_omits_the_field() {
        let bare = NewSubmission {
            description: None,
            latitude: 1.0,
            longitude: 2.0,
        };
        assert_eq!(
            bare.form_fields(),
            vec![("latitude", "1".to_string()), ("longitude", "2".to_string())]
        );

        let described = NewSubmission {
            description: Some("pier".into()),
            ..bare
        };
        assert_eq!(described.form_fields()[0], ("description", "pier".to_string()));
        assert_eq!(described.form_fields().len(), 3);
    }

    #[test]
    fn nearby_query_params() {
        let q = NearbyQuery {
            latitude: 1.5,
            longitude: -2.0,
            radius_km: 5.0,
        };
        assert_eq!(
            q.query(),
            vec![
                ("latitude", "1.5".to_string()),
                ("longitude", "-2".to_string()),
                ("radius_km", "5".to_string()),
            ]
        );
    }
}
