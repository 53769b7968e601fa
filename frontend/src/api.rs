use gloo_net::http::{Request, RequestBuilder};
use snapmap_shared::protocol::{
    ApiRequest, BodyEncoding, CurrentUserRequest, DeleteSubmissionRequest, EditSubmissionRequest,
    HttpMethod, MySubmissionsRequest, VoteRequest,
};
use snapmap_shared::{
    HEADER_AUTHORIZATION, LoginRequest, NearbyQuery, NewSubmission, RegisterRequest,
    SubmissionRead, SubmissionUpdate, TokenResponse, UserRead, UserUpdate, Vote,
};
use web_sys::{Blob, FormData, UrlSearchParams};

use crate::error::{ClientError, ClientResult, error_from_response};

/// multipart 请求中的文件部分
#[derive(Debug, Clone)]
pub struct Attachment {
    pub field: &'static str,
    pub blob: Blob,
    pub filename: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SnapApi {
    pub base_url: String,
}

impl SnapApi {
    pub fn new(base_url: String) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self { base_url }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn builder(&self, method: HttpMethod, url: &str) -> RequestBuilder {
        match method {
            HttpMethod::Get => Request::get(url),
            HttpMethod::Post => Request::post(url),
            HttpMethod::Put => Request::put(url),
            HttpMethod::Delete => Request::delete(url),
        }
    }

    /// 发送一个端点请求
    ///
    /// `token` 存在时附带 `Authorization: Bearer`；非 2xx 响应体交给 `error_from_response`。
    pub async fn send<R: ApiRequest>(
        &self,
        req: &R,
        token: Option<&str>,
        attachment: Option<&Attachment>,
    ) -> ClientResult<R::Response> {
        let url = self.url(&req.path());
        let mut builder = self.builder(R::METHOD, &url);

        let query = req.query();
        if !query.is_empty() {
            builder = builder.query(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        if let Some(token) = token {
            builder = builder.header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
        } else if R::REQUIRES_AUTH {
            return Err(ClientError::Unauthenticated("no session token".to_string()));
        }

        let request = match R::ENCODING {
            BodyEncoding::Empty => match R::METHOD {
                HttpMethod::Get | HttpMethod::Delete => builder.build()?,
                // 后端要求 POST/PUT 带一个 JSON 对象
                HttpMethod::Post | HttpMethod::Put => builder
                    .header("Content-Type", "application/json")
                    .body("{}")?,
            },
            BodyEncoding::Json => builder.json(req)?,
            BodyEncoding::Form => {
                let params = UrlSearchParams::new()?;
                for (key, value) in req.form_fields() {
                    params.append(key, &value);
                }
                builder
                    .header("Content-Type", "application/x-www-form-urlencoded")
                    .body(String::from(params.to_string()))?
            }
            BodyEncoding::Multipart => {
                let form = FormData::new()?;
                for (key, value) in req.form_fields() {
                    form.append_with_str(key, &value)?;
                }
                if let Some(file) = attachment {
                    form.append_with_blob_and_filename(file.field, &file.blob, &file.filename)?;
                }
                // Content-Type 与 boundary 由浏览器生成
                builder.body(form)?
            }
        };

        let res = request.send().await?;
        if !res.ok() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(error_from_response(status, &body));
        }

        res.json::<R::Response>().await.map_err(ClientError::from)
    }

    // =========================================================
    // 端点
    // =========================================================

    /// 登录（表单编码，`username` 承载邮箱）
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<TokenResponse> {
        let req = LoginRequest {
            username: email.to_string(),
            password: password.to_string(),
        };
        self.send(&req, None, None).await
    }

    pub async fn register(&self, email: &str, password: &str) -> ClientResult<UserRead> {
        let req = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send(&req, None, None).await
    }

    pub async fn current_user(&self, token: &str) -> ClientResult<UserRead> {
        self.send(&CurrentUserRequest, Some(token), None).await
    }

    pub async fn update_user(&self, token: &str, update: &UserUpdate) -> ClientResult<UserRead> {
        self.send(update, Some(token), None).await
    }

    pub async fn my_submissions(&self, token: &str) -> ClientResult<Vec<SubmissionRead>> {
        self.send(&MySubmissionsRequest, Some(token), None).await
    }

    /// 附近的提交，不需要登录
    pub async fn nearby(&self, query: &NearbyQuery) -> ClientResult<Vec<SubmissionRead>> {
        self.send(query, None, None).await
    }

    pub async fn create_submission(
        &self,
        token: &str,
        submission: &NewSubmission,
        image: &Attachment,
    ) -> ClientResult<SubmissionRead> {
        self.send(submission, Some(token), Some(image)).await
    }

    pub async fn edit_submission(
        &self,
        token: &str,
        id: i64,
        description: Option<String>,
    ) -> ClientResult<SubmissionRead> {
        let req = EditSubmissionRequest {
            id,
            update: SubmissionUpdate { description },
        };
        self.send(&req, Some(token), None).await
    }

    pub async fn delete_submission(&self, token: &str, id: i64) -> ClientResult<SubmissionRead> {
        self.send(&DeleteSubmissionRequest { id }, Some(token), None)
            .await
    }

    /// 投票；有会话时附带凭据
    pub async fn vote(
        &self,
        token: Option<&str>,
        id: i64,
        vote: Vote,
    ) -> ClientResult<SubmissionRead> {
        self.send(&VoteRequest { id, vote }, token, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_base_and_path() {
        let api = SnapApi::new("http://127.0.0.1:8000/api/v1/".to_string());
        assert_eq!(api.base_url, "http://127.0.0.1:8000/api/v1");
        assert_eq!(api.url("/users/me"), "http://127.0.0.1:8000/api/v1/users/me");
        assert_eq!(
            api.url("submissions/3"),
            "http://127.0.0.1:8000/api/v1/submissions/3"
        );
    }
}
