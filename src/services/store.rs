use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DiagnosisError;
use crate::models::{
    Comment, CommentInput, CommentReply, DiagnosisRecord, Post, PostInput, ReplyInput, UserProfile,
};

/// The hosted document database, consumed as a black box. Screens and the
/// diagnosis pipeline only see this trait; tests swap in fakes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_post(&self, input: PostInput) -> Result<Post, DiagnosisError>;
    async fn get_posts(&self, limit: usize) -> Result<Vec<Post>, DiagnosisError>;
    async fn get_post(&self, post_id: &str) -> Result<Post, DiagnosisError>;
    /// Toggle the caller's like on a post; returns whether the post is liked
    /// after the call.
    async fn toggle_post_like(&self, post_id: &str, user_id: &str)
        -> Result<bool, DiagnosisError>;
    async fn is_post_liked(&self, post_id: &str, user_id: &str) -> Result<bool, DiagnosisError>;
    async fn get_user_posts_count(&self, user_id: &str) -> Result<u64, DiagnosisError>;

    async fn add_comment(&self, input: CommentInput) -> Result<Comment, DiagnosisError>;
    async fn get_comments(&self, post_id: &str) -> Result<Vec<Comment>, DiagnosisError>;
    async fn add_comment_reply(&self, input: ReplyInput) -> Result<CommentReply, DiagnosisError>;
    async fn get_comment_replies(
        &self,
        comment_id: &str,
    ) -> Result<Vec<CommentReply>, DiagnosisError>;

    async fn save_diagnosis(&self, record: &DiagnosisRecord) -> Result<(), DiagnosisError>;
    async fn get_user_diagnoses(
        &self,
        user_id: &str,
    ) -> Result<Vec<DiagnosisRecord>, DiagnosisError>;

    async fn update_user_profile(
        &self,
        user_id: &str,
        profile: &UserProfile,
    ) -> Result<(), DiagnosisError>;
    async fn get_user_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<UserProfile>, DiagnosisError>;
}

#[derive(Debug, Deserialize)]
struct LikedResponse {
    liked: bool,
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

/// JSON/REST adapter for the document store. Record ids and timestamps are
/// assigned client-side (uuid v4 / now) before the write, matching the
/// add-and-return-id flow of the hosted SDK it replaces.
pub struct RestDocumentStore {
    http: reqwest::Client,
    base_url: String,
}

impl RestDocumentStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DiagnosisError> {
        let url = self.url(path);
        debug!("GET {url}");
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| DiagnosisError::PersistenceFailed(format!("GET {path}: {err}")))?;
        Self::parse(path, response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DiagnosisError> {
        let url = self.url(path);
        debug!("POST {url}");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| DiagnosisError::PersistenceFailed(format!("POST {path}: {err}")))?;
        Self::parse(path, response).await
    }

    async fn parse<T: DeserializeOwned>(
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, DiagnosisError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DiagnosisError::PersistenceFailed(format!(
                "{path}: {status} {body}"
            )));
        }
        response.json().await.map_err(|err| {
            DiagnosisError::PersistenceFailed(format!("{path}: invalid response: {err}"))
        })
    }
}

#[async_trait]
impl DocumentStore for RestDocumentStore {
    async fn create_post(&self, input: PostInput) -> Result<Post, DiagnosisError> {
        let post = Post {
            id: Uuid::new_v4().to_string(),
            user_id: input.user_id,
            user_name: input.user_name,
            user_avatar: input.user_avatar,
            title: input.title,
            content: input.content,
            image_urls: input.image_urls,
            timestamp: Utc::now(),
            likes: 0,
            comments: 0,
        };
        let _: serde_json::Value = self.post_json("/posts", &post).await?;
        Ok(post)
    }

    async fn get_posts(&self, limit: usize) -> Result<Vec<Post>, DiagnosisError> {
        self.get_json(&format!("/posts?limit={limit}")).await
    }

    async fn get_post(&self, post_id: &str) -> Result<Post, DiagnosisError> {
        self.get_json(&format!("/posts/{post_id}")).await
    }

    async fn toggle_post_like(
        &self,
        post_id: &str,
        user_id: &str,
    ) -> Result<bool, DiagnosisError> {
        let response: LikedResponse = self
            .post_json(
                &format!("/posts/{post_id}/likes/{user_id}/toggle"),
                &serde_json::json!({}),
            )
            .await?;
        Ok(response.liked)
    }

    async fn is_post_liked(&self, post_id: &str, user_id: &str) -> Result<bool, DiagnosisError> {
        let response: LikedResponse = self
            .get_json(&format!("/posts/{post_id}/likes/{user_id}"))
            .await?;
        Ok(response.liked)
    }

    async fn get_user_posts_count(&self, user_id: &str) -> Result<u64, DiagnosisError> {
        let response: CountResponse = self
            .get_json(&format!("/users/{user_id}/posts/count"))
            .await?;
        Ok(response.count)
    }

    async fn add_comment(&self, input: CommentInput) -> Result<Comment, DiagnosisError> {
        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            post_id: input.post_id,
            user_id: input.user_id,
            user_name: input.user_name,
            user_avatar: input.user_avatar,
            content: input.content,
            timestamp: Utc::now(),
            likes: 0,
        };
        let _: serde_json::Value = self.post_json("/comments", &comment).await?;
        Ok(comment)
    }

    async fn get_comments(&self, post_id: &str) -> Result<Vec<Comment>, DiagnosisError> {
        self.get_json(&format!("/posts/{post_id}/comments")).await
    }

    async fn add_comment_reply(&self, input: ReplyInput) -> Result<CommentReply, DiagnosisError> {
        let reply = CommentReply {
            id: Uuid::new_v4().to_string(),
            comment_id: input.comment_id,
            user_id: input.user_id,
            user_name: input.user_name,
            content: input.content,
            timestamp: Utc::now(),
        };
        let _: serde_json::Value = self.post_json("/replies", &reply).await?;
        Ok(reply)
    }

    async fn get_comment_replies(
        &self,
        comment_id: &str,
    ) -> Result<Vec<CommentReply>, DiagnosisError> {
        self.get_json(&format!("/comments/{comment_id}/replies"))
            .await
    }

    async fn save_diagnosis(&self, record: &DiagnosisRecord) -> Result<(), DiagnosisError> {
        let _: serde_json::Value = self.post_json("/diagnoses", record).await?;
        Ok(())
    }

    async fn get_user_diagnoses(
        &self,
        user_id: &str,
    ) -> Result<Vec<DiagnosisRecord>, DiagnosisError> {
        self.get_json(&format!("/users/{user_id}/diagnoses")).await
    }

    async fn update_user_profile(
        &self,
        user_id: &str,
        profile: &UserProfile,
    ) -> Result<(), DiagnosisError> {
        let _: serde_json::Value = self
            .post_json(&format!("/profiles/{user_id}"), profile)
            .await?;
        Ok(())
    }

    async fn get_user_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<UserProfile>, DiagnosisError> {
        let path = format!("/profiles/{user_id}");
        let url = self.url(&path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| DiagnosisError::PersistenceFailed(format!("GET {path}: {err}")))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::parse(&path, response).await.map(Some)
    }
}
