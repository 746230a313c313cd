use tauri::State;

use crate::models::{Comment, CommentInput, CommentReply, Post, PostInput, ReplyInput};
use crate::AppState;

#[tauri::command]
pub async fn create_post(state: State<'_, AppState>, input: PostInput) -> Result<Post, String> {
    state
        .store
        .create_post(input)
        .await
        .map_err(|e| e.user_message())
}

#[tauri::command]
pub async fn get_posts(
    state: State<'_, AppState>,
    limit: Option<usize>,
) -> Result<Vec<Post>, String> {
    state
        .store
        .get_posts(limit.unwrap_or(20))
        .await
        .map_err(|e| e.user_message())
}

#[tauri::command]
pub async fn get_post(state: State<'_, AppState>, post_id: String) -> Result<Post, String> {
    state
        .store
        .get_post(&post_id)
        .await
        .map_err(|e| e.user_message())
}

/// Toggles the current user's like; returns the new liked state.
#[tauri::command]
pub async fn like_post(state: State<'_, AppState>, post_id: String) -> Result<bool, String> {
    let user = signed_in(&state)?;
    state
        .store
        .toggle_post_like(&post_id, &user)
        .await
        .map_err(|e| e.user_message())
}

#[tauri::command]
pub async fn is_post_liked(state: State<'_, AppState>, post_id: String) -> Result<bool, String> {
    let user = signed_in(&state)?;
    state
        .store
        .is_post_liked(&post_id, &user)
        .await
        .map_err(|e| e.user_message())
}

#[tauri::command]
pub async fn get_user_posts_count(
    state: State<'_, AppState>,
    user_id: String,
) -> Result<u64, String> {
    state
        .store
        .get_user_posts_count(&user_id)
        .await
        .map_err(|e| e.user_message())
}

#[tauri::command]
pub async fn add_comment(
    state: State<'_, AppState>,
    input: CommentInput,
) -> Result<Comment, String> {
    state
        .store
        .add_comment(input)
        .await
        .map_err(|e| e.user_message())
}

#[tauri::command]
pub async fn get_comments(
    state: State<'_, AppState>,
    post_id: String,
) -> Result<Vec<Comment>, String> {
    state
        .store
        .get_comments(&post_id)
        .await
        .map_err(|e| e.user_message())
}

#[tauri::command]
pub async fn add_comment_reply(
    state: State<'_, AppState>,
    input: ReplyInput,
) -> Result<CommentReply, String> {
    state
        .store
        .add_comment_reply(input)
        .await
        .map_err(|e| e.user_message())
}

#[tauri::command]
pub async fn get_comment_replies(
    state: State<'_, AppState>,
    comment_id: String,
) -> Result<Vec<CommentReply>, String> {
    state
        .store
        .get_comment_replies(&comment_id)
        .await
        .map_err(|e| e.user_message())
}

fn signed_in(state: &State<'_, AppState>) -> Result<String, String> {
    state
        .auth
        .current_user()
        .map(|user| user.id)
        .ok_or_else(|| "You must be signed in.".to_string())
}
