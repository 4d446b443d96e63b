//! Handlers for single posts: detail, create, edit, delete and comments.

use axum::extract::{OriginalUri, Path, State};
use axum::response::Redirect;
use axum::Json;
use serde::Serialize;
use yatube_core::error::CoreError;
use yatube_core::forms::{
    CleanPost, CommentSubmission, FieldSpec, FormErrors, COMMENT_FIELDS, INVALID_CHOICE_MESSAGE,
    POST_FIELDS,
};
use yatube_core::permissions::ensure_author;
use yatube_core::types::DbId;
use yatube_db::models::comment::{CommentView, CreateComment};
use yatube_db::models::group::Group;
use yatube_db::models::post::{CreatePost, Post, PostView, UpdatePost};
use yatube_db::repositories::{CommentRepo, GroupRepo, PostRepo};

use crate::cache::INDEX_CACHE_PREFIX;
use crate::error::{AppError, AppResult};
use crate::extract::{FormBody, PostForm};
use crate::handlers::profile_url;
use crate::media::{remove_post_image, store_post_image};
use crate::middleware::auth::{AuthUser, LoginRequired};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Field descriptions for an empty or pre-filled form.
#[derive(Debug, Serialize)]
pub struct FormSchema {
    pub fields: &'static [FieldSpec],
}

#[derive(Debug, Serialize)]
pub struct PostDetailPage {
    pub post: PostView,
    /// Total posts by the same author.
    pub post_count: i64,
    pub comments: Vec<CommentView>,
    pub form: FormSchema,
}

/// Current values shown when editing a post.
#[derive(Debug, Serialize)]
pub struct PostInitial {
    pub text: String,
    pub group: Option<DbId>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostFormPage {
    pub is_edit: bool,
    pub form: FormSchema,
    /// Choices for the `group` field.
    pub groups: Vec<Group>,
    pub initial: Option<PostInitial>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /posts/{post_id}/
pub async fn post_detail(
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<Json<DataResponse<PostDetailPage>>> {
    let post = PostRepo::find_view_by_id(&state.pool, post_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Post",
            id: post_id,
        }))?;
    let post_count = PostRepo::count_by_author(&state.pool, post.author_id).await?;
    let comments = CommentRepo::list_for_post(&state.pool, post_id).await?;

    Ok(Json(DataResponse {
        data: PostDetailPage {
            post,
            post_count,
            comments,
            form: FormSchema {
                fields: COMMENT_FIELDS,
            },
        },
    }))
}

/// GET /create/
pub async fn create_form(
    State(state): State<AppState>,
    LoginRequired(_user): LoginRequired,
) -> AppResult<Json<DataResponse<PostFormPage>>> {
    let groups = GroupRepo::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: PostFormPage {
            is_edit: false,
            form: FormSchema {
                fields: POST_FIELDS,
            },
            groups,
            initial: None,
        },
    }))
}

/// POST /create/
///
/// Publish a post as the current user, then redirect to their profile.
pub async fn post_create(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
    PostForm(submission): PostForm,
) -> AppResult<Redirect> {
    let clean = validate_post(&state, submission.clean()).await?;

    let image = match &clean.image {
        Some(image) => Some(store_post_image(&state.config.media_root, image).await?),
        None => None,
    };

    let created = PostRepo::create(
        &state.pool,
        &CreatePost {
            author_id: user.user_id,
            text: clean.text,
            group_id: clean.group_id,
            image: image.clone(),
        },
    )
    .await;
    let post = discard_image_on_error(&state, image.as_deref(), created).await?;
    state.page_cache.invalidate_prefix(INDEX_CACHE_PREFIX).await;

    tracing::info!(post_id = post.id, author_id = user.user_id, "Post created");
    Ok(Redirect::to(&profile_url(&user.username)))
}

/// GET /posts/{post_id}/edit/
pub async fn edit_form(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
    Path(post_id): Path<DbId>,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Json<DataResponse<PostFormPage>>> {
    let post = find_post(&state, post_id).await?;
    ensure_owner(&user, &post, uri.path())?;

    let groups = GroupRepo::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: PostFormPage {
            is_edit: true,
            form: FormSchema {
                fields: POST_FIELDS,
            },
            groups,
            initial: Some(PostInitial {
                text: post.text,
                group: post.group_id,
                image: post.image,
            }),
        },
    }))
}

/// POST /posts/{post_id}/edit/
///
/// Only the author may edit. Author and publication date never change; the
/// image is replaced only when a new one is uploaded.
pub async fn post_edit(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
    Path(post_id): Path<DbId>,
    OriginalUri(uri): OriginalUri,
    PostForm(submission): PostForm,
) -> AppResult<Redirect> {
    let post = find_post(&state, post_id).await?;
    ensure_owner(&user, &post, uri.path())?;

    let clean = validate_post(&state, submission.clean()).await?;

    let image = match &clean.image {
        Some(image) => Some(store_post_image(&state.config.media_root, image).await?),
        None => None,
    };
    let replaced_image = image.as_ref().and(post.image.as_deref());

    let updated = PostRepo::update(
        &state.pool,
        post_id,
        &UpdatePost {
            text: clean.text,
            group_id: clean.group_id,
            image: image.clone(),
        },
    )
    .await;
    discard_image_on_error(&state, image.as_deref(), updated).await?;
    if let Some(old) = replaced_image {
        remove_post_image(&state.config.media_root, old).await;
    }
    state.page_cache.invalidate_prefix(INDEX_CACHE_PREFIX).await;

    tracing::info!(post_id, author_id = user.user_id, "Post updated");
    Ok(Redirect::to(&format!("/posts/{post_id}/")))
}

/// POST /posts/{post_id}/delete/
pub async fn post_delete(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
    Path(post_id): Path<DbId>,
    OriginalUri(uri): OriginalUri,
) -> AppResult<Redirect> {
    let post = find_post(&state, post_id).await?;
    ensure_owner(&user, &post, uri.path())?;

    PostRepo::delete(&state.pool, post_id).await?;
    if let Some(image) = &post.image {
        remove_post_image(&state.config.media_root, image).await;
    }
    state.page_cache.invalidate_prefix(INDEX_CACHE_PREFIX).await;

    tracing::info!(post_id, author_id = user.user_id, "Post deleted");
    Ok(Redirect::to(&profile_url(&user.username)))
}

/// POST /posts/{post_id}/comment/
pub async fn add_comment(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
    Path(post_id): Path<DbId>,
    FormBody(submission): FormBody<CommentSubmission>,
) -> AppResult<Redirect> {
    find_post(&state, post_id).await?;
    let text = submission.clean().map_err(CoreError::from)?;

    let comment = CommentRepo::create(
        &state.pool,
        &CreateComment {
            post_id,
            author_id: user.user_id,
            text,
        },
    )
    .await?;

    tracing::info!(comment_id = comment.id, post_id, author_id = user.user_id, "Comment added");
    Ok(Redirect::to(&format!("/posts/{post_id}/")))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_post(state: &AppState, post_id: DbId) -> AppResult<Post> {
    PostRepo::find_by_id(&state.pool, post_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Post",
            id: post_id,
        }))
}

/// Only the author may change a post. The refusal names the path that was
/// asked for.
fn ensure_owner(user: &AuthUser, post: &Post, path: &str) -> AppResult<()> {
    ensure_author(user.user_id, post.author_id).map_err(|err| match err {
        CoreError::Forbidden(message) => AppError::Forbidden {
            message,
            path: path.to_string(),
        },
        other => other.into(),
    })
}

/// Remove an image stored for a row that was never written.
async fn discard_image_on_error<T>(
    state: &AppState,
    stored: Option<&str>,
    result: Result<T, sqlx::Error>,
) -> AppResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(err) => {
            if let Some(path) = stored {
                remove_post_image(&state.config.media_root, path).await;
            }
            Err(err.into())
        }
    }
}

/// Finish post form validation with the checks that need the database.
async fn validate_post(
    state: &AppState,
    cleaned: Result<CleanPost, FormErrors>,
) -> AppResult<CleanPost> {
    let clean = cleaned.map_err(CoreError::from)?;
    if let Some(group_id) = clean.group_id {
        if GroupRepo::find_by_id(&state.pool, group_id).await?.is_none() {
            let errors = FormErrors::single("group", INVALID_CHOICE_MESSAGE);
            return Err(CoreError::from(errors).into());
        }
    }
    Ok(clean)
}
