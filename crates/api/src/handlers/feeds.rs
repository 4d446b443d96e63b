//! Paginated post listings: the index, group pages, profiles and the
//! followed-authors feed.

use axum::extract::{OriginalUri, Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use yatube_core::error::CoreError;
use yatube_core::pagination::{Page, PageInfo};
use yatube_db::models::group::Group;
use yatube_db::models::post::{PostFeed, PostView};
use yatube_db::models::user::AuthorInfo;
use yatube_db::repositories::{FollowRepo, GroupRepo, PostRepo, UserRepo};

use crate::cache::index_cache_key;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{LoginRequired, MaybeUser};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

/// `?page=` as sent; parsing is lenient so it stays a string here.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IndexPage {
    pub page_obj: Page<PostView>,
}

#[derive(Debug, Serialize)]
pub struct GroupPage {
    pub group: Group,
    pub page_obj: Page<PostView>,
}

#[derive(Debug, Serialize)]
pub struct ProfilePage {
    pub author: AuthorInfo,
    pub post_count: i64,
    /// Whether the viewer follows this author. Always false for anonymous
    /// viewers and on one's own profile.
    pub following: bool,
    pub page_obj: Page<PostView>,
}

#[derive(Debug, Serialize)]
pub struct FollowPage {
    pub page_obj: Page<PostView>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /
///
/// All posts, newest first. Served from the page cache when a live entry
/// exists for the exact URI.
pub async fn index(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<PageParams>,
) -> AppResult<Response> {
    let key = index_cache_key(uri.path_and_query().map_or("/", |pq| pq.as_str()));
    if let Some(cached) = state.page_cache.get(&key).await {
        tracing::debug!(%key, "Index page served from cache");
        return Ok(cached.into_response());
    }

    let page_obj = load_feed(&state, PostFeed::All, params.page.as_deref()).await?;
    let body = serde_json::to_vec(&DataResponse {
        data: IndexPage { page_obj },
    })
    .map_err(|e| AppError::InternalError(format!("Failed to encode index page: {e}")))?;

    let page = state.page_cache.insert(key, body).await;
    Ok(page.into_response())
}

/// GET /group/{slug}/
pub async fn group_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<DataResponse<GroupPage>>> {
    let group = GroupRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or(AppError::Core(CoreError::NotFoundBy {
            entity: "Group",
            key: slug,
        }))?;

    let page_obj = load_feed(&state, PostFeed::Group(group.id), params.page.as_deref()).await?;
    Ok(Json(DataResponse {
        data: GroupPage { group, page_obj },
    }))
}

/// GET /profile/{username}/
pub async fn profile(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(username): Path<String>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<DataResponse<ProfilePage>>> {
    let author = UserRepo::find_by_username(&state.pool, &username)
        .await?
        .ok_or(AppError::Core(CoreError::NotFoundBy {
            entity: "User",
            key: username,
        }))?;

    let following = match viewer.user_id() {
        Some(viewer_id) if viewer_id != author.id => {
            FollowRepo::exists(&state.pool, viewer_id, author.id).await?
        }
        _ => false,
    };

    let page_obj = load_feed(&state, PostFeed::Author(author.id), params.page.as_deref()).await?;
    Ok(Json(DataResponse {
        data: ProfilePage {
            author: AuthorInfo::from(&author),
            post_count: page_obj.info.count,
            following,
            page_obj,
        },
    }))
}

/// GET /follow/
///
/// Posts by every author the current user follows.
pub async fn follow_index(
    State(state): State<AppState>,
    LoginRequired(user): LoginRequired,
    Query(params): Query<PageParams>,
) -> AppResult<Json<DataResponse<FollowPage>>> {
    let page_obj = load_feed(
        &state,
        PostFeed::FollowedBy(user.user_id),
        params.page.as_deref(),
    )
    .await?;
    Ok(Json(DataResponse {
        data: FollowPage { page_obj },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Count the feed, resolve the requested page and fetch its rows.
async fn load_feed(
    state: &AppState,
    feed: PostFeed,
    requested: Option<&str>,
) -> AppResult<Page<PostView>> {
    let count = PostRepo::count_feed(&state.pool, feed).await?;
    let info = PageInfo::resolve(requested, count, state.config.posts_per_page);
    let posts = PostRepo::list_feed(&state.pool, feed, info.limit(), info.offset()).await?;
    Ok(Page::new(info, posts))
}
