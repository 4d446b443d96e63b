//! Repositories: one unit struct per table with associated async fns that
//! take the pool explicitly.

pub mod comment_repo;
pub mod follow_repo;
pub mod group_repo;
pub mod post_repo;
pub mod session_repo;
pub mod user_repo;

pub use comment_repo::CommentRepo;
pub use follow_repo::FollowRepo;
pub use group_repo::GroupRepo;
pub use post_repo::PostRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
