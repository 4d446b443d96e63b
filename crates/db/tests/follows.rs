//! Integration tests for follow edges and the following feed.

use sqlx::PgPool;
use yatube_db::models::post::{CreatePost, PostFeed};
use yatube_db::models::user::{CreateUser, User};
use yatube_db::repositories::{FollowRepo, PostRepo, UserRepo};

async fn new_user(pool: &PgPool, username: &str) -> User {
    let input = CreateUser {
        username: username.to_string(),
        email: Some(format!("{username}@example.com")),
        first_name: String::new(),
        last_name: String::new(),
        password_hash: "not-a-real-hash".to_string(),
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn get_or_create_is_idempotent(pool: PgPool) {
    let reader = new_user(&pool, "reader").await;
    let author = new_user(&pool, "author").await;

    let (first, created) = FollowRepo::get_or_create(&pool, reader.id, author.id)
        .await
        .unwrap();
    assert!(created);
    let (second, created_again) = FollowRepo::get_or_create(&pool, reader.id, author.id)
        .await
        .unwrap();
    assert!(!created_again);
    assert_eq!(first.id, second.id);
    assert_eq!(FollowRepo::count_pair(&pool, reader.id, author.id).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_insert_violates_unique_constraint(pool: PgPool) {
    let reader = new_user(&pool, "reader").await;
    let author = new_user(&pool, "author").await;
    FollowRepo::create(&pool, reader.id, author.id).await.unwrap();

    let err = FollowRepo::create(&pool, reader.id, author.id)
        .await
        .expect_err("second identical edge must be rejected");
    match err {
        sqlx::Error::Database(db_err) => {
            assert_eq!(db_err.constraint(), Some("uq_follows_user_author"));
        }
        other => panic!("expected a database error, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn edges_are_directed(pool: PgPool) {
    let reader = new_user(&pool, "reader").await;
    let author = new_user(&pool, "author").await;
    FollowRepo::get_or_create(&pool, reader.id, author.id).await.unwrap();

    assert!(FollowRepo::exists(&pool, reader.id, author.id).await.unwrap());
    assert!(!FollowRepo::exists(&pool, author.id, reader.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delete_is_noop_without_edge(pool: PgPool) {
    let reader = new_user(&pool, "reader").await;
    let author = new_user(&pool, "author").await;

    assert!(!FollowRepo::delete(&pool, reader.id, author.id).await.unwrap());
    FollowRepo::get_or_create(&pool, reader.id, author.id).await.unwrap();
    assert!(FollowRepo::delete(&pool, reader.id, author.id).await.unwrap());
    assert!(!FollowRepo::exists(&pool, reader.id, author.id).await.unwrap());
}

/// The data layer does not reject self-follow; only the handlers do.
#[sqlx::test(migrations = "../../db/migrations")]
async fn data_layer_allows_self_follow(pool: PgPool) {
    let narcissus = new_user(&pool, "narcissus").await;
    let (follow, created) = FollowRepo::get_or_create(&pool, narcissus.id, narcissus.id)
        .await
        .unwrap();
    assert!(created);
    assert_eq!(follow.user_id, follow.author_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn following_feed_contains_only_followed_authors(pool: PgPool) {
    let reader = new_user(&pool, "reader").await;
    let followed = new_user(&pool, "followed").await;
    let stranger = new_user(&pool, "stranger").await;

    for (author, text) in [(&followed, "followed post"), (&stranger, "stranger post")] {
        PostRepo::create(
            &pool,
            &CreatePost {
                author_id: author.id,
                text: text.to_string(),
                group_id: None,
                image: None,
            },
        )
        .await
        .unwrap();
    }
    FollowRepo::get_or_create(&pool, reader.id, followed.id).await.unwrap();

    let feed = PostRepo::list_feed(&pool, PostFeed::FollowedBy(reader.id), 10, 0)
        .await
        .unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].author_id, followed.id);

    let empty = PostRepo::count_feed(&pool, PostFeed::FollowedBy(stranger.id))
        .await
        .unwrap();
    assert_eq!(empty, 0);
    assert_eq!(FollowRepo::list_author_ids(&pool, reader.id).await.unwrap(), vec![followed.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deleting_user_removes_their_edges(pool: PgPool) {
    let reader = new_user(&pool, "reader").await;
    let author = new_user(&pool, "author").await;
    FollowRepo::get_or_create(&pool, reader.id, author.id).await.unwrap();

    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(author.id)
        .execute(&pool)
        .await
        .unwrap();
    assert_eq!(FollowRepo::count_pair(&pool, reader.id, author.id).await.unwrap(), 0);
}
