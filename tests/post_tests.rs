mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_readers_cannot_create_posts() {
    let app = TestApp::new();
    app.category("News").await;
    let reader = app.reader("listener").await;

    let (status, body) = app
        .post(
            "/posts",
            Some(&reader.token),
            json!({ "title": "Hello", "desc": "Body", "cat": "news" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "forbidden");
}

#[tokio::test]
async fn test_create_post_starts_pending_with_unique_slug() {
    let app = TestApp::new();
    app.category("News").await;
    let writer = app.writer("newsdesk").await;
    let payload = json!({ "title": "Morning Headlines!", "desc": "Body", "cat": "news" });

    let (status, first) = app.post("/posts", Some(&writer.token), payload.clone()).await;
    assert_eq!(status, StatusCode::CREATED, "{first}");
    assert_eq!(first["slug"], "morning-headlines");
    assert_eq!(first["status"], "draft");
    assert_eq!(first["approved"], false);
    assert_eq!(first["author_name"], "newsdesk");

    let (_, second) = app.post("/posts", Some(&writer.token), payload).await;
    assert_eq!(second["slug"], "morning-headlines-1");
}

#[tokio::test]
async fn test_create_post_requires_known_category() {
    let app = TestApp::new();
    let writer = app.writer("newsdesk").await;
    let (status, _) = app
        .post(
            "/posts",
            Some(&writer.token),
            json!({ "title": "Orphan", "desc": "Body", "cat": "nowhere" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // A title with nothing to slugify is rejected as well.
    app.category("News").await;
    let (status, body) = app
        .post(
            "/posts",
            Some(&writer.token),
            json!({ "title": "!!!", "desc": "Body", "cat": "news" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "invalid_input");
}

#[tokio::test]
async fn test_moderation_lifecycle() {
    let app = TestApp::new();
    app.category("Music").await;
    let writer = app.writer("selector").await;
    let admin = app.admin("editor").await;

    let (_, post) = app
        .post(
            "/posts",
            Some(&writer.token),
            json!({ "title": "Crate Digging", "desc": "Records", "cat": "music" }),
        )
        .await;
    let id = post["id"].as_str().unwrap().to_string();

    // Publishing before approval is an invalid transition.
    let (status, body) = app
        .put(
            &format!("/posts/{id}/status"),
            Some(&writer.token),
            json!({ "status": "published" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "invalid_transition");

    // Pending posts are hidden from the public listing.
    let (_, listing) = app.get("/posts", None).await;
    assert_eq!(listing["total"], 0);

    let (status, approved) = app
        .put(
            &format!("/admin/posts/{id}/moderation"),
            Some(&admin.token),
            json!({ "action": "approve" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["approved"], true);
    assert_eq!(approved["status"], "draft");

    let (status, published) = app
        .put(
            &format!("/posts/{id}/status"),
            Some(&writer.token),
            json!({ "status": "published" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(published["status"], "published");

    let (_, listing) = app.get("/posts", None).await;
    assert_eq!(listing["total"], 1);

    // Unapproving also unpublishes.
    let (_, pending) = app
        .put(
            &format!("/admin/posts/{id}/moderation"),
            Some(&admin.token),
            json!({ "action": "unapprove" }),
        )
        .await;
    assert_eq!(pending["approved"], false);
    assert_eq!(pending["status"], "draft");
}

#[tokio::test]
async fn test_authors_cannot_moderate_or_touch_others_posts() {
    let app = TestApp::new();
    app.category("Music").await;
    let writer = app.writer("selector").await;
    let other = app.writer("rival").await;

    let (_, post) = app
        .post(
            "/posts",
            Some(&writer.token),
            json!({ "title": "Mine", "desc": "Body", "cat": "music" }),
        )
        .await;
    let id = post["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .put(
            &format!("/admin/posts/{id}/moderation"),
            Some(&writer.token),
            json!({ "action": "approve" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .put(&format!("/posts/{id}"), Some(&other.token), json!({ "title": "Stolen" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("/posts/{id}"), Some(&other.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .put(
            &format!("/posts/{id}/status"),
            Some(&other.token),
            json!({ "status": "draft" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_keeps_slug_and_moderation_state() {
    let app = TestApp::new();
    app.category("Music").await;
    app.category("Talk").await;
    let writer = app.writer("selector").await;
    let admin = app.admin("editor").await;
    let post = app.published_post(&writer, &admin, "Original Title", "music").await;
    let id = post["id"].as_str().unwrap();

    let (status, updated) = app
        .put(
            &format!("/posts/{id}"),
            Some(&writer.token),
            json!({ "title": "  New Title  ", "cat": "talk" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "New Title");
    assert_eq!(updated["cat"], "talk");
    assert_eq!(updated["slug"], "original-title");
    assert_eq!(updated["status"], "published");
    assert_eq!(updated["approved"], true);

    let (status, _) = app
        .put(&format!("/posts/{id}"), Some(&writer.token), json!({ "cat": "ghost" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_get_post_by_slug_counts_visits() {
    let app = TestApp::new();
    app.category("Music").await;
    let writer = app.writer("selector").await;
    let admin = app.admin("editor").await;
    let post = app.published_post(&writer, &admin, "Vinyl Hour", "music").await;

    let (status, first) = app.get("/posts/vinyl-hour", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["visits"], 1);

    let (_, second) = app
        .get(&format!("/posts/{}", post["id"].as_str().unwrap()), None)
        .await;
    assert_eq!(second["visits"], 2);
}

#[tokio::test]
async fn test_hidden_post_visible_to_author_and_admin_only() {
    let app = TestApp::new();
    app.category("Music").await;
    let writer = app.writer("selector").await;
    let admin = app.admin("editor").await;
    let stranger = app.reader("stranger").await;

    let (_, post) = app
        .post(
            "/posts",
            Some(&writer.token),
            json!({ "title": "Draft Notes", "desc": "Body", "cat": "music" }),
        )
        .await;
    let uri = format!("/posts/{}", post["id"].as_str().unwrap());

    assert_eq!(app.get(&uri, None).await.0, StatusCode::NOT_FOUND);
    assert_eq!(app.get(&uri, Some(&stranger.token)).await.0, StatusCode::NOT_FOUND);

    let (status, body) = app.get(&uri, Some(&writer.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["visits"], 0);
    assert_eq!(app.get(&uri, Some(&admin.token)).await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_listing_filters_and_pagination() {
    let app = TestApp::new();
    app.category("Music").await;
    app.category("Talk").await;
    let writer = app.writer("selector").await;
    let admin = app.admin("editor").await;
    app.published_post(&writer, &admin, "Jazz Tonight", "music").await;
    app.published_post(&writer, &admin, "Soul Sunday", "music").await;
    app.published_post(&writer, &admin, "Morning Debate", "talk").await;

    let (_, all) = app.get("/posts?limit=2", None).await;
    assert_eq!(all["total"], 3);
    assert_eq!(all["total_pages"], 2);
    assert_eq!(all["items"].as_array().unwrap().len(), 2);

    let (_, music) = app.get("/posts?cat=music", None).await;
    assert_eq!(music["total"], 2);

    let (_, search) = app.get("/posts?search=JAZZ", None).await;
    assert_eq!(search["total"], 1);
    assert_eq!(search["items"][0]["title"], "Jazz Tonight");

    let (status, _) = app.get("/posts?page=0", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_search_matches_wildcards_literally() {
    let app = TestApp::new();
    app.category("Music").await;
    let writer = app.writer("selector").await;
    let admin = app.admin("editor").await;
    app.published_post(&writer, &admin, "Vinyl Hour", "music").await;
    app.published_post(&writer, &admin, "100% Vinyl", "music").await;

    let (_, underscore) = app.get("/posts?search=_", None).await;
    assert_eq!(underscore["total"], 0);

    let (_, percent) = app.get("/posts?search=100%25", None).await;
    assert_eq!(percent["total"], 1);
    assert_eq!(percent["items"][0]["title"], "100% Vinyl");
}

#[tokio::test]
async fn test_featured_and_popular_rankings() {
    let app = TestApp::new();
    app.category("Music").await;
    let writer = app.writer("selector").await;
    let admin = app.admin("editor").await;
    let fan = app.reader("fan").await;
    let quiet = app.published_post(&writer, &admin, "Quiet Post", "music").await;
    let loved = app.published_post(&writer, &admin, "Loved Post", "music").await;

    let (status, _) = app
        .post(
            &format!("/posts/{}/like", loved["id"].as_str().unwrap()),
            Some(&fan.token),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    for _ in 0..3 {
        app.get("/posts/quiet-post", None).await;
    }

    let (_, featured) = app.get("/posts/featured", None).await;
    assert_eq!(featured[0]["id"], loved["id"]);

    let (_, popular) = app.get("/posts/popular?limit=1", None).await;
    let popular = popular.as_array().unwrap();
    assert_eq!(popular.len(), 1);
    assert_eq!(popular[0]["id"], quiet["id"]);
}

#[tokio::test]
async fn test_my_posts_and_writer_posts() {
    let app = TestApp::new();
    app.category("Music").await;
    let writer = app.writer("selector").await;
    let admin = app.admin("editor").await;
    app.published_post(&writer, &admin, "Out Now", "music").await;
    app.post(
        "/posts",
        Some(&writer.token),
        json!({ "title": "Still Drafting", "desc": "Body", "cat": "music" }),
    )
    .await;

    let (_, mine) = app.get("/me/posts", Some(&writer.token)).await;
    assert_eq!(mine["total"], 2);

    let (_, public) = app
        .get(&format!("/writers/{}/posts", writer.user.id), None)
        .await;
    assert_eq!(public["total"], 1);

    let (_, queue) = app.get("/admin/posts?approved=false", Some(&admin.token)).await;
    assert_eq!(queue["total"], 1);
    assert_eq!(queue["items"][0]["title"], "Still Drafting");
}

#[tokio::test]
async fn test_delete_post_by_author_and_admin() {
    let app = TestApp::new();
    app.category("Music").await;
    let writer = app.writer("selector").await;
    let admin = app.admin("editor").await;
    let first = app.published_post(&writer, &admin, "First", "music").await;
    let second = app.published_post(&writer, &admin, "Second", "music").await;

    let (status, _) = app
        .delete(&format!("/posts/{}", first["id"].as_str().unwrap()), Some(&writer.token))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .delete(&format!("/posts/{}", second["id"].as_str().unwrap()), Some(&admin.token))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .delete(
            &format!("/admin/posts/{}", second["id"].as_str().unwrap()),
            Some(&admin.token),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
