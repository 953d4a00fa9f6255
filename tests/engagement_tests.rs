mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_comment_flow_and_ordering() {
    let app = TestApp::new();
    app.category("Music").await;
    let writer = app.writer("selector").await;
    let admin = app.admin("editor").await;
    let fan = app.reader("fan").await;
    let post = app.published_post(&writer, &admin, "Live Session", "music").await;
    let uri = format!("/posts/{}/comments", post["id"].as_str().unwrap());

    let (status, first) = app
        .post(&uri, Some(&fan.token), json!({ "desc": "First!" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["author_name"], "fan");
    app.post(&uri, Some(&writer.token), json!({ "desc": "Thanks for listening" }))
        .await;

    let (status, page) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total"], 2);
    assert_eq!(page["items"][0]["desc"], "First!");
    assert_eq!(page["items"][1]["author_name"], "selector");

    let (_, refreshed) = app
        .get(&format!("/posts/{}", post["id"].as_str().unwrap()), None)
        .await;
    assert_eq!(refreshed["comments"], 2);
}

#[tokio::test]
async fn test_comment_validation_and_hidden_posts() {
    let app = TestApp::new();
    app.category("Music").await;
    let writer = app.writer("selector").await;
    let fan = app.reader("fan").await;

    let (_, draft) = app
        .post(
            "/posts",
            Some(&writer.token),
            json!({ "title": "Draft", "desc": "Body", "cat": "music" }),
        )
        .await;
    let uri = format!("/posts/{}/comments", draft["id"].as_str().unwrap());

    let (status, _) = app.post(&uri, Some(&fan.token), json!({ "desc": "Hi" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.get(&uri, None).await.0, StatusCode::NOT_FOUND);

    let (status, _) = app.post(&uri, Some(&fan.token), json!({ "desc": "   " })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let too_long = "a".repeat(2001);
    let (status, _) = app.post(&uri, Some(&fan.token), json!({ "desc": too_long })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_comment_delete_permissions() {
    let app = TestApp::new();
    app.category("Music").await;
    let writer = app.writer("selector").await;
    let admin = app.admin("editor").await;
    let fan = app.reader("fan").await;
    let troll = app.reader("troll").await;
    let post = app.published_post(&writer, &admin, "Open Mic", "music").await;
    let uri = format!("/posts/{}/comments", post["id"].as_str().unwrap());

    let mut ids = Vec::new();
    for text in ["one", "two", "three"] {
        let (_, comment) = app.post(&uri, Some(&fan.token), json!({ "desc": text })).await;
        ids.push(comment["id"].as_str().unwrap().to_string());
    }

    // Strangers get the same answer as for a missing comment.
    let (status, _) = app.delete(&format!("/comments/{}", ids[0]), Some(&troll.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for (id, token) in [(&ids[0], &fan.token), (&ids[1], &writer.token), (&ids[2], &admin.token)] {
        let (status, _) = app.delete(&format!("/comments/{id}"), Some(token)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    let (_, page) = app.get(&uri, None).await;
    assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn test_like_rules() {
    let app = TestApp::new();
    app.category("Music").await;
    let writer = app.writer("selector").await;
    let admin = app.admin("editor").await;
    let fan = app.reader("fan").await;
    let post = app.published_post(&writer, &admin, "Top Tracks", "music").await;
    let id = post["id"].as_str().unwrap();

    let (status, summary) = app
        .post(&format!("/posts/{id}/like"), Some(&fan.token), json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["likes"], 1);
    assert_eq!(summary["liked"], true);

    let (status, _) = app
        .post(&format!("/posts/{id}/like"), Some(&fan.token), json!({}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, anonymous) = app.get(&format!("/posts/{id}/likes"), None).await;
    assert_eq!(anonymous["likes"], 1);
    assert_eq!(anonymous["liked"], false);

    let (_, mine) = app.get(&format!("/posts/{id}/likes"), Some(&fan.token)).await;
    assert_eq!(mine["liked"], true);

    let (status, summary) = app.delete(&format!("/posts/{id}/like"), Some(&fan.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["likes"], 0);

    let (status, _) = app.delete(&format!("/posts/{id}/like"), Some(&fan.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cannot_like_hidden_post() {
    let app = TestApp::new();
    app.category("Music").await;
    let writer = app.writer("selector").await;
    let fan = app.reader("fan").await;
    let (_, draft) = app
        .post(
            "/posts",
            Some(&writer.token),
            json!({ "title": "Unreleased", "desc": "Body", "cat": "music" }),
        )
        .await;

    let (status, _) = app
        .post(
            &format!("/posts/{}/like", draft["id"].as_str().unwrap()),
            Some(&fan.token),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_follow_rules() {
    let app = TestApp::new();
    let writer = app.writer("selector").await;
    let reader = app.reader("fan").await;
    let other_reader = app.reader("casual").await;
    let follow_uri = format!("/writers/{}/follow", writer.user.id);

    let (status, summary) = app.post(&follow_uri, Some(&reader.token), json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["followers"], 1);
    assert_eq!(summary["following"], true);

    let (status, _) = app.post(&follow_uri, Some(&reader.token), json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app.post(&follow_uri, Some(&writer.token), json!({})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Readers cannot be followed.
    let (status, _) = app
        .post(
            &format!("/writers/{}/follow", other_reader.user.id),
            Some(&reader.token),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, anonymous) = app.get(&follow_uri, None).await;
    assert_eq!(anonymous["followers"], 1);
    assert_eq!(anonymous["following"], false);

    let (_, followers) = app
        .get(&format!("/writers/{}/followers", writer.user.id), None)
        .await;
    assert_eq!(followers["items"][0]["username"], "fan");

    let (_, following) = app.get("/me/following", Some(&reader.token)).await;
    assert_eq!(following["items"][0]["username"], "selector");

    let (_, card) = app.get(&format!("/writers/{}", writer.user.id), None).await;
    assert_eq!(card["followers"], 1);

    let (status, _) = app.delete(&follow_uri, Some(&reader.token)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.delete(&follow_uri, Some(&reader.token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_writer_directory() {
    let app = TestApp::new();
    app.writer("alpha_dj").await;
    app.writer("beta_dj").await;
    let reader = app.reader("listener").await;

    let (_, writers) = app.get("/writers", None).await;
    assert_eq!(writers["total"], 2);

    let (status, _) = app.get(&format!("/writers/{}", reader.user.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_share_tracking() {
    let app = TestApp::new();
    app.category("Music").await;
    let writer = app.writer("selector").await;
    let admin = app.admin("editor").await;
    let fan = app.reader("fan").await;
    let post = app.published_post(&writer, &admin, "Share Me", "music").await;
    let uri = format!("/posts/{}/share", post["id"].as_str().unwrap());

    let (status, shared) = app
        .post(&uri, None, json!({ "platform": "whatsapp", "method": "copy_link" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{shared}");
    assert_eq!(
        shared["share_url"],
        "http://localhost:5173/posts/share-me?utm_source=whatsapp&utm_medium=copy_link"
    );
    assert!(shared["log"]["user_id"].is_null());

    let (_, attributed) = app
        .post(&uri, Some(&fan.token), json!({ "platform": "whatsapp", "method": "copy_link" }))
        .await;
    assert_eq!(attributed["log"]["user_id"], fan.user.id.to_string());

    app.post(&uri, None, json!({ "platform": "email", "method": "button" }))
        .await;

    let (status, stats) = app.get("/admin/shares", Some(&admin.token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats[0]["platform"], "whatsapp");
    assert_eq!(stats[0]["count"], 2);
    assert_eq!(stats[1]["count"], 1);

    let (status, _) = app
        .post(&uri, None, json!({ "platform": "myspace", "method": "button" }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_cannot_share_hidden_post() {
    let app = TestApp::new();
    app.category("Music").await;
    let writer = app.writer("selector").await;
    let (_, draft) = app
        .post(
            "/posts",
            Some(&writer.token),
            json!({ "title": "Secret", "desc": "Body", "cat": "music" }),
        )
        .await;

    let (status, _) = app
        .post(
            &format!("/posts/{}/share", draft["id"].as_str().unwrap()),
            None,
            json!({ "platform": "twitter", "method": "button" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
