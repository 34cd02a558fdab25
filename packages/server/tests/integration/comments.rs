use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn comments_are_listed_newest_first_with_owners() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let video = app.insert_video(&alice.id, "talk", 10).await;
    app.add_comment(&alice, &video, "first").await;
    app.add_comment(&bob, &video, "second").await;

    let res = app.get_without_token(&routes::comments(&video)).await;

    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.data()["totalComments"], 2);
    let comments = res.data()["comments"].as_array().unwrap();
    assert_eq!(comments[0]["content"], "second");
    assert_eq!(comments[0]["owner"]["username"], "bob");
    assert_eq!(comments[1]["content"], "first");
}

#[tokio::test]
async fn comment_pages_respect_the_limit() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let video = app.insert_video(&alice.id, "talk", 10).await;
    for i in 0..3 {
        app.add_comment(&alice, &video, &format!("c{i}")).await;
    }

    let res = app
        .get_without_token(&format!("{}?page=2&limit=2", routes::comments(&video)))
        .await;

    assert_eq!(res.data()["comments"].as_array().unwrap().len(), 1);
    assert_eq!(res.data()["limit"], 2);
}

#[tokio::test]
async fn empty_comments_are_rejected() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let video = app.insert_video(&alice.id, "talk", 10).await;

    let res = app
        .post_with_token(&routes::comments(&video), &json!({"content": "   "}), &alice.access_token)
        .await;

    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn commenting_on_a_missing_video_is_not_found() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let missing = uuid::Uuid::now_v7().to_string();

    let res = app
        .post_with_token(&routes::comments(&missing), &json!({"content": "hi"}), &alice.access_token)
        .await;

    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn only_the_author_can_edit_or_delete() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let video = app.insert_video(&alice.id, "talk", 10).await;
    let comment = app.add_comment(&bob, &video, "typo").await;

    let denied = app
        .patch_with_token(&routes::comments(&comment), &json!({"content": "hijack"}), &alice.access_token)
        .await;
    assert_eq!(denied.status, 403);

    let edited = app
        .patch_with_token(&routes::comments(&comment), &json!({"content": "fixed"}), &bob.access_token)
        .await;
    assert_eq!(edited.status, 200, "{}", edited.text);
    assert_eq!(edited.data()["content"], "fixed");

    let denied = app.delete_with_token(&routes::comments(&comment), &alice.access_token).await;
    assert_eq!(denied.status, 403);

    let deleted = app.delete_with_token(&routes::comments(&comment), &bob.access_token).await;
    assert_eq!(deleted.status, 200);

    let res = app.get_without_token(&routes::comments(&video)).await;
    assert_eq!(res.data()["totalComments"], 0);
}

#[tokio::test]
async fn legacy_new_comment_field_is_accepted() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let video = app.insert_video(&alice.id, "talk", 10).await;

    let res = app
        .post_with_token(&routes::comments(&video), &json!({"newComment": "hello"}), &alice.access_token)
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.data()["content"], "hello");
}
