use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn tweets_are_listed_newest_first() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    app.create_tweet(&alice, "one").await;
    app.create_tweet(&alice, "two").await;

    let res = app.get_without_token(&routes::user_tweets(&alice.id)).await;

    assert_eq!(res.status, 200, "{}", res.text);
    let tweets = res.data().as_array().unwrap();
    assert_eq!(tweets.len(), 2);
    assert_eq!(tweets[0]["content"], "two");
    assert_eq!(tweets[0]["owner"]["username"], "alice");
}

#[tokio::test]
async fn tweets_have_a_length_cap() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;

    let res = app
        .post_with_token(routes::TWEETS, &json!({"content": "x".repeat(281)}), &alice.access_token)
        .await;

    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn only_the_author_can_edit_or_delete() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let tweet = app.create_tweet(&alice, "draft").await;

    let denied = app
        .patch_with_token(&routes::tweet(&tweet), &json!({"content": "mine"}), &bob.access_token)
        .await;
    assert_eq!(denied.status, 403);

    let edited = app
        .patch_with_token(&routes::tweet(&tweet), &json!({"content": "final"}), &alice.access_token)
        .await;
    assert_eq!(edited.status, 200, "{}", edited.text);
    assert_eq!(edited.data()["content"], "final");

    let denied = app.delete_with_token(&routes::tweet(&tweet), &bob.access_token).await;
    assert_eq!(denied.status, 403);
}

#[tokio::test]
async fn deleting_a_tweet_drops_its_likes() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let tweet = app.create_tweet(&alice, "short lived").await;
    app.post_with_token(&routes::like_tweet(&tweet), &json!({}), &alice.access_token)
        .await;

    let res = app.delete_with_token(&routes::tweet(&tweet), &alice.access_token).await;
    assert_eq!(res.status, 200, "{}", res.text);

    let like = app
        .post_with_token(&routes::like_tweet(&tweet), &json!({}), &alice.access_token)
        .await;
    assert_eq!(like.status, 404);

    let listed = app.get_without_token(&routes::user_tweets(&alice.id)).await;
    assert!(listed.data().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn tweets_for_an_unknown_user_are_not_found() {
    let app = TestApp::spawn().await;
    let missing = uuid::Uuid::now_v7().to_string();

    let res = app.get_without_token(&routes::user_tweets(&missing)).await;

    assert_eq!(res.status, 404);
}
