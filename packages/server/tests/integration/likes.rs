use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn video_like_toggles_on_off_on() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let video = app.insert_video(&alice.id, "likeable", 10).await;

    let mut states = Vec::new();
    for _ in 0..3 {
        let res = app
            .post_with_token(&routes::like_video(&video), &json!({}), &alice.access_token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        states.push(res.data()["isLiked"].as_bool().unwrap());
    }

    assert_eq!(states, vec![true, false, true]);
}

#[tokio::test]
async fn comment_and_tweet_likes_are_independent() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let video = app.insert_video(&alice.id, "talk", 10).await;
    let comment = app.add_comment(&alice, &video, "hi").await;
    let tweet = app.create_tweet(&alice, "hello").await;

    let c = app
        .post_with_token(&routes::like_comment(&comment), &json!({}), &alice.access_token)
        .await;
    let t = app
        .post_with_token(&routes::like_tweet(&tweet), &json!({}), &alice.access_token)
        .await;
    let v = app
        .post_with_token(&routes::like_video(&video), &json!({}), &alice.access_token)
        .await;

    assert_eq!(c.data()["isLiked"], true);
    assert_eq!(t.data()["isLiked"], true);
    assert_eq!(v.data()["isLiked"], true);
    assert_eq!(v.message(), "Like added successfully");
}

#[tokio::test]
async fn liking_a_missing_target_is_not_found() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let missing = uuid::Uuid::now_v7().to_string();

    for path in [
        routes::like_video(&missing),
        routes::like_comment(&missing),
        routes::like_tweet(&missing),
    ] {
        let res = app.post_with_token(&path, &json!({}), &alice.access_token).await;
        assert_eq!(res.status, 404, "{path}: {}", res.text);
    }
}

#[tokio::test]
async fn liked_videos_lists_only_current_likes() {
    let app = TestApp::spawn().await;
    let alice = app.create_user("alice").await;
    let bob = app.create_user("bob").await;
    let kept = app.insert_video(&bob.id, "kept", 20).await;
    let dropped = app.insert_video(&bob.id, "dropped", 10).await;

    for video in [&kept, &dropped, &dropped] {
        app.post_with_token(&routes::like_video(video), &json!({}), &alice.access_token)
            .await;
    }

    let res = app.get_with_token(routes::LIKED_VIDEOS, &alice.access_token).await;

    assert_eq!(res.status, 200, "{}", res.text);
    let liked = res.data().as_array().unwrap();
    assert_eq!(liked.len(), 1);
    assert_eq!(liked[0]["id"], kept.as_str());
    assert_eq!(liked[0]["owner"]["username"], "bob");
}
