use serde_json::json;

use crate::common::{TestApp, image_part, routes};

mod registration {
    use super::*;

    #[tokio::test]
    async fn new_user_can_register_with_an_avatar() {
        let app = TestApp::spawn().await;

        let res = app.register("Alice", "securepass").await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["statusCode"], 201);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.data()["username"], "alice");
        assert_eq!(res.data()["email"], "alice@example.com");
        assert!(res.data()["avatar"].as_str().unwrap().starts_with("/media/"));
        assert!(res.data().get("password").is_none());
    }

    #[tokio::test]
    async fn cannot_register_with_an_already_taken_username() {
        let app = TestApp::spawn().await;

        let first = app.register("alice", "securepass").await;
        assert_eq!(first.status, 201, "First registration failed: {}", first.text);

        let form = TestApp::register_form("ALICE", "other@example.com", "securepass");
        let res = app
            .multipart(reqwest::Method::POST, routes::REGISTER, form, None)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["success"], false);
        assert_eq!(res.message(), "User with email or username already exists");
    }

    #[tokio::test]
    async fn cannot_register_with_an_already_taken_email() {
        let app = TestApp::spawn().await;

        let first = app.register("alice", "securepass").await;
        assert_eq!(first.status, 201, "First registration failed: {}", first.text);

        let form = TestApp::register_form("alicia", "Alice@Example.com", "securepass");
        let res = app
            .multipart(reqwest::Method::POST, routes::REGISTER, form, None)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["success"], false);
        assert_eq!(res.message(), "User with email or username already exists");
    }

    #[tokio::test]
    async fn cannot_register_without_an_avatar() {
        let app = TestApp::spawn().await;
        let form = reqwest::multipart::Form::new()
            .text("fullname", "Alice")
            .text("email", "alice@example.com")
            .text("username", "alice")
            .text("password", "securepass");

        let res = app
            .multipart(reqwest::Method::POST, routes::REGISTER, form, None)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.message(), "avatar file is required");
    }

    #[tokio::test]
    async fn cannot_register_with_a_blank_field() {
        let app = TestApp::spawn().await;
        let form = TestApp::register_form("alice", "   ", "securepass");

        let res = app
            .multipart(reqwest::Method::POST, routes::REGISTER, form, None)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.message(), "All fields are required");
    }
}

mod session {
    use super::*;

    #[tokio::test]
    async fn login_sets_both_session_cookies() {
        let app = TestApp::spawn().await;
        app.register("alice", "securepass").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"email": "alice@example.com", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let access = res.cookie("accessToken").expect("accessToken cookie");
        assert!(access.contains("HttpOnly"));
        assert!(res.cookie("refreshToken").is_some());
        assert!(res.data()["accessToken"].is_string());
        assert!(res.data()["user"].get("password").is_none());
    }

    #[tokio::test]
    async fn login_with_a_wrong_password_is_rejected() {
        let app = TestApp::spawn().await;
        app.register("alice", "securepass").await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "alice", "password": "wrongpass"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.message(), "Invalid user credentials");
    }

    #[tokio::test]
    async fn login_for_an_unknown_user_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "ghost", "password": "securepass"}),
            )
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn current_user_requires_a_token() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::CURRENT_USER).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.message(), "Unauthorized request");
    }

    #[tokio::test]
    async fn current_user_accepts_the_access_cookie() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let res = app
            .client
            .get(format!("http://{}{}", app.addr, routes::CURRENT_USER))
            .header("Cookie", format!("accessToken={}", alice.access_token))
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), 200);
    }

    #[tokio::test]
    async fn a_garbage_token_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_with_token(routes::CURRENT_USER, "not-a-jwt").await;

        assert_eq!(res.status, 401);
        assert_eq!(res.message(), "Invalid or expired token");
    }

    #[tokio::test]
    async fn refresh_rotates_and_rejects_reuse() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let first = app
            .post_without_token(routes::REFRESH, &json!({"refreshToken": alice.refresh_token}))
            .await;
        assert_eq!(first.status, 200, "{}", first.text);
        let rotated = first.data()["refreshToken"].as_str().unwrap().to_string();
        assert_ne!(rotated, alice.refresh_token);

        let reuse = app
            .post_without_token(routes::REFRESH, &json!({"refreshToken": alice.refresh_token}))
            .await;
        assert_eq!(reuse.status, 401);
        assert_eq!(reuse.message(), "Refresh token is expired or used");

        let cookie = app
            .post_with_cookie(routes::REFRESH, &format!("refreshToken={rotated}"))
            .await;
        assert_eq!(cookie.status, 200, "{}", cookie.text);
    }

    #[tokio::test]
    async fn refresh_without_a_token_is_unauthorized() {
        let app = TestApp::spawn().await;

        let res = app.post_without_token(routes::REFRESH, &json!({})).await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn logout_revokes_the_refresh_session() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let res = app
            .post_with_token(routes::LOGOUT, &json!({}), &alice.access_token)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert!(res.cookie("accessToken").is_some());

        let refresh = app
            .post_without_token(routes::REFRESH, &json!({"refreshToken": alice.refresh_token}))
            .await;
        assert_eq!(refresh.status, 401);
    }
}

mod account {
    use super::*;

    #[tokio::test]
    async fn change_password_checks_the_old_password() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let wrong = app
            .patch_with_token(
                routes::CHANGE_PASSWORD,
                &json!({"oldPassword": "nope-nope", "newPassword": "brandnewpass"}),
                &alice.access_token,
            )
            .await;
        assert_eq!(wrong.status, 400);
        assert_eq!(wrong.message(), "Invalid old password");

        let ok = app
            .patch_with_token(
                routes::CHANGE_PASSWORD,
                &json!({"oldPassword": "securepass", "newPassword": "brandnewpass"}),
                &alice.access_token,
            )
            .await;
        assert_eq!(ok.status, 200, "{}", ok.text);

        let login = app
            .post_without_token(
                routes::LOGIN,
                &json!({"username": "alice", "password": "brandnewpass"}),
            )
            .await;
        assert_eq!(login.status, 200);
    }

    #[tokio::test]
    async fn update_account_changes_name_and_email() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let res = app
            .patch_with_token(
                routes::UPDATE_ACCOUNT,
                &json!({"fullname": "Alice Liddell", "email": "liddell@example.com"}),
                &alice.access_token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["fullname"], "Alice Liddell");
        assert_eq!(res.data()["email"], "liddell@example.com");
    }

    #[tokio::test]
    async fn update_account_rejects_a_taken_email() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        app.create_user("bob").await;

        let res = app
            .patch_with_token(
                routes::UPDATE_ACCOUNT,
                &json!({"fullname": "Alice", "email": "bob@example.com"}),
                &alice.access_token,
            )
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn avatar_can_be_replaced() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let before = app.get_with_token(routes::CURRENT_USER, &alice.access_token).await;

        let form = reqwest::multipart::Form::new().part("avatar", image_part("new.png"));
        let res = app
            .multipart(
                reqwest::Method::PATCH,
                routes::AVATAR,
                form,
                Some(&alice.access_token),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_ne!(res.data()["avatar"], before.data()["avatar"]);
    }
}

mod channel {
    use super::*;

    #[tokio::test]
    async fn profile_counts_subscribers_and_flags_the_viewer() {
        let app = TestApp::spawn().await;
        let owner = app.create_user("carol").await;
        let fans = [
            app.create_user("fan1").await,
            app.create_user("fan2").await,
            app.create_user("fan3").await,
        ];
        for fan in &fans {
            let res = app
                .post_with_token(
                    &routes::toggle_subscription(&owner.id),
                    &json!({}),
                    &fan.access_token,
                )
                .await;
            assert_eq!(res.status, 200, "{}", res.text);
        }

        let res = app
            .get_with_token(&routes::channel(" Carol "), &fans[0].access_token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.data()["subscriberCount"], 3);
        assert_eq!(res.data()["channelSubscribedToCount"], 0);
        assert_eq!(res.data()["isSubscribed"], true);

        let own = app
            .get_with_token(&routes::channel("CAROL"), &owner.access_token)
            .await;
        assert_eq!(own.status, 200, "{}", own.text);
        assert_eq!(own.data()["username"], "carol");
        assert_eq!(own.data()["isSubscribed"], false);
    }

    #[tokio::test]
    async fn unknown_channel_is_not_found() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;

        let res = app
            .get_with_token(&routes::channel("nobody"), &alice.access_token)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.message(), "Channel does not exist");
    }

    #[tokio::test]
    async fn watching_a_video_records_history_once() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        let video_id = app.insert_video(&bob.id, "intro", 10).await;

        for _ in 0..2 {
            let res = app
                .get_with_token(&routes::video(&video_id), &alice.access_token)
                .await;
            assert_eq!(res.status, 200, "{}", res.text);
        }

        let res = app
            .get_with_token(routes::WATCH_HISTORY, &alice.access_token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let history = res.data().as_array().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0]["id"], video_id.as_str());
        assert_eq!(history[0]["owner"]["username"], "bob");
    }

    #[tokio::test]
    async fn rewatching_moves_a_video_to_the_front_of_history() {
        let app = TestApp::spawn().await;
        let alice = app.create_user("alice").await;
        let bob = app.create_user("bob").await;
        let first = app.insert_video(&bob.id, "first", 20).await;
        let second = app.insert_video(&bob.id, "second", 10).await;

        for id in [&first, &second, &first] {
            let res = app
                .get_with_token(&routes::video(id), &alice.access_token)
                .await;
            assert_eq!(res.status, 200, "{}", res.text);
        }

        let res = app
            .get_with_token(routes::WATCH_HISTORY, &alice.access_token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let ids: Vec<&str> = res
            .data()
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, [first.as_str(), second.as_str()]);
    }
}

#[tokio::test]
async fn unknown_routes_use_the_error_envelope() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token("/api/v1/nope").await;

    assert_eq!(res.status, 404);
    assert_eq!(res.body["success"], false);
    assert_eq!(res.message(), "Route not found");
}

#[tokio::test]
async fn healthcheck_reports_ok() {
    let app = TestApp::spawn().await;

    let res = app.get_without_token(routes::HEALTHCHECK).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.data()["status"], "ok");
}
