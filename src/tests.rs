#[cfg(test)]
mod integration_tests {
    use crate::auth::session::SESSION_COOKIE;
    use crate::handlers::login::INVALID_LOGIN;
    use crate::roster::{assign_supervisor, create_user, NewProfile, NewUser};
    use crate::schemas::HealthResponse;
    use crate::test_utils::test_utils::{
        csrf_token_from, location, setup_test_app, spawn_test_app, TestApp, TEST_PASSWORD,
    };
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::NaiveDate;
    use cookie::Cookie;
    use model::entities::{comment, log_entry, session, user};
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    };

    /// Post a log entry as `session`'s student and return the response
    async fn post_log(
        app: &TestApp,
        session: &Cookie<'static>,
        date: &str,
        activity: &str,
    ) -> axum_test::TestResponse {
        let csrf = app.csrf_token(session, "/log/add/").await;
        app.server
            .post("/log/add/")
            .add_cookie(session.clone())
            .form(&[
                ("date", date),
                ("activity_description", activity),
                ("csrf_token", csrf.as_str()),
            ])
            .await
    }

    async fn only_log_of(app: &TestApp, student: &user::Model) -> log_entry::Model {
        let mut logs = log_entry::Entity::find()
            .filter(log_entry::Column::StudentId.eq(student.id))
            .all(&app.db)
            .await
            .unwrap();
        assert_eq!(logs.len(), 1, "expected exactly one log for {}", student.username);
        logs.remove(0)
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: HealthResponse = response.json();
        assert_eq!(body.status, "healthy");
        assert_eq!(body.database, "connected");
    }

    #[tokio::test]
    async fn test_home_page_for_anonymous_visitor() {
        let app = spawn_test_app().await;

        let response = app.server.get("/").await;

        response.assert_status(StatusCode::OK);
        assert!(response.text().contains("href=\"/login/\""));
    }

    #[tokio::test]
    async fn test_home_redirects_by_role() {
        let app = spawn_test_app().await;

        for (username, target) in [
            ("alice", "/dashboard/"),
            ("bob", "/supervisor/dashboard/"),
            ("dave", "/supervisor/dashboard/"),
        ] {
            let session = app.login(username).await;
            let response = app.server.get("/").add_cookie(session).await;
            response.assert_status(StatusCode::SEE_OTHER);
            assert_eq!(location(&response), target, "home for {}", username);
        }
    }

    #[tokio::test]
    async fn test_login_sets_session_cookie_and_follows_next() {
        let app = spawn_test_app().await;

        let response = app
            .server
            .post("/login/")
            .form(&[
                ("username", "alice"),
                ("password", TEST_PASSWORD),
                ("next", "/log/add/"),
            ])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/log/add/");
        let cookie = response.cookie(SESSION_COOKIE);
        assert!(!cookie.value().is_empty());
        assert_eq!(cookie.http_only(), Some(true));

        let stored = session::Entity::find_by_id(cookie.value().to_string())
            .one(&app.db)
            .await
            .unwrap()
            .expect("session row exists");
        assert_eq!(stored.user_id, app.campus.alice.id);

        let alice = user::Entity::find_by_id(app.campus.alice.id)
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert!(alice.last_login.is_some());
    }

    #[tokio::test]
    async fn test_login_ignores_offsite_next() {
        let app = spawn_test_app().await;

        let response = app
            .server
            .post("/login/")
            .form(&[
                ("username", "alice"),
                ("password", TEST_PASSWORD),
                ("next", "https://evil.example/"),
            ])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_bad_login_rerenders_form() {
        let app = spawn_test_app().await;

        for (username, password) in [("alice", "wrong"), ("nobody", TEST_PASSWORD), ("", "")] {
            let response = app
                .server
                .post("/login/")
                .form(&[("username", username), ("password", password)])
                .await;

            response.assert_status(StatusCode::OK);
            assert!(response.text().contains(INVALID_LOGIN));
            assert!(response.cookies().get(SESSION_COOKIE).is_none());
        }

        let sessions = session::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(sessions, 0);
    }

    #[tokio::test]
    async fn test_inactive_user_cannot_log_in() {
        let app = spawn_test_app().await;
        let mut erin: user::ActiveModel = app.campus.erin.clone().into();
        erin.is_active = Set(false);
        erin.update(&app.db).await.unwrap();

        let response = app
            .server
            .post("/login/")
            .form(&[("username", "erin"), ("password", TEST_PASSWORD)])
            .await;

        response.assert_status(StatusCode::OK);
        assert!(response.text().contains(INVALID_LOGIN));
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let app = spawn_test_app().await;
        let session = app.login("alice").await;
        let csrf = app.csrf_token(&session, "/logout/").await;

        let response = app
            .server
            .post("/logout/")
            .add_cookie(session.clone())
            .form(&[("csrf_token", csrf.as_str())])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        let sessions = session::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(sessions, 0);

        // The old cookie no longer authenticates
        let response = app.server.get("/dashboard/").add_cookie(session).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login/?next=%2Fdashboard%2F");
    }

    #[tokio::test]
    async fn test_logout_needs_a_confirmed_post() {
        let app = spawn_test_app().await;
        let session = app.login("alice").await;

        // A cross-site link or image can only issue a GET
        let response = app.server.get("/logout/").add_cookie(session.clone()).await;
        response.assert_status(StatusCode::OK);
        assert!(response.text().contains("action=\"/logout/\""));

        let response = app
            .server
            .post("/logout/")
            .add_cookie(session.clone())
            .form(&[("csrf_token", "forged")])
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        assert_eq!(session::Entity::find().count(&app.db).await.unwrap(), 1);
        let response = app.server.get("/dashboard/").add_cookie(session).await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_anonymous_logout_goes_home() {
        let app = spawn_test_app().await;

        let response = app.server.get("/logout/").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_anonymous_requests_are_sent_to_login() {
        let app = spawn_test_app().await;

        for (path, next) in [
            ("/dashboard/", "%2Fdashboard%2F"),
            ("/log/add/", "%2Flog%2Fadd%2F"),
            ("/supervisor/dashboard/", "%2Fsupervisor%2Fdashboard%2F"),
            ("/log/1/", "%2Flog%2F1%2F"),
        ] {
            let response = app.server.get(path).await;
            response.assert_status(StatusCode::SEE_OTHER);
            assert_eq!(location(&response), format!("/login/?next={}", next));
        }

        let response = app
            .server
            .post("/log/add/")
            .form(&[("date", "2024-01-10"), ("activity_description", "Sneaky")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(log_entry::Entity::find().count(&app.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_wrong_role_is_sent_to_login() {
        let app = spawn_test_app().await;
        let alice = app.login("alice").await;
        let bob = app.login("bob").await;

        let response = app
            .server
            .get("/supervisor/dashboard/")
            .add_cookie(alice)
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login/");

        for path in ["/dashboard/", "/log/add/"] {
            let response = app.server.get(path).add_cookie(bob.clone()).await;
            response.assert_status(StatusCode::SEE_OTHER);
            assert_eq!(location(&response), "/login/");
        }
    }

    #[tokio::test]
    async fn test_student_dashboard_only_lists_own_logs() {
        let app = spawn_test_app().await;
        let alice = app.login("alice").await;
        let erin = app.login("erin").await;

        let response = post_log(&app, &alice, "2024-01-10", "Configured the build server").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard/");

        let alice_page = app.server.get("/dashboard/").add_cookie(alice).await;
        alice_page.assert_status(StatusCode::OK);
        let alice_page = alice_page.text();
        assert!(alice_page.contains("2024-01-10"));
        assert!(alice_page.contains("Configured the build server"));

        let erin_page = app.server.get("/dashboard/").add_cookie(erin).await.text();
        assert!(!erin_page.contains("Configured the build server"));
        assert!(erin_page.contains("No log entries yet."));
    }

    #[tokio::test]
    async fn test_student_dashboard_is_newest_first() {
        let app = spawn_test_app().await;
        let alice = app.login("alice").await;

        post_log(&app, &alice, "2024-01-10", "First week").await;
        post_log(&app, &alice, "2024-01-17", "Second week").await;

        let page = app.server.get("/dashboard/").add_cookie(alice).await.text();
        let second = page.find("Second week").expect("second log listed");
        let first = page.find("First week").expect("first log listed");
        assert!(second < first);
    }

    #[tokio::test]
    async fn test_log_owner_comes_from_session_not_form() {
        let app = spawn_test_app().await;
        let alice = app.login("alice").await;
        let csrf = app.csrf_token(&alice, "/log/add/").await;
        let erin_id = app.campus.erin.id.to_string();

        let response = app
            .server
            .post("/log/add/")
            .add_cookie(alice)
            .form(&[
                ("date", "2024-01-10"),
                ("activity_description", "Wrote tests"),
                ("student_id", erin_id.as_str()),
                ("student", erin_id.as_str()),
                ("csrf_token", csrf.as_str()),
            ])
            .await;

        response.assert_status(StatusCode::SEE_OTHER);
        let log = only_log_of(&app, &app.campus.alice).await;
        assert_eq!(log.date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert_eq!(log.activity_description, "Wrote tests");
        let erin_logs = log_entry::Entity::find()
            .filter(log_entry::Column::StudentId.eq(app.campus.erin.id))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(erin_logs, 0);
    }

    #[tokio::test]
    async fn test_invalid_log_form_rerenders_without_saving() {
        let app = spawn_test_app().await;
        let alice = app.login("alice").await;

        let response = post_log(&app, &alice, "", "   ").await;
        response.assert_status(StatusCode::OK);
        let page = response.text();
        assert!(page.contains("This field is required."));
        assert!(page.contains("name=\"csrf_token\""));

        let response = post_log(&app, &alice, "2024-02-30", "Leap day work").await;
        response.assert_status(StatusCode::OK);
        let page = response.text();
        assert!(page.contains("Enter a valid date."));
        // Submitted values are kept for correction
        assert!(page.contains("Leap day work"));

        assert_eq!(log_entry::Entity::find().count(&app.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_log_form_rejects_bad_csrf_token() {
        let app = spawn_test_app().await;
        let alice = app.login("alice").await;

        for token in ["", "not-the-token"] {
            let response = app
                .server
                .post("/log/add/")
                .add_cookie(alice.clone())
                .form(&[
                    ("date", "2024-01-10"),
                    ("activity_description", "Forged"),
                    ("csrf_token", token),
                ])
                .await;
            response.assert_status(StatusCode::FORBIDDEN);
        }

        assert_eq!(log_entry::Entity::find().count(&app.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_supervisor_dashboard_shows_assigned_students_logs() {
        let app = spawn_test_app().await;
        let alice = app.login("alice").await;
        let erin = app.login("erin").await;
        post_log(&app, &alice, "2024-01-10", "Alice on the build server").await;
        post_log(&app, &alice, "2024-01-12", "Alice on code review").await;
        post_log(&app, &erin, "2024-01-11", "Erin in the workshop").await;

        let bob = app.login("bob").await;
        let response = app.server.get("/supervisor/dashboard/").add_cookie(bob).await;
        response.assert_status(StatusCode::OK);
        let page = response.text();
        assert!(page.contains("Alice Tester (alice)"));
        assert!(page.contains("Computer Science"));
        let newer = page.find("Alice on code review").expect("newer log listed");
        let older = page.find("Alice on the build server").expect("older log listed");
        assert!(newer < older);
        assert!(!page.contains("Erin in the workshop"));

        let log = log_entry::Entity::find()
            .filter(log_entry::Column::ActivityDescription.eq("Alice on code review"))
            .one(&app.db)
            .await
            .unwrap()
            .unwrap();
        assert!(page.contains(&format!("href=\"/log/{}/\"", log.id)));
    }

    #[tokio::test]
    async fn test_supervisor_dashboard_merges_roster_logs_by_date() {
        let app = spawn_test_app().await;
        let mut zed = NewUser::new(
            "zed",
            TEST_PASSWORD,
            NewProfile::Student {
                course: "Physics".into(),
            },
        );
        zed.first_name = "Zed".into();
        create_user(&app.db, zed).await.unwrap();
        assign_supervisor(&app.db, "zed", "bob").await.unwrap();

        let alice = app.login("alice").await;
        let zed = app.login("zed").await;
        let erin = app.login("erin").await;
        post_log(&app, &alice, "2024-01-10", "Alice day ten").await;
        post_log(&app, &zed, "2024-01-11", "Zed day eleven").await;
        post_log(&app, &alice, "2024-01-12", "Alice day twelve").await;
        post_log(&app, &erin, "2024-01-13", "Erin day thirteen").await;

        let bob = app.login("bob").await;
        let page = app.server.get("/supervisor/dashboard/").add_cookie(bob).await.text();

        let positions: Vec<usize> = ["Alice day twelve", "Zed day eleven", "Alice day ten"]
            .iter()
            .map(|text| page.find(text).unwrap_or_else(|| panic!("{} not listed", text)))
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(!page.contains("Erin day thirteen"));
        assert_eq!(page.matches("class=\"log\"").count(), 3);
    }

    #[tokio::test]
    async fn test_unassigned_supervisor_sees_nothing() {
        let app = spawn_test_app().await;
        let alice = app.login("alice").await;
        post_log(&app, &alice, "2024-01-10", "Alice on the build server").await;

        let carol = app.login("carol").await;
        let response = app.server.get("/supervisor/dashboard/").add_cookie(carol).await;

        response.assert_status(StatusCode::OK);
        let page = response.text();
        assert!(!page.contains("Alice on the build server"));
        assert!(page.contains("No students are assigned to you."));
    }

    #[tokio::test]
    async fn test_industry_supervisor_sees_interns() {
        let app = spawn_test_app().await;
        let alice = app.login("alice").await;
        post_log(&app, &alice, "2024-01-10", "Alice on the factory floor").await;

        let dave = app.login("dave").await;
        let response = app.server.get("/supervisor/dashboard/").add_cookie(dave).await;

        response.assert_status(StatusCode::OK);
        assert!(response.text().contains("Alice on the factory floor"));
    }

    #[tokio::test]
    async fn test_missing_log_is_not_found() {
        let app = spawn_test_app().await;
        let bob = app.login("bob").await;

        let response = app.server.get("/log/999/").add_cookie(bob.clone()).await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = app.server.get("/log/abc/").add_cookie(bob).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_signed_log_id_is_not_found() {
        let app = spawn_test_app().await;
        let alice = app.login("alice").await;
        post_log(&app, &alice, "2024-01-10", "Alice on the build server").await;
        let log = only_log_of(&app, &app.campus.alice).await;

        let bob = app.login("bob").await;
        let response = app
            .server
            .get(&format!("/log/+{}/", log.id))
            .add_cookie(bob.clone())
            .await;
        response.assert_status(StatusCode::NOT_FOUND);

        let response = app
            .server
            .get(&format!("/log/{}/", log.id))
            .add_cookie(bob)
            .await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unassigned_supervisor_cannot_open_log() {
        let app = spawn_test_app().await;
        let alice = app.login("alice").await;
        let erin = app.login("erin").await;
        post_log(&app, &alice, "2024-01-10", "Alice's private notes").await;
        post_log(&app, &erin, "2024-01-10", "Erin without supervisors").await;
        let alice_log = only_log_of(&app, &app.campus.alice).await;
        let erin_log = only_log_of(&app, &app.campus.erin).await;

        let carol = app.login("carol").await;
        let response = app
            .server
            .get(&format!("/log/{}/", alice_log.id))
            .add_cookie(carol.clone())
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/supervisor/dashboard/");

        // erin has no supervisors at all: a handled "not assigned" case
        let bob = app.login("bob").await;
        let response = app
            .server
            .get(&format!("/log/{}/", erin_log.id))
            .add_cookie(bob)
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/supervisor/dashboard/");

        let response = app
            .server
            .post(&format!("/log/{}/", alice_log.id))
            .add_cookie(carol)
            .form(&[("comment_text", "Let me in"), ("csrf_token", "whatever")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(comment::Entity::find().count(&app.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_supervisor_comments_on_log() {
        let app = spawn_test_app().await;
        let alice = app.login("alice").await;
        post_log(&app, &alice, "2024-01-10", "Alice on the build server").await;
        let log = only_log_of(&app, &app.campus.alice).await;
        let detail_path = format!("/log/{}/", log.id);

        let bob = app.login("bob").await;
        let page = app.server.get(&detail_path).add_cookie(bob.clone()).await;
        page.assert_status(StatusCode::OK);
        let page = page.text();
        assert!(page.contains("Alice on the build server"));
        assert!(page.contains("No comments yet."));
        let csrf = csrf_token_from(&page);

        let response = app
            .server
            .post(&detail_path)
            .add_cookie(bob.clone())
            .form(&[("comment_text", "Good progress"), ("csrf_token", csrf.as_str())])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), detail_path);

        let dave = app.login("dave").await;
        let csrf = app.csrf_token(&dave, &detail_path).await;
        app.server
            .post(&detail_path)
            .add_cookie(dave)
            .form(&[("comment_text", "Agreed"), ("csrf_token", csrf.as_str())])
            .await
            .assert_status(StatusCode::SEE_OTHER);

        let page = app.server.get(&detail_path).add_cookie(bob).await.text();
        let first = page.find("Good progress").expect("bob's comment listed");
        let second = page.find("Agreed").expect("dave's comment listed");
        assert!(first < second);
        assert!(page.contains("Bob Tester"));
        assert!(page.contains("Dave Tester"));

        let authors: Vec<i32> = comment::Entity::find()
            .filter(comment::Column::LogEntryId.eq(log.id))
            .all(&app.db)
            .await
            .unwrap()
            .into_iter()
            .map(|comment| comment.author_id)
            .collect();
        assert_eq!(authors.len(), 2);
        assert!(authors.contains(&app.campus.bob.id));
        assert!(authors.contains(&app.campus.dave.id));
    }

    #[tokio::test]
    async fn test_comment_author_and_log_come_from_server() {
        let app = spawn_test_app().await;
        let alice = app.login("alice").await;
        let erin = app.login("erin").await;
        post_log(&app, &alice, "2024-01-10", "Alice on the build server").await;
        post_log(&app, &erin, "2024-01-10", "Erin in the workshop").await;
        let alice_log = only_log_of(&app, &app.campus.alice).await;
        let erin_log = only_log_of(&app, &app.campus.erin).await;
        let detail_path = format!("/log/{}/", alice_log.id);

        let bob = app.login("bob").await;
        let csrf = app.csrf_token(&bob, &detail_path).await;
        let carol_id = app.campus.carol.id.to_string();
        let erin_log_id = erin_log.id.to_string();
        app.server
            .post(&detail_path)
            .add_cookie(bob)
            .form(&[
                ("comment_text", "Nice"),
                ("author_id", carol_id.as_str()),
                ("author", carol_id.as_str()),
                ("log_entry_id", erin_log_id.as_str()),
                ("log_entry", erin_log_id.as_str()),
                ("csrf_token", csrf.as_str()),
            ])
            .await
            .assert_status(StatusCode::SEE_OTHER);

        let comments = comment::Entity::find().all(&app.db).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].author_id, app.campus.bob.id);
        assert_eq!(comments[0].log_entry_id, alice_log.id);
        assert_eq!(comments[0].comment_text, "Nice");
    }

    #[tokio::test]
    async fn test_blank_comment_rerenders_without_saving() {
        let app = spawn_test_app().await;
        let alice = app.login("alice").await;
        post_log(&app, &alice, "2024-01-10", "Alice on the build server").await;
        let log = only_log_of(&app, &app.campus.alice).await;
        let detail_path = format!("/log/{}/", log.id);

        let bob = app.login("bob").await;
        let csrf = app.csrf_token(&bob, &detail_path).await;
        let response = app
            .server
            .post(&detail_path)
            .add_cookie(bob.clone())
            .form(&[("comment_text", "  "), ("csrf_token", csrf.as_str())])
            .await;

        response.assert_status(StatusCode::OK);
        assert!(response.text().contains("This field is required."));

        let response = app
            .server
            .post(&detail_path)
            .add_cookie(bob)
            .form(&[("comment_text", "Forged"), ("csrf_token", "bogus")])
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        assert_eq!(comment::Entity::find().count(&app.db).await.unwrap(), 0);
    }
}
