#[cfg(test)]
pub mod test_utils {
    use std::sync::Arc;

    use crate::auth::session::SESSION_COOKIE;
    use crate::roster::{assign_supervisor, create_user, NewProfile, NewUser};
    use crate::router::create_router;
    use crate::schemas::{AppState, Settings};
    use crate::templates::build_templates;
    use axum::Router;
    use axum_test::{TestResponse, TestServer};
    use cookie::Cookie;
    use migration::{Migrator, MigratorTrait};
    use model::entities::user;
    use sea_orm::{Database, DatabaseConnection};
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    /// Password shared by every seeded account
    pub const TEST_PASSWORD: &str = "correct horse battery staple";

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing around an existing database
    pub fn test_app_state(db: DatabaseConnection) -> AppState {
        let templates = build_templates().expect("Failed to compile templates");
        AppState {
            db,
            templates: Arc::new(templates),
            settings: Arc::new(Settings::default()),
        }
    }

    /// Create AppState for testing
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;
        test_app_state(db)
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is determined by the RUST_LOG environment variable,
    /// defaulting to WARN if not set.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr) // Output to stderr, which is captured by tests
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        let _guard = init_test_tracing();

        let state = setup_test_app_state().await;
        create_router(state)
    }

    /// The people of a small internship programme.
    ///
    /// alice is supervised by bob (academic) and dave (industry). erin is a
    /// student nobody supervises yet. carol is an academic supervisor with an
    /// empty roster.
    pub struct Campus {
        pub alice: user::Model,
        pub erin: user::Model,
        pub bob: user::Model,
        pub carol: user::Model,
        pub dave: user::Model,
    }

    async fn seed_user(db: &DatabaseConnection, username: &str, first_name: &str, profile: NewProfile) -> user::Model {
        let mut new_user = NewUser::new(username, TEST_PASSWORD, profile);
        new_user.first_name = first_name.to_string();
        new_user.last_name = "Tester".to_string();
        create_user(db, new_user)
            .await
            .expect("Failed to create test user")
    }

    pub async fn seed_campus(db: &DatabaseConnection) -> Campus {
        let alice = seed_user(
            db,
            "alice",
            "Alice",
            NewProfile::Student {
                course: "Computer Science".into(),
            },
        )
        .await;
        let erin = seed_user(
            db,
            "erin",
            "Erin",
            NewProfile::Student {
                course: "Mechanical Engineering".into(),
            },
        )
        .await;
        let bob = seed_user(
            db,
            "bob",
            "Bob",
            NewProfile::AcademicSupervisor {
                designation: "Senior Lecturer".into(),
            },
        )
        .await;
        let carol = seed_user(
            db,
            "carol",
            "Carol",
            NewProfile::AcademicSupervisor {
                designation: "Lecturer".into(),
            },
        )
        .await;
        let dave = seed_user(
            db,
            "dave",
            "Dave",
            NewProfile::IndustrySupervisor {
                company: "Acme Ltd".into(),
            },
        )
        .await;

        assign_supervisor(db, "alice", "bob")
            .await
            .expect("Failed to assign academic supervisor");
        assign_supervisor(db, "alice", "dave")
            .await
            .expect("Failed to assign industry supervisor");

        Campus {
            alice,
            erin,
            bob,
            carol,
            dave,
        }
    }

    /// A running test server over a seeded database
    pub struct TestApp {
        pub server: TestServer,
        pub db: DatabaseConnection,
        pub campus: Campus,
    }

    pub async fn spawn_test_app() -> TestApp {
        let state = setup_test_app_state().await;
        let db = state.db.clone();
        let campus = seed_campus(&db).await;
        let server = TestServer::new(create_router(state)).expect("Failed to start test server");
        TestApp { server, db, campus }
    }

    impl TestApp {
        /// Log in through the login form and return the session cookie
        pub async fn login(&self, username: &str) -> Cookie<'static> {
            let response = self
                .server
                .post("/login/")
                .form(&[("username", username), ("password", TEST_PASSWORD)])
                .await;
            assert_eq!(
                response.status_code(),
                axum::http::StatusCode::SEE_OTHER,
                "login as {} failed: {}",
                username,
                response.text()
            );
            response.cookie(SESSION_COOKIE)
        }

        /// Fetch a form page and pull the CSRF token out of it
        pub async fn csrf_token(&self, session: &Cookie<'static>, path: &str) -> String {
            let response = self.server.get(path).add_cookie(session.clone()).await;
            csrf_token_from(&response.text())
        }
    }

    /// The value of the hidden `csrf_token` input in a rendered form
    pub fn csrf_token_from(html: &str) -> String {
        let marker = "name=\"csrf_token\" value=\"";
        let start = html.find(marker).expect("page has no CSRF field") + marker.len();
        let end = html[start..].find('"').expect("unterminated CSRF value");
        html[start..start + end].to_string()
    }

    /// Target of a redirect response
    pub fn location(response: &TestResponse) -> String {
        response
            .headers()
            .get("location")
            .expect("response has no Location header")
            .to_str()
            .expect("Location header is not ASCII")
            .to_string()
    }
}
