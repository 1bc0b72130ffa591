//! Cross-module tests for the identity crate
//! Flows run against the in-memory store; HTTP tests drive the router directly.

#[cfg(test)]
mod support {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tokio::sync::Notify;

    use crate::application::config::AuthConfig;
    use crate::application::{
        ActivateAccountUseCase, LoginInput, LoginUseCase, RegisterInput, RegisterUseCase,
    };
    use crate::domain::notifier::{NotifyError, VerificationMessage, VerificationNotifier};
    use crate::domain::services::CredentialHasher;
    use crate::infra::jwt::JwtTokenService;
    use crate::infra::memory::InMemoryIdentityStore;

    pub const PASSWORD: &str = "p@ss1234";

    /// Generous deadlines: Argon2 is slow in unoptimized test builds
    pub fn config() -> AuthConfig {
        AuthConfig {
            store_timeout: Duration::from_secs(30),
            hash_timeout: Duration::from_secs(30),
            ..AuthConfig::with_secret(b"identity-test-secret-0123456789!".to_vec())
        }
    }

    pub struct Harness {
        pub store: Arc<InMemoryIdentityStore>,
        pub tokens: Arc<JwtTokenService>,
        pub hasher: CredentialHasher,
        pub config: Arc<AuthConfig>,
    }

    impl Harness {
        pub fn new() -> Self {
            let config = Arc::new(config());
            let hasher = CredentialHasher::new(config.pepper(), config.hash_timeout);
            Self {
                store: Arc::new(InMemoryIdentityStore::new(hasher.clone())),
                tokens: Arc::new(JwtTokenService::from_config(&config)),
                hasher,
                config,
            }
        }

        pub fn register(&self) -> RegisterUseCase<InMemoryIdentityStore> {
            RegisterUseCase::new(self.store.clone(), self.tokens.clone(), self.config.clone())
        }

        pub fn login(&self) -> LoginUseCase<InMemoryIdentityStore> {
            LoginUseCase::new(
                self.store.clone(),
                self.tokens.clone(),
                self.hasher.clone(),
                self.config.clone(),
            )
        }

        pub fn activate(&self) -> ActivateAccountUseCase<InMemoryIdentityStore> {
            ActivateAccountUseCase::new(self.store.clone(), self.tokens.clone(), self.config.clone())
        }
    }

    pub fn candidate(username: &str, email: &str, role: &str) -> RegisterInput {
        RegisterInput {
            username: username.to_string(),
            password: PASSWORD.to_string(),
            first_name: Some("Alice".to_string()),
            last_name: Some("Liddell".to_string()),
            email: email.to_string(),
            profile_image: None,
            role: role.to_string(),
        }
    }

    pub fn alice() -> RegisterInput {
        candidate("alice", "a@x.com", "Tourist")
    }

    pub fn credentials(username: &str, password: &str) -> LoginInput {
        LoginInput {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Keeps every delivered message
    #[derive(Default)]
    pub struct Mailbox {
        pub messages: Mutex<Vec<VerificationMessage>>,
        pub delivered: Notify,
    }

    impl Mailbox {
        pub async fn next_token(&self) -> String {
            loop {
                if let Some(message) = self.messages.lock().unwrap().pop() {
                    return message.token;
                }
                tokio::time::timeout(Duration::from_secs(5), self.delivered.notified())
                    .await
                    .unwrap();
            }
        }
    }

    impl VerificationNotifier for Mailbox {
        async fn deliver_verification(
            &self,
            message: &VerificationMessage,
        ) -> Result<(), NotifyError> {
            self.messages.lock().unwrap().push(message.clone());
            self.delivered.notify_one();
            Ok(())
        }
    }

    /// Always fails
    pub struct Bounce;

    impl VerificationNotifier for Bounce {
        async fn deliver_verification(&self, _: &VerificationMessage) -> Result<(), NotifyError> {
            Err(NotifyError::Rejected(550))
        }
    }
}

#[cfg(test)]
mod flow_tests {
    use std::time::Duration;

    use super::support::*;
    use crate::application::{AccountQueryUseCase, LoginUseCase};
    use crate::domain::repository::IdentityStore;
    use crate::domain::services::CredentialHasher;
    use crate::domain::token::TokenRejection;
    use crate::domain::value_object::{
        account_id::AccountId, account_role::AccountRole, password::RawPassword,
    };
    use crate::error::AuthError;

    #[tokio::test]
    async fn test_register_stores_inactive_account_with_hashed_password() {
        let h = Harness::new();
        let output = h.register().execute(alice()).await.unwrap();

        let account = h.store.find_by_id(&output.account_id).await.unwrap().unwrap();
        assert!(!account.is_active);
        assert_eq!(account.role, AccountRole::Tourist);
        assert_ne!(account.password_hash.as_phc_string(), PASSWORD);
        assert!(
            h.hasher
                .verify(
                    RawPassword::presented(PASSWORD.to_string()),
                    account.password_hash.clone()
                )
                .await
                .unwrap()
        );

        let profile = h.store.profile_of(&output.account_id).await.unwrap();
        assert_eq!(profile.account_id, output.account_id);
        assert_eq!(profile.email.as_str(), "a@x.com");
        assert_eq!(output.email.as_str(), "a@x.com");
    }

    #[tokio::test]
    async fn test_register_issues_verification_token_for_new_account() {
        let h = Harness::new();
        let output = h.register().execute(alice()).await.unwrap();

        let claims = h.tokens.validate_verification(&output.verification_token).unwrap();
        assert_eq!(claims.sub, output.account_id);
    }

    #[tokio::test]
    async fn test_register_rejects_unknown_role_before_storage() {
        let h = Harness::new();
        let result = h
            .register()
            .execute(candidate("alice", "a@x.com", "Administrator"))
            .await;

        assert!(matches!(result, Err(AuthError::InvalidInput(_))));
        assert_eq!(h.store.account_count().await, 0);
    }

    #[tokio::test]
    async fn test_register_role_is_case_insensitive() {
        let h = Harness::new();
        let output = h
            .register()
            .execute(candidate("writer", "w@x.com", "aUtHoR"))
            .await
            .unwrap();

        let account = h.store.find_by_id(&output.account_id).await.unwrap().unwrap();
        assert_eq!(account.role, AccountRole::Author);
    }

    #[tokio::test]
    async fn test_register_duplicate_username_or_email() {
        let h = Harness::new();
        h.register().execute(alice()).await.unwrap();

        let same_name = h
            .register()
            .execute(candidate("alice", "other@x.com", "Author"))
            .await;
        assert!(matches!(same_name, Err(AuthError::DuplicateIdentity)));

        let same_email = h
            .register()
            .execute(candidate("bob", "a@x.com", "Author"))
            .await;
        assert!(matches!(same_email, Err(AuthError::DuplicateIdentity)));

        assert_eq!(h.store.account_count().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_same_username_one_wins() {
        const ATTEMPTS: usize = 8;
        let h = Harness::new();

        let mut handles = Vec::with_capacity(ATTEMPTS);
        for i in 0..ATTEMPTS {
            let use_case = h.register();
            handles.push(tokio::spawn(async move {
                use_case
                    .execute(candidate("racer", &format!("racer{i}@x.com"), "Author"))
                    .await
            }));
        }

        let mut won = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => won += 1,
                Err(AuthError::DuplicateIdentity) => duplicates += 1,
                Err(e) => panic!("unexpected failure: {e:?}"),
            }
        }

        assert_eq!(won, 1);
        assert_eq!(duplicates, ATTEMPTS - 1);
        assert_eq!(h.store.account_count().await, 1);
    }

    #[tokio::test]
    async fn test_alice_login_gated_until_activation() {
        let h = Harness::new();
        let output = h.register().execute(alice()).await.unwrap();

        let before = h.login().execute(credentials("alice", PASSWORD)).await;
        assert!(matches!(before, Err(AuthError::AccountNotActive)));

        assert!(h.store.activate(&output.account_id).await.unwrap());

        let session = h
            .login()
            .execute(credentials("alice", PASSWORD))
            .await
            .unwrap();
        assert_eq!(session.account_id, output.account_id);

        let claims = h.tokens.validate_session(&session.session_token).unwrap();
        assert_eq!(claims.role, AccountRole::Tourist);
        assert_eq!(claims.role.code(), "Tourist");
        assert_eq!(claims.username.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_inactive_account_with_wrong_password_is_still_not_active() {
        let h = Harness::new();
        h.register().execute(alice()).await.unwrap();

        let result = h.login().execute(credentials("alice", "wrong-pass")).await;
        assert!(matches!(result, Err(AuthError::AccountNotActive)));
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_look_the_same() {
        let h = Harness::new();
        let output = h.register().execute(alice()).await.unwrap();
        h.store.activate(&output.account_id).await.unwrap();

        let Err(unknown) = h.login().execute(credentials("nobody", PASSWORD)).await else {
            panic!("unknown user signed in");
        };
        let Err(wrong) = h
            .login()
            .execute(credentials("alice", "not-the-password"))
            .await
        else {
            panic!("wrong password signed in");
        };

        assert!(matches!(unknown, AuthError::CredentialsInvalid));
        assert!(matches!(wrong, AuthError::CredentialsInvalid));
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(unknown.status_code(), wrong.status_code());
    }

    #[tokio::test]
    async fn test_unknown_user_still_verifies_a_password() {
        let h = Harness::new();
        // No time for Argon2: only a branch that hashes can run out of it
        let login = LoginUseCase::new(
            h.store.clone(),
            h.tokens.clone(),
            CredentialHasher::new(None, Duration::ZERO),
            h.config.clone(),
        );

        let result = login.execute(credentials("nobody", PASSWORD)).await;
        assert!(matches!(result, Err(AuthError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_login_does_not_mutate_account() {
        let h = Harness::new();
        let output = h.register().execute(alice()).await.unwrap();
        h.store.activate(&output.account_id).await.unwrap();

        let before = h.store.find_by_id(&output.account_id).await.unwrap().unwrap();
        h.login()
            .execute(credentials("alice", PASSWORD))
            .await
            .unwrap();
        let after = h.store.find_by_id(&output.account_id).await.unwrap().unwrap();

        assert_eq!(
            before.password_hash.as_phc_string(),
            after.password_hash.as_phc_string()
        );
        assert_eq!(before.is_active, after.is_active);
    }

    #[tokio::test]
    async fn test_activation_with_verification_token() {
        let h = Harness::new();
        let output = h.register().execute(alice()).await.unwrap();
        let id = output.account_id.to_string();

        let activated = h
            .activate()
            .execute(&output.verification_token, Some(&id))
            .await
            .unwrap();
        assert_eq!(activated, output.account_id);

        assert!(
            h.login()
                .execute(credentials("alice", PASSWORD))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_activation_rejects_other_subject() {
        let h = Harness::new();
        let output = h.register().execute(alice()).await.unwrap();
        let other = AccountId::new().to_string();

        let result = h
            .activate()
            .execute(&output.verification_token, Some(&other))
            .await;
        assert!(matches!(
            result,
            Err(AuthError::TokenInvalid(TokenRejection::SubjectMismatch))
        ));

        let account = h.store.find_by_id(&output.account_id).await.unwrap().unwrap();
        assert!(!account.is_active);
    }

    #[tokio::test]
    async fn test_session_token_cannot_activate() {
        let h = Harness::new();
        let output = h.register().execute(alice()).await.unwrap();
        h.store.activate(&output.account_id).await.unwrap();
        let session = h
            .login()
            .execute(credentials("alice", PASSWORD))
            .await
            .unwrap();

        let result = h.activate().execute(&session.session_token, None).await;
        assert!(matches!(result, Err(AuthError::TokenInvalid(_))));
    }

    #[tokio::test]
    async fn test_lookup_by_id_set_dedupes_and_skips_unknown() {
        let h = Harness::new();
        let alice = h.register().execute(alice()).await.unwrap().account_id;
        let bob = h
            .register()
            .execute(candidate("bob", "b@x.com", "Author"))
            .await
            .unwrap()
            .account_id;

        let query = AccountQueryUseCase::new(h.store.clone(), h.config.clone());
        let ids = format!("{alice},{bob},{alice},{}", AccountId::new());
        let found = query.get_many(&ids).await.unwrap();

        let mut found: Vec<_> = found.into_iter().map(|a| a.account_id).collect();
        let mut expected = vec![alice, bob];
        found.sort_by_key(|id| id.to_string());
        expected.sort_by_key(|id| id.to_string());
        assert_eq!(found, expected);
    }

    #[tokio::test]
    async fn test_lookup_by_id_only_sees_active_accounts() {
        let h = Harness::new();
        let id = h.register().execute(alice()).await.unwrap().account_id;
        let query = AccountQueryUseCase::new(h.store.clone(), h.config.clone());

        assert!(matches!(
            query.get(&id.to_string()).await,
            Err(AuthError::NotFound)
        ));
        assert!(query.list_active().await.unwrap().is_empty());

        h.store.activate(&id).await.unwrap();
        assert_eq!(query.get(&id.to_string()).await.unwrap().account_id, id);
        assert_eq!(query.list_active().await.unwrap().len(), 1);
    }
}

#[cfg(test)]
mod http_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::support::*;
    use crate::application::NotificationDispatcher;
    use crate::application::config::AuthConfig;
    use crate::domain::repository::IdentityStore;
    use crate::domain::value_object::account_id::AccountId;
    use crate::infra::memory::InMemoryIdentityStore;
    use crate::presentation::handlers::AuthAppState;
    use crate::presentation::router::identity_router;

    struct App {
        router: Router,
        store: Arc<InMemoryIdentityStore>,
        mailbox: Arc<Mailbox>,
    }

    fn app_with(config: AuthConfig) -> App {
        let config = Arc::new(config);
        let mailbox = Arc::new(Mailbox::default());
        let (dispatcher, _worker) =
            NotificationDispatcher::spawn(mailbox.clone(), Duration::from_secs(5), 16);

        let state = AuthAppState::new(
            Arc::new(InMemoryIdentityStore::new(
                crate::domain::services::CredentialHasher::new(
                    config.pepper(),
                    config.hash_timeout,
                ),
            )),
            config,
            dispatcher,
        );
        App {
            store: state.store.clone(),
            router: identity_router(state),
            mailbox,
        }
    }

    fn app() -> App {
        app_with(config())
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn alice_json() -> String {
        json!({
            "username": "alice",
            "password": PASSWORD,
            "firstName": "Alice",
            "lastName": "Liddell",
            "email": "a@x.com",
            "role": "Tourist"
        })
        .to_string()
    }

    fn login_json() -> String {
        json!({ "username": "alice", "password": PASSWORD }).to_string()
    }

    #[tokio::test]
    async fn test_register_created_without_token_in_body() {
        let app = app();
        let (status, body) = send(&app.router, post_json("/api/auth/register", &alice_json())).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User registered, please verify email");
        assert!(body.get("token").is_none());
        assert_eq!(app.store.account_count().await, 1);
    }

    #[tokio::test]
    async fn test_register_conflict_and_bad_requests() {
        let app = app();
        send(&app.router, post_json("/api/auth/register", &alice_json())).await;

        let (status, body) = send(&app.router, post_json("/api/auth/register", &alice_json())).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["status"], 409);

        let bad_role = json!({
            "username": "bob",
            "password": PASSWORD,
            "email": "b@x.com",
            "role": "Administrator"
        })
        .to_string();
        let (status, _) = send(&app.router, post_json("/api/auth/register", &bad_role)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app.router, post_json("/api/auth/register", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert_eq!(app.store.account_count().await, 1);
    }

    #[tokio::test]
    async fn test_full_http_lifecycle() {
        let app = app();
        let (status, _) = send(&app.router, post_json("/api/auth/register", &alice_json())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = send(&app.router, post_json("/api/auth/login", &login_json())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let token = app.mailbox.next_token().await;
        let (status, body) = send(
            &app.router,
            get(&format!("/api/auth/verify?token={token}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());

        let (status, body) = send(&app.router, post_json("/api/auth/login", &login_json())).await;
        assert_eq!(status, StatusCode::OK);
        let id = body["id"].as_str().unwrap().to_string();
        let access_token = body["accessToken"].as_str().unwrap().to_string();
        assert!(id.parse::<AccountId>().is_ok());

        let req = Request::builder()
            .method("POST")
            .uri("/api/auth/validate")
            .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app.router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["userID"], id.as_str());
        assert_eq!(body["username"], "alice");
        assert_eq!(body["role"], "Tourist");
    }

    #[tokio::test]
    async fn test_login_unknown_user_unauthorized() {
        let app = app();
        let (status, body) = send(&app.router, post_json("/api/auth/login", &login_json())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], 401);
    }

    #[tokio::test]
    async fn test_validate_requires_bearer() {
        let app = app();

        let (status, body) = send(
            &app.router,
            Request::builder()
                .method("POST")
                .uri("/api/auth/validate")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], 401);

        let (status, _) = send(
            &app.router,
            Request::builder()
                .method("POST")
                .uri("/api/auth/validate")
                .header(header::AUTHORIZATION, "Basic YWxpY2U6cGFzcw==")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(
            &app.router,
            Request::builder()
                .method("POST")
                .uri("/api/auth/validate")
                .header(header::AUTHORIZATION, "Bearer not.a.token")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_verify_requires_token_query() {
        let app = app();
        let (status, _) = send(&app.router, get("/api/auth/verify")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_account_lookups() {
        let app = app();
        send(&app.router, post_json("/api/auth/register", &alice_json())).await;
        assert!(app.store.list_active().await.unwrap().is_empty());

        let (status, body) = send(&app.router, get("/api/user")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalCount"], 0);

        let token = app.mailbox.next_token().await;
        send(&app.router, get(&format!("/api/auth/verify?token={token}"))).await;

        let (status, body) = send(&app.router, get("/api/user")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalCount"], 1);
        assert_eq!(body["results"][0]["username"], "alice");
        assert!(body["results"][0].get("password_hash").is_none());
        let id = body["results"][0]["id"].as_str().unwrap().to_string();

        let (status, body) = send(&app.router, get(&format!("/api/user/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "Tourist");

        let (status, _) = send(&app.router, get("/api/user/not-a-uuid")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app.router, get(&format!("/api/user/{}", AccountId::new()))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(
            &app.router,
            get(&format!("/api/user/batch/{id},{id},{}", AccountId::new())),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalCount"], 1);

        let (status, _) = send(&app.router, get(&format!("/api/user/batch/{id},bogus"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_protected_account_routes_need_session() {
        let app = app_with(AuthConfig {
            protect_account_routes: true,
            ..config()
        });

        let (status, _) = send(&app.router, get("/api/user")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        send(&app.router, post_json("/api/auth/register", &alice_json())).await;
        let token = app.mailbox.next_token().await;
        send(&app.router, get(&format!("/api/auth/verify?token={token}"))).await;
        let (_, body) = send(&app.router, post_json("/api/auth/login", &login_json())).await;
        let access_token = body["accessToken"].as_str().unwrap();

        let req = Request::builder()
            .uri("/api/user")
            .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app.router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalCount"], 1);
    }

    #[tokio::test]
    async fn test_failed_delivery_keeps_registration() {
        let config = Arc::new(config());
        let (dispatcher, _worker) =
            NotificationDispatcher::spawn(Arc::new(Bounce), Duration::from_secs(1), 4);
        let store = Arc::new(InMemoryIdentityStore::new(
            crate::domain::services::CredentialHasher::new(None, config.hash_timeout),
        ));
        let router = identity_router(AuthAppState::new(store.clone(), config, dispatcher));

        let (status, _) = send(&router, post_json("/api/auth/register", &alice_json())).await;
        assert_eq!(status, StatusCode::CREATED);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.account_count().await, 1);
    }
}
