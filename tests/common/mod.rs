#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use motorpool::api::middleware::admission::Admission;
use motorpool::api::middleware::client_ip::ClientIdentityResolver;
use motorpool::api::middleware::metrics;
use motorpool::application::services::{CarService, SessionService, TokenAuthenticator};
use motorpool::domain::entities::{Car, NewCar, NewUser, User};
use motorpool::domain::identity::IdentityAuthority;
use motorpool::domain::rate_limiter::SlidingWindowLimiter;
use motorpool::domain::repositories::{CarRepository, UserRepository};
use motorpool::error::AppError;
use motorpool::infrastructure::auth::{JwtService, PasswordHasher};
use motorpool::infrastructure::identity::{HttpIdentityAuthority, LocalIdentityAuthority};
use motorpool::infrastructure::revocation::{MemoryRevocationStore, RevocationStore};
use motorpool::routes::{car_app, user_app};
use motorpool::state::AppState;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Process-wide recorder; each test binary installs it once.
pub fn metrics_handle() -> PrometheusHandle {
    static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
    HANDLE
        .get_or_init(|| metrics::install_recorder().unwrap())
        .clone()
}

#[derive(Default)]
pub struct InMemoryUsers {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == new_user.username) {
            return Err(AppError::bad_request("Username already exists"));
        }
        let user = User {
            id: users.len() as i64 + 1,
            username: new_user.username,
            password_hash: new_user.password_hash,
            is_admin: new_user.is_admin,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[derive(Default)]
pub struct InMemoryCars {
    cars: Mutex<BTreeMap<i64, Car>>,
    next_id: AtomicI64,
}

#[async_trait]
impl CarRepository for InMemoryCars {
    async fn list(&self) -> Result<Vec<Car>, AppError> {
        Ok(self.cars.lock().unwrap().values().cloned().collect())
    }

    async fn create(&self, new_car: NewCar) -> Result<Car, AppError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let car = Car::from_new(id, new_car);
        self.cars.lock().unwrap().insert(id, car.clone());
        Ok(car)
    }

    async fn update(&self, id: i64, car: NewCar) -> Result<Option<Car>, AppError> {
        let mut cars = self.cars.lock().unwrap();
        if !cars.contains_key(&id) {
            return Ok(None);
        }
        let car = Car::from_new(id, car);
        cars.insert(id, car.clone());
        Ok(Some(car))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.cars.lock().unwrap().remove(&id).is_some())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

pub struct UserHarness {
    pub server: TestServer,
    pub users: Arc<InMemoryUsers>,
    pub sessions: Arc<SessionService>,
}

/// User service over in-memory storage with a `times`-per-minute limiter.
pub fn user_server(times: u32) -> UserHarness {
    let (app, users, sessions) = user_router(times);

    UserHarness {
        server: TestServer::new(app).unwrap(),
        users,
        sessions,
    }
}

pub fn user_router(times: u32) -> (Router, Arc<InMemoryUsers>, Arc<SessionService>) {
    let users = Arc::new(InMemoryUsers::default());
    let revocations: Arc<dyn RevocationStore> = Arc::new(MemoryRevocationStore::new());
    let jwt = Arc::new(JwtService::new(JWT_SECRET, Duration::from_secs(1800)));

    let authority: Arc<dyn IdentityAuthority> =
        Arc::new(LocalIdentityAuthority::new(jwt.clone(), users.clone()));
    let admission = Admission::new(
        Arc::new(SlidingWindowLimiter::new(times, 60)),
        ClientIdentityResolver::default(),
        Arc::new(TokenAuthenticator::new(revocations.clone(), authority)),
    );

    let sessions = Arc::new(SessionService::new(
        users.clone(),
        PasswordHasher::with_params(1024, 1, 1),
        jwt,
        revocations.clone(),
    ));

    let app = user_app(
        AppState::new(sessions.clone(), revocations),
        &admission,
        metrics_handle(),
    );

    (app, users, sessions)
}

/// User service listening on a real socket, so peers are keyed by address.
/// Returns the `/api/user` base URL.
pub async fn spawn_user_service(times: u32) -> (String, Arc<SessionService>) {
    let (app, _, sessions) = user_router(times);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    (format!("http://{addr}/api/user"), sessions)
}

pub struct CarHarness {
    pub server: TestServer,
    pub cars: Arc<InMemoryCars>,
    pub revocations: Arc<MemoryRevocationStore>,
}

/// Car service over in-memory storage, authenticating against `authority_base`.
pub fn car_server(authority_base: &str, times: u32) -> CarHarness {
    car_server_with_timeout(authority_base, times, Duration::from_millis(500))
}

pub fn car_server_with_timeout(authority_base: &str, times: u32, timeout: Duration) -> CarHarness {
    let cars = Arc::new(InMemoryCars::default());
    let revocations = Arc::new(MemoryRevocationStore::new());

    let authority: Arc<dyn IdentityAuthority> =
        Arc::new(HttpIdentityAuthority::new(authority_base, timeout).unwrap());
    let admission = Admission::new(
        Arc::new(SlidingWindowLimiter::new(times, 60)),
        ClientIdentityResolver::default(),
        Arc::new(TokenAuthenticator::new(revocations.clone(), authority)),
    );

    let service = Arc::new(CarService::new(cars.clone()));
    let app = car_app(
        AppState::new(service, revocations.clone()),
        &admission,
        metrics_handle(),
    );

    CarHarness {
        server: TestServer::new(app).unwrap(),
        cars,
        revocations,
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn car_json() -> serde_json::Value {
    serde_json::json!({
        "name": "Model S",
        "brand": "Tesla",
        "image_url": "https://img.example.com/model-s.png",
        "price": 80000,
        "description": "Electric sedan",
        "is_available": true
    })
}
