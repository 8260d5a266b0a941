use sqlx::PgPool;
use std::sync::Arc;
use motorpool::domain::entities::NewUser;
use motorpool::domain::repositories::UserRepository;
use motorpool::error::AppError;
use motorpool::infrastructure::persistence::PgUserRepository;

fn new_user(username: &str, is_admin: bool) -> NewUser {
    NewUser {
        username: username.to_string(),
        password_hash: "$argon2id$v=19$m=1024,t=1,p=1$c2FsdA$aGFzaA".to_string(),
        is_admin,
    }
}

#[sqlx::test(migrations = "./migrations/users")]
async fn test_create_and_find(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));

    let created = repo.create(new_user("henry", true)).await.unwrap();
    let found = repo.find_by_username("henry").await.unwrap().unwrap();

    assert_eq!(found.id, created.id);
    assert!(found.is_admin);
    assert_eq!(found.role(), "admin");
}

#[sqlx::test(migrations = "./migrations/users")]
async fn test_find_missing(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));

    assert!(repo.find_by_username("nobody").await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations/users")]
async fn test_duplicate_username_is_validation_error(pool: PgPool) {
    let repo = PgUserRepository::new(Arc::new(pool));
    repo.create(new_user("iris", false)).await.unwrap();

    let err = repo.create(new_user("iris", false)).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(ref m) if m == "Username already exists"));
}
