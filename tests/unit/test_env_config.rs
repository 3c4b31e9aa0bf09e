//! Environment-driven JWT configuration tests. These mutate process
//! environment variables, so they run serialized.

use serial_test::serial;
use uuid::Uuid;

use system_design_api::services::jwt_service::JwtService;

fn set_env(key: &str, value: &str) {
    // SAFETY: tests touching the environment are #[serial], so no other
    // thread reads or writes env vars concurrently.
    unsafe { std::env::set_var(key, value) }
}

fn remove_env(key: &str) {
    // SAFETY: see set_env.
    unsafe { std::env::remove_var(key) }
}

#[test]
#[serial]
fn test_from_env_uses_configured_secret() {
    set_env("APP_ENV", "development");
    set_env("JWT_SECRET", "a-test-secret-that-is-32-chars-long!!");

    let service = JwtService::from_env();
    let pair = service
        .generate_token_pair(Uuid::new_v4(), "env@example.com")
        .unwrap();
    assert!(service.validate_access_token(&pair.access_token).is_ok());

    // A service with a different secret must reject the token.
    let other = JwtService::new("another-secret-that-is-32-chars-long");
    assert!(other.validate_access_token(&pair.access_token).is_err());

    remove_env("JWT_SECRET");
    remove_env("APP_ENV");
}

#[test]
#[serial]
fn test_from_env_development_fallback_without_secret() {
    set_env("APP_ENV", "development");
    remove_env("JWT_SECRET");

    // Falls back to the development secret instead of panicking.
    let service = JwtService::from_env();
    let pair = service
        .generate_token_pair(Uuid::new_v4(), "dev@example.com")
        .unwrap();
    let claims = service.validate_access_token(&pair.access_token).unwrap();
    assert_eq!(claims.email, "dev@example.com");

    remove_env("APP_ENV");
}
