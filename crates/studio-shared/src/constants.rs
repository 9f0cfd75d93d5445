//! Application-wide constants

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_STORAGE_PATH: &str = ".studio/session.json";

/// Storage slots owned by the token store.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

pub const LOGIN_PATH: &str = "/api/v1/users/token/";
pub const REGISTER_PATH: &str = "/api/v1/users/register/";
pub const PROFILE_PATH: &str = "/api/v1/users/me/";
pub const PROFILE_UPDATE_PATH: &str = "/api/v1/users/me/update/";
pub const ORDERS_PATH: &str = "/api/v1/orders/";
pub const TARIFFS_PATH: &str = "/api/v1/tariffs/";

pub const NETWORK_ERROR_DETAIL: &str = "Network error";
pub const AUTH_REQUIRED_MESSAGE: &str = "Authentication required";
pub const AUTH_EXPIRED_MESSAGE: &str = "Authentication expired";

pub const PROFILE_FETCH_FAILED: &str = "Failed to fetch user profile";
pub const PROFILE_UPDATE_FAILED: &str = "Failed to update profile";
pub const ORDERS_FETCH_FAILED: &str = "Failed to fetch user orders";
pub const ORDER_FETCH_FAILED: &str = "Failed to fetch order";
pub const ORDER_CREATE_FAILED: &str = "Failed to create order";
pub const TARIFFS_FETCH_FAILED: &str = "Failed to fetch tariffs";
pub const TARIFF_FETCH_FAILED: &str = "Failed to fetch tariff";
