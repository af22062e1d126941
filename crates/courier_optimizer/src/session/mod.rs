pub mod error;
pub mod session_params;
pub mod session_state;
pub mod shared_session;
pub mod summary;
pub mod vrp_session;
