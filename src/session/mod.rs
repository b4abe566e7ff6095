//! Consent Session Management
//!
//! 複数の同意セッションを分離して保持するインメモリのセッション管理。
//! 永続化は行いません（プロセス終了とともに破棄）。

pub mod manager;
pub mod types;

pub use manager::{SessionHandle, SessionManager};
pub use types::SessionId;
