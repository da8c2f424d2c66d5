use super::env_flag;

#[derive(Debug, Clone, Copy, Default)]
pub struct AuthConfig {
    /// Approve officers at registration instead of waiting for an approving officer.
    pub auto_approve_officers: bool,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self {
            auto_approve_officers: env_flag("AUTO_APPROVE_OFFICERS", false),
        }
    }
}
