use super::env_flag;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub per_second: u64,
    pub burst_size: u32,
}

impl RateLimitRule {
    const fn new(per_second: u64, burst_size: u32) -> Self {
        Self {
            per_second,
            burst_size,
        }
    }
}

/// Route groups that get their own governor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteGroup {
    /// Registration and login.
    Auth,
    /// Unauthenticated reads (photo fetch).
    Public,
    /// Everything behind a session.
    Protected,
}

impl RouteGroup {
    fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "auth" => Some(RouteGroup::Auth),
            "public" | "public_read" | "public-read" => Some(RouteGroup::Public),
            "protected" => Some(RouteGroup::Protected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub auth: RateLimitRule,
    pub public_read: RateLimitRule,
    pub protected: RateLimitRule,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auth: RateLimitRule::new(5, 10),
            public_read: RateLimitRule::new(30, 60),
            protected: RateLimitRule::new(10, 20),
        }
    }
}

impl RateLimitConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.enabled = env_flag("RATE_LIMIT_ENABLED", cfg.enabled);

        if let Ok(raw) = env::var("RATE_LIMIT_CONFIG") {
            if let Err(err) = cfg.apply(&raw) {
                tracing::warn!("Invalid RATE_LIMIT_CONFIG '{}': {}", raw, err);
                let enabled = cfg.enabled;
                cfg = Self {
                    enabled,
                    ..Self::default()
                };
            }
        }

        cfg
    }

    /// Apply either a global rule (`"10:20"`) or grouped rules
    /// (`"auth=5:10,public=30:60,protected=10:20"`).
    fn apply(&mut self, raw: &str) -> Result<(), String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err("empty value".to_string());
        }

        if !trimmed.contains('=') {
            let rule = parse_rule(trimmed)?;
            self.auth = rule;
            self.public_read = rule;
            self.protected = rule;
            return Ok(());
        }

        for item in trimmed.split(',').map(str::trim).filter(|i| !i.is_empty()) {
            let (name, raw_rule) = item
                .split_once('=')
                .ok_or_else(|| format!("invalid item '{}', expected name=per:burst", item))?;
            let rule = parse_rule(raw_rule.trim())?;
            match RouteGroup::parse(name) {
                Some(RouteGroup::Auth) => self.auth = rule,
                Some(RouteGroup::Public) => self.public_read = rule,
                Some(RouteGroup::Protected) => self.protected = rule,
                None => {
                    return Err(format!(
                        "unknown group '{}', expected auth/public/protected",
                        name.trim()
                    ))
                }
            }
        }
        Ok(())
    }
}

fn parse_rule(raw: &str) -> Result<RateLimitRule, String> {
    let (per_second_raw, burst_raw) = raw
        .split_once(':')
        .ok_or_else(|| format!("invalid rule '{}', expected per:burst", raw))?;

    let per_second: u64 = per_second_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid per_second '{}'", per_second_raw.trim()))?;
    let burst_size: u32 = burst_raw
        .trim()
        .parse()
        .map_err(|_| format!("invalid burst_size '{}'", burst_raw.trim()))?;

    if per_second == 0 || burst_size == 0 {
        return Err("per_second and burst_size must be > 0".to_string());
    }

    Ok(RateLimitRule::new(per_second, burst_size))
}
