use super::env_parse;
use chrono::{FixedOffset, Offset, Utc};

/// Settings for the dashboard summary.
#[derive(Debug, Clone, Copy)]
pub struct DashboardConfig {
    /// Monitoring devices reported online. Supplied by the camera network,
    /// not derived from report data.
    pub cameras_online: u32,
    /// Offset used to decide what "today" means for `found_today`.
    pub utc_offset_minutes: i32,
    pub alert_feed_capacity: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            cameras_online: 247,
            utc_offset_minutes: 330,
            alert_feed_capacity: 500,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cameras_online: env_parse("CAMERAS_ONLINE", defaults.cameras_online),
            utc_offset_minutes: env_parse(
                "DASHBOARD_UTC_OFFSET_MINUTES",
                defaults.utc_offset_minutes,
            ),
            alert_feed_capacity: env_parse("ALERT_FEED_CAPACITY", defaults.alert_feed_capacity)
                .max(1),
        }
    }

    /// Falls back to UTC for offsets outside +/-24h.
    pub fn offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}
