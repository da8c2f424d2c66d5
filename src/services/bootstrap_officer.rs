use crate::config::env_flag;
use crate::domain::NewOfficer;
use crate::error::AppResult;
use crate::repository::Storage;
use crate::utils::hash_password;
use std::env;

#[derive(Debug, Clone)]
pub struct BootstrapOfficerConfig {
    pub badge_number: String,
    pub station: String,
    pub password: String,
}

impl BootstrapOfficerConfig {
    pub fn from_env() -> Option<Self> {
        if !env_flag("BOOTSTRAP_OFFICER_ENABLED", false) {
            return None;
        }

        let read = |name: &str| {
            env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Some(Self {
            badge_number: read("BOOTSTRAP_OFFICER_BADGE")?,
            station: read("BOOTSTRAP_OFFICER_STATION")?,
            password: env::var("BOOTSTRAP_OFFICER_PASSWORD").ok()?,
        })
    }
}

/// Make sure the configured root officer exists and is approved, so there is
/// always someone able to approve the next registration.
pub async fn ensure_bootstrap_officer(storage: &Storage, cfg: &BootstrapOfficerConfig) -> AppResult<()> {
    if let Some(existing) = storage
        .accounts
        .find_officer_by_badge(&cfg.badge_number)
        .await?
    {
        if !existing.approved {
            storage.accounts.approve_officer(existing.id, None).await?;
            tracing::info!(officer_id = existing.id, "bootstrap officer approved");
        }
        return Ok(());
    }

    let password_hash = hash_password(&cfg.password)?;
    let officer = storage
        .accounts
        .insert_officer(NewOfficer {
            badge_number: cfg.badge_number.clone(),
            station: cfg.station.clone(),
            password_hash,
            approved: true,
        })
        .await?;
    tracing::info!(officer_id = officer.id, "bootstrap officer created");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> BootstrapOfficerConfig {
        BootstrapOfficerConfig {
            badge_number: "ROOT-1".into(),
            station: "Control Room".into(),
            password: "root-password".into(),
        }
    }

    #[tokio::test]
    async fn creates_an_approved_officer_once() {
        let storage = Storage::in_memory();
        ensure_bootstrap_officer(&storage, &cfg()).await.unwrap();
        ensure_bootstrap_officer(&storage, &cfg()).await.unwrap();

        let officer = storage
            .accounts
            .find_officer_by_badge("ROOT-1")
            .await
            .unwrap()
            .unwrap();
        assert!(officer.approved);
        assert!(storage.accounts.find_officer(2).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn approves_an_existing_pending_officer() {
        let storage = Storage::in_memory();
        storage
            .accounts
            .insert_officer(NewOfficer {
                badge_number: "ROOT-1".into(),
                station: "Control Room".into(),
                password_hash: "x".into(),
                approved: false,
            })
            .await
            .unwrap();

        ensure_bootstrap_officer(&storage, &cfg()).await.unwrap();
        let officer = storage.accounts.find_officer(1).await.unwrap().unwrap();
        assert!(officer.approved);
    }
}
