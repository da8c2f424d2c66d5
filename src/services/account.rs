use crate::{
    config::auth::AuthConfig,
    domain::{NewOfficer, NewReportingUser, Officer, ReportingUser, Role},
    error::{AppError, AppResult},
    middleware::AuthSession,
    repository::Storage,
    utils::{encode_session_token, hash_password, password::check_password_strength, verify_password},
};
use chrono::NaiveDate;

/// Profile fields collected when a citizen registers.
#[derive(Debug, Clone)]
pub struct UserRegistration {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
}

/// Whoever is behind a session.
#[derive(Debug, Clone)]
pub enum Account {
    User(ReportingUser),
    Officer(Officer),
}

pub struct AccountService {
    storage: Storage,
    config: AuthConfig,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trimmed value of a mandatory profile field; blank input is rejected.
fn required(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{} must not be blank", field)));
    }
    Ok(value.to_string())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl AccountService {
    pub fn new(storage: Storage, config: AuthConfig) -> Self {
        Self { storage, config }
    }

    pub async fn register_user(&self, input: UserRegistration) -> AppResult<ReportingUser> {
        let full_name = required("full_name", &input.full_name)?;
        let phone = required("phone", &input.phone)?;
        let email = normalize_email(&input.email);
        check_password_strength(&input.password).map_err(AppError::Validation)?;

        if self
            .storage
            .accounts
            .find_user_by_email(&email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .storage
            .accounts
            .insert_user(NewReportingUser {
                full_name,
                email,
                password_hash,
                phone,
                address: non_blank(input.address),
                date_of_birth: input.date_of_birth,
                emergency_contact: non_blank(input.emergency_contact),
                emergency_phone: non_blank(input.emergency_phone),
            })
            .await?;

        tracing::info!(user_id = user.id, "reporting user registered");
        Ok(user)
    }

    /// Returns the user and a fresh session token.
    pub async fn login_user(&self, email: &str, password: &str) -> AppResult<(ReportingUser, String)> {
        let user = self
            .storage
            .accounts
            .find_user_by_email(&normalize_email(email))
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash) {
            return Err(AppError::Unauthorized);
        }

        let token = encode_session_token(user.id, Role::User)?;
        Ok((user, token))
    }

    pub async fn register_officer(
        &self,
        badge_number: &str,
        station: &str,
        password: &str,
    ) -> AppResult<Officer> {
        let badge_number = required("badge_number", badge_number)?;
        let station = required("station", station)?;
        check_password_strength(password).map_err(AppError::Validation)?;

        if self
            .storage
            .accounts
            .find_officer_by_badge(&badge_number)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Badge number already registered".to_string(),
            ));
        }

        let password_hash = hash_password(password)?;
        let officer = self
            .storage
            .accounts
            .insert_officer(NewOfficer {
                badge_number,
                station,
                password_hash,
                approved: self.config.auto_approve_officers,
            })
            .await?;

        tracing::info!(
            officer_id = officer.id,
            approved = officer.approved,
            "officer registered"
        );
        Ok(officer)
    }

    /// Credentials are checked before the approval flag, so an unapproved
    /// officer only learns about the pending approval with the right secret.
    pub async fn login_officer(
        &self,
        badge_number: &str,
        station: &str,
        password: &str,
    ) -> AppResult<(Officer, String)> {
        let officer = self
            .storage
            .accounts
            .find_officer_by_badge(badge_number.trim())
            .await?
            .filter(|o| o.station == station.trim())
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &officer.password_hash) {
            return Err(AppError::Unauthorized);
        }

        if !officer.approved {
            return Err(AppError::Forbidden(
                "Officer account is awaiting approval".to_string(),
            ));
        }

        let token = encode_session_token(officer.id, Role::Officer)?;
        Ok((officer, token))
    }

    pub async fn approve_officer(&self, approver_id: i32, officer_id: i32) -> AppResult<Officer> {
        let officer = self
            .storage
            .accounts
            .approve_officer(officer_id, Some(approver_id))
            .await?;
        tracing::info!(officer_id, approver_id, "officer approved");
        Ok(officer)
    }

    pub async fn current_account(&self, session: &AuthSession) -> AppResult<Account> {
        match session.role {
            Role::User => self
                .storage
                .accounts
                .find_user(session.account_id)
                .await?
                .map(Account::User)
                .ok_or(AppError::NotFound),
            Role::Officer => self
                .storage
                .accounts
                .find_officer(session.account_id)
                .await?
                .map(Account::Officer)
                .ok_or(AppError::NotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_jwt() {
        let _ = crate::utils::jwt::init_jwt_config(crate::config::jwt::JwtConfig {
            secret: "a_very_long_secret_key_that_is_at_least_32_chars".to_string(),
            session_expiry: 3600,
        });
    }

    fn alice(email: &str) -> UserRegistration {
        UserRegistration {
            full_name: "Alice".into(),
            email: email.into(),
            password: "password123".into(),
            phone: "9999999999".into(),
            address: Some("  ".into()),
            date_of_birth: None,
            emergency_contact: None,
            emergency_phone: None,
        }
    }

    #[tokio::test]
    async fn email_is_normalized_and_unique() {
        init_jwt();
        let service = AccountService::new(Storage::in_memory(), AuthConfig::default());

        let user = service
            .register_user(alice("  Alice@Example.com "))
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.address, None);

        let dup = service.register_user(alice("ALICE@example.com")).await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));

        let (logged_in, token) = service
            .login_user("alice@EXAMPLE.com", "password123")
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
        assert!(!token.is_empty());

        assert!(matches!(
            service.login_user("alice@example.com", "nope").await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn unapproved_officer_cannot_log_in() {
        init_jwt();
        let service = AccountService::new(Storage::in_memory(), AuthConfig::default());
        let officer = service
            .register_officer("B-100", "Central", "password123")
            .await
            .unwrap();
        assert!(!officer.approved);

        assert!(matches!(
            service.login_officer("B-100", "Central", "wrong-pass").await,
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            service.login_officer("B-100", "Central", "password123").await,
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            service.login_officer("B-100", "North", "password123").await,
            Err(AppError::Unauthorized)
        ));

        service.approve_officer(99, officer.id).await.unwrap();
        let (_, token) = service
            .login_officer("B-100", "Central", "password123")
            .await
            .unwrap();
        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn duplicate_badge_conflicts() {
        let service = AccountService::new(
            Storage::in_memory(),
            AuthConfig {
                auto_approve_officers: true,
            },
        );
        let first = service
            .register_officer("B-7", "Central", "password123")
            .await
            .unwrap();
        assert!(first.approved);
        assert!(matches!(
            service.register_officer(" B-7 ", "East", "password123").await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn blank_profile_fields_are_rejected() {
        let service = AccountService::new(Storage::in_memory(), AuthConfig::default());

        let mut blank_name = alice("blank-name@example.com");
        blank_name.full_name = "   ".into();
        assert!(matches!(
            service.register_user(blank_name).await,
            Err(AppError::Validation(_))
        ));

        let mut blank_phone = alice("blank-phone@example.com");
        blank_phone.phone = "\t ".into();
        assert!(matches!(
            service.register_user(blank_phone).await,
            Err(AppError::Validation(_))
        ));

        assert!(matches!(
            service.register_officer("B-9", "   ", "password123").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            service.register_officer("  ", "Central", "password123").await,
            Err(AppError::Validation(_))
        ));
        assert!(service
            .storage
            .accounts
            .find_user_by_email("blank-name@example.com")
            .await
            .unwrap()
            .is_none());
    }
}
