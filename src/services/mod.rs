pub mod analytics_service;
pub mod auth_service;
pub mod booking_service;
pub mod invoice_service;
pub mod notification_service;
pub mod project_service;
pub mod review_service;
pub mod ticket_service;
pub mod token_service;
pub mod user_service;

use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, Select};

use crate::{
    error::{AppError, AppResult},
    response::Meta,
    routes::params::Pagination,
};

/// Runs `finder` for one page and returns the rows with their paging meta.
pub(crate) async fn fetch_page<E, C>(
    finder: Select<E>,
    db: &C,
    pagination: &Pagination,
) -> AppResult<(Vec<E::Model>, Meta)>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let (page, per_page) = pagination.normalize();
    let paginator = finder.paginate(db, per_page);
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page - 1).await?;
    Ok((items, Meta::new(page, per_page, total)))
}

/// Trims `value` and rejects it when empty.
pub(crate) fn require_text(field: &str, value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Trims optional free text, mapping blank input to `None`.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Lowercases and trims an address, then checks it looks like `local@domain.tld`.
pub(crate) fn normalize_email(value: &str) -> AppResult<String> {
    let email = value.trim().to_lowercase();
    let invalid = || AppError::BadRequest("Please use a valid email address".into());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(email),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_lowercased_and_trimmed() {
        assert_eq!(normalize_email("  Ann@X.com ").unwrap(), "ann@x.com");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for bad in ["", "ann", "ann@", "@x.com", "ann@x", "a n@x.com", "a@b@c.com", "ann@.com"] {
            assert!(normalize_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn required_text_must_not_be_blank() {
        assert_eq!(require_text("name", " Ann ").unwrap(), "Ann");
        assert!(matches!(
            require_text("name", "   "),
            Err(AppError::BadRequest(msg)) if msg == "name is required"
        ));
        assert_eq!(optional_text(Some("  ".into())), None);
    }
}
