use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use analytics_portal_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        Reviews, Users,
        reviews::ActiveModel as ReviewActive,
        users::{ActiveModel as UserActive, Column as UserCol},
    },
    models::{NotificationChannel, Role},
    services::{auth_service::hash_password, user_service::profile_completion},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&orm, &config, "Admin", "admin@example.com", "admin123", Role::Admin).await?;
    let user_id =
        ensure_user(&orm, &config, "Demo Customer", "user@example.com", "user123", Role::Customer).await?;
    seed_reviews(&orm).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

/// Inserts a verified account, or re-applies the role if the email exists.
async fn ensure_user(
    orm: &DatabaseConnection,
    config: &AppConfig,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    let now = Utc::now();

    if let Some(existing) = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(orm)
        .await?
    {
        let id = existing.id;
        let mut active: UserActive = existing.into();
        active.role = Set(role.as_str().to_string());
        active.is_verified = Set(true);
        active.verification_token = Set(None);
        active.updated_at = Set(now.into());
        active.update(orm).await?;
        println!("Ensured user {email} (role={role})");
        return Ok(id);
    }

    let channels = vec![NotificationChannel::Email.as_str().to_string()];
    let password_hash = hash_password(password)?;
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        role: Set(role.as_str().to_string()),
        is_verified: Set(true),
        verification_token: Set(None),
        company: Set(None),
        profile_completion: Set(profile_completion(None, &channels, true)),
        notification_channels: Set(serde_json::json!(channels)),
        dashboard_url: Set(Some(config.default_dashboard_url.clone())),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(orm)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user.id)
}

async fn seed_reviews(orm: &DatabaseConnection) -> anyhow::Result<()> {
    if Reviews::find().one(orm).await?.is_some() {
        println!("Reviews already present, skipping");
        return Ok(());
    }

    let reviews = vec![
        ("Priya S.", "The forecasting model paid for itself within a quarter.", 5),
        ("Marco D.", "Clear reports and quick turnaround on questions.", 4),
    ];

    for (name, text, rating) in reviews {
        ReviewActive {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            text: Set(text.to_string()),
            rating: Set(rating),
            approved: Set(true),
            created_at: Set(Utc::now().into()),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded reviews");
    Ok(())
}
