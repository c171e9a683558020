use anyhow::{Context, Result};
use sqlx::MySqlPool;
use tracing::info;

use crate::model::role::Role;

pub async fn init_db(database_url: &str) -> Result<MySqlPool> {
    MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Seed the `roles` table on first start.
pub async fn init_roles(pool: &MySqlPool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles")
        .fetch_one(pool)
        .await
        .context("Failed to count roles")?;

    if count > 0 {
        info!(count, "Roles are already initialized");
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for role in Role::ALL {
        sqlx::query("INSERT INTO roles (id, name) VALUES (?, ?)")
            .bind(role.id())
            .bind(role.db_name())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed to insert role {role}"))?;
    }
    tx.commit().await?;

    info!("Roles initialized successfully");
    Ok(())
}
