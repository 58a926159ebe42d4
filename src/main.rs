use std::net::TcpListener;

use anyhow::Context;

use sqlx::PgPool;

use subtrack::app;
use subtrack::settings::Settings;
use subtrack::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = telemetry::create_subscriber("info".into(), std::io::stdout);
    telemetry::set_subscriber(subscriber)?;

    let settings = Settings::load().context("Failed to load settings")?;

    let pool = PgPool::connect_with(settings.database.with_db()).await?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let listener = TcpListener::bind(settings.app.addr())?;

    app::run(listener, pool)?.await.context("Failed to run app")
}
