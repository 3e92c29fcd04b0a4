use anyhow::Context;
use books_manager::App;
use shelf_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load settings")?;
    shelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        seed = ?settings.database.seed_path,
        "books-manager bootstrap starting"
    );

    let app = App::new(settings);
    app.boot().await?;

    let served = app.serve().await;
    app.shutdown().await?;
    served
}
