use dotenv::dotenv;
use std::env;
use terramartz_admin::services::ProductFilter;
use terramartz_admin::TerraMartz;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    pretty_env_logger::init();

    let client = TerraMartz::from_env()?;
    if !client.session().is_authenticated() {
        let email = env::var("TERRAMARTZ_ADMIN_EMAIL")?;
        let password = env::var("TERRAMARTZ_ADMIN_PASSWORD")?;
        client.auth().login(&email, &password).await?;
    }

    let filter = ProductFilter {
        category: env::args().nth(1),
        ..Default::default()
    };

    let csv = client.products().export_csv(&filter).await?;
    tokio::fs::write("products.csv", &csv).await?;

    println!("Wrote {} bytes to products.csv", csv.len());

    Ok(())
}
