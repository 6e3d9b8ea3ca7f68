use dotenv::dotenv;
use std::env;
use terramartz_admin::config::{ClientOptions, TokenStorage};
use terramartz_admin::query::Pagination;
use terramartz_admin::services::UserFilter;
use terramartz_admin::TerraMartz;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv().ok();
    pretty_env_logger::init();

    let api_url = env::var("TERRAMARTZ_API_URL").expect("TERRAMARTZ_API_URL must be set");
    let email = env::var("TERRAMARTZ_ADMIN_EMAIL").expect("TERRAMARTZ_ADMIN_EMAIL must be set");
    let password =
        env::var("TERRAMARTZ_ADMIN_PASSWORD").expect("TERRAMARTZ_ADMIN_PASSWORD must be set");

    // Keep the token between runs, in the same layout the dashboard uses
    let options = ClientOptions::from_env()?
        .with_token_storage(TokenStorage::Legacy(Some(".terramartz-session.json".into())));
    let client = TerraMartz::new_with_options(&api_url, options)?;

    if client.session().is_authenticated() {
        println!("Reusing stored session");
    } else {
        println!("Logging in as {}", email);
        client.auth().login(&email, &password).await?;
    }

    if let Some(claims) = client.session().claims() {
        println!(
            "Signed in as {:?} with role {:?}, token expires at {:?}",
            claims.subject(),
            claims.role,
            claims.expires_at()
        );
    }

    let staff = client
        .users()
        .list(&UserFilter::staff(), Pagination::new(1, 20))
        .await?;

    println!("{} staff accounts ({} pages)", staff.total, staff.total_pages());
    for user in &staff.data {
        println!("  {}  {}", user.id(), user.display_name());
    }

    Ok(())
}
