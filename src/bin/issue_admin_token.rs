// Issues an admin bearer token for the /admin API.
// Usage: issue_admin_token [subject] [days]
use youtube_feed::middleware::auth::create_admin_token;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let subject = args.next().unwrap_or_else(|| "admin".to_string());
    let days: i64 = match args.next() {
        Some(raw) => raw.parse()?,
        None => 30,
    };

    let secret = std::env::var("JWT_SECRET").map_err(|_| "JWT_SECRET must be set")?;
    let token = create_admin_token(&subject, &secret, days)?;

    eprintln!("Admin token for '{}' valid for {} days:", subject, days);
    println!("{}", token);
    Ok(())
}
