use serde_json::json;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config;

pub fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config::config();

    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            "Active configuration",
            Some(json!({
                "config": config,
                "database_configured": config.database.url.is_some(),
            })),
        ),
        OutputFormat::Text => {
            println!("environment:      {:?}", config.environment);
            println!("listen:           {}", config.bind_addr());
            println!("base url:         {}", config.server.base_url);
            println!("auth service:     {}", config.auth.service_url);
            println!("session cookie:   {}", config.auth.session_cookie);
            println!("social providers: {}", config.auth.social_providers.join(", "));
            println!(
                "database:         {}",
                if config.database.url.is_some() { "configured" } else { "not configured" }
            );
            println!("secure cookies:   {}", config.security.secure_cookies);
            Ok(())
        }
    }
}
