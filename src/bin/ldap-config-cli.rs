use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Method;
use url::Url;

#[derive(Parser)]
#[command(name = "ldap-config-cli")]
#[command(about = "Management CLI for the LDAP configuration registry", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:48080")]
    url: String,

    /// Admin API key, if the service requires one.
    #[arg(short, long, env = "LDAP_CONFIG_REGISTRY_API_KEY")]
    key: Option<String>,

    /// Request XML instead of JSON.
    #[arg(long)]
    xml: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service status
    Health,
    /// Show the LDAP group to permission mapping
    Roles,
    /// Map a group to a permission, replacing any existing mapping
    SetRole { role: String, permission: String },
    /// Map a group to a permission; fails if the group is already mapped
    AddRole { role: String, permission: String },
    /// Remove a group mapping
    RemoveRole { role: String },
    /// Show the user DN patterns
    Patterns,
    /// Append a user DN pattern
    AddPattern { pattern: String },
    /// Remove a user DN pattern
    RemovePattern { pattern: String },
    /// Show the user search filter
    UserSearch,
    /// Replace the user search filter
    SetUserSearch { base: String, filter: String },
    /// Show the group search filter
    GroupSearch,
    /// Replace the group search filter
    SetGroupSearch { base: String, filter: String },
}

impl Commands {
    fn request(&self) -> (Method, Vec<&str>) {
        const ROOT: [&str; 2] = ["configuration", "ldap"];

        let (method, rest): (Method, Vec<&str>) = match self {
            Commands::Health => return (Method::GET, vec!["health"]),
            Commands::Roles => (Method::GET, vec!["rolesMapping"]),
            Commands::SetRole { role, permission } => {
                (Method::PUT, vec!["rolesMapping", role, permission])
            }
            Commands::AddRole { role, permission } => {
                (Method::POST, vec!["rolesMapping", role, permission])
            }
            Commands::RemoveRole { role } => (Method::DELETE, vec!["rolesMapping", role]),
            Commands::Patterns => (Method::GET, vec!["userDnPatterns"]),
            Commands::AddPattern { pattern } => (Method::POST, vec!["userDnPatterns", pattern]),
            Commands::RemovePattern { pattern } => {
                (Method::DELETE, vec!["userDnPatterns", pattern])
            }
            Commands::UserSearch => (Method::GET, vec!["userSearchFilter"]),
            Commands::SetUserSearch { base, filter } => {
                (Method::PUT, vec!["userSearchFilter", base, filter])
            }
            Commands::GroupSearch => (Method::GET, vec!["groupSearchFilter"]),
            Commands::SetGroupSearch { base, filter } => {
                (Method::PUT, vec!["groupSearchFilter", base, filter])
            }
        };
        (method, ROOT.iter().copied().chain(rest).collect())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    let accept = if cli.xml { "application/xml" } else { "application/json" };
    headers.insert(ACCEPT, HeaderValue::from_static(accept));
    if let Some(key) = &cli.key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {key}"))?);
    }

    let (method, segments) = cli.command.request();
    let mut url = Url::parse(&cli.url)?;
    url.path_segments_mut()
        .map_err(|_| format!("{} cannot be used as a base URL", cli.url))?
        .pop_if_empty()
        .extend(segments);

    let res = client.request(method, url).headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let is_json = res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    if is_json {
        let json: serde_json::Value = serde_json::from_str(&text)?;
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("{}", text);
    }
    Ok(())
}
