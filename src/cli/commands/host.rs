use clap::Args;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::config;
use crate::tenant::{is_local_or_ip, normalize_host, subdomain_slug};

#[derive(Args)]
pub struct HostArgs {
    #[arg(help = "Host header value, e.g. fooschool.example.com:443")]
    pub host: String,
    #[arg(long, help = "Root domain (defaults to TENANCY_ROOT_DOMAIN)")]
    pub root_domain: Option<String>,
}

pub fn handle(args: HostArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let root = args
        .root_domain
        .map(|r| r.trim().trim_start_matches('.').to_lowercase())
        .or_else(|| config::config().tenancy.root_domain.clone());

    let host = normalize_host(&args.host);
    let skipped = is_local_or_ip(&host);
    let slug = if skipped {
        None
    } else {
        root.as_deref().and_then(|r| subdomain_slug(&host, r))
    };
    let custom_domain = if skipped { None } else { Some(host.clone()) };

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({
                "host": host,
                "root_domain": root,
                "ignored": skipped,
                "subdomain_slug": slug,
                "custom_domain": custom_domain,
            })
        ),
        OutputFormat::Text => {
            println!("normalized host: {}", host);
            if skipped {
                println!("local or IP host; not used for masjid resolution");
            } else {
                match slug {
                    Some(slug) => println!("slug lookup:     {} (then custom domain)", slug),
                    None => println!("slug lookup:     -"),
                }
                println!("domain lookup:   {}", host);
            }
        }
    }
    Ok(())
}
