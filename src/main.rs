// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Seepia CLI
//!
//! Fetch a URL through a session, optionally via a proxy.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use seepia::{default_options, ClientProfile, CookieJar, Request, Session, SessionOption};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "seepia=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "fetch" => match fetch(&args[2..]).await {
            Ok(code) => code,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::from(1)
            }
        },
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("seepia {}", seepia::VERSION);
            ExitCode::SUCCESS
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"Seepia - Fingerprint HTTP Session Runtime

USAGE:
    seepia <COMMAND> [OPTIONS]

COMMANDS:
    fetch <url>     Fetch a URL and display the response
    help            Show this help message
    version         Show version information

FETCH OPTIONS:
    --proxy <url>           Route through an HTTP(S) CONNECT proxy
    --follow                Follow redirects
    --profile <name>        Fingerprint profile (chrome, firefox)
    --header <name:value>   Add a request header (repeatable, sent in order)

EXAMPLES:
    seepia fetch https://example.com
    seepia fetch https://example.com --proxy http://127.0.0.1:8080 --follow
    seepia fetch https://example.com --header "User-Agent: curl/8.0" --header "Accept: */*"
"#
    );
}

struct FetchArgs {
    url: String,
    proxy: Option<String>,
    profile: Option<ClientProfile>,
    follow: bool,
    headers: Vec<(String, String)>,
}

fn parse_fetch_args(args: &[String]) -> anyhow::Result<FetchArgs> {
    let mut url = None;
    let mut proxy = None;
    let mut profile = None;
    let mut follow = false;
    let mut headers = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--proxy" => proxy = Some(iter.next().context("--proxy needs a value")?.clone()),
            "--follow" => follow = true,
            "--profile" => {
                let name = iter.next().context("--profile needs a value")?;
                profile = Some(
                    ClientProfile::by_name(name)
                        .with_context(|| format!("unknown profile '{}'", name))?,
                );
            }
            "--header" => {
                let raw = iter.next().context("--header needs a value")?;
                let (name, value) = raw
                    .split_once(':')
                    .with_context(|| format!("header '{}' is not name:value", raw))?;
                headers.push((name.trim().to_string(), value.trim().to_string()));
            }
            other if other.starts_with("--") => bail!("unknown option {}", other),
            other => url = Some(other.to_string()),
        }
    }

    Ok(FetchArgs {
        url: url.context("Usage: seepia fetch <url> [OPTIONS]")?,
        proxy,
        profile,
        follow,
        headers,
    })
}

async fn fetch(args: &[String]) -> anyhow::Result<ExitCode> {
    let args = parse_fetch_args(args)?;

    let mut options = default_options();
    options.push(SessionOption::CookieJar(Arc::new(CookieJar::new())));
    if args.follow {
        options.push(SessionOption::FollowRedirects);
    }
    if let Some(profile) = args.profile {
        options.push(SessionOption::Profile(profile));
    }
    if let Some(proxy) = args.proxy {
        options.push(SessionOption::Proxy(proxy));
    }

    let session = Session::new(options)
        .await
        .context("failed to create session")?;

    let mut request = Request::get(&args.url)?;
    for (name, value) in &args.headers {
        request = request.append_header(name, value);
    }
    request = request.header_order(args.headers.iter().map(|(name, _)| name.clone()));

    println!("Fetching: {}", args.url);

    match session.execute(request).await {
        Ok(response) => {
            println!("\n=== Response ===");
            println!("Status: {}", response.status);
            println!("Protocol: {}", response.proto);
            if let Some(url) = response.url() {
                println!("URL: {}", url);
            }
            println!("Size: {} bytes", response.body_bytes.as_ref().map_or(0, |b| b.len()));

            println!("\n=== Headers ===");
            for (name, value) in &response.headers {
                println!("  {}: {}", name, value.to_str().unwrap_or("<binary>"));
            }

            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Failed to fetch URL: {}", e);
            if e.response.status_code > 0 {
                eprintln!("Partial response: {}", e.response.status);
            }
            Ok(ExitCode::from(1))
        }
    }
}
