use std::path::PathBuf;

use anyhow::Result;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap::value_parser;
use nebula_api::prelude::*;

mod install;
mod print;
mod publish;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    if let Err(err) = run().await {
        eprintln!("❌ {}", err);

        // Print all errors in the chain
        for (i, cause) in err.chain().enumerate().skip(1) {
            eprintln!("  {}: {}", i, cause);
        }

        std::process::exit(1);
    } else {
        Ok(())
    }
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a String> {
    matches
        .get_one::<String>(id)
        .ok_or_else(|| anyhow::anyhow!("missing argument: {id}"))
}

/// Point at `tpkg search` when a package name doesn't exist.
fn search_hint(err: anyhow::Error, name: &str) -> anyhow::Error {
    match err.downcast_ref::<ApiError>() {
        Some(e) if e.is_not_found() => anyhow::anyhow!("{e}\n💡 Try: tpkg search {name}"),
        _ => err,
    }
}

async fn run() -> Result<()> {
    let matches = cli().get_matches();
    let api = match matches.get_one::<String>("registry") {
        Some(url) => NebulaApi::new(url.clone())?,
        None => NebulaApi::default(),
    };
    log::debug!("using registry {}", api.url);

    match matches.subcommand() {
        Some(("list", _)) => {
            println!("{}", print::packages(&api.load_packages().await?));
        }
        Some(("search", matches)) => {
            let query = required(matches, "query")?;
            println!("{}", print::packages(&api.search_packages(query).await?));
        }
        Some(("info", matches)) => {
            let name = required(matches, "name")?;
            let package = api
                .load_package(name)
                .await
                .map_err(|e| search_hint(e, name))?;
            println!("{}", print::package_details(&package));
        }
        Some(("install", matches)) => {
            let root = match matches.get_one::<String>("path") {
                Some(path) => PathBuf::from(path),
                None => std::env::current_dir()?,
            };
            let name = required(matches, "name")?;
            let entry = install::install(&api, &root, name)
                .await
                .map_err(|e| search_hint(e, name))?;
            println!("Installed to {}", entry.display());
        }
        Some(("publish", matches)) => {
            let info = publish::PackageInfo {
                name: required(matches, "name")?.clone(),
                version: required(matches, "pkg-version")?.clone(),
                description: required(matches, "description")?.clone(),
                author: required(matches, "author")?.clone(),
                quantum_level: matches.get_one::<i64>("quantum-level").copied(),
            };
            let path = PathBuf::from(required(matches, "file")?);
            let request = publish::build_request(info, &path)?;
            let package = publish::publish(&api, request, matches.get_flag("yes")).await?;
            println!("Published {}", print::package_line(&package));
        }
        Some(("reviews", _)) => {
            println!("{}", print::reviews(&api.load_reviews().await?));
        }
        Some(("review", matches)) => {
            let mut request = ReviewRequest::new(
                required(matches, "name")?,
                matches
                    .get_one::<i64>("rating")
                    .copied()
                    .ok_or_else(|| anyhow::anyhow!("missing argument: rating"))?,
                required(matches, "title")?,
                required(matches, "comment")?,
            );
            request.mind_destroyed = Some(matches.get_flag("mind-destroyed"));
            let review = api.submit_review(request).await?;
            println!("{}", print::review(&review));
        }
        Some((reaction @ ("like" | "dislike"), matches)) => {
            let reaction = if reaction == "like" {
                Reaction::Like
            } else {
                Reaction::Dislike
            };
            let review = api.react(required(matches, "id")?, reaction).await?;
            println!("{}", print::review(&review));
        }
        Some(("stats", _)) => {
            println!("{}", print::stats(&api.stats().await?));
        }
        Some(("run", matches)) => {
            let path = PathBuf::from(required(matches, "file")?);
            let code = std::fs::read_to_string(&path)?;
            let response = api.execute(&code).await?;
            println!("{}", response.output);
            log::info!(
                "executed in {} ({} instructions, {})",
                response.execution_time,
                response.stats.bytecode_instructions,
                response.stats.memory_used
            );
        }
        _ => {
            let status = api.status().await?;
            println!("{} (Trica {})", status.message, status.version);
        }
    }
    Ok(())
}

fn name_arg() -> Arg {
    Arg::new("name").required(true).help("Package name")
}

fn cli() -> Command {
    Command::new("tpkg")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Trica package manager")
        .arg(
            Arg::new("registry")
                .short('r')
                .long("registry")
                .env("TPKG_REGISTRY")
                .value_name("url")
                .action(ArgAction::Set)
                .global(true)
                .help("Registry url"),
        )
        .subcommand(Command::new("list").alias("ls").about("list packages, most downloaded first"))
        .subcommand(
            Command::new("search")
                .about("search package names and descriptions")
                .arg(Arg::new("query").required(true)),
        )
        .subcommand(
            Command::new("info")
                .about("show a single package")
                .arg(name_arg()),
        )
        .subcommand(
            Command::new("install")
                .alias("i")
                .about("install a package into .tpkg/")
                .arg(name_arg())
                .arg(
                    Arg::new("path")
                        .short('p')
                        .long("path")
                        .value_name("path")
                        .action(ArgAction::Set)
                        .help("Install into a project at a custom path"),
                ),
        )
        .subcommand(
            Command::new("publish")
                .about("publish a package to the registry")
                .arg(Arg::new("file").required(true).help("Trica source file"))
                .arg(Arg::new("name").short('n').long("name").required(true))
                .arg(
                    Arg::new("pkg-version")
                        .short('v')
                        .long("pkg-version")
                        .required(true),
                )
                .arg(
                    Arg::new("description")
                        .short('d')
                        .long("description")
                        .required(true),
                )
                .arg(Arg::new("author").short('a').long("author").required(true))
                .arg(
                    Arg::new("quantum-level")
                        .short('q')
                        .long("quantum-level")
                        .value_parser(value_parser!(i64).range(1..=11))
                        .help("1 to 11, defaults to 1"),
                )
                .arg(
                    Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .action(ArgAction::SetTrue)
                        .help("Skip the confirmation prompt"),
                ),
        )
        .subcommand(Command::new("reviews").about("list reviews, newest first"))
        .subcommand(
            Command::new("review")
                .about("submit a review")
                .arg(Arg::new("name").short('n').long("name").required(true))
                .arg(
                    Arg::new("rating")
                        .short('s')
                        .long("rating")
                        .required(true)
                        .value_parser(value_parser!(i64).range(1..=5)),
                )
                .arg(Arg::new("title").short('t').long("title").required(true))
                .arg(Arg::new("comment").short('c').long("comment").required(true))
                .arg(
                    Arg::new("mind-destroyed")
                        .long("mind-destroyed")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("like")
                .about("like a review")
                .arg(Arg::new("id").required(true)),
        )
        .subcommand(
            Command::new("dislike")
                .about("dislike a review")
                .arg(Arg::new("id").required(true)),
        )
        .subcommand(Command::new("stats").about("registry statistics"))
        .subcommand(
            Command::new("run")
                .about("send a source file to the execute endpoint")
                .arg(Arg::new("file").required(true)),
        )
}
