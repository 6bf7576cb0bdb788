mod effects;
mod logging;
mod mapping;
mod preferences;
mod session;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use readpull_core::{ArticleQuery, SessionView};
use readpull_gateway::{Gateway, GatewaySettings, ReqwestGateway};

use crate::preferences::PreferenceStore;
use crate::session::SessionDriver;

fn main() -> Result<()> {
    logging::initialize(logging::LogDestination::File);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        print_usage();
        return Ok(());
    };

    let working_dir = std::env::current_dir().context("resolve working directory")?;
    let store = PreferenceStore::new(&working_dir);

    match command.as_str() {
        "scrape" => {
            let input = rest.join(" ");
            if input.trim().is_empty() {
                bail!("usage: readpull scrape <url-or-search-terms>");
            }
            let mut driver = driver_for(&store, &working_dir)?;
            let view = driver.run_scrape(&input);
            report_session(&view);
        }
        "articles" => {
            let query = parse_article_query(rest)?;
            let mut driver = driver_for(&store, &working_dir)?;
            let view = driver.run_articles(query);
            report_catalog(&view);
        }
        "pdf" => {
            let [article_id] = rest else {
                bail!("usage: readpull pdf <article-id>");
            };
            let mut driver = driver_for(&store, &working_dir)?;
            let view = driver.run_article_pdf(article_id);
            report_session(&view);
        }
        "get-key" => {
            let mut driver = driver_for(&store, &working_dir)?;
            let view = driver.run_temp_key();
            match view.error {
                None => println!("temporary credential obtained and saved"),
                Some(error) => bail!("credential request failed: {error}"),
            }
        }
        "screenshots" => {
            let prefs = store.load();
            let Some(credential) = prefs.credential else {
                bail!("no credential saved; run `readpull get-key` first");
            };
            let gateway = build_gateway(&prefs.base_url)?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("start runtime")?;
            let shots = runtime.block_on(gateway.debug_screenshots(&credential))?;
            println!("{} debug screenshots", shots.total);
            for shot in shots.screenshots {
                println!(
                    "  {}  {}  job={}  {} bytes",
                    shot.datetime, shot.filename, shot.job_id, shot.size
                );
            }
        }
        "set-key" => {
            let [key] = rest else {
                bail!("usage: readpull set-key <key>");
            };
            store.save_credential(key)?;
            println!("credential saved");
        }
        "set-url" => {
            let [url] = rest else {
                bail!("usage: readpull set-url <base-url>");
            };
            store.save_base_url(url)?;
            println!("backend address saved");
        }
        other => {
            eprintln!("unknown command: {other}");
            print_usage();
        }
    }

    Ok(())
}

fn driver_for(store: &PreferenceStore, working_dir: &std::path::Path) -> Result<SessionDriver> {
    let prefs = store.load();
    let gateway = build_gateway(&prefs.base_url)?;
    let pdf_dir: PathBuf = working_dir.join("downloads");
    SessionDriver::new(gateway, store.clone(), pdf_dir).context("start session driver")
}

fn build_gateway(base_url: &str) -> Result<Arc<dyn Gateway>> {
    let gateway = ReqwestGateway::new(base_url, GatewaySettings::default())
        .with_context(|| format!("configure gateway for {base_url}"))?;
    Ok(Arc::new(gateway))
}

fn parse_article_query(args: &[String]) -> Result<ArticleQuery> {
    let mut query = ArticleQuery::default();
    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--limit" => {
                let value = iter.next().context("--limit needs a value")?;
                query.limit = value.parse().context("--limit must be a number")?;
            }
            "--offset" => {
                let value = iter.next().context("--offset needs a value")?;
                query.offset = value.parse().context("--offset must be a number")?;
            }
            "--search" => {
                query.search = Some(iter.next().context("--search needs a value")?.clone());
            }
            "--site" => {
                query.site_source = Some(iter.next().context("--site needs a value")?.clone());
            }
            other => bail!("unknown flag: {other}"),
        }
    }
    Ok(query)
}

fn report_session(view: &SessionView) {
    if let Some(article) = &view.article {
        println!("{} ({})", article.title, article.url);
        if let Some(site) = &article.site_source {
            println!("source: {site}");
        }
        println!("article id: {}", article.id);
    }
    if let Some(notice) = &view.notice {
        println!("{notice}");
    }
    if let Some(error) = &view.error {
        eprintln!("error: {error}");
    }
}

fn report_catalog(view: &SessionView) {
    let catalog = &view.catalog;
    if let Some(error) = &catalog.error {
        eprintln!("error: {error}");
        return;
    }
    println!("{} of {} articles", catalog.articles.len(), catalog.total);
    for article in &catalog.articles {
        println!("  {}  {}  {}", article.id, article.created_at, article.title);
    }
}

fn print_usage() {
    println!("readpull - client for a remote article-scraping service");
    println!();
    println!("commands:");
    println!("  scrape <url-or-search-terms>   submit a scrape and wait for the article");
    println!("  articles [--limit N] [--offset N] [--search TEXT] [--site SOURCE]");
    println!("                                 list previously scraped articles");
    println!("  pdf <article-id>               download an article's PDF");
    println!("  get-key                        obtain and save a temporary credential");
    println!("  set-key <key>                  save a credential");
    println!("  set-url <base-url>             save the backend address");
    println!("  screenshots                    list server-side debug screenshots");
}
