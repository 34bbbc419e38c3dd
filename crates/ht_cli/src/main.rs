use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing::Level;

use ht_api::ApiClient;
use ht_core::types::{SummaryMode, ALL_CATEGORIES};
use ht_core::NewsBackend;
use ht_ui::{render, App};

#[derive(Parser, Debug)]
#[command(author, version, about = "Haber özet platformu için terminal istemcisi", long_about = None)]
struct Cli {
    /// Arka uç API adresi
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    backend_url: String,

    /// Özet modu: normal | kisa
    #[arg(long, default_value = "normal")]
    ozet_modu: String,

    /// Günlük çıktısının yazılacağı dosya
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Kategori listesini yazdırır
    Kategoriler,
    /// Haber kartlarını düz metin olarak yazdırır
    Haberler {
        /// Kategori anahtarı; boş bırakılırsa tüm haberler
        kategori: Option<String>,
    },
    /// Model listesini yazdırır
    Modeller,
    /// Kategoriyi arka uçta yeniler
    Yenile { kategori: String },
}

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    if let Some(path) = &cli.log_file {
        let file = std::fs::File::create(path)
            .with_context(|| format!("günlük dosyası açılamadı: {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_ansi(false)
            .with_writer(Arc::new(file))
            .init();
    } else if cli.command.is_some() {
        tracing_subscriber::fmt()
            .with_max_level(Level::INFO)
            .with_writer(std::io::stderr)
            .init();
    }
    // Interactive mode without --log-file stays silent: stderr would bleed
    // into the alternate screen.
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let mode = SummaryMode::from_param(&cli.ozet_modu)
        .with_context(|| format!("geçersiz özet modu: {}", cli.ozet_modu))?;
    let client = ApiClient::new(&cli.backend_url)
        .with_context(|| format!("arka uç adresi çözümlenemedi: {}", cli.backend_url))?;

    match cli.command {
        None => {
            let app = App::new(Arc::new(client), mode);
            app.run().await?;
        }
        Some(Commands::Kategoriler) => {
            for key in client.categories().await? {
                println!("{} ({key})", render::category_label(&key));
            }
        }
        Some(Commands::Haberler { kategori }) => {
            let filter = kategori.as_deref().filter(|key| *key != ALL_CATEGORIES);
            let items = client.news(filter, mode).await?;
            info!(count = items.len(), "feed loaded");
            if items.is_empty() {
                println!("{}", render::NO_NEWS_TEXT);
            } else {
                for item in &items {
                    println!("{}", render::card_plain(item));
                }
            }
        }
        Some(Commands::Modeller) => {
            for (key, name) in client.models().await? {
                println!("{key}: {name}");
            }
        }
        Some(Commands::Yenile { kategori }) => {
            let outcome = client.refresh(&kategori).await?;
            println!("{}: {}", outcome.status, outcome.message);
        }
    }

    Ok(())
}
