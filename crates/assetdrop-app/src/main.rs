//! # assetdrop-app
//!
//! AssetDrop CLI 진입점.
//! 설정 로드, DI 와이어링, 하위 명령 실행.

mod commands;
mod views;
mod wiring;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::wiring::AppContext;

/// AssetDrop 카탈로그 브라우저
///
/// 3D 에셋 카탈로그 조회, 일일 추천 캐러셀, 저장 목록 관리
#[derive(Parser, Debug)]
#[command(name = "assetdrop")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// 데이터 저장 경로 (기본: 설정값 또는 플랫폼 데이터 디렉토리)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// 카탈로그 JSON 파일 (설정값 대신 사용)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 오늘의 추천 항목
    Featured {
        /// 추천 개수 (기본: 설정값)
        #[arg(long, short = 'n')]
        count: Option<usize>,
        /// 기준일 이후 일수 지정 (기본: 오늘)
        #[arg(long, allow_hyphen_values = true)]
        day: Option<i64>,
    },
    /// 카탈로그 목록 (카테고리/검색 필터)
    List {
        #[arg(long)]
        category: Option<String>,
        #[arg(long, short = 's')]
        search: Option<String>,
    },
    /// 항목 저장
    Save { id: String },
    /// 항목 저장 해제
    Remove { id: String },
    /// 저장 상태 반전
    Toggle { id: String },
    /// 저장 목록 (카테고리/검색 필터)
    Saved {
        #[arg(long)]
        category: Option<String>,
        #[arg(long, short = 's')]
        search: Option<String>,
    },
    /// 추천 캐러셀 자동 재생
    Carousel {
        /// 실행 시간 (초)
        #[arg(long, default_value = "30")]
        seconds: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "assetdrop={},assetdrop_app={},assetdrop_core={},assetdrop_catalog={},assetdrop_storage={},assetdrop_carousel={},assetdrop_sync={}",
        args.log_level, args.log_level, args.log_level, args.log_level, args.log_level, args.log_level, args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = wiring::load_config(args.config.as_deref())?;
    if let Some(catalog) = args.catalog {
        config.catalog.source_path = catalog;
    }
    debug!("설정: {:?}", config);

    let ctx = AppContext::build(config, args.data_dir.as_deref()).await?;

    match args.command {
        Command::Featured { count, day } => commands::featured(&ctx, count, day),
        Command::List { category, search } => commands::list(&ctx, category, search),
        Command::Save { id } => commands::save(&ctx, &id)?,
        Command::Remove { id } => commands::remove(&ctx, &id),
        Command::Toggle { id } => commands::toggle(&ctx, &id)?,
        Command::Saved { category, search } => commands::saved(&ctx, category, search),
        Command::Carousel { seconds } => commands::carousel(&ctx, seconds).await?,
    }

    Ok(())
}
