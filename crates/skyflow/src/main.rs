mod commands;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use commands::CommandContext;
use skyflow_core::{ClientConfig, DomainError, OutputFormat, deadline};
use std::future::Future;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sky")]
#[command(about = "クラウドリソースを、ひとつのCLIで。", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// AWSプロファイル名
    #[arg(long, env = "AWS_PROFILE", global = true)]
    profile: Option<String>,

    /// リージョン (例: ap-northeast-1)
    #[arg(long, env = "AWS_REGION", global = true)]
    region: Option<String>,

    /// 出力フォーマット (table, json, jsonl, csv)
    #[arg(short, long, global = true, default_value = "table")]
    output: String,

    /// 取得件数の上限
    #[arg(long, global = true)]
    max_items: Option<usize>,

    /// コマンド全体のタイムアウト秒数
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// エラー時に原因チェーンを表示
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// コンピュートインスタンスを操作
    #[command(subcommand)]
    Instance(InstanceCommands),
    /// オブジェクトストレージのバケットを操作
    #[command(subcommand)]
    Bucket(BucketCommands),
    /// メッセージキューを操作
    #[command(subcommand)]
    Queue(QueueCommands),
    /// マネージドインスタンスフリートを操作
    #[command(subcommand)]
    Fleet(FleetCommands),
    /// バージョン情報を表示
    Version,
}

#[derive(Subcommand)]
enum InstanceCommands {
    /// インスタンスの一覧を表示
    List {
        /// 状態でフィルタ (running, stopped など)
        #[arg(short, long)]
        state: Option<String>,
    },
    /// インスタンスの詳細を表示
    Describe {
        /// インスタンスID (例: i-0abc1234)
        instance_id: String,
    },
}

#[derive(Subcommand)]
enum BucketCommands {
    /// バケットの一覧を表示
    List,
}

#[derive(Subcommand)]
enum QueueCommands {
    /// キューの一覧を表示
    List {
        /// キュー名のプレフィックスでフィルタ
        #[arg(short, long)]
        prefix: Option<String>,
    },
}

#[derive(Subcommand)]
enum FleetCommands {
    /// フリートの一覧を表示
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログはstderrへ。stdoutは整形済み出力専用に保つ
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Versionコマンドは接続不要
    if matches!(cli.command, Commands::Version) {
        println!("skyflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // 出力フォーマットはレコードを読み始める前に確定させる
    let format = match cli.global.output.parse::<OutputFormat>() {
        Ok(format) => format,
        Err(err) => {
            print_error(&err, cli.global.verbose);
            std::process::exit(1);
        }
    };

    let client = ClientConfig {
        region: cli.global.region.clone(),
        profile: cli.global.profile.clone(),
    };
    let ctx = CommandContext::new(client, format, cli.global.max_items);
    let timeout = cli.global.timeout.map(Duration::from_secs);

    if let Err(err) = dispatch(cli.command, ctx, timeout).await {
        print_error(&err, cli.global.verbose);
        std::process::exit(1);
    }

    Ok(())
}

async fn dispatch(
    command: Commands,
    ctx: CommandContext,
    timeout: Option<Duration>,
) -> skyflow_core::Result<()> {
    match command {
        Commands::Instance(InstanceCommands::List { state }) => {
            bounded(timeout, "instance list", commands::instance::list(ctx, state)).await
        }
        Commands::Instance(InstanceCommands::Describe { instance_id }) => {
            bounded(
                timeout,
                "instance describe",
                commands::instance::describe(ctx, instance_id),
            )
            .await
        }
        Commands::Bucket(BucketCommands::List) => {
            bounded(timeout, "bucket list", commands::bucket::list(ctx)).await
        }
        Commands::Queue(QueueCommands::List { prefix }) => {
            bounded(timeout, "queue list", commands::queue::list(ctx, prefix)).await
        }
        Commands::Fleet(FleetCommands::List) => {
            bounded(timeout, "fleet list", commands::fleet::list(ctx)).await
        }
        Commands::Version => {
            unreachable!("Version is handled before dispatch");
        }
    }
}

/// --timeout指定時はコマンド全体を期限と競争させる。
/// 期限切れ後も実行中の処理は裏で走り続け、結果は破棄される。
async fn bounded<F>(
    timeout: Option<Duration>,
    operation: &str,
    future: F,
) -> skyflow_core::Result<()>
where
    F: Future<Output = skyflow_core::Result<()>> + Send + 'static,
{
    match timeout {
        Some(limit) => deadline(limit, operation, future).await,
        None => future.await,
    }
}

fn print_error(err: &DomainError, verbose: bool) {
    eprintln!("{} [{}] {}", "Error:".red().bold(), err.kind, err.message);
    if let Some(resource) = &err.resource_id {
        eprintln!("  リソース: {}", resource.cyan());
    }
    if verbose {
        if let Some(request_id) = &err.request_id {
            eprintln!("  リクエストID: {}", request_id.dimmed());
        }
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            eprintln!("  原因: {cause}");
            source = cause.source();
        }
    }
}
