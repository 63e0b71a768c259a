pub mod bucket;
pub mod fleet;
pub mod instance;
pub mod queue;

use skyflow_core::{
    ClientCache, ClientConfig, OutputFormat, Progress, Record, Result, SilentProgress,
    SpinnerProgress, render,
};
use skyflow_cloud_aws::{AwsConnector, AwsHandle};
use std::sync::Arc;

/// コマンド間で共有する実行コンテキスト。
///
/// 接続キャッシュはプロセススコープの明示的な値としてここに持ち、
/// グローバルには置かない。
#[derive(Clone)]
pub struct CommandContext {
    cache: Arc<ClientCache<AwsConnector>>,
    client: ClientConfig,
    format: OutputFormat,
    max_items: Option<usize>,
}

impl CommandContext {
    pub fn new(client: ClientConfig, format: OutputFormat, max_items: Option<usize>) -> Self {
        Self {
            cache: Arc::new(ClientCache::new(AwsConnector)),
            client,
            format,
            max_items,
        }
    }

    /// 接続ハンドルを取得（初回のみビルド、以降はキャッシュ）
    pub async fn handle(&self) -> Result<Arc<AwsHandle>> {
        self.cache.get(&self.client).await
    }

    pub fn max_items(&self) -> Option<usize> {
        self.max_items
    }

    /// APIに渡すページサイズ。EC2 DescribeInstancesの下限が5のため、
    /// 小さな--max-itemsは5に切り上げてアグリゲータ側で切り詰める。
    pub fn page_size(&self) -> Option<i32> {
        self.max_items.map(|max| (max.min(1000) as i32).max(5))
    }

    /// 進捗表示。機械可読フォーマットではスピナーを出さない。
    pub fn progress(&self, message: &str) -> Box<dyn Progress> {
        if self.format == OutputFormat::Table {
            Box::new(SpinnerProgress::start(message))
        } else {
            Box::new(SilentProgress)
        }
    }

    /// レコードを選択済みフォーマットで標準出力へ。
    /// JSONL/CSVの空シーケンスは一行も出力しない。
    pub fn emit(&self, records: &[Record], empty_message: &str) {
        let text = render(records, self.format, empty_message);
        if !text.is_empty() {
            println!("{text}");
        }
    }
}
