use crate::commands::CommandContext;
use skyflow_core::{PageRequest, Progress, Result, RetryPolicy, classify, paginate, retry_with};
use skyflow_cloud_aws::queues;

/// キュー一覧を表示
pub async fn list(ctx: CommandContext, prefix: Option<String>) -> Result<()> {
    let handle = ctx.handle().await?;
    let policy = RetryPolicy::transient();
    let progress = ctx.progress("キュー一覧を取得中...");
    let reporter: &dyn Progress = progress.as_ref();

    let first = PageRequest {
        cursor: None,
        page_size: ctx.page_size(),
    };
    let records = paginate(first, ctx.max_items(), |page| {
        let handle = handle.clone();
        let prefix = prefix.clone();
        let policy = policy.clone();
        async move {
            retry_with(
                &policy,
                || queues::list(&handle, page.clone(), prefix.as_deref()),
                |err, attempt| reporter.update(&format!("再試行中 ({attempt}回目): {err}")),
            )
            .await
        }
    })
    .await
    .map_err(|err| classify(Box::new(err), "ListQueues", None))?;

    progress.finish(&format!("{}件のキューを取得しました", records.len()));
    ctx.emit(&records, "キューはありません");
    Ok(())
}
