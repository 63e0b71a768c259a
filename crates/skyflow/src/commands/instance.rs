use crate::commands::CommandContext;
use skyflow_core::{
    DomainError, PageRequest, Progress, Result, RetryPolicy, classify, paginate, retry,
    retry_with,
};
use skyflow_cloud_aws::instances;

/// インスタンス一覧を表示
pub async fn list(ctx: CommandContext, state: Option<String>) -> Result<()> {
    let handle = ctx.handle().await?;
    let policy = RetryPolicy::transient();
    let progress = ctx.progress("インスタンス一覧を取得中...");
    let reporter: &dyn Progress = progress.as_ref();

    let first = PageRequest {
        cursor: None,
        page_size: ctx.page_size(),
    };
    let records = paginate(first, ctx.max_items(), |page| {
        let handle = handle.clone();
        let state = state.clone();
        let policy = policy.clone();
        async move {
            retry_with(
                &policy,
                || instances::list(&handle, page.clone(), state.as_deref()),
                |err, attempt| reporter.update(&format!("再試行中 ({attempt}回目): {err}")),
            )
            .await
        }
    })
    .await
    .map_err(|err| classify(Box::new(err), "DescribeInstances", None))?;

    progress.finish(&format!("{}件のインスタンスを取得しました", records.len()));
    ctx.emit(&records, "インスタンスはありません");
    Ok(())
}

/// インスタンスの詳細を表示
pub async fn describe(ctx: CommandContext, instance_id: String) -> Result<()> {
    if !instance_id.starts_with("i-") {
        return Err(DomainError::validation(
            "DescribeInstances",
            format!("'{instance_id}' はインスタンスIDの形式ではありません (例: i-0abc1234)"),
        )
        .with_resource(instance_id));
    }

    let handle = ctx.handle().await?;
    let policy = RetryPolicy::transient();
    let progress = ctx.progress("インスタンス情報を取得中...");

    let record = retry(&policy, || instances::describe(&handle, &instance_id))
        .await
        .map_err(|err| classify(Box::new(err), "DescribeInstances", Some(&instance_id)))?;

    progress.finish("取得しました");
    ctx.emit(&[record], "該当するインスタンスはありません");
    Ok(())
}
