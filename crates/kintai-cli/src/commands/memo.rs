//! Memo page: shared notes visible to every signed-in user.

use kintai_api_models::{Memo, MemoRequest};
use tracing::warn;

use crate::cli::{MemoAddArgs, OutputFormat};
use crate::client::{AppContext, CliResult, classify_client_error};
use crate::output::render_memos;
use crate::page::require_session;

pub(crate) async fn handle_list(ctx: &AppContext, format: OutputFormat) -> CliResult<()> {
    require_session(ctx).await?;
    render_memos(&fetch_memos(ctx).await, format)
}

pub(crate) async fn handle_add(
    ctx: &AppContext,
    args: MemoAddArgs,
    format: OutputFormat,
) -> CliResult<()> {
    require_session(ctx).await?;
    let request = MemoRequest::new(args.title, args.content)?;
    ctx.backend
        .create_memo(&request)
        .await
        .map_err(classify_client_error)?;
    render_memos(&fetch_memos(ctx).await, format)
}

async fn fetch_memos(ctx: &AppContext) -> Vec<Memo> {
    ctx.backend.list_memos().await.unwrap_or_else(|err| {
        warn!(error = %err, "memo list unavailable");
        Vec::new()
    })
}
