use super::ClientContext;
use super::render::{self, OutputFormat};
use crate::error::Result;
use std::io;

pub(super) async fn list(ctx: &mut ClientContext, refresh: bool) -> Result<()> {
    let files = ctx
        .service
        .list_spreadsheets(ctx.session.state(), !refresh)
        .await?;

    render::spreadsheets(&mut io::stdout().lock(), &files)
}

pub(super) async fn view(
    ctx: &ClientContext,
    file_id: &str,
    range: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let data = ctx
        .service
        .get_sheet_data(ctx.session.state(), file_id, range)
        .await?;

    render::sheet_data(&mut io::stdout().lock(), &data, format)
}

pub(super) async fn metadata(ctx: &ClientContext, file_id: &str) -> Result<()> {
    let metadata = ctx
        .service
        .get_sheet_metadata(ctx.session.state(), file_id)
        .await?;

    render::metadata(&mut io::stdout().lock(), &metadata)
}
