// crates/filer-cli/src/commands/presets.rs - Client preset commands
//
// `filer filezilla blog.dev` and friends are thin presets over `open`. Each
// preset checks its own platform restriction first, then fills in the client,
// its arguments and (for Cyberduck on Windows) persistence.

use anyhow::Result;

use filer_core::client::Preset;
use filer_core::error::FilerError;

use crate::commands::open::{self, OpenRequest};
use crate::context::Context;

pub fn handle(ctx: &Context, preset: Preset, site_env: String) -> Result<i32> {
    let request = preset.request(ctx.profile()).map_err(FilerError::from)?;
    tracing::debug!(%preset, ?request, "expanded preset");

    open::handle(
        ctx,
        OpenRequest {
            site_env,
            selection: request.selection,
            persist: request.persist,
        },
    )
}
