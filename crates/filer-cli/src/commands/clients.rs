// crates/filer-cli/src/commands/clients.rs - List known clients
//
// Shows what the registry knows for the running platform, including install
// paths after config and environment overrides.

use anyhow::Result;
use console::style;

use filer_core::bookmark::BookmarkGenerator;
use filer_core::client::ClientDescriptor;

use crate::context::Context;

pub fn handle(ctx: &Context) -> Result<i32> {
    let profile = ctx.profile();

    println!("{} ({})", style("Platform").bold(), profile.platform());
    println!();
    println!("{}", style("Apps").bold());
    for (client, path) in profile.apps() {
        let bookmarks = if BookmarkGenerator::supports(profile, &ClientDescriptor::app(path)) {
            "  [bookmarks]"
        } else {
            ""
        };
        println!("  {:<10} {}{}", client.key(), path, bookmarks);
    }

    println!();
    println!("{}", style("Bundles").bold());
    if profile.bundles().is_empty() {
        println!("  (not supported on {})", profile.platform());
    }
    for bundle in profile.bundles() {
        println!("  {bundle}");
    }

    Ok(0)
}
