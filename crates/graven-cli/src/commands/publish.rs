//! Publish command implementation.

use miette::Result;

use graven_ops::ops_publish::{self, PublishOptions};

use crate::cli::PublishArgs;

pub async fn exec(args: PublishArgs) -> Result<()> {
    let opts = PublishOptions {
        files: args.files,
        group: args.group,
        artifact: args.artifact,
        version: args.version,
        dry_run: args.dry_run,
    };
    let plan = ops_publish::publish(&args.path, &opts).await?;

    if opts.dry_run {
        println!(
            "Would publish {} to {} ({}):",
            plan.publication, plan.repository.name, plan.repository.url
        );
        for upload in &plan.uploads {
            println!("  {} ({} bytes)", upload.url, upload.data.len());
        }
    }
    Ok(())
}
