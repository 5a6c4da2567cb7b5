//! Build command implementation.

use graven_core::project_type::ProjectType;
use graven_ops::ops_build::{self, BuildOptions};
use graven_util::errors::GravenError;
use miette::Result;

use crate::cli::BuildArgs;

pub async fn exec(args: BuildArgs, verbose: bool) -> Result<()> {
    let project_type = match (args.cmd, args.project_type) {
        (Some(cmd), _) => Some(ProjectType::custom(cmd)),
        (None, Some(name)) => Some(name.parse::<ProjectType>()?),
        (None, None) => None,
    };

    let opts = BuildOptions {
        java: args.java,
        project_type,
        image: args.image,
        docker_host: args.docker_host,
        timeout: args.timeout,
        artifacts: args.artifacts,
        verbose,
        quiet: args.json,
    };
    let outcome = ops_build::build(&args.path, &opts).await?;

    if args.json {
        let json = serde_json::to_string_pretty(&outcome).map_err(|e| GravenError::Generic {
            message: format!("Failed to serialize build outcome: {e}"),
        })?;
        println!("{json}");
    } else {
        for artifact in &outcome.artifacts {
            println!("Artifact {}", artifact.display());
        }
    }

    if outcome.timed_out {
        return Err(GravenError::Build {
            message: format!("container {} exceeded the timeout", outcome.container_id),
        }
        .into());
    }
    if !outcome.success() {
        return Err(GravenError::Build {
            message: format!(
                "container {} exited with code {}",
                outcome.container_id,
                outcome.exit_code.unwrap_or(-1)
            ),
        }
        .into());
    }
    Ok(())
}
