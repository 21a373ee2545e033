use clap::Args;
use rama::error::BoxError;

use logwild_lib::utils::env;

#[derive(Debug, Clone, Args)]
/// print the logwild version
pub struct VersionCommand {
    /// print the version as a JSON object
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[allow(clippy::print_stdout)]
pub fn exec(args: VersionCommand) -> Result<(), BoxError> {
    if args.json {
        println!(
            "{}",
            serde_json::json!({
                "version": env::project_version(),
                "revision": env::project_revision(),
            })
        );
    } else {
        println!(
            "{} {} ({})",
            env::project_name(),
            env::project_version(),
            env::project_revision()
        );
    }
    Ok(())
}
