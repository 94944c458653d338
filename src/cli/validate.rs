use std::path::PathBuf;
use crate::cli::commands::ValidateArgs;
use crate::config;
use crate::errors::RemediatorError;

pub async fn handle_validate(args: ValidateArgs) -> Result<(), RemediatorError> {
    let path = PathBuf::from(&args.config);
    let config = config::parse_config(&path).await?;
    println!("Configuration is valid: {}", args.config);
    if let Some(repo) = &config.repository {
        println!("  repository:  {}", repo);
    }
    if let Some(branch) = &config.base_branch {
        println!("  base branch: {}", branch);
    }
    Ok(())
}
