pub mod provider;
pub mod types;
pub mod github;
pub mod fake;

pub use provider::SecurityPlatform;
pub use types::{AlertPage, PullRequestRequest};
pub use github::GitHubPlatform;
pub use fake::FakePlatform;
