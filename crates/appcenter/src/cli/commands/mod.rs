//! CLI commands

mod app;
mod completions;
mod devices;
mod fetch_version;
mod groups;
mod upload;
mod urls;

pub use app::AppCommand;
pub use completions::CompletionsCommand;
pub use devices::DevicesCommand;
pub use fetch_version::FetchVersionCommand;
pub use groups::GroupsCommand;
pub use upload::UploadCommand;
pub use urls::UrlsCommand;
