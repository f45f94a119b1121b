//! Tool execution layer
//!
//! This module contains the `dotnet` command contracts and the runners that
//! carry them out.

mod dotnet;
pub mod fakes;
mod process;
mod traits;

pub use dotnet::{
    BuildOptions, DotnetCli, DotnetCommand, PackOptions, PublishOptions, RestoreOptions,
    SYMBOL_PROPERTIES, TestOptions,
};
pub use fakes::RecordingRunner;
pub use process::{ProcessConfig, ProcessRunner};
pub use traits::{ToolOutput, ToolRunner};
