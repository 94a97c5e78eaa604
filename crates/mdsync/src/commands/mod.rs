//! CLI command implementations.

pub(crate) mod export;
pub(crate) mod upload;

pub(crate) use export::ExportArgs;
pub(crate) use upload::UploadArgs;
