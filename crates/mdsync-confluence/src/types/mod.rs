//! Confluence API types.

mod document;
mod page;

pub use document::RemoteDocument;
pub use page::{Body, ContentsResponse, Links, Page, Space, Storage, Version};
