//! Stowbot Server
//!
//! Slack events webhook that bridges shared files to S3 object storage:
//! uploads files shared in channels, serves presigned download links, and
//! lists bucket contents via slash commands.

pub mod api;
pub mod bridge;
pub mod config;
pub mod s3;
pub mod slack;
