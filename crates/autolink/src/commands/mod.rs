//! CLI command implementations.

pub(crate) mod admin;
pub(crate) mod check;
pub(crate) mod rewrite;

pub(crate) use admin::AdminArgs;
pub(crate) use check::CheckArgs;
pub(crate) use rewrite::RewriteArgs;
