//! CLI command implementations.

pub(crate) mod annotate;
pub(crate) mod decode;
pub(crate) mod link;

pub(crate) use annotate::AnnotateArgs;
pub(crate) use decode::DecodeArgs;
pub(crate) use link::LinkArgs;
