pub mod hls;
pub mod media;
pub mod streaming;
pub mod transcoding;
