mod builder;
mod models;

pub use builder::KakaoTv;
pub use builder::URL_REGEX;
pub use models::{KatzResponse, OembedResponse, VideoLocation};
