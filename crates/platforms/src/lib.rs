//! Extraction of playable clip streams from KakaoTV.
//!
//! The entry points are [`extractor::platforms::kakaotv::KakaoTv`] for direct
//! use against a known clip, and [`extractor::factory::ExtractorFactory`] for
//! URL-dispatched construction.

pub mod extractor;
pub mod media;
