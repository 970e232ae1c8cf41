//! subgen - Translated subtitles from speech recognition
//!
//! Turns word-timed speech recognition results into SubRip cues, translates
//! their text and carries the translation back onto the original timing.
//! Media handling uses ffmpeg, translation uses ollama.

pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod recognize;
pub mod segment;
pub mod source;
pub mod storage;
pub mod subtitle;
pub mod translate;
pub mod update;
pub mod workflow;
