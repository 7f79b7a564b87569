//! Look up English words in an English-Korean web dictionary.
//!
//! The pipeline is [`editor`] (which word?) → [`source`] (raw page text)
//! → [`meaning`] (cleanup) → [`display`], tied together by [`lookup`].

pub mod commands;
pub mod config;
pub mod consts;
pub mod display;
pub mod editor;
pub mod lookup;
pub mod meaning;
pub mod source;
pub mod spinner;
