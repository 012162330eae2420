//! Selects files from a directory tree with a small rule file and concatenates
//! them into one annotated context document.

pub mod app;
