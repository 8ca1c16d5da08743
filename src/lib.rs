//! A Telegram bot that turns photos into short animated GIFs.
//!
//! Gifsmith is based on the [`teloxide`](https://docs.rs/teloxide/latest/teloxide/)
//! framework and the [`image`](https://docs.rs/image/latest/image/) crate. Every
//! photo sent to the bot is analyzed, matched with one of three animation styles
//! (cinematic, artistic or minimalist) and rendered into a looping GIF.
//!
//! ## Getting Started
//!
//! ### Using via CLI
//!
//! Gifsmith features a single-binary executable, you can serve the bot by simply
//! running the command below:
//!
//! ```shell
//! $ /path/to/gifsmith -c your_config.json
//! ```
//!
//! The configuration is described in [`config`] module.
//!
//! ### Using via library
//!
//! The bot can also run inside your own process, see the [`app`] module. The
//! rendering pipeline has no Telegram dependency and is available on its own
//! in the [`render`] module.

#[macro_use]
extern crate log;
#[macro_use]
extern crate async_trait;

pub mod app;
pub mod config;
mod dispatcher;
mod module_mgr;
mod modules;
pub mod render;
mod types;
mod utils;
