mod job;
mod telegram;

use std::sync::Arc;

use anyhow::Error;
use teloxide::dptree::di::DependencySupplier;
use teloxide::prelude::*;
use teloxide::types::BotCommand;

use crate::{
    config::SharedConfig,
    module_mgr::Module,
    modules::stats::StatsManager,
    render::Renderer,
    types::{HandlerResult, TeloxideHandler},
    utils::dptree_ext::command_filter,
};
use job::JobContext;
use telegram::TelegramChannel;

async fn gif_intro(bot: Bot, msg: Message, config: SharedConfig) -> HandlerResult {
    bot.send_message(msg.chat.id, &config.i18n.gif_intro_prompt)
        .await?;
    Ok(())
}

async fn handle_photo(
    bot: Bot,
    msg: Message,
    renderer: Renderer,
    stats_mgr: StatsManager,
    config: SharedConfig,
) -> HandlerResult {
    let request_id = job::new_request_id();
    info!(
        "Request {} from chat {} ({} photo variants)",
        request_id,
        msg.chat.id,
        msg.photo().map(|p| p.len()).unwrap_or(0)
    );

    let ctx = JobContext {
        renderer: &renderer,
        stats_mgr: &stats_mgr,
        i18n: &config.i18n,
        timeout: config.request_timeout(),
    };
    let mut channel = TelegramChannel::new(bot, msg);
    let stage = job::run(&mut channel, &ctx, &request_id).await;
    debug!("Request {} finished as {:?}", request_id, stage);
    Ok(())
}

pub(crate) struct Gif;

#[async_trait]
impl Module for Gif {
    async fn register_dependency(&mut self, dep_map: &mut DependencyMap) -> Result<(), Error> {
        let config: Arc<SharedConfig> = dep_map.get();

        let renderer = Renderer::new(config.render_settings(), config.max_concurrent_renders)
            .with_seed(config.artistic_seed);
        dep_map.insert(renderer);
        Ok(())
    }

    fn handler_chain(&self) -> TeloxideHandler {
        dptree::entry().branch(
            Update::filter_message()
                .branch(dptree::filter(command_filter("gif")).endpoint(gif_intro))
                .branch(dptree::filter(|msg: Message| msg.photo().is_some()).endpoint(handle_photo)),
        )
    }

    fn commands(&self) -> Vec<BotCommand> {
        vec![BotCommand::new("gif", "Create an animated GIF from a photo")]
    }
}
