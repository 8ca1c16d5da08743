mod stats_mgr;

use anyhow::Error;
use teloxide::prelude::*;
use teloxide::types::BotCommand;

use crate::{
    module_mgr::Module,
    types::{HandlerResult, TeloxideHandler},
    utils::dptree_ext::command_filter,
};
pub(crate) use stats_mgr::StatsManager;

async fn show_stats(bot: Bot, msg: Message, stats_mgr: StatsManager) -> HandlerResult {
    let report = stats_mgr.snapshot().report();
    bot.send_message(msg.chat.id, report).await?;
    Ok(())
}

pub(crate) struct Stats {
    stats_mgr: StatsManager,
}

impl Stats {
    pub(crate) fn new(stats_mgr: StatsManager) -> Self {
        Self { stats_mgr }
    }
}

#[async_trait]
impl Module for Stats {
    async fn register_dependency(&mut self, dep_map: &mut DependencyMap) -> Result<(), Error> {
        dep_map.insert(self.stats_mgr.clone());
        Ok(())
    }

    fn handler_chain(&self) -> TeloxideHandler {
        dptree::entry().branch(
            Update::filter_message()
                .branch(dptree::filter(command_filter("stats")).endpoint(show_stats)),
        )
    }

    fn commands(&self) -> Vec<BotCommand> {
        vec![BotCommand::new("stats", "Show uptime and GIF statistics")]
    }
}
