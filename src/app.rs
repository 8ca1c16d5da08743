//! Running the bot inside your own process.

use anyhow::Error;
use teloxide::{prelude::*, types::MenuButton};

use crate::{
    config::{Config, SharedConfig},
    dispatcher::build_dispatcher,
    module_mgr::ModuleManager,
    modules::gif::Gif,
    modules::help::Help,
    modules::stats::{Stats, StatsManager},
    types::HandlerResult,
};

async fn update_menu(bot: Bot, module_mgr: &ModuleManager) -> HandlerResult {
    let commands = module_mgr.commands();
    bot.set_my_commands(commands).await?;
    Ok(())
}

async fn init_bot(config: &Config, module_mgr: &ModuleManager) -> Result<Bot, Error> {
    let bot = Bot::new(&config.telegram_bot_token);
    bot.set_chat_menu_button()
        .menu_button(MenuButton::Commands)
        .await?;
    update_menu(bot.clone(), module_mgr).await?;
    Ok(bot)
}

/// Serves the bot until it is interrupted with Ctrl-C.
pub async fn run(config: SharedConfig) {
    debug!("Initializing modules...");
    let stats_mgr = StatsManager::new();
    let mut module_mgr = ModuleManager::new();
    module_mgr.register_module(crate::modules::config::Config::new(config.clone()));
    module_mgr.register_module(Gif);
    module_mgr.register_module(Stats::new(stats_mgr.clone()));
    let help = Help::new(module_mgr.commands());
    module_mgr.register_module(help);

    info!("Initializing bot...");
    let bot = match init_bot(&config, &module_mgr).await {
        Ok(bot) => bot,
        Err(err) => {
            error!("Failed to init bot: {}", err);
            return;
        }
    };

    let mut built_dispatcher = match build_dispatcher(bot, module_mgr).await {
        Ok(dispatcher) => dispatcher,
        Err(err) => {
            error!("Failed to init modules: {}", err);
            return;
        }
    };
    info!("Bot is started!");
    built_dispatcher.dispatch().await;

    info!("Bot is stopped: {}", stats_mgr.snapshot().summary());
}
