use anyhow::Error;
use teloxide::prelude::*;
use teloxide::types::BotCommand;

use crate::{
    config::SharedConfig,
    module_mgr::Module,
    types::{HandlerResult, TeloxideHandler},
    utils::dptree_ext::command_filter,
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct HelpText(String);

async fn start(bot: Bot, msg: Message, config: SharedConfig) -> HandlerResult {
    bot.send_message(msg.chat.id, &config.i18n.start_prompt)
        .await?;
    Ok(())
}

async fn help(bot: Bot, msg: Message, help_text: HelpText) -> HandlerResult {
    bot.send_message(msg.chat.id, help_text.0).await?;
    Ok(())
}

fn own_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "Start the bot"),
        BotCommand::new("help", "List the available commands"),
    ]
}

fn render_help(commands: &[BotCommand]) -> String {
    let mut text = "Commands:".to_owned();
    for cmd in commands {
        text.push_str(&format!("\n/{} - {}", cmd.command, cmd.description));
    }
    text.push_str("\nOr just send a photo to get an animated GIF.");
    text
}

/// `/start` and `/help`. Must be registered after the modules whose
/// commands it lists.
pub(crate) struct Help {
    help_text: HelpText,
}

impl Help {
    pub(crate) fn new(other_commands: Vec<BotCommand>) -> Self {
        let mut commands = own_commands();
        commands.extend(other_commands);
        Self {
            help_text: HelpText(render_help(&commands)),
        }
    }
}

#[async_trait]
impl Module for Help {
    async fn register_dependency(&mut self, dep_map: &mut DependencyMap) -> Result<(), Error> {
        dep_map.insert(self.help_text.clone());
        Ok(())
    }

    fn handler_chain(&self) -> TeloxideHandler {
        dptree::entry().branch(
            Update::filter_message()
                .branch(dptree::filter(command_filter("start")).endpoint(start))
                .branch(dptree::filter(command_filter("help")).endpoint(help)),
        )
    }

    fn commands(&self) -> Vec<BotCommand> {
        own_commands()
    }
}
