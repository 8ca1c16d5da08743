use teloxide::prelude::*;
use teloxide::types::Me;

fn matches_command(text: &str, cmd: &str, bot_username: Option<&str>) -> bool {
    let pat = format!("/{}", cmd);
    let Some(rest) = text.strip_prefix(&pat) else {
        return false;
    };

    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        return true;
    }

    // When sending commands in a group, a mention suffix may be attached to
    // the text. For example: "/stats@xxxx_bot".
    match rest.strip_prefix('@') {
        Some(after) => {
            let mention = after.split_whitespace().next().unwrap_or_default();
            bot_username.map(|n| n == mention).unwrap_or(false)
        }
        None => false,
    }
}

pub fn command_filter(cmd: &'static str) -> impl Fn(Message, Me) -> bool {
    move |msg: Message, me: Me| {
        msg.text()
            .map(|text| matches_command(text, cmd, me.username.as_deref()))
            .unwrap_or(false)
    }
}
