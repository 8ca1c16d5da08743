use anyhow::Error;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{InputFile, MessageId, PhotoSize};

use super::job::{JobChannel, JobError};

/// A [`JobChannel`] replying in the chat the photo was sent to.
pub(crate) struct TelegramChannel {
    bot: Bot,
    msg: Message,
    status_msg: Option<MessageId>,
}

impl TelegramChannel {
    pub(crate) fn new(bot: Bot, msg: Message) -> Self {
        Self {
            bot,
            msg,
            status_msg: None,
        }
    }
}

fn largest_photo(sizes: &[PhotoSize]) -> Option<&PhotoSize> {
    sizes
        .iter()
        .max_by_key(|p| p.width as u64 * p.height as u64)
}

#[async_trait]
impl JobChannel for TelegramChannel {
    async fn fetch_photo(&mut self) -> Result<Vec<u8>, JobError> {
        let photo = self
            .msg
            .photo()
            .and_then(largest_photo)
            .ok_or(JobError::NoPhoto)?;

        let file = self
            .bot
            .get_file(&photo.file.id)
            .await
            .map_err(|err| JobError::Download(err.into()))?;
        let mut bytes = Vec::with_capacity(file.meta.size as usize);
        self.bot
            .download_file(&file.path, &mut bytes)
            .await
            .map_err(|err| JobError::Download(err.into()))?;
        Ok(bytes)
    }

    async fn show_status(&mut self, text: &str) -> Result<(), Error> {
        match self.status_msg {
            Some(id) => {
                self.bot
                    .edit_message_text(self.msg.chat.id, id, text)
                    .await?;
            }
            None => {
                let sent = self
                    .bot
                    .send_message(self.msg.chat.id, text)
                    .reply_to_message_id(self.msg.id)
                    .await?;
                self.status_msg = Some(sent.id);
            }
        }
        Ok(())
    }

    async fn clear_status(&mut self) -> Result<(), Error> {
        if let Some(id) = self.status_msg.take() {
            self.bot.delete_message(self.msg.chat.id, id).await?;
        }
        Ok(())
    }

    async fn send_animation(
        &mut self,
        gif: Vec<u8>,
        file_name: &str,
        caption: &str,
    ) -> Result<(), Error> {
        let file = InputFile::memory(gif).file_name(file_name.to_owned());
        self.bot
            .send_animation(self.msg.chat.id, file)
            .caption(caption)
            .await?;
        Ok(())
    }

    async fn send_text(&mut self, text: &str) -> Result<(), Error> {
        self.bot.send_message(self.msg.chat.id, text).await?;
        Ok(())
    }
}
