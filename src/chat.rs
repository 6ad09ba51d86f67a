//! Append-only chat transcript.

use chrono::{DateTime, Local};
use uuid::Uuid;

/// Who wrote a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
	/// The person exploring the repository.
	User,
	/// The answering service.
	Assistant,
}

/// One transcript entry.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
	/// Unique id.
	pub id: String,
	/// Message text.
	pub content: String,
	/// Author.
	pub role: Role,
	/// Creation time.
	pub timestamp: DateTime<Local>,
}

impl ChatMessage {
	fn new(role: Role, content: impl Into<String>) -> Self {
		Self {
			id: Uuid::new_v4().to_string(),
			content: content.into(),
			role,
			timestamp: Local::now(),
		}
	}

	/// A message typed by the user.
	pub fn user(content: impl Into<String>) -> Self {
		Self::new(Role::User, content)
	}

	/// A message from the service.
	pub fn assistant(content: impl Into<String>) -> Self {
		Self::new(Role::Assistant, content)
	}

	/// Wall-clock time as `HH:MM:SS`.
	pub fn time_label(&self) -> String {
		self.timestamp.format("%H:%M:%S").to_string()
	}
}

/// Ordered messages for the current repository.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChatLog {
	messages: Vec<ChatMessage>,
}

impl ChatLog {
	/// Fresh transcript greeting the user about `repo_name`.
	pub fn welcome(repo_name: &str) -> Self {
		let mut log = Self::default();
		log.push(ChatMessage::assistant(format!(
			"I'm ready to answer questions about the repository \"{repo_name}\". How can I help you?"
		)));
		log
	}

	/// Append a message.
	pub fn push(&mut self, message: ChatMessage) {
		self.messages.push(message);
	}

	/// All messages, oldest first.
	pub fn messages(&self) -> &[ChatMessage] {
		&self.messages
	}

	/// Whether the transcript is empty.
	pub fn is_empty(&self) -> bool {
		self.messages.is_empty()
	}
}
