use serde::{Deserialize, Serialize};

/// Where a message is delivered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destination {
    pub channel_id: String,
}

impl Destination {
    pub fn channel(id: impl Into<String>) -> Self {
        Self {
            channel_id: id.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
}

impl Embed {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(EmbedField {
            name: name.into(),
            value: value.into(),
            inline: false,
        });
        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    /// Plain-text rendering for transports without embed support.
    pub fn to_text(&self) -> String {
        let mut out = format!("**{}**", self.title);
        if let Some(desc) = &self.description {
            out.push('\n');
            out.push_str(desc);
        }
        for field in &self.fields {
            out.push_str(&format!("\n{}: {}", field.name, field.value));
        }
        out
    }
}

/// A message as the core produces it: plain text or a structured embed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboundMessage {
    Text { content: String },
    Embed { embed: Embed },
}

impl OutboundMessage {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self::Embed { embed }
    }

    pub fn plain_text(&self) -> String {
        match self {
            OutboundMessage::Text { content } => content.clone(),
            OutboundMessage::Embed { embed } => embed.to_text(),
        }
    }
}

/// Dispatcher output for one command.
pub type Reply = OutboundMessage;
