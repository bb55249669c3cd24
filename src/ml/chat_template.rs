// ============================================================
// Layer 5 — Chat Template
// ============================================================
// Turns a Conversation into the exact text the model was
// trained to read.
//
// Most checkpoints ship a Jinja2 template in
// tokenizer_config.json ("chat_template"). It is rendered with
// minijinja using the same variables and whitespace settings
// as the HuggingFace tokenizer:
//
//   messages, add_generation_prompt, bos_token, eos_token
//   trim_blocks = true, lstrip_blocks = true
//
// Python string and dict methods used by many templates are
// provided by minijinja-contrib's pycompat layer.
//
// Checkpoints without a template fall back to ChatML:
//
//   <|im_start|>user
//   What is 15% of 240?<|im_end|>
//   <|im_start|>assistant
//
// Reference: minijinja documentation
//            HuggingFace chat templating guide

use anyhow::{Context, Result};
use minijinja::{context, Environment, Error as JinjaError, ErrorKind};

use crate::domain::conversation::Conversation;
use crate::infra::tokenizer_store::TokenizerConfig;

const TEMPLATE_NAME: &str = "chat";

pub enum ChatTemplate {
    Jinja {
        env:       Environment<'static>,
        bos_token: String,
        eos_token: String,
    },
    ChatMl,
}

impl ChatTemplate {
    /// Compile a Jinja2 chat template
    pub fn jinja(source: impl Into<String>, bos_token: &str, eos_token: &str) -> Result<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        // str.strip(), str.startswith(), dict.items() and friends
        env.set_unknown_method_callback(minijinja_contrib::pycompat::unknown_method_callback);
        // Templates call this to reject unsupported conversations
        env.add_function("raise_exception", |msg: String| -> Result<String, JinjaError> {
            Err(JinjaError::new(ErrorKind::InvalidOperation, msg))
        });
        env.add_template_owned(TEMPLATE_NAME, source.into())
            .context("Invalid chat template syntax")?;

        Ok(Self::Jinja {
            env,
            bos_token: bos_token.to_string(),
            eos_token: eos_token.to_string(),
        })
    }

    /// Template from tokenizer_config.json, or ChatML if it has none
    pub fn from_config(config: &TokenizerConfig) -> Result<Self> {
        let source = config.chat_template.as_ref().and_then(|t| t.default_template());
        match source {
            Some(src) => {
                let bos = config.bos_token.as_ref().map(|t| t.content()).unwrap_or("");
                let eos = config.eos_token.as_ref().map(|t| t.content()).unwrap_or("");
                Self::jinja(src, bos, eos)
            }
            None => {
                tracing::warn!("Checkpoint has no chat template, falling back to ChatML");
                Ok(Self::ChatMl)
            }
        }
    }

    /// Render the conversation. With `add_generation_prompt` the
    /// output ends with the opening of an assistant turn.
    pub fn render(&self, conversation: &Conversation, add_generation_prompt: bool) -> Result<String> {
        match self {
            Self::Jinja { env, bos_token, eos_token } => {
                let tmpl = env.get_template(TEMPLATE_NAME)?;
                let text = tmpl
                    .render(context! {
                        messages              => conversation.messages(),
                        add_generation_prompt => add_generation_prompt,
                        bos_token             => bos_token,
                        eos_token             => eos_token,
                    })
                    .context("Chat template render error")?;
                Ok(text)
            }
            Self::ChatMl => {
                let mut text = String::new();
                for msg in conversation.messages() {
                    text.push_str(&format!(
                        "<|im_start|>{}\n{}<|im_end|>\n",
                        msg.role, msg.content
                    ));
                }
                if add_generation_prompt {
                    text.push_str("<|im_start|>assistant\n");
                }
                Ok(text)
            }
        }
    }
}
