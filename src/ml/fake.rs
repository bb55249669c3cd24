// Deterministic LanguageModel for tests.
//
// Vocabulary is built on the fly: every new whitespace-separated
// word gets the next id. Ids 0 and 1 are the special <bos> and
// <eos> markers. sample() appends a scripted reply, so tests can
// check slicing, decoding and ordering without real weights.

use anyhow::{bail, Result};
use std::cell::RefCell;

use crate::domain::{
    conversation::Conversation,
    traits::{EncodedPrompt, LanguageModel, SamplingParams},
};

pub const BOS: &str = "<bos>";
pub const EOS: &str = "<eos>";
pub const EOS_ID: u32 = 1;

pub struct FakeModel {
    vocab: RefCell<Vec<String>>,
    /// Reply generated for every prompt
    reply: String,
    /// Fail inside sample() on this call (0-based)
    fail_on_call: Option<usize>,
    pub calls:       Vec<SamplingParams>,
    pub max_lengths: RefCell<Vec<usize>>,
}

impl FakeModel {
    pub fn new(reply: &str) -> Self {
        Self {
            vocab:        RefCell::new(vec![BOS.to_string(), EOS.to_string()]),
            reply:        reply.to_string(),
            fail_on_call: None,
            calls:        Vec::new(),
            max_lengths:  RefCell::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    fn id_of(&self, word: &str) -> u32 {
        let mut vocab = self.vocab.borrow_mut();
        match vocab.iter().position(|w| w == word) {
            Some(i) => i as u32,
            None => {
                vocab.push(word.to_string());
                (vocab.len() - 1) as u32
            }
        }
    }
}

impl LanguageModel for FakeModel {
    fn render_chat(&self, conversation: &Conversation) -> Result<String> {
        Ok(format!("{BOS} user: {} {EOS} assistant:", conversation.user_content()))
    }

    fn encode(&self, text: &str, max_length: usize) -> Result<EncodedPrompt> {
        self.max_lengths.borrow_mut().push(max_length);
        let mut input_ids: Vec<u32> = text.split_whitespace().map(|w| self.id_of(w)).collect();
        input_ids.truncate(max_length);
        let attention_mask = vec![1; input_ids.len()];
        Ok(EncodedPrompt { input_ids, attention_mask })
    }

    fn sample(&mut self, prompt: &EncodedPrompt, params: &SamplingParams) -> Result<Vec<u32>> {
        let call = self.calls.len();
        self.calls.push(params.clone());
        if self.fail_on_call == Some(call) {
            bail!("device lost");
        }

        let mut out = prompt.input_ids.clone();
        let reply: Vec<u32> = self.reply
            .split_whitespace()
            .map(|w| self.id_of(w))
            .take(params.max_new_tokens)
            .collect();
        out.extend(reply);
        out.push(EOS_ID);
        Ok(out)
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        let vocab = self.vocab.borrow();
        let words: Vec<&str> = ids
            .iter()
            .filter(|&&id| id > EOS_ID)
            .map(|&id| vocab[id as usize].as_str())
            .collect();
        // Leading space like a byte-level BPE decode
        Ok(format!(" {} ", words.join(" ")))
    }

    fn eos_token_id(&self) -> Option<u32> {
        Some(EOS_ID)
    }
}
