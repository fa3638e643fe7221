// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Caption handling for Grounding DINO
//!
//! The text branch expects BERT token ids plus a block-diagonal
//! self-attention mask that keeps each `.`-separated phrase from attending
//! to its neighbours. Position ids restart at every phrase boundary.

use ndarray::{s, Array2, Array3};

/// Maximum number of caption tokens fed to the model
pub const MAX_TEXT_LEN: usize = 256;

/// Tokens that delimit sub-sentences in the caption
pub const SPECIAL_TOKENS: [&str; 4] = ["[CLS]", "[SEP]", ".", "?"];

/// Normalize a caption the way the model was trained on
///
/// Lowercases, trims, and guarantees a trailing ` .` so the final phrase
/// is closed by a delimiter token.
pub fn preprocess_caption(caption: &str) -> String {
    let result = caption.trim().to_lowercase();
    if result.ends_with('.') {
        result
    } else {
        format!("{} .", result)
    }
}

/// Text-side model inputs for a single caption (batch size 1)
#[derive(Debug, Clone)]
pub struct TextInputs {
    pub input_ids: Array2<i64>,
    pub attention_mask: Array2<bool>,
    pub position_ids: Array2<i64>,
    pub token_type_ids: Array2<i64>,
    /// `[1, L, L]` sub-sentence self-attention mask
    pub text_token_mask: Array3<bool>,
}

impl TextInputs {
    /// Build model inputs from tokenizer ids
    ///
    /// `special_ids` are the vocabulary ids of `SPECIAL_TOKENS`. Masks and
    /// position ids are built over the whole sequence, then every input is
    /// cut to `MAX_TEXT_LEN`.
    pub fn from_ids(ids: &[u32], special_ids: &[u32]) -> Self {
        let len = ids.len();

        let input_ids = Array2::from_shape_fn((1, len), |(_, i)| ids[i] as i64);
        let attention_mask = Array2::from_elem((1, len), true);
        let token_type_ids: Array2<i64> = Array2::zeros((1, len));

        let mut text_token_mask = Array3::from_elem((1, len, len), false);
        for i in 0..len {
            text_token_mask[[0, i, i]] = true;
        }
        let mut position_ids: Array2<i64> = Array2::zeros((1, len));

        let mut previous = 0usize;
        for (col, id) in ids.iter().enumerate() {
            if !special_ids.contains(id) {
                continue;
            }

            if col == 0 || col == len - 1 {
                text_token_mask[[0, col, col]] = true;
                position_ids[[0, col]] = 0;
            } else {
                for row in previous + 1..=col {
                    for other in previous + 1..=col {
                        text_token_mask[[0, row, other]] = true;
                    }
                    position_ids[[0, row]] = (row - previous - 1) as i64;
                }
            }
            previous = col;
        }

        let kept = len.min(MAX_TEXT_LEN);
        Self {
            input_ids: input_ids.slice(s![.., ..kept]).to_owned(),
            attention_mask: attention_mask.slice(s![.., ..kept]).to_owned(),
            position_ids: position_ids.slice(s![.., ..kept]).to_owned(),
            token_type_ids: token_type_ids.slice(s![.., ..kept]).to_owned(),
            text_token_mask: text_token_mask.slice(s![.., ..kept, ..kept]).to_owned(),
        }
    }

    pub fn len(&self) -> usize {
        self.input_ids.shape()[1]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
