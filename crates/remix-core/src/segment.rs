//! Segmenter: splits one provider reply into ordered post candidates.
//!
//! The reply is split on [`SEGMENT_SENTINEL`], each piece is trimmed, and
//! empty pieces plus pieces that look like provider preamble are dropped.
//! Survivors are numbered in order. Matching is exact substring matching on
//! the lowercased piece; there is deliberately no fuzzy matching.

use std::iter::FusedIterator;
use std::str::Split;

use remix_types::generation::{GenerationReply, SEGMENT_SENTINEL};
use remix_types::platform::Platform;
use remix_types::post::Candidate;

/// Lowercase phrases that mark a piece as introductory text, not a post.
pub const PREAMBLE_MARKERS: [&str; 2] = ["here are", "based on"];

/// Returns true if `piece` contains any preamble marker, ignoring case.
pub fn is_preamble(piece: &str) -> bool {
    let lowered = piece.to_lowercase();
    PREAMBLE_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Lazy, single-pass iterator over the candidates in a reply.
///
/// Consuming it is the segmentation; a fresh reply needs a fresh iterator.
pub struct Segments<'a> {
    pieces: Split<'a, &'static str>,
    platform: Platform,
    next_ordinal: usize,
}

impl<'a> Segments<'a> {
    pub fn new(reply: &'a GenerationReply, platform: Platform) -> Self {
        Self {
            pieces: reply.as_str().split(SEGMENT_SENTINEL),
            platform,
            next_ordinal: 0,
        }
    }
}

impl Iterator for Segments<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        for piece in self.pieces.by_ref() {
            let piece = piece.trim();
            if piece.is_empty() || is_preamble(piece) {
                continue;
            }

            let candidate = Candidate {
                content: piece.to_string(),
                platform: self.platform,
                ordinal: self.next_ordinal,
                cycle: 0,
            };
            self.next_ordinal += 1;
            return Some(candidate);
        }
        None
    }
}

impl FusedIterator for Segments<'_> {}

/// Segment a reply into candidates for `platform`.
///
/// An empty result is a valid outcome ("nothing to review"), not an error.
pub fn segment(reply: &GenerationReply, platform: Platform) -> Vec<Candidate> {
    Segments::new(reply, platform).collect()
}
