//! Word-paced reveal of streaming reply text.
//!
//! Network deltas arrive in bursts; showing them raw makes replies appear
//! in jerky slabs. The typewriter decouples the two rates: committed text
//! grows as fast as the stream delivers it, while the visible prefix grows
//! one word per pacing interval. Historical messages bypass the typewriter
//! entirely and render in full.
//!
//! Scheduling is deadline-based against an explicit [`Instant`] so the
//! event loop can sleep exactly until the next reveal and tests can drive
//! the clock by hand. All pending reveals are owned by the instance;
//! tearing it down cancels them synchronously, so a stale reveal can never
//! touch a finalized or reused message.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::core::message::MessageId;

/// One scheduled reveal: extend the visible prefix by `len` bytes once
/// `due` has passed.
#[derive(Debug)]
struct RevealUnit {
    len: usize,
    due: Instant,
}

#[derive(Debug)]
pub struct Typewriter {
    message_id: MessageId,
    committed: String,
    /// Byte length of the visible prefix of `committed`.
    visible_len: usize,
    /// Byte length of the prefix already split into reveal units.
    scheduled_len: usize,
    pending: VecDeque<RevealUnit>,
    interval: Duration,
    stream_done: bool,
}

impl Typewriter {
    /// Animating instance for the live streaming target. The visible prefix
    /// starts empty and chases the committed text word by word.
    pub fn animating(message_id: MessageId, interval: Duration) -> Self {
        Self {
            message_id,
            committed: String::new(),
            visible_len: 0,
            scheduled_len: 0,
            pending: VecDeque::new(),
            interval,
            stream_done: false,
        }
    }

    pub fn owns(&self, message_id: MessageId) -> bool {
        self.message_id == message_id
    }

    /// Append a freshly received delta and schedule its words.
    ///
    /// Units chain one interval apart: the first word of a batch lands
    /// immediately when nothing is queued, and behind the queue otherwise;
    /// later deltas never restart the cadence. A trailing word fragment not
    /// yet terminated by whitespace is held back until more text (or
    /// end-of-stream) completes it.
    pub fn append_delta(&mut self, delta: &str, now: Instant) {
        if delta.is_empty() {
            return;
        }
        self.committed.push_str(delta);
        self.schedule_units(now, false);
    }

    /// No further deltas will arrive. Any held-back tail is scheduled and
    /// the animation drains naturally at the pacing interval.
    pub fn mark_stream_done(&mut self, now: Instant) {
        self.stream_done = true;
        self.schedule_units(now, true);
    }

    fn schedule_units(&mut self, now: Instant, flush: bool) {
        let mut due = match self.pending.back() {
            Some(last) => last.due + self.interval,
            None => now,
        };
        while let Some(len) = next_reveal_unit(&self.committed[self.scheduled_len..], flush) {
            self.pending.push_back(RevealUnit { len, due });
            self.scheduled_len += len;
            due += self.interval;
        }
    }

    /// Reveal every unit whose deadline has passed. Returns whether the
    /// visible text changed, which is the shell's cue to re-render.
    pub fn advance(&mut self, now: Instant) -> bool {
        let mut changed = false;
        while let Some(front) = self.pending.front() {
            if front.due > now {
                break;
            }
            self.visible_len += front.len;
            self.pending.pop_front();
            changed = true;
        }
        changed
    }

    /// When the next reveal is due, if any. Lets the event loop sleep
    /// exactly long enough instead of polling at the pacing interval.
    pub fn next_due(&self) -> Option<Instant> {
        self.pending.front().map(|unit| unit.due)
    }

    /// Cancel every scheduled-but-unfired reveal. The visible prefix stays
    /// where it is; no further mutation can occur.
    pub fn cancel_pending(&mut self) {
        self.pending.clear();
        self.scheduled_len = self.visible_len;
    }

    pub fn visible(&self) -> &str {
        &self.committed[..self.visible_len]
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    /// The visible prefix has reached the latest committed text. While the
    /// stream is still open this is when the caret affordance shows.
    pub fn is_caught_up(&self) -> bool {
        self.visible_len == self.committed.len()
    }

    /// Stream ended and the animation has fully drained; the instance can
    /// be dropped and the message rendered through the historical path.
    pub fn is_drained(&self) -> bool {
        self.stream_done && self.is_caught_up()
    }
}

/// Byte length of the first complete reveal unit of `text`, or `None` if
/// the text holds no complete unit yet.
///
/// A unit is an optional run of leading whitespace, a maximal run of
/// non-whitespace, and any trailing whitespace, so consecutive units tile
/// the committed text exactly and the visible text is always a true prefix.
/// A unit is complete once at least one trailing whitespace character
/// terminates the word; with `flush` set the remainder counts as a final
/// unit regardless.
fn next_reveal_unit(text: &str, flush: bool) -> Option<usize> {
    let mut chars = text.char_indices().peekable();

    // Leading whitespace belongs to the unit it precedes.
    while let Some((_, c)) = chars.peek() {
        if !c.is_whitespace() {
            break;
        }
        chars.next();
    }

    let mut saw_word = false;
    while let Some((_, c)) = chars.peek() {
        if c.is_whitespace() {
            break;
        }
        saw_word = true;
        chars.next();
    }

    let mut end = None;
    while let Some((i, c)) = chars.peek() {
        if !c.is_whitespace() {
            break;
        }
        end = Some(i + c.len_utf8());
        chars.next();
    }

    match end {
        // Word terminated by whitespace: complete whether or not more
        // whitespace follows later (that attaches to the next unit).
        Some(end) if saw_word => Some(end),
        _ if flush && !text.is_empty() => Some(text.len()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(85);

    fn typewriter() -> (Typewriter, Instant) {
        let now = Instant::now();
        (Typewriter::animating(MessageId(0), INTERVAL), now)
    }

    fn far_future(start: Instant) -> Instant {
        start + Duration::from_secs(3600)
    }

    #[test]
    fn unit_splitting_tiles_the_text() {
        assert_eq!(next_reveal_unit("Hello world", false), Some("Hello ".len()));
        assert_eq!(next_reveal_unit("  Hello  world", false), Some("  Hello  ".len()));
        assert_eq!(next_reveal_unit("Hello", false), None);
        assert_eq!(next_reveal_unit("Hello", true), Some(5));
        assert_eq!(next_reveal_unit("   ", false), None);
        assert_eq!(next_reveal_unit("   ", true), Some(3));
        assert_eq!(next_reveal_unit("", true), None);
        assert_eq!(next_reveal_unit("line\nbreak", false), Some("line\n".len()));
    }

    #[test]
    fn converges_to_the_concatenation_of_all_deltas() {
        let (mut tw, start) = typewriter();
        let deltas = ["Care", "ers in ", "biology:\n", " research, ", "teaching."];
        let mut now = start;
        for delta in deltas {
            tw.append_delta(delta, now);
            now += Duration::from_millis(7);
        }
        tw.mark_stream_done(now);
        tw.advance(far_future(start));

        assert_eq!(tw.visible(), deltas.concat());
        assert!(tw.is_drained());
    }

    #[test]
    fn visible_is_always_a_prefix_of_committed() {
        let (mut tw, start) = typewriter();
        tw.append_delta("one two three ", start);
        tw.append_delta("four five", start + Duration::from_millis(40));

        let mut now = start;
        for _ in 0..20 {
            now += Duration::from_millis(30);
            tw.advance(now);
            assert!(tw.committed().starts_with(tw.visible()));
            assert!(tw.visible().len() <= tw.committed().len());
        }
    }

    #[test]
    fn words_reveal_one_interval_apart() {
        let (mut tw, start) = typewriter();
        tw.append_delta("a b c ", start);

        tw.advance(start);
        assert_eq!(tw.visible(), "a ");
        tw.advance(start + INTERVAL);
        assert_eq!(tw.visible(), "a b ");
        // Just shy of the next deadline: nothing new.
        assert!(!tw.advance(start + 2 * INTERVAL - Duration::from_millis(1)));
        assert!(tw.advance(start + 2 * INTERVAL));
        assert_eq!(tw.visible(), "a b c ");
    }

    #[test]
    fn later_deltas_queue_behind_pending_units() {
        let (mut tw, start) = typewriter();
        tw.append_delta("one two ", start);
        // Second batch arrives before anything was revealed; its first word
        // must land after the queued ones, not restart at `now`.
        tw.append_delta("three ", start + Duration::from_millis(10));

        tw.advance(start + Duration::from_millis(10));
        assert_eq!(tw.visible(), "one ");
        tw.advance(start + INTERVAL);
        assert_eq!(tw.visible(), "one two ");
        tw.advance(start + 2 * INTERVAL);
        assert_eq!(tw.visible(), "one two three ");
    }

    #[test]
    fn idle_queue_reveals_first_word_of_a_batch_immediately() {
        let (mut tw, start) = typewriter();
        tw.append_delta("first ", start);
        tw.advance(start);
        assert_eq!(tw.visible(), "first ");

        // Queue fully drained; a later delta starts its own cadence.
        let later = start + Duration::from_secs(2);
        tw.append_delta("second ", later);
        assert!(tw.advance(later));
        assert_eq!(tw.visible(), "first second ");
    }

    #[test]
    fn partial_word_is_held_until_completed() {
        let (mut tw, start) = typewriter();
        tw.append_delta("Hel", start);
        tw.advance(far_future(start));
        assert_eq!(tw.visible(), "");

        tw.append_delta("lo wor", start + Duration::from_millis(5));
        tw.advance(far_future(start));
        assert_eq!(tw.visible(), "Hello ");

        tw.append_delta("ld", start + Duration::from_millis(9));
        tw.mark_stream_done(start + Duration::from_millis(9));
        tw.advance(far_future(start));
        assert_eq!(tw.visible(), "Hello world");
    }

    #[test]
    fn stream_end_drains_at_the_pacing_interval() {
        let (mut tw, start) = typewriter();
        tw.append_delta("alpha beta gamma", start);
        tw.mark_stream_done(start);

        tw.advance(start);
        assert_eq!(tw.visible(), "alpha ");
        assert!(!tw.is_drained());
        tw.advance(start + 2 * INTERVAL);
        assert_eq!(tw.visible(), "alpha beta gamma");
        assert!(tw.is_drained());
    }

    #[test]
    fn cancel_pending_stops_all_future_mutation() {
        let (mut tw, start) = typewriter();
        tw.append_delta("one two three four ", start);
        tw.advance(start);
        let frozen = tw.visible().to_string();

        tw.cancel_pending();
        // Fake clock well past every scheduled deadline: nothing may move.
        assert!(!tw.advance(far_future(start)));
        assert_eq!(tw.visible(), frozen);
        assert!(tw.next_due().is_none());
    }

    #[test]
    fn appending_after_cancel_keeps_the_prefix_invariant() {
        let (mut tw, start) = typewriter();
        tw.append_delta("one two ", start);
        tw.advance(start);
        tw.cancel_pending();

        tw.append_delta("three ", start + INTERVAL);
        tw.advance(far_future(start));
        assert!(tw.committed().starts_with(tw.visible()));
        assert!(tw.visible().ends_with("three "));
    }

    #[test]
    fn caught_up_reflects_the_caret_condition() {
        let (mut tw, start) = typewriter();
        assert!(tw.is_caught_up());

        tw.append_delta("word ", start);
        assert!(!tw.is_caught_up());
        tw.advance(start);
        assert!(tw.is_caught_up());
        assert!(!tw.is_drained());
    }

    #[test]
    fn next_due_tracks_the_front_of_the_queue() {
        let (mut tw, start) = typewriter();
        assert!(tw.next_due().is_none());

        tw.append_delta("a b ", start);
        assert_eq!(tw.next_due(), Some(start));
        tw.advance(start);
        assert_eq!(tw.next_due(), Some(start + INTERVAL));
    }

    #[test]
    fn whitespace_only_stream_still_converges() {
        let (mut tw, start) = typewriter();
        tw.append_delta("\n\n", start);
        tw.mark_stream_done(start);
        tw.advance(far_future(start));
        assert_eq!(tw.visible(), "\n\n");
        assert!(tw.is_drained());
    }

    #[test]
    fn multibyte_text_reveals_on_char_boundaries() {
        let (mut tw, start) = typewriter();
        tw.append_delta("naïve café ", start);
        let mut now = start;
        for _ in 0..4 {
            tw.advance(now);
            // Slicing committed at visible_len must always be valid UTF-8.
            let _ = tw.visible().chars().count();
            now += INTERVAL;
        }
        assert_eq!(tw.visible(), "naïve café ");
    }
}
