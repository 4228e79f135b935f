//! Lamport logical clock.
//!
//! One instance lives in the coordinator and one in every participant. The
//! counter never decreases: local events advance it by exactly one, and
//! observing a remote event with timestamp `t` advances it to
//! `max(current, t) + 1`.

/// A monotonically non-decreasing logical counter.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LamportClock(u64);

impl LamportClock {
    /// Create a clock at 0.
    pub fn new() -> Self {
        Self(0)
    }

    /// Current value without advancing.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Advance for a purely local event (keystroke, self-initiated
    /// join/leave) and return the new value.
    pub fn tick(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    /// Advance for a cross-process receipt carrying timestamp `observed` and
    /// return the new value: `max(current, observed) + 1`.
    ///
    /// The rule is total; an absent or malformed timestamp is fed in as 0 and
    /// degenerates to a plain local advance.
    pub fn observe(&mut self, observed: u64) -> u64 {
        self.0 = self.0.max(observed) + 1;
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clock_starts_at_zero() {
        // テスト項目: 新しいクロックは 0 から始まる
        let clock = LamportClock::new();
        assert_eq!(clock.value(), 0);
    }

    #[test]
    fn test_tick_advances_by_one() {
        // テスト項目: ローカルイベントはクロックをちょうど 1 進める
        // given (前提条件):
        let mut clock = LamportClock::new();

        // when (操作):
        let first = clock.tick();
        let second = clock.tick();

        // then (期待する結果):
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(clock.value(), 2);
    }

    #[test]
    fn test_observe_ahead_of_local() {
        // テスト項目: 受信タイムスタンプが自分より進んでいる場合は max(current, t) + 1
        // given (前提条件):
        let mut clock = LamportClock::new();
        clock.tick(); // 1

        // when (操作):
        let advanced = clock.observe(5);

        // then (期待する結果):
        assert_eq!(advanced, 6);
    }

    #[test]
    fn test_observe_behind_local_still_advances() {
        // テスト項目: 受信タイムスタンプが遅れていてもクロックは必ず進む
        // given (前提条件):
        let mut clock = LamportClock::new();
        for _ in 0..5 {
            clock.tick();
        }

        // when (操作):
        let advanced = clock.observe(2);

        // then (期待する結果): 巻き戻らず 5 -> 6
        assert_eq!(advanced, 6);
    }

    #[test]
    fn test_observe_zero_is_local_advance() {
        // テスト項目: 欠落タイムスタンプ（0 扱い）は単なるローカル進行になる
        let mut clock = LamportClock::new();
        clock.tick(); // 1
        assert_eq!(clock.observe(0), 2);
    }

    #[test]
    fn test_monotonicity_over_mixed_events() {
        // テスト項目: tick と observe をどう混ぜても値の列は単調非減少
        // given (前提条件):
        let mut clock = LamportClock::new();
        let mut seen = vec![clock.value()];

        // when (操作):
        for observed in [3, 0, 10, 1, 7] {
            seen.push(clock.tick());
            seen.push(clock.observe(observed));
        }

        // then (期待する結果):
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_causal_advancement() {
        // テスト項目: 送信側の値 t を受け取った側のクロックは必ず t より大きくなる
        // given (前提条件):
        let mut sender = LamportClock::new();
        let mut receiver = LamportClock::new();

        // when (操作): 送信側がイベントを発生させ、受信側が観測する
        let sent_at = sender.tick();
        let received_at = receiver.observe(sent_at);

        // then (期待する結果):
        assert!(received_at > sent_at);
    }
}
