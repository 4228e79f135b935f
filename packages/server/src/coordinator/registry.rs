//! Participant registry and broadcast fan-out.

use std::collections::HashMap;

use banter_shared::{COORDINATOR_ID, ChatEvent, LamportClock, ParticipantId, time};
use tokio::sync::{Mutex, mpsc::UnboundedSender};

use super::{
    error::CoordinatorError,
    report::{BroadcastReport, DeliveryError},
};

/// One registered participant as seen by the coordinator.
struct ParticipantHandle {
    /// Outbound delivery channel. Unbounded, so a slow consumer buffers
    /// instead of blocking the fan-out loop.
    sender: UnboundedSender<ChatEvent>,
    /// Wall-clock join time in Unix milliseconds, for the roster endpoint.
    joined_at: i64,
}

/// Clock and registry behind the single lock.
///
/// Every read-modify-write of either field happens while holding the lock,
/// so no broadcast can iterate the registry mid-mutation and no two relays
/// can stamp the same timestamp onto different events.
struct CoordinatorState {
    clock: LamportClock,
    participants: HashMap<ParticipantId, ParticipantHandle>,
}

/// Result of a successful join.
#[derive(Debug)]
pub struct JoinOutcome {
    /// Roster snapshot to hand back to the joiner, stamped with the clock
    /// value after the join advancement. Read from the same registry state
    /// the join announcement was broadcast from.
    pub roster: ChatEvent,
    /// Per-recipient outcome of the join announcement to the others.
    pub announcement: BroadcastReport,
}

/// Read-only view of one registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantSnapshot {
    pub id: ParticipantId,
    pub joined_at: i64,
}

/// Owner of the participant registry and the shared Lamport clock.
///
/// All connection tasks funnel their joins, relays and leaves through these
/// operations; none of them touches the clock or the map directly.
pub struct Coordinator {
    state: Mutex<CoordinatorState>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CoordinatorState {
                clock: LamportClock::new(),
                participants: HashMap::new(),
            }),
        }
    }

    /// Register a participant and announce it to everyone else.
    ///
    /// The insert, the announcement broadcast and the roster read happen in
    /// one critical section, so the roster the joiner receives reflects
    /// exactly the membership the announcement was sent to.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::DuplicateParticipant`] when the id is
    /// already registered; the stream is not registered and the existing
    /// entry is unaffected.
    pub async fn join(
        &self,
        id: ParticipantId,
        sender: UnboundedSender<ChatEvent>,
    ) -> Result<JoinOutcome, CoordinatorError> {
        let mut state = self.state.lock().await;
        if state.participants.contains_key(&id) {
            return Err(CoordinatorError::DuplicateParticipant(id));
        }

        state.participants.insert(
            id,
            ParticipantHandle {
                sender,
                joined_at: time::unix_timestamp_millis(),
            },
        );

        // Joining is one local event; the announcement and the roster carry
        // the same post-join stamp.
        let stamp = state.clock.tick();
        let announcement =
            ChatEvent::info(id, stamp, format!("participant {id} joined the chat"));
        let report = broadcast(&state.participants, &announcement, Some(id));

        let mut ids: Vec<ParticipantId> = state.participants.keys().copied().collect();
        ids.sort_unstable();
        let listed = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let roster = ChatEvent::info(
            COORDINATOR_ID,
            stamp,
            format!("connected participants: [{listed}]"),
        );

        Ok(JoinOutcome {
            roster,
            announcement: report,
        })
    }

    /// Relay a chat message from a registered sender to everyone else.
    ///
    /// Observing the message advances the clock by the receive rule, and that
    /// value stamps the first recipient's copy; every further recipient is
    /// one more local event and gets a fresh stamp, so recipients of the same
    /// logical message may legitimately see distinct timestamps.
    ///
    /// Delivery is best-effort: failures land in the report and never abort
    /// the loop or error the call.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::UnknownSender`] when the sender is not
    /// registered; the event is dropped.
    pub async fn relay(&self, event: ChatEvent) -> Result<BroadcastReport, CoordinatorError> {
        let mut state = self.state.lock().await;
        if !state.participants.contains_key(&event.participant_id) {
            return Err(CoordinatorError::UnknownSender(event.participant_id));
        }

        let CoordinatorState {
            clock,
            participants,
        } = &mut *state;

        let mut stamp = clock.observe(event.clock);
        let mut report = BroadcastReport::default();
        let mut first = true;
        for (&id, handle) in participants.iter() {
            if id == event.participant_id {
                continue;
            }
            if !first {
                stamp = clock.tick();
            }
            first = false;

            let result = handle
                .sender
                .send(event.restamped(stamp))
                .map_err(|_| DeliveryError::ChannelClosed(id));
            report.record(id, result);
        }
        Ok(report)
    }

    /// Deregister a participant and announce the departure to the rest.
    ///
    /// Idempotent: removing an absent id is a no-op returning `None`, with no
    /// clock advance and no broadcast. Both the explicit Leave event and
    /// disconnect detection route here, so the departure side effects happen
    /// exactly once per participant.
    pub async fn leave(&self, id: ParticipantId) -> Option<BroadcastReport> {
        let mut state = self.state.lock().await;
        state.participants.remove(&id)?;

        let stamp = state.clock.tick();
        let notice = ChatEvent::info(id, stamp, format!("participant {id} left the chat"));
        Some(broadcast(&state.participants, &notice, None))
    }

    /// Snapshot of the current membership, sorted by id.
    pub async fn participants(&self) -> Vec<ParticipantSnapshot> {
        let state = self.state.lock().await;
        let mut snapshot: Vec<ParticipantSnapshot> = state
            .participants
            .iter()
            .map(|(&id, handle)| ParticipantSnapshot {
                id,
                joined_at: handle.joined_at,
            })
            .collect();
        snapshot.sort_unstable_by_key(|p| p.id);
        snapshot
    }

    /// Current value of the coordinator clock.
    pub async fn clock(&self) -> u64 {
        self.state.lock().await.clock.value()
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Send `event` to every registered participant except `exclude`, recording
/// one result per recipient.
fn broadcast(
    participants: &HashMap<ParticipantId, ParticipantHandle>,
    event: &ChatEvent,
    exclude: Option<ParticipantId>,
) -> BroadcastReport {
    let mut report = BroadcastReport::default();
    for (&id, handle) in participants.iter() {
        if Some(id) == exclude {
            continue;
        }
        let result = handle
            .sender
            .send(event.clone())
            .map_err(|_| DeliveryError::ChannelClosed(id));
        report.record(id, result);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use banter_shared::EventKind;
    use tokio::sync::mpsc::{self, UnboundedReceiver, error::TryRecvError};

    async fn join_n(coordinator: &Coordinator, ids: &[ParticipantId]) -> Vec<UnboundedReceiver<ChatEvent>> {
        let mut receivers = Vec::new();
        for &id in ids {
            let (tx, rx) = mpsc::unbounded_channel();
            coordinator.join(id, tx).await.unwrap();
            receivers.push(rx);
        }
        receivers
    }

    fn drain(rx: &mut UnboundedReceiver<ChatEvent>) -> Vec<ChatEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_join_registers_and_returns_roster() {
        // テスト項目: 参加するとレジストリに登録され、参加直後のクロック値で
        //            スタンプされたロスターが返される
        // given (前提条件):
        let coordinator = Coordinator::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        let outcome = coordinator.join(7, tx).await.unwrap();

        // then (期待する結果):
        assert_eq!(coordinator.clock().await, 1);
        assert_eq!(outcome.roster.clock, 1);
        assert_eq!(outcome.roster.kind, EventKind::Info);
        assert_eq!(outcome.roster.participant_id, COORDINATOR_ID);
        assert_eq!(outcome.roster.content, "connected participants: [7]");
        assert_eq!(outcome.announcement.recipients(), 0);
        assert_eq!(coordinator.participants().await.len(), 1);
    }

    #[tokio::test]
    async fn test_join_announces_to_existing_participants_only() {
        // テスト項目: 参加通知は既存の参加者だけに配送され、参加者自身には届かない
        // given (前提条件):
        let coordinator = Coordinator::new();
        let mut receivers = join_n(&coordinator, &[1]).await;

        // when (操作):
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let outcome = coordinator.join(2, tx2).await.unwrap();

        // then (期待する結果):
        assert_eq!(outcome.announcement.recipients(), 1);
        assert_eq!(outcome.announcement.delivered(), 1);

        let notices = drain(&mut receivers[0]);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].kind, EventKind::Info);
        assert_eq!(notices[0].participant_id, 2);
        assert_eq!(notices[0].content, "participant 2 joined the chat");

        // 参加者自身のチャンネルには何も入らない
        assert_eq!(rx2.try_recv().unwrap_err(), TryRecvError::Empty);
    }

    #[tokio::test]
    async fn test_duplicate_join_rejected_and_original_unaffected() {
        // テスト項目: 重複 ID の参加は拒否され、元のエントリは影響を受けない
        // given (前提条件):
        let coordinator = Coordinator::new();
        let mut receivers = join_n(&coordinator, &[1]).await;
        let clock_before = coordinator.clock().await;

        // when (操作):
        let (tx, _rx) = mpsc::unbounded_channel();
        let result = coordinator.join(1, tx).await;

        // then (期待する結果):
        assert_eq!(
            result.unwrap_err(),
            CoordinatorError::DuplicateParticipant(1)
        );
        assert_eq!(coordinator.participants().await.len(), 1);
        assert_eq!(coordinator.clock().await, clock_before);
        assert!(drain(&mut receivers[0]).is_empty());
    }

    #[tokio::test]
    async fn test_relay_broadcast_completeness() {
        // テスト項目: N 人の他参加者に対して Relay はちょうど N 配送、送信者には届かない
        // given (前提条件):
        let coordinator = Coordinator::new();
        let mut receivers = join_n(&coordinator, &[1, 2, 3]).await;
        for rx in receivers.iter_mut() {
            drain(rx); // 参加通知を読み捨てる
        }

        // when (操作):
        let report = coordinator
            .relay(ChatEvent::message(1, 2, "hi"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(report.recipients(), 2);
        assert_eq!(report.delivered(), 2);
        assert!(drain(&mut receivers[0]).is_empty());
        for rx in receivers[1..].iter_mut() {
            let events = drain(rx);
            assert_eq!(events.len(), 1);
            assert_eq!(events[0].kind, EventKind::Message);
            assert_eq!(events[0].participant_id, 1);
            assert_eq!(events[0].content, "hi");
        }
    }

    #[tokio::test]
    async fn test_relay_unknown_sender_dropped() {
        // テスト項目: 未登録の送信者からの Relay はエラーになり、誰にも配送されない
        // given (前提条件):
        let coordinator = Coordinator::new();
        let mut receivers = join_n(&coordinator, &[1]).await;
        let clock_before = coordinator.clock().await;

        // when (操作):
        let result = coordinator.relay(ChatEvent::message(99, 5, "ghost")).await;

        // then (期待する結果):
        assert_eq!(result.unwrap_err(), CoordinatorError::UnknownSender(99));
        assert_eq!(coordinator.clock().await, clock_before);
        assert!(drain(&mut receivers[0]).is_empty());
    }

    #[tokio::test]
    async fn test_relay_partial_failure_isolation() {
        // テスト項目: 1 人のチャンネルが閉じていても残りの参加者には配送され、
        //            呼び出し自体はエラーにならない
        // given (前提条件):
        let coordinator = Coordinator::new();
        let mut receivers = join_n(&coordinator, &[1, 2, 3]).await;
        for rx in receivers.iter_mut() {
            drain(rx);
        }
        drop(receivers.remove(1)); // participant 2 の受信側を閉じる

        // when (操作):
        let report = coordinator
            .relay(ChatEvent::message(1, 4, "still here"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(report.recipients(), 2);
        assert_eq!(report.delivered(), 1);
        let failed: Vec<_> = report.failures().map(|d| d.recipient).collect();
        assert_eq!(failed, vec![2]);

        let events = drain(&mut receivers[1]); // participant 3
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].content, "still here");
    }

    #[tokio::test]
    async fn test_leave_idempotent() {
        // テスト項目: 同じ参加者の Leave を 2 回呼んでも、レジストリ変更と
        //            ブロードキャストの副作用は 1 回だけ発生する
        // given (前提条件):
        let coordinator = Coordinator::new();
        let mut receivers = join_n(&coordinator, &[1, 2]).await;
        for rx in receivers.iter_mut() {
            drain(rx);
        }

        // when (操作):
        let first = coordinator.leave(1).await;
        let second = coordinator.leave(1).await;

        // then (期待する結果):
        let report = first.expect("first leave broadcasts");
        assert_eq!(report.recipients(), 1);
        assert!(second.is_none());
        assert_eq!(coordinator.participants().await.len(), 1);
        assert_eq!(coordinator.clock().await, 3); // 参加 2 回 + 離脱 1 回

        let notices = drain(&mut receivers[1]);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].content, "participant 1 left the chat");
    }

    #[tokio::test]
    async fn test_relay_stamps_receive_rule_value() {
        // テスト項目: A 参加 (0→1)、B 参加 (1→2)、A がローカルクロック 2 で送信、
        //            コーディネータは max(2,2)+1=3 を計算し B へ clock 3 で中継する
        // given (前提条件):
        let coordinator = Coordinator::new();
        let mut receivers = join_n(&coordinator, &[1, 2]).await;
        for rx in receivers.iter_mut() {
            drain(rx);
        }
        assert_eq!(coordinator.clock().await, 2);

        // when (操作):
        coordinator
            .relay(ChatEvent::message(1, 2, "hi"))
            .await
            .unwrap();

        // then (期待する結果):
        let events = drain(&mut receivers[1]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].clock, 3);
        assert_eq!(coordinator.clock().await, 3);
    }

    #[tokio::test]
    async fn test_relay_advances_once_per_recipient() {
        // テスト項目: 3 人参加中に 1 通中継すると、クロックは受信者 1 人につき
        //            1 進み、受信者ごとに異なるスタンプが付く
        // given (前提条件):
        let coordinator = Coordinator::new();
        let mut receivers = join_n(&coordinator, &[1, 2, 3]).await;
        for rx in receivers.iter_mut() {
            drain(rx);
        }
        let clock_before = coordinator.clock().await;

        // when (操作):
        coordinator
            .relay(ChatEvent::message(1, 1, "fan out"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(coordinator.clock().await, clock_before + 2);

        let mut stamps: Vec<u64> = receivers[1..]
            .iter_mut()
            .flat_map(|rx| drain(rx))
            .map(|event| event.clock)
            .collect();
        stamps.sort_unstable();
        assert_eq!(stamps, vec![clock_before + 1, clock_before + 2]);
    }

    #[tokio::test]
    async fn test_relay_with_no_recipients_still_observes() {
        // テスト項目: 他に参加者がいなくてもメッセージの観測でクロックは進む
        // given (前提条件):
        let coordinator = Coordinator::new();
        let _receivers = join_n(&coordinator, &[1]).await;

        // when (操作):
        let report = coordinator
            .relay(ChatEvent::message(1, 5, "anyone?"))
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(report.recipients(), 0);
        assert_eq!(coordinator.clock().await, 6); // max(1,5)+1
    }

    #[tokio::test]
    async fn test_participants_snapshot_sorted() {
        // テスト項目: 参加者スナップショットは ID 昇順で返される
        let coordinator = Coordinator::new();
        let _receivers = join_n(&coordinator, &[30, 10, 20]).await;

        let snapshot = coordinator.participants().await;
        let ids: Vec<ParticipantId> = snapshot.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
        assert!(snapshot.iter().all(|p| p.joined_at > 0));
    }
}
