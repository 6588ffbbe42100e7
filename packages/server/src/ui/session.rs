//! Per-connection protocol state machine.
//!
//! A session starts unassigned and becomes host or joiner at most once. Every
//! inbound frame is rate-limited, size-checked, decoded and then dispatched
//! according to the current role. Nothing a client sends is fatal to the
//! connection; rejected input is answered with a single `error` message.

use crate::{
    domain::{ConnectionRateLimits, GuessResult, PlayerConnection, Role, RoomId, Timestamp},
    infrastructure::{
        codec::{self, DecodeError},
        dto::websocket::{ClientMessage, ServerMessage},
    },
    ui::state::AppState,
    usecase::{
        CreateRoomUseCase, JoinRoomUseCase, LeaveRoomUseCase, SetSecretUseCase,
        SubmitGuessUseCase,
    },
};

const RATE_LIMITED: &str = "Rate limit exceeded.";
const GUESS_RATE_LIMITED: &str = "Too many guesses. Slow down.";
const UNASSIGNED_ONLY: &str = "First message must be create_room or join_room.";
const HOST_ONLY: &str = "Host can only set_secret.";
const JOINER_ONLY: &str = "Joiner can only guess.";
const JOINER_CONNECTED: &str = "Joiner connected.";
const SECRET_SET: &str = "Secret set. Waiting for guesses.";
const PEER_DISCONNECTED: &str = "Other player disconnected.";

/// Where a connection stands. Moves out of `Unassigned` at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRole {
    Unassigned,
    Host(RoomId),
    Joiner(RoomId),
}

impl SessionRole {
    pub fn role(&self) -> Option<Role> {
        match self {
            SessionRole::Unassigned => None,
            SessionRole::Host(_) => Some(Role::Host),
            SessionRole::Joiner(_) => Some(Role::Joiner),
        }
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            SessionRole::Unassigned => None,
            SessionRole::Host(room_id) | SessionRole::Joiner(room_id) => Some(room_id),
        }
    }
}

/// Queue `message` for `connection`.
///
/// Failures are dropped on purpose: a peer that is already gone is cleaned up
/// by its own session.
pub fn send_best_effort(connection: &PlayerConnection, message: &ServerMessage) {
    match codec::encode(message) {
        Ok(frame) => {
            if connection.sender.send(frame).is_err() {
                tracing::debug!("Dropped message for closed connection '{}'", connection.id);
            }
        }
        Err(e) => tracing::error!("Failed to encode {:?}: {}", message, e),
    }
}

pub struct ConnectionSession {
    connection: PlayerConnection,
    role: SessionRole,
    limits: ConnectionRateLimits,
    max_message_bytes: usize,
    create_room: CreateRoomUseCase,
    join_room: JoinRoomUseCase,
    set_secret: SetSecretUseCase,
    submit_guess: SubmitGuessUseCase,
    leave_room: LeaveRoomUseCase,
}

impl ConnectionSession {
    pub fn new(state: &AppState, connection: PlayerConnection) -> Self {
        let repository = state.repository.clone();
        Self {
            connection,
            role: SessionRole::Unassigned,
            limits: ConnectionRateLimits::new(
                state.config.max_messages_per_sec,
                state.config.max_guesses_per_sec,
            ),
            max_message_bytes: state.config.max_message_bytes,
            create_room: CreateRoomUseCase::new(repository.clone()),
            join_room: JoinRoomUseCase::new(repository.clone()),
            set_secret: SetSecretUseCase::new(repository.clone(), state.number_range),
            submit_guess: SubmitGuessUseCase::new(repository.clone(), state.number_range),
            leave_room: LeaveRoomUseCase::new(repository),
        }
    }

    pub fn role(&self) -> &SessionRole {
        &self.role
    }

    pub async fn handle_frame(&mut self, frame: &str) {
        self.handle_frame_at(frame, Timestamp::now()).await;
    }

    /// Process one inbound text frame received at `now`.
    pub async fn handle_frame_at(&mut self, frame: &str, now: Timestamp) {
        if !self.limits.messages.admit(now) {
            tracing::warn!("Connection '{}' hit the message rate limit", self.connection.id);
            self.reply_error(RATE_LIMITED);
            return;
        }

        let message = match codec::decode(frame, self.max_message_bytes) {
            Err(e @ DecodeError::TooLarge { .. }) => {
                tracing::warn!("Connection '{}' sent an oversized frame: {:?}", self.connection.id, e);
                self.reply_error(e.to_string());
                return;
            }
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Connection '{}' sent an undecodable frame: {}", self.connection.id, e);
                self.reply_error(e.to_string());
                return;
            }
        };

        match self.role.clone() {
            SessionRole::Unassigned => self.handle_unassigned(message).await,
            SessionRole::Host(room_id) => self.handle_host(&room_id, message).await,
            SessionRole::Joiner(room_id) => self.handle_joiner(&room_id, message, now).await,
        }
    }

    async fn handle_unassigned(&mut self, message: ClientMessage) {
        match message {
            ClientMessage::CreateRoom => {
                match self.create_room.execute(self.connection.clone()).await {
                    Ok(room_id) => {
                        self.role = SessionRole::Host(room_id.clone());
                        self.reply(&ServerMessage::RoomCreated {
                            room_id: room_id.into_string(),
                        });
                    }
                    Err(e) => self.reply_error(e.to_string()),
                }
            }
            ClientMessage::JoinRoom { room_id } => {
                match self.join_room.execute(room_id, self.connection.clone()).await {
                    Ok(joined) => {
                        self.role = SessionRole::Joiner(joined.room_id.clone());
                        self.reply(&ServerMessage::RoomJoined {
                            room_id: joined.room_id.into_string(),
                            role: Role::Joiner,
                        });
                        if let Some(host) = joined.notify_host {
                            send_best_effort(&host, &ServerMessage::status(JOINER_CONNECTED));
                        }
                    }
                    Err(e) => self.reply_error(e.to_string()),
                }
            }
            _ => self.reply_error(UNASSIGNED_ONLY),
        }
    }

    async fn handle_host(&mut self, room_id: &RoomId, message: ClientMessage) {
        let ClientMessage::SetSecret { secret } = message else {
            self.reply_error(HOST_ONLY);
            return;
        };

        match self.set_secret.execute(room_id, secret).await {
            Ok(()) => self.reply(&ServerMessage::status(SECRET_SET)),
            Err(e) => self.reply_error(e.to_string()),
        }
    }

    async fn handle_joiner(&mut self, room_id: &RoomId, message: ClientMessage, now: Timestamp) {
        let ClientMessage::Guess { guess } = message else {
            self.reply_error(JOINER_ONLY);
            return;
        };

        if !self.limits.guesses.admit(now) {
            tracing::warn!("Connection '{}' hit the guess rate limit", self.connection.id);
            self.reply_error(GUESS_RATE_LIMITED);
            return;
        }

        match self.submit_guess.execute(room_id, guess).await {
            Ok(outcome) => {
                self.reply(&ServerMessage::GuessResult {
                    result: outcome.result,
                    guesses: outcome.guesses,
                });
                if let (GuessResult::Correct, Some(host)) = (outcome.result, &outcome.notify_host) {
                    let notice = format!("Joiner guessed correctly in {} tries.", outcome.guesses);
                    send_best_effort(host, &ServerMessage::status(notice));
                }
            }
            Err(e) => self.reply_error(e.to_string()),
        }
    }

    /// Release this connection's slot and tell the peer.
    ///
    /// Consumes the session, so no frame can be handled afterwards.
    pub async fn close(self) {
        let (Some(role), Some(room_id)) = (self.role.role(), self.role.room_id()) else {
            return;
        };

        if let Some(peer) = self
            .leave_room
            .execute(room_id, role, self.connection.id)
            .await
        {
            send_best_effort(&peer, &ServerMessage::status(PEER_DISCONNECTED));
        }
    }

    fn reply(&self, message: &ServerMessage) {
        send_best_effort(&self.connection, message);
    }

    fn reply_error(&self, message: impl Into<String>) {
        self.reply(&ServerMessage::error(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ServerConfig,
        domain::{ConnectionId, RoomRepository},
        infrastructure::repository::InMemoryRoomRepository,
    };
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 役割ごとのメッセージ振り分け（未割当・ホスト・参加者）
    // - デコードエラー、レート制限、切断時の通知
    //
    // 【どのようなシナリオをテストするか】
    // 1. 作成 → 参加 → 秘密設定 → 推測 → 正解の一連の流れ
    // 2. 存在しない Room への参加とその後の再試行
    // 3. 役割に合わないメッセージの拒否
    // 4. 範囲の境界値
    // 5. レート制限
    // 6. 切断時の通知と Room の削除
    // ========================================

    struct TestClient {
        session: ConnectionSession,
        rx: mpsc::UnboundedReceiver<String>,
    }

    impl TestClient {
        fn new(state: &AppState) -> Self {
            let (tx, rx) = mpsc::unbounded_channel();
            let session =
                ConnectionSession::new(state, PlayerConnection::new(ConnectionId::generate(), tx));
            Self { session, rx }
        }

        async fn send(&mut self, frame: Value) {
            self.session.handle_frame(&frame.to_string()).await;
        }

        fn received(&mut self) -> Vec<Value> {
            let mut messages = Vec::new();
            while let Ok(frame) = self.rx.try_recv() {
                messages.push(serde_json::from_str(&frame).unwrap());
            }
            messages
        }
    }

    fn test_state(config: ServerConfig) -> (AppState, Arc<InMemoryRoomRepository>) {
        let repository = Arc::new(InMemoryRoomRepository::with_capacity(config.max_rooms));
        let state = AppState::with_repository(config, repository.clone()).unwrap();
        (state, repository)
    }

    fn error(message: &str) -> Value {
        json!({"type": "error", "message": message})
    }

    fn status(message: &str) -> Value {
        json!({"type": "status", "message": message})
    }

    async fn create_room(host: &mut TestClient) -> String {
        host.send(json!({"type": "create_room"})).await;
        let messages = host.received();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["type"], "room_created");
        messages[0]["room_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_full_game_scenario() {
        // テスト項目: 作成・参加・秘密設定・推測・正解の一連の流れ
        // given (前提条件):
        let (state, _repository) = test_state(ServerConfig::default());
        let mut host = TestClient::new(&state);
        let mut joiner = TestClient::new(&state);

        // when / then: 作成と参加
        let room_id = create_room(&mut host).await;
        joiner
            .send(json!({"type": "join_room", "room_id": room_id}))
            .await;
        assert_eq!(
            joiner.received(),
            vec![json!({"type": "room_joined", "room_id": room_id, "role": "joiner"})]
        );
        assert_eq!(host.received(), vec![status("Joiner connected.")]);

        // when / then: 秘密の設定
        host.send(json!({"type": "set_secret", "secret": 42})).await;
        assert_eq!(
            host.received(),
            vec![status("Secret set. Waiting for guesses.")]
        );

        // when / then: 推測
        joiner.send(json!({"type": "guess", "guess": 10})).await;
        assert_eq!(
            joiner.received(),
            vec![json!({"type": "guess_result", "result": "higher", "guesses": 1})]
        );
        joiner.send(json!({"type": "guess", "guess": "42"})).await;
        assert_eq!(
            joiner.received(),
            vec![json!({"type": "guess_result", "result": "correct", "guesses": 2})]
        );
        assert_eq!(
            host.received(),
            vec![status("Joiner guessed correctly in 2 tries.")]
        );
    }

    #[tokio::test]
    async fn test_join_missing_room_allows_retry() {
        // テスト項目: 存在しない Room への参加は失敗し、役割は未割当のまま再試行できる
        // given (前提条件):
        let (state, _repository) = test_state(ServerConfig::default());
        let mut host = TestClient::new(&state);
        let mut joiner = TestClient::new(&state);
        let room_id = create_room(&mut host).await;

        // when (操作):
        joiner
            .send(json!({"type": "join_room", "room_id": "does-not-exist"}))
            .await;

        // then (期待する結果):
        assert_eq!(joiner.received(), vec![error("Room not found.")]);
        assert_eq!(joiner.session.role(), &SessionRole::Unassigned);

        joiner
            .send(json!({"type": "join_room", "room_id": room_id}))
            .await;
        assert_eq!(joiner.received()[0]["type"], "room_joined");
        assert!(matches!(joiner.session.role(), SessionRole::Joiner(_)));
    }

    #[tokio::test]
    async fn test_unassigned_rejects_other_messages() {
        // テスト項目: 未割当の接続は create_room / join_room 以外を拒否する
        // given (前提条件):
        let (state, _repository) = test_state(ServerConfig::default());
        let mut client = TestClient::new(&state);

        // when (操作):
        client.send(json!({"type": "guess", "guess": 1})).await;
        client.send(json!({"type": "join_room", "room_id": ""})).await;
        client.send(json!({"type": "join_room"})).await;

        // then (期待する結果):
        assert_eq!(
            client.received(),
            vec![
                error("First message must be create_room or join_room."),
                error("Invalid room ID."),
                error("Invalid room ID."),
            ]
        );
        assert_eq!(client.session.role(), &SessionRole::Unassigned);
    }

    #[tokio::test]
    async fn test_host_cannot_guess() {
        // テスト項目: ホストの推測は拒否され、役割と Room は変わらない
        // given (前提条件):
        let (state, _repository) = test_state(ServerConfig::default());
        let mut host = TestClient::new(&state);
        let room_id = create_room(&mut host).await;

        // when (操作):
        host.send(json!({"type": "guess", "guess": 5})).await;
        host.send(json!({"type": "create_room"})).await;

        // then (期待する結果):
        assert_eq!(
            host.received(),
            vec![
                error("Host can only set_secret."),
                error("Host can only set_secret.")
            ]
        );
        assert_eq!(
            host.session.role(),
            &SessionRole::Host(RoomId::new(room_id).unwrap())
        );
    }

    #[tokio::test]
    async fn test_joiner_cannot_set_secret() {
        // テスト項目: 参加者は推測以外を送れない
        // given (前提条件):
        let (state, _repository) = test_state(ServerConfig::default());
        let mut host = TestClient::new(&state);
        let mut joiner = TestClient::new(&state);
        let room_id = create_room(&mut host).await;
        joiner
            .send(json!({"type": "join_room", "room_id": room_id}))
            .await;
        joiner.received();

        // when (操作):
        joiner.send(json!({"type": "set_secret", "secret": 5})).await;
        joiner.send(json!({"type": "guess", "guess": 5})).await;

        // then (期待する結果):
        assert_eq!(
            joiner.received(),
            vec![
                error("Joiner can only guess."),
                error("Host has not set a secret yet.")
            ]
        );
    }

    #[tokio::test]
    async fn test_secret_bounds() {
        // テスト項目: 範囲外・真偽値の秘密は拒否され、両端は受理される
        // given (前提条件):
        let (state, _repository) = test_state(ServerConfig::default());
        let mut host = TestClient::new(&state);
        create_room(&mut host).await;
        let range_error = error("Secret must be an integer between 1 and 1000000.");
        let accepted = status("Secret set. Waiting for guesses.");

        // when (操作):
        host.send(json!({"type": "set_secret", "secret": 1_000_001}))
            .await;
        host.send(json!({"type": "set_secret", "secret": true})).await;
        host.send(json!({"type": "set_secret", "secret": 1})).await;
        host.send(json!({"type": "set_secret", "secret": 1_000_000}))
            .await;

        // then (期待する結果):
        assert_eq!(
            host.received(),
            vec![range_error.clone(), range_error, accepted.clone(), accepted]
        );
    }

    #[tokio::test]
    async fn test_decode_errors_are_not_fatal() {
        // テスト項目: 不正なフレームにはエラーを返し、接続は継続する
        // given (前提条件):
        let config = ServerConfig {
            max_message_bytes: 64,
            ..ServerConfig::default()
        };
        let (state, _repository) = test_state(config);
        let mut client = TestClient::new(&state);

        // when (操作):
        client.session.handle_frame("not json").await;
        client.session.handle_frame("[]").await;
        client.session.handle_frame(&"x".repeat(65)).await;
        client.send(json!({"type": "create_room"})).await;

        // then (期待する結果):
        let messages = client.received();
        assert_eq!(messages[0], error("Invalid JSON."));
        assert_eq!(messages[1], error("Missing message type."));
        assert_eq!(messages[2], error("Message too large."));
        assert_eq!(messages[3]["type"], "room_created");
    }

    #[tokio::test]
    async fn test_room_limit_reached() {
        // テスト項目: Room 数の上限に達すると作成が拒否される
        // given (前提条件):
        let config = ServerConfig {
            max_rooms: 1,
            ..ServerConfig::default()
        };
        let (state, repository) = test_state(config);
        let mut first = TestClient::new(&state);
        let mut second = TestClient::new(&state);
        create_room(&mut first).await;

        // when (操作):
        second.send(json!({"type": "create_room"})).await;

        // then (期待する結果):
        assert_eq!(second.received(), vec![error("Room limit reached.")]);
        assert_eq!(second.session.role(), &SessionRole::Unassigned);
        assert_eq!(repository.count_rooms().await, 1);
    }

    #[tokio::test]
    async fn test_oversized_frames_count_toward_message_rate() {
        // テスト項目: 上限サイズを超えたフレームもメッセージの流量制限の対象になる
        // given (前提条件):
        let config = ServerConfig {
            max_messages_per_sec: 2,
            max_message_bytes: 16,
            ..ServerConfig::default()
        };
        let (state, _repository) = test_state(config);
        let mut client = TestClient::new(&state);
        let frame = "x".repeat(100);

        // when (操作):
        for _ in 0..3 {
            client
                .session
                .handle_frame_at(&frame, Timestamp::new(0))
                .await;
        }

        // then (期待する結果):
        assert_eq!(
            client.received(),
            vec![
                error("Message too large."),
                error("Message too large."),
                error("Rate limit exceeded."),
            ]
        );
    }

    #[tokio::test]
    async fn test_message_rate_limit() {
        // テスト項目: 1 秒あたりの上限を超えたメッセージは拒否され、1 秒後に回復する
        // given (前提条件):
        let config = ServerConfig {
            max_messages_per_sec: 2,
            ..ServerConfig::default()
        };
        let (state, _repository) = test_state(config);
        let mut client = TestClient::new(&state);
        let frame = json!({"type": "dance"}).to_string();

        // when (操作):
        for _ in 0..3 {
            client
                .session
                .handle_frame_at(&frame, Timestamp::new(0))
                .await;
        }
        client
            .session
            .handle_frame_at(&frame, Timestamp::new(1_000))
            .await;

        // then (期待する結果):
        let unassigned = error("First message must be create_room or join_room.");
        assert_eq!(
            client.received(),
            vec![
                unassigned.clone(),
                unassigned.clone(),
                error("Rate limit exceeded."),
                unassigned
            ]
        );
    }

    #[tokio::test]
    async fn test_guess_rate_limit() {
        // テスト項目: 推測のレート制限はメッセージ全体の制限とは独立している
        // given (前提条件):
        let config = ServerConfig {
            max_guesses_per_sec: 1,
            ..ServerConfig::default()
        };
        let (state, repository) = test_state(config);
        let mut host = TestClient::new(&state);
        let mut joiner = TestClient::new(&state);
        let room_id = create_room(&mut host).await;
        joiner
            .send(json!({"type": "join_room", "room_id": room_id}))
            .await;
        host.send(json!({"type": "set_secret", "secret": 500})).await;
        joiner.received();
        let guess = json!({"type": "guess", "guess": 1}).to_string();

        // when (操作):
        joiner
            .session
            .handle_frame_at(&guess, Timestamp::new(0))
            .await;
        joiner
            .session
            .handle_frame_at(&guess, Timestamp::new(10))
            .await;

        // then (期待する結果):
        let messages = joiner.received();
        assert_eq!(messages[0]["guesses"], 1);
        assert_eq!(messages[1], error("Too many guesses. Slow down."));
        let room = repository
            .get_room(&RoomId::new(room_id).unwrap())
            .await
            .unwrap();
        assert_eq!(room.guess_count(), 1);
    }

    #[tokio::test]
    async fn test_close_notifies_peer_and_removes_empty_room() {
        // テスト項目: 切断時に相手へ 1 回だけ通知し、両方切断すると Room が削除される
        // given (前提条件):
        let (state, repository) = test_state(ServerConfig::default());
        let mut host = TestClient::new(&state);
        let mut joiner = TestClient::new(&state);
        let room_id = create_room(&mut host).await;
        joiner
            .send(json!({"type": "join_room", "room_id": room_id}))
            .await;
        host.received();
        joiner.received();

        // when (操作): 参加者が切断
        let TestClient {
            session: joiner_session,
            rx: _joiner_rx,
        } = joiner;
        joiner_session.close().await;

        // then (期待する結果):
        assert_eq!(host.received(), vec![status("Other player disconnected.")]);
        assert_eq!(repository.count_rooms().await, 1);

        // ホストも切断すると Room は削除される
        host.session.close().await;
        assert_eq!(repository.count_rooms().await, 0);
    }

    #[tokio::test]
    async fn test_close_unassigned_is_noop() {
        // テスト項目: 役割のない接続の切断は何も変更しない
        // given (前提条件):
        let (state, repository) = test_state(ServerConfig::default());
        let mut host = TestClient::new(&state);
        create_room(&mut host).await;
        let idle = TestClient::new(&state);

        // when (操作):
        idle.session.close().await;

        // then (期待する結果):
        assert_eq!(repository.count_rooms().await, 1);
        assert!(host.received().is_empty());
    }
}
