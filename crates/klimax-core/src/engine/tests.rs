use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use klimax_store::{Collection, LoadReport, MemoryStore, RecordStore};
use uuid::Uuid;

use super::*;
use crate::model::RankId;
use crate::platform::{EconomyError, MockEconomy, MockPlatform};

struct Fixture {
    ranks: Arc<RankManager>,
    ladders: Arc<LadderManager>,
    players: Arc<PlayerManager>,
    journal: Arc<TransactionJournal>,
}

// Default ladder [Apprentice(0, cost 0), Baron(1, cost 100), Count(2, cost 500)].
async fn fixture(store: Arc<dyn RecordStore>) -> Fixture {
    let ranks = Arc::new(RankManager::new(store.clone()));
    let ladders = Arc::new(LadderManager::new(store.clone()));
    let players = Arc::new(PlayerManager::new(store.clone()));
    let journal = Arc::new(TransactionJournal::new(store));

    let a = ranks.create_rank("Apprentice", None, 0.0).await.unwrap();
    let b = ranks.create_rank("Baron", None, 100.0).await.unwrap();
    let c = ranks.create_rank("Count", None, 500.0).await.unwrap();

    let mut ladder = ladders.create_ladder("default").await.unwrap();
    assert!(ladder.push(a.id) && ladder.push(b.id) && ladder.push(c.id));
    ladders.save_ladder(&ladder).await.unwrap();

    Fixture {
        ranks,
        ladders,
        players,
        journal,
    }
}

fn engine(
    fixture: &Fixture,
    platform: Arc<dyn Platform>,
    economy: Arc<dyn Economy>,
) -> RankUpEngine {
    RankUpEngine::new(
        fixture.ranks.clone(),
        fixture.ladders.clone(),
        fixture.players.clone(),
        platform,
        economy,
        fixture.journal.clone(),
    )
}

struct FakePlatform;

#[async_trait]
impl Platform for FakePlatform {
    async fn player(&self, uid: Uuid) -> Option<PlatformPlayer> {
        Some(PlatformPlayer {
            uid,
            name: "tester".to_string(),
        })
    }
}

struct FakeEconomy {
    balance: StdMutex<f64>,
}

impl FakeEconomy {
    fn with_balance(balance: f64) -> Arc<Self> {
        Arc::new(Self {
            balance: StdMutex::new(balance),
        })
    }

    fn balance(&self) -> f64 {
        *self.balance.lock().unwrap()
    }
}

#[async_trait]
impl Economy for FakeEconomy {
    async fn can_afford(&self, _player: &PlatformPlayer, amount: f64) -> bool {
        *self.balance.lock().unwrap() >= amount
    }

    async fn remove_balance(
        &self,
        _player: &PlatformPlayer,
        amount: f64,
    ) -> std::result::Result<(), EconomyError> {
        *self.balance.lock().unwrap() -= amount;
        Ok(())
    }
}

/// Store that can be told to reject player saves, leaving everything else
/// working — the "persistence store forced to fail on save" scenario.
struct FailingStore {
    inner: MemoryStore,
    fail_player_saves: AtomicBool,
}

impl FailingStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_player_saves: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn load_all(&self, collection: Collection) -> klimax_store::Result<LoadReport> {
        self.inner.load_all(collection).await
    }

    async fn save(
        &self,
        collection: Collection,
        key: &str,
        value: &serde_json::Value,
    ) -> klimax_store::Result<()> {
        if collection == Collection::Players && self.fail_player_saves.load(Ordering::SeqCst) {
            return Err(klimax_store::Error::Io {
                path: "players".into(),
                source: std::io::Error::other("injected save failure"),
            });
        }
        self.inner.save(collection, key, value).await
    }

    async fn delete(&self, collection: Collection, key: &str) -> klimax_store::Result<bool> {
        self.inner.delete(collection, key).await
    }
}

#[tokio::test]
async fn new_player_advances_from_entry_rank() {
    let fixture = fixture(Arc::new(MemoryStore::new())).await;
    let economy = FakeEconomy::with_balance(150.0);
    let engine = engine(&fixture, Arc::new(FakePlatform), economy.clone());
    let uid = Uuid::new_v4();

    // No recorded rank: the player holds the entry rank implicitly, so the
    // first paid advancement targets Baron, not Apprentice.
    let outcome = engine.rank_up(uid, "default").await.unwrap();
    assert_eq!(outcome.rank().unwrap().name, "Baron");
    assert!(outcome.is_success());

    let player = fixture.players.player(uid).await.unwrap();
    assert_eq!(player.rank_on("default"), Some(RankId(1)));
    assert_eq!(economy.balance(), 50.0);
}

#[tokio::test]
async fn cannot_afford_leaves_player_and_balance_untouched() {
    let store = Arc::new(MemoryStore::new());
    let fixture = fixture(store.clone()).await;
    let economy = FakeEconomy::with_balance(50.0);
    let engine = engine(&fixture, Arc::new(FakePlatform), economy.clone());
    let uid = Uuid::new_v4();

    let outcome = engine.rank_up(uid, "default").await.unwrap();
    assert_eq!(
        outcome,
        RankUpOutcome::CannotAfford {
            rank: fixture.ranks.rank(RankId(1)).await.unwrap()
        }
    );

    assert_eq!(economy.balance(), 50.0);
    let player = fixture.players.player(uid).await.unwrap();
    assert_eq!(player.rank_on("default"), None);
    assert_eq!(store.count(Collection::Players).await, 0);
    assert!(fixture.journal.unreconciled().await.unwrap().is_empty());
}

#[tokio::test]
async fn success_debits_exact_cost_and_advances_one_position() {
    let store = Arc::new(MemoryStore::new());
    let fixture = fixture(store.clone()).await;
    let economy = FakeEconomy::with_balance(150.0);
    let engine = engine(&fixture, Arc::new(FakePlatform), economy.clone());
    let uid = Uuid::new_v4();

    let outcome = engine.rank_up(uid, "default").await.unwrap();
    assert_eq!(
        outcome,
        RankUpOutcome::Success {
            rank: fixture.ranks.rank(RankId(1)).await.unwrap()
        }
    );

    assert_eq!(economy.balance(), 50.0);
    assert_eq!(
        fixture.players.player(uid).await.unwrap().rank_on("default"),
        Some(RankId(1))
    );
    assert_eq!(store.count(Collection::Players).await, 1);
    assert!(fixture.journal.unreconciled().await.unwrap().is_empty());
}

#[tokio::test]
async fn already_highest_performs_no_mutation() {
    let fixture = fixture(Arc::new(MemoryStore::new())).await;
    let economy = FakeEconomy::with_balance(10_000.0);
    let engine = engine(&fixture, Arc::new(FakePlatform), economy.clone());
    let uid = Uuid::new_v4();

    fixture.players.assign_rank(uid, "default", RankId(2)).await;

    let outcome = engine.rank_up(uid, "default").await.unwrap();
    assert_eq!(
        outcome,
        RankUpOutcome::AlreadyHighest {
            rank: Some(fixture.ranks.rank(RankId(2)).await.unwrap())
        }
    );
    assert_eq!(economy.balance(), 10_000.0);
    assert_eq!(
        fixture.players.player(uid).await.unwrap().rank_on("default"),
        Some(RankId(2))
    );
}

#[tokio::test]
async fn empty_ladder_yields_already_highest_without_rank() {
    let fixture = fixture(Arc::new(MemoryStore::new())).await;
    let bare = fixture.ladders.create_ladder("bare").await.unwrap();
    fixture.ladders.save_ladder(&bare).await.unwrap();

    let engine = engine(
        &fixture,
        Arc::new(FakePlatform),
        FakeEconomy::with_balance(0.0),
    );

    let outcome = engine.rank_up(Uuid::new_v4(), "bare").await.unwrap();
    assert_eq!(outcome, RankUpOutcome::AlreadyHighest { rank: None });
}

#[tokio::test]
async fn offline_player_is_a_typed_fault() {
    let fixture = fixture(Arc::new(MemoryStore::new())).await;

    let mut platform = MockPlatform::new();
    platform.expect_player().returning(|_| None);
    let engine = engine(
        &fixture,
        Arc::new(platform),
        Arc::new(MockEconomy::new()),
    );

    let uid = Uuid::new_v4();
    let result = engine.rank_up(uid, "default").await;
    assert!(matches!(result, Err(Error::PlayerOffline { uid: u }) if u == uid));
}

#[tokio::test]
async fn missing_ladder_is_a_typed_fault() {
    let fixture = fixture(Arc::new(MemoryStore::new())).await;
    let engine = engine(
        &fixture,
        Arc::new(FakePlatform),
        FakeEconomy::with_balance(0.0),
    );

    let result = engine.rank_up(Uuid::new_v4(), "no-such-ladder").await;
    assert!(matches!(result, Err(Error::LadderNotFound { .. })));
}

#[tokio::test]
async fn detached_recorded_rank_is_a_typed_fault() {
    let fixture = fixture(Arc::new(MemoryStore::new())).await;
    let engine = engine(
        &fixture,
        Arc::new(FakePlatform),
        FakeEconomy::with_balance(0.0),
    );
    let uid = Uuid::new_v4();

    // Recorded rank 99 was never placed on the ladder.
    fixture.players.assign_rank(uid, "default", RankId(99)).await;

    let result = engine.rank_up(uid, "default").await;
    assert!(matches!(result, Err(Error::RankNotOnLadder { .. })));
}

#[tokio::test]
async fn debit_failure_aborts_cleanly() {
    let store = Arc::new(MemoryStore::new());
    let fixture = fixture(store.clone()).await;

    let mut economy = MockEconomy::new();
    economy.expect_can_afford().returning(|_, _| true);
    economy
        .expect_remove_balance()
        .returning(|_, _| Err(EconomyError("ledger offline".to_string())));

    let engine = engine(&fixture, Arc::new(FakePlatform), Arc::new(economy));
    let uid = Uuid::new_v4();

    let outcome = engine.rank_up(uid, "default").await.unwrap();
    assert!(matches!(outcome, RankUpOutcome::Failure { rank: Some(_) }));

    // No money moved, so the intent record was cleared and the player never
    // advanced or persisted.
    assert!(fixture.journal.unreconciled().await.unwrap().is_empty());
    assert_eq!(
        fixture.players.player(uid).await.unwrap().rank_on("default"),
        None
    );
    assert_eq!(store.count(Collection::Players).await, 0);
}

#[tokio::test]
async fn save_failure_after_debit_retains_journal_entry() {
    let store = Arc::new(FailingStore::new());
    let fixture = fixture(store.clone()).await;
    let economy = FakeEconomy::with_balance(600.0);
    let engine = engine(&fixture, Arc::new(FakePlatform), economy.clone());
    let uid = Uuid::new_v4();

    fixture.players.assign_rank(uid, "default", RankId(1)).await;
    store.fail_player_saves.store(true, Ordering::SeqCst);

    let outcome = engine.rank_up(uid, "default").await.unwrap();
    assert_eq!(
        outcome,
        RankUpOutcome::Failure {
            rank: Some(fixture.ranks.rank(RankId(2)).await.unwrap())
        }
    );

    // The documented inconsistency: balance debited, in-memory rank advanced,
    // and the journal holds the record requiring reconciliation.
    assert_eq!(economy.balance(), 100.0);
    assert_eq!(
        fixture.players.player(uid).await.unwrap().rank_on("default"),
        Some(RankId(2))
    );
    let pending = fixture.journal.unreconciled().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].player, uid);
    assert_eq!(pending[0].rank, RankId(2));
    assert_eq!(pending[0].cost, 500.0);
}

#[tokio::test]
async fn second_rank_up_continues_from_new_position() {
    let fixture = fixture(Arc::new(MemoryStore::new())).await;
    let economy = FakeEconomy::with_balance(700.0);
    let engine = engine(&fixture, Arc::new(FakePlatform), economy.clone());
    let uid = Uuid::new_v4();

    let first = engine.rank_up(uid, "default").await.unwrap();
    assert_eq!(first.rank().unwrap().id, RankId(1));

    let second = engine.rank_up(uid, "default").await.unwrap();
    assert_eq!(second.rank().unwrap().id, RankId(2));
    assert!(second.is_success());

    assert_eq!(economy.balance(), 100.0);
    assert_eq!(
        fixture.players.player(uid).await.unwrap().rank_on("default"),
        Some(RankId(2))
    );
}
