use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Category, Currency, Engine, EngineError, Expense, ExpenseRange, FixedClock, MAX_EXPENSE,
    Money, NewCategory, Profile, ResultStorage, SqliteStorage, Storage,
};
use migration::MigratorTrait;

const ALICE: i64 = 1001;
const BOB: i64 = 2002;

fn now() -> DateTime<Utc> {
    // 12:00 in Moscow, a Wednesday.
    Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap()
}

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .storage(Arc::new(SqliteStorage::new(db.clone())))
        .currency(Currency::Rub)
        .clock(Arc::new(FixedClock(now())))
        .build()
        .unwrap();
    (engine, db)
}

async fn count(db: &DatabaseConnection, sql: &str, owner_id: i64) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            sql,
            vec![owner_id.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get_by_index::<i64>(0).unwrap()
}

async fn category_id(db: &DatabaseConnection, owner_id: i64, name: &str) -> i64 {
    let backend = db.get_database_backend();
    let row = db
        .query_one(Statement::from_sql_and_values(
            backend,
            "SELECT id FROM categories WHERE user_id = ? AND name = ?",
            vec![owner_id.into(), name.into()],
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get_by_index::<i64>(0).unwrap()
}

#[tokio::test]
async fn profile_creation_seeds_default_categories() {
    let (engine, db) = engine_with_db().await;

    let reply = engine.create_profile(ALICE, "alice").await.unwrap();
    assert!(reply.contains("You are registered"));
    for name in engine::DEFAULT_CATEGORIES {
        assert!(reply.contains(name));
    }

    let categories = engine.categories(ALICE).await.unwrap();
    assert!(categories.contains("🍔 Food"));
    assert!(categories.contains("📦 Other"));
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM categories WHERE user_id = ?", ALICE).await,
        4
    );
}

#[tokio::test]
async fn profile_creation_is_an_upsert() {
    let (engine, db) = engine_with_db().await;

    engine.create_profile(ALICE, "alice").await.unwrap();
    engine.create_profile(ALICE, "alice_renamed").await.unwrap();

    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM users WHERE user_id = ?", ALICE).await,
        1
    );
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM categories WHERE user_id = ?", ALICE).await,
        4
    );
}

#[tokio::test]
async fn concurrent_profile_creation_succeeds() {
    let (engine, db) = engine_with_db().await;

    let (first, second, third) = tokio::join!(
        engine.create_profile(ALICE, "alice"),
        engine.create_profile(ALICE, "alice"),
        engine.create_profile(ALICE, "alice_renamed"),
    );
    assert!(first.is_ok() && second.is_ok() && third.is_ok());
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM users WHERE user_id = ?", ALICE).await,
        1
    );
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM categories WHERE user_id = ?", ALICE).await,
        4
    );
}

#[tokio::test]
async fn profile_creation_keeps_existing_default_categories() {
    let (engine, db) = engine_with_db().await;
    engine.create_profile(ALICE, "alice").await.unwrap();
    let food = category_id(&db, ALICE, "Food").await;

    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "DELETE FROM categories WHERE user_id = ? AND name = ?",
        vec![ALICE.into(), "Transport".into()],
    ))
    .await
    .unwrap();

    engine.create_profile(ALICE, "alice").await.unwrap();
    assert_eq!(category_id(&db, ALICE, "Food").await, food);
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM categories WHERE user_id = ?", ALICE).await,
        4
    );
}

#[tokio::test]
async fn duplicate_category_is_a_conflict() {
    let (engine, _db) = engine_with_db().await;
    engine.create_profile(ALICE, "alice").await.unwrap();

    let reply = engine
        .add_category(ALICE, "Sport", Some("green"))
        .await
        .unwrap();
    assert!(reply.contains("📂 Name: Sport"));
    assert!(reply.contains("🎨 Color: green"));

    let err = engine.add_category(ALICE, "Sport", None).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::Conflict("Category \"Sport\" already exists".to_string())
    );
}

#[tokio::test]
async fn same_category_name_is_allowed_for_different_owners() {
    let (engine, _db) = engine_with_db().await;
    engine.create_profile(ALICE, "alice").await.unwrap();
    engine.create_profile(BOB, "bob").await.unwrap();

    engine.add_category(ALICE, "Sport", None).await.unwrap();
    engine.add_category(BOB, "Sport", None).await.unwrap();
}

#[tokio::test]
async fn category_without_profile_asks_to_register() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.add_category(ALICE, "Sport", None).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
    assert!(err.user_message().contains("/start"));
}

#[tokio::test]
async fn empty_category_list_is_not_an_error() {
    let (engine, _db) = engine_with_db().await;

    let reply = engine.categories(ALICE).await.unwrap();
    assert!(reply.starts_with("You have no categories yet."));
}

#[tokio::test]
async fn deleting_a_category_moves_expenses_to_other() {
    let (engine, db) = engine_with_db().await;
    engine.create_profile(ALICE, "alice").await.unwrap();
    engine.add_category(ALICE, "Sport", None).await.unwrap();
    engine
        .add_expense(ALICE, Money::new(150_000), "Sport", "gym", None)
        .await
        .unwrap();
    engine
        .add_expense(ALICE, Money::new(50_000), "Sport", "sneakers", None)
        .await
        .unwrap();

    let sport = category_id(&db, ALICE, "Sport").await;
    let reply = engine.delete_category(ALICE, sport).await.unwrap();
    assert!(reply.contains("Sport deleted"));

    let other = category_id(&db, ALICE, "Other").await;
    let moved = count(
        &db,
        &format!("SELECT COUNT(*) FROM expenses WHERE user_id = ? AND category_id = {other}"),
        ALICE,
    )
    .await;
    assert_eq!(moved, 2);

    let today = engine.today_expenses(ALICE).await.unwrap();
    assert!(today.contains("Other: 2000.00₽"));
}

#[tokio::test]
async fn deleting_a_missing_category_changes_nothing() {
    let (engine, db) = engine_with_db().await;
    engine.create_profile(ALICE, "alice").await.unwrap();
    engine
        .add_expense(ALICE, Money::new(10_000), "Food", "pizza", None)
        .await
        .unwrap();

    let err = engine.delete_category(ALICE, 9_999).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::NotFound("Category with ID 9999 not found".to_string())
    );

    let food = category_id(&db, ALICE, "Food").await;
    let untouched = count(
        &db,
        &format!("SELECT COUNT(*) FROM expenses WHERE user_id = ? AND category_id = {food}"),
        ALICE,
    )
    .await;
    assert_eq!(untouched, 1);
}

#[tokio::test]
async fn categories_of_other_owners_cannot_be_deleted() {
    let (engine, db) = engine_with_db().await;
    engine.create_profile(ALICE, "alice").await.unwrap();
    engine.create_profile(BOB, "bob").await.unwrap();

    let bobs_food = category_id(&db, BOB, "Food").await;
    let err = engine.delete_category(ALICE, bobs_food).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM categories WHERE user_id = ?", BOB).await,
        4
    );
}

#[tokio::test]
async fn the_fallback_category_cannot_be_deleted() {
    let (engine, db) = engine_with_db().await;
    engine.create_profile(ALICE, "alice").await.unwrap();

    let other = category_id(&db, ALICE, "Other").await;
    let err = engine.delete_category(ALICE, other).await.unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));
}

#[tokio::test]
async fn expense_with_unknown_category_is_not_found() {
    let (engine, db) = engine_with_db().await;
    engine.create_profile(ALICE, "alice").await.unwrap();

    let err = engine
        .add_expense(ALICE, Money::new(500), "Yachts", "sails", None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::NotFound("Category \"Yachts\" not found".to_string())
    );
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM expenses WHERE user_id = ?", ALICE).await,
        0
    );
}

#[tokio::test]
async fn expense_reply_uses_local_date() {
    let (engine, _db) = engine_with_db().await;
    engine.create_profile(ALICE, "alice").await.unwrap();

    // 22:30 UTC is already the next day in Moscow.
    let late = Utc.with_ymd_and_hms(2026, 10, 13, 22, 30, 0).unwrap();
    let reply = engine
        .add_expense(ALICE, Money::new(123_456), "Food", "groceries", Some(late))
        .await
        .unwrap();
    assert!(reply.contains("💰 Amount: 1234.56₽"));
    assert!(reply.contains("📂 Category: Food"));
    assert!(reply.contains("📝 Description: groceries"));
    assert!(reply.contains("📅 Date: 14.10.2026"));
}

#[tokio::test]
async fn reports_cover_their_windows() {
    let (engine, _db) = engine_with_db().await;
    engine.create_profile(ALICE, "alice").await.unwrap();
    let at = |d: u32, h: u32| Some(Utc.with_ymd_and_hms(2026, 10, d, h, 0, 0).unwrap());

    engine
        .add_expense(ALICE, Money::new(123_456), "Food", "groceries", at(14, 8))
        .await
        .unwrap();
    engine
        .add_expense(ALICE, Money::new(6_500), "Food", "bread", at(14, 7))
        .await
        .unwrap();
    engine
        .add_expense(ALICE, Money::new(10_000), "Transport", "taxi", at(12, 7))
        .await
        .unwrap();
    engine
        .add_expense(ALICE, Money::new(20_000), "Transport", "train", at(2, 7))
        .await
        .unwrap();

    let today = engine.today_expenses(ALICE).await.unwrap();
    assert!(today.contains("Food: 1299.56₽"));
    assert!(!today.contains("taxi"));

    let week = engine.week_expenses(ALICE).await.unwrap();
    assert!(week.contains("Monday: 100.00₽"));
    assert!(week.contains("Wednesday: 1299.56₽"));
    assert!(week.contains("💰 Total: 1399.56₽"));

    let month = engine.month_expenses(ALICE).await.unwrap();
    assert!(month.contains("📊 Expenses for October"));
    assert!(month.contains("💰 Total: 1599.56₽"));

    let stats = engine.stats_expenses(ALICE).await.unwrap();
    assert!(stats.contains("📊 Transactions: 4"));
    assert!(stats.contains("📅 Most expensive day: 14.10.2026 (1300₽)"));
}

#[tokio::test]
async fn reports_only_include_the_senders_expenses() {
    let (engine, _db) = engine_with_db().await;
    engine.create_profile(ALICE, "alice").await.unwrap();
    engine.create_profile(BOB, "bob").await.unwrap();
    engine
        .add_expense(BOB, Money::new(10_000), "Food", "pizza", None)
        .await
        .unwrap();

    let stats = engine.stats_expenses(ALICE).await.unwrap();
    assert!(stats.starts_with("📊 No data for statistics yet."));
}

#[tokio::test]
async fn oversized_expense_is_rejected() {
    let (engine, db) = engine_with_db().await;
    engine.create_profile(ALICE, "alice").await.unwrap();

    let amount: Money = "50000000000000000".parse().unwrap();
    let err = engine
        .add_expense(ALICE, amount, "Food", "yacht", None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation("The amount cannot exceed 1000000000₽".to_string())
    );

    engine
        .add_expense(ALICE, MAX_EXPENSE, "Food", "island", None)
        .await
        .unwrap();
    assert_eq!(
        count(&db, "SELECT COUNT(*) FROM expenses WHERE user_id = ?", ALICE).await,
        1
    );
}

#[tokio::test]
async fn reports_survive_out_of_range_totals() {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let storage = Arc::new(SqliteStorage::new(db));
    let engine = Engine::builder()
        .storage(storage.clone())
        .clock(Arc::new(FixedClock(now())))
        .build()
        .unwrap();
    engine.create_profile(ALICE, "alice").await.unwrap();

    // Written straight to storage, past the per-expense cap.
    for description in ["first", "second"] {
        storage
            .add_expense(&Expense {
                owner_id: ALICE,
                amount: Money::new(5_000_000_000_000_000_000),
                category: "Food".to_string(),
                description: description.to_string(),
                created_at: now(),
            })
            .await
            .unwrap();
    }

    assert!(engine.today_expenses(ALICE).await.is_ok());
    assert!(engine.week_expenses(ALICE).await.is_ok());
    assert!(engine.month_expenses(ALICE).await.is_ok());
    let stats = engine.stats_expenses(ALICE).await.unwrap();
    assert!(stats.contains("📊 Transactions: 2"));
}

/// Storage that counts every call and fails them all.
#[derive(Default)]
struct CountingStorage {
    calls: AtomicUsize,
}

impl CountingStorage {
    fn hit<T>(&self) -> ResultStorage<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(engine::StorageError::NotFound("unreachable".to_string()))
    }
}

#[async_trait]
impl Storage for CountingStorage {
    async fn create_profile(&self, _profile: &Profile) -> ResultStorage<()> {
        self.hit()
    }

    async fn add_category(&self, _category: &NewCategory) -> ResultStorage<i64> {
        self.hit()
    }

    async fn list_categories(&self, _owner_id: i64) -> ResultStorage<Vec<Category>> {
        self.hit()
    }

    async fn delete_category(&self, _owner_id: i64, _category_id: i64) -> ResultStorage<String> {
        self.hit()
    }

    async fn add_expense(&self, _expense: &Expense) -> ResultStorage<Expense> {
        self.hit()
    }

    async fn query_expenses(
        &self,
        _owner_id: i64,
        _range: ExpenseRange,
    ) -> ResultStorage<Vec<Expense>> {
        self.hit()
    }
}

#[tokio::test]
async fn invalid_input_never_reaches_storage() {
    let storage = Arc::new(CountingStorage::default());
    let engine = Engine::builder()
        .storage(storage.clone())
        .clock(Arc::new(FixedClock(now())))
        .build()
        .unwrap();

    let failures = [
        engine.create_profile(0, "alice").await,
        engine.create_profile(ALICE, "   ").await,
        engine.add_category(ALICE, "  ", Some("red")).await,
        engine.delete_category(ALICE, 0).await,
        engine.delete_category(ALICE, -3).await,
        engine
            .add_expense(ALICE, Money::ZERO, "Food", "free lunch", None)
            .await,
        engine
            .add_expense(ALICE, Money::new(-100), "Food", "refund", None)
            .await,
        engine
            .add_expense(ALICE, Money::new(100), " ", "tea", None)
            .await,
        engine
            .add_expense(ALICE, Money::new(100), "Food", "", None)
            .await,
        engine
            .add_expense(ALICE, Money::new(i64::MAX), "Food", "yacht", None)
            .await,
    ];

    for result in failures {
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }
    assert_eq!(storage.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_storage_is_rejected_by_the_builder() {
    assert!(Engine::builder().build().is_err());
}
