mod common;

use banking_api::{
    AccountsRepository, AppError, EntryState, Filter, GenericRepository, Owner, OwnerColumn,
    OwnersRepository,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

fn owner(name: &str, email: &str) -> Owner {
    Owner::new(name, Utc.with_ymd_and_hms(1990, 5, 17, 0, 0, 0).unwrap(), email)
}

#[tokio::test]
async fn add_save_and_find_by_id_after_clear() {
    let ctx = common::context().await;
    let repo = OwnersRepository::new(&ctx);
    let o = owner("Erika Mustermann", "erika.mustermann@t-online.de");

    repo.add(o.clone());
    assert!(ctx.save_all_changes().await.unwrap());
    ctx.clear_tracked_set();

    let loaded = repo.find_by_id(o.id()).await.unwrap().unwrap();
    assert_eq!(loaded, o);
}

#[tokio::test]
async fn add_range_persists_every_owner() {
    let ctx = common::context().await;
    let repo = OwnersRepository::new(&ctx);
    let owners = vec![owner("A", "a@x.de"), owner("B", "b@x.de"), owner("C", "c@x.de")];

    repo.add_range(owners.clone());
    ctx.save_all_changes().await.unwrap();
    ctx.clear_tracked_set();

    assert_eq!(repo.select_all(false).await.unwrap(), owners);
}

#[tokio::test]
async fn find_by_id_of_unknown_id_is_none() {
    let (ctx, _) = common::seeded().await;
    let repo = OwnersRepository::new(&ctx);
    assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn find_by_id_sees_staged_owner_before_save() {
    let ctx = common::context().await;
    let repo = OwnersRepository::new(&ctx);
    let o = owner("Staged", "staged@x.de");
    repo.add(o.clone());

    assert_eq!(repo.find_by_id(o.id()).await.unwrap(), Some(o.clone()));
    assert!(repo.select_all(false).await.unwrap().is_empty());
}

#[tokio::test]
async fn select_all_untracked_returns_equal_detached_copies() {
    let (ctx, seed) = common::seeded().await;
    let repo = OwnersRepository::new(&ctx);

    let first = repo.select_all(false).await.unwrap();
    let second = repo.select_all(false).await.unwrap();
    assert_eq!(first.len(), 6);
    assert_eq!(first, second);
    assert_eq!(ctx.tracked_count(), 0);
    assert_eq!(first[0].id(), seed.owner1.id());
}

#[tokio::test]
async fn tracked_instance_wins_over_storage() {
    let (ctx, seed) = common::seeded().await;
    let repo = OwnersRepository::new(&ctx);

    let mut tracked = repo.find_by_id(seed.owner1.id()).await.unwrap().unwrap();
    tracked.name = "Local Edit".into();
    repo.attach(tracked);

    let all = repo.select_all(true).await.unwrap();
    assert_eq!(all[0].name, "Local Edit");
    assert_eq!(ctx.tracked_count(), 6);
}

#[tokio::test]
async fn select_by_name_is_substring_and_case_sensitive() {
    let (ctx, seed) = common::seeded().await;
    let repo = OwnersRepository::new(&ctx);

    let found = repo.select_by_name("Mustermann").await.unwrap();
    let ids: Vec<Uuid> = found.iter().map(|o| o.id()).collect();
    assert_eq!(ids, vec![seed.owner1.id(), seed.owner2.id()]);

    assert!(repo.select_by_name("mustermann").await.unwrap().is_empty());
}

#[tokio::test]
async fn find_by_email_matches_exactly() {
    let (ctx, seed) = common::seeded().await;
    let repo = OwnersRepository::new(&ctx);

    let found = repo.find_by_email("erika.mustermann@t-online.de").await.unwrap();
    assert_eq!(found.map(|o| o.id()), Some(seed.owner1.id()));
    assert!(repo.find_by_email("erika.mustermann").await.unwrap().is_none());
}

#[tokio::test]
async fn birthdate_range_is_inclusive() {
    let (ctx, seed) = common::seeded().await;
    let repo = OwnersRepository::new(&ctx);

    let from = Utc.with_ymd_and_hms(1960, 1, 1, 0, 0, 0).unwrap();
    let to = Utc.with_ymd_and_hms(1969, 12, 31, 0, 0, 0).unwrap();
    let ids: Vec<Uuid> = repo
        .select_by_birthdate_range(from, to)
        .await
        .unwrap()
        .iter()
        .map(|o| o.id())
        .collect();
    assert_eq!(ids, vec![seed.owner3.id(), seed.owner4.id()]);

    let exact = seed.owner1.birthdate();
    let hit = repo.select_by_birthdate_range(exact, exact).await.unwrap();
    assert_eq!(hit.len(), 1);
}

#[tokio::test]
async fn birthdate_range_covers_whole_last_day_and_fractional_seconds() {
    let (ctx, seed) = common::seeded().await;
    let repo = OwnersRepository::new(&ctx);

    let evening = Owner::new(
        "Eva Abend",
        Utc.with_ymd_and_hms(1969, 12, 31, 18, 30, 0).unwrap(),
        "e.abend@web.de",
    );
    let first_instant = Owner::new(
        "Fritz Frueh",
        Utc.with_ymd_and_hms(1960, 1, 1, 0, 0, 0).unwrap() + Duration::milliseconds(250),
        "f.frueh@web.de",
    );
    let last_instant = Owner::new(
        "Lena Letzt",
        Utc.with_ymd_and_hms(1969, 12, 31, 23, 59, 59).unwrap() + Duration::microseconds(999_999),
        "l.letzt@web.de",
    );
    let next_year = Owner::new(
        "Otto Neujahr",
        Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap(),
        "o.neujahr@web.de",
    );
    repo.add_range(vec![
        evening.clone(),
        first_instant.clone(),
        last_instant.clone(),
        next_year,
    ]);
    ctx.save_all_changes().await.unwrap();
    ctx.clear_tracked_set();

    let from = Utc.with_ymd_and_hms(1960, 1, 1, 0, 0, 0).unwrap();
    let end_of_day = NaiveDate::from_ymd_opt(1969, 12, 31)
        .unwrap()
        .and_hms_nano_opt(23, 59, 59, 999_999_999)
        .unwrap();
    let to = Utc.from_utc_datetime(&end_of_day);
    let found = repo.select_by_birthdate_range(from, to).await.unwrap();
    let ids: Vec<Uuid> = found.iter().map(|o| o.id()).collect();
    assert_eq!(
        ids,
        vec![
            seed.owner3.id(),
            seed.owner4.id(),
            evening.id(),
            first_instant.id(),
            last_instant.id(),
        ]
    );
    assert_eq!(found[3].birthdate(), first_instant.birthdate());
    assert_eq!(found[4].birthdate(), last_instant.birthdate());

    let midnight_bound = Utc.with_ymd_and_hms(1969, 12, 31, 0, 0, 0).unwrap();
    let up_to_midnight = repo.select_by_birthdate_range(from, midnight_bound).await.unwrap();
    assert_eq!(up_to_midnight.len(), 3);
}

#[tokio::test]
async fn filter_by_combines_predicates() {
    let (ctx, seed) = common::seeded().await;
    let repo = OwnersRepository::new(&ctx);

    let filter = Filter::contains(OwnerColumn::Email, "gmail")
        .and(Filter::contains(OwnerColumn::Name, "Mustermann"));
    let found = repo.filter_by(filter).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), seed.owner2.id());
    assert_eq!(ctx.entry_state::<Owner>(seed.owner2.id()), Some(EntryState::Unchanged));
}

#[tokio::test]
async fn select_by_join_loads_accounts_only_when_asked() {
    let (ctx, seed) = common::seeded().await;
    let repo = OwnersRepository::new(&ctx);

    let plain = repo.select_by_join(false, None, false).await.unwrap();
    assert_eq!(plain.len(), 6);
    assert!(plain.iter().all(|o| o.accounts().is_empty()));

    let joined = repo.select_by_join(false, None, true).await.unwrap();
    let counts: Vec<usize> = joined.iter().map(|o| o.accounts().len()).collect();
    assert_eq!(counts, vec![2, 1, 1, 1, 1, 0]);
    assert_eq!(joined[0].accounts()[0], seed.account1);
    assert_eq!(joined[0].accounts()[1], seed.account2);
    let back = joined[0].accounts()[0].owner().unwrap();
    assert_eq!(back.id(), seed.owner1.id());
}

#[tokio::test]
async fn select_by_join_with_filter_and_tracking() {
    let (ctx, seed) = common::seeded().await;
    let repo = OwnersRepository::new(&ctx);

    let filter = Filter::contains(OwnerColumn::Name, "Mustermann");
    let joined = repo.select_by_join(true, Some(filter), true).await.unwrap();
    assert_eq!(joined.len(), 2);
    assert_eq!(joined[0].accounts().len(), 2);
    assert_eq!(ctx.tracked_count(), 2 + 3);
    assert_eq!(ctx.entry_state::<banking_api::Account>(seed.account3.id()), Some(EntryState::Unchanged));
}

#[tokio::test]
async fn update_overwrites_scalars_and_is_saved() {
    let (ctx, seed) = common::seeded().await;
    let repo = OwnersRepository::new(&ctx);

    let mut changed = seed.owner2.clone();
    changed.update("Max Meier", "max.meier@gmail.com");
    repo.update(&changed).await.unwrap();
    assert_eq!(ctx.entry_state::<Owner>(changed.id()), Some(EntryState::Modified));
    assert!(ctx.save_all_changes().await.unwrap());
    ctx.clear_tracked_set();

    let loaded = repo.find_by_id(changed.id()).await.unwrap().unwrap();
    assert_eq!(loaded.name, "Max Meier");
    assert_eq!(loaded.email, "max.meier@gmail.com");
    assert_eq!(loaded.birthdate(), seed.owner2.birthdate());
}

#[tokio::test]
async fn update_of_missing_owner_fails_and_inserts_nothing() {
    let (ctx, _) = common::seeded().await;
    let repo = OwnersRepository::new(&ctx);
    let ghost = owner("Ghost", "ghost@x.de");

    let err = repo.update(&ghost).await.unwrap_err();
    assert!(matches!(err, AppError::UpdateTargetMissing { entity: "owner", id } if id == ghost.id()));
    assert!(!ctx.save_all_changes().await.unwrap());
    assert_eq!(repo.select_all(false).await.unwrap().len(), 6);
}

#[tokio::test]
async fn attach_with_changed_scalars_is_written_on_commit() {
    let (ctx, seed) = common::seeded().await;
    let repo = OwnersRepository::new(&ctx);

    let mut o = repo.find_by_id(seed.owner3.id()).await.unwrap().unwrap();
    o.email = "arno@arndt.de".into();
    repo.attach(o);
    assert!(ctx.has_changes());
    assert!(ctx.save_all_changes().await.unwrap());
    ctx.clear_tracked_set();

    let loaded = repo.find_by_email("arno@arndt.de").await.unwrap();
    assert_eq!(loaded.map(|o| o.id()), Some(seed.owner3.id()));
}

#[tokio::test]
async fn remove_owner_without_accounts() {
    let (ctx, seed) = common::seeded().await;
    let repo = OwnersRepository::new(&ctx);

    repo.remove(&seed.owner6);
    assert_eq!(ctx.entry_state::<Owner>(seed.owner6.id()), Some(EntryState::Deleted));
    assert!(ctx.save_all_changes().await.unwrap());
    assert_eq!(ctx.entry_state::<Owner>(seed.owner6.id()), None);

    ctx.clear_tracked_set();
    assert!(repo.find_by_id(seed.owner6.id()).await.unwrap().is_none());
}

#[tokio::test]
async fn remove_owner_with_accounts_rolls_back() {
    let (ctx, seed) = common::seeded().await;
    let repo = OwnersRepository::new(&ctx);

    repo.remove(&seed.owner5);
    let err = ctx.save_all_changes().await.unwrap_err();
    assert!(matches!(err, AppError::Db(_)));
    assert_eq!(ctx.entry_state::<Owner>(seed.owner5.id()), Some(EntryState::Deleted));

    ctx.clear_tracked_set();
    assert!(repo.find_by_id(seed.owner5.id()).await.unwrap().is_some());
    let accounts = AccountsRepository::new(&ctx)
        .select_by_owner_id_join(seed.owner5.id(), false, false)
        .await
        .unwrap();
    assert_eq!(accounts.len(), 1);
}

#[tokio::test]
async fn removing_a_staged_owner_drops_it() {
    let ctx = common::context().await;
    let repo = OwnersRepository::new(&ctx);
    let o = owner("Transient", "t@x.de");

    repo.add(o.clone());
    repo.remove(&o);
    assert_eq!(ctx.tracked_count(), 0);
    assert!(!ctx.save_all_changes().await.unwrap());
}
