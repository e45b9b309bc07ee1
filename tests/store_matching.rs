//! Store-backed matching: pools read from the store, scored by the matcher

use finditback::{
    Category, FoundReport, FoundStatus, InMemoryStore, LostReport, LostStatus, Matcher,
    ReportFilter, ReportStore, parse_event_date,
};

fn lost(category: Category, title: &str, location: &str, date: &str) -> LostReport {
    LostReport {
        category,
        title: title.into(),
        description: String::new(),
        location: location.into(),
        lost_on: parse_event_date(date),
        status: LostStatus::Open,
    }
}

fn found(category: Category, title: &str, location: &str, date: &str) -> FoundReport {
    FoundReport {
        category,
        title: title.into(),
        description: String::new(),
        location: location.into(),
        found_on: parse_event_date(date),
        status: FoundStatus::Available,
        returned: false,
    }
}

#[tokio::test]
async fn active_pool_excludes_claimed_and_returned_reports() {
    let store = InMemoryStore::new();
    let subject = store
        .insert_lost(
            "alice",
            lost(Category::Bag, "blue backpack", "Student Union", "2024-04-02"),
        )
        .await
        .unwrap();

    let available = store
        .insert_found(
            "bob",
            found(Category::Bag, "blue backpack", "Student Union", "2024-04-03"),
        )
        .await
        .unwrap();

    let mut claimed = found(Category::Bag, "blue backpack", "Student Union", "2024-04-02");
    claimed.status = FoundStatus::Claimed;
    store.insert_found("carol", claimed).await.unwrap();

    let mut returned = found(Category::Bag, "blue backpack", "Student Union", "2024-04-02");
    returned.returned = true;
    store.insert_found("dave", returned).await.unwrap();

    let pool = store.find_found(&ReportFilter::active()).await.unwrap();
    assert_eq!(pool.len(), 1);

    let matcher = Matcher::default();
    let matches = matcher.match_against_pool(&subject, &pool, matcher.min_score());
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].counterpart.id, available.id);
    // 30 + 25 + 18 (one day apart) + 15
    assert_eq!(matches[0].score, 88);
}

#[tokio::test]
async fn ties_follow_store_insertion_order() {
    let store = InMemoryStore::new();
    let subject = lost(Category::Wallet, "wallet", "Cafeteria", "2024-06-01");

    let mut ids = Vec::new();
    for owner in ["first", "second", "third"] {
        let doc = store
            .insert_found(owner, found(Category::Wallet, "wallet", "Cafeteria", "2024-06-01"))
            .await
            .unwrap();
        ids.push(doc.id);
    }

    let pool = store.find_found(&ReportFilter::active()).await.unwrap();
    let ranked: Vec<String> = Matcher::default()
        .match_against_pool(&subject, &pool, 40)
        .into_iter()
        .map(|m| m.counterpart.id.clone())
        .collect();
    assert_eq!(ranked, ids);
}

#[tokio::test]
async fn resolved_lost_reports_leave_the_global_listing() {
    let store = InMemoryStore::new();
    let doc = store
        .insert_lost("alice", lost(Category::Pets, "grey cat", "Oak Street", "2024-07-01"))
        .await
        .unwrap();
    store
        .insert_found("bob", found(Category::Pets, "grey cat", "Oak Street", "2024-07-01"))
        .await
        .unwrap();

    let matcher = Matcher::default();
    let lost_pool = store.find_lost(&ReportFilter::active()).await.unwrap();
    let found_pool = store.find_found(&ReportFilter::active()).await.unwrap();
    assert_eq!(matcher.match_all_pairs(&lost_pool, &found_pool, 40).len(), 1);

    let mut body = doc.report.clone();
    body.status = LostStatus::Resolved;
    store.update_lost(&doc.id, body).await.unwrap();

    let lost_pool = store.find_lost(&ReportFilter::active()).await.unwrap();
    assert!(lost_pool.is_empty());
    assert!(matcher.match_all_pairs(&lost_pool, &found_pool, 40).is_empty());
}
